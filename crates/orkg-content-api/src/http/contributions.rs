//! Contribution endpoints.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json, Response};

use crate::error::ApiResult;
use crate::models::ThingId;
use crate::usecases::commands::CreateContributionRequest;
use crate::usecases::ContributionUseCases;

use super::extract::Contributor;
use super::{created, media, vendor_json, AppState, PageQuery};

pub async fn find_by_id(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
) -> ApiResult<Response> {
    let contribution = services.contributions.find_by_id(&id).await?;
    Ok(vendor_json(media::CONTRIBUTION, &contribution))
}

pub async fn find_all(
    State(services): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let contributions = services.contributions.find_all(page.page_request()).await?;
    Ok(Json(contributions).into_response())
}

/// `POST /api/papers/{id}/contributions`.
pub async fn create(
    State(services): State<AppState>,
    Path(paper_id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreateContributionRequest>,
) -> ApiResult<Response> {
    let id = services.contributions.create(contributor, &paper_id, request).await?;
    Ok(created(&format!("/api/contributions/{id}")))
}
