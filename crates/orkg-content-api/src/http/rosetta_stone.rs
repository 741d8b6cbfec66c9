//! Rosetta stone statement endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::error::{ApiError, ApiResult};
use crate::models::ThingId;
use crate::usecases::commands::{
    CreateRosettaStoneStatementRequest, UpdateRosettaStoneStatementRequest,
};
use crate::usecases::filters::RosettaStoneStatementFilters;
use crate::usecases::RosettaStoneStatementUseCases;

use super::extract::{Contributor, Curator};
use super::{created, media, vendor_json, AppState};

pub async fn find_by_id(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Curator(curator): Curator,
) -> ApiResult<Response> {
    let statement = services.rosetta_stone.find_by_id(&id, curator).await?;
    Ok(vendor_json(media::ROSETTA_STONE_STATEMENT, &statement))
}

pub async fn find_all(
    State(services): State<AppState>,
    Query(filters): Query<RosettaStoneStatementFilters>,
) -> ApiResult<Response> {
    let page = services.rosetta_stone.find_all(&filters, filters.page_request()).await?;
    Ok(Json(page).into_response())
}

pub async fn find_all_versions(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Curator(curator): Curator,
) -> ApiResult<Response> {
    let versions = services.rosetta_stone.find_all_versions(&id, curator).await?;
    Ok(Json(versions).into_response())
}

pub async fn create(
    State(services): State<AppState>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreateRosettaStoneStatementRequest>,
) -> ApiResult<Response> {
    let id = services.rosetta_stone.create(contributor, request).await?;
    Ok(created(&format!("/api/rosetta-stone/statements/{id}")))
}

/// `POST /api/rosetta-stone/statements/{id}` appends a new version.
pub async fn update(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<UpdateRosettaStoneStatementRequest>,
) -> ApiResult<Response> {
    let version_id = services.rosetta_stone.update(contributor, &id, request).await?;
    Ok(created(&format!("/api/rosetta-stone/statements/{version_id}")))
}

pub async fn soft_delete(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
) -> ApiResult<StatusCode> {
    services.rosetta_stone.soft_delete(contributor, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/rosetta-stone/statements/{id}/versions` removes the
/// statement with all versions. Requires the curator header.
pub async fn delete(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Curator(curator): Curator,
) -> ApiResult<StatusCode> {
    if !curator {
        return Err(ApiError::Forbidden);
    }
    services.rosetta_stone.delete(contributor, &id, curator).await?;
    Ok(StatusCode::NO_CONTENT)
}
