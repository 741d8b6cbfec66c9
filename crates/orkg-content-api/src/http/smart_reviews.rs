//! Smart review endpoints, mirroring the literature list surface.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::error::{ApiError, ApiResult};
use crate::models::ThingId;
use crate::usecases::commands::{
    CreateSmartReviewRequest, PublishContentRequest, SmartReviewSectionRequest,
    UpdateSmartReviewRequest,
};
use crate::usecases::filters::ContentFilters;
use crate::usecases::SmartReviewUseCases;

use super::extract::Contributor;
use super::{created, media, no_content, vendor_json, AppState};

pub async fn find_by_id(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
) -> ApiResult<Response> {
    let review = services.smart_reviews.find_by_id(&id).await?;
    Ok(vendor_json(media::SMART_REVIEW, &review))
}

pub async fn find_all(
    State(services): State<AppState>,
    Query(filters): Query<ContentFilters>,
) -> ApiResult<Response> {
    let page = services.smart_reviews.find_all(&filters, filters.page_request()).await?;
    Ok(Json(page).into_response())
}

pub async fn create(
    State(services): State<AppState>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreateSmartReviewRequest>,
) -> ApiResult<Response> {
    let id = services.smart_reviews.create(contributor, request).await?;
    Ok(created(&format!("/api/smart-reviews/{id}")))
}

pub async fn update(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<UpdateSmartReviewRequest>,
) -> ApiResult<Response> {
    services.smart_reviews.update(contributor, &id, request).await?;
    Ok(no_content(&format!("/api/smart-reviews/{id}")))
}

pub async fn publish(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<PublishContentRequest>,
) -> ApiResult<Response> {
    let version_id = services.smart_reviews.publish(contributor, &id, request).await?;
    Ok(created(&format!("/api/smart-reviews/{version_id}")))
}

pub async fn create_section(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<SmartReviewSectionRequest>,
) -> ApiResult<Response> {
    let section_id = services.smart_reviews.create_section(contributor, &id, None, request).await?;
    Ok(created(&format!("/api/smart-reviews/{id}/sections/{section_id}")))
}

pub async fn create_section_at(
    State(services): State<AppState>,
    Path((id, index)): Path<(ThingId, String)>,
    Contributor(contributor): Contributor,
    Json(request): Json<SmartReviewSectionRequest>,
) -> ApiResult<Response> {
    let index: usize = index.parse().map_err(|_| {
        ApiError::validation("index", format!("Invalid section index \"{index}\"."))
    })?;
    let section_id =
        services.smart_reviews.create_section(contributor, &id, Some(index), request).await?;
    Ok(created(&format!("/api/smart-reviews/{id}/sections/{section_id}")))
}

pub async fn update_section(
    State(services): State<AppState>,
    Path((id, section_id)): Path<(ThingId, ThingId)>,
    Contributor(contributor): Contributor,
    Json(request): Json<SmartReviewSectionRequest>,
) -> ApiResult<Response> {
    services.smart_reviews.update_section(contributor, &id, &section_id, request).await?;
    Ok(no_content(&format!("/api/smart-reviews/{id}")))
}

pub async fn delete_section(
    State(services): State<AppState>,
    Path((id, section_id)): Path<(ThingId, ThingId)>,
    Contributor(contributor): Contributor,
) -> ApiResult<StatusCode> {
    services.smart_reviews.delete_section(contributor, &id, &section_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_published_content(
    State(services): State<AppState>,
    Path((id, content_id)): Path<(ThingId, ThingId)>,
) -> ApiResult<Response> {
    let content = services.smart_reviews.find_published_content(&id, &content_id).await?;
    Ok(Json(content).into_response())
}
