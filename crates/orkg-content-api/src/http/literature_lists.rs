//! Literature list endpoints, including sections and published contents.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::error::{ApiError, ApiResult};
use crate::models::ThingId;
use crate::usecases::commands::{
    CreateLiteratureListRequest, LiteratureListSectionRequest, PublishContentRequest,
    UpdateLiteratureListRequest,
};
use crate::usecases::filters::ContentFilters;
use crate::usecases::LiteratureListUseCases;

use super::extract::Contributor;
use super::{created, media, no_content, vendor_json, AppState};

pub async fn find_by_id(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
) -> ApiResult<Response> {
    let list = services.literature_lists.find_by_id(&id).await?;
    Ok(vendor_json(media::LITERATURE_LIST, &list))
}

pub async fn find_all(
    State(services): State<AppState>,
    Query(filters): Query<ContentFilters>,
) -> ApiResult<Response> {
    let page = services.literature_lists.find_all(&filters, filters.page_request()).await?;
    Ok(Json(page).into_response())
}

pub async fn create(
    State(services): State<AppState>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreateLiteratureListRequest>,
) -> ApiResult<Response> {
    let id = services.literature_lists.create(contributor, request).await?;
    Ok(created(&format!("/api/literature-lists/{id}")))
}

pub async fn update(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<UpdateLiteratureListRequest>,
) -> ApiResult<Response> {
    services.literature_lists.update(contributor, &id, request).await?;
    Ok(no_content(&format!("/api/literature-lists/{id}")))
}

pub async fn publish(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<PublishContentRequest>,
) -> ApiResult<Response> {
    let version_id = services.literature_lists.publish(contributor, &id, request).await?;
    Ok(created(&format!("/api/literature-lists/{version_id}")))
}

pub async fn create_section(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<LiteratureListSectionRequest>,
) -> ApiResult<Response> {
    let section_id =
        services.literature_lists.create_section(contributor, &id, None, request).await?;
    Ok(created(&format!("/api/literature-lists/{id}/sections/{section_id}")))
}

/// `POST /api/literature-lists/{id}/sections/{index}` inserts a section
/// at the zero-based index.
pub async fn create_section_at(
    State(services): State<AppState>,
    Path((id, index)): Path<(ThingId, String)>,
    Contributor(contributor): Contributor,
    Json(request): Json<LiteratureListSectionRequest>,
) -> ApiResult<Response> {
    let index: usize = index.parse().map_err(|_| {
        ApiError::validation("index", format!("Invalid section index \"{index}\"."))
    })?;
    let section_id =
        services.literature_lists.create_section(contributor, &id, Some(index), request).await?;
    Ok(created(&format!("/api/literature-lists/{id}/sections/{section_id}")))
}

pub async fn update_section(
    State(services): State<AppState>,
    Path((id, section_id)): Path<(ThingId, ThingId)>,
    Contributor(contributor): Contributor,
    Json(request): Json<LiteratureListSectionRequest>,
) -> ApiResult<Response> {
    services.literature_lists.update_section(contributor, &id, &section_id, request).await?;
    Ok(no_content(&format!("/api/literature-lists/{id}")))
}

pub async fn delete_section(
    State(services): State<AppState>,
    Path((id, section_id)): Path<(ThingId, ThingId)>,
    Contributor(contributor): Contributor,
) -> ApiResult<StatusCode> {
    services.literature_lists.delete_section(contributor, &id, &section_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_published_content(
    State(services): State<AppState>,
    Path((id, content_id)): Path<(ThingId, ThingId)>,
) -> ApiResult<Response> {
    let content = services.literature_lists.find_published_content(&id, &content_id).await?;
    Ok(Json(content).into_response())
}
