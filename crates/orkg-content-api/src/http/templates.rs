//! Template instance endpoints.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json, Response};

use crate::error::ApiResult;
use crate::models::ThingId;
use crate::usecases::commands::UpdateTemplateInstanceRequest;
use crate::usecases::TemplateInstanceUseCases;

use super::extract::Contributor;
use super::{media, no_content, vendor_json, AppState, PageQuery};

pub async fn find_by_id(
    State(services): State<AppState>,
    Path((template_id, id)): Path<(ThingId, ThingId)>,
) -> ApiResult<Response> {
    let instance = services.templates.find_by_id(&template_id, &id).await?;
    Ok(vendor_json(media::TEMPLATE_INSTANCE, &instance))
}

pub async fn find_all(
    State(services): State<AppState>,
    Path(template_id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let instances = services.templates.find_all(&template_id, page.page_request()).await?;
    Ok(Json(instances).into_response())
}

pub async fn update(
    State(services): State<AppState>,
    Path((template_id, id)): Path<(ThingId, ThingId)>,
    Contributor(contributor): Contributor,
    Json(request): Json<UpdateTemplateInstanceRequest>,
) -> ApiResult<Response> {
    services.templates.update(contributor, &template_id, &id, request).await?;
    Ok(no_content(&format!("/api/templates/{template_id}/instances/{id}")))
}
