//! Comparison endpoints, including related resources and figures.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

use crate::error::ApiResult;
use crate::models::ThingId;
use crate::usecases::commands::{
    CreateComparisonRelatedFigureRequest, CreateComparisonRelatedResourceRequest,
    CreateComparisonRequest, PublishComparisonRequest, UpdateComparisonRequest,
};
use crate::usecases::filters::ContentFilters;
use crate::usecases::ComparisonUseCases;

use super::extract::Contributor;
use super::{created, media, no_content, vendor_json, AppState, PageQuery};

pub async fn find_by_id(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
) -> ApiResult<Response> {
    let comparison = services.comparisons.find_by_id(&id).await?;
    Ok(vendor_json(media::COMPARISON, &comparison))
}

pub async fn find_all(
    State(services): State<AppState>,
    Query(filters): Query<ContentFilters>,
) -> ApiResult<Response> {
    let page = services.comparisons.find_all(&filters, filters.page_request()).await?;
    Ok(Json(page).into_response())
}

pub async fn create(
    State(services): State<AppState>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreateComparisonRequest>,
) -> ApiResult<Response> {
    let id = services.comparisons.create(contributor, request).await?;
    Ok(created(&format!("/api/comparisons/{id}")))
}

pub async fn update(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<UpdateComparisonRequest>,
) -> ApiResult<Response> {
    services.comparisons.update(contributor, &id, request).await?;
    Ok(no_content(&format!("/api/comparisons/{id}")))
}

pub async fn publish(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<PublishComparisonRequest>,
) -> ApiResult<Response> {
    let version_id = services.comparisons.publish(contributor, &id, request).await?;
    Ok(created(&format!("/api/comparisons/{version_id}")))
}

pub async fn find_related_resource(
    State(services): State<AppState>,
    Path((comparison_id, resource_id)): Path<(ThingId, ThingId)>,
) -> ApiResult<Response> {
    let resource =
        services.comparisons.find_related_resource(&comparison_id, &resource_id).await?;
    Ok(vendor_json(media::COMPARISON_RELATED_RESOURCE, &resource))
}

pub async fn find_all_related_resources(
    State(services): State<AppState>,
    Path(comparison_id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let resources = services
        .comparisons
        .find_all_related_resources(&comparison_id, page.page_request())
        .await?;
    Ok(Json(resources).into_response())
}

pub async fn create_related_resource(
    State(services): State<AppState>,
    Path(comparison_id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreateComparisonRelatedResourceRequest>,
) -> ApiResult<Response> {
    let id =
        services.comparisons.create_related_resource(contributor, &comparison_id, request).await?;
    Ok(created(&format!("/api/comparisons/{comparison_id}/related-resources/{id}")))
}

pub async fn update_related_resource(
    State(services): State<AppState>,
    Path((comparison_id, resource_id)): Path<(ThingId, ThingId)>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreateComparisonRelatedResourceRequest>,
) -> ApiResult<Response> {
    services
        .comparisons
        .update_related_resource(contributor, &comparison_id, &resource_id, request)
        .await?;
    Ok(no_content(&format!("/api/comparisons/{comparison_id}/related-resources/{resource_id}")))
}

pub async fn delete_related_resource(
    State(services): State<AppState>,
    Path((comparison_id, resource_id)): Path<(ThingId, ThingId)>,
    Contributor(contributor): Contributor,
) -> ApiResult<StatusCode> {
    services.comparisons.delete_related_resource(contributor, &comparison_id, &resource_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn find_related_figure(
    State(services): State<AppState>,
    Path((comparison_id, figure_id)): Path<(ThingId, ThingId)>,
) -> ApiResult<Response> {
    let figure = services.comparisons.find_related_figure(&comparison_id, &figure_id).await?;
    Ok(vendor_json(media::COMPARISON_RELATED_FIGURE, &figure))
}

pub async fn find_all_related_figures(
    State(services): State<AppState>,
    Path(comparison_id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let figures =
        services.comparisons.find_all_related_figures(&comparison_id, page.page_request()).await?;
    Ok(Json(figures).into_response())
}

pub async fn create_related_figure(
    State(services): State<AppState>,
    Path(comparison_id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreateComparisonRelatedFigureRequest>,
) -> ApiResult<Response> {
    let id =
        services.comparisons.create_related_figure(contributor, &comparison_id, request).await?;
    Ok(created(&format!("/api/comparisons/{comparison_id}/related-figures/{id}")))
}

pub async fn update_related_figure(
    State(services): State<AppState>,
    Path((comparison_id, figure_id)): Path<(ThingId, ThingId)>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreateComparisonRelatedFigureRequest>,
) -> ApiResult<Response> {
    services
        .comparisons
        .update_related_figure(contributor, &comparison_id, &figure_id, request)
        .await?;
    Ok(no_content(&format!("/api/comparisons/{comparison_id}/related-figures/{figure_id}")))
}

pub async fn delete_related_figure(
    State(services): State<AppState>,
    Path((comparison_id, figure_id)): Path<(ThingId, ThingId)>,
    Contributor(contributor): Contributor,
) -> ApiResult<StatusCode> {
    services.comparisons.delete_related_figure(contributor, &comparison_id, &figure_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
