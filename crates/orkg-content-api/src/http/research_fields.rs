//! Research field hierarchy endpoints.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json, Response};

use crate::error::ApiResult;
use crate::models::ThingId;
use crate::usecases::ResearchFieldHierarchyUseCases;

use super::{AppState, PageQuery};

pub async fn find_children(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let children = services.research_fields.find_children(&id, page.page_request()).await?;
    Ok(Json(children).into_response())
}

pub async fn find_parents(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let parents = services.research_fields.find_parents(&id, page.page_request()).await?;
    Ok(Json(parents).into_response())
}

pub async fn find_roots(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let roots = services.research_fields.find_roots(&id, page.page_request()).await?;
    Ok(Json(roots).into_response())
}

pub async fn find_all_roots(
    State(services): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let roots = services.research_fields.find_all_roots(page.page_request()).await?;
    Ok(Json(roots).into_response())
}

pub async fn find_hierarchy(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let hierarchy = services.research_fields.find_hierarchy(&id, page.page_request()).await?;
    Ok(Json(hierarchy).into_response())
}
