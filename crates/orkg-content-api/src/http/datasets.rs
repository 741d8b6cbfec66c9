//! Dataset and benchmark summary endpoints.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Json, Response};

use crate::error::ApiResult;
use crate::models::ThingId;
use crate::usecases::DatasetUseCases;

use super::{AppState, PageQuery};

pub async fn find_datasets_by_research_problem(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let datasets =
        services.datasets.find_datasets_by_research_problem(&id, page.page_request()).await?;
    Ok(Json(datasets).into_response())
}

pub async fn find_research_problems_by_dataset(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let problems =
        services.datasets.find_research_problems_by_dataset(&id, page.page_request()).await?;
    Ok(Json(problems).into_response())
}

pub async fn summaries_by_research_field(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let summaries = services.datasets.summaries_by_research_field(&id, page.page_request()).await?;
    Ok(Json(summaries).into_response())
}

pub async fn summaries(
    State(services): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let summaries = services.datasets.summaries(page.page_request()).await?;
    Ok(Json(summaries).into_response())
}
