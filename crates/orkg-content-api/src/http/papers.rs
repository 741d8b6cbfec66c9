//! Paper endpoints.

use axum::extract::{Path, Query, State};
use axum::http::Method;
use axum::response::{IntoResponse, Json, Response};

use crate::error::ApiResult;
use crate::models::ThingId;
use crate::usecases::commands::{CreatePaperRequest, PublishPaperRequest, UpdatePaperRequest};
use crate::usecases::filters::PaperFilters;
use crate::usecases::PaperUseCases;

use super::extract::Contributor;
use super::{created, media, no_content, vendor_json, AppState, PageQuery};

/// `GET /api/papers` lists papers; `HEAD` with a `doi` or `title`
/// filter answers an existence check with a Location header.
pub async fn find_all(
    method: Method,
    State(services): State<AppState>,
    Query(filters): Query<PaperFilters>,
) -> ApiResult<Response> {
    if method == Method::HEAD {
        if let Some(doi) = &filters.doi {
            let paper = services.papers.find_by_doi(doi).await?;
            return Ok(created_location(&paper.id));
        }
        if let Some(title) = &filters.title {
            let paper = services.papers.find_by_title(title).await?;
            return Ok(created_location(&paper.id));
        }
    }
    let page = services.papers.find_all(&filters, filters.page_request()).await?;
    Ok(Json(page).into_response())
}

fn created_location(id: &ThingId) -> Response {
    use axum::http::{header, HeaderValue, StatusCode};
    match HeaderValue::from_str(&format!("/api/papers/{id}")) {
        Ok(value) => (StatusCode::OK, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::OK.into_response(),
    }
}

pub async fn find_by_id(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
) -> ApiResult<Response> {
    let paper = services.papers.find_by_id(&id).await?;
    Ok(vendor_json(media::PAPER, &paper))
}

pub async fn create(
    State(services): State<AppState>,
    Contributor(contributor): Contributor,
    Json(request): Json<CreatePaperRequest>,
) -> ApiResult<Response> {
    let id = services.papers.create(contributor, request).await?;
    Ok(created(&format!("/api/papers/{id}")))
}

pub async fn update(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<UpdatePaperRequest>,
) -> ApiResult<Response> {
    services.papers.update(contributor, &id, request).await?;
    Ok(no_content(&format!("/api/papers/{id}")))
}

pub async fn publish(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Contributor(contributor): Contributor,
    Json(request): Json<PublishPaperRequest>,
) -> ApiResult<Response> {
    let version_id = services.papers.publish(contributor, &id, request).await?;
    Ok(created(&format!("/api/papers/{version_id}")))
}

pub async fn find_all_contributors(
    State(services): State<AppState>,
    Path(id): Path<ThingId>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let contributors =
        services.papers.find_all_contributors(&id, page.page_request()).await?;
    Ok(Json(contributors).into_response())
}

pub async fn statement_counts(
    State(services): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Response> {
    let counts = services.papers.statement_counts(page.page_request()).await?;
    Ok(Json(counts).into_response())
}
