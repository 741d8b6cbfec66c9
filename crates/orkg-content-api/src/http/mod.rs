//! HTTP adapter: axum router, middleware and handlers.
//!
//! Handlers depend on the use-case traits only through the shared
//! [`Services`](crate::service::Services) bundle. Responses carry the
//! versioned vendor media type of their content type; error responses
//! are RFC 9457 problem details with the request path as `instance`.

mod comparisons;
mod contributions;
mod datasets;
mod extract;
mod literature_lists;
mod papers;
mod research_fields;
mod rosetta_stone;
mod smart_reviews;
mod templates;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use axum::http::{header, HeaderValue, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::PROBLEM_JSON;
use crate::service::Services;

pub use extract::{Contributor, Curator};

/// Shared state of all HTTP handlers.
pub type AppState = Arc<Services>;

/// Versioned vendor media types, one per content type representation.
pub mod media {
    pub const PAPER: &str = "application/vnd.orkg.paper.v2+json";
    pub const CONTRIBUTION: &str = "application/vnd.orkg.contribution.v2+json";
    pub const COMPARISON: &str = "application/vnd.orkg.comparison.v2+json";
    pub const COMPARISON_RELATED_RESOURCE: &str =
        "application/vnd.orkg.comparison-related-resource.v1+json";
    pub const COMPARISON_RELATED_FIGURE: &str =
        "application/vnd.orkg.comparison-related-figure.v1+json";
    pub const LITERATURE_LIST: &str = "application/vnd.orkg.literature-list.v1+json";
    pub const SMART_REVIEW: &str = "application/vnd.orkg.smart-review.v1+json";
    pub const ROSETTA_STONE_STATEMENT: &str =
        "application/vnd.orkg.rosetta-stone-statement.v1+json";
    pub const TEMPLATE_INSTANCE: &str = "application/vnd.orkg.template-instance.v1+json";
}

/// Upper bound on buffered problem bodies in the instance middleware.
const PROBLEM_BODY_LIMIT: usize = 64 * 1024;

/// Bare pagination query of endpoints without content filters.
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

impl PageQuery {
    #[must_use]
    pub fn page_request(&self) -> crate::models::PageRequest {
        crate::models::PageRequest::new(self.page, self.size)
    }
}

/// Serialize a body under a vendor media type.
fn vendor_json<T: Serialize>(media_type: &'static str, body: &T) -> Response {
    match serde_json::to_string(body) {
        Ok(json) => {
            ([(header::CONTENT_TYPE, HeaderValue::from_static(media_type))], json).into_response()
        }
        Err(error) => {
            tracing::error!(%error, "response serialization failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// 201 Created with a Location header.
fn created(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::CREATED, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::CREATED.into_response(),
    }
}

/// 204 No Content with a Location header pointing at the updated entity.
fn no_content(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::NO_CONTENT, [(header::LOCATION, value)]).into_response(),
        Err(_) => StatusCode::NO_CONTENT.into_response(),
    }
}

/// Build the full application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .nest("/api", api_router())
        .with_state(state)
        .layer(middleware::from_fn(attach_problem_instance))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn api_router() -> Router<AppState> {
    Router::new()
        .route("/papers", get(papers::find_all).post(papers::create))
        .route("/papers/statement-counts", get(papers::statement_counts))
        .route("/papers/{id}", get(papers::find_by_id).put(papers::update))
        .route("/papers/{id}/publish", post(papers::publish))
        .route("/papers/{id}/contributors", get(papers::find_all_contributors))
        .route("/papers/{id}/contributions", post(contributions::create))
        .route("/contributions", get(contributions::find_all))
        .route("/contributions/{id}", get(contributions::find_by_id))
        .route("/comparisons", get(comparisons::find_all).post(comparisons::create))
        .route("/comparisons/{id}", get(comparisons::find_by_id).put(comparisons::update))
        .route("/comparisons/{id}/publish", post(comparisons::publish))
        .route(
            "/comparisons/{id}/related-resources",
            get(comparisons::find_all_related_resources).post(comparisons::create_related_resource),
        )
        .route(
            "/comparisons/{id}/related-resources/{resource_id}",
            get(comparisons::find_related_resource)
                .put(comparisons::update_related_resource)
                .delete(comparisons::delete_related_resource),
        )
        .route(
            "/comparisons/{id}/related-figures",
            get(comparisons::find_all_related_figures).post(comparisons::create_related_figure),
        )
        .route(
            "/comparisons/{id}/related-figures/{figure_id}",
            get(comparisons::find_related_figure)
                .put(comparisons::update_related_figure)
                .delete(comparisons::delete_related_figure),
        )
        .route(
            "/literature-lists",
            get(literature_lists::find_all).post(literature_lists::create),
        )
        .route(
            "/literature-lists/{id}",
            get(literature_lists::find_by_id).put(literature_lists::update),
        )
        .route("/literature-lists/{id}/publish", post(literature_lists::publish))
        .route("/literature-lists/{id}/sections", post(literature_lists::create_section))
        .route(
            "/literature-lists/{id}/sections/{section}",
            post(literature_lists::create_section_at)
                .put(literature_lists::update_section)
                .delete(literature_lists::delete_section),
        )
        .route(
            "/literature-lists/{id}/published-contents/{content_id}",
            get(literature_lists::find_published_content),
        )
        .route("/smart-reviews", get(smart_reviews::find_all).post(smart_reviews::create))
        .route(
            "/smart-reviews/{id}",
            get(smart_reviews::find_by_id).put(smart_reviews::update),
        )
        .route("/smart-reviews/{id}/publish", post(smart_reviews::publish))
        .route("/smart-reviews/{id}/sections", post(smart_reviews::create_section))
        .route(
            "/smart-reviews/{id}/sections/{section}",
            post(smart_reviews::create_section_at)
                .put(smart_reviews::update_section)
                .delete(smart_reviews::delete_section),
        )
        .route(
            "/smart-reviews/{id}/published-contents/{content_id}",
            get(smart_reviews::find_published_content),
        )
        .route(
            "/rosetta-stone/statements",
            get(rosetta_stone::find_all).post(rosetta_stone::create),
        )
        .route(
            "/rosetta-stone/statements/{id}",
            get(rosetta_stone::find_by_id)
                .post(rosetta_stone::update)
                .delete(rosetta_stone::soft_delete),
        )
        .route(
            "/rosetta-stone/statements/{id}/versions",
            get(rosetta_stone::find_all_versions).delete(rosetta_stone::delete),
        )
        .route("/templates/{template_id}/instances", get(templates::find_all))
        .route(
            "/templates/{template_id}/instances/{id}",
            get(templates::find_by_id).put(templates::update),
        )
        .route(
            "/datasets/research-problem/{id}",
            get(datasets::find_datasets_by_research_problem),
        )
        .route("/datasets/{id}/problems", get(datasets::find_research_problems_by_dataset))
        .route(
            "/benchmarks/summary/research-field/{id}",
            get(datasets::summaries_by_research_field),
        )
        .route("/benchmarks/summary", get(datasets::summaries))
        .route("/research-fields/roots", get(research_fields::find_all_roots))
        .route("/research-fields/{id}/children", get(research_fields::find_children))
        .route("/research-fields/{id}/parents", get(research_fields::find_parents))
        .route("/research-fields/{id}/roots", get(research_fields::find_roots))
        .route("/research-fields/{id}/hierarchy", get(research_fields::find_hierarchy))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Fill the `instance` field of problem-detail responses with the
/// request path. [`crate::error::ApiError`] cannot see the path itself.
async fn attach_problem_instance(request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    let is_problem = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(PROBLEM_JSON));
    if !is_problem {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, PROBLEM_BODY_LIMIT).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!(%error, "failed to buffer problem body");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(mut problem)) => {
            problem.insert("instance".to_string(), json!(path));
            parts.headers.remove(header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(Value::Object(problem).to_string()))
        }
        _ => Response::from_parts(parts, Body::from(bytes)),
    }
}

/// Bind and serve the API until a shutdown signal arrives.
pub async fn run(config: &Config, services: Services) -> anyhow::Result<()> {
    let router = create_router(Arc::new(services));
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port).parse()?;

    tracing::info!(%addr, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;

    tracing::info!("HTTP server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to install ctrl-c handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => tracing::error!(%error, "failed to install terminate handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("Received shutdown signal");
}
