//! Shared harness for the endpoint integration tests.
//!
//! Builds the full router over a seeded in-memory store and drives it
//! with `tower::ServiceExt::oneshot`, one request per call.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use orkg_content_api::config::Config;
use orkg_content_api::service::{GraphStore, Services};

/// A research problem with two datasets, seeded into every test app.
pub const RESEARCH_PROBLEM: &str = "R700";
/// Rosetta-stone template describing "{0} runs faster than {1}".
pub const ROSETTA_TEMPLATE: &str = "R456";
/// Closed template with one number-literal property on `P123`.
pub const INSTANCE_TEMPLATE: &str = "R900";
/// Resource carrying the instance template's target class.
pub const INSTANCE_ROOT: &str = "R54154";

/// Router over a freshly seeded store.
pub async fn app() -> Router {
    let store = Arc::new(GraphStore::new());
    seed(&store).await;
    orkg_content_api::http::create_router(Arc::new(Services::with_store(
        store,
        &Config::for_testing(),
    )))
}

async fn seed(store: &GraphStore) {
    store.seed_research_field("R1", "Science", None).await;
    store.seed_research_field("R11", "Computer Science", Some("R1")).await;
    store.seed_research_field("R12", "Information Science", Some("R1")).await;

    store.seed_predicate("P32", "research problem").await;
    store.seed_predicate("P1", "employs").await;

    store.seed_resource("R100", "the hare", &[]).await;
    store.seed_resource("R200", "the tortoise", &[]).await;
    store.seed_resource("R600", "a visualization", &["Visualization"]).await;
    store.seed_resource(INSTANCE_ROOT, "instance root", &["C900"]).await;

    store.seed_template(template(json!({
        "id": ROSETTA_TEMPLATE,
        "label": "speed comparison",
        "formatted_label": "{0} runs faster than {1}",
        "target_class": { "id": "C123", "label": "SpeedComparison" },
        "relations": {},
        "properties": [],
        "is_closed": true,
        "created_at": "2023-10-06T12:34:21+02:00",
        "created_by": "00000000-0000-0000-0000-000000000000",
        "extraction_method": "UNKNOWN",
        "visibility": "DEFAULT"
    }))).await;

    store.seed_template(template(json!({
        "id": INSTANCE_TEMPLATE,
        "label": "measurement",
        "target_class": { "id": "C900", "label": "Measurement" },
        "relations": {},
        "properties": [{
            "type": "number_literal",
            "id": "R901",
            "label": "value",
            "order": 1,
            "min_count": 1,
            "max_count": 1,
            "min_inclusive": 0.0,
            "max_inclusive": 100.0,
            "path": { "id": "P123", "label": "has value" },
            "created_at": "2023-10-06T12:34:21+02:00",
            "created_by": "00000000-0000-0000-0000-000000000000",
            "datatype": { "id": "Number", "label": "Number" }
        }],
        "is_closed": true,
        "created_at": "2023-10-06T12:34:21+02:00",
        "created_by": "00000000-0000-0000-0000-000000000000",
        "extraction_method": "UNKNOWN",
        "visibility": "DEFAULT"
    }))).await;

    store
        .seed_research_problem(
            RESEARCH_PROBLEM,
            "Question Answering",
            vec![dataset("R789", "SQuAD"), dataset("R790", "HotpotQA")],
        )
        .await;
    store
        .seed_benchmark(
            "R11",
            serde_json::from_value(json!({
                "research_problem": { "id": RESEARCH_PROBLEM, "label": "Question Answering" },
                "research_fields": [{ "id": "R11", "label": "Computer Science" }],
                "total_papers": 5,
                "total_datasets": 2,
                "total_codes": 4
            }))
            .expect("valid benchmark summary"),
        )
        .await;
}

fn template(value: Value) -> orkg_content_api::models::Template {
    serde_json::from_value(value).expect("valid template")
}

fn dataset(id: &str, label: &str) -> orkg_content_api::models::Dataset {
    serde_json::from_value(json!({
        "id": id,
        "label": label,
        "total_papers": 3,
        "total_models": 2,
        "total_codes": 1
    }))
    .expect("valid dataset")
}

/// Send one request through the router.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("valid request");
    app.clone().oneshot(request).await.expect("infallible router")
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, "GET", uri, &[], None).await
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, "POST", uri, &[], Some(body)).await
}

pub async fn put_json(app: &Router, uri: &str, body: Value) -> Response<Body> {
    send(app, "PUT", uri, &[], Some(body)).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    send(app, "DELETE", uri, &[], None).await
}

/// The response body parsed as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.expect("body").to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}

/// Location header of a creation response.
pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Location header")
        .to_str()
        .expect("ascii header")
        .to_string()
}

/// Create an entity and return the id from its Location header.
pub async fn create_entity(app: &Router, uri: &str, body: Value) -> String {
    let response = post_json(app, uri, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = location(&response);
    location.rsplit('/').next().expect("id segment").to_string()
}
