//! Paper endpoint integration tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, body_json, create_entity, get, location, post_json, put_json, send};

fn paper_body(title: &str, doi: &str) -> serde_json::Value {
    json!({
        "title": title,
        "research_fields": ["R11"],
        "identifiers": { "doi": [doi] },
        "publication_info": { "published_month": 5, "published_year": 2015 },
        "authors": [{ "name": "Josiah Stinkney Carberry" }],
        "contents": {
            "resources": { "#temp1": { "label": "MOTO" } },
            "contributions": [{
                "label": "Contribution 1",
                "statements": { "P32": [{ "id": "#temp1" }] }
            }]
        }
    })
}

#[tokio::test]
async fn create_and_fetch_paper() {
    let app = app().await;

    let response =
        post_json(&app, "/api/papers", paper_body("Example Paper", "10.1000/182")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let location = location(&response);
    assert!(location.starts_with("/api/papers/"));

    let response = get(&app, &location).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/vnd.orkg.paper.v2+json"
    );
    let paper = body_json(response).await;
    assert_eq!(paper["title"], "Example Paper");
    assert_eq!(paper["identifiers"]["doi"][0], "10.1000/182");
    assert_eq!(paper["research_fields"][0]["id"], "R11");
    assert_eq!(paper["contributions"].as_array().unwrap().len(), 1);
    assert_eq!(paper["visibility"], "DEFAULT");
}

#[tokio::test]
async fn listing_supports_title_filter_and_paging() {
    let app = app().await;
    create_entity(&app, "/api/papers", paper_body("Determinism and Databases", "10.1000/1")).await;
    create_entity(&app, "/api/papers", paper_body("Something else entirely", "10.1000/2")).await;

    let response = get(&app, "/api/papers?title=databases").await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await;
    assert_eq!(page["page"]["total_elements"], 1);
    assert_eq!(page["content"][0]["title"], "Determinism and Databases");

    let response = get(&app, "/api/papers?page=5&size=10").await;
    let page = body_json(response).await;
    assert_eq!(page["content"].as_array().unwrap().len(), 0);
    assert_eq!(page["page"]["number"], 5);
}

#[tokio::test]
async fn head_checks_existence_by_doi() {
    let app = app().await;
    let id = create_entity(&app, "/api/papers", paper_body("Example Paper", "10.1000/182")).await;

    let response = send(&app, "HEAD", "/api/papers?doi=10.1000/182", &[], None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(location(&response), format!("/api/papers/{id}"));

    let response = send(&app, "HEAD", "/api/papers?doi=10.1000/404", &[], None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_doi_is_rejected() {
    let app = app().await;
    create_entity(&app, "/api/papers", paper_body("First Paper", "10.1000/182")).await;

    let response =
        post_json(&app, "/api/papers", paper_body("Second Paper", "10.1000/182")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem = body_json(response).await;
    assert_eq!(problem["type"], "orkg:problem:paper_already_exists");
    assert_eq!(problem["paper_doi"], "10.1000/182");
}

#[tokio::test]
async fn invalid_month_is_rejected() {
    let app = app().await;
    let response = post_json(
        &app,
        "/api/papers",
        json!({
            "title": "Bad month",
            "research_fields": ["R11"],
            "publication_info": { "published_month": 13 }
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem = body_json(response).await;
    assert_eq!(problem["type"], "orkg:problem:invalid_month");
    assert_eq!(problem["detail"], "Invalid month \"13\". Must be in range [1..12].");
}

#[tokio::test]
async fn update_returns_no_content_with_location() {
    let app = app().await;
    let id = create_entity(&app, "/api/papers", paper_body("Example Paper", "10.1000/182")).await;

    let response = put_json(
        &app,
        &format!("/api/papers/{id}"),
        json!({ "title": "Renamed Paper", "verified": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(location(&response), format!("/api/papers/{id}"));

    let paper = body_json(get(&app, &format!("/api/papers/{id}")).await).await;
    assert_eq!(paper["title"], "Renamed Paper");
    assert_eq!(paper["verified"], true);
}

#[tokio::test]
async fn publish_creates_a_version() {
    let app = app().await;
    let id = create_entity(&app, "/api/papers", paper_body("Example Paper", "10.1000/182")).await;

    let response = post_json(
        &app,
        &format!("/api/papers/{id}/publish"),
        json!({ "subject": "Example Paper", "description": "First snapshot" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(location(&response).starts_with("/api/papers/"));
}

#[tokio::test]
async fn contributors_and_statement_counts() {
    let app = app().await;
    let id = create_entity(&app, "/api/papers", paper_body("Example Paper", "10.1000/182")).await;

    let contributors =
        body_json(get(&app, &format!("/api/papers/{id}/contributors")).await).await;
    assert_eq!(contributors["page"]["total_elements"], 1);

    let counts = body_json(get(&app, "/api/papers/statement-counts").await).await;
    assert_eq!(counts["content"][0]["id"], id);
    assert_eq!(counts["content"][0]["count"], 1);
}

#[tokio::test]
async fn contribution_can_be_added_to_existing_paper() {
    let app = app().await;
    let paper_id =
        create_entity(&app, "/api/papers", paper_body("Example Paper", "10.1000/182")).await;

    let contribution_id = create_entity(
        &app,
        &format!("/api/papers/{paper_id}/contributions"),
        json!({
            "literals": { "#temp1": { "label": "0.1", "data_type": "xsd:decimal" } },
            "contribution": {
                "label": "Contribution 2",
                "statements": { "P1": [{ "id": "#temp1" }] }
            }
        }),
    )
    .await;

    let response = get(&app, &format!("/api/contributions/{contribution_id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/vnd.orkg.contribution.v2+json"
    );
    let contribution = body_json(response).await;
    assert_eq!(contribution["label"], "Contribution 2");

    let paper = body_json(get(&app, &format!("/api/papers/{paper_id}")).await).await;
    assert_eq!(paper["contributions"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_contribution_statements_are_rejected() {
    let app = app().await;
    let paper_id =
        create_entity(&app, "/api/papers", paper_body("Example Paper", "10.1000/182")).await;

    let response = post_json(
        &app,
        &format!("/api/papers/{paper_id}/contributions"),
        json!({ "contribution": { "label": "Empty", "statements": {} } }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
