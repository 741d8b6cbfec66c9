//! Comparison endpoint integration tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, body_json, create_entity, delete, get, location, post_json, put_json};

fn comparison_body(title: &str) -> serde_json::Value {
    json!({
        "title": title,
        "description": "A comparison of running speeds",
        "research_fields": ["R11"],
        "authors": [{ "name": "Josiah Stinkney Carberry" }],
        "contributions": []
    })
}

async fn paper_with_contribution(app: &axum::Router, title: &str, doi: &str) -> String {
    let paper_id = create_entity(
        app,
        "/api/papers",
        json!({
            "title": title,
            "research_fields": ["R11"],
            "identifiers": { "doi": [doi] },
            "contents": {
                "resources": { "#temp1": { "label": "MOTO" } },
                "contributions": [{
                    "label": "Contribution 1",
                    "statements": { "P32": [{ "id": "#temp1" }] }
                }]
            }
        }),
    )
    .await;
    let paper = body_json(get(app, &format!("/api/papers/{paper_id}")).await).await;
    paper["contributions"][0]["id"].as_str().expect("contribution id").to_string()
}

#[tokio::test]
async fn create_and_fetch_comparison() {
    let app = app().await;
    let id = create_entity(&app, "/api/comparisons", comparison_body("Speed Comparison")).await;

    let response = get(&app, &format!("/api/comparisons/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/vnd.orkg.comparison.v2+json"
    );
    let comparison = body_json(response).await;
    assert_eq!(comparison["title"], "Speed Comparison");
    assert_eq!(comparison["description"], "A comparison of running speeds");
    assert_eq!(comparison["versions"]["published"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn listing_published_filter() {
    let app = app().await;
    let first = paper_with_contribution(&app, "First Paper", "10.1000/1").await;
    let second = paper_with_contribution(&app, "Second Paper", "10.1000/2").await;

    let mut body = comparison_body("Published comparison");
    body["contributions"] = json!([first, second]);
    let published = create_entity(&app, "/api/comparisons", body).await;
    create_entity(&app, "/api/comparisons", comparison_body("Draft comparison")).await;

    let response = post_json(
        &app,
        &format!("/api/comparisons/{published}/publish"),
        json!({ "description": "First release" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let page = body_json(get(&app, "/api/comparisons?published=true").await).await;
    assert_eq!(page["page"]["total_elements"], 1);
    assert_eq!(page["content"][0]["title"], "Published comparison");
}

#[tokio::test]
async fn publish_requires_two_contributions() {
    let app = app().await;
    let id = create_entity(&app, "/api/comparisons", comparison_body("Speed Comparison")).await;

    let response = post_json(
        &app,
        &format!("/api/comparisons/{id}/publish"),
        json!({ "description": "too early" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem = body_json(response).await;
    assert_eq!(problem["type"], "orkg:problem:requires_at_least_two_contributions");
    assert_eq!(problem["detail"], "At least two contributions are required.");
}

#[tokio::test]
async fn related_resource_crud() {
    let app = app().await;
    let comparison = create_entity(&app, "/api/comparisons", comparison_body("Speed")).await;
    let base = format!("/api/comparisons/{comparison}/related-resources");

    let response = post_json(
        &app,
        &base,
        json!({ "label": "Dataset", "url": "https://example.org/dataset" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let resource_uri = location(&response);

    let resource = body_json(get(&app, &resource_uri).await).await;
    assert_eq!(resource["label"], "Dataset");
    assert_eq!(resource["url"], "https://example.org/dataset");

    let response = put_json(&app, &resource_uri, json!({ "label": "Renamed dataset" })).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let page = body_json(get(&app, &base).await).await;
    assert_eq!(page["page"]["total_elements"], 1);
    assert_eq!(page["content"][0]["label"], "Renamed dataset");

    let response = delete(&app, &resource_uri).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(&app, &resource_uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let problem = body_json(response).await;
    assert_eq!(problem["type"], "orkg:problem:comparison_related_resource_not_found");
}

#[tokio::test]
async fn related_figures_are_scoped_to_their_comparison() {
    let app = app().await;
    let first = create_entity(&app, "/api/comparisons", comparison_body("First")).await;
    let second = create_entity(&app, "/api/comparisons", comparison_body("Second")).await;

    let figure_uri = {
        let response = post_json(
            &app,
            &format!("/api/comparisons/{first}/related-figures"),
            json!({ "label": "Figure 1" }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        location(&response)
    };
    let figure_id = figure_uri.rsplit('/').next().unwrap();

    let response =
        get(&app, &format!("/api/comparisons/{second}/related-figures/{figure_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, &figure_uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "application/vnd.orkg.comparison-related-figure.v1+json"
    );
}

#[tokio::test]
async fn unknown_contribution_is_rejected() {
    let app = app().await;
    let mut body = comparison_body("Speed Comparison");
    body["contributions"] = json!(["R404"]);

    let response = post_json(&app, "/api/comparisons", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let problem = body_json(response).await;
    assert_eq!(problem["type"], "orkg:problem:contribution_not_found");
    assert_eq!(problem["contribution_id"], "R404");
}
