//! Dataset and benchmark endpoint integration tests.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, body_json, get, RESEARCH_PROBLEM};

#[tokio::test]
async fn datasets_are_listed_for_a_research_problem() {
    let app = app().await;
    let page = body_json(
        get(&app, &format!("/api/datasets/research-problem/{RESEARCH_PROBLEM}")).await,
    )
    .await;
    assert_eq!(page["page"]["total_elements"], 2);
    assert_eq!(page["content"][0]["label"], "SQuAD");
    assert_eq!(page["content"][0]["total_papers"], 3);
    assert_eq!(page["content"][1]["label"], "HotpotQA");
}

#[tokio::test]
async fn unknown_research_problem_yields_problem_details() {
    let app = app().await;
    let response = get(&app, "/api/datasets/research-problem/R404").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let problem = body_json(response).await;
    assert_eq!(problem["type"], "orkg:problem:research_problem_not_found");
    assert_eq!(problem["research_problem_id"], "R404");
}

#[tokio::test]
async fn research_problems_are_listed_for_a_dataset() {
    let app = app().await;
    let page = body_json(get(&app, "/api/datasets/R789/problems").await).await;
    assert_eq!(page["page"]["total_elements"], 1);
    assert_eq!(page["content"][0]["id"], RESEARCH_PROBLEM);
    assert_eq!(page["content"][0]["label"], "Question Answering");

    let response = get(&app, "/api/datasets/R404/problems").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let problem = body_json(response).await;
    assert_eq!(problem["type"], "orkg:problem:dataset_not_found");
}

#[tokio::test]
async fn benchmark_summaries_by_research_field() {
    let app = app().await;
    let page = body_json(get(&app, "/api/benchmarks/summary/research-field/R11").await).await;
    assert_eq!(page["page"]["total_elements"], 1);
    let summary = &page["content"][0];
    assert_eq!(summary["research_problem"]["label"], "Question Answering");
    assert_eq!(summary["total_papers"], 5);
    assert_eq!(summary["total_datasets"], 2);

    // Sibling fields carry no benchmarks.
    let page = body_json(get(&app, "/api/benchmarks/summary/research-field/R12").await).await;
    assert_eq!(page["page"]["total_elements"], 0);

    let response = get(&app, "/api/benchmarks/summary/research-field/R404").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let problem = body_json(response).await;
    assert_eq!(problem["type"], "orkg:problem:research_field_not_found");
}

#[tokio::test]
async fn benchmark_summaries_across_all_fields() {
    let app = app().await;
    let page = body_json(get(&app, "/api/benchmarks/summary").await).await;
    assert_eq!(page["page"]["total_elements"], 1);
    assert_eq!(page["content"][0]["research_fields"], json!([
        { "id": "R11", "label": "Computer Science" }
    ]));
}
