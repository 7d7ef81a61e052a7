//! Search engine and search API integration tests.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ridgeline_storefront::search::{EntityKind, SearchEngine};

fn bike_json(id: &str, slug: &str, model_name: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "title": model_name,
        "type": "bikes",
        "metadata": {
            "model_name": model_name,
            "description": "A bike for going fast in the dirt",
            "price": "$1,299.00",
            "category": {
                "id": "c1",
                "slug": "mountain",
                "title": "Mountain",
                "metadata": { "name": "Mountain Bikes" }
            }
        }
    })
}

fn story_json(id: &str, slug: &str, headline: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "title": headline,
        "type": "stories",
        "metadata": {
            "headline": headline,
            "excerpt": "Notes from the trail",
            "author": "Jules Verne"
        }
    })
}

/// Mount a kind's list response, keyed by its `query` parameter.
async fn mount_kind(server: &MockServer, kind: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(common::OBJECTS_PATH))
        .and(query_param("query", json!({"type": kind}).to_string()))
        .respond_with(response)
        .mount(server)
        .await;
}

fn objects(objects: Vec<Value>) -> ResponseTemplate {
    let total = objects.len();
    ResponseTemplate::new(200).set_body_json(json!({"objects": objects, "total": total}))
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({"message": "No objects found"}))
}

async fn engine(server: &MockServer) -> SearchEngine {
    SearchEngine::new(common::content_client(&server.uri()))
}

// =============================================================================
// Engine behavior
// =============================================================================

#[tokio::test]
async fn short_query_returns_empty_without_any_fetch() {
    let server = MockServer::start().await;
    let engine = engine(&server).await;

    let quick = engine.quick_search("f").await;
    assert!(quick.hits.is_empty());
    assert_eq!(quick.total, 0);

    let full = engine.search("  x  ").await;
    assert!(full.is_empty());

    let requests = server.received_requests().await.expect("recording on");
    assert!(requests.is_empty(), "no fetch may be issued below the floor");
}

#[tokio::test]
async fn matches_rank_exact_before_prefix_before_substring() {
    let server = MockServer::start().await;
    mount_kind(
        &server,
        "bikes",
        objects(vec![
            bike_json("b1", "fuel-ex-8", "Fuel EX 8"),
            bike_json("b2", "fuel-ex", "Fuel EX"),
            bike_json("b3", "procaliber", "Procaliber"),
        ]),
    )
    .await;
    mount_kind(&server, "stories", not_found()).await;
    mount_kind(&server, "pages", not_found()).await;

    let results = engine(&server).await.quick_search("fuel ex").await;

    let titles: Vec<&str> = results.hits.iter().map(|h| h.title.as_str()).collect();
    // "Procaliber" does not match "fuel ex" in any field and is filtered out
    assert_eq!(titles, vec!["Fuel EX", "Fuel EX 8"]);
    assert_eq!(results.total, 2);
}

#[tokio::test]
async fn category_title_matches_count_for_bikes() {
    let server = MockServer::start().await;
    mount_kind(
        &server,
        "bikes",
        objects(vec![bike_json("b1", "fuel-ex", "Fuel EX")]),
    )
    .await;
    mount_kind(&server, "stories", not_found()).await;
    mount_kind(&server, "pages", not_found()).await;

    // matches only via the expanded category display title
    let results = engine(&server).await.quick_search("mountain bikes").await;

    assert_eq!(results.total, 1);
    let hit = results.hits.first().expect("one hit");
    assert_eq!(hit.kind, EntityKind::Bikes);
    assert_eq!(hit.title, "Fuel EX");
}

#[tokio::test]
async fn quick_results_cap_at_eight_with_true_total() {
    let server = MockServer::start().await;
    let bikes = (0..12)
        .map(|i| bike_json(&format!("b{i}"), &format!("fuel-{i}"), &format!("Fuel {i}")))
        .collect();
    mount_kind(&server, "bikes", objects(bikes)).await;
    mount_kind(&server, "stories", not_found()).await;
    mount_kind(&server, "pages", not_found()).await;

    let results = engine(&server).await.quick_search("fuel").await;

    assert_eq!(results.hits.len(), 8);
    assert_eq!(results.total, 12);
}

#[tokio::test]
async fn one_kind_failing_does_not_block_the_others() {
    let server = MockServer::start().await;
    mount_kind(
        &server,
        "bikes",
        objects(vec![bike_json("b1", "fuel-ex", "Fuel EX")]),
    )
    .await;
    // stories hard-fails, pages has no matches
    mount_kind(
        &server,
        "stories",
        ResponseTemplate::new(500).set_body_string("upstream exploded"),
    )
    .await;
    mount_kind(&server, "pages", not_found()).await;

    let results = engine(&server).await.search("fuel").await;

    assert_eq!(results.bikes.len(), 1);
    assert!(results.stories.is_empty());
    assert!(results.pages.is_empty());
    assert_eq!(results.total(), 1);
}

#[tokio::test]
async fn full_results_group_by_kind() {
    let server = MockServer::start().await;
    mount_kind(
        &server,
        "bikes",
        objects(vec![bike_json("b1", "fuel-ex", "Fuel EX")]),
    )
    .await;
    mount_kind(
        &server,
        "stories",
        objects(vec![story_json("s1", "fuel-story", "Fueling Long Rides")]),
    )
    .await;
    mount_kind(&server, "pages", not_found()).await;

    let results = engine(&server).await.search("fuel").await;

    assert_eq!(results.bikes.len(), 1);
    assert_eq!(results.stories.len(), 1);
    assert!(results.pages.is_empty());
    assert_eq!(results.total(), 2);
    assert_eq!(results.query, "fuel");
}

// =============================================================================
// JSON API surface
// =============================================================================

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("x-forwarded-for", "203.0.113.7")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");

    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let value = serde_json::from_slice(&bytes).expect("body is JSON");
    (status, value)
}

#[tokio::test]
async fn api_returns_results_and_total() {
    let server = MockServer::start().await;
    mount_kind(
        &server,
        "bikes",
        objects(vec![
            bike_json("b1", "fuel-ex", "Fuel EX"),
            bike_json("b2", "fuel-ex-8", "Fuel EX 8"),
        ]),
    )
    .await;
    mount_kind(&server, "stories", not_found()).await;
    mount_kind(&server, "pages", not_found()).await;

    let app = common::app(&server.uri());
    let (status, body) = get_json(&app, "/api/search?q=fuel%20ex").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["title"], "Fuel EX");
    assert_eq!(results[0]["kind"], "bikes");
    assert_eq!(results[0]["slug"], "fuel-ex");
    assert!(results[0]["id"].is_string());
}

#[tokio::test]
async fn api_short_query_is_empty_and_issues_no_fetch() {
    let server = MockServer::start().await;
    let app = common::app(&server.uri());

    let (status, body) = get_json(&app, "/api/search?q=f").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 0);
    assert_eq!(body["results"].as_array().expect("results array").len(), 0);

    let requests = server.received_requests().await.expect("recording on");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn api_degrades_when_one_kind_is_missing() {
    let server = MockServer::start().await;
    mount_kind(
        &server,
        "bikes",
        objects(vec![bike_json("b1", "fuel-ex", "Fuel EX")]),
    )
    .await;
    mount_kind(&server, "stories", not_found()).await;
    mount_kind(&server, "pages", not_found()).await;

    let app = common::app(&server.uri());
    let (status, body) = get_json(&app, "/api/search?q=fuel").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn search_page_renders_grouped_results() {
    let server = MockServer::start().await;
    mount_kind(
        &server,
        "bikes",
        objects(vec![bike_json("b1", "fuel-ex", "Fuel EX")]),
    )
    .await;
    mount_kind(&server, "stories", not_found()).await;
    mount_kind(&server, "pages", not_found()).await;

    let app = common::app(&server.uri());
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/search?q=fuel")
                .header("x-forwarded-for", "203.0.113.7")
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("Fuel EX"));
    assert!(html.contains("Bikes (1)"));
}
