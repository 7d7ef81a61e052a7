//! Cart flow integration tests: form posts, session persistence, size rule.

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount a bike detail lookup for `slug`.
async fn mount_bike(server: &MockServer, slug: &str, sizes: &str) {
    Mock::given(method("GET"))
        .and(path(common::OBJECTS_PATH))
        .and(query_param(
            "query",
            json!({"type": "bikes", "slug": slug}).to_string(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": {
                "id": format!("id-{slug}"),
                "slug": slug,
                "title": "Fuel EX",
                "type": "bikes",
                "metadata": {
                    "model_name": "Fuel EX",
                    "price": "$1,299.00",
                    "sizes_available": sizes
                }
            }
        })))
        .mount(server)
        .await;
}

/// Extract the session cookie pair from a response.
fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("session cookie set")
        .to_string()
}

async fn post_form(app: &Router, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    app.clone()
        .oneshot(builder.body(Body::from(body.to_string())).expect("request builds"))
        .await
        .expect("request succeeds")
}

async fn get_with_cookie(app: &Router, uri: &str, cookie: &str) -> Response<Body> {
    app.clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header(header::COOKIE, cookie)
                .body(Body::empty())
                .expect("request builds"),
        )
        .await
        .expect("request succeeds")
}

async fn body_string(response: Response<Body>) -> String {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

#[tokio::test]
async fn add_then_count_reflects_cart_contents() {
    let server = MockServer::start().await;
    mount_bike(&server, "fuel-ex", "S, M, L").await;
    let app = common::app(&server.uri());

    let response = post_form(&app, "/cart/add", "slug=fuel-ex&size=M", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok()),
        Some("/cart")
    );
    let cookie = session_cookie(&response);

    // same (id, size) again: merges, quantity 2
    let response = post_form(&app, "/cart/add", "slug=fuel-ex&size=M", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let count = body_string(get_with_cookie(&app, "/cart/count", &cookie).await).await;
    assert!(count.contains('2'), "badge shows merged quantity: {count}");

    let cart_page = body_string(get_with_cookie(&app, "/cart", &cookie).await).await;
    assert!(cart_page.contains("Fuel EX"));
    assert!(cart_page.contains("Size: M"));
    assert!(cart_page.contains("$2,598.00"));
}

#[tokio::test]
async fn multi_size_bike_requires_a_size_choice() {
    let server = MockServer::start().await;
    mount_bike(&server, "fuel-ex", "S, M, L").await;
    let app = common::app(&server.uri());

    let response = post_form(&app, "/cart/add", "slug=fuel-ex", None).await;

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .expect("redirect target");
    assert!(location.starts_with("/bikes/fuel-ex?message="));
    assert!(location.contains("select%20a%20size"));
}

#[tokio::test]
async fn single_size_bike_adds_without_size() {
    let server = MockServer::start().await;
    mount_bike(&server, "marlin", "One Size").await;
    let app = common::app(&server.uri());

    let response = post_form(&app, "/cart/add", "slug=marlin", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = session_cookie(&response);

    let cart_page = body_string(get_with_cookie(&app, "/cart", &cookie).await).await;
    assert!(cart_page.contains("Fuel EX"));
    assert!(!cart_page.contains("Size:"));
}

#[tokio::test]
async fn update_remove_and_clear_round_trip() {
    let server = MockServer::start().await;
    mount_bike(&server, "fuel-ex", "S, M, L").await;
    let app = common::app(&server.uri());

    let response = post_form(&app, "/cart/add", "slug=fuel-ex&size=M", None).await;
    let cookie = session_cookie(&response);

    // quantity set exactly
    let response = post_form(
        &app,
        "/cart/update",
        "id=id-fuel-ex&size=M&quantity=4",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let count = body_string(get_with_cookie(&app, "/cart/count", &cookie).await).await;
    assert!(count.contains('4'), "badge shows updated quantity: {count}");

    // zero removes the line
    let response = post_form(
        &app,
        "/cart/update",
        "id=id-fuel-ex&size=M&quantity=0",
        Some(&cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cart_page = body_string(get_with_cookie(&app, "/cart", &cookie).await).await;
    assert!(cart_page.contains("Your cart is empty"));

    // refill, then clear
    post_form(&app, "/cart/add", "slug=fuel-ex&size=S", Some(&cookie)).await;
    let response = post_form(&app, "/cart/clear", "", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cart_page = body_string(get_with_cookie(&app, "/cart", &cookie).await).await;
    assert!(cart_page.contains("Your cart is empty"));
}

#[tokio::test]
async fn unknown_bike_renders_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(common::OBJECTS_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "No objects found"
        })))
        .mount(&server)
        .await;
    let app = common::app(&server.uri());

    let response = post_form(&app, "/cart/add", "slug=ghost-bike", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
