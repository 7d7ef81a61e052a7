//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                    - Home page
//! GET  /health              - Health check
//!
//! # Bikes
//! GET  /bikes               - Bike listing (?category=slug, ?sale=true)
//! GET  /bikes/{slug}        - Bike detail
//! GET  /sale                - Sale bike listing
//!
//! # Editorial
//! GET  /stories             - Story listing
//! GET  /stories/{slug}      - Story detail
//! GET  /about               - About page (content-store backed)
//! GET  /support             - Support page (content-store backed)
//!
//! # Cart
//! GET  /cart                - Cart page
//! POST /cart/add            - Add to cart (redirects back)
//! POST /cart/update         - Set line quantity (redirects to /cart)
//! POST /cart/remove         - Remove line (redirects to /cart)
//! POST /cart/clear          - Empty the cart (redirects to /cart)
//! GET  /cart/count          - Cart count badge (fragment)
//!
//! # Search
//! GET  /search              - Full search results page
//! GET  /api/search          - JSON search endpoint (rate limited)
//! ```

pub mod bikes;
pub mod cart;
pub mod home;
pub mod pages;
pub mod search;
pub mod stories;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};

use crate::filters;
use crate::middleware;
use crate::state::AppState;

/// Standard not-found page with suggested links.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate;

/// Render the standard not-found page with a 404 status.
#[must_use]
pub fn not_found_page() -> Response {
    (StatusCode::NOT_FOUND, NotFoundTemplate).into_response()
}

/// Fallback handler for unknown paths.
pub async fn not_found() -> Response {
    not_found_page()
}

/// Create the bike routes router.
pub fn bike_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(bikes::index))
        .route("/{slug}", get(bikes::show))
}

/// Create the story routes router.
pub fn story_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stories::index))
        .route("/{slug}", get(stories::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Bike routes
        .nest("/bikes", bike_routes())
        .route("/sale", get(bikes::sale))
        // Editorial routes
        .nest("/stories", story_routes())
        .route("/about", get(pages::about))
        .route("/support", get(pages::support))
        // Cart routes
        .nest("/cart", cart_routes())
        // Search
        .route("/search", get(search::page))
        .route(
            "/api/search",
            get(search::api).layer(middleware::search_api_rate_limiter()),
        )
        // Everything else is a 404 page
        .fallback(not_found)
}
