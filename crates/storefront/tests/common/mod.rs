//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use secrecy::SecretString;

use ridgeline_storefront::config::{ContentApiConfig, StorefrontConfig};
use ridgeline_storefront::content::ContentClient;
use ridgeline_storefront::middleware::create_session_layer;
use ridgeline_storefront::routes;
use ridgeline_storefront::state::AppState;

/// The bucket name test mocks are mounted under.
pub const TEST_BUCKET: &str = "test-bucket";

/// Path the content client issues object queries against.
pub const OBJECTS_PATH: &str = "/buckets/test-bucket/objects";

/// Configuration pointing at a mock content API.
pub fn test_config(api_url: &str) -> StorefrontConfig {
    StorefrontConfig {
        host: "127.0.0.1".parse().expect("valid test host"),
        port: 0,
        base_url: "http://localhost:3000".to_string(),
        content: ContentApiConfig {
            api_url: api_url.to_string(),
            bucket: TEST_BUCKET.to_string(),
            read_key: SecretString::from("test-read-key"),
            write_key: None,
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// Content client against a mock content API.
pub fn content_client(api_url: &str) -> ContentClient {
    ContentClient::new(&test_config(api_url).content)
}

/// Full application router against a mock content API.
pub fn app(api_url: &str) -> Router {
    let config = test_config(api_url);
    let state = AppState::new(config.clone());

    routes::routes()
        .with_state(state)
        .layer(create_session_layer(&config))
}
