//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::content::ContentClient;
use crate::search::SearchEngine;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// configuration, the content store client, and the search engine.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    content: ContentClient,
    search: SearchEngine,
}

impl AppState {
    /// Create a new application state from configuration.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let content = ContentClient::new(&config.content);
        let search = SearchEngine::new(content.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                content,
                search,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the content store client.
    #[must_use]
    pub fn content(&self) -> &ContentClient {
        &self.inner.content
    }

    /// Get a reference to the search engine.
    #[must_use]
    pub fn search(&self) -> &SearchEngine {
        &self.inner.search
    }
}
