//! Content store API client.
//!
//! # Architecture
//!
//! - The content store is the source of truth - no local sync, direct API
//!   calls per request
//! - Queries name an entity kind plus optional metadata filters, a property
//!   projection, a reference-expansion depth, a sort key, and a limit
//! - A 404 from the store is not an error at this boundary: list operations
//!   return an empty vec and lookups return `None`. Anything else is logged
//!   and propagated; callers do not retry
//!
//! # Example
//!
//! ```rust,ignore
//! use ridgeline_storefront::content::ContentClient;
//!
//! let client = ContentClient::new(&config.content);
//!
//! // Fetch a bike; `None` means the slug does not exist
//! let bike = client.get_bike("fuel-ex").await?;
//!
//! // Unknown category slugs yield an empty list, not an error
//! let bikes = client.list_bikes_by_category("mountain").await?;
//! ```

pub mod types;

pub use types::{Bike, Category, CategoryRef, ContentObject, Page, Story};

use std::sync::Arc;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::instrument;

use crate::config::ContentApiConfig;

/// Errors from the content store API.
#[derive(Debug, Error)]
pub enum ContentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store returned a non-success status other than 404.
    #[error("content API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not parse.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The queried object does not exist.
    ///
    /// Normalized away by the public operations; exposed for completeness.
    #[error("not found")]
    NotFound,
}

/// Properties requested for every object fetch.
const OBJECT_PROPS: &str = "id,slug,title,type,metadata,created_at,modified_at";

/// Candidate bound for search fetches (per entity kind).
pub const SEARCH_CANDIDATE_LIMIT: u32 = 20;

/// List-query response envelope.
#[derive(Debug, serde::Deserialize)]
struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    objects: Vec<T>,
}

/// Single-object response envelope.
#[derive(Debug, serde::Deserialize)]
struct ObjectEnvelope<T> {
    object: T,
}

/// Client for the headless content store.
///
/// Cheaply cloneable; all state lives behind an `Arc`.
#[derive(Clone)]
pub struct ContentClient {
    inner: Arc<ContentClientInner>,
}

struct ContentClientInner {
    client: reqwest::Client,
    objects_url: String,
    read_key: String,
}

impl ContentClient {
    /// Create a new content store client.
    #[must_use]
    pub fn new(config: &ContentApiConfig) -> Self {
        let objects_url = format!(
            "{}/buckets/{}/objects",
            config.api_url.trim_end_matches('/'),
            config.bucket
        );

        Self {
            inner: Arc::new(ContentClientInner {
                client: reqwest::Client::new(),
                objects_url,
                read_key: config.read_key.expose_secret().to_string(),
            }),
        }
    }

    /// Execute an object query and parse the response body as `T`.
    async fn execute<T: DeserializeOwned>(
        &self,
        query: &Value,
        depth: Option<u8>,
        sort: Option<&str>,
        limit: Option<u32>,
    ) -> Result<T, ContentError> {
        let mut params: Vec<(&str, String)> = vec![
            ("query", query.to_string()),
            ("read_key", self.inner.read_key.clone()),
            ("props", OBJECT_PROPS.to_string()),
        ];
        if let Some(depth) = depth {
            params.push(("depth", depth.to_string()));
        }
        if let Some(sort) = sort {
            params.push(("sort", sort.to_string()));
        }
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }

        let response = self
            .inner
            .client
            .get(&self.inner.objects_url)
            .query(&params)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound);
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "content API returned non-success status"
            );
            return Err(ContentError::Status {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse content API response"
            );
            ContentError::Parse(e)
        })
    }

    /// Run a list query, logging any failure other than not-found.
    async fn find<T: DeserializeOwned>(
        &self,
        query: &Value,
        depth: Option<u8>,
        sort: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Vec<T>, ContentError> {
        let result = self
            .execute::<ListEnvelope<T>>(query, depth, sort, limit)
            .await;
        if let Err(e) = &result
            && !matches!(e, ContentError::NotFound)
        {
            tracing::error!(query = %query, error = %e, "content list fetch failed");
        }
        result.map(|envelope| envelope.objects)
    }

    /// Run a single-object query, logging any failure other than not-found.
    async fn find_one<T: DeserializeOwned>(
        &self,
        query: &Value,
        depth: Option<u8>,
    ) -> Result<T, ContentError> {
        let result = self.execute::<ObjectEnvelope<T>>(query, depth, None, None).await;
        if let Err(e) = &result
            && !matches!(e, ContentError::NotFound)
        {
            tracing::error!(query = %query, error = %e, "content object fetch failed");
        }
        result.map(|envelope| envelope.object)
    }

    // =========================================================================
    // Bikes
    // =========================================================================

    /// Fetch all bikes with their categories expanded.
    ///
    /// # Errors
    ///
    /// Returns an error on any failure other than not-found (which yields an
    /// empty list).
    #[instrument(skip(self))]
    pub async fn list_bikes(&self) -> Result<Vec<Bike>, ContentError> {
        list_or_empty(self.find(&json!({"type": "bikes"}), Some(1), None, None).await)
    }

    /// Fetch a bounded bike candidate set for search.
    ///
    /// # Errors
    ///
    /// Same policy as [`Self::list_bikes`].
    #[instrument(skip(self))]
    pub async fn list_bikes_limited(&self, limit: u32) -> Result<Vec<Bike>, ContentError> {
        list_or_empty(
            self.find(&json!({"type": "bikes"}), Some(1), None, Some(limit))
                .await,
        )
    }

    /// Fetch the bikes in a category, resolving the category slug first.
    ///
    /// An unknown category slug yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Same policy as [`Self::list_bikes`].
    #[instrument(skip(self))]
    pub async fn list_bikes_by_category(
        &self,
        category_slug: &str,
    ) -> Result<Vec<Bike>, ContentError> {
        let Some(category) = self.get_category(category_slug).await? else {
            return Ok(Vec::new());
        };

        list_or_empty(
            self.find(
                &json!({"type": "bikes", "metadata.category": category.id}),
                Some(1),
                None,
                None,
            )
            .await,
        )
    }

    /// Fetch all bikes currently flagged as on sale.
    ///
    /// # Errors
    ///
    /// Same policy as [`Self::list_bikes`].
    #[instrument(skip(self))]
    pub async fn list_sale_bikes(&self) -> Result<Vec<Bike>, ContentError> {
        list_or_empty(
            self.find(
                &json!({"type": "bikes", "metadata.on_sale": true}),
                Some(1),
                None,
                None,
            )
            .await,
        )
    }

    /// Fetch a single bike by slug; `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error on any failure other than not-found.
    #[instrument(skip(self))]
    pub async fn get_bike(&self, slug: &str) -> Result<Option<Bike>, ContentError> {
        object_or_none(
            self.find_one(&json!({"type": "bikes", "slug": slug}), Some(1))
                .await,
        )
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Fetch all categories.
    ///
    /// # Errors
    ///
    /// Same policy as [`Self::list_bikes`].
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ContentError> {
        list_or_empty(self.find(&json!({"type": "categories"}), None, None, None).await)
    }

    /// Fetch a single category by slug; `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error on any failure other than not-found.
    #[instrument(skip(self))]
    pub async fn get_category(&self, slug: &str) -> Result<Option<Category>, ContentError> {
        object_or_none(
            self.find_one(&json!({"type": "categories", "slug": slug}), None)
                .await,
        )
    }

    // =========================================================================
    // Stories
    // =========================================================================

    /// Fetch the latest stories, newest first.
    ///
    /// # Errors
    ///
    /// Same policy as [`Self::list_bikes`].
    #[instrument(skip(self))]
    pub async fn list_stories(&self, limit: u32) -> Result<Vec<Story>, ContentError> {
        list_or_empty(
            self.find(
                &json!({"type": "stories"}),
                Some(1),
                Some("-created_at"),
                Some(limit),
            )
            .await,
        )
    }

    /// Fetch a single story by slug; `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error on any failure other than not-found.
    #[instrument(skip(self))]
    pub async fn get_story(&self, slug: &str) -> Result<Option<Story>, ContentError> {
        object_or_none(
            self.find_one(&json!({"type": "stories", "slug": slug}), None)
                .await,
        )
    }

    // =========================================================================
    // Pages
    // =========================================================================

    /// Fetch a bounded static-page candidate set for search.
    ///
    /// # Errors
    ///
    /// Same policy as [`Self::list_bikes`].
    #[instrument(skip(self))]
    pub async fn list_pages(&self, limit: u32) -> Result<Vec<Page>, ContentError> {
        list_or_empty(
            self.find(&json!({"type": "pages"}), None, None, Some(limit))
                .await,
        )
    }

    /// Fetch a single static page by slug; `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error on any failure other than not-found.
    #[instrument(skip(self))]
    pub async fn get_page(&self, slug: &str) -> Result<Option<Page>, ContentError> {
        object_or_none(
            self.find_one(&json!({"type": "pages", "slug": slug}), None)
                .await,
        )
    }
}

/// Map a not-found list result to an empty list.
fn list_or_empty<T>(result: Result<Vec<T>, ContentError>) -> Result<Vec<T>, ContentError> {
    match result {
        Err(ContentError::NotFound) => Ok(Vec::new()),
        other => other,
    }
}

/// Map a not-found object result to `None`.
fn object_or_none<T>(result: Result<T, ContentError>) -> Result<Option<T>, ContentError> {
    match result {
        Ok(object) => Ok(Some(object)),
        Err(ContentError::NotFound) => Ok(None),
        Err(e) => Err(e),
    }
}
