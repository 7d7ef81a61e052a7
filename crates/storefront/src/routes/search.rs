//! Search route handlers.
//!
//! Two surfaces over one engine: a JSON endpoint for the header dropdown
//! (bounded to the top 8 hits, with the true match count alongside) and a
//! full results page grouped by kind.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use ridgeline_core::image::sized_url;

use crate::filters;
use crate::search::{EntityKind, SearchHit, SearchResults};
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// JSON body of the search API.
#[derive(Debug, Serialize)]
pub struct SearchApiResponse {
    pub results: Vec<SearchHit>,
    pub total: usize,
}

/// JSON body of the search API on unexpected failure.
#[derive(Debug, Serialize)]
pub struct SearchApiError {
    pub error: String,
    pub results: Vec<SearchHit>,
}

/// JSON search endpoint backing the header dropdown.
///
/// Per-kind fetch failures already degrade inside the engine; the only
/// unexpected failure left is a panic in the search task, which maps to the
/// error envelope with a 500.
#[instrument(skip(state))]
pub async fn api(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> Response {
    let engine = state.search().clone();
    let q = query.q.clone();

    match tokio::spawn(async move { engine.quick_search(&q).await }).await {
        Ok(results) => Json(SearchApiResponse {
            results: results.hits,
            total: results.total,
        })
        .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "search task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchApiError {
                    error: "Search failed".to_string(),
                    results: Vec::new(),
                }),
            )
                .into_response()
        }
    }
}

/// A hit prepared for the results page.
#[derive(Clone)]
pub struct SearchHitView {
    pub title: String,
    pub href: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl SearchHitView {
    fn new(hit: &SearchHit, image_width: u32, image_height: u32) -> Self {
        Self {
            title: hit.title.clone(),
            href: hit.href(),
            description: hit.description.clone(),
            image_url: hit
                .image_url
                .as_deref()
                .map(|url| sized_url(url, image_width, image_height)),
        }
    }
}

/// One kind's section on the results page.
#[derive(Clone)]
pub struct SearchSectionView {
    pub label: &'static str,
    pub hits: Vec<SearchHitView>,
}

/// Full search page template.
#[derive(Template, WebTemplate)]
#[template(path = "search/show.html")]
pub struct SearchPageTemplate {
    pub query: String,
    pub total: usize,
    pub sections: Vec<SearchSectionView>,
}

/// Full search results page, grouped by kind.
#[instrument(skip(state))]
pub async fn page(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let results = state.search().search(&query.q).await;

    SearchPageTemplate {
        query: results.query.clone(),
        total: results.total(),
        sections: sections(&results),
    }
}

/// Group ranked hits into labeled page sections, skipping empty kinds.
fn sections(results: &SearchResults) -> Vec<SearchSectionView> {
    let mut sections = Vec::new();

    if !results.bikes.is_empty() {
        sections.push(SearchSectionView {
            label: EntityKind::Bikes.label(),
            hits: results
                .bikes
                .iter()
                .map(|hit| SearchHitView::new(hit, 800, 600))
                .collect(),
        });
    }
    if !results.stories.is_empty() {
        sections.push(SearchSectionView {
            label: EntityKind::Stories.label(),
            hits: results
                .stories
                .iter()
                .map(|hit| SearchHitView::new(hit, 800, 400))
                .collect(),
        });
    }
    if !results.pages.is_empty() {
        sections.push(SearchSectionView {
            label: EntityKind::Pages.label(),
            hits: results
                .pages
                .iter()
                .map(|hit| SearchHitView::new(hit, 800, 300))
                .collect(),
        });
    }

    sections
}
