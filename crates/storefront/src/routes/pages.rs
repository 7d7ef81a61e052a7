//! Content-store backed static page handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tracing::instrument;

use crate::content::Page;
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// Static page data.
#[derive(Clone)]
pub struct PageView {
    pub title: String,
    /// Trusted HTML from the content store, rendered verbatim.
    pub content_html: String,
    pub hero_url: Option<String>,
    pub meta_description: Option<String>,
}

impl From<&Page> for PageView {
    fn from(page: &Page) -> Self {
        Self {
            title: page.display_title().to_string(),
            content_html: page.metadata.content.clone(),
            hero_url: page
                .metadata
                .hero_image
                .as_ref()
                .map(|img| img.sized(2000, 600)),
            meta_description: page.metadata.meta_description.clone(),
        }
    }
}

/// Static page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/show.html")]
pub struct PageTemplate {
    pub page: PageView,
}

/// Display the about page.
#[instrument(skip(state))]
pub async fn about(State(state): State<AppState>) -> Result<Response, AppError> {
    render(state, "about").await
}

/// Display the support page.
#[instrument(skip(state))]
pub async fn support(State(state): State<AppState>) -> Result<Response, AppError> {
    render(state, "support").await
}

/// Render a content-store page; unknown slugs get the not-found view.
async fn render(state: AppState, slug: &str) -> Result<Response, AppError> {
    let Some(page) = state.content().get_page(slug).await? else {
        return Ok(super::not_found_page());
    };

    Ok(PageTemplate {
        page: PageView::from(&page),
    }
    .into_response())
}
