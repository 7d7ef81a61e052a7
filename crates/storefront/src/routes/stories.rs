//! Editorial story route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use tracing::instrument;

use crate::content::Story;
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// Story card for listing grids.
#[derive(Clone)]
pub struct StoryCardView {
    pub slug: String,
    pub headline: String,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    pub image_url: Option<String>,
}

impl From<&Story> for StoryCardView {
    fn from(story: &Story) -> Self {
        Self {
            slug: story.slug.clone(),
            headline: story.display_headline().to_string(),
            excerpt: story.metadata.excerpt.clone(),
            author: story.metadata.author.clone(),
            publish_date: story.metadata.publish_date.as_deref().map(format_date),
            image_url: story
                .metadata
                .featured_image
                .as_ref()
                .map(|img| img.sized(800, 400)),
        }
    }
}

/// Story detail data.
#[derive(Clone)]
pub struct StoryDetailView {
    pub headline: String,
    pub author: Option<String>,
    pub publish_date: Option<String>,
    pub image_url: Option<String>,
    /// Trusted HTML from the content store, rendered verbatim.
    pub content_html: String,
}

impl From<&Story> for StoryDetailView {
    fn from(story: &Story) -> Self {
        Self {
            headline: story.display_headline().to_string(),
            author: story.metadata.author.clone(),
            publish_date: story.metadata.publish_date.as_deref().map(format_date),
            image_url: story
                .metadata
                .featured_image
                .as_ref()
                .map(|img| img.sized(1600, 800)),
            content_html: story.metadata.content.clone(),
        }
    }
}

/// Format a `YYYY-MM-DD` publish date for display; unparsed dates pass
/// through as-is.
fn format_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_or_else(|_| raw.to_string(), |date| date.format("%B %-d, %Y").to_string())
}

/// Number of stories shown on the listing page.
const STORY_LISTING_LIMIT: u32 = 12;

/// Story listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "stories/index.html")]
pub struct StoriesIndexTemplate {
    pub stories: Vec<StoryCardView>,
}

/// Story detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "stories/show.html")]
pub struct StoryShowTemplate {
    pub story: StoryDetailView,
}

/// Display the story listing, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let stories = state.content().list_stories(STORY_LISTING_LIMIT).await?;

    Ok(StoriesIndexTemplate {
        stories: stories.iter().map(StoryCardView::from).collect(),
    }
    .into_response())
}

/// Display a story; unknown slugs render the not-found view.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, AppError> {
    let Some(story) = state.content().get_story(&slug).await? else {
        return Ok(super::not_found_page());
    };

    Ok(StoryShowTemplate {
        story: StoryDetailView::from(&story),
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_publish_dates() {
        assert_eq!(format_date("2024-03-05"), "March 5, 2024");
        assert_eq!(format_date("not a date"), "not a date");
    }
}
