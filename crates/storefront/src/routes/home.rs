//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::content::{Category, Story};
use crate::filters;
use crate::routes::bikes::BikeCardView;
use crate::routes::stories::StoryCardView;
use crate::state::AppState;

/// Category tile for the home page grid.
#[derive(Clone)]
pub struct CategoryCardView {
    pub slug: String,
    pub name: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

impl From<&Category> for CategoryCardView {
    fn from(category: &Category) -> Self {
        Self {
            slug: category.slug.clone(),
            name: category.display_name().to_string(),
            description: category.metadata.description.clone(),
            image_url: category
                .metadata
                .category_image
                .as_ref()
                .map(|img| img.sized(800, 600)),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub sale_bikes: Vec<BikeCardView>,
    pub categories: Vec<CategoryCardView>,
    pub featured_bikes: Vec<BikeCardView>,
    pub stories: Vec<StoryCardView>,
}

/// Number of stories featured on the home page.
const FEATURED_STORY_COUNT: u32 = 3;

/// Display the home page.
///
/// All four content sections are fetched concurrently; a section whose
/// fetch fails renders empty rather than taking the page down.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let (bikes, categories, stories, sale_bikes) = tokio::join!(
        state.content().list_bikes(),
        state.content().list_categories(),
        state.content().list_stories(FEATURED_STORY_COUNT),
        state.content().list_sale_bikes(),
    );

    let featured_bikes = bikes.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to fetch featured bikes");
        Vec::new()
    });
    let categories = categories.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to fetch categories");
        Vec::new()
    });
    let stories: Vec<Story> = stories.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to fetch stories");
        Vec::new()
    });
    let sale_bikes = sale_bikes.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to fetch sale bikes");
        Vec::new()
    });

    HomeTemplate {
        sale_bikes: sale_bikes.iter().map(BikeCardView::from).collect(),
        categories: categories.iter().map(CategoryCardView::from).collect(),
        featured_bikes: featured_bikes.iter().map(BikeCardView::from).collect(),
        stories: stories.iter().map(StoryCardView::from).collect(),
    }
}
