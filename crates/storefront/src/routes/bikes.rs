//! Bike route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::content::{Bike, Category};
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

/// Bike card data for listing grids and carousels.
#[derive(Clone)]
pub struct BikeCardView {
    pub slug: String,
    pub title: String,
    pub price: String,
    pub sale_price: Option<String>,
    pub on_sale: bool,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl From<&Bike> for BikeCardView {
    fn from(bike: &Bike) -> Self {
        Self {
            slug: bike.slug.clone(),
            title: bike.display_title().to_string(),
            price: bike.metadata.price.clone(),
            sale_price: bike.metadata.sale_price.clone(),
            on_sale: bike.metadata.on_sale,
            image_url: bike
                .metadata
                .main_image
                .as_ref()
                .map(|img| img.sized(800, 600)),
            category: bike
                .metadata
                .category
                .as_ref()
                .and_then(|c| c.display_title())
                .map(String::from),
        }
    }
}

/// Category data for the filter sidebar.
#[derive(Clone)]
pub struct CategoryFilterView {
    pub slug: String,
    pub name: String,
    pub active: bool,
}

impl CategoryFilterView {
    fn new(category: &Category, selected: Option<&str>) -> Self {
        Self {
            slug: category.slug.clone(),
            name: category.display_name().to_string(),
            active: selected == Some(category.slug.as_str()),
        }
    }
}

/// Bike detail data.
#[derive(Clone)]
pub struct BikeDetailView {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub price: String,
    pub sale_price: Option<String>,
    pub on_sale: bool,
    pub main_image_url: Option<String>,
    pub gallery_urls: Vec<String>,
    pub sizes: Vec<String>,
    pub frame_material: Option<String>,
    pub wheel_size: Option<String>,
    pub weight: Option<String>,
    pub features: Vec<String>,
    pub category: Option<String>,
}

impl From<&Bike> for BikeDetailView {
    fn from(bike: &Bike) -> Self {
        Self {
            slug: bike.slug.clone(),
            title: bike.display_title().to_string(),
            description: bike.metadata.description.clone(),
            price: bike.metadata.price.clone(),
            sale_price: bike.metadata.sale_price.clone(),
            on_sale: bike.metadata.on_sale,
            main_image_url: bike
                .metadata
                .main_image
                .as_ref()
                .map(|img| img.sized(1200, 900)),
            gallery_urls: bike
                .metadata
                .gallery_images
                .iter()
                .map(|img| img.sized(600, 450))
                .collect(),
            sizes: bike.sizes(),
            frame_material: bike.metadata.frame_material.clone(),
            wheel_size: bike.metadata.wheel_size.clone(),
            weight: bike.metadata.weight.clone(),
            features: bike.features(),
            category: bike
                .metadata
                .category
                .as_ref()
                .and_then(|c| c.display_title())
                .map(String::from),
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub category: Option<String>,
    pub sale: Option<String>,
}

/// Detail page query parameters.
#[derive(Debug, Deserialize)]
pub struct DetailQuery {
    /// User-facing message (e.g. size-selection feedback).
    pub message: Option<String>,
}

/// Bike listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "bikes/index.html")]
pub struct BikesIndexTemplate {
    pub heading: String,
    pub intro: Option<String>,
    pub bikes: Vec<BikeCardView>,
    pub categories: Vec<CategoryFilterView>,
    pub sale_only: bool,
}

/// Bike detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "bikes/show.html")]
pub struct BikeShowTemplate {
    pub bike: BikeDetailView,
    pub message: Option<String>,
}

/// Display the bike listing, optionally filtered by category and sale flag.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Response, AppError> {
    let sale_only = query.sale.as_deref() == Some("true");

    // The category sidebar degrades to empty on failure; the bike list is
    // the page's reason to exist, so its failure propagates.
    let (bikes, categories, selected) = match &query.category {
        Some(slug) => tokio::join!(
            state.content().list_bikes_by_category(slug),
            state.content().list_categories(),
            state.content().get_category(slug),
        ),
        None => {
            let (bikes, categories) = tokio::join!(
                state.content().list_bikes(),
                state.content().list_categories(),
            );
            (bikes, categories, Ok(None))
        }
    };

    let bikes = bikes?;
    let categories = categories.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to fetch categories for sidebar");
        Vec::new()
    });
    let selected = selected.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to fetch selected category");
        None
    });

    let bikes: Vec<BikeCardView> = bikes
        .iter()
        .filter(|b| !sale_only || b.metadata.on_sale)
        .map(BikeCardView::from)
        .collect();

    let heading = selected.as_ref().map_or_else(
        || {
            if sale_only {
                "Sale Bikes".to_string()
            } else {
                "All Bikes".to_string()
            }
        },
        |category| format!("{} Bikes", category.display_name()),
    );
    let intro = selected
        .as_ref()
        .and_then(|category| category.metadata.description.clone());

    let categories = categories
        .iter()
        .map(|c| CategoryFilterView::new(c, query.category.as_deref()))
        .collect();

    Ok(BikesIndexTemplate {
        heading,
        intro,
        bikes,
        categories,
        sale_only,
    }
    .into_response())
}

/// Display the sale listing.
#[instrument(skip(state))]
pub async fn sale(State(state): State<AppState>) -> Result<Response, AppError> {
    let (bikes, categories) = tokio::join!(
        state.content().list_sale_bikes(),
        state.content().list_categories(),
    );

    let bikes = bikes?;
    let categories = categories.unwrap_or_else(|e| {
        tracing::error!(error = %e, "failed to fetch categories for sidebar");
        Vec::new()
    });

    Ok(BikesIndexTemplate {
        heading: "Sale Bikes".to_string(),
        intro: Some("Save up to 45% on select bikes for a limited time.".to_string()),
        bikes: bikes.iter().map(BikeCardView::from).collect(),
        categories: categories
            .iter()
            .map(|c| CategoryFilterView::new(c, None))
            .collect(),
        sale_only: true,
    }
    .into_response())
}

/// Display a bike detail page; unknown slugs render the not-found view.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<Response, AppError> {
    let Some(bike) = state.content().get_bike(&slug).await? else {
        return Ok(super::not_found_page());
    };

    Ok(BikeShowTemplate {
        bike: BikeDetailView::from(&bike),
        message: query.message,
    }
    .into_response())
}
