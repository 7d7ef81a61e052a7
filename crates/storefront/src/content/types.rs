//! Typed content objects and per-kind metadata.
//!
//! The content store is schemaless on the wire - every object is an envelope
//! of `id`/`slug`/`title` plus a free-form `metadata` record. Here each kind
//! gets a fixed metadata struct so malformed external data is rejected at the
//! gateway boundary instead of leaking untyped into rendering logic.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use ridgeline_core::Image;

/// Common envelope for every object in the content store.
///
/// `M` is the kind-specific metadata record. Objects are immutable from this
/// system's perspective; the content store owns all mutation.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentObject<M> {
    /// Opaque unique identifier assigned by the content store.
    pub id: String,
    /// URL-safe identifier, unique per kind.
    pub slug: String,
    pub title: String,
    /// Entity kind discriminator (`bikes`, `categories`, `stories`, `pages`).
    #[serde(default, rename = "type")]
    pub kind: String,
    pub metadata: M,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
}

pub type Bike = ContentObject<BikeMetadata>;
pub type Category = ContentObject<CategoryMetadata>;
pub type Story = ContentObject<StoryMetadata>;
pub type Page = ContentObject<PageMetadata>;

/// A category reference on a bike.
///
/// At reference-expansion depth 0 the store returns the raw category id; at
/// depth 1 it embeds the full category object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryRef {
    Expanded(Box<Category>),
    Id(String),
}

impl CategoryRef {
    /// The referenced category's id, whether or not it was expanded.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Expanded(category) => &category.id,
            Self::Id(id) => id,
        }
    }

    /// The category's display title, if the reference was expanded.
    #[must_use]
    pub fn display_title(&self) -> Option<&str> {
        match self {
            Self::Expanded(category) => Some(category.display_name()),
            Self::Id(_) => None,
        }
    }
}

/// Metadata for a bike product.
#[derive(Debug, Clone, Deserialize)]
pub struct BikeMetadata {
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Currency-formatted display price, e.g. `"$1,299.00"`.
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub sale_price: Option<String>,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default)]
    pub main_image: Option<Image>,
    #[serde(default)]
    pub gallery_images: Vec<Image>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub frame_material: Option<String>,
    #[serde(default)]
    pub wheel_size: Option<String>,
    #[serde(default)]
    pub weight: Option<String>,
    /// Comma-separated size list, e.g. `"S, M, L, XL"`.
    #[serde(default)]
    pub sizes_available: Option<String>,
    /// Newline-separated feature list.
    #[serde(default)]
    pub key_features: Option<String>,
}

/// Metadata for a product category.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_image: Option<Image>,
}

/// Metadata for an editorial story.
#[derive(Debug, Clone, Deserialize)]
pub struct StoryMetadata {
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    /// Rich-text body, trusted HTML rendered verbatim.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub featured_image: Option<Image>,
    #[serde(default)]
    pub author: Option<String>,
    /// Publish date as delivered by the store (`YYYY-MM-DD`).
    #[serde(default)]
    pub publish_date: Option<String>,
}

/// Metadata for a static page.
#[derive(Debug, Clone, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub page_title: String,
    /// Rich-text body, trusted HTML rendered verbatim.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub hero_image: Option<Image>,
    #[serde(default)]
    pub meta_description: Option<String>,
}

impl Bike {
    /// Display title, preferring the model name over the raw object title.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.metadata.model_name.is_empty() {
            &self.title
        } else {
            &self.metadata.model_name
        }
    }

    /// Available sizes parsed from the comma-separated list.
    #[must_use]
    pub fn sizes(&self) -> Vec<String> {
        self.metadata
            .sizes_available
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Whether adding to cart requires an explicit size choice.
    #[must_use]
    pub fn has_multiple_sizes(&self) -> bool {
        self.sizes().len() > 1
    }

    /// Key features parsed from the newline-separated list.
    #[must_use]
    pub fn features(&self) -> Vec<String> {
        self.metadata
            .key_features
            .as_deref()
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }
}

impl Category {
    /// Display name, preferring the metadata name over the raw object title.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.metadata.name.is_empty() {
            &self.title
        } else {
            &self.metadata.name
        }
    }
}

impl Story {
    /// Display headline, falling back to the raw object title.
    #[must_use]
    pub fn display_headline(&self) -> &str {
        if self.metadata.headline.is_empty() {
            &self.title
        } else {
            &self.metadata.headline
        }
    }
}

impl Page {
    /// Display title, falling back to the raw object title.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.metadata.page_title.is_empty() {
            &self.title
        } else {
            &self.metadata.page_title
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bike_deserializes_with_expanded_category() {
        let bike: Bike = serde_json::from_value(json!({
            "id": "b1",
            "slug": "fuel-ex",
            "title": "Fuel EX",
            "type": "bikes",
            "metadata": {
                "model_name": "Fuel EX",
                "price": "$3,699.99",
                "on_sale": true,
                "sale_price": "$2,999.99",
                "sizes_available": "S, M, L",
                "key_features": "Carbon frame\nDropper post\n",
                "category": {
                    "id": "c1",
                    "slug": "mountain",
                    "title": "Mountain",
                    "metadata": { "name": "Mountain Bikes" }
                }
            }
        }))
        .unwrap();

        assert_eq!(bike.display_title(), "Fuel EX");
        assert_eq!(bike.sizes(), vec!["S", "M", "L"]);
        assert!(bike.has_multiple_sizes());
        assert_eq!(bike.features(), vec!["Carbon frame", "Dropper post"]);
        let category = bike.metadata.category.unwrap();
        assert_eq!(category.id(), "c1");
        assert_eq!(category.display_title(), Some("Mountain Bikes"));
    }

    #[test]
    fn bike_deserializes_with_unexpanded_category() {
        let bike: Bike = serde_json::from_value(json!({
            "id": "b2",
            "slug": "marlin",
            "title": "Marlin",
            "metadata": { "model_name": "Marlin 7", "price": "$999", "category": "c1" }
        }))
        .unwrap();

        let category = bike.metadata.category.unwrap();
        assert_eq!(category.id(), "c1");
        assert_eq!(category.display_title(), None);
    }

    #[test]
    fn sizes_empty_when_unset() {
        let bike: Bike = serde_json::from_value(json!({
            "id": "b3",
            "slug": "one-size",
            "title": "One Size",
            "metadata": { "model_name": "One Size", "price": "$500" }
        }))
        .unwrap();

        assert!(bike.sizes().is_empty());
        assert!(!bike.has_multiple_sizes());
    }

    #[test]
    fn story_falls_back_to_title() {
        let story: Story = serde_json::from_value(json!({
            "id": "s1",
            "slug": "gravel-guide",
            "title": "Gravel Guide",
            "metadata": {}
        }))
        .unwrap();

        assert_eq!(story.display_headline(), "Gravel Guide");
    }
}
