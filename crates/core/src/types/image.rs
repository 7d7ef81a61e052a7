//! Image references from the content store.
//!
//! Every image field the content store returns carries two URLs: the
//! canonical upload URL and a transformable image-service URL. Consumers
//! append query parameters (width, height, fit mode, format/compression) to
//! the transformable URL to request resized variants; the parameter names
//! belong to the image service's API, not to us.

use serde::{Deserialize, Serialize};

/// An image reference as delivered by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    /// Canonical URL of the uploaded asset.
    pub url: String,
    /// Transformable image-service URL.
    pub imgix_url: String,
}

impl Image {
    /// A crop-to-fit variant with fixed width and height.
    #[must_use]
    pub fn sized(&self, width: u32, height: u32) -> String {
        format!(
            "{}?w={width}&h={height}&fit=crop&auto=format,compress",
            self.imgix_url
        )
    }

    /// A width-constrained variant that keeps the source aspect ratio.
    #[must_use]
    pub fn wide(&self, width: u32) -> String {
        format!("{}?w={width}&fit=crop&auto=format,compress", self.imgix_url)
    }
}

/// Append sizing parameters to a raw image-service URL.
///
/// Used where only the URL string is at hand (e.g. search projections)
/// rather than a full [`Image`].
#[must_use]
pub fn sized_url(imgix_url: &str, width: u32, height: u32) -> String {
    format!("{imgix_url}?w={width}&h={height}&fit=crop&auto=format,compress")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Image {
        Image {
            url: "https://cdn.example.com/bikes/fuel.jpg".to_string(),
            imgix_url: "https://images.example.com/bikes/fuel.jpg".to_string(),
        }
    }

    #[test]
    fn sized_appends_transform_parameters() {
        assert_eq!(
            sample().sized(800, 600),
            "https://images.example.com/bikes/fuel.jpg?w=800&h=600&fit=crop&auto=format,compress"
        );
    }

    #[test]
    fn wide_omits_height() {
        assert_eq!(
            sample().wide(2000),
            "https://images.example.com/bikes/fuel.jpg?w=2000&fit=crop&auto=format,compress"
        );
    }
}
