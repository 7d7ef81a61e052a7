//! Core types for the Ridgeline storefront.

pub mod image;
pub mod price;

pub use image::Image;
pub use price::{Price, PriceParseError};
