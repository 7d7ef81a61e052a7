//! Ridgeline Core - Shared types library.
//!
//! This crate provides common types used by the Ridgeline storefront:
//! prices parsed from the content store's currency-formatted strings, and
//! image references carrying their transformable image-service URLs.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. This keeps
//! it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Price and image reference types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
