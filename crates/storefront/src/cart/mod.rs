//! Shopping cart domain model.
//!
//! The cart is a small keyed collection of lines. A line is identified by
//! the pair (bike id, selected size): the same bike in two sizes is two
//! lines, the same bike in the same size merges into one. Totals are always
//! recomputed from the lines after a mutation - they are derived values and
//! are never set independently.
//!
//! The persisted snapshot is plain JSON in camelCase; that shape is the
//! storage contract and there is no migration scheme, so parsing is
//! defensive (see [`store::CartStore::read`]).

mod store;

pub use store::{
    CART_SESSION_KEY, CartError, CartStorage, CartStorageError, CartStore, MemoryCartStorage,
    SessionCartStorage,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use ridgeline_core::{Image, Price, PriceParseError, price::format_usd};

use crate::content::Bike;

/// One line in the cart, keyed by (id, `selected_size`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// The bike's content-store id.
    pub id: String,
    pub slug: String,
    pub title: String,
    pub model_name: String,
    /// Currency-formatted unit price, as delivered by the content store.
    pub price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale_price: Option<String>,
    #[serde(default)]
    pub on_sale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
}

impl CartItem {
    /// Whether this line matches the given (id, size) key.
    #[must_use]
    pub fn matches(&self, id: &str, size: Option<&str>) -> bool {
        self.id == id && self.selected_size.as_deref() == size
    }

    /// The unit price that counts toward the total: the sale price when the
    /// item is on sale and one is present, else the regular price.
    ///
    /// # Errors
    ///
    /// Returns [`PriceParseError`] if the stored price string is invalid.
    pub fn effective_price(&self) -> Result<Price, PriceParseError> {
        match (&self.sale_price, self.on_sale) {
            (Some(sale), true) => Price::parse(sale),
            _ => Price::parse(&self.price),
        }
    }
}

/// A candidate line before it enters the cart: everything except quantity
/// and size, which the store assigns.
#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub model_name: String,
    pub price: String,
    pub sale_price: Option<String>,
    pub on_sale: bool,
    pub image: Option<Image>,
}

impl NewCartItem {
    /// Turn the candidate into a line with quantity 1.
    fn into_line(self, selected_size: Option<String>) -> CartItem {
        CartItem {
            id: self.id,
            slug: self.slug,
            title: self.title,
            model_name: self.model_name,
            price: self.price,
            sale_price: self.sale_price,
            on_sale: self.on_sale,
            image: self.image,
            quantity: 1,
            selected_size,
        }
    }
}

impl From<&Bike> for NewCartItem {
    fn from(bike: &Bike) -> Self {
        Self {
            id: bike.id.clone(),
            slug: bike.slug.clone(),
            title: bike.title.clone(),
            model_name: bike.display_title().to_string(),
            price: bike.metadata.price.clone(),
            sale_price: bike.metadata.sale_price.clone(),
            on_sale: bike.metadata.on_sale,
            image: bike.metadata.main_image.clone(),
        }
    }
}

/// The cart: insertion-ordered lines plus derived totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    #[serde(default)]
    pub items: Vec<CartItem>,
    /// Sum of all line quantities. Derived; recomputed after every mutation.
    #[serde(default)]
    pub total_items: u32,
    /// Sum of effective unit price x quantity over all lines. Derived.
    #[serde(default)]
    pub total_price: Decimal,
}

impl Cart {
    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The formatted total, e.g. `$2,598.00`.
    #[must_use]
    pub fn total_display(&self) -> String {
        format_usd(self.total_price)
    }

    /// Index of the line matching (id, size), if any.
    pub(crate) fn position(&self, id: &str, size: Option<&str>) -> Option<usize> {
        self.items.iter().position(|item| item.matches(id, size))
    }

    /// Recompute `total_items` and `total_price` from the lines.
    ///
    /// A line whose price string does not parse contributes zero to the
    /// total and is logged; this only happens with snapshots written before
    /// price validation existed.
    pub(crate) fn recompute_totals(&mut self) {
        self.total_items = self.items.iter().map(|item| item.quantity).sum();
        self.total_price = self
            .items
            .iter()
            .map(|item| match item.effective_price() {
                Ok(price) => price.amount() * Decimal::from(item.quantity),
                Err(e) => {
                    tracing::warn!(
                        item = %item.id,
                        error = %e,
                        "unparseable price excluded from cart total"
                    );
                    Decimal::ZERO
                }
            })
            .sum();
    }
}
