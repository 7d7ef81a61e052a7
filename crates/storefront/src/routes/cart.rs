//! Cart route handlers.
//!
//! Mutations are plain form posts that redirect back when done; the header
//! badge stays in sync through the `/cart/count` fragment, which the page
//! script refetches after navigation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use ridgeline_core::price::format_usd;
use rust_decimal::Decimal;

use crate::cart::{Cart, CartItem, CartStore, NewCartItem, SessionCartStorage};
use crate::filters;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub size: Option<String>,
    pub quantity: u32,
    pub on_sale: bool,
    pub unit_price: String,
    pub line_price: String,
    pub image_url: Option<String>,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        let unit = item
            .effective_price()
            .map_or(Decimal::ZERO, |price| price.amount());

        Self {
            id: item.id.clone(),
            slug: item.slug.clone(),
            title: item.model_name.clone(),
            size: item.selected_size.clone(),
            quantity: item.quantity,
            on_sale: item.on_sale,
            unit_price: format_usd(unit),
            line_price: format_usd(unit * Decimal::from(item.quantity)),
            image_url: item.image.as_ref().map(|img| img.sized(400, 300)),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total_items: u32,
    pub total_price: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items.iter().map(CartItemView::from).collect(),
            total_items: cart.total_items,
            total_price: cart.total_display(),
        }
    }
}

/// Build the per-request cart store over the client's session.
fn session_store(session: Session) -> CartStore<SessionCartStorage> {
    let mut store = CartStore::new(SessionCartStorage::new(session));
    store.subscribe(|cart| {
        tracing::debug!(
            total_items = cart.total_items,
            total_price = %cart.total_price,
            "cart updated"
        );
    });
    store
}

/// Treat an unselected form value as no size.
fn normalize_size(size: Option<String>) -> Option<String> {
    size.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub slug: String,
    pub size: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub size: Option<String>,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
    pub size: Option<String>,
}

/// Cart page query parameters.
#[derive(Debug, Deserialize)]
pub struct CartPageQuery {
    pub message: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub message: Option<String>,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Display the cart page.
#[instrument(skip(session))]
pub async fn show(session: Session, Query(query): Query<CartPageQuery>) -> impl IntoResponse {
    let cart = session_store(session).read().await;

    CartShowTemplate {
        cart: CartView::from(&cart),
        message: query.message,
    }
}

/// Add one unit of a bike to the cart.
///
/// Fetches the bike by slug, enforces the size rule (a bike with several
/// sizes needs an explicit choice - rejected here, before any mutation),
/// then redirects to the cart page.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Response {
    let bike = match state.content().get_bike(&form.slug).await {
        Ok(Some(bike)) => bike,
        Ok(None) => return super::not_found_page(),
        Err(e) => {
            tracing::error!(slug = %form.slug, error = %e, "failed to fetch bike for cart add");
            return redirect_with_message(
                &format!("/bikes/{}", form.slug),
                "Failed to add item to cart. Please try again.",
            );
        }
    };

    let size = normalize_size(form.size);
    let selected_size = if bike.has_multiple_sizes() {
        match size {
            Some(size) => Some(size),
            None => {
                return redirect_with_message(
                    &format!("/bikes/{}", bike.slug),
                    "Please select a size before adding to cart",
                );
            }
        }
    } else {
        // Zero or one size option: no size is recorded on the line
        None
    };

    match session_store(session)
        .add(NewCartItem::from(&bike), selected_size)
        .await
    {
        Ok(_) => Redirect::to("/cart").into_response(),
        Err(e) => {
            tracing::error!(slug = %bike.slug, error = %e, "failed to add item to cart");
            redirect_with_message(
                &format!("/bikes/{}", bike.slug),
                "Failed to add item to cart. Please try again.",
            )
        }
    }
}

/// Set a line's quantity exactly; zero removes the line.
#[instrument(skip(session))]
pub async fn update(session: Session, Form(form): Form<UpdateCartForm>) -> Response {
    let size = normalize_size(form.size);

    match session_store(session)
        .update_quantity(&form.id, size.as_deref(), form.quantity)
        .await
    {
        Ok(_) => Redirect::to("/cart").into_response(),
        Err(e) => {
            tracing::error!(id = %form.id, error = %e, "failed to update cart");
            redirect_with_message("/cart", "Failed to update cart. Please try again.")
        }
    }
}

/// Remove a line from the cart.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Response {
    let size = normalize_size(form.size);

    match session_store(session).remove(&form.id, size.as_deref()).await {
        Ok(_) => Redirect::to("/cart").into_response(),
        Err(e) => {
            tracing::error!(id = %form.id, error = %e, "failed to remove from cart");
            redirect_with_message("/cart", "Failed to update cart. Please try again.")
        }
    }
}

/// Empty the cart.
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Response {
    match session_store(session).clear().await {
        Ok(_) => Redirect::to("/cart").into_response(),
        Err(e) => {
            tracing::error!(error = %e, "failed to clear cart");
            redirect_with_message("/cart", "Failed to update cart. Please try again.")
        }
    }
}

/// Cart count badge fragment for the header.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = session_store(session).read().await;

    CartCountTemplate {
        count: cart.total_items,
    }
}

/// Redirect to `path` with a user-facing message query parameter.
fn redirect_with_message(path: &str, message: &str) -> Response {
    let target = format!("{path}?message={}", urlencoding::encode(message));
    Redirect::to(&target).into_response()
}
