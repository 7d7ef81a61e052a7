//! Cart store: mutation, persistence, and change notification.
//!
//! [`CartStore`] owns all cart mutation logic and is the single source of
//! truth for a client's cart. Persistence goes through the [`CartStorage`]
//! port so the store can be unit-tested against [`MemoryCartStorage`] and
//! multiple independent stores can coexist in tests; production uses
//! [`SessionCartStorage`] over the client's session record.
//!
//! Every successful mutation persists the full snapshot and then notifies
//! every registered subscriber with the new cart. Reads never notify.

use std::future::Future;
use std::sync::Mutex;

use serde_json::Value;
use thiserror::Error;
use tower_sessions::Session;

use ridgeline_core::{Price, PriceParseError};

use super::{Cart, NewCartItem};

/// Fixed storage key for the cart snapshot.
///
/// The snapshot shape is the serialized [`Cart`]; there is no versioning
/// scheme, so a schema change requires a new key or defensive parsing.
pub const CART_SESSION_KEY: &str = "ridgeline.cart";

/// Error from a cart storage backend.
#[derive(Debug, Error)]
pub enum CartStorageError {
    #[error("cart storage backend error: {0}")]
    Backend(String),
}

/// Errors from cart store operations.
#[derive(Debug, Error)]
pub enum CartError {
    #[error(transparent)]
    Storage(#[from] CartStorageError),

    /// The candidate item's price string does not parse; the line is
    /// rejected before it can poison the totals.
    #[error("invalid price for {id}: {source}")]
    InvalidPrice {
        id: String,
        source: PriceParseError,
    },

    #[error("failed to serialize cart snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Persistence port for the cart snapshot.
///
/// Implementations store one JSON value under one fixed key. They do not
/// interpret the snapshot; corruption handling lives in [`CartStore::read`].
pub trait CartStorage {
    /// Load the stored snapshot, if any.
    fn load(&self) -> impl Future<Output = Result<Option<Value>, CartStorageError>> + Send;

    /// Replace the stored snapshot.
    fn save(&self, snapshot: Value) -> impl Future<Output = Result<(), CartStorageError>> + Send;

    /// Delete the stored snapshot.
    fn clear(&self) -> impl Future<Output = Result<(), CartStorageError>> + Send;
}

/// Cart storage backed by the client's session record.
#[derive(Debug, Clone)]
pub struct SessionCartStorage {
    session: Session,
}

impl SessionCartStorage {
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }
}

impl CartStorage for SessionCartStorage {
    async fn load(&self) -> Result<Option<Value>, CartStorageError> {
        self.session
            .get::<Value>(CART_SESSION_KEY)
            .await
            .map_err(|e| CartStorageError::Backend(e.to_string()))
    }

    async fn save(&self, snapshot: Value) -> Result<(), CartStorageError> {
        self.session
            .insert(CART_SESSION_KEY, snapshot)
            .await
            .map_err(|e| CartStorageError::Backend(e.to_string()))
    }

    async fn clear(&self) -> Result<(), CartStorageError> {
        self.session
            .remove::<Value>(CART_SESSION_KEY)
            .await
            .map(|_| ())
            .map_err(|e| CartStorageError::Backend(e.to_string()))
    }
}

/// In-memory cart storage for tests and tools.
#[derive(Debug, Default)]
pub struct MemoryCartStorage {
    value: Mutex<Option<Value>>,
}

impl MemoryCartStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with an arbitrary snapshot (e.g. a corrupt one).
    #[must_use]
    pub fn seeded(snapshot: Value) -> Self {
        Self {
            value: Mutex::new(Some(snapshot)),
        }
    }

    /// The currently stored snapshot, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the inner lock is poisoned.
    pub fn snapshot(&self) -> Result<Option<Value>, CartStorageError> {
        self.value
            .lock()
            .map(|guard| guard.clone())
            .map_err(|_| CartStorageError::Backend("lock poisoned".to_string()))
    }
}

impl CartStorage for MemoryCartStorage {
    async fn load(&self) -> Result<Option<Value>, CartStorageError> {
        self.snapshot()
    }

    async fn save(&self, snapshot: Value) -> Result<(), CartStorageError> {
        *self
            .value
            .lock()
            .map_err(|_| CartStorageError::Backend("lock poisoned".to_string()))? = Some(snapshot);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CartStorageError> {
        *self
            .value
            .lock()
            .map_err(|_| CartStorageError::Backend("lock poisoned".to_string()))? = None;
        Ok(())
    }
}

/// Subscriber callback receiving each post-mutation cart snapshot.
type Subscriber = Box<dyn Fn(&Cart) + Send + Sync>;

/// The cart state machine over an injected storage port.
pub struct CartStore<S> {
    storage: S,
    subscribers: Vec<Subscriber>,
}

impl<S: CartStorage> CartStore<S> {
    /// Create a store over the given storage backend.
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            subscribers: Vec::new(),
        }
    }

    /// Register an observer notified with the new cart after every
    /// successful mutation. Reads never notify.
    pub fn subscribe(&mut self, subscriber: impl Fn(&Cart) + Send + Sync + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Load the persisted cart.
    ///
    /// An absent, unreadable, or corrupt snapshot yields a fresh empty cart;
    /// corruption is logged and never surfaced.
    pub async fn read(&self) -> Cart {
        match self.storage.load().await {
            Ok(Some(snapshot)) => match serde_json::from_value::<Cart>(snapshot) {
                Ok(cart) => cart,
                Err(e) => {
                    tracing::warn!(error = %e, "corrupt cart snapshot, starting fresh");
                    Cart::default()
                }
            },
            Ok(None) => Cart::default(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to load cart, starting fresh");
                Cart::default()
            }
        }
    }

    /// Add one unit of the candidate item.
    ///
    /// An existing (id, size) line gains quantity 1; otherwise a new line
    /// with quantity 1 is appended. Callers must resolve a definite size
    /// before calling when the product has several size options - `size` is
    /// `None` for products with zero or one size.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::InvalidPrice`] if the candidate's effective
    /// price string does not parse, or a storage error if persisting fails.
    pub async fn add(&self, item: NewCartItem, size: Option<String>) -> Result<Cart, CartError> {
        validate_price(&item)?;

        let mut cart = self.read().await;
        if let Some(index) = cart.position(&item.id, size.as_deref()) {
            if let Some(existing) = cart.items.get_mut(index) {
                existing.quantity += 1;
            }
        } else {
            cart.items.push(item.into_line(size));
        }

        self.commit(cart).await
    }

    /// Set a line's quantity exactly; `0` removes the line.
    ///
    /// A missing (id, size) key is a no-op returning the unchanged cart -
    /// nothing is persisted and nobody is notified.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting fails.
    pub async fn update_quantity(
        &self,
        id: &str,
        size: Option<&str>,
        quantity: u32,
    ) -> Result<Cart, CartError> {
        let mut cart = self.read().await;
        let Some(index) = cart.position(id, size) else {
            return Ok(cart);
        };

        if quantity == 0 {
            cart.items.remove(index);
        } else if let Some(line) = cart.items.get_mut(index) {
            line.quantity = quantity;
        }

        self.commit(cart).await
    }

    /// Remove the matching line; absent lines are not an error.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting fails.
    pub async fn remove(&self, id: &str, size: Option<&str>) -> Result<Cart, CartError> {
        let mut cart = self.read().await;
        cart.items.retain(|item| !item.matches(id, size));
        self.commit(cart).await
    }

    /// Replace the cart with an empty one.
    ///
    /// # Errors
    ///
    /// Returns a storage error if persisting fails.
    pub async fn clear(&self) -> Result<Cart, CartError> {
        self.commit(Cart::default()).await
    }

    /// Recompute totals, persist the snapshot, notify subscribers.
    async fn commit(&self, mut cart: Cart) -> Result<Cart, CartError> {
        cart.recompute_totals();

        let snapshot = serde_json::to_value(&cart)?;
        self.storage.save(snapshot).await?;

        for notify in &self.subscribers {
            notify(&cart);
        }

        Ok(cart)
    }
}

/// Reject candidates whose effective price would not parse.
fn validate_price(item: &NewCartItem) -> Result<(), CartError> {
    let effective = match (&item.sale_price, item.on_sale) {
        (Some(sale), true) => sale,
        _ => &item.price,
    };
    Price::parse(effective)
        .map(|_| ())
        .map_err(|source| CartError::InvalidPrice {
            id: item.id.clone(),
            source,
        })
}
