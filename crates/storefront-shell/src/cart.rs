//! # Cart Scope
//!
//! In-memory shopping cart, mounted inside the authentication scope so it can
//! attribute itself to the signed-in viewer.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Scope Operations                                │
//! │                                                                         │
//! │  Caller                    CartScope                Cart Change         │
//! │  ──────                    ─────────                ───────────         │
//! │                                                                         │
//! │  Add to cart ────────────► with_cart_mut() ──────► add_item()          │
//! │                                                                         │
//! │  Change quantity ────────► with_cart_mut() ──────► update_quantity()   │
//! │                                                                         │
//! │  Remove ─────────────────► with_cart_mut() ──────► remove_item()       │
//! │                                                                         │
//! │  Render a view ──────────► totals() ─────────────► (read only)         │
//! │                                                                         │
//! │  NOTE: All operations take the Mutex briefly; nothing is persisted.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storefront_core::validation::{validate_price_cents, MAX_PRICE_CENTS};
use thiserror::Error;

use crate::session::SessionStore;

/// Maximum number of distinct items in a cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity for a single item.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Rejected cart mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Quantity must be between 1 and {max}")]
    InvalidQuantity { max: i64 },

    #[error("Unit price must be between 0 and {max} cents")]
    InvalidPrice { max: i64 },

    #[error("Cart cannot have more than {max} items")]
    TooManyItems { max: usize },

    #[error("Product {product_id} not in cart")]
    NotInCart { product_id: String },
}

/// An item in the cart.
///
/// Name and price are captured when the item is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: i64,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents.saturating_mul(self.quantity)
    }
}

/// The shopping cart.
///
/// ## Invariants
/// - Items are unique by `product_id` (adding the same product increases quantity)
/// - Quantity is in `1..=MAX_ITEM_QUANTITY` (updating to 0 removes the item)
/// - Unit price is in `0..=MAX_PRICE_CENTS`
/// - At most `MAX_CART_ITEMS` distinct items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub items: Vec<CartItem>,
    /// When the cart was created or last cleared.
    pub created_at: DateTime<Utc>,
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl Cart {
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Adds a product or increases its quantity if already present.
    pub fn add_item(
        &mut self,
        product_id: &str,
        name: &str,
        unit_price_cents: i64,
        quantity: i64,
    ) -> Result<(), CartError> {
        if validate_price_cents(unit_price_cents).is_err() {
            return Err(CartError::InvalidPrice {
                max: MAX_PRICE_CENTS,
            });
        }

        if quantity <= 0 || quantity > MAX_ITEM_QUANTITY {
            return Err(CartError::InvalidQuantity {
                max: MAX_ITEM_QUANTITY,
            });
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            let new_qty = item.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CartError::InvalidQuantity {
                    max: MAX_ITEM_QUANTITY,
                });
            }
            item.quantity = new_qty;
            return Ok(());
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CartError::TooManyItems {
                max: MAX_CART_ITEMS,
            });
        }

        self.items.push(CartItem {
            product_id: product_id.to_string(),
            name: name.to_string(),
            unit_price_cents,
            quantity,
            added_at: Utc::now(),
        });
        Ok(())
    }

    /// Sets an item's quantity. Zero removes the item.
    pub fn update_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        if !(1..=MAX_ITEM_QUANTITY).contains(&quantity) {
            return Err(CartError::InvalidQuantity {
                max: MAX_ITEM_QUANTITY,
            });
        }

        match self.items.iter_mut().find(|i| i.product_id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                Ok(())
            }
            None => Err(CartError::NotInCart {
                product_id: product_id.to_string(),
            }),
        }
    }

    pub fn remove_item(&mut self, product_id: &str) -> Result<(), CartError> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.product_id != product_id);

        if self.items.len() == initial_len {
            Err(CartError::NotInCart {
                product_id: product_id.to_string(),
            })
        } else {
            Ok(())
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.created_at = Utc::now();
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, i| total.saturating_add(i.quantity))
    }

    pub fn subtotal_cents(&self) -> i64 {
        self.items
            .iter()
            .fold(0i64, |total, i| total.saturating_add(i.line_total_cents()))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Read-only summary handed to views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub item_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    /// User id of the signed-in viewer the cart belongs to, if any.
    pub owner: Option<String>,
}

impl CartTotals {
    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }
}

// =============================================================================
// Cart Scope
// =============================================================================

/// Cart state mounted inside the authentication scope.
///
/// Uses `Arc<Mutex<Cart>>`: operations are short and nearly all mutate.
#[derive(Debug, Clone)]
pub struct CartScope {
    cart: Arc<Mutex<Cart>>,
    session: SessionStore,
}

impl CartScope {
    /// Mounts an empty cart bound to `session`.
    pub fn mount(session: SessionStore) -> Self {
        CartScope {
            cart: Arc::new(Mutex::new(Cart::new())),
            session,
        }
    }

    /// Runs `f` with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&cart)
    }

    /// Runs `f` with write access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// scope.with_cart_mut(|cart| cart.add_item("sku-1", "Mug", 1200, 1))?;
    /// ```
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Cart) -> R,
    {
        let mut cart = self.cart.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut cart)
    }

    /// User id the cart is attributed to right now.
    pub fn owner(&self) -> Option<String> {
        self.session.current_identity().map(|identity| identity.user_id)
    }

    pub fn totals(&self) -> CartTotals {
        let owner = self.owner();
        self.with_cart(|cart| CartTotals {
            item_count: cart.item_count(),
            total_quantity: cart.total_quantity(),
            subtotal_cents: cart.subtotal_cents(),
            owner,
        })
    }
}
