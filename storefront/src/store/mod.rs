// storefront/src/store/mod.rs

//! Persistence port and its adapters.
//!
//! Services and pipelines only see `dyn Store`. `MemoryStore` backs tests and
//! database-less runs, `PgStore` backs production.

pub mod memory;
pub mod postgres;
pub mod seed;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Cart, CartEntry, CartIdentity, CartLine, Offer, Order, OrderLine, Product, User};

#[async_trait]
pub trait Store: Send + Sync {
  async fn product(&self, product_id: Uuid) -> Result<Option<Product>>;

  async fn user(&self, user_id: Uuid) -> Result<Option<User>>;

  /// Returns the cart owned by `identity`, creating it on first use.
  async fn get_or_create_cart(&self, identity: &CartIdentity) -> Result<Cart>;

  /// Lines of a cart joined with their current products, oldest line first.
  async fn cart_entries(&self, cart_id: Uuid) -> Result<Vec<CartEntry>>;

  /// Adds `quantity` to the (cart, product) line, creating it if needed.
  ///
  /// Atomic: two concurrent calls never create two lines for one product.
  /// A sum past `i32::MAX` leaves the line unchanged and fails with
  /// `quantity_overflow()`.
  async fn add_cart_quantity(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartLine>;

  /// `None` when the line does not belong to the cart.
  async fn set_cart_line_quantity(&self, cart_id: Uuid, line_id: Uuid, quantity: i32) -> Result<Option<CartLine>>;

  /// Returns whether a line was deleted.
  async fn delete_cart_line(&self, cart_id: Uuid, line_id: Uuid) -> Result<bool>;

  /// Returns the number of lines deleted.
  async fn clear_cart(&self, cart_id: Uuid) -> Result<u64>;

  /// Takes `quantity` units off each `(line_id, quantity)`; a line left with
  /// nothing is deleted. Lines no longer in the cart are ignored. Runs as one
  /// atomic operation and returns the number of lines touched.
  async fn remove_cart_quantities(&self, cart_id: Uuid, quantities: &[(Uuid, i32)]) -> Result<u64>;

  async fn offer(&self, offer_id: Uuid) -> Result<Option<Offer>>;

  /// Offers valid at `at`, newest first.
  async fn offers_active_at(&self, at: DateTime<Utc>) -> Result<Vec<Offer>>;

  /// Every product linked to the offer, whatever its state.
  async fn offer_products(&self, offer_id: Uuid) -> Result<Vec<Product>>;

  async fn order_number_exists(&self, order_number: &str) -> Result<bool>;

  /// Stores the order header. `order.lines` is ignored.
  async fn insert_order(&self, order: &Order) -> Result<()>;

  async fn insert_order_lines(&self, lines: &[OrderLine]) -> Result<()>;

  /// Deletes an order and its lines.
  async fn delete_order(&self, order_id: Uuid) -> Result<()>;

  /// Persists the mutable part of an order: status, total, link and `updated_at`.
  async fn update_order(&self, order: &Order) -> Result<()>;

  /// Looks an order up by number within one user's orders, lines included.
  async fn order_by_number(&self, user_id: Uuid, order_number: &str) -> Result<Option<Order>>;

  /// A user's orders, newest first, lines included.
  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>>;
}

pub(crate) fn quantity_overflow() -> AppError {
  AppError::Validation("Quantity is too large.".to_string())
}
