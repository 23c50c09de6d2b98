// storefront/src/services/cart_service.rs

//! Cart aggregate operations. Totals are always recomputed from the
//! products' current prices.

use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Cart, CartEntry, CartIdentity, CartLine, CartTotals, CartView, Product};
use crate::store::Store;

#[instrument(name = "cart::resolve_or_create", skip(store), fields(identity = %identity), err(Display))]
pub async fn resolve_or_create(store: &dyn Store, identity: &CartIdentity) -> Result<Cart> {
  store.get_or_create_cart(identity).await
}

/// Adds `quantity` of `product`, incrementing an existing line.
#[instrument(
  name = "cart::add_line",
  skip(store, cart, product),
  fields(cart_id = %cart.id, product_id = %product.id),
  err(Display)
)]
pub async fn add_line(store: &dyn Store, cart: &Cart, product: &Product, quantity: i32) -> Result<CartLine> {
  if quantity < 1 {
    return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
  }
  if !product.is_active {
    return Err(AppError::ProductUnavailable {
      name: product.name.clone(),
    });
  }
  let line = store.add_cart_quantity(cart.id, product.id, quantity).await?;
  info!(line_id = %line.id, quantity = line.quantity, "Cart line updated.");
  Ok(line)
}

/// Sets a line's quantity; zero or less removes the line and returns `None`.
#[instrument(name = "cart::set_line_quantity", skip(store, cart), fields(cart_id = %cart.id), err(Display))]
pub async fn set_line_quantity(store: &dyn Store, cart: &Cart, line_id: Uuid, quantity: i32) -> Result<Option<CartLine>> {
  if quantity <= 0 {
    return if store.delete_cart_line(cart.id, line_id).await? {
      Ok(None)
    } else {
      Err(AppError::LineNotFound { line_id })
    };
  }
  store
    .set_cart_line_quantity(cart.id, line_id, quantity)
    .await?
    .map(Some)
    .ok_or(AppError::LineNotFound { line_id })
}

/// Removing a line that is not there is not an error.
#[instrument(name = "cart::remove_line", skip(store, cart), fields(cart_id = %cart.id), err(Display))]
pub async fn remove_line(store: &dyn Store, cart: &Cart, line_id: Uuid) -> Result<()> {
  store.delete_cart_line(cart.id, line_id).await?;
  Ok(())
}

#[instrument(name = "cart::clear", skip(store, cart), fields(cart_id = %cart.id), err(Display))]
pub async fn clear(store: &dyn Store, cart: &Cart) -> Result<()> {
  let removed = store.clear_cart(cart.id).await?;
  info!(removed, "Cart cleared.");
  Ok(())
}

pub async fn entries(store: &dyn Store, cart: &Cart) -> Result<Vec<CartEntry>> {
  store.cart_entries(cart.id).await
}

pub async fn totals(store: &dyn Store, cart: &Cart) -> Result<CartTotals> {
  Ok(CartTotals::of(&store.cart_entries(cart.id).await?))
}

pub async fn view(store: &dyn Store, cart: &Cart) -> Result<CartView> {
  Ok(CartView::build(cart, &store.cart_entries(cart.id).await?))
}
