// storefront/src/models/cart.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

use crate::models::product::{Product, ProductSummary};
use crate::money;

/// Opaque anonymous session key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
  pub fn new(token: impl Into<String>) -> Self {
    Self(token.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for SessionToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Who owns a cart. Resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CartIdentity {
  User(Uuid),
  Session(SessionToken),
}

impl fmt::Display for CartIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CartIdentity::User(id) => write!(f, "user:{}", id),
      CartIdentity::Session(token) => write!(f, "session:{}", token),
    }
  }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Cart {
  pub id: Uuid,
  pub user_id: Option<Uuid>,
  pub session_key: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Cart {
  pub fn for_identity(identity: &CartIdentity) -> Self {
    let now = Utc::now();
    let (user_id, session_key) = match identity {
      CartIdentity::User(id) => (Some(*id), None),
      CartIdentity::Session(token) => (None, Some(token.as_str().to_string())),
    };
    Self {
      id: Uuid::new_v4(),
      user_id,
      session_key,
      created_at: now,
      updated_at: now,
    }
  }
}

/// One product in a cart. Unique per (cart, product); quantity is at least 1.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
  pub id: Uuid,
  pub cart_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
}

/// A cart line joined with the product as it is right now.
#[derive(Debug, Clone)]
pub struct CartEntry {
  pub line: CartLine,
  pub product: Product,
}

impl CartEntry {
  pub fn subtotal(&self) -> Decimal {
    self.product.final_price() * Decimal::from(self.line.quantity)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
  pub item_count: i64,
  pub total_price: Decimal,
}

impl CartTotals {
  pub fn of(entries: &[CartEntry]) -> Self {
    let item_count = entries.iter().map(|e| i64::from(e.line.quantity)).sum();
    let total_price = entries.iter().map(CartEntry::subtotal).sum::<Decimal>();
    Self {
      item_count,
      total_price: money::round_money(total_price),
    }
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
  pub id: Uuid,
  pub product: ProductSummary,
  pub quantity: i32,
  #[serde(serialize_with = "money::serialize")]
  pub subtotal: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
  pub id: Uuid,
  pub items: Vec<CartLineView>,
  pub total_items: i64,
  #[serde(serialize_with = "money::serialize")]
  pub total_price: Decimal,
}

impl CartView {
  pub fn build(cart: &Cart, entries: &[CartEntry]) -> Self {
    let totals = CartTotals::of(entries);
    Self {
      id: cart.id,
      items: entries
        .iter()
        .map(|entry| CartLineView {
          id: entry.line.id,
          product: ProductSummary::from(&entry.product),
          quantity: entry.line.quantity,
          subtotal: entry.subtotal(),
        })
        .collect(),
      total_items: totals.item_count,
      total_price: totals.total_price,
    }
  }
}
