// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use uuid::Uuid;

use crate::errors::AppError;
use crate::money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Completed,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  /// `pending -> processing -> completed`, and `pending | processing -> cancelled`.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (self, next),
      (Pending, Processing) | (Processing, Completed) | (Pending, Cancelled) | (Processing, Cancelled)
    )
  }

  pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, AppError> {
    if self.can_transition_to(next) {
      Ok(next)
    } else {
      Err(AppError::InvalidStatusTransition { from: self, to: next })
    }
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Contact fields copied onto an order when it is placed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerDetails {
  pub full_name: String,
  pub phone: String,
  pub email: Option<String>,
  pub address: String,
  pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub order_number: String,
  pub full_name: String,
  pub phone: String,
  pub email: Option<String>,
  pub address: String,
  pub notes: Option<String>,
  pub status: OrderStatus,
  #[serde(serialize_with = "money::serialize")]
  pub total_amount: Decimal,
  pub whatsapp_link: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,

  #[sqlx(skip)]
  pub lines: Vec<OrderLine>,
}

impl Order {
  pub fn new_pending(user_id: Uuid, order_number: String, customer: CustomerDetails) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      user_id,
      order_number,
      full_name: customer.full_name,
      phone: customer.phone,
      email: customer.email,
      address: customer.address,
      notes: customer.notes,
      status: OrderStatus::Pending,
      total_amount: money::round_money(Decimal::ZERO),
      whatsapp_link: None,
      created_at: now,
      updated_at: now,
      lines: Vec::new(),
    }
  }

  /// Sum of the snapshotted line subtotals. Never derived from a live cart.
  pub fn lines_total(&self) -> Decimal {
    money::round_money(self.lines.iter().map(OrderLine::subtotal).sum::<Decimal>())
  }
}

/// Immutable copy of one cart line at checkout time.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderLine {
  pub id: Uuid,
  pub order_id: Uuid,
  /// Cleared if the product is deleted later; name and price stay.
  pub product_id: Option<Uuid>,
  pub product_name: String,
  pub quantity: i32,
  #[serde(serialize_with = "money::serialize")]
  pub price: Decimal,
}

impl OrderLine {
  pub fn subtotal(&self) -> Decimal {
    self.price * Decimal::from(self.quantity)
  }
}
