// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::money;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub slug: String,
  pub description: Option<String>,
  #[serde(serialize_with = "money::serialize")]
  pub price: Decimal,
  /// Whole percent, 0 to 100.
  pub discount_percentage: i32,
  pub stock: i32,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  /// List price reduced by the discount percentage, rounded to cents.
  pub fn final_price(&self) -> Decimal {
    if self.discount_percentage > 0 {
      let discount = self.price * Decimal::from(self.discount_percentage) / Decimal::ONE_HUNDRED;
      money::round_money(self.price - discount)
    } else {
      money::round_money(self.price)
    }
  }

  pub fn is_in_stock(&self) -> bool {
    self.stock > 0
  }

  /// Offer bulk-adds only pick products that pass this check.
  pub fn is_eligible_for_offer(&self) -> bool {
    self.is_active && self.is_in_stock()
  }
}

/// Product fields embedded in cart and order responses.
#[derive(Debug, Clone, Serialize)]
pub struct ProductSummary {
  pub id: Uuid,
  pub name: String,
  pub slug: String,
  #[serde(serialize_with = "money::serialize")]
  pub price: Decimal,
  #[serde(serialize_with = "money::serialize")]
  pub final_price: Decimal,
  pub is_active: bool,
}

impl From<&Product> for ProductSummary {
  fn from(product: &Product) -> Self {
    Self {
      id: product.id,
      name: product.name.clone(),
      slug: product.slug.clone(),
      price: product.price,
      final_price: product.final_price(),
      is_active: product.is_active,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn product(price: &str, discount: i32) -> Product {
    Product {
      id: Uuid::new_v4(),
      name: "Gauze".into(),
      slug: "gauze".into(),
      description: None,
      price: Decimal::from_str(price).unwrap(),
      discount_percentage: discount,
      stock: 3,
      is_active: true,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn final_price_applies_discount() {
    assert_eq!(product("100.00", 10).final_price().to_string(), "90.00");
    assert_eq!(product("100.00", 0).final_price().to_string(), "100.00");
    assert_eq!(product("19.99", 15).final_price().to_string(), "16.99");
  }
}
