// storefront/src/models/offer.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

use crate::money;

pub const DEFAULT_BADGE_TEXT: &str = "خصم";
pub const DEFAULT_BADGE_COLOR: &str = "#FFD700";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "offer_type_enum", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OfferType {
  Percentage,
  Fixed,
}

/// A time-boxed promotion grouping products.
///
/// `discount_value` is only shown on badges. Cart and order prices always come
/// from the products themselves.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Offer {
  pub id: Uuid,
  pub title: String,
  pub description: String,
  pub offer_type: OfferType,
  #[serde(serialize_with = "money::serialize")]
  pub discount_value: Decimal,
  pub start_date: DateTime<Utc>,
  pub end_date: DateTime<Utc>,
  pub is_active: bool,
  pub is_featured: bool,
  pub badge_text: String,
  pub badge_color: String,
  pub created_at: DateTime<Utc>,
}

impl Offer {
  /// Active and `start_date <= at <= end_date`, both ends inclusive.
  pub fn is_valid(&self, at: DateTime<Utc>) -> bool {
    self.is_active && self.start_date <= at && at <= self.end_date
  }
}

/// Lazily yields the offers of `offers` that are valid at `at`.
///
/// Each call starts a fresh pass, so the result can be consumed again by
/// calling it again.
pub fn active_offers_in(offers: &[Offer], at: DateTime<Utc>) -> impl Iterator<Item = &Offer> + '_ {
  offers.iter().filter(move |offer| offer.is_valid(at))
}
