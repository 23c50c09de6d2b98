// storefront/src/store/seed.rs

//! Demo catalog for database-less runs (`SEED_DB=true`).

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::offer::{DEFAULT_BADGE_COLOR, DEFAULT_BADGE_TEXT};
use crate::models::{Offer, OfferType, Product, User};
use crate::store::MemoryStore;

/// Fixed so that a seeded server can be exercised with a known `X-User-ID`.
pub const DEMO_USER_ID: Uuid = Uuid::from_u128(0x0000_0000_0000_4000_8000_0000_0000_0001);

fn product(name: &str, slug: &str, price_cents: i64, discount: i32, stock: i32) -> Product {
  let now = Utc::now();
  Product {
    id: Uuid::new_v4(),
    name: name.to_string(),
    slug: slug.to_string(),
    description: None,
    price: Decimal::new(price_cents, 2),
    discount_percentage: discount,
    stock,
    is_active: true,
    created_at: now,
    updated_at: now,
  }
}

pub fn seed_demo_catalog(store: &MemoryStore) {
  let now = Utc::now();

  let gloves = product("Nitrile Gloves (100)", "nitrile-gloves-100", 25000, 10, 40);
  let masks = product("Surgical Masks (50)", "surgical-masks-50", 12000, 0, 100);
  let thermometer = product("Digital Thermometer", "digital-thermometer", 18550, 5, 12);
  let oximeter = product("Pulse Oximeter", "pulse-oximeter", 45000, 0, 0);

  let offer = Offer {
    id: Uuid::new_v4(),
    title: "Clinic Starter Pack".to_string(),
    description: "Gloves, masks and a thermometer in one click.".to_string(),
    offer_type: OfferType::Percentage,
    discount_value: Decimal::new(1000, 2),
    start_date: now - Duration::days(1),
    end_date: now + Duration::days(30),
    is_active: true,
    is_featured: true,
    badge_text: DEFAULT_BADGE_TEXT.to_string(),
    badge_color: DEFAULT_BADGE_COLOR.to_string(),
    created_at: now,
  };

  let user = User {
    id: DEMO_USER_ID,
    full_name: "Demo Customer".to_string(),
    phone: "01000000000".to_string(),
    email: Some("demo@example.com".to_string()),
    is_active: true,
    date_joined: now,
  };

  for p in [&gloves, &masks, &thermometer, &oximeter] {
    store.link_offer_product(offer.id, p.id);
  }
  for p in [gloves, masks, thermometer, oximeter] {
    store.insert_product(p);
  }
  store.insert_offer(offer);
  store.insert_user(user);

  tracing::info!("Seeded demo catalog into the in-memory store.");
}
