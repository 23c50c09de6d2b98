// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

use storefront::config::AppConfig;
use storefront::errors::{AppError, Result};
use storefront::models::offer::{DEFAULT_BADGE_COLOR, DEFAULT_BADGE_TEXT};
use storefront::models::{
  Cart, CartEntry, CartIdentity, CartLine, Offer, OfferType, Order, OrderLine, Product, SessionToken, User,
};
use storefront::services::session::SessionProvisioner;
use storefront::store::{MemoryStore, Store};
use storefront::AppState;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

/// Hands out `guest-1`, `guest-2`, ... so tests can predict session keys.
#[derive(Default)]
pub struct CountingProvisioner {
  next: std::sync::atomic::AtomicUsize,
}

impl SessionProvisioner for CountingProvisioner {
  fn provision(&self) -> SessionToken {
    let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
    SessionToken::new(format!("guest-{}", n))
  }
}

pub fn test_config() -> AppConfig {
  AppConfig::default()
}

pub fn state_with(store: Arc<dyn Store>) -> AppState {
  AppState::new(store, Arc::new(test_config()), Arc::new(CountingProvisioner::default()))
}

pub struct TestWorld {
  pub store: Arc<MemoryStore>,
  pub state: AppState,
}

pub fn world() -> TestWorld {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let state = state_with(store.clone());
  TestWorld { store, state }
}

pub fn money(cents: i64) -> Decimal {
  Decimal::new(cents, 2)
}

pub fn make_product(name: &str, price: Decimal, discount: i32, stock: i32, active: bool) -> Product {
  let now = Utc::now();
  Product {
    id: Uuid::new_v4(),
    name: name.to_string(),
    slug: name.to_lowercase().replace(' ', "-"),
    description: None,
    price,
    discount_percentage: discount,
    stock,
    is_active: active,
    created_at: now,
    updated_at: now,
  }
}

pub fn add_product(store: &MemoryStore, name: &str, price: Decimal, discount: i32, stock: i32, active: bool) -> Product {
  let product = make_product(name, price, discount, stock, active);
  store.insert_product(product.clone());
  product
}

pub fn add_user(store: &MemoryStore, full_name: &str) -> User {
  let user = User {
    id: Uuid::new_v4(),
    full_name: full_name.to_string(),
    phone: "01012345678".to_string(),
    email: Some("customer@example.com".to_string()),
    is_active: true,
    date_joined: Utc::now(),
  };
  store.insert_user(user.clone());
  user
}

pub fn add_offer(
  store: &MemoryStore,
  title: &str,
  start: DateTime<Utc>,
  end: DateTime<Utc>,
  products: &[&Product],
) -> Offer {
  let offer = Offer {
    id: Uuid::new_v4(),
    title: title.to_string(),
    description: String::new(),
    offer_type: OfferType::Percentage,
    discount_value: money(1500),
    start_date: start,
    end_date: end,
    is_active: true,
    is_featured: false,
    badge_text: DEFAULT_BADGE_TEXT.to_string(),
    badge_color: DEFAULT_BADGE_COLOR.to_string(),
    created_at: Utc::now(),
  };
  store.insert_offer(offer.clone());
  for p in products {
    store.link_offer_product(offer.id, p.id);
  }
  offer
}

pub fn running_window() -> (DateTime<Utc>, DateTime<Utc>) {
  let now = Utc::now();
  (now - Duration::days(1), now + Duration::days(1))
}

pub async fn user_cart(store: &dyn Store, user: &User) -> Cart {
  store.get_or_create_cart(&CartIdentity::User(user.id)).await.unwrap()
}

/// `MemoryStore` with injectable faults:
/// - `insert_order_lines` fails while `fail_order_lines` is set;
/// - `add_cart_quantity` fails for the product in `fail_add_for`;
/// - `insert_order_lines` first adds `(cart, product, quantity)` from
///   `add_during_order_lines`, as a second tab would mid-checkout.
pub struct FlakyStore {
  pub inner: Arc<MemoryStore>,
  pub fail_order_lines: AtomicBool,
  pub fail_add_for: Mutex<Option<Uuid>>,
  pub add_during_order_lines: Mutex<Option<(Uuid, Uuid, i32)>>,
}

impl FlakyStore {
  pub fn new(inner: Arc<MemoryStore>) -> Self {
    Self {
      inner,
      fail_order_lines: AtomicBool::new(true),
      fail_add_for: Mutex::new(None),
      add_during_order_lines: Mutex::new(None),
    }
  }

  pub fn healthy(inner: Arc<MemoryStore>) -> Self {
    let store = Self::new(inner);
    store.fail_order_lines.store(false, Ordering::SeqCst);
    store
  }
}

#[async_trait]
impl Store for FlakyStore {
  async fn product(&self, product_id: Uuid) -> Result<Option<Product>> {
    self.inner.product(product_id).await
  }

  async fn user(&self, user_id: Uuid) -> Result<Option<User>> {
    self.inner.user(user_id).await
  }

  async fn get_or_create_cart(&self, identity: &CartIdentity) -> Result<Cart> {
    self.inner.get_or_create_cart(identity).await
  }

  async fn cart_entries(&self, cart_id: Uuid) -> Result<Vec<CartEntry>> {
    self.inner.cart_entries(cart_id).await
  }

  async fn add_cart_quantity(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartLine> {
    let blocked = *self.fail_add_for.lock() == Some(product_id);
    if blocked {
      return Err(AppError::Internal("cart_items table unavailable".to_string()));
    }
    self.inner.add_cart_quantity(cart_id, product_id, quantity).await
  }

  async fn set_cart_line_quantity(&self, cart_id: Uuid, line_id: Uuid, quantity: i32) -> Result<Option<CartLine>> {
    self.inner.set_cart_line_quantity(cart_id, line_id, quantity).await
  }

  async fn delete_cart_line(&self, cart_id: Uuid, line_id: Uuid) -> Result<bool> {
    self.inner.delete_cart_line(cart_id, line_id).await
  }

  async fn clear_cart(&self, cart_id: Uuid) -> Result<u64> {
    self.inner.clear_cart(cart_id).await
  }

  async fn remove_cart_quantities(&self, cart_id: Uuid, quantities: &[(Uuid, i32)]) -> Result<u64> {
    self.inner.remove_cart_quantities(cart_id, quantities).await
  }

  async fn offer(&self, offer_id: Uuid) -> Result<Option<Offer>> {
    self.inner.offer(offer_id).await
  }

  async fn offers_active_at(&self, at: DateTime<Utc>) -> Result<Vec<Offer>> {
    self.inner.offers_active_at(at).await
  }

  async fn offer_products(&self, offer_id: Uuid) -> Result<Vec<Product>> {
    self.inner.offer_products(offer_id).await
  }

  async fn order_number_exists(&self, order_number: &str) -> Result<bool> {
    self.inner.order_number_exists(order_number).await
  }

  async fn insert_order(&self, order: &Order) -> Result<()> {
    self.inner.insert_order(order).await
  }

  async fn insert_order_lines(&self, lines: &[OrderLine]) -> Result<()> {
    let concurrent_add = self.add_during_order_lines.lock().take();
    if let Some((cart_id, product_id, quantity)) = concurrent_add {
      self.inner.add_cart_quantity(cart_id, product_id, quantity).await?;
    }
    if self.fail_order_lines.load(Ordering::SeqCst) {
      return Err(AppError::Internal("order_items table unavailable".to_string()));
    }
    self.inner.insert_order_lines(lines).await
  }

  async fn delete_order(&self, order_id: Uuid) -> Result<()> {
    self.inner.delete_order(order_id).await
  }

  async fn update_order(&self, order: &Order) -> Result<()> {
    self.inner.update_order(order).await
  }

  async fn order_by_number(&self, user_id: Uuid, order_number: &str) -> Result<Option<Order>> {
    self.inner.order_by_number(user_id, order_number).await
  }

  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    self.inner.orders_for_user(user_id).await
  }
}
