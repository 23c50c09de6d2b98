// storefront/src/pipelines/contexts.rs

//! Data structs the pipelines run over. Handlers receive them wrapped in
//! `flow::ContextData`.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Cart, CartEntry, CartLine, CustomerDetails, Offer, Order, Product};
use crate::state::AppState;

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub cart: Cart,
  pub product_id: Uuid,
  pub quantity: i32,
  pub product: Option<Product>,
  pub updated_line: Option<CartLine>,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, cart: Cart, product_id: Uuid, quantity: i32) -> Self {
    Self {
      app_state,
      cart,
      product_id,
      quantity,
      product: None,
      updated_line: None,
    }
  }
}

#[derive(Clone)]
pub struct ApplyOfferCtxData {
  pub app_state: AppState,
  pub cart: Cart,
  pub offer_id: Uuid,
  /// Instant the offer's validity is judged at.
  pub at: DateTime<Utc>,
  pub offer: Option<Offer>,
  pub eligible: Vec<Product>,
  pub added_names: Vec<String>,
}

impl ApplyOfferCtxData {
  pub fn new(app_state: AppState, cart: Cart, offer_id: Uuid, at: DateTime<Utc>) -> Self {
    Self {
      app_state,
      cart,
      offer_id,
      at,
      offer: None,
      eligible: Vec::new(),
      added_names: Vec::new(),
    }
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub cart: Cart,
  pub user_id: Uuid,
  pub customer: CustomerDetails,
  /// Cart lines read once at the start; everything after works from this copy.
  pub snapshot: Vec<CartEntry>,
  pub order_number: Option<String>,
  pub order: Option<Order>,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, cart: Cart, user_id: Uuid, customer: CustomerDetails) -> Self {
    Self {
      app_state,
      cart,
      user_id,
      customer,
      snapshot: Vec::new(),
      order_number: None,
      order: None,
    }
  }
}
