// storefront/src/services/offer_service.rs

use chrono::{DateTime, Utc};
use flow::{ContextData, PipelineResult};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Cart, Offer, Product};
use crate::pipelines::contexts::ApplyOfferCtxData;
use crate::state::AppState;
use crate::store::Store;

/// Offers valid at `at`. Every call reads a fresh list.
pub async fn active_offers(store: &dyn Store, at: DateTime<Utc>) -> Result<Vec<Offer>> {
  store.offers_active_at(at).await
}

pub fn is_valid(offer: &Offer, at: DateTime<Utc>) -> bool {
  offer.is_valid(at)
}

/// Products of the offer that are active and in stock right now.
pub async fn eligible_products(store: &dyn Store, offer: &Offer) -> Result<Vec<Product>> {
  let products = store.offer_products(offer.id).await?;
  Ok(products.into_iter().filter(Product::is_eligible_for_offer).collect())
}

/// Adds one unit of each eligible product of the offer; returns the names added.
///
/// Repeating the call adds another unit of each.
#[instrument(name = "offers::bulk_add_to_cart", skip(app_state, cart), fields(cart_id = %cart.id), err(Display))]
pub async fn bulk_add_to_cart(app_state: &AppState, cart: &Cart, offer_id: Uuid) -> Result<Vec<String>> {
  let ctx_data = ContextData::new(ApplyOfferCtxData::new(
    app_state.clone(),
    cart.clone(),
    offer_id,
    Utc::now(),
  ));

  match app_state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let added = ctx_data.read().added_names.clone();
      info!(added = added.len(), "Offer applied to cart.");
      Ok(added)
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}
