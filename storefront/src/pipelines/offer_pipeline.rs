// storefront/src/pipelines/offer_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::ApplyOfferCtxData;
use crate::services::{cart_service, offer_service};
use flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Bulk-adds every eligible product of an offer, one unit each.
pub fn register_apply_offer_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<ApplyOfferCtxData, AppError>::new(&[
    ("load_valid_offer", false, None),
    ("collect_eligible_products", false, None),
    ("add_offer_products_to_cart", false, None),
  ]);

  p.on_root("load_valid_offer", |ctx_data: ContextData<ApplyOfferCtxData>| {
    Box::pin(async move {
      let (store, offer_id, at) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.offer_id, guard.at)
      };

      let offer = store
        .offer(offer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Offer {} not found.", offer_id)))?;

      if !offer_service::is_valid(&offer, at) {
        warn!(%offer_id, "Apply Offer Pipeline: offer is not valid now.");
        return Err(AppError::OfferUnavailable { title: offer.title });
      }

      ctx_data.write().offer = Some(offer);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("collect_eligible_products", |ctx_data: ContextData<ApplyOfferCtxData>| {
    Box::pin(async move {
      let (store, offer) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.offer.clone())
      };
      let offer = offer.ok_or_else(|| AppError::Internal("Offer was not loaded.".to_string()))?;

      let eligible = offer_service::eligible_products(store.as_ref(), &offer).await?;
      if eligible.is_empty() {
        warn!(offer_id = %offer.id, "Apply Offer Pipeline: no eligible products.");
        return Err(AppError::NoEligibleProducts { title: offer.title });
      }

      ctx_data.write().eligible = eligible;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("add_offer_products_to_cart", |ctx_data: ContextData<ApplyOfferCtxData>| {
    Box::pin(async move {
      let (store, cart, eligible) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.cart.clone(), guard.eligible.clone())
      };

      // Rollback handlers only cover completed steps; a failure partway
      // through takes back the units added so far here.
      let mut added_names = Vec::with_capacity(eligible.len());
      let mut added_units: Vec<(Uuid, i32)> = Vec::with_capacity(eligible.len());
      for product in &eligible {
        match cart_service::add_line(store.as_ref(), &cart, product, 1).await {
          Ok(line) => {
            added_units.push((line.id, 1));
            added_names.push(product.name.clone());
          }
          Err(e) => {
            warn!(cart_id = %cart.id, product_id = %product.id, error = %e, "Apply Offer Pipeline: add failed, undoing partial add.");
            if let Err(undo_err) = store.remove_cart_quantities(cart.id, &added_units).await {
              error!(cart_id = %cart.id, error = %undo_err, "Apply Offer Pipeline: could not undo partial add.");
            }
            return Err(e);
          }
        }
      }

      info!(cart_id = %cart.id, added = added_names.len(), "Apply Offer Pipeline: offer products added.");
      ctx_data.write().added_names = added_names;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Apply Offer pipeline registered.");
}
