// storefront/src/pipelines/mod.rs

//! Flow pipelines behind the multi-step storefront operations.

use crate::errors::AppError;
use flow::Registry;

pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod offer_pipeline;

/// Registers every pipeline on `registry`. Called once per `AppState`.
pub fn register_all_pipelines(registry: &Registry<AppError>) {
  tracing::info!("Registering flow pipelines...");

  cart_pipeline::register_add_to_cart_pipeline(registry);
  offer_pipeline::register_apply_offer_pipeline(registry);
  checkout_pipeline::register_checkout_pipeline(registry);

  tracing::info!("All application pipelines registered.");
}
