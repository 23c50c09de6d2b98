// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::services::cart_service;
use flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, warn};

pub fn register_add_to_cart_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false, None),
    ("fetch_product_for_cart", false, None),
    ("add_or_update_cart_line", false, None),
  ]);

  p.on_root("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let quantity = ctx_data.read().quantity;
      if quantity < 1 {
        warn!(quantity, "Add to Cart Pipeline: quantity must be positive.");
        return Err(AppError::Validation("Quantity must be at least 1.".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("fetch_product_for_cart", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (product_id, store) = {
        let guard = ctx_data.read();
        (guard.product_id, guard.app_state.store.clone())
      };

      let product = store
        .product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {} not found.", product_id)))?;

      if !product.is_active {
        warn!(%product_id, "Add to Cart Pipeline: product is inactive.");
        return Err(AppError::ProductUnavailable { name: product.name });
      }

      ctx_data.write().product = Some(product);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("add_or_update_cart_line", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (store, cart, product, quantity) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.cart.clone(),
          guard.product.clone(),
          guard.quantity,
        )
      };
      let product = product.ok_or_else(|| AppError::Internal("Product was not loaded before adding.".to_string()))?;

      let line = cart_service::add_line(store.as_ref(), &cart, &product, quantity).await?;
      info!(
        cart_id = %cart.id,
        product_id = %product.id,
        quantity = line.quantity,
        "Add to Cart Pipeline: line stored."
      );
      ctx_data.write().updated_line = Some(line);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Add to Cart pipeline registered.");
}
