// storefront/src/pipelines/checkout_pipeline.rs

//! Turns a cart into an order as one unit of work.
//!
//! `snapshot_cart` fails with `EmptyCart` before anything is written. A
//! failure in any later step deletes the order (and its lines) through the
//! `create_order_record` rollback and surfaces as `OrderCreationFailed`. The
//! ordered quantities leave the cart last, so it is untouched whenever the
//! order is rolled back, and lines added mid-checkout stay in the cart.

use crate::errors::AppError;
use crate::models::{Order, OrderLine};
use crate::pipelines::contexts::CheckoutCtxData;
use crate::services::{notification, order_number};
use chrono::Utc;
use flow::{ContextData, Pipeline, PipelineControl, Registry};
use tracing::{info, warn};
use uuid::Uuid;

fn order_in_ctx(ctx_data: &ContextData<CheckoutCtxData>) -> Result<Order, AppError> {
  ctx_data
    .read()
    .order
    .clone()
    .ok_or_else(|| AppError::Internal("Order record missing from checkout context.".to_string()))
}

pub fn register_checkout_pipeline(registry: &Registry<AppError>) {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("snapshot_cart", false, None),
    ("assign_order_number", false, None),
    ("create_order_record", false, None),
    ("create_order_lines", false, None),
    ("build_notification_link", false, None),
    ("remove_ordered_lines", false, None),
  ]);

  // Step 1: read the cart exactly once.
  p.on_root("snapshot_cart", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, cart_id) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.cart.id)
      };
      let snapshot = store.cart_entries(cart_id).await?;
      if snapshot.is_empty() {
        warn!(%cart_id, "Checkout Pipeline: cart is empty.");
        return Err(AppError::EmptyCart);
      }
      info!(%cart_id, lines = snapshot.len(), "Checkout Pipeline: cart snapshotted.");
      ctx_data.write().snapshot = snapshot;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 2
  p.on_root("assign_order_number", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, attempts) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.app_state.config.order_number_attempts)
      };
      let number = order_number::allocate(store.as_ref(), attempts)
        .await
        .map_err(AppError::order_creation_failed)?;
      ctx_data.write().order_number = Some(number);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 3
  p.on_root("create_order_record", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, user_id, number, customer) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.user_id,
          guard.order_number.clone(),
          guard.customer.clone(),
        )
      };
      let number = number.ok_or_else(|| {
        AppError::order_creation_failed(AppError::Internal("Order number was not assigned.".to_string()))
      })?;

      let order = Order::new_pending(user_id, number, customer);
      store
        .insert_order(&order)
        .await
        .map_err(AppError::order_creation_failed)?;
      info!(order_number = %order.order_number, "Checkout Pipeline: order record created.");
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_rollback("create_order_record", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, order) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.order.clone())
      };
      if let Some(order) = order {
        store.delete_order(order.id).await?;
        warn!(order_number = %order.order_number, "Checkout Pipeline: order record rolled back.");
        ctx_data.write().order = None;
      }
      Ok::<_, AppError>(())
    })
  });

  // Step 4: copy name and current final price of every snapshotted line.
  p.on_root("create_order_lines", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, snapshot) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.snapshot.clone())
      };
      let mut order = order_in_ctx(&ctx_data).map_err(AppError::order_creation_failed)?;

      let lines: Vec<OrderLine> = snapshot
        .iter()
        .map(|entry| OrderLine {
          id: Uuid::new_v4(),
          order_id: order.id,
          product_id: Some(entry.product.id),
          product_name: entry.product.name.clone(),
          quantity: entry.line.quantity,
          price: entry.product.final_price(),
        })
        .collect();

      store
        .insert_order_lines(&lines)
        .await
        .map_err(AppError::order_creation_failed)?;

      order.lines = lines;
      order.total_amount = order.lines_total();
      info!(
        order_number = %order.order_number,
        lines = order.lines.len(),
        total = %order.total_amount,
        "Checkout Pipeline: order lines created."
      );
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 5: the link is rendered from the populated order, then persisted with the total.
  p.on_root("build_notification_link", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, config) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.app_state.config.clone())
      };
      let mut order = order_in_ctx(&ctx_data).map_err(AppError::order_creation_failed)?;

      order.whatsapp_link = Some(notification::build_link(&order, &config.whatsapp_number));
      order.updated_at = Utc::now();
      store
        .update_order(&order)
        .await
        .map_err(AppError::order_creation_failed)?;
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  // Step 6: take the ordered quantities off the cart. Lines added or topped up
  // after the snapshot keep whatever was not ordered.
  p.on_root("remove_ordered_lines", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, cart_id, ordered) = {
        let guard = ctx_data.read();
        let ordered: Vec<(Uuid, i32)> = guard.snapshot.iter().map(|e| (e.line.id, e.line.quantity)).collect();
        (guard.app_state.store.clone(), guard.cart.id, ordered)
      };
      let touched = store
        .remove_cart_quantities(cart_id, &ordered)
        .await
        .map_err(AppError::order_creation_failed)?;
      info!(%cart_id, lines = touched, "Checkout Pipeline: ordered lines removed from cart.");
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Checkout pipeline registered.");
}
