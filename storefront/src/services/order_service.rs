// storefront/src/services/order_service.rs

use chrono::Utc;
use flow::{ContextData, PipelineResult};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::errors::{AppError, Result};
use crate::models::{Cart, CustomerDetails, Order, OrderStatus, User};
use crate::pipelines::contexts::CheckoutCtxData;
use crate::services::notification;
use crate::state::AppState;

/// Contact fields a customer may override at checkout. Missing ones come
/// from the user record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactOverrides {
  pub full_name: Option<String>,
  pub phone: Option<String>,
  pub email: Option<String>,
  pub address: Option<String>,
  pub notes: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl ContactOverrides {
  pub fn resolve(self, user: &User) -> Result<CustomerDetails> {
    let details = CustomerDetails {
      full_name: non_blank(self.full_name).unwrap_or_else(|| user.full_name.clone()),
      phone: non_blank(self.phone).unwrap_or_else(|| user.phone.clone()),
      email: non_blank(self.email).or_else(|| user.email.clone()),
      address: non_blank(self.address).unwrap_or_default(),
      notes: non_blank(self.notes),
    };
    if details.full_name.trim().is_empty() {
      return Err(AppError::Validation("full_name is required.".to_string()));
    }
    if details.phone.trim().is_empty() {
      return Err(AppError::Validation("phone is required.".to_string()));
    }
    Ok(details)
  }
}

/// Snapshots `cart` into a new pending order and clears the cart.
///
/// All or nothing: see `pipelines::checkout_pipeline`.
#[instrument(name = "orders::place_order", skip(app_state, cart, customer), fields(cart_id = %cart.id), err(Display))]
pub async fn place_order(
  app_state: &AppState,
  cart: &Cart,
  user_id: uuid::Uuid,
  customer: CustomerDetails,
) -> Result<Order> {
  let ctx_data = ContextData::new(CheckoutCtxData::new(app_state.clone(), cart.clone(), user_id, customer));

  match app_state.flows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {
      let order = ctx_data
        .read()
        .order
        .clone()
        .ok_or_else(|| AppError::Internal("Checkout completed without an order.".to_string()))?;
      info!(order_number = %order.order_number, total = %order.total_amount, "Order placed.");
      Ok(order)
    }
    PipelineResult::Stopped => Err(AppError::PipelineHaltedByHandler),
  }
}

/// Moves a pending order to processing, recomputes its total from its lines
/// and regenerates the link. Confirming a processing order again only
/// refreshes total and link.
#[instrument(name = "orders::confirm", skip(app_state, order), fields(order_number = %order.order_number), err(Display))]
pub async fn confirm(app_state: &AppState, mut order: Order) -> Result<Order> {
  if order.status != OrderStatus::Processing {
    order.status = order.status.transition(OrderStatus::Processing)?;
  }
  order.total_amount = order.lines_total();
  order.whatsapp_link = Some(notification::build_link(&order, &app_state.config.whatsapp_number));
  order.updated_at = Utc::now();
  app_state.store.update_order(&order).await?;
  info!(status = %order.status, "Order confirmed.");
  Ok(order)
}

#[instrument(name = "orders::transition", skip(app_state, order), fields(order_number = %order.order_number, from = %order.status), err(Display))]
pub async fn transition(app_state: &AppState, mut order: Order, next: OrderStatus) -> Result<Order> {
  order.status = order.status.transition(next).map_err(|e| {
    warn!(to = %next, "Rejected order status change.");
    e
  })?;
  order.updated_at = Utc::now();
  app_state.store.update_order(&order).await?;
  Ok(order)
}
