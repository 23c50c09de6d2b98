// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::active_user;
use crate::errors::AppError;
use crate::models::{CartIdentity, Order, OrderStatus};
use crate::services::order_service::{self, ContactOverrides};
use crate::services::cart_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Deserialize, Debug)]
pub struct UpdateStatusPayload {
  pub status: OrderStatus,
}

/// The caller's order with this number; other users' orders are not found.
async fn owned_order(app_state: &AppState, user_id: uuid::Uuid, order_number: &str) -> Result<Order, AppError> {
  active_user(app_state.store.as_ref(), user_id).await?;
  app_state
    .store
    .order_by_number(user_id, order_number)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Order {} not found.", order_number)))
}

/// An empty body means no overrides; anything else must be a valid `ContactOverrides` object.
fn parse_overrides(body: &[u8]) -> Result<ContactOverrides, AppError> {
  if body.iter().all(u8::is_ascii_whitespace) {
    return Ok(ContactOverrides::default());
  }
  serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid order details: {}", e)))
}

#[instrument(name = "handler::create_order", skip(app_state, body, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  body: web::Bytes,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let store = app_state.store.as_ref();
  let user = active_user(store, auth_user.user_id).await?;
  let overrides = parse_overrides(&body)?;
  let customer = overrides.resolve(&user)?;

  let cart = cart_service::resolve_or_create(store, &CartIdentity::User(user.id)).await?;
  let order = order_service::place_order(&app_state, &cart, user.id, customer).await?;
  info!(order_number = %order.order_number, "Order created.");

  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "message": "Order created.",
    "order_number": order.order_number,
    "whatsapp_link": order.whatsapp_link,
    "order": order,
  })))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  active_user(app_state.store.as_ref(), auth_user.user_id).await?;
  let orders = app_state.store.orders_for_user(auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = owned_order(&app_state, auth_user.user_id, &path).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}

#[instrument(name = "handler::confirm_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn confirm_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = owned_order(&app_state, auth_user.user_id, &path).await?;
  let order = order_service::confirm(&app_state, order).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "whatsapp_link": order.whatsapp_link,
    "order": order,
  })))
}

#[instrument(name = "handler::update_order_status", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id, status = %req_payload.status))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  path: web::Path<String>,
  req_payload: web::Json<UpdateStatusPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  // Fulfilment moves (processing, completed) belong to the shop side; a
  // customer may only cancel.
  if req_payload.status != OrderStatus::Cancelled {
    return Err(AppError::Validation(format!(
      "Customers can only cancel an order, not set it to {}.",
      req_payload.status
    )));
  }
  let order = owned_order(&app_state, auth_user.user_id, &path).await?;
  let order = order_service::transition(&app_state, order, req_payload.status).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "order": order })))
}
