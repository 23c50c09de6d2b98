// storefront/src/web/handlers/cart_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use flow::{ContextData, PipelineResult};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{cart_for_request, respond};
use crate::errors::AppError;
use crate::money::format_amount;
use crate::pipelines::contexts::AddToCartCtxData;
use crate::services::cart_service;
use crate::state::AppState;
use crate::web::extractors::RequestIdentity;

fn default_quantity() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  #[serde(default = "default_quantity")]
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct UpdateCartItemPayload {
  pub item_id: Uuid,
  pub quantity: i32,
}

#[derive(Deserialize, Debug)]
pub struct RemoveCartItemPayload {
  pub item_id: Uuid,
}

#[instrument(name = "handler::get_cart", skip(app_state, identity))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  identity: RequestIdentity,
) -> Result<HttpResponse, AppError> {
  let scope = cart_for_request(&app_state, identity).await?;
  let view = cart_service::view(app_state.store.as_ref(), &scope.cart).await?;
  Ok(respond(
    StatusCode::OK,
    json!({ "success": true, "cart": view }),
    scope.issued_session.as_ref(),
  ))
}

#[instrument(
  name = "handler::add_to_cart",
  skip(app_state, req_payload, identity),
  fields(product_id = %req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  identity: RequestIdentity,
) -> Result<HttpResponse, AppError> {
  let scope = cart_for_request(&app_state, identity).await?;

  let ctx_data = ContextData::new(AddToCartCtxData::new(
    app_state.get_ref().clone(),
    scope.cart.clone(),
    req_payload.product_id,
    req_payload.quantity,
  ));

  match app_state.flows.run(ctx_data.clone()).await {
    Ok(PipelineResult::Completed) => {
      let line = ctx_data.read().updated_line.clone().ok_or_else(|| {
        warn!("Add to Cart pipeline completed but no line was recorded.");
        AppError::Internal("Cart update completed, but item details are unavailable.".to_string())
      })?;
      info!(line_id = %line.id, quantity = line.quantity, "Item added to cart.");

      let view = cart_service::view(app_state.store.as_ref(), &scope.cart).await?;
      Ok(respond(
        StatusCode::CREATED,
        json!({
          "success": true,
          "message": "Item added to cart.",
          "item_id": line.id,
          "cart": view,
        }),
        scope.issued_session.as_ref(),
      ))
    }
    Ok(PipelineResult::Stopped) => {
      warn!("Add to Cart pipeline was stopped by a handler.");
      Err(AppError::PipelineHaltedByHandler)
    }
    Err(app_err) => {
      warn!(error = %app_err, "Add to Cart pipeline failed.");
      Err(app_err)
    }
  }
}

#[instrument(
  name = "handler::update_cart_item",
  skip(app_state, req_payload, identity),
  fields(item_id = %req_payload.item_id, quantity = req_payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<UpdateCartItemPayload>,
  identity: RequestIdentity,
) -> Result<HttpResponse, AppError> {
  if req_payload.quantity < 0 {
    return Err(AppError::Validation("Quantity cannot be negative.".to_string()));
  }
  let scope = cart_for_request(&app_state, identity).await?;
  let store = app_state.store.as_ref();

  let line = cart_service::set_line_quantity(store, &scope.cart, req_payload.item_id, req_payload.quantity).await?;
  let view = cart_service::view(store, &scope.cart).await?;

  let item_subtotal = line
    .as_ref()
    .and_then(|line| view.items.iter().find(|item| item.id == line.id))
    .map(|item| format_amount(item.subtotal));

  Ok(respond(
    StatusCode::OK,
    json!({
      "success": true,
      "removed": line.is_none(),
      "item_subtotal": item_subtotal,
      "cart": view,
    }),
    scope.issued_session.as_ref(),
  ))
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, req_payload, identity), fields(item_id = %req_payload.item_id))]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RemoveCartItemPayload>,
  identity: RequestIdentity,
) -> Result<HttpResponse, AppError> {
  let scope = cart_for_request(&app_state, identity).await?;
  let store = app_state.store.as_ref();

  cart_service::remove_line(store, &scope.cart, req_payload.item_id).await?;
  let view = cart_service::view(store, &scope.cart).await?;
  Ok(respond(
    StatusCode::OK,
    json!({ "success": true, "message": "Item removed.", "cart": view }),
    scope.issued_session.as_ref(),
  ))
}

#[instrument(name = "handler::clear_cart", skip(app_state, identity))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  identity: RequestIdentity,
) -> Result<HttpResponse, AppError> {
  let scope = cart_for_request(&app_state, identity).await?;
  let store = app_state.store.as_ref();

  cart_service::clear(store, &scope.cart).await?;
  let view = cart_service::view(store, &scope.cart).await?;
  Ok(respond(
    StatusCode::OK,
    json!({ "success": true, "message": "Cart cleared.", "cart": view }),
    scope.issued_session.as_ref(),
  ))
}
