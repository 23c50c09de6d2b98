// storefront/src/web/handlers/offer_handlers.rs

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{cart_for_request, respond};
use crate::errors::AppError;
use crate::money::format_amount;
use crate::services::{cart_service, offer_service};
use crate::state::AppState;
use crate::web::extractors::RequestIdentity;

#[derive(Deserialize, Debug)]
pub struct ApplyOfferPayload {
  pub offer_id: Uuid,
}

#[instrument(name = "handler::list_offers", skip(app_state))]
pub async fn list_offers_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let offers = offer_service::active_offers(app_state.store.as_ref(), Utc::now()).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "offers": offers })))
}

#[instrument(name = "handler::apply_offer", skip(app_state, req_payload, identity), fields(offer_id = %req_payload.offer_id))]
pub async fn apply_offer_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<ApplyOfferPayload>,
  identity: RequestIdentity,
) -> Result<HttpResponse, AppError> {
  let scope = cart_for_request(&app_state, identity).await?;

  let added = offer_service::bulk_add_to_cart(&app_state, &scope.cart, req_payload.offer_id).await?;
  let totals = cart_service::totals(app_state.store.as_ref(), &scope.cart).await?;
  info!(added = added.len(), cart_count = totals.item_count, "Offer applied.");

  Ok(respond(
    StatusCode::OK,
    json!({
      "success": true,
      "message": format!("Added {} products to the cart.", added.len()),
      "added": added,
      "cart_count": totals.item_count,
      "cart_total": format_amount(totals.total_price),
    }),
    scope.issued_session.as_ref(),
  ))
}
