// storefront/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod offer_handlers;
pub mod order_handlers;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Cart, SessionToken, User};
use crate::services::{cart_service, session};
use crate::state::AppState;
use crate::store::Store;
use crate::web::extractors::{RequestIdentity, SESSION_KEY_HEADER};

/// The cart a request acts on, plus the session key issued for it, if any.
pub(crate) struct RequestCart {
  pub cart: Cart,
  pub issued_session: Option<SessionToken>,
}

pub(crate) async fn active_user(store: &dyn Store, user_id: Uuid) -> Result<User, AppError> {
  match store.user(user_id).await? {
    Some(user) if user.is_active => Ok(user),
    _ => Err(AppError::Auth("Unknown or inactive user.".to_string())),
  }
}

pub(crate) async fn cart_for_request(app_state: &AppState, identity: RequestIdentity) -> Result<RequestCart, AppError> {
  let store = app_state.store.as_ref();
  if let Some(user_id) = identity.user_id {
    active_user(store, user_id).await?;
  }
  let resolved = session::resolve_identity(identity.user_id, identity.session, app_state.sessions.as_ref());
  let cart = cart_service::resolve_or_create(store, &resolved.identity).await?;
  Ok(RequestCart {
    cart,
    issued_session: resolved.issued_session,
  })
}

/// JSON response that hands a freshly issued session key back to the client.
pub(crate) fn respond(status: StatusCode, body: serde_json::Value, issued_session: Option<&SessionToken>) -> HttpResponse {
  let mut builder = HttpResponse::build(status);
  if let Some(token) = issued_session {
    builder.insert_header((SESSION_KEY_HEADER, token.as_str().to_string()));
  }
  builder.json(body)
}
