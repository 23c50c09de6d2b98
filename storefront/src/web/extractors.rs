// storefront/src/web/extractors.rs

//! Request identity. Authentication happens upstream; by the time a request
//! reaches us the user id (if any) is in `X-User-ID` and an anonymous
//! session key (if any) in `X-Session-Key`.

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::SessionToken;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const SESSION_KEY_HEADER: &str = "X-Session-Key";

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
  req
    .headers()
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
}

fn parse_user_id(req: &HttpRequest) -> Result<Option<Uuid>, AppError> {
  match header_value(req, USER_ID_HEADER) {
    None => Ok(None),
    Some(raw) => Uuid::parse_str(raw).map(Some).map_err(|_| {
      warn!("Invalid {} header.", USER_ID_HEADER);
      AppError::Auth(format!("Invalid {} header.", USER_ID_HEADER))
    }),
  }
}

/// Whatever identity the request carries; both parts may be absent.
#[derive(Debug, Clone)]
pub struct RequestIdentity {
  pub user_id: Option<Uuid>,
  pub session: Option<SessionToken>,
}

impl FromRequest for RequestIdentity {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(parse_user_id(req).map(|user_id| RequestIdentity {
      user_id,
      session: header_value(req, SESSION_KEY_HEADER).map(SessionToken::new),
    }))
  }
}

/// A signed-in user. Rejects the request with 401 when `X-User-ID` is missing.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = parse_user_id(req).and_then(|user_id| {
      user_id.map(|user_id| AuthenticatedUser { user_id }).ok_or_else(|| {
        warn!("AuthenticatedUser extractor: missing {} header.", USER_ID_HEADER);
        AppError::Auth("Sign-in required.".to_string())
      })
    });
    ready(result)
  }
}
