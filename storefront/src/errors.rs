// storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use flow::FlowError;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::models::order::OrderStatus;

/// Coarse classification used at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  BusinessRule,
  Auth,
  Internal,
}

impl ErrorKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ErrorKind::Validation => "validation",
      ErrorKind::NotFound => "not_found",
      ErrorKind::BusinessRule => "business_rule",
      ErrorKind::Auth => "auth",
      ErrorKind::Internal => "internal",
    }
  }
}

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Cart line {line_id} not found in this cart")]
  LineNotFound { line_id: Uuid },

  #[error("Product '{name}' is not available")]
  ProductUnavailable { name: String },

  #[error("Offer '{title}' is not currently available")]
  OfferUnavailable { title: String },

  #[error("Offer '{title}' has no products available to add")]
  NoEligibleProducts { title: String },

  #[error("Cart is empty")]
  EmptyCart,

  #[error("Cannot move order from '{from}' to '{to}'")]
  InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

  #[error("Order creation failed: {source}")]
  OrderCreationFailed {
    #[source]
    source: Box<AppError>,
  },

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Flow Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  // A pipeline stopped gracefully where the handler expected it to complete.
  #[error("Pipeline execution was halted by a handler.")]
  PipelineHaltedByHandler,
}

impl AppError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      AppError::Validation(_) => ErrorKind::Validation,
      AppError::Auth(_) => ErrorKind::Auth,
      AppError::NotFound(_) | AppError::LineNotFound { .. } => ErrorKind::NotFound,
      AppError::ProductUnavailable { .. }
      | AppError::OfferUnavailable { .. }
      | AppError::NoEligibleProducts { .. }
      | AppError::EmptyCart
      | AppError::InvalidStatusTransition { .. } => ErrorKind::BusinessRule,
      AppError::OrderCreationFailed { .. }
      | AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Workflow { .. }
      | AppError::Internal(_)
      | AppError::PipelineHaltedByHandler => ErrorKind::Internal,
    }
  }

  /// Wraps a failure of the order unit of work, keeping the cause.
  pub fn order_creation_failed(cause: AppError) -> Self {
    match cause {
      already @ AppError::OrderCreationFailed { .. } => already,
      other => AppError::OrderCreationFailed {
        source: Box::new(other),
      },
    }
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<AppError>() {
      Ok(app_err) => app_err,
      Err(err) => match err.downcast::<sqlx::Error>() {
        Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
        Err(other) => AppError::Internal(other.to_string()),
      },
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self.kind() {
      ErrorKind::Validation | ErrorKind::BusinessRule => StatusCode::BAD_REQUEST,
      ErrorKind::NotFound => StatusCode::NOT_FOUND,
      ErrorKind::Auth => StatusCode::UNAUTHORIZED,
      ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let kind = self.kind();
    let message = match kind {
      ErrorKind::Internal => {
        tracing::error!(application_error = %self, error_debug = ?self, "Responding with internal error");
        "An internal error occurred. Please try again later.".to_string()
      }
      _ => {
        tracing::warn!(application_error = %self, "Responding with client error");
        self.to_string()
      }
    };

    HttpResponse::build(self.status_code()).json(json!({
      "success": false,
      "error": kind.as_str(),
      "message": message,
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
