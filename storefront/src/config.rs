// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

pub const DEFAULT_WHATSAPP_NUMBER: &str = "+201013928114";
pub const DEFAULT_ORDER_NUMBER_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs the service on the in-memory store.
  pub database_url: Option<String>,

  /// Destination of order notification links, as configured (may carry a leading `+`).
  pub whatsapp_number: String,
  pub order_number_attempts: u32,

  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL");

    let whatsapp_number = get_env("WHATSAPP_NUMBER").unwrap_or_else(|| DEFAULT_WHATSAPP_NUMBER.to_string());
    if !whatsapp_number.chars().any(|c| c.is_ascii_digit()) {
      return Err(AppError::Config(format!(
        "Invalid WHATSAPP_NUMBER '{}': no digits",
        whatsapp_number
      )));
    }

    let order_number_attempts = match get_env("ORDER_NUMBER_ATTEMPTS") {
      Some(raw) => raw
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| AppError::Config(format!("Invalid ORDER_NUMBER_ATTEMPTS value: {}", raw)))?,
      None => DEFAULT_ORDER_NUMBER_ATTEMPTS,
    };

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    let log_format = match get_env("LOG_FORMAT").as_deref() {
      None | Some("text") => LogFormat::Text,
      Some("json") => LogFormat::Json,
      Some(other) => return Err(AppError::Config(format!("Invalid LOG_FORMAT value: {}", other))),
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      whatsapp_number,
      order_number_attempts,
      seed_db,
      log_format,
    })
  }

  /// The notification destination reduced to its digits, as `wa.me` expects.
  pub fn whatsapp_digits(&self) -> String {
    self.whatsapp_number.chars().filter(|c| c.is_ascii_digit()).collect()
  }
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
      order_number_attempts: DEFAULT_ORDER_NUMBER_ATTEMPTS,
      seed_db: false,
      log_format: LogFormat::Text,
    }
  }
}
