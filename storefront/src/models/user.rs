// storefront/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Signed-in customer. Authentication itself happens upstream; orders copy
/// their contact fields from here.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
  pub id: Uuid,
  pub full_name: String,
  pub phone: String,
  pub email: Option<String>,
  pub is_active: bool,
  pub date_joined: DateTime<Utc>,
}
