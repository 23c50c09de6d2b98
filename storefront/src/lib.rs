// storefront/src/lib.rs

//! Storefront core: carts for guests and signed-in users, bulk "add the whole
//! offer" operations, checkout into immutable orders, and the WhatsApp link
//! an order is handed off with.
//!
//! Multi-step operations run as `flow` pipelines registered on `AppState`.

pub mod config;
pub mod errors;
pub mod models;
pub mod money;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod store;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, ErrorKind};
pub use state::AppState;
