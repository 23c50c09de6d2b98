// storefront/src/services/mod.rs
pub mod cart_service;
pub mod notification;
pub mod offer_service;
pub mod order_number;
pub mod order_service;
pub mod session;
