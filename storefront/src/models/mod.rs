// storefront/src/models/mod.rs

//! Domain records and the response views built from them.

pub mod cart;
pub mod offer;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartEntry, CartIdentity, CartLine, CartTotals, CartView, SessionToken};
pub use offer::{Offer, OfferType};
pub use order::{CustomerDetails, Order, OrderLine, OrderStatus};
pub use product::{Product, ProductSummary};
pub use user::User;
