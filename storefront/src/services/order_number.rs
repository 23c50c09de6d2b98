// storefront/src/services/order_number.rs

use rand::Rng;

use crate::errors::{AppError, Result};
use crate::store::Store;

pub const ORDER_NUMBER_PREFIX: &str = "EM";
const ORDER_NUMBER_DIGITS: usize = 8;

/// `EM` followed by 8 random decimal digits.
pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> String {
  let mut number = String::with_capacity(ORDER_NUMBER_PREFIX.len() + ORDER_NUMBER_DIGITS);
  number.push_str(ORDER_NUMBER_PREFIX);
  for _ in 0..ORDER_NUMBER_DIGITS {
    let digit = rng.gen_range(0..10u8);
    number.push(char::from(b'0' + digit));
  }
  number
}

/// Draws numbers until one is unused, giving up after `attempts` draws.
///
/// The `orders.order_number` UNIQUE constraint still catches a race between
/// this check and the insert.
pub async fn allocate(store: &dyn Store, attempts: u32) -> Result<String> {
  for attempt in 1..=attempts {
    let candidate = generate(&mut rand::thread_rng());
    if !store.order_number_exists(&candidate).await? {
      return Ok(candidate);
    }
    tracing::warn!(attempt, order_number = %candidate, "Order number collision, drawing again.");
  }
  Err(AppError::Internal(format!(
    "Could not allocate a unique order number after {} attempts",
    attempts
  )))
}
