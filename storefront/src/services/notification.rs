// storefront/src/services/notification.rs

//! Order summary text and the WhatsApp deep link that carries it.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::models::Order;
use crate::money::format_amount;

pub const ORDER_TITLE: &str = "طلب جديد من Entity Medical";
pub const CURRENCY: &str = "جنيه";

const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Everything but `A-Z a-z 0-9 - _ . ~ /` is escaped; a space becomes `%20`.
const MESSAGE_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'_')
  .remove(b'.')
  .remove(b'~')
  .remove(b'/');

/// Renders the order as the multi-line summary sent to the shop.
///
/// Lines follow `order.lines` order; there is no trailing newline.
pub fn render_summary(order: &Order) -> String {
  let mut lines = vec![
    ORDER_TITLE.to_string(),
    format!("رقم الطلب: {}", order.order_number),
    format!("الاسم: {}", order.full_name),
    format!("الهاتف: {}", order.phone),
    format!("العنوان: {}", order.address),
    String::new(),
    "تفاصيل الطلب:".to_string(),
  ];
  lines.extend(order.lines.iter().map(|line| {
    format!(
      "• {} x {} = {} {}",
      line.product_name,
      line.quantity,
      format_amount(line.subtotal()),
      CURRENCY
    )
  }));
  lines.push(String::new());
  lines.push(format!("المبلغ الإجمالي: {} {}", format_amount(order.total_amount), CURRENCY));
  lines.join("\n")
}

/// `https://wa.me/{digits}?text={summary}` for `destination`.
///
/// Non-digits in `destination` (a leading `+`, spaces) are dropped.
pub fn build_link(order: &Order, destination: &str) -> String {
  let digits: String = destination.chars().filter(|c| c.is_ascii_digit()).collect();
  let summary = render_summary(order);
  let text = utf8_percent_encode(&summary, MESSAGE_ESCAPE);
  format!("{}/{}?text={}", WHATSAPP_BASE_URL, digits, text)
}
