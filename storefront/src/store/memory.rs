// storefront/src/store/memory.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use crate::errors::{AppError, Result};
use crate::models::{Cart, CartEntry, CartIdentity, CartLine, Offer, Order, OrderLine, Product, User};
use crate::store::{quantity_overflow, Store};

#[derive(Default)]
struct Tables {
  products: HashMap<Uuid, Product>,
  users: HashMap<Uuid, User>,
  carts: Vec<Cart>,
  // Vec keeps insertion order, which is the order lines are shown in.
  cart_lines: Vec<CartLine>,
  offers: HashMap<Uuid, Offer>,
  offer_products: Vec<(Uuid, Uuid)>,
  orders: HashMap<Uuid, Order>,
  order_lines: Vec<OrderLine>,
}

impl Tables {
  fn with_lines(&self, order: &Order) -> Order {
    let mut order = order.clone();
    order.lines = self
      .order_lines
      .iter()
      .filter(|l| l.order_id == order.id)
      .cloned()
      .collect();
    order
  }
}

/// In-process store. Every operation runs inside one lock section, which is
/// what makes `add_cart_quantity` atomic here.
#[derive(Default)]
pub struct MemoryStore {
  tables: RwLock<Tables>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert_product(&self, product: Product) {
    self.tables.write().products.insert(product.id, product);
  }

  /// Replaces a product in place, e.g. to change its price or stock.
  pub fn update_product(&self, product: Product) -> Result<()> {
    let mut tables = self.tables.write();
    match tables.products.get_mut(&product.id) {
      Some(existing) => {
        *existing = product;
        Ok(())
      }
      None => Err(AppError::NotFound(format!("Product {} not found", product.id))),
    }
  }

  /// Deletes a product. Cart lines go with it; order lines keep their
  /// snapshot and lose the product reference.
  pub fn delete_product(&self, product_id: Uuid) {
    let mut tables = self.tables.write();
    tables.products.remove(&product_id);
    tables.cart_lines.retain(|l| l.product_id != product_id);
    tables.offer_products.retain(|(_, p)| *p != product_id);
    for line in tables.order_lines.iter_mut().filter(|l| l.product_id == Some(product_id)) {
      line.product_id = None;
    }
  }

  pub fn insert_user(&self, user: User) {
    self.tables.write().users.insert(user.id, user);
  }

  pub fn insert_offer(&self, offer: Offer) {
    self.tables.write().offers.insert(offer.id, offer);
  }

  pub fn link_offer_product(&self, offer_id: Uuid, product_id: Uuid) {
    let mut tables = self.tables.write();
    if !tables.offer_products.contains(&(offer_id, product_id)) {
      tables.offer_products.push((offer_id, product_id));
    }
  }

  pub fn order_count(&self) -> usize {
    self.tables.read().orders.len()
  }

  pub fn order_line_count(&self) -> usize {
    self.tables.read().order_lines.len()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn product(&self, product_id: Uuid) -> Result<Option<Product>> {
    Ok(self.tables.read().products.get(&product_id).cloned())
  }

  async fn user(&self, user_id: Uuid) -> Result<Option<User>> {
    Ok(self.tables.read().users.get(&user_id).cloned())
  }

  async fn get_or_create_cart(&self, identity: &CartIdentity) -> Result<Cart> {
    let mut tables = self.tables.write();
    let existing = tables.carts.iter().find(|cart| match identity {
      CartIdentity::User(id) => cart.user_id == Some(*id),
      CartIdentity::Session(token) => cart.session_key.as_deref() == Some(token.as_str()),
    });
    if let Some(cart) = existing {
      return Ok(cart.clone());
    }
    let cart = Cart::for_identity(identity);
    tables.carts.push(cart.clone());
    Ok(cart)
  }

  async fn cart_entries(&self, cart_id: Uuid) -> Result<Vec<CartEntry>> {
    let tables = self.tables.read();
    let entries = tables
      .cart_lines
      .iter()
      .filter(|l| l.cart_id == cart_id)
      .filter_map(|line| {
        tables.products.get(&line.product_id).map(|product| CartEntry {
          line: line.clone(),
          product: product.clone(),
        })
      })
      .collect();
    Ok(entries)
  }

  async fn add_cart_quantity(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartLine> {
    let mut tables = self.tables.write();
    if let Some(line) = tables
      .cart_lines
      .iter_mut()
      .find(|l| l.cart_id == cart_id && l.product_id == product_id)
    {
      line.quantity = line.quantity.checked_add(quantity).ok_or_else(quantity_overflow)?;
      return Ok(line.clone());
    }
    let line = CartLine {
      id: Uuid::new_v4(),
      cart_id,
      product_id,
      quantity,
      added_at: Utc::now(),
    };
    tables.cart_lines.push(line.clone());
    Ok(line)
  }

  async fn set_cart_line_quantity(&self, cart_id: Uuid, line_id: Uuid, quantity: i32) -> Result<Option<CartLine>> {
    let mut tables = self.tables.write();
    let line = tables
      .cart_lines
      .iter_mut()
      .find(|l| l.cart_id == cart_id && l.id == line_id)
      .map(|line| {
        line.quantity = quantity;
        line.clone()
      });
    Ok(line)
  }

  async fn delete_cart_line(&self, cart_id: Uuid, line_id: Uuid) -> Result<bool> {
    let mut tables = self.tables.write();
    let before = tables.cart_lines.len();
    tables.cart_lines.retain(|l| !(l.cart_id == cart_id && l.id == line_id));
    Ok(tables.cart_lines.len() != before)
  }

  async fn clear_cart(&self, cart_id: Uuid) -> Result<u64> {
    let mut tables = self.tables.write();
    let before = tables.cart_lines.len();
    tables.cart_lines.retain(|l| l.cart_id != cart_id);
    Ok((before - tables.cart_lines.len()) as u64)
  }

  async fn remove_cart_quantities(&self, cart_id: Uuid, quantities: &[(Uuid, i32)]) -> Result<u64> {
    let mut tables = self.tables.write();
    let mut touched = 0;
    for (line_id, quantity) in quantities {
      if let Some(line) = tables
        .cart_lines
        .iter_mut()
        .find(|l| l.cart_id == cart_id && l.id == *line_id)
      {
        line.quantity -= quantity;
        touched += 1;
      }
    }
    tables.cart_lines.retain(|l| l.cart_id != cart_id || l.quantity > 0);
    Ok(touched)
  }

  async fn offer(&self, offer_id: Uuid) -> Result<Option<Offer>> {
    Ok(self.tables.read().offers.get(&offer_id).cloned())
  }

  async fn offers_active_at(&self, at: DateTime<Utc>) -> Result<Vec<Offer>> {
    let tables = self.tables.read();
    let mut offers: Vec<Offer> = tables.offers.values().filter(|o| o.is_valid(at)).cloned().collect();
    offers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(offers)
  }

  async fn offer_products(&self, offer_id: Uuid) -> Result<Vec<Product>> {
    let tables = self.tables.read();
    Ok(
      tables
        .offer_products
        .iter()
        .filter(|(o, _)| *o == offer_id)
        .filter_map(|(_, p)| tables.products.get(p).cloned())
        .collect(),
    )
  }

  async fn order_number_exists(&self, order_number: &str) -> Result<bool> {
    Ok(self.tables.read().orders.values().any(|o| o.order_number == order_number))
  }

  async fn insert_order(&self, order: &Order) -> Result<()> {
    let mut tables = self.tables.write();
    if tables.orders.values().any(|o| o.order_number == order.order_number) {
      return Err(AppError::Internal(format!(
        "Duplicate order number {}",
        order.order_number
      )));
    }
    let mut header = order.clone();
    header.lines.clear();
    tables.orders.insert(header.id, header);
    Ok(())
  }

  async fn insert_order_lines(&self, lines: &[OrderLine]) -> Result<()> {
    let mut tables = self.tables.write();
    if let Some(orphan) = lines.iter().find(|l| !tables.orders.contains_key(&l.order_id)) {
      return Err(AppError::Internal(format!("Order {} does not exist", orphan.order_id)));
    }
    tables.order_lines.extend(lines.iter().cloned());
    Ok(())
  }

  async fn delete_order(&self, order_id: Uuid) -> Result<()> {
    let mut tables = self.tables.write();
    tables.orders.remove(&order_id);
    tables.order_lines.retain(|l| l.order_id != order_id);
    Ok(())
  }

  async fn update_order(&self, order: &Order) -> Result<()> {
    let mut tables = self.tables.write();
    let stored = tables
      .orders
      .get_mut(&order.id)
      .ok_or_else(|| AppError::NotFound(format!("Order {} not found", order.order_number)))?;
    stored.status = order.status;
    stored.total_amount = order.total_amount;
    stored.whatsapp_link = order.whatsapp_link.clone();
    stored.updated_at = order.updated_at;
    Ok(())
  }

  async fn order_by_number(&self, user_id: Uuid, order_number: &str) -> Result<Option<Order>> {
    let tables = self.tables.read();
    Ok(
      tables
        .orders
        .values()
        .find(|o| o.user_id == user_id && o.order_number == order_number)
        .map(|o| tables.with_lines(o)),
    )
  }

  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let tables = self.tables.read();
    let mut orders: Vec<Order> = tables
      .orders
      .values()
      .filter(|o| o.user_id == user_id)
      .map(|o| tables.with_lines(o))
      .collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }
}
