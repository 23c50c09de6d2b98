// storefront/src/store/postgres.rs

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{Cart, CartEntry, CartIdentity, CartLine, Offer, Order, OrderLine, Product, User};
use crate::store::{quantity_overflow, Store};

const PRODUCT_COLUMNS: &str =
  "id, name, slug, description, price, discount_percentage, stock, is_active, created_at, updated_at";
const CART_COLUMNS: &str = "id, user_id, session_key, created_at, updated_at";
const CART_LINE_COLUMNS: &str = "id, cart_id, product_id, quantity, added_at";
const OFFER_COLUMNS: &str = "id, title, description, offer_type, discount_value, start_date, end_date, \
   is_active, is_featured, badge_text, badge_color, created_at";
const ORDER_COLUMNS: &str = "id, user_id, order_number, full_name, phone, email, address, notes, status, \
   total_amount, whatsapp_link, created_at, updated_at";
const ORDER_LINE_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, price";

/// `cart_items` joined with `products`.
#[derive(FromRow)]
struct CartEntryRow {
  line_id: Uuid,
  cart_id: Uuid,
  quantity: i32,
  added_at: DateTime<Utc>,
  product_id: Uuid,
  name: String,
  slug: String,
  description: Option<String>,
  price: Decimal,
  discount_percentage: i32,
  stock: i32,
  is_active: bool,
  product_created_at: DateTime<Utc>,
  product_updated_at: DateTime<Utc>,
}

impl From<CartEntryRow> for CartEntry {
  fn from(row: CartEntryRow) -> Self {
    CartEntry {
      line: CartLine {
        id: row.line_id,
        cart_id: row.cart_id,
        product_id: row.product_id,
        quantity: row.quantity,
        added_at: row.added_at,
      },
      product: Product {
        id: row.product_id,
        name: row.name,
        slug: row.slug,
        description: row.description,
        price: row.price,
        discount_percentage: row.discount_percentage,
        stock: row.stock,
        is_active: row.is_active,
        created_at: row.product_created_at,
        updated_at: row.product_updated_at,
      },
    }
  }
}

/// Postgres adapter. Schema: `migrations/0001_storefront.sql`.
#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  pub async fn migrate(&self) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .context("running storefront migrations")
  }

  async fn attach_lines(&self, mut orders: Vec<Order>) -> Result<Vec<Order>> {
    if orders.is_empty() {
      return Ok(orders);
    }
    let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let lines = sqlx::query_as::<_, OrderLine>(&format!(
      "SELECT {} FROM order_items WHERE order_id = ANY($1) ORDER BY position",
      ORDER_LINE_COLUMNS
    ))
    .bind(&ids)
    .fetch_all(&self.pool)
    .await?;

    for order in orders.iter_mut() {
      order.lines = lines.iter().filter(|l| l.order_id == order.id).cloned().collect();
    }
    Ok(orders)
  }
}

#[async_trait]
impl Store for PgStore {
  #[instrument(name = "PgStore::product", skip(self), err(Display))]
  async fn product(&self, product_id: Uuid) -> Result<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(product_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(product)
  }

  #[instrument(name = "PgStore::user", skip(self), err(Display))]
  async fn user(&self, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
      "SELECT id, full_name, phone, email, is_active, date_joined FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(&self.pool)
    .await?;
    Ok(user)
  }

  #[instrument(name = "PgStore::get_or_create_cart", skip(self), fields(identity = %identity), err(Display))]
  async fn get_or_create_cart(&self, identity: &CartIdentity) -> Result<Cart> {
    let candidate = Cart::for_identity(identity);
    let owner_column = match identity {
      CartIdentity::User(_) => "user_id",
      CartIdentity::Session(_) => "session_key",
    };

    sqlx::query(&format!(
      "INSERT INTO carts ({}) VALUES ($1, $2, $3, $4, $5) ON CONFLICT ({}) DO NOTHING",
      CART_COLUMNS, owner_column
    ))
    .bind(candidate.id)
    .bind(candidate.user_id)
    .bind(&candidate.session_key)
    .bind(candidate.created_at)
    .bind(candidate.updated_at)
    .execute(&self.pool)
    .await?;

    let query = format!("SELECT {} FROM carts WHERE {} = $1", CART_COLUMNS, owner_column);
    let cart = match identity {
      CartIdentity::User(id) => sqlx::query_as::<_, Cart>(&query).bind(*id).fetch_one(&self.pool).await?,
      CartIdentity::Session(token) => {
        sqlx::query_as::<_, Cart>(&query)
          .bind(token.as_str())
          .fetch_one(&self.pool)
          .await?
      }
    };
    Ok(cart)
  }

  #[instrument(name = "PgStore::cart_entries", skip(self), err(Display))]
  async fn cart_entries(&self, cart_id: Uuid) -> Result<Vec<CartEntry>> {
    let rows = sqlx::query_as::<_, CartEntryRow>(
      r#"
      SELECT ci.id AS line_id, ci.cart_id, ci.quantity, ci.added_at,
             p.id AS product_id, p.name, p.slug, p.description, p.price, p.discount_percentage,
             p.stock, p.is_active, p.created_at AS product_created_at, p.updated_at AS product_updated_at
      FROM cart_items ci
      JOIN products p ON p.id = ci.product_id
      WHERE ci.cart_id = $1
      ORDER BY ci.added_at, ci.id
      "#,
    )
    .bind(cart_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(CartEntry::from).collect())
  }

  #[instrument(name = "PgStore::add_cart_quantity", skip(self), err(Display))]
  async fn add_cart_quantity(&self, cart_id: Uuid, product_id: Uuid, quantity: i32) -> Result<CartLine> {
    let line = sqlx::query_as::<_, CartLine>(&format!(
      r#"
      INSERT INTO cart_items (id, cart_id, product_id, quantity, added_at)
      VALUES ($1, $2, $3, $4, NOW())
      ON CONFLICT (cart_id, product_id) DO UPDATE
      SET quantity = cart_items.quantity + EXCLUDED.quantity
      WHERE cart_items.quantity <= 2147483647 - EXCLUDED.quantity
      RETURNING {}
      "#,
      CART_LINE_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await?;
    // The conflict branch returns no row when the sum would overflow.
    line.ok_or_else(quantity_overflow)
  }

  #[instrument(name = "PgStore::set_cart_line_quantity", skip(self), err(Display))]
  async fn set_cart_line_quantity(&self, cart_id: Uuid, line_id: Uuid, quantity: i32) -> Result<Option<CartLine>> {
    let line = sqlx::query_as::<_, CartLine>(&format!(
      "UPDATE cart_items SET quantity = $3 WHERE cart_id = $1 AND id = $2 RETURNING {}",
      CART_LINE_COLUMNS
    ))
    .bind(cart_id)
    .bind(line_id)
    .bind(quantity)
    .fetch_optional(&self.pool)
    .await?;
    Ok(line)
  }

  #[instrument(name = "PgStore::delete_cart_line", skip(self), err(Display))]
  async fn delete_cart_line(&self, cart_id: Uuid, line_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND id = $2")
      .bind(cart_id)
      .bind(line_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }

  #[instrument(name = "PgStore::clear_cart", skip(self), err(Display))]
  async fn clear_cart(&self, cart_id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
      .bind(cart_id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  #[instrument(name = "PgStore::remove_cart_quantities", skip(self, quantities), fields(lines = quantities.len()), err(Display))]
  async fn remove_cart_quantities(&self, cart_id: Uuid, quantities: &[(Uuid, i32)]) -> Result<u64> {
    let mut tx = self.pool.begin().await?;
    let mut touched = 0;
    for (line_id, quantity) in quantities {
      let deleted = sqlx::query("DELETE FROM cart_items WHERE cart_id = $1 AND id = $2 AND quantity <= $3")
        .bind(cart_id)
        .bind(line_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;
      let reduced = sqlx::query("UPDATE cart_items SET quantity = quantity - $3 WHERE cart_id = $1 AND id = $2")
        .bind(cart_id)
        .bind(line_id)
        .bind(quantity)
        .execute(&mut *tx)
        .await?;
      touched += deleted.rows_affected() + reduced.rows_affected();
    }
    tx.commit().await?;
    Ok(touched)
  }

  #[instrument(name = "PgStore::offer", skip(self), err(Display))]
  async fn offer(&self, offer_id: Uuid) -> Result<Option<Offer>> {
    let offer = sqlx::query_as::<_, Offer>(&format!("SELECT {} FROM offers WHERE id = $1", OFFER_COLUMNS))
      .bind(offer_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(offer)
  }

  #[instrument(name = "PgStore::offers_active_at", skip(self), err(Display))]
  async fn offers_active_at(&self, at: DateTime<Utc>) -> Result<Vec<Offer>> {
    let offers = sqlx::query_as::<_, Offer>(&format!(
      "SELECT {} FROM offers WHERE is_active AND start_date <= $1 AND end_date >= $1 ORDER BY created_at DESC",
      OFFER_COLUMNS
    ))
    .bind(at)
    .fetch_all(&self.pool)
    .await?;
    Ok(offers)
  }

  #[instrument(name = "PgStore::offer_products", skip(self), err(Display))]
  async fn offer_products(&self, offer_id: Uuid) -> Result<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
      r#"
      SELECT p.id, p.name, p.slug, p.description, p.price, p.discount_percentage, p.stock,
             p.is_active, p.created_at, p.updated_at
      FROM offer_products op
      JOIN products p ON p.id = op.product_id
      WHERE op.offer_id = $1
      ORDER BY op.id
      "#,
    )
    .bind(offer_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(products)
  }

  #[instrument(name = "PgStore::order_number_exists", skip(self), err(Display))]
  async fn order_number_exists(&self, order_number: &str) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM orders WHERE order_number = $1)")
      .bind(order_number)
      .fetch_one(&self.pool)
      .await?;
    Ok(exists)
  }

  #[instrument(name = "PgStore::insert_order", skip(self, order), fields(order_number = %order.order_number), err(Display))]
  async fn insert_order(&self, order: &Order) -> Result<()> {
    sqlx::query(&format!(
      "INSERT INTO orders ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
      ORDER_COLUMNS
    ))
    .bind(order.id)
    .bind(order.user_id)
    .bind(&order.order_number)
    .bind(&order.full_name)
    .bind(&order.phone)
    .bind(&order.email)
    .bind(&order.address)
    .bind(&order.notes)
    .bind(order.status)
    .bind(order.total_amount)
    .bind(&order.whatsapp_link)
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(())
  }

  #[instrument(name = "PgStore::insert_order_lines", skip(self, lines), fields(count = lines.len()), err(Display))]
  async fn insert_order_lines(&self, lines: &[OrderLine]) -> Result<()> {
    let mut tx = self.pool.begin().await?;
    for (position, line) in lines.iter().enumerate() {
      sqlx::query(&format!(
        "INSERT INTO order_items ({}, position) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        ORDER_LINE_COLUMNS
      ))
      .bind(line.id)
      .bind(line.order_id)
      .bind(line.product_id)
      .bind(&line.product_name)
      .bind(line.quantity)
      .bind(line.price)
      .bind(position as i32)
      .execute(&mut *tx)
      .await?;
    }
    tx.commit().await?;
    Ok(())
  }

  #[instrument(name = "PgStore::delete_order", skip(self), err(Display))]
  async fn delete_order(&self, order_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(order_id)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  #[instrument(name = "PgStore::update_order", skip(self, order), fields(order_number = %order.order_number), err(Display))]
  async fn update_order(&self, order: &Order) -> Result<()> {
    sqlx::query("UPDATE orders SET status = $2, total_amount = $3, whatsapp_link = $4, updated_at = $5 WHERE id = $1")
      .bind(order.id)
      .bind(order.status)
      .bind(order.total_amount)
      .bind(&order.whatsapp_link)
      .bind(order.updated_at)
      .execute(&self.pool)
      .await?;
    Ok(())
  }

  #[instrument(name = "PgStore::order_by_number", skip(self), err(Display))]
  async fn order_by_number(&self, user_id: Uuid, order_number: &str) -> Result<Option<Order>> {
    let order = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 AND order_number = $2",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .bind(order_number)
    .fetch_optional(&self.pool)
    .await?;

    match order {
      Some(order) => Ok(self.attach_lines(vec![order]).await?.pop()),
      None => Ok(None),
    }
  }

  #[instrument(name = "PgStore::orders_for_user", skip(self), err(Display))]
  async fn orders_for_user(&self, user_id: Uuid) -> Result<Vec<Order>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    self.attach_lines(orders).await
  }
}
