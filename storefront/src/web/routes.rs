// storefront/src/web/routes.rs

use actix_web::web;

use crate::errors::AppError;
use crate::web::handlers::{cart_handlers, offer_handlers, order_handlers};

/// Malformed JSON bodies answer with the usual validation error body.
fn json_config() -> web::JsonConfig {
  web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into())
}

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .app_data(json_config())
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/update", web::put().to(cart_handlers::update_cart_item_handler))
          .route("/remove", web::delete().to(cart_handlers::remove_cart_item_handler))
          .route("/clear", web::post().to(cart_handlers::clear_cart_handler)),
      )
      .service(
        web::scope("/offers")
          .route("", web::get().to(offer_handlers::list_offers_handler))
          .route("/apply", web::post().to(offer_handlers::apply_offer_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_number}", web::get().to(order_handlers::get_order_handler))
          .route(
            "/{order_number}/confirm",
            web::post().to(order_handlers::confirm_order_handler),
          )
          .route(
            "/{order_number}/status",
            web::put().to(order_handlers::update_order_status_handler),
          ),
      ),
  );
}
