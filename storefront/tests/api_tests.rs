// tests/api_tests.rs
mod common;

use actix_web::http::StatusCode;
use actix_web::{test, web::Data, App};
use common::*;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use storefront::web::configure_app_routes;
use storefront::web::extractors::{SESSION_KEY_HEADER, USER_ID_HEADER};

macro_rules! app {
  ($state:expr) => {
    test::init_service(App::new().app_data(Data::new($state)).configure(configure_app_routes)).await
  };
}

#[actix_web::test]
async fn test_health() {
  let w = world();
  let app = app!(w.state.clone());
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/health").to_request()).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_guest_cart_gets_a_session_key() {
  let w = world();
  let gauze = add_product(&w.store, "Gauze", dec!(12.50), 0, 10, true);
  let app = app!(w.state.clone());

  let req = test::TestRequest::post()
    .uri("/api/v1/cart/add")
    .set_json(json!({ "product_id": gauze.id, "quantity": 2 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let session = resp.headers().get(SESSION_KEY_HEADER).unwrap().to_str().unwrap().to_string();
  assert_eq!(session, "guest-1");

  let req = test::TestRequest::get()
    .uri("/api/v1/cart")
    .insert_header((SESSION_KEY_HEADER, session.as_str()))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(resp.headers().get(SESSION_KEY_HEADER).is_none());
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], true);
  assert_eq!(body["cart"]["total_items"], 2);
  assert_eq!(body["cart"]["total_price"], "25.00");
}

#[actix_web::test]
async fn test_unknown_product_is_404() {
  let w = world();
  let app = app!(w.state.clone());
  let req = test::TestRequest::post()
    .uri("/api/v1/cart/add")
    .set_json(json!({ "product_id": uuid::Uuid::new_v4() }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["error"], "not_found");
}

#[actix_web::test]
async fn test_orders_require_a_user() {
  let w = world();
  let app = app!(w.state.clone());
  let resp = test::call_service(&app, test::TestRequest::get().uri("/api/v1/orders").to_request()).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::get()
    .uri("/api/v1/orders")
    .insert_header((USER_ID_HEADER, "not-a-uuid"))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header((USER_ID_HEADER, uuid::Uuid::new_v4().to_string()))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_empty_cart_checkout_is_a_business_rule_error() {
  let w = world();
  let user = add_user(&w.store, "Nobody Home");
  let app = app!(w.state.clone());
  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header((USER_ID_HEADER, user.id.to_string()))
    .set_json(json!({ "address": "Giza" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "business_rule");
  assert_eq!(w.store.order_count(), 0);
}

#[actix_web::test]
async fn test_user_flow_from_cart_to_confirmed_order() {
  let w = world();
  let user = add_user(&w.store, "Sara Nabil");
  let uid = user.id.to_string();
  let thermometer = add_product(&w.store, "Thermometer", dec!(185.50), 0, 12, true);
  let gloves = add_product(&w.store, "Gloves", dec!(250.00), 10, 40, true);
  let (start, end) = running_window();
  let offer = add_offer(&w.store, "Clinic Kit", start, end, &[&gloves]);
  let app = app!(w.state.clone());

  let req = test::TestRequest::post()
    .uri("/api/v1/cart/add")
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .set_json(json!({ "product_id": thermometer.id, "quantity": 2 }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert!(resp.headers().get(SESSION_KEY_HEADER).is_none());

  let req = test::TestRequest::get().uri("/api/v1/offers").to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["offers"].as_array().unwrap().len(), 1);

  let req = test::TestRequest::post()
    .uri("/api/v1/offers/apply")
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .set_json(json!({ "offer_id": offer.id }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["added"], json!(["Gloves"]));
  assert_eq!(body["cart_count"], 3);
  assert_eq!(body["cart_total"], "596.00");

  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .set_json(json!({ "address": "5 Nile Corniche, Cairo", "notes": "Ring twice" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  let number = body["order_number"].as_str().unwrap().to_string();
  assert_eq!(body["order"]["status"], "pending");
  assert_eq!(body["order"]["total_amount"], "596.00");
  assert!(body["whatsapp_link"].as_str().unwrap().starts_with("https://wa.me/201013928114?text="));

  let req = test::TestRequest::get()
    .uri("/api/v1/cart")
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["cart"]["total_items"], 0);

  let req = test::TestRequest::get()
    .uri("/api/v1/orders")
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["orders"].as_array().unwrap().len(), 1);

  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", number))
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["lines"].as_array().unwrap().len(), 2);

  // Somebody else's order number is invisible.
  let stranger = add_user(&w.store, "Stranger");
  let req = test::TestRequest::get()
    .uri(&format!("/api/v1/orders/{}", number))
    .insert_header((USER_ID_HEADER, stranger.id.to_string()))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let req = test::TestRequest::post()
    .uri(&format!("/api/v1/orders/{}/confirm", number))
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["status"], "processing");

  // Only cancellation is open to customers.
  let req = test::TestRequest::put()
    .uri(&format!("/api/v1/orders/{}/status", number))
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .set_json(json!({ "status": "completed" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "validation");

  let req = test::TestRequest::put()
    .uri(&format!("/api/v1/orders/{}/status", number))
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .set_json(json!({ "status": "cancelled" }))
    .to_request();
  let body: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(body["order"]["status"], "cancelled");

  // A cancelled order cannot be cancelled again.
  let req = test::TestRequest::put()
    .uri(&format!("/api/v1/orders/{}/status", number))
    .insert_header((USER_ID_HEADER, uid.as_str()))
    .set_json(json!({ "status": "cancelled" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "business_rule");
}

#[actix_web::test]
async fn test_malformed_body_is_a_validation_error() {
  let w = world();
  let app = app!(w.state.clone());
  let req = test::TestRequest::post()
    .uri("/api/v1/cart/add")
    .insert_header(("content-type", "application/json"))
    .set_payload("{not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["error"], "validation");
}

#[actix_web::test]
async fn test_malformed_order_details_are_rejected() {
  let w = world();
  let user = add_user(&w.store, "Typo");
  let gloves = add_product(&w.store, "Gloves", dec!(250.00), 0, 40, true);
  let cart = user_cart(w.state.store.as_ref(), &user).await;
  storefront::services::cart_service::add_line(w.state.store.as_ref(), &cart, &gloves, 1)
    .await
    .unwrap();
  let app = app!(w.state.clone());

  for payload in [r#"{"address": 5}"#, "{not json"] {
    let req = test::TestRequest::post()
      .uri("/api/v1/orders")
      .insert_header((USER_ID_HEADER, user.id.to_string()))
      .insert_header(("content-type", "application/json"))
      .set_payload(payload)
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation");
  }
  assert_eq!(w.store.order_count(), 0);

  // No body at all falls back to the user's own details.
  let req = test::TestRequest::post()
    .uri("/api/v1/orders")
    .insert_header((USER_ID_HEADER, user.id.to_string()))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["order"]["full_name"], "Typo");
}
