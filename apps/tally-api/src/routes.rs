//! HTTP routes.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use tally_core::{LineItemRecord, LineItemRequest, OrderHeader, Product, Promotion, Receipt};

/// Builds the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .route("/checkout", post(checkout))
        .route("/products", get(list_products))
        .route("/products/{id}", get(get_product))
        .route("/promotions", get(list_promotions))
        .route("/orders/{id}", get(get_order))
        .with_state(state)
}

// =============================================================================
// Payloads
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<LineItemRequest>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub order_id: i64,
    pub items: Vec<String>,
    pub total_cents: i64,
    /// Two-decimal rendering of the total, e.g. "295.65".
    pub total_amount: String,
}

impl From<Receipt> for CheckoutResponse {
    fn from(receipt: Receipt) -> Self {
        CheckoutResponse {
            order_id: receipt.order_id,
            total_cents: receipt.total.cents(),
            total_amount: receipt.total.to_string(),
            items: receipt.items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: OrderHeader,
    pub lines: Vec<LineItemRecord>,
}

// =============================================================================
// Handlers
// =============================================================================

async fn ping() -> &'static str {
    "pong"
}

async fn checkout(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<Json<CheckoutResponse>> {
    let Json(request) = payload.map_err(|rejection| ApiError::validation(rejection.body_text()))?;

    let receipt = state.checkout.checkout(&request.items).await?;
    Ok(Json(receipt.into()))
}

async fn list_products(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(state.checkout.list_products().await?))
}

async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Product>> {
    debug!(product_id = id, "Fetching product");
    let product = state
        .db
        .products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;
    Ok(Json(product))
}

async fn list_promotions(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Promotion>>> {
    Ok(Json(state.checkout.list_promotions().await?))
}

async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<OrderResponse>> {
    let orders = state.db.orders();
    let order = orders
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order", id))?;
    let lines = orders.get_lines(id).await?;
    Ok(Json(OrderResponse { order, lines }))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tally_db::seed::seed_demo_catalog;
    use tally_db::Database;
    use tower::ServiceExt;

    async fn app() -> Router {
        let db = Database::in_memory().await.unwrap();
        seed_demo_catalog(&db).await.unwrap();
        router(AppState::new(db, None))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_checkout(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/checkout")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_ping() {
        let app = app().await;
        let response = app.oneshot(get("/ping")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"pong");
    }

    #[tokio::test]
    async fn test_checkout_returns_receipt() {
        let app = app().await;

        // seeded ids: 1 Google Home, 2 MacBook Pro, 3 Alexa Speaker, 4 Raspberry Pi B
        let body = json!({ "items": [{ "product_id": 3, "qty": 3 }] }).to_string();
        let (status, receipt) = send(&app, post_checkout(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(receipt["total_cents"], 29565);
        assert_eq!(receipt["total_amount"], "295.65");
        assert_eq!(receipt["items"].as_array().unwrap().len(), 3);

        let order_id = receipt["order_id"].as_i64().unwrap();
        let (status, order) = send(&app, get(&format!("/orders/{order_id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(order["order"]["total_cents"], 29565);
        assert_eq!(order["lines"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_insufficient_stock() {
        let app = app().await;

        let body = json!({ "items": [{ "product_id": 4, "qty": 3 }] }).to_string();
        let (status, err) = send(&app, post_checkout(body)).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(err["code"], "INSUFFICIENT_STOCK");

        let (_, product) = send(&app, get("/products/4")).await;
        assert_eq!(product["qty"], 2);
    }

    #[tokio::test]
    async fn test_checkout_bad_requests() {
        let app = app().await;

        let (status, err) = send(&app, post_checkout(json!({ "items": [] }).to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "VALIDATION_ERROR");

        let (status, err) = send(&app, post_checkout("{\"items\":".to_string())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(err["code"], "VALIDATION_ERROR");

        let body = json!({ "items": [{ "product_id": 999, "qty": 1 }] }).to_string();
        let (status, err) = send(&app, post_checkout(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_catalog_endpoints() {
        let app = app().await;

        let (status, products) = send(&app, get("/products")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(products.as_array().unwrap().len(), 4);

        let (_, promotions) = send(&app, get("/promotions")).await;
        assert_eq!(promotions.as_array().unwrap().len(), 3);

        let (status, product) = send(&app, get("/products/2")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(product["name"], "MacBook Pro");

        let (status, err) = send(&app, get("/products/77")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(err["message"], "Product not found: 77");

        let (status, _) = send(&app, get("/orders/1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
