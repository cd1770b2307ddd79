//! Client behaviour against an in-process fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use threadline_backend::{BackendClient, BackendConfig, BackendError, NewOrderItem, ProductFilter};
use threadline_core::{OrderId, Price, ProductId, UserId, VariantId};
use tokio::sync::Mutex;
use url::Url;

#[derive(Clone, Default)]
struct Fake {
    product_reads: Arc<AtomicUsize>,
    units_sold: Arc<AtomicUsize>,
    search_calls: Arc<AtomicUsize>,
    last_query: Arc<Mutex<HashMap<String, String>>>,
    last_body: Arc<Mutex<Value>>,
}

fn product_json(id: &str) -> Value {
    product_with_stock(id, 3)
}

fn product_with_stock(id: &str, stock: usize) -> Value {
    json!({
        "productId": id,
        "name": format!("Product {id}"),
        "description": "",
        "isArchived": false,
        "variants": [{
            "variantId": format!("{id}-v1"), "productId": id, "size": "M", "color": "Navy",
            "price": 20.0, "stock": stock, "sku": "SKU", "images": []
        }],
        "categories": []
    })
}

async fn list_products(
    State(fake): State<Fake>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    *fake.last_query.lock().await = query;
    Json(json!({ "totalProducts": 41, "products": [product_json("p1")] }))
}

async fn get_product(State(fake): State<Fake>, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    fake.product_reads.fetch_add(1, Ordering::SeqCst);
    if id == "missing" {
        return Err(StatusCode::NOT_FOUND);
    }
    let sold = fake.units_sold.load(Ordering::SeqCst);
    Ok(Json(product_with_stock(&id, 3_usize.saturating_sub(sold))))
}

async fn add_order_item(State(fake): State<Fake>, Json(body): Json<Value>) -> StatusCode {
    let quantity = body["quantity"].as_u64().unwrap_or_default();
    fake.units_sold
        .fetch_add(usize::try_from(quantity).unwrap(), Ordering::SeqCst);
    StatusCode::CREATED
}

async fn get_cart(headers: HeaderMap, Path(user): Path<String>) -> Result<Json<Value>, StatusCode> {
    let expected = "Bearer secret-token";
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(Json(json!({
        "cartId": "c1", "userId": user, "createdAt": "2025-01-01T00:00:00",
        "items": [
            {"cartItemId": "i1", "variantId": "v1", "variantName": "Navy / M", "price": 10.25, "quantity": 2},
            {"cartItemId": "i2", "variantId": "v2", "variantName": "Sand / L", "price": 5.0, "quantity": 1}
        ]
    })))
}

async fn create_order(State(fake): State<Fake>, Json(body): Json<Value>) -> Json<Value> {
    *fake.last_body.lock().await = body.clone();
    Json(json!({
        "orderId": "o1", "userId": body["userId"], "paymentIntentId": body["paymentIntentId"],
        "status": "pending", "createdAt": "2025-01-01T00:00:00Z", "items": []
    }))
}

async fn register() -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"message": "Email is already registered"})),
    )
}

async fn search(State(fake): State<Fake>) -> Json<Value> {
    fake.search_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!([{ "id": "p1", "name": "Coat", "description": "", "isArchived": false,
        "variants": [{"id": "v1", "color": "Navy", "size": "M", "price": 99.0, "stock": 1}],
        "categories": [{"name": "Formal"}] }]))
}

async fn wishlist(Path(user): Path<String>) -> Json<Value> {
    Json(json!([
        {"wishlistItemId": "w1", "userId": user, "productId": "p2", "productName": "", "addedAt": "2025-01-01T00:00:00Z"},
        {"wishlistItemId": "w2", "userId": user, "productId": "p1", "productName": "", "addedAt": "2025-01-02T00:00:00Z"},
        {"wishlistItemId": "w3", "userId": user, "productId": "missing", "productName": "", "addedAt": "2025-01-03T00:00:00Z"}
    ]))
}

async fn remove_wishlist_item(State(fake): State<Fake>, Json(body): Json<Value>) -> StatusCode {
    *fake.last_body.lock().await = body;
    StatusCode::NO_CONTENT
}

async fn spawn(fake: Fake) -> BackendClient {
    let app = Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/users", post(register))
        .route("/api/users/{id}/cart", get(get_cart))
        .route("/api/users/{id}/wishlist", get(wishlist))
        .route("/api/users/{id}/wishlist/items", delete(remove_wishlist_item))
        .route("/api/orders", post(create_order))
        .route("/api/orders/{id}/items", post(add_order_item))
        .route("/api/search", get(search))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = Url::parse(&format!("http://{addr}/api/")).unwrap();
    BackendClient::new(&BackendConfig::new(base)).unwrap()
}

#[tokio::test]
async fn test_list_products_sends_paging_and_filters() {
    let fake = Fake::default();
    let client = spawn(fake.clone()).await;

    let filter = ProductFilter {
        search_term: Some("coat".to_string()),
        ..ProductFilter::active()
    };
    let page = client.list_products(3, 20, &filter).await.unwrap();
    assert_eq!(page.total_products, 41);
    assert_eq!(page.products.len(), 1);

    let query = fake.last_query.lock().await.clone();
    assert_eq!(query.get("pageNumber").map(String::as_str), Some("3"));
    assert_eq!(query.get("pageSize").map(String::as_str), Some("20"));
    assert_eq!(query.get("searchTerm").map(String::as_str), Some("coat"));
    assert_eq!(query.get("isArchived").map(String::as_str), Some("false"));
    assert!(!query.contains_key("color"));
}

#[tokio::test]
async fn test_get_product_is_cached() {
    let fake = Fake::default();
    let client = spawn(fake.clone()).await;
    let id = ProductId::new("p7");

    let first = client.get_product(&id).await.unwrap();
    let second = client.get_product(&id).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(fake.product_reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_fetch_product_bypasses_cache() {
    let fake = Fake::default();
    let client = spawn(fake.clone()).await;
    let id = ProductId::new("p7");

    client.get_product(&id).await.unwrap();
    client.fetch_product(&id).await.unwrap();
    assert_eq!(fake.product_reads.load(Ordering::SeqCst), 2);

    client.get_product(&id).await.unwrap();
    assert_eq!(fake.product_reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_order_item_drops_cached_stock() {
    let fake = Fake::default();
    let client = spawn(fake.clone()).await;
    let id = ProductId::new("p1");

    let before = client.get_product(&id).await.unwrap();
    assert_eq!(before.total_stock(), 3);

    let line = NewOrderItem {
        variant_id: VariantId::new("p1-v1"),
        quantity: 1,
        price_at_purchase: Price::ZERO,
    };
    client
        .add_order_item(&OrderId::new("o1"), &line)
        .await
        .unwrap();

    let after = client.get_product(&id).await.unwrap();
    assert_eq!(after.total_stock(), 2);
}

#[tokio::test]
async fn test_missing_product_maps_to_not_found() {
    let client = spawn(Fake::default()).await;
    let err = client.get_product(&ProductId::new("missing")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_bearer_token_is_sent_when_authorized() {
    let client = spawn(Fake::default()).await;
    let user = UserId::new("u1");

    let anonymous = client.get_cart(&user).await.unwrap_err();
    assert!(matches!(anonymous, BackendError::Unauthorized));

    let cart = client.authorized("secret-token").get_cart(&user).await.unwrap();
    assert_eq!(cart.total(), Price::from_cents(2550));
}

#[tokio::test]
async fn test_validation_message_is_surfaced() {
    let client = spawn(Fake::default()).await;
    let registration = threadline_backend::RegisterRequest {
        email: "ada@example.com".to_string(),
        password: "secret1".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
    };
    let err = client.register(&registration).await.unwrap_err();
    assert_eq!(err.user_message(), "Email is already registered");
}

#[tokio::test]
async fn test_create_order_posts_pending_status() {
    let fake = Fake::default();
    let client = spawn(fake.clone()).await;

    let order = client
        .create_order(&UserId::new("u1"), "pi_123")
        .await
        .unwrap();
    assert_eq!(order.order_id.as_str(), "o1");

    let body = fake.last_body.lock().await.clone();
    assert_eq!(body["status"], "Pending");
    assert_eq!(body["paymentIntentId"], "pi_123");
}

#[tokio::test]
async fn test_blank_search_skips_backend() {
    let fake = Fake::default();
    let client = spawn(fake.clone()).await;

    assert!(client.search("   ").await.unwrap().is_empty());
    assert_eq!(fake.search_calls.load(Ordering::SeqCst), 0);

    let results = client.search("coat").await.unwrap();
    assert_eq!(results[0].category_names(), "Formal");
    assert_eq!(fake.search_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_wishlist_products_keep_order_and_skip_deleted() {
    let fake = Fake::default();
    let client = spawn(fake.clone()).await;

    let wishlist = client.wishlist_products(&UserId::new("u1")).await.unwrap();
    let ids: Vec<_> = wishlist.products.iter().map(|p| p.product_id.as_str()).collect();
    assert_eq!(ids, vec!["p2", "p1"]);
    assert_eq!(wishlist.unavailable, vec![ProductId::new("missing")]);

    client
        .remove_wishlist_item(&UserId::new("u1"), &ProductId::new("p2"))
        .await
        .unwrap();
    assert_eq!(fake.last_body.lock().await.clone(), json!({"productId": "p2"}));
}
