//! Full-router tests with an in-memory session store and a fake backend.
//!
//! The palette database is unreachable, so only pages that do not need it
//! are exercised here.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use axum::body::Body;
use axum::extract::Query;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use threadline_admin::config::AdminConfig;
use threadline_admin::middleware::create_session_layer;
use threadline_admin::state::AppState;
use threadline_backend::BackendConfig;
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use url::Url;

const ADMIN_EMAIL: &str = "ops@example.com";
const SHOPPER_EMAIL: &str = "shopper@example.com";
const PASSWORD: &str = "correct horse";

async fn fake_login(Json(body): Json<Value>) -> Result<Json<Value>, StatusCode> {
    let known = [ADMIN_EMAIL, SHOPPER_EMAIL].contains(&body["email"].as_str().unwrap_or_default());
    if known && body["password"] == PASSWORD {
        Ok(Json(json!({ "token": "issued-token", "expiresIn": 3600 })))
    } else {
        Err(StatusCode::UNAUTHORIZED)
    }
}

#[derive(Deserialize)]
struct EmailQuery {
    email: String,
}

async fn fake_user_by_email(Query(query): Query<EmailQuery>) -> Json<Value> {
    let role = if query.email == ADMIN_EMAIL { "admin" } else { "customer" };
    Json(json!({
        "userId": "u-1",
        "email": query.email,
        "firstName": "Grace",
        "lastName": "Hopper",
        "createdAt": "2024-05-01T10:00:00Z",
        "isEmailVerified": true,
        "role": role
    }))
}

async fn fake_list_products() -> Json<Value> {
    Json(json!({
        "totalProducts": 1,
        "products": [{
            "productId": "p1",
            "name": "Harbor Coat",
            "description": "Wool blend",
            "isArchived": false,
            "variants": [
                {"variantId": "v1", "productId": "p1", "size": "M", "color": "Navy",
                 "price": 120.0, "stock": 3, "sku": "HC-M", "images": []},
                {"variantId": "v2", "productId": "p1", "size": "L", "color": "Navy",
                 "price": 125.0, "stock": 4, "sku": "HC-L", "images": []}
            ],
            "categories": []
        }]
    }))
}

async fn fake_list_categories() -> Json<Value> {
    Json(json!([
        {"categoryId": "c1", "name": "Outerwear"},
        {"categoryId": "c2", "name": "Formal"}
    ]))
}

async fn spawn_backend() -> Url {
    let app = Router::new()
        .route("/api/auth/login", post(fake_login))
        .route("/api/users/by-email", get(fake_user_by_email))
        .route("/api/products", get(fake_list_products))
        .route("/api/categories", get(fake_list_categories));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Url::parse(&format!("http://{addr}/api/")).unwrap()
}

async fn test_app() -> Router {
    let backend_url = spawn_backend().await;
    let config = AdminConfig {
        database_url: SecretString::from("postgres://localhost:1/threadline_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3001,
        base_url: "http://localhost:3001".to_string(),
        session_secret: SecretString::from("k8#Qz2!vL5@wN9$rT3^yU6&pM1*xB4%c"),
        backend: BackendConfig::new(backend_url),
        max_upload_bytes: 1024 * 1024,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };

    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(250))
        .connect_lazy("postgres://localhost:1/threadline_test")
        .unwrap();

    let state = AppState::new(config.clone(), pool).unwrap();
    let session_layer = create_session_layer(MemoryStore::default(), &config);
    threadline_admin::app(state, session_layer)
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .uri(uri)
        .header("x-forwarded-for", "198.51.100.20");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    let body = format!(
        "email={}&password={}",
        urlencoding::encode(email),
        urlencoding::encode(password)
    );
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("x-forwarded-for", "198.51.100.20")
        .body(Body::from(body))
        .unwrap()
}

/// `name=value` of the session cookie set by `response`.
fn session_cookie(response: &Response) -> String {
    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = test_app()
        .await
        .oneshot(get_request("/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_strict_security_headers() {
    let response = test_app()
        .await
        .oneshot(get_request("/auth/login", None))
        .await
        .unwrap();
    let headers = response.headers();

    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers[header::CACHE_CONTROL], "no-store");
    assert!(headers.contains_key("x-request-id"));

    let csp = headers[header::CONTENT_SECURITY_POLICY].to_str().unwrap();
    assert!(csp.contains("'nonce-"));
    assert!(!csp.contains("stripe"));
}

#[tokio::test]
async fn test_unknown_path_renders_not_found_page() {
    let response = test_app()
        .await
        .oneshot(get_request("/nope", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Page not found"));
}

#[tokio::test]
async fn test_dashboard_requires_sign_in() {
    let response = test_app()
        .await
        .oneshot(get_request("/", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login");
}

#[tokio::test]
async fn test_htmx_request_gets_hx_redirect() {
    let request = Request::builder()
        .uri("/categories?q=out")
        .header("hx-request", "true")
        .body(Body::empty())
        .unwrap();
    let response = test_app().await.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["hx-redirect"], "/auth/login");
}

#[tokio::test]
async fn test_login_page_renders_form() {
    let response = test_app()
        .await
        .oneshot(get_request("/auth/login", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("action=\"/auth/login\""));
    assert!(!body.contains("href=\"/products\""));
}

#[tokio::test]
async fn test_wrong_password_stays_on_login() {
    let response = test_app()
        .await
        .oneshot(login_request(ADMIN_EMAIL, "guess"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login");
}

#[tokio::test]
async fn test_customer_account_is_refused() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(login_request(SHOPPER_EMAIL, PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.headers()[header::LOCATION], "/auth/login");

    let cookie = session_cookie(&response);
    let response = app
        .oneshot(get_request("/products", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/auth/login");
}

#[tokio::test]
async fn test_admin_signs_in_and_sees_product_grid() {
    let app = test_app().await;
    let response = app
        .clone()
        .oneshot(login_request(ADMIN_EMAIL, PASSWORD))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let cookie = session_cookie(&response);
    let response = app
        .clone()
        .oneshot(get_request("/products", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Harbor Coat"));
    assert!(body.contains("Signed in as Grace Hopper."));
    assert!(body.contains(">7<"));
    assert!(body.contains("value=\"c1\""));

    let request = Request::builder()
        .uri("/categories?q=FORM")
        .header("hx-request", "true")
        .header(header::COOKIE, &cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let body = body_text(response).await;
    assert!(body.contains("Formal"));
    assert!(!body.contains("Outerwear"));
    assert!(!body.contains("<html"));
}
