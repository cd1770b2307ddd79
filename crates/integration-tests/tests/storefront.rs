//! Storefront black-box tests.
//!
//! Require a running storefront and commerce backend.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use threadline_integration_tests::TestContext;

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_storefront_health() {
    let ctx = TestContext::from_env();
    let resp = ctx.client.get(ctx.storefront("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_storefront_ready() {
    let ctx = TestContext::from_env();
    let resp = ctx
        .client
        .get(ctx.storefront("/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running storefront and commerce backend"]
async fn test_home_page_renders_catalog() {
    let ctx = TestContext::from_env();
    let resp = ctx.client.get(ctx.storefront("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("content-security-policy"));
    let body = resp.text().await.unwrap();
    assert!(body.contains("/search?q="));
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_cart_redirects_anonymous_visitors() {
    let ctx = TestContext::from_env();
    let resp = ctx.client.get(ctx.storefront("/cart")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/auth");
}

#[tokio::test]
#[ignore = "Requires running storefront"]
async fn test_unknown_product_is_not_found() {
    let ctx = TestContext::from_env();
    let resp = ctx
        .client
        .get(ctx.storefront("/products/does-not-exist"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
