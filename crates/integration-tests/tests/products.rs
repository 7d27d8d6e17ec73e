//! Integration tests for the product catalog.
//!
//! Requires a migrated database and a running storefront server.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::json;
use shopcart_integration_tests::{TestContext, error_kind, expect_json, unique};

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_product_lifecycle() {
    let ctx = TestContext::new();
    let product = ctx
        .create_product(&unique("lamp"), "19.99", 4)
        .await
        .unwrap();
    assert_eq!(product["price"], "19.99");
    let url = ctx.url(&format!("/products/{}", product["id"]));

    let resp = ctx.client.get(&url).send().await.unwrap();
    let fetched = expect_json(resp, StatusCode::OK).await.unwrap();
    assert_eq!(fetched, product);

    let resp = ctx
        .client
        .put(&url)
        .json(&json!({"stock": 9, "description": "Brass"}))
        .send()
        .await
        .unwrap();
    let updated = expect_json(resp, StatusCode::OK).await.unwrap();
    assert_eq!(updated["stock"], 9);
    assert_eq!(updated["description"], "Brass");
    assert_eq!(updated["name"], product["name"]);

    let resp = ctx.client.delete(&url).send().await.unwrap();
    let deleted = expect_json(resp, StatusCode::OK).await.unwrap();
    assert_eq!(deleted["detail"], "Product deleted");

    let resp = ctx.client.get(&url).send().await.unwrap();
    let error = expect_json(resp, StatusCode::NOT_FOUND).await.unwrap();
    assert_eq!(error_kind(&error), Some("not_found"));
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_negative_stock_is_rejected() {
    let ctx = TestContext::new();
    let resp = ctx
        .client
        .post(ctx.url("/products"))
        .json(&json!({"name": "Broken", "price": "1.00", "stock": -1}))
        .send()
        .await
        .unwrap();
    let error = expect_json(resp, StatusCode::UNPROCESSABLE_ENTITY).await.unwrap();
    assert_eq!(error_kind(&error), Some("validation_error"));
}
