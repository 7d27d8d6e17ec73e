//! Integration tests for the Shopcart storefront.
//!
//! These run over HTTP against a live server, so they are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and the server
//! shopcart migrate
//! cargo run -p shopcart-storefront
//!
//! # Run integration tests
//! cargo test -p shopcart-integration-tests -- --ignored
//! ```
//!
//! Set `STOREFRONT_TEST_URL` to target a server other than
//! `http://127.0.0.1:8000`.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use uuid::Uuid;

/// Base URL for the storefront API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_TEST_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_owned())
}

/// A fresh value for identifiers that must not collide between test runs.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// HTTP client bound to the storefront under test.
#[derive(Debug, Clone)]
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: base_url(),
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Create a product and return its JSON representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn create_product(&self, name: &str, price: &str, stock: i64) -> Result<Value, String> {
        let resp = self
            .client
            .post(self.url("/products"))
            .json(&serde_json::json!({"name": name, "price": price, "stock": stock}))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        expect_json(resp, StatusCode::OK).await
    }

    /// Add `quantity` of `product_id` to the cart of `session_id`.
    ///
    /// `session_id` goes into the query string unescaped; use [`unique`].
    ///
    /// # Errors
    ///
    /// Returns an error if the request itself fails.
    pub async fn add_to_cart(
        &self,
        session_id: &str,
        product_id: i64,
        quantity: i64,
    ) -> Result<Response, String> {
        self.client
            .post(self.url(&format!("/cart/add?session_id={session_id}")))
            .json(&serde_json::json!({"product_id": product_id, "quantity": quantity}))
            .send()
            .await
            .map_err(|e| e.to_string())
    }

    /// Fetch the cart of `session_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or does not return 200.
    pub async fn cart(&self, session_id: &str) -> Result<Value, String> {
        let resp = self
            .client
            .get(self.url(&format!("/cart/{session_id}")))
            .send()
            .await
            .map_err(|e| e.to_string())?;
        expect_json(resp, StatusCode::OK).await
    }
}

/// Assert the status and decode the JSON body.
///
/// # Errors
///
/// Returns an error describing the mismatch or decode failure.
pub async fn expect_json(resp: Response, status: StatusCode) -> Result<Value, String> {
    let actual = resp.status();
    let body: Value = resp.json().await.map_err(|e| e.to_string())?;
    if actual == status {
        Ok(body)
    } else {
        Err(format!("expected {status}, got {actual}: {body}"))
    }
}

/// The `error.kind` field of an error body.
#[must_use]
pub fn error_kind(body: &Value) -> Option<&str> {
    body.get("error")?.get("kind")?.as_str()
}
