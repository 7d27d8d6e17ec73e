//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                                   - Welcome message
//! GET    /health                             - Liveness check
//! GET    /health/ready                       - Readiness check (database)
//!
//! # Users
//! POST   /users                              - Register a user
//! GET    /users                              - List users
//!
//! # Products
//! POST   /products                           - Create a product
//! GET    /products                           - List products
//! GET    /products/{id}                      - Product detail
//! PUT    /products/{id}                      - Partial update
//! DELETE /products/{id}                      - Delete a product
//!
//! # Cart
//! POST   /cart/add?session_id=...            - Add to cart
//! GET    /cart/{session_id}                  - View cart
//! PUT    /cart/{session_id}/item/{item_id}   - Set item quantity
//! DELETE /cart/{session_id}/item/{item_id}   - Remove item
//! DELETE /cart/{session_id}                  - Clear cart
//! ```
//!
//! A trailing slash is ignored, so `/users/` and `/users` are the same route.

pub mod cart;
pub mod products;
pub mod users;

use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, post, put},
};
use serde::Serialize;
use tower::Layer;
use tower_http::{
    normalize_path::{NormalizePath, NormalizePathLayer},
    timeout::TimeoutLayer,
    trace::{DefaultOnResponse, OnResponse, TraceLayer},
};
use tracing::Span;

use crate::middleware::{cors_layer, request_id_middleware};
use crate::state::AppState;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct Welcome {
    pub message: String,
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", post(users::create).get(users::index))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(products::create).get(products::index))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/{session_id}", get(cart::show).delete(cart::clear))
        .route(
            "/{session_id}/item/{item_id}",
            put(cart::update_item).delete(cart::remove_item),
        )
}

/// Create all routes for the storefront, without middleware or state.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/users", user_routes())
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
}

/// Build the complete application: routes, middleware and state.
///
/// Path normalization has to run before routing, so it wraps the finished
/// router instead of being added with `Router::layer`.
pub fn app(state: AppState) -> NormalizePath<Router> {
    let request_timeout = state.config().request_timeout;
    let cors = cors_layer(&state.config().cors_origins);

    let router = routes()
        .layer(TimeoutLayer::with_status_code(
            StatusCode::SERVICE_UNAVAILABLE,
            request_timeout,
        ))
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(|response: &Response, latency: Duration, span: &Span| {
                    span.record("status", response.status().as_u16());
                    span.record(
                        "latency_ms",
                        u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                    );
                    DefaultOnResponse::default().on_response(response, latency, span);
                }),
        )
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// Welcome message.
async fn root(State(state): State<AppState>) -> Json<Welcome> {
    Json(Welcome {
        message: format!("Welcome to {}", state.config().app_name),
    })
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").execute(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
