//! Product catalog route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use shopcart_core::ProductId;

use crate::error::Result;
use crate::extract::{ValidJson, ValidPath};
use crate::models::{CreateProductInput, Product, UpdateProductInput};
use crate::state::AppState;

/// Acknowledgement returned by `DELETE /products/{id}`.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub detail: &'static str,
}

/// Create a product.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateProductInput>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().create(input).await?))
}

/// List every product.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.catalog().list().await?))
}

/// Get one product.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<ProductId>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().get(id).await?))
}

/// Partially update a product. Only keys present in the body are applied.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<ProductId>,
    ValidJson(input): ValidJson<UpdateProductInput>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog().update(id, input).await?))
}

/// Delete a product.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    ValidPath(id): ValidPath<ProductId>,
) -> Result<Json<Deleted>> {
    state.catalog().delete(id).await?;
    Ok(Json(Deleted {
        detail: "Product deleted",
    }))
}
