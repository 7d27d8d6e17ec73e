//! Catalog management: product CRUD.

use sqlx::PgPool;
use thiserror::Error;

use shopcart_core::ProductId;

use crate::db::products::ProductRepository;
use crate::db::{RepositoryError, RetryPolicy, Transient};
use crate::models::{CreateProductInput, Product, ProductInputError, UpdateProductInput};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product with this ID.
    #[error("product {0} not found")]
    NotFound(ProductId),

    /// The request body failed validation.
    #[error(transparent)]
    Invalid(#[from] ProductInputError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl Transient for CatalogError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Repository(e) if e.is_transient())
    }
}

/// Catalog service.
pub struct CatalogService<'a> {
    products: ProductRepository<'a>,
    retry: RetryPolicy,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, retry: RetryPolicy) -> Self {
        Self {
            products: ProductRepository::new(pool),
            retry,
        }
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if the price or stock is out of range.
    pub async fn create(&self, input: CreateProductInput) -> Result<Product, CatalogError> {
        let product = input.validate()?;

        let created = self
            .retry
            .run("catalog.create", || async {
                self.products
                    .create(&product)
                    .await
                    .map_err(CatalogError::from)
            })
            .await?;

        tracing::info!(product_id = %created.id, "Product created");
        Ok(created)
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    pub async fn get(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.retry
            .run("catalog.get", || async {
                self.products
                    .get_by_id(id)
                    .await?
                    .ok_or(CatalogError::NotFound(id))
            })
            .await
    }

    /// List every product.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Repository` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, CatalogError> {
        self.retry
            .run("catalog.list", || async {
                self.products.list().await.map_err(CatalogError::from)
            })
            .await
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` if a supplied field is out of range or
    /// `null` was sent for a field that cannot be cleared.
    /// Returns `CatalogError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        input: UpdateProductInput,
    ) -> Result<Product, CatalogError> {
        let changes = input.validate()?;

        let updated = self
            .retry
            .run("catalog.update", || async {
                self.products
                    .update(id, changes.clone())
                    .await
                    .map_err(|e| match e {
                        RepositoryError::NotFound => CatalogError::NotFound(id),
                        other => CatalogError::Repository(other),
                    })
            })
            .await?;

        tracing::info!(product_id = %id, "Product updated");
        Ok(updated)
    }

    /// Delete a product.
    ///
    /// Cart lines referencing it are kept and shown without product details.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), CatalogError> {
        self.retry
            .run("catalog.delete", || async {
                self.products.delete(id).await.map_err(|e| match e {
                    RepositoryError::NotFound => CatalogError::NotFound(id),
                    other => CatalogError::Repository(other),
                })
            })
            .await?;

        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }
}
