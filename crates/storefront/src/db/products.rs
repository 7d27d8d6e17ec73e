//! Product repository for database operations.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use shopcart_core::{Price, ProductId, Stock};

use super::RepositoryError;
use crate::models::{NewProduct, Product, ProductChanges};

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    pub(super) id: i32,
    pub(super) name: String,
    pub(super) price: Decimal,
    pub(super) description: Option<String>,
    pub(super) stock: i32,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for product {}: {e}", row.id))
        })?;
        let stock = Stock::new(i64::from(row.stock)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid stock for product {}: {e}", row.id))
        })?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            price,
            description: row.description,
            stock,
        })
    }
}

/// Repository for catalog CRUD.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (name, price, description, stock)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, description, stock
            ",
        )
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(product.description.as_deref())
        .bind(product.stock.get())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, description, stock
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    /// List every product, in ID order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, description, stock
            FROM products
            ORDER BY id
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Apply a partial update.
    ///
    /// The row is locked for the read-modify-write so a concurrent update
    /// cannot interleave between reading the old values and writing the new
    /// ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update(
        &self,
        id: ProductId,
        changes: ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let mut product: Product = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, name, price, description, stock
            FROM products
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()?;

        if !product.apply(changes) {
            tx.commit().await?;
            return Ok(product);
        }

        sqlx::query(
            r"
            UPDATE products
            SET name = $2, price = $3, description = $4, stock = $5
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(&product.name)
        .bind(product.price.amount())
        .bind(product.description.as_deref())
        .bind(product.stock.get())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(product)
    }

    /// Delete a product.
    ///
    /// Cart lines that reference the product are left in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Read a product's stock and hold its row lock until the transaction ends.
///
/// Returns `None` if the product does not exist.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_stock(
    conn: &mut PgConnection,
    id: ProductId,
) -> Result<Option<Stock>, RepositoryError> {
    let stock: Option<i32> = sqlx::query_scalar(
        r"
        SELECT stock
        FROM products
        WHERE id = $1
        FOR UPDATE
        ",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;

    stock
        .map(|s| {
            Stock::new(i64::from(s)).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid stock for product {id}: {e}"))
            })
        })
        .transpose()
}
