//! Cart error types.

use thiserror::Error;

use shopcart_core::{
    CartItemId, ProductId, Quantity, QuantityError, SessionIdError, Stock, StockError,
};

use crate::db::{RepositoryError, Transient};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The session identifier is malformed.
    #[error("invalid session id: {0}")]
    InvalidSession(#[from] SessionIdError),

    /// The requested quantity is out of range.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// The product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The item does not exist in this session's cart.
    #[error("cart item {0} not found")]
    ItemNotFound(CartItemId),

    /// Stock does not cover the quantity the line would hold.
    #[error("not enough stock available: requested {requested}, available {available}")]
    InsufficientStock {
        /// Total quantity the line would hold.
        requested: Quantity,
        /// Units in stock.
        available: Stock,
    },

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<StockError> for CartError {
    fn from(err: StockError) -> Self {
        match err {
            StockError::ProductNotFound(id) => Self::ProductNotFound(id),
            StockError::InsufficientStock {
                requested,
                available,
            } => Self::InsufficientStock {
                requested,
                available,
            },
        }
    }
}

impl From<sqlx::Error> for CartError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

impl Transient for CartError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Repository(e) if e.is_transient())
    }
}
