//! Inventory guard.
//!
//! Decides whether a cart line may hold a given number of units. The guard
//! is always asked about the **target** quantity the line will end up with,
//! never the increment: adding 3 to a line that already holds 3 needs 6
//! units of stock.
//!
//! The decision is only as good as the stock value it is given. Callers must
//! read that value inside the same transaction as the mutation that follows,
//! with the product row locked, so the answer still holds at commit.

use crate::types::{ProductId, Quantity, QuantityError, Stock};

/// Why a requested quantity cannot be held.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockError {
    /// No product exists with the requested ID.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    /// The product exists but does not have enough units.
    #[error("not enough stock available: requested {requested}, available {available}")]
    InsufficientStock {
        /// The total quantity the cart line would hold.
        requested: Quantity,
        /// Units currently in stock.
        available: Stock,
    },
}

/// Check that a product's stock covers the target quantity.
///
/// `stock` is `None` when the product does not exist.
///
/// # Errors
///
/// Returns `StockError::ProductNotFound` if `stock` is `None` and
/// `StockError::InsufficientStock` if `stock < target`.
///
/// ```
/// use shopcart_core::{ProductId, Quantity, Stock, StockError, check_available};
///
/// let id = ProductId::new(1);
/// let five = Stock::new(5).unwrap();
///
/// assert!(check_available(id, Some(five), Quantity::new(5).unwrap()).is_ok());
/// assert!(matches!(
///     check_available(id, Some(five), Quantity::new(6).unwrap()),
///     Err(StockError::InsufficientStock { .. })
/// ));
/// assert_eq!(
///     check_available(id, None, Quantity::ONE),
///     Err(StockError::ProductNotFound(id))
/// );
/// ```
pub fn check_available(
    product_id: ProductId,
    stock: Option<Stock>,
    target: Quantity,
) -> Result<(), StockError> {
    let available = stock.ok_or(StockError::ProductNotFound(product_id))?;
    if available.covers(target) {
        Ok(())
    } else {
        Err(StockError::InsufficientStock {
            requested: target,
            available,
        })
    }
}

/// Quantity a cart line will hold after adding `added` units.
///
/// A line that does not exist yet starts at `added`; an existing line merges.
///
/// # Errors
///
/// Returns `QuantityError::Overflow` if the merged total exceeds `i32::MAX`.
pub fn merged_quantity(
    existing: Option<Quantity>,
    added: Quantity,
) -> Result<Quantity, QuantityError> {
    existing.map_or(Ok(added), |current| current.checked_add(added))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn stock(n: i64) -> Stock {
        Stock::new(n).unwrap()
    }

    #[test]
    fn test_exact_stock_is_enough() {
        assert!(check_available(ProductId::new(1), Some(stock(3)), qty(3)).is_ok());
    }

    #[test]
    fn test_zero_stock_rejects_everything() {
        assert_eq!(
            check_available(ProductId::new(1), Some(Stock::ZERO), Quantity::ONE),
            Err(StockError::InsufficientStock {
                requested: Quantity::ONE,
                available: Stock::ZERO,
            })
        );
    }

    #[test]
    fn test_missing_product() {
        assert_eq!(
            check_available(ProductId::new(9), None, Quantity::ONE),
            Err(StockError::ProductNotFound(ProductId::new(9)))
        );
    }

    #[test]
    fn test_merge_checks_the_total_not_the_increment() {
        // stock 5, line holds 3, adding 3 more needs 6
        let target = merged_quantity(Some(qty(3)), qty(3)).unwrap();
        assert_eq!(target, qty(6));
        assert!(check_available(ProductId::new(1), Some(stock(5)), target).is_err());
        // the increment alone would have passed
        assert!(check_available(ProductId::new(1), Some(stock(5)), qty(3)).is_ok());
    }

    #[test]
    fn test_merge_without_existing_line() {
        assert_eq!(merged_quantity(None, qty(4)).unwrap(), qty(4));
    }

    #[test]
    fn test_merge_overflow() {
        let max = qty(i64::from(i32::MAX));
        assert_eq!(
            merged_quantity(Some(max), Quantity::ONE),
            Err(QuantityError::Overflow)
        );
    }

    #[test]
    fn test_error_message_mentions_amounts() {
        let err = check_available(ProductId::new(1), Some(stock(5)), qty(6)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "not enough stock available: requested 6, available 5"
        );
    }
}
