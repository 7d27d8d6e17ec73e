//! Cart quantities and product stock levels.

use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Quantity`] or [`Stock`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// A cart quantity below one.
    #[error("quantity must be at least 1 (got {0})")]
    NotPositive(i64),
    /// A stock level below zero.
    #[error("stock cannot be negative (got {0})")]
    NegativeStock(i64),
    /// The value does not fit in a 32-bit column.
    #[error("quantity is too large")]
    Overflow,
}

/// A positive number of units held in a cart line.
///
/// A `CartItem` never reaches zero: removing the last unit means deleting
/// the item, so the type cannot represent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// One unit, the default for an add-to-cart request.
    pub const ONE: Self = Self(1);

    /// Largest representable quantity.
    pub const MAX: Self = Self(i32::MAX);

    /// Create a quantity.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NotPositive` if `value < 1` and
    /// `QuantityError::Overflow` if it exceeds `i32::MAX`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::Overflow)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Add two quantities.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::Overflow` if the sum exceeds `i32::MAX`.
    pub fn checked_add(self, other: Self) -> Result<Self, QuantityError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(QuantityError::Overflow)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Units of a product available for purchase.
///
/// Stock is the single source of truth for availability. Cart operations
/// only read it; nothing in the cart flow decrements it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i32")]
pub struct Stock(i32);

impl Stock {
    /// No units available.
    pub const ZERO: Self = Self(0);

    /// Create a stock level.
    ///
    /// # Errors
    ///
    /// Returns `QuantityError::NegativeStock` if `value < 0` and
    /// `QuantityError::Overflow` if it exceeds `i32::MAX`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 0 {
            return Err(QuantityError::NegativeStock(value));
        }
        i32::try_from(value)
            .map(Self)
            .map_err(|_| QuantityError::Overflow)
    }

    /// Get the underlying value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }

    /// Whether this many units cover the requested total.
    #[must_use]
    pub const fn covers(self, requested: Quantity) -> bool {
        self.0 >= requested.0
    }
}

impl TryFrom<i64> for Stock {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i32> for Stock {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl From<Stock> for i32 {
    fn from(stock: Stock) -> Self {
        stock.0
    }
}

impl core::fmt::Display for Stock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::NotPositive(0)));
        assert_eq!(Quantity::new(-3), Err(QuantityError::NotPositive(-3)));
        assert_eq!(Quantity::new(1).unwrap(), Quantity::ONE);
    }

    #[test]
    fn test_quantity_rejects_values_past_i32() {
        assert_eq!(
            Quantity::new(i64::from(i32::MAX) + 1),
            Err(QuantityError::Overflow)
        );
    }

    #[test]
    fn test_checked_add() {
        let three = Quantity::new(3).unwrap();
        assert_eq!(three.checked_add(three).unwrap().get(), 6);

        let max = Quantity::new(i64::from(i32::MAX)).unwrap();
        assert_eq!(max.checked_add(Quantity::ONE), Err(QuantityError::Overflow));
    }

    #[test]
    fn test_stock_allows_zero_but_not_negative() {
        assert_eq!(Stock::new(0).unwrap(), Stock::ZERO);
        assert_eq!(Stock::new(-1), Err(QuantityError::NegativeStock(-1)));
    }

    #[test]
    fn test_stock_covers() {
        let five = Stock::new(5).unwrap();
        assert!(five.covers(Quantity::new(5).unwrap()));
        assert!(!five.covers(Quantity::new(6).unwrap()));
        assert!(!Stock::ZERO.covers(Quantity::ONE));
    }

    #[test]
    fn test_quantity_deserialize_validates() {
        assert!(serde_json::from_str::<Quantity>("2").is_ok());
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert!(serde_json::from_str::<Stock>("-4").is_err());
    }
}
