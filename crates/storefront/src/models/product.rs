//! Product domain types and catalog input validation.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use shopcart_core::{Patch, PatchError, Price, PriceError, ProductId, QuantityError, Stock};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Optional long description.
    pub description: Option<String>,
    /// Units available for purchase.
    pub stock: Stock,
}

impl Product {
    /// Apply a partial update in place.
    ///
    /// Fields absent from `changes` are left untouched. Returns `true` if any
    /// field was supplied.
    pub fn apply(&mut self, changes: ProductChanges) -> bool {
        let mut touched = false;
        if let Some(name) = changes.name {
            self.name = name;
            touched = true;
        }
        if let Some(price) = changes.price {
            self.price = price;
            touched = true;
        }
        touched |= changes.description.apply_nullable(&mut self.description);
        if let Some(stock) = changes.stock {
            self.stock = stock;
            touched = true;
        }
        touched
    }
}

/// A validated product ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Optional long description.
    pub description: Option<String>,
    /// Initial stock.
    pub stock: Stock,
}

/// Validated partial update for a product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<Price>,
    /// `Null` clears the description.
    pub description: Patch<String>,
    pub stock: Option<Stock>,
}

impl ProductChanges {
    /// Whether no field was supplied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.description.is_absent()
            && self.stock.is_none()
    }
}

/// Errors found while validating catalog input.
#[derive(Debug, thiserror::Error)]
pub enum ProductInputError {
    /// Price is negative or too large.
    #[error("invalid price: {0}")]
    Price(#[from] PriceError),

    /// Stock is negative or too large.
    #[error("invalid stock: {0}")]
    Stock(#[from] QuantityError),

    /// A required field was sent as `null`.
    #[error("{0}")]
    Patch(#[from] PatchError),
}

/// Raw input for creating a product.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductInput {
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Decimal,
    /// Optional long description.
    #[serde(default)]
    pub description: Option<String>,
    /// Initial stock.
    pub stock: i64,
}

impl CreateProductInput {
    /// Validate into a [`NewProduct`].
    ///
    /// # Errors
    ///
    /// Returns `ProductInputError` if the price or stock is out of range.
    pub fn validate(self) -> Result<NewProduct, ProductInputError> {
        Ok(NewProduct {
            name: self.name,
            price: Price::new(self.price)?,
            description: self.description,
            stock: Stock::new(self.stock)?,
        })
    }
}

/// Raw input for a partial product update.
///
/// Only keys present in the request body are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductInput {
    /// New name.
    #[serde(default)]
    pub name: Patch<String>,
    /// New price.
    #[serde(default)]
    pub price: Patch<Decimal>,
    /// New description; `null` clears it.
    #[serde(default)]
    pub description: Patch<String>,
    /// New stock level.
    #[serde(default)]
    pub stock: Patch<i64>,
}

impl UpdateProductInput {
    /// Validate into [`ProductChanges`].
    ///
    /// # Errors
    ///
    /// Returns `ProductInputError` if a supplied price or stock is out of
    /// range, or if `null` was sent for a field that cannot be cleared.
    pub fn validate(self) -> Result<ProductChanges, ProductInputError> {
        let name = self.name.into_required("name")?;
        let price = self.price.into_required("price")?;
        let stock = self.stock.into_required("stock")?;

        Ok(ProductChanges {
            name,
            price: price.map(Price::new).transpose()?,
            description: self.description,
            stock: stock.map(Stock::new).transpose()?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lamp() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Lamp".to_owned(),
            price: Price::new(Decimal::new(1999, 2)).unwrap(),
            description: Some("Brass desk lamp".to_owned()),
            stock: Stock::new(5).unwrap(),
        }
    }

    fn changes(json: &str) -> ProductChanges {
        serde_json::from_str::<UpdateProductInput>(json)
            .unwrap()
            .validate()
            .unwrap()
    }

    #[test]
    fn test_create_input_validates_price_and_stock() {
        let input: CreateProductInput =
            serde_json::from_str(r#"{"name": "Lamp", "price": "19.99", "stock": 5}"#).unwrap();
        let product = input.validate().unwrap();
        assert_eq!(product.stock.get(), 5);
        assert_eq!(product.description, None);

        let input: CreateProductInput =
            serde_json::from_str(r#"{"name": "Lamp", "price": "-1", "stock": 5}"#).unwrap();
        assert!(matches!(input.validate(), Err(ProductInputError::Price(_))));

        let input: CreateProductInput =
            serde_json::from_str(r#"{"name": "Lamp", "price": "1", "stock": -5}"#).unwrap();
        assert!(matches!(input.validate(), Err(ProductInputError::Stock(_))));
    }

    #[test]
    fn test_empty_update_touches_nothing() {
        let mut product = lamp();
        let empty = changes("{}");
        assert!(empty.is_empty());
        assert!(!product.apply(empty));
        assert_eq!(product, lamp());
    }

    #[test]
    fn test_update_applies_only_supplied_fields() {
        let mut product = lamp();
        assert!(product.apply(changes(r#"{"stock": 12}"#)));
        assert_eq!(product.stock.get(), 12);
        assert_eq!(product.name, "Lamp");
        assert_eq!(product.description.as_deref(), Some("Brass desk lamp"));
    }

    #[test]
    fn test_update_null_description_clears_it() {
        let mut product = lamp();
        assert!(product.apply(changes(r#"{"description": null}"#)));
        assert_eq!(product.description, None);
    }

    #[test]
    fn test_update_rejects_null_on_required_fields() {
        for field in ["name", "price", "stock"] {
            let json = format!(r#"{{"{field}": null}}"#);
            let input: UpdateProductInput = serde_json::from_str(&json).unwrap();
            assert!(
                matches!(
                    input.validate(),
                    Err(ProductInputError::Patch(PatchError::NullNotAllowed(name))) if name == field
                ),
                "{field} should reject null"
            );
        }
    }

    #[test]
    fn test_update_rejects_negative_stock() {
        let input: UpdateProductInput = serde_json::from_str(r#"{"stock": -1}"#).unwrap();
        assert!(matches!(input.validate(), Err(ProductInputError::Stock(_))));
    }
}
