//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shopcart_core::{CartId, CartItemId, ProductId, Quantity, SessionId, UserId};

use super::Product;

/// A session's cart.
///
/// At most one cart exists per session identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: CartId,
    pub session_id: SessionId,
    /// Owning user, if the session belongs to one.
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

/// A product line in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub id: CartItemId,
    pub cart_id: CartId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub created_at: DateTime<Utc>,
}

/// A cart line joined with its product.
///
/// `product` is `None` when the referenced product has been deleted from
/// the catalog. The line itself is kept until the shopper removes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: CartItemId,
    pub product_id: ProductId,
    pub quantity: Quantity,
    pub product: Option<Product>,
}

/// Read model returned by `GET /cart/{session_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    /// [`CartId::UNASSIGNED`] when the session has no cart yet.
    pub id: CartId,
    pub session_id: SessionId,
    /// Lines in insertion order.
    pub cart_items: Vec<CartLine>,
}

impl CartView {
    /// The view of a session that has never added anything.
    #[must_use]
    pub const fn empty(session_id: SessionId) -> Self {
        Self {
            id: CartId::UNASSIGNED,
            session_id,
            cart_items: Vec::new(),
        }
    }

    /// Whether this view is backed by a stored cart.
    #[must_use]
    pub const fn exists(&self) -> bool {
        !self.id.is_unassigned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_view_serializes_with_sentinel_id() {
        let view = CartView::empty(SessionId::parse("guest-1").unwrap());
        assert!(!view.exists());

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": 0, "session_id": "guest-1", "cart_items": [] })
        );
    }

    #[test]
    fn test_dangling_line_serializes_null_product() {
        let line = CartLine {
            id: CartItemId::new(4),
            product_id: ProductId::new(9),
            quantity: Quantity::new(2).unwrap(),
            product: None,
        };
        let json = serde_json::to_value(&line).unwrap();
        assert_eq!(json["product"], serde_json::Value::Null);
        assert_eq!(json["product_id"], 9);
        assert_eq!(json["quantity"], 2);
    }
}
