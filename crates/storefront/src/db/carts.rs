//! Cart and cart item queries.
//!
//! Every function takes a `&mut PgConnection` so the cart service can run a
//! whole operation (resolve, lock stock, mutate) on one transaction. Item
//! lookups are always scoped by session: an item ID belonging to another
//! session's cart behaves exactly like an item that does not exist.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgConnection;

use shopcart_core::{CartId, CartItemId, ProductId, Quantity, SessionId, UserId};

use super::RepositoryError;
use super::products::ProductRow;
use crate::models::{Cart, CartItem, CartLine, Product};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: i32,
    session_id: String,
    user_id: Option<i32>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartRow> for Cart {
    type Error = RepositoryError;

    fn try_from(row: CartRow) -> Result<Self, Self::Error> {
        let session_id = SessionId::parse(&row.session_id).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid session id on cart {}: {e}", row.id))
        })?;

        Ok(Self {
            id: CartId::new(row.id),
            session_id,
            user_id: row.user_id.map(UserId::new),
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: i32,
    cart_id: i32,
    product_id: i32,
    quantity: i32,
    created_at: DateTime<Utc>,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CartItemId::new(row.id),
            cart_id: CartId::new(row.cart_id),
            product_id: ProductId::new(row.product_id),
            quantity: stored_quantity(row.id, row.quantity)?,
            created_at: row.created_at,
        })
    }
}

/// Cart item joined with its product. Product columns are all `NULL` when
/// the product has been deleted.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    item_id: i32,
    product_id: i32,
    quantity: i32,
    p_id: Option<i32>,
    p_name: Option<String>,
    p_price: Option<Decimal>,
    p_description: Option<String>,
    p_stock: Option<i32>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let product = match (row.p_id, row.p_name, row.p_price, row.p_stock) {
            (Some(id), Some(name), Some(price), Some(stock)) => Some(Product::try_from(
                ProductRow {
                    id,
                    name,
                    price,
                    description: row.p_description,
                    stock,
                },
            )?),
            _ => None,
        };

        Ok(Self {
            id: CartItemId::new(row.item_id),
            product_id: ProductId::new(row.product_id),
            quantity: stored_quantity(row.item_id, row.quantity)?,
            product,
        })
    }
}

fn stored_quantity(item_id: i32, quantity: i32) -> Result<Quantity, RepositoryError> {
    Quantity::try_from(quantity).map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid quantity on cart item {item_id}: {e}"))
    })
}

// =============================================================================
// Carts
// =============================================================================

/// Find the cart for a session.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_by_session(
    conn: &mut PgConnection,
    session_id: &SessionId,
) -> Result<Option<Cart>, RepositoryError> {
    sqlx::query_as::<_, CartRow>(
        r"
        SELECT id, session_id, user_id, created_at
        FROM carts
        WHERE session_id = $1
        ",
    )
    .bind(session_id.as_str())
    .fetch_optional(conn)
    .await?
    .map(TryInto::try_into)
    .transpose()
}

/// Return the session's cart, creating it if it does not exist.
///
/// The upsert relies on the unique constraint on `session_id`: when two
/// requests race to create the same cart, one insert wins and the other
/// gets the winner's row. Either way the cart row stays locked until the
/// transaction ends, so a concurrent [`delete_by_session`] waits for the
/// caller to commit instead of pulling the cart out from under new items.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn insert_or_get(
    conn: &mut PgConnection,
    session_id: &SessionId,
) -> Result<Cart, RepositoryError> {
    let row = sqlx::query_as::<_, CartRow>(
        r"
        INSERT INTO carts (session_id)
        VALUES ($1)
        ON CONFLICT (session_id) DO UPDATE SET session_id = EXCLUDED.session_id
        RETURNING id, session_id, user_id, created_at
        ",
    )
    .bind(session_id.as_str())
    .fetch_one(&mut *conn)
    .await?;

    tracing::debug!(session_id = %session_id, cart_id = row.id, "Resolved cart");
    row.try_into()
}

/// Delete the session's cart and, by cascade, all of its items.
///
/// Returns `true` if a cart was deleted.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn delete_by_session(
    conn: &mut PgConnection,
    session_id: &SessionId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query("DELETE FROM carts WHERE session_id = $1")
        .bind(session_id.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Cart Items
// =============================================================================

/// Find and lock the line for a product in a cart.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_item_for_product(
    conn: &mut PgConnection,
    cart_id: CartId,
    product_id: ProductId,
) -> Result<Option<CartItem>, RepositoryError> {
    sqlx::query_as::<_, CartItemRow>(
        r"
        SELECT id, cart_id, product_id, quantity, created_at
        FROM cart_items
        WHERE cart_id = $1 AND product_id = $2
        FOR UPDATE
        ",
    )
    .bind(cart_id)
    .bind(product_id)
    .fetch_optional(conn)
    .await?
    .map(TryInto::try_into)
    .transpose()
}

/// Find an item in the session's cart without locking it.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn find_session_item(
    conn: &mut PgConnection,
    session_id: &SessionId,
    item_id: CartItemId,
) -> Result<Option<CartItem>, RepositoryError> {
    sqlx::query_as::<_, CartItemRow>(
        r"
        SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, ci.created_at
        FROM cart_items ci
        JOIN carts c ON c.id = ci.cart_id
        WHERE c.session_id = $1 AND ci.id = $2
        ",
    )
    .bind(session_id.as_str())
    .bind(item_id)
    .fetch_optional(conn)
    .await?
    .map(TryInto::try_into)
    .transpose()
}

/// Find and lock an item in the session's cart.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock_session_item(
    conn: &mut PgConnection,
    session_id: &SessionId,
    item_id: CartItemId,
) -> Result<Option<CartItem>, RepositoryError> {
    sqlx::query_as::<_, CartItemRow>(
        r"
        SELECT ci.id, ci.cart_id, ci.product_id, ci.quantity, ci.created_at
        FROM cart_items ci
        JOIN carts c ON c.id = ci.cart_id
        WHERE c.session_id = $1 AND ci.id = $2
        FOR UPDATE OF ci
        ",
    )
    .bind(session_id.as_str())
    .bind(item_id)
    .fetch_optional(conn)
    .await?
    .map(TryInto::try_into)
    .transpose()
}

/// Insert a new line.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the cart already has a line for
/// the product.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert_item(
    conn: &mut PgConnection,
    cart_id: CartId,
    product_id: ProductId,
    quantity: Quantity,
) -> Result<CartItem, RepositoryError> {
    let row = sqlx::query_as::<_, CartItemRow>(
        r"
        INSERT INTO cart_items (cart_id, product_id, quantity)
        VALUES ($1, $2, $3)
        RETURNING id, cart_id, product_id, quantity, created_at
        ",
    )
    .bind(cart_id)
    .bind(product_id)
    .bind(quantity.get())
    .fetch_one(conn)
    .await
    .map_err(|e| RepositoryError::from_insert(e, "cart already holds this product"))?;

    row.try_into()
}

/// Overwrite a line's quantity.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the item no longer exists.
/// Returns `RepositoryError::Database` if the update fails.
pub async fn set_item_quantity(
    conn: &mut PgConnection,
    item_id: CartItemId,
    quantity: Quantity,
) -> Result<(), RepositoryError> {
    let result = sqlx::query("UPDATE cart_items SET quantity = $2 WHERE id = $1")
        .bind(item_id)
        .bind(quantity.get())
        .execute(conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(RepositoryError::NotFound);
    }
    Ok(())
}

/// Delete an item from the session's cart.
///
/// Returns `true` if an item was deleted. The cart itself is kept even when
/// it becomes empty.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the delete fails.
pub async fn delete_session_item(
    conn: &mut PgConnection,
    session_id: &SessionId,
    item_id: CartItemId,
) -> Result<bool, RepositoryError> {
    let result = sqlx::query(
        r"
        DELETE FROM cart_items ci
        USING carts c
        WHERE ci.cart_id = c.id AND c.session_id = $1 AND ci.id = $2
        ",
    )
    .bind(session_id.as_str())
    .bind(item_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// List a cart's lines with their products, in insertion order.
///
/// Lines whose product has been deleted are returned with `product: None`.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
/// Returns `RepositoryError::DataCorruption` if a stored value is invalid.
pub async fn list_lines(
    conn: &mut PgConnection,
    cart_id: CartId,
) -> Result<Vec<CartLine>, RepositoryError> {
    let rows = sqlx::query_as::<_, CartLineRow>(
        r"
        SELECT ci.id AS item_id, ci.product_id, ci.quantity,
               p.id AS p_id, p.name AS p_name, p.price AS p_price,
               p.description AS p_description, p.stock AS p_stock
        FROM cart_items ci
        LEFT JOIN products p ON p.id = ci.product_id
        WHERE ci.cart_id = $1
        ORDER BY ci.created_at, ci.id
        ",
    )
    .bind(cart_id)
    .fetch_all(conn)
    .await?;

    rows.into_iter().map(TryInto::try_into).collect()
}
