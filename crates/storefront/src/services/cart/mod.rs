//! Session carts.
//!
//! Each public operation is one transaction. Mutations lock the product row
//! before touching any cart row, so two requests for the same product queue
//! behind each other and the stock value handed to the inventory guard is
//! the one that holds at commit. Taking the product lock first on every path
//! keeps lock order consistent across add and update.
//!
//! Stock is only read. Two sessions may each hold quantities that together
//! exceed it; reserving units belongs to checkout.
//!
//! Transient database failures re-run the whole operation under the
//! configured [`RetryPolicy`]. A dropped transaction rolls back, so a
//! cancelled or timed-out request never leaves a partial change behind.

mod error;

pub use error::CartError;

use sqlx::PgPool;

use shopcart_core::{
    CartItemId, ProductId, Quantity, SessionId, check_available, merged_quantity,
};

use crate::db::{RetryPolicy, carts, products};
use crate::models::{Cart, CartItem, CartView};

/// Cart service.
pub struct CartService<'a> {
    pool: &'a PgPool,
    retry: RetryPolicy,
}

impl<'a> CartService<'a> {
    /// Create a new cart service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    /// Return the session's cart, creating it on first use.
    ///
    /// Repeated calls for the same session return the same cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database fails.
    pub async fn resolve(&self, session_id: &SessionId) -> Result<Cart, CartError> {
        self.retry
            .run("cart.resolve", || async {
                let mut tx = self.pool.begin().await?;
                let cart = carts::insert_or_get(&mut tx, session_id).await?;
                tx.commit().await?;
                Ok::<_, CartError>(cart)
            })
            .await
    }

    /// Add units of a product to the session's cart.
    ///
    /// The cart is created if the session has none. Adding a product that is
    /// already in the cart merges into its existing line, and stock must
    /// cover the merged total.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ProductNotFound` if the product does not exist.
    /// Returns `CartError::InsufficientStock` if stock does not cover the
    /// line's new total; the line keeps its previous quantity.
    pub async fn add_item(
        &self,
        session_id: &SessionId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartItem, CartError> {
        let item = self
            .retry
            .run("cart.add_item", || {
                self.add_item_once(session_id, product_id, quantity)
            })
            .await
            .inspect_err(|e| {
                tracing::debug!(
                    session_id = %session_id,
                    product_id = %product_id,
                    quantity = %quantity,
                    error = %e,
                    "Add to cart rejected"
                );
            })?;

        tracing::info!(
            session_id = %session_id,
            product_id = %product_id,
            item_id = %item.id,
            quantity = %item.quantity,
            "Item added to cart"
        );
        Ok(item)
    }

    async fn add_item_once(
        &self,
        session_id: &SessionId,
        product_id: ProductId,
        quantity: Quantity,
    ) -> Result<CartItem, CartError> {
        let mut tx = self.pool.begin().await?;

        let stock = products::lock_stock(&mut tx, product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        let cart = carts::insert_or_get(&mut tx, session_id).await?;
        let existing = carts::lock_item_for_product(&mut tx, cart.id, product_id).await?;

        // Stock is an i32 too, so a total past Quantity::MAX is never covered.
        let target = merged_quantity(existing.as_ref().map(|item| item.quantity), quantity)
            .map_err(|_| CartError::InsufficientStock {
                requested: Quantity::MAX,
                available: stock,
            })?;
        check_available(product_id, Some(stock), target)?;

        let item = match existing {
            Some(mut item) => {
                carts::set_item_quantity(&mut tx, item.id, target).await?;
                item.quantity = target;
                item
            }
            None => carts::insert_item(&mut tx, cart.id, product_id, target).await?,
        };

        tx.commit().await?;
        Ok(item)
    }

    /// Set an item's quantity to an absolute value.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the item is not in this
    /// session's cart.
    /// Returns `CartError::ProductNotFound` if the item's product has been
    /// deleted from the catalog.
    /// Returns `CartError::InsufficientStock` if stock does not cover
    /// `quantity`; the item keeps its previous quantity.
    pub async fn update_item(
        &self,
        session_id: &SessionId,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, CartError> {
        let item = self
            .retry
            .run("cart.update_item", || {
                self.update_item_once(session_id, item_id, quantity)
            })
            .await
            .inspect_err(|e| {
                tracing::debug!(
                    session_id = %session_id,
                    item_id = %item_id,
                    quantity = %quantity,
                    error = %e,
                    "Cart item update rejected"
                );
            })?;

        tracing::info!(
            session_id = %session_id,
            item_id = %item.id,
            product_id = %item.product_id,
            quantity = %item.quantity,
            "Cart item updated"
        );
        Ok(item)
    }

    async fn update_item_once(
        &self,
        session_id: &SessionId,
        item_id: CartItemId,
        quantity: Quantity,
    ) -> Result<CartItem, CartError> {
        let mut tx = self.pool.begin().await?;

        // Product lock comes first, so find the product without locking the item.
        let product_id = carts::find_session_item(&mut tx, session_id, item_id)
            .await?
            .ok_or(CartError::ItemNotFound(item_id))?
            .product_id;

        let stock = products::lock_stock(&mut tx, product_id).await?;

        // The item may have been removed while we waited for the product lock.
        let mut item = carts::lock_session_item(&mut tx, session_id, item_id)
            .await?
            .ok_or(CartError::ItemNotFound(item_id))?;

        check_available(product_id, stock, quantity)?;

        carts::set_item_quantity(&mut tx, item.id, quantity).await?;
        item.quantity = quantity;

        tx.commit().await?;
        Ok(item)
    }

    /// Remove an item from the session's cart.
    ///
    /// The cart itself is kept, even when this was its last item.
    ///
    /// # Errors
    ///
    /// Returns `CartError::ItemNotFound` if the item is not in this
    /// session's cart.
    pub async fn remove_item(
        &self,
        session_id: &SessionId,
        item_id: CartItemId,
    ) -> Result<(), CartError> {
        self.retry
            .run("cart.remove_item", || async {
                let mut conn = self.pool.acquire().await?;
                if carts::delete_session_item(&mut conn, session_id, item_id).await? {
                    Ok(())
                } else {
                    Err(CartError::ItemNotFound(item_id))
                }
            })
            .await?;

        tracing::info!(session_id = %session_id, item_id = %item_id, "Item removed from cart");
        Ok(())
    }

    /// Delete the session's cart and all of its items.
    ///
    /// Succeeds whether or not the session had a cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database fails.
    pub async fn clear_cart(&self, session_id: &SessionId) -> Result<(), CartError> {
        let deleted = self
            .retry
            .run("cart.clear", || async {
                let mut conn = self.pool.acquire().await?;
                Ok::<_, CartError>(carts::delete_by_session(&mut conn, session_id).await?)
            })
            .await?;

        tracing::info!(session_id = %session_id, deleted, "Cart cleared");
        Ok(())
    }

    /// The session's cart with product details, in insertion order.
    ///
    /// A session without a cart gets an empty view whose ID is
    /// [`shopcart_core::CartId::UNASSIGNED`]; viewing never creates a cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the database fails.
    pub async fn get_cart(&self, session_id: &SessionId) -> Result<CartView, CartError> {
        self.retry
            .run("cart.get", || async {
                let mut tx = self.pool.begin().await?;

                let Some(cart) = carts::find_by_session(&mut tx, session_id).await? else {
                    return Ok::<_, CartError>(CartView::empty(session_id.clone()));
                };
                let cart_items = carts::list_lines(&mut tx, cart.id).await?;

                tx.commit().await?;
                Ok(CartView {
                    id: cart.id,
                    session_id: cart.session_id,
                    cart_items,
                })
            })
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use shopcart_core::{CartId, Price, Stock};

    use super::*;
    use crate::db::products::ProductRepository;
    use crate::models::NewProduct;

    async fn product_with_stock(pool: &PgPool, stock: i64) -> ProductId {
        ProductRepository::new(pool)
            .create(&NewProduct {
                name: format!("Widget x{stock}"),
                price: Price::new(Decimal::new(250, 2)).unwrap(),
                description: None,
                stock: Stock::new(stock).unwrap(),
            })
            .await
            .unwrap()
            .id
    }

    fn session(s: &str) -> SessionId {
        SessionId::parse(s).unwrap()
    }

    fn qty(n: i64) -> Quantity {
        Quantity::new(n).unwrap()
    }

    async fn quantities(service: &CartService<'_>, s: &SessionId) -> Vec<i32> {
        service
            .get_cart(s)
            .await
            .unwrap()
            .cart_items
            .iter()
            .map(|line| line.quantity.get())
            .collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_resolve_is_idempotent(pool: PgPool) {
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("resolve-me");

        let first = service.resolve(&s).await.unwrap();
        let second = service.resolve(&s).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.session_id, s);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_resolve_creates_one_cart(pool: PgPool) {
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("racy");

        let (a, b) = tokio::join!(service.resolve(&s), service.resolve(&s));
        assert_eq!(a.unwrap().id, b.unwrap().id);

        let carts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(carts, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_add_to_empty_cart_creates_single_line(pool: PgPool) {
        let product = product_with_stock(&pool, 10).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("fresh");

        let item = service.add_item(&s, product, qty(4)).await.unwrap();
        assert_eq!(item.quantity.get(), 4);
        assert_eq!(item.product_id, product);

        let view = service.get_cart(&s).await.unwrap();
        assert!(view.exists());
        assert_eq!(view.cart_items.len(), 1);
        assert_eq!(view.cart_items[0].id, item.id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_repeated_add_merges_within_stock(pool: PgPool) {
        let product = product_with_stock(&pool, 5).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("merge");

        let first = service.add_item(&s, product, qty(2)).await.unwrap();
        let second = service.add_item(&s, product, qty(3)).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(quantities(&service, &s).await, vec![5]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_merge_beyond_stock_keeps_previous_quantity(pool: PgPool) {
        let product = product_with_stock(&pool, 4).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("overflow");

        service.add_item(&s, product, qty(3)).await.unwrap();
        let err = service.add_item(&s, product, qty(2)).await.unwrap_err();
        assert!(matches!(
            err,
            CartError::InsufficientStock { requested, available }
                if requested.get() == 5 && available.get() == 4
        ));
        assert_eq!(quantities(&service, &s).await, vec![3]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_add_unknown_product_creates_nothing(pool: PgPool) {
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("ghost");

        let err = service
            .add_item(&s, ProductId::new(999), Quantity::ONE)
            .await
            .unwrap_err();
        assert!(matches!(err, CartError::ProductNotFound(_)));
        assert!(!service.get_cart(&s).await.unwrap().exists());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_update_beyond_stock_keeps_quantity(pool: PgPool) {
        let product = product_with_stock(&pool, 3).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("update");

        let item = service.add_item(&s, product, qty(2)).await.unwrap();
        let err = service.update_item(&s, item.id, qty(4)).await.unwrap_err();
        assert!(matches!(err, CartError::InsufficientStock { .. }));
        assert_eq!(quantities(&service, &s).await, vec![2]);

        let updated = service.update_item(&s, item.id, qty(1)).await.unwrap();
        assert_eq!(updated.quantity.get(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_other_sessions_items_are_not_found(pool: PgPool) {
        let product = product_with_stock(&pool, 3).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);

        let item = service
            .add_item(&session("alice"), product, Quantity::ONE)
            .await
            .unwrap();
        let bob = session("bob");

        assert!(matches!(
            service.update_item(&bob, item.id, Quantity::ONE).await,
            Err(CartError::ItemNotFound(id)) if id == item.id
        ));
        assert!(matches!(
            service.remove_item(&bob, item.id).await,
            Err(CartError::ItemNotFound(_))
        ));
        assert_eq!(quantities(&service, &session("alice")).await, vec![1]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_removing_last_item_keeps_cart(pool: PgPool) {
        let product = product_with_stock(&pool, 3).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("remove");

        let cart = service.resolve(&s).await.unwrap();
        let item = service.add_item(&s, product, Quantity::ONE).await.unwrap();
        service.remove_item(&s, item.id).await.unwrap();

        let view = service.get_cart(&s).await.unwrap();
        assert_eq!(view.id, cart.id);
        assert!(view.cart_items.is_empty());

        assert!(matches!(
            service.remove_item(&s, item.id).await,
            Err(CartError::ItemNotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_clear_is_idempotent(pool: PgPool) {
        let product = product_with_stock(&pool, 3).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("clear");

        service.clear_cart(&session("never-seen")).await.unwrap();

        service.add_item(&s, product, Quantity::ONE).await.unwrap();
        service.clear_cart(&s).await.unwrap();
        service.clear_cart(&s).await.unwrap();

        let view = service.get_cart(&s).await.unwrap();
        assert_eq!(view.id, CartId::UNASSIGNED);
        assert!(view.cart_items.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_viewing_does_not_create_cart(pool: PgPool) {
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let view = service.get_cart(&session("window-shopper")).await.unwrap();
        assert_eq!(view, CartView::empty(session("window-shopper")));

        let carts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM carts")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(carts, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_stock_five_scenario(pool: PgPool) {
        let product = product_with_stock(&pool, 5).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let a = session("a");

        let item = service.add_item(&a, product, qty(3)).await.unwrap();
        assert_eq!(quantities(&service, &a).await, vec![3]);

        assert!(matches!(
            service.add_item(&a, product, qty(3)).await,
            Err(CartError::InsufficientStock { .. })
        ));
        assert_eq!(quantities(&service, &a).await, vec![3]);

        service.update_item(&a, item.id, qty(5)).await.unwrap();
        assert_eq!(quantities(&service, &a).await, vec![5]);

        assert!(matches!(
            service.update_item(&a, item.id, qty(6)).await,
            Err(CartError::InsufficientStock { .. })
        ));
        assert_eq!(quantities(&service, &a).await, vec![5]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_adds_to_one_session_respect_stock(pool: PgPool) {
        let product = product_with_stock(&pool, 5).await;
        let service = CartService::new(&pool, RetryPolicy::default());
        let s = session("double-click");

        let (a, b) = tokio::join!(
            service.add_item(&s, product, qty(3)),
            service.add_item(&s, product, qty(3)),
        );
        let failures = [&a, &b]
            .iter()
            .filter(|r| matches!(r, Err(CartError::InsufficientStock { .. })))
            .count();
        assert_eq!(failures, 1);
        assert_eq!(quantities(&service, &s).await, vec![3]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_stock_is_not_reserved_across_sessions(pool: PgPool) {
        let product = product_with_stock(&pool, 5).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);

        service
            .add_item(&session("one"), product, qty(4))
            .await
            .unwrap();
        service
            .add_item(&session("two"), product, qty(4))
            .await
            .unwrap();

        let stock: i32 = sqlx::query_scalar("SELECT stock FROM products WHERE id = $1")
            .bind(product)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stock, 5);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_deleted_product_leaves_readable_line(pool: PgPool) {
        let kept = product_with_stock(&pool, 5).await;
        let doomed = product_with_stock(&pool, 5).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("dangling");

        service.add_item(&s, doomed, qty(2)).await.unwrap();
        service.add_item(&s, kept, Quantity::ONE).await.unwrap();
        ProductRepository::new(&pool).delete(doomed).await.unwrap();

        let view = service.get_cart(&s).await.unwrap();
        assert_eq!(view.cart_items.len(), 2);
        let dangling = &view.cart_items[0];
        assert_eq!(dangling.product_id, doomed);
        assert_eq!(dangling.quantity.get(), 2);
        assert!(dangling.product.is_none());
        assert!(view.cart_items[1].product.is_some());

        assert!(matches!(
            service.update_item(&s, dangling.id, Quantity::ONE).await,
            Err(CartError::ProductNotFound(id)) if id == doomed
        ));
        service.remove_item(&s, dangling.id).await.unwrap();
        assert_eq!(quantities(&service, &s).await, vec![1]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_merge_past_quantity_limit_is_insufficient_stock(pool: PgPool) {
        let product = product_with_stock(&pool, 5).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("enormous");

        service.add_item(&s, product, Quantity::ONE).await.unwrap();
        let err = service
            .add_item(&s, product, Quantity::MAX)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CartError::InsufficientStock { requested, available }
                if requested == Quantity::MAX && available.get() == 5
        ));
        assert_eq!(quantities(&service, &s).await, vec![1]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_clear_waits_for_add_holding_the_cart(pool: PgPool) {
        let product = product_with_stock(&pool, 5).await;
        let service = CartService::new(&pool, RetryPolicy::NONE);
        let s = session("clear-during-add");
        service.resolve(&s).await.unwrap();

        // First half of an add: stock locked, existing cart resolved.
        let mut tx = pool.begin().await.unwrap();
        products::lock_stock(&mut tx, product).await.unwrap();
        let cart = carts::insert_or_get(&mut tx, &s).await.unwrap();

        let clear = tokio::spawn({
            let pool = pool.clone();
            let s = s.clone();
            async move {
                CartService::new(&pool, RetryPolicy::NONE)
                    .clear_cart(&s)
                    .await
            }
        });
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        assert!(!clear.is_finished(), "clear must wait for the add to commit");

        assert!(
            carts::lock_item_for_product(&mut tx, cart.id, product)
                .await
                .unwrap()
                .is_none()
        );
        carts::insert_item(&mut tx, cart.id, product, qty(2))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        clear.await.unwrap().unwrap();
        assert!(!service.get_cart(&s).await.unwrap().exists());
    }
}
