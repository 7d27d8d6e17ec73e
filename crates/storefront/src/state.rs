//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::RetryPolicy;
use crate::services::{CartService, CatalogService, UserService};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, pool }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    fn retry(&self) -> RetryPolicy {
        self.inner.config.database.retry
    }

    /// User registration backed by this state's pool.
    #[must_use]
    pub fn users(&self) -> UserService<'_> {
        UserService::new(self.pool(), self.retry())
    }

    /// Product catalog backed by this state's pool.
    #[must_use]
    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(self.pool(), self.retry())
    }

    /// Session carts backed by this state's pool.
    #[must_use]
    pub fn carts(&self) -> CartService<'_> {
        CartService::new(self.pool(), self.retry())
    }
}
