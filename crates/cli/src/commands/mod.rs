//! CLI command implementations.

pub mod check;
pub mod migrate;
pub mod seed;

use shopcart_storefront::config::DatabaseConfig;
use shopcart_storefront::db;
use sqlx::PgPool;

/// Load `.env`, read the database settings and connect.
async fn connect() -> Result<(DatabaseConfig, PgPool), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let config = DatabaseConfig::from_env()?;
    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&config).await?;
    Ok((config, pool))
}
