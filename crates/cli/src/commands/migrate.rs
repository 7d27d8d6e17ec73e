//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded into
//! the storefront library, so this binary always applies the schema the
//! server was built against.

use shopcart_storefront::db;

/// Apply all pending storefront migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;

    tracing::info!(
        available = db::MIGRATOR.iter().count(),
        "Running storefront migrations..."
    );
    db::run_migrations(&pool).await?;

    tracing::info!("Storefront migrations complete!");
    Ok(())
}
