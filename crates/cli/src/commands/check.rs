//! Connectivity and schema check.

use std::collections::HashSet;

use shopcart_storefront::db;

/// Verify the database answers and every embedded migration is applied.
///
/// # Errors
///
/// Returns an error if the database is unreachable or migrations are pending.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (_, pool) = super::connect().await?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    tracing::info!("Database reachable");

    // Before the first migration the bookkeeping table does not exist.
    let applied: HashSet<i64> =
        sqlx::query_scalar::<_, i64>("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(&pool)
            .await
            .unwrap_or_default()
            .into_iter()
            .collect();

    let pending: Vec<String> = db::MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration() && !applied.contains(&m.version))
        .map(|m| format!("{} {}", m.version, m.description))
        .collect();

    if pending.is_empty() {
        tracing::info!(applied = applied.len(), "Schema up to date");
        return Ok(());
    }

    for migration in &pending {
        tracing::warn!("  pending: {migration}");
    }
    Err(format!("{} pending migration(s); run `shopcart migrate`", pending.len()).into())
}
