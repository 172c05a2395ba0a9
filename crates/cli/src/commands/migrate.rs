//! Database migration command.
//!
//! Applies `crates/server/migrations/` (schema `desk`: contacts, admin users
//! and sessions). Already-applied migrations are skipped.

use contact_desk_server::db::create_pool;

use super::{CommandError, database_url};

/// Run all pending migrations.
pub async fn run() -> Result<(), CommandError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
