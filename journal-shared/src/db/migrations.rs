/// Embedded schema migrations
///
/// Migrations live in `journal-shared/migrations/` and are compiled into the
/// binary with `sqlx::migrate!`, so a deployed server brings its own schema.
/// They run at startup whenever PostgreSQL storage is selected.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Applies all pending migrations
///
/// # Errors
///
/// Returns an error if any migration fails; sqlx rolls back that migration.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}
