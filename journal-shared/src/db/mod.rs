/// PostgreSQL plumbing for the relational storage mode
///
/// # Modules
///
/// - `pool`: Connection pool creation and health checks
/// - `migrations`: Embedded migration runner
///
/// Queries live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
