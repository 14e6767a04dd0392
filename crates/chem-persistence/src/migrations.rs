//! Embedded migration runner (spec §6 Persisted State Layout).
//!
//! Migrations live under `migrations/` at this crate's root and are
//! embedded at compile time via `sqlx::migrate!`.

use sqlx::PgPool;

use crate::error::PersistenceError;

pub async fn run_pending_migrations(pool: &PgPool) -> Result<(), PersistenceError> {
    sqlx::query("CREATE EXTENSION IF NOT EXISTS pgcrypto").execute(pool).await.ok();
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| PersistenceError::Unknown(format!("migration error: {e}")))
}
