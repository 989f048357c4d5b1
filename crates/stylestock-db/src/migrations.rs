//! # Schema Migrations
//!
//! The SQL under `migrations/sqlite/` is compiled into the binary and
//! applied on startup, so a fresh database file becomes a working store
//! with no external tooling.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Database::new (run_migrations enabled)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  _sqlx_migrations table: which versions has this file already seen?     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  apply the embedded files it has not, lowest version first,             │
//! │  each inside its own transaction, recording version + checksum          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A checksum mismatch on an already-applied file aborts the run, which is
//! why shipped migration files are append-only: fix a mistake with a new
//! `NNN_description.sql`, never by editing an old one.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

// Path is relative to this crate's Cargo.toml.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Brings the connected database up to the current schema version.
///
/// Re-running against an up-to-date file is a no-op.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Applying pending migrations");

    MIGRATOR.run(pool).await?;

    info!("Migrations current");
    Ok(())
}
