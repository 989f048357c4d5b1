//! # Pool and Database Handle
//!
//! Pool construction, SQLite tuning, and the single [`Database`] handle
//! the rest of the workspace talks to.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Database Handle                                 │
//! │                                                                         │
//! │  DbConfig::new("./stylestock.db")                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config).await                                            │
//! │       │                                                                 │
//! │       ├──► SqlitePool (WAL, foreign keys on, NORMAL sync)              │
//! │       ├──► migrations (unless disabled)                                 │
//! │       └──► ChangeFeed (broadcast of committed mutations)               │
//! │                                                                         │
//! │  db.products() / db.sales() / db.customers() / ...                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  per-call repository structs sharing the pool and the feed              │
//! │                                                                         │
//! │  db.changes().subscribe() ──► SSE fan-out, tests, anything live        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## SQLite Tuning
//! WAL journal mode keeps reads and writes from blocking each other, which
//! matters because every sale is a multi-table write while the dashboard is
//! polling reads. NORMAL synchronous trades the last in-flight transaction
//! on a power cut for much cheaper commits.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::changes::ChangeFeed;
use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::customer::CustomerRepository;
use crate::repository::movement::MovementRepository;
use crate::repository::product::ProductRepository;
use crate::repository::sale::SaleRepository;
use crate::repository::user::UserRepository;

// =============================================================================
// Configuration
// =============================================================================

/// Connection settings consumed by [`Database::new`].
///
/// Start from [`DbConfig::new`] and override the pool knobs with the
/// builder methods; the defaults suit a single-store deployment.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file. Created on first connect.
    pub database_path: PathBuf,

    /// Upper bound on pooled connections. Default: 5.
    pub max_connections: u32,

    /// Connections kept warm even when idle. Default: 1.
    pub min_connections: u32,

    /// How long to wait for a free connection. Default: 30 seconds.
    pub connect_timeout: Duration,

    /// Idle time before a connection above the minimum is dropped.
    /// Default: 10 minutes.
    pub idle_timeout: Duration,

    /// Whether `Database::new` applies pending migrations. Default: true.
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration pointing at the given database file.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = DbConfig::new("./data/stylestock.db").max_connections(8);
    /// ```
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    /// Caps the pool size.
    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Floor of warm connections.
    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Acquire timeout before a request gives up on the pool.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Turns startup migrations on or off.
    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Configuration for an in-memory database, used throughout the test
    /// suites. Each handle gets a fresh, fully migrated schema.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            // More than one connection would mean more than one empty database
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main database handle providing repository access and the change feed.
///
/// ## Design
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  One handle, cheap clones                                               │
/// │                                                                         │
/// │  Database {pool, changes} is Clone; every clone shares the same pool   │
/// │  and broadcast sender. Repositories are constructed per call - they    │
/// │  are thin wrappers over (pool, feed) and carry no state of their own. │
/// │                                                                         │
/// │  db.products() ──► ProductRepository { pool, changes }                 │
/// │  db.sales()    ──► SaleRepository    { pool, changes }                 │
/// │  db.changes()  ──► subscribe() for committed ChangeEvents              │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// ## Usage in HTTP Handlers
/// ```rust,ignore
/// async fn list_products(
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<ProductDto>>, ApiError> {
///     let products = state.db.products().list().await?;
///     Ok(Json(products.into_iter().map(ProductDto::from).collect()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    /// Shared SQLite pool.
    pool: SqlitePool,
    /// Broadcast feed of committed change events.
    changes: ChangeFeed,
}

impl Database {
    /// Opens (creating if necessary) the database file, builds the pool,
    /// and applies migrations when the config asks for them. Fails with
    /// `DbError::ConnectionFailed` or `DbError::MigrationFailed`.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening database"
        );

        // mode=rwc: open read-write, create the file when missing
        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // SQLite leaves foreign key enforcement off by default
            .foreign_keys(true)
            .create_if_missing(true);

        debug!("Connect options prepared");

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Pool ready"
        );

        let db = Database {
            pool,
            changes: ChangeFeed::new(),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Idempotent; applied versions are tracked
    /// in the `_sqlx_migrations` table.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await?;
        info!("Schema is up to date");
        Ok(())
    }

    /// Returns a reference to the connection pool, for queries the
    /// repositories don't cover.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the change feed. Subscribe to receive events for every
    /// committed mutation.
    pub fn changes(&self) -> &ChangeFeed {
        &self.changes
    }

    /// Product repository over the shared pool and feed.
    ///
    /// ```rust,ignore
    /// let products = db.products().list().await?;
    /// ```
    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone(), self.changes.clone())
    }

    /// Sale repository, home of the transactional sale flow.
    pub fn sales(&self) -> SaleRepository {
        SaleRepository::new(self.pool.clone(), self.changes.clone())
    }

    /// Customer repository.
    pub fn customers(&self) -> CustomerRepository {
        CustomerRepository::new(self.pool.clone(), self.changes.clone())
    }

    /// Stock movement (ledger) repository.
    pub fn movements(&self) -> MovementRepository {
        MovementRepository::new(self.pool.clone(), self.changes.clone())
    }

    /// User account repository.
    ///
    /// Accounts are server-internal; their changes are not published on
    /// the change feed.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls made afterwards fail.
    pub async fn close(&self) {
        info!("Closing database pool");
        self.pool.close().await;
    }

    /// Liveness check: can the pool still execute a query?
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_migrates_and_responds() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        // Migrations ran, so the product table exists and is empty.
        assert_eq!(db.products().count().await.unwrap(), 0);

        // Raw pool access works for queries the repositories don't cover.
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(row.0, 0);
    }

    #[tokio::test]
    async fn test_config_builder_overrides_defaults() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2)
            .connect_timeout(Duration::from_secs(5))
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.run_migrations);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_health_check_fails_after_close() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.health_check().await);

        db.close().await;
        assert!(!db.health_check().await);
    }
}
