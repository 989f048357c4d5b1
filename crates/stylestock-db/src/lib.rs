//! # stylestock-db: Database Layer for StyleStock
//!
//! The persistence layer: an embedded SQLite file behind sqlx, exposed as
//! per-entity repositories plus a broadcast feed of committed changes.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       StyleStock Data Flow                              │
//! │                                                                         │
//! │  HTTP handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  stylestock-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  ChangeFeed  │  │   │
//! │  │   │   (pool.rs)   │    │ (product.rs)  │    │ (changes.rs) │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ ProductRepo   │    │ broadcast of │  │   │
//! │  │   │ Migrations    │◄───│ SaleRepo      │───►│ ChangeEvents │  │   │
//! │  │   │ Management    │    │ CustomerRepo  │    │ after commit │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │                   ./stylestock.db (WAL)                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - DbConfig and the Database handle
//! - [`migrations`] - Compiled-in schema migrations
//! - [`changes`] - Broadcast feed of committed change events
//! - [`error`] - DbError and the sqlx conversions
//! - [`repository`] - One repository per entity, plus the sale flow
//!
//! ## Usage
//!
//! ```rust,ignore
//! use stylestock_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./stylestock.db")).await?;
//!
//! let products = db.products().list().await?;
//!
//! // Every committed mutation lands here
//! let mut events = db.changes().subscribe();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod changes;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use changes::ChangeFeed;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// The repositories themselves, so callers skip the module path
pub use repository::customer::CustomerRepository;
pub use repository::movement::MovementRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::{SaleError, SaleRepository};
pub use repository::user::UserRepository;
