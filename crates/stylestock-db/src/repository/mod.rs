//! # Repositories
//!
//! All SQL in the workspace lives under this module; callers see typed
//! methods and never a query string.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  HTTP Handler                                                          │
//! │       │                                                                 │
//! │       │  db.products().create(&new_product)                            │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  ProductRepository                                                     │
//! │  ├── list(&self)                                                       │
//! │  ├── get_by_id(&self, id)                                              │
//! │  ├── create(&self, new)        ← transaction + ledger entry            │
//! │  └── adjust_stock(&self, ...)  ← guarded update                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database ──► commit ──► ChangeFeed.publish(event)              │
//! │                                                                         │
//! │  Invariants owned here:                                                 │
//! │  • Stock writes and their ledger entries commit together               │
//! │  • Change events can never describe a rolled-back write                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - [`product::ProductRepository`] - Catalog CRUD and stock adjustments
//! - [`sale::SaleRepository`] - Transactional sale recording
//! - [`customer::CustomerRepository`] - Customer CRUD and purchase aggregates
//! - [`movement::MovementRepository`] - Append-only stock ledger
//! - [`user::UserRepository`] - Login accounts

pub mod customer;
pub mod movement;
pub mod product;
pub mod sale;
pub mod user;
