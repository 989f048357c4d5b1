//! # stylestock-core: Pure Business Logic for StyleStock
//!
//! Every business rule in StyleStock lives here, written as plain
//! deterministic functions over plain types. No module in this crate can
//! reach a database, a socket, or a clock it wasn't handed.
//!
//! ## Where This Crate Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       StyleStock Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      HTTP API (axum)                            │   │
//! │  │    /api/products ── /api/sales ── /api/reports ── /api/events  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                stylestock-db (Database Layer)                   │   │
//! │  │        SQLite repositories, sale flow, change feed              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ stylestock-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  report   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ KPI sums  │  │   rules   │  │   │
//! │  │   │   Sale    │  │  Margin   │  │ groupings │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   plain functions, plain types, nothing async                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - The entities (Product, Sale, Customer, StockMovement, User)
//!   plus input structs and the change-event vocabulary
//! - [`money`] - Integer cents and basis points; all price math
//! - [`report`] - Aggregation over already-fetched sales and products
//! - [`error`] - CoreError and ValidationError
//! - [`validation`] - Per-field input checks
//!
//! ## Ground Rules
//!
//! Functions here are deterministic and total over their inputs. Amounts
//! are integer cents, margins are integer basis points, and failures are
//! typed enum variants; f64, panics, and stringly errors don't appear in
//! any signature.
//!
//! ## Example
//!
//! ```rust
//! use stylestock_core::money::{Margin, Money};
//!
//! let cost = Money::from_cents(5000); // $50.00
//!
//! // Suggested price = cost inflated by the margin
//! let margin = Margin::from_percentage(50.0); // 50%
//! let suggested = cost.with_margin(margin);
//!
//! assert_eq!(suggested.cents(), 7500); // $75.00
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use stylestock_core::Money` instead of
// `use stylestock_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::{Margin, Money};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Stock level at or below which a product counts as "low stock" in reports.
///
/// Clothing restock lead times make 5 units the point where a size run is
/// usually already broken. Dashboards and report documents partition on this.
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Maximum quantity of a single product in one sale.
///
/// Catches typos like 1000 where 10 was meant; no clothing sale in this
/// store legitimately moves a thousand units of one item.
pub const MAX_SALE_QUANTITY: i64 = 999;

/// Maximum margin accepted on a product, in basis points (1000%).
///
/// Anything above this is a data-entry mistake, usually cents typed into
/// the percentage field.
pub const MAX_MARGIN_BPS: u32 = 100_000;

/// Maximum price or cost accepted on any money field, in cents ($1,000,000).
///
/// A seven-figure garment is a typo. The cap also keeps every derived
/// figure inside `i64`: price times [`MAX_SALE_QUANTITY`] and cost times
/// [`MAX_MARGIN_BPS`] both stay well under the limit.
pub const MAX_PRICE_CENTS: i64 = 100_000_000;
