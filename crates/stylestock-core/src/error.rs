//! # Error Types
//!
//! Domain-specific error types for stylestock-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stylestock-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  stylestock-db errors (separate crate)                                 │
//! │  ├── DbError          - Database operation failures                    │
//! │  └── SaleError        - Sale flow (domain + db causes)                 │
//! │                                                                         │
//! │  HTTP API errors (in apps/server)                                      │
//! │  └── ApiError         - What clients see (serialized)                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SaleError → ApiError → Client     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant carries the identifiers and quantities needed to render a
//! message without looking anything else up, and the `#[error]` text is that
//! message. Nothing in this crate logs or formats beyond what thiserror
//! derives.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule failures.
///
/// Raised by the pure domain checks and by the sale flow; the HTTP layer
/// turns each variant into a client-facing status and message.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product with the given code or id, either because it never
    /// existed or because it was deleted out from under the caller.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// A sale asked for more units than the shelf holds.
    ///
    /// The sale flow checks this up front and the guarded decrement
    /// re-checks it at commit, so concurrent sales cannot oversell.
    ///
    /// ```text
    /// Record Sale (qty: 11)
    ///      │
    ///      ▼
    /// Check stock: available=10
    ///      │
    ///      ▼
    /// InsufficientStock { code: "LC-001", available: 10, requested: 11 }
    ///      │
    ///      ▼
    /// UI shows: "Only 10 units of LC-001 in stock"
    /// ```
    #[error("Insufficient stock for {code}: available {available}, requested {requested}")]
    InsufficientStock {
        code: String,
        available: i64,
        requested: i64,
    },

    /// An input failed a field check before any business logic ran.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Per-field input rejections.
///
/// Produced by the `validation` module; each variant names the offending
/// field so the client can attach the message to the right form control.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Empty or whitespace-only where a value is mandatory.
    #[error("{field} is required")]
    Required { field: String },

    /// Text over the column limit.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Number outside its allowed window.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or below where only positive values make sense.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Below zero where zero is the floor.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Shape is wrong: bad UUID, malformed email, and the like.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Unit Tests
// =============================================================================
