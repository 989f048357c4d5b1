//! # Validation Module
//!
//! Per-field input checks, called by the HTTP handlers before anything
//! touches the database.
//!
//! ## Where Checks Live
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Frontend form            first pass, cosmetic only                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  HTTP handler             serde gets the types right,                   │
//! │                           THIS MODULE gets the values right             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite schema            NOT NULL / UNIQUE / CHECK backstop anything   │
//! │                           that slipped through                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Three layers on purpose: the client can lie, and a schema rejection
//! makes a worse error message than a `ValidationError` does.
//!
//! ## Usage
//! ```rust,no_run
//! use stylestock_core::validation::{validate_code, validate_quantity};
//!
//! // Validate product code before database insert
//! validate_code("LC-001").unwrap();
//!
//! // Validate quantity before recording the sale
//! validate_quantity(3).unwrap();
//! ```

use crate::error::ValidationError;
use crate::{MAX_MARGIN_BPS, MAX_PRICE_CENTS, MAX_SALE_QUANTITY};

/// What every validator returns.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code.
///
/// Codes are short labels like `LC-001`: non-empty after trimming, at
/// most 50 characters, drawn from letters, digits, `-` and `_`.
///
/// ## Example
/// ```rust
/// use stylestock_core::validation::validate_code;
///
/// assert!(validate_code("LC-001").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name: non-empty after trimming, at most 200
/// characters.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a product category.
///
/// Same rules as product names; empty categories are not allowed because
/// reports and filters group on this field.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    let category = category.trim();

    if category.is_empty() {
        return Err(ValidationError::Required {
            field: "category".to_string(),
        });
    }

    if category.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an optional email address.
///
/// ## Rules
/// - Absent/empty is fine (email is optional)
/// - Present values need an `@` with text on both sides; full RFC 5322
///   parsing is not attempted
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Ok(());
    }

    if email.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 200,
        });
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        }
        None => false,
    };

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@example.com".to_string(),
        });
    }

    Ok(())
}

/// Validates a stock movement reason.
///
/// ## Rules
/// - Must not be empty (the ledger exists to answer "why")
/// - Maximum 500 characters
pub fn validate_reason(reason: &str) -> ValidationResult<()> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 500,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale quantity: at least 1, at most
/// [`MAX_SALE_QUANTITY`].
///
/// ## In the Sale Flow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Record Sale                                                            │
/// │                                                                         │
/// │  User enters quantity: 3                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(3) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → Proceed with stock check                                │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_SALE_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_SALE_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is a legal price (giveaways,
/// promotional items); negative is not, and anything above
/// [`MAX_PRICE_CENTS`] is treated as a typo. The cap is what lets the
/// total and margin math stay in plain `i64`.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a cost price in cents. Same range as sale prices.
pub fn validate_cost_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "cost".to_string(),
        });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "cost".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a margin in basis points, capped at [`MAX_MARGIN_BPS`].
/// Typical clothing margins sit in the 4000-10000 range (40% to 100%).
pub fn validate_margin_bps(bps: u32) -> ValidationResult<()> {
    if bps > MAX_MARGIN_BPS {
        return Err(ValidationError::OutOfRange {
            field: "margin".to_string(),
            min: 0,
            max: MAX_MARGIN_BPS as i64,
        });
    }

    Ok(())
}

/// Validates a stock level. The store never tracks negative stock.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "stock".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates that a path or payload id parses as a UUID.
///
/// ## Example
/// ```rust
/// use stylestock_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
