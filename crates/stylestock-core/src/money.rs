//! # Money Module
//!
//! Provides the `Money` and `Margin` types for handling monetary values and
//! markup percentages safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FLOATS CANNOT HOLD PRICES                                              │
//! │                                                                         │
//! │  Binary floating point has no exact 0.1:                                │
//! │    0.1 + 0.2 == 0.30000000000000004                                     │
//! │                                                                         │
//! │  Price a $49.99 shirt at a 50% markup with floats and you get           │
//! │    74.98499999..., and two code paths disagree on the price.            │
//! │                                                                         │
//! │  HERE: integer cents + integer basis points, always.                    │
//! │    4999 × (10000 + 5000) / 10000 = 7499 cents, rounded half-up,         │
//! │    same answer on every machine and every call.                         │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stylestock_core::money::{Margin, Money};
//!
//! let cost = Money::from_cents(5000); // $50.00
//!
//! // Suggested price = cost × (1 + margin)
//! let suggested = cost.with_margin(Margin::from_percentage(50.0));
//! assert_eq!(suggested.cents(), 7500); // $75.00
//! ```
//!
//! There is deliberately no constructor taking an `f64`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount held as whole cents.
///
/// Signed so that corrections and per-unit profit deltas can go below zero.
/// The wrapper is free at runtime; it exists so a raw `i64` of cents can
/// never be confused with a quantity or a basis-point value.
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product.cost_cents ──► with_margin ──► Product.suggested_price_cents  │
/// │                                                                         │
/// │  Sale.sale_price_cents × quantity ──► Sale.total_cents                 │
/// │                                                                         │
/// │  (sale_price − cost_at_sale) × quantity ──► profit in reports          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Wraps a raw cent count.
    ///
    /// ## Example
    /// ```rust
    /// use stylestock_core::money::Money;
    ///
    /// let price = Money::from_cents(7599); // $75.99
    /// assert_eq!(price.cents(), 7599);
    /// ```
    ///
    /// Cents are the unit everywhere: database columns, JSON payloads,
    /// report math. Dividing into dollars happens only at display time.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Builds an amount from a dollar part and a cent part.
    ///
    /// ## Example
    /// ```rust
    /// use stylestock_core::money::Money;
    ///
    /// let price = Money::from_major_minor(12, 5); // $12.05
    /// assert_eq!(price.cents(), 1205);
    ///
    /// let refund = Money::from_major_minor(-3, 25); // -$3.25
    /// assert_eq!(refund.cents(), -325);
    /// ```
    ///
    /// The sign lives on the major part; the minor part is a magnitude.
    /// `from_major_minor(-3, 25)` is -$3.25, never -$2.75.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Minor extends the magnitude away from zero, whichever side of
        // zero major sits on.
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// The amount as whole cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// The dollar part, truncated toward zero.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// The cent part as a magnitude in 0..=99.
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// The zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// True for exactly zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// True for amounts strictly above zero.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// True for amounts strictly below zero.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// The magnitude of this amount.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Inflates this amount by a margin: `amount × (1 + margin)`.
    ///
    /// This is how a product's suggested retail price is derived from its
    /// cost price.
    ///
    /// ## Implementation
    /// Pure integer math: `(cents × (10000 + bps) + 5000) / 10000`. Adding
    /// half the divisor before dividing rounds half-up instead of
    /// truncating. The intermediate runs in i128 so no representable cost
    /// and margin can overflow it, and amounts inside the
    /// [`MAX_PRICE_CENTS`](crate::MAX_PRICE_CENTS) and
    /// [`MAX_MARGIN_BPS`](crate::MAX_MARGIN_BPS) caps that validation
    /// enforces come back out well within `i64` range.
    ///
    /// ## Example
    /// ```rust
    /// use stylestock_core::money::{Margin, Money};
    ///
    /// let cost = Money::from_cents(5000);       // $50.00
    /// let margin = Margin::from_bps(5000);      // 50%
    ///
    /// let suggested = cost.with_margin(margin);
    /// // $50.00 × 1.50 = $75.00
    /// assert_eq!(suggested.cents(), 7500);
    /// ```
    ///
    /// ## User Workflow
    /// ```text
    /// Cost Price: $50.00
    ///      │
    ///      ▼
    /// with_margin(50%) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Suggested Price: $75.00
    /// ```
    pub fn with_margin(&self, margin: Margin) -> Money {
        let factor = 10_000_i128 + margin.bps() as i128;
        let price_cents = (self.0 as i128 * factor + 5000) / 10_000;
        Money::from_cents(price_cents as i64)
    }

    /// Scales a unit price up to a line total.
    ///
    /// ## Example
    /// ```rust
    /// use stylestock_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(7500); // $75.00
    /// let total = unit_price.multiply_quantity(3);
    /// assert_eq!(total.cents(), 22500); // $225.00
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Margin Type
// =============================================================================

/// A markup margin stored in basis points (1 bps = 0.01%).
///
/// ## Why Basis Points?
/// A margin of 42.5% stored as a float invites the same drift problems as
/// float money. 4250 bps is exact, orderable, and survives serialization
/// round-trips unchanged.
///
/// ## Example
/// ```rust
/// use stylestock_core::money::Margin;
///
/// let margin = Margin::from_percentage(50.0);
/// assert_eq!(margin.bps(), 5000);
/// assert_eq!(margin.percentage(), 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Margin(u32);

impl Margin {
    /// Wraps a basis-point count (5000 = 50%).
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        Margin(bps)
    }

    /// Converts a percentage (50.0 = 50%) to the nearest basis point.
    ///
    /// Anything finer than 0.01% is rounded away, which is below the
    /// resolution retail markup is quoted in anyway.
    #[inline]
    pub fn from_percentage(pct: f64) -> Self {
        Margin((pct * 100.0).round() as u32)
    }

    /// The margin in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The margin as a percentage.
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero margin (suggested price equals cost).
    #[inline]
    pub const fn zero() -> Self {
        Margin(0)
    }

    /// True for zero margin.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for Margin {
    fn default() -> Self {
        Margin::zero()
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Renders as `$12.05` / `-$3.25` for logs and debug output.
///
/// Client-facing formatting (currency symbol, locale separators) belongs to
/// the frontend, not here.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// `+` sums two amounts.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// `-` takes the difference, used for per-unit profit.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// `price * qty` with a plain integer literal on the right.
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// `price * qty` where the quantity is already an i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(7599);
        assert_eq!(money.cents(), 7599);
        assert_eq!(money.dollars(), 75);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(12, 5).cents(), 1205);
        assert_eq!(Money::from_major_minor(-3, 25).cents(), -325);
        assert_eq!(Money::from_major_minor(0, 99).cents(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1205)), "$12.05");
        assert_eq!(format!("{}", Money::from_cents(7500)), "$75.00");
        assert_eq!(format!("{}", Money::from_cents(-325)), "-$3.25");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(2250);
        let b = Money::from_cents(750);

        assert_eq!((a + b).cents(), 3000);
        assert_eq!((a - b).cents(), 1500);
        let tripled: Money = b * 3;
        assert_eq!(tripled.cents(), 2250);

        let mut acc = Money::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc.cents(), 1500);
    }

    #[test]
    fn test_with_margin_basic() {
        // $50.00 at 50% margin = $75.00
        let cost = Money::from_cents(5000);
        let suggested = cost.with_margin(Margin::from_bps(5000));
        assert_eq!(suggested.cents(), 7500);
    }

    #[test]
    fn test_with_margin_rounds_half_up() {
        // $3.33 at 15% = $3.8295 → $3.83
        let cost = Money::from_cents(333);
        let suggested = cost.with_margin(Margin::from_bps(1500));
        assert_eq!(suggested.cents(), 383);

        // 1 cent at 50% = 1.5 cents → 2 cents
        let tiny = Money::from_cents(1);
        assert_eq!(tiny.with_margin(Margin::from_bps(5000)).cents(), 2);
    }

    #[test]
    fn test_with_zero_margin_is_cost() {
        let cost = Money::from_cents(4999);
        assert_eq!(cost.with_margin(Margin::zero()).cents(), 4999);
    }

    #[test]
    fn test_with_margin_exact_at_validation_caps() {
        use crate::{MAX_MARGIN_BPS, MAX_PRICE_CENTS, MAX_SALE_QUANTITY};

        // The most expensive cost at the steepest margin: $1,000,000 at
        // 1000% markup is $11,000,000, exact and positive.
        let cost = Money::from_cents(MAX_PRICE_CENTS);
        let suggested = cost.with_margin(Margin::from_bps(MAX_MARGIN_BPS));
        assert_eq!(suggested.cents(), 1_100_000_000);
        assert!(suggested.is_positive());

        // The largest line total a sale can produce also fits.
        let total = Money::from_cents(MAX_PRICE_CENTS).multiply_quantity(MAX_SALE_QUANTITY);
        assert_eq!(total.cents(), 99_900_000_000);
    }

    #[test]
    fn test_margin_percentage_conversion() {
        let margin = Margin::from_percentage(42.5);
        assert_eq!(margin.bps(), 4250);
        assert_eq!(margin.percentage(), 42.5);

        assert!(Margin::default().is_zero());
    }

    #[test]
    fn test_sign_predicates() {
        assert!(Money::zero().is_zero());
        assert!(!Money::zero().is_positive());
        assert!(!Money::zero().is_negative());

        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-1205).abs().cents(), 1205);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(7500);
        let total = unit_price.multiply_quantity(3);
        assert_eq!(total.cents(), 22500);
    }

    /// The flagship pricing scenario: cost $50.00, margin 50%, sell 3 units
    /// at the suggested price.
    #[test]
    fn test_pricing_scenario_end_to_end() {
        let cost = Money::from_cents(5000);
        let suggested = cost.with_margin(Margin::from_percentage(50.0));
        assert_eq!(suggested.cents(), 7500);

        let total = suggested.multiply_quantity(3);
        assert_eq!(total.cents(), 22500);

        let profit = (suggested - cost).multiply_quantity(3);
        assert_eq!(profit.cents(), 7500);
    }
}
