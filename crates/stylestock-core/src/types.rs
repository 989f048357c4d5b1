//! # Domain Types
//!
//! Core domain types used throughout StyleStock.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  *_snapshot     │   │  name           │       │
//! │  │  cost_cents     │   │  total_cents    │   │  total_purchases│       │
//! │  │  margin_bps     │   │  payment_method │   │  total_spent    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ StockMovement   │   │  MovementKind   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  quantity (±)   │   │  Entry / Exit   │   │  Cash / Pix     │       │
//! │  │  prev ──► new   │   │  Adjustment     │   │  DebitCard      │       │
//! │  └─────────────────┘   │  Sale           │   │  CreditCard     │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for references
//! - Business ID where one exists (product `code`, user `username`)
//!
//! ## Snapshot Pattern
//! Sales and stock movements copy the data they need (product name, cost at
//! sale, customer name) into their own rows, so historical records stay
//! stable even when the source entity is edited or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Margin, Money};

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Debit card on external terminal.
    DebitCard,
    /// Credit card on external terminal.
    CreditCard,
    /// Brazilian instant payment.
    Pix,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

// =============================================================================
// Movement Kind
// =============================================================================

/// The cause of a stock movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Stock received (initial registration, restock).
    Entry,
    /// Stock removed outside a sale (damage, loss, return to supplier).
    Exit,
    /// Stock corrected through a product edit.
    Adjustment,
    /// Stock consumed by a recorded sale.
    Sale,
}

// =============================================================================
// User Role
// =============================================================================

/// Access level of a user account.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full access, including the admin dashboard.
    Admin,
    /// Day-to-day operations; no admin routes.
    Seller,
}

// =============================================================================
// Product
// =============================================================================

/// A catalog item available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Human-readable product code - business identifier, unique.
    pub code: String,

    /// Display name shown in the catalog and snapshotted into sales.
    pub name: String,

    /// Free-form category ("T-Shirts", "Dresses", ...).
    pub category: String,

    /// Acquisition cost in cents.
    pub cost_cents: i64,

    /// Markup margin in basis points (5000 = 50%).
    pub margin_bps: u32,

    /// Derived retail price: cost × (1 + margin). Recomputed on every
    /// create/update, stored so queries and reports never re-derive it.
    pub suggested_price_cents: i64,

    /// Current stock level. Never negative.
    pub current_stock: i64,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the cost price as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Returns the margin.
    #[inline]
    pub fn margin(&self) -> Margin {
        Margin::from_bps(self.margin_bps)
    }

    /// Returns the suggested retail price as Money.
    #[inline]
    pub fn suggested_price(&self) -> Money {
        Money::from_cents(self.suggested_price_cents)
    }

    /// Checks whether stock has fallen to the low-stock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= crate::LOW_STOCK_THRESHOLD
    }

    /// Checks if the requested quantity can be sold from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.current_stock >= quantity
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale. Immutable once created - there is no update path.
///
/// Uses the snapshot pattern: product name, cost, and customer name are
/// frozen at sale time so historical margins survive later edits.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    /// Product reference. Not a live foreign key - the product may have
    /// been deleted since.
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    /// Cost price in cents at time of sale (frozen).
    pub cost_at_sale_cents: i64,
    /// Unit price actually charged, in cents.
    pub sale_price_cents: i64,
    /// Units sold.
    pub quantity: i64,
    /// sale_price × quantity, in cents.
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// Optional customer reference. Not a live foreign key.
    pub customer_id: Option<String>,
    /// Customer name at time of sale (frozen).
    pub customer_name: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the unit sale price as Money.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Returns the sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Profit earned on this sale: (sale price − cost at sale) × quantity.
    ///
    /// Uses the frozen cost, so the figure is stable even if the product's
    /// cost changes later.
    #[inline]
    pub fn profit_cents(&self) -> i64 {
        (self.sale_price_cents - self.cost_at_sale_cents) * self.quantity
    }

    /// Returns the profit as Money.
    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents())
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with purchase aggregates maintained by the sale flow.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// Count of sales attributed to this customer.
    pub total_purchases: i64,
    /// Sum of attributed sale totals, in cents.
    pub total_spent_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the lifetime spend as Money.
    #[inline]
    pub fn total_spent(&self) -> Money {
        Money::from_cents(self.total_spent_cents)
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// One entry in the append-only stock ledger.
///
/// Every mutation of a product's stock - registration, manual edit,
/// adjustment, sale - writes exactly one movement capturing the before/after
/// values. Rows are never updated; deleting one is purely a record-keeping
/// action and does not touch product stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    /// Product reference. Not a live foreign key.
    pub product_id: String,
    /// Product name at time of movement (frozen).
    pub product_name: String,
    pub kind: MovementKind,
    /// Signed stock delta: positive for entries, negative for exits/sales.
    pub quantity: i64,
    /// Stock level before this movement.
    pub previous_stock: i64,
    /// Stock level after this movement.
    pub new_stock: i64,
    /// Human-readable cause ("Initial stock", "Sale: 3 x Slim Jeans", ...).
    pub reason: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    /// Ledger consistency check: `previous_stock + quantity == new_stock`.
    #[inline]
    pub fn balances(&self) -> bool {
        self.previous_stock + self.quantity == self.new_stock
    }
}

// =============================================================================
// User
// =============================================================================

/// A user account. Never serialized directly - the API layer maps this to a
/// DTO without the password hash.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 PHC-format hash.
    pub password_hash: String,
    pub display_name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl User {
    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

// =============================================================================
// Input Types
// =============================================================================

/// Fields required to register a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub category: String,
    pub cost_cents: i64,
    pub margin_bps: u32,
    /// Starting stock. When positive, registration also writes an `entry`
    /// ledger movement.
    pub initial_stock: i64,
}

/// Full-field product update. Changing `current_stock` here writes an
/// `adjustment` ledger movement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateProduct {
    pub code: String,
    pub name: String,
    pub category: String,
    pub cost_cents: i64,
    pub margin_bps: u32,
    pub current_stock: i64,
}

/// Fields required to record a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub product_id: String,
    pub quantity: i64,
    /// Unit price actually charged (the seller may deviate from the
    /// suggested price).
    pub sale_price_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
}

/// Fields required to register a customer.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Customer contact update. Purchase aggregates are maintained by the sale
/// flow and cannot be edited.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct UpdateCustomer {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

// =============================================================================
// Change Events
// =============================================================================

/// Which entity collection a change event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Product,
    Sale,
    Customer,
    StockMovement,
}

/// What happened to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Created,
    Updated,
    Deleted,
}

/// An incremental change notification, published after a mutation commits.
///
/// Carries the entity kind, the operation, and the affected id - enough for
/// a consumer to re-fetch one record instead of reloading the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChangeEvent {
    pub entity: EntityKind,
    pub op: ChangeOp,
    pub id: String,
}

impl ChangeEvent {
    #[inline]
    pub fn created(entity: EntityKind, id: impl Into<String>) -> Self {
        ChangeEvent {
            entity,
            op: ChangeOp::Created,
            id: id.into(),
        }
    }

    #[inline]
    pub fn updated(entity: EntityKind, id: impl Into<String>) -> Self {
        ChangeEvent {
            entity,
            op: ChangeOp::Updated,
            id: id.into(),
        }
    }

    #[inline]
    pub fn deleted(entity: EntityKind, id: impl Into<String>) -> Self {
        ChangeEvent {
            entity,
            op: ChangeOp::Deleted,
            id: id.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product(stock: i64) -> Product {
        Product {
            id: "p1".to_string(),
            code: "LC-001".to_string(),
            name: "Linen Camisa".to_string(),
            category: "Shirts".to_string(),
            cost_cents: 5000,
            margin_bps: 5000,
            suggested_price_cents: 7500,
            current_stock: stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_payment_method_default() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    #[test]
    fn test_product_low_stock_boundary() {
        assert!(sample_product(0).is_low_stock());
        assert!(sample_product(5).is_low_stock());
        assert!(!sample_product(6).is_low_stock());
    }

    #[test]
    fn test_product_can_sell() {
        let product = sample_product(10);
        assert!(product.can_sell(10));
        assert!(product.can_sell(3));
        assert!(!product.can_sell(11));
    }

    #[test]
    fn test_sale_profit_uses_frozen_cost() {
        let sale = Sale {
            id: "s1".to_string(),
            product_id: "p1".to_string(),
            product_name: "Linen Camisa".to_string(),
            cost_at_sale_cents: 5000,
            sale_price_cents: 7500,
            quantity: 3,
            total_cents: 22500,
            payment_method: PaymentMethod::Cash,
            customer_id: None,
            customer_name: None,
            created_at: Utc::now(),
        };
        assert_eq!(sale.profit_cents(), 7500);
        assert_eq!(sale.total().cents(), 22500);
        assert_eq!(sale.sale_price().dollars(), 75);
        assert_eq!(sale.profit(), Money::from_cents(7500));
    }

    #[test]
    fn test_money_views_match_raw_cents() {
        let product = sample_product(10);
        assert_eq!(product.cost(), Money::from_cents(5000));
        assert_eq!(product.margin(), Margin::from_bps(5000));
        assert_eq!(product.suggested_price().cents(), 7500);

        let customer = Customer {
            id: "c1".to_string(),
            name: "Maria Souza".to_string(),
            phone: None,
            email: None,
            total_purchases: 2,
            total_spent_cents: 30000,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert_eq!(customer.total_spent(), Money::from_cents(30000));
    }

    #[test]
    fn test_movement_balances() {
        let movement = StockMovement {
            id: "m1".to_string(),
            product_id: "p1".to_string(),
            product_name: "Linen Camisa".to_string(),
            kind: MovementKind::Sale,
            quantity: -3,
            previous_stock: 10,
            new_stock: 7,
            reason: "Sale: 3 x Linen Camisa".to_string(),
            created_at: Utc::now(),
        };
        assert!(movement.balances());

        let broken = StockMovement {
            new_stock: 8,
            ..movement
        };
        assert!(!broken.balances());
    }

    #[test]
    fn test_change_event_constructors() {
        let event = ChangeEvent::created(EntityKind::Product, "p1");
        assert_eq!(event.op, ChangeOp::Created);
        assert_eq!(event.entity, EntityKind::Product);
        assert_eq!(event.id, "p1");

        assert_eq!(
            ChangeEvent::deleted(EntityKind::Sale, "s1").op,
            ChangeOp::Deleted
        );
    }
}
