//! # Product Repository
//!
//! Database operations for the clothing catalog.
//!
//! ## Stock Writes Pair With Ledger Entries
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Write Transactions                           │
//! │                                                                         │
//! │  create(new)                    update(id, update)                      │
//! │   │                              │                                      │
//! │   ▼                              ▼                                      │
//! │  BEGIN                          BEGIN                                   │
//! │   ├─ INSERT products             ├─ SELECT products (old stock)         │
//! │   └─ INSERT movement             ├─ UPDATE products                     │
//! │      (entry, "Initial stock",    └─ INSERT movement (adjustment,        │
//! │       if initial stock > 0)         "Manual stock update",              │
//! │  COMMIT                             if stock changed)                   │
//! │   │                             COMMIT                                  │
//! │   ▼                              │                                      │
//! │  publish(product created,        ▼                                      │
//! │          movement created)      publish(product updated, ...)          │
//! │                                                                         │
//! │  adjust_stock(id, delta, reason)                                       │
//! │   │                                                                     │
//! │   ▼                                                                     │
//! │  BEGIN                                                                  │
//! │   ├─ SELECT products                                                    │
//! │   ├─ check: stock + delta >= 0  → InsufficientStock otherwise          │
//! │   ├─ UPDATE ... WHERE current_stock + delta >= 0 (guard re-checked)    │
//! │   └─ INSERT movement (entry if delta > 0, exit if delta < 0)           │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Events go out only after COMMIT. A rolled-back write publishes        │
//! │  nothing.                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::changes::ChangeFeed;
use crate::error::{DbError, DbResult};
use crate::repository::movement::insert_movement;
use crate::repository::sale::SaleError;
use stylestock_core::{
    ChangeEvent, CoreError, EntityKind, Margin, Money, MovementKind, NewProduct, Product,
    StockMovement, UpdateProduct,
};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.create(&new_product).await?;
/// let all = repo.list().await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    changes: ChangeFeed,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool, changes: ChangeFeed) -> Self {
        ProductRepository { pool, changes }
    }

    /// Lists all products, newest first.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, cost_cents, margin_bps,
                   suggested_price_cents, current_stock, created_at, updated_at
            FROM products
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, cost_cents, margin_bps,
                   suggested_price_cents, current_stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its human-readable code (e.g., "LC-001").
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, cost_cents, margin_bps,
                   suggested_price_cents, current_stock, created_at, updated_at
            FROM products
            WHERE code = ?1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Registers a new product.
    ///
    /// ## What This Does
    /// 1. Derives the suggested price from cost and margin
    /// 2. Inserts the product row
    /// 3. If initial stock > 0, appends an `entry` ledger row
    ///    ("Initial stock") in the same transaction
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with derived fields
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn create(&self, new: &NewProduct) -> DbResult<Product> {
        debug!(code = %new.code, "Creating product");

        let now = Utc::now();
        let suggested = Money::from_cents(new.cost_cents)
            .with_margin(Margin::from_bps(new.margin_bps));

        let product = Product {
            id: Uuid::new_v4().to_string(),
            code: new.code.clone(),
            name: new.name.clone(),
            category: new.category.clone(),
            cost_cents: new.cost_cents,
            margin_bps: new.margin_bps,
            suggested_price_cents: suggested.cents(),
            current_stock: new.initial_stock,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, name, category,
                cost_cents, margin_bps, suggested_price_cents, current_stock,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.cost_cents)
        .bind(product.margin_bps)
        .bind(product.suggested_price_cents)
        .bind(product.current_stock)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&mut *tx)
        .await?;

        let mut movement_id = None;
        if new.initial_stock > 0 {
            let movement = StockMovement {
                id: Uuid::new_v4().to_string(),
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                kind: MovementKind::Entry,
                quantity: new.initial_stock,
                previous_stock: 0,
                new_stock: new.initial_stock,
                reason: "Initial stock".to_string(),
                created_at: now,
            };
            insert_movement(&mut tx, &movement).await?;
            movement_id = Some(movement.id);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.changes
            .publish(ChangeEvent::created(EntityKind::Product, &product.id));
        if let Some(id) = movement_id {
            self.changes
                .publish(ChangeEvent::created(EntityKind::StockMovement, id));
        }

        Ok(product)
    }

    /// Updates an existing product.
    ///
    /// ## What This Does
    /// 1. Re-derives the suggested price from the new cost and margin
    /// 2. Updates the product row
    /// 3. If the stock count changed, appends an `adjustment` ledger row
    ///    ("Manual stock update") in the same transaction
    ///
    /// ## Returns
    /// * `Ok(Product)` - Updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update(&self, id: &str, update: &UpdateProduct) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();
        let suggested = Money::from_cents(update.cost_cents)
            .with_margin(Margin::from_bps(update.margin_bps));

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let existing = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, cost_cents, margin_bps,
                   suggested_price_cents, current_stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))?;

        sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                category = ?4,
                cost_cents = ?5,
                margin_bps = ?6,
                suggested_price_cents = ?7,
                current_stock = ?8,
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.code)
        .bind(&update.name)
        .bind(&update.category)
        .bind(update.cost_cents)
        .bind(update.margin_bps)
        .bind(suggested.cents())
        .bind(update.current_stock)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut movement_id = None;
        if update.current_stock != existing.current_stock {
            let movement = StockMovement {
                id: Uuid::new_v4().to_string(),
                product_id: existing.id.clone(),
                product_name: update.name.clone(),
                kind: MovementKind::Adjustment,
                quantity: update.current_stock - existing.current_stock,
                previous_stock: existing.current_stock,
                new_stock: update.current_stock,
                reason: "Manual stock update".to_string(),
                created_at: now,
            };
            insert_movement(&mut tx, &movement).await?;
            movement_id = Some(movement.id);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.changes
            .publish(ChangeEvent::updated(EntityKind::Product, id));
        if let Some(mid) = movement_id {
            self.changes
                .publish(ChangeEvent::created(EntityKind::StockMovement, mid));
        }

        Ok(Product {
            code: update.code.clone(),
            name: update.name.clone(),
            category: update.category.clone(),
            cost_cents: update.cost_cents,
            margin_bps: update.margin_bps,
            suggested_price_cents: suggested.cents(),
            current_stock: update.current_stock,
            updated_at: now,
            ..existing
        })
    }

    /// Applies a signed stock delta with a caller-supplied reason.
    ///
    /// Positive deltas append an `entry` ledger row, negative deltas an
    /// `exit` row. A delta that would push stock below zero fails with
    /// insufficient stock, re-checked at write time by the guarded UPDATE,
    /// and writes nothing. Shares [`SaleError`] with the sale flow since
    /// both fail the same way when stock runs out.
    pub async fn adjust_stock(
        &self,
        id: &str,
        delta: i64,
        reason: &str,
    ) -> Result<Product, SaleError> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, cost_cents, margin_bps,
                   suggested_price_cents, current_stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()))?;

        if product.current_stock + delta < 0 {
            return Err(CoreError::InsufficientStock {
                code: product.code,
                available: product.current_stock,
                requested: -delta,
            }
            .into());
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock + ?2, updated_at = ?3
            WHERE id = ?1 AND current_stock + ?2 >= 0
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // A concurrent writer shrank the stock between fetch and update
            return Err(CoreError::InsufficientStock {
                code: product.code,
                available: product.current_stock,
                requested: -delta,
            }
            .into());
        }

        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            kind: if delta > 0 {
                MovementKind::Entry
            } else {
                MovementKind::Exit
            },
            quantity: delta,
            previous_stock: product.current_stock,
            new_stock: product.current_stock + delta,
            reason: reason.to_string(),
            created_at: now,
        };
        insert_movement(&mut tx, &movement).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.changes
            .publish(ChangeEvent::updated(EntityKind::Product, &product.id));
        self.changes
            .publish(ChangeEvent::created(EntityKind::StockMovement, movement.id));

        Ok(Product {
            current_stock: product.current_stock + delta,
            updated_at: now,
            ..product
        })
    }

    /// Deletes a product.
    ///
    /// ## Note
    /// Sales and stock movements keep their snapshotted product name and
    /// id, so history survives the deletion.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.changes
            .publish(ChangeEvent::deleted(EntityKind::Product, id));

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
