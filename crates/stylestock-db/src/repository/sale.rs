//! # Sale Repository
//!
//! Transactional sale recording and sale history.
//!
//! ## Sale Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  record_sale() - One Transaction                        │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   │                                                                     │
//! │   ├─ 1. SELECT product          → ProductNotFound / InsufficientStock   │
//! │   │                                                                     │
//! │   ├─ 2. UPDATE products                                                 │
//! │   │     SET current_stock = current_stock - qty                         │
//! │   │     WHERE id = ? AND current_stock >= qty                           │
//! │   │     (0 rows → InsufficientStock, even under concurrency)           │
//! │   │                                                                     │
//! │   ├─ 3. SELECT customer name    → NotFound    (only when attributed)    │
//! │   │     UPDATE customers                                                │
//! │   │     SET total_purchases = total_purchases + 1,                      │
//! │   │         total_spent_cents = total_spent_cents + total               │
//! │   │                                                                     │
//! │   ├─ 4. INSERT sale             (cost and names snapshotted)            │
//! │   │                                                                     │
//! │   └─ 5. INSERT stock_movement   (kind sale, quantity -qty)              │
//! │   │                                                                     │
//! │  COMMIT                                                                 │
//! │   │                                                                     │
//! │   ▼                                                                     │
//! │  publish: sale created, product updated, movement created,             │
//! │           customer updated (when attributed)                           │
//! │                                                                         │
//! │  Any failure before COMMIT rolls the whole flow back - there is no     │
//! │  state where a sale row exists but stock was not decremented.          │
//! │                                                                         │
//! │  Two concurrent sales of the same product cannot oversell: the         │
//! │  guarded UPDATE in step 2 re-checks stock at write time.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Product name and cost are copied onto the sale row, and the customer
//! name onto attributed sales. Later edits or deletions of the product or
//! customer do not rewrite sale history, and profit is always computed
//! against the cost at the time of sale.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::changes::ChangeFeed;
use crate::error::{DbError, DbResult};
use crate::repository::movement::insert_movement;
use stylestock_core::validation::{validate_price_cents, validate_quantity};
use stylestock_core::{
    ChangeEvent, CoreError, EntityKind, MovementKind, NewSale, Product, Sale, StockMovement,
};

/// Errors from stock-guarded write flows.
///
/// Splits business failures (insufficient stock, unknown product) from
/// infrastructure failures so the API layer can map them to different
/// status codes.
#[derive(Debug, Error)]
pub enum SaleError {
    /// Business-rule failure (insufficient stock, unknown product, bad input).
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Persistence failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Route raw sqlx failures through [`DbError`] so `?` works mid-flow.
impl From<sqlx::Error> for SaleError {
    fn from(err: sqlx::Error) -> Self {
        SaleError::Db(err.into())
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    changes: ChangeFeed,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool, changes: ChangeFeed) -> Self {
        SaleRepository { pool, changes }
    }

    /// Lists all sales, newest first.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, product_id, product_name, cost_at_sale_cents,
                   sale_price_cents, quantity, total_cents, payment_method,
                   customer_id, customer_name, created_at
            FROM sales
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, product_id, product_name, cost_at_sale_cents,
                   sale_price_cents, quantity, total_cents, payment_method,
                   customer_id, customer_name, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Records a sale in a single transaction (see module docs).
    ///
    /// ## Arguments
    /// * `new` - Sale input; handlers validate beforehand, but quantity
    ///   and price ranges are re-checked here because the guarded stock
    ///   update and the total/aggregate arithmetic depend on them.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - The recorded sale with snapshots filled in
    /// * `Err(SaleError::Domain)` - Unknown product, insufficient stock,
    ///   out-of-range input
    /// * `Err(SaleError::Db)` - Unknown customer, persistence failure
    pub async fn record_sale(&self, new: &NewSale) -> Result<Sale, SaleError> {
        debug!(product_id = %new.product_id, quantity = %new.quantity, "Recording sale");

        validate_quantity(new.quantity).map_err(CoreError::from)?;
        validate_price_cents(new.sale_price_cents).map_err(CoreError::from)?;

        let now = Utc::now();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        // Step 1: fetch the product and check stock
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, code, name, category, cost_cents, margin_bps,
                   suggested_price_cents, current_stock, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(&new.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(new.product_id.clone()))?;

        if product.current_stock < new.quantity {
            return Err(CoreError::InsufficientStock {
                code: product.code,
                available: product.current_stock,
                requested: new.quantity,
            }
            .into());
        }

        // Step 2: guarded decrement; the WHERE clause re-checks stock at
        // write time so concurrent sales cannot oversell
        let result = sqlx::query(
            r#"
            UPDATE products
            SET current_stock = current_stock - ?2, updated_at = ?3
            WHERE id = ?1 AND current_stock >= ?2
            "#,
        )
        .bind(&new.product_id)
        .bind(new.quantity)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InsufficientStock {
                code: product.code,
                available: product.current_stock,
                requested: new.quantity,
            }
            .into());
        }

        let total_cents = new.sale_price_cents * new.quantity;

        // Step 3: attribute to a customer, snapshotting the name and
        // bumping the purchase aggregates atomically
        let customer_name = match &new.customer_id {
            Some(customer_id) => {
                let name: Option<String> =
                    sqlx::query_scalar("SELECT name FROM customers WHERE id = ?1")
                        .bind(customer_id)
                        .fetch_optional(&mut *tx)
                        .await?;
                let name = name.ok_or_else(|| DbError::not_found("Customer", customer_id))?;

                sqlx::query(
                    r#"
                    UPDATE customers
                    SET total_purchases = total_purchases + 1,
                        total_spent_cents = total_spent_cents + ?2,
                        updated_at = ?3
                    WHERE id = ?1
                    "#,
                )
                .bind(customer_id)
                .bind(total_cents)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                Some(name)
            }
            None => None,
        };

        // Step 4: insert the sale row with snapshots
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            cost_at_sale_cents: product.cost_cents,
            sale_price_cents: new.sale_price_cents,
            quantity: new.quantity,
            total_cents,
            payment_method: new.payment_method,
            customer_id: new.customer_id.clone(),
            customer_name,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, product_id, product_name, cost_at_sale_cents,
                sale_price_cents, quantity, total_cents, payment_method,
                customer_id, customer_name, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.product_id)
        .bind(&sale.product_name)
        .bind(sale.cost_at_sale_cents)
        .bind(sale.sale_price_cents)
        .bind(sale.quantity)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(&sale.customer_id)
        .bind(&sale.customer_name)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        // Step 5: ledger entry for the stock consumed
        let movement = StockMovement {
            id: Uuid::new_v4().to_string(),
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            kind: MovementKind::Sale,
            quantity: -new.quantity,
            previous_stock: product.current_stock,
            new_stock: product.current_stock - new.quantity,
            reason: format!("Sale: {} x {}", new.quantity, product.name),
            created_at: now,
        };
        insert_movement(&mut tx, &movement).await?;

        // Step 6: commit, then publish
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        self.changes
            .publish(ChangeEvent::created(EntityKind::Sale, &sale.id));
        self.changes
            .publish(ChangeEvent::updated(EntityKind::Product, &product.id));
        self.changes
            .publish(ChangeEvent::created(EntityKind::StockMovement, movement.id));
        if let Some(customer_id) = &sale.customer_id {
            self.changes
                .publish(ChangeEvent::updated(EntityKind::Customer, customer_id));
        }

        Ok(sale)
    }

    /// Deletes a sale record.
    ///
    /// ## Important
    /// Record-keeping only: stock is not restored and customer aggregates
    /// are not rolled back.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sale");

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale", id));
        }

        self.changes
            .publish(ChangeEvent::deleted(EntityKind::Sale, id));

        Ok(())
    }

    /// Counts total sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
