//! # Stock Movement Repository
//!
//! Read and delete operations for the append-only stock ledger.
//!
//! ## Ledger Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Stock Movement Ledger                             │
//! │                                                                         │
//! │  Every stock change writes exactly one row:                            │
//! │                                                                         │
//! │  kind        quantity  previous  new   reason                          │
//! │  ────────────────────────────────────────────────────────              │
//! │  entry       +10       0         10    "Initial stock"                 │
//! │  adjustment  +15       10        25    "Manual stock update"           │
//! │  exit        -2        25        23    "Damaged in storage"            │
//! │  sale        -3        23        20    "Sale: 3 x Linen Shirt"         │
//! │                                                                         │
//! │  Rows are inserted inside the transaction that changed the stock,      │
//! │  so ledger and stock can never disagree.                               │
//! │                                                                         │
//! │  Rows are never updated. An operator may delete one, but deletion      │
//! │  does NOT reverse the stock change it recorded - the ledger is         │
//! │  history, not state.                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::changes::ChangeFeed;
use crate::error::{DbError, DbResult};
use stylestock_core::{ChangeEvent, EntityKind, StockMovement};

/// Repository for stock movement database operations.
///
/// Writes happen elsewhere: movements are inserted by the product and sale
/// repositories via [`insert_movement`], inside their own transactions.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    pool: SqlitePool,
    changes: ChangeFeed,
}

impl MovementRepository {
    /// Creates a new MovementRepository.
    pub fn new(pool: SqlitePool, changes: ChangeFeed) -> Self {
        MovementRepository { pool, changes }
    }

    /// Lists all movements, newest first.
    pub async fn list(&self) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, product_name, kind, quantity,
                   previous_stock, new_stock, reason, created_at
            FROM stock_movements
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Lists the ledger for a single product, newest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT id, product_id, product_name, kind, quantity,
                   previous_stock, new_stock, reason, created_at
            FROM stock_movements
            WHERE product_id = ?1
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(movements)
    }

    /// Deletes a ledger entry.
    ///
    /// ## Important
    /// This removes the history row only. The stock change it recorded
    /// stays applied to the product.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting stock movement");

        let result = sqlx::query("DELETE FROM stock_movements WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("StockMovement", id));
        }

        self.changes
            .publish(ChangeEvent::deleted(EntityKind::StockMovement, id));

        Ok(())
    }

    /// Counts ledger entries (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Inserts a ledger entry on the caller's connection.
///
/// Called by the product and sale repositories from inside their
/// transactions so the movement commits (or rolls back) together with the
/// stock change it describes.
pub(crate) async fn insert_movement(
    conn: &mut SqliteConnection,
    movement: &StockMovement,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO stock_movements (
            id, product_id, product_name, kind, quantity,
            previous_stock, new_stock, reason, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&movement.id)
    .bind(&movement.product_id)
    .bind(&movement.product_name)
    .bind(movement.kind)
    .bind(movement.quantity)
    .bind(movement.previous_stock)
    .bind(movement.new_stock)
    .bind(&movement.reason)
    .bind(movement.created_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use stylestock_core::{MovementKind, NewProduct};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn shirt(code: &str, stock: i64) -> NewProduct {
        NewProduct {
            code: code.to_string(),
            name: format!("Shirt {}", code),
            category: "Shirts".to_string(),
            cost_cents: 3000,
            margin_bps: 6000,
            initial_stock: stock,
        }
    }

    #[tokio::test]
    async fn test_list_for_product_filters_ledger() {
        let db = test_db().await;
        let a = db.products().create(&shirt("SH-001", 10)).await.unwrap();
        let b = db.products().create(&shirt("SH-002", 4)).await.unwrap();

        db.products()
            .adjust_stock(&a.id, -2, "Damaged in storage")
            .await
            .unwrap();

        let for_a = db.movements().list_for_product(&a.id).await.unwrap();
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|m| m.product_id == a.id));

        let for_b = db.movements().list_for_product(&b.id).await.unwrap();
        assert_eq!(for_b.len(), 1);
        assert_eq!(for_b[0].kind, MovementKind::Entry);
        assert_eq!(for_b[0].reason, "Initial stock");
    }

    #[tokio::test]
    async fn test_delete_movement_leaves_stock_untouched() {
        let db = test_db().await;
        let product = db.products().create(&shirt("SH-010", 10)).await.unwrap();

        let movements = db.movements().list_for_product(&product.id).await.unwrap();
        db.movements().delete(&movements[0].id).await.unwrap();

        // History row is gone, stock stays as the ledger recorded it
        let after = db
            .products()
            .get_by_id(&product.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.current_stock, 10);
        assert!(db
            .movements()
            .list_for_product(&product.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_movement_is_not_found() {
        let db = test_db().await;
        let err = db.movements().delete("no-such-id").await.unwrap_err();
        assert!(err.is_not_found());
    }
}
