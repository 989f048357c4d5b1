//! # Customer Repository
//!
//! Database operations for the customer register.
//!
//! The purchase aggregates (`total_purchases`, `total_spent_cents`) are
//! owned by the sale flow: [`record_sale`](crate::SaleRepository::record_sale)
//! increments them inside its transaction. This repository never touches
//! them - customer edits change contact details only.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::changes::ChangeFeed;
use crate::error::{DbError, DbResult};
use stylestock_core::{ChangeEvent, Customer, EntityKind, NewCustomer, UpdateCustomer};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    changes: ChangeFeed,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool, changes: ChangeFeed) -> Self {
        CustomerRepository { pool, changes }
    }

    /// Lists all customers, alphabetical and case-insensitive.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, total_purchases, total_spent_cents,
                   created_at, updated_at
            FROM customers
            ORDER BY name COLLATE NOCASE
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, name, phone, email, total_purchases, total_spent_cents,
                   created_at, updated_at
            FROM customers
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Registers a new customer with zeroed purchase aggregates.
    pub async fn create(&self, new: &NewCustomer) -> DbResult<Customer> {
        debug!(name = %new.name, "Creating customer");

        let now = Utc::now();
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            name: new.name.clone(),
            phone: new.phone.clone(),
            email: new.email.clone(),
            total_purchases: 0,
            total_spent_cents: 0,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, name, phone, email, total_purchases, total_spent_cents,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(customer.total_purchases)
        .bind(customer.total_spent_cents)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        self.changes
            .publish(ChangeEvent::created(EntityKind::Customer, &customer.id));

        Ok(customer)
    }

    /// Updates a customer's contact details.
    ///
    /// Purchase aggregates are left as they are.
    pub async fn update(&self, id: &str, update: &UpdateCustomer) -> DbResult<Customer> {
        debug!(id = %id, "Updating customer");

        let existing = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Customer", id))?;

        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE customers
            SET name = ?2, phone = ?3, email = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(&update.email)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.changes
            .publish(ChangeEvent::updated(EntityKind::Customer, id));

        Ok(Customer {
            name: update.name.clone(),
            phone: update.phone.clone(),
            email: update.email.clone(),
            updated_at: now,
            ..existing
        })
    }

    /// Deletes a customer.
    ///
    /// Sales attributed to the customer keep their snapshotted name.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.changes
            .publish(ChangeEvent::deleted(EntityKind::Customer, id));

        Ok(())
    }

    /// Counts total customers (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
