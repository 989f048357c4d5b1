//! Customer registry routes.
//!
//! Purchase aggregates (`totalPurchases`, `totalSpentCents`) are owned by
//! the sale flow and are read-only here; the edit payload carries contact
//! fields only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use stylestock_core::validation::{validate_customer_name, validate_email, validate_uuid};
use stylestock_core::{Customer, NewCustomer, UpdateCustomer};

use crate::error::ApiError;
use crate::routes::AppState;

/// Build the customer router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/customers", get(list).post(create))
        .route("/api/customers/{id}", put(update).delete(delete_customer))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub total_purchases: i64,
    pub total_spent_cents: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerDto {
    fn from(c: Customer) -> Self {
        CustomerDto {
            id: c.id,
            name: c.name,
            phone: c.phone,
            email: c.email,
            total_purchases: c.total_purchases,
            total_spent_cents: c.total_spent_cents,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Contact payload shared by create and update.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl CustomerRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_customer_name(&self.name)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Trims contact fields, dropping ones left blank.
    fn normalized(&self) -> (String, Option<String>, Option<String>) {
        let clean = |v: &Option<String>| {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        (self.name.trim().to_string(), clean(&self.phone), clean(&self.email))
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Lists customers, newest first.
async fn list(State(state): State<AppState>) -> Result<Json<Vec<CustomerDto>>, ApiError> {
    let customers = state.db.customers().list().await?;
    Ok(Json(customers.into_iter().map(CustomerDto::from).collect()))
}

/// Registers a customer.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerDto>), ApiError> {
    debug!(name = %req.name, "create customer");

    req.validate()?;
    let (name, phone, email) = req.normalized();
    let new = NewCustomer { name, phone, email };

    let customer = state.db.customers().create(&new).await?;
    Ok((StatusCode::CREATED, Json(CustomerDto::from(customer))))
}

/// Edits a customer's contact fields.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<CustomerRequest>,
) -> Result<Json<CustomerDto>, ApiError> {
    debug!(id = %id, "update customer");

    validate_uuid(&id)?;
    req.validate()?;
    let (name, phone, email) = req.normalized();
    let update = UpdateCustomer { name, phone, email };

    let customer = state.db.customers().update(&id, &update).await?;
    Ok(Json(CustomerDto::from(customer)))
}

/// Deletes a customer. Past sales keep their frozen customer name.
async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(id = %id, "delete customer");

    validate_uuid(&id)?;
    state.db.customers().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
