//! Sale recording routes.
//!
//! Recording a sale is the one multi-table write in the system: the sale
//! row, the stock decrement, the ledger movement and the customer
//! aggregates all commit in a single transaction inside
//! `SaleRepository::record_sale`. This module only validates the payload
//! and shapes the response.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use stylestock_core::validation::{validate_price_cents, validate_quantity, validate_uuid};
use stylestock_core::{NewSale, PaymentMethod, Sale};

use crate::error::ApiError;
use crate::routes::AppState;

/// Build the sale router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/sales", get(list).post(create))
        .route("/api/sales/{id}", axum::routing::delete(delete_sale))
}

// =============================================================================
// DTOs
// =============================================================================

/// Sale DTO for clients. Carries the derived profit so list views do not
/// have to recompute it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDto {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub cost_at_sale_cents: i64,
    pub sale_price_cents: i64,
    pub quantity: i64,
    pub total_cents: i64,
    pub profit_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
    pub customer_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Sale> for SaleDto {
    fn from(s: Sale) -> Self {
        let profit_cents = s.profit_cents();
        SaleDto {
            id: s.id,
            product_id: s.product_id,
            product_name: s.product_name,
            cost_at_sale_cents: s.cost_at_sale_cents,
            sale_price_cents: s.sale_price_cents,
            quantity: s.quantity,
            total_cents: s.total_cents,
            profit_cents,
            payment_method: s.payment_method,
            customer_id: s.customer_id,
            customer_name: s.customer_name,
            created_at: s.created_at,
        }
    }
}

/// Sale registration payload. Names and the frozen cost are snapshotted
/// by the repository, never supplied by the client.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub product_id: String,
    pub quantity: i64,
    pub sale_price_cents: i64,
    pub payment_method: PaymentMethod,
    pub customer_id: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Lists recorded sales, newest first.
async fn list(State(state): State<AppState>) -> Result<Json<Vec<SaleDto>>, ApiError> {
    let sales = state.db.sales().list().await?;
    Ok(Json(sales.into_iter().map(SaleDto::from).collect()))
}

/// Records a sale.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<SaleDto>), ApiError> {
    debug!(product_id = %req.product_id, quantity = req.quantity, "record sale");

    validate_uuid(&req.product_id)?;
    validate_quantity(req.quantity)?;
    validate_price_cents(req.sale_price_cents)?;
    if let Some(customer_id) = &req.customer_id {
        validate_uuid(customer_id)?;
    }

    let new = NewSale {
        product_id: req.product_id,
        quantity: req.quantity,
        sale_price_cents: req.sale_price_cents,
        payment_method: req.payment_method,
        customer_id: req.customer_id,
    };

    let sale = state.db.sales().record_sale(&new).await?;
    Ok((StatusCode::CREATED, Json(SaleDto::from(sale))))
}

/// Deletes a sale record. Stock is not restored; use a manual adjustment
/// if the goods actually came back.
async fn delete_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(id = %id, "delete sale");

    validate_uuid(&id)?;
    state.db.sales().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
