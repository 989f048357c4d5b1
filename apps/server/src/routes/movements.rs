//! Stock ledger routes.
//!
//! Movements are written by the product and sale flows, never through the
//! API; this module only reads the ledger and deletes audit rows.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use stylestock_core::validation::validate_uuid;
use stylestock_core::{MovementKind, StockMovement};

use crate::error::ApiError;
use crate::routes::AppState;

/// Build the movement router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/movements", get(list))
        .route("/api/movements/{id}", axum::routing::delete(delete_movement))
}

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovementDto {
    pub id: String,
    pub product_id: String,
    pub product_name: String,
    pub kind: MovementKind,
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl From<StockMovement> for MovementDto {
    fn from(m: StockMovement) -> Self {
        MovementDto {
            id: m.id,
            product_id: m.product_id,
            product_name: m.product_name,
            kind: m.kind,
            quantity: m.quantity,
            previous_stock: m.previous_stock,
            new_stock: m.new_stock,
            reason: m.reason,
            created_at: m.created_at,
        }
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Lists the full ledger, newest first.
async fn list(State(state): State<AppState>) -> Result<Json<Vec<MovementDto>>, ApiError> {
    let movements = state.db.movements().list().await?;
    Ok(Json(movements.into_iter().map(MovementDto::from).collect()))
}

/// Deletes a ledger row. Product stock is untouched; this only removes
/// the audit record.
async fn delete_movement(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(id = %id, "delete movement");

    validate_uuid(&id)?;
    state.db.movements().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
