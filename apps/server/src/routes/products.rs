//! Product catalog routes.
//!
//! ## Write Paths
//! ```text
//! POST /api/products              register (+ entry movement if stocked)
//! PUT  /api/products/{id}         full-field edit (+ adjustment movement)
//! POST /api/products/{id}/stock   manual delta {delta, reason}
//! DELETE /api/products/{id}       hard delete; ledger and sales survive
//! ```
//!
//! Input validation happens here, before anything touches the database;
//! the repositories re-check only what their invariants depend on (stock
//! never negative, quantities positive).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use stylestock_core::validation::{
    validate_category, validate_code, validate_cost_cents, validate_margin_bps,
    validate_product_name, validate_reason, validate_stock, validate_uuid,
};
use stylestock_core::{NewProduct, Product, UpdateProduct};

use crate::error::ApiError;
use crate::routes::movements::MovementDto;
use crate::routes::AppState;

/// Build the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list).post(create))
        .route("/api/products/{id}", put(update).delete(delete_product))
        .route("/api/products/{id}/stock", post(adjust_stock))
        .route("/api/products/{id}/movements", get(product_movements))
}

// =============================================================================
// DTOs
// =============================================================================

/// Product DTO for clients.
///
/// ## Why DTO?
/// - Decouples internal domain model from API contract
/// - Handles serde rename to camelCase for JS consumption
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub code: String,
    pub name: String,
    pub category: String,
    pub cost_cents: i64,
    pub margin_bps: u32,
    pub suggested_price_cents: i64,
    pub current_stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        ProductDto {
            id: p.id,
            code: p.code,
            name: p.name,
            category: p.category,
            cost_cents: p.cost_cents,
            margin_bps: p.margin_bps,
            suggested_price_cents: p.suggested_price_cents,
            current_stock: p.current_stock,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Registration payload. The suggested price is derived server-side.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub code: String,
    pub name: String,
    pub category: String,
    pub cost_cents: i64,
    pub margin_bps: u32,
    pub initial_stock: i64,
}

/// Full-field edit payload. A changed `currentStock` writes an adjustment
/// ledger movement.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub code: String,
    pub name: String,
    pub category: String,
    pub cost_cents: i64,
    pub margin_bps: u32,
    pub current_stock: i64,
}

/// Manual stock adjustment payload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustStockRequest {
    /// Signed delta; positive restocks, negative removes.
    pub delta: i64,
    pub reason: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Lists the catalog, newest first.
async fn list(State(state): State<AppState>) -> Result<Json<Vec<ProductDto>>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(products.into_iter().map(ProductDto::from).collect()))
}

/// Registers a product.
async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ProductDto>), ApiError> {
    debug!(code = %req.code, "create product");

    validate_code(&req.code)?;
    validate_product_name(&req.name)?;
    validate_category(&req.category)?;
    validate_cost_cents(req.cost_cents)?;
    validate_margin_bps(req.margin_bps)?;
    validate_stock(req.initial_stock)?;

    let new = NewProduct {
        code: req.code.trim().to_string(),
        name: req.name.trim().to_string(),
        category: req.category.trim().to_string(),
        cost_cents: req.cost_cents,
        margin_bps: req.margin_bps,
        initial_stock: req.initial_stock,
    };

    let product = state.db.products().create(&new).await?;
    Ok((StatusCode::CREATED, Json(ProductDto::from(product))))
}

/// Edits every field of a product. The suggested price is re-derived.
async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateProductRequest>,
) -> Result<Json<ProductDto>, ApiError> {
    debug!(id = %id, "update product");

    validate_uuid(&id)?;
    validate_code(&req.code)?;
    validate_product_name(&req.name)?;
    validate_category(&req.category)?;
    validate_cost_cents(req.cost_cents)?;
    validate_margin_bps(req.margin_bps)?;
    validate_stock(req.current_stock)?;

    let update = UpdateProduct {
        code: req.code.trim().to_string(),
        name: req.name.trim().to_string(),
        category: req.category.trim().to_string(),
        cost_cents: req.cost_cents,
        margin_bps: req.margin_bps,
        current_stock: req.current_stock,
    };

    let product = state.db.products().update(&id, &update).await?;
    Ok(Json(ProductDto::from(product)))
}

/// Applies a manual stock delta, writing an entry or exit ledger movement.
async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AdjustStockRequest>,
) -> Result<Json<ProductDto>, ApiError> {
    debug!(id = %id, delta = req.delta, "adjust stock");

    validate_uuid(&id)?;
    validate_reason(&req.reason)?;
    // A zero delta would write a ledger row that moves nothing.
    if req.delta == 0 {
        return Err(ApiError::business_logic("delta must not be zero"));
    }

    let product = state
        .db
        .products()
        .adjust_stock(&id, req.delta, req.reason.trim())
        .await?;
    Ok(Json(ProductDto::from(product)))
}

/// Deletes a product. Sales and ledger rows keep their snapshotted names.
async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(id = %id, "delete product");

    validate_uuid(&id)?;
    state.db.products().delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Lists the ledger rows for one product, newest first.
async fn product_movements(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MovementDto>>, ApiError> {
    validate_uuid(&id)?;
    let movements = state.db.movements().list_for_product(&id).await?;
    Ok(Json(movements.into_iter().map(MovementDto::from).collect()))
}
