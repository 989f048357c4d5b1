//! Admin routes.
//!
//! Everything registered here sits behind `require_admin` in addition to
//! the app-wide session check; sellers get 403.

use axum::extract::State;
use axum::routing::get;
use axum::{middleware, Json, Router};
use chrono::Utc;
use serde::Serialize;

use stylestock_core::report::{
    filter_sales_by_date, low_stock_products, sales_by_product, sales_summary, top_by_profit,
    DateRange, InventoryRow, ProductPerformance, SalesSummary,
};

use crate::error::ApiError;
use crate::routes::sales::SaleDto;
use crate::routes::AppState;

/// How many of the newest sales the dashboard shows.
const RECENT_SALES: usize = 10;
/// How many top sellers the dashboard shows.
const TOP_PRODUCTS: usize = 5;

/// Build the admin router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/dashboard", get(dashboard))
        .route_layer(middleware::from_fn(crate::auth::require_admin))
}

/// Everything the admin landing page needs in one response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    /// KPIs over all recorded sales.
    overall: SalesSummary,
    /// KPIs over today's sales (UTC day).
    today: SalesSummary,
    top_products: Vec<ProductPerformance>,
    low_stock: Vec<InventoryRow>,
    recent_sales: Vec<SaleDto>,
    /// Live session tokens; resets to zero on restart.
    active_sessions: usize,
}

async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>, ApiError> {
    let sales = state.db.sales().list().await?;
    let products = state.db.products().list().await?;

    let today = Utc::now().date_naive();
    let today_sales = filter_sales_by_date(&sales, &DateRange::new(today, today));

    let top_products = top_by_profit(&sales_by_product(&sales), TOP_PRODUCTS);
    let low_stock = low_stock_products(&products)
        .iter()
        .map(InventoryRow::from)
        .collect();

    // list() is newest-first, so the head is the recent slice.
    let recent_sales = sales
        .iter()
        .take(RECENT_SALES)
        .cloned()
        .map(SaleDto::from)
        .collect();

    Ok(Json(DashboardResponse {
        overall: sales_summary(&sales),
        today: sales_summary(&today_sales),
        top_products,
        low_stock,
        recent_sales,
        active_sessions: state.sessions.count().await,
    }))
}
