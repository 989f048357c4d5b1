//! Report routes.
//!
//! Reports are assembled in `stylestock_core::report` from plain entity
//! slices; these handlers fetch the slices, pass the clock, and return
//! the documents as-is (they already serialize in wire shape).

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

use stylestock_core::report::{
    build_inventory_report, build_sales_report, DateRange, InventoryReport, SalesReport,
};

use crate::error::ApiError;
use crate::routes::AppState;

/// Build the report router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/reports/inventory", get(inventory))
        .route("/api/reports/sales", get(sales))
}

/// Optional date filter for the sales report. Dates are inclusive,
/// `YYYY-MM-DD`, interpreted in UTC.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SalesReportQuery {
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
}

impl SalesReportQuery {
    /// Resolves the query into a range, rejecting half-open filters.
    fn range(&self) -> Result<Option<DateRange>, ApiError> {
        match (self.start_date, self.end_date) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => {
                if start > end {
                    return Err(ApiError::validation("startDate must not be after endDate"));
                }
                Ok(Some(DateRange::new(start, end)))
            }
            _ => Err(ApiError::validation(
                "startDate and endDate must be provided together",
            )),
        }
    }
}

/// Full inventory listing with catalog totals, stock valued at cost.
async fn inventory(State(state): State<AppState>) -> Result<Json<InventoryReport>, ApiError> {
    let products = state.db.products().list().await?;
    Ok(Json(build_inventory_report(&products, Utc::now())))
}

/// Sales report, optionally filtered to an inclusive date range.
async fn sales(
    State(state): State<AppState>,
    Query(query): Query<SalesReportQuery>,
) -> Result<Json<SalesReport>, ApiError> {
    let range = query.range()?;
    let sales = state.db.sales().list().await?;
    let products = state.db.products().list().await?;
    Ok(Json(build_sales_report(&sales, &products, range, Utc::now())))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_no_filter_resolves_to_none() {
        let q = SalesReportQuery {
            start_date: None,
            end_date: None,
        };
        assert!(q.range().unwrap().is_none());
    }

    #[test]
    fn test_half_open_filter_rejected() {
        let q = SalesReportQuery {
            start_date: Some(date("2024-03-01")),
            end_date: None,
        };
        assert!(q.range().is_err());

        let q = SalesReportQuery {
            start_date: None,
            end_date: Some(date("2024-03-31")),
        };
        assert!(q.range().is_err());
    }

    #[test]
    fn test_inverted_filter_rejected() {
        let q = SalesReportQuery {
            start_date: Some(date("2024-03-31")),
            end_date: Some(date("2024-03-01")),
        };
        assert!(q.range().is_err());
    }

    #[test]
    fn test_single_day_filter_allowed() {
        let q = SalesReportQuery {
            start_date: Some(date("2024-03-15")),
            end_date: Some(date("2024-03-15")),
        };
        assert!(q.range().unwrap().is_some());
    }
}
