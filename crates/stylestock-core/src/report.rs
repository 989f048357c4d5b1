//! # Report Module
//!
//! Pure aggregation over already-fetched sales and products. Everything here
//! is a synchronous reduction with no I/O and no caching - documents are
//! recomputed from scratch on every request.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   repositories (stylestock-db)                                          │
//! │        │                         │                                      │
//! │   Vec<Sale>                 Vec<Product>                                │
//! │        │                         │                                      │
//! │        ▼                         ▼                                      │
//! │   filter_sales_by_date      low_stock_products                          │
//! │        │                         │                                      │
//! │        ▼                         │                                      │
//! │   sales_summary / sales_by_product / top_by_profit                      │
//! │        │                         │                                      │
//! │        └──────────┬──────────────┘                                      │
//! │                   ▼                                                     │
//! │        SalesReport / InventoryReport  ──► JSON document ──► renderer    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The report documents serialize in API shape (camelCase) because they are
//! returned to clients verbatim - there is no separate DTO layer for them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{Product, Sale};

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive calendar-date range.
///
/// Filtering compares date parts only: a sale timestamped anywhere on the
/// start or end date is inside the range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl DateRange {
    /// Creates a range. `start` and `end` may be the same day.
    #[inline]
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// Checks whether a timestamp falls inside the range, inclusive on
    /// both ends.
    #[inline]
    pub fn contains(&self, at: &DateTime<Utc>) -> bool {
        let date = at.date_naive();
        date >= self.start && date <= self.end
    }
}

/// Returns the sales whose creation date falls inside the range.
pub fn filter_sales_by_date(sales: &[Sale], range: &DateRange) -> Vec<Sale> {
    sales
        .iter()
        .filter(|sale| range.contains(&sale.created_at))
        .cloned()
        .collect()
}

// =============================================================================
// Grouping & Ranking
// =============================================================================

/// Per-product performance, grouped by product name.
///
/// Grouping is by the snapshotted name, not the product id, so renamed or
/// deleted products aggregate under the name they were sold as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductPerformance {
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
    pub profit_cents: i64,
}

/// Groups sales by product name with running sums of quantity, revenue,
/// and profit. Sorted by revenue descending (name breaks ties so output
/// is deterministic).
pub fn sales_by_product(sales: &[Sale]) -> Vec<ProductPerformance> {
    let mut by_name: std::collections::HashMap<&str, ProductPerformance> =
        std::collections::HashMap::new();

    for sale in sales {
        let entry = by_name
            .entry(sale.product_name.as_str())
            .or_insert_with(|| ProductPerformance {
                product_name: sale.product_name.clone(),
                quantity_sold: 0,
                revenue_cents: 0,
                profit_cents: 0,
            });
        entry.quantity_sold += sale.quantity;
        entry.revenue_cents += sale.total_cents;
        entry.profit_cents += sale.profit_cents();
    }

    let mut performance: Vec<ProductPerformance> = by_name.into_values().collect();
    performance.sort_by(|a, b| {
        b.revenue_cents
            .cmp(&a.revenue_cents)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    performance
}

/// Returns the top `n` performers ranked by profit descending.
pub fn top_by_profit(performance: &[ProductPerformance], n: usize) -> Vec<ProductPerformance> {
    let mut ranked = performance.to_vec();
    ranked.sort_by(|a, b| {
        b.profit_cents
            .cmp(&a.profit_cents)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranked.truncate(n);
    ranked
}

/// Returns the products at or below the low-stock threshold, lowest
/// stock first.
pub fn low_stock_products(products: &[Product]) -> Vec<Product> {
    let mut low: Vec<Product> = products
        .iter()
        .filter(|product| product.is_low_stock())
        .cloned()
        .collect();
    low.sort_by(|a, b| {
        a.current_stock
            .cmp(&b.current_stock)
            .then_with(|| a.name.cmp(&b.name))
    });
    low
}

// =============================================================================
// KPI Summary
// =============================================================================

/// Headline numbers for a set of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub sale_count: i64,
    pub items_sold: i64,
    pub revenue_cents: i64,
    pub profit_cents: i64,
    /// revenue / sale count, integer division. Zero when there are no sales.
    pub average_ticket_cents: i64,
}

/// Reduces a set of sales to its KPI summary.
pub fn sales_summary(sales: &[Sale]) -> SalesSummary {
    let sale_count = sales.len() as i64;
    let items_sold: i64 = sales.iter().map(|sale| sale.quantity).sum();
    let revenue_cents: i64 = sales.iter().map(|sale| sale.total_cents).sum();
    let profit_cents: i64 = sales.iter().map(|sale| sale.profit_cents()).sum();
    let average_ticket_cents = if sale_count > 0 {
        revenue_cents / sale_count
    } else {
        0
    };

    SalesSummary {
        sale_count,
        items_sold,
        revenue_cents,
        profit_cents,
        average_ticket_cents,
    }
}

// =============================================================================
// Report Documents
// =============================================================================

/// One line of the inventory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRow {
    pub code: String,
    pub name: String,
    pub cost_cents: i64,
    pub margin_bps: u32,
    pub suggested_price_cents: i64,
    pub current_stock: i64,
}

impl From<&Product> for InventoryRow {
    fn from(product: &Product) -> Self {
        InventoryRow {
            code: product.code.clone(),
            name: product.name.clone(),
            cost_cents: product.cost_cents,
            margin_bps: product.margin_bps,
            suggested_price_cents: product.suggested_price_cents,
            current_stock: product.current_stock,
        }
    }
}

/// The printable inventory listing: every product plus catalog totals.
/// Stock is valued at cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryReport {
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    pub rows: Vec<InventoryRow>,
    pub total_products: i64,
    pub total_stock_units: i64,
    pub total_stock_value_cents: i64,
    pub low_stock_count: i64,
}

/// Builds the inventory listing, rows sorted by product code.
///
/// `generated_at` is a parameter so the function stays deterministic;
/// callers pass the current time.
pub fn build_inventory_report(products: &[Product], generated_at: DateTime<Utc>) -> InventoryReport {
    let mut rows: Vec<InventoryRow> = products.iter().map(InventoryRow::from).collect();
    rows.sort_by(|a, b| a.code.cmp(&b.code));

    let total_stock_units: i64 = products.iter().map(|p| p.current_stock).sum();
    let total_stock_value_cents: i64 = products
        .iter()
        .map(|p| p.cost_cents * p.current_stock)
        .sum();
    let low_stock_count = products.iter().filter(|p| p.is_low_stock()).count() as i64;

    InventoryReport {
        generated_at,
        rows,
        total_products: products.len() as i64,
        total_stock_units,
        total_stock_value_cents,
        low_stock_count,
    }
}

/// The printable sales/stock report: KPI summary, per-product performance,
/// and the current low-stock list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    #[ts(as = "String")]
    pub generated_at: DateTime<Utc>,
    /// The date filter applied, when one was.
    pub range: Option<DateRange>,
    pub summary: SalesSummary,
    pub by_product: Vec<ProductPerformance>,
    pub low_stock: Vec<InventoryRow>,
}

/// Builds the sales report, filtering by date when a range is given.
pub fn build_sales_report(
    sales: &[Sale],
    products: &[Product],
    range: Option<DateRange>,
    generated_at: DateTime<Utc>,
) -> SalesReport {
    let filtered;
    let in_range: &[Sale] = match &range {
        Some(r) => {
            filtered = filter_sales_by_date(sales, r);
            &filtered
        }
        None => sales,
    };

    let low_stock = low_stock_products(products)
        .iter()
        .map(InventoryRow::from)
        .collect();

    SalesReport {
        generated_at,
        range,
        summary: sales_summary(in_range),
        by_product: sales_by_product(in_range),
        low_stock,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::TimeZone;

    fn sale_at(name: &str, quantity: i64, price: i64, cost: i64, at: DateTime<Utc>) -> Sale {
        Sale {
            id: uuid::Uuid::new_v4().to_string(),
            product_id: "p1".to_string(),
            product_name: name.to_string(),
            cost_at_sale_cents: cost,
            sale_price_cents: price,
            quantity,
            total_cents: price * quantity,
            payment_method: PaymentMethod::Cash,
            customer_id: None,
            customer_name: None,
            created_at: at,
        }
    }

    fn product_with_stock(code: &str, name: &str, stock: i64, cost: i64) -> Product {
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: name.to_string(),
            category: "Shirts".to_string(),
            cost_cents: cost,
            margin_bps: 5000,
            suggested_price_cents: cost + cost / 2,
            current_stock: stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_date_range_inclusive_at_both_ends() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        );

        // First instant of the start date and last second of the end date
        let on_start = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let on_end = Utc.with_ymd_and_hms(2026, 3, 31, 23, 59, 59).unwrap();
        let before = Utc.with_ymd_and_hms(2026, 2, 28, 23, 59, 59).unwrap();
        let after = Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap();

        assert!(range.contains(&on_start));
        assert!(range.contains(&on_end));
        assert!(!range.contains(&before));
        assert!(!range.contains(&after));
    }

    #[test]
    fn test_filter_sales_by_date() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        );
        let sales = vec![
            sale_at("A", 1, 100, 50, Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()),
            sale_at("B", 1, 100, 50, Utc.with_ymd_and_hms(2026, 3, 2, 18, 30, 0).unwrap()),
            sale_at("C", 1, 100, 50, Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 1).unwrap()),
        ];

        let filtered = filter_sales_by_date(&sales, &range);
        assert_eq!(filtered.len(), 2);
        assert!(filtered.iter().all(|s| s.product_name != "C"));
    }

    #[test]
    fn test_sales_by_product_groups_and_sums() {
        let now = Utc::now();
        let sales = vec![
            sale_at("Slim Jeans", 2, 7500, 5000, now),
            sale_at("Slim Jeans", 1, 7500, 5000, now),
            sale_at("Linen Camisa", 5, 3000, 2000, now),
        ];

        let performance = sales_by_product(&sales);
        assert_eq!(performance.len(), 2);

        // Jeans: revenue 22500, ahead of Camisa's 15000
        assert_eq!(performance[0].product_name, "Slim Jeans");
        assert_eq!(performance[0].quantity_sold, 3);
        assert_eq!(performance[0].revenue_cents, 22500);
        assert_eq!(performance[0].profit_cents, 7500);

        assert_eq!(performance[1].product_name, "Linen Camisa");
        assert_eq!(performance[1].revenue_cents, 15000);
        assert_eq!(performance[1].profit_cents, 5000);
    }

    #[test]
    fn test_top_by_profit_ranks_and_truncates() {
        let performance = vec![
            ProductPerformance {
                product_name: "A".to_string(),
                quantity_sold: 1,
                revenue_cents: 9000,
                profit_cents: 100,
            },
            ProductPerformance {
                product_name: "B".to_string(),
                quantity_sold: 1,
                revenue_cents: 1000,
                profit_cents: 900,
            },
            ProductPerformance {
                product_name: "C".to_string(),
                quantity_sold: 1,
                revenue_cents: 2000,
                profit_cents: 500,
            },
        ];

        let top = top_by_profit(&performance, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_name, "B");
        assert_eq!(top[1].product_name, "C");
    }

    #[test]
    fn test_low_stock_partition_boundary() {
        let products = vec![
            product_with_stock("A-1", "Five", 5, 1000),
            product_with_stock("A-2", "Six", 6, 1000),
            product_with_stock("A-3", "Zero", 0, 1000),
        ];

        let low = low_stock_products(&products);
        assert_eq!(low.len(), 2);
        assert_eq!(low[0].name, "Zero"); // lowest stock first
        assert_eq!(low[1].name, "Five");
    }

    #[test]
    fn test_sales_summary_math() {
        let now = Utc::now();
        let sales = vec![
            sale_at("A", 3, 7500, 5000, now), // total 22500, profit 7500
            sale_at("B", 1, 5000, 4000, now), // total 5000, profit 1000
        ];

        let summary = sales_summary(&sales);
        assert_eq!(summary.sale_count, 2);
        assert_eq!(summary.items_sold, 4);
        assert_eq!(summary.revenue_cents, 27500);
        assert_eq!(summary.profit_cents, 8500);
        assert_eq!(summary.average_ticket_cents, 13750);
    }

    #[test]
    fn test_sales_summary_empty_is_zeroes() {
        let summary = sales_summary(&[]);
        assert_eq!(summary.sale_count, 0);
        assert_eq!(summary.revenue_cents, 0);
        assert_eq!(summary.average_ticket_cents, 0);
    }

    #[test]
    fn test_build_inventory_report_totals() {
        let products = vec![
            product_with_stock("B-1", "Jacket", 4, 10000),
            product_with_stock("A-1", "Socks", 20, 500),
        ];

        let report = build_inventory_report(&products, Utc::now());
        assert_eq!(report.total_products, 2);
        assert_eq!(report.total_stock_units, 24);
        // 4 × 10000 + 20 × 500
        assert_eq!(report.total_stock_value_cents, 50000);
        assert_eq!(report.low_stock_count, 1);

        // Rows sorted by code
        assert_eq!(report.rows[0].code, "A-1");
        assert_eq!(report.rows[1].code, "B-1");
    }

    #[test]
    fn test_build_sales_report_applies_range() {
        let in_march = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let in_april = Utc.with_ymd_and_hms(2026, 4, 15, 12, 0, 0).unwrap();
        let sales = vec![
            sale_at("A", 1, 1000, 500, in_march),
            sale_at("A", 1, 1000, 500, in_april),
        ];
        let products = vec![product_with_stock("A-1", "A", 3, 500)];

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
        );
        let report = build_sales_report(&sales, &products, Some(range), Utc::now());

        assert_eq!(report.summary.sale_count, 1);
        assert_eq!(report.summary.revenue_cents, 1000);
        assert_eq!(report.low_stock.len(), 1);

        // Without a range, everything counts
        let unfiltered = build_sales_report(&sales, &products, None, Utc::now());
        assert_eq!(unfiltered.summary.sale_count, 2);
    }
}
