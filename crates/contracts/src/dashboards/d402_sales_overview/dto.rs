use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One sale-order line item.
///
/// Several line items may share the same `order_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub order_date: NaiveDate,
    pub order_id: String,
    pub city: String,
    pub sales_channel: String,
    pub product_category: String,
    pub product_name: String,
    pub total_value: f64,
}

/// Scalar KPIs of a filtered record set
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiSnapshot {
    pub total_revenue: f64,
    /// Distinct order ids
    pub order_count: usize,
    /// `total_revenue / order_count`, 0 when there are no orders
    pub avg_ticket: f64,
}

/// KPI values formatted for the metric cards (e.g. "R$ 1.234,56")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiDisplay {
    pub total_revenue: String,
    pub order_count: String,
    pub avg_ticket: String,
}

/// Revenue of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenuePoint {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// Revenue of one group (city or sales channel)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRevenuePoint {
    pub key: String,
    pub revenue: f64,
}

/// Revenue of one calendar month with the running total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenuePoint {
    /// Period in format "YYYY-MM"
    pub period: String,
    pub revenue: f64,
    pub cumulative_revenue: f64,
}

/// Row of the product ranking table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRankingRow {
    pub product_name: String,
    /// Distinct order ids containing the product
    pub order_count: usize,
    pub revenue: f64,
}

/// Response of POST /api/d402/overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesOverviewResponse {
    pub kpis: KpiSnapshot,
    pub kpi_display: KpiDisplay,
    /// Ascending by date
    pub revenue_by_day: Vec<DailyRevenuePoint>,
    /// Ascending by revenue so a horizontal bar chart draws the largest bar on top
    pub revenue_by_city: Vec<GroupRevenuePoint>,
    /// First-appearance order, rendered as shares
    pub revenue_by_channel: Vec<GroupRevenuePoint>,
    /// Ascending by period
    pub revenue_by_month: Vec<MonthlyRevenuePoint>,
    /// Descending by revenue, truncated to the requested top N
    pub top_products: Vec<ProductRankingRow>,
    /// Number of products before truncation
    pub product_count: usize,
    /// Number of records that passed the filters
    pub record_count: usize,
    pub is_empty: bool,
    /// Informational message for an empty selection
    pub message: Option<String>,
}

/// Values offered by the filter widgets, taken from the unfiltered data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesFilterOptions {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub cities: Vec<String>,
    pub channels: Vec<String>,
    pub categories: Vec<String>,
}

/// Response of POST /api/d402/upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesUploadResponse {
    pub source_name: String,
    /// SHA-256 of the uploaded bytes
    pub source_key: String,
    pub row_count: usize,
}
