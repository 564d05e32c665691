use contracts::dashboards::d402_sales_overview::{
    FilterSelection, SalesFilterOptions, SalesOverviewResponse, SalesRecord,
};
use std::collections::BTreeSet;

use super::{aggregation, filter, kpi, ranking};

pub const EMPTY_SOURCE_MESSAGE: &str = "The loaded file has no rows.";
pub const EMPTY_SELECTION_MESSAGE: &str = "No data for the selected filters.";

/// Run the whole dashboard pipeline for one filter selection.
///
/// `top_n` only truncates the product table; `product_count` keeps the
/// size of the full ranking.
pub fn build_overview(
    records: &[SalesRecord],
    selection: &FilterSelection,
    top_n: usize,
) -> SalesOverviewResponse {
    let filtered = filter::apply(records, selection);

    let kpis = kpi::compute(&filtered);
    let mut top_products = ranking::rank_products(&filtered);
    let product_count = top_products.len();
    top_products.truncate(top_n);

    let message = if records.is_empty() {
        Some(EMPTY_SOURCE_MESSAGE.to_string())
    } else if filtered.is_empty() {
        Some(EMPTY_SELECTION_MESSAGE.to_string())
    } else {
        None
    };

    SalesOverviewResponse {
        kpi_display: kpi::display(&kpis),
        kpis,
        revenue_by_day: aggregation::revenue_by_day(&filtered),
        revenue_by_city: aggregation::revenue_by_city(&filtered),
        revenue_by_channel: aggregation::revenue_by_channel(&filtered),
        revenue_by_month: aggregation::revenue_by_month(&filtered),
        top_products,
        product_count,
        record_count: filtered.len(),
        is_empty: filtered.is_empty(),
        message,
    }
}

/// Values for the filter widgets, sorted, from the unfiltered records
pub fn filter_options(records: &[SalesRecord]) -> SalesFilterOptions {
    let mut cities = BTreeSet::new();
    let mut channels = BTreeSet::new();
    let mut categories = BTreeSet::new();

    for record in records {
        cities.insert(record.city.as_str());
        channels.insert(record.sales_channel.as_str());
        categories.insert(record.product_category.as_str());
    }

    let to_vec =
        |set: BTreeSet<&str>| -> Vec<String> { set.into_iter().map(str::to_string).collect() };

    SalesFilterOptions {
        min_date: records.iter().map(|r| r.order_date).min(),
        max_date: records.iter().map(|r| r.order_date).max(),
        cities: to_vec(cities),
        channels: to_vec(channels),
        categories: to_vec(categories),
    }
}
