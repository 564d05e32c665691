use contracts::dashboards::d402_sales_overview::{DateRange, FilterSelection, SalesRecord};
use std::collections::BTreeSet;

use super::loader::RecordSet;

/// Records passing every active predicate of the selection.
///
/// The input is left untouched; an empty result is a valid outcome.
pub fn apply(records: &[SalesRecord], selection: &FilterSelection) -> RecordSet {
    if selection.is_unrestricted() {
        return records.to_vec();
    }

    let filtered: RecordSet = records
        .iter()
        .filter(|record| matches(record, selection))
        .cloned()
        .collect();

    tracing::debug!(
        "Sales filter kept {} of {} records",
        filtered.len(),
        records.len()
    );
    filtered
}

pub fn matches(record: &SalesRecord, selection: &FilterSelection) -> bool {
    matches_date(selection.date_range.as_ref(), record)
        && matches_member(&selection.cities, &record.city)
        && matches_member(&selection.channels, &record.sales_channel)
        && matches_member(&selection.categories, &record.product_category)
}

fn matches_date(range: Option<&DateRange>, record: &SalesRecord) -> bool {
    range.map_or(true, |r| r.contains(record.order_date))
}

/// Exact, case-sensitive membership; an empty set accepts everything
fn matches_member(allowed: &BTreeSet<String>, value: &str) -> bool {
    allowed.is_empty() || allowed.contains(value)
}
