use contracts::dashboards::d402_sales_overview::{ProductRankingRow, SalesRecord};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

struct ProductAcc<'a> {
    product_name: &'a str,
    orders: HashSet<&'a str>,
    revenue: f64,
}

/// Every product, descending by revenue.
///
/// Equal revenues keep first-appearance order. Truncating to a top N is up
/// to the caller.
pub fn rank_products(records: &[SalesRecord]) -> Vec<ProductRankingRow> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut products: Vec<ProductAcc> = Vec::new();

    for record in records {
        let slot = *slots
            .entry(record.product_name.as_str())
            .or_insert_with(|| {
                products.push(ProductAcc {
                    product_name: record.product_name.as_str(),
                    orders: HashSet::new(),
                    revenue: 0.0,
                });
                products.len() - 1
            });

        let acc = &mut products[slot];
        acc.orders.insert(record.order_id.as_str());
        acc.revenue += record.total_value;
    }

    let mut rows: Vec<ProductRankingRow> = products
        .into_iter()
        .map(|acc| ProductRankingRow {
            product_name: acc.product_name.to_string(),
            order_count: acc.orders.len(),
            revenue: acc.revenue,
        })
        .collect();

    // Stable sort keeps first appearance for ties, 0.0 and -0.0 included
    rows.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(Ordering::Equal)
    });
    rows
}
