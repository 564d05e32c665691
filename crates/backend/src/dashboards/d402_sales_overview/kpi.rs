use contracts::dashboards::d402_sales_overview::{KpiDisplay, KpiSnapshot, SalesRecord};
use std::collections::HashSet;

use crate::shared::format::{format_money, format_number};

pub fn compute(records: &[SalesRecord]) -> KpiSnapshot {
    // fold from +0.0: an empty `sum()` of f64 is -0.0
    let total_revenue = records.iter().fold(0.0, |acc, r| acc + r.total_value);
    let order_count = records
        .iter()
        .map(|r| r.order_id.as_str())
        .collect::<HashSet<_>>()
        .len();

    KpiSnapshot {
        total_revenue,
        order_count,
        avg_ticket: avg_ticket(total_revenue, order_count),
    }
}

/// Zero when there are no orders
pub fn avg_ticket(total_revenue: f64, order_count: usize) -> f64 {
    if order_count > 0 {
        total_revenue / order_count as f64
    } else {
        0.0
    }
}

pub fn display(kpis: &KpiSnapshot) -> KpiDisplay {
    KpiDisplay {
        total_revenue: format_money(kpis.total_revenue),
        order_count: format_number(kpis.order_count),
        avg_ticket: format_money(kpis.avg_ticket),
    }
}
