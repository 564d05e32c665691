use chrono::{Datelike, NaiveDate};
use contracts::dashboards::d402_sales_overview::{
    DailyRevenuePoint, GroupRevenuePoint, MonthlyRevenuePoint, SalesRecord,
};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::hash::Hash;

/// Sum `total_value` per key.
///
/// Groups come out in order of first appearance in the input, which is the
/// tie-break every caller relies on when it stable-sorts the result.
pub fn group_and_sum<K, F>(records: &[SalesRecord], key_of: F) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&SalesRecord) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, f64)> = Vec::new();

    for record in records {
        let key = key_of(record);
        match slots.get(&key) {
            Some(&slot) => groups[slot].1 += record.total_value,
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push((key, 0.0 + record.total_value));
            }
        }
    }

    groups
}

/// Revenue per day, ascending by date
pub fn revenue_by_day(records: &[SalesRecord]) -> Vec<DailyRevenuePoint> {
    let mut groups = group_and_sum(records, |r| r.order_date);
    groups.sort_by_key(|(date, _)| *date);
    groups
        .into_iter()
        .map(|(date, revenue)| DailyRevenuePoint { date, revenue })
        .collect()
}

/// Revenue per city, ascending by revenue.
///
/// The horizontal bar chart draws rows bottom-up, so ascending order puts the
/// biggest city on top.
pub fn revenue_by_city(records: &[SalesRecord]) -> Vec<GroupRevenuePoint> {
    let mut groups = group_and_sum(records, |r| r.city.clone());
    // partial_cmp: 0.0 and -0.0 are a tie
    groups.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
    to_points(groups)
}

/// Revenue per sales channel, in first-appearance order
pub fn revenue_by_channel(records: &[SalesRecord]) -> Vec<GroupRevenuePoint> {
    to_points(group_and_sum(records, |r| r.sales_channel.clone()))
}

/// Revenue per calendar month with a running total, ascending by month
pub fn revenue_by_month(records: &[SalesRecord]) -> Vec<MonthlyRevenuePoint> {
    let mut groups = group_and_sum(records, |r| month_start(r.order_date));
    groups.sort_by_key(|(month, _)| *month);

    let mut cumulative = 0.0;
    groups
        .into_iter()
        .map(|(month, revenue)| {
            cumulative += revenue;
            MonthlyRevenuePoint {
                period: month.format("%Y-%m").to_string(),
                revenue,
                cumulative_revenue: cumulative,
            }
        })
        .collect()
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn to_points(groups: Vec<(String, f64)>) -> Vec<GroupRevenuePoint> {
    groups
        .into_iter()
        .map(|(key, revenue)| GroupRevenuePoint { key, revenue })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(date: &str, city: &str, channel: &str, value: f64) -> SalesRecord {
        SalesRecord {
            order_date: d(date),
            order_id: "1".to_string(),
            city: city.to_string(),
            sales_channel: channel.to_string(),
            product_category: "Livros".to_string(),
            product_name: "Romance".to_string(),
            total_value: value,
        }
    }

    #[test]
    fn test_revenue_by_day_sorted_by_date() {
        let records = vec![
            record("2023-02-10", "Recife", "Online", 150.0),
            record("2023-01-15", "Recife", "Online", 100.0),
            record("2023-01-20", "Recife", "Online", 200.0),
            record("2023-01-15", "Natal", "Loja", 25.0),
        ];
        let days = revenue_by_day(&records);

        assert_eq!(
            days,
            vec![
                DailyRevenuePoint { date: d("2023-01-15"), revenue: 125.0 },
                DailyRevenuePoint { date: d("2023-01-20"), revenue: 200.0 },
                DailyRevenuePoint { date: d("2023-02-10"), revenue: 150.0 },
            ]
        );
    }

    #[test]
    fn test_revenue_by_city_ascending() {
        let records = vec![
            record("2023-01-15", "Recife", "Online", 300.0),
            record("2023-01-15", "Natal", "Online", 50.0),
            record("2023-01-15", "Olinda", "Online", 120.0),
            record("2023-01-16", "Natal", "Online", 20.0),
        ];
        let cities = revenue_by_city(&records);

        let keys: Vec<&str> = cities.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["Natal", "Olinda", "Recife"]);
        assert_eq!(cities[0].revenue, 70.0);
        for pair in cities.windows(2) {
            assert!(pair[0].revenue <= pair[1].revenue);
        }
    }

    #[test]
    fn test_ties_keep_first_appearance() {
        let records = vec![
            record("2023-01-15", "Recife", "Online", 100.0),
            record("2023-01-15", "Natal", "Loja", 100.0),
            record("2023-01-15", "Olinda", "Telefone", 100.0),
            record("2023-01-15", "Caruaru", "Online", 10.0),
        ];

        let cities: Vec<String> = revenue_by_city(&records).into_iter().map(|p| p.key).collect();
        assert_eq!(cities, vec!["Caruaru", "Recife", "Natal", "Olinda"]);

        let channels: Vec<String> = revenue_by_channel(&records)
            .into_iter()
            .map(|p| p.key)
            .collect();
        assert_eq!(channels, vec!["Online", "Loja", "Telefone"]);
    }

    #[test]
    fn test_signed_zero_is_a_tie() {
        let records = vec![
            record("2023-01-15", "Recife", "Online", 0.0),
            record("2023-01-15", "Natal", "Online", -0.0),
            record("2023-01-15", "Olinda", "Online", 5.0),
        ];
        let cities = revenue_by_city(&records);

        let keys: Vec<&str> = cities.iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["Recife", "Natal", "Olinda"]);
        assert!(cities[1].revenue.is_sign_positive());
    }

    #[test]
    fn test_revenue_by_channel_sums() {
        let records = vec![
            record("2023-01-15", "Recife", "Online", 100.0),
            record("2023-01-15", "Recife", "Loja", 40.0),
            record("2023-01-16", "Natal", "Online", 60.0),
        ];
        let channels = revenue_by_channel(&records);
        assert_eq!(
            channels,
            vec![
                GroupRevenuePoint { key: "Online".to_string(), revenue: 160.0 },
                GroupRevenuePoint { key: "Loja".to_string(), revenue: 40.0 },
            ]
        );
    }

    #[test]
    fn test_revenue_by_month_cumulative() {
        let records = vec![
            record("2023-01-15", "Recife", "Online", 100.0),
            record("2023-01-20", "Recife", "Online", 200.0),
            record("2023-02-10", "Recife", "Online", 150.0),
            record("2023-02-25", "Recife", "Online", 250.0),
            record("2023-03-05", "Recife", "Online", 300.0),
        ];
        let months = revenue_by_month(&records);

        let periods: Vec<&str> = months.iter().map(|m| m.period.as_str()).collect();
        assert_eq!(periods, vec!["2023-01", "2023-02", "2023-03"]);
        let revenue: Vec<f64> = months.iter().map(|m| m.revenue).collect();
        assert_eq!(revenue, vec![300.0, 400.0, 300.0]);
        let cumulative: Vec<f64> = months.iter().map(|m| m.cumulative_revenue).collect();
        assert_eq!(cumulative, vec![300.0, 700.0, 1000.0]);
    }

    #[test]
    fn test_empty_input() {
        assert!(revenue_by_day(&[]).is_empty());
        assert!(revenue_by_city(&[]).is_empty());
        assert!(revenue_by_channel(&[]).is_empty());
        assert!(revenue_by_month(&[]).is_empty());
    }
}
