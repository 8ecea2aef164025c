use std::collections::{BTreeMap, BTreeSet};

use super::model::SalesTable;

// ---------------------------------------------------------------------------
// KPI aggregation
// ---------------------------------------------------------------------------

/// Scalar summary metrics over the filtered rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KpiSet {
    pub total_sales: f64,
    pub total_boxes: u64,
    pub transactions: usize,
    /// Mean sale value; defined as 0 when there are no transactions.
    pub average_sale: f64,
    pub unique_countries: usize,
    pub unique_products: usize,
    pub active_sales_persons: usize,
}

impl KpiSet {
    /// Compute all KPIs in a single pass over the visible rows.
    pub fn compute(table: &SalesTable, indices: &[usize]) -> KpiSet {
        let mut total_sales = 0.0;
        let mut total_boxes: u64 = 0;
        let mut countries: BTreeSet<&str> = BTreeSet::new();
        let mut products: BTreeSet<&str> = BTreeSet::new();
        let mut persons: BTreeSet<&str> = BTreeSet::new();

        for &i in indices {
            let rec = &table.records[i];
            total_sales += rec.amount;
            total_boxes += u64::from(rec.boxes);
            countries.insert(&rec.country);
            products.insert(&rec.product);
            persons.insert(&rec.sales_person);
        }

        let transactions = indices.len();
        let average_sale = if transactions == 0 {
            0.0
        } else {
            total_sales / transactions as f64
        };

        KpiSet {
            total_sales,
            total_boxes,
            transactions,
            average_sale,
            unique_countries: countries.len(),
            unique_products: products.len(),
            active_sales_persons: persons.len(),
        }
    }
}

// ---------------------------------------------------------------------------
// Grouped aggregation
// ---------------------------------------------------------------------------

/// One point of the monthly sales trend.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthTotal {
    pub year: i32,
    pub month: u32,
    pub total: f64,
}

/// Sales total per (year, month), in chronological order.
pub fn monthly_trend(table: &SalesTable, indices: &[usize]) -> Vec<MonthTotal> {
    let mut totals: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for &i in indices {
        let rec = &table.records[i];
        *totals.entry((rec.year, rec.month)).or_default() += rec.amount;
    }
    // BTreeMap iteration is already ascending by (year, month).
    totals
        .into_iter()
        .map(|((year, month), total)| MonthTotal { year, month, total })
        .collect()
}

/// Sales total per country, descending by total, ties by country name.
pub fn sales_by_country(table: &SalesTable, indices: &[usize]) -> Vec<(String, f64)> {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for &i in indices {
        let rec = &table.records[i];
        *totals.entry(&rec.country).or_default() += rec.amount;
    }
    let mut ranked: Vec<(String, f64)> = totals
        .into_iter()
        .map(|(country, total)| (country.to_string(), total))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Amount and boxes totals for one sales person – two parallel series
/// sharing the same key ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonPerformance {
    pub name: String,
    pub amount: f64,
    pub boxes: u64,
}

/// Per-person totals, descending by sales amount, ties by name.
pub fn sales_person_performance(table: &SalesTable, indices: &[usize]) -> Vec<PersonPerformance> {
    let mut totals: BTreeMap<&str, (f64, u64)> = BTreeMap::new();
    for &i in indices {
        let rec = &table.records[i];
        let entry = totals.entry(&rec.sales_person).or_default();
        entry.0 += rec.amount;
        entry.1 += u64::from(rec.boxes);
    }
    let mut ranked: Vec<PersonPerformance> = totals
        .into_iter()
        .map(|(name, (amount, boxes))| PersonPerformance {
            name: name.to_string(),
            amount,
            boxes,
        })
        .collect();
    ranked.sort_by(|a, b| b.amount.total_cmp(&a.amount).then_with(|| a.name.cmp(&b.name)));
    ranked
}

/// The top products of one country by sales amount.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryTopProducts {
    pub country: String,
    /// At most N (product, total) pairs, descending by total, ties by name.
    pub products: Vec<(String, f64)>,
}

/// Per-country top-N products by sales amount. Countries are ordered by
/// their overall total, descending, for ranking display.
pub fn top_products_by_country(
    table: &SalesTable,
    indices: &[usize],
    n: usize,
) -> Vec<CountryTopProducts> {
    let mut by_country: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for &i in indices {
        let rec = &table.records[i];
        *by_country
            .entry(&rec.country)
            .or_default()
            .entry(&rec.product)
            .or_default() += rec.amount;
    }

    let mut out: Vec<(f64, CountryTopProducts)> = by_country
        .into_iter()
        .map(|(country, product_totals)| {
            let country_total: f64 = product_totals.values().sum();
            let mut products: Vec<(String, f64)> = product_totals
                .into_iter()
                .map(|(p, t)| (p.to_string(), t))
                .collect();
            products.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            products.truncate(n);
            (
                country_total,
                CountryTopProducts {
                    country: country.to_string(),
                    products,
                },
            )
        })
        .collect();

    out.sort_by(|a, b| {
        b.0.total_cmp(&a.0)
            .then_with(|| a.1.country.cmp(&b.1.country))
    });
    out.into_iter().map(|(_, ctp)| ctp).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filtered_indices, FilterSelection};
    use crate::data::model::SalesRecord;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(
        d: NaiveDate,
        country: &str,
        product: &str,
        person: &str,
        amount: f64,
        boxes: u32,
    ) -> SalesRecord {
        SalesRecord::new(
            d,
            country.into(),
            "Skincare".into(),
            product.into(),
            person.into(),
            amount,
            boxes,
        )
    }

    fn sample_table() -> SalesTable {
        SalesTable::from_records(vec![
            rec(date(2021, 1, 15), "USA", "Cream", "Alice", 100.0, 10),
            rec(date(2021, 2, 10), "USA", "Cream", "Alice", 50.0, 5),
            rec(date(2021, 1, 20), "India", "Lotion", "Bob", 20.0, 2),
        ])
    }

    fn all_indices(table: &SalesTable) -> Vec<usize> {
        (0..table.len()).collect()
    }

    #[test]
    fn kpis_over_filtered_usa_rows() {
        let table = sample_table();
        let mut sel = FilterSelection::default();
        sel.countries.insert("USA".into());
        let indices = filtered_indices(&table, &sel);

        let kpis = KpiSet::compute(&table, &indices);
        assert_eq!(indices.len(), 2);
        assert_eq!(kpis.total_sales, 150.0);
        assert_eq!(kpis.total_boxes, 15);
        assert_eq!(kpis.transactions, 2);
        assert_eq!(kpis.average_sale, 75.0);
        assert_eq!(kpis.unique_countries, 1);
        assert_eq!(kpis.unique_products, 1);
        assert_eq!(kpis.active_sales_persons, 1);
    }

    #[test]
    fn empty_table_yields_zero_kpis_without_division_fault() {
        let table = sample_table();
        let kpis = KpiSet::compute(&table, &[]);
        assert_eq!(kpis.total_sales, 0.0);
        assert_eq!(kpis.average_sale, 0.0);
        assert_eq!(kpis.transactions, 0);
        assert_eq!(kpis.unique_countries, 0);
    }

    #[test]
    fn monthly_trend_is_chronological() {
        let table = sample_table();
        let mut sel = FilterSelection::default();
        sel.countries.insert("USA".into());
        let indices = filtered_indices(&table, &sel);

        let trend = monthly_trend(&table, &indices);
        assert_eq!(
            trend,
            vec![
                MonthTotal { year: 2021, month: 1, total: 100.0 },
                MonthTotal { year: 2021, month: 2, total: 50.0 },
            ]
        );
    }

    #[test]
    fn monthly_trend_orders_across_year_boundaries() {
        let table = SalesTable::from_records(vec![
            rec(date(2022, 1, 5), "USA", "Cream", "Alice", 30.0, 3),
            rec(date(2021, 12, 5), "USA", "Cream", "Alice", 70.0, 7),
        ]);
        let trend = monthly_trend(&table, &all_indices(&table));
        assert_eq!((trend[0].year, trend[0].month), (2021, 12));
        assert_eq!((trend[1].year, trend[1].month), (2022, 1));
    }

    #[test]
    fn country_totals_cross_check_against_kpi_total() {
        let table = sample_table();
        let indices = all_indices(&table);
        let kpis = KpiSet::compute(&table, &indices);
        let by_country = sales_by_country(&table, &indices);

        let grouped_total: f64 = by_country.iter().map(|(_, t)| t).sum();
        assert!((grouped_total - kpis.total_sales).abs() < 1e-9);
        // Descending by total: USA (150) before India (20).
        assert_eq!(by_country[0].0, "USA");
        assert_eq!(by_country[1].0, "India");
    }

    #[test]
    fn person_performance_orders_by_amount_with_name_tiebreak() {
        let table = SalesTable::from_records(vec![
            rec(date(2021, 1, 1), "USA", "Cream", "Carol", 40.0, 4),
            rec(date(2021, 1, 2), "USA", "Cream", "Alice", 40.0, 1),
            rec(date(2021, 1, 3), "USA", "Cream", "Bob", 90.0, 9),
        ]);
        let perf = sales_person_performance(&table, &all_indices(&table));
        let names: Vec<&str> = perf.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Alice", "Carol"]);
        assert_eq!(perf[0].amount, 90.0);
        assert_eq!(perf[0].boxes, 9);
    }

    #[test]
    fn top_products_respects_n_ordering_and_subset() {
        let table = SalesTable::from_records(vec![
            rec(date(2021, 1, 1), "USA", "Cream", "Alice", 50.0, 5),
            rec(date(2021, 1, 2), "USA", "Lotion", "Alice", 80.0, 8),
            rec(date(2021, 1, 3), "USA", "Serum", "Alice", 80.0, 8),
            rec(date(2021, 1, 4), "USA", "Balm", "Alice", 10.0, 1),
            rec(date(2021, 1, 5), "India", "Lotion", "Bob", 20.0, 2),
        ]);
        let indices = all_indices(&table);
        let top = top_products_by_country(&table, &indices, 3);

        // Countries ranked by their total: USA (220) before India (20).
        assert_eq!(top[0].country, "USA");
        assert_eq!(top[1].country, "India");

        let usa = &top[0].products;
        assert_eq!(usa.len(), 3);
        // Ties (Lotion/Serum at 80) broken by product name ascending.
        assert_eq!(usa[0].0, "Lotion");
        assert_eq!(usa[1].0, "Serum");
        assert_eq!(usa[2].0, "Cream");
        for pair in usa.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }

        // India has fewer products than N.
        assert_eq!(top[1].products, vec![("Lotion".to_string(), 20.0)]);
    }

    #[test]
    fn empty_indices_yield_empty_groupings() {
        let table = sample_table();
        assert!(monthly_trend(&table, &[]).is_empty());
        assert!(sales_by_country(&table, &[]).is_empty());
        assert!(sales_person_performance(&table, &[]).is_empty());
        assert!(top_products_by_country(&table, &[], 3).is_empty());
    }
}
