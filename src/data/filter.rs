use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{Dimension, SalesRecord, SalesTable};

// ---------------------------------------------------------------------------
// FilterSelection – the active user-chosen constraints
// ---------------------------------------------------------------------------

/// The user's current filter choices.
///
/// An empty set on a dimension means "no restriction" on that dimension, not
/// "match nothing". This keeps an untouched dashboard showing every row, and
/// lets the side panel's "None" button act as a reset for that dimension.
/// The date range is inclusive on both ends.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSelection {
    pub countries: BTreeSet<String>,
    pub products: BTreeSet<String>,
    pub sales_persons: BTreeSet<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for FilterSelection {
    fn default() -> Self {
        FilterSelection {
            countries: BTreeSet::new(),
            products: BTreeSet::new(),
            sales_persons: BTreeSet::new(),
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }
}

/// Empty set = unrestricted, otherwise membership test.
fn passes(selected: &BTreeSet<String>, value: &str) -> bool {
    selected.is_empty() || selected.contains(value)
}

impl FilterSelection {
    /// A selection covering the whole table: every value of every dimension
    /// selected, date range spanning the table. Used when a file is loaded.
    pub fn all(table: &SalesTable) -> Self {
        FilterSelection {
            countries: table.countries.clone(),
            products: table.products.clone(),
            sales_persons: table.sales_persons.clone(),
            start: table.date_min,
            end: table.date_max,
        }
    }

    /// The mutable selected-value set for a dimension.
    pub fn selection_mut(&mut self, dim: Dimension) -> &mut BTreeSet<String> {
        match dim {
            Dimension::Country => &mut self.countries,
            Dimension::Product => &mut self.products,
            Dimension::SalesPerson => &mut self.sales_persons,
        }
    }

    /// The selected-value set for a dimension.
    pub fn selection(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::Country => &self.countries,
            Dimension::Product => &self.products,
            Dimension::SalesPerson => &self.sales_persons,
        }
    }

    /// Whether a record satisfies all four predicate dimensions.
    pub fn matches(&self, rec: &SalesRecord) -> bool {
        passes(&self.countries, &rec.country)
            && passes(&self.products, &rec.product)
            && passes(&self.sales_persons, &rec.sales_person)
            && rec.date >= self.start
            && rec.date <= self.end
    }
}

/// Return indices of records that pass all active filters, preserving the
/// original row order. An empty result is valid output, not an error.
pub fn filtered_indices(table: &SalesTable, selection: &FilterSelection) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| selection.matches(rec))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::SalesRecord;

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

    /// The worked example table: two USA/Cream/Alice rows, one India/Lotion/Bob.
    fn sample_table() -> SalesTable {
        SalesTable::from_records(vec![
            rec(date(2021, 1, 15), "USA", "Cream", "Alice", 100.0, 10),
            rec(date(2021, 2, 10), "USA", "Cream", "Alice", 50.0, 5),
            rec(date(2021, 1, 20), "India", "Lotion", "Bob", 20.0, 2),
        ])
    }

    #[test]
    fn untouched_selection_keeps_every_row() {
        let table = sample_table();
        let sel = FilterSelection::default();
        assert_eq!(filtered_indices(&table, &sel), vec![0, 1, 2]);
    }

    #[test]
    fn country_filter_keeps_matching_rows_in_order() {
        let table = sample_table();
        let mut sel = FilterSelection::default();
        sel.countries.insert("USA".into());
        assert_eq!(filtered_indices(&table, &sel), vec![0, 1]);
    }

    #[test]
    fn empty_dimension_means_no_restriction() {
        let table = sample_table();
        let mut sel = FilterSelection::all(&table);
        sel.countries.clear();
        assert_eq!(filtered_indices(&table, &sel).len(), table.len());
    }

    #[test]
    fn retained_rows_satisfy_every_predicate() {
        let table = sample_table();
        let mut sel = FilterSelection::all(&table);
        sel.products.clear();
        sel.products.insert("Cream".into());
        sel.start = date(2021, 1, 1);
        sel.end = date(2021, 1, 31);

        let indices = filtered_indices(&table, &sel);
        assert!(indices.len() <= table.len());
        for &i in &indices {
            assert!(sel.matches(&table.records[i]));
        }
        assert_eq!(indices, vec![0]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let table = sample_table();
        let mut sel = FilterSelection::default();
        sel.sales_persons.insert("Bob".into());
        let first = filtered_indices(&table, &sel);
        let second = filtered_indices(&table, &sel);
        assert_eq!(first, second);
    }

    #[test]
    fn date_range_is_inclusive_on_both_ends() {
        let table = sample_table();
        let mut sel = FilterSelection::default();
        sel.start = date(2021, 1, 15);
        sel.end = date(2021, 1, 20);
        assert_eq!(filtered_indices(&table, &sel), vec![0, 2]);
    }

    #[test]
    fn empty_result_is_valid() {
        let table = sample_table();
        let mut sel = FilterSelection::default();
        sel.countries.insert("France".into());
        assert!(filtered_indices(&table, &sel).is_empty());
    }
}
