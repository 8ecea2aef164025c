use crate::data::filter::{filtered_indices, FilterSelection};
use crate::data::loader::RowPolicy;
use crate::data::model::{Dimension, SalesTable};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full session state, independent of rendering. One instance per
/// window; nothing here is global, so several dashboards can coexist.
pub struct AppState {
    /// Loaded table (None until the user opens a file).
    pub table: Option<SalesTable>,

    /// Current filter choices.
    pub filters: FilterSelection,

    /// Indices of rows passing the current filters (cached).
    pub visible_indices: Vec<usize>,

    /// How many products to show per country in the top-products chart.
    pub top_n: usize,

    /// How the loader treats malformed rows.
    pub row_policy: RowPolicy,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            filters: FilterSelection::default(),
            visible_indices: Vec::new(),
            top_n: 3,
            row_policy: RowPolicy::default(),
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table: reset the filters to cover everything
    /// and report dropped rows, if any.
    pub fn set_table(&mut self, table: SalesTable, skipped_rows: usize) {
        self.filters = FilterSelection::all(&table);
        self.visible_indices = (0..table.len()).collect();
        self.table = Some(table);
        self.status_message = if skipped_rows > 0 {
            Some(format!("{skipped_rows} malformed row(s) skipped"))
        } else {
            None
        };
    }

    /// Recompute `visible_indices` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.visible_indices = filtered_indices(table, &self.filters);
        }
    }

    /// Select every value of a dimension.
    pub fn select_all(&mut self, dim: Dimension) {
        if let Some(table) = &self.table {
            let domain = table.domain(dim).clone();
            *self.filters.selection_mut(dim) = domain;
            self.refilter();
        }
    }

    /// Clear a dimension's selection. An empty selection means "no
    /// restriction", so this shows every value again.
    pub fn select_none(&mut self, dim: Dimension) {
        self.filters.selection_mut(dim).clear();
        self.refilter();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{SalesRecord, SalesTable};
    use chrono::NaiveDate;

    fn table() -> SalesTable {
        let d = |m, day| NaiveDate::from_ymd_opt(2021, m, day).unwrap();
        SalesTable::from_records(vec![
            SalesRecord::new(d(1, 15), "USA".into(), "Skincare".into(), "Cream".into(), "Alice".into(), 100.0, 10),
            SalesRecord::new(d(2, 10), "India".into(), "Skincare".into(), "Lotion".into(), "Bob".into(), 20.0, 2),
        ])
    }

    #[test]
    fn set_table_starts_with_everything_visible() {
        let mut state = AppState::default();
        state.set_table(table(), 0);

        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.filters.countries.len(), 2);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn set_table_reports_skipped_rows() {
        let mut state = AppState::default();
        state.set_table(table(), 3);
        assert!(state.status_message.as_deref().unwrap().contains('3'));
    }

    #[test]
    fn select_none_clears_the_restriction() {
        let mut state = AppState::default();
        state.set_table(table(), 0);

        state.filters.countries.clear();
        state.filters.countries.insert("USA".into());
        state.refilter();
        assert_eq!(state.visible_indices, vec![0]);

        state.select_none(Dimension::Country);
        assert_eq!(state.visible_indices, vec![0, 1]);

        state.select_all(Dimension::Country);
        assert_eq!(state.visible_indices, vec![0, 1]);
    }
}
