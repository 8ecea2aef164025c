use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};

// ---------------------------------------------------------------------------
// SalesRecord – one row of the uploaded CSV
// ---------------------------------------------------------------------------

/// A single sales transaction (one row of the source file).
///
/// `month` and `year` are derived from `date` at construction time so the
/// aggregators never have to touch the calendar again.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesRecord {
    pub date: NaiveDate,
    pub country: String,
    pub category: String,
    pub product: String,
    pub sales_person: String,
    /// Sales amount in dollars, non-negative.
    pub amount: f64,
    /// Boxes shipped for this transaction.
    pub boxes: u32,
    /// Derived: calendar month of `date` (1–12).
    pub month: u32,
    /// Derived: calendar year of `date`.
    pub year: i32,
}

impl SalesRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date: NaiveDate,
        country: String,
        category: String,
        product: String,
        sales_person: String,
        amount: f64,
        boxes: u32,
    ) -> Self {
        SalesRecord {
            month: date.month(),
            year: date.year(),
            date,
            country,
            category,
            product,
            sales_person,
            amount,
            boxes,
        }
    }
}

// ---------------------------------------------------------------------------
// Dimension – the columns the user can filter on
// ---------------------------------------------------------------------------

/// The multi-select filter dimensions of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Country,
    Product,
    SalesPerson,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Country,
        Dimension::Product,
        Dimension::SalesPerson,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Dimension::Country => "Country",
            Dimension::Product => "Product",
            Dimension::SalesPerson => "Sales person",
        }
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed filter domains and date span.
#[derive(Debug, Clone)]
pub struct SalesTable {
    /// All transactions, in file order.
    pub records: Vec<SalesRecord>,
    /// Sorted unique countries.
    pub countries: BTreeSet<String>,
    /// Sorted unique product names.
    pub products: BTreeSet<String>,
    /// Sorted unique sales persons.
    pub sales_persons: BTreeSet<String>,
    /// Earliest transaction date (1970-01-01 for an empty table).
    pub date_min: NaiveDate,
    /// Latest transaction date (1970-01-01 for an empty table).
    pub date_max: NaiveDate,
}

impl SalesTable {
    /// Build the filter domains and date span from the loaded records.
    pub fn from_records(records: Vec<SalesRecord>) -> Self {
        let mut countries = BTreeSet::new();
        let mut products = BTreeSet::new();
        let mut sales_persons = BTreeSet::new();

        for rec in &records {
            countries.insert(rec.country.clone());
            products.insert(rec.product.clone());
            sales_persons.insert(rec.sales_person.clone());
        }

        let date_min = records.iter().map(|r| r.date).min().unwrap_or_default();
        let date_max = records.iter().map(|r| r.date).max().unwrap_or_default();

        SalesTable {
            records,
            countries,
            products,
            sales_persons,
            date_min,
            date_max,
        }
    }

    /// The sorted unique values of a filter dimension.
    pub fn domain(&self, dim: Dimension) -> &BTreeSet<String> {
        match dim {
            Dimension::Country => &self.countries,
            Dimension::Product => &self.products,
            Dimension::SalesPerson => &self.sales_persons,
        }
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
