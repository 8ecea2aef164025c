use std::io::{Read, Write};
use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use thiserror::Error;

use super::model::{SalesRecord, SalesTable};

// ---------------------------------------------------------------------------
// Errors and load policy
// ---------------------------------------------------------------------------

/// Loading failures, split into file-format and row-level kinds so the UI
/// can phrase the message accordingly.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse CSV: {0}")]
    Csv(#[from] csv::Error),
    /// The header row does not contain an expected column.
    #[error("missing expected column '{0}' – please re-upload a file with the standard header")]
    MissingColumn(&'static str),
    /// A data row failed to parse (only fatal under [`RowPolicy::Strict`]).
    #[error("line {line}: {reason}")]
    Row { line: u64, reason: String },
    #[error("file contains no data rows")]
    Empty,
}

/// How to treat rows whose cells fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Abort the whole load on the first malformed row (default).
    #[default]
    Strict,
    /// Drop malformed rows, logging each one and counting the drops.
    SkipMalformed,
}

/// A successfully loaded table plus how many rows were dropped
/// (always 0 under [`RowPolicy::Strict`]).
#[derive(Debug)]
pub struct LoadOutcome {
    pub table: SalesTable,
    pub skipped_rows: usize,
}

// ---------------------------------------------------------------------------
// Header matching
// ---------------------------------------------------------------------------

/// Canonical column keys after header normalisation.
const COL_DATE: &str = "date";
const COL_COUNTRY: &str = "country";
const COL_CATEGORY: &str = "category";
const COL_PRODUCT: &str = "product";
const COL_PERSON: &str = "sales_person";
const COL_BOXES: &str = "boxes_shipped";
const COL_AMOUNT: &str = "amount";

/// Normalise a raw header cell the way the dashboard's source data is
/// usually labelled: `" Amount ($) "` → `"amount"`, `"Sales Person"` →
/// `"sales_person"`.
fn normalize_header(raw: &str) -> String {
    raw.to_ascii_lowercase()
        .replace("($)", "")
        .trim()
        .replace([' ', '-'], "_")
        .trim_matches('_')
        .to_string()
}

/// Column indices of the seven expected columns within the header row.
struct Columns {
    date: usize,
    country: usize,
    category: usize,
    product: usize,
    person: usize,
    boxes: usize,
    amount: usize,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Columns, LoadError> {
        let find = |name: &'static str| -> Result<usize, LoadError> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or(LoadError::MissingColumn(name))
        };
        Ok(Columns {
            date: find(COL_DATE)?,
            country: find(COL_COUNTRY)?,
            category: find(COL_CATEGORY)?,
            product: find(COL_PRODUCT)?,
            person: find(COL_PERSON)?,
            boxes: find(COL_BOXES)?,
            amount: find(COL_AMOUNT)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Cell parsing
// ---------------------------------------------------------------------------

/// Accepted date layouts: ISO, the `04-Jan-22` style common in exported
/// sales sheets, and US slashed dates.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%b-%y", "%m/%d/%Y"];

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parse a money cell, tolerating `$` signs and thousands separators.
/// Negative or non-finite amounts are rejected.
fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    let value: f64 = cleaned.parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

fn parse_boxes(s: &str) -> Option<u32> {
    s.replace(',', "").trim().parse().ok()
}

fn parse_record(raw: &csv::StringRecord, cols: &Columns) -> Result<SalesRecord, String> {
    let cell = |idx: usize| raw.get(idx).unwrap_or("").trim();

    let date_str = cell(cols.date);
    let date = parse_date(date_str).ok_or_else(|| format!("unrecognised date '{date_str}'"))?;

    let text = |idx: usize, name: &str| -> Result<String, String> {
        let v = cell(idx);
        if v.is_empty() {
            Err(format!("empty '{name}' field"))
        } else {
            Ok(v.to_string())
        }
    };
    let country = text(cols.country, "Country")?;
    let category = text(cols.category, "Category")?;
    let product = text(cols.product, "Product")?;
    let person = text(cols.person, "Sales Person")?;

    let amount_str = cell(cols.amount);
    let amount = parse_amount(amount_str)
        .ok_or_else(|| format!("invalid amount '{amount_str}' (must be a non-negative number)"))?;

    let boxes_str = cell(cols.boxes);
    let boxes = parse_boxes(boxes_str)
        .ok_or_else(|| format!("invalid boxes count '{boxes_str}' (must be a non-negative integer)"))?;

    Ok(SalesRecord::new(
        date, country, category, product, person, amount, boxes,
    ))
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a sales table from a CSV file.
///
/// The header row must contain the seven expected columns (Date, Country,
/// Category, Product, Sales Person, Boxes Shipped, Amount). A missing column
/// aborts the load regardless of `policy`; malformed data rows are handled
/// per [`RowPolicy`].
pub fn load_file(path: &Path, policy: RowPolicy) -> Result<LoadOutcome, LoadError> {
    let file = std::fs::File::open(path)?;
    load_reader(file, policy)
}

/// Load a sales table from any reader producing CSV text.
pub fn load_reader<R: Read>(reader: R, policy: RowPolicy) -> Result<LoadOutcome, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect();
    let cols = Columns::locate(&headers)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in csv_reader.records() {
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                match policy {
                    RowPolicy::Strict => {
                        return Err(LoadError::Row {
                            line,
                            reason: e.to_string(),
                        });
                    }
                    RowPolicy::SkipMalformed => {
                        log::warn!("skipping line {line}: {e}");
                        skipped += 1;
                        continue;
                    }
                }
            }
        };
        let line = raw.position().map(|p| p.line()).unwrap_or(0);

        match parse_record(&raw, &cols) {
            Ok(rec) => records.push(rec),
            Err(reason) => match policy {
                RowPolicy::Strict => return Err(LoadError::Row { line, reason }),
                RowPolicy::SkipMalformed => {
                    log::warn!("skipping line {line}: {reason}");
                    skipped += 1;
                }
            },
        }
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(LoadOutcome {
        table: SalesTable::from_records(records),
        skipped_rows: skipped,
    })
}

// ---------------------------------------------------------------------------
// Export
// ---------------------------------------------------------------------------

const EXPORT_HEADER: [&str; 7] = [
    "Date",
    "Country",
    "Category",
    "Product",
    "Sales Person",
    "Boxes Shipped",
    "Amount ($)",
];

/// Write the currently visible rows back out as CSV, with the standard
/// header, in filtered order.
pub fn export_filtered<W: Write>(
    writer: W,
    table: &SalesTable,
    indices: &[usize],
) -> anyhow::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(EXPORT_HEADER)
        .context("writing export header")?;

    for &i in indices {
        let rec = &table.records[i];
        out.write_record([
            rec.date.format("%Y-%m-%d").to_string(),
            rec.country.clone(),
            rec.category.clone(),
            rec.product.clone(),
            rec.sales_person.clone(),
            rec.boxes.to_string(),
            format!("{:.2}", rec.amount),
        ])
        .with_context(|| format!("writing row {i}"))?;
    }

    out.flush().context("flushing export")?;
    Ok(())
}

/// Export the visible rows to a file path chosen by the user.
pub fn export_to_path(path: &Path, table: &SalesTable, indices: &[usize]) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    export_filtered(file, table, indices)
}
