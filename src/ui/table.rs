use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::SalesTable;

const HEADERS: [&str; 7] = [
    "Date",
    "Country",
    "Category",
    "Product",
    "Sales Person",
    "Boxes",
    "Amount ($)",
];

/// Collapsible raw view of the filtered rows, in original file order.
pub fn raw_data_section(ui: &mut Ui, table: &SalesTable, indices: &[usize]) {
    egui::CollapsingHeader::new("View filtered raw data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .columns(Column::auto().resizable(true), HEADERS.len())
                .min_scrolled_height(200.0)
                .max_scroll_height(400.0)
                .header(20.0, |mut header| {
                    for title in HEADERS {
                        header.col(|ui: &mut Ui| {
                            ui.strong(title);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, indices.len(), |mut row| {
                        let rec = &table.records[indices[row.index()]];
                        row.col(|ui: &mut Ui| {
                            ui.label(rec.date.format("%Y-%m-%d").to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.country);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.category);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.product);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(&rec.sales_person);
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(rec.boxes.to_string());
                        });
                        row.col(|ui: &mut Ui| {
                            ui.label(format!("{:.2}", rec.amount));
                        });
                    });
                });
        });
}
