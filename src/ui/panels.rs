use std::collections::BTreeSet;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::loader::{self, RowPolicy};
use crate::data::model::Dimension;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Dashboard Filters");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No data loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let domains: Vec<(Dimension, BTreeSet<String>)> = Dimension::ALL
        .iter()
        .map(|&dim| (dim, table.domain(dim).clone()))
        .collect();
    let (date_min, date_max) = (table.date_min, table.date_max);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range (inclusive) ----
            ui.strong("Date range");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("From");
                ui.add(DatePickerButton::new(&mut state.filters.start).id_salt("date_start"));
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("To");
                ui.add(DatePickerButton::new(&mut state.filters.end).id_salt("date_end"));
            });
            if ui.small_button("Reset range").clicked() {
                state.filters.start = date_min;
                state.filters.end = date_max;
            }
            ui.separator();

            // ---- Top-N for the per-country product ranking ----
            ui.strong("Top products per country");
            ui.add(egui::Slider::new(&mut state.top_n, 1..=9));
            ui.separator();

            // ---- Per-dimension multi-selects (collapsible) ----
            for (dim, values) in &domains {
                let n_selected = state.filters.selection(*dim).len();
                let header_text = format!("{}  ({n_selected}/{})", dim.label(), values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.label())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(*dim);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(*dim);
                            }
                        });

                        // Re-borrow after potential mutation from All/None.
                        let selected = state.filters.selection_mut(*dim);
                        for val in values {
                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, val.as_str()).changed() {
                                if checked {
                                    selected.insert(val.clone());
                                } else {
                                    selected.remove(val);
                                }
                            }
                        }
                    });
            }
        });

    // Recompute visible rows after any widget change.
    state.refilter();
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            let has_table = state.table.is_some();
            if ui
                .add_enabled(has_table, egui::Button::new("Export filtered…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} records loaded, {} visible",
                table.len(),
                state.visible_indices.len()
            ));
            ui.separator();
        }

        let skipping = state.row_policy == RowPolicy::SkipMalformed;
        if ui
            .selectable_label(skipping, "Skip malformed rows")
            .on_hover_text("When off, a malformed row aborts the next load.")
            .clicked()
        {
            state.row_policy = if skipping {
                RowPolicy::Strict
            } else {
                RowPolicy::SkipMalformed
            };
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_file(&path, state.row_policy) {
            Ok(outcome) => {
                log::info!(
                    "Loaded {} records ({} skipped) from {}",
                    outcome.table.len(),
                    outcome.skipped_rows,
                    path.display()
                );
                state.set_table(outcome.table, outcome.skipped_rows);
            }
            Err(e) => {
                log::error!("Failed to load file: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

fn export_file_dialog(state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };

    let file = rfd::FileDialog::new()
        .set_title("Export filtered rows")
        .set_file_name("filtered_sales.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match loader::export_to_path(&path, table, &state.visible_indices) {
            Ok(()) => {
                log::info!(
                    "Exported {} rows to {}",
                    state.visible_indices.len(),
                    path.display()
                );
                state.status_message =
                    Some(format!("Exported {} rows", state.visible_indices.len()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
