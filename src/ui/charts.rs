use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::aggregate::{self, KpiSet, MonthTotal};
use crate::data::model::SalesTable;
use crate::state::AppState;
use crate::ui::table;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Central panel – KPI tiles, charts, raw data
// ---------------------------------------------------------------------------

/// Render the dashboard body: KPI tiles, the four charts, and the raw-data
/// section. Everything is recomputed from the visible rows each frame.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sales CSV to begin  (File → Open…)");
        });
        return;
    };

    let indices = &state.visible_indices;
    let kpis = KpiSet::compute(table, indices);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Key Performance Indicators");
            kpi_row(ui, &kpis);
            ui.separator();

            if indices.is_empty() {
                ui.vertical_centered(|ui: &mut Ui| {
                    ui.add_space(24.0);
                    ui.label(
                        RichText::new("No data available for the selected filters.")
                            .color(Color32::YELLOW),
                    );
                });
                return;
            }

            ui.heading("Visual Analysis");
            ui.columns(2, |cols: &mut [Ui]| {
                monthly_trend_chart(&mut cols[0], table, indices);
                country_chart(&mut cols[1], table, indices);
            });
            ui.add_space(8.0);
            ui.columns(2, |cols: &mut [Ui]| {
                person_chart(&mut cols[0], table, indices);
                top_products_chart(&mut cols[1], table, indices, state.top_n);
            });

            ui.separator();
            table::raw_data_section(ui, table, indices);
        });
}

fn kpi_row(ui: &mut Ui, kpis: &KpiSet) {
    ui.horizontal_wrapped(|ui: &mut Ui| {
        kpi_tile(ui, "Total Sales ($)", format_money(kpis.total_sales));
        kpi_tile(ui, "Boxes Shipped", format_int(kpis.total_boxes));
        kpi_tile(ui, "Transactions", format_int(kpis.transactions as u64));
        kpi_tile(ui, "Average Sale", format_money(kpis.average_sale));
        kpi_tile(ui, "Countries", kpis.unique_countries.to_string());
        kpi_tile(ui, "Products Sold", kpis.unique_products.to_string());
        kpi_tile(ui, "Sales Persons", kpis.active_sales_persons.to_string());
    });
}

fn kpi_tile(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.set_min_width(110.0);
            ui.label(RichText::new(label).small());
            ui.label(RichText::new(value).strong().size(20.0));
        });
    });
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn monthly_trend_chart(ui: &mut Ui, table: &SalesTable, indices: &[usize]) {
    ui.strong("Monthly Sales Trend");

    let trend = aggregate::monthly_trend(table, indices);
    let labels: Vec<String> = trend
        .iter()
        .map(|mt| month_label(mt.year, mt.month))
        .collect();
    let points = trend_points(&trend);
    let markers: PlotPoints = points.clone().into();
    let line_points: PlotPoints = points.into();

    Plot::new("monthly_trend")
        .height(CHART_HEIGHT)
        .y_axis_label("Total sales ($)")
        .x_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(line_points)
                    .name("Total sales")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
            plot_ui.points(
                Points::new(markers)
                    .color(Color32::LIGHT_BLUE)
                    .radius(3.0),
            );
        });
}

fn country_chart(ui: &mut Ui, table: &SalesTable, indices: &[usize]) {
    ui.strong("Total Sales by Country");

    let ranked = aggregate::sales_by_country(table, indices);
    let colors = ColorMap::new(&table.countries);
    let labels: Vec<String> = ranked.iter().map(|(c, _)| c.clone()).collect();

    let bars: Vec<Bar> = ranked
        .iter()
        .enumerate()
        .map(|(i, (country, total))| {
            Bar::new(i as f64, *total)
                .width(0.6)
                .fill(colors.color_for(country))
                .name(country)
        })
        .collect();

    Plot::new("sales_by_country")
        .height(CHART_HEIGHT)
        .y_axis_label("Total sales ($)")
        .x_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

fn person_chart(ui: &mut Ui, table: &SalesTable, indices: &[usize]) {
    ui.strong("Sales Person Performance");

    let perf = aggregate::sales_person_performance(table, indices);
    let labels: Vec<String> = perf.iter().map(|p| p.name.clone()).collect();

    let amount_bars: Vec<Bar> = perf
        .iter()
        .enumerate()
        .map(|(i, p)| Bar::new(i as f64 - 0.2, p.amount).width(0.35).name(&p.name))
        .collect();
    let box_bars: Vec<Bar> = perf
        .iter()
        .enumerate()
        .map(|(i, p)| Bar::new(i as f64 + 0.2, p.boxes as f64).width(0.35).name(&p.name))
        .collect();

    Plot::new("person_performance")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(amount_bars)
                    .name("Sales ($)")
                    .color(Color32::from_rgb(205, 92, 92)),
            );
            plot_ui.bar_chart(
                BarChart::new(box_bars)
                    .name("Boxes shipped")
                    .color(Color32::from_rgb(255, 160, 122)),
            );
        });
}

fn top_products_chart(ui: &mut Ui, table: &SalesTable, indices: &[usize], top_n: usize) {
    ui.strong("Top Products by Country");

    let top = aggregate::top_products_by_country(table, indices, top_n);
    let labels: Vec<String> = top.iter().map(|c| c.country.clone()).collect();

    // Stable product colours across all countries in view.
    let product_set: BTreeSet<String> = top
        .iter()
        .flat_map(|c| c.products.iter().map(|(p, _)| p.clone()))
        .collect();
    let colors = ColorMap::new(&product_set);

    // One BarChart per product so the legend lists products, as the bars of
    // one product may appear under several countries.
    let mut per_product: BTreeMap<&str, Vec<Bar>> = BTreeMap::new();
    for (ci, country_top) in top.iter().enumerate() {
        let offsets = slot_offsets(country_top.products.len());
        for ((product, total), offset) in country_top.products.iter().zip(offsets) {
            per_product.entry(product).or_default().push(
                Bar::new(ci as f64 + offset, *total)
                    .width(slot_width(country_top.products.len()))
                    .name(product),
            );
        }
    }

    Plot::new("top_products")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Total sales ($)")
        .x_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (product, bars) in per_product {
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(product)
                        .color(colors.color_for(product)),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Pure presentation helpers
// ---------------------------------------------------------------------------

/// X/Y pairs for the monthly trend line: the x value is the chronological
/// month position, labelled through [`axis_label`].
fn trend_points(trend: &[MonthTotal]) -> Vec<[f64; 2]> {
    trend
        .iter()
        .enumerate()
        .map(|(i, mt)| [i as f64, mt.total])
        .collect()
}

/// `"2021-01"`-style label for a trend month.
fn month_label(year: i32, month: u32) -> String {
    format!("{year}-{month:02}")
}

/// Map an axis position to its category label; off-category positions get
/// an empty label so only the group centres are annotated.
fn axis_label(labels: &[String], value: f64) -> String {
    let nearest = value.round();
    if (value - nearest).abs() > 0.05 || nearest < 0.0 {
        return String::new();
    }
    labels.get(nearest as usize).cloned().unwrap_or_default()
}

/// Centred offsets for `k` grouped bars within one unit-wide slot.
fn slot_offsets(k: usize) -> Vec<f64> {
    let slot = slot_width(k) / 0.9;
    (0..k)
        .map(|i| (i as f64 - (k as f64 - 1.0) / 2.0) * slot)
        .collect()
}

fn slot_width(k: usize) -> f64 {
    0.9 * 0.8 / k.max(1) as f64
}

/// `$1,234.56`-style money formatting for the KPI tiles. Amounts are
/// validated non-negative at load time.
fn format_money(value: f64) -> String {
    let cents = (value.max(0.0) * 100.0).round() as u64;
    format!("${}.{:02}", format_int(cents / 100), cents % 100)
}

/// Thousands-separated integer formatting.
fn format_int(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_points_index_months_chronologically() {
        let trend = vec![
            MonthTotal { year: 2021, month: 1, total: 100.0 },
            MonthTotal { year: 2021, month: 2, total: 50.0 },
        ];
        assert_eq!(trend_points(&trend), vec![[0.0, 100.0], [1.0, 50.0]]);
    }

    #[test]
    fn month_labels_are_zero_padded() {
        assert_eq!(month_label(2021, 1), "2021-01");
        assert_eq!(month_label(2021, 12), "2021-12");
    }

    #[test]
    fn axis_label_only_annotates_category_centres() {
        let labels = vec!["USA".to_string(), "India".to_string()];
        assert_eq!(axis_label(&labels, 0.0), "USA");
        assert_eq!(axis_label(&labels, 1.02), "India");
        assert_eq!(axis_label(&labels, 0.5), "");
        assert_eq!(axis_label(&labels, -1.0), "");
        assert_eq!(axis_label(&labels, 5.0), "");
    }

    #[test]
    fn slot_offsets_are_centred() {
        let offsets = slot_offsets(3);
        assert_eq!(offsets.len(), 3);
        assert!((offsets[0] + offsets[2]).abs() < 1e-12);
        assert_eq!(offsets[1], 0.0);
        // Grouped bars stay within the unit slot.
        assert!(offsets.iter().all(|o| o.abs() < 0.5));
    }

    #[test]
    fn money_and_int_formatting() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(1234.5), "$1,234.50");
        assert_eq!(format_money(1_000_000.0), "$1,000,000.00");
        assert_eq!(format_int(0), "0");
        assert_eq!(format_int(999), "999");
        assert_eq!(format_int(1234567), "1,234,567");
    }
}
