mod app;
mod color;
mod data;
mod state;
mod ui;

use app::SalesDashApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 840.0])
            .with_min_inner_size([800.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Cosmetics Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SalesDashApp::default()))),
    )
}
