#![windows_subsystem = "windows"]

use eframe::egui;
use tracing_subscriber::EnvFilter;

mod app;
mod panels;
mod rows;
mod theme;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([920.0, 620.0])
            .with_min_inner_size([640.0, 420.0])
            .with_decorations(false)
            .with_title("Bulk Denoiser"),
        ..Default::default()
    };
    eframe::run_native(
        "Bulk Denoiser",
        options,
        Box::new(|_cc| Box::new(app::DenoiseApp::default())),
    )
}
