//! Markdown Viewer - view, edit and convert documents to markdown
//!
//! An egui application with a themed markdown preview, a heuristic
//! document-to-markdown converter and TXT/DOC/PDF export.

mod app;
mod core;
mod ui;

use app::ViewerApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Markdown Viewer...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Markdown Viewer"),
        ..Default::default()
    };

    eframe::run_native(
        "Markdown Viewer",
        native_options,
        Box::new(|cc| Ok(Box::new(ViewerApp::new(cc)))),
    )
}
