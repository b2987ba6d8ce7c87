//! Rendered markdown of the viewer page

use eframe::egui;
use egui_commonmark::CommonMarkViewer;

use crate::app::{ViewMode, ViewerApp};
use crate::core::export::{self, ExportFormat};

/// Markdown preview panel
pub struct PreviewPanel;

impl PreviewPanel {
    /// Show the preview panel
    pub fn show(ui: &mut egui::Ui, app: &mut ViewerApp) {
        ui.horizontal(|ui| {
            if ui.button("⬅ Back to Editor").clicked() {
                app.view_mode = ViewMode::Edit;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.menu_button("Download", |ui| {
                    for format in [ExportFormat::Txt, ExportFormat::Doc, ExportFormat::Pdf] {
                        if ui.button(format!("Download as {}", format.label())).clicked() {
                            let markdown = app.document.content.clone();
                            app.export(format, &markdown);
                            ui.close();
                        }
                    }
                });
                if ui.button("Copy").on_hover_text("Copy preview content").clicked() {
                    let text = export::plain_text(&app.document.content);
                    app.copy_to_clipboard(ui.ctx(), text, "Preview content copied to clipboard");
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("preview_scroll")
            .show(ui, |ui| {
                if app.document.content.trim().is_empty() {
                    Self::show_empty(ui);
                } else {
                    CommonMarkViewer::new().show(ui, &mut app.commonmark_cache, &app.document.content);
                }
            });
    }

    /// Show empty state
    fn show_empty(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(50.0);
            ui.label("Nothing to preview");
            ui.label("Switch back to the editor and write some markdown");
        });
    }
}
