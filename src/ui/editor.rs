//! Markdown editor of the viewer page

use eframe::egui;

use crate::app::{ViewMode, ViewerApp};

/// Markdown editor panel
pub struct EditorPanel;

impl EditorPanel {
    /// Show the editor panel
    pub fn show(ui: &mut egui::Ui, app: &mut ViewerApp) {
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                let title = if app.document.modified {
                    format!("{}*", app.document.title())
                } else {
                    app.document.title()
                };
                ui.label(egui::RichText::new(title).strong());

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Preview").on_hover_text("Switch to preview").clicked() {
                        app.view_mode = ViewMode::Preview;
                    }
                    if ui.button("Copy").on_hover_text("Copy markdown").clicked() {
                        let text = app.document.content.clone();
                        app.copy_to_clipboard(ui.ctx(), text, "Markdown copied to clipboard");
                    }
                });
            });
            ui.separator();

            // Editor area
            egui::ScrollArea::vertical()
                .id_salt("editor_scroll")
                .show(ui, |ui| {
                    let response = egui::TextEdit::multiline(&mut app.document.content)
                        .font(egui::TextStyle::Monospace)
                        .code_editor()
                        .hint_text("Type your markdown here...")
                        .desired_width(f32::INFINITY)
                        .desired_rows(30)
                        .show(ui);

                    if response.response.changed() {
                        app.document.modified = true;
                    }
                });
        });
    }
}
