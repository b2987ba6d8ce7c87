//! Document to markdown conversion page

use eframe::egui;

use crate::app::ViewerApp;
use crate::core::export::ExportFormat;

/// Side by side source text and markdown result
pub struct ConvertPanel;

impl ConvertPanel {
    pub fn show(ui: &mut egui::Ui, app: &mut ViewerApp) {
        ui.heading("Convert Document to Markdown");
        ui.add_space(8.0);

        ui.columns(2, |columns| {
            Self::show_source(&mut columns[0], app);
            Self::show_result(&mut columns[1], app);
        });
    }

    fn show_source(ui: &mut egui::Ui, app: &mut ViewerApp) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Document Content").strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let has_input = !app.convert.input.trim().is_empty();
                if ui
                    .add_enabled(has_input, egui::Button::new("Convert to Markdown"))
                    .clicked()
                {
                    app.run_conversion();
                }
                if ui.button("Upload Document").clicked() {
                    app.upload_document();
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("convert_source_scroll")
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut app.convert.input)
                        .hint_text("Paste your document content here or upload a document...")
                        .desired_width(f32::INFINITY)
                        .desired_rows(30),
                );
            });
    }

    fn show_result(ui: &mut egui::Ui, app: &mut ViewerApp) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Markdown Result").strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(app.convert.converted, egui::Button::new("Download Markdown"))
                    .clicked()
                {
                    let markdown = app.convert.output.clone();
                    app.export(ExportFormat::Markdown, &markdown);
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("convert_result_scroll")
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut app.convert.output)
                        .font(egui::TextStyle::Monospace)
                        .code_editor()
                        .interactive(app.convert.converted)
                        .hint_text("Converted markdown will appear here...")
                        .desired_width(f32::INFINITY)
                        .desired_rows(30),
                );
            });
    }
}
