//! Landing page

use eframe::egui;

use crate::app::{Page, ViewerApp};

/// Landing page with entry points to the viewer and the converter
pub struct HomePanel;

impl HomePanel {
    pub fn show(ui: &mut egui::Ui, app: &mut ViewerApp) {
        egui::ScrollArea::vertical()
            .id_salt("home_scroll")
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(60.0);
                    ui.heading("Markdown Viewer");
                    ui.add_space(12.0);
                    ui.label("A tool to view, edit, and convert documents to Markdown format");
                    ui.add_space(32.0);

                    ui.columns(2, |columns| {
                        if Self::card(
                            &mut columns[0],
                            "View & Edit Markdown",
                            "Preview and edit your markdown with real-time rendering and advanced formatting options",
                            "Open Editor",
                        ) {
                            app.open_page(Page::Viewer);
                        }

                        if Self::card(
                            &mut columns[1],
                            "Convert to Markdown",
                            "Upload Word or PDF documents and convert them to clean, formatted markdown",
                            "Convert Document",
                        ) {
                            app.open_page(Page::Convert);
                        }
                    });

                    ui.add_space(40.0);
                    ui.label(
                        egui::RichText::new(
                            "Customize your reading experience with font options, themes, and more",
                        )
                        .small()
                        .weak(),
                    );
                });
            });
    }

    /// Returns whether the card button was clicked
    fn card(ui: &mut egui::Ui, title: &str, description: &str, action: &str) -> bool {
        egui::Frame::group(ui.style())
            .inner_margin(16.0)
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new(title).strong().size(18.0));
                    ui.add_space(8.0);
                    ui.label(description);
                    ui.add_space(16.0);
                    ui.button(action).clicked()
                })
                .inner
            })
            .inner
    }
}
