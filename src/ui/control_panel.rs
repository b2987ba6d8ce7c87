//! Reading settings window

use eframe::egui;

use crate::app::ViewerApp;
use crate::core::settings::{Background, BlueLightLevel, FontFamily, MIN_FONT_SIZE};

use super::theme;

/// Floating window editing the reading settings
pub struct ControlPanel;

impl ControlPanel {
    pub fn show(ctx: &egui::Context, app: &mut ViewerApp) {
        let mut open = app.settings_open;
        let mut changed = false;

        egui::Window::new("Reading Settings")
            .open(&mut open)
            .resizable(false)
            .collapsible(false)
            .default_width(300.0)
            .show(ctx, |ui| {
                changed |= Self::font_controls(ui, app);
                ui.separator();
                changed |= Self::style_controls(ui, app);
                ui.separator();
                changed |= Self::theme_controls(ui, app);
                ui.separator();
                changed |= Self::filter_controls(ui, app);
            });

        app.settings_open = open;
        if changed {
            app.settings_changed();
        }
    }

    /// A "label  [-] value [+]" row, returns (decrease, increase) clicks
    fn stepper(ui: &mut egui::Ui, label: &str, value: String, can_decrease: bool, can_increase: bool) -> (bool, bool) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let increase = ui.add_enabled(can_increase, egui::Button::new("+")).clicked();
                ui.label(value);
                let decrease = ui.add_enabled(can_decrease, egui::Button::new("−")).clicked();
                (decrease, increase)
            })
            .inner
        })
        .inner
    }

    fn font_controls(ui: &mut egui::Ui, app: &mut ViewerApp) -> bool {
        let settings = &mut app.settings;
        let mut changed = false;

        ui.horizontal(|ui| {
            ui.label("Font Size");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("+").clicked() {
                    settings.increase_font_size();
                    changed = true;
                }
                let mut size = settings.font_size;
                if ui
                    .add(egui::DragValue::new(&mut size).range(MIN_FONT_SIZE..=96).suffix("px"))
                    .changed()
                {
                    settings.set_font_size(size);
                    changed = true;
                }
                if ui
                    .add_enabled(settings.can_decrease_font_size(), egui::Button::new("−"))
                    .clicked()
                {
                    settings.decrease_font_size();
                    changed = true;
                }
            });
        });

        let weight = settings.font_weight;
        let (lighter, heavier) = Self::stepper(
            ui,
            "Font Weight",
            weight.value().to_string(),
            weight.lighter() != weight,
            weight.heavier() != weight,
        );
        if lighter {
            settings.decrease_font_weight();
        }
        if heavier {
            settings.increase_font_weight();
        }

        let (tighter, wider) = Self::stepper(
            ui,
            "Letter Spacing",
            format!("{:.1}px", settings.letter_spacing),
            settings.can_decrease_letter_spacing(),
            settings.can_increase_letter_spacing(),
        );
        if tighter {
            settings.decrease_letter_spacing();
        }
        if wider {
            settings.increase_letter_spacing();
        }

        let (shorter, taller) = Self::stepper(
            ui,
            "Line Height",
            format!("{:.1}", settings.line_height),
            settings.can_decrease_line_height(),
            settings.can_increase_line_height(),
        );
        if shorter {
            settings.decrease_line_height();
        }
        if taller {
            settings.increase_line_height();
        }

        changed || lighter || heavier || tighter || wider || shorter || taller
    }

    fn style_controls(ui: &mut egui::Ui, app: &mut ViewerApp) -> bool {
        let mut changed = false;
        ui.label("Font Style");
        for family in FontFamily::ALL {
            changed |= ui
                .radio_value(&mut app.settings.font_family, family, family.label())
                .changed();
        }
        changed
    }

    fn theme_controls(ui: &mut egui::Ui, app: &mut ViewerApp) -> bool {
        let mut changed = false;
        ui.label("Background");
        ui.horizontal(|ui| {
            for background in Background::ALL {
                let selected = app.settings.background == background;
                let swatch = egui::Button::new(
                    egui::RichText::new(background.label()).color(theme::color(background.text_rgb())),
                )
                .fill(theme::color(background.background_rgb()))
                .selected(selected)
                .min_size(egui::vec2(72.0, 32.0));

                if ui.add(swatch).clicked() && !selected {
                    app.settings.background = background;
                    changed = true;
                }
            }
        });
        changed
    }

    fn filter_controls(ui: &mut egui::Ui, app: &mut ViewerApp) -> bool {
        let settings = &mut app.settings;
        ui.horizontal(|ui| {
            ui.label("Blue Light Filter");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let level = match settings.blue_light_level() {
                    BlueLightLevel::Off => "Off",
                    BlueLightLevel::Low => "Low",
                    BlueLightLevel::Medium => "Medium",
                    BlueLightLevel::High => "High",
                };
                ui.label(format!(
                    "{}% ({level})",
                    (settings.blue_light_filter * 100.0).round()
                ));
            });
        });

        let mut intensity = settings.blue_light_filter;
        let response = ui.add(egui::Slider::new(&mut intensity, 0.0..=1.0).step_by(0.05).show_value(false));
        if response.changed() {
            settings.set_blue_light_filter(intensity);
        }
        response.changed()
    }
}
