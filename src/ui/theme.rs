//! Applies the reading settings to egui's style

use eframe::egui::{self, Color32, FontId, TextStyle};

use crate::core::settings::{FontFamily, ReaderSettings};

/// Warm tint laid over the screen by the blue light filter
const FILTER_TINT: [u8; 3] = [255, 170, 60];
/// Opacity of the tint at full intensity
const FILTER_MAX_ALPHA: f32 = 0.35;

pub fn color([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// egui only ships a proportional and a monospace family
pub fn egui_family(family: FontFamily) -> egui::FontFamily {
    match family {
        FontFamily::Mono => egui::FontFamily::Monospace,
        FontFamily::Sans | FontFamily::Serif | FontFamily::Display => {
            egui::FontFamily::Proportional
        }
    }
}

/// Text styles scaled from the reader font size
pub fn text_styles(settings: &ReaderSettings) -> Vec<(TextStyle, FontId)> {
    let size = settings.font_size as f32;
    let family = egui_family(settings.font_family);
    vec![
        (TextStyle::Heading, FontId::new(size * 1.5, family.clone())),
        (TextStyle::Body, FontId::new(size, family.clone())),
        (TextStyle::Button, FontId::new(size * 0.875, egui::FontFamily::Proportional)),
        (TextStyle::Small, FontId::new(size * 0.75, family)),
        (TextStyle::Monospace, FontId::new(size * 0.9, egui::FontFamily::Monospace)),
    ]
}

/// Vertical gap between laid out rows for a line height multiplier
pub fn row_spacing(settings: &ReaderSettings) -> f32 {
    (settings.font_size as f32 * (settings.line_height - 1.0)).max(2.0)
}

/// Overlay color of the blue light filter, transparent when off
pub fn filter_overlay(settings: &ReaderSettings) -> Color32 {
    let [r, g, b] = FILTER_TINT;
    let alpha = (settings.blue_light_filter * FILTER_MAX_ALPHA * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

/// Push the settings into the context style
pub fn apply(ctx: &egui::Context, settings: &ReaderSettings) {
    let theme = if settings.background.is_dark() {
        egui::Theme::Dark
    } else {
        egui::Theme::Light
    };
    let background = color(settings.background.background_rgb());
    let text = color(settings.background.text_rgb());

    ctx.set_theme(theme);
    ctx.style_mut_of(theme, |style| {
        let mut visuals = theme.default_visuals();
        visuals.panel_fill = background;
        visuals.window_fill = background;
        visuals.extreme_bg_color = background;
        visuals.override_text_color = Some(text);
        if settings.font_weight.is_bold() {
            visuals.widgets.noninteractive.fg_stroke.width = 1.5;
        }
        style.visuals = visuals;

        style.text_styles = text_styles(settings).into_iter().collect();
        style.spacing.item_spacing.y = row_spacing(settings);
    });

    tracing::debug!(
        background = settings.background.label(),
        font_size = settings.font_size,
        "Applied reading settings"
    );
}

/// Paint the warm overlay above everything else
pub fn paint_filter(ctx: &egui::Context, settings: &ReaderSettings) {
    if settings.blue_light_filter <= 0.0 {
        return;
    }
    let painter = ctx.layer_painter(egui::LayerId::new(
        egui::Order::Foreground,
        egui::Id::new("blue_light_filter"),
    ));
    painter.rect_filled(ctx.screen_rect(), 0.0, filter_overlay(settings));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_alpha_scales_with_intensity() {
        let mut settings = ReaderSettings::default();
        assert_eq!(filter_overlay(&settings).a(), 0);

        settings.set_blue_light_filter(0.5);
        let half = filter_overlay(&settings).a();
        settings.set_blue_light_filter(1.0);
        let full = filter_overlay(&settings).a();
        assert!(half > 0 && half < full);
    }

    #[test]
    fn test_text_styles_follow_font_size() {
        let mut settings = ReaderSettings::default();
        settings.set_font_size(20);
        settings.font_family = FontFamily::Mono;
        let styles = text_styles(&settings);
        let body = styles
            .iter()
            .find(|(style, _)| *style == TextStyle::Body)
            .map(|(_, font)| font.clone());
        assert_eq!(body, Some(FontId::new(20.0, egui::FontFamily::Monospace)));
    }

    #[test]
    fn test_row_spacing() {
        let mut settings = ReaderSettings::default();
        assert_eq!(row_spacing(&settings), 8.0);
        settings.line_height = 1.0;
        assert_eq!(row_spacing(&settings), 2.0);
    }
}
