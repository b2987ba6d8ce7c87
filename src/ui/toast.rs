//! Transient notifications in the bottom-right corner

use eframe::egui;

/// Seconds a toast stays on screen
const TOAST_LIFETIME: f64 = 4.0;
/// Older toasts are dropped beyond this many
const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    fn accent(self) -> egui::Color32 {
        match self {
            Self::Info => egui::Color32::from_rgb(59, 130, 246),
            Self::Success => egui::Color32::from_rgb(34, 197, 94),
            Self::Error => egui::Color32::from_rgb(239, 68, 68),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub kind: ToastKind,
    pub title: String,
    pub description: Option<String>,
    /// First frame time the toast was shown at, in `egui::InputState::time`
    /// seconds. `None` until the next tick.
    created_at: Option<f64>,
}

/// Queue of visible notifications.
///
/// Toasts are stamped by the first tick after they are raised, so time spent
/// in a blocking file dialog does not count against their lifetime.
#[derive(Debug, Default)]
pub struct Toasts {
    toasts: Vec<Toast>,
}

impl Toasts {
    pub fn info(&mut self, title: impl Into<String>) {
        self.push(ToastKind::Info, title.into(), None);
    }

    pub fn success(&mut self, title: impl Into<String>) {
        self.push(ToastKind::Success, title.into(), None);
    }

    pub fn error(&mut self, title: impl Into<String>) {
        self.push(ToastKind::Error, title.into(), None);
    }

    /// Info toast with a second line of text
    pub fn info_with_description(&mut self, title: impl Into<String>, description: impl Into<String>) {
        self.push(ToastKind::Info, title.into(), Some(description.into()));
    }

    fn push(&mut self, kind: ToastKind, title: String, description: Option<String>) {
        self.toasts.push(Toast {
            kind,
            title,
            description,
            created_at: None,
        });
        if self.toasts.len() > MAX_TOASTS {
            self.toasts.remove(0);
        }
    }

    /// Advance the clock and drop expired toasts
    pub fn tick(&mut self, now: f64) {
        self.toasts.retain_mut(|toast| {
            let created_at = *toast.created_at.get_or_insert(now);
            now - created_at < TOAST_LIFETIME
        });
    }

    pub fn visible(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Draw the toasts and schedule a repaint for their expiry
    pub fn show(&mut self, ctx: &egui::Context) {
        self.tick(ctx.input(|i| i.time));
        if self.toasts.is_empty() {
            return;
        }

        egui::Area::new(egui::Id::new("toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -16.0))
            .order(egui::Order::Tooltip)
            .interactable(false)
            .show(ctx, |ui| {
                ui.set_max_width(320.0);
                for toast in &self.toasts {
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, toast.kind.accent()))
                        .show(ui, |ui| {
                            ui.label(egui::RichText::new(&toast.title).strong());
                            if let Some(description) = &toast.description {
                                ui.label(egui::RichText::new(description).small());
                            }
                        });
                    ui.add_space(6.0);
                }
            });

        ctx.request_repaint_after(std::time::Duration::from_millis(250));
    }
}
