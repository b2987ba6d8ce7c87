//! Main application state and UI coordination

use std::path::Path;

use eframe::egui;

use crate::core::converter;
use crate::core::document::Document;
use crate::core::export::{self, ExportFormat};
use crate::core::extract::{self, ExtractError};
use crate::core::settings::{JsonFileStore, MemoryStore, ReaderSettings, SettingsStore};
use crate::ui::{
    control_panel::ControlPanel, convert::ConvertPanel, editor::EditorPanel, home::HomePanel,
    preview::PreviewPanel, theme, toast::Toasts,
};

/// Top-level page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Viewer,
    Convert,
}

/// View mode of the viewer page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Edit,
    Preview,
}

/// State of the convert page
#[derive(Debug, Default)]
pub struct ConvertState {
    /// Text to convert, typed or extracted from an upload
    pub input: String,
    /// Markdown produced by the last conversion
    pub output: String,
    /// Whether `output` holds a conversion result and may be edited
    pub converted: bool,
}

/// Main application state
pub struct ViewerApp {
    /// Currently shown page
    pub page: Page,
    /// Edit or preview on the viewer page
    pub view_mode: ViewMode,
    /// Reading settings applied to the UI and exports
    pub settings: ReaderSettings,
    /// Where the settings are persisted
    store: Box<dyn SettingsStore>,
    /// Whether the style must be rebuilt from the settings
    theme_dirty: bool,
    /// Document of the viewer page
    pub document: Document,
    /// Convert page state
    pub convert: ConvertState,
    /// Whether the reading settings window is open
    pub settings_open: bool,
    /// Visible notifications
    pub toasts: Toasts,
    /// Whether the viewer welcome toast was shown
    welcomed: bool,
    /// Commonmark cache for preview
    pub commonmark_cache: egui_commonmark::CommonMarkCache,
}

impl ViewerApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let store: Box<dyn SettingsStore> = match JsonFileStore::platform() {
            Ok(store) => Box::new(store),
            Err(e) => {
                tracing::error!("Settings will not be persisted: {}", e);
                Box::new(MemoryStore::default())
            }
        };

        Self::with_store(store)
    }

    /// Create the application state around a settings store
    pub fn with_store(store: Box<dyn SettingsStore>) -> Self {
        let settings = ReaderSettings::load_from(store.as_ref());
        tracing::info!(
            font_size = settings.font_size,
            background = settings.background.label(),
            "Loaded reading settings"
        );

        Self {
            page: Page::default(),
            view_mode: ViewMode::default(),
            settings,
            store,
            theme_dirty: true,
            document: Document::welcome(),
            convert: ConvertState::default(),
            settings_open: false,
            toasts: Toasts::default(),
            welcomed: false,
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
        }
    }

    /// Switch page
    pub fn open_page(&mut self, page: Page) {
        if page == Page::Viewer && !self.welcomed {
            self.toasts.info_with_description(
                "Preview & Edit Markdown",
                "Customize your viewing experience using the settings button.",
            );
            self.welcomed = true;
        }
        self.page = page;
    }

    /// Persist the settings after a change and restyle on the next frame
    pub fn settings_changed(&mut self) {
        self.theme_dirty = true;
        if let Err(e) = self.settings.save_to(self.store.as_ref()) {
            tracing::error!("Error saving settings: {:#}", e);
            self.toasts.error("Could not save reading settings");
        }
    }

    /// Save the viewer document, asking for a path if it has none
    pub fn save_document(&mut self) {
        let result = match self.document.path.clone() {
            Some(_) => self.document.save(),
            None => match rfd::FileDialog::new()
                .add_filter("Markdown", &["md", "markdown"])
                .set_file_name("document.md")
                .save_file()
            {
                Some(path) => self.document.save_as(&path),
                None => return,
            },
        };

        match result {
            Ok(()) => self.toasts.success("Document saved"),
            Err(e) => {
                tracing::error!("Failed to save document: {:#}", e);
                self.toasts.error("Failed to save document");
            }
        }
    }

    /// Open a markdown file into the viewer
    pub fn open_document(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Markdown", &["md", "markdown", "txt"])
            .pick_file()
        else {
            return;
        };

        match Document::open(&path) {
            Ok(doc) => {
                self.document = doc;
                self.open_page(Page::Viewer);
            }
            Err(e) => {
                tracing::error!("Failed to open document: {:#}", e);
                self.toasts.error("Failed to open document");
            }
        }
    }

    /// Put text on the clipboard and confirm it
    pub fn copy_to_clipboard(&mut self, ctx: &egui::Context, text: String, message: &str) {
        ctx.copy_text(text);
        self.toasts.success(message);
    }

    /// Ask for a destination and export `markdown` in `format`
    pub fn export(&mut self, format: ExportFormat, markdown: &str) {
        if markdown.trim().is_empty() {
            self.toasts.error(export::ExportError::NothingToExport.to_string());
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter(format.label(), &[format.extension()])
            .set_file_name(format.default_file_name())
            .save_file()
        else {
            return;
        };

        if format == ExportFormat::Pdf {
            self.toasts.info("Generating PDF...");
        }

        match export::write(format, markdown, &self.settings, &path) {
            Ok(()) => self.toasts.success(match format {
                ExportFormat::Markdown => "Markdown file downloaded".to_string(),
                _ => format!("Downloaded as {}", format.label()),
            }),
            Err(e) => {
                tracing::error!("Export to {} failed: {}", path.display(), e);
                self.toasts.error(match format {
                    ExportFormat::Pdf => {
                        "Failed to generate PDF. Try with smaller content or different settings."
                            .to_string()
                    }
                    _ => e.to_string(),
                });
            }
        }
    }

    /// Pick a document, extract its text and convert it
    pub fn upload_document(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Documents", &extract::UPLOAD_EXTENSIONS)
            .pick_file()
        else {
            return;
        };
        self.load_upload(&path);
    }

    /// Extract an uploaded file into the convert input
    pub fn load_upload(&mut self, path: &Path) {
        match extract::extract_file(path) {
            Ok(text) => {
                self.convert.input = text;
                self.run_conversion();
            }
            Err(e @ ExtractError::PdfRequiresPaste) => self.toasts.info(e.to_string()),
            Err(e @ ExtractError::Unsupported(_)) => self.toasts.error(e.to_string()),
            Err(e) => {
                tracing::error!("Error processing file {}: {}", path.display(), e);
                self.toasts.error("Error processing file. Please try again.");
            }
        }
    }

    /// Convert the convert page input to markdown
    pub fn run_conversion(&mut self) {
        if self.convert.input.trim().is_empty() {
            self.toasts.error("Please enter document content first");
            return;
        }

        self.convert.output = converter::convert(&self.convert.input);
        self.convert.converted = true;
        tracing::info!(
            input_len = self.convert.input.len(),
            output_len = self.convert.output.len(),
            "Converted document to markdown"
        );
        self.toasts.success("Document converted to Markdown format");
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open...").clicked() {
                        self.open_document();
                        ui.close();
                    }
                    if ui.button("Save").clicked() {
                        self.save_document();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.separator();
                if ui.selectable_label(self.page == Page::Home, "Home").clicked() {
                    self.open_page(Page::Home);
                }
                if ui.selectable_label(self.page == Page::Viewer, "Viewer").clicked() {
                    self.open_page(Page::Viewer);
                }
                if ui.selectable_label(self.page == Page::Convert, "Convert").clicked() {
                    self.open_page(Page::Convert);
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.selectable_label(self.settings_open, "⚙ Settings").clicked() {
                        self.settings_open = !self.settings_open;
                    }
                });
            });
        });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.theme_dirty {
            theme::apply(ctx, &self.settings);
            self.theme_dirty = false;
        }

        // Handle keyboard shortcuts
        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::S)) && self.page == Page::Viewer {
            self.save_document();
        }

        // Render menu bar
        self.render_menu_bar(ctx);

        // Render main content area
        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Home => HomePanel::show(ui, self),
            Page::Viewer => match self.view_mode {
                ViewMode::Edit => EditorPanel::show(ui, self),
                ViewMode::Preview => PreviewPanel::show(ui, self),
            },
            Page::Convert => ConvertPanel::show(ui, self),
        });

        if self.settings_open {
            ControlPanel::show(ctx, self);
        }

        self.toasts.show(ctx);
        theme::paint_filter(ctx, &self.settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> ViewerApp {
        ViewerApp::with_store(Box::new(MemoryStore::default()))
    }

    #[test]
    fn test_starts_on_home_with_welcome_document() {
        let app = app();
        assert_eq!(app.page, Page::Home);
        assert_eq!(app.view_mode, ViewMode::Edit);
        assert_eq!(app.document.title(), "Welcome to the Markdown Viewer");
    }

    #[test]
    fn test_welcome_toast_once() {
        let mut app = app();
        app.open_page(Page::Viewer);
        app.open_page(Page::Home);
        app.open_page(Page::Viewer);
        assert_eq!(app.toasts.visible().len(), 1);
    }

    #[test]
    fn test_conversion_requires_content() {
        let mut app = app();
        app.convert.input = "   ".to_string();
        app.run_conversion();
        assert!(!app.convert.converted);
        assert_eq!(app.toasts.visible()[0].title, "Please enter document content first");

        app.convert.input = "* one\n* two\n".to_string();
        app.run_conversion();
        assert!(app.convert.converted);
        assert_eq!(app.convert.output, "- one\n- two\n");
    }

    #[test]
    fn test_settings_are_persisted() {
        let mut app = app();
        app.settings.increase_font_size();
        app.settings_changed();

        let reloaded = ReaderSettings::load_from(app.store.as_ref());
        assert_eq!(reloaded.font_size, app.settings.font_size);
    }

    #[test]
    fn test_upload_plain_text_converts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Visit https://example.com today.\n").unwrap();

        let mut app = app();
        app.load_upload(&path);
        assert!(app.convert.converted);
        assert!(app.convert.output.contains("[https://example.com](https://example.com)"));
    }

    #[test]
    fn test_upload_pdf_asks_for_paste() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        let mut app = app();
        app.load_upload(&path);
        assert!(!app.convert.converted);
        assert!(app.toasts.visible()[0].title.starts_with("PDF conversion requires"));
    }
}
