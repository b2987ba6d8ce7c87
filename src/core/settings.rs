//! Reading settings and their persistence

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Key under which the settings record is stored
pub const SETTINGS_KEY: &str = "markdown-theme";

/// Smallest font size the reader accepts, in pixels
pub const MIN_FONT_SIZE: u32 = 12;

const LETTER_SPACING_RANGE: (f32, f32) = (-2.0, 10.0);
const LETTER_SPACING_STEP: f32 = 0.5;
const LINE_HEIGHT_RANGE: (f32, f32) = (1.0, 3.0);
const LINE_HEIGHT_STEP: f32 = 0.1;

/// Font style of rendered text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontFamily {
    #[default]
    Sans,
    Serif,
    Mono,
    Display,
}

impl FontFamily {
    pub const ALL: [FontFamily; 4] = [Self::Sans, Self::Serif, Self::Mono, Self::Display];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sans => "Sans Serif",
            Self::Serif => "Serif",
            Self::Mono => "Monospace",
            Self::Display => "Display",
        }
    }

    /// CSS font stack used in exported documents
    pub fn css_stack(self) -> &'static str {
        match self {
            Self::Sans => "Helvetica, Arial, sans-serif",
            Self::Serif => "Georgia, 'Times New Roman', serif",
            Self::Mono => "'Courier New', monospace",
            Self::Display => "'Trebuchet MS', Helvetica, sans-serif",
        }
    }
}

/// Page color scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    #[default]
    White,
    Dark,
    Cream,
}

impl Background {
    pub const ALL: [Background; 3] = [Self::White, Self::Dark, Self::Cream];

    pub fn label(self) -> &'static str {
        match self {
            Self::White => "White",
            Self::Dark => "Dark",
            Self::Cream => "Cream",
        }
    }

    /// Page background as RGB
    pub fn background_rgb(self) -> [u8; 3] {
        match self {
            Self::White => [0xff, 0xff, 0xff],
            Self::Dark => [0x12, 0x12, 0x12],
            Self::Cream => [0xfe, 0xf7, 0xcd],
        }
    }

    /// Text color as RGB
    pub fn text_rgb(self) -> [u8; 3] {
        match self {
            Self::Dark => [0xff, 0xff, 0xff],
            Self::White | Self::Cream => [0x00, 0x00, 0x00],
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}

/// CSS-style font weight, restricted to the steps the reader offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct FontWeight(u16);

impl FontWeight {
    pub const LADDER: [u16; 5] = [300, 400, 500, 600, 700];
    pub const LIGHT: FontWeight = FontWeight(300);
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    pub fn value(self) -> u16 {
        self.0
    }

    /// Closest weight on the ladder, ties going to the lighter one
    pub fn nearest(value: f64) -> Self {
        let closest = Self::LADDER
            .iter()
            .copied()
            .min_by(|a, b| {
                (f64::from(*a) - value)
                    .abs()
                    .total_cmp(&(f64::from(*b) - value).abs())
            })
            .unwrap_or(Self::NORMAL.0);
        Self(closest)
    }

    pub fn is_bold(self) -> bool {
        self.0 >= 600
    }

    fn position(self) -> usize {
        Self::LADDER.iter().position(|w| *w == self.0).unwrap_or(1)
    }

    /// Next heavier weight, saturating at 700
    pub fn heavier(self) -> Self {
        let idx = (self.position() + 1).min(Self::LADDER.len() - 1);
        Self(Self::LADDER[idx])
    }

    /// Next lighter weight, saturating at 300
    pub fn lighter(self) -> Self {
        Self(Self::LADDER[self.position().saturating_sub(1)])
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<u16> for FontWeight {
    type Error = String;

    fn try_from(value: u16) -> std::result::Result<Self, Self::Error> {
        if Self::LADDER.contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!("unsupported font weight: {value}"))
        }
    }
}

impl From<FontWeight> for u16 {
    fn from(weight: FontWeight) -> Self {
        weight.0
    }
}

/// Intensity bucket of the blue light filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlueLightLevel {
    Off,
    Low,
    Medium,
    High,
}

/// Presentation settings of the reader.
///
/// Constructed explicitly and handed to whatever renders or exports the
/// document; nothing reads it from global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReaderSettings {
    /// Font size in pixels
    pub font_size: u32,
    pub font_family: FontFamily,
    #[serde(rename = "backgroundColor")]
    pub background: Background,
    /// Warm tint strength, 0.0 (off) to 1.0
    pub blue_light_filter: f32,
    #[serde(deserialize_with = "lenient_font_weight")]
    pub font_weight: FontWeight,
    /// Extra space between characters in pixels
    pub letter_spacing: f32,
    /// Line height as a multiple of the font size
    pub line_height: f32,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            font_size: 16,
            font_family: FontFamily::Sans,
            background: Background::White,
            blue_light_filter: 0.0,
            font_weight: FontWeight::NORMAL,
            letter_spacing: 0.0,
            line_height: 1.5,
        }
    }
}

impl ReaderSettings {
    /// Set the font size; values below the minimum are ignored
    pub fn set_font_size(&mut self, size: u32) {
        if size >= MIN_FONT_SIZE {
            self.font_size = size;
        }
    }

    pub fn increase_font_size(&mut self) {
        self.font_size = self.font_size.saturating_add(1);
    }

    pub fn decrease_font_size(&mut self) {
        if self.font_size > MIN_FONT_SIZE {
            self.font_size -= 1;
        }
    }

    pub fn increase_font_weight(&mut self) {
        self.font_weight = self.font_weight.heavier();
    }

    pub fn decrease_font_weight(&mut self) {
        self.font_weight = self.font_weight.lighter();
    }

    pub fn increase_letter_spacing(&mut self) {
        self.letter_spacing = step(self.letter_spacing, LETTER_SPACING_STEP, LETTER_SPACING_RANGE);
    }

    pub fn decrease_letter_spacing(&mut self) {
        self.letter_spacing = step(self.letter_spacing, -LETTER_SPACING_STEP, LETTER_SPACING_RANGE);
    }

    pub fn increase_line_height(&mut self) {
        self.line_height = step(self.line_height, LINE_HEIGHT_STEP, LINE_HEIGHT_RANGE);
    }

    pub fn decrease_line_height(&mut self) {
        self.line_height = step(self.line_height, -LINE_HEIGHT_STEP, LINE_HEIGHT_RANGE);
    }

    pub fn set_blue_light_filter(&mut self, intensity: f32) {
        self.blue_light_filter = if intensity.is_nan() {
            0.0
        } else {
            intensity.clamp(0.0, 1.0)
        };
    }

    pub fn blue_light_level(&self) -> BlueLightLevel {
        match self.blue_light_filter {
            i if i <= 0.0 => BlueLightLevel::Off,
            i if i < 0.3 => BlueLightLevel::Low,
            i if i < 0.7 => BlueLightLevel::Medium,
            _ => BlueLightLevel::High,
        }
    }

    pub fn can_decrease_font_size(&self) -> bool {
        self.font_size > MIN_FONT_SIZE
    }

    pub fn can_decrease_letter_spacing(&self) -> bool {
        self.letter_spacing > LETTER_SPACING_RANGE.0
    }

    pub fn can_increase_letter_spacing(&self) -> bool {
        self.letter_spacing < LETTER_SPACING_RANGE.1
    }

    pub fn can_decrease_line_height(&self) -> bool {
        self.line_height > LINE_HEIGHT_RANGE.0
    }

    pub fn can_increase_line_height(&self) -> bool {
        self.line_height < LINE_HEIGHT_RANGE.1
    }

    /// Bring values edited by hand back into their allowed ranges
    pub fn sanitized(mut self) -> Self {
        self.font_size = self.font_size.max(MIN_FONT_SIZE);
        self.set_blue_light_filter(self.blue_light_filter);
        self.letter_spacing = clamp_finite(self.letter_spacing, LETTER_SPACING_RANGE, 0.0);
        self.line_height = clamp_finite(self.line_height, LINE_HEIGHT_RANGE, 1.5);
        self
    }

    /// Load settings from a store, falling back to defaults
    pub fn load_from(store: &dyn SettingsStore) -> Self {
        match store.load(SETTINGS_KEY) {
            Ok(Some(json)) => match serde_json::from_str::<Self>(&json) {
                Ok(settings) => settings.sanitized(),
                Err(e) => {
                    tracing::error!("Error loading settings, using defaults: {}", e);
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::error!("Error reading settings store, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Persist settings to a store
    pub fn save_to(&self, store: &dyn SettingsStore) -> Result<()> {
        let json = serde_json::to_string(self)?;
        store.save(SETTINGS_KEY, &json)
    }
}

/// Off-ladder numbers snap to the nearest weight, anything else is normal
fn lenient_font_weight<'de, D>(deserializer: D) -> std::result::Result<FontWeight, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value.as_f64() {
        Some(weight) if weight.is_finite() => FontWeight::nearest(weight),
        _ => FontWeight::NORMAL,
    })
}

fn step(value: f32, delta: f32, (min, max): (f32, f32)) -> f32 {
    // Round to one decimal so repeated steps don't drift
    (((value + delta) * 10.0).round() / 10.0).clamp(min, max)
}

fn clamp_finite(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Flat key-value storage for persisted settings
pub trait SettingsStore {
    /// Read the value stored under `key`, if any
    fn load(&self, key: &str) -> Result<Option<String>>;
    /// Store `value` under `key`, replacing any previous value
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Stores each key as a JSON file in a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted in the platform config directory
    pub fn platform() -> Result<Self> {
        let dirs = ProjectDirs::from("com", "markdown-viewer", "Markdown Viewer")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(Self::new(dirs.config_dir()))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        Ok(Some(content))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let path = self.path_for(key);
        std::fs::write(&path, value)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;

        tracing::info!("Saved settings to: {}", path.display());
        Ok(())
    }
}

/// In-memory store, used when no config directory is available
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

impl SettingsStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("settings store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = ReaderSettings::default();
        assert_eq!(settings.font_size, 16);
        assert_eq!(settings.font_family, FontFamily::Sans);
        assert_eq!(settings.background, Background::White);
        assert_eq!(settings.font_weight.value(), 400);
        assert_eq!(settings.letter_spacing, 0.0);
        assert_eq!(settings.line_height, 1.5);
        assert_eq!(settings.blue_light_level(), BlueLightLevel::Off);
    }

    #[test]
    fn test_font_size_floor() {
        let mut settings = ReaderSettings::default();
        settings.set_font_size(11);
        assert_eq!(settings.font_size, 16);
        settings.set_font_size(12);
        settings.decrease_font_size();
        assert_eq!(settings.font_size, MIN_FONT_SIZE);
        assert!(!settings.can_decrease_font_size());
        settings.increase_font_size();
        assert_eq!(settings.font_size, 13);
    }

    #[test]
    fn test_font_weight_ladder_saturates() {
        let mut settings = ReaderSettings::default();
        for _ in 0..10 {
            settings.increase_font_weight();
        }
        assert_eq!(settings.font_weight, FontWeight::BOLD);
        for _ in 0..10 {
            settings.decrease_font_weight();
        }
        assert_eq!(settings.font_weight, FontWeight::LIGHT);
        settings.increase_font_weight();
        assert_eq!(settings.font_weight.value(), 400);
    }

    #[test]
    fn test_spacing_and_line_height_clamp() {
        let mut settings = ReaderSettings::default();
        for _ in 0..40 {
            settings.increase_letter_spacing();
            settings.increase_line_height();
        }
        assert_eq!(settings.letter_spacing, 10.0);
        assert_eq!(settings.line_height, 3.0);
        assert!(!settings.can_increase_letter_spacing());
        assert!(!settings.can_increase_line_height());
        assert!(settings.can_decrease_letter_spacing());
        assert!(settings.can_decrease_line_height());

        for _ in 0..60 {
            settings.decrease_letter_spacing();
            settings.decrease_line_height();
        }
        assert_eq!(settings.letter_spacing, -2.0);
        assert_eq!(settings.line_height, 1.0);
        assert!(!settings.can_decrease_letter_spacing());
        assert!(!settings.can_decrease_line_height());
        assert!(settings.can_increase_letter_spacing());
        assert!(settings.can_increase_line_height());
    }

    #[test]
    fn test_line_height_steps_do_not_drift() {
        let mut settings = ReaderSettings::default();
        settings.increase_line_height();
        settings.increase_line_height();
        settings.decrease_line_height();
        assert_eq!(settings.line_height, 1.6);
    }

    #[test]
    fn test_blue_light_levels() {
        let mut settings = ReaderSettings::default();
        settings.set_blue_light_filter(0.2);
        assert_eq!(settings.blue_light_level(), BlueLightLevel::Low);
        settings.set_blue_light_filter(0.5);
        assert_eq!(settings.blue_light_level(), BlueLightLevel::Medium);
        settings.set_blue_light_filter(4.0);
        assert_eq!(settings.blue_light_filter, 1.0);
        assert_eq!(settings.blue_light_level(), BlueLightLevel::High);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let settings: ReaderSettings =
            serde_json::from_str(r#"{"fontSize": 20, "backgroundColor": "cream"}"#).unwrap();
        assert_eq!(settings.font_size, 20);
        assert_eq!(settings.background, Background::Cream);
        assert_eq!(settings.line_height, 1.5);
        assert_eq!(settings.font_family, FontFamily::Sans);
    }

    #[test]
    fn test_off_ladder_weight_keeps_other_fields() {
        let store = MemoryStore::default();
        store
            .save(SETTINGS_KEY, r#"{"fontSize": 20, "fontWeight": 450, "backgroundColor": "dark"}"#)
            .unwrap();
        let settings = ReaderSettings::load_from(&store);
        assert_eq!(settings.font_size, 20);
        assert_eq!(settings.background, Background::Dark);
        assert_eq!(settings.font_weight.value(), 400);

        let heavy: ReaderSettings = serde_json::from_str(r#"{"fontWeight": 680}"#).unwrap();
        assert_eq!(heavy.font_weight, FontWeight::BOLD);
        let odd: ReaderSettings = serde_json::from_str(r#"{"fontWeight": "bold"}"#).unwrap();
        assert_eq!(odd.font_weight, FontWeight::NORMAL);
    }

    #[test]
    fn test_store_round_trip() {
        let store = MemoryStore::default();
        let mut settings = ReaderSettings::default();
        settings.background = Background::Dark;
        settings.font_family = FontFamily::Mono;
        settings.increase_font_weight();
        settings.save_to(&store).unwrap();

        assert_eq!(ReaderSettings::load_from(&store), settings);
    }

    #[test]
    fn test_corrupt_record_falls_back_to_defaults() {
        let store = MemoryStore::default();
        store.save(SETTINGS_KEY, "{not json").unwrap();
        assert_eq!(ReaderSettings::load_from(&store), ReaderSettings::default());
    }

    #[test]
    fn test_out_of_range_record_is_sanitized() {
        let store = MemoryStore::default();
        store
            .save(SETTINGS_KEY, r#"{"fontSize": 4, "lineHeight": 9.0, "blueLightFilter": -1}"#)
            .unwrap();
        let settings = ReaderSettings::load_from(&store);
        assert_eq!(settings.font_size, MIN_FONT_SIZE);
        assert_eq!(settings.line_height, 3.0);
        assert_eq!(settings.blue_light_filter, 0.0);
    }

    #[test]
    fn test_json_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested"));
        assert!(store.load(SETTINGS_KEY).unwrap().is_none());

        store.save(SETTINGS_KEY, "{}").unwrap();
        assert_eq!(store.load(SETTINGS_KEY).unwrap().as_deref(), Some("{}"));
        assert!(dir.path().join("nested/markdown-theme.json").exists());
    }
}
