use crate::draw::model::{
    clamp_eraser_width, Color, DEFAULT_BRUSH_WIDTH, DEFAULT_ERASER_WIDTH, SWATCHES,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Overrides [`Settings::api_url`] when set and non-empty.
pub const API_URL_ENV: &str = "MATH_CANVAS_API_URL";

pub const DEFAULT_API_URL: &str = "http://localhost:8900";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Base URL of the recognition service; `/calculate` is appended.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file that receives a copy of the log output.
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_brush_width")]
    pub brush_width: u32,
    /// Clamped to 1..=50 when applied.
    #[serde(default = "default_eraser_width")]
    pub eraser_width: u32,
    #[serde(default = "default_brush_color")]
    pub brush_color: Color,
    #[serde(default = "default_swatches")]
    pub swatches: Vec<Color>,
    /// Delay between consecutive result labels of one response.
    #[serde(default = "default_label_stagger_ms")]
    pub label_stagger_ms: u64,
    /// Wipe the sketch once its results are shown.
    #[serde(default = "default_true")]
    pub clear_ink_on_result: bool,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_true")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
    /// Initial window size. If absent, a default size is used.
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_brush_width() -> u32 {
    DEFAULT_BRUSH_WIDTH
}

fn default_eraser_width() -> u32 {
    DEFAULT_ERASER_WIDTH
}

fn default_brush_color() -> Color {
    Color::WHITE
}

fn default_swatches() -> Vec<Color> {
    SWATCHES.to_vec()
}

fn default_label_stagger_ms() -> u64 {
    200
}

fn default_true() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            debug_logging: false,
            log_file: None,
            brush_width: default_brush_width(),
            eraser_width: default_eraser_width(),
            brush_color: default_brush_color(),
            swatches: default_swatches(),
            label_stagger_ms: default_label_stagger_ms(),
            clear_ink_on_result: true,
            enable_toasts: true,
            toast_duration: default_toast_duration(),
            window_size: None,
        }
    }
}

impl Settings {
    /// Load settings from `path`. A missing or empty file yields the defaults.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut settings: Settings = serde_json::from_str(&content)?;
        settings.eraser_width = clamp_eraser_width(settings.eraser_width);
        Ok(settings)
    }

    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Apply [`API_URL_ENV`] on top of the file values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            let url = url.trim();
            if !url.is_empty() {
                tracing::debug!(api_url = url, "api url taken from environment");
                self.api_url = url.to_string();
            }
        }
    }

    pub fn label_stagger(&self) -> Duration {
        Duration::from_millis(self.label_stagger_ms)
    }
}
