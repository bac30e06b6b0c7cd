//! User settings for Styledown
//!
//! Everything here is optional on disk: missing fields take their defaults
//! and out-of-range values are clamped by `sanitize` after loading.

use crate::markdown::MarkdownOptions;
use crate::style::StyleSheet;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Stock Stylesheet Choice
// ─────────────────────────────────────────────────────────────────────────────

/// Built-in stylesheet to start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StockStylesheet {
    #[default]
    Default,
    DarkMode,
}

impl StockStylesheet {
    pub fn sheet(&self) -> StyleSheet {
        match self {
            StockStylesheet::Default => StyleSheet::default_sheet(),
            StockStylesheet::DarkMode => StyleSheet::dark_mode(),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            StockStylesheet::Default => "Default",
            StockStylesheet::DarkMode => "Dark Mode",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Quiet period after a source edit before the preview re-renders
    pub rerender_debounce_ms: u64,
    /// Markdown extensions passed to the parser
    pub markdown: MarkdownOptions,
    /// Stock stylesheet used when no custom one is configured
    pub stylesheet: StockStylesheet,
    /// Custom stylesheet JSON imported at startup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stylesheet_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rerender_debounce_ms: Self::DEFAULT_DEBOUNCE_MS,
            markdown: MarkdownOptions::default(),
            stylesheet: StockStylesheet::default(),
            stylesheet_path: None,
        }
    }
}

impl Settings {
    pub const DEFAULT_DEBOUNCE_MS: u64 = 200;
    pub const MAX_DEBOUNCE_MS: u64 = 5000;

    /// Clamp values loaded from disk into their valid ranges.
    pub fn sanitize(&mut self) {
        self.rerender_debounce_ms = self.rerender_debounce_ms.min(Self::MAX_DEBOUNCE_MS);
        if self
            .stylesheet_path
            .as_ref()
            .is_some_and(|p| p.as_os_str().is_empty())
        {
            self.stylesheet_path = None;
        }
    }

    /// Deserialize from JSON and sanitize.
    pub fn from_json_sanitized(json: &str) -> Result<Self, serde_json::Error> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn rerender_debounce(&self) -> Duration {
        Duration::from_millis(self.rerender_debounce_ms)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{DARK_MODE_SHEET_ID, DEFAULT_SHEET_ID};

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.rerender_debounce_ms, 200);
        assert_eq!(settings.rerender_debounce(), Duration::from_millis(200));
        assert!(settings.markdown.tables);
        assert_eq!(settings.stylesheet, StockStylesheet::Default);
        assert!(settings.stylesheet_path.is_none());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let settings = Settings::from_json_sanitized(r#"{"stylesheet": "darkMode"}"#).unwrap();
        assert_eq!(settings.stylesheet, StockStylesheet::DarkMode);
        assert_eq!(settings.rerender_debounce_ms, Settings::DEFAULT_DEBOUNCE_MS);
        assert!(settings.markdown.strikethrough);
    }

    #[test]
    fn test_nested_markdown_options() {
        let settings = Settings::from_json_sanitized(r#"{"markdown": {"tables": false}}"#).unwrap();
        assert!(!settings.markdown.tables);
        assert!(settings.markdown.tasklist);
    }

    #[test]
    fn test_sanitize_clamps_debounce() {
        let settings = Settings::from_json_sanitized(r#"{"rerender_debounce_ms": 60000}"#).unwrap();
        assert_eq!(settings.rerender_debounce_ms, Settings::MAX_DEBOUNCE_MS);
    }

    #[test]
    fn test_sanitize_drops_empty_stylesheet_path() {
        let settings = Settings::from_json_sanitized(r#"{"stylesheet_path": ""}"#).unwrap();
        assert!(settings.stylesheet_path.is_none());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let settings = Settings::from_json_sanitized(r#"{"theme": "dark", "rerender_debounce_ms": 50}"#).unwrap();
        assert_eq!(settings.rerender_debounce_ms, 50);
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        assert!(Settings::from_json_sanitized(r#"{"rerender_debounce_ms": "soon"}"#).is_err());
        assert!(Settings::from_json_sanitized(r#"{"rerender_debounce_ms": -5}"#).is_err());
    }

    #[test]
    fn test_stock_sheet_selection() {
        assert_eq!(StockStylesheet::Default.sheet().id, DEFAULT_SHEET_ID);
        assert_eq!(StockStylesheet::DarkMode.sheet().id, DARK_MODE_SHEET_ID);
        assert_eq!(StockStylesheet::DarkMode.display_name(), "Dark Mode");
    }

    #[test]
    fn test_roundtrip() {
        let settings = Settings {
            rerender_debounce_ms: 350,
            stylesheet: StockStylesheet::DarkMode,
            stylesheet_path: Some(PathBuf::from("/tmp/sheet.json")),
            ..Settings::default()
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        assert_eq!(Settings::from_json_sanitized(&json).unwrap(), settings);
    }
}
