//! Named style sheets and their JSON wire format
//!
//! A `StyleSheet` holds sparse overrides per element type. Resolution layers
//! the override over the built-in default, so an empty sheet renders exactly
//! like the built-in look.

use super::defaults::builtin_style;
use super::element_style::{Color, ElementStyle, FontWeight};
use super::element_type::MarkupElementType;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Fixed identity of the stock "Default" sheet.
pub const DEFAULT_SHEET_ID: Uuid = Uuid::from_u128(1);

/// Fixed identity of the stock "Dark Mode" sheet.
pub const DARK_MODE_SHEET_ID: Uuid = Uuid::from_u128(2);

// ─────────────────────────────────────────────────────────────────────────────
// StyleSheet
// ─────────────────────────────────────────────────────────────────────────────

/// A named, shareable collection of element style overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleSheet {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601")]
    pub modified_at: DateTime<Utc>,
    #[serde(default)]
    pub styles: BTreeMap<MarkupElementType, ElementStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_background_color: Option<Color>,
}

impl Default for StyleSheet {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl StyleSheet {
    /// A fresh sheet with a random id and no overrides.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            author: None,
            description: None,
            created_at: now,
            modified_at: now,
            styles: BTreeMap::new(),
            page_background_color: None,
        }
    }

    /// Built-in default merged with this sheet's override, override winning.
    pub fn resolved_style(&self, element_type: MarkupElementType) -> ElementStyle {
        let base = builtin_style(element_type);
        match self.styles.get(&element_type) {
            Some(custom) => base.merge(custom),
            None => base,
        }
    }

    /// Replace the override for `element_type`.
    pub fn set_style(&mut self, style: ElementStyle, element_type: MarkupElementType) {
        self.styles.insert(element_type, style);
        self.modified_at = Utc::now();
    }

    /// Drop the override for `element_type`, reverting it to the built-in default.
    pub fn remove_style(&mut self, element_type: MarkupElementType) {
        self.styles.remove(&element_type);
        self.modified_at = Utc::now();
    }

    /// Clamp every override in place.
    pub fn validate_styles(&mut self) {
        for style in self.styles.values_mut() {
            *style = style.validated();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // JSON
    // ─────────────────────────────────────────────────────────────────────────

    /// Pretty-printed JSON with lexicographically sorted keys.
    pub fn to_json_pretty(&self) -> Result<String> {
        // Round-tripping through `Value` sorts object keys (serde_json's map
        // is a BTreeMap without the preserve_order feature).
        let value = serde_json::to_value(self).map_err(Error::stylesheet)?;
        serde_json::to_string_pretty(&value).map_err(Error::stylesheet)
    }

    /// Decode a sheet exactly as stored, keeping its id.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::stylesheet)
    }

    /// Decode a sheet from untrusted JSON: a new id is assigned and every
    /// style is clamped to its safe range.
    pub fn import_json(json: &str) -> Result<Self> {
        let mut sheet = Self::from_json(json)?;
        sheet.id = Uuid::new_v4();
        sheet.validate_styles();
        debug!(
            "Imported stylesheet '{}' with {} override(s)",
            sheet.name,
            sheet.styles.len()
        );
        Ok(sheet)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Stock Sheets
    // ─────────────────────────────────────────────────────────────────────────

    /// The stock sheet with no overrides.
    pub fn default_sheet() -> Self {
        Self {
            id: DEFAULT_SHEET_ID,
            description: Some("Built-in default styling".to_string()),
            page_background_color: Some(Color::WHITE),
            ..Self::new("Default")
        }
    }

    /// Light text on a dark background.
    pub fn dark_mode() -> Self {
        use MarkupElementType as T;

        let body = Color::rgb(0.82, 0.82, 0.85);
        let fg = |color: Color| ElementStyle {
            foreground_color: Some(color),
            ..Default::default()
        };
        let heading = |size: f64, weight: FontWeight, color: Color| ElementStyle {
            font_size: Some(size),
            font_weight: Some(weight),
            foreground_color: Some(color),
            ..Default::default()
        };

        let mut styles = BTreeMap::new();
        styles.insert(T::Heading1, heading(32.0, FontWeight::Bold, Color::rgb(0.95, 0.95, 0.97)));
        styles.insert(T::Heading2, heading(26.0, FontWeight::Bold, Color::rgb(0.9, 0.9, 0.95)));
        styles.insert(T::Heading3, heading(22.0, FontWeight::Semibold, Color::rgb(0.85, 0.85, 0.92)));
        styles.insert(T::Heading4, heading(18.0, FontWeight::Semibold, Color::rgb(0.8, 0.8, 0.88)));
        styles.insert(T::Heading5, heading(16.0, FontWeight::Medium, Color::rgb(0.78, 0.78, 0.85)));
        styles.insert(T::Heading6, heading(14.0, FontWeight::Medium, Color::rgb(0.6, 0.6, 0.68)));
        styles.insert(
            T::Paragraph,
            ElementStyle {
                font_size: Some(14.0),
                ..fg(body)
            },
        );
        styles.insert(
            T::BlockQuote,
            ElementStyle {
                font_size: Some(14.0),
                is_italic: Some(true),
                background_color: Some(Color::rgb(0.18, 0.18, 0.22)),
                border_color: Some(Color::rgb(0.4, 0.4, 0.5)),
                border_width: Some(3.0),
                ..fg(Color::rgb(0.65, 0.65, 0.72))
            },
        );
        styles.insert(
            T::CodeBlock,
            ElementStyle {
                font_size: Some(13.0),
                background_color: Some(Color::rgb(0.12, 0.12, 0.15)),
                corner_radius: Some(6.0),
                is_monospaced: Some(true),
                ..fg(Color::rgb(0.78, 0.85, 0.65))
            },
        );
        for ty in [T::OrderedList, T::UnorderedList, T::ListItem, T::TableRow, T::TableCell] {
            styles.insert(ty, fg(body));
        }
        styles.insert(T::ThematicBreak, fg(Color::rgb(0.35, 0.35, 0.4)));
        styles.insert(
            T::Table,
            ElementStyle {
                border_color: Some(Color::rgb(0.3, 0.3, 0.35)),
                ..fg(body)
            },
        );
        styles.insert(
            T::TableHeader,
            ElementStyle {
                font_weight: Some(FontWeight::Semibold),
                background_color: Some(Color::rgb(0.22, 0.22, 0.26)),
                ..fg(Color::rgb(0.9, 0.9, 0.95))
            },
        );
        styles.insert(
            T::InlineCode,
            ElementStyle {
                font_size: Some(13.0),
                background_color: Some(Color::rgb(0.18, 0.18, 0.22)),
                corner_radius: Some(3.0),
                is_monospaced: Some(true),
                ..fg(Color::rgb(0.9, 0.55, 0.6))
            },
        );
        styles.insert(T::Link, fg(Color::rgb(0.45, 0.65, 1.0)));
        styles.insert(T::Strikethrough, fg(Color::rgb(0.5, 0.5, 0.55)));

        Self {
            id: DARK_MODE_SHEET_ID,
            description: Some("Light text on a dark background".to_string()),
            styles,
            page_background_color: Some(Color::rgb(0.15, 0.15, 0.18)),
            ..Self::new("Dark Mode")
        }
    }

    /// Sheets that ship with the crate.
    pub fn stock() -> Vec<StyleSheet> {
        vec![Self::default_sheet(), Self::dark_mode()]
    }
}

/// Resolve the effective style of `element_type` under `sheet`.
pub fn resolve(element_type: MarkupElementType, sheet: &StyleSheet) -> ElementStyle {
    sheet.resolved_style(element_type)
}

// ─────────────────────────────────────────────────────────────────────────────
// ISO-8601 timestamps at second precision
// ─────────────────────────────────────────────────────────────────────────────

mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(D::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolved_style_merges_defaults_with_override() {
        let mut sheet = StyleSheet::default_sheet();
        let default_h1 = sheet.resolved_style(MarkupElementType::Heading1);
        assert_eq!(default_h1.font_size, Some(32.0));
        assert_eq!(default_h1.font_weight, Some(FontWeight::Bold));

        sheet.set_style(
            ElementStyle {
                font_size: Some(48.0),
                ..Default::default()
            },
            MarkupElementType::Heading1,
        );
        let resolved = resolve(MarkupElementType::Heading1, &sheet);
        assert_eq!(resolved.font_size, Some(48.0));
        assert_eq!(resolved.font_weight, Some(FontWeight::Bold));
    }

    #[test]
    fn test_set_and_remove_bump_modified_at() {
        let mut sheet = StyleSheet::new("Bumps");
        let before = sheet.modified_at;
        std::thread::sleep(std::time::Duration::from_millis(2));
        sheet.set_style(ElementStyle::empty(), MarkupElementType::Link);
        let after_set = sheet.modified_at;
        assert!(after_set > before);

        std::thread::sleep(std::time::Duration::from_millis(2));
        sheet.remove_style(MarkupElementType::Link);
        assert!(sheet.modified_at > after_set);
        assert!(sheet.styles.is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let mut sheet = StyleSheet::new("Test Sheet");
        sheet.author = Some("Tester".to_string());
        sheet.set_style(
            ElementStyle {
                font_size: Some(24.0),
                font_weight: Some(FontWeight::Bold),
                foreground_color: Some(Color::BLUE),
                ..Default::default()
            },
            MarkupElementType::Heading1,
        );
        sheet.set_style(
            ElementStyle {
                is_italic: Some(true),
                ..Default::default()
            },
            MarkupElementType::BlockQuote,
        );

        let json = sheet.to_json_pretty().unwrap();
        let decoded = StyleSheet::from_json(&json).unwrap();
        assert_eq!(decoded.id, sheet.id);
        assert_eq!(decoded.author.as_deref(), Some("Tester"));
        assert_eq!(decoded.styles.len(), 2);
        assert_eq!(decoded.styles[&MarkupElementType::Heading1].font_size, Some(24.0));
        assert_eq!(decoded.styles[&MarkupElementType::BlockQuote].is_italic, Some(true));
    }

    #[test]
    fn test_json_keys_sorted_and_dates_iso() {
        let sheet = StyleSheet::dark_mode();
        let json = sheet.to_json_pretty().unwrap();

        let created = json.find("\"createdAt\"").unwrap();
        let id = json.find("\"id\"").unwrap();
        let styles = json.find("\"styles\"").unwrap();
        assert!(created < id && id < styles);

        let block_quote = json.find("\"blockQuote\"").unwrap();
        let heading1 = json.find("\"heading1\"").unwrap();
        assert!(block_quote < heading1);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let stamp = value["createdAt"].as_str().unwrap();
        assert!(stamp.ends_with('Z'));
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
        assert_eq!(value["id"], "00000000-0000-0000-0000-000000000002");
    }

    #[test]
    fn test_import_assigns_new_id_and_clamps() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000001",
            "name": "Hostile",
            "createdAt": "2024-01-01T00:00:00Z",
            "modifiedAt": "2024-01-01T00:00:00Z",
            "styles": {
                "paragraph": { "fontSize": 500, "paddingTop": -40, "letterSpacing": 99 }
            }
        }"#;
        let sheet = StyleSheet::import_json(json).unwrap();
        assert_ne!(sheet.id, DEFAULT_SHEET_ID);
        let para = &sheet.styles[&MarkupElementType::Paragraph];
        assert_eq!(para.font_size, Some(200.0));
        assert_eq!(para.padding_top, Some(0.0));
        assert_eq!(para.letter_spacing, Some(50.0));
    }

    #[test]
    fn test_import_rejects_garbage() {
        assert!(matches!(
            StyleSheet::import_json("not json"),
            Err(Error::StylesheetParse { .. })
        ));
    }

    #[test]
    fn test_stock_sheets() {
        let default = StyleSheet::default_sheet();
        assert_eq!(default.id.to_string(), "00000000-0000-0000-0000-000000000001");
        assert!(default.styles.is_empty());
        assert_eq!(default.page_background_color, Some(Color::WHITE));

        let dark = StyleSheet::dark_mode();
        assert_eq!(dark.name, "Dark Mode");
        let para = dark.resolved_style(MarkupElementType::Paragraph);
        assert_eq!(para.foreground_color, Some(Color::rgb(0.82, 0.82, 0.85)));
        // Padding still comes from the built-in default.
        assert_eq!(para.padding_leading, Some(8.0));
        assert_eq!(StyleSheet::stock().len(), 2);
    }
}
