//! Sparse per-element style records
//!
//! Every field of `ElementStyle` is optional; `None` means "inherit". Styles
//! layer through a right-biased `merge`, and imported data is clamped with
//! `validated` before it reaches the renderer.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Color
// ─────────────────────────────────────────────────────────────────────────────

/// RGBA color with float components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    #[serde(default = "opaque")]
    pub alpha: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const GRAY: Color = Color::rgb(0.5, 0.5, 0.5);
    pub const BLUE: Color = Color::rgb(0.0, 0.478, 1.0);
    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Opaque color.
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Color::rgba(red, green, blue, 1.0)
    }

    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Neutral gray with equal components.
    pub const fn gray(level: f64) -> Self {
        Color::rgb(level, level, level)
    }

    /// `#rrggbb` (or `#rrggbbaa` when translucent) for terminal and HTML output.
    pub fn to_hex(&self) -> String {
        let channel = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.alpha < 1.0 {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                channel(self.red),
                channel(self.green),
                channel(self.blue),
                channel(self.alpha)
            )
        } else {
            format!(
                "#{:02x}{:02x}{:02x}",
                channel(self.red),
                channel(self.green),
                channel(self.blue)
            )
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Font Weight
// ─────────────────────────────────────────────────────────────────────────────

/// Named font weights, ordered from lightest to heaviest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum FontWeight {
    UltraLight,
    Thin,
    Light,
    #[default]
    Regular,
    Medium,
    Semibold,
    Bold,
    Heavy,
    Black,
}

impl FontWeight {
    pub fn display_name(&self) -> &'static str {
        match self {
            FontWeight::UltraLight => "Ultralight",
            FontWeight::Thin => "Thin",
            FontWeight::Light => "Light",
            FontWeight::Regular => "Regular",
            FontWeight::Medium => "Medium",
            FontWeight::Semibold => "Semibold",
            FontWeight::Bold => "Bold",
            FontWeight::Heavy => "Heavy",
            FontWeight::Black => "Black",
        }
    }

    /// CSS numeric weight.
    pub fn numeric(&self) -> u16 {
        match self {
            FontWeight::UltraLight => 100,
            FontWeight::Thin => 200,
            FontWeight::Light => 300,
            FontWeight::Regular => 400,
            FontWeight::Medium => 500,
            FontWeight::Semibold => 600,
            FontWeight::Bold => 700,
            FontWeight::Heavy => 800,
            FontWeight::Black => 900,
        }
    }

    pub fn is_bold(&self) -> bool {
        *self >= FontWeight::Semibold
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Element Style
// ─────────────────────────────────────────────────────────────────────────────

/// Font size used when no style in the chain sets one.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

/// Sparse record of visual properties for one element type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<FontWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_top: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_bottom: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_leading: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding_trailing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_spacing: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_monospaced: Option<bool>,
}

impl ElementStyle {
    /// A style with every field absent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Layer `other` on top of `self`: each field present in `other` wins.
    pub fn merge(&self, other: &ElementStyle) -> ElementStyle {
        ElementStyle {
            font_family: other.font_family.clone().or_else(|| self.font_family.clone()),
            font_size: other.font_size.or(self.font_size),
            font_weight: other.font_weight.or(self.font_weight),
            is_italic: other.is_italic.or(self.is_italic),
            letter_spacing: other.letter_spacing.or(self.letter_spacing),
            foreground_color: other.foreground_color.or(self.foreground_color),
            background_color: other.background_color.or(self.background_color),
            padding_top: other.padding_top.or(self.padding_top),
            padding_bottom: other.padding_bottom.or(self.padding_bottom),
            padding_leading: other.padding_leading.or(self.padding_leading),
            padding_trailing: other.padding_trailing.or(self.padding_trailing),
            line_spacing: other.line_spacing.or(self.line_spacing),
            border_color: other.border_color.or(self.border_color),
            border_width: other.border_width.or(self.border_width),
            corner_radius: other.corner_radius.or(self.corner_radius),
            is_monospaced: other.is_monospaced.or(self.is_monospaced),
        }
    }

    /// Copy with numeric fields clamped to safe ranges.
    ///
    /// NaN collapses to the lower bound so corrupt imports cannot poison
    /// layout math downstream.
    pub fn validated(&self) -> ElementStyle {
        fn clamp(value: Option<f64>, lo: f64, hi: f64) -> Option<f64> {
            value.map(|v| if v.is_nan() { lo } else { v.clamp(lo, hi) })
        }

        ElementStyle {
            font_size: clamp(self.font_size, 1.0, 200.0),
            padding_top: clamp(self.padding_top, 0.0, 200.0),
            padding_bottom: clamp(self.padding_bottom, 0.0, 200.0),
            padding_leading: clamp(self.padding_leading, 0.0, 200.0),
            padding_trailing: clamp(self.padding_trailing, 0.0, 200.0),
            line_spacing: clamp(self.line_spacing, 0.0, 100.0),
            border_width: clamp(self.border_width, 0.0, 50.0),
            corner_radius: clamp(self.corner_radius, 0.0, 100.0),
            letter_spacing: clamp(self.letter_spacing, -10.0, 50.0),
            ..self.clone()
        }
    }

    /// Effective font size, falling back to [`DEFAULT_FONT_SIZE`].
    pub fn effective_font_size(&self) -> f64 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    pub fn italic(&self) -> bool {
        self.is_italic == Some(true)
    }

    pub fn monospaced(&self) -> bool {
        self.is_monospaced == Some(true)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn full_style(seed: f64) -> ElementStyle {
        ElementStyle {
            font_family: Some(format!("Family{}", seed)),
            font_size: Some(seed),
            font_weight: Some(FontWeight::Bold),
            is_italic: Some(true),
            letter_spacing: Some(seed / 10.0),
            foreground_color: Some(Color::gray(seed / 100.0)),
            background_color: Some(Color::WHITE),
            padding_top: Some(seed + 1.0),
            padding_bottom: Some(seed + 2.0),
            padding_leading: Some(seed + 3.0),
            padding_trailing: Some(seed + 4.0),
            line_spacing: Some(seed + 5.0),
            border_color: Some(Color::BLUE),
            border_width: Some(seed + 6.0),
            corner_radius: Some(seed + 7.0),
            is_monospaced: Some(false),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Merge
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_merge_override_wins_when_present() {
        let base = full_style(10.0);
        let over = full_style(20.0);
        assert_eq!(base.merge(&over), over);
    }

    #[test]
    fn test_merge_keeps_base_when_override_empty() {
        let base = full_style(10.0);
        assert_eq!(base.merge(&ElementStyle::empty()), base);
        assert_eq!(ElementStyle::empty().merge(&base), base);
    }

    #[test]
    fn test_merge_is_per_field() {
        let base = ElementStyle {
            font_size: Some(14.0),
            is_italic: Some(false),
            ..Default::default()
        };
        let over = ElementStyle {
            is_italic: Some(true),
            foreground_color: Some(Color::GRAY),
            ..Default::default()
        };
        let merged = base.merge(&over);
        assert_eq!(merged.font_size, Some(14.0));
        assert_eq!(merged.is_italic, Some(true));
        assert_eq!(merged.foreground_color, Some(Color::GRAY));
        assert_eq!(merged.font_weight, None);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Validation
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_font_size_clamped_to_upper_bound() {
        let style = ElementStyle {
            font_size: Some(500.0),
            ..Default::default()
        };
        assert_eq!(style.validated().font_size, Some(200.0));
    }

    #[test]
    fn test_clamping_bounds() {
        let huge = ElementStyle {
            font_size: Some(1e9),
            padding_top: Some(1e9),
            padding_bottom: Some(1e9),
            padding_leading: Some(1e9),
            padding_trailing: Some(1e9),
            line_spacing: Some(1e9),
            border_width: Some(1e9),
            corner_radius: Some(1e9),
            letter_spacing: Some(1e9),
            ..Default::default()
        }
        .validated();
        assert_eq!(huge.font_size, Some(200.0));
        assert_eq!(huge.padding_trailing, Some(200.0));
        assert_eq!(huge.line_spacing, Some(100.0));
        assert_eq!(huge.border_width, Some(50.0));
        assert_eq!(huge.corner_radius, Some(100.0));
        assert_eq!(huge.letter_spacing, Some(50.0));

        let negative = ElementStyle {
            font_size: Some(-5.0),
            padding_top: Some(-5.0),
            letter_spacing: Some(-99.0),
            ..Default::default()
        }
        .validated();
        assert_eq!(negative.font_size, Some(1.0));
        assert_eq!(negative.padding_top, Some(0.0));
        assert_eq!(negative.letter_spacing, Some(-10.0));
    }

    #[test]
    fn test_validated_leaves_absent_and_in_range_fields() {
        let style = full_style(12.0);
        assert_eq!(style.validated(), style);
        assert_eq!(ElementStyle::empty().validated(), ElementStyle::empty());
    }

    #[test]
    fn test_nan_clamps_to_lower_bound() {
        let style = ElementStyle {
            font_size: Some(f64::NAN),
            ..Default::default()
        };
        assert_eq!(style.validated().font_size, Some(1.0));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_sparse_json_omits_absent_fields() {
        let style = ElementStyle {
            font_size: Some(16.0),
            font_weight: Some(FontWeight::Semibold),
            ..Default::default()
        };
        let json = serde_json::to_string(&style).unwrap();
        assert_eq!(json, r#"{"fontSize":16.0,"fontWeight":"semibold"}"#);
    }

    #[test]
    fn test_color_alpha_defaults_to_opaque() {
        let color: Color = serde_json::from_str(r#"{"red":1,"green":0,"blue":0}"#).unwrap();
        assert_eq!(color, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(color.to_hex(), "#ff0000");
        assert_eq!(Color::CLEAR.to_hex(), "#00000000");
    }

    #[test]
    fn test_font_weight_ordering() {
        assert!(FontWeight::Bold.is_bold());
        assert!(FontWeight::Semibold.is_bold());
        assert!(!FontWeight::Medium.is_bold());
        assert_eq!(FontWeight::Black.numeric(), 900);
    }
}
