//! Built-in style for every element type
//!
//! Inline types carry only the property they add (italic, bold, colour) so
//! they inherit size and colour from the enclosing block when merged.

use super::element_style::{Color, ElementStyle, FontWeight};
use super::element_type::MarkupElementType;

/// The hardcoded default for `element_type`. Total over the enum.
pub fn builtin_style(element_type: MarkupElementType) -> ElementStyle {
    use MarkupElementType as T;

    match element_type {
        T::Heading1 => heading(32.0, FontWeight::Bold, Color::BLACK, 16.0, 8.0, 4.0),
        T::Heading2 => heading(26.0, FontWeight::Bold, Color::BLACK, 14.0, 6.0, 4.0),
        T::Heading3 => heading(22.0, FontWeight::Semibold, Color::BLACK, 12.0, 4.0, 3.0),
        T::Heading4 => heading(18.0, FontWeight::Semibold, Color::BLACK, 10.0, 4.0, 2.0),
        T::Heading5 => heading(16.0, FontWeight::Medium, Color::BLACK, 8.0, 2.0, 2.0),
        T::Heading6 => heading(14.0, FontWeight::Medium, Color::gray(0.4), 8.0, 2.0, 2.0),
        T::Paragraph => ElementStyle {
            font_size: Some(14.0),
            foreground_color: Some(Color::BLACK),
            padding_top: Some(0.0),
            padding_bottom: Some(4.0),
            padding_leading: Some(8.0),
            line_spacing: Some(4.0),
            ..Default::default()
        },
        T::BlockQuote => ElementStyle {
            font_size: Some(14.0),
            is_italic: Some(true),
            foreground_color: Some(Color::gray(0.3)),
            background_color: Some(Color::gray(0.96)),
            padding_top: Some(8.0),
            padding_bottom: Some(8.0),
            padding_leading: Some(16.0),
            padding_trailing: Some(8.0),
            line_spacing: Some(3.0),
            border_color: Some(Color::gray(0.75)),
            border_width: Some(3.0),
            corner_radius: Some(2.0),
            ..Default::default()
        },
        T::CodeBlock => ElementStyle {
            font_size: Some(13.0),
            foreground_color: Some(Color::gray(0.2)),
            background_color: Some(Color::gray(0.95)),
            padding_top: Some(12.0),
            padding_bottom: Some(12.0),
            padding_leading: Some(12.0),
            padding_trailing: Some(12.0),
            line_spacing: Some(3.0),
            corner_radius: Some(6.0),
            is_monospaced: Some(true),
            ..Default::default()
        },
        T::OrderedList | T::UnorderedList => ElementStyle {
            font_size: Some(14.0),
            foreground_color: Some(Color::BLACK),
            padding_top: Some(4.0),
            padding_bottom: Some(4.0),
            padding_leading: Some(8.0),
            ..Default::default()
        },
        T::ListItem => ElementStyle {
            font_size: Some(14.0),
            foreground_color: Some(Color::BLACK),
            padding_top: Some(2.0),
            padding_bottom: Some(2.0),
            ..Default::default()
        },
        T::ThematicBreak => ElementStyle {
            foreground_color: Some(Color::gray(0.8)),
            padding_top: Some(12.0),
            padding_bottom: Some(12.0),
            ..Default::default()
        },
        T::Table => ElementStyle {
            font_size: Some(13.0),
            foreground_color: Some(Color::BLACK),
            padding_top: Some(8.0),
            padding_bottom: Some(8.0),
            border_color: Some(Color::gray(0.85)),
            border_width: Some(1.0),
            ..Default::default()
        },
        T::TableHeader => ElementStyle {
            font_weight: Some(FontWeight::Semibold),
            background_color: Some(Color::gray(0.95)),
            padding_top: Some(6.0),
            padding_bottom: Some(6.0),
            ..cell_style(Some(Color::BLACK))
        },
        T::TableRow => ElementStyle {
            padding_top: Some(4.0),
            padding_bottom: Some(4.0),
            ..cell_style(Some(Color::BLACK))
        },
        T::TableCell => ElementStyle {
            padding_top: Some(4.0),
            padding_bottom: Some(4.0),
            ..cell_style(None)
        },
        T::Text => ElementStyle::empty(),
        T::Emphasis => ElementStyle {
            is_italic: Some(true),
            ..Default::default()
        },
        T::Strong => ElementStyle {
            font_weight: Some(FontWeight::Bold),
            ..Default::default()
        },
        T::Strikethrough => ElementStyle {
            foreground_color: Some(Color::GRAY),
            ..Default::default()
        },
        T::InlineCode => ElementStyle {
            font_size: Some(13.0),
            foreground_color: Some(Color::rgb(0.8, 0.15, 0.3)),
            background_color: Some(Color::gray(0.95)),
            padding_leading: Some(4.0),
            padding_trailing: Some(4.0),
            corner_radius: Some(3.0),
            is_monospaced: Some(true),
            ..Default::default()
        },
        T::Link => ElementStyle {
            foreground_color: Some(Color::BLUE),
            ..Default::default()
        },
        T::Image => ElementStyle {
            padding_top: Some(8.0),
            padding_bottom: Some(8.0),
            corner_radius: Some(4.0),
            ..Default::default()
        },
    }
}

fn heading(
    size: f64,
    weight: FontWeight,
    color: Color,
    top: f64,
    bottom: f64,
    line_spacing: f64,
) -> ElementStyle {
    ElementStyle {
        font_size: Some(size),
        font_weight: Some(weight),
        foreground_color: Some(color),
        padding_top: Some(top),
        padding_bottom: Some(bottom),
        line_spacing: Some(line_spacing),
        ..Default::default()
    }
}

fn cell_style(color: Option<Color>) -> ElementStyle {
    ElementStyle {
        font_size: Some(13.0),
        foreground_color: color,
        padding_leading: Some(8.0),
        padding_trailing: Some(8.0),
        ..Default::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
