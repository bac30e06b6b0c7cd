//! Attributed text model
//!
//! `RichText` is a string plus a contiguous list of spans, each covering a
//! byte length and carrying one `TextAttributes` value. Attributes split into
//! a visual half (what a view draws) and a recovery half (what the
//! reconstructor reads back). Every edit operation here carries both halves
//! along, so recovery metadata survives splits, merges and typing.

use crate::render::SyntaxToken;
use crate::string_utils::{ceil_char_boundary, floor_char_boundary, snap_range};
use crate::style::{Color, ElementStyle, FontWeight, MarkupElementType};
use serde::{Deserialize, Serialize};
use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Visual Attributes
// ─────────────────────────────────────────────────────────────────────────────

/// Concrete font request derived from a resolved style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontDescriptor {
    pub family: Option<String>,
    pub size: f64,
    pub weight: FontWeight,
    pub italic: bool,
    pub monospaced: bool,
}

impl FontDescriptor {
    pub fn from_style(style: &ElementStyle) -> Self {
        Self {
            family: style.font_family.clone(),
            size: style.effective_font_size(),
            weight: style.font_weight.unwrap_or_default(),
            italic: style.italic(),
            monospaced: style.monospaced(),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight.is_bold()
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::from_style(&ElementStyle::empty())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Recovery Attributes
// ─────────────────────────────────────────────────────────────────────────────

/// Stored syntax stack. Older documents carry a single token string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SyntaxAttribute {
    Stack(Vec<String>),
    Legacy(String),
}

impl SyntaxAttribute {
    pub fn from_tokens(tokens: &[SyntaxToken]) -> Option<Self> {
        if tokens.is_empty() {
            None
        } else {
            Some(SyntaxAttribute::Stack(
                tokens.iter().map(|t| t.as_str().to_string()).collect(),
            ))
        }
    }

    /// Raw token strings, outermost first.
    pub fn raw(&self) -> Vec<&str> {
        match self {
            SyntaxAttribute::Stack(stack) => stack.iter().map(String::as_str).collect(),
            SyntaxAttribute::Legacy(single) => vec![single.as_str()],
        }
    }
}

/// Non-visual metadata that lets an edited range be turned back into markdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoveryAttributes {
    #[serde(
        rename = "markdownElementType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub element_type: Option<String>,
    #[serde(rename = "markdownSyntax", default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<SyntaxAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_destination: Option<String>,
}

impl RecoveryAttributes {
    /// Parsed syntax stack. An unrecognized token invalidates the whole
    /// stack, so a malformed run reconstructs as plain text.
    pub fn syntax_tokens(&self) -> Vec<SyntaxToken> {
        let Some(syntax) = &self.syntax else {
            return Vec::new();
        };
        syntax
            .raw()
            .into_iter()
            .map(SyntaxToken::parse)
            .collect::<Option<Vec<_>>>()
            .unwrap_or_default()
    }

    pub fn set_syntax_tokens(&mut self, tokens: &[SyntaxToken]) {
        self.syntax = SyntaxAttribute::from_tokens(tokens);
    }

    pub fn element_type(&self) -> Option<MarkupElementType> {
        self.element_type.as_deref().and_then(|raw| raw.parse().ok())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Text Attributes
// ─────────────────────────────────────────────────────────────────────────────

/// Full attribute set of one span.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextAttributes {
    pub font: FontDescriptor,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub kern: Option<f64>,
    pub line_spacing: Option<f64>,
    pub strikethrough: bool,
    pub underline: bool,
    pub recovery: RecoveryAttributes,
}

// ─────────────────────────────────────────────────────────────────────────────
// Rich Text
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub len: usize,
    pub attributes: TextAttributes,
}

/// Attributed string. Spans tile the text exactly and are never empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RichText {
    text: String,
    spans: Vec<Span>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_plain(text: &str, attributes: TextAttributes) -> Self {
        let mut rich = Self::new();
        rich.push_str(text, attributes);
        rich
    }

    /// Append text, extending the last span when attributes match.
    pub fn push_str(&mut self, text: &str, attributes: TextAttributes) {
        if text.is_empty() {
            return;
        }
        self.text.push_str(text);
        match self.spans.last_mut() {
            Some(last) if last.attributes == attributes => last.len += text.len(),
            _ => self.spans.push(Span {
                len: text.len(),
                attributes,
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Spans with their byte ranges.
    pub fn spans(&self) -> impl Iterator<Item = (Range<usize>, &TextAttributes)> {
        let mut offset = 0;
        self.spans.iter().map(move |span| {
            let range = offset..offset + span.len;
            offset += span.len;
            (range, &span.attributes)
        })
    }

    /// Maximal ranges sharing identical recovery attributes.
    pub fn attribute_runs(&self) -> Vec<(Range<usize>, &RecoveryAttributes)> {
        let mut runs: Vec<(Range<usize>, &RecoveryAttributes)> = Vec::new();
        for (range, attrs) in self.spans() {
            match runs.last_mut() {
                Some((last, recovery)) if **recovery == attrs.recovery => last.end = range.end,
                _ => runs.push((range, &attrs.recovery)),
            }
        }
        runs
    }

    /// Attributes of the character at `offset`; the end of text reports the
    /// last span.
    pub fn attributes_at(&self, offset: usize) -> Option<&TextAttributes> {
        let last = self.spans.last().map(|s| &s.attributes);
        self.spans()
            .find(|(range, _)| range.contains(&offset))
            .map(|(_, attrs)| attrs)
            .or(last)
    }

    /// Attributes newly typed text inherits at `cursor`: the character
    /// before the cursor, or the first character at the very start.
    pub fn typing_attributes(&self, cursor: usize) -> Option<TextAttributes> {
        let cursor = floor_char_boundary(&self.text, cursor);
        let inherit_from = if cursor == 0 {
            0
        } else {
            floor_char_boundary(&self.text, cursor - 1)
        };
        self.attributes_at(inherit_from).cloned()
    }

    /// Replace `range` with `replacement` carrying `attributes`.
    pub fn replace_range(&mut self, range: Range<usize>, replacement: &str, attributes: TextAttributes) {
        let (start, end) = snap_range(&self.text, range.start, range.end);
        let mut out = RichText::new();
        for (span, attrs) in self.spans() {
            if span.start < start {
                out.push_str(&self.text[span.start..span.end.min(start)], attrs.clone());
            }
        }
        out.push_str(replacement, attributes);
        for (span, attrs) in self.spans() {
            if span.end > end {
                out.push_str(&self.text[span.start.max(end)..span.end], attrs.clone());
            }
        }
        *self = out;
    }

    /// Insert at `cursor` using the inherited typing attributes.
    pub fn insert_str(&mut self, cursor: usize, text: &str) {
        let attributes = self.typing_attributes(cursor).unwrap_or_default();
        self.replace_range(cursor..cursor, text, attributes);
    }

    /// Apply `update` to the attributes of every span piece inside `range`.
    pub fn update_attributes<F>(&mut self, range: Range<usize>, mut update: F)
    where
        F: FnMut(&mut TextAttributes),
    {
        let (start, end) = snap_range(&self.text, range.start, range.end);
        let mut out = RichText::new();
        for (span, attrs) in self.spans() {
            let inner_start = span.start.max(start);
            let inner_end = span.end.min(end);
            if inner_start >= inner_end {
                out.push_str(&self.text[span.clone()], attrs.clone());
                continue;
            }
            out.push_str(&self.text[span.start..inner_start], attrs.clone());
            let mut changed = attrs.clone();
            update(&mut changed);
            out.push_str(&self.text[inner_start..inner_end], changed);
            out.push_str(&self.text[inner_end..span.end], attrs.clone());
        }
        *self = out;
    }

    /// Attribute sets of the spans overlapping `range`.
    pub fn attributes_in(&self, range: Range<usize>) -> Vec<&TextAttributes> {
        self.spans()
            .filter(|(span, _)| span.start < range.end && range.start < span.end)
            .map(|(_, attrs)| attrs)
            .collect()
    }

    /// Copy of the attributed substring in `range`.
    pub fn slice(&self, range: Range<usize>) -> RichText {
        let start = floor_char_boundary(&self.text, range.start);
        let end = ceil_char_boundary(&self.text, range.end);
        let mut out = RichText::new();
        for (span, attrs) in self.spans() {
            let lo = span.start.max(start);
            let hi = span.end.min(end);
            if lo < hi {
                out.push_str(&self.text[lo..hi], attrs.clone());
            }
        }
        out
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(element_type: &str, syntax: &[SyntaxToken]) -> TextAttributes {
        let mut attrs = TextAttributes::default();
        attrs.recovery.element_type = Some(element_type.to_string());
        attrs.recovery.set_syntax_tokens(syntax);
        attrs
    }

    fn sample() -> RichText {
        let mut rich = RichText::new();
        rich.push_str("Hello ", tagged("text", &[]));
        rich.push_str("bold", tagged("strong", &[SyntaxToken::Strong]));
        rich.push_str(" world", tagged("text", &[]));
        rich
    }

    #[test]
    fn test_push_merges_equal_neighbours() {
        let mut rich = RichText::new();
        rich.push_str("a", TextAttributes::default());
        rich.push_str("b", TextAttributes::default());
        rich.push_str("", tagged("strong", &[]));
        assert_eq!(rich.spans().count(), 1);
        assert_eq!(rich.as_str(), "ab");
    }

    #[test]
    fn test_attribute_runs_coalesce_by_recovery() {
        let mut rich = RichText::new();
        let mut big = tagged("text", &[]);
        big.font.size = 30.0;
        rich.push_str("one", tagged("text", &[]));
        rich.push_str("two", big);
        let runs = rich.attribute_runs();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].0, 0..6);
    }

    #[test]
    fn test_typing_inside_run_inherits_its_attributes() {
        let mut rich = sample();
        rich.insert_str(8, "XX");
        assert_eq!(rich.as_str(), "Hello boXXld world");
        let attrs = rich.attributes_at(9).unwrap();
        assert_eq!(attrs.recovery.syntax_tokens(), vec![SyntaxToken::Strong]);
        assert_eq!(rich.attribute_runs().len(), 3);
    }

    #[test]
    fn test_typing_at_start_uses_first_character() {
        let mut rich = sample();
        rich.insert_str(0, ">");
        assert_eq!(rich.attributes_at(0).unwrap().recovery.element_type.as_deref(), Some("text"));
    }

    #[test]
    fn test_replace_range_across_spans() {
        let mut rich = sample();
        rich.replace_range(4..11, "!", tagged("text", &[]));
        assert_eq!(rich.as_str(), "Hell!world");
        assert_eq!(rich.spans().count(), 1);
    }

    #[test]
    fn test_replace_range_snaps_to_char_boundaries() {
        let mut rich = RichText::from_plain("a中b", TextAttributes::default());
        rich.replace_range(2..3, "x", TextAttributes::default());
        assert_eq!(rich.as_str(), "axb");
    }

    #[test]
    fn test_update_attributes_splits_spans() {
        let mut rich = RichText::from_plain("abcdef", tagged("text", &[]));
        rich.update_attributes(2..4, |attrs| attrs.recovery.set_syntax_tokens(&[SyntaxToken::Emphasis]));
        let pieces: Vec<(Range<usize>, Vec<SyntaxToken>)> = rich
            .spans()
            .map(|(r, a)| (r, a.recovery.syntax_tokens()))
            .collect();
        assert_eq!(
            pieces,
            vec![
                (0..2, vec![]),
                (2..4, vec![SyntaxToken::Emphasis]),
                (4..6, vec![]),
            ]
        );
    }

    #[test]
    fn test_slice_keeps_attributes() {
        let slice = sample().slice(3..8);
        assert_eq!(slice.as_str(), "lo bo");
        assert_eq!(slice.spans().count(), 2);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recovery attribute wire format
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_legacy_single_string_syntax_decodes() {
        let attrs: RecoveryAttributes = serde_json::from_str(r#"{"markdownSyntax":"**"}"#).unwrap();
        assert_eq!(attrs.syntax, Some(SyntaxAttribute::Legacy("**".to_string())));
        assert_eq!(attrs.syntax_tokens(), vec![SyntaxToken::Strong]);
    }

    #[test]
    fn test_stack_encoding() {
        let attrs = tagged("strong", &[SyntaxToken::Strong, SyntaxToken::Emphasis]);
        let json = serde_json::to_string(&attrs.recovery).unwrap();
        assert_eq!(json, r#"{"markdownElementType":"strong","markdownSyntax":["**","*"]}"#);
    }

    #[test]
    fn test_malformed_stack_degrades_to_plain() {
        let attrs = RecoveryAttributes {
            syntax: Some(SyntaxAttribute::Stack(vec!["**".into(), "%%".into()])),
            ..Default::default()
        };
        assert!(attrs.syntax_tokens().is_empty());
        assert_eq!(attrs.element_type(), None);
    }
}
