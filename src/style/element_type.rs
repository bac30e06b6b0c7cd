//! Markup element classification
//!
//! Every rendered block and inline run is tagged with a `MarkupElementType`.
//! The same identifiers key stylesheet overrides in JSON, so the serialized
//! names are part of the wire format.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of element kinds the renderer produces and stylesheets target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MarkupElementType {
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "heading4")]
    Heading4,
    #[serde(rename = "heading5")]
    Heading5,
    #[serde(rename = "heading6")]
    Heading6,
    Paragraph,
    BlockQuote,
    CodeBlock,
    OrderedList,
    UnorderedList,
    ListItem,
    ThematicBreak,
    Table,
    TableHeader,
    TableRow,
    TableCell,
    Text,
    Emphasis,
    Strong,
    Strikethrough,
    InlineCode,
    Link,
    Image,
}

impl MarkupElementType {
    /// All element types in declaration order.
    pub const ALL: [MarkupElementType; 24] = [
        MarkupElementType::Heading1,
        MarkupElementType::Heading2,
        MarkupElementType::Heading3,
        MarkupElementType::Heading4,
        MarkupElementType::Heading5,
        MarkupElementType::Heading6,
        MarkupElementType::Paragraph,
        MarkupElementType::BlockQuote,
        MarkupElementType::CodeBlock,
        MarkupElementType::OrderedList,
        MarkupElementType::UnorderedList,
        MarkupElementType::ListItem,
        MarkupElementType::ThematicBreak,
        MarkupElementType::Table,
        MarkupElementType::TableHeader,
        MarkupElementType::TableRow,
        MarkupElementType::TableCell,
        MarkupElementType::Text,
        MarkupElementType::Emphasis,
        MarkupElementType::Strong,
        MarkupElementType::Strikethrough,
        MarkupElementType::InlineCode,
        MarkupElementType::Link,
        MarkupElementType::Image,
    ];

    /// Map a heading level to its element type. Levels outside 1..=6 clamp.
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => MarkupElementType::Heading1,
            2 => MarkupElementType::Heading2,
            3 => MarkupElementType::Heading3,
            4 => MarkupElementType::Heading4,
            5 => MarkupElementType::Heading5,
            _ => MarkupElementType::Heading6,
        }
    }

    /// Heading level (1-6) for heading types, `None` otherwise.
    pub fn heading_level(&self) -> Option<u8> {
        match self {
            MarkupElementType::Heading1 => Some(1),
            MarkupElementType::Heading2 => Some(2),
            MarkupElementType::Heading3 => Some(3),
            MarkupElementType::Heading4 => Some(4),
            MarkupElementType::Heading5 => Some(5),
            MarkupElementType::Heading6 => Some(6),
            _ => None,
        }
    }

    /// Stable identifier used in stylesheet JSON and recovery attributes.
    pub fn raw_name(&self) -> &'static str {
        match self {
            MarkupElementType::Heading1 => "heading1",
            MarkupElementType::Heading2 => "heading2",
            MarkupElementType::Heading3 => "heading3",
            MarkupElementType::Heading4 => "heading4",
            MarkupElementType::Heading5 => "heading5",
            MarkupElementType::Heading6 => "heading6",
            MarkupElementType::Paragraph => "paragraph",
            MarkupElementType::BlockQuote => "blockQuote",
            MarkupElementType::CodeBlock => "codeBlock",
            MarkupElementType::OrderedList => "orderedList",
            MarkupElementType::UnorderedList => "unorderedList",
            MarkupElementType::ListItem => "listItem",
            MarkupElementType::ThematicBreak => "thematicBreak",
            MarkupElementType::Table => "table",
            MarkupElementType::TableHeader => "tableHeader",
            MarkupElementType::TableRow => "tableRow",
            MarkupElementType::TableCell => "tableCell",
            MarkupElementType::Text => "text",
            MarkupElementType::Emphasis => "emphasis",
            MarkupElementType::Strong => "strong",
            MarkupElementType::Strikethrough => "strikethrough",
            MarkupElementType::InlineCode => "inlineCode",
            MarkupElementType::Link => "link",
            MarkupElementType::Image => "image",
        }
    }

    /// Human-readable label for style editors.
    pub fn display_name(&self) -> &'static str {
        match self {
            MarkupElementType::Heading1 => "Heading 1",
            MarkupElementType::Heading2 => "Heading 2",
            MarkupElementType::Heading3 => "Heading 3",
            MarkupElementType::Heading4 => "Heading 4",
            MarkupElementType::Heading5 => "Heading 5",
            MarkupElementType::Heading6 => "Heading 6",
            MarkupElementType::Paragraph => "Paragraph",
            MarkupElementType::BlockQuote => "Block Quote",
            MarkupElementType::CodeBlock => "Code Block",
            MarkupElementType::OrderedList => "Ordered List",
            MarkupElementType::UnorderedList => "Unordered List",
            MarkupElementType::ListItem => "List Item",
            MarkupElementType::ThematicBreak => "Thematic Break",
            MarkupElementType::Table => "Table",
            MarkupElementType::TableHeader => "Table Header",
            MarkupElementType::TableRow => "Table Row",
            MarkupElementType::TableCell => "Table Cell",
            MarkupElementType::Text => "Text",
            MarkupElementType::Emphasis => "Emphasis",
            MarkupElementType::Strong => "Strong",
            MarkupElementType::Strikethrough => "Strikethrough",
            MarkupElementType::InlineCode => "Inline Code",
            MarkupElementType::Link => "Link",
            MarkupElementType::Image => "Image",
        }
    }

    pub fn is_block(&self) -> bool {
        !self.is_inline()
    }

    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            MarkupElementType::Text
                | MarkupElementType::Emphasis
                | MarkupElementType::Strong
                | MarkupElementType::Strikethrough
                | MarkupElementType::InlineCode
                | MarkupElementType::Link
                | MarkupElementType::Image
        )
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }
}

impl fmt::Display for MarkupElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw_name())
    }
}

impl FromStr for MarkupElementType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        MarkupElementType::ALL
            .iter()
            .copied()
            .find(|t| t.raw_name() == s)
            .ok_or_else(|| format!("unknown element type '{}'", s))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
