//! Visual Run Encoder
//!
//! Turns styled runs into `RichText`. Each span gets the visual attributes a
//! view needs plus the recovery attributes `reconstruct` reads back.

use super::attributes::{FontDescriptor, RecoveryAttributes, RichText, SyntaxAttribute, TextAttributes};
use crate::render::{StyledRun, SyntaxToken};
use crate::style::{ElementStyle, MarkupElementType};

/// Encode inline runs.
pub fn encode(runs: &[StyledRun]) -> RichText {
    let mut rich = RichText::new();
    for run in runs {
        rich.push_str(&run.text, run_attributes(run));
    }
    rich
}

/// Encode the raw text of a code block as one span.
pub fn encode_code_block(text: &str, style: &ElementStyle) -> RichText {
    let mut attributes = visual_attributes(style);
    attributes.recovery.element_type = Some(MarkupElementType::CodeBlock.raw_name().to_string());
    RichText::from_plain(text, attributes)
}

/// Full attribute set for one run.
pub fn run_attributes(run: &StyledRun) -> TextAttributes {
    let mut attributes = visual_attributes(&run.style);
    attributes.strikethrough = run.syntax.contains(&SyntaxToken::Strikethrough);

    let destination = match run.element_type {
        MarkupElementType::Link => run.destination.clone(),
        _ => None,
    };
    attributes.underline = destination.is_some();
    attributes.recovery = RecoveryAttributes {
        element_type: Some(run.element_type.raw_name().to_string()),
        syntax: SyntaxAttribute::from_tokens(&run.syntax),
        link_destination: destination,
    };
    attributes
}

fn visual_attributes(style: &ElementStyle) -> TextAttributes {
    TextAttributes {
        font: FontDescriptor::from_style(style),
        foreground: style.foreground_color,
        background: style.background_color,
        kern: style.letter_spacing,
        line_spacing: style.line_spacing.filter(|spacing| *spacing > 0.0),
        ..TextAttributes::default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{parse_markdown, MarkdownOptions};
    use crate::render::{InlineRenderer, StyledRun};
    use crate::style::{Color, FontWeight, StyleSheet};

    fn runs(markdown: &str) -> Vec<StyledRun> {
        let sheet = StyleSheet::default_sheet();
        let doc = parse_markdown(markdown, &MarkdownOptions::default());
        let parent = sheet.resolved_style(MarkupElementType::Paragraph);
        InlineRenderer::new(&sheet).render_inlines(&doc.children[0].children, &parent)
    }

    #[test]
    fn test_encode_concatenates_run_text() {
        let rich = encode(&runs("This is **bold** and *italic* text."));
        assert_eq!(rich.as_str(), "This is bold and italic text.");
        assert_eq!(rich.attribute_runs().len(), 5);
    }

    #[test]
    fn test_bold_run_visuals_and_recovery() {
        let rich = encode(&runs("a **b**"));
        let attrs = rich.attributes_at(2).unwrap();
        assert!(attrs.font.is_bold());
        assert_eq!(attrs.font.weight, FontWeight::Bold);
        assert_eq!(attrs.recovery.element_type.as_deref(), Some("strong"));
        assert_eq!(attrs.recovery.syntax_tokens(), vec![SyntaxToken::Strong]);
        assert_eq!(attrs.recovery.link_destination, None);
    }

    #[test]
    fn test_plain_run_has_no_syntax_attribute() {
        let rich = encode(&runs("plain"));
        let attrs = rich.attributes_at(0).unwrap();
        assert_eq!(attrs.recovery.syntax, None);
        assert_eq!(attrs.recovery.element_type.as_deref(), Some("text"));
    }

    #[test]
    fn test_link_run_is_underlined_and_carries_destination() {
        let rich = encode(&runs("[site](https://example.com)"));
        let attrs = rich.attributes_at(0).unwrap();
        assert!(attrs.underline);
        assert_eq!(attrs.recovery.link_destination.as_deref(), Some("https://example.com"));
        assert_eq!(attrs.foreground, Some(Color::BLUE));
    }

    #[test]
    fn test_strikethrough_flag_follows_stack() {
        let rich = encode(&runs("~~gone~~ kept"));
        assert!(rich.attributes_at(0).unwrap().strikethrough);
        assert!(!rich.attributes_at(6).unwrap().strikethrough);
    }

    #[test]
    fn test_zero_line_spacing_is_omitted() {
        let mut style = ElementStyle::empty();
        style.line_spacing = Some(0.0);
        style.letter_spacing = Some(1.5);
        let rich = encode(&[StyledRun::plain("x", style)]);
        let attrs = rich.attributes_at(0).unwrap();
        assert_eq!(attrs.line_spacing, None);
        assert_eq!(attrs.kern, Some(1.5));
    }

    #[test]
    fn test_encode_code_block() {
        let style = StyleSheet::default_sheet().resolved_style(MarkupElementType::CodeBlock);
        let rich = encode_code_block("let x = 1;\n", &style);
        let attrs = rich.attributes_at(0).unwrap();
        assert!(attrs.font.monospaced);
        assert_eq!(attrs.recovery.element_type.as_deref(), Some("codeBlock"));
        assert_eq!(attrs.recovery.syntax, None);
        assert_eq!(rich.as_str(), "let x = 1;\n");
    }
}
