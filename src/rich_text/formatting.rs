//! Inline formatting over rich text
//!
//! Toggling a delimiter edits the recovery stack and the matching visual
//! attribute together, so what the user sees and what reconstruction emits
//! never drift apart.

use super::attributes::{RichText, TextAttributes};
use crate::render::SyntaxToken;
use crate::style::{FontWeight, MarkupElementType, StyleSheet};
use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Formatting State
// ─────────────────────────────────────────────────────────────────────────────

/// Inline formatting active over a selection, for toolbar state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormattingState {
    /// Tokens every run of the selection carries, outermost first
    pub tokens: Vec<SyntaxToken>,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_inline_code: bool,
    pub is_strikethrough: bool,
}

impl FormattingState {
    pub fn from_tokens(tokens: Vec<SyntaxToken>) -> Self {
        Self {
            is_bold: tokens.contains(&SyntaxToken::Strong),
            is_italic: tokens.contains(&SyntaxToken::Emphasis),
            is_inline_code: tokens.contains(&SyntaxToken::Code),
            is_strikethrough: tokens.contains(&SyntaxToken::Strikethrough),
            tokens,
        }
    }

    pub fn active_inline_element_type(&self) -> Option<MarkupElementType> {
        active_inline_element_type(&self.tokens)
    }
}

/// Most specific inline type among `tokens`: code, then strikethrough,
/// then strong, then emphasis.
pub fn active_inline_element_type(tokens: &[SyntaxToken]) -> Option<MarkupElementType> {
    [
        SyntaxToken::Code,
        SyntaxToken::Strikethrough,
        SyntaxToken::Strong,
        SyntaxToken::Emphasis,
    ]
    .into_iter()
    .find(|token| tokens.contains(token))
    .map(|token| token.element_type())
}

/// Tokens shared by every span in `range`. A collapsed range reports the
/// typing attributes at the cursor.
pub fn common_syntax(rich: &RichText, range: Range<usize>) -> Vec<SyntaxToken> {
    if range.is_empty() {
        return rich
            .typing_attributes(range.start)
            .map(|attrs| attrs.recovery.syntax_tokens())
            .unwrap_or_default();
    }
    let mut stacks = rich
        .attributes_in(range)
        .into_iter()
        .map(|attrs| attrs.recovery.syntax_tokens());
    let Some(first) = stacks.next() else {
        return Vec::new();
    };
    stacks.fold(first, |common, stack| {
        common.into_iter().filter(|t| stack.contains(t)).collect()
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Toggling
// ─────────────────────────────────────────────────────────────────────────────

/// Toggle `token` over a non-empty `range`: removed when every span already
/// carries it, otherwise added to the spans lacking it. `block_type` is the
/// enclosing block, whose style restores visuals on removal. Returns whether
/// the token was added.
pub fn toggle_syntax(
    rich: &mut RichText,
    range: Range<usize>,
    token: SyntaxToken,
    stylesheet: &StyleSheet,
    block_type: MarkupElementType,
) -> bool {
    let add = !rich
        .attributes_in(range.clone())
        .iter()
        .all(|attrs| attrs.recovery.syntax_tokens().contains(&token));
    rich.update_attributes(range, |attrs| apply_token(attrs, token, add, stylesheet, block_type));
    add
}

/// Toggle `token` on the attributes used for the next typed characters.
pub fn toggle_typing_syntax(
    attrs: &mut TextAttributes,
    token: SyntaxToken,
    stylesheet: &StyleSheet,
    block_type: MarkupElementType,
) -> bool {
    let add = !attrs.recovery.syntax_tokens().contains(&token);
    apply_token(attrs, token, add, stylesheet, block_type);
    add
}

fn apply_token(
    attrs: &mut TextAttributes,
    token: SyntaxToken,
    add: bool,
    stylesheet: &StyleSheet,
    block_type: MarkupElementType,
) {
    let mut tokens = attrs.recovery.syntax_tokens();
    if add {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    } else {
        tokens.retain(|t| *t != token);
    }
    attrs.recovery.set_syntax_tokens(&tokens);

    // Links keep their type; otherwise the innermost delimiter names the run.
    if attrs.recovery.element_type() != Some(MarkupElementType::Link) {
        let element_type = tokens
            .last()
            .map(SyntaxToken::element_type)
            .unwrap_or(MarkupElementType::Text);
        attrs.recovery.element_type = Some(element_type.raw_name().to_string());
    }

    let block = stylesheet.resolved_style(block_type);
    match token {
        SyntaxToken::Strong => {
            attrs.font.weight = if add {
                FontWeight::Bold
            } else {
                block.font_weight.unwrap_or_default()
            };
        }
        SyntaxToken::Emphasis => attrs.font.italic = add || block.italic(),
        SyntaxToken::Strikethrough => attrs.strikethrough = add,
        SyntaxToken::Code => {
            attrs.font.monospaced = add || block.monospaced();
            attrs.foreground = if add {
                stylesheet
                    .resolved_style(MarkupElementType::InlineCode)
                    .foreground_color
            } else {
                block.foreground_color
            };
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{parse_markdown, MarkdownOptions};
    use crate::render::InlineRenderer;
    use crate::rich_text::encode;

    fn rich(markdown: &str) -> RichText {
        let sheet = StyleSheet::default_sheet();
        let doc = parse_markdown(markdown, &MarkdownOptions::default());
        let parent = sheet.resolved_style(MarkupElementType::Paragraph);
        encode(&InlineRenderer::new(&sheet).render_inlines(&doc.children[0].children, &parent))
    }

    fn toggle(rich: &mut RichText, range: Range<usize>, token: SyntaxToken) -> bool {
        toggle_syntax(
            rich,
            range,
            token,
            &StyleSheet::default_sheet(),
            MarkupElementType::Paragraph,
        )
    }

    #[test]
    fn test_toggle_adds_when_missing() {
        let mut text = rich("hello world");
        assert!(toggle(&mut text, 0..5, SyntaxToken::Strong));
        let attrs = text.attributes_at(0).unwrap();
        assert_eq!(attrs.recovery.syntax_tokens(), vec![SyntaxToken::Strong]);
        assert_eq!(attrs.recovery.element_type.as_deref(), Some("strong"));
        assert!(attrs.font.is_bold());
        assert!(!text.attributes_at(6).unwrap().font.is_bold());
    }

    #[test]
    fn test_toggle_removes_when_all_have_it() {
        let mut text = rich("**hello**");
        assert!(!toggle(&mut text, 0..5, SyntaxToken::Strong));
        let attrs = text.attributes_at(0).unwrap();
        assert!(attrs.recovery.syntax_tokens().is_empty());
        assert_eq!(attrs.recovery.element_type.as_deref(), Some("text"));
        assert_eq!(attrs.font.weight, FontWeight::Regular);
    }

    #[test]
    fn test_mixed_selection_adds_to_runs_lacking_it() {
        let mut text = rich("**bold** plain");
        assert!(toggle(&mut text, 0..10, SyntaxToken::Strong));
        for offset in [0, 5, 9] {
            assert_eq!(
                text.attributes_at(offset).unwrap().recovery.syntax_tokens(),
                vec![SyntaxToken::Strong]
            );
        }
    }

    #[test]
    fn test_code_toggle_switches_colour() {
        let sheet = StyleSheet::default_sheet();
        let mut text = rich("code");
        toggle(&mut text, 0..4, SyntaxToken::Code);
        let attrs = text.attributes_at(0).unwrap();
        assert!(attrs.font.monospaced);
        assert_eq!(
            attrs.foreground,
            sheet.resolved_style(MarkupElementType::InlineCode).foreground_color
        );

        toggle(&mut text, 0..4, SyntaxToken::Code);
        let attrs = text.attributes_at(0).unwrap();
        assert!(!attrs.font.monospaced);
        assert_eq!(
            attrs.foreground,
            sheet.resolved_style(MarkupElementType::Paragraph).foreground_color
        );
    }

    #[test]
    fn test_toggle_keeps_link_type() {
        let mut text = rich("[x](u)");
        toggle(&mut text, 0..1, SyntaxToken::Emphasis);
        let attrs = text.attributes_at(0).unwrap();
        assert_eq!(attrs.recovery.element_type.as_deref(), Some("link"));
        assert!(attrs.font.italic);
    }

    #[test]
    fn test_typing_toggle() {
        let mut attrs = TextAttributes::default();
        let sheet = StyleSheet::default_sheet();
        assert!(toggle_typing_syntax(&mut attrs, SyntaxToken::Strikethrough, &sheet, MarkupElementType::Paragraph));
        assert!(attrs.strikethrough);
        assert!(!toggle_typing_syntax(&mut attrs, SyntaxToken::Strikethrough, &sheet, MarkupElementType::Paragraph));
        assert!(!attrs.strikethrough);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection state
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_common_syntax_intersects_runs() {
        let text = rich("**a *b***");
        assert_eq!(text.as_str(), "a b");
        assert_eq!(common_syntax(&text, 0..3), vec![SyntaxToken::Strong]);
        assert_eq!(
            common_syntax(&text, 2..3),
            vec![SyntaxToken::Strong, SyntaxToken::Emphasis]
        );
    }

    #[test]
    fn test_common_syntax_collapsed_uses_typing_attributes() {
        let text = rich("a *b* c");
        assert_eq!(common_syntax(&text, 3..3), vec![SyntaxToken::Emphasis]);
        assert!(common_syntax(&text, 1..1).is_empty());
    }

    #[test]
    fn test_active_inline_type_priority() {
        use SyntaxToken::*;
        assert_eq!(
            active_inline_element_type(&[Emphasis, Strong, Code]),
            Some(MarkupElementType::InlineCode)
        );
        assert_eq!(
            active_inline_element_type(&[Emphasis, Strikethrough]),
            Some(MarkupElementType::Strikethrough)
        );
        assert_eq!(
            active_inline_element_type(&[Emphasis, Strong]),
            Some(MarkupElementType::Strong)
        );
        assert_eq!(active_inline_element_type(&[]), None);

        let state = FormattingState::from_tokens(vec![Strong]);
        assert!(state.is_bold && !state.is_italic);
    }
}
