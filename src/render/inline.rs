//! Inline renderer
//!
//! Walks the inline children of a leaf block and flattens them into styled
//! runs. Styles accumulate down the tree: each emphasis, strong,
//! strikethrough or code node merges its own resolved style over its
//! parent's and pushes its delimiter onto a copy of the syntax stack.

use super::tree::{StyledRun, SyntaxToken};
use crate::markdown::{MarkdownNode, NodeKind};
use crate::style::{ElementStyle, MarkupElementType, StyleSheet};

/// Text shown for an image with no alt text.
pub const IMAGE_PLACEHOLDER: &str = "[image]";

pub struct InlineRenderer<'a> {
    stylesheet: &'a StyleSheet,
}

impl<'a> InlineRenderer<'a> {
    pub fn new(stylesheet: &'a StyleSheet) -> Self {
        Self { stylesheet }
    }

    /// Render a sequence of inline siblings under `parent_style`.
    pub fn render_inlines(&self, nodes: &[MarkdownNode], parent_style: &ElementStyle) -> Vec<StyledRun> {
        nodes
            .iter()
            .flat_map(|node| self.render_inline(node, parent_style, &[]))
            .collect()
    }

    fn render_inline(
        &self,
        node: &MarkdownNode,
        parent_style: &ElementStyle,
        stack: &[SyntaxToken],
    ) -> Vec<StyledRun> {
        match &node.kind {
            NodeKind::Text(text) => vec![self.run(text, parent_style, stack)],
            NodeKind::Emphasis => self.render_delimited(node, SyntaxToken::Emphasis, parent_style, stack),
            NodeKind::Strong => self.render_delimited(node, SyntaxToken::Strong, parent_style, stack),
            NodeKind::Strikethrough => {
                self.render_delimited(node, SyntaxToken::Strikethrough, parent_style, stack)
            }
            NodeKind::Code(code) => {
                let style = parent_style.merge(&self.stylesheet.resolved_style(MarkupElementType::InlineCode));
                vec![StyledRun {
                    text: code.clone(),
                    element_type: MarkupElementType::InlineCode,
                    style,
                    destination: None,
                    syntax: pushed(stack, SyntaxToken::Code),
                }]
            }
            NodeKind::Link { url, .. } => {
                let style = parent_style.merge(&self.stylesheet.resolved_style(MarkupElementType::Link));
                node.children
                    .iter()
                    .flat_map(|child| self.render_inline(child, &style, stack))
                    .map(|run| StyledRun {
                        element_type: MarkupElementType::Link,
                        destination: Some(url.clone()),
                        ..run
                    })
                    .collect()
            }
            NodeKind::Image { .. } => {
                let alt = node.text_content();
                let text = if alt.is_empty() { IMAGE_PLACEHOLDER } else { alt.as_str() };
                vec![self.run(text, parent_style, stack)]
            }
            NodeKind::HtmlInline(raw) => vec![self.run(raw, parent_style, stack)],
            NodeKind::SoftBreak => vec![self.run(" ", parent_style, stack)],
            NodeKind::LineBreak => vec![self.run("\n", parent_style, stack)],
            _ => node
                .children
                .iter()
                .flat_map(|child| self.render_inline(child, parent_style, stack))
                .collect(),
        }
    }

    /// Emphasis-like nodes retag only plain-text runs so an inner semantic
    /// type (a link or code span) survives nesting.
    fn render_delimited(
        &self,
        node: &MarkdownNode,
        token: SyntaxToken,
        parent_style: &ElementStyle,
        stack: &[SyntaxToken],
    ) -> Vec<StyledRun> {
        let element_type = token.element_type();
        let style = parent_style.merge(&self.stylesheet.resolved_style(element_type));
        let child_stack = pushed(stack, token);
        node.children
            .iter()
            .flat_map(|child| self.render_inline(child, &style, &child_stack))
            .map(|mut run| {
                if run.element_type == MarkupElementType::Text {
                    run.element_type = element_type;
                }
                run
            })
            .collect()
    }

    fn run(&self, text: &str, style: &ElementStyle, stack: &[SyntaxToken]) -> StyledRun {
        StyledRun {
            text: text.to_string(),
            element_type: MarkupElementType::Text,
            style: style.clone(),
            destination: None,
            syntax: stack.to_vec(),
        }
    }
}

fn pushed(stack: &[SyntaxToken], token: SyntaxToken) -> Vec<SyntaxToken> {
    let mut next = stack.to_vec();
    next.push(token);
    next
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
