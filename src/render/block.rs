//! Block renderer
//!
//! Walks block-level AST nodes in document order and fills a `RenderTree`
//! arena. Leaf content goes through the `InlineRenderer`. Children are pushed
//! before their parent, so a parent's handle is always greater than its
//! children's.

use super::inline::InlineRenderer;
use super::tree::{
    heading_slug, runs_text, BlockContent, BlockId, BlockIndex, RenderTree, StyledBlock,
    StyledTableCell,
};
use crate::markdown::{parse_markdown, MarkdownNode, MarkdownOptions, NodeKind, SourcePosition};
use crate::style::{ElementStyle, MarkupElementType, StyleSheet};
use log::debug;

/// Bullet glyph for unordered list items.
pub const BULLET_MARKER: &str = "\u{2022}";
pub const TASK_CHECKED_MARKER: &str = "☑";
pub const TASK_UNCHECKED_MARKER: &str = "☐";

/// Parse `source` and render it in one step.
pub fn render_source(
    source: &str,
    stylesheet: &StyleSheet,
    options: &MarkdownOptions,
    generation: u64,
) -> RenderTree {
    let document = parse_markdown(source, options);
    BlockRenderer::new(stylesheet, generation).render_document(&document)
}

pub struct BlockRenderer<'a> {
    stylesheet: &'a StyleSheet,
    inline: InlineRenderer<'a>,
    generation: u64,
}

impl<'a> BlockRenderer<'a> {
    pub fn new(stylesheet: &'a StyleSheet, generation: u64) -> Self {
        Self {
            stylesheet,
            inline: InlineRenderer::new(stylesheet),
            generation,
        }
    }

    /// Render a `Document` node into a fresh tree.
    pub fn render_document(&self, document: &MarkdownNode) -> RenderTree {
        let mut tree = RenderTree::new(self.generation);
        let roots = self.render_children(&mut tree, document, false);
        tree.set_roots(roots);
        debug!(
            "Rendered {} block(s) at generation {}",
            tree.len(),
            self.generation
        );
        tree
    }

    fn render_children(
        &self,
        tree: &mut RenderTree,
        node: &MarkdownNode,
        inside_list_item: bool,
    ) -> Vec<BlockIndex> {
        node.children
            .iter()
            .filter_map(|child| self.render_block(tree, child, inside_list_item))
            .collect()
    }

    fn render_block(
        &self,
        tree: &mut RenderTree,
        node: &MarkdownNode,
        inside_list_item: bool,
    ) -> Option<BlockIndex> {
        let pos = node.position;

        match &node.kind {
            NodeKind::Heading { level } => {
                let element_type = MarkupElementType::heading(*level);
                let style = self.style(element_type);
                let runs = self.inline.render_inlines(&node.children, &style);
                let anchor = Some(heading_slug(&runs_text(&runs)));
                Some(self.push(tree, element_type, style, pos, BlockContent::Inline(runs), anchor))
            }

            NodeKind::Paragraph => {
                if let [only] = node.children.as_slice() {
                    if let NodeKind::Image { url, .. } = &only.kind {
                        let content = BlockContent::Image {
                            source: url.clone(),
                            alt: only.text_content(),
                        };
                        let style = self.style(MarkupElementType::Image);
                        return Some(self.push(tree, MarkupElementType::Image, style, pos, content, None));
                    }
                }
                let mut style = self.style(MarkupElementType::Paragraph);
                if inside_list_item {
                    // Paragraph line gap must not cascade into list items.
                    style.line_spacing = self.style(MarkupElementType::ListItem).line_spacing;
                }
                let runs = self.inline.render_inlines(&node.children, &style);
                Some(self.push(tree, MarkupElementType::Paragraph, style, pos, BlockContent::Inline(runs), None))
            }

            NodeKind::BlockQuote => {
                let children = self.render_children(tree, node, false);
                let style = self.style(MarkupElementType::BlockQuote);
                Some(self.push(tree, MarkupElementType::BlockQuote, style, pos, BlockContent::Children(children), None))
            }

            NodeKind::CodeBlock { info, literal, .. } => {
                let language = info.split_whitespace().next().map(str::to_string);
                Some(self.push_code(tree, pos, language, literal))
            }

            NodeKind::HtmlBlock(raw) => Some(self.push_code(tree, pos, Some("html".to_string()), raw)),

            NodeKind::List { ordered, start, .. } => {
                let list_type = if *ordered {
                    MarkupElementType::OrderedList
                } else {
                    MarkupElementType::UnorderedList
                };
                let items: Vec<BlockIndex> = node
                    .children
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| match item.kind {
                        NodeKind::Item { task } => {
                            let marker = match task {
                                Some(true) => TASK_CHECKED_MARKER.to_string(),
                                Some(false) => TASK_UNCHECKED_MARKER.to_string(),
                                None if *ordered => format!("{}.", start + index),
                                None => BULLET_MARKER.to_string(),
                            };
                            Some(self.render_list_item(tree, item, marker))
                        }
                        _ => None,
                    })
                    .collect();
                let style = self.style(list_type);
                Some(self.push(tree, list_type, style, pos, BlockContent::Children(items), None))
            }

            NodeKind::ThematicBreak => {
                let style = self.style(MarkupElementType::ThematicBreak);
                Some(self.push(tree, MarkupElementType::ThematicBreak, style, pos, BlockContent::ThematicBreak, None))
            }

            NodeKind::Table { .. } => Some(self.render_table(tree, node)),

            _ => {
                // Best effort: flatten whatever inline content is reachable.
                let style = self.style(MarkupElementType::Paragraph);
                let runs = self.inline.render_inlines(&node.children, &style);
                if runs.iter().all(|r| r.text.is_empty()) {
                    debug!("Dropping unrenderable node at {}", pos);
                    return None;
                }
                Some(self.push(tree, MarkupElementType::Paragraph, style, pos, BlockContent::Inline(runs), None))
            }
        }
    }

    fn render_list_item(&self, tree: &mut RenderTree, item: &MarkdownNode, marker: String) -> BlockIndex {
        let children = self.render_children(tree, item, true);
        let style = self.style(MarkupElementType::ListItem);
        self.push(
            tree,
            MarkupElementType::ListItem,
            style,
            item.position,
            BlockContent::ListItem { marker, children },
            None,
        )
    }

    fn render_table(&self, tree: &mut RenderTree, table: &MarkdownNode) -> BlockIndex {
        let table_id = BlockId::new(MarkupElementType::Table, &table.position, self.generation);
        let header_style = self.style(MarkupElementType::TableHeader);
        let cell_style = self.style(MarkupElementType::TableCell);

        let mut header = Vec::new();
        let mut rows = Vec::new();
        for row in &table.children {
            let is_header = matches!(row.kind, NodeKind::TableRow { header: true });
            let style = if is_header { &header_style } else { &cell_style };
            let row_index = if is_header { None } else { Some(rows.len()) };
            let cells: Vec<StyledTableCell> = row
                .children
                .iter()
                .enumerate()
                .map(|(column, cell)| StyledTableCell {
                    id: BlockId::table_cell(&table_id, row_index, column),
                    runs: self.inline.render_inlines(&cell.children, style),
                    style: style.clone(),
                    is_header,
                    position: cell.position,
                })
                .collect();
            if is_header {
                header = cells;
            } else {
                rows.push(cells);
            }
        }

        let style = self.style(MarkupElementType::Table);
        self.push(
            tree,
            MarkupElementType::Table,
            style,
            table.position,
            BlockContent::Table { header, rows },
            None,
        )
    }

    fn push_code(
        &self,
        tree: &mut RenderTree,
        pos: SourcePosition,
        language: Option<String>,
        literal: &str,
    ) -> BlockIndex {
        let text = literal.strip_suffix('\n').unwrap_or(literal).to_string();
        let style = self.style(MarkupElementType::CodeBlock);
        self.push(
            tree,
            MarkupElementType::CodeBlock,
            style,
            pos,
            BlockContent::Code { language, text },
            None,
        )
    }

    fn push(
        &self,
        tree: &mut RenderTree,
        element_type: MarkupElementType,
        style: ElementStyle,
        position: SourcePosition,
        content: BlockContent,
        anchor: Option<String>,
    ) -> BlockIndex {
        tree.push(StyledBlock {
            id: BlockId::new(element_type, &position, self.generation),
            element_type,
            style,
            position,
            content,
            anchor,
        })
    }

    fn style(&self, element_type: MarkupElementType) -> ElementStyle {
        self.stylesheet.resolved_style(element_type)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
