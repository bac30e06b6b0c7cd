//! Markdown parser integration using comrak
//!
//! comrak's arena-allocated AST is converted into an owned `MarkdownNode`
//! tree whose `NodeKind` covers exactly the shapes the renderer understands.
//! Anything else becomes `NodeKind::Other` and is handled best-effort.

use super::position::SourcePosition;
use comrak::{
    nodes::{AstNode, ListType as ComrakListType, NodeValue},
    parse_document, Arena, Options,
};
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Parser Options
// ─────────────────────────────────────────────────────────────────────────────

/// GitHub Flavored Markdown extensions to enable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable autolink URLs and emails
    pub autolink: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            autolink: true,
            tasklist: true,
        }
    }
}

impl MarkdownOptions {
    /// Convert to comrak Options.
    fn to_comrak_options(&self) -> Options {
        let mut options = Options::default();
        options.extension.strikethrough = self.strikethrough;
        options.extension.table = self.tables;
        options.extension.autolink = self.autolink;
        options.extension.tasklist = self.tasklist;
        options
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// AST Types
// ─────────────────────────────────────────────────────────────────────────────

/// Node shapes the renderer dispatches on.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    BlockQuote,
    List { ordered: bool, start: usize, tight: bool },
    /// List item; `task` is `Some(checked)` for task list items
    Item { task: Option<bool> },
    CodeBlock { info: String, literal: String, fenced: bool },
    HtmlBlock(String),
    Paragraph,
    Heading { level: u8 },
    ThematicBreak,
    Table { num_columns: usize },
    TableRow { header: bool },
    TableCell,
    Text(String),
    SoftBreak,
    LineBreak,
    Code(String),
    HtmlInline(String),
    Emphasis,
    Strong,
    Strikethrough,
    Link { url: String, title: String },
    Image { url: String, title: String },
    /// Any node without a dedicated rendering (footnotes, front matter, ...)
    Other,
}

/// One node of the converted AST.
#[derive(Debug, Clone)]
pub struct MarkdownNode {
    pub kind: NodeKind,
    pub position: SourcePosition,
    pub children: Vec<MarkdownNode>,
}

impl MarkdownNode {
    /// Flattened text of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, output: &mut String) {
        match &self.kind {
            NodeKind::Text(t) | NodeKind::Code(t) | NodeKind::HtmlInline(t) => output.push_str(t),
            NodeKind::CodeBlock { literal, .. } => output.push_str(literal),
            NodeKind::SoftBreak => output.push(' '),
            NodeKind::LineBreak => output.push('\n'),
            _ => {}
        }
        for child in &self.children {
            child.collect_text(output);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Public API Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Parse markdown text into a `Document` node. Total: malformed input still
/// yields a tree, comrak never rejects text.
pub fn parse_markdown(markdown: &str, options: &MarkdownOptions) -> MarkdownNode {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &options.to_comrak_options());
    let mut document = convert_node(root);
    let lines: Vec<&str> = markdown.split('\n').collect();
    tighten_cell_positions(&mut document, &lines);
    document
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal Conversion Functions
// ─────────────────────────────────────────────────────────────────────────────

fn convert_node<'a>(node: &'a AstNode<'a>) -> MarkdownNode {
    let ast = node.data.borrow();
    let kind = convert_node_value(&ast.value);
    let position = SourcePosition::from_comrak(ast.sourcepos);
    drop(ast);

    MarkdownNode {
        kind,
        position,
        children: node.children().map(convert_node).collect(),
    }
}

/// Narrow table cell ranges to the cell's content, dropping the padding and
/// pipes comrak may include, so a patch replaces only what the cell shows.
fn tighten_cell_positions(node: &mut MarkdownNode, lines: &[&str]) {
    if node.kind == NodeKind::TableCell && node.position.start_line == node.position.end_line {
        if let Some(line) = lines.get(node.position.start_line - 1) {
            let start = (node.position.start_column - 1).min(line.len());
            let end = (node.position.end_column - 1).clamp(start, line.len());
            if let Some(cell) = line.get(start..end) {
                let leading = cell.len() - cell.trim_start_matches(|c: char| c == '|' || c.is_whitespace()).len();
                let mut body = cell[leading..].trim_end();
                if body.ends_with('|') && !body.ends_with("\\|") {
                    body = body[..body.len() - 1].trim_end();
                }
                let content_start = start + leading;
                node.position.start_column = content_start + 1;
                node.position.end_column = content_start + body.len() + 1;
            }
        }
    }
    for child in &mut node.children {
        tighten_cell_positions(child, lines);
    }
}

fn convert_node_value(value: &NodeValue) -> NodeKind {
    match value {
        NodeValue::Document => NodeKind::Document,
        NodeValue::BlockQuote => NodeKind::BlockQuote,
        NodeValue::List(list) => NodeKind::List {
            ordered: matches!(list.list_type, ComrakListType::Ordered),
            start: list.start,
            tight: list.tight,
        },
        NodeValue::Item(_) => NodeKind::Item { task: None },
        NodeValue::TaskItem(symbol) => NodeKind::Item {
            task: Some(matches!(symbol, Some('x') | Some('X'))),
        },
        NodeValue::CodeBlock(code) => NodeKind::CodeBlock {
            info: code.info.clone(),
            literal: code.literal.clone(),
            fenced: code.fenced,
        },
        NodeValue::HtmlBlock(html) => NodeKind::HtmlBlock(html.literal.clone()),
        NodeValue::Paragraph => NodeKind::Paragraph,
        NodeValue::Heading(heading) => NodeKind::Heading {
            level: heading.level,
        },
        NodeValue::ThematicBreak => NodeKind::ThematicBreak,
        NodeValue::Table(table) => NodeKind::Table {
            num_columns: table.num_columns,
        },
        NodeValue::TableRow(header) => NodeKind::TableRow { header: *header },
        NodeValue::TableCell => NodeKind::TableCell,
        NodeValue::Text(text) => NodeKind::Text(text.clone()),
        NodeValue::SoftBreak => NodeKind::SoftBreak,
        NodeValue::LineBreak => NodeKind::LineBreak,
        NodeValue::Code(code) => NodeKind::Code(code.literal.clone()),
        NodeValue::HtmlInline(html) => NodeKind::HtmlInline(html.clone()),
        NodeValue::Emph => NodeKind::Emphasis,
        NodeValue::Strong => NodeKind::Strong,
        NodeValue::Strikethrough => NodeKind::Strikethrough,
        NodeValue::Link(link) => NodeKind::Link {
            url: link.url.clone(),
            title: link.title.clone(),
        },
        NodeValue::Image(image) => NodeKind::Image {
            url: image.url.clone(),
            title: image.title.clone(),
        },
        _ => NodeKind::Other,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(markdown: &str) -> MarkdownNode {
        parse_markdown(markdown, &MarkdownOptions::default())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Block Structure
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_parse_empty_document() {
        let doc = parse("");
        assert_eq!(doc.kind, NodeKind::Document);
        assert!(doc.children.is_empty());
    }

    #[test]
    fn test_heading_level_and_position() {
        let doc = parse("# Hello World");
        let heading = &doc.children[0];
        assert_eq!(heading.kind, NodeKind::Heading { level: 1 });
        assert_eq!(heading.position, SourcePosition::new(1, 1, 1, 14));
    }

    #[test]
    fn test_paragraph_position_is_half_open() {
        let doc = parse("first\n\nHello world");
        let para = &doc.children[1];
        assert_eq!(para.kind, NodeKind::Paragraph);
        assert_eq!(para.position, SourcePosition::new(3, 1, 3, 12));
    }

    #[test]
    fn test_ordered_list_start() {
        let doc = parse("3. three\n4. four");
        let list = &doc.children[0];
        assert!(matches!(
            list.kind,
            NodeKind::List {
                ordered: true,
                start: 3,
                ..
            }
        ));
        assert_eq!(list.children.len(), 2);
    }

    #[test]
    fn test_task_items() {
        let doc = parse("- [ ] open\n- [x] done");
        let list = &doc.children[0];
        let tasks: Vec<_> = list
            .children
            .iter()
            .map(|item| match item.kind {
                NodeKind::Item { task } => task,
                _ => panic!("expected item, got {:?}", item.kind),
            })
            .collect();
        assert_eq!(tasks, vec![Some(false), Some(true)]);
    }

    #[test]
    fn test_fenced_code_block() {
        let doc = parse("```rust\nfn main() {}\n```");
        match &doc.children[0].kind {
            NodeKind::CodeBlock {
                info,
                literal,
                fenced,
            } => {
                assert_eq!(info, "rust");
                assert_eq!(literal, "fn main() {}\n");
                assert!(fenced);
            }
            other => panic!("expected code block, got {:?}", other),
        }
    }

    #[test]
    fn test_table_rows() {
        let doc = parse("| A | B |\n|---|---|\n| 1 | 2 |");
        let table = &doc.children[0];
        assert_eq!(table.kind, NodeKind::Table { num_columns: 2 });
        assert_eq!(table.children.len(), 2);
        assert_eq!(table.children[0].kind, NodeKind::TableRow { header: true });
        assert_eq!(table.children[1].children[1].text_content(), "2");
    }

    #[test]
    fn test_table_cell_positions_cover_content_only() {
        let doc = parse("| A | B |\n|---|---|\n| 1 |  two |");
        let row = &doc.children[0].children[1];
        assert_eq!(row.children[0].position, SourcePosition::new(3, 3, 3, 4));
        assert_eq!(row.children[1].position, SourcePosition::new(3, 8, 3, 11));
    }

    #[test]
    fn test_extensions_can_be_disabled() {
        let options = MarkdownOptions {
            tables: false,
            ..Default::default()
        };
        let doc = parse_markdown("| A | B |\n|---|---|\n| 1 | 2 |", &options);
        assert_eq!(doc.children[0].kind, NodeKind::Paragraph);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Inline Content
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_inline_nodes() {
        let doc = parse("a **b** *c* `d` ~~e~~ [f](http://x)");
        let kinds: Vec<&NodeKind> = doc.children[0].children.iter().map(|c| &c.kind).collect();
        assert!(kinds.contains(&&NodeKind::Strong));
        assert!(kinds.contains(&&NodeKind::Emphasis));
        assert!(kinds.contains(&&NodeKind::Code("d".to_string())));
        assert!(kinds.contains(&&NodeKind::Strikethrough));
        assert!(kinds.iter().any(|k| matches!(k, NodeKind::Link { url, .. } if url == "http://x")));
    }

    #[test]
    fn test_text_content_flattens_breaks() {
        let doc = parse("one\ntwo  \nthree");
        assert_eq!(doc.text_content(), "one two\nthree");
    }
}
