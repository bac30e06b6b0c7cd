//! Styled render tree
//!
//! Blocks live in a flat arena and refer to their children by `BlockIndex`,
//! so two trees rendered from the same source compare by value. A block's
//! `BlockId` is derived from its element type, its source start and the
//! render generation, which lets a view layer tell post-rerender blocks
//! apart from the ones it is currently editing.

use crate::markdown::SourcePosition;
use crate::style::{ElementStyle, MarkupElementType};
use serde::{Deserialize, Serialize};
use std::fmt;

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Tokens
// ─────────────────────────────────────────────────────────────────────────────

/// Inline delimiter recorded on a run so reconstruction can re-emit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxToken {
    /// `*`
    Emphasis,
    /// `**`
    Strong,
    /// `~~`
    Strikethrough,
    /// `` ` ``
    Code,
}

impl SyntaxToken {
    pub const ALL: [SyntaxToken; 4] = [
        SyntaxToken::Emphasis,
        SyntaxToken::Strong,
        SyntaxToken::Strikethrough,
        SyntaxToken::Code,
    ];

    /// The literal markdown delimiter.
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntaxToken::Emphasis => "*",
            SyntaxToken::Strong => "**",
            SyntaxToken::Strikethrough => "~~",
            SyntaxToken::Code => "`",
        }
    }

    /// Parse a delimiter; `_`/`__` are accepted as emphasis/strong.
    pub fn parse(raw: &str) -> Option<SyntaxToken> {
        match raw {
            "*" | "_" => Some(SyntaxToken::Emphasis),
            "**" | "__" => Some(SyntaxToken::Strong),
            "~~" => Some(SyntaxToken::Strikethrough),
            "`" => Some(SyntaxToken::Code),
            _ => None,
        }
    }

    /// Inline element type this delimiter produces.
    pub fn element_type(&self) -> MarkupElementType {
        match self {
            SyntaxToken::Emphasis => MarkupElementType::Emphasis,
            SyntaxToken::Strong => MarkupElementType::Strong,
            SyntaxToken::Strikethrough => MarkupElementType::Strikethrough,
            SyntaxToken::Code => MarkupElementType::InlineCode,
        }
    }
}

impl fmt::Display for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

/// Stable block identity from the element type, the full source range and
/// the render generation: `<type>-<line>-<col>-<end line>-<end col>-g<generation>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(element_type: MarkupElementType, position: &SourcePosition, generation: u64) -> Self {
        BlockId(format!(
            "{}-{}-{}-{}-{}-g{}",
            element_type.raw_name(),
            position.start_line,
            position.start_column,
            position.end_line,
            position.end_column,
            generation
        ))
    }

    /// Identity of a table cell, unique within the document.
    pub fn table_cell(table: &BlockId, row: Option<usize>, column: usize) -> Self {
        match row {
            None => BlockId(format!("{}-header-{}", table.0, column)),
            Some(row) => BlockId(format!("{}-row-{}-{}", table.0, row, column)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for BlockId {
    fn from(raw: &str) -> Self {
        BlockId(raw.to_string())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle into `RenderTree::blocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockIndex(pub usize);

// ─────────────────────────────────────────────────────────────────────────────
// Runs, Cells, Blocks
// ─────────────────────────────────────────────────────────────────────────────

/// Atomic piece of inline content.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledRun {
    pub text: String,
    pub element_type: MarkupElementType,
    pub style: ElementStyle,
    pub destination: Option<String>,
    /// Outermost delimiter first.
    pub syntax: Vec<SyntaxToken>,
}

impl StyledRun {
    pub fn plain(text: impl Into<String>, style: ElementStyle) -> Self {
        Self {
            text: text.into(),
            element_type: MarkupElementType::Text,
            style,
            destination: None,
            syntax: Vec::new(),
        }
    }
}

/// One grid cell of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledTableCell {
    pub id: BlockId,
    pub runs: Vec<StyledRun>,
    pub style: ElementStyle,
    pub is_header: bool,
    pub position: SourcePosition,
}

impl StyledTableCell {
    pub fn text(&self) -> String {
        runs_text(&self.runs)
    }

    fn same_content(&self, other: &StyledTableCell) -> bool {
        self.runs == other.runs
            && self.style == other.style
            && self.is_header == other.is_header
            && self.position == other.position
    }
}

/// Payload of a block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Inline(Vec<StyledRun>),
    Children(Vec<BlockIndex>),
    Code { language: Option<String>, text: String },
    ThematicBreak,
    Image { source: String, alt: String },
    Table {
        header: Vec<StyledTableCell>,
        rows: Vec<Vec<StyledTableCell>>,
    },
    ListItem { marker: String, children: Vec<BlockIndex> },
}

impl BlockContent {
    fn same_content(&self, other: &BlockContent) -> bool {
        match (self, other) {
            (
                BlockContent::Table { header, rows },
                BlockContent::Table {
                    header: other_header,
                    rows: other_rows,
                },
            ) => {
                header.len() == other_header.len()
                    && header.iter().zip(other_header).all(|(a, b)| a.same_content(b))
                    && rows.len() == other_rows.len()
                    && rows.iter().zip(other_rows).all(|(a, b)| {
                        a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_content(y))
                    })
            }
            _ => self == other,
        }
    }
}

/// A node of the render tree.
#[derive(Debug, Clone, PartialEq)]
pub struct StyledBlock {
    pub id: BlockId,
    pub element_type: MarkupElementType,
    pub style: ElementStyle,
    pub position: SourcePosition,
    pub content: BlockContent,
    /// Heading slug for fragment links, headings only
    pub anchor: Option<String>,
}

impl StyledBlock {
    /// Child handles for containers and list items.
    pub fn children(&self) -> &[BlockIndex] {
        match &self.content {
            BlockContent::Children(children) | BlockContent::ListItem { children, .. } => children,
            _ => &[],
        }
    }

    /// Runs for inline blocks.
    pub fn runs(&self) -> Option<&[StyledRun]> {
        match &self.content {
            BlockContent::Inline(runs) => Some(runs),
            _ => None,
        }
    }

    /// Visible text of an inline or code block.
    pub fn text(&self) -> Option<String> {
        match &self.content {
            BlockContent::Inline(runs) => Some(runs_text(runs)),
            BlockContent::Code { text, .. } => Some(text.clone()),
            _ => None,
        }
    }

    /// Whether a view should present this block as an editable text region.
    pub fn is_editable(&self) -> bool {
        matches!(self.content, BlockContent::Inline(_) | BlockContent::Code { .. })
    }

    fn same_content(&self, other: &StyledBlock) -> bool {
        self.element_type == other.element_type
            && self.style == other.style
            && self.position == other.position
            && self.anchor == other.anchor
            && self.content.same_content(&other.content)
    }
}

/// Concatenated text of a run sequence.
pub fn runs_text(runs: &[StyledRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

/// GitHub-style heading slug: lowercase, spaces to `-`, punctuation dropped.
pub fn heading_slug(text: &str) -> String {
    text.trim()
        .chars()
        .filter_map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                Some(c.to_lowercase().collect::<String>())
            } else if c.is_whitespace() {
                Some("-".to_string())
            } else {
                None
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Render Tree
// ─────────────────────────────────────────────────────────────────────────────

/// Arena of styled blocks in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderTree {
    blocks: Vec<StyledBlock>,
    parents: Vec<Option<BlockIndex>>,
    roots: Vec<BlockIndex>,
    generation: u64,
}

impl RenderTree {
    pub(crate) fn new(generation: u64) -> Self {
        Self {
            generation,
            ..Default::default()
        }
    }

    /// Append a block and return its handle. Children must already be
    /// pushed; their parent links are filled in here.
    pub(crate) fn push(&mut self, block: StyledBlock) -> BlockIndex {
        let index = BlockIndex(self.blocks.len());
        for child in block.children() {
            if let Some(slot) = self.parents.get_mut(child.0) {
                *slot = Some(index);
            }
        }
        self.blocks.push(block);
        self.parents.push(None);
        index
    }

    pub(crate) fn set_roots(&mut self, roots: Vec<BlockIndex>) {
        self.roots = roots;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Top-level blocks in document order.
    pub fn roots(&self) -> &[BlockIndex] {
        &self.roots
    }

    pub fn get(&self, index: BlockIndex) -> Option<&StyledBlock> {
        self.blocks.get(index.0)
    }

    pub fn parent(&self, index: BlockIndex) -> Option<BlockIndex> {
        self.parents.get(index.0).copied().flatten()
    }

    pub fn index_of(&self, id: &BlockId) -> Option<BlockIndex> {
        self.blocks.iter().position(|b| &b.id == id).map(BlockIndex)
    }

    pub fn block(&self, id: &BlockId) -> Option<&StyledBlock> {
        self.index_of(id).and_then(|i| self.get(i))
    }

    /// Locate a table cell and its table.
    pub fn cell(&self, id: &BlockId) -> Option<(&StyledBlock, &StyledTableCell)> {
        self.blocks.iter().find_map(|block| match &block.content {
            BlockContent::Table { header, rows } => header
                .iter()
                .chain(rows.iter().flatten())
                .find(|cell| &cell.id == id)
                .map(|cell| (block, cell)),
            _ => None,
        })
    }

    /// Nearest ancestor's element type, used as the container style target.
    pub fn parent_type(&self, id: &BlockId) -> Option<MarkupElementType> {
        let index = self.index_of(id)?;
        self.parent(index)
            .and_then(|p| self.get(p))
            .map(|b| b.element_type)
    }

    /// Depth-first document-order walk.
    pub fn preorder(&self) -> Vec<BlockIndex> {
        let mut out = Vec::with_capacity(self.blocks.len());
        let mut stack: Vec<BlockIndex> = self.roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            out.push(index);
            if let Some(block) = self.get(index) {
                stack.extend(block.children().iter().rev().copied());
            }
        }
        out
    }

    /// Ids of text-editable blocks in document order.
    pub fn flat_editable_block_ids(&self) -> Vec<BlockId> {
        self.preorder()
            .into_iter()
            .filter_map(|i| self.get(i))
            .filter(|b| b.is_editable())
            .map(|b| b.id.clone())
            .collect()
    }

    /// Deepest block whose line range contains `line`.
    pub fn block_containing_line(&self, line: usize) -> Option<&StyledBlock> {
        let mut found = None;
        let mut level: &[BlockIndex] = &self.roots;
        loop {
            let hit = level
                .iter()
                .filter_map(|i| self.get(*i))
                .find(|b| b.position.contains_line(line));
            match hit {
                Some(block) => {
                    found = Some(block);
                    level = block.children();
                }
                None => return found,
            }
        }
    }

    /// Heading whose slug equals `anchor` (a leading `#` is ignored).
    pub fn block_for_anchor(&self, anchor: &str) -> Option<&StyledBlock> {
        let anchor = anchor.strip_prefix('#').unwrap_or(anchor);
        self.preorder()
            .into_iter()
            .filter_map(|i| self.get(i))
            .find(|b| b.anchor.as_deref() == Some(anchor))
    }

    /// Structural equality ignoring block and cell identities.
    pub fn same_content(&self, other: &RenderTree) -> bool {
        self.roots == other.roots
            && self.parents == other.parents
            && self.blocks.len() == other.blocks.len()
            && self
                .blocks
                .iter()
                .zip(&other.blocks)
                .all(|(a, b)| a.same_content(b))
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyledBlock> {
        self.blocks.iter()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
