//! Editing session for the focused block
//!
//! The view reports what the user did (text replaced, selection moved,
//! format toggled) and the session applies it to its own copy of the block's
//! rich text. The coordinator reads back the reconstructed markdown after
//! each change.

use crate::reconstruct::reconstruct;
use crate::render::{BlockContent, BlockId, RenderTree, StyledRun, SyntaxToken};
use crate::rich_text::{
    common_syntax, encode, encode_code_block, run_attributes, toggle_syntax, toggle_typing_syntax,
    FormattingState, RichText, TextAttributes,
};
use crate::string_utils::snap_range;
use crate::style::{ElementStyle, MarkupElementType, StyleSheet};
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct EditSession {
    pub block_id: BlockId,
    pub element_type: MarkupElementType,
    /// Nearest container's type, if the block is nested
    pub parent_type: Option<MarkupElementType>,
    /// Fence info for code blocks
    pub language: Option<String>,
    pub is_cell: bool,
    text: RichText,
    selection: Range<usize>,
    typing: TextAttributes,
    fallback: TextAttributes,
}

impl EditSession {
    /// Start editing block or table cell `id` of `tree`. `None` when the id
    /// is unknown or names a block without editable text.
    pub fn open(tree: &RenderTree, id: &BlockId, at_end: bool) -> Option<Self> {
        let mut session = match tree.block(id) {
            Some(block) => {
                let (text, language) = match &block.content {
                    BlockContent::Inline(runs) => (encode(runs), None),
                    BlockContent::Code { language, text } => {
                        (encode_code_block(text, &block.style), language.clone())
                    }
                    _ => return None,
                };
                Self::new(
                    id.clone(),
                    block.element_type,
                    tree.parent_type(id),
                    language,
                    false,
                    text,
                    &block.style,
                )
            }
            None => {
                let (table, cell) = tree.cell(id)?;
                let element_type = if cell.is_header {
                    MarkupElementType::TableHeader
                } else {
                    MarkupElementType::TableCell
                };
                Self::new(
                    id.clone(),
                    element_type,
                    Some(table.element_type),
                    None,
                    true,
                    encode(&cell.runs),
                    &cell.style,
                )
            }
        };
        let cursor = if at_end { session.text.len() } else { 0 };
        session.set_selection(cursor..cursor);
        Some(session)
    }

    fn new(
        block_id: BlockId,
        element_type: MarkupElementType,
        parent_type: Option<MarkupElementType>,
        language: Option<String>,
        is_cell: bool,
        text: RichText,
        style: &ElementStyle,
    ) -> Self {
        let mut fallback = run_attributes(&StyledRun::plain("", style.clone()));
        if element_type == MarkupElementType::CodeBlock {
            fallback.recovery.element_type = Some(element_type.raw_name().to_string());
        }
        Self {
            block_id,
            element_type,
            parent_type,
            language,
            is_cell,
            text,
            selection: 0..0,
            typing: fallback.clone(),
            fallback,
        }
    }

    /// Continue from text edited earlier in the same render generation.
    pub fn restore(&mut self, text: RichText, at_end: bool) {
        self.text = text;
        let cursor = if at_end { self.text.len() } else { 0 };
        self.set_selection(cursor..cursor);
    }

    pub fn text(&self) -> &RichText {
        &self.text
    }

    pub fn selection(&self) -> Range<usize> {
        self.selection.clone()
    }

    pub fn typing_attributes(&self) -> &TextAttributes {
        &self.typing
    }

    pub fn is_code(&self) -> bool {
        self.element_type == MarkupElementType::CodeBlock
    }

    /// Move the selection. A collapsed selection picks up the typing
    /// attributes of the text before it.
    pub fn set_selection(&mut self, range: Range<usize>) {
        let (start, end) = snap_range(self.text.as_str(), range.start, range.end.max(range.start));
        self.selection = start..end;
        self.typing = self
            .text
            .typing_attributes(start)
            .unwrap_or_else(|| self.fallback.clone());
    }

    /// Replace `range` with `inserted` using the current typing attributes.
    /// The cursor lands after the insertion.
    pub fn replace(&mut self, range: Range<usize>, inserted: &str) {
        let (start, end) = snap_range(self.text.as_str(), range.start, range.end.max(range.start));
        let attributes = if start == self.selection.start && self.selection.is_empty() {
            self.typing.clone()
        } else {
            self.text
                .typing_attributes(start)
                .unwrap_or_else(|| self.fallback.clone())
        };
        self.text.replace_range(start..end, inserted, attributes);
        let cursor = start + inserted.len();
        self.selection = cursor..cursor;
    }

    /// Toggle `token` over the selection, or on the typing attributes when
    /// the selection is collapsed. `Some(true)` when the text changed and
    /// must be written back, `None` for code blocks.
    pub fn toggle(&mut self, token: SyntaxToken, stylesheet: &StyleSheet) -> Option<bool> {
        if self.is_code() {
            return None;
        }
        if self.selection.is_empty() {
            toggle_typing_syntax(&mut self.typing, token, stylesheet, self.element_type);
            return Some(false);
        }
        toggle_syntax(
            &mut self.text,
            self.selection.clone(),
            token,
            stylesheet,
            self.element_type,
        );
        Some(true)
    }

    /// Tokens active at the selection, for toolbar state.
    pub fn formatting_state(&self) -> FormattingState {
        let tokens = if self.selection.is_empty() {
            self.typing.recovery.syntax_tokens()
        } else {
            common_syntax(&self.text, self.selection.clone())
        };
        FormattingState::from_tokens(tokens)
    }

    /// Markdown for the block's source range.
    pub fn markdown(&self) -> String {
        reconstruct(&self.text, self.element_type, self.language.as_deref())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
