//! Document Coordinator
//!
//! Owns the source text, the stylesheet, the render tree and the live
//! position overrides, and is the only place any of them change. Two paths
//! keep the source current:
//!
//! - Typing in a rendered block patches the source synchronously through
//!   the reconstructor and the patch engine. The render tree is left alone
//!   so the view keeps its identity and focus.
//! - Typing in the source pane arms a debounce timer; when it fires the
//!   whole document is re-rendered.
//!
//! Losing focus re-renders too, but one poll later, so focus moving straight
//! to another block cancels it.
//!
//! The view never shares mutable state with the coordinator: it sends
//! `ViewEvent`s and applies the `ViewCommand`s it gets back.

mod scheduler;
mod search;
mod session;

pub use scheduler::{Clock, ManualClock, Scheduler, SystemClock, TimerKind};
pub use search::{find_all, Highlight, SearchState};
pub use session::EditSession;

use crate::config::Settings;
use crate::document::MarkdownDocument;
use crate::error::{Error, Result};
use crate::markdown::{MarkdownOptions, SourcePosition};
use crate::patch::{patch_range, position_at, source_range, AppliedEdit, LiveOverrides};
use crate::render::{render_source, BlockId, RenderTree, SyntaxToken};
use crate::rich_text::{FormattingState, RichText};
use crate::style::{ElementStyle, MarkupElementType, StyleSheet};
use log::{debug, warn};
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Where the coordinator is in its edit cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    /// Render tree matches the source and no block has focus
    Idle,
    /// A rendered block has focus; the tree may be stale
    EditingBlock(BlockId),
    /// Source pane edits are waiting for the debounce to expire
    PendingRerender,
}

/// Something the user did in a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    SourceEdited(String),
    BlockFocused { id: BlockId, at_end: bool },
    BlockBlurred(BlockId),
    /// Text of the focused block replaced, in rich-text byte offsets
    TextReplaced { range: Range<usize>, text: String },
    SelectionChanged(Range<usize>),
    ToggleFormatting(SyntaxToken),
    CellEditingFinished,
    NavigatePrevious,
    NavigateNext,
    LinkActivated(String),
    StyleChanged {
        element_type: MarkupElementType,
        style: ElementStyle,
    },
    /// Event loop heartbeat; fires due timers
    Tick,
}

/// What the view should do in response.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    /// Drop every block view and rebuild from `render_tree()`
    ReplaceRenderTree { generation: u64 },
    /// Replace the focused block's attributed text
    SetBlockText {
        id: BlockId,
        text: RichText,
        selection: Range<usize>,
    },
    SetFormattingState(FormattingState),
    FocusBlock { id: BlockId, at_end: bool },
    ScrollToBlock(BlockId),
}

// ─────────────────────────────────────────────────────────────────────────────
// Coordinator
// ─────────────────────────────────────────────────────────────────────────────

pub struct DocumentCoordinator<C: Clock = SystemClock> {
    clock: C,
    debounce: Duration,
    markdown: MarkdownOptions,
    document: MarkdownDocument,
    stylesheet: StyleSheet,
    tree: RenderTree,
    live: LiveOverrides,
    scheduler: Scheduler,
    session: Option<EditSession>,
    /// Rich text of blocks edited since the last render; the tree still
    /// holds their old content
    edited: HashMap<BlockId, RichText>,
    style_target: Option<MarkupElementType>,
    editing_style: ElementStyle,
    save_error: Option<String>,
    search: SearchState,
    scroll_target: Option<BlockId>,
}

impl DocumentCoordinator<SystemClock> {
    pub fn new(settings: &Settings, stylesheet: StyleSheet) -> Self {
        Self::with_clock(settings, stylesheet, SystemClock)
    }
}

impl<C: Clock> DocumentCoordinator<C> {
    /// Coordinator showing the welcome document.
    pub fn with_clock(settings: &Settings, stylesheet: StyleSheet, clock: C) -> Self {
        let mut coordinator = Self {
            clock,
            debounce: settings.rerender_debounce(),
            markdown: settings.markdown.clone(),
            document: MarkdownDocument::default(),
            stylesheet,
            tree: RenderTree::default(),
            live: LiveOverrides::default(),
            scheduler: Scheduler::new(),
            session: None,
            edited: HashMap::new(),
            style_target: None,
            editing_style: ElementStyle::empty(),
            save_error: None,
            search: SearchState::new(),
            scroll_target: None,
        };
        coordinator.rerender();
        coordinator
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn source_text(&self) -> &str {
        &self.document.source_text
    }

    pub fn document(&self) -> &MarkdownDocument {
        &self.document
    }

    pub fn is_dirty(&self) -> bool {
        self.document.is_dirty
    }

    pub fn stylesheet(&self) -> &StyleSheet {
        &self.stylesheet
    }

    pub fn render_tree(&self) -> &RenderTree {
        &self.tree
    }

    pub fn generation(&self) -> u64 {
        self.tree.generation()
    }

    pub fn state(&self) -> EditorState {
        if let Some(session) = &self.session {
            EditorState::EditingBlock(session.block_id.clone())
        } else if self.scheduler.is_pending(TimerKind::Rerender) {
            EditorState::PendingRerender
        } else {
            EditorState::Idle
        }
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    pub fn editing_block_id(&self) -> Option<&BlockId> {
        self.session.as_ref().map(|s| &s.block_id)
    }

    pub fn editing_element_type(&self) -> Option<MarkupElementType> {
        self.session.as_ref().map(|s| s.element_type)
    }

    pub fn editing_parent_type(&self) -> Option<MarkupElementType> {
        self.session.as_ref().and_then(|s| s.parent_type)
    }

    pub fn save_error(&self) -> Option<&str> {
        self.save_error.as_deref()
    }

    pub fn dismiss_save_error(&mut self) {
        self.save_error = None;
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    /// Block the view should scroll to, consumed on read.
    pub fn take_scroll_target(&mut self) -> Option<BlockId> {
        self.scroll_target.take()
    }

    /// Current source position of block or cell `id`, corrected for edits
    /// made since the last render.
    pub fn current_position(&self, id: &BlockId) -> Option<SourcePosition> {
        let stale = self.stale_position(id)?;
        self.live.resolve(id, &stale, &self.document.source_text)
    }

    fn stale_position(&self, id: &BlockId) -> Option<SourcePosition> {
        self.tree
            .block(id)
            .map(|block| block.position)
            .or_else(|| self.tree.cell(id).map(|(_, cell)| cell.position))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering and Timers
    // ─────────────────────────────────────────────────────────────────────────

    /// Full re-render now. Ends any editing session and clears overrides.
    pub fn rerender(&mut self) {
        let generation = self.tree.generation() + 1;
        self.tree = render_source(
            &self.document.source_text,
            &self.stylesheet,
            &self.markdown,
            generation,
        );
        self.live.reset(&self.document.source_text);
        self.scheduler.cancel(TimerKind::Rerender);
        self.scheduler.cancel(TimerKind::FinishEditing);
        self.session = None;
        self.edited.clear();
    }

    /// Run due timers. Returns whether the tree was replaced.
    pub fn poll(&mut self) -> bool {
        let due = self.scheduler.take_due(self.clock.now());
        if due.is_empty() {
            return false;
        }
        if due.contains(&TimerKind::FinishEditing) {
            debug!(
                "Finishing edit of {}",
                self.editing_block_id().map(BlockId::as_str).unwrap_or("<none>")
            );
        }
        self.rerender();
        true
    }

    /// When the next timer is due, for an event loop deciding how long to wait.
    pub fn next_deadline(&self) -> Option<std::time::Instant> {
        self.scheduler.next_deadline()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Source Edits
    // ─────────────────────────────────────────────────────────────────────────

    /// Source pane edit: replace the whole text and arm the debounce.
    pub fn edit_source_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text == self.document.source_text {
            return;
        }
        let edit = AppliedEdit::between(&self.document.source_text, &text);
        self.document.source_text = text;
        self.live.record_unowned(edit);
        self.scheduler
            .schedule(TimerKind::Rerender, self.debounce, self.clock.now());
        self.source_changed();
    }

    /// Splice `markdown` over block `id`'s source range without re-rendering.
    /// Returns `false`, leaving the source untouched, when the block's range
    /// cannot be located.
    pub fn update_block_source(&mut self, id: &BlockId, markdown: &str) -> bool {
        let Some(position) = self.current_position(id) else {
            warn!("Dropping edit to {}: no resolvable source position", id);
            return false;
        };
        let Some(patch) = patch_range(&self.document.source_text, &position, markdown) else {
            warn!(
                "Dropping edit to {}: {} does not resolve in the current source",
                id, position
            );
            return false;
        };
        self.document.source_text = patch.text;
        self.live.record(id, patch.edit);
        self.source_changed();
        true
    }

    /// Splice `markdown` over a table cell's range. Pipes around the cell
    /// stay as they are.
    pub fn update_table_cell_source(&mut self, cell_id: &BlockId, markdown: &str) -> bool {
        if self.tree.cell(cell_id).is_none() {
            warn!("Dropping edit to {}: not a table cell", cell_id);
            return false;
        }
        self.update_block_source(cell_id, markdown)
    }

    fn source_changed(&mut self) {
        self.document.is_dirty = true;
        if self.search.is_visible {
            self.perform_search();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Focus and Editing
    // ─────────────────────────────────────────────────────────────────────────

    /// Give block or cell `id` focus. Cancels a pending blur re-render and
    /// captures the block's type as the style target.
    pub fn focus_block(&mut self, id: &BlockId, at_end: bool) -> bool {
        self.scheduler.cancel(TimerKind::FinishEditing);
        if self.editing_block_id() == Some(id) {
            return true;
        }
        let Some(mut session) = EditSession::open(&self.tree, id, at_end) else {
            debug!("Cannot focus {}: no editable text", id);
            return false;
        };
        if let Some(text) = self.edited.get(id) {
            session.restore(text.clone(), at_end);
        }
        debug!("Editing {} ({})", id, session.element_type);
        self.set_style_target(session.element_type);
        self.session = Some(session);
        true
    }

    /// Block `id` lost focus. The re-render waits one poll.
    pub fn blur_block(&mut self, id: &BlockId) {
        if self.editing_block_id() == Some(id) {
            self.scheduler
                .schedule(TimerKind::FinishEditing, Duration::ZERO, self.clock.now());
        }
    }

    /// Done with a table cell: re-render immediately.
    pub fn finish_editing_cell(&mut self) {
        self.rerender();
    }

    /// Replace `range` of the focused block's text and write it back.
    pub fn replace_text(&mut self, range: Range<usize>, text: &str) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.replace(range, text);
        self.commit_session()
    }

    pub fn set_selection(&mut self, range: Range<usize>) {
        if let Some(session) = self.session.as_mut() {
            session.set_selection(range);
        }
    }

    /// Toggle an inline delimiter on the focused block's selection, or on
    /// its typing attributes when nothing is selected.
    pub fn toggle_inline_formatting(&mut self, token: SyntaxToken) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        match session.toggle(token, &self.stylesheet) {
            None => false,
            Some(false) => true,
            Some(true) => self.commit_session(),
        }
    }

    /// Tokens shared by the focused block's selection.
    pub fn selection_state(&self) -> FormattingState {
        self.session
            .as_ref()
            .map(EditSession::formatting_state)
            .unwrap_or_default()
    }

    pub fn active_inline_element_type(&self) -> Option<MarkupElementType> {
        self.selection_state().active_inline_element_type()
    }

    fn commit_session(&mut self) -> bool {
        let Some(session) = &self.session else {
            return false;
        };
        let id = session.block_id.clone();
        let markdown = session.markdown();
        let text = session.text().clone();
        if !self.update_block_source(&id, &markdown) {
            return false;
        }
        self.edited.insert(id, text);
        true
    }

    /// Whether block `id` has edits the render tree does not show yet.
    pub fn has_pending_edits(&self, id: &BlockId) -> bool {
        self.edited.contains_key(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Styles
    // ─────────────────────────────────────────────────────────────────────────

    pub fn style_target(&self) -> Option<MarkupElementType> {
        self.style_target
    }

    /// Point the style editor at `element_type`, loading its resolved style.
    pub fn set_style_target(&mut self, element_type: MarkupElementType) {
        self.style_target = Some(element_type);
        self.editing_style = self.stylesheet.resolved_style(element_type);
    }

    pub fn editing_style(&self) -> &ElementStyle {
        &self.editing_style
    }

    pub fn set_editing_style(&mut self, style: ElementStyle) {
        self.editing_style = style;
    }

    /// Write the style editor's style back to its target type.
    pub fn apply_editing_style(&mut self) -> bool {
        let Some(target) = self.style_target.or(self.editing_element_type()) else {
            return false;
        };
        self.update_style(self.editing_style.clone(), target);
        true
    }

    /// Set a type's style and re-render immediately.
    pub fn update_style(&mut self, style: ElementStyle, element_type: MarkupElementType) {
        self.stylesheet.set_style(style, element_type);
        self.refresh_editing_style();
        self.rerender();
    }

    pub fn reset_stylesheet(&mut self) {
        self.set_stylesheet(StyleSheet::default_sheet());
    }

    pub fn set_stylesheet(&mut self, stylesheet: StyleSheet) {
        self.stylesheet = stylesheet;
        self.refresh_editing_style();
        self.rerender();
    }

    fn refresh_editing_style(&mut self) {
        if let Some(target) = self.style_target {
            self.editing_style = self.stylesheet.resolved_style(target);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Document Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Show `text` as a new unsaved, clean document.
    pub fn load_document(&mut self, text: impl Into<String>) {
        self.replace_document(MarkdownDocument::new(text));
    }

    pub fn load_document_from(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let document = MarkdownDocument::open(path)?;
        self.replace_document(document);
        Ok(())
    }

    /// Fresh untitled document with the welcome text.
    pub fn new_document(&mut self) {
        self.replace_document(MarkdownDocument::default());
    }

    /// Discard unsaved changes by reloading from disk.
    pub fn revert_to_saved(&mut self) -> Result<()> {
        let path = self.document.path.clone().ok_or(Error::NoDocumentPath)?;
        self.load_document_from(path)
    }

    /// Save to the document's path. A failure is kept as a dismissible
    /// message and the document stays dirty.
    pub fn save_document(&mut self) -> Result<()> {
        let result = self.document.save();
        self.record_save_result(result)
    }

    pub fn save_document_as(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let result = self.document.save_as(path);
        self.record_save_result(result)
    }

    fn record_save_result(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Ok(()) => {
                self.save_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Save failed: {}", e);
                self.save_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    fn replace_document(&mut self, document: MarkdownDocument) {
        self.document = document;
        self.rerender();
        if self.search.is_visible {
            self.perform_search();
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Find and Replace
    // ─────────────────────────────────────────────────────────────────────────

    pub fn show_search(&mut self, show_replace: bool) {
        self.search.is_visible = true;
        self.search.show_replace = show_replace;
        self.perform_search();
    }

    pub fn dismiss_search(&mut self) {
        self.search.dismiss();
    }

    pub fn set_search_query(&mut self, query: impl Into<String>, case_sensitive: bool) -> usize {
        self.search.query = query.into();
        self.search.case_sensitive = case_sensitive;
        self.perform_search()
    }

    pub fn set_replacement(&mut self, replacement: impl Into<String>) {
        self.search.replacement = replacement.into();
    }

    /// Recompute matches over the source text.
    pub fn perform_search(&mut self) -> usize {
        self.search.find_matches(&self.document.source_text)
    }

    pub fn replace_current(&mut self) -> bool {
        match self.search.replace_current(&self.document.source_text) {
            Some(text) => {
                self.edit_source_text(text);
                true
            }
            None => false,
        }
    }

    /// Replace every match. Returns how many were replaced.
    pub fn replace_all(&mut self) -> usize {
        let count = self.search.match_count();
        if count > 0 {
            let text = self.search.replace_all(&self.document.source_text);
            self.edit_source_text(text);
        }
        count
    }

    pub fn navigate_to_next_match(&mut self) -> Option<BlockId> {
        self.search.next_match()?;
        self.scroll_to_current_match()
    }

    pub fn navigate_to_previous_match(&mut self) -> Option<BlockId> {
        self.search.prev_match()?;
        self.scroll_to_current_match()
    }

    fn scroll_to_current_match(&mut self) -> Option<BlockId> {
        let id = self.block_for_current_match()?;
        self.scroll_target = Some(id.clone());
        Some(id)
    }

    /// Deepest block whose lines contain the current match.
    pub fn block_for_current_match(&self) -> Option<BlockId> {
        let range = self.search.current_match_range()?;
        let (line, _) = position_at(&self.document.source_text, range.start);
        self.tree.block_containing_line(line).map(|b| b.id.clone())
    }

    /// Highlight ranges in block `id`'s rendered text.
    pub fn highlights(&self, id: &BlockId) -> Vec<Highlight> {
        let Some(text) = self.tree.block(id).and_then(|b| b.text()) else {
            return Vec::new();
        };
        let source = &self.document.source_text;
        let block_source = self
            .current_position(id)
            .and_then(|position| source_range(source, &position));
        self.search.highlights(&text, block_source, source)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn flat_editable_block_ids(&self) -> Vec<BlockId> {
        self.tree.flat_editable_block_ids()
    }

    /// Focus the editable block before `from`, cursor at its end.
    pub fn navigate_to_previous_block(&mut self, from: &BlockId) -> Option<BlockId> {
        let ids = self.flat_editable_block_ids();
        let index = ids.iter().position(|id| id == from)?;
        let target = ids.get(index.checked_sub(1)?)?.clone();
        self.focus_block(&target, true).then_some(target)
    }

    /// Focus the editable block after `from`, cursor at its start.
    pub fn navigate_to_next_block(&mut self, from: &BlockId) -> Option<BlockId> {
        let ids = self.flat_editable_block_ids();
        let index = ids.iter().position(|id| id == from)?;
        let target = ids.get(index + 1)?.clone();
        self.focus_block(&target, false).then_some(target)
    }

    pub fn block_id_for_anchor(&self, anchor: &str) -> Option<BlockId> {
        self.tree.block_for_anchor(anchor).map(|b| b.id.clone())
    }

    /// Scroll to the heading a `#fragment` link points at. Other
    /// destinations are left to the view.
    pub fn follow_link(&mut self, destination: &str) -> Option<BlockId> {
        let anchor = destination.strip_prefix('#')?;
        let id = self.block_id_for_anchor(anchor)?;
        self.scroll_target = Some(id.clone());
        Some(id)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event Dispatch
    // ─────────────────────────────────────────────────────────────────────────

    /// Apply one view event and return the commands the view must run.
    pub fn handle(&mut self, event: ViewEvent) -> Vec<ViewCommand> {
        let generation = self.generation();
        let mut commands = Vec::new();

        match event {
            ViewEvent::SourceEdited(text) => self.edit_source_text(text),
            ViewEvent::BlockFocused { id, at_end } => {
                if self.focus_block(&id, at_end) {
                    if let Some(session) = self.session.as_ref().filter(|_| self.edited.contains_key(&id)) {
                        commands.push(ViewCommand::SetBlockText {
                            id: id.clone(),
                            text: session.text().clone(),
                            selection: session.selection(),
                        });
                    }
                    commands.push(ViewCommand::SetFormattingState(self.selection_state()));
                }
            }
            ViewEvent::BlockBlurred(id) => self.blur_block(&id),
            ViewEvent::TextReplaced { range, text } => {
                if self.replace_text(range, &text) {
                    commands.push(ViewCommand::SetFormattingState(self.selection_state()));
                }
            }
            ViewEvent::SelectionChanged(range) => {
                self.set_selection(range);
                commands.push(ViewCommand::SetFormattingState(self.selection_state()));
            }
            ViewEvent::ToggleFormatting(token) => {
                if self.toggle_inline_formatting(token) {
                    if let Some(session) = &self.session {
                        commands.push(ViewCommand::SetBlockText {
                            id: session.block_id.clone(),
                            text: session.text().clone(),
                            selection: session.selection(),
                        });
                    }
                    commands.push(ViewCommand::SetFormattingState(self.selection_state()));
                }
            }
            ViewEvent::CellEditingFinished => self.finish_editing_cell(),
            ViewEvent::NavigatePrevious => commands.extend(self.navigate_from_session(true)),
            ViewEvent::NavigateNext => commands.extend(self.navigate_from_session(false)),
            ViewEvent::LinkActivated(destination) => {
                if let Some(id) = self.follow_link(&destination) {
                    commands.push(ViewCommand::ScrollToBlock(id));
                }
            }
            ViewEvent::StyleChanged {
                element_type,
                style,
            } => self.update_style(style, element_type),
            ViewEvent::Tick => {
                self.poll();
            }
        }

        if self.generation() != generation {
            commands.insert(
                0,
                ViewCommand::ReplaceRenderTree {
                    generation: self.generation(),
                },
            );
        }
        commands
    }

    fn navigate_from_session(&mut self, backwards: bool) -> Option<ViewCommand> {
        let from = self.editing_block_id()?.clone();
        let id = if backwards {
            self.navigate_to_previous_block(&from)?
        } else {
            self.navigate_to_next_block(&from)?
        };
        Some(ViewCommand::FocusBlock {
            id,
            at_end: backwards,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
