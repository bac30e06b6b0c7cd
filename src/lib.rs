//! Styledown
//!
//! Core of a WYSIWYG markdown editor. Markdown is parsed with comrak into a
//! styled render tree; edits made to rendered blocks are turned back into
//! markdown and spliced into the source without re-rendering, and the
//! `DocumentCoordinator` decides when a full re-render happens.

pub mod config;
pub mod coordinator;
pub mod document;
pub mod error;
pub mod markdown;
pub mod patch;
pub mod reconstruct;
pub mod render;
pub mod rich_text;
pub mod string_utils;
pub mod style;

pub use coordinator::{DocumentCoordinator, EditorState, ViewCommand, ViewEvent};
pub use document::MarkdownDocument;
pub use error::{Error, Result};
pub use render::{render_source, BlockId, RenderTree};
pub use style::{ElementStyle, MarkupElementType, StyleSheet};
