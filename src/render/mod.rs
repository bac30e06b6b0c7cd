//! Forward direction: AST to styled render tree
//!
//! The block renderer walks block nodes and delegates leaf content to the
//! inline renderer. Both resolve styles through the active `StyleSheet`.

mod block;
mod inline;
mod tree;

pub use block::{render_source, BlockRenderer, BULLET_MARKER, TASK_CHECKED_MARKER, TASK_UNCHECKED_MARKER};
pub use inline::{InlineRenderer, IMAGE_PLACEHOLDER};
pub use tree::{
    heading_slug, runs_text, BlockContent, BlockId, BlockIndex, RenderTree, StyledBlock,
    StyledRun, StyledTableCell, SyntaxToken,
};
