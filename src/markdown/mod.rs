//! Markdown parsing
//!
//! Wraps comrak, a CommonMark + GFM compatible parser, and converts its
//! arena AST into an owned tree with half-open source positions.
//!
//! # Example
//! ```ignore
//! use styledown::markdown::{parse_markdown, MarkdownOptions, NodeKind};
//!
//! let doc = parse_markdown("# Hello", &MarkdownOptions::default());
//! assert_eq!(doc.children[0].kind, NodeKind::Heading { level: 1 });
//! ```

mod parser;
mod position;

pub use parser::{parse_markdown, MarkdownNode, MarkdownOptions, NodeKind};
pub use position::SourcePosition;
