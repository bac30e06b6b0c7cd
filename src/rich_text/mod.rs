//! Editable rich text
//!
//! The attributed-string model a view edits, the encoder that produces it
//! from styled runs, and inline-format toggling over it.

mod attributes;
mod encoder;
mod formatting;

pub use attributes::{
    FontDescriptor, RecoveryAttributes, RichText, Span, SyntaxAttribute, TextAttributes,
};
pub use encoder::{encode, encode_code_block, run_attributes};
pub use formatting::{
    active_inline_element_type, common_syntax, toggle_syntax, toggle_typing_syntax,
    FormattingState,
};
