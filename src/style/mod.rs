//! Styling model
//!
//! Element classification, sparse styles, built-in defaults and the
//! stylesheet that layers user overrides on top of them.

mod defaults;
mod element_style;
mod element_type;
mod stylesheet;

pub use defaults::builtin_style;
pub use element_style::{Color, ElementStyle, FontWeight, DEFAULT_FONT_SIZE};
pub use element_type::MarkupElementType;
pub use stylesheet::{resolve, StyleSheet, DARK_MODE_SHEET_ID, DEFAULT_SHEET_ID};
