//! Source positions
//!
//! Positions are 1-indexed line/column pairs forming a half-open range.
//! Columns count bytes within the line, which is what comrak reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open `[start, end)` range into the source text of one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcePosition {
    pub start_line: usize,
    pub start_column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl SourcePosition {
    pub fn new(start_line: usize, start_column: usize, end_line: usize, end_column: usize) -> Self {
        Self {
            start_line,
            start_column,
            end_line,
            end_column,
        }
    }

    /// Convert comrak's inclusive end into a half-open one.
    pub fn from_comrak(pos: comrak::nodes::Sourcepos) -> Self {
        Self {
            start_line: pos.start.line.max(1),
            start_column: pos.start.column.max(1),
            end_line: pos.end.line.max(pos.start.line).max(1),
            end_column: pos.end.column + 1,
        }
    }

    /// Whether `line` falls within the lines this range touches.
    pub fn contains_line(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }

    /// Same start, new end.
    pub fn with_end(&self, end_line: usize, end_column: usize) -> Self {
        Self {
            end_line,
            end_column,
            ..*self
        }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_column, self.end_line, self.end_column
        )
    }
}
