//! Find and replace over the markdown source
//!
//! Matches are literal byte ranges in the source text. They are recomputed
//! from scratch whenever the query or the source changes. Highlights for a
//! rendered block are found by searching the block's rendered text and
//! pairing occurrences by index, since rendered and source offsets differ by
//! the markup in between.

use log::debug;
use regex::{Regex, RegexBuilder};
use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Search State
// ─────────────────────────────────────────────────────────────────────────────

/// Find bar state owned by the coordinator.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub is_visible: bool,
    pub show_replace: bool,
    pub query: String,
    pub replacement: String,
    pub case_sensitive: bool,
    /// Byte ranges in the source, in order
    pub matches: Vec<Range<usize>>,
    pub current_match: usize,
}

/// A match inside one block's rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Highlight {
    pub range: Range<usize>,
    pub is_current: bool,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute matches of the query in `text`. Returns the match count.
    pub fn find_matches(&mut self, text: &str) -> usize {
        self.matches = find_all(text, &self.query, self.case_sensitive);
        if self.current_match >= self.matches.len() {
            self.current_match = self.matches.len().saturating_sub(1);
        }
        self.matches.len()
    }

    pub fn next_match(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        self.current_match = (self.current_match + 1) % self.matches.len();
        Some(self.current_match)
    }

    pub fn prev_match(&mut self) -> Option<usize> {
        if self.matches.is_empty() {
            return None;
        }
        let count = self.matches.len();
        self.current_match = (self.current_match + count - 1) % count;
        Some(self.current_match)
    }

    pub fn current_match_range(&self) -> Option<Range<usize>> {
        self.matches.get(self.current_match).cloned()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn has_matches(&self) -> bool {
        !self.matches.is_empty()
    }

    /// "2 of 5", or "0 results".
    pub fn current_match_label(&self) -> String {
        if self.matches.is_empty() {
            "0 results".to_string()
        } else {
            format!("{} of {}", self.current_match + 1, self.matches.len())
        }
    }

    /// Text with the current match replaced, or `None` without one.
    pub fn replace_current(&self, text: &str) -> Option<String> {
        let range = self.current_match_range()?;
        let mut out = String::with_capacity(text.len() + self.replacement.len());
        out.push_str(text.get(..range.start)?);
        out.push_str(&self.replacement);
        out.push_str(text.get(range.end..)?);
        Some(out)
    }

    /// Text with every match replaced, applied back to front.
    pub fn replace_all(&self, text: &str) -> String {
        let mut out = text.to_string();
        for range in self.matches.iter().rev() {
            if out.is_char_boundary(range.start) && range.end <= out.len() && out.is_char_boundary(range.end) {
                out.replace_range(range.clone(), &self.replacement);
            }
        }
        out
    }

    /// Close the find bar and forget the query.
    pub fn dismiss(&mut self) {
        *self = Self::default();
    }

    /// Highlight ranges within a block's rendered text.
    ///
    /// `block_source` is the block's byte range in `source`; the current
    /// match is flagged only when it lies inside that range, at the same
    /// occurrence index in both texts.
    pub fn highlights(&self, block_text: &str, block_source: Option<Range<usize>>, source: &str) -> Vec<Highlight> {
        if !self.is_visible || self.query.is_empty() {
            return Vec::new();
        }
        let current_occurrence = block_source.and_then(|block| {
            let current = self.current_match_range()?;
            if current.start < block.start || current.end > block.end {
                return None;
            }
            let block_text = source.get(block.clone())?;
            let local = current.start - block.start;
            Some(
                find_all(block_text, &self.query, self.case_sensitive)
                    .iter()
                    .take_while(|m| m.start < local)
                    .count(),
            )
        });

        find_all(block_text, &self.query, self.case_sensitive)
            .into_iter()
            .enumerate()
            .map(|(index, range)| Highlight {
                range,
                is_current: current_occurrence == Some(index),
            })
            .collect()
    }
}

/// Non-overlapping literal matches of `query` in `text`.
pub fn find_all(text: &str, query: &str, case_sensitive: bool) -> Vec<Range<usize>> {
    if query.is_empty() {
        return Vec::new();
    }
    if case_sensitive {
        return text
            .match_indices(query)
            .map(|(start, found)| start..start + found.len())
            .collect();
    }
    match case_insensitive_pattern(query) {
        Ok(re) => re.find_iter(text).map(|m| m.range()).collect(),
        Err(e) => {
            debug!("Search pattern for '{}' failed to build: {}", query, e);
            Vec::new()
        }
    }
}

fn case_insensitive_pattern(query: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
