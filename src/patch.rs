//! Source Patch Engine
//!
//! Splices a reconstructed fragment into the markdown source at a block's
//! line/column range without re-parsing. Lines and columns are 1-indexed;
//! columns count bytes, which is what the parser reports.
//!
//! Between full renders the render tree's positions go stale as edits land.
//! `LiveOverrides` keeps the source as it was at the last render plus a log
//! of every splice since, and maps any stale position forward through that
//! log.

use crate::markdown::SourcePosition;
use crate::render::BlockId;
use std::collections::HashMap;
use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Position Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Byte offset of `(line, column)` in `text`.
///
/// One past the last character of a line (or of the text) is valid. Anything
/// beyond the text, past a line's end, or inside a multi-byte character is
/// `None`.
pub fn source_index(text: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 || column == 0 {
        return None;
    }
    let mut line_start = 0;
    for _ in 1..line {
        line_start += text[line_start..].find('\n')? + 1;
    }
    let line_len = text[line_start..].find('\n').unwrap_or(text.len() - line_start);
    if column - 1 > line_len {
        return None;
    }
    let offset = line_start + column - 1;
    text.is_char_boundary(offset).then_some(offset)
}

/// `(line, column)` of a byte offset. Offsets past the end clamp to the end.
pub fn position_at(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = &text.as_bytes()[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before.iter().rposition(|b| *b == b'\n').map_or(0, |i| i + 1);
    (line, offset - line_start + 1)
}

/// Position reached by walking `fragment` from `(line, column)`.
pub fn advance_position(line: usize, column: usize, fragment: &str) -> (usize, usize) {
    fragment.chars().fold((line, column), |(line, column), c| {
        if c == '\n' {
            (line + 1, 1)
        } else {
            (line, column + c.len_utf8())
        }
    })
}

/// Byte range covered by `position` in `text`.
pub fn source_range(text: &str, position: &SourcePosition) -> Option<Range<usize>> {
    let start = source_index(text, position.start_line, position.start_column)?;
    let end = source_index(text, position.end_line, position.end_column)?;
    (start <= end).then_some(start..end)
}

// ─────────────────────────────────────────────────────────────────────────────
// Patching
// ─────────────────────────────────────────────────────────────────────────────

/// One splice, in byte offsets: `start..old_end` became `start..new_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedEdit {
    pub start: usize,
    pub old_end: usize,
    pub new_end: usize,
}

impl AppliedEdit {
    /// Smallest single splice turning `old` into `new`.
    pub fn between(old: &str, new: &str) -> Self {
        let prefix = old
            .char_indices()
            .zip(new.chars())
            .find(|((_, a), b)| a != b)
            .map_or(old.len().min(new.len()), |((i, _), _)| i);
        let max_suffix = old.len().min(new.len()) - prefix;
        let suffix = old[prefix..]
            .chars()
            .rev()
            .zip(new[prefix..].chars().rev())
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| a.len_utf8())
            .scan(0, |total, len| {
                *total += len;
                Some(*total)
            })
            .take_while(|total| *total <= max_suffix)
            .last()
            .unwrap_or(0);
        Self {
            start: prefix,
            old_end: old.len() - suffix,
            new_end: new.len() - suffix,
        }
    }

    /// Where `offset` lands after this edit. Offsets inside the replaced
    /// range clamp into the replacement.
    pub fn map_offset(&self, offset: usize) -> usize {
        if offset < self.start {
            offset
        } else if offset >= self.old_end {
            offset - self.old_end + self.new_end
        } else {
            self.start + (offset - self.start).min(self.new_end - self.start)
        }
    }

    pub fn map_range(&self, range: &Range<usize>) -> Range<usize> {
        self.map_offset(range.start)..self.map_offset(range.end)
    }
}

/// Result of a successful splice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePatch {
    pub text: String,
    /// Range of the replacement in the new text, as a position
    pub position: SourcePosition,
    pub edit: AppliedEdit,
}

/// Replace the source covered by `position` with `replacement`.
///
/// `None` when the position does not resolve in `text`; the caller drops
/// the edit rather than splicing at a guessed offset.
pub fn patch_range(text: &str, position: &SourcePosition, replacement: &str) -> Option<SourcePatch> {
    let range = source_range(text, position)?;
    let mut patched = String::with_capacity(text.len() - range.len() + replacement.len());
    patched.push_str(&text[..range.start]);
    patched.push_str(replacement);
    patched.push_str(&text[range.end..]);

    let (end_line, end_column) =
        advance_position(position.start_line, position.start_column, replacement);
    Some(SourcePatch {
        text: patched,
        position: position.with_end(end_line, end_column),
        edit: AppliedEdit {
            start: range.start,
            old_end: range.end,
            new_end: range.start + replacement.len(),
        },
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Live Overrides
// ─────────────────────────────────────────────────────────────────────────────

/// Corrected block ranges for the time between two full renders.
#[derive(Debug, Clone, Default)]
pub struct LiveOverrides {
    /// Source text the current render tree was built from
    baseline: String,
    edits: Vec<AppliedEdit>,
    /// Ranges in the current source text
    overrides: HashMap<BlockId, Range<usize>>,
}

impl LiveOverrides {
    pub fn new(baseline: &str) -> Self {
        Self {
            baseline: baseline.to_string(),
            ..Default::default()
        }
    }

    /// Drop everything and start over from a freshly rendered source.
    pub fn reset(&mut self, baseline: &str) {
        self.baseline.clear();
        self.baseline.push_str(baseline);
        self.edits.clear();
        self.overrides.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty() && self.edits.is_empty()
    }

    pub fn edit_count(&self) -> usize {
        self.edits.len()
    }

    pub fn has_override(&self, id: &BlockId) -> bool {
        self.overrides.contains_key(id)
    }

    /// Record a splice made to block `id`. Every other override shifts with it.
    pub fn record(&mut self, id: &BlockId, edit: AppliedEdit) {
        self.record_unowned(edit);
        self.overrides.insert(id.clone(), edit.start..edit.new_end);
    }

    /// Record a splice that belongs to no block, such as source pane typing.
    pub fn record_unowned(&mut self, edit: AppliedEdit) {
        for range in self.overrides.values_mut() {
            *range = edit.map_range(range);
        }
        self.edits.push(edit);
    }

    /// Current position of block `id`, whose last rendered position was
    /// `stale`. `current` is the source text as it is now.
    pub fn resolve(&self, id: &BlockId, stale: &SourcePosition, current: &str) -> Option<SourcePosition> {
        let range = match self.overrides.get(id) {
            Some(range) => range.clone(),
            None => {
                let range = source_range(&self.baseline, stale)?;
                self.edits.iter().fold(range, |range, edit| edit.map_range(&range))
            }
        };
        if range.end > current.len() {
            return None;
        }
        let (start_line, start_column) = position_at(current, range.start);
        let (end_line, end_column) = position_at(current, range.end);
        Some(SourcePosition::new(start_line, start_column, end_line, end_column))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_index_basics() {
        let text = "AB\nCD";
        assert_eq!(source_index(text, 1, 1), Some(0));
        assert_eq!(source_index(text, 2, 1), Some(3));
        assert_eq!(&text[3..4], "C");
        assert_eq!(source_index(text, 1, 3), Some(2));
        assert_eq!(source_index(text, 2, 3), Some(5));
    }

    #[test]
    fn test_source_index_out_of_bounds() {
        let text = "AB\nCD";
        assert_eq!(source_index(text, 1, 4), None);
        assert_eq!(source_index(text, 2, 4), None);
        assert_eq!(source_index(text, 3, 1), None);
        assert_eq!(source_index(text, 0, 1), None);
        assert_eq!(source_index(text, 1, 0), None);
    }

    #[test]
    fn test_source_index_trailing_newline_and_empty() {
        assert_eq!(source_index("AB\n", 2, 1), Some(3));
        assert_eq!(source_index("", 1, 1), Some(0));
        assert_eq!(source_index("", 1, 2), None);
    }

    #[test]
    fn test_source_index_rejects_mid_character() {
        let text = "é!";
        assert_eq!(source_index(text, 1, 2), None);
        assert_eq!(source_index(text, 1, 3), Some(2));
    }

    #[test]
    fn test_position_at_inverts_source_index() {
        let text = "one\ntwo\n\nfour";
        for offset in 0..=text.len() {
            let (line, column) = position_at(text, offset);
            assert_eq!(source_index(text, line, column), Some(offset));
        }
    }

    #[test]
    fn test_advance_position() {
        assert_eq!(advance_position(3, 1, "abc"), (3, 4));
        assert_eq!(advance_position(3, 5, "a\nbc"), (4, 3));
        assert_eq!(advance_position(1, 1, ""), (1, 1));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // patch_range
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_patch_single_line() {
        let text = "# Title\n\nHello world\n\nAfter";
        let position = SourcePosition::new(3, 1, 3, 12);
        let patch = patch_range(text, &position, "Hello universe").unwrap();
        assert_eq!(patch.text, "# Title\n\nHello universe\n\nAfter");
        assert_eq!(patch.position, SourcePosition::new(3, 1, 3, 15));
        assert_eq!(patch.edit, AppliedEdit { start: 9, old_end: 20, new_end: 23 });
    }

    #[test]
    fn test_patch_multi_line_replacement() {
        let text = "a\nbb\nc";
        let patch = patch_range(text, &SourcePosition::new(2, 1, 2, 3), "x\nyz").unwrap();
        assert_eq!(patch.text, "a\nx\nyz\nc");
        assert_eq!(patch.position, SourcePosition::new(2, 1, 3, 3));
    }

    #[test]
    fn test_patch_unresolvable_position() {
        assert_eq!(patch_range("AB\nCD", &SourcePosition::new(5, 1, 5, 3), "x"), None);
        assert_eq!(patch_range("AB\nCD", &SourcePosition::new(2, 2, 1, 1), "x"), None);
    }

    #[test]
    fn test_edit_between() {
        assert_eq!(
            AppliedEdit::between("Hello world", "Hello universe"),
            AppliedEdit { start: 6, old_end: 11, new_end: 14 }
        );
        assert_eq!(
            AppliedEdit::between("aaa", "aaaa"),
            AppliedEdit { start: 3, old_end: 3, new_end: 4 }
        );
        assert_eq!(
            AppliedEdit::between("abcabc", "abc"),
            AppliedEdit { start: 3, old_end: 6, new_end: 3 }
        );
        assert_eq!(
            AppliedEdit::between("same", "same"),
            AppliedEdit { start: 4, old_end: 4, new_end: 4 }
        );
        assert_eq!(
            AppliedEdit::between("xéy", "xüy"),
            AppliedEdit { start: 1, old_end: 3, new_end: 3 }
        );
    }

    #[test]
    fn test_map_offset() {
        let edit = AppliedEdit { start: 4, old_end: 8, new_end: 6 };
        assert_eq!(edit.map_offset(2), 2);
        assert_eq!(edit.map_offset(4), 4);
        assert_eq!(edit.map_offset(7), 6);
        assert_eq!(edit.map_offset(8), 6);
        assert_eq!(edit.map_offset(10), 8);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Live overrides
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_override_tracks_edited_block() {
        let mut text = String::from("first\n\nsecond");
        let mut live = LiveOverrides::new(&text);
        let id = BlockId::from("p1");
        let stale = SourcePosition::new(1, 1, 1, 6);

        let patch = patch_range(&text, &stale, "first edit").unwrap();
        text = patch.text;
        live.record(&id, patch.edit);
        assert_eq!(live.resolve(&id, &stale, &text), Some(SourcePosition::new(1, 1, 1, 11)));

        let current = live.resolve(&id, &stale, &text).unwrap();
        let patch = patch_range(&text, &current, "first").unwrap();
        assert_eq!(patch.text, "first\n\nsecond");
    }

    #[test]
    fn test_later_block_maps_through_earlier_edit() {
        let mut text = String::from("one\n\ntwo\n\nthree");
        let mut live = LiveOverrides::new(&text);
        let first = SourcePosition::new(1, 1, 1, 4);
        let second = SourcePosition::new(3, 1, 3, 4);

        let patch = patch_range(&text, &first, "one\nmore").unwrap();
        text = patch.text;
        live.record(&BlockId::from("a"), patch.edit);

        let moved = live.resolve(&BlockId::from("b"), &second, &text).unwrap();
        assert_eq!(moved, SourcePosition::new(4, 1, 4, 4));
        let patch = patch_range(&text, &moved, "TWO").unwrap();
        assert_eq!(patch.text, "one\nmore\n\nTWO\n\nthree");
    }

    #[test]
    fn test_earlier_override_shifts_with_later_edit() {
        let mut text = String::from("aa\n\nbb");
        let mut live = LiveOverrides::new(&text);
        let a = BlockId::from("a");
        let b = BlockId::from("b");
        let a_stale = SourcePosition::new(1, 1, 1, 3);
        let b_stale = SourcePosition::new(3, 1, 3, 3);

        // Edit b, then a; b's override must follow a's growth.
        let patch = patch_range(&text, &b_stale, "bbb").unwrap();
        text = patch.text;
        live.record(&b, patch.edit);
        let patch = patch_range(&text, &a_stale, "a\na").unwrap();
        text = patch.text;
        live.record(&a, patch.edit);

        assert_eq!(text, "a\na\n\nbbb");
        assert_eq!(live.resolve(&b, &b_stale, &text), Some(SourcePosition::new(4, 1, 4, 4)));
        assert_eq!(live.edit_count(), 2);

        live.reset(&text);
        assert!(live.is_empty());
        assert!(!live.has_override(&b));
    }
}
