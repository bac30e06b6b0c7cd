//! UTF-8 boundary helpers
//!
//! Rich-text ranges and source offsets are byte offsets. Edit events coming
//! from a view layer may carry arbitrary offsets, so every range is snapped
//! to character boundaries before the text is sliced or spliced.

// ─────────────────────────────────────────────────────────────────────────────
// Character Boundary Functions
// ─────────────────────────────────────────────────────────────────────────────

/// Largest index `<= index` that lies on a character boundary.
///
/// Indices past the end clamp to `s.len()`.
#[inline]
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest index `>= index` that lies on a character boundary.
#[inline]
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Snap a `start..end` byte range onto character boundaries, widening it
/// outwards and swapping reversed bounds.
pub fn snap_range(s: &str, start: usize, end: usize) -> (usize, usize) {
    let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
    (floor_char_boundary(s, lo), ceil_char_boundary(s, hi))
}

// ─────────────────────────────────────────────────────────────────────────────
// Index Conversion
// ─────────────────────────────────────────────────────────────────────────────

/// Convert a character index into a byte index. Clamps to `s.len()`.
pub fn char_index_to_byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(byte, _)| byte)
        .unwrap_or(s.len())
}

/// Convert a byte index into a character index, flooring mid-character
/// positions.
pub fn byte_index_to_char_index(s: &str, byte_index: usize) -> usize {
    s[..floor_char_boundary(s, byte_index)].chars().count()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_ascii() {
        assert_eq!(floor_char_boundary("hello", 3), 3);
        assert_eq!(floor_char_boundary("hello", 99), 5);
    }

    #[test]
    fn test_floor_multibyte() {
        // 'å' occupies bytes 5..7
        let s = "Hei på deg";
        assert_eq!(floor_char_boundary(s, 6), 5);
        assert_eq!(ceil_char_boundary(s, 6), 7);
    }

    #[test]
    fn test_snap_range_reversed() {
        let s = "a中b";
        assert_eq!(snap_range(s, 3, 2), (1, 4));
    }

    #[test]
    fn test_index_conversion() {
        let s = "a中b";
        assert_eq!(char_index_to_byte_index(s, 2), 4);
        assert_eq!(char_index_to_byte_index(s, 10), s.len());
        assert_eq!(byte_index_to_char_index(s, 4), 2);
        assert_eq!(byte_index_to_char_index(s, 2), 1);
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(floor_char_boundary("", 3), 0);
        assert_eq!(ceil_char_boundary("", 0), 0);
        assert_eq!(snap_range("", 0, 4), (0, 0));
    }
}
