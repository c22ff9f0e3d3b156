//! Character-offset ranges and small string helpers.
//!
//! Every offset in this crate counts Unicode scalar values (`char`s), not bytes. This matches
//! [`ropey::Rope`] indexing, which backs [`crate::Document`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// A half-open range of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TextRange {
    /// Inclusive start offset.
    pub start: usize,
    /// Exclusive end offset.
    pub end: usize,
}

impl TextRange {
    /// Create a range; the bounds are reordered if `start > end`.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// An empty range (caret) at `offset`.
    pub fn empty(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns `true` for a caret-like range.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if `other` lies entirely within `self`.
    pub fn contains(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns `true` if the range is addressable in a text of `len` characters.
    pub fn fits(&self, len: usize) -> bool {
        self.end <= len
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slice `text` by character offsets. Offsets past the end are clamped.
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let byte_at = |offset: usize| {
        text.char_indices()
            .nth(offset)
            .map(|(i, _)| i)
            .unwrap_or(text.len())
    };
    let start_byte = byte_at(start);
    let end_byte = byte_at(end.max(start));
    &text[start_byte..end_byte]
}

/// Map `offset` through a replacement of `[start, start + old_len)` by `new_len` characters.
///
/// Offsets inside the replaced span snap to the end of the inserted text.
pub(crate) fn shift_offset(offset: usize, start: usize, old_len: usize, new_len: usize) -> usize {
    let end = start + old_len;
    if offset < start {
        offset
    } else if offset < end {
        start + new_len
    } else {
        offset + new_len - old_len
    }
}

pub(crate) fn shift_range(range: TextRange, start: usize, old_len: usize, new_len: usize) -> TextRange {
    TextRange::new(
        shift_offset(range.start, start, old_len, new_len),
        shift_offset(range.end, start, old_len, new_len),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_normalizes_bounds() {
        let range = TextRange::new(7, 3);
        assert_eq!(range, TextRange { start: 3, end: 7 });
        assert_eq!(range.len(), 4);
        assert!(range.fits(7));
        assert!(!range.fits(6));
    }

    #[test]
    fn test_char_slice_multibyte() {
        assert_eq!(char_slice("你好世界", 1, 3), "好世");
        assert_eq!(char_slice("abc", 1, 10), "bc");
        assert_eq!(char_slice("abc", 5, 9), "");
    }

    #[test]
    fn test_shift_offset() {
        // before the edit
        assert_eq!(shift_offset(1, 2, 3, 1), 1);
        // inside the replaced span
        assert_eq!(shift_offset(3, 2, 3, 1), 3);
        // after the edit
        assert_eq!(shift_offset(9, 2, 3, 1), 7);
        // insertion at the offset pushes it right
        assert_eq!(shift_offset(4, 4, 0, 2), 6);
    }
}
