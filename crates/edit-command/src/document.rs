//! Rope-backed text documents.
//!
//! [`Document`] is the text-buffer service the rest of the crate consumes: character-offset
//! replacement, whole-text reads and cheap copies. Copies share structure with the original
//! rope, so taking a snapshot of a large file costs O(1) until the copy is edited.

use crate::error::RangeOutOfBounds;
use crate::text::TextRange;
use ropey::Rope;

/// A mutable sequence of characters.
#[derive(Debug, Clone, Default)]
pub struct Document {
    rope: Rope,
}

impl Document {
    /// Create a document from text.
    pub fn new(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
        }
    }

    /// Full text content.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Length in characters.
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns `true` if the document has no text.
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Text inside `range`.
    pub fn slice(&self, range: TextRange) -> Result<String, RangeOutOfBounds> {
        self.check(range)?;
        Ok(self.rope.slice(range.start..range.end).to_string())
    }

    /// Character at `offset`, if any.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.rope.len_chars()).then(|| self.rope.char(offset))
    }

    /// Replace `range` with `text`.
    pub fn replace(&mut self, range: TextRange, text: &str) -> Result<(), RangeOutOfBounds> {
        self.check(range)?;
        if !range.is_empty() {
            self.rope.remove(range.start..range.end);
        }
        if !text.is_empty() {
            self.rope.insert(range.start, text);
        }
        Ok(())
    }

    /// An independent copy of this document.
    pub fn copy(&self) -> Document {
        self.clone()
    }

    /// Offset of the last `ch` strictly before `before`.
    pub fn rfind_char(&self, before: usize, ch: char) -> Option<usize> {
        let end = before.min(self.rope.len_chars());
        let mut offset = end;
        let mut chars = self.rope.chars_at(end);
        while let Some(prev) = chars.prev() {
            offset -= 1;
            if prev == ch {
                return Some(offset);
            }
        }
        None
    }

    /// Number of logical lines (N newlines => N+1 lines).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Convert a character offset into `(line, column)`; offsets past the end are clamped.
    pub fn offset_to_position(&self, offset: usize) -> (usize, usize) {
        let offset = offset.min(self.rope.len_chars());
        let line = self.rope.char_to_line(offset);
        let line_start = self.rope.line_to_char(line);
        (line, offset - line_start)
    }

    /// Text of a logical line without its line terminator.
    pub fn line_text(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let text = self.rope.line(line).to_string();
        let text = text.strip_suffix('\n').unwrap_or(&text);
        Some(text.strip_suffix('\r').unwrap_or(text).to_string())
    }

    fn check(&self, range: TextRange) -> Result<(), RangeOutOfBounds> {
        let len = self.rope.len_chars();
        if range.fits(len) {
            Ok(())
        } else {
            Err(RangeOutOfBounds { range, len })
        }
    }
}
