//! LSP coordinate layer.
//!
//! Converts the character offsets used by `edit-command` into LSP positions (UTF-16 code units)
//! and back.

use edit_command::{Document, TextRange};
use serde_json::{Value, json};

/// LSP Position (based on UTF-16 code units)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LspPosition {
    /// Line number (0-based)
    pub line: u32,
    /// Character offset (UTF-16 code units, 0-based)
    pub character: u32,
}

impl LspPosition {
    /// Create a new LSP position (UTF-16 based).
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }

    /// Render as an LSP `Position` JSON object.
    pub fn to_value(self) -> Value {
        json!({ "line": self.line, "character": self.character })
    }
}

/// LSP Range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LspRange {
    /// Range start position (inclusive).
    pub start: LspPosition,
    /// Range end position (exclusive).
    pub end: LspPosition,
}

impl LspRange {
    /// Create a new LSP range.
    pub fn new(start: LspPosition, end: LspPosition) -> Self {
        Self { start, end }
    }

    /// Render as an LSP `Range` JSON object.
    pub fn to_value(self) -> Value {
        json!({ "start": self.start.to_value(), "end": self.end.to_value() })
    }
}

/// LSP coordinate converter
///
/// Handles conversions between character offsets and LSP Position (UTF-16)
pub struct LspCoordinateConverter;

impl LspCoordinateConverter {
    /// Convert UTF-8 string to UTF-16 code unit count
    pub fn utf8_to_utf16_len(text: &str) -> usize {
        text.encode_utf16().count()
    }

    /// Convert character offset to UTF-16 code unit offset
    pub fn char_offset_to_utf16(text: &str, char_offset: usize) -> usize {
        text.chars().take(char_offset).map(|c| c.len_utf16()).sum()
    }

    /// Convert UTF-16 code unit offset to character offset
    pub fn utf16_to_char_offset(text: &str, utf16_offset: usize) -> usize {
        let mut current_utf16 = 0;
        let mut char_count = 0;

        for ch in text.chars() {
            if current_utf16 >= utf16_offset {
                break;
            }
            current_utf16 += ch.len_utf16();
            char_count += 1;
        }

        char_count
    }

    /// Convert line and column (character offset) to LSP Position
    pub fn position_to_lsp(line_text: &str, line: usize, char_in_line: usize) -> LspPosition {
        let utf16_offset = Self::char_offset_to_utf16(line_text, char_in_line);
        LspPosition::new(line as u32, utf16_offset as u32)
    }

    /// Convert LSP Position to character offset
    pub fn lsp_to_char_offset(line_text: &str, character: u32) -> usize {
        Self::utf16_to_char_offset(line_text, character as usize)
    }

    /// Convert a document character offset to an LSP position.
    ///
    /// Offsets past the end of the document are clamped to the end.
    pub fn offset_to_lsp(document: &Document, offset: usize) -> LspPosition {
        let (line, column) = document.offset_to_position(offset);
        let line_text = document.line_text(line).unwrap_or_default();
        Self::position_to_lsp(&line_text, line, column)
    }

    /// Convert a document character range to an LSP range.
    pub fn range_to_lsp(document: &Document, range: TextRange) -> LspRange {
        LspRange::new(
            Self::offset_to_lsp(document, range.start),
            Self::offset_to_lsp(document, range.end),
        )
    }

    /// Convert an LSP position back into a document character offset.
    ///
    /// Returns `None` when the line does not exist.
    pub fn lsp_to_offset(document: &Document, position: LspPosition) -> Option<usize> {
        let text = document.text();
        let mut line_start = 0;
        for (index, raw) in text.split('\n').enumerate() {
            let line_text = raw.strip_suffix('\r').unwrap_or(raw);
            if index == position.line as usize {
                return Some(line_start + Self::lsp_to_char_offset(line_text, position.character));
            }
            line_start += raw.chars().count() + 1;
        }
        None
    }
}
