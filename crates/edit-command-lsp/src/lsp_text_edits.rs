//! LSP `TextEdit` rendering for text updates.
//!
//! This module intentionally avoids pulling in a full `lsp-types` dependency. It builds the
//! small subset of JSON needed to hand a text update to an LSP client or server.

use crate::lsp_sync::{LspCoordinateConverter, LspPosition, LspRange};
use edit_command::{Document, Fragment, apply, diff, replay};
use serde_json::{Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A minimal representation of an LSP `TextEdit`.
pub struct LspTextEdit {
    /// The range to replace (UTF-16 based line/character positions).
    pub range: LspRange,
    /// Replacement text (may contain newlines).
    pub new_text: String,
}

impl LspTextEdit {
    /// Parse a `TextEdit`-shaped JSON value.
    pub fn from_value(value: &Value) -> Option<Self> {
        let range_value = value.get("range")?;
        let start = range_value.get("start")?;
        let end = range_value.get("end")?;

        let start_pos = position_from_value(start)?;
        let end_pos = position_from_value(end)?;

        let new_text = value
            .get("newText")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string();

        Some(Self {
            range: LspRange::new(start_pos, end_pos),
            new_text,
        })
    }

    /// Render as a `TextEdit` JSON value.
    pub fn to_value(&self) -> Value {
        json!({ "range": self.range.to_value(), "newText": self.new_text })
    }
}

// Coordinates that do not fit `u32` are rejected rather than truncated.
fn position_from_value(value: &Value) -> Option<LspPosition> {
    let line = u32::try_from(value.get("line")?.as_u64()?).ok()?;
    let character = u32::try_from(value.get("character")?.as_u64()?).ok()?;
    Some(LspPosition::new(line, character))
}

/// Parse a JSON array of `TextEdit` values.
///
/// Fails on the first element that is not a well-formed `TextEdit`, so a partially
/// understood payload is never applied.
pub fn text_edits_from_value(value: &Value) -> Result<Vec<LspTextEdit>, String> {
    let edits = value
        .as_array()
        .ok_or_else(|| "expected an array of TextEdit values".to_string())?;
    edits
        .iter()
        .enumerate()
        .map(|(index, edit)| {
            LspTextEdit::from_value(edit)
                .ok_or_else(|| format!("malformed TextEdit at index {index}"))
        })
        .collect()
}

/// Express an `original -> updated` text change as LSP `TextEdit`s against `original`.
///
/// When `fragments` is `None`, or does not reproduce `updated`, the change is recomputed with a
/// prefix/suffix diff. Edits are returned in ascending document order and never overlap, as
/// LSP requires.
pub fn text_edits_for_update(
    original: &str,
    updated: &str,
    fragments: Option<&[Fragment]>,
) -> Vec<LspTextEdit> {
    let computed;
    let fragments: &[Fragment] = match fragments {
        Some(fragments) if apply(original, updated, fragments) == updated => fragments,
        _ => {
            computed = diff(original, updated);
            &computed
        }
    };

    let document = Document::new(original);
    let mut replacements = replay(updated, fragments);
    replacements.reverse();
    replacements
        .into_iter()
        .map(|replacement| LspTextEdit {
            range: LspCoordinateConverter::range_to_lsp(&document, replacement.range),
            new_text: replacement.text,
        })
        .collect()
}
