//! LSP `DocumentHighlight` rendering for highlight commands.

use crate::lsp_sync::LspCoordinateConverter;
use edit_command::{Document, Highlight, HighlightStyle};
use serde_json::{Value, json};

/// LSP `DocumentHighlightKind` for a highlight style.
///
/// - 1 = Text
/// - 2 = Read
/// - 3 = Write
pub fn document_highlight_kind(style: HighlightStyle) -> u32 {
    match style {
        HighlightStyle::Plain => 1,
        HighlightStyle::Read => 2,
        HighlightStyle::Write => 3,
    }
}

/// Render highlights as an array of LSP `DocumentHighlight` values.
///
/// Highlights that no longer fit `document` are skipped.
pub fn document_highlights_to_value(document: &Document, highlights: &[Highlight]) -> Value {
    let len = document.len_chars();
    Value::Array(
        highlights
            .iter()
            .filter(|highlight| highlight.range.fits(len))
            .map(|highlight| {
                json!({
                    "range": LspCoordinateConverter::range_to_lsp(document, highlight.range).to_value(),
                    "kind": document_highlight_kind(highlight.style),
                })
            })
            .collect(),
    )
}
