#![warn(missing_docs)]
//! `edit-command-lsp` - LSP integration for `edit-command`.
//!
//! This crate renders deferred commands in LSP terms (UTF-16 coordinates, `TextEdit`,
//! `DocumentHighlight`, `WorkspaceEdit` with resource operations) so a frontend can preview a
//! change or forward it through `workspace/applyEdit`. It also converts server-provided
//! `TextEdit`s back into commands the `edit-command` executors can run.

pub mod lsp_highlights;
pub mod lsp_sync;
pub mod lsp_text_edits;
pub mod lsp_uri;
pub mod lsp_workspace_edit;

pub use lsp_highlights::{document_highlight_kind, document_highlights_to_value};
pub use lsp_sync::{LspCoordinateConverter, LspPosition, LspRange};
pub use lsp_text_edits::{LspTextEdit, text_edits_for_update, text_edits_from_value};
pub use lsp_uri::path_to_file_uri;
pub use lsp_workspace_edit::{
    command_for_text_edits, command_for_text_edits_value, workspace_edit_for_command,
};
