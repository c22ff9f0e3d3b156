//! `WorkspaceEdit` bridge.
//!
//! Renders a deferred [`Command`] as an LSP `WorkspaceEdit` (`documentChanges` form, with
//! resource operations), and turns the `TextEdit`s a server sends back into a command the
//! executors can run.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::lsp_sync::{LspCoordinateConverter, LspPosition, LspRange};
use crate::lsp_text_edits::{LspTextEdit, text_edits_for_update, text_edits_from_value};
use crate::lsp_uri::path_to_file_uri;
use edit_command::{Command, DocumentId, MutationSession, TextRange, Workspace};
use serde_json::{Value, json};

/// Render `command` as an LSP `WorkspaceEdit`.
///
/// Text updates become `TextDocumentEdit`s expressed against the text the command was
/// computed from; file creation, deletion and moves become resource operations. A template
/// start contributes the expansion of its default values against the live text; whatever its
/// continuation would do after the user finishes is not known yet and is left out. Steps with
/// no effect on file contents (navigation, highlights, messages, options, choices, rename
/// prompts) are skipped. A [`Command::ShowConflicts`] contributes the edits of the command it
/// guards.
///
/// Fails when a referenced document is unknown, or when a text update no longer matches the
/// live document.
pub fn workspace_edit_for_command(workspace: &Workspace, command: &Command) -> Result<Value, String> {
    let mut renderer = EditRenderer {
        workspace,
        moved: BTreeMap::new(),
        changes: Vec::new(),
    };
    renderer.render(command)?;
    Ok(json!({ "documentChanges": renderer.changes }))
}

struct EditRenderer<'w> {
    workspace: &'w Workspace,
    // Paths of documents moved earlier in the same command.
    moved: BTreeMap<DocumentId, PathBuf>,
    changes: Vec<Value>,
}

impl EditRenderer<'_> {
    fn render(&mut self, command: &Command) -> Result<(), String> {
        for step in command.steps() {
            match step {
                Command::UpdateText {
                    file,
                    original,
                    updated,
                    fragments,
                } => {
                    let live = self
                        .workspace
                        .document_text(*file)
                        .map_err(|err| err.to_string())?;
                    if live != *original {
                        return Err(format!(
                            "{file} was modified since the command was computed"
                        ));
                    }
                    let edits = text_edits_for_update(original, updated, fragments.as_deref());
                    if !edits.is_empty() {
                        let uri = path_to_file_uri(&self.path(*file)?);
                        self.changes.push(text_document_edit(&uri, &edits));
                    }
                }
                Command::CreateFile { file, text } => {
                    let path = self
                        .workspace
                        .directory_path(file.parent)
                        .map_err(|err| err.to_string())?
                        .join(&file.name);
                    let uri = path_to_file_uri(&path);
                    self.changes.push(json!({
                        "kind": "create",
                        "uri": uri,
                        "options": { "overwrite": false, "ignoreIfExists": false },
                    }));
                    if !text.is_empty() {
                        let origin = LspPosition::new(0, 0);
                        let edit = LspTextEdit {
                            range: LspRange::new(origin, origin),
                            new_text: text.clone(),
                        };
                        self.changes.push(text_document_edit(&uri, &[edit]));
                    }
                }
                Command::DeleteFile { file } => {
                    let uri = path_to_file_uri(&self.path(*file)?);
                    self.changes.push(json!({ "kind": "delete", "uri": uri }));
                }
                Command::MoveFile { file, target } => {
                    let old_path = self.path(*file)?;
                    let name = self
                        .workspace
                        .document_name(*file)
                        .map_err(|err| err.to_string())?;
                    let new_path = self
                        .workspace
                        .directory_path(*target)
                        .map_err(|err| err.to_string())?
                        .join(name);
                    self.changes.push(json!({
                        "kind": "rename",
                        "oldUri": path_to_file_uri(&old_path),
                        "newUri": path_to_file_uri(&new_path),
                    }));
                    self.moved.insert(*file, new_path);
                }
                Command::StartTemplate {
                    file,
                    range,
                    template,
                    ..
                } => {
                    let document = self
                        .workspace
                        .document(*file)
                        .map_err(|err| err.to_string())?;
                    if !range.fits(document.len_chars()) {
                        return Err(format!("template range {range} is outside {file}"));
                    }
                    let edit = LspTextEdit {
                        range: LspCoordinateConverter::range_to_lsp(document, *range),
                        new_text: template.expand(&BTreeMap::new()).text,
                    };
                    let uri = path_to_file_uri(&self.path(*file)?);
                    self.changes.push(text_document_edit(&uri, &[edit]));
                }
                Command::Nothing
                | Command::Composite(_)
                | Command::Navigate { .. }
                | Command::Highlight { .. }
                | Command::StartRename(_)
                | Command::ChooseAction { .. }
                | Command::DisplayMessage { .. }
                | Command::UpdateOption { .. } => {}
            }
        }
        Ok(())
    }

    fn path(&self, file: DocumentId) -> Result<PathBuf, String> {
        if let Some(path) = self.moved.get(&file) {
            return Ok(path.clone());
        }
        self.workspace
            .document_path(file)
            .map_err(|err| err.to_string())
    }
}

fn text_document_edit(uri: &str, edits: &[LspTextEdit]) -> Value {
    json!({
        "textDocument": { "uri": uri, "version": Value::Null },
        "edits": edits.iter().map(LspTextEdit::to_value).collect::<Vec<_>>(),
    })
}

/// Turn LSP `TextEdit`s for `file` into a deferred text update.
///
/// The edits are interpreted against the live text of `file`, as LSP requires. Overlapping
/// edits are rejected. The result is [`Command::Nothing`] when the edits change nothing.
pub fn command_for_text_edits(
    workspace: &Workspace,
    file: DocumentId,
    edits: &[LspTextEdit],
) -> Result<Command, String> {
    let document = workspace.document(file).map_err(|err| err.to_string())?;

    let mut resolved = Vec::with_capacity(edits.len());
    for edit in edits {
        let start = LspCoordinateConverter::lsp_to_offset(document, edit.range.start);
        let end = LspCoordinateConverter::lsp_to_offset(document, edit.range.end);
        let (Some(start), Some(end)) = (start, end) else {
            return Err(format!(
                "LSP edit {}:{}..{}:{} is outside {file}",
                edit.range.start.line,
                edit.range.start.character,
                edit.range.end.line,
                edit.range.end.character
            ));
        };
        resolved.push((TextRange::new(start, end), edit.new_text.as_str()));
    }

    // Sort descending by start offset so earlier edits don't shift the later ones.
    resolved.sort_by_key(|(range, _)| std::cmp::Reverse((range.start, range.end)));
    for pair in resolved.windows(2) {
        let (later, _) = pair[0];
        let (earlier, _) = pair[1];
        if earlier.end > later.start {
            return Err(format!("overlapping LSP edits at {earlier} and {later}"));
        }
    }

    let mut session = MutationSession::detached(workspace);
    for (range, text) in resolved {
        session
            .replace(file, range, text)
            .map_err(|err| format!("Failed to apply LSP edit at {range}: {err}"))?;
    }
    session.into_command().map_err(|err| err.to_string())
}

/// Like [`command_for_text_edits`], for a raw `TextEdit[]` payload as a server sends it (for
/// example the result of `textDocument/formatting`).
pub fn command_for_text_edits_value(
    workspace: &Workspace,
    file: DocumentId,
    edits: &Value,
) -> Result<Command, String> {
    let edits = text_edits_from_value(edits)?;
    command_for_text_edits(workspace, file, &edits)
}
