//! Effects on the live model shared by both executors.
//!
//! Every function re-validates its input against the workspace as it is *now*. A failure
//! is reported as an [`Abort`] reason, never as an error: staleness is expected whenever
//! time passes between building a command and running it.

use crate::command::{FutureFile, Highlight};
use crate::fragment::{Fragment, apply, diff, replay};
use crate::text::TextRange;
use crate::workspace::{DirectoryId, DocumentId, Workspace};

/// Why a step could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Abort {
    /// The document no longer has the text the command was computed against.
    Stale(DocumentId),
    /// Anything else; the message is user-presentable.
    Failed(String),
}

impl Abort {
    pub(crate) fn reason(&self) -> String {
        match self {
            Abort::Stale(file) => format!("{file} was modified since the command was computed"),
            Abort::Failed(reason) => reason.clone(),
        }
    }
}

pub(crate) fn update_text(
    workspace: &mut Workspace,
    file: DocumentId,
    original: &str,
    updated: &str,
    fragments: Option<&[Fragment]>,
) -> Result<(), Abort> {
    let live = workspace
        .document_text(file)
        .map_err(|e| Abort::Failed(e.to_string()))?;
    if live != original {
        tracing::warn!(file = %file, "text update is stale");
        return Err(Abort::Stale(file));
    }

    // Hand-built commands may carry fragments that do not describe `updated`.
    let computed;
    let fragments: &[Fragment] = match fragments {
        Some(fragments) if apply(original, updated, fragments) == updated => fragments,
        supplied => {
            if supplied.is_some() {
                tracing::warn!(file = %file, "fragments do not produce the updated text, diffing");
            }
            computed = diff(original, updated);
            &computed
        }
    };
    for replacement in replay(updated, fragments) {
        workspace
            .replace(file, replacement.range, &replacement.text)
            .map_err(|e| Abort::Failed(e.to_string()))?;
    }
    tracing::debug!(file = %file, fragments = fragments.len(), "applied text update");
    Ok(())
}

pub(crate) fn create_file(
    workspace: &mut Workspace,
    file: &FutureFile,
    text: &str,
) -> Result<DocumentId, Abort> {
    workspace
        .open_document(file.parent, file.name.clone(), text)
        .map_err(|e| Abort::Failed(e.to_string()))
}

pub(crate) fn delete_file(workspace: &mut Workspace, file: DocumentId) -> Result<(), Abort> {
    workspace
        .delete_document(file)
        .map_err(|e| Abort::Failed(e.to_string()))
}

pub(crate) fn move_file(
    workspace: &mut Workspace,
    file: DocumentId,
    target: DirectoryId,
) -> Result<(), Abort> {
    workspace
        .move_document(file, target)
        .map_err(|e| Abort::Failed(e.to_string()))
}

pub(crate) fn navigate(
    workspace: &mut Workspace,
    file: DocumentId,
    caret: usize,
    selection: Option<TextRange>,
) -> Result<(), Abort> {
    workspace
        .set_caret(file, caret, selection)
        .map_err(|e| Abort::Failed(e.to_string()))
}

/// Check that every range still fits the document.
pub(crate) fn check_ranges<'a>(
    workspace: &Workspace,
    file: DocumentId,
    ranges: impl IntoIterator<Item = &'a TextRange>,
) -> Result<(), Abort> {
    let len = workspace
        .document(file)
        .map_err(|e| Abort::Failed(e.to_string()))?
        .len_chars();
    match ranges.into_iter().find(|range| !range.fits(len)) {
        Some(range) => Err(Abort::Failed(format!(
            "range {range} no longer fits {file} ({len} characters)"
        ))),
        None => Ok(()),
    }
}

pub(crate) fn check_highlights(
    workspace: &Workspace,
    file: DocumentId,
    highlights: &[Highlight],
) -> Result<(), Abort> {
    check_ranges(workspace, file, highlights.iter().map(|h| &h.range))
}
