//! Error types.
//!
//! Only construction-time misuse and executor/mode mismatches are errors. A command that has
//! gone stale by the time it runs is not an error: the executors abort that step instead.

use crate::command::CommandKind;
use crate::text::TextRange;
use crate::workspace::{DirectoryId, DocumentId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("range {range} exceeds text length {len}")]
/// A character range does not fit the text it was applied to.
pub struct RangeOutOfBounds {
    /// The offending range.
    pub range: TextRange,
    /// Length of the text in characters.
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced by the live [`crate::Workspace`] model.
pub enum WorkspaceError {
    #[error("unknown document {0}")]
    /// The document id is not (or no longer) part of the workspace.
    UnknownDocument(DocumentId),

    #[error("unknown directory {0}")]
    /// The directory id is not part of the workspace.
    UnknownDirectory(DirectoryId),

    #[error("'{name}' already exists in {directory}")]
    /// A child with this name already exists.
    NameTaken {
        /// Parent directory.
        directory: DirectoryId,
        /// Conflicting child name.
        name: String,
    },

    #[error("{document}: {source}")]
    /// An edit range does not fit the document.
    RangeOutOfBounds {
        /// Target document.
        document: DocumentId,
        /// Underlying bounds error.
        #[source]
        source: RangeOutOfBounds,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Misuse of a [`crate::MutationSession`] by the calling transformation.
///
/// These signal logic errors in the transformation and are not user-recoverable.
pub enum SessionError {
    #[error("invalid state: {0}")]
    /// The operation is not allowed at this point of the session.
    InvalidState(String),

    #[error(transparent)]
    /// The live model does not know the referenced document or directory.
    Workspace(#[from] WorkspaceError),

    #[error("{document}: {source}")]
    /// An edit or anchor range does not fit the snapshot.
    RangeOutOfBounds {
        /// Target document.
        document: DocumentId,
        /// Underlying bounds error.
        #[source]
        source: RangeOutOfBounds,
    },

    #[error("{0} was deleted in this session")]
    /// The document was already deleted by this session.
    DocumentDeleted(DocumentId),

    #[error("pending element edits overlap at {0}")]
    /// Two queued element replacements touch the same text.
    OverlappingElementEdits(TextRange),

    #[error("name range {name} is not inside symbol range {symbol}")]
    /// A rename request whose identifier range lies outside the symbol.
    NameOutsideSymbol {
        /// The symbol range.
        symbol: TextRange,
        /// The identifier range.
        name: TextRange,
    },
}

/// Which executor rejected a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    /// The headless executor.
    Batch,
    /// The UI-bound executor.
    Interactive,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Batch => write!(f, "batch"),
            ExecutionMode::Interactive => write!(f, "interactive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors returned by the executors.
pub enum ExecuteError {
    #[error("{kind} is not supported in {mode} mode")]
    /// The command variant cannot run under this executor.
    Unsupported {
        /// The rejecting executor.
        mode: ExecutionMode,
        /// The rejected variant.
        kind: CommandKind,
    },

    #[error("cannot resume: {0}")]
    /// `resume` was called without a matching suspension.
    InvalidResume(String),
}
