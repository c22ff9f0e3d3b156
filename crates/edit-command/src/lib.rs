#![warn(missing_docs)]
//! Edit Command - Deferred Mutation Commands for Editor Transformations
//!
//! # Overview
//!
//! `edit-command` lets a transformation (a refactoring or a quick-fix)
//! compute its effect against private, writable snapshots of documents and directories, and
//! hands that effect back as an immutable [`Command`] value instead of applying it. The
//! command can then be previewed, serialized, discarded, or executed by one of two
//! executors:
//!
//! - [`InteractiveExecution`]: step by step against a live editor, with navigation, conflict
//!   dialogs and inline templates, suspending whenever the user has to answer.
//! - [`BatchExecutor`]: headless, for batch fixes, previews and tests.
//!
//! # Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Executors (Interactive / Batch)            │  ← Apply to the live model
//! ├─────────────────────────────────────────────┤
//! │  Command Algebra                            │  ← Immutable effect values
//! ├─────────────────────────────────────────────┤
//! │  Mutation Session                           │  ← Per-transformation context
//! ├─────────────────────────────────────────────┤
//! │  Snapshot Tracker + Fragments               │  ← Private copies, minimal diff
//! ├─────────────────────────────────────────────┤
//! │  Workspace / Document (Rope-based)          │  ← Live model
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use edit_command::{
//!     BatchExecutor, BatchStatus, Command, MutationSession, TextRange, Workspace,
//! };
//!
//! let mut ws = Workspace::new();
//! let doc = ws.open_document(ws.root(), "lib.rs", "abc").unwrap();
//!
//! // Compute the effect without touching the workspace.
//! let mut session = MutationSession::new(&ws, doc);
//! session.replace(doc, TextRange::new(0, 1), "X").unwrap();
//! session.replace(doc, TextRange::new(2, 3), "YZ").unwrap();
//! let cmd = session.into_command().unwrap();
//!
//! match &cmd {
//!     Command::UpdateText { updated, fragments, .. } => {
//!         assert_eq!(updated, "XbYZ");
//!         assert_eq!(fragments.as_ref().map(Vec::len), Some(1));
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//!
//! // Apply it.
//! assert_eq!(BatchExecutor::new(&mut ws).execute(&cmd).unwrap(), BatchStatus::Success);
//! assert_eq!(ws.document_text(doc).unwrap(), "XbYZ");
//! ```
//!
//! # Module Description
//!
//! - [`document`] - Rope-backed text documents
//! - [`workspace`] - Live model: documents, directories, carets, options
//! - [`fragment`] - Edit fragments and their reduction
//! - [`snapshot`] - Writable copies of documents and directories
//! - [`session`] - The mutation session
//! - [`command`] - The command algebra
//! - [`template`] - Inline templates
//! - [`batch`] - Headless executor
//! - [`interactive`] - UI-bound executor
//! - [`registry`] - Parking space for suspended executions
//! - [`config`] - Settings
//!
//! # Offsets
//!
//! All offsets and ranges count Unicode scalar values. Converting to UTF-16 for editor
//! protocols is done by `edit-command-lsp`.

pub mod batch;
pub mod command;
pub mod config;
pub mod document;
mod effects;
pub mod error;
pub mod fragment;
pub mod interactive;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod template;
mod text;
pub mod workspace;

pub use batch::{BatchExecutor, BatchStatus};
pub use command::{
    ActionCandidate, Command, CommandKind, Conflict, Continuation, FutureFile, Highlight,
    HighlightStyle, RenameRequest, Severity,
};
pub use config::{ExecutorConfig, SessionConfig};
pub use document::Document;
pub use error::{ExecuteError, ExecutionMode, RangeOutOfBounds, SessionError, WorkspaceError};
pub use fragment::{Fragment, FragmentTracker, Replacement, apply, diff, replay};
pub use interactive::{EditorUi, ExecutionState, InteractiveExecution, Suspension, UserInput};
pub use registry::ExecutionRegistry;
pub use session::{MutationSession, Node, Writable};
pub use snapshot::{DirectorySnapshot, Element, SnapshotTracker, WritableElement};
pub use template::{Template, TemplateExpansion, TemplateOutcome, TemplateVariable};
pub use text::TextRange;
pub use workspace::{DirectoryId, DocumentId, OptionValue, Workspace};
