//! The command algebra.
//!
//! A [`Command`] describes an effect on the live model without performing it. Commands are
//! plain values: they can be cloned, inspected, serialized for a preview, or dropped. Two
//! commands compose with [`Command::and_then`]; [`Command::Nothing`] is the identity and
//! composition is associative, so any tree of compositions is one flat sequence of steps.
//!
//! # Example
//!
//! ```rust
//! use edit_command::{Command, Severity};
//!
//! let first = Command::info("formatting");
//! let cmd = Command::nothing().and_then(first.clone()).and_then(Command::nothing());
//! assert_eq!(cmd, first);
//!
//! let seq = Command::info("a").and_then(Command::info("b"));
//! assert_eq!(seq.steps().count(), 2);
//! # let _ = Severity::Info;
//! ```
//!
//! The variant set is closed. Both executors match it exhaustively without a wildcard arm,
//! so adding a variant fails to compile until every executor handles it.

use crate::fragment::Fragment;
use crate::template::{Template, TemplateOutcome};
use crate::text::TextRange;
use crate::workspace::{DirectoryId, DocumentId, OptionValue};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A file that does not exist yet: a name inside an existing directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FutureFile {
    /// Directory the file will be created in.
    pub parent: DirectoryId,
    /// File name.
    pub name: String,
}

/// Visual style of a highlighted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightStyle {
    /// Neutral emphasis (search results, changed text).
    Plain,
    /// A read access of a symbol.
    Read,
    /// A write access of a symbol.
    Write,
}

/// A highlighted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Highlight {
    /// Highlighted characters.
    pub range: TextRange,
    /// Style.
    pub style: HighlightStyle,
}

/// Request to start an inline rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenameRequest {
    /// Document containing the symbol.
    pub file: DocumentId,
    /// Range of the whole symbol declaration.
    pub symbol_range: TextRange,
    /// Range of the identifier inside the symbol.
    pub name_range: TextRange,
    /// Suggested names, insertion order, no duplicates.
    pub suggestions: Vec<String>,
}

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational hint.
    Info,
    /// Warning.
    Warning,
    /// Error; also used for cancellation messages.
    Error,
}

/// A conflict the user has to acknowledge before the rest of a command runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    /// Document the conflict is about, if any.
    pub file: Option<DocumentId>,
    /// Range the conflict is about, if any.
    pub range: Option<TextRange>,
    /// Human-readable description.
    pub message: String,
}

/// One entry of a choose-one-of-N command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionCandidate {
    /// Label shown to the user.
    pub label: String,
    /// Command to run when chosen.
    pub command: Command,
}

impl ActionCandidate {
    /// Create a candidate.
    pub fn new(label: impl Into<String>, command: Command) -> Self {
        Self {
            label: label.into(),
            command,
        }
    }
}

/// Maps the outcome of a finished template to the command that follows it.
#[derive(Clone)]
pub struct Continuation(Arc<dyn Fn(&TemplateOutcome) -> Command + Send + Sync>);

impl Continuation {
    /// Wrap a function.
    pub fn new(f: impl Fn(&TemplateOutcome) -> Command + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// A continuation that always yields [`Command::Nothing`].
    pub fn finish() -> Self {
        Self::new(|_| Command::Nothing)
    }

    /// Produce the follow-up command.
    pub fn resolve(&self, outcome: &TemplateOutcome) -> Command {
        (self.0)(outcome)
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Continuation(..)")
    }
}

impl PartialEq for Continuation {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Serialize for Continuation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("<continuation>")
    }
}

/// An immutable description of an effect on the live model.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Command {
    /// Do nothing. Identity of [`Command::and_then`].
    #[default]
    Nothing,
    /// Replace the text of a document.
    UpdateText {
        /// Target document.
        file: DocumentId,
        /// Text the command was computed against.
        original: String,
        /// Text after the update.
        updated: String,
        /// Minimal diff; `None` means "compute one at execution time".
        fragments: Option<Vec<Fragment>>,
    },
    /// Create a file with initial content.
    CreateFile {
        /// Where and under which name.
        file: FutureFile,
        /// Initial text.
        text: String,
    },
    /// Delete a document.
    DeleteFile {
        /// Target document.
        file: DocumentId,
    },
    /// Move a document into another directory.
    MoveFile {
        /// Target document.
        file: DocumentId,
        /// Destination directory.
        target: DirectoryId,
    },
    /// Open a document and place the caret / selection.
    Navigate {
        /// Target document.
        file: DocumentId,
        /// Caret offset.
        caret: usize,
        /// Optional selection.
        selection: Option<TextRange>,
    },
    /// Highlight ranges in a document.
    Highlight {
        /// Target document.
        file: DocumentId,
        /// Ranges and their styles.
        highlights: Vec<Highlight>,
    },
    /// Start an inline rename.
    StartRename(RenameRequest),
    /// Insert an inline template and let the user fill it in.
    StartTemplate {
        /// Target document.
        file: DocumentId,
        /// Range replaced by the expanded template.
        range: TextRange,
        /// The template.
        template: Template,
        /// Produces the command that runs once the template is finished.
        on_finish: Continuation,
    },
    /// Let the user pick one of several commands.
    ChooseAction {
        /// Popup title.
        title: String,
        /// Candidates, already computed.
        candidates: Vec<ActionCandidate>,
    },
    /// Ask the user to acknowledge conflicts, then continue with `next`.
    ShowConflicts {
        /// Conflicts to show.
        conflicts: Vec<Conflict>,
        /// Command to run if the user proceeds.
        next: Box<Command>,
    },
    /// Show a message.
    DisplayMessage {
        /// Severity.
        severity: Severity,
        /// Text.
        message: String,
    },
    /// Change a workspace option.
    UpdateOption {
        /// Option name.
        name: String,
        /// New value.
        value: OptionValue,
    },
    /// Run several commands in order.
    Composite(Vec<Command>),
}

/// Discriminant of a [`Command`], for diagnostics and error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// [`Command::Nothing`]
    Nothing,
    /// [`Command::UpdateText`]
    UpdateText,
    /// [`Command::CreateFile`]
    CreateFile,
    /// [`Command::DeleteFile`]
    DeleteFile,
    /// [`Command::MoveFile`]
    MoveFile,
    /// [`Command::Navigate`]
    Navigate,
    /// [`Command::Highlight`]
    Highlight,
    /// [`Command::StartRename`]
    StartRename,
    /// [`Command::StartTemplate`]
    StartTemplate,
    /// [`Command::ChooseAction`]
    ChooseAction,
    /// [`Command::ShowConflicts`]
    ShowConflicts,
    /// [`Command::DisplayMessage`]
    DisplayMessage,
    /// [`Command::UpdateOption`]
    UpdateOption,
    /// [`Command::Composite`]
    Composite,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CommandKind::Nothing => "nothing",
            CommandKind::UpdateText => "update_text",
            CommandKind::CreateFile => "create_file",
            CommandKind::DeleteFile => "delete_file",
            CommandKind::MoveFile => "move_file",
            CommandKind::Navigate => "navigate",
            CommandKind::Highlight => "highlight",
            CommandKind::StartRename => "start_rename",
            CommandKind::StartTemplate => "start_template",
            CommandKind::ChooseAction => "choose_action",
            CommandKind::ShowConflicts => "show_conflicts",
            CommandKind::DisplayMessage => "display_message",
            CommandKind::UpdateOption => "update_option",
            CommandKind::Composite => "composite",
        };
        f.write_str(name)
    }
}

impl Command {
    /// The no-op command.
    pub fn nothing() -> Self {
        Command::Nothing
    }

    /// An error-severity message.
    pub fn error(message: impl Into<String>) -> Self {
        Command::DisplayMessage {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    /// An info-severity message.
    pub fn info(message: impl Into<String>) -> Self {
        Command::DisplayMessage {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    /// Compose all commands in order.
    pub fn sequence(commands: impl IntoIterator<Item = Command>) -> Self {
        commands
            .into_iter()
            .fold(Command::Nothing, |acc, next| acc.and_then(next))
    }

    /// Run `self`, then `next`.
    ///
    /// Nothing on either side yields the other side; composites are flattened, so
    /// `a.and_then(b).and_then(c) == a.and_then(b.and_then(c))`.
    pub fn and_then(self, next: Command) -> Command {
        // Composites with no steps behave like nothing.
        let normalize = |cmd: Command| if cmd.is_nothing() { Command::Nothing } else { cmd };
        match (normalize(self), normalize(next)) {
            (Command::Nothing, next) => next,
            (this, Command::Nothing) => this,
            (Command::Composite(mut left), Command::Composite(right)) => {
                left.extend(right);
                Command::Composite(left)
            }
            (Command::Composite(mut left), next) => {
                left.push(next);
                Command::Composite(left)
            }
            (this, Command::Composite(right)) => {
                let mut steps = Vec::with_capacity(right.len() + 1);
                steps.push(this);
                steps.extend(right);
                Command::Composite(steps)
            }
            (this, next) => Command::Composite(vec![this, next]),
        }
    }

    /// Returns `true` for [`Command::Nothing`] and composites of nothing.
    pub fn is_nothing(&self) -> bool {
        self.steps().next().is_none()
    }

    /// The discriminant.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Nothing => CommandKind::Nothing,
            Command::UpdateText { .. } => CommandKind::UpdateText,
            Command::CreateFile { .. } => CommandKind::CreateFile,
            Command::DeleteFile { .. } => CommandKind::DeleteFile,
            Command::MoveFile { .. } => CommandKind::MoveFile,
            Command::Navigate { .. } => CommandKind::Navigate,
            Command::Highlight { .. } => CommandKind::Highlight,
            Command::StartRename(_) => CommandKind::StartRename,
            Command::StartTemplate { .. } => CommandKind::StartTemplate,
            Command::ChooseAction { .. } => CommandKind::ChooseAction,
            Command::ShowConflicts { .. } => CommandKind::ShowConflicts,
            Command::DisplayMessage { .. } => CommandKind::DisplayMessage,
            Command::UpdateOption { .. } => CommandKind::UpdateOption,
            Command::Composite(_) => CommandKind::Composite,
        }
    }

    /// Leaf steps in execution order, composites flattened and nothing skipped.
    pub fn steps(&self) -> impl Iterator<Item = &Command> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            while let Some(cmd) = stack.pop() {
                match cmd {
                    Command::Composite(children) => stack.extend(children.iter().rev()),
                    Command::Nothing => {}
                    leaf => return Some(leaf),
                }
            }
            None
        })
    }
}
