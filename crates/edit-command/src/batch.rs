//! Headless command execution.
//!
//! [`BatchExecutor`] applies the effects of a [`Command`] that make sense without a UI and
//! reports a terminal [`BatchStatus`]. It never suspends: a choice between several actions
//! is handed back to the caller as [`BatchStatus::Deferred`].
//!
//! Commands that only make sense with a user in the loop are rejected up front with
//! [`ExecuteError::Unsupported`], before anything in the workspace changes.
//!
//! # Example
//!
//! ```rust
//! use edit_command::{BatchExecutor, BatchStatus, MutationSession, TextRange, Workspace};
//!
//! let mut ws = Workspace::new();
//! let doc = ws.open_document(ws.root(), "a.txt", "abc").unwrap();
//!
//! let mut session = MutationSession::new(&ws, doc);
//! session.replace(doc, TextRange::new(0, 1), "X").unwrap();
//! let cmd = session.into_command().unwrap();
//!
//! let status = BatchExecutor::new(&mut ws).execute(&cmd).unwrap();
//! assert_eq!(status, BatchStatus::Success);
//! assert_eq!(ws.document_text(doc).unwrap(), "Xbc");
//! ```

use crate::command::Command;
use crate::effects::{self, Abort};
use crate::error::{ExecuteError, ExecutionMode};
use crate::workspace::Workspace;

/// Outcome of a batch execution.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchStatus {
    /// Every step was applied.
    Success,
    /// A step could not be applied; later steps were skipped.
    Aborted {
        /// Why.
        reason: String,
    },
    /// A choice between several actions needs a decision.
    Deferred {
        /// The unresolved [`Command::ChooseAction`].
        choice: Command,
        /// Steps that follow the choice.
        tail: Command,
    },
}

impl BatchStatus {
    /// Returns `true` for [`BatchStatus::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, BatchStatus::Success)
    }
}

/// Applies commands to a workspace without a UI.
pub struct BatchExecutor<'w> {
    workspace: &'w mut Workspace,
}

impl<'w> BatchExecutor<'w> {
    /// Create an executor over `workspace`.
    pub fn new(workspace: &'w mut Workspace) -> Self {
        Self { workspace }
    }

    /// Execute `command`.
    pub fn execute(&mut self, command: &Command) -> Result<BatchStatus, ExecuteError> {
        Self::check_supported(command)?;
        let status = self.run(command)?;
        tracing::debug!(?status, "batch execution finished");
        Ok(status)
    }

    /// Re-drive a [`BatchStatus::Deferred`] result with the chosen candidate.
    pub fn resolve(
        &mut self,
        choice: &Command,
        index: usize,
        tail: &Command,
    ) -> Result<BatchStatus, ExecuteError> {
        let Command::ChooseAction { candidates, .. } = choice else {
            return Err(ExecuteError::InvalidResume(format!(
                "expected a choose_action command, got {}",
                choice.kind()
            )));
        };
        let Some(candidate) = candidates.get(index) else {
            return Err(ExecuteError::InvalidResume(format!(
                "choice {index} out of range ({} candidates)",
                candidates.len()
            )));
        };
        self.execute(&candidate.command.clone().and_then(tail.clone()))
    }

    fn check_supported(command: &Command) -> Result<(), ExecuteError> {
        for step in command.steps() {
            let supported = match step {
                Command::Nothing
                | Command::UpdateText { .. }
                | Command::CreateFile { .. }
                | Command::DeleteFile { .. }
                | Command::MoveFile { .. }
                | Command::Navigate { .. }
                | Command::Highlight { .. }
                | Command::ChooseAction { .. }
                | Command::UpdateOption { .. }
                | Command::Composite(_) => true,
                Command::StartRename(_)
                | Command::StartTemplate { .. }
                | Command::ShowConflicts { .. }
                | Command::DisplayMessage { .. } => false,
            };
            if !supported {
                tracing::warn!(kind = %step.kind(), "command not supported in batch mode");
                return Err(ExecuteError::Unsupported {
                    mode: ExecutionMode::Batch,
                    kind: step.kind(),
                });
            }
        }
        Ok(())
    }

    fn run(&mut self, command: &Command) -> Result<BatchStatus, ExecuteError> {
        tracing::trace!(kind = %command.kind(), "batch step");
        let applied = match command {
            Command::Nothing => Ok(()),
            Command::UpdateText {
                file,
                original,
                updated,
                fragments,
            } => effects::update_text(
                self.workspace,
                *file,
                original,
                updated,
                fragments.as_deref(),
            ),
            Command::CreateFile { file, text } => {
                effects::create_file(self.workspace, file, text).map(|_| ())
            }
            Command::DeleteFile { file } => effects::delete_file(self.workspace, *file),
            Command::MoveFile { file, target } => effects::move_file(self.workspace, *file, *target),
            Command::Navigate {
                file,
                caret,
                selection,
            } => effects::navigate(self.workspace, *file, *caret, *selection),
            Command::Highlight { file, highlights } => {
                effects::check_highlights(self.workspace, *file, highlights)
            }
            Command::UpdateOption { name, value } => {
                self.workspace.set_option(name.clone(), value.clone());
                Ok(())
            }
            Command::ChooseAction { candidates, .. } => {
                return match candidates.as_slice() {
                    [] => Ok(BatchStatus::Success),
                    [only] => {
                        Self::check_supported(&only.command)?;
                        self.run(&only.command)
                    }
                    _ => Ok(BatchStatus::Deferred {
                        choice: command.clone(),
                        tail: Command::Nothing,
                    }),
                };
            }
            Command::Composite(steps) => return self.run_all(steps),
            Command::StartRename(_)
            | Command::StartTemplate { .. }
            | Command::ShowConflicts { .. }
            | Command::DisplayMessage { .. } => {
                return Err(ExecuteError::Unsupported {
                    mode: ExecutionMode::Batch,
                    kind: command.kind(),
                });
            }
        };

        Ok(match applied {
            Ok(()) => BatchStatus::Success,
            Err(abort) => Self::aborted(abort),
        })
    }

    fn run_all(&mut self, steps: &[Command]) -> Result<BatchStatus, ExecuteError> {
        for (index, step) in steps.iter().enumerate() {
            match self.run(step)? {
                BatchStatus::Success => {}
                BatchStatus::Deferred { choice, tail } => {
                    let rest = Command::sequence(steps[index + 1..].iter().cloned());
                    return Ok(BatchStatus::Deferred {
                        choice,
                        tail: tail.and_then(rest),
                    });
                }
                aborted @ BatchStatus::Aborted { .. } => return Ok(aborted),
            }
        }
        Ok(BatchStatus::Success)
    }

    fn aborted(abort: Abort) -> BatchStatus {
        let reason = abort.reason();
        tracing::debug!(%reason, "batch step aborted");
        BatchStatus::Aborted { reason }
    }
}
