//! UI-bound command execution.
//!
//! [`InteractiveExecution`] walks a [`Command`] step by step against the live workspace,
//! calling into an [`EditorUi`] for everything the user should see. Whenever a step needs
//! the user (a choice between actions, a conflict dialog, an inline template) the execution
//! suspends in [`ExecutionState::AwaitingUser`]; the caller parks it (see
//! [`crate::ExecutionRegistry`]) and later calls [`InteractiveExecution::resume`] with the
//! user's answer.
//!
//! Positions are re-validated when a step runs, not when the command was built. A step
//! whose document or range went stale aborts the rest of the execution instead of failing.

use crate::command::{
    ActionCandidate, Command, Conflict, Continuation, Highlight, RenameRequest, Severity,
};
use crate::config::ExecutorConfig;
use crate::effects::{self, Abort};
use crate::error::ExecuteError;
use crate::template::{TemplateExpansion, TemplateOutcome};
use crate::text::{TextRange, char_len};
use crate::workspace::{DocumentId, Workspace};
use std::collections::{BTreeMap, VecDeque};

/// UI services the interactive executor drives.
pub trait EditorUi {
    /// Bring `file` into view with the given caret and selection.
    fn open_document(&mut self, file: DocumentId, caret: usize, selection: Option<TextRange>);

    /// Show a transient message.
    fn show_message(&mut self, severity: Severity, message: &str);

    /// Highlight ranges in `file`.
    fn highlight(&mut self, file: DocumentId, highlights: &[Highlight]);

    /// Start an inline rename.
    fn start_rename(&mut self, request: &RenameRequest);

    /// Start editing an inline template that was inserted at `offset`.
    fn start_template(&mut self, file: DocumentId, offset: usize, expansion: &TemplateExpansion);

    /// Show a modal conflict dialog. The answer arrives through
    /// [`UserInput::ConfirmConflicts`].
    fn show_conflicts(&mut self, conflicts: &[Conflict]);

    /// Show a popup with one entry per label. The answer arrives through
    /// [`UserInput::Choose`].
    fn show_choices(&mut self, title: &str, labels: &[String]);
}

/// What an execution is waiting for.
#[derive(Debug, Clone, PartialEq)]
pub enum Suspension {
    /// A choice between several actions.
    Choice {
        /// Popup title.
        title: String,
        /// The candidates, in popup order.
        candidates: Vec<ActionCandidate>,
    },
    /// Confirmation of a conflict dialog.
    Conflicts {
        /// Conflicts shown.
        conflicts: Vec<Conflict>,
        /// Command to run if the user proceeds.
        next: Command,
    },
    /// Completion of an inline template.
    Template {
        /// Document the template was inserted into.
        file: DocumentId,
        /// Range covered by the expanded template.
        range: TextRange,
        /// Produces the follow-up command.
        on_finish: Continuation,
    },
}

/// Answer to a [`Suspension`].
#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    /// Index of the chosen candidate.
    Choose(usize),
    /// `true` to proceed past the conflicts, `false` to cancel.
    ConfirmConflicts(bool),
    /// The template was finished with these values.
    TemplateFinished(TemplateOutcome),
    /// The template was cancelled.
    TemplateCancelled,
}

/// State of an [`InteractiveExecution`].
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionState {
    /// Not started yet.
    Pending,
    /// Running steps.
    Executing,
    /// All steps ran.
    Completed,
    /// A step failed or the user cancelled; remaining steps were dropped.
    Aborted {
        /// Why.
        reason: String,
    },
    /// Waiting for the user.
    AwaitingUser(Suspension),
}

impl ExecutionState {
    /// Returns `true` for [`ExecutionState::Completed`] and [`ExecutionState::Aborted`].
    pub fn is_finished(&self) -> bool {
        matches!(self, ExecutionState::Completed | ExecutionState::Aborted { .. })
    }
}

/// A resumable execution of one command.
#[derive(Debug)]
pub struct InteractiveExecution {
    queue: VecDeque<Command>,
    state: ExecutionState,
    config: ExecutorConfig,
}

impl InteractiveExecution {
    /// Prepare the execution of `command`.
    pub fn new(command: Command) -> Self {
        Self::with_config(command, ExecutorConfig::default())
    }

    /// Prepare the execution of `command` with explicit settings.
    pub fn with_config(command: Command, config: ExecutorConfig) -> Self {
        Self {
            queue: VecDeque::from([command]),
            state: ExecutionState::Pending,
            config,
        }
    }

    /// Current state.
    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    /// Steps not executed yet, as one command.
    pub fn tail(&self) -> Command {
        Command::sequence(self.queue.iter().cloned())
    }

    /// Start executing. Runs until the command completes, aborts or needs the user.
    pub fn run(
        &mut self,
        workspace: &mut Workspace,
        ui: &mut dyn EditorUi,
    ) -> Result<&ExecutionState, ExecuteError> {
        if self.state != ExecutionState::Pending {
            return Err(ExecuteError::InvalidResume(
                "execution was already started".to_string(),
            ));
        }
        self.drive(workspace, ui);
        Ok(&self.state)
    }

    /// Feed the user's answer to a suspended execution and keep going.
    pub fn resume(
        &mut self,
        input: UserInput,
        workspace: &mut Workspace,
        ui: &mut dyn EditorUi,
    ) -> Result<&ExecutionState, ExecuteError> {
        let suspension = match std::mem::replace(&mut self.state, ExecutionState::Executing) {
            ExecutionState::AwaitingUser(suspension) => suspension,
            other => {
                let message = format!("execution is not suspended ({other:?})");
                self.state = other;
                return Err(ExecuteError::InvalidResume(message));
            }
        };

        match (suspension, input) {
            (Suspension::Choice { mut candidates, .. }, UserInput::Choose(index))
                if index < candidates.len() =>
            {
                let chosen = candidates.swap_remove(index);
                tracing::debug!(label = %chosen.label, "user chose action");
                self.queue.push_front(chosen.command);
            }
            (Suspension::Conflicts { next, .. }, UserInput::ConfirmConflicts(true)) => {
                self.queue.push_front(next);
            }
            (Suspension::Conflicts { .. }, UserInput::ConfirmConflicts(false)) => {
                let reason = self.config.cancelled_conflicts_message.clone();
                tracing::info!(%reason, "user declined conflicts");
                self.queue.clear();
                self.state = ExecutionState::Aborted { reason };
                return Ok(&self.state);
            }
            (Suspension::Template { on_finish, file, .. }, UserInput::TemplateFinished(outcome)) => {
                tracing::debug!(file = %file, "template finished");
                self.queue.push_front(on_finish.resolve(&outcome));
            }
            (Suspension::Template { file, .. }, UserInput::TemplateCancelled) => {
                tracing::debug!(file = %file, "template cancelled");
                self.queue.clear();
                self.state = ExecutionState::Aborted {
                    reason: "template cancelled".to_string(),
                };
                return Ok(&self.state);
            }
            (suspension, input) => {
                let message = format!("{input:?} does not answer {suspension:?}");
                self.state = ExecutionState::AwaitingUser(suspension);
                return Err(ExecuteError::InvalidResume(message));
            }
        }

        self.drive(workspace, ui);
        Ok(&self.state)
    }

    fn drive(&mut self, workspace: &mut Workspace, ui: &mut dyn EditorUi) {
        self.state = ExecutionState::Executing;
        while let Some(command) = self.queue.pop_front() {
            match self.step(command, workspace, ui) {
                Ok(None) => {}
                Ok(Some(suspension)) => {
                    tracing::debug!(remaining = self.queue.len(), "execution suspended");
                    self.state = ExecutionState::AwaitingUser(suspension);
                    return;
                }
                Err(abort) => {
                    if let Abort::Stale(_) = abort {
                        ui.show_message(Severity::Error, &self.config.stale_document_message);
                    }
                    let reason = abort.reason();
                    tracing::warn!(%reason, dropped = self.queue.len(), "execution aborted");
                    self.queue.clear();
                    self.state = ExecutionState::Aborted { reason };
                    return;
                }
            }
        }
        self.state = ExecutionState::Completed;
    }

    fn step(
        &mut self,
        command: Command,
        workspace: &mut Workspace,
        ui: &mut dyn EditorUi,
    ) -> Result<Option<Suspension>, Abort> {
        tracing::trace!(kind = %command.kind(), "interactive step");
        match command {
            Command::Nothing => {}
            Command::Composite(steps) => {
                for step in steps.into_iter().rev() {
                    self.queue.push_front(step);
                }
            }
            Command::UpdateText {
                file,
                original,
                updated,
                fragments,
            } => effects::update_text(workspace, file, &original, &updated, fragments.as_deref())?,
            Command::CreateFile { file, text } => {
                effects::create_file(workspace, &file, &text).inspect_err(|abort| {
                    ui.show_message(Severity::Error, &abort.reason());
                })?;
            }
            Command::DeleteFile { file } => {
                effects::delete_file(workspace, file).inspect_err(|abort| {
                    ui.show_message(Severity::Error, &abort.reason());
                })?;
            }
            Command::MoveFile { file, target } => {
                effects::move_file(workspace, file, target).inspect_err(|abort| {
                    ui.show_message(Severity::Error, &abort.reason());
                })?;
            }
            Command::Navigate {
                file,
                caret,
                selection,
            } => {
                effects::navigate(workspace, file, caret, selection)?;
                ui.open_document(file, caret, selection);
            }
            Command::Highlight { file, highlights } => {
                effects::check_highlights(workspace, file, &highlights)?;
                ui.highlight(file, &highlights);
            }
            Command::StartRename(request) => {
                effects::check_ranges(
                    workspace,
                    request.file,
                    [&request.symbol_range, &request.name_range],
                )?;
                ui.start_rename(&request);
            }
            Command::StartTemplate {
                file,
                range,
                template,
                on_finish,
            } => {
                let expansion = template.expand(&BTreeMap::new());
                workspace
                    .replace(file, range, &expansion.text)
                    .map_err(|e| Abort::Failed(e.to_string()))?;
                let inserted = TextRange::new(range.start, range.start + char_len(&expansion.text));
                ui.start_template(file, range.start, &expansion);
                return Ok(Some(Suspension::Template {
                    file,
                    range: inserted,
                    on_finish,
                }));
            }
            Command::ChooseAction {
                title,
                mut candidates,
            } => {
                if candidates.len() > 1 {
                    let labels: Vec<String> = candidates.iter().map(|c| c.label.clone()).collect();
                    ui.show_choices(&title, &labels);
                    return Ok(Some(Suspension::Choice { title, candidates }));
                }
                if let Some(only) = candidates.pop() {
                    self.queue.push_front(only.command);
                }
            }
            Command::ShowConflicts { conflicts, next } => {
                if conflicts.is_empty() {
                    self.queue.push_front(*next);
                } else {
                    ui.show_conflicts(&conflicts);
                    return Ok(Some(Suspension::Conflicts {
                        conflicts,
                        next: *next,
                    }));
                }
            }
            Command::DisplayMessage { severity, message } => ui.show_message(severity, &message),
            Command::UpdateOption { name, value } => {
                workspace.set_option(name, value);
            }
        }
        Ok(None)
    }
}
