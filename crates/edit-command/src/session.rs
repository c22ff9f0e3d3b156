//! The per-transformation mutation context.
//!
//! A [`MutationSession`] borrows the live [`Workspace`] read-only. Every write goes to a
//! lazily created [`SnapshotTracker`] (documents) or [`DirectorySnapshot`] (directories), and
//! the auxiliary intents of the transformation (where the caret should go, what to
//! highlight, whether to start a rename, whether the whole thing was cancelled) are
//! recorded alongside. [`MutationSession::into_command`] folds all of it into one
//! [`Command`]; the live model is never touched.
//!
//! # Example
//!
//! ```rust
//! use edit_command::{Command, MutationSession, TextRange, Workspace};
//!
//! let mut ws = Workspace::new();
//! let doc = ws.open_document(ws.root(), "main.rs", "fn foo() {}").unwrap();
//!
//! let mut session = MutationSession::new(&ws, doc);
//! session.replace(doc, TextRange::new(3, 6), "bar").unwrap();
//! session.move_to(6).unwrap();
//!
//! let cmd = session.into_command().unwrap();
//! assert_eq!(cmd.steps().count(), 2);
//! // The live model is unchanged until an executor runs the command.
//! assert_eq!(ws.document_text(doc).unwrap(), "fn foo() {}");
//! ```

use crate::command::{Command, FutureFile, Highlight, HighlightStyle, RenameRequest};
use crate::config::SessionConfig;
use crate::error::{SessionError, WorkspaceError};
use crate::snapshot::{AppliedEdit, DirectorySnapshot, Element, SnapshotTracker, WritableElement};
use crate::text::{TextRange, shift_offset, shift_range};
use crate::workspace::{DirectoryId, DocumentId, OptionValue, Workspace};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Something a transformation can ask a writable counterpart of.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    /// A whole document.
    Document(DocumentId),
    /// A structural element of a document.
    Element(Element),
    /// A directory.
    Directory(DirectoryId),
}

/// The writable counterpart handed out by [`MutationSession::writable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Writable {
    /// The document's copy; edit it through the session's text methods.
    Document(DocumentId),
    /// An element of the copy; edit it with [`MutationSession::replace_element`].
    Element(WritableElement),
    /// The directory overlay; add files with [`MutationSession::create_file`].
    Directory(DirectoryId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    file: Option<DocumentId>,
    caret: usize,
    selection: Option<TextRange>,
}

/// Collects the effect of one transformation as a [`Command`].
pub struct MutationSession<'w> {
    workspace: &'w Workspace,
    config: SessionConfig,
    snapshots: BTreeMap<DocumentId, SnapshotTracker>,
    directories: BTreeMap<DirectoryId, DirectorySnapshot>,
    moves: BTreeMap<DocumentId, DirectoryId>,
    options: Vec<(String, OptionValue)>,
    start: Position,
    position: Position,
    navigated: bool,
    highlights: Vec<(DocumentId, Highlight)>,
    rename: Option<RenameRequest>,
    cancelled: Option<String>,
}

impl std::fmt::Debug for MutationSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutationSession")
            .field("snapshots", &self.snapshots.keys().collect::<Vec<_>>())
            .field("directories", &self.directories.keys().collect::<Vec<_>>())
            .field("position", &self.position)
            .field("cancelled", &self.cancelled)
            .finish()
    }
}

impl<'w> MutationSession<'w> {
    /// Start a session whose caret and selection begin where the live editor of `context`
    /// has them.
    pub fn new(workspace: &'w Workspace, context: DocumentId) -> Self {
        Self::with_config(workspace, Some(context), SessionConfig::default())
    }

    /// Start a session without a context document (no initial caret).
    pub fn detached(workspace: &'w Workspace) -> Self {
        Self::with_config(workspace, None, SessionConfig::default())
    }

    /// Start a session with explicit settings.
    pub fn with_config(
        workspace: &'w Workspace,
        context: Option<DocumentId>,
        config: SessionConfig,
    ) -> Self {
        let context = context.filter(|doc| workspace.contains_document(*doc));
        let start = Position {
            file: context,
            caret: context
                .and_then(|doc| workspace.caret(doc).ok())
                .unwrap_or(0),
            selection: context.and_then(|doc| workspace.selection(doc).ok().flatten()),
        };
        Self {
            workspace,
            config,
            snapshots: BTreeMap::new(),
            directories: BTreeMap::new(),
            moves: BTreeMap::new(),
            options: Vec::new(),
            start,
            position: start,
            navigated: false,
            highlights: Vec::new(),
            rename: None,
            cancelled: None,
        }
    }

    /// The live model this session reads from.
    pub fn workspace(&self) -> &'w Workspace {
        self.workspace
    }

    /// Returns `true` once [`MutationSession::cancel`] was called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.is_some()
    }

    /// Get the snapshot of `document`, creating it on first use.
    pub fn snapshot(&mut self, document: DocumentId) -> Result<&mut SnapshotTracker, SessionError> {
        match self.snapshots.entry(document) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let live = self.workspace.document(document)?;
                tracing::trace!(document = %document, "creating snapshot");
                Ok(entry.insert(SnapshotTracker::new(
                    document,
                    live,
                    self.config.coalesce_gap,
                )))
            }
        }
    }

    /// Hand out the writable counterpart of `node`.
    pub fn writable(&mut self, node: Node) -> Result<Writable, SessionError> {
        match node {
            Node::Document(document) => {
                let snapshot = self.snapshot(document)?;
                if snapshot.is_deleted() {
                    return Err(SessionError::DocumentDeleted(document));
                }
                Ok(Writable::Document(document))
            }
            Node::Element(element) => self.writable_element(&element).map(Writable::Element),
            Node::Directory(directory) => {
                self.directory(directory)?;
                Ok(Writable::Directory(directory))
            }
        }
    }

    /// Hand out the copy-side counterpart of `element`.
    ///
    /// Fails with [`SessionError::InvalidState`] once the element's document copy was edited.
    pub fn writable_element(&mut self, element: &Element) -> Result<WritableElement, SessionError> {
        self.snapshot(element.document)?
            .writable_element(element.range)
    }

    /// Current text of a document as this session sees it.
    pub fn text(&mut self, document: DocumentId) -> Result<String, SessionError> {
        if let Some(snapshot) = self.snapshots.get(&document)
            && snapshot.is_deleted()
        {
            return Err(SessionError::DocumentDeleted(document));
        }
        if !self.snapshots.contains_key(&document) {
            return Ok(self.workspace.document_text(document)?);
        }
        let (text, applied) = self.snapshot(document)?.text()?;
        self.shift_anchors(document, &applied);
        Ok(text)
    }

    /// Replace `range` of the document's copy with `text`.
    pub fn replace(
        &mut self,
        document: DocumentId,
        range: TextRange,
        text: &str,
    ) -> Result<(), SessionError> {
        let applied = self.snapshot(document)?.replace(range, text)?;
        self.shift_anchors(document, &applied);
        Ok(())
    }

    /// Insert `text` at `offset`.
    pub fn insert(
        &mut self,
        document: DocumentId,
        offset: usize,
        text: &str,
    ) -> Result<(), SessionError> {
        self.replace(document, TextRange::empty(offset), text)
    }

    /// Delete `range`.
    pub fn delete(&mut self, document: DocumentId, range: TextRange) -> Result<(), SessionError> {
        self.replace(document, range, "")
    }

    /// Queue a structural replacement of `element`.
    pub fn replace_element(
        &mut self,
        element: &WritableElement,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.snapshot(element.document())?
            .replace_element(element, text)
    }

    /// Create a file inside `directory`.
    pub fn create_file(
        &mut self,
        directory: DirectoryId,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<FutureFile, SessionError> {
        let name = name.into();
        if self.directory_children(directory)?.contains(&name) {
            return Err(WorkspaceError::NameTaken { directory, name }.into());
        }
        self.directory(directory)?
            .create_file(name.clone(), text.into());
        Ok(FutureFile {
            parent: directory,
            name,
        })
    }

    /// Delete a document.
    pub fn delete_file(&mut self, document: DocumentId) -> Result<(), SessionError> {
        let snapshot = self.snapshot(document)?;
        if snapshot.is_deleted() {
            return Err(SessionError::DocumentDeleted(document));
        }
        snapshot.mark_deleted();
        self.moves.remove(&document);
        Ok(())
    }

    /// Move a document into `target`.
    pub fn move_file(
        &mut self,
        document: DocumentId,
        target: DirectoryId,
    ) -> Result<(), SessionError> {
        if self.snapshots.get(&document).is_some_and(SnapshotTracker::is_deleted) {
            return Err(SessionError::DocumentDeleted(document));
        }
        let name = self.workspace.document_name(document)?.to_string();
        let current = self
            .moves
            .get(&document)
            .copied()
            .map_or_else(|| self.workspace.document_parent(document), Ok)?;
        if current == target {
            return Ok(());
        }
        if self.directory_children(target)?.contains(&name) {
            return Err(WorkspaceError::NameTaken {
                directory: target,
                name,
            }
            .into());
        }
        self.moves.insert(document, target);
        Ok(())
    }

    /// Children of `directory` as this session sees them, sorted.
    pub fn directory_children(&self, directory: DirectoryId) -> Result<Vec<String>, SessionError> {
        let mut names = self.workspace.child_names(directory)?;

        let gone = self
            .snapshots
            .values()
            .filter(|s| s.is_deleted())
            .map(|s| s.document())
            .chain(self.moves.keys().copied());
        for document in gone {
            if self.workspace.document_parent(document)? == directory {
                let name = self.workspace.document_name(document)?;
                names.retain(|n| n != name);
            }
        }

        for (document, target) in &self.moves {
            if *target == directory {
                names.push(self.workspace.document_name(*document)?.to_string());
            }
        }
        if let Some(overlay) = self.directories.get(&directory) {
            names.extend(overlay.names().map(str::to_string));
        }

        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Select `range` in the navigation target document.
    pub fn select(&mut self, range: TextRange) -> Result<(), SessionError> {
        self.ensure_target()?;
        self.position.selection = Some(range);
        self.position.caret = range.end;
        self.navigated = true;
        Ok(())
    }

    /// Highlight `range` in the navigation target document.
    pub fn highlight(&mut self, range: TextRange, style: HighlightStyle) -> Result<(), SessionError> {
        let file = self.ensure_target()?;
        self.highlights.push((file, Highlight { range, style }));
        Ok(())
    }

    /// Put the caret at `offset` in the navigation target document and clear the selection.
    pub fn move_to(&mut self, offset: usize) -> Result<(), SessionError> {
        self.ensure_target()?;
        self.position.caret = offset;
        self.position.selection = None;
        self.navigated = true;
        Ok(())
    }

    /// Navigate to the start of `element`, making its document the navigation target.
    pub fn move_to_element(&mut self, element: &Element) -> Result<(), SessionError> {
        if !self.workspace.contains_document(element.document) {
            return Err(WorkspaceError::UnknownDocument(element.document).into());
        }
        self.position = Position {
            file: Some(element.document),
            caret: element.range.start,
            selection: None,
        };
        self.navigated = true;
        Ok(())
    }

    /// Move the caret to the previous occurrence of `ch` before it.
    ///
    /// Returns `false` (and leaves the caret alone) if there is none.
    pub fn move_to_previous_occurrence_of(&mut self, ch: char) -> Result<bool, SessionError> {
        let file = self.ensure_target()?;
        let caret = self.position.caret;
        let found = match self.snapshots.get(&file) {
            Some(snapshot) => snapshot.rfind_char(caret, ch),
            None => self.workspace.document(file)?.rfind_char(caret, ch),
        };
        let Some(offset) = found else {
            return Ok(false);
        };
        self.move_to(offset)?;
        Ok(true)
    }

    /// Start an inline rename of the symbol at `symbol_range` once the command runs.
    ///
    /// Suggestions keep their order; duplicates are dropped. A pending rename replaces any
    /// navigation or highlighting in the resulting command.
    pub fn rename(
        &mut self,
        file: DocumentId,
        symbol_range: TextRange,
        name_range: TextRange,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<(), SessionError> {
        if !symbol_range.contains(name_range) {
            return Err(SessionError::NameOutsideSymbol {
                symbol: symbol_range,
                name: name_range,
            });
        }
        if !self.workspace.contains_document(file) {
            return Err(WorkspaceError::UnknownDocument(file).into());
        }

        let mut unique: Vec<String> = Vec::new();
        for suggestion in suggestions {
            let suggestion = suggestion.into();
            if !unique.contains(&suggestion) {
                unique.push(suggestion);
            }
        }
        self.rename = Some(RenameRequest {
            file,
            symbol_range,
            name_range,
            suggestions: unique,
        });
        Ok(())
    }

    /// Record an option change.
    pub fn update_option(&mut self, name: impl Into<String>, value: OptionValue) {
        self.options.push((name.into(), value));
    }

    /// Cancel the transformation. The resulting command is only an error message.
    ///
    /// The first message wins; later calls are ignored.
    pub fn cancel(&mut self, message: impl Into<String>) {
        if self.cancelled.is_none() {
            let message = message.into();
            tracing::debug!(%message, "mutation session cancelled");
            self.cancelled = Some(message);
        }
    }

    /// Fold everything recorded into one command.
    pub fn into_command(mut self) -> Result<Command, SessionError> {
        if let Some(message) = self.cancelled.take() {
            return Ok(Command::error(message));
        }

        let mut commands = Vec::new();
        let documents: Vec<DocumentId> = self.snapshots.keys().copied().collect();
        for document in documents {
            let applied = self.snapshot(document)?.commit_pending()?;
            self.shift_anchors(document, &applied);
        }

        let mut final_lengths = BTreeMap::new();
        for (document, snapshot) in std::mem::take(&mut self.snapshots) {
            final_lengths.insert(document, (!snapshot.is_deleted()).then(|| snapshot.len_chars()));
            commands.push(snapshot.finish()?);
        }
        for (parent, overlay) in std::mem::take(&mut self.directories) {
            commands.extend(overlay.into_commands(parent));
        }
        for (file, target) in std::mem::take(&mut self.moves) {
            commands.push(Command::MoveFile { file, target });
        }
        for (name, value) in std::mem::take(&mut self.options) {
            commands.push(Command::UpdateOption { name, value });
        }

        let workspace = self.workspace;
        let final_len = |document: DocumentId| -> Option<usize> {
            match final_lengths.get(&document) {
                Some(len) => *len,
                None => workspace.document(document).ok().map(|d| d.len_chars()),
            }
        };

        if let Some(rename) = self.rename.take() {
            match final_len(rename.file) {
                Some(len) if rename.symbol_range.fits(len) => {
                    commands.push(Command::StartRename(rename));
                }
                _ => tracing::debug!(file = %rename.file, "dropping rename outside final text"),
            }
        } else {
            if let Some(navigate) = self.navigate_command(&final_len) {
                commands.push(navigate);
            }
            commands.extend(self.highlight_commands(&final_len));
        }

        let command = Command::sequence(commands);
        tracing::debug!(steps = command.steps().count(), "mutation session finished");
        Ok(command)
    }

    fn navigate_command(&self, final_len: &dyn Fn(DocumentId) -> Option<usize>) -> Option<Command> {
        if !self.navigated || self.position == self.start {
            return None;
        }
        let file = self.position.file?;
        let len = final_len(file)?;
        let caret = self.position.caret;
        let selection = self.position.selection;
        if caret > len || selection.is_some_and(|s| !s.fits(len)) {
            tracing::debug!(
                file = %file,
                caret,
                len,
                "dropping navigation outside final text"
            );
            return None;
        }
        Some(Command::Navigate {
            file,
            caret,
            selection,
        })
    }

    fn highlight_commands(
        &self,
        final_len: &dyn Fn(DocumentId) -> Option<usize>,
    ) -> Vec<Command> {
        let mut by_file: BTreeMap<DocumentId, Vec<Highlight>> = BTreeMap::new();
        for (file, highlight) in &self.highlights {
            match final_len(*file) {
                Some(len) if highlight.range.fits(len) => {
                    by_file.entry(*file).or_default().push(*highlight);
                }
                _ => tracing::debug!(file = %file, range = %highlight.range, "dropping highlight"),
            }
        }
        by_file
            .into_iter()
            .map(|(file, highlights)| Command::Highlight { file, highlights })
            .collect()
    }

    fn directory(&mut self, directory: DirectoryId) -> Result<&mut DirectorySnapshot, SessionError> {
        if !self.workspace.contains_directory(directory) {
            return Err(WorkspaceError::UnknownDirectory(directory).into());
        }
        Ok(self.directories.entry(directory).or_default())
    }

    fn ensure_target(&self) -> Result<DocumentId, SessionError> {
        self.position.file.ok_or_else(|| {
            SessionError::InvalidState("no navigation target document".to_string())
        })
    }

    fn shift_anchors(&mut self, document: DocumentId, applied: &[AppliedEdit]) {
        for edit in applied {
            let shift = |offset| shift_offset(offset, edit.start, edit.old_len, edit.new_len);
            let shift_r = |range| shift_range(range, edit.start, edit.old_len, edit.new_len);

            if self.position.file == Some(document) {
                self.position.caret = shift(self.position.caret);
                self.position.selection = self.position.selection.map(shift_r);
            }
            for (file, highlight) in &mut self.highlights {
                if *file == document {
                    highlight.range = shift_r(highlight.range);
                }
            }
            if let Some(rename) = &mut self.rename
                && rename.file == document
            {
                rename.symbol_range = shift_r(rename.symbol_range);
                rename.name_range = shift_r(rename.name_range);
            }
        }
    }
}
