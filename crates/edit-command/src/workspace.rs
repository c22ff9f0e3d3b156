//! The live model: open documents, directories, carets and options.
//!
//! A [`Workspace`] is what a transformation reads from (through a shared borrow held by a
//! [`crate::MutationSession`]) and what the executors mutate when a [`crate::Command`] is
//! applied. Documents and directories are addressed by stable ids, never by references, so a
//! command built against the workspace can outlive any borrow of it.

use crate::document::Document;
use crate::error::WorkspaceError;
use crate::text::TextRange;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Opaque identifier for a document in a [`Workspace`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DocumentId(u64);

impl DocumentId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Opaque identifier for a directory in a [`Workspace`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct DirectoryId(u64);

impl DirectoryId {
    /// Get the underlying numeric id.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dir#{}", self.0)
    }
}

/// Value of a workspace option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// A flag.
    Bool(bool),
    /// An integer setting.
    Int(i64),
    /// A free-form setting.
    Text(String),
}

struct DocumentEntry {
    name: String,
    parent: DirectoryId,
    document: Document,
    version: u64,
    caret: usize,
    selection: Option<TextRange>,
}

struct DirectoryEntry {
    name: String,
    parent: Option<DirectoryId>,
}

/// A collection of documents arranged in directories.
pub struct Workspace {
    root_path: PathBuf,
    next_document_id: u64,
    next_directory_id: u64,
    documents: BTreeMap<DocumentId, DocumentEntry>,
    directories: BTreeMap<DirectoryId, DirectoryEntry>,
    options: BTreeMap<String, OptionValue>,
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workspace")
            .field("root_path", &self.root_path)
            .field("document_count", &self.documents.len())
            .field("directory_count", &self.directories.len())
            .field("option_count", &self.options.len())
            .finish()
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new()
    }
}

impl Workspace {
    /// Create an empty workspace rooted at `/`.
    pub fn new() -> Self {
        Self::with_root("/")
    }

    /// Create an empty workspace whose root directory maps to `root_path`.
    pub fn with_root(root_path: impl Into<PathBuf>) -> Self {
        let mut directories = BTreeMap::new();
        directories.insert(
            DirectoryId(0),
            DirectoryEntry {
                name: String::new(),
                parent: None,
            },
        );
        Self {
            root_path: root_path.into(),
            next_document_id: 0,
            next_directory_id: 1,
            documents: BTreeMap::new(),
            directories,
            options: BTreeMap::new(),
        }
    }

    /// The root directory.
    pub fn root(&self) -> DirectoryId {
        DirectoryId(0)
    }

    /// Number of open documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if no documents are open.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Create a sub-directory.
    pub fn create_directory(
        &mut self,
        parent: DirectoryId,
        name: impl Into<String>,
    ) -> Result<DirectoryId, WorkspaceError> {
        let name = name.into();
        self.ensure_free_name(parent, &name)?;

        let id = DirectoryId(self.next_directory_id);
        self.next_directory_id = self.next_directory_id.saturating_add(1);
        self.directories.insert(
            id,
            DirectoryEntry {
                name,
                parent: Some(parent),
            },
        );
        Ok(id)
    }

    /// Open (create) a document named `name` inside `parent`.
    pub fn open_document(
        &mut self,
        parent: DirectoryId,
        name: impl Into<String>,
        text: &str,
    ) -> Result<DocumentId, WorkspaceError> {
        let name = name.into();
        self.ensure_free_name(parent, &name)?;

        let id = DocumentId(self.next_document_id);
        self.next_document_id = self.next_document_id.saturating_add(1);
        self.documents.insert(
            id,
            DocumentEntry {
                name,
                parent,
                document: Document::new(text),
                version: 0,
                caret: 0,
                selection: None,
            },
        );
        Ok(id)
    }

    /// Remove a document from the workspace.
    pub fn delete_document(&mut self, id: DocumentId) -> Result<(), WorkspaceError> {
        self.documents
            .remove(&id)
            .map(|_| ())
            .ok_or(WorkspaceError::UnknownDocument(id))
    }

    /// Move a document into another directory, keeping its name.
    pub fn move_document(
        &mut self,
        id: DocumentId,
        target: DirectoryId,
    ) -> Result<(), WorkspaceError> {
        let name = self.entry(id)?.name.clone();
        if self.entry(id)?.parent == target {
            return Ok(());
        }
        self.ensure_free_name(target, &name)?;
        self.entry_mut(id)?.parent = target;
        Ok(())
    }

    /// Returns `true` if the document is open.
    pub fn contains_document(&self, id: DocumentId) -> bool {
        self.documents.contains_key(&id)
    }

    /// Returns `true` if the directory exists.
    pub fn contains_directory(&self, id: DirectoryId) -> bool {
        self.directories.contains_key(&id)
    }

    /// Borrow a document.
    pub fn document(&self, id: DocumentId) -> Result<&Document, WorkspaceError> {
        self.entry(id).map(|e| &e.document)
    }

    /// Full text of a document.
    pub fn document_text(&self, id: DocumentId) -> Result<String, WorkspaceError> {
        self.entry(id).map(|e| e.document.text())
    }

    /// Edit version of a document (incremented by every replace).
    pub fn version(&self, id: DocumentId) -> Result<u64, WorkspaceError> {
        self.entry(id).map(|e| e.version)
    }

    /// Name of a document.
    pub fn document_name(&self, id: DocumentId) -> Result<&str, WorkspaceError> {
        self.entry(id).map(|e| e.name.as_str())
    }

    /// Parent directory of a document.
    pub fn document_parent(&self, id: DocumentId) -> Result<DirectoryId, WorkspaceError> {
        self.entry(id).map(|e| e.parent)
    }

    /// Find a document by name within a directory.
    pub fn find_document(&self, directory: DirectoryId, name: &str) -> Option<DocumentId> {
        self.documents
            .iter()
            .find(|(_, e)| e.parent == directory && e.name == name)
            .map(|(id, _)| *id)
    }

    /// Names of all direct children (documents and directories) of `directory`, sorted.
    pub fn child_names(&self, directory: DirectoryId) -> Result<Vec<String>, WorkspaceError> {
        if !self.directories.contains_key(&directory) {
            return Err(WorkspaceError::UnknownDirectory(directory));
        }
        let mut names: Vec<String> = self
            .documents
            .values()
            .filter(|e| e.parent == directory)
            .map(|e| e.name.clone())
            .chain(
                self.directories
                    .values()
                    .filter(|d| d.parent == Some(directory))
                    .map(|d| d.name.clone()),
            )
            .collect();
        names.sort();
        Ok(names)
    }

    /// Filesystem-style path of a directory.
    pub fn directory_path(&self, id: DirectoryId) -> Result<PathBuf, WorkspaceError> {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(dir) = current {
            let entry = self
                .directories
                .get(&dir)
                .ok_or(WorkspaceError::UnknownDirectory(dir))?;
            if entry.parent.is_some() {
                segments.push(entry.name.as_str());
            }
            current = entry.parent;
        }

        let mut path = self.root_path.clone();
        for segment in segments.iter().rev() {
            path.push(segment);
        }
        Ok(path)
    }

    /// Filesystem-style path of a document.
    pub fn document_path(&self, id: DocumentId) -> Result<PathBuf, WorkspaceError> {
        let entry = self.entry(id)?;
        Ok(self.directory_path(entry.parent)?.join(&entry.name))
    }

    /// Root path the workspace is mapped to.
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    /// Replace `range` in a document with `text`.
    pub fn replace(
        &mut self,
        id: DocumentId,
        range: TextRange,
        text: &str,
    ) -> Result<(), WorkspaceError> {
        let entry = self.entry_mut(id)?;
        entry
            .document
            .replace(range, text)
            .map_err(|source| WorkspaceError::RangeOutOfBounds {
                document: id,
                source,
            })?;
        entry.version = entry.version.saturating_add(1);

        let len = entry.document.len_chars();
        entry.caret = entry.caret.min(len);
        if entry.selection.is_some_and(|s| !s.fits(len)) {
            entry.selection = None;
        }
        Ok(())
    }

    /// Caret offset of the live editor for a document.
    pub fn caret(&self, id: DocumentId) -> Result<usize, WorkspaceError> {
        self.entry(id).map(|e| e.caret)
    }

    /// Selection of the live editor for a document.
    pub fn selection(&self, id: DocumentId) -> Result<Option<TextRange>, WorkspaceError> {
        self.entry(id).map(|e| e.selection)
    }

    /// Move the live caret (and optionally set a selection).
    pub fn set_caret(
        &mut self,
        id: DocumentId,
        caret: usize,
        selection: Option<TextRange>,
    ) -> Result<(), WorkspaceError> {
        let entry = self.entry_mut(id)?;
        let len = entry.document.len_chars();
        let out_of_bounds = |range: TextRange| WorkspaceError::RangeOutOfBounds {
            document: id,
            source: crate::error::RangeOutOfBounds { range, len },
        };
        if caret > len {
            return Err(out_of_bounds(TextRange::empty(caret)));
        }
        if let Some(selection) = selection
            && !selection.fits(len)
        {
            return Err(out_of_bounds(selection));
        }
        entry.caret = caret;
        entry.selection = selection;
        Ok(())
    }

    /// Read an option.
    pub fn option(&self, name: &str) -> Option<&OptionValue> {
        self.options.get(name)
    }

    /// Set an option, returning the previous value.
    pub fn set_option(&mut self, name: impl Into<String>, value: OptionValue) -> Option<OptionValue> {
        self.options.insert(name.into(), value)
    }

    fn entry(&self, id: DocumentId) -> Result<&DocumentEntry, WorkspaceError> {
        self.documents
            .get(&id)
            .ok_or(WorkspaceError::UnknownDocument(id))
    }

    fn entry_mut(&mut self, id: DocumentId) -> Result<&mut DocumentEntry, WorkspaceError> {
        self.documents
            .get_mut(&id)
            .ok_or(WorkspaceError::UnknownDocument(id))
    }

    fn ensure_free_name(&self, directory: DirectoryId, name: &str) -> Result<(), WorkspaceError> {
        if self.child_names(directory)?.iter().any(|n| n == name) {
            return Err(WorkspaceError::NameTaken {
                directory,
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
