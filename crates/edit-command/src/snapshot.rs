//! Private, writable copies of live documents and directories.
//!
//! A [`SnapshotTracker`] owns a copy of one live document. Every replacement made to the copy
//! is folded into a [`FragmentTracker`], so when the session ends the tracker can describe
//! the whole change as a minimal [`Command::UpdateText`] against the original text.
//!
//! Structural edits (replacing a [`WritableElement`]) are queued rather than applied, because
//! element ranges are only meaningful against the unmodified copy. They are reconciled into
//! the text in one pass, in descending offset order, before anything else reads or writes
//! the copy.

use crate::command::{Command, FutureFile};
use crate::document::Document;
use crate::error::SessionError;
use crate::fragment::FragmentTracker;
use crate::text::{TextRange, char_len};
use crate::workspace::{DirectoryId, DocumentId};

/// A range of a live document that a transformation wants to edit structurally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Element {
    /// Owning document.
    pub document: DocumentId,
    /// Range of the element in the live text.
    pub range: TextRange,
}

impl Element {
    /// Create an element reference.
    pub fn new(document: DocumentId, range: TextRange) -> Self {
        Self { document, range }
    }
}

/// The copy-side counterpart of an [`Element`], valid until the copy is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritableElement {
    document: DocumentId,
    range: TextRange,
}

impl WritableElement {
    /// Owning document.
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Range inside the copy.
    pub fn range(&self) -> TextRange {
        self.range
    }
}

/// One replacement applied to a copy, in the coordinates of the text before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct AppliedEdit {
    pub start: usize,
    pub old_len: usize,
    pub new_len: usize,
}

/// Tracks all edits made to the private copy of one document.
#[derive(Debug)]
pub struct SnapshotTracker {
    document: DocumentId,
    original: String,
    copy: Document,
    fragments: FragmentTracker,
    pending: Vec<(TextRange, String)>,
    deleted: bool,
    edits: u64,
}

impl SnapshotTracker {
    /// Take a snapshot of `live`.
    pub fn new(document: DocumentId, live: &Document, coalesce_gap: usize) -> Self {
        Self {
            document,
            original: live.text(),
            copy: live.copy(),
            fragments: FragmentTracker::new(coalesce_gap),
            pending: Vec::new(),
            deleted: false,
            edits: 0,
        }
    }

    /// The tracked document.
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Text of the live document at snapshot time.
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Returns `true` once the copy has been mutated directly.
    pub fn is_mutated(&self) -> bool {
        self.edits > 0
    }

    /// Returns `true` if the document was deleted in this session.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Length of the copy in characters (pending element edits not included).
    pub fn len_chars(&self) -> usize {
        self.copy.len_chars()
    }

    /// Recorded fragments so far.
    pub fn fragments(&self) -> &FragmentTracker {
        &self.fragments
    }

    /// Current text of the copy. Pending element edits are reconciled first.
    pub(crate) fn text(&mut self) -> Result<(String, Vec<AppliedEdit>), SessionError> {
        let applied = self.commit_pending()?;
        Ok((self.copy.text(), applied))
    }

    /// Offset of the last `ch` before `before` in the copy.
    pub(crate) fn rfind_char(&self, before: usize, ch: char) -> Option<usize> {
        self.copy.rfind_char(before, ch)
    }

    /// Hand out the copy-side counterpart of `range`.
    ///
    /// Fails once the copy has been mutated: element positions are only stable against the
    /// unmodified text.
    pub fn writable_element(&self, range: TextRange) -> Result<WritableElement, SessionError> {
        self.ensure_alive()?;
        if self.is_mutated() {
            return Err(SessionError::InvalidState(format!(
                "cannot take a writable element of {} after its copy was edited",
                self.document
            )));
        }
        self.check(range)?;
        Ok(WritableElement {
            document: self.document,
            range,
        })
    }

    /// Queue a structural replacement of `element`.
    pub fn replace_element(
        &mut self,
        element: &WritableElement,
        text: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.ensure_alive()?;
        if element.document != self.document {
            return Err(SessionError::InvalidState(format!(
                "element of {} used with the snapshot of {}",
                element.document, self.document
            )));
        }
        if self.is_mutated() {
            return Err(SessionError::InvalidState(format!(
                "element {} of {} is stale: the copy was edited",
                element.range, self.document
            )));
        }
        self.pending.push((element.range, text.into()));
        Ok(())
    }

    /// Apply queued element edits, highest offset first.
    pub(crate) fn commit_pending(&mut self) -> Result<Vec<AppliedEdit>, SessionError> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        // Rejected edits stay queued, so every later read or edit reports them again.
        self.pending
            .sort_by(|a, b| b.0.start.cmp(&a.0.start).then(b.0.end.cmp(&a.0.end)));
        for pair in self.pending.windows(2) {
            let (later, earlier) = (pair[0].0, pair[1].0);
            if earlier.end > later.start || earlier == later {
                return Err(SessionError::OverlappingElementEdits(later));
            }
        }
        let pending = std::mem::take(&mut self.pending);

        tracing::debug!(
            document = %self.document,
            count = pending.len(),
            "reconciling element edits"
        );
        let mut applied = Vec::with_capacity(pending.len());
        for (range, text) in pending {
            applied.push(self.apply(range, &text)?);
        }
        Ok(applied)
    }

    /// Replace `range` of the copy with `text`.
    ///
    /// Returns every edit that reached the copy, reconciled element edits included, in
    /// application order.
    pub(crate) fn replace(
        &mut self,
        range: TextRange,
        text: &str,
    ) -> Result<Vec<AppliedEdit>, SessionError> {
        self.ensure_alive()?;
        let mut applied = self.commit_pending()?;
        applied.push(self.apply(range, text)?);
        Ok(applied)
    }

    /// Mark the document as deleted. Later edits fail with [`SessionError::DocumentDeleted`].
    pub(crate) fn mark_deleted(&mut self) {
        self.deleted = true;
        self.pending.clear();
    }

    /// Fold the snapshot into a command.
    pub fn finish(mut self) -> Result<Command, SessionError> {
        if self.deleted {
            return Ok(Command::DeleteFile {
                file: self.document,
            });
        }

        self.commit_pending()?;
        let updated = self.copy.text();
        if updated == self.original {
            tracing::trace!(document = %self.document, "snapshot unchanged");
            return Ok(Command::Nothing);
        }

        let fragments = self.fragments.into_fragments();
        tracing::debug!(
            document = %self.document,
            edits = self.edits,
            fragments = fragments.len(),
            "snapshot finished"
        );
        Ok(Command::UpdateText {
            file: self.document,
            original: self.original,
            updated,
            fragments: Some(fragments),
        })
    }

    fn apply(&mut self, range: TextRange, text: &str) -> Result<AppliedEdit, SessionError> {
        self.copy
            .replace(range, text)
            .map_err(|source| SessionError::RangeOutOfBounds {
                document: self.document,
                source,
            })?;
        let edit = AppliedEdit {
            start: range.start,
            old_len: range.len(),
            new_len: char_len(text),
        };
        self.fragments.record(edit.start, edit.old_len, edit.new_len);
        self.edits += 1;
        Ok(edit)
    }

    fn check(&self, range: TextRange) -> Result<(), SessionError> {
        let len = self.copy.len_chars();
        if range.fits(len) {
            Ok(())
        } else {
            Err(SessionError::RangeOutOfBounds {
                document: self.document,
                source: crate::error::RangeOutOfBounds { range, len },
            })
        }
    }

    fn ensure_alive(&self) -> Result<(), SessionError> {
        if self.deleted {
            Err(SessionError::DocumentDeleted(self.document))
        } else {
            Ok(())
        }
    }
}

/// A virtual overlay on a live directory: files created in this session.
#[derive(Debug, Clone, Default)]
pub struct DirectorySnapshot {
    created: Vec<(String, String)>,
}

impl DirectorySnapshot {
    /// Returns `true` if a file with this name was created in the overlay.
    pub fn contains(&self, name: &str) -> bool {
        self.created.iter().any(|(n, _)| n == name)
    }

    /// Add a virtual file. The caller checks for name clashes with live children.
    pub(crate) fn create_file(&mut self, name: String, text: String) {
        self.created.push((name, text));
    }

    /// Names of the virtual files, in creation order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.created.iter().map(|(n, _)| n.as_str())
    }

    pub(crate) fn into_commands(self, parent: DirectoryId) -> impl Iterator<Item = Command> {
        self.created.into_iter().map(move |(name, text)| Command::CreateFile {
            file: FutureFile { parent, name },
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fragment::Fragment;
    use crate::workspace::Workspace;

    fn tracker(text: &str) -> SnapshotTracker {
        let mut ws = Workspace::new();
        let doc = ws.open_document(ws.root(), "a.txt", text).unwrap();
        SnapshotTracker::new(doc, ws.document(doc).unwrap(), 1)
    }

    #[test]
    fn test_unchanged_snapshot_is_nothing() {
        let mut snapshot = tracker("abc");
        snapshot.replace(TextRange::new(0, 1), "a").unwrap();
        assert_eq!(snapshot.finish().unwrap(), Command::Nothing);
    }

    #[test]
    fn test_round_trip_single_run() {
        let mut snapshot = tracker("abc");
        snapshot.replace(TextRange::new(0, 1), "X").unwrap();
        snapshot.replace(TextRange::new(2, 3), "YZ").unwrap();

        match snapshot.finish().unwrap() {
            Command::UpdateText {
                original,
                updated,
                fragments,
                ..
            } => {
                assert_eq!(original, "abc");
                assert_eq!(updated, "XbYZ");
                assert_eq!(fragments, Some(vec![Fragment::new(0, 3, 4)]));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_writable_element_after_edit_fails() {
        let mut snapshot = tracker("let x = 1;");
        let element = snapshot.writable_element(TextRange::new(4, 5)).unwrap();
        snapshot.replace(TextRange::new(8, 9), "2").unwrap();

        assert!(matches!(
            snapshot.writable_element(TextRange::new(4, 5)),
            Err(SessionError::InvalidState(_))
        ));
        assert!(matches!(
            snapshot.replace_element(&element, "y"),
            Err(SessionError::InvalidState(_))
        ));
    }

    #[test]
    fn test_element_edits_reconcile_descending() {
        let mut snapshot = tracker("foo(bar)");
        let callee = snapshot.writable_element(TextRange::new(0, 3)).unwrap();
        let arg = snapshot.writable_element(TextRange::new(4, 7)).unwrap();
        snapshot.replace_element(&callee, "quux").unwrap();
        snapshot.replace_element(&arg, "b").unwrap();

        let (text, applied) = snapshot.text().unwrap();
        assert_eq!(text, "quux(b)");
        assert_eq!(applied[0].start, 4);
        assert_eq!(applied[1].start, 0);
    }

    #[test]
    fn test_overlapping_element_edits_rejected() {
        let mut snapshot = tracker("abcdef");
        let a = snapshot.writable_element(TextRange::new(0, 4)).unwrap();
        let b = snapshot.writable_element(TextRange::new(2, 6)).unwrap();
        snapshot.replace_element(&a, "x").unwrap();
        snapshot.replace_element(&b, "y").unwrap();

        assert!(matches!(
            snapshot.finish(),
            Err(SessionError::OverlappingElementEdits(_))
        ));
    }

    #[test]
    fn test_deleted_snapshot() {
        let mut snapshot = tracker("abc");
        let doc = snapshot.document();
        snapshot.mark_deleted();
        assert!(matches!(
            snapshot.replace(TextRange::new(0, 1), "x"),
            Err(SessionError::DocumentDeleted(_))
        ));
        assert_eq!(snapshot.finish().unwrap(), Command::DeleteFile { file: doc });
    }
}
