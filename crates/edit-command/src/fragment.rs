//! Edit fragments: a minimal diff between a snapshot's original and final text.
//!
//! A [`FragmentTracker`] observes every atomic replacement made to a snapshot and folds it
//! into an ordered list of non-overlapping [`Fragment`]s. Replaying that list against the
//! original text yields exactly the final text of the snapshot, no matter how many edits
//! were made or in which order.
//!
//! Fragment offsets are expressed in the coordinates of the **updated** text. The position
//! of a fragment in the original text is its offset minus the summed length deltas of every
//! fragment before it; [`replay`] performs that mapping.

use crate::text::{TextRange, char_len, char_slice};
use serde::{Deserialize, Serialize};

/// One replaced span: `old_len` original characters became `new_len` characters at `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Start offset in the updated text.
    pub offset: usize,
    /// Length of the replaced span in the original text.
    pub old_len: usize,
    /// Length of the replacement in the updated text.
    pub new_len: usize,
}

impl Fragment {
    /// Create a fragment.
    pub fn new(offset: usize, old_len: usize, new_len: usize) -> Self {
        Self {
            offset,
            old_len,
            new_len,
        }
    }

    /// Exclusive end offset in the updated text.
    pub fn end(&self) -> usize {
        self.offset + self.new_len
    }

    /// `new_len - old_len`.
    pub fn delta(&self) -> isize {
        self.new_len as isize - self.old_len as isize
    }
}

/// Accumulates atomic edits into a sorted, non-overlapping fragment list.
#[derive(Debug, Clone, Default)]
pub struct FragmentTracker {
    fragments: Vec<Fragment>,
    coalesce_gap: usize,
}

impl FragmentTracker {
    /// Create a tracker. Edits separated from an existing fragment by at most `coalesce_gap`
    /// unchanged characters are merged into it.
    pub fn new(coalesce_gap: usize) -> Self {
        Self {
            fragments: Vec::new(),
            coalesce_gap,
        }
    }

    /// Record the replacement of `old_len` characters at `offset` by `new_len` characters.
    ///
    /// `offset` is in the coordinates of the text *before* this edit.
    pub fn record(&mut self, offset: usize, old_len: usize, new_len: usize) {
        if old_len == 0 && new_len == 0 {
            return;
        }

        let end = offset + old_len;
        let gap = self.coalesce_gap;

        let mut result = Vec::with_capacity(self.fragments.len() + 1);
        let mut after = Vec::new();
        let mut union_start = offset;
        let mut union_end = end;
        let mut covered_new = 0usize;
        let mut covered_old = 0usize;
        let mut merged = 0usize;

        for fragment in self.fragments.drain(..) {
            if fragment.end() + gap < offset {
                result.push(fragment);
            } else if fragment.offset > end + gap {
                // Strictly after the edit end, so `offset > old_len` and this cannot underflow.
                after.push(Fragment {
                    offset: fragment.offset + new_len - old_len,
                    ..fragment
                });
            } else {
                union_start = union_start.min(fragment.offset);
                union_end = union_end.max(fragment.end());
                covered_new += fragment.new_len;
                covered_old += fragment.old_len;
                merged += 1;
            }
        }

        // Characters of the union not covered by a merged fragment are untouched originals.
        let span = union_end - union_start;
        let run = Fragment {
            offset: union_start,
            old_len: span - covered_new + covered_old,
            new_len: span - old_len + new_len,
        };

        if merged > 0 {
            tracing::trace!(
                offset,
                old_len,
                new_len,
                merged,
                "merged edit into existing fragments"
            );
        }

        if run.old_len != 0 || run.new_len != 0 {
            result.push(run);
        }
        result.extend(after);
        self.fragments = result;
    }

    /// The current fragment list.
    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Returns `true` if no net change has been recorded.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Consume the tracker, returning its fragments.
    pub fn into_fragments(self) -> Vec<Fragment> {
        self.fragments
    }
}

/// A single replacement expressed against the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Span in the original text.
    pub range: TextRange,
    /// Text to put there.
    pub text: String,
}

/// Resolve `fragments` into replacements against `original`, in **descending** offset order.
///
/// Applying the result in order never invalidates the offsets of the replacements still to
/// come, so callers can feed them straight into a live document.
pub fn replay(updated: &str, fragments: &[Fragment]) -> Vec<Replacement> {
    let mut out = Vec::with_capacity(fragments.len());
    let mut shift: isize = 0;
    for fragment in fragments {
        let old_start = (fragment.offset as isize - shift).max(0) as usize;
        out.push(Replacement {
            range: TextRange::new(old_start, old_start.saturating_add(fragment.old_len)),
            text: char_slice(updated, fragment.offset, fragment.end()).to_string(),
        });
        shift += fragment.delta();
    }
    out.reverse();
    out
}

/// Apply `fragments` to `original`, producing the updated text.
pub fn apply(original: &str, updated: &str, fragments: &[Fragment]) -> String {
    let mut chars: Vec<char> = original.chars().collect();
    for replacement in replay(updated, fragments) {
        let start = replacement.range.start.min(chars.len());
        let end = replacement.range.end.min(chars.len());
        chars.splice(start..end, replacement.text.chars());
    }
    chars.into_iter().collect()
}

/// Compute a single-fragment diff from the common prefix and suffix of two texts.
pub fn diff(original: &str, updated: &str) -> Vec<Fragment> {
    if original == updated {
        return Vec::new();
    }

    let prefix = original
        .chars()
        .zip(updated.chars())
        .take_while(|(a, b)| a == b)
        .count();
    let old_total = char_len(original);
    let new_total = char_len(updated);
    let max_suffix = old_total.min(new_total) - prefix;
    let suffix = original
        .chars()
        .rev()
        .zip(updated.chars().rev())
        .take(max_suffix)
        .take_while(|(a, b)| a == b)
        .count();

    vec![Fragment::new(
        prefix,
        old_total - prefix - suffix,
        new_total - prefix - suffix,
    )]
}
