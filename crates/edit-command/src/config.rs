//! Session and executor settings.
//!
//! Both structs deserialize from JSON; missing fields take their defaults, so an empty object
//! (`{}`) is a valid configuration.

use serde::{Deserialize, Serialize};

fn default_coalesce_gap() -> usize {
    1
}

fn default_stale_document_message() -> String {
    "The document was modified since the command was computed. Nothing was changed.".to_string()
}

fn default_cancelled_conflicts_message() -> String {
    "Cancelled.".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Settings for a [`crate::MutationSession`].
pub struct SessionConfig {
    #[serde(default = "default_coalesce_gap")]
    /// Edits separated by at most this many unchanged characters share one fragment.
    pub coalesce_gap: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            coalesce_gap: default_coalesce_gap(),
        }
    }
}

impl SessionConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Settings for the executors.
pub struct ExecutorConfig {
    #[serde(default = "default_stale_document_message")]
    /// Shown by the interactive executor when a text update no longer matches the document.
    pub stale_document_message: String,

    #[serde(default = "default_cancelled_conflicts_message")]
    /// Logged when the user declines to proceed past a conflict dialog.
    pub cancelled_conflicts_message: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            stale_document_message: default_stale_document_message(),
            cancelled_conflicts_message: default_cancelled_conflicts_message(),
        }
    }
}

impl ExecutorConfig {
    /// Parse from JSON.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
