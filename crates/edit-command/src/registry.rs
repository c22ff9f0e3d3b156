//! Parking space for suspended executions.

use crate::interactive::InteractiveExecution;
use crate::workspace::DocumentId;
use std::collections::BTreeMap;

/// Suspended executions, keyed by the document whose editor they belong to.
///
/// At most one execution is parked per document. Closing the document drops its execution.
#[derive(Debug, Default)]
pub struct ExecutionRegistry {
    executions: BTreeMap<DocumentId, InteractiveExecution>,
}

impl ExecutionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Park `execution` for `document`, returning the one it replaces.
    pub fn attach(
        &mut self,
        document: DocumentId,
        execution: InteractiveExecution,
    ) -> Option<InteractiveExecution> {
        let previous = self.executions.insert(document, execution);
        if previous.is_some() {
            tracing::debug!(document = %document, "replacing parked execution");
        }
        previous
    }

    /// The execution parked for `document`.
    pub fn get_mut(&mut self, document: DocumentId) -> Option<&mut InteractiveExecution> {
        self.executions.get_mut(&document)
    }

    /// Take the execution parked for `document` out of the registry.
    pub fn detach(&mut self, document: DocumentId) -> Option<InteractiveExecution> {
        self.executions.remove(&document)
    }

    /// Drop whatever is parked for a document that was closed.
    pub fn document_closed(&mut self, document: DocumentId) {
        if let Some(execution) = self.executions.remove(&document) {
            tracing::debug!(
                document = %document,
                state = ?execution.state(),
                "dropping execution of closed document"
            );
        }
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.executions.clear();
    }

    /// Number of parked executions.
    pub fn len(&self) -> usize {
        self.executions.len()
    }

    /// Returns `true` if nothing is parked.
    pub fn is_empty(&self) -> bool {
        self.executions.is_empty()
    }
}
