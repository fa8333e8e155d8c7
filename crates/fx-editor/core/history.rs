//! History management for undo/redo operations
//!
//! Entries are plain data: each one records the value at a path before and
//! after the edit, so applying and reverting are both single copy-on-write
//! writes. The history is a flat list with a cursor; everything at or past the
//! cursor is the redo buffer.

use crate::core::errors::Result;
use crate::core::path::EditorPath;
use crate::core::resolver::PathResolver;
use crate::core::value::Value;

/// Represents an operation that can be undone and redone
#[derive(Debug, Clone)]
pub enum Operation {
    /// The value at `path` went from `before` to `after`
    Replace {
        path: EditorPath,
        before: Value,
        after: Value,
    },
    /// Several entries applied as one step
    Batch(Vec<HistoryEntry>),
}

/// A single entry in the undo/redo history
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// The operation that was performed
    pub operation: Operation,

    /// Description of the operation
    pub description: String,
}

impl HistoryEntry {
    /// Entry replacing the value at `path`
    pub fn replace(
        path: EditorPath,
        before: Value,
        after: Value,
        description: impl Into<String>,
    ) -> Self {
        Self {
            operation: Operation::Replace {
                path,
                before,
                after,
            },
            description: description.into(),
        }
    }

    /// Entry grouping `entries` into one undo step
    pub fn batch(entries: Vec<Self>, description: impl Into<String>) -> Self {
        Self {
            operation: Operation::Batch(entries),
            description: description.into(),
        }
    }

    /// Document with this entry applied
    pub fn apply(&self, resolver: &mut PathResolver<'_>, document: &Value) -> Result<Value> {
        match &self.operation {
            Operation::Replace { path, after, .. } => Ok(resolver.write(document, path, after)?),
            Operation::Batch(entries) => entries
                .iter()
                .try_fold(document.clone(), |doc, entry| entry.apply(resolver, &doc)),
        }
    }

    /// Document with this entry reverted
    pub fn revert(&self, resolver: &mut PathResolver<'_>, document: &Value) -> Result<Value> {
        match &self.operation {
            Operation::Replace { path, before, .. } => Ok(resolver.write(document, path, before)?),
            Operation::Batch(entries) => entries
                .iter()
                .rev()
                .try_fold(document.clone(), |doc, entry| entry.revert(resolver, &doc)),
        }
    }

    /// Number of primitive replacements, counting through nested batches
    #[must_use]
    pub fn step_count(&self) -> usize {
        match &self.operation {
            Operation::Replace { .. } => 1,
            Operation::Batch(entries) => entries.iter().map(Self::step_count).sum(),
        }
    }
}

/// Linear undo/redo history with a cursor
///
/// `entries[..cursor]` have been applied to the current document and
/// `entries[cursor..]` can be redone. Recording a new entry discards the redo
/// part.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl History {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an applied entry, dropping anything that could still be redone
    pub fn record(&mut self, entry: HistoryEntry) {
        self.entries.truncate(self.cursor);
        self.entries.push(entry);
        self.cursor = self.entries.len();
    }

    /// Entry that the next undo reverts
    #[must_use]
    pub fn undo_entry(&self) -> Option<&HistoryEntry> {
        self.cursor.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Entry that the next redo applies
    #[must_use]
    pub fn redo_entry(&self) -> Option<&HistoryEntry> {
        self.entries.get(self.cursor)
    }

    /// Move the cursor back after a successful undo
    pub fn step_back(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move the cursor forward after a successful redo
    pub fn step_forward(&mut self) {
        self.cursor = (self.cursor + 1).min(self.entries.len());
    }

    /// Check if undo is available
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Check if redo is available
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor < self.entries.len()
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Get the number of undo entries available
    #[must_use]
    pub fn undo_count(&self) -> usize {
        self.cursor
    }

    /// Get the number of redo entries available
    #[must_use]
    pub fn redo_count(&self) -> usize {
        self.entries.len() - self.cursor
    }

    /// Get description of the next undo operation
    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.undo_entry().map(|entry| entry.description.as_str())
    }

    /// Get description of the next redo operation
    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.redo_entry().map(|entry| entry.description.as_str())
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }

    /// Get history statistics
    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            undo_count: self.undo_count(),
            redo_count: self.redo_count(),
            total_entries: self.len(),
        }
    }
}

/// Statistics about the history system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryStats {
    /// Number of operations that can be undone
    pub undo_count: usize,
    /// Number of operations that can be redone
    pub redo_count: usize,
    /// Entries held, applied or not
    pub total_entries: usize,
}
