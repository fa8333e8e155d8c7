//! Error types for the fx-editor crate
//!
//! Provides the main `EditorError` enum plus `PathResolutionError` for
//! failures while walking an `EditorPath`. Follows the usual philosophy:
//! - Use thiserror for structured error handling (no anyhow)
//! - Provide enough context (depth, names, indices) for debugging
//! - Every error is detected before the store commits anything

use crate::commands::alias::AliasKind;
use crate::core::path::StableKey;
use crate::core::value::NodeKind;
use core::fmt;
use thiserror::Error;

/// Failure to resolve a path against a document
///
/// `depth` is the index of the path segment that could not be applied.
/// These are internal-consistency errors: the UI is expected to build paths
/// from the current document only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathResolutionError {
    /// The path continues past a scalar value
    #[error("cannot descend into {kind} value at depth {depth}")]
    ScalarDescent { kind: NodeKind, depth: usize },

    /// A field segment was applied to a list
    #[error("field '{field}' applied to a list at depth {depth}")]
    FieldOnList { field: String, depth: usize },

    /// An index or stable reference was applied to a map
    #[error("list position applied to a map at depth {depth}")]
    PositionOnMap { depth: usize },

    /// A field segment names an absent map entry
    #[error("missing field '{field}' at depth {depth}")]
    MissingField { field: String, depth: usize },

    /// Index outside the list bounds
    #[error("index {index} out of bounds (length {len}) at depth {depth}")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        depth: usize,
    },

    /// Stable key not registered for the list
    #[error("unknown stable key {key} at depth {depth}")]
    UnknownStableKey { key: StableKey, depth: usize },

    /// The addressed value has the wrong kind for the operation
    #[error("expected {expected} at depth {depth}, found {found}")]
    UnexpectedKind {
        expected: NodeKind,
        found: NodeKind,
        depth: usize,
    },
}

impl PathResolutionError {
    /// Index of the segment that failed
    #[must_use]
    pub const fn depth(&self) -> usize {
        match self {
            Self::ScalarDescent { depth, .. }
            | Self::FieldOnList { depth, .. }
            | Self::PositionOnMap { depth }
            | Self::MissingField { depth, .. }
            | Self::IndexOutOfBounds { depth, .. }
            | Self::UnknownStableKey { depth, .. }
            | Self::UnexpectedKind { depth, .. } => *depth,
        }
    }
}

/// Main error type for fx-editor operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// Path could not be resolved against the current document
    #[error(transparent)]
    Path(#[from] PathResolutionError),

    /// Alias rename target already exists
    #[error("{kind} alias '{name}' already exists")]
    RenameCollision { kind: AliasKind, name: String },

    /// Alias rename source does not exist
    #[error("{kind} alias '{name}' not found")]
    AliasNotFound { kind: AliasKind, name: String },

    /// The alias table is absent or is not a map
    #[error("alias table '{field}' is missing or not a map")]
    AliasTableMissing { field: String },

    /// No list element matched the value to delete
    #[error("value not found in list at {path}")]
    ValueNotFound { path: String },

    /// Action cannot be executed in this context
    #[error("Invalid action: {message}")]
    InvalidAction { message: String },

    /// Too many subscribers on the event channel
    #[error("Handler limit reached: {limit}")]
    HandlerLimit { limit: usize },

    /// A subscriber reported a failure
    #[error("Event handler failed: {message}")]
    EventHandlerFailed { message: String },
}

impl EditorError {
    /// Create a new invalid action error
    pub fn invalid_action<T: fmt::Display>(message: T) -> Self {
        Self::InvalidAction {
            message: message.to_string(),
        }
    }

    /// Create a new event handler error
    pub fn handler_failed<T: fmt::Display>(message: T) -> Self {
        Self::EventHandlerFailed {
            message: message.to_string(),
        }
    }

    /// Check if this is a path resolution error
    #[must_use]
    pub const fn is_path_error(&self) -> bool {
        matches!(self, Self::Path(_))
    }

    /// Check if this is an alias validation error
    #[must_use]
    pub const fn is_alias_error(&self) -> bool {
        matches!(
            self,
            Self::RenameCollision { .. }
                | Self::AliasNotFound { .. }
                | Self::AliasTableMissing { .. }
        )
    }

    /// Get the underlying path error if this wraps one
    #[must_use]
    pub const fn as_path_error(&self) -> Option<&PathResolutionError> {
        match self {
            Self::Path(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for editor operations
pub type Result<T> = core::result::Result<T, EditorError>;
