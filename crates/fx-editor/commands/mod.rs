//! Editor actions and their compilation into history entries
//!
//! An [`Action`] is what the UI dispatches. Mutating actions are compiled by
//! the [`Reducer`] against the current document into a [`HistoryEntry`]
//! (the reversible record) plus the resulting document. `Undo`, `Redo` and
//! `Open` act on the store itself and are never compiled.
//!
//! [`HistoryEntry`]: crate::core::history::HistoryEntry

pub mod alias;
pub mod reducer;

pub use alias::{AliasConfig, AliasKind};
pub use reducer::{Compiled, Reducer};

use crate::core::path::EditorPath;
use crate::core::value::Value;
use serde::{Deserialize, Serialize};

/// A request to change the editor state
///
/// Actions are serde-tagged by `type` so they can be sent straight from a
/// JSON front end.
///
/// # Examples
///
/// ```
/// use fx_editor::{editor_path, Action, Value};
///
/// let action: Action = serde_json::from_str(
///     r#"{"type": "edit", "path": ["effects", "a", 0], "value": false}"#,
/// ).unwrap();
/// assert_eq!(action, Action::edit(editor_path!["effects", "a", 0], Value::bool(false)));
/// assert_eq!(action.description(), "edit effects/a/0");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    /// Replace the value at `path`
    Edit { path: EditorPath, value: Value },

    /// Append `value` to the list at `path`
    Push { path: EditorPath, value: Value },

    /// Splice `values` into the list at `path` before `index`
    #[serde(rename = "insert")]
    InsertAt {
        path: EditorPath,
        index: usize,
        values: Vec<Value>,
    },

    /// Remove the map entry addressed by `path`
    Delete { path: EditorPath },

    /// Remove the list element at `index`
    #[serde(rename = "deleteIndex")]
    DeleteAt { path: EditorPath, index: usize },

    /// Remove the first list element deep-equal to `value`
    DeleteValue { path: EditorPath, value: Value },

    /// Rename an alias and rewrite every reference to it
    #[serde(rename = "rename", rename_all = "camelCase")]
    RenameAlias {
        kind: AliasKind,
        old_name: String,
        new_name: String,
    },

    /// Several actions recorded as one undo step
    Multi { actions: Vec<Action> },

    Undo,

    Redo,

    /// Replace the document and clear the history
    Open { document: Value },
}

impl Action {
    pub fn edit(path: impl Into<EditorPath>, value: impl Into<Value>) -> Self {
        Self::Edit {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn push(path: impl Into<EditorPath>, value: impl Into<Value>) -> Self {
        Self::Push {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn insert_at(path: impl Into<EditorPath>, index: usize, values: Vec<Value>) -> Self {
        Self::InsertAt {
            path: path.into(),
            index,
            values,
        }
    }

    pub fn delete(path: impl Into<EditorPath>) -> Self {
        Self::Delete { path: path.into() }
    }

    pub fn delete_at(path: impl Into<EditorPath>, index: usize) -> Self {
        Self::DeleteAt {
            path: path.into(),
            index,
        }
    }

    pub fn delete_value(path: impl Into<EditorPath>, value: impl Into<Value>) -> Self {
        Self::DeleteValue {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn rename_alias(
        kind: AliasKind,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::RenameAlias {
            kind,
            old_name: old_name.into(),
            new_name: new_name.into(),
        }
    }

    #[must_use]
    pub fn multi(actions: Vec<Self>) -> Self {
        Self::Multi { actions }
    }

    pub fn open(document: impl Into<Value>) -> Self {
        Self::Open {
            document: document.into(),
        }
    }

    /// Human-readable summary, used for history entries and logs
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Edit { path, .. } => format!("edit {path}"),
            Self::Push { path, .. } => format!("push onto {path}"),
            Self::InsertAt { path, index, values } => {
                format!("insert {} at {path}[{index}]", values.len())
            }
            Self::Delete { path } => format!("delete {path}"),
            Self::DeleteAt { path, index } => format!("delete {path}[{index}]"),
            Self::DeleteValue { path, .. } => format!("delete value from {path}"),
            Self::RenameAlias {
                kind,
                old_name,
                new_name,
            } => format!("rename {kind} '{old_name}' to '{new_name}'"),
            Self::Multi { actions } => match actions.as_slice() {
                [single] => single.description(),
                _ => format!("{} changes", actions.len()),
            },
            Self::Undo => "undo".to_string(),
            Self::Redo => "redo".to_string(),
            Self::Open { .. } => "open document".to_string(),
        }
    }

    /// Whether the action edits the document and is recorded in history
    #[must_use]
    pub const fn is_mutating(&self) -> bool {
        !matches!(self, Self::Undo | Self::Redo | Self::Open { .. })
    }
}
