//! Document-editing core for effect and filter graphs
//!
//! `fx-editor` keeps a JSON-like document of effects and filters as an
//! immutable, structurally shared tree and edits it through serializable
//! actions with linear undo/redo.
//!
//! # Features
//!
//! - **Structural sharing**: an edit rebuilds only the ancestors of the target;
//!   every other subtree is reused by reference
//! - **Symbolic paths**: `EditorPath` addresses values by field, index or
//!   stable list-element key
//! - **Undo/redo**: every mutating action compiles into a reversible entry;
//!   `Multi` groups several actions into one step
//! - **Alias renames**: renaming an effect or filter rewrites every reference
//!   to it in the same step
//! - **Subscriptions**: handlers are notified synchronously after each
//!   committed change
//!
//! # Example
//!
//! ```
//! use fx_editor::{editor_path, Action, AliasKind, EditorStore, Value};
//! use serde_json::json;
//!
//! let mut store = EditorStore::new(Value::from(json!({
//!     "effects": {"glow": [true, "Glow", [{"$filter": "grain"}], []]},
//!     "filters": {"grain": [true, "noise", []]}
//! })));
//!
//! store.dispatch(Action::multi(vec![
//!     Action::edit(editor_path!["effects", "glow", 0], false),
//!     Action::rename_alias(AliasKind::Filter, "grain", "film"),
//! ])).unwrap();
//!
//! let doc = store.state().document.to_json();
//! assert_eq!(doc["effects"]["glow"][2][0], json!({"$filter": "film"}));
//!
//! // One undo reverts both changes
//! store.dispatch(Action::Undo).unwrap();
//! assert_eq!(store.state().document.to_json()["filters"], json!({"grain": [true, "noise", []]}));
//! ```

pub mod commands;
pub mod core;
pub mod events;

// Public API exports
pub use crate::commands::{Action, AliasConfig, AliasKind, Compiled, Reducer};
pub use crate::core::{
    EditorError, EditorPath, EditorState, EditorStore, History, HistoryEntry, HistoryStats,
    KeyRegistry, Map, Node, NodeKind, Operation, ParseStableKeyError, PathResolutionError,
    PathResolver, PathSegment, Result, StableKey, StateSnapshot, StoreConfig, Value,
};
pub use crate::events::{
    Change, ChangeKind, EventChannel, EventChannelConfig, EventFilter, EventHandler, EventStats,
    FnHandler, StoreEvent, SubscriptionId,
};
