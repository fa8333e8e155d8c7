//! Core types and structures for fx-editor
//!
//! This module contains the fundamental building blocks of the editor:
//! - `Value`: immutable, structurally shared document nodes
//! - `EditorPath` and `StableKey` for addressing values
//! - `KeyRegistry` and `PathResolver` for reading and copy-on-write writing
//! - History management for undo/redo
//! - `EditorStore`, the dispatch entry point

pub mod errors;
pub mod history;
pub mod keys;
pub mod path;
pub mod resolver;
pub mod store;
pub mod value;

// Re-export commonly used types
pub use errors::{EditorError, PathResolutionError, Result};
pub use history::{History, HistoryEntry, HistoryStats, Operation};
pub use keys::KeyRegistry;
pub use path::{EditorPath, ParseStableKeyError, PathSegment, StableKey};
pub use resolver::PathResolver;
pub use store::{EditorState, EditorStore, StateSnapshot, StoreConfig};
pub use value::{Map, Node, NodeKind, Value};
