//! The editor store: current document, history and subscribers
//!
//! [`EditorStore::dispatch`] is the single entry point for changes. Every
//! dispatch either commits completely (document, history and cursor move
//! together, then subscribers are notified) or fails and leaves the store
//! exactly as it was.

use crate::commands::{Action, AliasConfig, Reducer};
use crate::core::errors::{PathResolutionError, Result};
use crate::core::history::{History, HistoryStats};
use crate::core::keys::KeyRegistry;
use crate::core::path::{EditorPath, StableKey};
use crate::core::resolver::{expect_list, PathResolver};
use crate::core::value::Value;
use crate::events::{
    Change, EventChannel, EventChannelConfig, EventHandler, EventStats, FnHandler, StoreEvent,
    SubscriptionId,
};

/// Store configuration
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Alias table and reference field names
    pub aliases: AliasConfig,
    /// Subscriber channel settings
    pub events: EventChannelConfig,
}

/// Document plus the history that produced it
///
/// Applying `history.entries()[..history.cursor()]` to the document that
/// was opened reproduces `document`.
#[derive(Debug, Clone)]
pub struct EditorState {
    document: Value,
    history: History,
}

impl EditorState {
    #[must_use]
    pub fn new(document: Value) -> Self {
        Self {
            document,
            history: History::new(),
        }
    }

    #[must_use]
    pub fn document(&self) -> &Value {
        &self.document
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.history.cursor()
    }

    #[must_use]
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            document: self.document.clone(),
            can_undo: self.history.can_undo(),
            can_redo: self.history.can_redo(),
        }
    }
}

/// What the UI renders from
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    pub document: Value,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Owns the editor state and applies actions to it
///
/// # Examples
///
/// ```
/// use fx_editor::{editor_path, Action, EditorStore, Value};
/// use serde_json::json;
///
/// let mut store = EditorStore::new(Value::from(json!({"effects": {"a": [true, "X", [], []]}})));
///
/// store.dispatch(Action::edit(editor_path!["effects", "a", 0], false)).unwrap();
/// assert_eq!(store.state().document.to_json(), json!({"effects": {"a": [false, "X", [], []]}}));
///
/// store.dispatch(Action::Undo).unwrap();
/// assert!(store.state().can_redo);
/// assert_eq!(store.read(&editor_path!["effects", "a", 0]).unwrap(), Value::bool(true));
/// ```
#[derive(Debug)]
pub struct EditorStore {
    state: EditorState,
    registry: KeyRegistry,
    events: EventChannel,
    aliases: AliasConfig,
}

impl EditorStore {
    /// Create a store with default configuration
    #[must_use]
    pub fn new(document: Value) -> Self {
        Self::with_config(document, StoreConfig::default())
    }

    /// Create a store with custom configuration
    #[must_use]
    pub fn with_config(document: Value, config: StoreConfig) -> Self {
        Self {
            state: EditorState::new(document),
            registry: KeyRegistry::new(),
            events: EventChannel::with_config(config.events),
            aliases: config.aliases,
        }
    }

    /// Apply an action
    ///
    /// Undo with nothing to undo and redo with nothing to redo succeed
    /// without changing anything or notifying subscribers.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        let description = action.description();
        tracing::debug!("dispatch: {description}");

        let result = match action {
            Action::Undo => self.undo().map(|_| ()),
            Action::Redo => self.redo().map(|_| ()),
            Action::Open { document } => {
                self.open(document);
                Ok(())
            }
            action => self.apply(&action),
        };

        if let Err(err) = &result {
            tracing::warn!("dispatch of '{description}' aborted: {err}");
        }
        result
    }

    /// Revert the entry before the cursor; `false` when there is none
    pub fn undo(&mut self) -> Result<bool> {
        let Some(entry) = self.state.history.undo_entry() else {
            return Ok(false);
        };
        let mut resolver = PathResolver::new(&mut self.registry);
        let document = entry.revert(&mut resolver, &self.state.document)?;
        let description = entry.description.clone();

        self.state.document = document;
        self.state.history.step_back();
        self.emit(Change::UndoPerformed { description });
        Ok(true)
    }

    /// Re-apply the entry at the cursor; `false` when there is none
    pub fn redo(&mut self) -> Result<bool> {
        let Some(entry) = self.state.history.redo_entry() else {
            return Ok(false);
        };
        let mut resolver = PathResolver::new(&mut self.registry);
        let document = entry.apply(&mut resolver, &self.state.document)?;
        let description = entry.description.clone();

        self.state.document = document;
        self.state.history.step_forward();
        self.emit(Change::RedoPerformed { description });
        Ok(true)
    }

    /// Replace the document and clear the history
    pub fn open(&mut self, document: Value) {
        self.state = EditorState::new(document);
        let pruned = self.registry.prune();
        tracing::trace!("document opened, {pruned} stale key registrations pruned");
        self.emit(Change::DocumentOpened);
    }

    fn apply(&mut self, action: &Action) -> Result<()> {
        let compiled = Reducer::new(&mut self.registry, &self.aliases)
            .compile(action, &self.state.document)?;
        let description = compiled.entry.description.clone();

        self.state.document = compiled.document;
        self.state.history.record(compiled.entry);
        self.emit(Change::ActionApplied { description });
        Ok(())
    }

    fn emit(&mut self, change: Change) {
        let event = StoreEvent {
            change,
            document: self.state.document.clone(),
            can_undo: self.state.history.can_undo(),
            can_redo: self.state.history.can_redo(),
        };
        self.events.dispatch(&event);
    }

    /// Current document and undo/redo availability
    #[must_use]
    pub fn state(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    #[must_use]
    pub fn document(&self) -> &Value {
        &self.state.document
    }

    #[must_use]
    pub fn editor_state(&self) -> &EditorState {
        &self.state
    }

    /// Value at `path` in the current document
    pub fn read(&mut self, path: &EditorPath) -> Result<Value> {
        Ok(PathResolver::new(&mut self.registry).read(&self.state.document, path)?)
    }

    /// Stable key of element `index` of the list at `list_path`
    pub fn stable_key(&mut self, list_path: &EditorPath, index: usize) -> Result<StableKey> {
        let mut resolver = PathResolver::new(&mut self.registry);
        let list = resolver.read(&self.state.document, list_path)?;
        let len = expect_list(&list, list_path.len())?.len();
        resolver
            .registry()
            .key_at(&list, index)
            .ok_or_else(|| {
                PathResolutionError::IndexOutOfBounds {
                    index,
                    len,
                    depth: list_path.len(),
                }
                .into()
            })
    }

    /// `path` with every index segment replaced by a stable reference
    pub fn stabilize(&mut self, path: &EditorPath) -> Result<EditorPath> {
        Ok(PathResolver::new(&mut self.registry).stabilize(&self.state.document, path)?)
    }

    /// Subscribe a closure to every event
    pub fn subscribe<F>(&mut self, handler: F) -> Result<SubscriptionId>
    where
        F: FnMut(&StoreEvent) + Send + 'static,
    {
        self.events.register_handler(Box::new(FnHandler(handler)))
    }

    /// Subscribe a handler with its own filter and priority
    pub fn subscribe_handler(&mut self, handler: Box<dyn EventHandler>) -> Result<SubscriptionId> {
        self.events.register_handler(handler)
    }

    /// Remove a subscription; `false` if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.events.unregister_handler(id)
    }

    #[must_use]
    pub fn history_stats(&self) -> HistoryStats {
        self.state.history.stats()
    }

    #[must_use]
    pub fn next_undo_description(&self) -> Option<&str> {
        self.state.history.next_undo_description()
    }

    #[must_use]
    pub fn next_redo_description(&self) -> Option<&str> {
        self.state.history.next_redo_description()
    }

    #[must_use]
    pub fn event_stats(&self) -> &EventStats {
        self.events.stats()
    }

    #[must_use]
    pub fn registry(&self) -> &KeyRegistry {
        &self.registry
    }
}
