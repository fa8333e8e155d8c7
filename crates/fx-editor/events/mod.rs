//! Event system for store changes
//!
//! Provides `StoreEvent` for describing a committed state change and
//! `EventChannel` for fanning it out to subscribers. Delivery is synchronous
//! and happens after the store has committed, so a failing subscriber can
//! only be logged, never roll anything back.

use crate::core::errors::{EditorError, Result};
use crate::core::value::Value;
use core::fmt;

/// What kind of change produced an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A mutating action was compiled and recorded
    ActionApplied {
        /// Description of the applied action
        description: String,
    },

    /// Undo operation was performed
    UndoPerformed {
        /// Description of the undone entry
        description: String,
    },

    /// Redo operation was performed
    RedoPerformed {
        /// Description of the redone entry
        description: String,
    },

    /// A new document replaced the old one and history was cleared
    DocumentOpened,
}

/// Discriminant of [`Change`], used by filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    ActionApplied,
    UndoPerformed,
    RedoPerformed,
    DocumentOpened,
}

impl Change {
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        match self {
            Self::ActionApplied { .. } => ChangeKind::ActionApplied,
            Self::UndoPerformed { .. } => ChangeKind::UndoPerformed,
            Self::RedoPerformed { .. } => ChangeKind::RedoPerformed,
            Self::DocumentOpened => ChangeKind::DocumentOpened,
        }
    }

    /// Description of the history entry involved, if any
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::ActionApplied { description }
            | Self::UndoPerformed { description }
            | Self::RedoPerformed { description } => Some(description),
            Self::DocumentOpened => None,
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ActionApplied { description } => write!(f, "applied: {description}"),
            Self::UndoPerformed { description } => write!(f, "undone: {description}"),
            Self::RedoPerformed { description } => write!(f, "redone: {description}"),
            Self::DocumentOpened => f.write_str("document opened"),
        }
    }
}

/// Notification sent to subscribers after a successful dispatch
#[derive(Debug, Clone)]
pub struct StoreEvent {
    pub change: Change,
    /// The document after the change
    pub document: Value,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl StoreEvent {
    #[must_use]
    pub const fn kind(&self) -> ChangeKind {
        self.change.kind()
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Kinds to include (empty means all kinds)
    include_kinds: Vec<ChangeKind>,
    /// Kinds to exclude
    exclude_kinds: Vec<ChangeKind>,
}

impl EventFilter {
    /// Create a new event filter that accepts all events
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Only include specific kinds
    #[must_use]
    pub fn include_kinds(mut self, kinds: Vec<ChangeKind>) -> Self {
        self.include_kinds = kinds;
        self
    }

    /// Exclude specific kinds
    #[must_use]
    pub fn exclude_kinds(mut self, kinds: Vec<ChangeKind>) -> Self {
        self.exclude_kinds = kinds;
        self
    }

    /// Check if an event passes this filter
    #[must_use]
    pub fn matches(&self, event: &StoreEvent) -> bool {
        let kind = event.kind();
        if self.exclude_kinds.contains(&kind) {
            return false;
        }
        self.include_kinds.is_empty() || self.include_kinds.contains(&kind)
    }
}

/// Event handler trait for responding to store events
pub trait EventHandler: Send {
    /// Handle a store event
    fn handle_event(&mut self, event: &StoreEvent) -> Result<()>;

    /// Get the event filter for this handler
    fn event_filter(&self) -> EventFilter {
        EventFilter::new()
    }

    /// Get handler priority (higher numbers = higher priority)
    fn priority(&self) -> i32 {
        0
    }
}

/// Adapts a closure into an [`EventHandler`] that accepts every event
pub struct FnHandler<F>(pub F);

impl<F> EventHandler for FnHandler<F>
where
    F: FnMut(&StoreEvent) + Send,
{
    fn handle_event(&mut self, event: &StoreEvent) -> Result<()> {
        (self.0)(event);
        Ok(())
    }
}

/// Handle returned by a subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(usize);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// Statistics about event handling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventStats {
    /// Total number of events dispatched
    pub events_dispatched: usize,
    /// Number of handlers currently registered
    pub handlers_count: usize,
    /// Number of deliveries skipped by filters
    pub events_filtered: usize,
    /// Number of handler calls that returned an error
    pub handler_failures: usize,
}

/// Event channel configuration
#[derive(Debug, Clone)]
pub struct EventChannelConfig {
    /// Maximum number of handlers
    pub max_handlers: usize,
    /// Whether to log every dispatch at debug level
    pub enable_logging: bool,
}

impl Default for EventChannelConfig {
    fn default() -> Self {
        Self {
            max_handlers: 100,
            enable_logging: false,
        }
    }
}

/// Information about a registered handler
struct HandlerInfo {
    id: SubscriptionId,
    handler: Box<dyn EventHandler>,
    filter: EventFilter,
    priority: i32,
}

impl fmt::Debug for HandlerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerInfo")
            .field("id", &self.id)
            .field("filter", &self.filter)
            .field("priority", &self.priority)
            .field("handler", &"<EventHandler>")
            .finish()
    }
}

/// Event channel for distributing store events to handlers
#[derive(Debug, Default)]
pub struct EventChannel {
    config: EventChannelConfig,
    /// Sorted by priority, highest first; ties keep registration order
    handlers: Vec<HandlerInfo>,
    stats: EventStats,
    next_handler_id: usize,
}

impl EventChannel {
    /// Create a new event channel with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EventChannelConfig::default())
    }

    /// Create a new event channel with custom configuration
    #[must_use]
    pub fn with_config(config: EventChannelConfig) -> Self {
        Self {
            config,
            handlers: Vec::new(),
            stats: EventStats::default(),
            next_handler_id: 0,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EventChannelConfig {
        &self.config
    }

    /// Register an event handler
    pub fn register_handler(&mut self, handler: Box<dyn EventHandler>) -> Result<SubscriptionId> {
        if self.handlers.len() >= self.config.max_handlers {
            return Err(EditorError::HandlerLimit {
                limit: self.config.max_handlers,
            });
        }

        let id = SubscriptionId(self.next_handler_id);
        self.next_handler_id += 1;

        let filter = handler.event_filter();
        let priority = handler.priority();
        let position = self
            .handlers
            .iter()
            .position(|info| info.priority < priority)
            .unwrap_or(self.handlers.len());
        self.handlers.insert(
            position,
            HandlerInfo {
                id,
                handler,
                filter,
                priority,
            },
        );

        self.stats.handlers_count = self.handlers.len();
        Ok(id)
    }

    /// Unregister an event handler by ID
    pub fn unregister_handler(&mut self, id: SubscriptionId) -> bool {
        let Some(position) = self.handlers.iter().position(|info| info.id == id) else {
            return false;
        };
        self.handlers.remove(position);
        self.stats.handlers_count = self.handlers.len();
        true
    }

    /// Dispatch an event to all registered handlers
    ///
    /// Handler errors are logged and counted; delivery continues with the
    /// remaining handlers.
    pub fn dispatch(&mut self, event: &StoreEvent) {
        self.stats.events_dispatched += 1;

        let mut delivered = 0;
        for info in &mut self.handlers {
            if !info.filter.matches(event) {
                self.stats.events_filtered += 1;
                continue;
            }
            delivered += 1;
            if let Err(err) = info.handler.handle_event(event) {
                self.stats.handler_failures += 1;
                tracing::warn!("event handler {} failed on '{}': {err}", info.id, event.change);
            }
        }

        if self.config.enable_logging {
            tracing::debug!("event dispatched: {} -> {delivered} handlers", event.change);
        } else {
            tracing::trace!("event dispatched: {} -> {delivered} handlers", event.change);
        }
    }

    /// Get event statistics
    #[must_use]
    pub fn stats(&self) -> &EventStats {
        &self.stats
    }

    /// Clear all event handlers
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
        self.stats.handlers_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn event(change: Change) -> StoreEvent {
        StoreEvent {
            change,
            document: Value::null(),
            can_undo: false,
            can_redo: false,
        }
    }

    fn applied(description: &str) -> StoreEvent {
        event(Change::ActionApplied {
            description: description.to_string(),
        })
    }

    // Records the change descriptions it receives into a shared log
    struct TestHandler {
        log: Arc<Mutex<Vec<String>>>,
        name: &'static str,
        filter: EventFilter,
        priority: i32,
        fail: bool,
    }

    impl TestHandler {
        fn new(log: &Arc<Mutex<Vec<String>>>, name: &'static str) -> Self {
            Self {
                log: Arc::clone(log),
                name,
                filter: EventFilter::new(),
                priority: 0,
                fail: false,
            }
        }
    }

    impl EventHandler for TestHandler {
        fn handle_event(&mut self, event: &StoreEvent) -> Result<()> {
            self.log.lock().unwrap().push(format!("{}: {}", self.name, event.change));
            if self.fail {
                return Err(EditorError::handler_failed("boom"));
            }
            Ok(())
        }

        fn event_filter(&self) -> EventFilter {
            self.filter.clone()
        }

        fn priority(&self) -> i32 {
            self.priority
        }
    }

    #[test]
    fn event_channel_creation() {
        let channel = EventChannel::new();
        assert_eq!(channel.stats(), &EventStats::default());
        assert_eq!(channel.config().max_handlers, 100);
    }

    #[test]
    fn handler_registration() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut channel = EventChannel::new();

        let id = channel.register_handler(Box::new(TestHandler::new(&log, "a"))).unwrap();
        assert_eq!(channel.stats().handlers_count, 1);

        assert!(channel.unregister_handler(id));
        assert!(!channel.unregister_handler(id));
        assert_eq!(channel.stats().handlers_count, 0);
    }

    #[test]
    fn handler_limit() {
        let mut channel = EventChannel::with_config(EventChannelConfig {
            max_handlers: 1,
            ..Default::default()
        });
        channel.register_handler(Box::new(FnHandler(|_: &StoreEvent| {}))).unwrap();
        let err = channel
            .register_handler(Box::new(FnHandler(|_: &StoreEvent| {})))
            .unwrap_err();
        assert_eq!(err, EditorError::HandlerLimit { limit: 1 });
    }

    #[test]
    fn priority_ordering() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut channel = EventChannel::new();

        let mut low = TestHandler::new(&log, "low");
        low.priority = 1;
        let mut high = TestHandler::new(&log, "high");
        high.priority = 10;
        channel.register_handler(Box::new(low)).unwrap();
        channel.register_handler(Box::new(high)).unwrap();
        channel.register_handler(Box::new(TestHandler::new(&log, "default"))).unwrap();

        channel.dispatch(&applied("edit x"));
        assert_eq!(
            *log.lock().unwrap(),
            vec!["high: applied: edit x", "low: applied: edit x", "default: applied: edit x"]
        );
    }

    #[test]
    fn filtering() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut channel = EventChannel::new();

        let mut handler = TestHandler::new(&log, "h");
        handler.filter = EventFilter::new().exclude_kinds(vec![ChangeKind::DocumentOpened]);
        channel.register_handler(Box::new(handler)).unwrap();

        channel.dispatch(&applied("edit x"));
        channel.dispatch(&event(Change::DocumentOpened));

        assert_eq!(channel.stats().events_dispatched, 2);
        assert_eq!(channel.stats().events_filtered, 1);
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn include_filter() {
        let filter = EventFilter::new().include_kinds(vec![ChangeKind::UndoPerformed]);
        assert!(!filter.matches(&applied("x")));
        assert!(filter.matches(&event(Change::UndoPerformed {
            description: "x".to_string()
        })));
    }

    #[test]
    fn failing_handler_does_not_stop_delivery() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut channel = EventChannel::new();

        let mut failing = TestHandler::new(&log, "failing");
        failing.fail = true;
        failing.priority = 5;
        channel.register_handler(Box::new(failing)).unwrap();
        channel.register_handler(Box::new(TestHandler::new(&log, "ok"))).unwrap();

        channel.dispatch(&applied("edit x"));
        assert_eq!(channel.stats().handler_failures, 1);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[test]
    fn closure_handlers() {
        let count = Arc::new(Mutex::new(0));
        let seen = Arc::clone(&count);
        let mut channel = EventChannel::new();
        channel
            .register_handler(Box::new(FnHandler(move |_: &StoreEvent| *seen.lock().unwrap() += 1)))
            .unwrap();

        channel.dispatch(&applied("a"));
        channel.dispatch(&applied("b"));
        assert_eq!(*count.lock().unwrap(), 2);

        channel.clear_handlers();
        channel.dispatch(&applied("c"));
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn change_descriptions() {
        assert_eq!(Change::DocumentOpened.description(), None);
        assert_eq!(
            Change::RedoPerformed { description: "edit x".to_string() }.to_string(),
            "redone: edit x"
        );
    }
}
