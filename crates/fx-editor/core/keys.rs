//! Stable identities for list elements
//!
//! The registry associates each list node (by reference identity, not by
//! contents) with a positional list of issued [`StableKey`]s. Keys survive
//! copy-on-write edits because writers call [`KeyRegistry::inherit`] when they
//! replace a list with a rebuilt copy.
//!
//! The guarantee is positional: keys are stable across length-preserving
//! replacements and growth or shrinkage at the tail. An insertion or deletion
//! in the middle of a list shifts elements while the keys stay put, so every
//! key after the edit point ends up naming a different element.

use crate::core::path::StableKey;
use crate::core::value::{Node, Value};
use std::collections::HashMap;
use std::sync::Weak;

/// Registrations below this count are never pruned
const MIN_PRUNE_THRESHOLD: usize = 64;

#[derive(Debug)]
struct Registration {
    /// Keeps the allocation (and so the address) reserved while registered
    list: Weak<Node>,
    keys: Vec<StableKey>,
}

impl Registration {
    fn is_live(&self) -> bool {
        self.list.strong_count() > 0
    }
}

/// Side table from list identity to stable keys
///
/// Owned by one `EditorStore`; keys from different registries never collide
/// with each other's lists because lookups are per list identity.
///
/// # Examples
///
/// ```
/// use fx_editor::{KeyRegistry, Value};
///
/// let mut registry = KeyRegistry::new();
/// let list = Value::from(serde_json::json!(["x", "y", "z"]));
///
/// let second = registry.key_at(&list, 1).unwrap();
/// assert_eq!(registry.index_of_key(&list, second), Some(1));
/// // Asking again returns the cached key
/// assert_eq!(registry.key_at(&list, 1), Some(second));
/// ```
#[derive(Debug)]
pub struct KeyRegistry {
    lists: HashMap<usize, Registration>,
    next_key: u64,
    prune_threshold: usize,
}

impl KeyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            lists: HashMap::new(),
            next_key: 0,
            prune_threshold: MIN_PRUNE_THRESHOLD,
        }
    }

    /// Keys for every element of `list`, registering it on first use
    ///
    /// A registered list whose length changed gets fresh keys for new
    /// trailing positions and loses keys for removed ones; surviving
    /// positions keep their keys. Non-list values have no keys.
    pub fn keys(&mut self, list: &Value) -> &[StableKey] {
        let len = list.as_list().map_or(0, <[Value]>::len);
        self.maybe_prune();

        let Self {
            lists, next_key, ..
        } = self;
        let registration = lists.entry(list.identity()).or_insert_with(|| Registration {
            list: list.downgrade(),
            keys: Vec::with_capacity(len),
        });

        registration.keys.truncate(len);
        while registration.keys.len() < len {
            registration.keys.push(StableKey::new(*next_key));
            *next_key += 1;
        }
        &registration.keys
    }

    /// Key of the element at `index`; `None` when out of range
    pub fn key_at(&mut self, list: &Value, index: usize) -> Option<StableKey> {
        self.keys(list).get(index).copied()
    }

    /// Current position of the element named by `key`
    pub fn index_of_key(&mut self, list: &Value, key: StableKey) -> Option<usize> {
        self.keys(list).iter().position(|candidate| *candidate == key)
    }

    /// Carry the keys of `from` over to its rebuilt copy `to`
    ///
    /// Only valid when `to` keeps the element order of `from`. Unregistered
    /// sources have issued no keys, so there is nothing to carry.
    pub fn inherit(&mut self, from: &Value, to: &Value) {
        if from.ptr_eq(to) {
            return;
        }
        let Some(keys) = self.lists.get(&from.identity()).map(|r| r.keys.clone()) else {
            return;
        };
        self.lists.insert(
            to.identity(),
            Registration {
                list: to.downgrade(),
                keys,
            },
        );
    }

    /// Whether `list` currently has keys issued
    #[must_use]
    pub fn is_registered(&self, list: &Value) -> bool {
        self.lists.contains_key(&list.identity())
    }

    /// Drop registrations whose list no longer exists, returning how many
    pub fn prune(&mut self) -> usize {
        let before = self.lists.len();
        self.lists.retain(|_, registration| registration.is_live());
        before - self.lists.len()
    }

    /// Number of registrations whose list is still alive
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.values().filter(|r| r.is_live()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn maybe_prune(&mut self) {
        if self.lists.len() >= self.prune_threshold {
            self.prune();
            self.prune_threshold = (self.lists.len() * 2).max(MIN_PRUNE_THRESHOLD);
        }
    }
}

impl Default for KeyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
