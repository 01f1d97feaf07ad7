//! Persisted per-record expansion flags.
//!
//! The outline never owns expansion state. It reads the flag a caller keeps
//! for each record when a snapshot arrives, and writes it back when the user
//! expands or collapses a row, so the next snapshot agrees with what is on
//! screen. How the caller persists the flags is up to the caller.

use std::collections::HashMap;
use std::hash::Hash;

use canopy_core::Signal;
use parking_lot::RwLock;

/// A mutable boolean cell per record identity.
pub trait ExpansionStore<K>: Send + Sync {
    /// Returns the stored flag, or the store's default when none was written.
    fn is_expanded(&self, id: &K) -> bool;

    /// Stores the flag for `id`.
    fn set_expanded(&self, id: &K, expanded: bool);
}

/// An in-memory [`ExpansionStore`] with change notification.
///
/// # Example
///
/// ```
/// use canopy::model::{ExpansionStore, MemoryExpansionStore};
///
/// let store = MemoryExpansionStore::<u32>::new(true);
/// assert!(store.is_expanded(&7));
///
/// store.set_expanded(&7, false);
/// assert!(!store.is_expanded(&7));
/// ```
pub struct MemoryExpansionStore<K> {
    flags: RwLock<HashMap<K, bool>>,
    default_expanded: bool,
    /// Emitted when a stored flag actually changes. Args: (id, expanded)
    pub changed: Signal<(K, bool)>,
}

impl<K: Clone + Eq + Hash + Send + Sync + 'static> MemoryExpansionStore<K> {
    /// Creates an empty store answering `default_expanded` for unknown ids.
    pub fn new(default_expanded: bool) -> Self {
        Self {
            flags: RwLock::new(HashMap::new()),
            default_expanded,
            changed: Signal::new(),
        }
    }

    /// Creates a store pre-populated with flags.
    pub fn with_flags(
        default_expanded: bool,
        flags: impl IntoIterator<Item = (K, bool)>,
    ) -> Self {
        Self {
            flags: RwLock::new(flags.into_iter().collect()),
            default_expanded,
            changed: Signal::new(),
        }
    }

    /// Returns the flag answered for ids never written.
    pub fn default_expanded(&self) -> bool {
        self.default_expanded
    }

    /// Number of explicitly stored flags.
    pub fn len(&self) -> usize {
        self.flags.read().len()
    }

    /// Returns true if no flag has been written.
    pub fn is_empty(&self) -> bool {
        self.flags.read().is_empty()
    }

    /// Forgets the flag for `id`, falling back to the default.
    pub fn forget(&self, id: &K) -> Option<bool> {
        self.flags.write().remove(id)
    }
}

impl<K: Clone + Eq + Hash + Send + Sync + 'static> ExpansionStore<K> for MemoryExpansionStore<K> {
    fn is_expanded(&self, id: &K) -> bool {
        self.flags
            .read()
            .get(id)
            .copied()
            .unwrap_or(self.default_expanded)
    }

    fn set_expanded(&self, id: &K, expanded: bool) {
        let previous = self.flags.write().insert(id.clone(), expanded);
        if previous.unwrap_or(self.default_expanded) != expanded {
            self.changed.emit((id.clone(), expanded));
        }
    }
}
