//! Selection identity mapping.
//!
//! The caller owns the selection as a set of record identities. After every
//! reconciliation the [`SelectionTracker`] maps those identities onto the rows
//! that currently show them, and when the user changes the selection in the
//! host it translates the selected rows back into identities.
//!
//! Caller-driven changes are never echoed back: `selection_changed` fires only
//! when the rows reported by the host differ from what the tracker itself
//! would have selected.
//!
//! # Example
//!
//! ```
//! use canopy::host::{LiveRows, OutlineHost, RowLookup, RowSpec};
//! use canopy::model::{SelectionMode, SelectionTracker};
//!
//! let mut rows = LiveRows::new();
//! rows.insert_row(None, 0, RowSpec::new("a", false));
//! rows.insert_row(None, 1, RowSpec::new("b", false));
//!
//! let mut tracker = SelectionTracker::new(SelectionMode::Multiple);
//! tracker.set_desired(["b"]);
//! tracker.apply(&mut rows);
//! assert_eq!(rows.selected_rows().into_iter().collect::<Vec<_>>(), vec![1]);
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use canopy_core::Signal;
use canopy_core::logging::targets;
use serde::{Deserialize, Serialize};

use crate::host::{OutlineHost, RowLookup};

/// How many rows may be selected at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// At most one row. The first resolved row wins.
    Single,
    /// Any number of rows.
    #[default]
    Multiple,
}

/// Keeps the desired selection as identities and maps it onto live rows.
///
/// # Signals
///
/// - `selection_changed`: Emitted with the new identities when the user
///   changed the selection in the host.
pub struct SelectionTracker<K> {
    desired: Vec<K>,
    mode: SelectionMode,

    /// Emitted when a user-driven change is observed.
    pub selection_changed: Signal<Vec<K>>,
}

impl<K: Clone + Eq + Hash + Debug + Send + 'static> SelectionTracker<K> {
    /// Creates an empty tracker.
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            desired: Vec::new(),
            mode,
            selection_changed: Signal::new(),
        }
    }

    /// Returns the selection mode.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Changes the selection mode. Switching to single selection keeps only
    /// the first desired identity.
    pub fn set_mode(&mut self, mode: SelectionMode) {
        self.mode = mode;
        if mode == SelectionMode::Single {
            self.desired.truncate(1);
        }
    }

    /// Replaces the desired selection. Duplicates are ignored.
    pub fn set_desired(&mut self, ids: impl IntoIterator<Item = K>) {
        let mut seen = HashSet::new();
        self.desired = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
        tracing::trace!(target: targets::SELECTION, desired = ?self.desired, "desired selection set");
    }

    /// Returns the desired selection in the order it was given.
    pub fn desired(&self) -> &[K] {
        &self.desired
    }

    /// Returns true if `id` is part of the desired selection.
    pub fn is_selected(&self, id: &K) -> bool {
        self.desired.contains(id)
    }

    /// Clears the desired selection.
    pub fn clear(&mut self) {
        self.desired.clear();
    }

    /// Maps the desired identities onto visible rows. Identities without a
    /// visible row are skipped.
    pub fn resolve<L: RowLookup<K> + ?Sized>(&self, lookup: &L) -> BTreeSet<usize> {
        let rows: BTreeSet<usize> = self
            .desired
            .iter()
            .filter_map(|id| lookup.row_for_identity(id))
            .collect();

        match self.mode {
            SelectionMode::Single => rows.into_iter().take(1).collect(),
            SelectionMode::Multiple => rows,
        }
    }

    /// Handles a selection change reported by the host.
    ///
    /// Returns the new identities, or `None` when the reported rows are what
    /// the tracker itself would select.
    pub fn observe<L: RowLookup<K> + ?Sized>(
        &mut self,
        live_rows: &BTreeSet<usize>,
        lookup: &L,
    ) -> Option<Vec<K>> {
        if *live_rows == self.resolve(lookup) {
            return None;
        }

        let mut ids: Vec<K> = live_rows
            .iter()
            .filter_map(|&row| lookup.identity_at_row(row))
            .collect();
        if self.mode == SelectionMode::Single {
            ids.truncate(1);
        }

        tracing::debug!(target: targets::SELECTION, selected = ?ids, "user changed selection");
        self.desired = ids.clone();
        self.selection_changed.emit(ids.clone());
        Some(ids)
    }

    /// Pushes the resolved selection into the host and returns it.
    ///
    /// An empty resolution clears a non-empty host selection explicitly.
    pub fn apply<H: OutlineHost<K> + ?Sized>(&self, host: &mut H) -> BTreeSet<usize> {
        let rows = self.resolve(host);
        let current = host.selected_rows();

        if rows.is_empty() {
            if !current.is_empty() {
                host.clear_selection();
            }
        } else if rows != current {
            host.set_selected_rows(rows.clone());
        }
        rows
    }

    /// Drops identities for which `present` answers false. Returns how many
    /// were dropped.
    pub fn prune(&mut self, present: impl Fn(&K) -> bool) -> usize {
        let before = self.desired.len();
        self.desired.retain(|id| present(id));
        let dropped = before - self.desired.len();
        if dropped > 0 {
            tracing::debug!(target: targets::SELECTION, dropped, "pruned vanished identities");
        }
        dropped
    }
}

static_assertions::assert_impl_all!(SelectionTracker<u64>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{LiveRows, RowSpec};
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn rows(ids: &[&'static str]) -> LiveRows<&'static str> {
        let mut rows = LiveRows::new();
        for (index, id) in ids.iter().enumerate() {
            rows.insert_row(None, index, RowSpec::new(*id, false));
        }
        rows
    }

    fn set(rows: &[usize]) -> BTreeSet<usize> {
        rows.iter().copied().collect()
    }

    #[test]
    fn test_resolve_skips_missing() {
        let live = rows(&["a", "b", "c"]);
        let mut tracker = SelectionTracker::new(SelectionMode::Multiple);
        tracker.set_desired(["c", "ghost", "a", "c"]);

        assert_eq!(tracker.desired(), &["c", "ghost", "a"]);
        assert_eq!(tracker.resolve(&live), set(&[0, 2]));
    }

    #[test]
    fn test_single_mode_keeps_first_row() {
        let live = rows(&["a", "b", "c"]);
        let mut tracker = SelectionTracker::new(SelectionMode::Single);
        tracker.set_desired(["c", "b"]);
        assert_eq!(tracker.resolve(&live), set(&[1]));

        tracker.set_mode(SelectionMode::Multiple);
        tracker.set_desired(["c", "b"]);
        tracker.set_mode(SelectionMode::Single);
        assert_eq!(tracker.desired(), &["c"]);
    }

    #[test]
    fn test_observe_ignores_echo() {
        let mut live = rows(&["a", "b", "c"]);
        let mut tracker = SelectionTracker::new(SelectionMode::Multiple);
        let hits = Arc::new(Mutex::new(Vec::new()));
        let hits_clone = hits.clone();
        tracker
            .selection_changed
            .connect(move |ids| hits_clone.lock().push(ids.clone()));

        tracker.set_desired(["b"]);
        tracker.apply(&mut live);
        assert_eq!(tracker.observe(&live.selected_rows(), &live), None);
        assert!(hits.lock().is_empty());

        assert_eq!(tracker.observe(&set(&[0, 2]), &live), Some(vec!["a", "c"]));
        assert_eq!(tracker.desired(), &["a", "c"]);
        assert_eq!(*hits.lock(), vec![vec!["a", "c"]]);
    }

    #[test]
    fn test_apply_clears_stale_host_selection() {
        let mut live = rows(&["a", "b"]);
        live.set_selected_rows(set(&[1]));

        let mut tracker = SelectionTracker::new(SelectionMode::Multiple);
        tracker.set_desired(["ghost"]);
        assert!(tracker.apply(&mut live).is_empty());
        assert!(live.selected_rows().is_empty());
    }

    #[test]
    fn test_prune() {
        let mut tracker = SelectionTracker::new(SelectionMode::Multiple);
        tracker.set_desired(["a", "b", "c"]);
        assert_eq!(tracker.prune(|id| *id != "b"), 1);
        assert_eq!(tracker.desired(), &["a", "c"]);
        assert!(!tracker.is_selected(&"b"));
    }
}
