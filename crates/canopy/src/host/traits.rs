//! Structural host primitives.
//!
//! These traits are the only operations the reconciler, the selection tracker
//! and the drag coordinator need from a hierarchical list control. Structural
//! edits are addressed the way outline controls address them: a parent
//! identity (`None` for the top level) and a child index under that parent.
//! Queries answer in the flat, depth-first row space the user sees.

use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use canopy_core::Result;

/// Shape of a row being inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSpec<K> {
    /// Identity of the record shown by the row.
    pub id: K,
    /// Whether the row shows a disclosure control.
    pub expandable: bool,
}

impl<K> RowSpec<K> {
    /// Creates a row spec.
    pub fn new(id: K, expandable: bool) -> Self {
        Self { id, expandable }
    }
}

/// Read-only queries against the live rows of a host.
pub trait RowLookup<K> {
    /// Number of visible rows.
    fn row_count(&self) -> usize;

    /// Visible row showing `id`, or `None` when the row is absent or hidden
    /// under a collapsed ancestor.
    ///
    /// Queries by identity address the most recently inserted row carrying it.
    fn row_for_identity(&self, id: &K) -> Option<usize>;

    /// Identity shown by a visible row.
    fn identity_at_row(&self, row: usize) -> Option<K>;

    /// Returns true if `id` has a live row, visible or not.
    fn contains(&self, id: &K) -> bool;

    /// Parent of a live row: `Some(None)` for top-level rows, `None` when
    /// `id` has no live row.
    fn parent_of(&self, id: &K) -> Option<Option<K>>;

    /// Index of a live row among its siblings.
    fn child_index_of(&self, id: &K) -> Option<usize>;

    /// Live children of `parent`, or `None` when the parent is unknown or its
    /// children were never loaded.
    fn children_of(&self, parent: Option<&K>) -> Option<Vec<K>>;

    /// Returns true if the row for `id` shows a disclosure control.
    fn is_expandable(&self, id: &K) -> bool;

    /// Returns true if the row for `id` is expanded.
    fn is_expanded(&self, id: &K) -> bool;

    /// Returns true if the children of `id` have been loaded into the host.
    fn is_materialized(&self, id: &K) -> bool;

    /// Counter bumped by every structural change, including expansion.
    fn structure_generation(&self) -> u64;

    /// Currently selected visible rows.
    fn selected_rows(&self) -> BTreeSet<usize>;
}

/// Mutating primitives of a hierarchical list host.
///
/// Structural operations are infallible. `move_row` removes the row at `from`
/// and re-inserts it so that it ends up at index `to` of the resulting list.
pub trait OutlineHost<K>: RowLookup<K> {
    /// Opens an update transaction. Transactions nest.
    fn begin_updates(&mut self);

    /// Closes an update transaction. Closing the outermost one commits.
    fn end_updates(&mut self);

    /// Inserts a collapsed row at `index` under `parent`.
    fn insert_row(&mut self, parent: Option<&K>, index: usize, row: RowSpec<K>);

    /// Removes the row at `index` under `parent`, with its whole subtree.
    fn remove_row(&mut self, parent: Option<&K>, index: usize);

    /// Moves a row (and subtree) between two indices under the same parent.
    fn move_row(&mut self, parent: Option<&K>, from: usize, to: usize);

    /// Changes whether a row shows a disclosure control. Making a row
    /// non-expandable drops its children.
    fn set_expandable(&mut self, id: &K, expandable: bool);

    /// Expands or collapses a row.
    fn set_expanded(&mut self, id: &K, expanded: bool);

    /// Replaces the selection. Rows that are not visible are ignored.
    fn set_selected_rows(&mut self, rows: BTreeSet<usize>);

    /// Clears the selection.
    fn clear_selection(&mut self) {
        self.set_selected_rows(BTreeSet::new());
    }

    /// Checks the host's internal bookkeeping. Hosts that keep none answer
    /// `Ok`.
    fn verify(&self) -> Result<()> {
        Ok(())
    }
}

/// RAII bracket around an update transaction.
///
/// Calls [`OutlineHost::end_updates`] when dropped, so the host is never left
/// inside a transaction, even when the code holding the guard panics.
pub struct UpdateGuard<'a, K, H: OutlineHost<K> + ?Sized> {
    host: &'a mut H,
    _marker: PhantomData<fn(K)>,
}

impl<'a, K, H: OutlineHost<K> + ?Sized> UpdateGuard<'a, K, H> {
    /// Opens a transaction on `host`.
    pub fn new(host: &'a mut H) -> Self {
        host.begin_updates();
        Self {
            host,
            _marker: PhantomData,
        }
    }
}

impl<K, H: OutlineHost<K> + ?Sized> Deref for UpdateGuard<'_, K, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<K, H: OutlineHost<K> + ?Sized> DerefMut for UpdateGuard<'_, K, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<K, H: OutlineHost<K> + ?Sized> Drop for UpdateGuard<'_, K, H> {
    fn drop(&mut self) {
        self.host.end_updates();
    }
}
