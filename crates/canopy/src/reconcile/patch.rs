//! Record of the edits one reconciliation pass applied.

use std::fmt;

/// One host edit.
///
/// Structural edits address rows by parent identity and child index, exactly
/// as they were handed to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit<K> {
    /// A row left the tree.
    Remove {
        parent: Option<K>,
        index: usize,
        id: K,
    },
    /// A row entered the tree.
    Insert {
        parent: Option<K>,
        index: usize,
        id: K,
    },
    /// A row changed place among its siblings.
    Move {
        parent: Option<K>,
        from: usize,
        to: usize,
        id: K,
    },
    /// A row gained or lost its children.
    Reshape { id: K, expandable: bool },
    /// A row was expanded.
    Expand { id: K },
    /// A row was collapsed.
    Collapse { id: K },
}

impl<K> Edit<K> {
    /// Returns the identity the edit applies to.
    pub fn id(&self) -> &K {
        match self {
            Self::Remove { id, .. }
            | Self::Insert { id, .. }
            | Self::Move { id, .. }
            | Self::Reshape { id, .. }
            | Self::Expand { id }
            | Self::Collapse { id } => id,
        }
    }

    /// Returns true for inserts, removes and moves.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Remove { .. } | Self::Insert { .. } | Self::Move { .. }
        )
    }
}

/// Ordered edits of one reconciliation pass.
#[derive(Clone, PartialEq, Eq)]
pub struct Patch<K> {
    edits: Vec<Edit<K>>,
}

impl<K> Default for Patch<K> {
    fn default() -> Self {
        Self { edits: Vec::new() }
    }
}

impl<K> Patch<K> {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an edit.
    pub fn push(&mut self, edit: Edit<K>) {
        self.edits.push(edit);
    }

    /// Returns the edits in application order.
    pub fn edits(&self) -> &[Edit<K>] {
        &self.edits
    }

    /// Number of edits.
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true if the pass changed nothing.
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Number of inserts.
    pub fn insert_count(&self) -> usize {
        self.count(|e| matches!(e, Edit::Insert { .. }))
    }

    /// Number of removes.
    pub fn remove_count(&self) -> usize {
        self.count(|e| matches!(e, Edit::Remove { .. }))
    }

    /// Number of moves.
    pub fn move_count(&self) -> usize {
        self.count(|e| matches!(e, Edit::Move { .. }))
    }

    /// Number of inserts, removes and moves.
    pub fn structural_count(&self) -> usize {
        self.count(Edit::is_structural)
    }

    fn count(&self, pred: impl Fn(&Edit<K>) -> bool) -> usize {
        self.edits.iter().filter(|e| pred(e)).count()
    }
}

impl<K: PartialEq + Clone> Patch<K> {
    /// Edits addressed to the children of `parent`.
    pub fn at_level<'a>(&'a self, parent: Option<&'a K>) -> impl Iterator<Item = &'a Edit<K>> + 'a {
        self.edits.iter().filter(move |edit| match edit {
            Edit::Remove { parent: p, .. }
            | Edit::Insert { parent: p, .. }
            | Edit::Move { parent: p, .. } => p.as_ref() == parent,
            _ => false,
        })
    }

    /// Replays the structural edits of one level onto a list of identities.
    pub fn replay_level(&self, parent: Option<&K>, ids: &mut Vec<K>) {
        for edit in self.at_level(parent) {
            match edit {
                Edit::Remove { index, .. } => {
                    ids.remove(*index);
                }
                Edit::Insert { index, id, .. } => ids.insert(*index, id.clone()),
                Edit::Move { from, to, .. } => {
                    let id = ids.remove(*from);
                    ids.insert(*to, id);
                }
                _ => {}
            }
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for Patch<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.edits).finish()
    }
}
