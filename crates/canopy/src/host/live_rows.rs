//! In-memory mirror of a hierarchical list control.
//!
//! [`LiveRows`] implements [`OutlineHost`] on top of a slot map of row nodes.
//! It keeps the logical tree (parent and child index addressing) and the flat
//! depth-first row space the user sees in agreement, and reports every
//! structural edit as a [`RowChange`] in flat row coordinates so a renderer can
//! patch its visible rows instead of rebuilding them.
//!
//! Children of a row are loaded lazily: a freshly inserted row has no child
//! list until something is inserted under it or it is expanded.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use canopy_core::logging::targets;
use canopy_core::{DebugTree, Error, Result, Signal, TreeFormatOptions, TreeFormatter};
use slotmap::{SecondaryMap, SlotMap, new_key_type};

use super::traits::{OutlineHost, RowLookup, RowSpec};

new_key_type! {
    /// Stable handle of one live row, independent of its position.
    pub struct RowKey;
}

/// A change in the flat, depth-first row space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    /// `count` rows appeared starting at `row`.
    Inserted { row: usize, count: usize },
    /// `count` rows starting at `row` disappeared.
    Removed { row: usize, count: usize },
    /// A block of `count` rows at `from` was cut out and re-inserted so that it
    /// starts at `to` in the resulting list.
    Moved { from: usize, to: usize, count: usize },
    /// The row at `row` gained or lost its disclosure control.
    Reshaped { row: usize },
}

struct LiveNode<K> {
    id: K,
    parent: Option<RowKey>,
    /// `None` until the children have been loaded.
    children: Option<Vec<RowKey>>,
    expandable: bool,
    expanded: bool,
}

/// In-memory implementation of the structural host primitives.
///
/// # Signals
///
/// - `rows_changed`: Emitted once per committed transaction with every flat
///   row change in application order. Edits made outside a transaction are
///   emitted one by one.
pub struct LiveRows<K> {
    nodes: SlotMap<RowKey, LiveNode<K>>,
    roots: Vec<RowKey>,
    /// Live rows per identity, oldest first. A duplicate identity resolves to
    /// the row inserted last, so a row being reparented is addressed at its
    /// new place while the old one still exists.
    by_id: HashMap<K, Vec<RowKey>>,
    flat: Vec<RowKey>,
    flat_index: SecondaryMap<RowKey, usize>,
    selected: HashSet<RowKey>,
    update_depth: usize,
    pending: Vec<RowChange>,
    generation: u64,

    /// Emitted when a batch of flat row changes is committed.
    pub rows_changed: Signal<Vec<RowChange>>,
}

impl<K: Clone + Eq + Hash + Debug + Send + 'static> Default for LiveRows<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash + Debug + Send + 'static> LiveRows<K> {
    /// Creates an empty mirror.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            roots: Vec::new(),
            by_id: HashMap::new(),
            flat: Vec::new(),
            flat_index: SecondaryMap::new(),
            selected: HashSet::new(),
            update_depth: 0,
            pending: Vec::new(),
            generation: 0,
            rows_changed: Signal::new(),
        }
    }

    /// Total number of live rows, visible or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if there are no live rows.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns true while an update transaction is open.
    pub fn in_transaction(&self) -> bool {
        self.update_depth > 0
    }

    /// Identities of the visible rows, in row order.
    pub fn visible_ids(&self) -> Vec<K> {
        self.flat
            .iter()
            .map(|&key| self.nodes[key].id.clone())
            .collect()
    }

    /// Nesting depth of a live row (0 for top-level rows).
    pub fn depth_of(&self, id: &K) -> Option<usize> {
        let mut key = self.key_for(id)?;
        let mut depth = 0;
        while let Some(parent) = self.nodes[key].parent {
            depth += 1;
            key = parent;
        }
        Some(depth)
    }

    /// Renders the live tree for debugging.
    pub fn debug_tree(&self) -> String {
        TreeFormatter::with_options(TreeFormatOptions::ascii()).format(self)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn key_for(&self, id: &K) -> Option<RowKey> {
        self.by_id.get(id).and_then(|keys| keys.last()).copied()
    }

    fn resolve_parent(&self, parent: Option<&K>) -> Option<Option<RowKey>> {
        match parent {
            None => Some(None),
            Some(id) => self.key_for(id).map(Some),
        }
    }

    fn siblings(&self, parent: Option<RowKey>) -> Option<&Vec<RowKey>> {
        match parent {
            None => Some(&self.roots),
            Some(key) => self.nodes.get(key).and_then(|n| n.children.as_ref()),
        }
    }

    fn siblings_mut(&mut self, parent: Option<RowKey>) -> Option<&mut Vec<RowKey>> {
        match parent {
            None => Some(&mut self.roots),
            Some(key) => self.nodes.get_mut(key).and_then(|n| n.children.as_mut()),
        }
    }

    /// Number of visible rows occupied by `key` and its visible descendants.
    fn visible_block_len(&self, key: RowKey) -> usize {
        let node = &self.nodes[key];
        let mut len = 1;
        if node.expanded {
            for &child in node.children.iter().flatten() {
                len += self.visible_block_len(child);
            }
        }
        len
    }

    fn collect_visible(&self, key: RowKey, out: &mut Vec<RowKey>) {
        out.push(key);
        let node = &self.nodes[key];
        if node.expanded {
            for &child in node.children.iter().flatten() {
                self.collect_visible(child, out);
            }
        }
    }

    /// Flat row at which the child at `index` under `parent` starts, or would
    /// start if inserted there. `None` when that level is hidden.
    fn flat_slot(&self, parent: Option<RowKey>, index: usize) -> Option<usize> {
        let start = match parent {
            None => 0,
            Some(key) if self.nodes[key].expanded => self.flat_index.get(key)? + 1,
            Some(_) => return None,
        };
        let previous = index
            .checked_sub(1)
            .and_then(|i| self.siblings(parent)?.get(i).copied());
        match previous {
            Some(prev) => Some(self.flat_index.get(prev)? + self.visible_block_len(prev)),
            None => Some(start),
        }
    }

    fn splice_flat(&mut self, at: usize, keys: Vec<RowKey>) {
        self.flat.splice(at..at, keys);
        self.reindex_flat(at);
    }

    fn cut_flat(&mut self, at: usize, count: usize) -> Vec<RowKey> {
        let cut: Vec<RowKey> = self.flat.drain(at..at + count).collect();
        for &key in &cut {
            self.flat_index.remove(key);
        }
        self.reindex_flat(at);
        cut
    }

    fn reindex_flat(&mut self, from: usize) {
        for (row, &key) in self.flat.iter().enumerate().skip(from) {
            self.flat_index.insert(key, row);
        }
    }

    fn drop_subtree(&mut self, key: RowKey) {
        let Some(node) = self.nodes.remove(key) else {
            return;
        };
        self.selected.remove(&key);
        if let Some(keys) = self.by_id.get_mut(&node.id) {
            keys.retain(|&k| k != key);
            if keys.is_empty() {
                self.by_id.remove(&node.id);
            }
        }
        for child in node.children.into_iter().flatten() {
            self.drop_subtree(child);
        }
    }

    fn record(&mut self, change: RowChange) {
        tracing::trace!(target: targets::HOST, ?change, "row change");
        if self.update_depth > 0 {
            self.pending.push(change);
        } else {
            self.rows_changed.emit(vec![change]);
        }
    }
}

impl<K: Clone + Eq + Hash + Debug + Send + 'static> RowLookup<K> for LiveRows<K> {
    fn row_count(&self) -> usize {
        self.flat.len()
    }

    fn row_for_identity(&self, id: &K) -> Option<usize> {
        self.key_for(id)
            .and_then(|key| self.flat_index.get(key).copied())
    }

    fn identity_at_row(&self, row: usize) -> Option<K> {
        self.flat.get(row).map(|&key| self.nodes[key].id.clone())
    }

    fn contains(&self, id: &K) -> bool {
        self.by_id.contains_key(id)
    }

    fn parent_of(&self, id: &K) -> Option<Option<K>> {
        let key = self.key_for(id)?;
        Some(self.nodes[key].parent.map(|parent| self.nodes[parent].id.clone()))
    }

    fn child_index_of(&self, id: &K) -> Option<usize> {
        let key = self.key_for(id)?;
        self.siblings(self.nodes[key].parent)?
            .iter()
            .position(|&k| k == key)
    }

    fn children_of(&self, parent: Option<&K>) -> Option<Vec<K>> {
        let parent = self.resolve_parent(parent)?;
        self.siblings(parent).map(|children| {
            children
                .iter()
                .map(|&key| self.nodes[key].id.clone())
                .collect()
        })
    }

    fn is_expandable(&self, id: &K) -> bool {
        self.key_for(id)
            .is_some_and(|key| self.nodes[key].expandable)
    }

    fn is_expanded(&self, id: &K) -> bool {
        self.key_for(id).is_some_and(|key| self.nodes[key].expanded)
    }

    fn is_materialized(&self, id: &K) -> bool {
        self.key_for(id)
            .is_some_and(|key| self.nodes[key].children.is_some())
    }

    fn structure_generation(&self) -> u64 {
        self.generation
    }

    fn selected_rows(&self) -> BTreeSet<usize> {
        self.selected
            .iter()
            .filter_map(|&key| self.flat_index.get(key).copied())
            .collect()
    }
}

impl<K: Clone + Eq + Hash + Debug + Send + 'static> OutlineHost<K> for LiveRows<K> {
    fn begin_updates(&mut self) {
        self.update_depth += 1;
    }

    fn end_updates(&mut self) {
        if self.update_depth == 0 {
            tracing::warn!(target: targets::HOST, "end_updates without matching begin_updates");
            return;
        }

        self.update_depth -= 1;
        if self.update_depth == 0 && !self.pending.is_empty() {
            let batch = std::mem::take(&mut self.pending);
            tracing::debug!(target: targets::HOST, changes = batch.len(), "committing row changes");
            self.rows_changed.emit(batch);
        }
    }

    fn insert_row(&mut self, parent: Option<&K>, index: usize, row: RowSpec<K>) {
        let Some(parent_key) = self.resolve_parent(parent) else {
            tracing::error!(target: targets::HOST, ?parent, "insert under unknown parent");
            return;
        };

        let key = self.nodes.insert(LiveNode {
            id: row.id.clone(),
            parent: parent_key,
            children: None,
            expandable: row.expandable,
            expanded: false,
        });
        self.by_id.entry(row.id).or_default().push(key);

        let index = index.min(self.siblings(parent_key).map_or(0, Vec::len));
        let slot = self.flat_slot(parent_key, index);
        let siblings = match parent_key {
            None => &mut self.roots,
            Some(parent) => self.nodes[parent].children.get_or_insert_with(Vec::new),
        };
        siblings.insert(index, key);

        self.generation += 1;
        if let Some(row) = slot {
            self.splice_flat(row, vec![key]);
            self.record(RowChange::Inserted { row, count: 1 });
        }
    }

    fn remove_row(&mut self, parent: Option<&K>, index: usize) {
        let Some(parent_key) = self.resolve_parent(parent) else {
            tracing::error!(target: targets::HOST, ?parent, "remove under unknown parent");
            return;
        };
        let Some(key) = self
            .siblings(parent_key)
            .and_then(|siblings| siblings.get(index))
            .copied()
        else {
            tracing::error!(target: targets::HOST, ?parent, index, "remove of missing row");
            return;
        };

        let before = self
            .flat_index
            .get(key)
            .map(|&row| (row, self.visible_block_len(key)));

        if let Some((row, count)) = before {
            self.cut_flat(row, count);
        }
        if let Some(siblings) = self.siblings_mut(parent_key) {
            siblings.remove(index);
        }
        self.drop_subtree(key);

        self.generation += 1;
        if let Some((row, count)) = before {
            self.record(RowChange::Removed { row, count });
        }
    }

    fn move_row(&mut self, parent: Option<&K>, from: usize, to: usize) {
        let Some(parent_key) = self.resolve_parent(parent) else {
            tracing::error!(target: targets::HOST, ?parent, "move under unknown parent");
            return;
        };
        let Some(key) = self
            .siblings(parent_key)
            .and_then(|siblings| siblings.get(from))
            .copied()
        else {
            tracing::error!(target: targets::HOST, ?parent, from, "move of missing row");
            return;
        };

        let before = self
            .flat_index
            .get(key)
            .map(|&row| (row, self.visible_block_len(key)));

        let block = before.map(|(row, count)| self.cut_flat(row, count));
        let mut to = to;
        if let Some(siblings) = self.siblings_mut(parent_key) {
            siblings.remove(from);
            to = to.min(siblings.len());
            siblings.insert(to, key);
        }

        self.generation += 1;
        if let (Some((from, count)), Some(block)) = (before, block) {
            let Some(row) = self.flat_slot(parent_key, to) else {
                return;
            };
            self.splice_flat(row, block);
            if from != row {
                self.record(RowChange::Moved { from, to: row, count });
            }
        }
    }

    fn set_expandable(&mut self, id: &K, expandable: bool) {
        let Some(key) = self.key_for(id) else {
            return;
        };
        if self.nodes[key].expandable == expandable {
            return;
        }

        let row = self.flat_index.get(key).copied();
        let hidden_children = match row {
            Some(_) => self.visible_block_len(key) - 1,
            None => 0,
        };

        if let Some(row) = row
            && hidden_children > 0
        {
            self.cut_flat(row + 1, hidden_children);
        }
        let node = &mut self.nodes[key];
        node.expandable = expandable;
        if !expandable {
            node.expanded = false;
            let children = node.children.take();
            for child in children.into_iter().flatten() {
                self.drop_subtree(child);
            }
        }

        self.generation += 1;
        if let Some(row) = row {
            if hidden_children > 0 {
                self.record(RowChange::Removed {
                    row: row + 1,
                    count: hidden_children,
                });
            }
            self.record(RowChange::Reshaped { row });
        }
    }

    fn set_expanded(&mut self, id: &K, expanded: bool) {
        let Some(key) = self.key_for(id) else {
            return;
        };
        let node = &self.nodes[key];
        if node.expanded == expanded {
            return;
        }
        if expanded && !node.expandable {
            tracing::trace!(target: targets::HOST, ?id, "ignoring expand of a leaf row");
            return;
        }

        let row = self.flat_index.get(key).copied();
        if expanded {
            let node = &mut self.nodes[key];
            node.expanded = true;
            node.children.get_or_insert_with(Vec::new);

            self.generation += 1;
            if let Some(row) = row {
                let mut block = Vec::new();
                for &child in self.nodes[key].children.iter().flatten() {
                    self.collect_visible(child, &mut block);
                }
                let count = block.len();
                if count > 0 {
                    self.splice_flat(row + 1, block);
                    self.record(RowChange::Inserted { row: row + 1, count });
                }
            }
        } else {
            let count = match row {
                Some(_) => self.visible_block_len(key) - 1,
                None => 0,
            };
            if let Some(row) = row
                && count > 0
            {
                self.cut_flat(row + 1, count);
            }
            self.nodes[key].expanded = false;

            self.generation += 1;
            let flat_index = &self.flat_index;
            self.selected.retain(|k| flat_index.contains_key(*k));
            if let Some(row) = row
                && count > 0
            {
                self.record(RowChange::Removed { row: row + 1, count });
            }
        }
    }

    fn set_selected_rows(&mut self, rows: BTreeSet<usize>) {
        self.selected = rows
            .into_iter()
            .filter_map(|row| self.flat.get(row).copied())
            .collect();
    }

    /// Checks that the logical tree, the identity index, the flat row space
    /// and the selection agree with each other.
    fn verify(&self) -> Result<()> {
        for &root in &self.roots {
            let node = self
                .nodes
                .get(root)
                .ok_or_else(|| Error::invariant("dangling top-level row"))?;
            if node.parent.is_some() {
                return Err(Error::invariant(format!(
                    "top-level row {:?} has a parent",
                    node.id
                )));
            }
        }

        for (key, node) in &self.nodes {
            let siblings = match node.parent {
                None => Some(&self.roots),
                Some(parent) => self
                    .nodes
                    .get(parent)
                    .ok_or_else(|| Error::invariant(format!("row {:?} has a dead parent", node.id)))?
                    .children
                    .as_ref(),
            };
            let listed = siblings.is_some_and(|s| s.iter().filter(|&&k| k == key).count() == 1);
            if !listed {
                return Err(Error::invariant(format!(
                    "row {:?} is not listed exactly once under its parent",
                    node.id
                )));
            }
            for &child in node.children.iter().flatten() {
                if self.nodes.get(child).and_then(|c| c.parent) != Some(key) {
                    return Err(Error::invariant(format!(
                        "child of {:?} does not point back",
                        node.id
                    )));
                }
            }
            if node.expanded && !node.expandable {
                return Err(Error::invariant(format!(
                    "row {:?} is expanded without being expandable",
                    node.id
                )));
            }
        }

        for (id, keys) in &self.by_id {
            let stale = keys
                .iter()
                .any(|&key| self.nodes.get(key).map(|n| &n.id) != Some(id));
            if keys.is_empty() || stale {
                return Err(Error::invariant(format!("identity index stale for {:?}", id)));
            }
        }
        let indexed: usize = self.by_id.values().map(Vec::len).sum();
        if indexed != self.nodes.len() {
            return Err(Error::invariant(format!(
                "identity index holds {indexed} rows, {} live",
                self.nodes.len()
            )));
        }

        let mut expected = Vec::with_capacity(self.flat.len());
        for &root in &self.roots {
            self.collect_visible(root, &mut expected);
        }
        if expected != self.flat {
            return Err(Error::invariant(format!(
                "flat rows out of date: {} cached, {} expected",
                self.flat.len(),
                expected.len()
            )));
        }
        for (row, &key) in self.flat.iter().enumerate() {
            if self.flat_index.get(key) != Some(&row) {
                return Err(Error::invariant(format!("flat index wrong at row {row}")));
            }
        }

        if let Some(key) = self.selected.iter().find(|&&k| !self.flat_index.contains_key(k)) {
            return Err(Error::invariant(format!(
                "selected row {:?} is not visible",
                self.nodes.get(*key).map(|n| &n.id)
            )));
        }

        Ok(())
    }
}

impl<K: Clone + Eq + Hash + Debug + Send + 'static> DebugTree for LiveRows<K> {
    type Node = RowKey;

    fn roots(&self) -> Vec<RowKey> {
        self.roots.clone()
    }

    fn children(&self, node: RowKey) -> Vec<RowKey> {
        self.nodes[node].children.clone().unwrap_or_default()
    }

    fn label(&self, node: RowKey) -> String {
        let live = &self.nodes[node];
        let disclosure = match (live.expandable, live.expanded) {
            (false, _) => "",
            (true, true) => " [-]",
            (true, false) => " [+]",
        };
        let selected = if self.selected.contains(&node) { " *" } else { "" };
        format!("{:?}{}{}", live.id, disclosure, selected)
    }
}

static_assertions::assert_impl_all!(LiveRows<u64>: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn leaf(id: &'static str) -> RowSpec<&'static str> {
        RowSpec::new(id, false)
    }

    fn folder(id: &'static str) -> RowSpec<&'static str> {
        RowSpec::new(id, true)
    }

    /// users/ (alice, bob), notes
    fn sample() -> LiveRows<&'static str> {
        let mut rows = LiveRows::new();
        rows.insert_row(None, 0, folder("users"));
        rows.insert_row(None, 1, leaf("notes"));
        rows.insert_row(Some(&"users"), 0, leaf("alice"));
        rows.insert_row(Some(&"users"), 1, leaf("bob"));
        rows
    }

    fn record_changes(rows: &LiveRows<&'static str>) -> Arc<Mutex<Vec<Vec<RowChange>>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        rows.rows_changed.connect(move |batch| log_clone.lock().push(batch.clone()));
        log
    }

    #[test]
    fn test_collapsed_children_are_hidden() {
        let rows = sample();
        assert_eq!(rows.visible_ids(), vec!["users", "notes"]);
        assert_eq!(rows.len(), 4);
        assert!(rows.contains(&"alice"));
        assert_eq!(rows.row_for_identity(&"alice"), None);
        assert_eq!(rows.row_for_identity(&"notes"), Some(1));
        rows.verify().unwrap();
    }

    #[test]
    fn test_expand_and_collapse_report_flat_blocks() {
        let mut rows = sample();
        let log = record_changes(&rows);

        rows.set_expanded(&"users", true);
        assert_eq!(rows.visible_ids(), vec!["users", "alice", "bob", "notes"]);

        rows.set_expanded(&"users", false);
        assert_eq!(rows.visible_ids(), vec!["users", "notes"]);

        assert_eq!(
            *log.lock(),
            vec![
                vec![RowChange::Inserted { row: 1, count: 2 }],
                vec![RowChange::Removed { row: 1, count: 2 }],
            ]
        );
        rows.verify().unwrap();
    }

    #[test]
    fn test_transaction_batches_changes() {
        let mut rows = sample();
        rows.set_expanded(&"users", true);
        let log = record_changes(&rows);

        rows.begin_updates();
        rows.begin_updates();
        rows.remove_row(Some(&"users"), 0);
        rows.insert_row(None, 0, leaf("readme"));
        rows.end_updates();
        assert!(log.lock().is_empty());
        rows.end_updates();

        assert_eq!(
            *log.lock(),
            vec![vec![
                RowChange::Removed { row: 1, count: 1 },
                RowChange::Inserted { row: 0, count: 1 },
            ]]
        );
        assert_eq!(rows.visible_ids(), vec!["readme", "users", "bob", "notes"]);
    }

    #[test]
    fn test_move_reports_whole_subtree() {
        let mut rows = sample();
        rows.set_expanded(&"users", true);
        let log = record_changes(&rows);

        rows.move_row(None, 0, 1);
        assert_eq!(rows.visible_ids(), vec!["notes", "users", "alice", "bob"]);
        assert_eq!(
            *log.lock(),
            vec![vec![RowChange::Moved {
                from: 0,
                to: 1,
                count: 3
            }]]
        );
        assert_eq!(rows.child_index_of(&"users"), Some(1));
        rows.verify().unwrap();
    }

    #[test]
    fn test_remove_drops_subtree_and_selection() {
        let mut rows = sample();
        rows.set_expanded(&"users", true);
        rows.set_selected_rows([2].into_iter().collect());
        assert_eq!(rows.selected_rows(), [2].into_iter().collect());

        rows.remove_row(None, 0);
        assert!(!rows.contains(&"bob"));
        assert!(rows.selected_rows().is_empty());
        assert_eq!(rows.visible_ids(), vec!["notes"]);
        rows.verify().unwrap();
    }

    #[test]
    fn test_collapse_deselects_hidden_rows() {
        let mut rows = sample();
        rows.set_expanded(&"users", true);
        rows.set_selected_rows([1, 3].into_iter().collect());

        rows.set_expanded(&"users", false);
        assert_eq!(rows.selected_rows(), [1].into_iter().collect());
        rows.verify().unwrap();
    }

    #[test]
    fn test_reshape_to_leaf_drops_children() {
        let mut rows = sample();
        rows.set_expanded(&"users", true);
        let log = record_changes(&rows);

        rows.set_expandable(&"users", false);
        assert!(!rows.is_expanded(&"users"));
        assert!(!rows.is_materialized(&"users"));
        assert!(!rows.contains(&"alice"));
        assert_eq!(
            *log.lock(),
            vec![
                vec![RowChange::Removed { row: 1, count: 2 }],
                vec![RowChange::Reshaped { row: 0 }],
            ]
        );
        rows.verify().unwrap();
    }

    #[test]
    fn test_leaf_cannot_expand() {
        let mut rows = sample();
        let generation = rows.structure_generation();
        rows.set_expanded(&"notes", true);
        assert!(!rows.is_expanded(&"notes"));
        assert_eq!(rows.structure_generation(), generation);
    }

    #[test]
    fn test_generation_tracks_structure() {
        let mut rows = sample();
        let generation = rows.structure_generation();
        rows.set_selected_rows([0].into_iter().collect());
        assert_eq!(rows.structure_generation(), generation);
        rows.set_expanded(&"users", true);
        assert!(rows.structure_generation() > generation);
    }

    #[test]
    fn test_lookup_queries() {
        let mut rows = sample();
        rows.set_expanded(&"users", true);

        assert_eq!(rows.parent_of(&"bob"), Some(Some("users")));
        assert_eq!(rows.parent_of(&"notes"), Some(None));
        assert_eq!(rows.parent_of(&"ghost"), None);
        assert_eq!(rows.children_of(Some(&"users")), Some(vec!["alice", "bob"]));
        assert_eq!(rows.children_of(Some(&"notes")), None);
        assert_eq!(rows.identity_at_row(2), Some("bob"));
        assert_eq!(rows.depth_of(&"bob"), Some(1));
    }

    #[test]
    fn test_duplicate_identity_follows_latest_row() {
        let mut rows = LiveRows::new();
        rows.insert_row(None, 0, leaf("twin"));
        rows.insert_row(None, 1, leaf("twin"));
        assert_eq!(rows.row_for_identity(&"twin"), Some(1));

        rows.remove_row(None, 1);
        assert_eq!(rows.row_for_identity(&"twin"), Some(0));
        rows.verify().unwrap();
    }

    #[test]
    fn test_edits_inside_expanded_levels_patch_flat_rows() {
        let mut rows = LiveRows::new();
        for (index, id) in ["a", "b", "c", "d"].into_iter().enumerate() {
            rows.insert_row(None, index, folder(id));
        }
        rows.set_expanded(&"b", true);
        rows.insert_row(Some(&"b"), 0, folder("b1"));
        rows.insert_row(Some(&"b"), 1, leaf("b2"));
        rows.insert_row(Some(&"b1"), 0, leaf("b1x"));
        rows.set_expanded(&"b1", true);
        assert_eq!(rows.visible_ids(), vec!["a", "b", "b1", "b1x", "b2", "c", "d"]);
        rows.verify().unwrap();

        let log = record_changes(&rows);
        rows.move_row(Some(&"b"), 0, 1);
        rows.verify().unwrap();
        rows.move_row(None, 1, 3);
        rows.verify().unwrap();
        assert_eq!(rows.visible_ids(), vec!["a", "c", "d", "b", "b2", "b1", "b1x"]);

        rows.set_expandable(&"b1", false);
        rows.verify().unwrap();
        rows.remove_row(None, 0);
        rows.verify().unwrap();
        assert_eq!(rows.visible_ids(), vec!["c", "d", "b", "b2", "b1"]);

        assert_eq!(
            *log.lock(),
            vec![
                vec![RowChange::Moved { from: 2, to: 3, count: 2 }],
                vec![RowChange::Moved { from: 1, to: 3, count: 4 }],
                vec![RowChange::Removed { row: 6, count: 1 }],
                vec![RowChange::Reshaped { row: 5 }],
                vec![RowChange::Removed { row: 0, count: 1 }],
            ]
        );
    }

    #[test]
    fn test_large_append_keeps_index() {
        let mut rows = LiveRows::new();
        rows.begin_updates();
        for id in 0..2_000u32 {
            rows.insert_row(None, id as usize, RowSpec::new(id, false));
        }
        rows.end_updates();

        assert_eq!(rows.row_count(), 2_000);
        assert_eq!(rows.row_for_identity(&1_999), Some(1_999));
        rows.remove_row(None, 0);
        assert_eq!(rows.row_for_identity(&1_999), Some(1_998));
        rows.verify().unwrap();
    }

    #[test]
    fn test_debug_tree() {
        let mut rows = sample();
        rows.set_expanded(&"users", true);
        rows.set_selected_rows([2].into_iter().collect());

        let expected = "\"users\" [-]\n+-- \"alice\"\n`-- \"bob\" *\n\"notes\"\n";
        assert_eq!(rows.debug_tree(), expected);
    }
}
