//! Applies level diffs to a host, recursing through the tree.

use std::collections::HashSet;

use canopy_core::PerfSpan;
use canopy_core::logging::{span_names, targets};

use super::diff::diff_level;
use super::patch::{Edit, Patch};
use crate::host::{OutlineHost, RowSpec, UpdateGuard};
use crate::model::{Node, OutlineRecord};

/// Reconciles snapshots into a host.
///
/// Each pass runs inside one host update transaction. Levels are diffed
/// against the rows the host actually holds, so records whose children are
/// mutated in place still produce correct edits.
#[derive(Debug, Clone)]
pub struct Reconciler {
    lazy_children: bool,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

impl Reconciler {
    /// Creates a reconciler that leaves never-expanded subtrees unloaded.
    pub fn new() -> Self {
        Self {
            lazy_children: true,
        }
    }

    /// Sets whether never-expanded subtrees stay unloaded.
    ///
    /// With lazy loading off, every subtree is loaded into the host on each
    /// pass, collapsed or not.
    pub fn with_lazy_children(mut self, lazy: bool) -> Self {
        self.lazy_children = lazy;
        self
    }

    /// Returns true if never-expanded subtrees stay unloaded.
    pub fn lazy_children(&self) -> bool {
        self.lazy_children
    }

    /// Turns the children of `parent` from `old` into `new` and returns the
    /// edits that were applied.
    ///
    /// `old` is the previously rendered sequence. When it disagrees with the
    /// rows the host holds under `parent`, the host wins.
    #[tracing::instrument(
        skip_all,
        target = "canopy::reconcile",
        level = "debug",
        fields(old = old.len(), new = new.len())
    )]
    pub fn reconcile<R, H>(
        &self,
        old: &[Node<R>],
        new: &[Node<R>],
        parent: Option<&R::Id>,
        host: &mut H,
    ) -> Patch<R::Id>
    where
        R: OutlineRecord,
        H: OutlineHost<R::Id> + ?Sized,
    {
        let _perf = PerfSpan::new(span_names::RECONCILE);
        let mut host = UpdateGuard::<R::Id, H>::new(host);
        let mut patch = Patch::new();

        let old_ids: Vec<R::Id> = old.iter().map(Node::id).collect();
        let live = host.children_of(parent).unwrap_or_default();
        let old_ids = if live == old_ids {
            old_ids
        } else {
            tracing::warn!(
                target: targets::RECONCILE,
                previous = old_ids.len(),
                live = live.len(),
                "previous snapshot does not match live rows, diffing against live rows"
            );
            live
        };

        self.reconcile_level(&mut *host, parent, old_ids, new, &mut patch);

        tracing::debug!(
            target: targets::RECONCILE,
            inserts = patch.insert_count(),
            removes = patch.remove_count(),
            moves = patch.move_count(),
            edits = patch.len(),
            "reconciled"
        );
        patch
    }

    /// Brings the loaded children of `node` in line with its current
    /// children, loading them if they never were.
    pub fn reconcile_children<R, H>(&self, node: &Node<R>, host: &mut H) -> Patch<R::Id>
    where
        R: OutlineRecord,
        H: OutlineHost<R::Id> + ?Sized,
    {
        let mut host = UpdateGuard::<R::Id, H>::new(host);
        let mut patch = Patch::new();

        let id = node.id();
        if let Some(children) = node.children() {
            let live = host.children_of(Some(&id)).unwrap_or_default();
            self.reconcile_level(&mut *host, Some(&id), live, &children, &mut patch);
        }
        patch
    }

    fn reconcile_level<R, H>(
        &self,
        host: &mut H,
        parent: Option<&R::Id>,
        old: Vec<R::Id>,
        new: &[Node<R>],
        patch: &mut Patch<R::Id>,
    ) where
        R: OutlineRecord,
        H: OutlineHost<R::Id> + ?Sized,
    {
        let new_ids: Vec<R::Id> = new.iter().map(Node::id).collect();
        let diff = diff_level(&old, &new_ids);

        #[cfg(debug_assertions)]
        if !diff.duplicates.is_empty() {
            let duplicates: Vec<&R::Id> = diff.duplicates.iter().map(|&i| &new_ids[i]).collect();
            tracing::warn!(
                target: targets::RECONCILE,
                ?parent,
                ?duplicates,
                "duplicate sibling identities, only the first occurrence is tracked"
            );
        }

        for &index in &diff.removes {
            tracing::trace!(target: targets::RECONCILE, ?parent, index, "remove");
            host.remove_row(parent, index);
            patch.push(Edit::Remove {
                parent: parent.cloned(),
                index,
                id: old[index].clone(),
            });
        }

        for (old_index, m) in &diff.moves {
            tracing::trace!(target: targets::RECONCILE, ?parent, from = m.from, to = m.to, "move");
            host.move_row(parent, m.from, m.to);
            patch.push(Edit::Move {
                parent: parent.cloned(),
                from: m.from,
                to: m.to,
                id: old[*old_index].clone(),
            });
        }

        for &index in &diff.inserts {
            let node = &new[index];
            tracing::trace!(target: targets::RECONCILE, ?parent, index, "insert");
            host.insert_row(parent, index, RowSpec::new(node.id(), node.is_expandable()));
            patch.push(Edit::Insert {
                parent: parent.cloned(),
                index,
                id: new_ids[index].clone(),
            });
        }

        let mut visited = HashSet::with_capacity(new.len());
        for node in new {
            let id = node.id();
            if !visited.insert(id.clone()) {
                continue;
            }

            let children = node.children();
            let expandable = children.is_some();
            if host.is_expandable(&id) != expandable {
                tracing::trace!(target: targets::RECONCILE, ?id, expandable, "reshape");
                host.set_expandable(&id, expandable);
                patch.push(Edit::Reshape {
                    id: id.clone(),
                    expandable,
                });
            }
            let Some(children) = children else {
                continue;
            };

            // Without a persisted flag the host's own state stands.
            let expanded = node.is_expanded();
            if host.is_materialized(&id) || expanded == Some(true) || !self.lazy_children {
                let live = host.children_of(Some(&id)).unwrap_or_default();
                self.reconcile_level(host, Some(&id), live, &children, patch);
            }

            if let Some(expanded) = expanded
                && host.is_expanded(&id) != expanded
            {
                host.set_expanded(&id, expanded);
                patch.push(if expanded {
                    Edit::Expand { id }
                } else {
                    Edit::Collapse { id }
                });
            }
        }
    }
}
