//! Identity-bearing node wrapper.
//!
//! A [`Node`] wraps one caller-owned record together with the projection used
//! to reach its children and its persisted expansion flag. Two nodes are equal
//! when their record identities are equal, whatever their content, which is
//! what lets the reconciler treat "same item, new content" as a match.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::expansion::ExpansionStore;

/// A record that can be displayed in an outline.
///
/// Identities must be unique among siblings and stable across snapshots for
/// any record that should keep its row. Records are cloned freely, so large
/// records are usually wrapped in an `Arc`.
///
/// # Example
///
/// ```
/// use canopy::model::OutlineRecord;
///
/// #[derive(Clone)]
/// struct FileItem {
///     id: u64,
///     name: String,
///     children: Option<Vec<FileItem>>,
/// }
///
/// impl OutlineRecord for FileItem {
///     type Id = u64;
///
///     fn id(&self) -> u64 {
///         self.id
///     }
/// }
/// ```
pub trait OutlineRecord: Clone + Send + Sync + 'static {
    /// The identity type of this record.
    type Id: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// Returns the stable identity of this record.
    fn id(&self) -> Self::Id;
}

/// Type alias for a child accessor.
///
/// Returning `None` marks the record as not expandable; `Some(vec![])` is an
/// expandable record that currently has no children.
pub type ChildrenFn<R> = Arc<dyn Fn(&R) -> Option<Vec<R>> + Send + Sync>;

/// The two projections a tree supplier hands over with its records.
pub struct Projection<R: OutlineRecord> {
    children: ChildrenFn<R>,
    expansion: Option<Arc<dyn ExpansionStore<R::Id>>>,
}

impl<R: OutlineRecord> Projection<R> {
    /// Creates a projection from a child accessor. Without an expansion store
    /// nodes carry no expansion flag and the host keeps whatever the user did.
    pub fn new<F>(children: F) -> Self
    where
        F: Fn(&R) -> Option<Vec<R>> + Send + Sync + 'static,
    {
        Self {
            children: Arc::new(children),
            expansion: None,
        }
    }

    /// Attaches the persisted expansion flags.
    pub fn with_expansion(mut self, store: Arc<dyn ExpansionStore<R::Id>>) -> Self {
        self.expansion = Some(store);
        self
    }

    /// Returns the expansion store, if any.
    pub fn expansion(&self) -> Option<&Arc<dyn ExpansionStore<R::Id>>> {
        self.expansion.as_ref()
    }

    /// Reads the persisted flag for `id`, or `None` without a store.
    pub fn is_expanded(&self, id: &R::Id) -> Option<bool> {
        self.expansion.as_ref().map(|store| store.is_expanded(id))
    }

    /// Writes the persisted flag for `id`. No-op without a store.
    pub fn set_expanded(&self, id: &R::Id, expanded: bool) {
        if let Some(store) = &self.expansion {
            store.set_expanded(id, expanded);
        }
    }

    /// Wraps a sequence of records into top-level nodes.
    pub fn wrap_all(self: &Arc<Self>, records: impl IntoIterator<Item = R>) -> Vec<Node<R>> {
        records
            .into_iter()
            .map(|record| Node::new(record, self.clone()))
            .collect()
    }
}

impl<R: OutlineRecord> Clone for Projection<R> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
            expansion: self.expansion.clone(),
        }
    }
}

/// The engine's wrapper around one record at one level of the tree.
pub struct Node<R: OutlineRecord> {
    value: R,
    projection: Arc<Projection<R>>,
}

impl<R: OutlineRecord> Node<R> {
    /// Wraps a record.
    pub fn new(value: R, projection: Arc<Projection<R>>) -> Self {
        Self { value, projection }
    }

    /// Returns the record identity.
    pub fn id(&self) -> R::Id {
        self.value.id()
    }

    /// Returns the wrapped record.
    pub fn value(&self) -> &R {
        &self.value
    }

    /// Consumes the node, returning the record.
    pub fn into_value(self) -> R {
        self.value
    }

    /// Returns the projection this node was built with.
    pub fn projection(&self) -> &Arc<Projection<R>> {
        &self.projection
    }

    /// Re-wraps the record's current children.
    ///
    /// Computed on every call so it always reflects the latest record state.
    pub fn children(&self) -> Option<Vec<Node<R>>> {
        (self.projection.children)(&self.value).map(|children| {
            children
                .into_iter()
                .map(|child| Node::new(child, self.projection.clone()))
                .collect()
        })
    }

    /// Returns true if the record has a child list, even an empty one.
    pub fn is_expandable(&self) -> bool {
        (self.projection.children)(&self.value).is_some()
    }

    /// Reads the persisted expansion flag, if the projection has a store.
    pub fn is_expanded(&self) -> Option<bool> {
        self.projection.is_expanded(&self.id())
    }
}

impl<R: OutlineRecord> Clone for Node<R> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            projection: self.projection.clone(),
        }
    }
}

impl<R: OutlineRecord> PartialEq for Node<R> {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl<R: OutlineRecord> Eq for Node<R> {}

impl<R: OutlineRecord> Hash for Node<R> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl<R: OutlineRecord> fmt::Debug for Node<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("id", &self.id()).finish()
    }
}

/// Finds the node with identity `id` anywhere below `nodes`, depth first.
pub fn find_node<R: OutlineRecord>(nodes: &[Node<R>], id: &R::Id) -> Option<Node<R>> {
    for node in nodes {
        if &node.id() == id {
            return Some(node.clone());
        }
        if let Some(children) = node.children()
            && let Some(found) = find_node(&children, id)
        {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::expansion::MemoryExpansionStore;
    use parking_lot::RwLock;
    use std::collections::HashSet;

    #[derive(Clone)]
    struct Item {
        id: u32,
        label: String,
        children: Option<Vec<Item>>,
    }

    impl OutlineRecord for Item {
        type Id = u32;

        fn id(&self) -> u32 {
            self.id
        }
    }

    fn item(id: u32, label: &str, children: Option<Vec<Item>>) -> Item {
        Item {
            id,
            label: label.into(),
            children,
        }
    }

    fn projection() -> Arc<Projection<Item>> {
        Arc::new(Projection::new(|item: &Item| item.children.clone()))
    }

    #[test]
    fn test_equality_is_identity_only() {
        let projection = projection();
        let a = Node::new(item(1, "before", None), projection.clone());
        let b = Node::new(item(1, "after", Some(vec![])), projection.clone());
        let c = Node::new(item(2, "before", None), projection);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(b.value().label, "after");

        let set: HashSet<Node<Item>> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_children_absent_vs_empty() {
        let projection = projection();
        let leaf = Node::new(item(1, "leaf", None), projection.clone());
        let folder = Node::new(item(2, "folder", Some(vec![])), projection);

        assert!(leaf.children().is_none());
        assert!(!leaf.is_expandable());
        assert_eq!(folder.children().map(|c| c.len()), Some(0));
        assert!(folder.is_expandable());
    }

    #[test]
    fn test_children_are_not_cached() {
        #[derive(Clone)]
        struct Shared {
            id: u32,
            children: Arc<RwLock<Vec<Shared>>>,
        }

        impl OutlineRecord for Shared {
            type Id = u32;

            fn id(&self) -> u32 {
                self.id
            }
        }

        let children = Arc::new(RwLock::new(Vec::new()));
        let root = Shared {
            id: 1,
            children: children.clone(),
        };
        let projection = Arc::new(Projection::new(|s: &Shared| Some(s.children.read().clone())));
        let node = Node::new(root, projection);

        assert_eq!(node.children().unwrap().len(), 0);
        children.write().push(Shared {
            id: 2,
            children: Arc::new(RwLock::new(Vec::new())),
        });
        assert_eq!(node.children().unwrap()[0].id(), 2);
    }

    #[test]
    fn test_expansion_flag_projection() {
        let store = Arc::new(MemoryExpansionStore::<u32>::new(false));
        store.set_expanded(&2, true);
        let projection = Arc::new(
            Projection::new(|item: &Item| item.children.clone()).with_expansion(store.clone()),
        );

        let nodes = projection.wrap_all([item(1, "a", Some(vec![])), item(2, "b", Some(vec![]))]);
        assert_eq!(nodes[0].is_expanded(), Some(false));
        assert_eq!(nodes[1].is_expanded(), Some(true));

        projection.set_expanded(&1, true);
        assert_eq!(nodes[0].is_expanded(), Some(true));
    }

    #[test]
    fn test_no_store_has_no_flag() {
        let node = Node::new(item(1, "a", Some(vec![])), projection());
        assert_eq!(node.is_expanded(), None);
        node.projection().set_expanded(&1, true);
        assert_eq!(node.is_expanded(), None);
    }

    #[test]
    fn test_find_node_descends() {
        let tree = vec![
            item(1, "doc", None),
            item(
                2,
                "users",
                Some(vec![item(3, "alice", Some(vec![item(4, "photos", Some(vec![]))]))]),
            ),
        ];
        let nodes = projection().wrap_all(tree);

        assert_eq!(find_node(&nodes, &4).map(|n| n.value().label.clone()), Some("photos".into()));
        assert!(find_node(&nodes, &9).is_none());
    }
}
