//! The outline controller.
//!
//! [`OutlineController`] owns the host, the previously rendered snapshot, the
//! selection tracker and the drag coordinator. Callers hand it snapshots with
//! [`update_data`](OutlineController::update_data) and forward host callbacks
//! (selection changed, expand, collapse, drag and drop) to it; it answers with
//! signals carrying records.
//!
//! # Example
//!
//! ```
//! use canopy::{OutlineConfig, OutlineController};
//! use canopy::host::RowLookup;
//! use canopy::model::{OutlineRecord, Projection};
//!
//! #[derive(Clone)]
//! struct File {
//!     name: &'static str,
//!     children: Option<Vec<File>>,
//! }
//!
//! impl OutlineRecord for File {
//!     type Id = &'static str;
//!     fn id(&self) -> &'static str {
//!         self.name
//!     }
//! }
//!
//! let projection = Projection::new(|f: &File| f.children.clone());
//! let mut outline = OutlineController::new(projection, OutlineConfig::default());
//!
//! outline.update_data([
//!     File { name: "src", children: Some(vec![File { name: "lib.rs", children: None }]) },
//!     File { name: "Cargo.toml", children: None },
//! ]);
//! assert_eq!(outline.host().row_count(), 2);
//!
//! outline.expand_item_at(0);
//! assert_eq!(outline.host().visible_ids(), vec!["src", "lib.rs", "Cargo.toml"]);
//! ```

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use canopy_core::logging::{span_names, targets};
use canopy_core::{PerfSpan, Result, Signal};

use super::live_rows::{LiveRows, RowChange};
use super::recycle::{EdgeInsets, RowChrome, ViewPool};
use super::traits::{OutlineHost, RowLookup, UpdateGuard};
use crate::config::{OutlineConfig, SeparatorVisibility};
use crate::drag_drop::{
    DragCoordinator, DropAction, DropIndex, DropOutcome, DropPolicy, DropSource, DroppedItem,
    ItemInfo, Pasteboard, TransferToken,
};
use crate::model::{Node, OutlineRecord, Projection, SelectionTracker};
use crate::reconcile::{Patch, Reconciler};

/// Type alias for a separator inset provider.
pub type SeparatorInsetsFn<R> = Arc<dyn Fn(&R) -> EdgeInsets + Send + Sync>;

/// What a renderer knows about the row it draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowContext {
    pub row: usize,
    pub depth: usize,
    pub expandable: bool,
    pub expanded: bool,
    pub selected: bool,
}

/// Produces the content view of a row.
pub trait RowRenderer<R> {
    /// The view type produced.
    type View;

    /// Renders `record` for the row described by `context`.
    fn render(&self, record: &R, context: &RowContext) -> Self::View;
}

impl<R, V, F> RowRenderer<R> for F
where
    F: Fn(&R, &RowContext) -> V,
{
    type View = V;

    fn render(&self, record: &R, context: &RowContext) -> V {
        self(record, context)
    }
}

/// Keeps a hierarchical list host in sync with caller snapshots.
///
/// # Signals
///
/// - `selection_changed`: The user changed the selection. Args: selected records
/// - `will_expand`, `did_expand`: A row is being / was expanded by the user
/// - `will_collapse`, `did_collapse`: A row is being / was collapsed by the user
/// - `hide_requested`: The hide command was issued
pub struct OutlineController<R: OutlineRecord, H = LiveRows<<R as OutlineRecord>::Id>>
where
    H: OutlineHost<R::Id>,
{
    host: H,
    config: OutlineConfig,
    projection: Arc<Projection<R>>,
    snapshot: Vec<Node<R>>,
    /// Every node of `snapshot` by identity, first occurrence wins.
    records: HashMap<R::Id, Node<R>>,
    reconciler: Reconciler,
    selection: SelectionTracker<R::Id>,
    drag: DragCoordinator,
    drop_policy: Option<Arc<dyn DropPolicy<R>>>,
    separator_insets: Option<SeparatorInsetsFn<R>>,
    chrome_pool: ViewPool<RowChrome>,

    /// Emitted when the user changed the selection.
    pub selection_changed: Signal<Vec<R>>,
    /// Emitted before a user expansion.
    pub will_expand: Signal<R>,
    /// Emitted after a user expansion.
    pub did_expand: Signal<R>,
    /// Emitted before a user collapse.
    pub will_collapse: Signal<R>,
    /// Emitted after a user collapse.
    pub did_collapse: Signal<R>,
    /// Emitted when the hide command is issued.
    pub hide_requested: Signal<()>,
}

impl<R: OutlineRecord> OutlineController<R> {
    /// Creates a controller over an in-memory [`LiveRows`] host.
    pub fn new(projection: Projection<R>, config: OutlineConfig) -> Self {
        Self::with_host(LiveRows::new(), projection, config)
    }

    /// Flat row changes committed by the host.
    pub fn rows_changed(&self) -> &Signal<Vec<RowChange>> {
        &self.host.rows_changed
    }

    /// Renders the live rows for debugging.
    pub fn debug_tree(&self) -> String {
        self.host.debug_tree()
    }
}

impl<R: OutlineRecord, H: OutlineHost<R::Id>> OutlineController<R, H> {
    /// Creates a controller over any host.
    pub fn with_host(host: H, projection: Projection<R>, config: OutlineConfig) -> Self {
        Self {
            host,
            reconciler: Reconciler::new().with_lazy_children(config.lazy_children),
            selection: SelectionTracker::new(config.selection_mode),
            drag: DragCoordinator::new(config.drag_drop_mode),
            projection: Arc::new(projection),
            snapshot: Vec::new(),
            records: HashMap::new(),
            drop_policy: None,
            separator_insets: None,
            chrome_pool: ViewPool::default(),
            config,
            selection_changed: Signal::new(),
            will_expand: Signal::new(),
            did_expand: Signal::new(),
            will_collapse: Signal::new(),
            did_collapse: Signal::new(),
            hide_requested: Signal::new(),
        }
    }

    /// Installs the drop policy. Without one every drop is refused.
    pub fn with_drop_policy(mut self, policy: impl DropPolicy<R> + 'static) -> Self {
        self.drop_policy = Some(Arc::new(policy));
        self
    }

    /// Installs the separator inset provider.
    pub fn with_separator_insets<F>(mut self, insets: F) -> Self
    where
        F: Fn(&R) -> EdgeInsets + Send + Sync + 'static,
    {
        self.separator_insets = Some(Arc::new(insets));
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Replaces the configuration. Takes effect from the next update.
    pub fn set_config(&mut self, config: OutlineConfig) {
        self.reconciler = Reconciler::new().with_lazy_children(config.lazy_children);
        self.selection.set_mode(config.selection_mode);
        self.drag.set_mode(config.drag_drop_mode);
        self.config = config;
    }

    /// Returns the last rendered snapshot.
    pub fn snapshot(&self) -> &[Node<R>] {
        &self.snapshot
    }

    /// Returns the desired selection.
    pub fn selected_ids(&self) -> &[R::Id] {
        self.selection.desired()
    }

    /// Returns the row chrome pool.
    pub fn chrome_pool(&self) -> &ViewPool<RowChrome> {
        &self.chrome_pool
    }

    /// Finds the record with identity `id` in the last snapshot.
    pub fn record(&self, id: &R::Id) -> Option<R> {
        self.records.get(id).map(|node| node.value().clone())
    }

    /// Returns the record shown by a visible row.
    pub fn record_at_row(&self, row: usize) -> Option<R> {
        self.record(&self.host.identity_at_row(row)?)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Renders a new snapshot and returns the edits applied to the host.
    ///
    /// The whole pass (structure, expansion and selection) is one host
    /// transaction.
    pub fn update_data(&mut self, records: impl IntoIterator<Item = R>) -> Patch<R::Id> {
        let _perf = PerfSpan::new(span_names::UPDATE);
        let new = self.projection.wrap_all(records);
        let mut index = HashMap::new();
        index_nodes(&new, &mut index);

        let patch = {
            let mut host = UpdateGuard::<R::Id, H>::new(&mut self.host);
            let patch = self
                .reconciler
                .reconcile(&self.snapshot, &new, None, &mut *host);

            if !self.selection.desired().is_empty() {
                self.selection.prune(|id| index.contains_key(id));
            }
            self.selection.apply(&mut *host);
            patch
        };
        self.snapshot = new;
        self.records = index;

        let purged = self.chrome_pool.purge();
        tracing::trace!(target: targets::HOST, purged, "purged idle row chrome");

        if self.config.verify_after_update
            && let Err(err) = self.host.verify()
        {
            tracing::error!(target: targets::HOST, %err, "live rows out of sync");
            debug_assert!(false, "live rows out of sync: {err}");
        }
        patch
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Replaces the selection with the given identities.
    ///
    /// Caller-driven; `selection_changed` is not emitted.
    pub fn set_selection(&mut self, ids: impl IntoIterator<Item = R::Id>) {
        self.selection.set_desired(ids);
        self.selection.apply(&mut self.host);
    }

    /// Replaces the selection with the given records.
    pub fn change_selected_items(&mut self, records: &[R]) {
        self.set_selection(records.iter().map(OutlineRecord::id));
    }

    /// Handles a selection change reported by the host.
    ///
    /// Returns the newly selected records, or `None` when the host merely
    /// shows the selection the controller asked for.
    pub fn handle_selection_did_change(&mut self) -> Option<Vec<R>> {
        let live = self.host.selected_rows();
        let ids = self.selection.observe(&live, &self.host)?;

        let records: Vec<R> = ids.iter().filter_map(|id| self.record(id)).collect();
        self.selection_changed.emit(records.clone());
        Some(records)
    }

    /// Selects rows as a user would, then handles the change.
    pub fn user_select_rows(&mut self, rows: impl IntoIterator<Item = usize>) -> Option<Vec<R>> {
        self.host.set_selected_rows(rows.into_iter().collect());
        self.handle_selection_did_change()
    }

    // =========================================================================
    // Expansion
    // =========================================================================

    /// Expands a row as a user would.
    ///
    /// Loads the row's children, writes the flag back to the expansion store
    /// and re-applies the selection if the host shows none afterwards.
    /// Returns false if nothing was expanded.
    pub fn expand_item(&mut self, id: &R::Id) -> bool {
        let Some(node) = self.records.get(id).cloned() else {
            return false;
        };
        if !node.is_expandable() || !self.host.contains(id) || self.host.is_expanded(id) {
            return false;
        }

        self.will_expand.emit(node.value().clone());
        {
            let mut host = UpdateGuard::<R::Id, H>::new(&mut self.host);
            self.reconciler.reconcile_children(&node, &mut *host);
            host.set_expanded(id, true);
        }
        node.projection().set_expanded(id, true);
        tracing::debug!(target: targets::HOST, ?id, "expanded");
        self.did_expand.emit(node.value().clone());

        if self.host.selected_rows().is_empty() {
            self.selection.apply(&mut self.host);
        }
        true
    }

    /// Expands the row at a visible position.
    pub fn expand_item_at(&mut self, row: usize) -> bool {
        match self.host.identity_at_row(row) {
            Some(id) => self.expand_item(&id),
            None => false,
        }
    }

    /// Collapses a row as a user would.
    ///
    /// If any selected row is hidden by the collapse, the collapsing row is
    /// selected instead. Returns false if nothing was collapsed.
    pub fn collapse_item(&mut self, id: &R::Id) -> bool {
        let Some(node) = self.records.get(id).cloned() else {
            return false;
        };
        if !self.host.is_expanded(id) {
            return false;
        }

        self.will_collapse.emit(node.value().clone());
        if let Some(row) = self.host.row_for_identity(id) {
            let hides_selection = self
                .host
                .selected_rows()
                .into_iter()
                .any(|selected| self.is_descendant_row(selected, id));
            if hides_selection {
                self.host.set_selected_rows(BTreeSet::from([row]));
                self.handle_selection_did_change();
            }
        }

        self.host.set_expanded(id, false);
        node.projection().set_expanded(id, false);
        tracing::debug!(target: targets::HOST, ?id, "collapsed");
        self.did_collapse.emit(node.value().clone());
        true
    }

    /// Collapses the row at a visible position.
    pub fn collapse_item_at(&mut self, row: usize) -> bool {
        match self.host.identity_at_row(row) {
            Some(id) => self.collapse_item(&id),
            None => false,
        }
    }

    // =========================================================================
    // Drag and drop
    // =========================================================================

    /// Starts dragging a visible row, or adds it to the drag in flight.
    pub fn begin_drag(&mut self, row: usize) -> Option<TransferToken> {
        self.drag.begin_drag(&self.host, row)
    }

    /// Writes the tokens of the drag in flight to a pasteboard.
    pub fn drag_pasteboard(&self) -> Result<Pasteboard> {
        Pasteboard::from_tokens(self.drag.active_tokens())
    }

    /// Returns true while a drag is in flight.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Discards the drag in flight.
    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Asks the drop policy what a drop onto `target` at `index` would do.
    pub fn validate_drop(
        &self,
        tokens: &[TransferToken],
        target: Option<&R::Id>,
        index: DropIndex,
    ) -> DropAction {
        let Some(policy) = &self.drop_policy else {
            return DropAction::NONE;
        };
        let Some(target) = self.resolve_target(target) else {
            return DropAction::NONE;
        };

        self.drag
            .validate_drop(&self.host, tokens, |sources| match self.dropped_items(sources) {
                Some(items) => policy.validate_drop(&items, target.as_ref(), index),
                None => DropAction::NONE,
            })
    }

    /// Performs a drop. Returns true if the drop policy carried it out.
    ///
    /// A drop whose row tokens no longer match the live rows is rejected
    /// without consulting the policy.
    pub fn accept_drop(
        &mut self,
        tokens: &[TransferToken],
        target: Option<&R::Id>,
        index: DropIndex,
    ) -> bool {
        let Some(policy) = self.drop_policy.clone() else {
            self.drag.cancel();
            return false;
        };
        let Some(target) = self.resolve_target(target) else {
            self.drag.cancel();
            return false;
        };

        let DropOutcome::Accepted(sources) = self.drag.accept_drop(&self.host, tokens) else {
            return false;
        };
        let Some(items) = self.dropped_items(&sources) else {
            return false;
        };
        policy.accept_drop(items, target.as_ref(), index)
    }

    /// Performs a drop read from a pasteboard.
    pub fn accept_pasteboard_drop(
        &mut self,
        pasteboard: &Pasteboard,
        target: Option<&R::Id>,
        index: DropIndex,
    ) -> Result<bool> {
        let tokens = pasteboard.tokens()?;
        Ok(self.accept_drop(&tokens, target, index))
    }

    /// Resolves a drop target: `Some(None)` for the top level, `None` when
    /// the target record is unknown.
    fn resolve_target(&self, target: Option<&R::Id>) -> Option<Option<R>> {
        match target {
            None => Some(None),
            Some(id) => self.record(id).map(Some),
        }
    }

    fn dropped_items(&self, sources: &[DropSource<R::Id>]) -> Option<Vec<DroppedItem<R>>> {
        sources
            .iter()
            .map(|source| match source {
                DropSource::Row {
                    id,
                    parent,
                    child_index,
                } => {
                    let item = self.record(id)?;
                    let parent = match parent {
                        Some(parent) => Some(self.record(parent)?),
                        None => None,
                    };
                    Some(DroppedItem::Row(ItemInfo {
                        item,
                        parent,
                        child_index: *child_index,
                    }))
                }
                DropSource::External(payload) => Some(DroppedItem::External(payload.clone())),
            })
            .collect()
    }

    // =========================================================================
    // Rows
    // =========================================================================

    /// Describes the record at a visible row, for context menus and the like.
    pub fn item_info_at(&self, row: usize) -> Option<ItemInfo<R>> {
        let id = self.host.identity_at_row(row)?;
        let parent = match self.host.parent_of(&id)? {
            Some(parent) => Some(self.record(&parent)?),
            None => None,
        };
        Some(ItemInfo {
            item: self.record(&id)?,
            parent,
            child_index: self.host.child_index_of(&id)?,
        })
    }

    /// Renders the content of a visible row.
    pub fn content_for_row<V: RowRenderer<R>>(&self, row: usize, renderer: &V) -> Option<V::View> {
        let id = self.host.identity_at_row(row)?;
        let record = self.record(&id)?;
        let context = RowContext {
            row,
            depth: self.depth_of(&id),
            expandable: self.host.is_expandable(&id),
            expanded: self.host.is_expanded(&id),
            selected: self.host.selected_rows().contains(&row),
        };
        Some(renderer.render(&record, &context))
    }

    /// Configures row chrome for a visible row, reusing idle chrome.
    pub fn row_chrome(&mut self, row: usize) -> Option<RowChrome> {
        let id = self.host.identity_at_row(row)?;
        let record = self.record(&id)?;
        let depth = self.depth_of(&id);

        let mut chrome = self.chrome_pool.dequeue(RowChrome::default);
        chrome.row = row;
        chrome.depth = depth;
        chrome.separator_visible = self.config.separator == SeparatorVisibility::Visible;
        chrome.separator_insets = self.separator_insets.as_ref().map(|insets| insets(&record));
        Some(chrome)
    }

    /// Hands row chrome back for reuse.
    pub fn recycle_row_chrome(&mut self, mut chrome: RowChrome) {
        chrome.reset();
        self.chrome_pool.recycle(chrome);
    }

    /// Width left for a row's content in a column of `column_width`, after
    /// indentation and the host's own horizontal inset.
    pub fn content_width(&self, row: usize, column_width: f32, horizontal_inset: f32) -> Option<f32> {
        let id = self.host.identity_at_row(row)?;
        let indent = self.depth_of(&id) as f32 * self.config.indentation;
        Some((column_width - indent - horizontal_inset).max(0.0))
    }

    /// Issues the hide command.
    pub fn request_hide(&self) {
        self.hide_requested.emit(());
    }

    fn depth_of(&self, id: &R::Id) -> usize {
        let mut depth = 0;
        let mut current = id.clone();
        while let Some(Some(parent)) = self.host.parent_of(&current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    fn is_descendant_row(&self, row: usize, ancestor: &R::Id) -> bool {
        let Some(mut current) = self.host.identity_at_row(row) else {
            return false;
        };
        while let Some(Some(parent)) = self.host.parent_of(&current) {
            if &parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }
}

fn index_nodes<R: OutlineRecord>(nodes: &[Node<R>], out: &mut HashMap<R::Id, Node<R>>) {
    for node in nodes {
        let children = node.children();
        out.entry(node.id()).or_insert_with(|| node.clone());
        if let Some(children) = children {
            index_nodes(&children, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag_drop::{DragDropMode, ExternalPayload};
    use crate::model::{ExpansionStore, MemoryExpansionStore, SelectionMode};
    use parking_lot::Mutex;

    #[derive(Clone, Debug, PartialEq)]
    struct File {
        name: &'static str,
        children: Option<Vec<File>>,
    }

    impl OutlineRecord for File {
        type Id = &'static str;

        fn id(&self) -> &'static str {
            self.name
        }
    }

    fn file(name: &'static str) -> File {
        File {
            name,
            children: None,
        }
    }

    fn dir(name: &'static str, children: Vec<File>) -> File {
        File {
            name,
            children: Some(children),
        }
    }

    fn tree() -> Vec<File> {
        vec![
            dir("src", vec![file("lib.rs"), dir("bin", vec![file("main.rs")])]),
            file("Cargo.toml"),
        ]
    }

    fn setup(
        config: OutlineConfig,
    ) -> (
        OutlineController<File>,
        Arc<MemoryExpansionStore<&'static str>>,
    ) {
        let store = Arc::new(MemoryExpansionStore::new(false));
        let projection =
            Projection::new(|f: &File| f.children.clone()).with_expansion(store.clone());
        let mut outline = OutlineController::new(projection, config);
        outline.update_data(tree());
        (outline, store)
    }

    fn record_names(signal: &Signal<File>) -> Arc<Mutex<Vec<&'static str>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        signal.connect(move |f: &File| log_clone.lock().push(f.name));
        log
    }

    #[test]
    fn test_expand_writes_back_and_notifies() {
        let (mut outline, store) = setup(OutlineConfig::default());
        let will = record_names(&outline.will_expand);
        let did = record_names(&outline.did_expand);

        assert!(outline.expand_item_at(0));
        assert_eq!(
            outline.host().visible_ids(),
            vec!["src", "lib.rs", "bin", "Cargo.toml"]
        );
        assert!(store.is_expanded(&"src"));
        assert_eq!(*will.lock(), vec!["src"]);
        assert_eq!(*did.lock(), vec!["src"]);

        assert!(!outline.expand_item_at(0));
        assert!(!outline.expand_item_at(1));
    }

    #[test]
    fn test_next_update_keeps_user_expansion() {
        let (mut outline, _store) = setup(OutlineConfig::default());
        outline.expand_item(&"src");

        let patch = outline.update_data(tree());
        assert!(patch.is_empty(), "unexpected edits {patch:?}");
        assert!(outline.host().is_expanded(&"src"));
    }

    #[test]
    fn test_collapse_moves_selection_to_parent() {
        let (mut outline, store) = setup(OutlineConfig::default());
        outline.expand_item(&"src");
        outline.set_selection(["lib.rs"]);

        let changes = Arc::new(Mutex::new(Vec::new()));
        let changes_clone = changes.clone();
        outline.selection_changed.connect(move |files: &Vec<File>| {
            changes_clone
                .lock()
                .push(files.iter().map(|f| f.name).collect::<Vec<_>>())
        });

        assert!(outline.collapse_item_at(0));
        assert_eq!(outline.host().selected_rows(), BTreeSet::from([0]));
        assert_eq!(outline.selected_ids(), &["src"]);
        assert_eq!(*changes.lock(), vec![vec!["src"]]);
        assert!(!store.is_expanded(&"src"));
    }

    #[test]
    fn test_did_expand_reapplies_selection() {
        let (mut outline, _store) = setup(OutlineConfig::default());
        outline.set_selection(["bin"]);
        assert!(outline.host().selected_rows().is_empty());

        outline.expand_item(&"src");
        assert_eq!(outline.host().selected_rows(), BTreeSet::from([2]));
    }

    #[test]
    fn test_user_selection_is_reported_once() {
        let (mut outline, _store) = setup(OutlineConfig::default());
        let selected = outline.user_select_rows([1]).unwrap();
        assert_eq!(selected, vec![file("Cargo.toml")]);

        assert_eq!(outline.handle_selection_did_change(), None);
    }

    #[test]
    fn test_single_selection_mode() {
        let config = OutlineConfig::default().with_selection_mode(SelectionMode::Single);
        let (mut outline, _store) = setup(config);
        outline.set_selection(["Cargo.toml", "src"]);
        assert_eq!(outline.host().selected_rows(), BTreeSet::from([0]));
    }

    #[test]
    fn test_update_prunes_vanished_selection() {
        let (mut outline, _store) = setup(OutlineConfig::default());
        outline.set_selection(["Cargo.toml", "main.rs"]);

        outline.update_data(vec![dir("src", vec![file("lib.rs")])]);
        assert!(outline.selected_ids().is_empty());
        assert!(outline.host().selected_rows().is_empty());
    }

    #[test]
    fn test_records_come_from_latest_snapshot() {
        let (mut outline, _store) = setup(OutlineConfig::default());
        assert_eq!(outline.record(&"main.rs"), Some(file("main.rs")));
        assert!(outline.record(&"build.rs").is_none());

        outline.update_data(vec![
            dir("src", vec![dir("bin", vec![])]),
            dir("Cargo.toml", vec![]),
            file("build.rs"),
        ]);
        assert!(outline.record(&"main.rs").is_none());
        assert_eq!(outline.record(&"Cargo.toml"), Some(dir("Cargo.toml", vec![])));
        assert_eq!(outline.record_at_row(2), Some(file("build.rs")));
        assert!(!outline.expand_item(&"lib.rs"));
    }

    #[test]
    fn test_item_info() {
        let (mut outline, _store) = setup(OutlineConfig::default());
        outline.expand_item(&"src");

        let info = outline.item_info_at(2).unwrap();
        assert_eq!(info.item.name, "bin");
        assert_eq!(info.parent.map(|p| p.name), Some("src"));
        assert_eq!(info.child_index, 1);

        let top = outline.item_info_at(3).unwrap();
        assert!(top.parent.is_none());
        assert!(outline.item_info_at(9).is_none());
    }

    #[test]
    fn test_content_and_chrome() {
        let config = OutlineConfig::default()
            .with_separator(SeparatorVisibility::Visible)
            .with_indentation(10.0);
        let (outline, _store) = setup(config);
        let mut outline =
            outline.with_separator_insets(|f: &File| EdgeInsets::horizontal(f.name.len() as f32, 0.0));
        outline.expand_item(&"src");

        let label = outline
            .content_for_row(1, &|f: &File, ctx: &RowContext| format!("{}@{}", f.name, ctx.depth))
            .unwrap();
        assert_eq!(label, "lib.rs@1");

        let chrome = outline.row_chrome(1).unwrap();
        assert_eq!(chrome.depth, 1);
        assert!(chrome.separator_visible);
        assert_eq!(chrome.separator_insets, Some(EdgeInsets::horizontal(6.0, 0.0)));

        outline.recycle_row_chrome(chrome);
        assert_eq!(outline.chrome_pool().len(), 1);
        outline.update_data(tree());
        assert!(outline.chrome_pool().is_empty());

        assert_eq!(outline.content_width(1, 100.0, 9.0), Some(81.0));
    }

    #[test]
    fn test_hide_command() {
        let (outline, _store) = setup(OutlineConfig::default());
        let hits = Arc::new(Mutex::new(0));
        let hits_clone = hits.clone();
        outline.hide_requested.connect(move |_| *hits_clone.lock() += 1);

        outline.request_hide();
        assert_eq!(*hits.lock(), 1);
    }

    struct Recorder {
        accepted: Arc<Mutex<Vec<(Vec<String>, Option<&'static str>, DropIndex)>>>,
    }

    impl DropPolicy<File> for Recorder {
        fn validate_drop(
            &self,
            sources: &[DroppedItem<File>],
            target: Option<&File>,
            _index: DropIndex,
        ) -> DropAction {
            let onto_self = sources.iter().any(|s| match s {
                DroppedItem::Row(info) => Some(&info.item) == target,
                DroppedItem::External(_) => false,
            });
            if onto_self {
                DropAction::NONE
            } else {
                DropAction::MOVE
            }
        }

        fn accept_drop(
            &self,
            sources: Vec<DroppedItem<File>>,
            target: Option<&File>,
            index: DropIndex,
        ) -> bool {
            let names = sources
                .iter()
                .map(|s| match s {
                    DroppedItem::Row(info) => info.item.name.to_string(),
                    DroppedItem::External(ExternalPayload::Uri(uri)) => uri.clone(),
                    DroppedItem::External(ExternalPayload::Bytes { mime, .. }) => mime.clone(),
                })
                .collect();
            self.accepted.lock().push((names, target.map(|t| t.name), index));
            true
        }
    }

    #[test]
    fn test_drop_without_policy_is_refused() {
        let config = OutlineConfig::default().with_drag_drop_mode(DragDropMode::DragDrop);
        let (mut outline, _store) = setup(config);
        let token = outline.begin_drag(1).unwrap();
        assert!(outline.validate_drop(std::slice::from_ref(&token), None, DropIndex::At(0)).is_none());
        assert!(!outline.accept_drop(&[token], None, DropIndex::At(0)));
        assert!(!outline.is_dragging());
    }

    #[test]
    fn test_drop_through_pasteboard() {
        let config = OutlineConfig::default().with_drag_drop_mode(DragDropMode::DragDrop);
        let (outline, _store) = setup(config);
        let accepted = Arc::new(Mutex::new(Vec::new()));
        let mut outline = outline.with_drop_policy(Recorder {
            accepted: accepted.clone(),
        });

        outline.begin_drag(1).unwrap();
        let mut pasteboard = outline.drag_pasteboard().unwrap();
        pasteboard.push(crate::drag_drop::mime::TEXT_URI_LIST, "file:///tmp/notes.md");

        let tokens = pasteboard.tokens().unwrap();
        assert_eq!(
            outline.validate_drop(&tokens, Some(&"src"), DropIndex::OnItem),
            DropAction::MOVE
        );
        assert!(outline
            .validate_drop(&tokens, Some(&"Cargo.toml"), DropIndex::OnItem)
            .is_none());

        assert!(outline
            .accept_pasteboard_drop(&pasteboard, Some(&"src"), DropIndex::At(0))
            .unwrap());
        assert_eq!(
            *accepted.lock(),
            vec![(
                vec!["Cargo.toml".to_string(), "file:///tmp/notes.md".to_string()],
                Some("src"),
                DropIndex::At(0)
            )]
        );
        assert!(!outline.is_dragging());
    }

    #[test]
    fn test_unknown_drop_target_is_refused() {
        let config = OutlineConfig::default().with_drag_drop_mode(DragDropMode::DragDrop);
        let (outline, _store) = setup(config);
        let accepted = Arc::new(Mutex::new(Vec::new()));
        let mut outline = outline.with_drop_policy(Recorder {
            accepted: accepted.clone(),
        });

        let token = outline.begin_drag(0).unwrap();
        assert!(!outline.accept_drop(&[token], Some(&"ghost"), DropIndex::OnItem));
        assert!(accepted.lock().is_empty());
    }
}
