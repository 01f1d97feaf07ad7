//! Canopy - keeps a hierarchical list control in sync with tree snapshots.
//!
//! Callers hand the outline an immutable snapshot of their records whenever
//! their data changes. The outline diffs it against what the control shows,
//! applies the minimal insert, remove and move edits level by level, restores
//! each record's persisted expansion state and keeps the selection attached
//! to record identities across structural changes. User actions on the control
//! (selection, expand, collapse, drag and drop) come back as record-level
//! signals and policy calls.
//!
//! # Modules
//!
//! - [`model`]: records, snapshots, expansion flags, selection by identity
//! - [`reconcile`]: the per-level diff and the recursive reconciler
//! - [`host`]: the control abstraction, an in-memory control and the controller
//! - [`drag_drop`]: transfer tokens, pasteboards and drop policies
//! - [`config`]: TOML-loadable configuration
//!
//! # Example
//!
//! ```
//! use canopy::{OutlineConfig, OutlineController};
//! use canopy::host::RowLookup;
//! use canopy::model::{OutlineRecord, Projection};
//!
//! #[derive(Clone)]
//! struct Task {
//!     id: u32,
//!     subtasks: Vec<Task>,
//! }
//!
//! impl OutlineRecord for Task {
//!     type Id = u32;
//!     fn id(&self) -> u32 {
//!         self.id
//!     }
//! }
//!
//! let projection = Projection::new(|t: &Task| {
//!     (!t.subtasks.is_empty()).then(|| t.subtasks.clone())
//! });
//! let mut outline = OutlineController::new(projection, OutlineConfig::default());
//!
//! let leaf = |id| Task { id, subtasks: vec![] };
//! outline.update_data([leaf(1), leaf(2), leaf(3)]);
//! outline.set_selection([2]);
//!
//! let patch = outline.update_data([leaf(3), leaf(1), leaf(2)]);
//! assert_eq!(patch.move_count(), 1);
//! assert_eq!(outline.record_at_row(2).map(|t| t.id), Some(2));
//! assert!(outline.host().selected_rows().contains(&2));
//! ```

pub mod config;
pub mod drag_drop;
pub mod host;
pub mod model;
pub mod reconcile;

pub use canopy_core::{ConnectionId, DebugTree, Error, PerfSpan, Result, Signal};

pub use config::{OutlineConfig, SeparatorVisibility};
pub use drag_drop::{DragDropMode, DropAction, DropIndex, DropPolicy, TransferToken};
pub use host::{LiveRows, OutlineController, OutlineHost, RowLookup};
pub use model::{OutlineRecord, Projection, SelectionMode};
pub use reconcile::{Patch, Reconciler};
