//! Structural reconciliation of tree snapshots.
//!
//! Given the previously rendered snapshot and a new one, the [`Reconciler`]
//! computes the minimal insert, remove and move edits per hierarchy level and
//! applies them to an [`OutlineHost`](crate::host::OutlineHost) as it goes.
//!
//! # Edit Order
//!
//! At each level:
//!
//! 1. Removes, by descending index
//! 2. Moves, keeping the longest run of matched rows that are already in
//!    order in place
//! 3. Inserts, by ascending index
//!
//! The reconciler then visits each new node: it updates the row's disclosure
//! state, recurses into children the host has loaded (or must load because the
//! node is to be expanded), and finally applies the persisted expansion flag
//! when the projection carries one.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use canopy::host::LiveRows;
//! use canopy::model::{OutlineRecord, Projection};
//! use canopy::reconcile::Reconciler;
//!
//! #[derive(Clone)]
//! struct Tag(&'static str);
//!
//! impl OutlineRecord for Tag {
//!     type Id = &'static str;
//!     fn id(&self) -> &'static str {
//!         self.0
//!     }
//! }
//!
//! let projection = Arc::new(Projection::new(|_: &Tag| None));
//! let old = projection.wrap_all([Tag("a"), Tag("b"), Tag("c")]);
//! let new = projection.wrap_all([Tag("b"), Tag("c"), Tag("a")]);
//!
//! let mut host = LiveRows::new();
//! let reconciler = Reconciler::new();
//! reconciler.reconcile(&[], &old, None, &mut host);
//!
//! let patch = reconciler.reconcile(&old, &new, None, &mut host);
//! assert_eq!(patch.move_count(), 1);
//! assert_eq!(patch.structural_count(), 1);
//! assert_eq!(host.visible_ids(), vec!["b", "c", "a"]);
//! ```

mod diff;
mod engine;
mod patch;

pub use diff::{LevelDiff, LevelMove, apply_level, diff_level};
pub use engine::Reconciler;
pub use patch::{Edit, Patch};
