//! The caller side of the outline.
//!
//! Callers own their records. The outline only sees them through an
//! [`OutlineRecord`] identity, a child accessor and an optional
//! [`ExpansionStore`], bundled as a [`Projection`]. Each snapshot is wrapped
//! into [`Node`]s, which compare by identity alone.
//!
//! The [`SelectionTracker`] holds the selection as identities so it survives
//! structural edits.

mod expansion;
mod node;
mod selection;

pub use expansion::{ExpansionStore, MemoryExpansionStore};
pub use node::{ChildrenFn, Node, OutlineRecord, Projection, find_node};
pub use selection::{SelectionMode, SelectionTracker};
