//! The host side of the outline.
//!
//! - [`OutlineHost`] and [`RowLookup`]: what a hierarchical list control must
//!   offer for the outline to drive it
//! - [`LiveRows`]: an in-memory control used headless and in tests
//! - [`OutlineController`]: keeps a host in sync with caller snapshots and
//!   turns host callbacks into record-level signals
//! - [`ViewPool`] and [`RowChrome`]: per-row decoration and its reuse

mod adapter;
mod live_rows;
mod recycle;
mod traits;

pub use adapter::{OutlineController, RowContext, RowRenderer, SeparatorInsetsFn};
pub use live_rows::{LiveRows, RowChange, RowKey};
pub use recycle::{EdgeInsets, RowChrome, ViewPool};
pub use traits::{OutlineHost, RowLookup, RowSpec, UpdateGuard};
