//! Core systems for canopy.
//!
//! This crate provides the foundational pieces the outline layer is built on:
//!
//! - **Signal/Slot System**: type-safe notifications from the adapter to the caller
//! - **Logging**: tracing targets, span names and a tree debug formatter
//! - **Errors**: the crate-wide error type
//!
//! # Signal/Slot Example
//!
//! ```
//! use canopy_core::Signal;
//!
//! let did_expand = Signal::<String>::new();
//!
//! let conn_id = did_expand.connect(|id| {
//!     println!("expanded {}", id);
//! });
//!
//! did_expand.emit("users".to_string());
//! did_expand.disconnect(conn_id);
//! ```

mod error;
pub mod logging;
pub mod signal;

pub use error::{Error, Result};
pub use logging::{DebugTree, PerfSpan, TreeFormatOptions, TreeFormatter, TreeStyle};
pub use signal::{ConnectionId, Signal};
