//! Drag and drop for outline rows.
//!
//! A drag captures each dragged row as an opaque [`TransferToken`] holding its
//! visible row position and the host's structure generation at drag start.
//! Tokens travel through a [`Pasteboard`] and are resolved back to
//! `(item, parent, child index)` when the drop lands. Anything that changed
//! the row structure in between makes the drop rejected instead of resolving
//! to the wrong row.
//!
//! Payloads dragged in from outside the outline (file URIs, raw bytes) are
//! passed through to the caller unchanged.
//!
//! # Example
//!
//! ```
//! use canopy::drag_drop::{DragCoordinator, DragDropMode, DropOutcome};
//! use canopy::host::{LiveRows, OutlineHost, RowSpec};
//!
//! let mut rows = LiveRows::new();
//! rows.insert_row(None, 0, RowSpec::new("m", false));
//!
//! let mut drag = DragCoordinator::new(DragDropMode::DragDrop);
//! let token = drag.begin_drag(&rows, 0).unwrap();
//!
//! // An unrelated update removes the dragged row before the drop.
//! rows.remove_row(None, 0);
//! assert_eq!(drag.accept_drop(&rows, &[token]), DropOutcome::Rejected);
//! ```

use canopy_core::logging::targets;
use canopy_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::host::RowLookup;
use crate::model::OutlineRecord;

/// MIME types used on the pasteboard.
pub mod mime {
    /// An in-outline row token.
    pub const ROW_TOKEN: &str = "application/x-canopy-row";
    /// URI list (file paths and URLs).
    pub const TEXT_URI_LIST: &str = "text/uri-list";
    /// Raw bytes of unknown type.
    pub const OCTET_STREAM: &str = "application/octet-stream";

    /// Types the pasteboard reads back as something other than raw bytes.
    pub fn is_reserved(mime: &str) -> bool {
        matches!(mime, ROW_TOKEN | TEXT_URI_LIST)
    }
}

/// Actions that can be performed by a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DropAction(u8);

impl DropAction {
    /// Drop not allowed.
    pub const NONE: Self = Self(0);
    /// Copy the dragged records.
    pub const COPY: Self = Self(1 << 0);
    /// Move the dragged records.
    pub const MOVE: Self = Self(1 << 1);
    /// Link to the dragged records.
    pub const LINK: Self = Self(1 << 2);
    /// Copy, move and link.
    pub const ALL: Self = Self(Self::COPY.0 | Self::MOVE.0 | Self::LINK.0);

    /// Returns true if no action is allowed.
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Returns true if this action set contains another action.
    pub fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Returns the preferred action from this set.
    ///
    /// Priority: Move > Copy > Link > None. Reordering rows is the common
    /// case inside an outline.
    pub fn preferred(self) -> Self {
        if self.contains(Self::MOVE) {
            Self::MOVE
        } else if self.contains(Self::COPY) {
            Self::COPY
        } else if self.contains(Self::LINK) {
            Self::LINK
        } else {
            Self::NONE
        }
    }
}

impl std::ops::BitOr for DropAction {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for DropAction {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

/// Which drag and drop gestures an outline takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragDropMode {
    /// No drag or drop.
    #[default]
    None,
    /// Rows can be dragged out, nothing can be dropped.
    DragOnly,
    /// Drops are accepted, rows cannot be dragged.
    DropOnly,
    /// Rows can be dragged and anything can be dropped.
    DragDrop,
    /// Only rows of this outline can be dropped back into it.
    InternalMove,
}

impl DragDropMode {
    /// Returns true if rows may be dragged.
    pub fn can_drag(self) -> bool {
        matches!(self, Self::DragOnly | Self::DragDrop | Self::InternalMove)
    }

    /// Returns true if drops are accepted at all.
    pub fn accepts_drops(self) -> bool {
        matches!(self, Self::DropOnly | Self::DragDrop | Self::InternalMove)
    }

    /// Returns true if payloads from outside the outline are accepted.
    pub fn accepts_external(self) -> bool {
        matches!(self, Self::DropOnly | Self::DragDrop)
    }
}

/// Where under the target parent a drop lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropIndex {
    /// Onto the target row itself.
    OnItem,
    /// Between children, before the child currently at this index.
    At(usize),
}

impl DropIndex {
    /// Converts a host drop index, where any negative value means "on the
    /// item".
    pub fn from_raw(index: isize) -> Self {
        usize::try_from(index).map_or(Self::OnItem, Self::At)
    }
}

/// Data dragged in from outside the outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExternalPayload {
    /// A URI, usually a file URL.
    Uri(String),
    /// Raw bytes of the given MIME type.
    Bytes { mime: String, data: Vec<u8> },
}

/// Opaque reference to a dragged row or an external payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferToken {
    /// A visible row, captured at drag start.
    Row { row: usize, generation: u64 },
    /// An external payload.
    External(ExternalPayload),
}

impl TransferToken {
    /// Creates a token for an external URI.
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::External(ExternalPayload::Uri(uri.into()))
    }

    /// Returns true if the token came from outside the outline.
    pub fn is_external(&self) -> bool {
        matches!(self, Self::External(_))
    }

    /// Serializes the token for the pasteboard.
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| Error::transfer_token(e.to_string()))
    }

    /// Reads back a token written by [`encode`](Self::encode).
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| Error::transfer_token(e.to_string()))
    }
}

/// One entry on the pasteboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteboardItem {
    /// MIME type of `data`.
    pub mime: String,
    /// Raw contents.
    pub data: Vec<u8>,
}

/// Ordered pasteboard entries of one drag, one per dragged item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pasteboard {
    items: Vec<PasteboardItem>,
}

impl Pasteboard {
    /// Creates an empty pasteboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes tokens in order.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a TransferToken>) -> Result<Self> {
        let mut pasteboard = Self::new();
        for token in tokens {
            pasteboard.push_token(token)?;
        }
        Ok(pasteboard)
    }

    /// Appends a raw entry.
    pub fn push(&mut self, mime: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.items.push(PasteboardItem {
            mime: mime.into(),
            data: data.into(),
        });
    }

    /// Appends a token. Row tokens are written under [`mime::ROW_TOKEN`],
    /// external payloads under their own type.
    ///
    /// Raw bytes claiming a [reserved](mime::is_reserved) type are an error,
    /// since they would read back as a different token.
    pub fn push_token(&mut self, token: &TransferToken) -> Result<()> {
        match token {
            TransferToken::Row { .. } => self.push(mime::ROW_TOKEN, token.encode()?),
            TransferToken::External(ExternalPayload::Uri(uri)) => {
                self.push(mime::TEXT_URI_LIST, uri.as_bytes())
            }
            TransferToken::External(ExternalPayload::Bytes { mime: kind, .. })
                if mime::is_reserved(kind) =>
            {
                return Err(Error::transfer_token(format!(
                    "raw payload uses reserved type {kind}"
                )));
            }
            TransferToken::External(ExternalPayload::Bytes { mime, data }) => {
                self.push(mime.clone(), data.clone())
            }
        }
        Ok(())
    }

    /// Returns the entries in order.
    pub fn items(&self) -> &[PasteboardItem] {
        &self.items
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Reads every entry back as a token. Anything that is not a row token is
    /// an external payload.
    pub fn tokens(&self) -> Result<Vec<TransferToken>> {
        self.items
            .iter()
            .map(|item| match item.mime.as_str() {
                mime::ROW_TOKEN => TransferToken::decode(&item.data),
                mime::TEXT_URI_LIST => String::from_utf8(item.data.clone())
                    .map(TransferToken::uri)
                    .map_err(|e| Error::transfer_token(e.to_string())),
                other => Ok(TransferToken::External(ExternalPayload::Bytes {
                    mime: other.to_string(),
                    data: item.data.clone(),
                })),
            })
            .collect()
    }
}

/// A drop source resolved against the live rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropSource<K> {
    /// A row of this outline.
    Row {
        id: K,
        parent: Option<K>,
        child_index: usize,
    },
    /// An external payload, unchanged.
    External(ExternalPayload),
}

/// Result of resolving the tokens of a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome<K> {
    /// Every token resolved. Sources are in token order.
    Accepted(Vec<DropSource<K>>),
    /// At least one token no longer points at the row it was captured from,
    /// or the mode refuses the drop.
    Rejected,
}

impl<K> DropOutcome<K> {
    /// Returns true if the drop was rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// A record with its position in the tree.
#[derive(Debug, Clone)]
pub struct ItemInfo<R> {
    /// The record shown by the row.
    pub item: R,
    /// Its parent record, `None` at the top level.
    pub parent: Option<R>,
    /// Index among the parent's children.
    pub child_index: usize,
}

/// A dropped item handed to a [`DropPolicy`].
#[derive(Debug, Clone)]
pub enum DroppedItem<R> {
    /// A row of this outline.
    Row(ItemInfo<R>),
    /// An external payload.
    External(ExternalPayload),
}

/// Caller-supplied decision and effect of drops.
///
/// The outline never mutates records itself. Accepting a drop means the
/// caller rearranges its data and hands over a new snapshot.
pub trait DropPolicy<R: OutlineRecord>: Send + Sync {
    /// Returns the action a drop would perform, [`DropAction::NONE`] to refuse.
    fn validate_drop(
        &self,
        sources: &[DroppedItem<R>],
        target: Option<&R>,
        index: DropIndex,
    ) -> DropAction;

    /// Performs the drop. Returns false if nothing happened.
    fn accept_drop(
        &self,
        sources: Vec<DroppedItem<R>>,
        target: Option<&R>,
        index: DropIndex,
    ) -> bool;
}

/// Tracks the active drag and resolves drops.
#[derive(Debug, Default)]
pub struct DragCoordinator {
    mode: DragDropMode,
    active: Vec<TransferToken>,
}

impl DragCoordinator {
    /// Creates a coordinator.
    pub fn new(mode: DragDropMode) -> Self {
        Self {
            mode,
            active: Vec::new(),
        }
    }

    /// Returns the drag and drop mode.
    pub fn mode(&self) -> DragDropMode {
        self.mode
    }

    /// Changes the drag and drop mode.
    pub fn set_mode(&mut self, mode: DragDropMode) {
        self.mode = mode;
    }

    /// Returns true while a drag started here is in flight.
    pub fn is_dragging(&self) -> bool {
        !self.active.is_empty()
    }

    /// Tokens of the drag in flight.
    pub fn active_tokens(&self) -> &[TransferToken] {
        &self.active
    }

    /// Adds a visible row to the drag in flight and returns its token.
    ///
    /// Returns `None` if the mode forbids dragging or the row does not exist.
    pub fn begin_drag<K, L: RowLookup<K> + ?Sized>(
        &mut self,
        lookup: &L,
        row: usize,
    ) -> Option<TransferToken> {
        if !self.mode.can_drag() || row >= lookup.row_count() {
            return None;
        }

        let token = TransferToken::Row {
            row,
            generation: lookup.structure_generation(),
        };
        tracing::debug!(target: targets::DRAG, ?token, "drag started");
        self.active.push(token.clone());
        Some(token)
    }

    /// Discards the drag in flight.
    pub fn cancel(&mut self) {
        if !self.active.is_empty() {
            tracing::debug!(target: targets::DRAG, tokens = self.active.len(), "drag cancelled");
        }
        self.active.clear();
    }

    /// Resolves tokens against the live rows without touching any state.
    pub fn resolve<K, L: RowLookup<K> + ?Sized>(
        &self,
        lookup: &L,
        tokens: &[TransferToken],
    ) -> DropOutcome<K> {
        if tokens.is_empty() || !self.mode.accepts_drops() {
            return DropOutcome::Rejected;
        }

        let generation = lookup.structure_generation();
        let mut sources = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token {
                TransferToken::External(payload) => {
                    if !self.mode.accepts_external() {
                        return DropOutcome::Rejected;
                    }
                    sources.push(DropSource::External(payload.clone()));
                }
                TransferToken::Row {
                    row,
                    generation: captured,
                } => {
                    if *captured != generation {
                        tracing::debug!(
                            target: targets::DRAG,
                            row,
                            captured,
                            generation,
                            "stale drag token"
                        );
                        return DropOutcome::Rejected;
                    }
                    let Some(source) = Self::resolve_row(lookup, *row) else {
                        return DropOutcome::Rejected;
                    };
                    sources.push(source);
                }
            }
        }
        DropOutcome::Accepted(sources)
    }

    /// Decides the action for a proposed drop.
    ///
    /// `decide` receives the resolved sources and is only called when every
    /// token still resolves.
    pub fn validate_drop<K, L: RowLookup<K> + ?Sized>(
        &self,
        lookup: &L,
        tokens: &[TransferToken],
        decide: impl FnOnce(&[DropSource<K>]) -> DropAction,
    ) -> DropAction {
        match self.resolve(lookup, tokens) {
            DropOutcome::Accepted(sources) => decide(&sources),
            DropOutcome::Rejected => DropAction::NONE,
        }
    }

    /// Resolves the tokens of a landed drop and ends the drag in flight.
    pub fn accept_drop<K, L: RowLookup<K> + ?Sized>(
        &mut self,
        lookup: &L,
        tokens: &[TransferToken],
    ) -> DropOutcome<K> {
        let outcome = self.resolve(lookup, tokens);
        match &outcome {
            DropOutcome::Accepted(sources) => {
                tracing::debug!(target: targets::DRAG, sources = sources.len(), "drop accepted")
            }
            DropOutcome::Rejected => tracing::debug!(target: targets::DRAG, "drop rejected"),
        }
        self.active.clear();
        outcome
    }

    fn resolve_row<K, L: RowLookup<K> + ?Sized>(lookup: &L, row: usize) -> Option<DropSource<K>> {
        let id = lookup.identity_at_row(row)?;
        let parent = lookup.parent_of(&id)?;
        let child_index = lookup.child_index_of(&id)?;
        Some(DropSource::Row {
            id,
            parent,
            child_index,
        })
    }
}
