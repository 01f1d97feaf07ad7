//! Row chrome and its recycling pool.
//!
//! Row chrome is the per-row decoration drawn around the content view: the
//! separator line and its insets. Chrome objects are reused across rows
//! through a [`ViewPool`]; the adapter purges the pool's idle entries after
//! every update so chrome configured for vanished records does not linger.

/// Insets of a separator line, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl EdgeInsets {
    /// Creates insets from all four edges.
    pub fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// Creates horizontal-only insets.
    pub fn horizontal(left: f32, right: f32) -> Self {
        Self::new(0.0, left, 0.0, right)
    }
}

/// Decoration of one row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RowChrome {
    /// Row the chrome is currently configured for.
    pub row: usize,
    /// Nesting depth of the row.
    pub depth: usize,
    /// Whether the separator is drawn.
    pub separator_visible: bool,
    /// Separator insets; `None` uses the host default.
    pub separator_insets: Option<EdgeInsets>,
}

impl RowChrome {
    /// Returns the chrome to its unconfigured state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// A stack of idle objects available for reuse.
#[derive(Debug)]
pub struct ViewPool<V> {
    idle: Vec<V>,
    max_idle: usize,
    created: usize,
}

impl<V> Default for ViewPool<V> {
    fn default() -> Self {
        Self::new(64)
    }
}

impl<V> ViewPool<V> {
    /// Creates a pool that keeps at most `max_idle` idle objects.
    pub fn new(max_idle: usize) -> Self {
        Self {
            idle: Vec::new(),
            max_idle,
            created: 0,
        }
    }

    /// Takes an idle object, or creates one with `make`.
    pub fn dequeue(&mut self, make: impl FnOnce() -> V) -> V {
        match self.idle.pop() {
            Some(view) => view,
            None => {
                self.created += 1;
                make()
            }
        }
    }

    /// Returns an object to the pool. Objects beyond the idle limit are
    /// dropped.
    pub fn recycle(&mut self, view: V) {
        if self.idle.len() < self.max_idle {
            self.idle.push(view);
        }
    }

    /// Drops every idle object and returns how many there were.
    pub fn purge(&mut self) -> usize {
        let purged = self.idle.len();
        self.idle.clear();
        purged
    }

    /// Number of idle objects.
    pub fn len(&self) -> usize {
        self.idle.len()
    }

    /// Returns true if there are no idle objects.
    pub fn is_empty(&self) -> bool {
        self.idle.is_empty()
    }

    /// Number of objects created by [`dequeue`](Self::dequeue) so far.
    pub fn created(&self) -> usize {
        self.created
    }
}
