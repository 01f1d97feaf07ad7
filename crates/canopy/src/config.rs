//! Outline configuration.
//!
//! [`OutlineConfig`] collects the knobs of an outline controller. It can be
//! built in code with the `with_*` methods or loaded from TOML:
//!
//! ```toml
//! selection_mode = "single"
//! drag_drop_mode = "internal_move"
//! lazy_children = true
//! indentation = 16.0
//! separator = "visible"
//! ```
//!
//! Missing keys take their default value. Unknown keys are an error.

use std::path::Path;

use canopy_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::drag_drop::DragDropMode;
use crate::model::SelectionMode;

/// Whether row separators are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeparatorVisibility {
    /// No separators.
    #[default]
    Hidden,
    /// A separator under every row.
    Visible,
}

/// Configuration of an outline controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutlineConfig {
    /// How many rows may be selected.
    pub selection_mode: SelectionMode,
    /// Which drag and drop gestures are enabled.
    pub drag_drop_mode: DragDropMode,
    /// Leave never-expanded subtrees unloaded.
    pub lazy_children: bool,
    /// Horizontal indentation per nesting level, in logical pixels.
    pub indentation: f32,
    /// Whether row separators are drawn.
    pub separator: SeparatorVisibility,
    /// Check the live rows for consistency after every update.
    pub verify_after_update: bool,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            selection_mode: SelectionMode::default(),
            drag_drop_mode: DragDropMode::default(),
            lazy_children: true,
            indentation: 13.0,
            separator: SeparatorVisibility::default(),
            verify_after_update: cfg!(debug_assertions),
        }
    }
}

impl OutlineConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config_parse(e.to_string()))
    }

    /// Loads a configuration from a TOML file.
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::config_io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config_parse(e.to_string()))
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Sets the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Sets the drag and drop mode.
    pub fn with_drag_drop_mode(mut self, mode: DragDropMode) -> Self {
        self.drag_drop_mode = mode;
        self
    }

    /// Sets whether never-expanded subtrees stay unloaded.
    pub fn with_lazy_children(mut self, lazy: bool) -> Self {
        self.lazy_children = lazy;
        self
    }

    /// Sets the indentation per level.
    pub fn with_indentation(mut self, indentation: f32) -> Self {
        self.indentation = indentation.max(0.0);
        self
    }

    /// Sets separator visibility.
    pub fn with_separator(mut self, separator: SeparatorVisibility) -> Self {
        self.separator = separator;
        self
    }

    /// Sets whether the live rows are checked after every update.
    pub fn with_verify_after_update(mut self, verify: bool) -> Self {
        self.verify_after_update = verify;
        self
    }
}
