//! Logging and debugging facilities for canopy.
//!
//! This module provides:
//! - Target names for filtering canopy's `tracing` output by subsystem
//! - A tree formatter for dumping live outline state while debugging
//! - A performance span guard for timing reconciliation passes
//!
//! # Tracing Integration
//!
//! canopy only emits events; install a subscriber in the host application to
//! see them:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("canopy::reconcile=debug,canopy::drag=trace")
//!     .init();
//! ```

use std::fmt::Write as FmtWrite;

/// Span names used throughout canopy for tracing.
pub mod span_names {
    /// One full reconciliation pass.
    pub const RECONCILE: &str = "canopy::reconcile";
    /// One snapshot update through the adapter.
    pub const UPDATE: &str = "canopy::update";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "canopy_core::signal";
    /// Reconciliation engine target.
    pub const RECONCILE: &str = "canopy::reconcile";
    /// Selection tracker target.
    pub const SELECTION: &str = "canopy::selection";
    /// Drag and drop coordinator target.
    pub const DRAG: &str = "canopy::drag";
    /// Host adapter and live row mirror target.
    pub const HOST: &str = "canopy::host";
    /// Performance spans.
    pub const PERF: &str = "canopy::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-dash representation.
    Compact,
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Options using plain ASCII connectors, handy in test assertions.
    pub fn ascii() -> Self {
        Self {
            style: TreeStyle::Ascii,
            ..Default::default()
        }
    }

    /// Limits traversal depth.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// A tree that can be rendered by [`TreeFormatter`].
pub trait DebugTree {
    /// Handle identifying one node of the tree.
    type Node: Copy;

    /// Top-level nodes in order.
    fn roots(&self) -> Vec<Self::Node>;

    /// Child nodes in order. Nodes without loaded children return an empty list.
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// One-line label for a node.
    fn label(&self, node: Self::Node) -> String;
}

/// Renders a [`DebugTree`] as indented text.
#[derive(Debug, Clone, Default)]
pub struct TreeFormatter {
    options: TreeFormatOptions,
}

impl TreeFormatter {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format every root of the tree.
    pub fn format<T: DebugTree>(&self, tree: &T) -> String {
        let mut output = String::new();
        let roots = tree.roots();
        if roots.is_empty() {
            output.push_str("(empty)\n");
            return output;
        }

        let count = roots.len();
        let mut rails = Vec::new();
        for (i, root) in roots.into_iter().enumerate() {
            self.format_subtree_into(tree, root, 0, i + 1 == count, &mut rails, &mut output);
        }
        output
    }

    /// `rails[k]` is true while the ancestor at depth `k + 1` has siblings
    /// still to come, which is when its vertical connector continues.
    fn format_subtree_into<T: DebugTree>(
        &self,
        tree: &T,
        node: T::Node,
        depth: usize,
        is_last: bool,
        rails: &mut Vec<bool>,
        output: &mut String,
    ) {
        if let Some(max) = self.options.max_depth
            && depth > max
        {
            return;
        }

        let prefix = self.build_prefix(rails, depth, is_last);
        writeln!(output, "{}{}", prefix, tree.label(node)).expect("write to String");

        let children = tree.children(node);
        let child_count = children.len();
        if depth > 0 {
            rails.push(!is_last);
        }
        for (i, child) in children.into_iter().enumerate() {
            self.format_subtree_into(tree, child, depth + 1, i + 1 == child_count, rails, output);
        }
        if depth > 0 {
            rails.pop();
        }
    }

    fn build_prefix(&self, rails: &[bool], depth: usize, is_last: bool) -> String {
        if depth == 0 {
            return String::new();
        }

        let (branch, corner, last) = match self.options.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };
        let gap = " ".repeat(branch.chars().count() + self.options.indent_size);

        let mut prefix = String::new();
        for &open in rails {
            if open {
                prefix.push_str(branch);
                prefix.push_str(&" ".repeat(self.options.indent_size));
            } else {
                prefix.push_str(&gap);
            }
        }

        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        // (label, children)
        nodes: Vec<(&'static str, Vec<usize>)>,
        roots: Vec<usize>,
    }

    impl DebugTree for Fixture {
        type Node = usize;

        fn roots(&self) -> Vec<usize> {
            self.roots.clone()
        }

        fn children(&self, node: usize) -> Vec<usize> {
            self.nodes[node].1.clone()
        }

        fn label(&self, node: usize) -> String {
            self.nodes[node].0.to_string()
        }
    }

    fn fixture() -> Fixture {
        Fixture {
            nodes: vec![
                ("users", vec![1, 2]),
                ("alice", vec![3]),
                ("bob", vec![]),
                ("photos", vec![]),
                ("notes.txt", vec![]),
            ],
            roots: vec![0, 4],
        }
    }

    #[test]
    fn test_format_empty() {
        let tree = Fixture {
            nodes: Vec::new(),
            roots: Vec::new(),
        };
        assert_eq!(TreeFormatter::new().format(&tree), "(empty)\n");
    }

    #[test]
    fn test_format_ascii_hierarchy() {
        let output = TreeFormatter::with_options(TreeFormatOptions::ascii()).format(&fixture());
        let expected = "users\n+-- alice\n|  `-- photos\n`-- bob\nnotes.txt\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_last_branch_has_no_rail() {
        let tree = Fixture {
            nodes: vec![
                ("users", vec![1, 2]),
                ("alice", vec![]),
                ("bob", vec![3]),
                ("music", vec![4]),
                ("song.mp3", vec![]),
            ],
            roots: vec![0],
        };
        let output = TreeFormatter::with_options(TreeFormatOptions::ascii()).format(&tree);
        let expected = "users\n+-- alice\n`-- bob\n   `-- music\n      `-- song.mp3\n";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_format_max_depth() {
        let options = TreeFormatOptions::ascii().with_max_depth(0);
        let output = TreeFormatter::with_options(options).format(&fixture());
        assert_eq!(output, "users\nnotes.txt\n");
    }

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new("test_operation");
    }
}
