//! Logging and debugging facilities for Horizon TreeSelect.
//!
//! - Target names for filtering the `tracing` output of each subsystem
//! - A text renderer for trees ([`TreeDebugFormatter`])
//! - Timed spans around expensive operations ([`PerfSpan`])
//!
//! # Tracing Integration
//!
//! Nothing is printed unless the application installs a subscriber:
//!
//! ```no_run
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_treeselect::selection=debug")
//!     .init();
//! ```
//!
//! # Debug Visualization
//!
//! ```
//! use horizon_treeselect_core::logging::{DebugTreeNode, TreeDebugFormatter, TreeFormatOptions};
//!
//! struct Leaf(&'static str);
//!
//! impl DebugTreeNode for Leaf {
//!     fn label(&self) -> String {
//!         self.0.to_string()
//!     }
//!     fn children(&self) -> Vec<&dyn DebugTreeNode> {
//!         Vec::new()
//!     }
//! }
//!
//! let output = TreeDebugFormatter::with_options(TreeFormatOptions::minimal()).format(&Leaf("root"));
//! assert_eq!(output, "root\n");
//! ```

use std::time::Instant;

/// Target names for log filtering.
pub mod targets {
    /// Signal/slot system.
    pub const SIGNAL: &str = "horizon_treeselect_core::signal";
    /// Property writes.
    pub const PROPERTY: &str = "horizon_treeselect_core::property";
    /// Timings recorded by [`PerfSpan`](super::PerfSpan).
    pub const PERF: &str = "horizon_treeselect::perf";
    /// Selection model operations (select, deselect, clear).
    pub const SELECTION: &str = "horizon_treeselect::selection";
    /// Batch begin/end and commit.
    pub const BATCH: &str = "horizon_treeselect::batch";
    /// Structural change reaction (shifts, removals, resets).
    pub const STRUCTURE: &str = "horizon_treeselect::structure";
    /// Item sources.
    pub const SOURCE: &str = "horizon_treeselect::source";
}

/// Glyph set used to draw tree branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// `|`, `+--` and `` `-- ``.
    Ascii,
    /// Box-drawing characters.
    #[default]
    Unicode,
}

impl TreeStyle {
    /// (vertical guide, branch, last branch)
    fn glyphs(self) -> (&'static str, &'static str, &'static str) {
        match self {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
        }
    }
}

/// Configuration for tree debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// Branch glyphs.
    pub style: TreeStyle,
    /// Whether to print each node's detail lines.
    pub show_details: bool,
    /// Deepest level to print, the root being level 0 (`None` for all).
    pub max_depth: Option<usize>,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_details: true,
            max_depth: None,
        }
    }
}

impl TreeFormatOptions {
    /// Options printing everything.
    pub fn detailed() -> Self {
        Self::default()
    }

    /// Options printing labels only.
    pub fn minimal() -> Self {
        Self {
            show_details: false,
            ..Default::default()
        }
    }
}

/// A node that can be rendered by [`TreeDebugFormatter`].
pub trait DebugTreeNode {
    /// One-line label for this node.
    fn label(&self) -> String;

    /// Extra lines printed under the label when details are enabled.
    fn details(&self) -> Vec<String> {
        Vec::new()
    }

    /// Children in display order.
    fn children(&self) -> Vec<&dyn DebugTreeNode>;
}

/// Renders a [`DebugTreeNode`] hierarchy as indented text, one node per line.
#[derive(Debug, Clone, Default)]
pub struct TreeDebugFormatter {
    options: TreeFormatOptions,
}

impl TreeDebugFormatter {
    /// Create a formatter with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with custom options.
    pub fn with_options(options: TreeFormatOptions) -> Self {
        Self { options }
    }

    /// Format the tree rooted at `root`.
    pub fn format(&self, root: &dyn DebugTreeNode) -> String {
        let mut output = String::new();
        output.push_str(&root.label());
        output.push('\n');
        self.write_details(root, "", &mut output);
        self.write_children(root, "", 0, &mut output);
        output
    }

    fn write_details(&self, node: &dyn DebugTreeNode, prefix: &str, output: &mut String) {
        if !self.options.show_details {
            return;
        }
        for line in node.details() {
            output.push_str(prefix);
            output.push_str("  ");
            output.push_str(&line);
            output.push('\n');
        }
    }

    fn write_children(&self, node: &dyn DebugTreeNode, prefix: &str, depth: usize, output: &mut String) {
        if self.options.max_depth.is_some_and(|max| depth >= max) {
            return;
        }
        let (guide, branch, last_branch) = self.options.style.glyphs();
        let children = node.children();
        let count = children.len();
        for (i, child) in children.into_iter().enumerate() {
            let is_last = i + 1 == count;
            output.push_str(prefix);
            output.push_str(if is_last { last_branch } else { branch });
            output.push(' ');
            output.push_str(&child.label());
            output.push('\n');

            let child_prefix = if is_last {
                format!("{prefix}    ")
            } else {
                format!("{prefix}{guide}   ")
            };
            self.write_details(child, &child_prefix, output);
            self.write_children(child, &child_prefix, depth + 1, output);
        }
    }
}

/// Keeps a `debug` span entered and logs the elapsed time when dropped.
#[derive(Debug)]
pub struct PerfSpan {
    operation: &'static str,
    started: Instant,
    _span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enters a span named after `operation`.
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation);
        Self {
            operation,
            started: Instant::now(),
            _span: span.entered(),
        }
    }
}

impl Drop for PerfSpan {
    fn drop(&mut self) {
        let elapsed_us = self.started.elapsed().as_micros();
        tracing::debug!(target: targets::PERF, operation = self.operation, elapsed_us, "done");
    }
}
