//! Tree rendering with ASCII/Unicode connectors.
//!
//! Used for the tier listing and the impact breakdown:
//!
//! ```text
//! ◆ proj.sales.orders
//! ├── tier -1 (2)
//! │   ├── proj.raw.orders
//! │   └── proj.raw.customers
//! └── tier 1 (1)
//!     └── proj.mart.daily_revenue
//! ```

use std::io::{self, Write};

use colored::Colorize;

use super::OutputConfig;
use super::color::colorize_id;

/// A node in a rendered tree.
#[derive(Debug, Clone, Default)]
pub(crate) struct TreeNode {
    /// Main text, already styled
    pub text: String,
    /// Trailing annotation, rendered dimmed
    pub note: Option<String>,
    /// Child nodes
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub(crate) fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub(crate) fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub(crate) fn with_children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }
}

/// Render a tree whose root is an asset ID.
pub(crate) fn write_tree<W: Write>(
    w: &mut W,
    root_id: &str,
    children: &[TreeNode],
    config: &OutputConfig,
) -> io::Result<()> {
    let root_icon = if config.use_ascii { "*" } else { "◆" };
    let root_icon_str = if config.use_colors {
        root_icon.cyan().bold().to_string()
    } else {
        root_icon.to_string()
    };

    writeln!(w, "{} {}", root_icon_str, colorize_id(root_id, config))?;
    write_children(w, children, &[], config)
}

/// `prefix_segments` tracks which ancestor levels still have siblings below.
fn write_children<W: Write>(
    w: &mut W,
    children: &[TreeNode],
    prefix_segments: &[bool],
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, child) in children.iter().enumerate() {
        let is_last = i + 1 == children.len();

        let mut prefix = String::new();
        for &has_more in prefix_segments {
            prefix.push_str(&styled_connector(if has_more { pipe } else { space }, config));
        }
        let connector = styled_connector(if is_last { corner } else { branch }, config);

        let note = child
            .note
            .as_deref()
            .map(|note| {
                let text = format!(" ({note})");
                if config.use_colors {
                    text.dimmed().to_string()
                } else {
                    text
                }
            })
            .unwrap_or_default();

        writeln!(w, "{prefix}{connector}{}{note}", child.text)?;

        if !child.children.is_empty() {
            let mut next_segments = prefix_segments.to_vec();
            next_segments.push(!is_last);
            write_children(w, &child.children, &next_segments, config)?;
        }
    }

    Ok(())
}

fn styled_connector(segment: &str, config: &OutputConfig) -> String {
    if config.use_colors {
        segment.dimmed().to_string()
    } else {
        segment.to_string()
    }
}
