//! Human-readable box tree dump for debugging.
//!
//! One box per line, indented by depth:
//!
//! ```text
//! * block <p> (8, 8) 200x36 m[0 0 0 0] b[0 0 0 0] p[0 0 0 0]
//!   * line (8, 8) 200x18 baseline=14 gaps=0/40
//!     * inline "The quick brown " (8, 8) 160x18 baseline=14
//! ```
//!
//! The format is a debugging aid and may change.

use std::fmt;

use quill_dom::DomTree;

use crate::style::Visibility;

use super::box_model::EdgeSizes;
use super::box_tree::{BoxId, BoxKind, BoxTree};

/// How much to print per box.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DumpOptions {
    /// Add box ids, flags, vertical offsets and the minimum content width.
    pub verbose: bool,
}

/// A box tree paired with its document, printable with `{}`.
#[derive(Debug, Clone, Copy)]
pub struct TreeDump<'a> {
    tree: &'a BoxTree,
    dom: &'a DomTree,
    options: DumpOptions,
}

impl<'a> TreeDump<'a> {
    /// Dump `tree`, naming elements from `dom`.
    #[must_use]
    pub const fn new(tree: &'a BoxTree, dom: &'a DomTree, options: DumpOptions) -> Self {
        Self { tree, dom, options }
    }

    fn write_box(&self, f: &mut fmt::Formatter<'_>, id: BoxId, indent: usize) -> fmt::Result {
        let b = self.tree.get(id);
        let prefix = "  ".repeat(indent);
        match &b.kind {
            BoxKind::Block(state) => {
                let name = match b.node.and_then(|n| self.dom.tag_name(n)) {
                    Some(tag) => format!("<{tag}>"),
                    None if b.is_anonymous() => "(anonymous)".to_string(),
                    None => "(generated)".to_string(),
                };
                write!(f, "{prefix}* block {name}")?;
                if let Some(side) = b.float_side() {
                    write!(f, " float-{side}")?;
                }
                if b.is_absolutely_positioned() {
                    write!(f, " absolute")?;
                }
                write!(
                    f,
                    " ({}, {}) {}x{} m{} b{} p{}",
                    b.x,
                    b.y,
                    b.width,
                    b.height,
                    edges(&b.blanks.margin),
                    edges(&b.blanks.border),
                    edges(&b.blanks.padding)
                )?;
                if self.options.verbose {
                    write!(f, " mcw={}", state.mcw)?;
                }
            }
            BoxKind::Line(state) => {
                write!(
                    f,
                    "{prefix}* line ({}, {}) {}x{} baseline={} gaps={}/{}",
                    b.x, b.y, b.width, b.height, state.baseline, state.left_gap, state.right_gap
                )?;
                if self.options.verbose {
                    write!(
                        f,
                        " underline={}/{} line-through={}/{} floats-beside={}/{}",
                        state.underline_position,
                        state.underline_thickness,
                        state.line_through_position,
                        state.line_through_thickness,
                        b.blanks.margin.left,
                        b.blanks.margin.right
                    )?;
                }
            }
            BoxKind::Inline(state) => {
                let text = state.data.replace('\n', "\\n");
                write!(
                    f,
                    "{prefix}* inline \"{text}\" ({}, {}) {}x{} baseline={}",
                    b.x, b.y, b.width, b.height, state.baseline
                )?;
                if b.blank_left() != 0.0 || b.blank_right() != 0.0 {
                    write!(f, " blanks={}/{}", b.blank_left(), b.blank_right())?;
                }
                if b.style.visibility != Visibility::Visible {
                    write!(f, " {}", b.style.visibility)?;
                }
                if self.options.verbose {
                    write!(f, " leading={} wrap={}", state.leading, state.wrap)?;
                }
            }
        }
        if self.options.verbose {
            write!(f, " #{} flags={:?} offset_v={}", id.0, b.flags, b.offset_v)?;
        }
        writeln!(f)?;

        for &child in self.tree.children(id) {
            self.write_box(f, child, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.root() {
            Some(root) => self.write_box(f, root, 0),
            None => writeln!(f, "(empty box tree)"),
        }
    }
}

/// `[top right bottom left]`
fn edges(e: &EdgeSizes) -> String {
    format!("[{} {} {} {}]", e.top, e.right, e.bottom, e.left)
}

/// Render `tree` as text.
#[must_use]
pub fn dump(tree: &BoxTree, dom: &DomTree, options: DumpOptions) -> String {
    TreeDump::new(tree, dom, options).to_string()
}
