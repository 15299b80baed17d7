//! CSS inline layout engine.
//!
//! Lays out a styled document into a tree of block, line and inline boxes
//! following the CSS 2.1 visual formatting model.
//!
//! # Relevant Specifications
//!
//! - [CSS 2.1 Visual Formatting Model](https://www.w3.org/TR/CSS2/visuren.html)
//! - [CSS 2.1 Visual Formatting Model Details](https://www.w3.org/TR/CSS2/visudet.html)
//! - [CSS 2.1 Text](https://www.w3.org/TR/CSS2/text.html)
//!
//! # Module Structure
//!
//! - [`box_model`] - Rectangles, edge sizes and blanks
//! - [`box_tree`] - The arena of block, line and inline boxes
//! - [`block`] - Block-level driver: widths, stacking, floats, anonymous blocks
//! - [`formatting_context`] - Per-block cursor, open line and float state
//! - [`text_layout`] - Breaking text into inline boxes across lines
//! - [`line_box`] - Shrink-to-fit, text-align gaps, vertical alignment
//! - [`inline_box`] - Splitting and trailing-space trimming
//! - [`float`] - Placed float bookkeeping
//! - [`text`] - Fonts, measurement and break opportunities
//! - [`dump`] - Debug dump of the box tree

pub mod block;
pub mod box_model;
pub mod box_tree;
pub mod dump;
pub mod float;
pub mod formatting_context;
pub mod inline_box;
pub mod line_box;
pub mod text;
pub mod text_layout;

use serde::{Deserialize, Serialize};

// Re-exports for convenience
pub use block::{LayoutCx, Sizing, layout_block_box, layout_document};
pub use box_model::{Blanks, EdgeSizes, Rect};
pub use box_tree::{BlockBox, BoxFlags, BoxId, BoxKind, BoxTree, LayoutBox};
pub use dump::{DumpOptions, TreeDump, dump};
pub use float::{FloatContext, FloatSide};
pub use formatting_context::{FormattingContext, collapse_two_margins};
pub use inline_box::InlineBox;
pub use line_box::LineBox;
pub use text::{ActiveFont, FixedAdvanceFont, FontMetrics, SimpleTextOracle, TextOracle, measure_text};
pub use text_layout::{OverflowAction, OverflowProbe, TextLayout, TextSource, decide_overflow, lay_out_text};

/// Settings for one layout pass.
///
/// Scene files carry these under `"viewport"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LayoutConfig {
    /// Width of the initial containing block.
    pub viewport_width: f32,
    /// Height of the initial containing block. Layout does not clip to it.
    pub viewport_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
        }
    }
}
