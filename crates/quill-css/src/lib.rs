//! Style facade, inline formatting and line breaking for the Quill layout engine.
//!
//! # Scope
//!
//! This crate implements:
//! - **Style facade** ([§ 6 Assigning property values](https://www.w3.org/TR/CSS2/cascade.html))
//!   - Declared and computed values, inheritance
//!   - `::first-line` and `::first-letter` declarations
//!   - White-space processing ([§ 16.6](https://www.w3.org/TR/CSS2/text.html#white-space-prop))
//!
//! - **Block layout** ([§ 9.4.1](https://www.w3.org/TR/CSS2/visuren.html#block-formatting))
//!   - Width resolution, shrink-to-fit for floats and inline-blocks
//!   - Sibling margin collapsing
//!   - Anonymous block boxes around inline runs
//!
//! - **Inline layout** ([§ 9.4.2](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting))
//!   - Line breaking at text boundaries, splitting inline boxes
//!   - Trailing-space trimming
//!   - Floats beside lines, shifting lines below floats
//!   - `text-align` gaps and `vertical-align`
//!
//! # Not Yet Implemented
//!
//! - Selector matching and the cascade (styles are given per element)
//! - `text-align: justify` (laid out as `left`)
//! - `clear`, relative positioning offsets, painting

/// Layout errors.
pub mod error;
/// Box tree and layout algorithms per [CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html).
pub mod layout;
/// Declared and computed style per [CSS 2.1 § 6](https://www.w3.org/TR/CSS2/cascade.html).
pub mod style;

// Re-exports for convenience
pub use error::LayoutError;
pub use layout::{
    BoxId, BoxKind, BoxTree, DumpOptions, FixedAdvanceFont, LayoutBox, LayoutConfig, SimpleTextOracle,
    TextOracle, dump, layout_document,
};
pub use style::{ComputedStyle, StyleDeclaration, StyleMap, compute_styles};
