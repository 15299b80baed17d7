//! Layout errors.

use std::collections::TryReserveError;

use quill_dom::NodeId;
use thiserror::Error;

use crate::layout::box_tree::BoxId;

/// Errors surfaced by [`crate::layout_document`] and the box tree.
///
/// Precondition violations (splitting past the end of a box's text,
/// fitting a line that has no parent block) are programming errors and
/// panic instead.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The box arena could not grow.
    #[error("cannot allocate layout box: {0}")]
    Allocation(#[from] TryReserveError),

    /// A box that should carry geometry has none.
    #[error("box {0:?} has no resolved geometry")]
    MissingGeometry(BoxId),

    /// An element was reached that has no computed style.
    #[error("no computed style for node {0:?}")]
    MissingStyle(NodeId),

    /// The document has no element to lay out.
    #[error("document has no root element")]
    NoRootElement,
}
