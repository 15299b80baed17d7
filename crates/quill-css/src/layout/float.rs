//! CSS Float bookkeeping for one block's inline formatting context.
//!
//! [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
//!
//! "A float is a box that is shifted to the left or right on the current line.
//! The most interesting characteristic of a float is that content may flow along
//! its side."
//!
//! Where a float lands horizontally is decided by the line box that consumes
//! it; this module only remembers the margin boxes of floats already placed
//! so later lines can be shortened around them.

use serde::Serialize;
use strum_macros::Display;

use super::box_model::Rect;

/// [§ 9.5 Floats](https://www.w3.org/TR/CSS2/visuren.html#floats)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FloatSide {
    /// "The element generates a block box that is floated to the left."
    Left,
    /// "The element generates a block box that is floated to the right."
    Right,
}

/// A single float that has been placed in the flow.
#[derive(Debug, Clone, Copy)]
pub struct PlacedFloat {
    /// Which side this float is on.
    pub side: FloatSide,
    /// The margin box of the float, relative to the block's content box.
    pub margin_box: Rect,
}

/// Tracks placed floats within a block.
///
/// "The current and subsequent line boxes created next to the float are
/// shortened as necessary to make room for the margin box of the float."
#[derive(Debug, Clone)]
pub struct FloatContext {
    floats: Vec<PlacedFloat>,
    /// Width of the containing block.
    pub containing_width: f32,
}

impl FloatContext {
    /// Create a new float context for a containing block.
    #[must_use]
    pub const fn new(containing_width: f32) -> Self {
        Self {
            floats: Vec::new(),
            containing_width,
        }
    }

    /// Returns true if there are no placed floats in this context.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.floats.is_empty()
    }

    /// All placed floats in placement order.
    #[must_use]
    pub fn placed(&self) -> &[PlacedFloat] {
        &self.floats
    }

    /// Record a float whose margin box has been decided.
    pub fn add(&mut self, side: FloatSide, margin_box: Rect) {
        self.floats.push(PlacedFloat { side, margin_box });
    }

    /// Return the maximum bottom edge of all placed floats.
    ///
    /// [§ 10.6.7](https://www.w3.org/TR/CSS2/visudet.html#root-height)
    ///
    /// "If the element has any floating descendants whose bottom margin edge
    /// is below the element's bottom content edge, then the height is
    /// increased to include those edges."
    #[must_use]
    pub fn max_float_bottom(&self) -> f32 {
        self.floats
            .iter()
            .map(|f| f.margin_box.bottom())
            .fold(0.0_f32, f32::max)
    }

    /// Returns `(left_offset, available_width)` for content in the band
    /// `[y, y + height)`, accounting for floats on both sides.
    ///
    /// A float is "active" in the band if its margin box vertically
    /// overlaps it. A zero-height band is treated as one pixel tall so an
    /// empty line still sees the floats beside it.
    #[must_use]
    pub fn available_width_at(&self, y: f32, height: f32) -> (f32, f32) {
        let band_top = y;
        let band_bottom = y + height.max(1.0);

        let mut left_edge: f32 = 0.0;
        let mut right_edge: f32 = self.containing_width;
        for f in &self.floats {
            let f_top = f.margin_box.y;
            let f_bottom = f.margin_box.bottom();
            if f_top >= band_bottom || f_bottom <= band_top {
                continue;
            }
            match f.side {
                FloatSide::Left => left_edge = left_edge.max(f.margin_box.right()),
                FloatSide::Right => right_edge = right_edge.min(f.margin_box.x),
            }
        }

        let avail = (right_edge - left_edge).max(0.0);
        (left_edge, avail)
    }

    /// Whether any float narrows the band `[y, y + height)`.
    #[must_use]
    pub fn intrudes_at(&self, y: f32, height: f32) -> bool {
        let (left, avail) = self.available_width_at(y, height);
        left > 0.0 || avail < self.containing_width
    }

    /// Find the smallest float bottom edge that is strictly greater than `y`,
    /// or `y` itself when no float ends below it.
    #[must_use]
    pub fn next_float_bottom_after(&self, y: f32) -> f32 {
        self.floats
            .iter()
            .map(|f| f.margin_box.bottom())
            .filter(|&bottom| bottom > y)
            .reduce(f32::min)
            .unwrap_or(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    #[test]
    fn test_available_width_shrinks_on_both_sides() {
        let mut floats = FloatContext::new(100.0);
        floats.add(FloatSide::Left, rect(0.0, 0.0, 20.0, 30.0));
        floats.add(FloatSide::Right, rect(70.0, 0.0, 30.0, 10.0));

        assert_eq!(floats.available_width_at(0.0, 10.0), (20.0, 50.0));
        assert_eq!(floats.available_width_at(10.0, 10.0), (20.0, 80.0));
        assert_eq!(floats.available_width_at(30.0, 10.0), (0.0, 100.0));
        assert!(!floats.intrudes_at(30.0, 10.0));
    }

    #[test]
    fn test_next_float_bottom_after() {
        let mut floats = FloatContext::new(100.0);
        floats.add(FloatSide::Left, rect(0.0, 0.0, 20.0, 30.0));
        floats.add(FloatSide::Left, rect(20.0, 0.0, 20.0, 12.0));

        assert_eq!(floats.next_float_bottom_after(0.0), 12.0);
        assert_eq!(floats.next_float_bottom_after(12.0), 30.0);
        assert_eq!(floats.next_float_bottom_after(30.0), 30.0);
        assert_eq!(floats.max_float_bottom(), 30.0);
    }
}
