//! CSS Box Model types.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)

/// A rectangle positioned in 2D space.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Edge sizes for padding, border, or margin.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// The same size on every side.
    #[must_use]
    pub const fn uniform(size: f32) -> Self {
        Self {
            top: size,
            right: size,
            bottom: size,
            left: size,
        }
    }

    /// `left + right`
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// `top + bottom`
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
//
// The "blank" on a side of a box is everything between its margin edge and
// its content edge on that side:
//
//   blank-left = margin-left + border-left + padding-left
//
// ┌───────────────────────────────────────┐
// │ m │ b │ p │     CONTENT     │ p │ b │ m │
// └───────────────────────────────────────┘
//  \____________/                 \____________/
//   blank-left                     blank-right

/// The three edge layers that surround a box's content area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Blanks {
    /// Margin edge sizes (auto already resolved).
    pub margin: EdgeSizes,
    /// Border widths.
    pub border: EdgeSizes,
    /// Padding edge sizes.
    pub padding: EdgeSizes,
}

impl Blanks {
    /// Margin + border + padding on the left.
    #[must_use]
    pub fn left(&self) -> f32 {
        self.margin.left + self.border.left + self.padding.left
    }

    /// Margin + border + padding on the right.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.margin.right + self.border.right + self.padding.right
    }

    /// Margin + border + padding on the top.
    #[must_use]
    pub fn top(&self) -> f32 {
        self.margin.top + self.border.top + self.padding.top
    }

    /// Margin + border + padding on the bottom.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.margin.bottom + self.border.bottom + self.padding.bottom
    }

    /// Zero the left margin, border and padding.
    ///
    /// Used when an inline box is continued from a previous line:
    /// "the left margin, border, and padding ... are not rendered at the
    /// start of a continuation".
    pub const fn clear_left(&mut self) {
        self.margin.left = 0.0;
        self.border.left = 0.0;
        self.padding.left = 0.0;
    }

    /// Zero the right margin, border and padding.
    pub const fn clear_right(&mut self) {
        self.margin.right = 0.0;
        self.border.right = 0.0;
        self.padding.right = 0.0;
    }
}
