//! Line boxes.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "The rectangular area that contains the boxes that form a line is called
//! a line box."
//!
//! The children of a line are kept in a fixed order:
//!
//! ```text
//! [left floats] [inline boxes ...] [right floats]
//!                                   ^ right_box
//! ```
//!
//! A line's left and right margins hold the room taken by floats placed on
//! earlier lines; its top margin holds the distance it was shifted down to
//! clear them.

use quill_common::{Component, warn_once};

use crate::style::{TextAlign, VerticalAlign};

use super::box_tree::{BoxId, BoxTree};
use super::float::FloatSide;

/// Per-kind state of a line box.
#[derive(Debug, Clone, PartialEq)]
pub struct LineBox {
    /// Distance from the top of the line to the shared baseline.
    pub baseline: f32,
    /// Ascent of the block's own font, including half-leading.
    pub strut_ascent: f32,
    /// Descent of the block's own font, including half-leading.
    pub strut_descent: f32,
    /// x-height of the block's own font.
    pub x_height: f32,
    /// Largest underline offset below the baseline on this line.
    pub underline_position: f32,
    /// Thickest underline on this line.
    pub underline_thickness: f32,
    /// Largest line-through offset above the baseline on this line.
    pub line_through_position: f32,
    /// Thickest line-through on this line.
    pub line_through_thickness: f32,
    /// Space before the in-flow content, from `text-align`.
    pub left_gap: f32,
    /// Space after the in-flow content, from `text-align`.
    pub right_gap: f32,
    /// The first right float in child order; walking back from the last
    /// child stops here.
    pub right_box: Option<BoxId>,
}

impl Default for LineBox {
    fn default() -> Self {
        Self {
            baseline: 0.0,
            strut_ascent: 0.0,
            strut_descent: 0.0,
            x_height: 0.0,
            underline_position: 0.0,
            underline_thickness: 1.0,
            line_through_position: 0.0,
            line_through_thickness: 1.0,
            left_gap: 0.0,
            right_gap: 0.0,
            right_box: None,
        }
    }
}

impl BoxTree {
    fn line_state(&self, line: BoxId) -> &LineBox {
        self.line(line)
            .unwrap_or_else(|| panic!("box {line:?} is not a line box"))
    }

    fn line_state_mut(&mut self, line: BoxId) -> &mut LineBox {
        self.line_mut(line)
            .unwrap_or_else(|| panic!("box {line:?} is not a line box"))
    }

    /// The narrowest width the line's content needs.
    ///
    /// In-flow children count with their margin-box widths, positioned
    /// boxes not at all. The run of left floats at the start and the run of
    /// right floats at the end add their effective widths. A float whose
    /// negative margins pull its effective width to zero adds nothing, but
    /// the line is never narrower than the run up to it plus its margin
    /// box.
    ///
    /// # Panics
    ///
    /// Panics if `line` is not a line box.
    #[must_use]
    pub fn shrink_to(&self, line: BoxId) -> f32 {
        let _ = self.line_state(line);
        let children = self.children(line);

        let mut width = 0.0;
        for &child in children {
            let b = self.get(child);
            if !b.is_float() && !b.is_absolutely_positioned() {
                width += b.total_width();
            }
        }
        let (left, left_floor) = self.float_run(children.iter().copied(), FloatSide::Left);
        let (right, right_floor) = self.float_run(children.iter().rev().copied(), FloatSide::Right);
        (width + left + right).max(left_floor).max(right_floor)
    }

    /// Sum of the effective widths of the leading floats on `side` in
    /// `children`, and the least width the run needs.
    fn float_run(&self, children: impl Iterator<Item = BoxId>, side: FloatSide) -> (f32, f32) {
        let mut sum = 0.0;
        let mut floor = 0.0;
        for child in children {
            let b = self.get(child);
            if b.float_side() != Some(side) {
                break;
            }
            let effective = b.effective_total_width();
            sum += effective;
            floor += effective;
            if effective == 0.0 {
                floor = f32::max(sum + b.total_width(), floor);
            }
        }
        (sum, floor)
    }

    /// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    ///
    /// Split the unused width `width - shrink_to()` between the left and
    /// right gaps according to the containing block's `text-align`. The
    /// gaps plus the content always add up to `width`.
    ///
    /// # Panics
    ///
    /// Panics if `line` is not a line box or has no parent block.
    pub fn fit(&mut self, line: BoxId, width: f32) {
        let parent = self
            .parent(line)
            .unwrap_or_else(|| panic!("line {line:?} has no containing block"));
        let align = self.get(parent).style.text_align;
        let unused = width - self.shrink_to(line);
        let left_gap = match align {
            TextAlign::Default | TextAlign::Left => 0.0,
            TextAlign::Right => unused.max(0.0),
            TextAlign::Center => (unused / 2.0).max(0.0),
            TextAlign::Justify => {
                warn_once(Component::Layout, "text-align: justify is laid out as left");
                0.0
            }
        };
        let state = self.line_state_mut(line);
        state.left_gap = left_gap;
        state.right_gap = unused - left_gap;
    }

    /// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
    ///
    /// Set `offset_v` of every inline child: the distance from the top of
    /// the line to the top of the child's content area, following its
    /// `vertical-align`.
    pub fn align_line(&mut self, line: BoxId) {
        let state = self.line_state(line).clone();
        let line_height = self.get(line).height;
        for child in self.children(line).to_vec() {
            let b = self.get(child);
            let Some(inline) = self.inline(child) else {
                continue;
            };
            let (box_height, box_baseline, half_leading) =
                (b.height, inline.baseline, inline.leading / 2.0);
            let (sub, sup) = inline
                .font
                .as_ref()
                .map_or((0.0, 0.0), |f| (f.metrics.sub_offset(f.point), f.metrics.super_offset(f.point)));
            let on_baseline = state.baseline - box_baseline;
            let offset = match b.style.vertical_align {
                VerticalAlign::Baseline => on_baseline,
                VerticalAlign::Sub => on_baseline + sub,
                VerticalAlign::Super => on_baseline - sup,
                VerticalAlign::Length(raise) => on_baseline - raise,
                VerticalAlign::TextTop => state.baseline - state.strut_ascent,
                VerticalAlign::TextBottom => state.baseline + state.strut_descent - box_height,
                VerticalAlign::Middle => state.baseline - state.x_height / 2.0 - box_height / 2.0,
                VerticalAlign::Top => half_leading,
                VerticalAlign::Bottom => line_height - box_height - half_leading,
            };
            self.get_mut(child).offset_v = offset;
        }
    }

    /// Place the line and its children.
    ///
    /// Leading left floats go against the left edge, then `left_gap`, then
    /// the in-flow boxes left to right; right floats are walked back from
    /// the last child and stacked against the right edge until
    /// `right_box`. Positioned boxes stay where the flow reached them, so
    /// one at the start of the line sits after the gap.
    pub(crate) fn resolve_line_xy(&mut self, line: BoxId, left: f32, top: f32) {
        let (right_box, left_gap) = {
            let state = self.line_state(line);
            (state.right_box, state.left_gap)
        };
        let (mut left, top, mut right) = {
            let b = self.get_mut(line);
            let top = top + b.offset_v + b.clearance;
            b.x = left;
            b.y = top;
            let content_left = left + b.blank_left();
            (content_left, top + b.blank_top(), content_left + b.width)
        };
        let children = self.children(line).to_vec();

        let mut index = 0;
        while let Some(&child) = children.get(index) {
            let b = self.get(child);
            if b.float_side() != Some(FloatSide::Left) {
                break;
            }
            let advance = b.effective_total_width();
            self.resolve_xy(child, left, top);
            left += advance;
            index += 1;
        }

        left += left_gap;
        for &child in &children[index..] {
            if Some(child) == right_box {
                break;
            }
            let b = self.get(child);
            if b.is_float() {
                continue;
            }
            let advance = if b.is_absolutely_positioned() { 0.0 } else { b.total_width() };
            self.resolve_xy(child, left, top);
            left += advance;
        }

        for &child in children[index..].iter().rev() {
            let b = self.get(child);
            if !b.is_float() {
                break;
            }
            right -= b.effective_total_width();
            self.resolve_xy(child, right, top);
            if Some(child) == right_box {
                break;
            }
        }
    }
}
