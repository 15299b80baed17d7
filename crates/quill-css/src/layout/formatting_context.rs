//! The per-block formatting context.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! "Boxes in the normal flow belong to a formatting context, which may be
//! block or inline, but not both simultaneously."
//!
//! One [`FormattingContext`] lives for the duration of one block's layout.
//! For block-level children it stacks boxes and collapses adjoining
//! margins; for inline content it owns the open line box, the horizontal
//! cursor, the floats placed so far and the text currently being broken.

use std::mem;

use crate::error::LayoutError;
use crate::style::{ComputedStyle, VerticalAlign};

use super::box_model::Rect;
use super::box_tree::{BoxFlags, BoxId, BoxTree, LayoutBox};
use super::float::{FloatContext, FloatSide};
use super::text::TextOracle;

/// [§ 8.3.1 Collapsing margins](https://www.w3.org/TR/CSS2/box.html#collapsing-margins)
///
/// "When two or more margins collapse, the resulting margin width is the
/// maximum of the collapsing margins' widths. In the case of negative
/// margins, the maximum of the absolute values of the negative adjoining
/// margins is deducted from the maximum of the positive adjoining margins.
/// If there are no positive margins, the maximum of the absolute values
/// of the adjoining margins is deducted from zero."
#[must_use]
pub fn collapse_two_margins(a: f32, b: f32) -> f32 {
    if a >= 0.0 && b >= 0.0 {
        a.max(b)
    } else if a < 0.0 && b < 0.0 {
        a.min(b)
    } else {
        a + b
    }
}

/// [§ 10.8.1](https://www.w3.org/TR/CSS2/visudet.html#strut)
///
/// "Each line box starts with a zero-width inline box with the element's
/// font and line height properties. We call that imaginary box a 'strut.'"
#[derive(Debug, Clone, Copy, Default)]
struct Strut {
    ascent: f32,
    descent: f32,
    x_height: f32,
}

impl Strut {
    fn height(&self) -> f32 {
        (self.ascent + self.descent).max(0.0)
    }
}

/// Extents gathered from the boxes appended to the open line.
#[derive(Debug, Clone, Copy, Default)]
struct LineMetrics {
    ascent: f32,
    descent: f32,
    /// Tallest box aligned to the line's top or bottom.
    aligned: f32,
    has_content: bool,
}

/// Layout state of one block.
pub struct FormattingContext<'a> {
    oracle: &'a dyn TextOracle,
    width: f32,
    /// The line box being filled, if one is open.
    pub line_box: Option<BoxId>,
    /// Horizontal cursor from the start of the open line's content.
    pub x: f32,
    /// Width still free on the open line.
    pub leftover: f32,
    /// Nothing has been placed on the open line yet.
    pub at_line_head: bool,
    /// A break opportunity exists right before the next text.
    pub breakable: bool,
    /// The last character of the processed text so far.
    pub prev_char: Option<char>,
    floats: FloatContext,
    pending_floats: Vec<BoxId>,
    new_floats: usize,
    y: f32,
    last_margin: f32,
    strut: Strut,
    metrics: LineMetrics,
    text: String,
    text_cursor: usize,
    word_start: bool,
}

impl<'a> FormattingContext<'a> {
    /// A context for a block whose content box is `width` wide.
    #[must_use]
    pub fn new(oracle: &'a dyn TextOracle, block_style: &ComputedStyle, width: f32) -> Self {
        let font = oracle.resolve_font(block_style);
        let half_leading = (block_style.used_line_height() - font.line_height()) / 2.0;
        let strut = Strut {
            ascent: font.ascender() + half_leading,
            descent: font.descender() + half_leading,
            x_height: font.metrics.x_height(font.point),
        };
        Self {
            oracle,
            width,
            line_box: None,
            x: 0.0,
            leftover: width,
            at_line_head: true,
            breakable: false,
            prev_char: None,
            floats: FloatContext::new(width),
            pending_floats: Vec::new(),
            new_floats: 0,
            y: 0.0,
            last_margin: 0.0,
            strut,
            metrics: LineMetrics::default(),
            text: String::new(),
            text_cursor: 0,
            word_start: true,
        }
    }

    /// The oracle this context measures with.
    #[must_use]
    pub fn oracle(&self) -> &'a dyn TextOracle {
        self.oracle
    }

    /// Content width of the block.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.width
    }

    /// Vertical cursor: the top of the next line or block.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Floats placed so far.
    #[must_use]
    pub const fn floats(&self) -> &FloatContext {
        &self.floats
    }

    /// In-flow line content ends the run of adjoining block margins.
    pub const fn use_margin(&mut self) {
        self.last_margin = 0.0;
    }

    /// Stack a laid-out block-level child below the previous one.
    ///
    /// The child's top margin collapses with the previous sibling's bottom
    /// margin; the difference is stored as the child's clearance.
    pub fn place_block(&mut self, tree: &mut BoxTree, child: BoxId) {
        let margin = tree.get(child).blanks.margin;
        let collapsed = collapse_two_margins(self.last_margin, margin.top);
        let clearance = collapsed - self.last_margin - margin.top;
        let b = tree.get_mut(child);
        b.clearance = clearance;
        self.y += clearance + b.total_height();
        self.last_margin = margin.bottom;
    }

    /// Open a new line box at the bottom of `block`.
    ///
    /// The line is narrowed by the floats beside it, and any floats that
    /// were waiting for a new line are placed on it if they fit.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MissingGeometry`] if `block` has not had its width
    /// resolved yet, or [`LayoutError::Allocation`].
    pub fn add_line_box(&mut self, tree: &mut BoxTree, block: BoxId) -> Result<BoxId, LayoutError> {
        if tree.get(block).flags.contains(BoxFlags::NEEDS_LAYOUT) {
            return Err(LayoutError::MissingGeometry(block));
        }
        let style = tree.get(block).style.clone();
        let line = tree.alloc(LayoutBox::new_line(style))?;
        tree.append_child(block, line);

        self.line_box = Some(line);
        self.x = 0.0;
        self.at_line_head = true;
        self.breakable = false;
        self.new_floats = 0;
        self.metrics = LineMetrics::default();
        self.place_line(tree, line, self.y);
        self.place_pending_floats(tree);
        Ok(line)
    }

    /// Narrow `line` around the floats at `top`.
    fn place_line(&mut self, tree: &mut BoxTree, line: BoxId, top: f32) {
        let (left, available) = self.floats.available_width_at(top, self.strut.height());
        let b = tree.get_mut(line);
        b.blanks.margin.left = left;
        b.blanks.margin.right = self.width - left - available;
        b.width = available;
        self.leftover = available - self.x;
    }

    /// Top of the open line's content, after any shift.
    fn line_top(&self, tree: &BoxTree, line: BoxId) -> f32 {
        self.y + tree.get(line).blanks.margin.top
    }

    /// Close the open line.
    ///
    /// The last inline box loses its trailing space, the line's height and
    /// baseline are computed from the boxes on it and the strut, and the
    /// vertical cursor moves below it. A line left with no children at all
    /// is removed.
    pub fn next_line(&mut self, tree: &mut BoxTree, block: BoxId, linefeed: bool) {
        let Some(line) = self.line_box.take() else {
            return;
        };
        if let Some(last) = tree.last_inline_child(line) {
            self.x += tree.get_mut(last).at_end_of_line();
        }
        if linefeed {
            self.metrics.has_content = true;
        }

        if tree.children(line).is_empty() && !self.metrics.has_content {
            tree.detach(line);
        } else {
            let (height, baseline) = if self.metrics.has_content {
                let ascent = self.metrics.ascent.max(self.strut.ascent);
                let descent = self.metrics.descent.max(self.strut.descent);
                ((ascent + descent).max(self.metrics.aligned), ascent)
            } else {
                (0.0, 0.0)
            };
            tree.get_mut(line).height = height;
            if let Some(state) = tree.line_mut(line) {
                state.baseline = baseline;
                state.strut_ascent = self.strut.ascent;
                state.strut_descent = self.strut.descent;
                state.x_height = self.strut.x_height;
            }
            self.y = self.line_top(tree, line) + height;
        }

        #[cfg(feature = "layout-trace")]
        eprintln!(
            "[LINE] closed {line:?} in {block:?} y={} children={}",
            self.y,
            tree.children(line).len()
        );
        #[cfg(not(feature = "layout-trace"))]
        let _ = block;

        self.x = 0.0;
        self.leftover = 0.0;
        self.at_line_head = true;
        self.breakable = false;
        self.new_floats = 0;
        self.metrics = LineMetrics::default();
    }

    /// Whether [`Self::shift_down_line_box`] would move the open line.
    ///
    /// A line holding floats placed on it stays put: they are recorded at
    /// its current top.
    #[must_use]
    pub fn can_shift_down(&self, tree: &BoxTree) -> bool {
        let Some(line) = self.line_box else {
            return false;
        };
        if self.has_new_floats() {
            return false;
        }
        let top = self.line_top(tree, line);
        self.floats.intrudes_at(top, self.strut.height())
            && self.floats.next_float_bottom_after(top) > top
    }

    /// Move the open line down to the next float bottom, keeping the
    /// horizontal cursor, and recompute the room left on it.
    ///
    /// Returns `false` when no float narrows the line, or when floats were
    /// already placed on it; the caller then needs a new line.
    pub fn shift_down_line_box(&mut self, tree: &mut BoxTree) -> bool {
        if !self.can_shift_down(tree) {
            return false;
        }
        let Some(line) = self.line_box else {
            return false;
        };
        let top = self.line_top(tree, line);
        let next = self.floats.next_float_bottom_after(top);
        tree.get_mut(line).blanks.margin.top += next - top;
        self.place_line(tree, line, next);
        self.place_pending_floats(tree);
        true
    }

    /// Floats were placed on the open line.
    #[must_use]
    pub const fn has_new_floats(&self) -> bool {
        self.new_floats > 0
    }

    /// Find the last break opportunity on the open line before text that
    /// cannot start there, and take the boxes after it off the line.
    ///
    /// Walking back from the last inline box: a box ending in a space
    /// breaks after itself; a box with an inner break point is split and
    /// its tail moves; a box with neither moves whole, unless its style
    /// forbids breaking. Returns the moved boxes in document order, or
    /// `None` when there is nothing to move.
    ///
    /// # Errors
    ///
    /// [`LayoutError::Allocation`] if a split tail cannot be stored.
    pub fn get_wrap_box(&mut self, tree: &mut BoxTree, data: &str) -> Result<Option<Vec<BoxId>>, LayoutError> {
        let Some(line) = self.line_box else {
            return Ok(None);
        };
        if data.starts_with(' ') {
            return Ok(None);
        }

        let mut chain = Vec::new();
        let mut found = false;
        let candidates: Vec<BoxId> = tree
            .children(line)
            .iter()
            .rev()
            .copied()
            .filter(|&c| !tree.get(c).is_float())
            .collect();
        for child in candidates {
            let b = tree.get(child);
            if !b.is_inline() || !b.children.is_empty() {
                // Positioned boxes and atomic inlines end the search with a
                // break opportunity after them.
                found = true;
                break;
            }
            let Some(inline) = tree.inline(child) else {
                break;
            };
            if inline.data.ends_with(' ') {
                found = true;
                break;
            }
            if 0 < inline.wrap && inline.wrap < inline.data.len() {
                let before = b.total_width();
                let tail = tree.split_inline(child)?;
                let moved = before - tree.get(child).total_width();
                self.x -= moved;
                self.leftover += moved;
                chain.push(tail);
                found = true;
                break;
            }
            if !b.style.white_space.is_breaking_lines() {
                return Ok(None);
            }
            chain.push(child);
        }
        if !found {
            return Ok(None);
        }

        for &id in &chain {
            if tree.parent(id).is_some() {
                let moved = tree.get(id).total_width();
                tree.detach(id);
                self.x -= moved;
                self.leftover += moved;
            }
        }
        chain.reverse();
        Ok((!chain.is_empty()).then_some(chain))
    }

    /// Apply `style`'s white-space processing to `data`, tracking the
    /// previous character across runs.
    pub fn collapse_white_space(&mut self, style: &ComputedStyle, data: &mut String) -> usize {
        self.word_start = self.prev_char.is_none_or(char::is_whitespace);
        style.process_white_space(data, &mut self.prev_char)
    }

    /// Start handing out break opportunities in `text`.
    pub fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
        self.text_cursor = 0;
    }

    /// Byte offset into the current text of the next break opportunity.
    pub fn get_next_text_boundary(&mut self) -> usize {
        self.text_cursor = self.oracle.next_boundary(&self.text, self.text_cursor);
        self.text_cursor
    }

    /// The rest of the current text will not be broken on this line.
    pub fn dont_wrap(&mut self) {
        self.text_cursor = self.text.len();
    }

    /// Whether `data` starts a word for `text-transform: capitalize`.
    #[must_use]
    pub fn is_first_character(&self, data: &str) -> bool {
        self.word_start && self.oracle.is_first_character_of(data)
    }

    /// Put an inline box on the open line, before any right floats, and
    /// fold its extents into the line's metrics.
    ///
    /// # Panics
    ///
    /// Panics if no line box is open.
    pub fn append_inline_box(&mut self, tree: &mut BoxTree, id: BoxId) {
        let line = self.open_line();
        let index = self.in_flow_end(tree, line);
        tree.insert_child(line, index, id);
        self.at_line_head = false;

        let b = tree.get(id);
        let Some(inline) = tree.inline(id) else {
            return;
        };
        if !b.has_height() {
            return;
        }
        let half_leading = inline.leading / 2.0;
        let (sub, sup) = inline.font.as_ref().map_or((0.0, 0.0), |f| {
            (f.metrics.sub_offset(f.point), f.metrics.super_offset(f.point))
        });
        let raise = match b.style.vertical_align {
            VerticalAlign::Top | VerticalAlign::Bottom => {
                self.metrics.aligned = self.metrics.aligned.max(b.height + inline.leading);
                self.metrics.has_content = true;
                return;
            }
            VerticalAlign::Sub => -sub,
            VerticalAlign::Super => sup,
            VerticalAlign::Length(length) => length,
            _ => 0.0,
        };
        self.metrics.ascent = self.metrics.ascent.max(inline.baseline + half_leading + raise);
        self.metrics.descent = self
            .metrics
            .descent
            .max(b.height - inline.baseline + half_leading - raise);
        self.metrics.has_content = true;

        if let Some(font) = inline.font.clone() {
            if let Some(state) = tree.line_mut(line) {
                let (m, p) = (&font.metrics, font.point);
                state.underline_position = state.underline_position.max(m.underline_position(p));
                state.underline_thickness = state.underline_thickness.max(m.underline_thickness(p));
                state.line_through_position = state.line_through_position.max(m.line_through_position(p));
                state.line_through_thickness = state.line_through_thickness.max(m.line_through_thickness(p));
            }
        }
    }

    /// Keep an absolutely positioned box at its static position on the
    /// open line. It takes no width.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::add_line_box`] failures.
    pub fn append_positioned(&mut self, tree: &mut BoxTree, block: BoxId, id: BoxId) -> Result<(), LayoutError> {
        if self.line_box.is_none() {
            let _ = self.add_line_box(tree, block)?;
        }
        let line = self.open_line();
        let index = self.in_flow_end(tree, line);
        tree.insert_child(line, index, id);
        Ok(())
    }

    fn open_line(&self) -> BoxId {
        self.line_box
            .unwrap_or_else(|| panic!("no line box is open"))
    }

    /// Index of the first right float on `line`, or its child count.
    fn in_flow_end(&self, tree: &BoxTree, line: BoxId) -> usize {
        let children = tree.children(line);
        tree.line(line)
            .and_then(|state| state.right_box)
            .and_then(|rb| children.iter().position(|&c| c == rb))
            .unwrap_or(children.len())
    }

    /// [§ 9.5.1 Positioning the float](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    ///
    /// Place a laid-out float on the open line if it fits next to what is
    /// already there, or queue it for the next line.
    ///
    /// "If a shortened line box is too small to contain any content, then
    /// the line box is shifted downward ... until either some content fits
    /// or there are no more floats present."
    ///
    /// # Errors
    ///
    /// Propagates [`Self::add_line_box`] failures.
    pub fn add_float(&mut self, tree: &mut BoxTree, block: BoxId, float: BoxId) -> Result<(), LayoutError> {
        let line = match self.line_box {
            Some(line) => line,
            None => self.add_line_box(tree, block)?,
        };
        let width = tree.get(float).effective_total_width();
        let line_empty = !tree.has_child_boxes(line) && self.new_floats == 0;
        let unobstructed = !self.floats.intrudes_at(self.line_top(tree, line), self.strut.height());
        if self.pending_floats.is_empty()
            && (width <= self.leftover || (line_empty && unobstructed))
        {
            self.insert_float(tree, line, float);
        } else {
            self.pending_floats.push(float);
        }
        Ok(())
    }

    /// Left floats go after the leading left floats; right floats go
    /// before the existing right floats, so each later right float lands
    /// further left.
    fn insert_float(&mut self, tree: &mut BoxTree, line: BoxId, float: BoxId) {
        let Some(side) = tree.get(float).float_side() else {
            return;
        };
        let width = tree.get(float).effective_total_width();
        let height = tree.get(float).total_height();
        let top = self.line_top(tree, line);
        let margin = tree.get(line).blanks.margin;

        let x = match side {
            FloatSide::Left => {
                let leading: Vec<BoxId> = tree
                    .children(line)
                    .iter()
                    .copied()
                    .take_while(|&c| tree.get(c).float_side() == Some(FloatSide::Left))
                    .collect();
                let offset: f32 = leading.iter().map(|&c| tree.get(c).effective_total_width()).sum();
                tree.insert_child(line, leading.len(), float);
                margin.left + offset
            }
            FloatSide::Right => {
                let index = self.in_flow_end(tree, line);
                let offset: f32 = tree.children(line)[index..]
                    .iter()
                    .map(|&c| tree.get(c).effective_total_width())
                    .sum();
                tree.insert_child(line, index, float);
                if let Some(state) = tree.line_mut(line) {
                    state.right_box = Some(float);
                }
                self.width - margin.right - offset - width
            }
        };

        self.floats.add(
            side,
            Rect {
                x,
                y: top,
                width,
                height,
            },
        );
        self.leftover -= width;
        self.new_floats += 1;
    }

    /// Place queued floats on the open line, in order, while they fit.
    fn place_pending_floats(&mut self, tree: &mut BoxTree) {
        let Some(line) = self.line_box else {
            return;
        };
        let pending = mem::take(&mut self.pending_floats);
        for float in pending {
            if self.pending_floats.is_empty()
                && tree.get(float).effective_total_width() <= self.leftover
            {
                self.insert_float(tree, line, float);
            } else {
                self.pending_floats.push(float);
            }
        }
    }

    /// Close the last line and flush queued floats.
    ///
    /// Returns the content height of the block: the bottom of the last
    /// line or the lowest float, whichever is lower.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::add_line_box`] failures.
    pub fn finish(&mut self, tree: &mut BoxTree, block: BoxId) -> Result<f32, LayoutError> {
        self.next_line(tree, block, false);
        while !self.pending_floats.is_empty() {
            let line = self.add_line_box(tree, block)?;
            while !self.has_new_floats() {
                if !self.shift_down_line_box(tree) {
                    // Full width and still too narrow: the float overflows.
                    let float = self.pending_floats.remove(0);
                    self.insert_float(tree, line, float);
                    self.place_pending_floats(tree);
                }
            }
            self.next_line(tree, block, false);
        }
        Ok(self.y.max(self.floats.max_float_bottom()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_two_margins() {
        assert_eq!(collapse_two_margins(10.0, 20.0), 20.0);
        assert_eq!(collapse_two_margins(-10.0, -20.0), -20.0);
        assert_eq!(collapse_two_margins(30.0, -10.0), 20.0);
    }
}
