//! Inline boxes: one run of text (or one atomic inline) on one line.
//!
//! [§ 9.2.2 Inline-level elements and inline boxes](https://www.w3.org/TR/CSS2/visuren.html#inline-boxes)
//!
//! An element's text may be spread over several inline boxes, one per line
//! it touches. Only the first box keeps the element's left margin, border
//! and padding, and only the last keeps the right ones:
//!
//! "When an inline box is split, margins, borders, and padding have no
//! visual effect where the split occurs."

use quill_dom::{DomTree, NodeId};

use crate::error::LayoutError;
use crate::style::ComputedStyle;

use super::box_model::EdgeSizes;
use super::box_tree::{BoxId, BoxKind, BoxTree, LayoutBox};
use super::text::{ActiveFont, spaced_width};

/// Per-kind state of an inline box.
#[derive(Debug, Clone, Default)]
pub struct InlineBox {
    /// The font the text was measured with.
    pub font: Option<ActiveFont>,
    /// The text, after white-space processing and `text-transform`.
    pub data: String,
    /// Byte index in `data` of the last break opportunity.
    pub wrap: usize,
    /// Width of `data[..wrap]`.
    pub wrap_width: f32,
    /// Distance from the top of the content area to the baseline.
    pub baseline: f32,
    /// `line-height` minus the content-area height.
    pub leading: f32,
    trimmed: bool,
}

impl InlineBox {
    /// Whether the start blank of `element` belongs to the box generated
    /// for `node`.
    ///
    /// True when `node` is the element itself (an empty element) or its
    /// first child, and the element has something on its start edge.
    #[must_use]
    pub fn is_empty_inline_at_first(
        dom: &DomTree,
        style: &ComputedStyle,
        element: NodeId,
        node: NodeId,
    ) -> bool {
        style.display.is_inline()
            && style.check_empty_inline().has_start_blank()
            && (node == element || dom.first_child(element) == Some(node))
    }

    /// Whether the end blank of `element` belongs to the box generated for
    /// `node`.
    #[must_use]
    pub fn is_empty_inline_at_last(
        dom: &DomTree,
        style: &ComputedStyle,
        element: NodeId,
        node: NodeId,
    ) -> bool {
        style.display.is_inline()
            && style.check_empty_inline().has_end_blank()
            && (node == element || dom.last_child(element) == Some(node))
    }
}

impl LayoutBox {
    fn inline_state(&self) -> &InlineBox {
        match &self.kind {
            BoxKind::Inline(inline) => inline,
            _ => panic!("box is not an inline box"),
        }
    }

    fn inline_state_mut(&mut self) -> &mut InlineBox {
        match &mut self.kind {
            BoxKind::Inline(inline) => inline,
            _ => panic!("box is not an inline box"),
        }
    }

    /// [§ 10.3.1 Inline, non-replaced elements](https://www.w3.org/TR/CSS2/visudet.html#inline-width)
    ///
    /// "The 'width' property does not apply. A computed value of 'auto' for
    /// 'margin-left' or 'margin-right' becomes a used value of '0'."
    ///
    /// Text that sits directly in a block uses the block's style and gets
    /// no blanks of its own.
    pub fn resolve_inline_width(&mut self) {
        self.width = 0.0;
        if !self.style.display.is_inline() {
            return;
        }
        let margin = self.style.margin.auto_as_zero();
        // "The vertical padding, border and margin of an inline,
        // non-replaced box start at the top and bottom of the content
        // area" and do not move the line; vertical margins have no effect.
        self.blanks.margin = EdgeSizes {
            top: 0.0,
            bottom: 0.0,
            ..margin
        };
        self.blanks.border = self.style.border;
        self.blanks.padding = self.style.padding;
    }

    /// Store the text of this box.
    ///
    /// `wrap` is the byte index of the last break opportunity inside
    /// `data` and `wrap_width` the width before it. When `data` ends with a
    /// space the break point is pinned to the end, so the space can be
    /// trimmed but the box is never split.
    ///
    /// # Panics
    ///
    /// Panics if this is not an inline box.
    pub fn set_data(&mut self, font: ActiveFont, data: &str, wrap: usize, wrap_width: f32) {
        let pinned = data.ends_with(' ').then(|| spaced_width(&self.style, &font, data).0);
        let inline = self.inline_state_mut();
        inline.data = data.to_string();
        inline.trimmed = false;
        if let Some(width) = pinned {
            inline.wrap = data.len();
            inline.wrap_width = width;
        } else {
            inline.wrap = wrap.min(data.len());
            inline.wrap_width = wrap_width;
        }
        inline.font = Some(font);
    }

    /// The box ends a line: drop one trailing collapsible space and
    /// return the (zero or negative) change in width.
    ///
    /// [§ 16.6.1](https://www.w3.org/TR/CSS2/text.html#white-space-model)
    /// "If a space (U+0020) at the end of a line has 'white-space' set to
    /// 'normal', 'nowrap', or 'pre-line', it is also removed."
    ///
    /// Calling this again on the same box returns zero.
    ///
    /// # Panics
    ///
    /// Panics if this is not an inline box.
    pub fn at_end_of_line(&mut self) -> f32 {
        let collapsing = self.style.white_space.is_collapsing_space();
        let letter_spacing = self.style.letter_spacing_px().unwrap_or(0.0);
        let word_spacing = self.style.word_spacing_px();
        let inline = self.inline_state_mut();
        if inline.trimmed || !collapsing || !inline.data.ends_with(' ') {
            return 0.0;
        }
        let advance = inline.font.as_ref().map_or(0.0, |font| font.advance(' '));
        let delta = -(advance + word_spacing + letter_spacing);
        let pinned = inline.wrap == inline.data.len();
        let _ = inline.data.pop();
        if pinned {
            inline.wrap = inline.data.len();
            inline.wrap_width += delta;
        }
        inline.trimmed = true;
        self.width += delta;
        delta
    }

    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "The height of the inline box encloses all glyphs and their
    /// half-leading on each side and is thus exactly 'line-height'."
    ///
    /// The content area is the font's ascent plus descent; the rest of
    /// `line_height` is leading.
    pub fn set_line_metrics(&mut self, font: &ActiveFont, line_height: f32) {
        self.height = font.line_height();
        let height = self.height;
        let inline = self.inline_state_mut();
        inline.baseline = font.ascender();
        inline.leading = line_height - height;
    }

    /// [§ 10.8.1](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// "The height of the inline box is the height of its margin box" for
    /// inline-blocks, and without in-flow line boxes its baseline is "the
    /// bottom margin edge".
    pub fn set_atomic_metrics(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        let inline = self.inline_state_mut();
        inline.baseline = height;
        inline.leading = 0.0;
    }

    /// The box contributes to the height of its line.
    #[must_use]
    pub fn has_height(&self) -> bool {
        !self.inline_state().data.is_empty()
            || self.blank_left() != 0.0
            || self.blank_right() != 0.0
            || !self.children.is_empty()
    }

    /// Text of an inline box, or `""` for other boxes.
    #[must_use]
    pub fn text(&self) -> &str {
        match &self.kind {
            BoxKind::Inline(inline) => &inline.data,
            _ => "",
        }
    }
}

impl BoxTree {
    /// Split inline box `id` at its break point.
    ///
    /// `id` keeps `data[..wrap]` and loses its right blanks; the returned
    /// detached box holds the rest and inherits the top, right and bottom
    /// blanks.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Allocation`] if the new box cannot be stored.
    ///
    /// # Panics
    ///
    /// Panics unless `id` is an inline box with `wrap < data.len()`.
    pub fn split_inline(&mut self, id: BoxId) -> Result<BoxId, LayoutError> {
        let head = self.get(id);
        let inline = head.inline_state();
        assert!(
            inline.wrap < inline.data.len(),
            "split point {} is not inside the text of box {id:?}",
            inline.wrap
        );
        let mut tail = LayoutBox::new_inline(head.node, head.style.clone());
        tail.blanks = head.blanks;
        tail.clear_blank_left();
        tail.width = head.width - inline.wrap_width;
        tail.height = head.height;
        let font = inline.font.clone();
        let rest = inline.data[inline.wrap..].to_string();
        let (baseline, leading) = (inline.baseline, inline.leading);
        if let Some(font) = font {
            tail.set_data(font, &rest, 0, 0.0);
        } else {
            tail.inline_state_mut().data = rest;
        }
        {
            let state = tail.inline_state_mut();
            state.baseline = baseline;
            state.leading = leading;
        }
        let tail = self.alloc(tail)?;

        let head = self.get_mut(id);
        let state = head.inline_state_mut();
        let wrap = state.wrap;
        let wrap_width = state.wrap_width;
        state.data.truncate(wrap);
        head.width = wrap_width;
        head.clear_blank_right();
        Ok(tail)
    }

    /// An inline box sits at `(left, top + offset_v)`; an atomic inline's
    /// block starts at its content origin.
    pub(crate) fn resolve_inline_xy(&mut self, id: BoxId, left: f32, top: f32) {
        let (content_left, content_top) = {
            let b = self.get_mut(id);
            b.x = left;
            b.y = top + b.offset_v;
            (left + b.blank_left(), b.y)
        };
        if let Some(child) = self.first_child(id) {
            self.resolve_xy(child, content_left, content_top);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::layout::text::FixedAdvanceFont;
    use crate::style::{PseudoElement, StyleDeclaration};

    fn font() -> ActiveFont {
        ActiveFont {
            metrics: Rc::new(FixedAdvanceFont::monospace_em()),
            point: 10.0,
        }
    }

    fn span_style() -> Rc<ComputedStyle> {
        Rc::new(ComputedStyle::compute(
            &StyleDeclaration {
                font_size: Some(10.0),
                ..StyleDeclaration::default()
            }
            .with_padding(2.0),
            None,
            PseudoElement::None,
        ))
    }

    fn text_box(tree: &mut BoxTree, data: &str, wrap: usize) -> BoxId {
        let mut b = LayoutBox::new_inline(None, span_style());
        b.resolve_inline_width();
        b.set_data(font(), data, wrap, wrap as f32 * 10.0);
        b.width = data.chars().count() as f32 * 10.0;
        tree.alloc(b).unwrap()
    }

    #[test]
    fn test_resolve_inline_width_ignores_vertical_margin() {
        let style = Rc::new(ComputedStyle::compute(
            &StyleDeclaration::default().with_margin(crate::style::AutoLength::Px(4.0)),
            None,
            PseudoElement::None,
        ));
        let mut b = LayoutBox::new_inline(None, style);
        b.resolve_inline_width();
        assert_eq!(b.blank_left(), 4.0);
        assert_eq!(b.blank_top(), 0.0);
    }

    #[test]
    fn test_set_data_pins_wrap_on_trailing_space() {
        let mut tree = BoxTree::new();
        let id = text_box(&mut tree, "ab ", 1);
        let inline = tree.inline(id).unwrap();
        assert_eq!(inline.wrap, 3);
        assert_eq!(inline.wrap_width, 30.0);
    }

    #[test]
    fn test_split_moves_right_blanks_to_tail() {
        let mut tree = BoxTree::new();
        let id = text_box(&mut tree, "foo bar", 4);
        let before = tree.get(id).total_width();

        let tail = tree.split_inline(id).unwrap();

        assert_eq!(tree.get(id).text(), "foo ");
        assert_eq!(tree.get(tail).text(), "bar");
        assert_eq!(tree.get(id).width, 40.0);
        assert_eq!(tree.get(tail).width, 30.0);
        assert_eq!(tree.get(id).blank_right(), 0.0);
        assert_eq!(tree.get(tail).blank_left(), 0.0);
        assert_eq!(tree.get(tail).blank_right(), 2.0);
        assert_eq!(tree.get(tail).blank_top(), 2.0);
        assert_eq!(
            tree.get(id).total_width() + tree.get(tail).total_width(),
            before
        );
    }

    #[test]
    #[should_panic(expected = "split point")]
    fn test_split_at_end_panics() {
        let mut tree = BoxTree::new();
        let id = text_box(&mut tree, "foo", 3);
        let _ = tree.split_inline(id);
    }

    #[test]
    fn test_at_end_of_line_trims_once() {
        let mut tree = BoxTree::new();
        let id = text_box(&mut tree, "ab ", 3);
        let b = tree.get_mut(id);
        assert_eq!(b.at_end_of_line(), -10.0);
        assert_eq!(b.at_end_of_line(), 0.0);
        assert_eq!(b.text(), "ab");
        assert_eq!(b.width, 20.0);
    }

    #[test]
    fn test_empty_inline_edges() {
        let mut dom = DomTree::new();
        let span = dom.append_element(dom.root(), "span");
        let first = dom.append_text(span, "a");
        let last = dom.append_text(span, "b");
        let style = span_style();

        assert!(InlineBox::is_empty_inline_at_first(&dom, &style, span, first));
        assert!(!InlineBox::is_empty_inline_at_first(&dom, &style, span, last));
        assert!(InlineBox::is_empty_inline_at_last(&dom, &style, span, last));
        assert!(InlineBox::is_empty_inline_at_last(&dom, &style, span, span));
    }
}
