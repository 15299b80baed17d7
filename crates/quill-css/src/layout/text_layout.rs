//! Breaking one text run into inline boxes across lines.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "When the total width of the inline boxes on a line is less than the
//! width of the line box containing them, their horizontal distribution
//! within the line box is determined by the 'text-align' property. ...
//! When an inline box exceeds the width of a line box, it is split into
//! several boxes and these boxes are distributed across several line
//! boxes."
//!
//! [`lay_out_text`] is called once per text node (and once with empty
//! data for an empty inline element). It walks the text one break unit at
//! a time, filling the open line, and each time a unit does not fit it
//! asks [`decide_overflow`] what to do.

use std::rc::Rc;

use quill_dom::NodeId;

use crate::error::LayoutError;
use crate::style::{ComputedStyle, EmptyInline, PseudoElement, StyleDeclaration, TextTransform};

use super::block::{LayoutCx, Sizing, layout_block_box};
use super::box_tree::{BoxId, BoxTree, LayoutBox};
use super::formatting_context::FormattingContext;
use super::inline_box::InlineBox;
use super::text::{ActiveFont, Measured, TextOracle, measure_text};

/// The text to lay out and where it comes from.
#[derive(Debug, Clone, Copy)]
pub struct TextSource<'d> {
    /// The text node, or the element itself when it has no children.
    pub node: NodeId,
    /// The element whose style applies.
    pub element: NodeId,
    /// The raw character data.
    pub data: &'d str,
}

/// What [`lay_out_text`] did with its text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextLayout {
    /// At least one box was placed.
    Emitted,
    /// The text collapsed away entirely.
    Collapsed,
}

/// State of the measuring loop for one inline box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakState {
    /// Still taking units onto the line.
    Measuring,
    /// Store what fits and continue on a new line.
    CommitAndBreak,
    /// Nothing was stored; retry the same text on a new line.
    AdvanceLine,
    /// The text (or the `::first-letter` part of it) is used up.
    Done,
}

/// What is known about the line when a unit overflows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverflowProbe {
    /// The unit ends in a collapsible space and fits without it.
    pub trailing_space_fits: bool,
    /// An earlier unit of this run is already on the line.
    pub has_earlier_boundary: bool,
    /// The line holds boxes or floats placed on it.
    pub line_occupied: bool,
    /// A float narrows the line and moving it down would widen it.
    pub can_shift_down: bool,
}

/// The response to a unit that does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverflowAction {
    /// Keep the unit without its trailing space and break after it.
    TrimTrailingSpace,
    /// Break before the unit.
    BreakAtBoundary,
    /// Close the line and retry there.
    AdvanceLine,
    /// Move the line below the next float bottom and measure again.
    ShiftDown,
    /// Nowhere better to go: keep the unit and let it overflow.
    CommitOverflow,
}

/// Pick the response to an overflowing unit. The checks run in order and
/// the first one that holds wins.
#[must_use]
pub const fn decide_overflow(probe: OverflowProbe) -> OverflowAction {
    if probe.trailing_space_fits {
        OverflowAction::TrimTrailingSpace
    } else if probe.has_earlier_boundary {
        OverflowAction::BreakAtBoundary
    } else if probe.line_occupied {
        OverflowAction::AdvanceLine
    } else if probe.can_shift_down {
        OverflowAction::ShiftDown
    } else {
        OverflowAction::CommitOverflow
    }
}

/// The style in effect and the pseudo-element styles that may still apply.
struct ActiveStyles<'a> {
    oracle: &'a dyn TextOracle,
    base: Rc<ComputedStyle>,
    first_line: Option<Rc<ComputedStyle>>,
    first_letter: Option<Rc<ComputedStyle>>,
    active: Rc<ComputedStyle>,
    font: ActiveFont,
}

impl<'a> ActiveStyles<'a> {
    fn new(oracle: &'a dyn TextOracle, base: &Rc<ComputedStyle>) -> Self {
        Self {
            oracle,
            base: Rc::clone(base),
            first_line: None,
            first_letter: None,
            active: Rc::clone(base),
            font: oracle.resolve_font(base),
        }
    }

    fn activate(&mut self, style: Rc<ComputedStyle>) {
        self.font = self.oracle.resolve_font(&style);
        self.active = style;
    }

    /// [§ 5.12.1 The :first-line pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-line-pseudo)
    ///
    /// Gather `::first-line` and `::first-letter` declarations from `block`
    /// and every ancestor it is the first child of. The outermost block's
    /// declarations apply first. A `::marker` style on the way stops the
    /// search for `::first-letter`, and so does any inline box already on
    /// the line.
    fn resolve(&mut self, tree: &BoxTree, block: BoxId, line: BoxId) {
        let mut is_first_letter = !tree.children(line).iter().any(|&c| tree.get(c).is_inline());
        let mut line_decls = Vec::new();
        let mut letter_decls = Vec::new();
        let mut current = block;
        loop {
            let style = &tree.get(current).style;
            if let Some(decl) = style.first_line_declaration() {
                line_decls.push(decl);
            }
            if is_first_letter {
                if let Some(decl) = style.first_letter_declaration() {
                    letter_decls.push(decl);
                }
                if style.pseudo == PseudoElement::Marker {
                    is_first_letter = false;
                }
            }
            match tree.parent(current) {
                Some(parent) if tree.get(parent).is_block() && tree.first_child(parent) == Some(current) => {
                    current = parent;
                }
                _ => break,
            }
        }

        let block_style: &ComputedStyle = &tree.get(block).style;
        let inline = self.base.display.is_inline();
        self.first_line = (!line_decls.is_empty()).then(|| {
            let mut decl = StyleDeclaration::default();
            for d in line_decls.iter().rev() {
                decl.specify(d);
            }
            // The element sits inside the fictional first-line tag.
            if inline {
                decl.specify(self.base.declared());
            }
            Rc::new(ComputedStyle::compute(&decl, Some(block_style), PseudoElement::FirstLine))
        });
        self.first_letter = (!letter_decls.is_empty()).then(|| {
            let mut decl = StyleDeclaration::default();
            if inline {
                decl.specify(self.base.declared());
            }
            for d in letter_decls.iter().rev() {
                decl.specify(d);
            }
            let parent = self.first_line.as_deref().unwrap_or(block_style);
            Rc::new(ComputedStyle::compute(&decl, Some(parent), PseudoElement::FirstLetter))
        });
    }

    /// Move past the current style region.
    ///
    /// A live `::first-letter` is consumed without leaving the line;
    /// otherwise the line is closed and a `::first-line` style ends.
    fn advance(&mut self, tree: &mut BoxTree, context: &mut FormattingContext<'_>, block: BoxId, linefeed: bool) {
        if self.first_letter.take().is_some() {
            let next = self.first_line.clone().unwrap_or_else(|| Rc::clone(&self.base));
            self.activate(next);
        } else {
            context.next_line(tree, block, linefeed);
            if self.first_line.take().is_some() {
                let base = Rc::clone(&self.base);
                self.activate(base);
            }
        }
    }
}

/// The text gathered for one inline box.
#[derive(Debug, Default)]
struct Run {
    data: String,
    advanced: f32,
    wrap_offset: usize,
    wrap_width: f32,
    next: usize,
    linefeed: bool,
    blank_right_charged: bool,
}

/// Lay out `source` on the lines of `block`.
///
/// Creates one inline box per line the text touches and appends them to
/// the open line of `context`, opening and closing lines as needed. An
/// empty element with no margin, border or padding, and text that
/// collapses to nothing, produce no box and report
/// [`TextLayout::Collapsed`].
///
/// # Errors
///
/// Returns [`LayoutError::Allocation`] when the box arena cannot grow, or
/// any error from laying out a floating `::first-letter`.
pub fn lay_out_text(
    cx: &LayoutCx<'_>,
    tree: &mut BoxTree,
    block: BoxId,
    context: &mut FormattingContext<'_>,
    source: TextSource<'_>,
    style: &Rc<ComputedStyle>,
) -> Result<TextLayout, LayoutError> {
    let TextSource { node, element, data: raw } = source;
    let dom = cx.dom;
    let at_first = InlineBox::is_empty_inline_at_first(dom, style, element, node);
    let at_last = InlineBox::is_empty_inline_at_last(dom, style, element, node);
    let discardable = !raw.is_empty() && !at_first && !at_last;

    if raw.is_empty() && style.check_empty_inline() == EmptyInline::Bare {
        return Ok(TextLayout::Collapsed);
    }

    let mut data = raw.to_string();
    if context.collapse_white_space(style, &mut data) == 0 && !raw.is_empty() {
        if !context.at_line_head && style.white_space.is_breaking_lines() {
            context.breakable = true;
        }
        if discardable {
            return Ok(TextLayout::Collapsed);
        }
    }

    let mut pseudo_checked = tree.block(block).is_some_and(|b| b.generated_text.is_some())
        || (tree.get(block).is_anonymous() && !tree.is_first_child(block));
    let mut styles = ActiveStyles::new(context.oracle(), style);
    let mut position = 0;
    let mut inline_box: Option<BoxId> = None;
    let mut wrap_chain: Vec<BoxId> = Vec::new();
    let mut emitted = false;

    loop {
        if context.at_line_head && wrap_chain.is_empty() {
            let next = style.process_line_head_white_space(&data, position);
            if position != next && data.len() <= next && discardable {
                break;
            }
            position = next;
        }
        context.use_margin();
        let line = match context.line_box {
            Some(line) => line,
            None => context.add_line_box(tree, block)?,
        };

        if !pseudo_checked && tree.first_child(block) == Some(line) {
            pseudo_checked = true;
            styles.resolve(tree, block, line);
            if let Some(first_letter) = styles.first_letter.clone() {
                styles.activate(Rc::clone(&first_letter));
                if first_letter.is_float() && position < data.len() {
                    position += lay_out_floating_first_letter(cx, tree, block, context, node, &data[position..], &first_letter)?;
                    emitted = true;
                    if data.len() <= position {
                        break;
                    }
                    styles.advance(tree, context, block, false);
                    continue;
                }
            } else if let Some(first_line) = styles.first_line.clone() {
                styles.activate(first_line);
            }
        }

        let mut unbreakable = 0.0;
        if !wrap_chain.is_empty() {
            unbreakable = tree.total_width_of(&wrap_chain);
            context.x += unbreakable;
            context.leftover -= unbreakable;
            if context.leftover < 0.0 && (tree.has_child_boxes(line) || context.has_new_floats()) {
                context.x -= unbreakable;
                context.leftover += unbreakable;
                styles.advance(tree, context, block, false);
                continue;
            }
        }

        let ib = if let Some(id) = inline_box {
            tree.get_mut(id).style = Rc::clone(&styles.active);
            id
        } else {
            let mut b = LayoutBox::new_inline(Some(node), Rc::clone(&styles.active));
            b.resolve_inline_width();
            if styles.first_letter.is_none() {
                if position > 0 || !at_first {
                    b.clear_blank_left();
                }
                if !at_last {
                    b.clear_blank_right();
                }
            }
            let id = tree.alloc(b)?;
            inline_box = Some(id);
            id
        };
        let blank_left = tree.get(ib).blank_left();
        context.x += blank_left;
        context.leftover -= blank_left;

        let mut linefeed = false;
        if data.is_empty() {
            let b = tree.get_mut(ib);
            b.set_data(styles.font.clone(), "", 0, 0.0);
            context.leftover -= b.blank_right();
        } else if data[position..].starts_with('\n') {
            position += 1;
            linefeed = true;
            let b = tree.get_mut(ib);
            b.set_data(styles.font.clone(), "", 0, 0.0);
            if !(at_last && data.len() <= position) {
                b.clear_blank_right();
            }
            context.leftover -= b.blank_right();
        } else {
            let blank_right = tree.get(ib).blank_right();
            let end_blank = RightBlank {
                width: blank_right,
                at_last,
            };
            let (state, run) = measure_run(cx, tree, block, line, context, &styles, &data, position, &mut unbreakable, end_blank, &mut wrap_chain)?;
            if state == BreakState::AdvanceLine {
                context.x -= blank_left;
                context.leftover += blank_left;
                styles.advance(tree, context, block, false);
                continue;
            }
            let b = tree.get_mut(ib);
            let text = run.data.strip_suffix('\n').unwrap_or(&run.data);
            b.set_data(styles.font.clone(), text, run.wrap_offset, run.wrap_width);
            b.width += run.advanced;
            if run.blank_right_charged {
                b.width -= blank_right;
            } else {
                b.clear_blank_right();
            }
            position = run.next;
            linefeed = run.linefeed;
        }

        for id in wrap_chain.drain(..) {
            context.append_inline_box(tree, id);
        }
        let b = tree.get_mut(ib);
        if b.has_height() {
            let line_height = styles.active.used_line_height();
            b.set_line_metrics(&styles.font, line_height);
        }
        context.x += b.width + b.blank_right();
        context.append_inline_box(tree, ib);
        emitted = true;

        if data.len() <= position {
            if linefeed {
                context.next_line(tree, block, true);
            }
            break;
        }
        inline_box = None;
        styles.advance(tree, context, block, linefeed);
    }

    Ok(if emitted { TextLayout::Emitted } else { TextLayout::Collapsed })
}

/// The right blank of the box being filled and whether it ends the
/// element.
#[derive(Debug, Clone, Copy)]
struct RightBlank {
    width: f32,
    at_last: bool,
}

/// Take units of `data` from `position` onto the open line until one does
/// not fit, the text ends, or a preserved newline is reached.
fn measure_run(
    cx: &LayoutCx<'_>,
    tree: &mut BoxTree,
    block: BoxId,
    line: BoxId,
    context: &mut FormattingContext<'_>,
    styles: &ActiveStyles<'_>,
    data: &str,
    position: usize,
    unbreakable: &mut f32,
    end_blank: RightBlank,
    wrap_chain: &mut Vec<BoxId>,
) -> Result<(BreakState, Run), LayoutError> {
    let active = Rc::clone(&styles.active);
    let fit_length = styles
        .first_letter
        .as_ref()
        .map_or(data.len() - position, |fl| fl.first_letter_length(data, position));
    context.set_text(&data[position..position + fit_length]);

    let mut is_first_character = wrap_chain.is_empty();
    if active.text_transform == TextTransform::Capitalize && wrap_chain.is_empty() && position == 0 {
        is_first_character = context.is_first_character(data);
    }

    let mut run = Run {
        next: position,
        ..Run::default()
    };
    let mut state = BreakState::Measuring;
    while state == BreakState::Measuring {
        let wrap = run.next;
        run.wrap_offset = run.data.len();
        run.wrap_width = run.advanced;
        run.next = position + context.get_next_text_boundary();
        let unit = &data[wrap..run.next];
        let measured = measure_text(&active, &styles.font, unit, is_first_character);
        is_first_character = true;
        let charge_blank = styles.first_letter.is_some() || (data.len() <= run.next && end_blank.at_last);
        let width = measured.width + if charge_blank { end_blank.width } else { 0.0 };

        let mut decided = None;
        while context.leftover < width && (context.breakable || active.white_space.is_breaking_lines()) {
            let line_end = trailing_space_end(&active, &measured, width, unit);
            let trailing_space_fits = trailing_space_fits(line_end, context.leftover);
            let has_earlier_boundary = position < wrap;
            if !trailing_space_fits && !has_earlier_boundary && wrap_chain.is_empty() && position == 0 {
                if let Some(chain) = context.get_wrap_box(tree, data)? {
                    if styles.first_line.is_some() {
                        restyle_wrap_chain(cx, tree, styles.oracle, &chain);
                    }
                    *wrap_chain = chain;
                }
            }
            let probe = OverflowProbe {
                trailing_space_fits,
                has_earlier_boundary,
                line_occupied: tree.has_child_boxes(line) || context.has_new_floats(),
                can_shift_down: context.can_shift_down(tree),
            };
            match decide_overflow(probe) {
                OverflowAction::ShiftDown => {
                    let _ = context.shift_down_line_box(tree);
                    continue;
                }
                OverflowAction::TrimTrailingSpace => {
                    let end = line_end.unwrap_or(0.0);
                    context.breakable = true;
                    context.dont_wrap();
                    let mut text = measured.text.clone();
                    let _ = text.pop();
                    run.data.push_str(&text);
                    run.advanced += end;
                    context.leftover -= end;
                    run.wrap_offset = run.data.len();
                    run.wrap_width = run.advanced;
                    run.blank_right_charged = charge_blank;
                    tree.update_mcw(block, *unbreakable + end);
                    decided = Some(BreakState::CommitAndBreak);
                }
                OverflowAction::BreakAtBoundary => {
                    run.next = wrap;
                    decided = Some(BreakState::CommitAndBreak);
                }
                OverflowAction::AdvanceLine => decided = Some(BreakState::AdvanceLine),
                OverflowAction::CommitOverflow => {
                    run.data.push_str(&measured.text);
                    run.advanced += width;
                    context.leftover -= width;
                    run.blank_right_charged = charge_blank;
                    context.breakable = false;
                    tree.update_mcw(block, *unbreakable + width);
                    decided = Some(BreakState::CommitAndBreak);
                }
            }
            break;
        }
        if let Some(next_state) = decided {
            state = next_state;
            continue;
        }

        run.data.push_str(&measured.text);
        run.advanced += width;
        context.leftover -= width;
        run.blank_right_charged = charge_blank;
        if context.breakable || active.white_space.is_breaking_lines() {
            tree.update_mcw(block, *unbreakable + width);
            *unbreakable = 0.0;
        } else {
            tree.update_mcw(block, *unbreakable + run.advanced);
        }
        context.breakable = false;

        if unit.ends_with('\n') {
            run.linefeed = true;
            state = BreakState::Done;
        } else if position + fit_length <= run.next {
            state = BreakState::Done;
        }
    }

    #[cfg(feature = "layout-trace")]
    eprintln!(
        "[TEXT] {state:?} {:?} advanced={} leftover={}",
        run.data, run.advanced, context.leftover
    );

    Ok((state, run))
}

/// Width of a measured unit without its trailing collapsible space, or
/// `None` when it has none to drop.
fn trailing_space_end(style: &ComputedStyle, measured: &Measured, width: f32, unit: &str) -> Option<f32> {
    if !style.white_space.is_collapsing_space() || !measured.text.ends_with(' ') {
        return None;
    }
    if unit.len() == 1 {
        return Some(0.0);
    }
    let letter_spacing = style.letter_spacing_px().unwrap_or(0.0);
    Some(width - measured.last_advance - style.word_spacing_px() - letter_spacing)
}

/// A unit ending in a collapsible space still fits when everything but
/// the space fits. A lone space always does, even on a line already
/// overfilled by a carried wrap chain.
fn trailing_space_fits(line_end: Option<f32>, leftover: f32) -> bool {
    line_end.is_some_and(|end| end == 0.0 || end <= leftover)
}

/// Boxes moved off the first line lose the `::first-line` style: measure
/// them again in their element's own style.
fn restyle_wrap_chain(cx: &LayoutCx<'_>, tree: &mut BoxTree, oracle: &dyn TextOracle, chain: &[BoxId]) {
    for &id in chain {
        let Some(style) = tree.get(id).node.and_then(|node| cx.inline_style_of(node)) else {
            continue;
        };
        let font = oracle.resolve_font(&style);
        let measured = measure_text(&style, &font, tree.get(id).text(), false);
        let line_height = style.used_line_height();
        let b = tree.get_mut(id);
        b.style = style;
        b.width = measured.width;
        b.set_data(font.clone(), &measured.text, 0, 0.0);
        if b.has_height() {
            b.set_line_metrics(&font, line_height);
        }
    }
}

/// [§ 5.12.2 The :first-letter pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-letter)
///
/// "If the letters would not start the line, for example because the
/// first letter is floated, the first letter" is laid out as a float of
/// its own. Returns how many bytes of `data` went into it.
fn lay_out_floating_first_letter(
    cx: &LayoutCx<'_>,
    tree: &mut BoxTree,
    block: BoxId,
    context: &mut FormattingContext<'_>,
    node: NodeId,
    data: &str,
    style: &Rc<ComputedStyle>,
) -> Result<usize, LayoutError> {
    let length = style.first_letter_length(data, 0);
    let float = tree.alloc(LayoutBox::new_block(Some(node), Rc::clone(style)))?;
    if let Some(state) = tree.block_mut(float) {
        state.generated_text = Some(data[..length].to_string());
    }
    layout_block_box(cx, tree, float, context.width(), Sizing::ShrinkToFit)?;
    context.add_float(tree, block, float)?;
    Ok(length)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe() -> OverflowProbe {
        OverflowProbe {
            trailing_space_fits: false,
            has_earlier_boundary: false,
            line_occupied: false,
            can_shift_down: false,
        }
    }

    #[test]
    fn test_decide_overflow_order() {
        assert_eq!(decide_overflow(probe()), OverflowAction::CommitOverflow);
        assert_eq!(
            decide_overflow(OverflowProbe {
                can_shift_down: true,
                ..probe()
            }),
            OverflowAction::ShiftDown
        );
        assert_eq!(
            decide_overflow(OverflowProbe {
                line_occupied: true,
                can_shift_down: true,
                ..probe()
            }),
            OverflowAction::AdvanceLine
        );
        assert_eq!(
            decide_overflow(OverflowProbe {
                has_earlier_boundary: true,
                line_occupied: true,
                ..probe()
            }),
            OverflowAction::BreakAtBoundary
        );
        assert_eq!(
            decide_overflow(OverflowProbe {
                trailing_space_fits: true,
                has_earlier_boundary: true,
                line_occupied: true,
                can_shift_down: true,
            }),
            OverflowAction::TrimTrailingSpace
        );
    }

    #[test]
    fn test_lone_space_fits_overfilled_line() {
        assert!(trailing_space_fits(Some(0.0), -20.0));
        assert!(trailing_space_fits(Some(30.0), 30.0));
        assert!(!trailing_space_fits(Some(30.0), 20.0));
        assert!(!trailing_space_fits(None, 100.0));
    }
}
