//! Block-level layout driver.
//!
//! [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
//!
//! "In a block formatting context, boxes are laid out one after the other,
//! vertically, beginning at the top of a containing block."
//!
//! Builds the box tree for a styled [`DomTree`] and lays it out: block
//! children stack with collapsed margins, runs of inline content go into
//! line boxes through [`lay_out_text`], floats and inline-blocks are laid
//! out as blocks of their own first and then handed to the open line.

#[cfg(feature = "layout-trace")]
use std::cell::Cell;
use std::rc::Rc;

use quill_dom::{DomTree, NodeId, NodeType};

use crate::error::LayoutError;
use crate::style::{AutoLength, ComputedStyle, Display, StyleMap};

use super::LayoutConfig;
use super::box_tree::{BoxFlags, BoxId, BoxTree, LayoutBox};
use super::formatting_context::FormattingContext;
use super::text::TextOracle;
use super::text_layout::{TextSource, lay_out_text};

#[cfg(feature = "layout-trace")]
thread_local! {
    static LAYOUT_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// What every layout call needs to look at but never changes.
#[derive(Clone, Copy)]
pub struct LayoutCx<'a> {
    /// The document being laid out.
    pub dom: &'a DomTree,
    /// Computed style per element.
    pub styles: &'a StyleMap,
    /// Break opportunities, fonts and measurement.
    pub oracle: &'a dyn TextOracle,
}

impl<'a> LayoutCx<'a> {
    /// A layout context over `dom` and its computed `styles`.
    #[must_use]
    pub fn new(dom: &'a DomTree, styles: &'a StyleMap, oracle: &'a dyn TextOracle) -> Self {
        Self { dom, styles, oracle }
    }

    /// The computed style of element `node`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MissingStyle`] when `node` has none.
    pub fn style(&self, node: NodeId) -> Result<Rc<ComputedStyle>, LayoutError> {
        self.styles
            .get(&node)
            .cloned()
            .ok_or(LayoutError::MissingStyle(node))
    }

    /// The style an inline box generated for `node` is drawn with: an
    /// element's own style, or a text node's parent's.
    #[must_use]
    pub fn inline_style_of(&self, node: NodeId) -> Option<Rc<ComputedStyle>> {
        let element = if self.dom.as_text(node).is_some() {
            self.dom.parent(node)?
        } else {
            node
        };
        self.styles.get(&element).cloned()
    }
}

/// How a block picks its width when `width` is `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sizing {
    /// [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth):
    /// fill the containing block.
    Fill,
    /// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width):
    /// "min(max(preferred minimum width, available width), preferred
    /// width)".
    ShrinkToFit,
}

/// Lay out the document element of `dom` into a new box tree.
///
/// The root block fills `config.viewport_width`; every box gets its final
/// position.
///
/// # Errors
///
/// [`LayoutError::NoRootElement`] for a document without elements,
/// [`LayoutError::MissingStyle`] when `styles` lacks an element, and
/// [`LayoutError::Allocation`] when the box arena cannot grow.
pub fn layout_document(
    dom: &DomTree,
    styles: &StyleMap,
    oracle: &dyn TextOracle,
    config: &LayoutConfig,
) -> Result<BoxTree, LayoutError> {
    let document_element = dom.document_element().ok_or(LayoutError::NoRootElement)?;
    let cx = LayoutCx::new(dom, styles, oracle);
    let style = cx.style(document_element)?;

    let mut tree = BoxTree::new();
    let root = tree.alloc(LayoutBox::new_block(Some(document_element), style))?;
    tree.set_root(root);
    layout_block_box(&cx, &mut tree, root, config.viewport_width, Sizing::Fill)?;
    tree.resolve_xy(root, 0.0, 0.0);
    Ok(tree)
}

/// [§ 10.3 Calculating widths and margins](https://www.w3.org/TR/CSS2/visudet.html#Computing_widths_and_margins)
///
/// Resolve the width and blanks of `block` inside a containing block
/// `containing_width` wide, then lay out its content and set its height.
///
/// # Errors
///
/// Propagates errors from laying out the content.
pub fn layout_block_box(
    cx: &LayoutCx<'_>,
    tree: &mut BoxTree,
    block: BoxId,
    containing_width: f32,
    sizing: Sizing,
) -> Result<(), LayoutError> {
    #[cfg(feature = "layout-trace")]
    let _depth = {
        let depth = LAYOUT_DEPTH.with(|d| {
            let current = d.get();
            d.set(current + 1);
            current
        });
        eprintln!(
            "[LAYOUT DEPTH] depth={depth} box={block:?} display={:?} sizing={sizing:?} containing_width={containing_width}",
            tree.get(block).style.display
        );
        struct DepthGuard;
        impl Drop for DepthGuard {
            fn drop(&mut self) {
                LAYOUT_DEPTH.with(|d| d.set(d.get() - 1));
            }
        }
        DepthGuard
    };

    let style = Rc::clone(&tree.get(block).style);
    let mut margin = style.margin.auto_as_zero();
    let frame = style.border.horizontal() + style.padding.horizontal();
    let available = (containing_width - margin.left - margin.right - frame).max(0.0);

    // STEP 1: Width.
    let width = match (style.width, sizing) {
        (AutoLength::Px(width), _) => width,
        (AutoLength::Auto, Sizing::Fill) => available,
        (AutoLength::Auto, Sizing::ShrinkToFit) => {
            let _ = lay_out_contents(cx, tree, block, available)?;
            let preferred = preferred_width(tree, block);
            let minimum = tree.block(block).map_or(0.0, |b| b.mcw);
            minimum.max(available).min(preferred)
        }
    };

    // [§ 10.3.3](https://www.w3.org/TR/CSS2/visudet.html#blockwidth)
    //
    // "If both 'margin-left' and 'margin-right' are 'auto', their used
    // values are equal. This horizontally centers the element with respect
    // to the edges of the containing block."
    if sizing == Sizing::Fill && !style.width.is_auto() && style.margin.left.is_auto() && style.margin.right.is_auto() {
        let free = (containing_width - width - frame).max(0.0);
        margin.left = free / 2.0;
        margin.right = free / 2.0;
    }

    {
        let b = tree.get_mut(block);
        b.blanks.margin = margin;
        b.blanks.border = style.border;
        b.blanks.padding = style.padding;
    }

    // STEP 2: Content, then height.
    let content_height = lay_out_contents(cx, tree, block, width)?;
    tree.get_mut(block).height = match style.height {
        AutoLength::Px(height) => height,
        AutoLength::Auto => content_height,
    };
    Ok(())
}

/// Lay out the children of `block` at content width `width` and return the
/// content height. Any boxes from an earlier pass are dropped first.
fn lay_out_contents(cx: &LayoutCx<'_>, tree: &mut BoxTree, block: BoxId, width: f32) -> Result<f32, LayoutError> {
    tree.clear_children(block);
    if let Some(state) = tree.block_mut(block) {
        state.mcw = 0.0;
    }
    {
        let b = tree.get_mut(block);
        b.width = width;
        b.flags.remove(BoxFlags::NEEDS_LAYOUT);
    }
    let style = Rc::clone(&tree.get(block).style);
    let mut context = FormattingContext::new(cx.oracle, &style, width);

    if let Some(text) = tree.block(block).and_then(|b| b.generated_text.clone()) {
        if let Some(node) = tree.get(block).node {
            let element = cx.dom.parent(node).unwrap_or(node);
            let source = TextSource {
                node,
                element,
                data: &text,
            };
            let _ = lay_out_text(cx, tree, block, &mut context, source, &style)?;
        }
    } else if let Some(node) = tree.get(block).node {
        let children = cx.dom.children(node).to_vec();
        if children.iter().any(|&child| is_block_level(cx, child)) {
            lay_out_block_children(cx, tree, block, &mut context, &children)?;
        } else {
            for child in children {
                lay_out_inline_node(cx, tree, block, &mut context, child)?;
            }
        }
    }

    let height = context.finish(tree, block)?;
    finish_lines(tree, block);
    Ok(height)
}

/// Whether `node` generates a block-level box in normal flow.
fn is_block_level(cx: &LayoutCx<'_>, node: NodeId) -> bool {
    if cx.dom.as_element(node).is_none() {
        return false;
    }
    cx.styles.get(&node).is_some_and(|style| {
        style.display.is_block_level() && !style.is_float() && !style.position.is_absolutely_positioned()
    })
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// "If a block container box has a block-level box inside it, then we
/// force it to have only block-level boxes inside it."
///
/// Each run of inline-level children goes into an anonymous block; runs
/// that produce nothing (white space between blocks) leave no box behind.
fn lay_out_block_children(
    cx: &LayoutCx<'_>,
    tree: &mut BoxTree,
    block: BoxId,
    context: &mut FormattingContext<'_>,
    children: &[NodeId],
) -> Result<(), LayoutError> {
    let mut run = Vec::new();
    for &child in children {
        if !is_block_level(cx, child) {
            run.push(child);
            continue;
        }
        lay_out_anonymous_block(cx, tree, block, context, &run)?;
        run.clear();

        let style = cx.style(child)?;
        let child_box = tree.alloc(LayoutBox::new_block(Some(child), style))?;
        tree.append_child(block, child_box);
        layout_block_box(cx, tree, child_box, context.width(), Sizing::Fill)?;
        context.place_block(tree, child_box);
        propagate_mcw(tree, block, child_box);
    }
    lay_out_anonymous_block(cx, tree, block, context, &run)
}

fn lay_out_anonymous_block(
    cx: &LayoutCx<'_>,
    tree: &mut BoxTree,
    block: BoxId,
    context: &mut FormattingContext<'_>,
    run: &[NodeId],
) -> Result<(), LayoutError> {
    if run.is_empty() {
        return Ok(());
    }
    let style = Rc::new(ComputedStyle::anonymous_block(&tree.get(block).style));
    let anonymous = tree.alloc(LayoutBox::new_anonymous_block(Rc::clone(&style)))?;
    tree.append_child(block, anonymous);
    {
        let b = tree.get_mut(anonymous);
        b.width = context.width();
        b.flags.remove(BoxFlags::NEEDS_LAYOUT);
    }

    let mut inner = FormattingContext::new(cx.oracle, &style, context.width());
    for &node in run {
        lay_out_inline_node(cx, tree, anonymous, &mut inner, node)?;
    }
    let height = inner.finish(tree, anonymous)?;
    finish_lines(tree, anonymous);

    if tree.children(anonymous).is_empty() {
        tree.detach(anonymous);
        return Ok(());
    }
    tree.get_mut(anonymous).height = height;
    context.place_block(tree, anonymous);
    propagate_mcw(tree, block, anonymous);
    Ok(())
}

/// Lay out one inline-level DOM node on the lines of `block`.
fn lay_out_inline_node(
    cx: &LayoutCx<'_>,
    tree: &mut BoxTree,
    block: BoxId,
    context: &mut FormattingContext<'_>,
    node: NodeId,
) -> Result<(), LayoutError> {
    let Some(dom_node) = cx.dom.get(node) else {
        return Ok(());
    };
    match &dom_node.node_type {
        NodeType::Text(data) => {
            let element = cx.dom.parent(node).ok_or(LayoutError::MissingStyle(node))?;
            let style = cx.style(element)?;
            let source = TextSource { node, element, data };
            let _ = lay_out_text(cx, tree, block, context, source, &style)?;
        }
        NodeType::Element(_) => {
            let style = cx.style(node)?;
            if style.display == Display::None {
                return Ok(());
            }
            if style.is_float() {
                let float = tree.alloc(LayoutBox::new_block(Some(node), style))?;
                layout_block_box(cx, tree, float, context.width(), Sizing::ShrinkToFit)?;
                context.add_float(tree, block, float)?;
                propagate_mcw(tree, block, float);
            } else if style.position.is_absolutely_positioned() {
                // [§ 10.3.7](https://www.w3.org/TR/CSS2/visudet.html#abs-non-replaced-width)
                // An auto width is shrink-to-fit; the box stays at its
                // static position and takes no room on the line.
                let positioned = tree.alloc(LayoutBox::new_block(Some(node), style))?;
                layout_block_box(cx, tree, positioned, context.width(), Sizing::ShrinkToFit)?;
                context.append_positioned(tree, block, positioned)?;
            } else if style.display == Display::InlineBlock {
                lay_out_atomic_inline(cx, tree, block, context, node, style)?;
            } else {
                let children = cx.dom.children(node).to_vec();
                if children.is_empty() {
                    let source = TextSource {
                        node,
                        element: node,
                        data: "",
                    };
                    let _ = lay_out_text(cx, tree, block, context, source, &style)?;
                }
                for child in children {
                    lay_out_inline_node(cx, tree, block, context, child)?;
                }
            }
        }
        NodeType::Document => {}
    }
    Ok(())
}

/// [§ 10.3.9 'Inline-block', non-replaced elements in normal flow](https://www.w3.org/TR/CSS2/visudet.html#inlineblock-width)
///
/// "If 'width' is 'auto', the used value is the shrink-to-fit width as for
/// floating elements."
///
/// The block is laid out on its own and wrapped in an inline box that
/// goes on the line as one unbreakable unit.
fn lay_out_atomic_inline(
    cx: &LayoutCx<'_>,
    tree: &mut BoxTree,
    block: BoxId,
    context: &mut FormattingContext<'_>,
    node: NodeId,
    style: Rc<ComputedStyle>,
) -> Result<(), LayoutError> {
    let inner = tree.alloc(LayoutBox::new_block(Some(node), Rc::clone(&style)))?;
    layout_block_box(cx, tree, inner, context.width(), Sizing::ShrinkToFit)?;
    let (width, height) = {
        let b = tree.get(inner);
        (b.total_width(), b.total_height())
    };

    let mut wrapper = LayoutBox::new_inline(Some(node), style);
    wrapper.set_atomic_metrics(width, height);
    let wrapper = tree.alloc(wrapper)?;
    tree.append_child(wrapper, inner);

    context.use_margin();
    let mut line = match context.line_box {
        Some(line) => line,
        None => context.add_line_box(tree, block)?,
    };
    let breaking = tree.get(block).style.white_space.is_breaking_lines();
    if width > context.leftover && breaking && (tree.has_child_boxes(line) || context.has_new_floats()) {
        context.next_line(tree, block, false);
        line = context.add_line_box(tree, block)?;
    }
    while width > context.leftover
        && !tree.has_child_boxes(line)
        && !context.has_new_floats()
        && context.shift_down_line_box(tree)
    {}

    context.x += width;
    context.leftover -= width;
    context.append_inline_box(tree, wrapper);
    context.breakable = breaking;
    context.prev_char = None;
    tree.update_mcw(block, width);
    Ok(())
}

/// [§ 10.3.5](https://www.w3.org/TR/CSS2/visudet.html#float-width)
///
/// "Calculate the preferred width by formatting the content without
/// breaking lines other than where explicit line breaks occur."
///
/// Approximated from the laid-out children: the widest line at its
/// shrink-to-fit width, and the widest block child.
fn preferred_width(tree: &BoxTree, block: BoxId) -> f32 {
    tree.children(block)
        .iter()
        .map(|&child| {
            let b = tree.get(child);
            if b.is_line() {
                tree.shrink_to(child)
            } else if b.style.width.is_auto() {
                preferred_width(tree, child) + b.blank_left() + b.blank_right()
            } else {
                b.total_width()
            }
        })
        .fold(0.0, f32::max)
}

/// A child's unbreakable width constrains its container too.
fn propagate_mcw(tree: &mut BoxTree, block: BoxId, child: BoxId) {
    let b = tree.get(child);
    let mcw = tree.block(child).map_or(0.0, |state| state.mcw) + b.blank_left() + b.blank_right();
    tree.update_mcw(block, mcw);
}

/// Split the unused width of each line and align its boxes vertically.
fn finish_lines(tree: &mut BoxTree, block: BoxId) {
    for child in tree.children(block).to_vec() {
        if tree.get(child).is_line() {
            let width = tree.get(child).width;
            tree.fit(child, width);
            tree.align_line(child);
        }
    }
}
