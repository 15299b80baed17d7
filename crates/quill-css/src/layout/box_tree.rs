//! The box tree: an arena of block, line and inline boxes.
//!
//! [§ 9.2 Controlling box generation](https://www.w3.org/TR/CSS2/visuren.html#box-gen)
//!
//! Boxes are stored in a `Vec` and addressed by [`BoxId`], the same way the
//! DOM addresses nodes by `NodeId`. Parent and child links are ids, so a
//! box can be detached from one line and re-attached to the next without
//! fighting the borrow checker.

use std::rc::Rc;

use bitflags::bitflags;
use quill_dom::NodeId;

use crate::error::LayoutError;
use crate::style::ComputedStyle;

use super::box_model::Blanks;
use super::float::FloatSide;
use super::inline_box::InlineBox;
use super::line_box::LineBox;

/// A type-safe index into the [`BoxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BoxId(pub usize);

bitflags! {
    /// Layout state flags carried by every box.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BoxFlags: u8 {
        /// The box's own geometry has not been computed yet.
        const NEEDS_LAYOUT = 1;
        /// Some descendant still needs layout.
        const NEEDS_CHILD_LAYOUT = 1 << 1;
        /// Generated by layout with no element of its own.
        const ANONYMOUS = 1 << 2;
    }
}

/// Per-kind state of a block box.
#[derive(Debug, Clone, Default)]
pub struct BlockBox {
    /// Minimum content width: the widest unbreakable run laid out inside.
    pub mcw: f32,
    /// Text laid out in place of DOM children. Set on the float generated
    /// for a floating `::first-letter`.
    pub generated_text: Option<String>,
}

/// What kind of box this is.
#[derive(Debug, Clone)]
pub enum BoxKind {
    /// A block container: the root, a paragraph, a float, an inline-block.
    Block(BlockBox),
    /// One line of an inline formatting context.
    Line(LineBox),
    /// A run of text (or an atomic inline) on one line.
    Inline(InlineBox),
}

/// One box in the tree.
///
/// `x` and `y` are the margin-box origin in document coordinates, filled
/// in by [`BoxTree::resolve_xy`]. `width` and `height` are the content
/// size.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    /// The DOM node this box was generated for, if any.
    pub node: Option<NodeId>,
    /// The style the box was laid out with.
    pub style: Rc<ComputedStyle>,
    /// Kind-specific state.
    pub kind: BoxKind,
    /// The containing box.
    pub parent: Option<BoxId>,
    /// Children in document order.
    pub children: Vec<BoxId>,
    /// Layout state.
    pub flags: BoxFlags,
    /// Horizontal position of the margin box.
    pub x: f32,
    /// Vertical position of the margin box.
    pub y: f32,
    /// Content width.
    pub width: f32,
    /// Content height.
    pub height: f32,
    /// Vertical offset inside the parent line, from alignment.
    pub offset_v: f32,
    /// Extra space above the box from margin collapsing.
    pub clearance: f32,
    /// Margin, border and padding.
    pub blanks: Blanks,
}

impl LayoutBox {
    fn new(node: Option<NodeId>, style: Rc<ComputedStyle>, kind: BoxKind) -> Self {
        Self {
            node,
            style,
            kind,
            parent: None,
            children: Vec::new(),
            flags: BoxFlags::empty(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            offset_v: 0.0,
            clearance: 0.0,
            blanks: Blanks::default(),
        }
    }

    /// A block box that still needs layout.
    #[must_use]
    pub fn new_block(node: Option<NodeId>, style: Rc<ComputedStyle>) -> Self {
        let mut b = Self::new(node, style, BoxKind::Block(BlockBox::default()));
        b.flags |= BoxFlags::NEEDS_LAYOUT;
        b
    }

    /// An anonymous block box wrapping a run of inline content.
    #[must_use]
    pub fn new_anonymous_block(style: Rc<ComputedStyle>) -> Self {
        let mut b = Self::new_block(None, style);
        b.flags |= BoxFlags::ANONYMOUS;
        b
    }

    /// An empty line box.
    #[must_use]
    pub fn new_line(style: Rc<ComputedStyle>) -> Self {
        Self::new(None, style, BoxKind::Line(LineBox::default()))
    }

    /// An empty inline box.
    #[must_use]
    pub fn new_inline(node: Option<NodeId>, style: Rc<ComputedStyle>) -> Self {
        Self::new(node, style, BoxKind::Inline(InlineBox::default()))
    }

    /// Whether this is a block box.
    #[must_use]
    pub const fn is_block(&self) -> bool {
        matches!(self.kind, BoxKind::Block(_))
    }

    /// Whether this is a line box.
    #[must_use]
    pub const fn is_line(&self) -> bool {
        matches!(self.kind, BoxKind::Line(_))
    }

    /// Whether this is an inline box.
    #[must_use]
    pub const fn is_inline(&self) -> bool {
        matches!(self.kind, BoxKind::Inline(_))
    }

    /// A floated block.
    #[must_use]
    pub fn is_float(&self) -> bool {
        self.is_block() && self.style.is_float()
    }

    /// The side a floated block is on.
    #[must_use]
    pub fn float_side(&self) -> Option<FloatSide> {
        if self.is_block() { self.style.float } else { None }
    }

    /// An absolutely positioned block kept at its static position.
    #[must_use]
    pub fn is_absolutely_positioned(&self) -> bool {
        self.is_block() && self.style.position.is_absolutely_positioned()
    }

    /// Generated by layout.
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.flags.contains(BoxFlags::ANONYMOUS)
    }

    /// Margin + border + padding on the left.
    #[must_use]
    pub fn blank_left(&self) -> f32 {
        self.blanks.left()
    }

    /// Margin + border + padding on the right.
    #[must_use]
    pub fn blank_right(&self) -> f32 {
        self.blanks.right()
    }

    /// Margin + border + padding on the top.
    #[must_use]
    pub fn blank_top(&self) -> f32 {
        self.blanks.top()
    }

    /// Margin + border + padding on the bottom.
    #[must_use]
    pub fn blank_bottom(&self) -> f32 {
        self.blanks.bottom()
    }

    /// Drop the left blanks (continuation from a previous line).
    pub const fn clear_blank_left(&mut self) {
        self.blanks.clear_left();
    }

    /// Drop the right blanks (continued on the next line).
    pub const fn clear_blank_right(&mut self) {
        self.blanks.clear_right();
    }

    /// Margin-box width.
    #[must_use]
    pub fn total_width(&self) -> f32 {
        self.blank_left() + self.width + self.blank_right()
    }

    /// Margin-box height.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.blank_top() + self.height + self.blank_bottom()
    }

    /// The horizontal room a float takes from a line: its margin-box width,
    /// never negative.
    #[must_use]
    pub fn effective_total_width(&self) -> f32 {
        self.total_width().max(0.0)
    }
}

/// Arena of layout boxes.
#[derive(Debug, Clone, Default)]
pub struct BoxTree {
    boxes: Vec<LayoutBox>,
    root: Option<BoxId>,
}

impl BoxTree {
    /// An empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            boxes: Vec::new(),
            root: None,
        }
    }

    /// The root block, once layout has produced one.
    #[must_use]
    pub const fn root(&self) -> Option<BoxId> {
        self.root
    }

    /// Mark `id` as the root block.
    pub const fn set_root(&mut self, id: BoxId) {
        self.root = Some(id);
    }

    /// Number of boxes ever allocated, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether no box has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Add a detached box to the arena.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Allocation`] when the arena cannot grow.
    pub fn alloc(&mut self, layout_box: LayoutBox) -> Result<BoxId, LayoutError> {
        self.boxes.try_reserve(1)?;
        let id = BoxId(self.boxes.len());
        self.boxes.push(layout_box);
        Ok(id)
    }

    /// Borrow a box.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    #[must_use]
    pub fn get(&self, id: BoxId) -> &LayoutBox {
        &self.boxes[id.0]
    }

    /// Mutably borrow a box.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not allocated by this tree.
    pub fn get_mut(&mut self, id: BoxId) -> &mut LayoutBox {
        &mut self.boxes[id.0]
    }

    /// The containing box.
    #[must_use]
    pub fn parent(&self, id: BoxId) -> Option<BoxId> {
        self.get(id).parent
    }

    /// Children in order.
    #[must_use]
    pub fn children(&self, id: BoxId) -> &[BoxId] {
        &self.get(id).children
    }

    /// First child.
    #[must_use]
    pub fn first_child(&self, id: BoxId) -> Option<BoxId> {
        self.get(id).children.first().copied()
    }

    /// Last child.
    #[must_use]
    pub fn last_child(&self, id: BoxId) -> Option<BoxId> {
        self.get(id).children.last().copied()
    }

    /// The sibling before `id`.
    #[must_use]
    pub fn previous_sibling(&self, id: BoxId) -> Option<BoxId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let index = siblings.iter().position(|&c| c == id)?;
        index.checked_sub(1).map(|i| siblings[i])
    }

    /// Whether `id` is its parent's first child.
    #[must_use]
    pub fn is_first_child(&self, id: BoxId) -> bool {
        self.parent(id)
            .is_some_and(|parent| self.first_child(parent) == Some(id))
    }

    /// Append a detached box as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `child` already has a parent.
    pub fn append_child(&mut self, parent: BoxId, child: BoxId) {
        let index = self.children(parent).len();
        self.insert_child(parent, index, child);
    }

    /// Insert a detached box at `index` among `parent`'s children.
    ///
    /// # Panics
    ///
    /// Panics if `child` already has a parent, or `index` is out of range.
    pub fn insert_child(&mut self, parent: BoxId, index: usize, child: BoxId) {
        assert!(
            self.get(child).parent.is_none(),
            "box {child:?} is already attached"
        );
        self.get_mut(parent).children.insert(index, child);
        self.get_mut(child).parent = Some(parent);
    }

    /// Remove `child` from its parent. A detached box is left alone.
    pub fn detach(&mut self, child: BoxId) {
        let Some(parent) = self.get_mut(child).parent.take() else {
            return;
        };
        self.get_mut(parent).children.retain(|&c| c != child);
    }

    /// Detach every child of `parent`.
    pub fn clear_children(&mut self, parent: BoxId) {
        let children = std::mem::take(&mut self.get_mut(parent).children);
        for child in children {
            self.get_mut(child).parent = None;
        }
    }

    /// Block-specific state, if `id` is a block.
    #[must_use]
    pub fn block(&self, id: BoxId) -> Option<&BlockBox> {
        match &self.get(id).kind {
            BoxKind::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Mutable block-specific state, if `id` is a block.
    pub fn block_mut(&mut self, id: BoxId) -> Option<&mut BlockBox> {
        match &mut self.get_mut(id).kind {
            BoxKind::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Line-specific state, if `id` is a line.
    #[must_use]
    pub fn line(&self, id: BoxId) -> Option<&LineBox> {
        match &self.get(id).kind {
            BoxKind::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Mutable line-specific state, if `id` is a line.
    pub fn line_mut(&mut self, id: BoxId) -> Option<&mut LineBox> {
        match &mut self.get_mut(id).kind {
            BoxKind::Line(line) => Some(line),
            _ => None,
        }
    }

    /// Inline-specific state, if `id` is an inline box.
    #[must_use]
    pub fn inline(&self, id: BoxId) -> Option<&InlineBox> {
        match &self.get(id).kind {
            BoxKind::Inline(inline) => Some(inline),
            _ => None,
        }
    }

    /// Raise the minimum content width of `block` to at least `width`.
    pub fn update_mcw(&mut self, block: BoxId, width: f32) {
        if let Some(state) = self.block_mut(block) {
            state.mcw = state.mcw.max(width);
        }
    }

    /// Sum of the margin-box widths of `ids`.
    #[must_use]
    pub fn total_width_of(&self, ids: &[BoxId]) -> f32 {
        ids.iter().map(|&id| self.get(id).total_width()).sum()
    }

    /// Whether the line holds anything other than floats.
    #[must_use]
    pub fn has_child_boxes(&self, line: BoxId) -> bool {
        self.children(line).iter().any(|&c| !self.get(c).is_float())
    }

    /// The last in-flow inline box of a line, skipping floats and
    /// positioned boxes.
    #[must_use]
    pub fn last_inline_child(&self, line: BoxId) -> Option<BoxId> {
        self.children(line)
            .iter()
            .rev()
            .copied()
            .find(|&c| self.get(c).is_inline())
    }

    /// Resolve the position of `id` and its subtree, given the margin-box
    /// origin `(left, top)` chosen by its parent.
    pub fn resolve_xy(&mut self, id: BoxId, left: f32, top: f32) {
        match self.get(id).kind {
            BoxKind::Block(_) => self.resolve_block_xy(id, left, top),
            BoxKind::Line(_) => self.resolve_line_xy(id, left, top),
            BoxKind::Inline(_) => self.resolve_inline_xy(id, left, top),
        }
    }

    /// Block children stack vertically; each child first moves down by its
    /// clearance, then takes its margin-box height.
    fn resolve_block_xy(&mut self, id: BoxId, left: f32, top: f32) {
        let (content_left, mut cursor) = {
            let b = self.get_mut(id);
            b.x = left;
            b.y = top;
            (left + b.blank_left(), top + b.blank_top())
        };
        for child in self.children(id).to_vec() {
            cursor += self.get(child).clearance;
            self.resolve_xy(child, content_left, cursor);
            cursor += self.get(child).total_height();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> Rc<ComputedStyle> {
        Rc::new(ComputedStyle::default())
    }

    #[test]
    fn test_append_and_detach() {
        let mut tree = BoxTree::new();
        let block = tree.alloc(LayoutBox::new_block(None, style())).unwrap();
        let a = tree.alloc(LayoutBox::new_line(style())).unwrap();
        let b = tree.alloc(LayoutBox::new_line(style())).unwrap();
        tree.append_child(block, a);
        tree.append_child(block, b);

        assert_eq!(tree.children(block), &[a, b]);
        assert!(tree.is_first_child(a));
        assert_eq!(tree.previous_sibling(b), Some(a));

        tree.detach(a);
        assert_eq!(tree.children(block), &[b]);
        assert_eq!(tree.parent(a), None);
        assert!(tree.is_first_child(b));
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn test_attaching_twice_panics() {
        let mut tree = BoxTree::new();
        let block = tree.alloc(LayoutBox::new_block(None, style())).unwrap();
        let line = tree.alloc(LayoutBox::new_line(style())).unwrap();
        tree.append_child(block, line);
        tree.append_child(block, line);
    }

    #[test]
    fn test_effective_total_width_is_never_negative() {
        let mut b = LayoutBox::new_block(None, style());
        b.width = 10.0;
        b.blanks.margin.left = -30.0;
        assert_eq!(b.total_width(), -20.0);
        assert_eq!(b.effective_total_width(), 0.0);
    }

    #[test]
    fn test_update_mcw_keeps_maximum() {
        let mut tree = BoxTree::new();
        let block = tree.alloc(LayoutBox::new_block(None, style())).unwrap();
        tree.update_mcw(block, 30.0);
        tree.update_mcw(block, 10.0);
        assert_eq!(tree.block(block).map(|b| b.mcw), Some(30.0));
    }
}
