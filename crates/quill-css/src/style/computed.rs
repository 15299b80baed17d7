//! Computed style values.
//!
//! [§ 6.1.2 Computed values](https://www.w3.org/TR/CSS2/cascade.html#computed-value)
//!
//! "Specified values are resolved to computed values during the cascade."
//! Here the cascade is already done: a [`StyleDeclaration`] holds what was
//! specified, and [`ComputedStyle::compute`] applies inheritance and initial
//! values on top of the parent's computed style.

use std::cell::Cell;

use crate::layout::box_model::EdgeSizes;
use crate::layout::float::FloatSide;

use super::declaration::StyleDeclaration;
use super::values::{
    AutoLength, Display, FloatValue, LineHeight, Position, PseudoElement, Spacing, TextAlign,
    TextTransform, VerticalAlign, Visibility, WhiteSpace,
};

/// Font size used when nothing up the tree declares one.
pub const DEFAULT_FONT_SIZE: f32 = 16.0;

/// Font family used when nothing up the tree declares one.
pub const DEFAULT_FONT_FAMILY: &str = "serif";

/// Margin edges before `auto` is resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginEdges {
    /// `margin-top`
    pub top: AutoLength,
    /// `margin-right`
    pub right: AutoLength,
    /// `margin-bottom`
    pub bottom: AutoLength,
    /// `margin-left`
    pub left: AutoLength,
}

impl Default for MarginEdges {
    fn default() -> Self {
        Self {
            top: AutoLength::Px(0.0),
            right: AutoLength::Px(0.0),
            bottom: AutoLength::Px(0.0),
            left: AutoLength::Px(0.0),
        }
    }
}

impl MarginEdges {
    /// Resolve every `auto` to zero.
    #[must_use]
    pub const fn auto_as_zero(&self) -> EdgeSizes {
        EdgeSizes {
            top: self.top.to_px_or(0.0),
            right: self.right.to_px_or(0.0),
            bottom: self.bottom.to_px_or(0.0),
            left: self.left.to_px_or(0.0),
        }
    }
}

/// Which edges of an inline element carry margin, border or padding.
///
/// Memoized per style by [`ComputedStyle::check_empty_inline`] because the
/// answer is asked for every text run inside the element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EmptyInline {
    /// Not computed yet.
    Unchecked = 0,
    /// Only the start edge has a blank.
    Start = 1,
    /// Only the end edge has a blank.
    End = 2,
    /// Both edges have a blank.
    Both = 3,
    /// Neither edge has a blank: an empty element collapses away.
    Bare = 4,
}

impl EmptyInline {
    /// The start (left) edge contributes width.
    #[must_use]
    pub const fn has_start_blank(self) -> bool {
        matches!(self, Self::Start | Self::Both)
    }

    /// The end (right) edge contributes width.
    #[must_use]
    pub const fn has_end_blank(self) -> bool {
        matches!(self, Self::End | Self::Both)
    }
}

/// A fully computed style for one element or pseudo-element.
#[derive(Debug, Clone)]
pub struct ComputedStyle {
    /// `display`, after the float/position fix-up of § 9.7.
    pub display: Display,
    /// `position`
    pub position: Position,
    /// `float`; `None` when not floated.
    pub float: Option<FloatSide>,
    /// `visibility`
    pub visibility: Visibility,
    /// `white-space`
    pub white_space: WhiteSpace,
    /// `text-align`
    pub text_align: TextAlign,
    /// `text-transform`
    pub text_transform: TextTransform,
    /// `vertical-align`
    pub vertical_align: VerticalAlign,
    /// `font-family`
    pub font_family: String,
    /// `font-size` in px.
    pub font_size: f32,
    /// `line-height`; numbers stay unresolved so children inherit the factor.
    pub line_height: LineHeight,
    /// `letter-spacing`
    pub letter_spacing: Spacing,
    /// `word-spacing`
    pub word_spacing: Spacing,
    /// `width`
    pub width: AutoLength,
    /// `height`
    pub height: AutoLength,
    /// `margin-*`
    pub margin: MarginEdges,
    /// `padding-*`
    pub padding: EdgeSizes,
    /// `border-*-width`
    pub border: EdgeSizes,
    /// The pseudo-element this style was computed for.
    pub pseudo: PseudoElement,
    declared: StyleDeclaration,
    empty_inline: Cell<EmptyInline>,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self::compute(&StyleDeclaration::default(), None, PseudoElement::None)
    }
}

impl ComputedStyle {
    /// [§ 6.2 Inheritance](https://www.w3.org/TR/CSS2/cascade.html#inheritance)
    ///
    /// "When inheritance occurs, elements inherit computed values."
    ///
    /// Inherited properties that `declared` leaves unset take the parent's
    /// value; all others take their initial value.
    #[must_use]
    pub fn compute(
        declared: &StyleDeclaration,
        parent: Option<&Self>,
        pseudo: PseudoElement,
    ) -> Self {
        macro_rules! inherit {
            ($field:ident, $initial:expr) => {
                declared
                    .$field
                    .or_else(|| parent.map(|p| p.$field))
                    .unwrap_or($initial)
            };
        }

        let position = declared.position.unwrap_or_default();
        let float = if position.is_absolutely_positioned() {
            // [§ 9.7](https://www.w3.org/TR/CSS2/visuren.html#dis-pos-flo)
            // "Otherwise, if 'position' has the value 'absolute' or 'fixed',
            // the box is absolutely positioned, the computed value of 'float'
            // is 'none'"
            None
        } else {
            match declared.float.unwrap_or_default() {
                FloatValue::None => None,
                FloatValue::Left => Some(FloatSide::Left),
                FloatValue::Right => Some(FloatSide::Right),
            }
        };

        let mut display = declared.display.unwrap_or_default();
        if display != Display::None && (float.is_some() || position.is_absolutely_positioned()) {
            // "Otherwise, if 'float' has a value other than 'none', the box is
            // floated and 'display' is set according to the table below."
            if display.is_inline_level() {
                display = Display::Block;
            }
        }

        let zero = AutoLength::Px(0.0);
        Self {
            display,
            position,
            float,
            visibility: inherit!(visibility, Visibility::Visible),
            white_space: inherit!(white_space, WhiteSpace::Normal),
            text_align: inherit!(text_align, TextAlign::Default),
            text_transform: inherit!(text_transform, TextTransform::None),
            vertical_align: declared.vertical_align.unwrap_or_default(),
            font_family: declared
                .font_family
                .clone()
                .or_else(|| parent.map(|p| p.font_family.clone()))
                .unwrap_or_else(|| DEFAULT_FONT_FAMILY.to_string()),
            font_size: inherit!(font_size, DEFAULT_FONT_SIZE),
            line_height: inherit!(line_height, LineHeight::Normal),
            letter_spacing: inherit!(letter_spacing, Spacing::Normal),
            word_spacing: inherit!(word_spacing, Spacing::Normal),
            width: declared.width.unwrap_or_default(),
            height: declared.height.unwrap_or_default(),
            margin: MarginEdges {
                top: declared.margin_top.unwrap_or(zero),
                right: declared.margin_right.unwrap_or(zero),
                bottom: declared.margin_bottom.unwrap_or(zero),
                left: declared.margin_left.unwrap_or(zero),
            },
            padding: EdgeSizes {
                top: declared.padding_top.unwrap_or(0.0),
                right: declared.padding_right.unwrap_or(0.0),
                bottom: declared.padding_bottom.unwrap_or(0.0),
                left: declared.padding_left.unwrap_or(0.0),
            },
            border: EdgeSizes {
                top: declared.border_top_width.unwrap_or(0.0),
                right: declared.border_right_width.unwrap_or(0.0),
                bottom: declared.border_bottom_width.unwrap_or(0.0),
                left: declared.border_left_width.unwrap_or(0.0),
            },
            pseudo,
            declared: declared.clone(),
            empty_inline: Cell::new(EmptyInline::Unchecked),
        }
    }

    /// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
    ///
    /// "The properties of anonymous boxes are inherited from the enclosing
    /// non-anonymous box."
    #[must_use]
    pub fn anonymous_block(parent: &Self) -> Self {
        let declared = StyleDeclaration {
            display: Some(Display::Block),
            ..StyleDeclaration::default()
        };
        Self::compute(&declared, Some(parent), PseudoElement::None)
    }

    /// The values this style was computed from.
    #[must_use]
    pub const fn declared(&self) -> &StyleDeclaration {
        &self.declared
    }

    /// The element's `::first-line` declarations, if it has any.
    #[must_use]
    pub fn first_line_declaration(&self) -> Option<&StyleDeclaration> {
        self.declared.first_line.as_deref()
    }

    /// The element's `::first-letter` declarations, if it has any.
    #[must_use]
    pub fn first_letter_declaration(&self) -> Option<&StyleDeclaration> {
        self.declared.first_letter.as_deref()
    }

    /// Floated left or right.
    #[must_use]
    pub const fn is_float(&self) -> bool {
        self.float.is_some()
    }

    /// The used line height in px.
    #[must_use]
    pub fn used_line_height(&self) -> f32 {
        self.line_height.resolve(self.font_size)
    }

    /// Extra advance after every character, or `None` for `normal`.
    #[must_use]
    pub const fn letter_spacing_px(&self) -> Option<f32> {
        match self.letter_spacing {
            Spacing::Normal => None,
            Spacing::Px(px) => Some(px),
        }
    }

    /// Extra advance after every space character.
    #[must_use]
    pub const fn word_spacing_px(&self) -> f32 {
        match self.word_spacing {
            Spacing::Normal => 0.0,
            Spacing::Px(px) => px,
        }
    }

    /// Margin + border + padding on the start edge, `auto` as zero.
    #[must_use]
    pub fn blank_left(&self) -> f32 {
        self.margin.left.to_px_or(0.0) + self.border.left + self.padding.left
    }

    /// Margin + border + padding on the end edge, `auto` as zero.
    #[must_use]
    pub fn blank_right(&self) -> f32 {
        self.margin.right.to_px_or(0.0) + self.border.right + self.padding.right
    }

    /// Classify which edges of this inline element carry blanks.
    ///
    /// The first call computes and stores the answer; later calls return
    /// the stored value.
    pub fn check_empty_inline(&self) -> EmptyInline {
        let memo = self.empty_inline.get();
        if memo != EmptyInline::Unchecked {
            return memo;
        }
        let computed = match (self.blank_left() != 0.0, self.blank_right() != 0.0) {
            (true, true) => EmptyInline::Both,
            (true, false) => EmptyInline::Start,
            (false, true) => EmptyInline::End,
            (false, false) => EmptyInline::Bare,
        };
        self.empty_inline.set(computed);
        computed
    }

    /// The memoized classification without computing it.
    #[must_use]
    pub fn empty_inline(&self) -> EmptyInline {
        self.empty_inline.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inherited_properties_flow_to_children() {
        let parent = ComputedStyle::compute(
            &StyleDeclaration {
                font_size: Some(20.0),
                white_space: Some(WhiteSpace::Pre),
                padding_left: Some(5.0),
                ..StyleDeclaration::default()
            },
            None,
            PseudoElement::None,
        );
        let child = ComputedStyle::compute(&StyleDeclaration::default(), Some(&parent), PseudoElement::None);
        assert_eq!(child.font_size, 20.0);
        assert_eq!(child.white_space, WhiteSpace::Pre);
        assert_eq!(child.padding.left, 0.0);
    }

    #[test]
    fn test_line_height_number_is_inherited_as_factor() {
        let parent = ComputedStyle::compute(
            &StyleDeclaration {
                font_size: Some(10.0),
                line_height: Some(LineHeight::Number(2.0)),
                ..StyleDeclaration::default()
            },
            None,
            PseudoElement::None,
        );
        let child = ComputedStyle::compute(
            &StyleDeclaration {
                font_size: Some(30.0),
                ..StyleDeclaration::default()
            },
            Some(&parent),
            PseudoElement::None,
        );
        assert_eq!(parent.used_line_height(), 20.0);
        assert_eq!(child.used_line_height(), 60.0);
    }

    #[test]
    fn test_float_blockifies_inline() {
        let style = ComputedStyle::compute(
            &StyleDeclaration {
                float: Some(FloatValue::Left),
                ..StyleDeclaration::default()
            },
            None,
            PseudoElement::FirstLetter,
        );
        assert_eq!(style.display, Display::Block);
        assert_eq!(style.float, Some(FloatSide::Left));
    }

    #[test]
    fn test_absolute_position_cancels_float() {
        let style = ComputedStyle::compute(
            &StyleDeclaration {
                float: Some(FloatValue::Right),
                position: Some(Position::Absolute),
                ..StyleDeclaration::default()
            },
            None,
            PseudoElement::None,
        );
        assert_eq!(style.float, None);
        assert_eq!(style.display, Display::Block);
    }

    #[test]
    fn test_check_empty_inline_is_memoized() {
        let style = ComputedStyle::compute(
            &StyleDeclaration {
                border_right_width: Some(1.0),
                ..StyleDeclaration::default()
            },
            None,
            PseudoElement::None,
        );
        assert_eq!(style.empty_inline(), EmptyInline::Unchecked);
        assert_eq!(style.check_empty_inline(), EmptyInline::End);
        assert_eq!(style.empty_inline(), EmptyInline::End);
        assert!(style.check_empty_inline().has_end_blank());
        assert!(!style.check_empty_inline().has_start_blank());
    }
}
