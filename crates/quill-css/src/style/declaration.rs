//! Declared (specified) style values.
//!
//! A [`StyleDeclaration`] is what a scene file or a test writes down for one
//! element: every property is optional, and an unset property either
//! inherits or takes its initial value when the style is computed.

use serde::{Deserialize, Serialize};

use super::values::{
    AutoLength, Display, FloatValue, LineHeight, Position, Spacing, TextAlign, TextTransform,
    VerticalAlign, Visibility, WhiteSpace,
};

/// The declared values of one element, plus its `::first-line` and
/// `::first-letter` rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct StyleDeclaration {
    /// `display`
    pub display: Option<Display>,
    /// `position`
    pub position: Option<Position>,
    /// `float`
    pub float: Option<FloatValue>,
    /// `visibility` (inherited)
    pub visibility: Option<Visibility>,
    /// `white-space` (inherited)
    pub white_space: Option<WhiteSpace>,
    /// `text-align` (inherited)
    pub text_align: Option<TextAlign>,
    /// `text-transform` (inherited)
    pub text_transform: Option<TextTransform>,
    /// `vertical-align`
    pub vertical_align: Option<VerticalAlign>,
    /// `font-family` (inherited)
    pub font_family: Option<String>,
    /// `font-size` in px (inherited)
    pub font_size: Option<f32>,
    /// `line-height` (inherited)
    pub line_height: Option<LineHeight>,
    /// `letter-spacing` (inherited)
    pub letter_spacing: Option<Spacing>,
    /// `word-spacing` (inherited)
    pub word_spacing: Option<Spacing>,
    /// `width`
    pub width: Option<AutoLength>,
    /// `height`
    pub height: Option<AutoLength>,
    /// `margin-top`
    pub margin_top: Option<AutoLength>,
    /// `margin-right`
    pub margin_right: Option<AutoLength>,
    /// `margin-bottom`
    pub margin_bottom: Option<AutoLength>,
    /// `margin-left`
    pub margin_left: Option<AutoLength>,
    /// `padding-top`
    pub padding_top: Option<f32>,
    /// `padding-right`
    pub padding_right: Option<f32>,
    /// `padding-bottom`
    pub padding_bottom: Option<f32>,
    /// `padding-left`
    pub padding_left: Option<f32>,
    /// `border-top-width`
    pub border_top_width: Option<f32>,
    /// `border-right-width`
    pub border_right_width: Option<f32>,
    /// `border-bottom-width`
    pub border_bottom_width: Option<f32>,
    /// `border-left-width`
    pub border_left_width: Option<f32>,
    /// Declarations of this element's `::first-line` pseudo-element.
    pub first_line: Option<Box<StyleDeclaration>>,
    /// Declarations of this element's `::first-letter` pseudo-element.
    pub first_letter: Option<Box<StyleDeclaration>>,
}

/// Copies every field that `$src` sets onto `$dst`.
macro_rules! overlay {
    ($dst:ident, $src:ident; $($field:ident),* $(,)?) => {
        $(
            if let Some(value) = &$src.$field {
                $dst.$field = Some(value.clone());
            }
        )*
    };
}

impl StyleDeclaration {
    /// Overlay every property `other` sets onto `self`.
    ///
    /// Used to merge `::first-line` and `::first-letter` rules collected
    /// from several ancestors: later calls win.
    pub fn specify(&mut self, other: &Self) {
        overlay!(self, other;
            display, position, float, visibility, white_space, text_align,
            text_transform, vertical_align, font_family, font_size, line_height,
            letter_spacing, word_spacing, width, height,
            margin_top, margin_right, margin_bottom, margin_left,
            padding_top, padding_right, padding_bottom, padding_left,
            border_top_width, border_right_width, border_bottom_width, border_left_width,
            first_line, first_letter,
        );
    }

    /// Set all four margins.
    #[must_use]
    pub fn with_margin(mut self, margin: AutoLength) -> Self {
        self.margin_top = Some(margin);
        self.margin_right = Some(margin);
        self.margin_bottom = Some(margin);
        self.margin_left = Some(margin);
        self
    }

    /// Set all four paddings.
    #[must_use]
    pub fn with_padding(mut self, padding: f32) -> Self {
        self.padding_top = Some(padding);
        self.padding_right = Some(padding);
        self.padding_bottom = Some(padding);
        self.padding_left = Some(padding);
        self
    }

    /// Set all four border widths.
    #[must_use]
    pub fn with_border_width(mut self, width: f32) -> Self {
        self.border_top_width = Some(width);
        self.border_right_width = Some(width);
        self.border_bottom_width = Some(width);
        self.border_left_width = Some(width);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specify_overlays_only_set_fields() {
        let mut base = StyleDeclaration {
            font_size: Some(10.0),
            white_space: Some(WhiteSpace::Pre),
            ..StyleDeclaration::default()
        };
        let pseudo = StyleDeclaration {
            font_size: Some(20.0),
            ..StyleDeclaration::default()
        };
        base.specify(&pseudo);
        assert_eq!(base.font_size, Some(20.0));
        assert_eq!(base.white_space, Some(WhiteSpace::Pre));
    }

    #[test]
    fn test_with_padding_sets_every_side() {
        let decl = StyleDeclaration::default().with_padding(3.0);
        assert_eq!(decl.padding_top, Some(3.0));
        assert_eq!(decl.padding_left, Some(3.0));
        assert_eq!(decl.margin_left, None);
    }
}
