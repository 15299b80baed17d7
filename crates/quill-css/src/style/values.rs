//! Keyword and length values used by the inline layout engine.
//!
//! Values deserialize from scene files in their CSS spelling
//! (`"pre-wrap"`, `"inline-block"`) and print the same way.

use serde::{Deserialize, Serialize};
use strum_macros::Display as StrumDisplay;

/// [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Display {
    /// "This value causes an element to generate one or more inline boxes."
    #[default]
    Inline,
    /// "This value causes an element to generate a block box."
    Block,
    /// "This value causes an element to generate an inline-level block container."
    InlineBlock,
    /// "This value causes an element to generate a principal block box and a marker box."
    ListItem,
    /// "This value causes an element to not appear in the formatting structure."
    None,
}

impl Display {
    /// `display: inline` only. Inline-blocks are atomic and do not split.
    #[must_use]
    pub const fn is_inline(self) -> bool {
        matches!(self, Self::Inline)
    }

    /// Participates in an inline formatting context.
    #[must_use]
    pub const fn is_inline_level(self) -> bool {
        matches!(self, Self::Inline | Self::InlineBlock)
    }

    /// Participates in a block formatting context.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(self, Self::Block | Self::ListItem)
    }
}

/// [§ 16.6 White space: the 'white-space' property](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WhiteSpace {
    /// "This value directs user agents to collapse sequences of white space,
    /// and break lines as necessary to fill line boxes."
    #[default]
    Normal,
    /// "This value prevents user agents from collapsing sequences of white
    /// space. Lines are only broken at preserved newline characters."
    Pre,
    /// "This value collapses white space as for 'normal', but suppresses line
    /// breaks within text."
    Nowrap,
    /// "This value prevents user agents from collapsing sequences of white
    /// space. Lines are broken at preserved newline characters, and as
    /// necessary to fill line boxes."
    PreWrap,
    /// "This value directs user agents to collapse sequences of white space.
    /// Lines are broken at preserved newline characters, and as necessary to
    /// fill line boxes."
    PreLine,
}

impl WhiteSpace {
    /// Runs of spaces and tabs collapse to a single space.
    #[must_use]
    pub const fn is_collapsing_space(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Lines may be broken to fill line boxes.
    #[must_use]
    pub const fn is_breaking_lines(self) -> bool {
        matches!(self, Self::Normal | Self::PreWrap | Self::PreLine)
    }

    /// Newline characters in the source force a line break.
    #[must_use]
    pub const fn preserves_linefeed(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }
}

/// [§ 16.2 Alignment: the 'text-align' property](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TextAlign {
    /// The initial value; behaves as `left` in a left-to-right block.
    #[default]
    Default,
    /// Flush left.
    Left,
    /// Flush right.
    Right,
    /// Centered in the line box.
    Center,
    /// Accepted, laid out as `left`.
    Justify,
}

/// [§ 16.5 Capitalization: the 'text-transform' property](https://www.w3.org/TR/CSS2/text.html#caps-prop)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TextTransform {
    /// "No capitalization effects."
    #[default]
    None,
    /// "Puts the first character of each word in uppercase."
    Capitalize,
    /// "Puts all characters of each word in uppercase."
    Uppercase,
    /// "Puts all characters of each word in lowercase."
    Lowercase,
}

/// [§ 10.8.1 Leading and half-leading: 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum VerticalAlign {
    /// "Align the baseline of the box with the baseline of the parent box."
    #[default]
    Baseline,
    /// "Lower the baseline of the box to the proper position for subscripts."
    Sub,
    /// "Raise the baseline of the box to the proper position for superscripts."
    Super,
    /// "Align the top of the box with the top of the parent's content area."
    TextTop,
    /// "Align the bottom of the box with the bottom of the parent's content area."
    TextBottom,
    /// "Align the vertical midpoint of the box with the baseline of the
    /// parent box plus half the x-height of the parent."
    Middle,
    /// "Align the top of the aligned subtree with the top of the line box."
    Top,
    /// "Align the bottom of the aligned subtree with the bottom of the line box."
    Bottom,
    /// "Raise (positive value) or lower (negative value) the box by this distance."
    Length(f32),
}

/// [§ 9.3.1 Choosing a positioning scheme: 'position' property](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Position {
    /// A normal box, laid out according to the normal flow.
    #[default]
    Static,
    /// Laid out in normal flow; offsets are not applied here.
    Relative,
    /// Taken out of normal flow; kept at its static position in the line.
    Absolute,
    /// Like `absolute`, relative to the viewport.
    Fixed,
}

impl Position {
    /// `absolute` or `fixed`.
    #[must_use]
    pub const fn is_absolutely_positioned(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }
}

/// The declared `float` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FloatValue {
    /// Not floated.
    #[default]
    None,
    /// Floated to the left edge of the line.
    Left,
    /// Floated to the right edge of the line.
    Right,
}

/// [§ 11.2 Visibility: the 'visibility' property](https://www.w3.org/TR/CSS2/visufx.html#visibility)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Visibility {
    /// "The generated box is visible."
    #[default]
    Visible,
    /// "The generated box is invisible (fully transparent), but still affects layout."
    Hidden,
    /// Same as `hidden` outside tables.
    Collapse,
}

/// Which pseudo-element a computed style was resolved for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, StrumDisplay)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PseudoElement {
    /// An ordinary element style.
    #[default]
    None,
    /// [§ 5.12.1 The :first-line pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-line-pseudo)
    FirstLine,
    /// [§ 5.12.2 The :first-letter pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-letter)
    FirstLetter,
    /// The marker box of a list item. A marker ends the search for a
    /// `::first-letter` style further up the tree.
    Marker,
}

/// A length that may be `auto`.
///
/// Scene files spell these as `"auto"` or `{ "px": 12 }`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AutoLength {
    /// Resolved by the layout algorithm.
    #[default]
    Auto,
    /// An absolute length in CSS pixels.
    Px(f32),
}

impl AutoLength {
    /// The pixel value, or `fallback` for `auto`.
    #[must_use]
    pub const fn to_px_or(self, fallback: f32) -> f32 {
        match self {
            Self::Auto => fallback,
            Self::Px(px) => px,
        }
    }

    /// Whether this is `auto`.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }
}

/// [§ 16.4 Letter and word spacing](https://www.w3.org/TR/CSS2/text.html#spacing-props)
///
/// `normal` is kept distinct from `0px`: trailing-space trimming only
/// subtracts letter spacing when it was given explicitly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Spacing {
    /// "The spacing is the normal spacing for the current font."
    #[default]
    Normal,
    /// Extra spacing in CSS pixels, added to the normal spacing.
    Px(f32),
}

/// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineHeight {
    /// "Tells user agents to set the used value to a 'reasonable' value
    /// based on the font of the element." We use 1.2 × font-size.
    #[default]
    Normal,
    /// "The used value of the property is this number multiplied by the
    /// element's font size." Children inherit the number, not the result.
    Number(f32),
    /// An absolute line height in CSS pixels.
    Px(f32),
}

/// Multiplier used for `line-height: normal`.
pub const NORMAL_LINE_HEIGHT: f32 = 1.2;

impl LineHeight {
    /// The used line height for an element with the given font size.
    #[must_use]
    pub fn resolve(self, font_size: f32) -> f32 {
        match self {
            Self::Normal => font_size * NORMAL_LINE_HEIGHT,
            Self::Number(n) => font_size * n,
            Self::Px(px) => px,
        }
    }
}
