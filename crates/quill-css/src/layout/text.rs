//! Fonts, text measurement and line-break opportunities.
//!
//! Layout never shapes text itself. It asks a [`TextOracle`] where the next
//! break opportunity is and which font a style resolves to, and asks the
//! resulting [`FontMetrics`] how wide each character is. Tests and the
//! command line tool use [`FixedAdvanceFont`] and [`SimpleTextOracle`].

use std::collections::HashMap;
use std::fmt::Debug;
use std::rc::Rc;

use quill_common::{Component, warn_once};

use crate::style::{ComputedStyle, TextTransform};

/// Font metrics interface for text measurement during layout.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
///
/// Every method takes the font size in px (`point`). Vertical offsets are
/// positive distances from the baseline: `descender` and
/// `underline_position` measure downwards, the others upwards.
pub trait FontMetrics: Debug {
    /// Advance width of one character.
    fn advance(&self, ch: char, point: f32) -> f32;

    /// Height above the baseline.
    fn ascender(&self, point: f32) -> f32;

    /// Depth below the baseline.
    fn descender(&self, point: f32) -> f32;

    /// Height of the content area of an inline box using this font.
    fn line_height(&self, point: f32) -> f32 {
        self.ascender(point) + self.descender(point)
    }

    /// Height of a lowercase letter above the baseline.
    fn x_height(&self, point: f32) -> f32 {
        self.ascender(point) * 0.5
    }

    /// Distance from the baseline down to the underline.
    fn underline_position(&self, point: f32) -> f32 {
        self.descender(point) * 0.5
    }

    /// Thickness of the underline.
    fn underline_thickness(&self, point: f32) -> f32 {
        (point / 16.0).max(1.0)
    }

    /// Distance from the baseline up to the line-through stroke.
    fn line_through_position(&self, point: f32) -> f32 {
        self.x_height(point) * 0.5
    }

    /// Thickness of the line-through stroke.
    fn line_through_thickness(&self, point: f32) -> f32 {
        self.underline_thickness(point)
    }

    /// How far `vertical-align: sub` lowers the baseline.
    fn sub_offset(&self, point: f32) -> f32 {
        point * 0.2
    }

    /// How far `vertical-align: super` raises the baseline.
    fn super_offset(&self, point: f32) -> f32 {
        point * 0.35
    }

    /// Sum of the advances of every character in `text`.
    fn measure(&self, text: &str, point: f32) -> f32 {
        text.chars().map(|c| self.advance(c, point)).sum()
    }
}

/// Font metrics where every visible character has the same advance.
///
/// All values are fractions of the font size. Control characters
/// (including a trailing newline kept in a text unit) advance by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedAdvanceFont {
    /// Advance of every visible character, in em.
    pub advance: f32,
    /// Ascender, in em.
    pub ascent: f32,
    /// Descender, in em.
    pub descent: f32,
}

impl FixedAdvanceFont {
    /// A font with the given per-character advance, in em.
    #[must_use]
    pub const fn new(advance: f32, ascent: f32, descent: f32) -> Self {
        Self {
            advance,
            ascent,
            descent,
        }
    }

    /// A font where each character is exactly one em wide.
    #[must_use]
    pub const fn monospace_em() -> Self {
        Self::new(1.0, 0.8, 0.2)
    }
}

impl Default for FixedAdvanceFont {
    /// The average advance width of Latin glyphs in a proportional font is
    /// approximately 0.6× the font size (typical for Helvetica/Arial body
    /// text).
    fn default() -> Self {
        Self::new(0.6, 0.8, 0.2)
    }
}

impl FontMetrics for FixedAdvanceFont {
    fn advance(&self, ch: char, point: f32) -> f32 {
        if ch.is_control() {
            0.0
        } else {
            self.advance * point
        }
    }

    fn ascender(&self, point: f32) -> f32 {
        self.ascent * point
    }

    fn descender(&self, point: f32) -> f32 {
        self.descent * point
    }
}

/// A font selected for one style: metrics plus size.
#[derive(Debug, Clone)]
pub struct ActiveFont {
    /// The resolved face.
    pub metrics: Rc<dyn FontMetrics>,
    /// Font size in px.
    pub point: f32,
}

impl ActiveFont {
    /// Advance width of `ch`.
    #[must_use]
    pub fn advance(&self, ch: char) -> f32 {
        self.metrics.advance(ch, self.point)
    }

    /// Height above the baseline.
    #[must_use]
    pub fn ascender(&self) -> f32 {
        self.metrics.ascender(self.point)
    }

    /// Depth below the baseline.
    #[must_use]
    pub fn descender(&self) -> f32 {
        self.metrics.descender(self.point)
    }

    /// Height of the content area.
    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.metrics.line_height(self.point)
    }
}

/// The questions layout asks about text.
pub trait TextOracle {
    /// The byte index of the first break opportunity after `cursor`, or
    /// `text.len()` if there is none. Always greater than `cursor` while
    /// `cursor < text.len()`.
    fn next_boundary(&self, text: &str, cursor: usize) -> usize;

    /// Whether `text` begins a word, so `text-transform: capitalize`
    /// applies to its first letter.
    fn is_first_character_of(&self, text: &str) -> bool;

    /// Pick the font for `style`.
    fn resolve_font(&self, style: &ComputedStyle) -> ActiveFont;
}

/// A break-opportunity finder good enough for Latin and CJK text.
///
/// - A run of spaces or tabs ends a unit; the spaces stay with the word
///   before them.
/// - A newline ends a unit and is included in it.
/// - Every CJK ideograph is a unit of its own.
#[derive(Debug, Clone)]
pub struct SimpleTextOracle {
    default_font: Rc<dyn FontMetrics>,
    families: HashMap<String, Rc<dyn FontMetrics>>,
}

impl Default for SimpleTextOracle {
    fn default() -> Self {
        Self::new(Rc::new(FixedAdvanceFont::default()))
    }
}

impl SimpleTextOracle {
    /// An oracle that resolves every family to `default_font`.
    #[must_use]
    pub fn new(default_font: Rc<dyn FontMetrics>) -> Self {
        Self {
            default_font,
            families: HashMap::new(),
        }
    }

    /// Register a face for one `font-family` name.
    #[must_use]
    pub fn with_family(mut self, family: &str, metrics: Rc<dyn FontMetrics>) -> Self {
        let _ = self.families.insert(family.to_ascii_lowercase(), metrics);
        self
    }
}

impl TextOracle for SimpleTextOracle {
    fn next_boundary(&self, text: &str, cursor: usize) -> usize {
        let mut chars = text[cursor..].char_indices().peekable();
        let mut seen_space = false;
        while let Some((i, c)) = chars.next() {
            if c == '\n' {
                return cursor + i + c.len_utf8();
            }
            if c == ' ' || c == '\t' {
                seen_space = true;
                continue;
            }
            if seen_space || (i > 0 && is_ideograph(c)) {
                return cursor + i;
            }
            if is_ideograph(c) {
                match chars.peek() {
                    Some(&(_, ' ' | '\t' | '\n')) | None => {}
                    Some(&(j, _)) => return cursor + j,
                }
            }
        }
        text.len()
    }

    fn is_first_character_of(&self, text: &str) -> bool {
        text.chars()
            .find(|c| !c.is_ascii_punctuation())
            .is_some_and(char::is_alphanumeric)
    }

    fn resolve_font(&self, style: &ComputedStyle) -> ActiveFont {
        let family = style.font_family.to_ascii_lowercase();
        let metrics = if let Some(face) = self.families.get(&family) {
            Rc::clone(face)
        } else {
            if !self.families.is_empty() {
                warn_once(
                    Component::Text,
                    &format!("font-family '{}' not found, using the default face", style.font_family),
                );
            }
            Rc::clone(&self.default_font)
        };
        ActiveFont {
            metrics,
            point: style.font_size,
        }
    }
}

/// CJK Unified Ideographs, Hiragana, Katakana and Hangul syllables.
fn is_ideograph(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'
        | '\u{3400}'..='\u{4DBF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{AC00}'..='\u{D7AF}'
        | '\u{F900}'..='\u{FAFF}'
    )
}

/// The result of measuring one text unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Measured {
    /// The text after `text-transform`.
    pub text: String,
    /// Total advance including letter and word spacing.
    pub width: f32,
    /// Advance of the last glyph alone, without spacing.
    pub last_advance: f32,
}

/// Apply `text-transform` to `text` and measure it with `font`.
///
/// [§ 16.4 Letter and word spacing](https://www.w3.org/TR/CSS2/text.html#spacing-props)
///
/// Letter spacing is added after every character; word spacing after every
/// space. `is_first_character` says whether `text` starts a word, for
/// `capitalize`.
#[must_use]
pub fn measure_text(
    style: &ComputedStyle,
    font: &ActiveFont,
    text: &str,
    is_first_character: bool,
) -> Measured {
    let mut transformed = String::with_capacity(text.len());
    let mut word_start = is_first_character;
    for c in text.chars() {
        match style.text_transform {
            TextTransform::None => transformed.push(c),
            TextTransform::Uppercase => transformed.extend(c.to_uppercase()),
            TextTransform::Lowercase => transformed.extend(c.to_lowercase()),
            TextTransform::Capitalize => {
                if word_start && c.is_alphabetic() {
                    transformed.extend(c.to_uppercase());
                } else {
                    transformed.push(c);
                }
            }
        }
        if c.is_whitespace() {
            word_start = true;
        } else if c.is_alphanumeric() {
            word_start = false;
        }
    }

    let (width, last_advance) = spaced_width(style, font, &transformed);
    Measured {
        text: transformed,
        width,
        last_advance,
    }
}

/// Width of already transformed `text` including letter and word spacing,
/// and the bare advance of its last glyph.
#[must_use]
pub fn spaced_width(style: &ComputedStyle, font: &ActiveFont, text: &str) -> (f32, f32) {
    let letter_spacing = style.letter_spacing_px().unwrap_or(0.0);
    let word_spacing = style.word_spacing_px();
    let mut width = 0.0;
    let mut last_advance = 0.0;
    for c in text.chars() {
        if c == '\n' {
            continue;
        }
        last_advance = font.advance(c);
        width += last_advance + letter_spacing;
        if c == ' ' {
            width += word_spacing;
        }
    }
    (width, last_advance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Spacing, StyleDeclaration};

    fn style(decl: StyleDeclaration) -> ComputedStyle {
        ComputedStyle::compute(&decl, None, crate::style::PseudoElement::None)
    }

    fn boundaries(text: &str) -> Vec<usize> {
        let oracle = SimpleTextOracle::default();
        let mut out = Vec::new();
        let mut cursor = 0;
        while cursor < text.len() {
            cursor = oracle.next_boundary(text, cursor);
            out.push(cursor);
        }
        out
    }

    #[test]
    fn test_boundaries_keep_spaces_with_word() {
        assert_eq!(boundaries("aa bb  cc"), vec![3, 7, 9]);
    }

    #[test]
    fn test_boundary_includes_newline() {
        assert_eq!(boundaries("ab\ncd"), vec![3, 5]);
    }

    #[test]
    fn test_ideographs_break_individually() {
        let text = "漢字 ab";
        assert_eq!(boundaries(text), vec![3, 7, text.len()]);
    }

    #[test]
    fn test_measure_applies_spacing() {
        let s = style(StyleDeclaration {
            font_size: Some(10.0),
            letter_spacing: Some(Spacing::Px(1.0)),
            word_spacing: Some(Spacing::Px(2.0)),
            ..StyleDeclaration::default()
        });
        let font = ActiveFont {
            metrics: Rc::new(FixedAdvanceFont::monospace_em()),
            point: 10.0,
        };
        let m = measure_text(&s, &font, "ab ", true);
        assert_eq!(m.width, 3.0 * 11.0 + 2.0);
        assert_eq!(m.last_advance, 10.0);
    }

    #[test]
    fn test_capitalize_respects_word_start() {
        let s = style(StyleDeclaration {
            text_transform: Some(TextTransform::Capitalize),
            ..StyleDeclaration::default()
        });
        let font = SimpleTextOracle::default().resolve_font(&s);
        assert_eq!(measure_text(&s, &font, "one two", true).text, "One Two");
        assert_eq!(measure_text(&s, &font, "ne two", false).text, "ne Two");
    }

    #[test]
    fn test_first_character_skips_punctuation() {
        let oracle = SimpleTextOracle::default();
        assert!(oracle.is_first_character_of("\"hello"));
        assert!(!oracle.is_first_character_of("  "));
    }
}
