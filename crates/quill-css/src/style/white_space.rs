//! [§ 16.6.1 The 'white-space' processing model](https://www.w3.org/TR/CSS2/text.html#white-space-model)

use super::computed::ComputedStyle;
use super::values::WhiteSpace;

/// Columns between tab stops when tabs are preserved.
///
/// [CSS Text 3 § 4.2 Tab Character Size: the 'tab-size' property](https://www.w3.org/TR/css-text-3/#tab-size-property)
/// "Initial: 8"
pub const TAB_SIZE: usize = 8;

impl ComputedStyle {
    /// Apply this style's white-space rules to `data` in place and return
    /// the processed length in bytes.
    ///
    /// `prev_char` is the last character emitted into the current block so
    /// far; a collapsible space that follows a space (or a preserved
    /// newline) in an earlier run is removed. It is updated to the last
    /// character of the processed text.
    ///
    /// "1. Each tab (U+0009), carriage return (U+000D), or space (U+0020)
    /// character surrounding a linefeed (U+000A) character is removed if
    /// 'white-space' is set to 'normal', 'nowrap', or 'pre-line'.
    /// 2. If 'white-space' is set to 'pre' or 'pre-wrap', any sequence of
    /// spaces (U+0020) unbroken by an element boundary is treated as a
    /// sequence of non-breaking spaces. ...
    /// 3. If 'white-space' is set to 'normal' or 'nowrap', linefeed
    /// characters are transformed for rendering purpose into ... a space.
    /// 4. If 'white-space' is set to 'normal', 'nowrap', or 'pre-line',
    /// every tab (U+0009) is converted to a space (U+0020) [and] any space
    /// (U+0020) following another space (U+0020) ... is removed."
    pub fn process_white_space(&self, data: &mut String, prev_char: &mut Option<char>) -> usize {
        let mut out = String::with_capacity(data.len());
        let mut last = *prev_char;
        match self.white_space {
            WhiteSpace::Normal | WhiteSpace::Nowrap => {
                for c in data.chars() {
                    let c = if matches!(c, '\n' | '\t' | '\r') { ' ' } else { c };
                    if c == ' ' && matches!(last, Some(' ' | '\n')) {
                        continue;
                    }
                    out.push(c);
                    last = Some(c);
                }
            }
            WhiteSpace::PreLine => {
                for c in data.chars() {
                    match c {
                        '\r' => {}
                        '\n' => {
                            // Spaces before a preserved newline are removed.
                            while out.ends_with(' ') {
                                let _ = out.pop();
                            }
                            out.push('\n');
                            last = Some('\n');
                        }
                        ' ' | '\t' => {
                            if !matches!(last, Some(' ' | '\n')) {
                                out.push(' ');
                                last = Some(' ');
                            }
                        }
                        c => {
                            out.push(c);
                            last = Some(c);
                        }
                    }
                }
            }
            WhiteSpace::Pre | WhiteSpace::PreWrap => {
                let mut column = 0;
                let mut chars = data.chars().peekable();
                while let Some(c) = chars.next() {
                    match c {
                        '\r' if chars.peek() == Some(&'\n') => {}
                        '\r' | '\n' => {
                            out.push('\n');
                            column = 0;
                        }
                        '\t' => {
                            let width = TAB_SIZE - column % TAB_SIZE;
                            out.extend(std::iter::repeat_n(' ', width));
                            column += width;
                        }
                        c => {
                            out.push(c);
                            column += 1;
                        }
                    }
                }
                if let Some(c) = out.chars().next_back() {
                    last = Some(c);
                }
            }
        }
        *prev_char = last;
        *data = out;
        data.len()
    }

    /// Skip the collapsible spaces at `position`, where a new line starts,
    /// and return the index of the first character to lay out.
    ///
    /// "As each line is laid out, if a space (U+0020) at the beginning of a
    /// line has 'white-space' set to 'normal', 'nowrap', or 'pre-line', it
    /// is removed."
    #[must_use]
    pub fn process_line_head_white_space(&self, data: &str, position: usize) -> usize {
        if !self.white_space.is_collapsing_space() {
            return position;
        }
        let rest = &data[position..];
        position + (rest.len() - rest.trim_start_matches(' ').len())
    }

    /// The byte length of the `::first-letter` at `position`.
    ///
    /// [§ 5.12.2 The :first-letter pseudo-element](https://www.w3.org/TR/CSS2/selector.html#first-letter)
    ///
    /// "Punctuation (i.e, characters defined in Unicode in the "open" (Ps),
    /// "close" (Pe), "initial" (Pi). "final" (Pf) and "other" (Po)
    /// punctuation classes), that precedes or follows the first letter
    /// should be included."
    ///
    /// Returns at least one character when `data[position..]` is not empty.
    #[must_use]
    pub fn first_letter_length(&self, data: &str, position: usize) -> usize {
        let rest = &data[position..];
        let mut chars = rest.char_indices().peekable();
        while chars.next_if(|&(_, c)| is_first_letter_punctuation(c)).is_some() {}
        // The letter itself.
        let _ = chars.next();
        while chars.next_if(|&(_, c)| is_first_letter_punctuation(c)).is_some() {}
        chars.peek().map_or(rest.len(), |&(i, _)| i)
    }
}

fn is_first_letter_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || matches!(
            c,
            '\u{00A1}' | '\u{00AB}' | '\u{00BB}' | '\u{00BF}' | '\u{2018}'..='\u{201F}' | '\u{3008}'..='\u{3011}'
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{PseudoElement, StyleDeclaration};

    fn style(white_space: WhiteSpace) -> ComputedStyle {
        ComputedStyle::compute(
            &StyleDeclaration {
                white_space: Some(white_space),
                ..StyleDeclaration::default()
            },
            None,
            PseudoElement::None,
        )
    }

    fn process(white_space: WhiteSpace, text: &str, prev: Option<char>) -> (String, Option<char>) {
        let mut data = text.to_string();
        let mut prev = prev;
        let _ = style(white_space).process_white_space(&mut data, &mut prev);
        (data, prev)
    }

    #[test]
    fn test_normal_collapses_runs_and_newlines() {
        let (data, prev) = process(WhiteSpace::Normal, "a  \n\t b", None);
        assert_eq!(data, "a b");
        assert_eq!(prev, Some('b'));
    }

    #[test]
    fn test_normal_collapses_across_runs() {
        let (data, _) = process(WhiteSpace::Normal, "  x", Some(' '));
        assert_eq!(data, "x");
    }

    #[test]
    fn test_whitespace_only_run_after_space_is_empty() {
        let (data, prev) = process(WhiteSpace::Normal, " \n ", Some(' '));
        assert!(data.is_empty());
        assert_eq!(prev, Some(' '));
    }

    #[test]
    fn test_pre_line_keeps_newlines_and_drops_surrounding_spaces() {
        let (data, _) = process(WhiteSpace::PreLine, "a  \n  b", None);
        assert_eq!(data, "a\nb");
    }

    #[test]
    fn test_pre_expands_tabs_to_stops() {
        let (data, _) = process(WhiteSpace::Pre, "ab\tc\r\nd", None);
        assert_eq!(data, "ab      c\nd");
    }

    #[test]
    fn test_line_head_skips_only_collapsible_spaces() {
        assert_eq!(style(WhiteSpace::Normal).process_line_head_white_space("a   b", 1), 4);
        assert_eq!(style(WhiteSpace::Pre).process_line_head_white_space("a   b", 1), 1);
        assert_eq!(style(WhiteSpace::Normal).process_line_head_white_space("   ", 0), 3);
    }

    #[test]
    fn test_first_letter_includes_punctuation() {
        let s = style(WhiteSpace::Normal);
        assert_eq!(s.first_letter_length("\"Hi\" there", 0), 2);
        assert_eq!(s.first_letter_length("Hello", 0), 1);
        assert_eq!(s.first_letter_length("x, y", 0), 2);
        assert_eq!(s.first_letter_length("ab cd", 3), 1);
        assert_eq!(s.first_letter_length("漢字", 0), "漢".len());
    }
}
