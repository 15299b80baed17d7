//! Property tests for inline box splitting and line-end trimming.

use std::rc::Rc;

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use quill_css::layout::{ActiveFont, BoxId, BoxTree, FixedAdvanceFont, LayoutBox};
use quill_css::style::PseudoElement;
use quill_css::{ComputedStyle, StyleDeclaration};

/// Helper: every character advances 10 units.
fn font() -> ActiveFont {
    ActiveFont {
        metrics: Rc::new(FixedAdvanceFont::monospace_em()),
        point: 10.0,
    }
}

fn span_style(padding: f32) -> Rc<ComputedStyle> {
    Rc::new(ComputedStyle::compute(
        &StyleDeclaration {
            font_size: Some(10.0),
            ..StyleDeclaration::default()
        }
        .with_padding(padding),
        None,
        PseudoElement::None,
    ))
}

/// Helper: arbitrary strings mapped onto lowercase ASCII words, empty ones
/// dropped.
fn words(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|w| {
            w.chars()
                .map(|c| char::from(b'a' + u8::try_from(u32::from(c) % 26).unwrap_or(0)))
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect()
}

fn text_box(tree: &mut BoxTree, data: &str, wrap: usize, padding: f32) -> BoxId {
    let mut b = LayoutBox::new_inline(None, span_style(padding));
    b.resolve_inline_width();
    b.set_data(font(), data, wrap, wrap as f32 * 10.0);
    b.width = data.len() as f32 * 10.0;
    tree.alloc(b).expect("arena full")
}

#[quickcheck]
fn prop_split_keeps_text_and_width(raw: Vec<String>, padding: u8) -> TestResult {
    let words = words(&raw);
    if words.len() < 2 {
        return TestResult::discard();
    }
    let data = words.join(" ");
    let wrap = data.len() - words[words.len() - 1].len();
    let mut tree = BoxTree::new();
    let id = text_box(&mut tree, &data, wrap, f32::from(padding % 20));
    let before = tree.get(id).total_width();

    let tail = tree.split_inline(id).expect("arena full");
    let head = tree.get(id);
    let tail = tree.get(tail);

    TestResult::from_bool(
        format!("{}{}", head.text(), tail.text()) == data
            && head.text().ends_with(' ')
            && !tail.text().starts_with(' ')
            && (head.total_width() + tail.total_width() - before).abs() < 1e-3
            && head.blank_right() == 0.0
            && tail.blank_left() == 0.0
            && tail.parent.is_none(),
    )
}

#[quickcheck]
fn prop_at_end_of_line_is_idempotent(raw: Vec<String>, trailing: bool) -> TestResult {
    let words = words(&raw);
    if words.is_empty() {
        return TestResult::discard();
    }
    let mut data = words.join(" ");
    if trailing {
        data.push(' ');
    }
    let mut tree = BoxTree::new();
    let id = text_box(&mut tree, &data, 0, 0.0);
    let b = tree.get_mut(id);
    let width = b.width;

    let first = b.at_end_of_line();
    let second = b.at_end_of_line();

    let expected = if trailing { -10.0 } else { 0.0 };
    TestResult::from_bool(
        first == expected
            && second == 0.0
            && (b.width - (width + first)).abs() < 1e-3
            && !b.text().ends_with(' ')
            && b.text().len() == words.join(" ").len(),
    )
}
