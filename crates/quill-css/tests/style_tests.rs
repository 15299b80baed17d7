//! Integration tests for declared and computed styles.

use std::collections::HashMap;

use quill_css::style::{
    AutoLength, Display, EmptyInline, FloatValue, LineHeight, PseudoElement, TextAlign,
    VerticalAlign, WhiteSpace,
};
use quill_css::{ComputedStyle, StyleDeclaration, compute_styles};
use quill_dom::DomTree;

fn parse(json: &str) -> StyleDeclaration {
    serde_json::from_str(json).expect("declaration did not parse")
}

// ---------------------------------------------------------------------------
// Declarations
// ---------------------------------------------------------------------------

#[test]
fn test_declaration_from_json() {
    let decl = parse(
        r#"{
            "display": "inline-block",
            "white-space": "pre-wrap",
            "margin-left": "auto",
            "margin-top": { "px": 4 },
            "line-height": { "number": 1.5 },
            "vertical-align": { "length": 3 },
            "first-letter": { "float": "left", "font-size": 30 }
        }"#,
    );

    assert_eq!(decl.display, Some(Display::InlineBlock));
    assert_eq!(decl.white_space, Some(WhiteSpace::PreWrap));
    assert_eq!(decl.margin_left, Some(AutoLength::Auto));
    assert_eq!(decl.margin_top, Some(AutoLength::Px(4.0)));
    assert_eq!(decl.line_height, Some(LineHeight::Number(1.5)));
    assert_eq!(decl.vertical_align, Some(VerticalAlign::Length(3.0)));
    let first_letter = decl.first_letter.as_deref().expect("no first-letter rule");
    assert_eq!(first_letter.float, Some(FloatValue::Left));
    assert_eq!(first_letter.font_size, Some(30.0));
    assert_eq!(decl.font_size, None);
}

#[test]
fn test_unknown_property_is_rejected() {
    assert!(serde_json::from_str::<StyleDeclaration>(r#"{ "colour": "red" }"#).is_err());
    assert!(serde_json::from_str::<StyleDeclaration>(r#"{ "display": "grid" }"#).is_err());
}

// ---------------------------------------------------------------------------
// Inheritance
//
// [§ 6.2 Inheritance](https://www.w3.org/TR/CSS2/cascade.html#inheritance)
// ---------------------------------------------------------------------------

#[test]
fn test_inherited_and_reset_properties() {
    let mut dom = DomTree::new();
    let div = dom.append_element(dom.root(), "div");
    let span = dom.append_element(div, "span");
    let mut declarations = HashMap::new();
    let _ = declarations.insert(
        div,
        StyleDeclaration {
            font_size: Some(20.0),
            white_space: Some(WhiteSpace::Pre),
            text_align: Some(TextAlign::Center),
            vertical_align: Some(VerticalAlign::Middle),
            ..StyleDeclaration::default().with_padding(5.0)
        },
    );

    let styles = compute_styles(&dom, &declarations);
    let span = &styles[&span];

    assert_eq!(span.font_size, 20.0);
    assert_eq!(span.white_space, WhiteSpace::Pre);
    assert_eq!(span.text_align, TextAlign::Center);
    assert_eq!(span.vertical_align, VerticalAlign::Baseline);
    assert_eq!(span.padding.left, 0.0);
    assert_eq!(span.display, Display::Inline);
}

#[test]
fn test_declared_display_overrides_tag_default() {
    let mut dom = DomTree::new();
    let div = dom.append_element(dom.root(), "div");
    let p = dom.append_element(div, "p");
    let script = dom.append_element(div, "script");
    let mut declarations = HashMap::new();
    let _ = declarations.insert(
        p,
        StyleDeclaration {
            display: Some(Display::Inline),
            ..StyleDeclaration::default()
        },
    );

    let styles = compute_styles(&dom, &declarations);

    assert_eq!(styles[&div].display, Display::Block);
    assert_eq!(styles[&p].display, Display::Inline);
    assert_eq!(styles[&script].display, Display::None);
}

#[test]
fn test_first_line_style_inherits_from_block() {
    let block = ComputedStyle::compute(
        &parse(r#"{ "font-size": 10, "text-align": "right", "first-line": { "font-size": 20 } }"#),
        None,
        PseudoElement::None,
    );
    let rule = block.first_line_declaration().expect("no first-line rule");
    let first_line = ComputedStyle::compute(rule, Some(&block), PseudoElement::FirstLine);

    assert_eq!(first_line.font_size, 20.0);
    assert_eq!(first_line.text_align, TextAlign::Right);
    assert_eq!(first_line.pseudo, PseudoElement::FirstLine);
    assert!(first_line.first_line_declaration().is_none());
}

#[test]
fn test_used_line_height() {
    let normal = ComputedStyle::compute(&parse(r#"{ "font-size": 10 }"#), None, PseudoElement::None);
    let number = ComputedStyle::compute(
        &parse(r#"{ "font-size": 10, "line-height": { "number": 2 } }"#),
        None,
        PseudoElement::None,
    );
    let px = ComputedStyle::compute(
        &parse(r#"{ "font-size": 10, "line-height": { "px": 15 } }"#),
        None,
        PseudoElement::None,
    );

    assert!((normal.used_line_height() - 12.0).abs() < 1e-4);
    assert_eq!(number.used_line_height(), 20.0);
    assert_eq!(px.used_line_height(), 15.0);
}

// ---------------------------------------------------------------------------
// Empty inline classification
// ---------------------------------------------------------------------------

#[test]
fn test_empty_inline_classification() {
    let cases = [
        (r"{}", EmptyInline::Bare),
        (r#"{ "padding-left": 1 }"#, EmptyInline::Start),
        (r#"{ "border-right-width": 1 }"#, EmptyInline::End),
        (r#"{ "margin-left": { "px": 1 }, "margin-right": { "px": 2 } }"#, EmptyInline::Both),
        (r#"{ "margin-left": "auto" }"#, EmptyInline::Bare),
    ];
    for (json, expected) in cases {
        let style = ComputedStyle::compute(&parse(json), None, PseudoElement::None);
        assert_eq!(style.empty_inline(), EmptyInline::Unchecked, "{json}");
        assert_eq!(style.check_empty_inline(), expected, "{json}");
        assert_eq!(style.empty_inline(), expected, "{json}");
    }
}
