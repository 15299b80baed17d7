//! Style facade consumed by layout.
//!
//! There is no selector matching here. Each element carries a
//! [`StyleDeclaration`]; [`compute_styles`] walks the DOM and produces one
//! shared [`ComputedStyle`] per element, applying inheritance and the HTML
//! default `display` of each tag.

/// Computed style values and the empty-inline classification.
pub mod computed;
/// Declared style values.
pub mod declaration;
/// Keyword and length value types.
pub mod values;
/// White-space processing and `::first-letter` extent.
pub mod white_space;

use std::collections::HashMap;
use std::rc::Rc;

use quill_dom::{DomTree, NodeId, NodeType};

pub use computed::{ComputedStyle, EmptyInline, MarginEdges};
pub use declaration::StyleDeclaration;
pub use values::{
    AutoLength, Display, FloatValue, LineHeight, Position, PseudoElement, Spacing, TextAlign,
    TextTransform, VerticalAlign, Visibility, WhiteSpace,
};

/// Computed styles keyed by element. Text nodes take their parent's style.
pub type StyleMap = HashMap<NodeId, Rc<ComputedStyle>>;

/// Compute the style of every element in `dom`.
///
/// Elements without an entry in `declarations` get an empty declaration.
/// An element whose declaration leaves `display` unset gets the default
/// for its tag from [`default_display_for_element`].
#[must_use]
pub fn compute_styles(dom: &DomTree, declarations: &HashMap<NodeId, StyleDeclaration>) -> StyleMap {
    let mut styles = StyleMap::new();
    compute_subtree(dom, dom.root(), None, declarations, &mut styles);
    styles
}

fn compute_subtree(
    dom: &DomTree,
    node: NodeId,
    parent: Option<&Rc<ComputedStyle>>,
    declarations: &HashMap<NodeId, StyleDeclaration>,
    styles: &mut StyleMap,
) {
    let own = match dom.get(node).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) => {
            let mut declared = declarations.get(&node).cloned().unwrap_or_default();
            if declared.display.is_none() {
                declared.display = Some(default_display_for_element(&data.tag_name));
            }
            let style = Rc::new(ComputedStyle::compute(
                &declared,
                parent.map(AsRef::as_ref),
                PseudoElement::None,
            ));
            let _ = styles.insert(node, Rc::clone(&style));
            Some(style)
        }
        _ => None,
    };
    let inherited = own.as_ref().or(parent);
    for &child in dom.children(node) {
        compute_subtree(dom, child, inherited, declarations, styles);
    }
}

// [HTML Living Standard § 15 Rendering](https://html.spec.whatwg.org/multipage/rendering.html)
// defines the default CSS styles for HTML elements.

/// Returns the default display value for an HTML element.
///
/// [§ 15.3.1 Hidden elements](https://html.spec.whatwg.org/multipage/rendering.html#hidden-elements)
/// [§ 15.3.3 Flow content](https://html.spec.whatwg.org/multipage/rendering.html#flow-content-3)
#[must_use]
pub fn default_display_for_element(tag_name: &str) -> Display {
    // [§ 15.3.1 Hidden elements]
    // "The following elements must have their display set to none:"
    const HIDDEN: [&str; 9] = [
        "base", "head", "link", "meta", "script", "style", "template", "title", "noscript",
    ];
    // [§ 15.3.3 Flow content]
    const BLOCKS: [&str; 30] = [
        "address", "article", "aside", "blockquote", "body", "center", "dd", "div", "dl", "dt",
        "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
        "hr", "html", "main", "nav", "ol", "p", "pre", "section", "ul",
    ];
    if HIDDEN.contains(&tag_name) {
        Display::None
    } else if BLOCKS.contains(&tag_name) {
        Display::Block
    } else if tag_name == "li" {
        // [§ 15.3.7 Lists](https://html.spec.whatwg.org/multipage/rendering.html#lists)
        // "li { display: list-item; }"
        Display::ListItem
    } else {
        Display::Inline
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display_by_tag() {
        assert_eq!(default_display_for_element("p"), Display::Block);
        assert_eq!(default_display_for_element("span"), Display::Inline);
        assert_eq!(default_display_for_element("li"), Display::ListItem);
        assert_eq!(default_display_for_element("script"), Display::None);
    }

    #[test]
    fn test_compute_styles_inherits_through_elements() {
        let mut dom = DomTree::new();
        let body = dom.append_element(dom.root(), "body");
        let span = dom.append_element(body, "span");
        let text = dom.append_text(span, "hi");

        let mut declarations = HashMap::new();
        let _ = declarations.insert(
            body,
            StyleDeclaration {
                font_size: Some(24.0),
                ..StyleDeclaration::default()
            },
        );
        let styles = compute_styles(&dom, &declarations);

        assert_eq!(styles[&body].display, Display::Block);
        assert_eq!(styles[&span].display, Display::Inline);
        assert_eq!(styles[&span].font_size, 24.0);
        assert!(!styles.contains_key(&text));
    }
}
