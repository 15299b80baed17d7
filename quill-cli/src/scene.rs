//! JSON scene files: a styled element tree plus a viewport.
//!
//! ```json
//! {
//!   "viewport": { "viewport-width": 300 },
//!   "root": {
//!     "tag": "p",
//!     "style": { "font-size": 16, "text-align": "center" },
//!     "children": [{ "text": "Hello " }, { "tag": "b", "children": [{ "text": "world" }] }]
//!   }
//! }
//! ```

use std::collections::HashMap;

use quill_css::StyleDeclaration;
use quill_css::layout::LayoutConfig;
use quill_dom::{DomTree, NodeId};
use serde::Deserialize;

/// A document to lay out.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub viewport: LayoutConfig,
    pub root: SceneElement,
}

/// An element with its declared style.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneElement {
    pub tag: String,
    #[serde(default)]
    pub style: StyleDeclaration,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SceneNode {
    Text { text: String },
    Element(SceneElement),
}

impl Scene {
    /// One `<p>` holding `text` at `font_size`.
    pub fn paragraph(text: &str, font_size: f32) -> Self {
        Self {
            viewport: LayoutConfig::default(),
            root: SceneElement {
                tag: "p".to_string(),
                style: StyleDeclaration {
                    font_size: Some(font_size),
                    ..StyleDeclaration::default()
                },
                children: vec![SceneNode::Text {
                    text: text.to_string(),
                }],
            },
        }
    }

    /// Build the document and the declarations keyed by element.
    pub fn build(&self) -> (DomTree, HashMap<NodeId, StyleDeclaration>) {
        let mut dom = DomTree::new();
        let mut declarations = HashMap::new();
        let root = dom.root();
        append_element(&mut dom, &mut declarations, root, &self.root);
        (dom, declarations)
    }
}

fn append_element(
    dom: &mut DomTree,
    declarations: &mut HashMap<NodeId, StyleDeclaration>,
    parent: NodeId,
    element: &SceneElement,
) {
    let id = dom.append_element(parent, &element.tag);
    let _ = declarations.insert(id, element.style.clone());
    for child in &element.children {
        match child {
            SceneNode::Text { text } => {
                let _ = dom.append_text(id, text);
            }
            SceneNode::Element(child) => append_element(dom, declarations, id, child),
        }
    }
}
