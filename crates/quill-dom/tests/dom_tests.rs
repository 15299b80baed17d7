//! Tests for building and traversing the document tree.

use quill_dom::{DomTree, NodeId};

#[test]
fn test_append_links_siblings() {
    let mut tree = DomTree::new();
    let p = tree.append_element(NodeId::ROOT, "P");
    let a = tree.append_text(p, "a");
    let span = tree.append_element(p, "span");
    let b = tree.append_text(p, "b");

    assert_eq!(tree.children(p), &[a, span, b]);
    assert_eq!(tree.first_child(p), Some(a));
    assert_eq!(tree.last_child(p), Some(b));
    assert_eq!(tree.next_sibling(a), Some(span));
    assert_eq!(tree.prev_sibling(b), Some(span));
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.tag_name(p), Some("p"));
}

#[test]
fn test_text_and_element_accessors() {
    let mut tree = DomTree::new();
    let div = tree.append_element(NodeId::ROOT, "div");
    let text = tree.append_text(div, "hello");

    assert_eq!(tree.as_text(text), Some("hello"));
    assert!(tree.as_element(text).is_none());
    assert!(tree.as_text(div).is_none());
    assert_eq!(tree.document_element(), Some(div));
}

#[test]
fn test_ancestors_walk_to_root() {
    let mut tree = DomTree::new();
    let body = tree.append_element(NodeId::ROOT, "body");
    let p = tree.append_element(body, "p");
    let text = tree.append_text(p, "x");

    let chain: Vec<NodeId> = tree.ancestors(text).collect();
    assert_eq!(chain, vec![p, body, NodeId::ROOT]);
}

#[test]
#[should_panic(expected = "already attached")]
fn test_append_attached_node_panics() {
    let mut tree = DomTree::new();
    let a = tree.append_element(NodeId::ROOT, "div");
    let b = tree.append_element(NodeId::ROOT, "div");
    tree.append_child(b, a);
}
