//! Tests for canonical document conversion.

use super::*;
use crate::tree::{Node, NodeRef, Position};
use serde_json::json;

fn name(id: &str) -> Node {
    Node::new(NodeKind::Name)
        .with_field("id", id)
        .with_field("ctx", Node::new(NodeKind::Load))
}

fn call(func: &str, args: Vec<Node>) -> Node {
    Node::new(NodeKind::Call)
        .with_field("func", name(func))
        .with_field("args", args)
        .with_field("keywords", Vec::<Node>::new())
}

fn module(body: Vec<Node>) -> Node {
    Node::new(NodeKind::Module)
        .with_field("body", body)
        .with_field("type_ignores", Vec::<Node>::new())
}

#[test]
fn test_every_occurrence_is_indexed() {
    let tree = module(vec![
        Node::new(NodeKind::Expr).with_field("value", call("f", vec![name("x"), name("y")])),
    ]);

    let document = CanonicalDocument::build(&tree).unwrap();

    assert_eq!(document.count(NodeKind::Module), 1);
    assert_eq!(document.count(NodeKind::Expr), 1);
    assert_eq!(document.count(NodeKind::Call), 1);
    assert_eq!(document.count(NodeKind::Name), 3);
    assert_eq!(document.count(NodeKind::Load), 3);
    assert_eq!(document.count(NodeKind::Import), 0);
    assert_eq!(document.len(), 9);
}

#[test]
fn test_single_child_nested_under_kind() {
    let tree = call("f", vec![]);
    let document = CanonicalDocument::build(&tree).unwrap();

    let entry = &document.occurrences(NodeKind::Call)[0];
    assert_eq!(entry["func"]["Name"]["id"], json!("f"));
    assert_eq!(entry["func"]["Name"]["ctx"], json!({"Load": {}}));
}

#[test]
fn test_list_children_grouped_by_kind() {
    let tree = module(vec![
        Node::new(NodeKind::Pass),
        Node::new(NodeKind::Expr).with_field("value", name("a")),
        Node::new(NodeKind::Pass),
    ]);
    let document = CanonicalDocument::build(&tree).unwrap();

    let body = &document.root()["body"];
    assert_eq!(body["Pass"].as_array().unwrap().len(), 2);
    assert_eq!(body["Expr"].as_array().unwrap().len(), 1);
    assert_eq!(document.root()["type_ignores"], json!({}));
}

#[test]
fn test_scalar_list_items_grouped_by_type() {
    let tree = Node::new(NodeKind::Global).with_field(
        "names",
        vec![crate::tree::ListItem::from("a"), crate::tree::ListItem::from("b")],
    );
    let document = CanonicalDocument::build(&tree).unwrap();

    assert_eq!(document.root()["names"], json!({"str": ["a", "b"]}));
}

#[test]
fn test_traversal_order_within_kind() {
    let tree = module(vec![
        Node::new(NodeKind::Expr).with_field("value", call("first", vec![])),
        Node::new(NodeKind::Expr).with_field("value", call("second", vec![])),
    ]);
    let document = CanonicalDocument::build(&tree).unwrap();

    let callees: Vec<&str> = document
        .occurrences(NodeKind::Call)
        .iter()
        .filter_map(|entry| entry["func"]["Name"]["id"].as_str())
        .collect();
    assert_eq!(callees, vec!["first", "second"]);
}

#[test]
fn test_root_stored_under_reserved_key() {
    let tree = module(vec![Node::new(NodeKind::Pass)]);
    let document = CanonicalDocument::build(&tree).unwrap();
    let value = document.as_value();

    assert!(std::ptr::eq(&value[ROOT_KEY], document.root()));
    assert!(std::ptr::eq(
        document.occurrences(NodeKind::Pass).as_ptr(),
        value["Pass"].as_array().unwrap().as_ptr()
    ));
    assert_eq!(value["Module"].as_array().unwrap().len(), 1);
    assert_eq!(value["Pass"].as_array().unwrap().len(), 1);
    assert!(value.get("Import").is_none());
}

#[test]
fn test_kinds_lists_present_kinds_only() {
    let tree = module(vec![Node::new(NodeKind::Pass)]);
    let document = CanonicalDocument::build(&tree).unwrap();

    let kinds: Vec<NodeKind> = document.kinds().collect();
    assert_eq!(kinds, vec![NodeKind::Module, NodeKind::Pass]);
    assert_eq!(document.len(), 2);
    assert!(!document.is_empty());
}

#[test]
fn test_default_depth_admits_long_operator_chains() {
    // 1 + 1 + ... + 1 nests left-associatively, one BinOp per term
    let mut tree = Node::new(NodeKind::Constant).with_field("value", 1i64);
    for _ in 0..300 {
        tree = Node::new(NodeKind::BinOp)
            .with_field("left", tree)
            .with_field("op", Node::new(NodeKind::Add))
            .with_field("right", Node::new(NodeKind::Constant).with_field("value", 1i64));
    }

    let document = CanonicalDocument::build(&tree).unwrap();

    assert_eq!(document.count(NodeKind::BinOp), 300);
    assert_eq!(ConversionOptions::default().max_depth, 1000);
}

#[test]
fn test_positions_copied() {
    let tree = Node::new(NodeKind::Pass).with_position(Position::new(4, 2).with_end(4, 6));
    let document = CanonicalDocument::build(&tree).unwrap();

    let entry = &document.occurrences(NodeKind::Pass)[0];
    assert_eq!(entry["lineno"], json!(4));
    assert_eq!(entry["col_offset"], json!(2));
    assert_eq!(
        document.position_of(NodeKind::Pass, 0),
        Some(Position::new(4, 2).with_end(4, 6))
    );
    assert_eq!(document.position_of(NodeKind::Pass, 1), None);
}

#[test]
fn test_positions_can_be_omitted() {
    let tree = Node::new(NodeKind::Pass).at(1, 0);
    let options = ConversionOptions {
        include_positions: false,
        ..Default::default()
    };
    let document = DocumentBuilder::new(options).build(&tree).unwrap();

    assert_eq!(document.occurrences(NodeKind::Pass)[0], json!({}));
    assert_eq!(document.position_of(NodeKind::Pass, 0), None);
}

#[test]
fn test_shared_subtree_rejected() {
    let shared: NodeRef = name("x").into_ref();
    let tree = Node::new(NodeKind::Tuple)
        .with_field("elts", vec![shared.clone(), shared])
        .with_field("ctx", Node::new(NodeKind::Load));

    let err = CanonicalDocument::build(&tree).unwrap_err();
    assert_eq!(err, ConversionError::SharedNode { kind: NodeKind::Name });
}

#[test]
fn test_shared_markers_allowed() {
    let load: NodeRef = Node::new(NodeKind::Load).into_ref();
    let tree = Node::new(NodeKind::Tuple).with_field(
        "elts",
        vec![
            Node::new(NodeKind::Name)
                .with_field("id", "a")
                .with_field("ctx", load.clone()),
            Node::new(NodeKind::Name)
                .with_field("id", "b")
                .with_field("ctx", load),
        ],
    );

    let document = CanonicalDocument::build(&tree).unwrap();
    assert_eq!(document.count(NodeKind::Load), 2);
}

#[test]
fn test_depth_limit() {
    let mut tree = Node::new(NodeKind::Pass);
    for _ in 0..10 {
        tree = Node::new(NodeKind::Expr).with_field("value", tree);
    }
    let options = ConversionOptions {
        max_depth: 5,
        ..Default::default()
    };

    let err = DocumentBuilder::new(options).build(&tree).unwrap_err();
    assert!(matches!(err, ConversionError::DepthExceeded { limit: 5, .. }));
}

#[test]
fn test_duplicate_field_rejected() {
    let tree = Node::new(NodeKind::Name)
        .with_field("id", "a")
        .with_field("id", "b");

    let err = CanonicalDocument::build(&tree).unwrap_err();
    assert_eq!(
        err,
        ConversionError::DuplicateField {
            kind: NodeKind::Name,
            field: "id".to_string()
        }
    );
}

#[test]
fn test_reserved_field_rejected() {
    let tree = Node::new(NodeKind::Name).with_field("lineno", 3i64);
    let err = CanonicalDocument::build(&tree).unwrap_err();
    assert!(matches!(err, ConversionError::ReservedField { .. }));
    assert!(err.to_string().contains("lineno"));
}
