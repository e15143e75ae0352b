//! Tests for the XML document and hierarchical text renderers

use std::collections::HashSet;

use serde_json::Value;

use mepgraph::domain::{DomainError, ElementId, Hierarchy, NodeData, TraversalOrder, TreeArena};
use mepgraph::render::{
    to_document, to_text, to_text_leaf_first, to_text_root_first, MAX_INDENTED_DEPTH, NODE_TAG,
};

/// R(1) -> [A(2) -> [C(4)], B(3)]
fn sample_tree() -> TreeArena {
    let mut tree = TreeArena::new();
    let r = tree.insert_node(NodeData::new(ElementId(1), "R"), None);
    let a = tree.insert_node(NodeData::new(ElementId(2), "A"), Some(r));
    tree.insert_node(NodeData::new(ElementId(4), "C"), Some(a));
    tree.insert_node(NodeData::new(ElementId(3), "B"), Some(r));
    tree
}

fn single_node_tree() -> TreeArena {
    let mut tree = TreeArena::new();
    tree.insert_node(NodeData::new(ElementId(7), "Lonely AHU"), None);
    tree
}

/// Hand-built hierarchy, free to be malformed.
struct Adjacency {
    nodes: Vec<NodeData>,
    children: Vec<Vec<usize>>,
}

impl Hierarchy for Adjacency {
    type Node = usize;

    fn root(&self) -> Option<usize> {
        (!self.nodes.is_empty()).then_some(0)
    }

    fn data(&self, node: usize) -> Option<&NodeData> {
        self.nodes.get(node)
    }

    fn children(&self, node: usize) -> &[usize] {
        self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn cyclic() -> Adjacency {
    Adjacency {
        nodes: vec![
            NodeData::new(ElementId(1), "A"),
            NodeData::new(ElementId(2), "B"),
        ],
        children: vec![vec![1], vec![0]],
    }
}

/// Collect `(id, name)` pairs of a nested record value.
fn records(value: &Value, out: &mut HashSet<(i64, String)>) {
    let id = value["id"].as_i64().expect("numeric id");
    let name = value["name"].as_str().expect("string name").to_string();
    out.insert((id, name));
    for child in value["children"].as_array().expect("children array") {
        records(child, out);
    }
}

// ============================================================
// Hierarchical text
// ============================================================

#[test]
fn given_tree_when_rendering_root_first_then_parent_fields_precede_children() {
    let text = to_text_root_first(&sample_tree()).unwrap();

    assert_eq!(
        text,
        r#"{"id":1,"name":"R","children":[{"id":2,"name":"A","children":[{"id":4,"name":"C","children":[]}]},{"id":3,"name":"B","children":[]}]}"#
    );
}

#[test]
fn given_tree_when_rendering_leaf_first_then_children_precede_parent_fields() {
    let text = to_text_leaf_first(&sample_tree()).unwrap();

    assert_eq!(
        text,
        r#"{"children":[{"children":[{"children":[],"id":4,"name":"C"}],"id":2,"name":"A"},{"children":[],"id":3,"name":"B"}],"id":1,"name":"R"}"#
    );
}

#[test]
fn given_both_orders_when_parsing_then_same_records_and_value() {
    let tree = sample_tree();
    let root_first: Value = serde_json::from_str(&to_text_root_first(&tree).unwrap()).unwrap();
    let leaf_first: Value = serde_json::from_str(&to_text_leaf_first(&tree).unwrap()).unwrap();

    let mut a = HashSet::new();
    let mut b = HashSet::new();
    records(&root_first, &mut a);
    records(&leaf_first, &mut b);

    assert_eq!(a, b);
    assert_eq!(a.len(), 4);
    assert_eq!(root_first, leaf_first);
}

#[test]
fn given_single_node_when_rendering_text_then_empty_children_list() {
    let text = to_text_root_first(&single_node_tree()).unwrap();

    assert_eq!(text, r#"{"id":7,"name":"Lonely AHU","children":[]}"#);
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert!(parsed["children"].as_array().unwrap().is_empty());
}

#[test]
fn given_name_with_quotes_when_rendering_text_then_output_stays_valid() {
    let mut tree = TreeArena::new();
    tree.insert_node(NodeData::new(ElementId(1), r#"Fan "North" \ 2"#), None);

    let text = to_text_root_first(&tree).unwrap();

    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["name"], r#"Fan "North" \ 2"#);
}

#[test]
fn given_order_when_rendering_text_then_dispatches_to_matching_renderer() {
    let tree = sample_tree();

    assert_eq!(
        to_text(&tree, TraversalOrder::RootFirst).unwrap(),
        to_text_root_first(&tree).unwrap()
    );
    assert_eq!(
        to_text(&tree, TraversalOrder::LeafFirst).unwrap(),
        to_text_leaf_first(&tree).unwrap()
    );
}

// ============================================================
// XML document
// ============================================================

#[test]
fn given_tree_when_rendering_document_then_one_element_per_node() {
    let doc = to_document(&sample_tree()).unwrap();

    assert!(doc.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert_eq!(doc.matches(&format!("<{NODE_TAG} ")).count(), 4);
    assert_eq!(doc.matches(&format!("</{NODE_TAG}>")).count(), 2);
}

#[test]
fn given_tree_when_rendering_document_then_nesting_mirrors_children() {
    let doc = to_document(&sample_tree()).unwrap();

    let pos = |needle: &str| doc.find(needle).unwrap_or_else(|| panic!("missing {needle}"));
    let r = pos(r#"<Node id="1" name="R">"#);
    let a = pos(r#"<Node id="2" name="A">"#);
    let c = pos(r#"<Node id="4" name="C""#);
    let b = pos(r#"<Node id="3" name="B""#);

    assert!(r < a && a < c && c < b);
    let a_end = doc[a..].find("</Node>").unwrap() + a;
    assert!(c < a_end && a_end < b, "C nested in A, B outside A");
}

#[test]
fn given_special_characters_when_rendering_document_then_attributes_escaped() {
    let mut tree = TreeArena::new();
    tree.insert_node(NodeData::new(ElementId(1), "Pump <P&1>"), None);

    let doc = to_document(&tree).unwrap();

    assert!(doc.contains("Pump &lt;P&amp;1&gt;"));
}

#[test]
fn given_same_tree_when_rendering_document_twice_then_identical() {
    assert_eq!(
        to_document(&sample_tree()).unwrap(),
        to_document(&sample_tree()).unwrap()
    );
}

// ============================================================
// Malformed trees
// ============================================================

#[test]
fn given_cyclic_hierarchy_when_rendering_then_serialization_inconsistency() {
    let tree = cyclic();

    for result in [
        to_document(&tree),
        to_text_root_first(&tree),
        to_text_leaf_first(&tree),
    ] {
        assert!(matches!(
            result,
            Err(DomainError::SerializationInconsistency { .. })
        ));
    }
}

#[test]
fn given_dangling_child_when_rendering_then_serialization_inconsistency() {
    let tree = Adjacency {
        nodes: vec![NodeData::new(ElementId(1), "A")],
        children: vec![vec![5]],
    };

    assert!(matches!(
        to_text_root_first(&tree),
        Err(DomainError::SerializationInconsistency { .. })
    ));
}

#[test]
fn given_empty_tree_when_rendering_then_serialization_inconsistency() {
    assert!(matches!(
        to_document(&TreeArena::new()),
        Err(DomainError::SerializationInconsistency { .. })
    ));
}

// ============================================================
// Deep trees
// ============================================================

/// Single chain of `len` nodes, ids 1..=len.
fn chain(len: i64) -> TreeArena {
    let mut tree = TreeArena::new();
    let mut parent = None;
    for id in 1..=len {
        parent = Some(tree.insert_node(NodeData::new(ElementId(id), format!("Duct-{id}")), parent));
    }
    tree
}

#[test]
fn given_fifty_thousand_node_chain_when_rendering_text_then_both_orders_complete() {
    let tree = chain(50_000);

    let root_first = to_text_root_first(&tree).unwrap();
    let leaf_first = to_text_leaf_first(&tree).unwrap();

    assert!(root_first.starts_with(r#"{"id":1,"name":"Duct-1","children":[{"id":2,"#));
    assert!(root_first.contains(r#"{"id":50000,"name":"Duct-50000","children":[]}"#));
    assert!(root_first.ends_with(&"]}".repeat(50_000)));
    assert!(leaf_first.starts_with(&r#"{"children":["#.repeat(50_000)));
    assert!(leaf_first.ends_with(r#"],"id":1,"name":"Duct-1"}"#));
    assert_eq!(root_first.matches("\"id\":").count(), 50_000);
    assert_eq!(leaf_first.matches("\"id\":").count(), 50_000);
}

#[test]
fn given_fifty_thousand_node_chain_when_rendering_document_then_completes() {
    let doc = to_document(&chain(50_000)).unwrap();

    assert_eq!(doc.matches(&format!("<{NODE_TAG} ")).count(), 50_000);
    assert_eq!(doc.matches(&format!("</{NODE_TAG}>")).count(), 49_999);
    assert!(doc.len() < 50_000 * 64, "no per-level indentation");
}

#[test]
fn given_chain_within_indent_limit_when_rendering_document_then_indented() {
    let doc = to_document(&chain(MAX_INDENTED_DEPTH as i64)).unwrap();

    let last = format!("{}<{NODE_TAG} id=\"{MAX_INDENTED_DEPTH}\"", " ".repeat(2 * (MAX_INDENTED_DEPTH - 1)));
    assert!(doc.contains(&last));
}
