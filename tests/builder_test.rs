//! Tests for TreeBuilder traversal over system graphs

use rstest::rstest;

use mepgraph::domain::{
    Connector, DomainError, ElementId, Model, NetworkNode, System, TreeArena, TreeBuilder,
};
use mepgraph::render::{to_document, to_text_root_first};
use mepgraph::util::testing;

/// Element whose connectors list the given neighbor ids.
fn element(id: i64, name: &str, connectors: &[&[i64]]) -> NetworkNode {
    NetworkNode::new(
        id,
        name,
        connectors
            .iter()
            .map(|ids| Connector::new(ids.iter().copied().map(ElementId)))
            .collect(),
    )
}

fn system(id: i64, name: &str, root: Option<i64>, members: &[i64]) -> System {
    System {
        id: ElementId(id),
        name: name.to_string(),
        category: "mechanical".to_string(),
        base_equipment: root.map(ElementId),
        elements: members.iter().copied().map(ElementId).collect(),
    }
}

fn model(elements: Vec<NetworkNode>, systems: Vec<System>) -> Model {
    Model::new("Test Project", elements, systems).expect("valid model")
}

/// Id of the parent of `child` in `tree`.
fn parent_of(tree: &TreeArena, child: i64) -> Option<ElementId> {
    tree.iter()
        .find(|(_, node)| node.data.id == ElementId(child))
        .and_then(|(_, node)| node.parent)
        .and_then(|idx| tree.get_node(idx))
        .map(|parent| parent.data.id)
}

fn ids(values: &[i64]) -> Vec<ElementId> {
    values.iter().copied().map(ElementId).collect()
}

// ============================================================
// Shape
// ============================================================

#[test]
fn given_linear_chain_when_traversing_then_tree_follows_chain() {
    testing::init_test_setup();
    let m = model(
        vec![
            element(1, "AHU", &[&[2]]),
            element(2, "Duct", &[&[1], &[3]]),
            element(3, "Diffuser", &[&[2]]),
        ],
        vec![system(100, "Supply", Some(1), &[2, 3])],
    );

    let tree = TreeBuilder::new().traverse(&m.systems()[0], &m).unwrap();

    assert_eq!(tree.ids(), ids(&[1, 2, 3]));
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.leaf_nodes(), vec!["Diffuser".to_string()]);
}

#[test]
fn given_diamond_when_traversing_then_shared_node_attached_under_first_branch() {
    // R -> {A, B}, A -> C, B -> C
    let m = model(
        vec![
            element(1, "R", &[&[2], &[3]]),
            element(2, "A", &[&[1], &[4]]),
            element(3, "B", &[&[1], &[4]]),
            element(4, "C", &[&[2], &[3]]),
        ],
        vec![system(100, "Diamond", Some(1), &[2, 3, 4])],
    );

    let tree = TreeBuilder::new().traverse(&m.systems()[0], &m).unwrap();

    assert_eq!(tree.len(), 4);
    assert_eq!(tree.ids(), ids(&[1, 2, 4, 3]));
    assert_eq!(parent_of(&tree, 4), Some(ElementId(2)));
    assert_eq!(parent_of(&tree, 3), Some(ElementId(1)));
}

#[test]
fn given_cycle_when_traversing_then_each_element_appears_once() {
    let m = model(
        vec![
            element(1, "Pump", &[&[2, 3]]),
            element(2, "Pipe-A", &[&[1], &[3]]),
            element(3, "Pipe-B", &[&[2], &[1]]),
        ],
        vec![system(100, "Loop", Some(1), &[1, 2, 3])],
    );

    let tree = TreeBuilder::new().traverse(&m.systems()[0], &m).unwrap();

    let mut seen = tree.ids();
    assert_eq!(seen.len(), 3);
    seen.sort();
    seen.dedup();
    assert_eq!(seen, ids(&[1, 2, 3]));
}

#[test]
fn given_root_connected_to_itself_when_traversing_then_root_not_revisited() {
    let m = model(
        vec![element(1, "Panel", &[&[1, 2]]), element(2, "Circuit", &[&[1]])],
        vec![system(100, "Power", Some(1), &[2])],
    );

    let tree = TreeBuilder::new().traverse(&m.systems()[0], &m).unwrap();

    assert_eq!(tree.ids(), ids(&[1, 2]));
}

#[test]
fn given_neighbor_outside_system_when_traversing_then_neighbor_excluded() {
    let m = model(
        vec![
            element(1, "AHU", &[&[2, 9]]),
            element(2, "Duct", &[&[1]]),
            element(9, "Other system duct", &[&[1]]),
        ],
        vec![system(100, "Supply", Some(1), &[2])],
    );

    let tree = TreeBuilder::new().traverse(&m.systems()[0], &m).unwrap();

    assert_eq!(tree.ids(), ids(&[1, 2]));
}

// ============================================================
// Failures
// ============================================================

#[rstest]
#[case::no_base_equipment(None, vec![element(1, "AHU", &[&[2]]), element(2, "Duct", &[&[1]])])]
#[case::root_not_in_model(Some(7), vec![element(2, "Duct", &[&[1]])])]
#[case::root_without_connectors(Some(1), vec![element(1, "AHU", &[]), element(2, "Duct", &[])])]
fn given_unusable_root_when_traversing_then_empty_root(
    #[case] root: Option<i64>,
    #[case] elements: Vec<NetworkNode>,
) {
    let m = model(elements, vec![system(100, "Broken", root, &[2])]);

    let err = TreeBuilder::new().traverse(&m.systems()[0], &m).unwrap_err();

    assert_eq!(
        err,
        DomainError::EmptyRoot {
            system: ElementId(100)
        }
    );
    assert!(err.is_traversal_failure());
}

#[test]
fn given_root_connectors_resolving_nowhere_when_traversing_then_no_reachable_nodes() {
    let m = model(
        vec![element(1, "AHU", &[&[42]]), element(2, "Duct", &[])],
        vec![system(100, "Dangling", Some(1), &[2])],
    );

    let err = TreeBuilder::new().traverse(&m.systems()[0], &m).unwrap_err();

    assert_eq!(
        err,
        DomainError::NoReachableNodes {
            system: ElementId(100),
            root: ElementId(1)
        }
    );
}

#[test]
fn given_more_nodes_than_ceiling_when_traversing_then_aborted() {
    let elements = (1..=5)
        .map(|id| element(id, &format!("E{id}"), &[&[id - 1], &[id + 1]]))
        .collect();
    let m = model(elements, vec![system(100, "Long", Some(1), &[2, 3, 4, 5])]);

    let err = TreeBuilder::with_max_nodes(3)
        .traverse(&m.systems()[0], &m)
        .unwrap_err();

    assert_eq!(
        err,
        DomainError::TraversalAborted {
            system: ElementId(100),
            limit: 3
        }
    );
}

#[test]
fn given_node_count_equal_to_ceiling_when_traversing_then_succeeds() {
    let elements = (1..=5)
        .map(|id| element(id, &format!("E{id}"), &[&[id - 1], &[id + 1]]))
        .collect();
    let m = model(elements, vec![system(100, "Long", Some(1), &[2, 3, 4, 5])]);

    let tree = TreeBuilder::with_max_nodes(5)
        .traverse(&m.systems()[0], &m)
        .unwrap();

    assert_eq!(tree.len(), 5);
}

#[test]
fn given_three_systems_with_broken_middle_when_traversing_then_only_middle_fails() {
    let m = model(
        vec![
            element(1, "AHU-1", &[&[2]]),
            element(2, "Duct-1", &[&[1]]),
            element(3, "Panel", &[]),
            element(4, "Boiler", &[&[5]]),
            element(5, "Pipe", &[&[4]]),
        ],
        vec![
            system(100, "First", Some(1), &[2]),
            system(200, "Second", Some(3), &[4]),
            system(300, "Third", Some(4), &[5]),
        ],
    );
    let builder = TreeBuilder::new();

    let results: Vec<_> = m
        .systems()
        .iter()
        .map(|s| builder.traverse(s, &m))
        .collect();

    assert_eq!(results[0].as_ref().unwrap().ids(), ids(&[1, 2]));
    assert_eq!(
        results[1].as_ref().unwrap_err(),
        &DomainError::EmptyRoot {
            system: ElementId(200)
        }
    );
    assert_eq!(results[2].as_ref().unwrap().ids(), ids(&[4, 5]));
}

// ============================================================
// Determinism and independence
// ============================================================

#[test]
fn given_same_system_when_traversing_twice_then_output_is_identical() {
    let m = model(
        vec![
            element(1, "R", &[&[2], &[3]]),
            element(2, "A", &[&[1], &[4]]),
            element(3, "B", &[&[1], &[4]]),
            element(4, "C", &[&[2], &[3]]),
        ],
        vec![system(100, "Diamond", Some(1), &[2, 3, 4])],
    );
    let builder = TreeBuilder::new();

    let first = builder.traverse(&m.systems()[0], &m).unwrap();
    let second = builder.traverse(&m.systems()[0], &m).unwrap();

    assert_eq!(to_document(&first).unwrap(), to_document(&second).unwrap());
    assert_eq!(
        to_text_root_first(&first).unwrap(),
        to_text_root_first(&second).unwrap()
    );
}

#[test]
fn given_systems_sharing_elements_when_traversing_then_each_sees_all_members() {
    let m = model(
        vec![
            element(1, "Panel", &[&[2]]),
            element(2, "Shared", &[&[1], &[3]]),
            element(3, "Load", &[&[2]]),
        ],
        vec![
            system(100, "Circuit-A", Some(1), &[2, 3]),
            system(200, "Circuit-B", Some(3), &[1, 2]),
        ],
    );
    let builder = TreeBuilder::new();

    let a = builder.traverse(&m.systems()[0], &m).unwrap();
    let b = builder.traverse(&m.systems()[1], &m).unwrap();

    assert_eq!(a.ids(), ids(&[1, 2, 3]));
    assert_eq!(b.ids(), ids(&[3, 2, 1]));
}
