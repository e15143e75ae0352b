//! Read-only `{id, name, children()}` capability over derived trees.
//!
//! Serializers and the unique-id registry work against [`Hierarchy`] instead of
//! [`TreeArena`] directly, so new output formats need nothing from the traversal.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use generational_arena::Index;

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::error::{DomainError, DomainResult};

/// Minimal view of a rooted tree.
pub trait Hierarchy {
    /// Node handle.
    type Node: Copy + Eq + Hash + Debug;

    fn root(&self) -> Option<Self::Node>;

    /// Identity of a node, `None` for a dangling handle.
    fn data(&self, node: Self::Node) -> Option<&NodeData>;

    /// Children in discovery order.
    fn children(&self, node: Self::Node) -> &[Self::Node];
}

impl Hierarchy for TreeArena {
    type Node = Index;

    fn root(&self) -> Option<Index> {
        TreeArena::root(self)
    }

    fn data(&self, node: Index) -> Option<&NodeData> {
        self.get_node(node).map(|n| &n.data)
    }

    fn children(&self, node: Index) -> &[Index] {
        self.get_node(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }
}

/// One step of a depth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit<'a, N> {
    /// Node reached, before any of its children
    Enter(N, &'a NodeData),
    /// All children of the node done
    Leave(N, &'a NodeData),
}

/// Walk the whole tree depth-first, validating its shape on the way.
///
/// Fails with `SerializationInconsistency` when the tree has no root, a handle
/// dangles, or a node is reachable twice (a cycle or shared child).
pub fn walk<H: Hierarchy + ?Sized>(tree: &H) -> DomainResult<Vec<Visit<'_, H::Node>>> {
    let root = tree
        .root()
        .ok_or_else(|| DomainError::inconsistent("tree has no root"))?;

    let mut visits = Vec::new();
    let mut seen = HashSet::new();
    let mut stack = vec![(root, false)];

    while let Some((node, done)) = stack.pop() {
        let data = tree
            .data(node)
            .ok_or_else(|| DomainError::inconsistent(format!("dangling node {node:?}")))?;

        if done {
            visits.push(Visit::Leave(node, data));
            continue;
        }
        if !seen.insert(node) {
            return Err(DomainError::inconsistent(format!(
                "node {} reached twice",
                data.id
            )));
        }
        visits.push(Visit::Enter(node, data));
        stack.push((node, true));
        for &child in tree.children(node).iter().rev() {
            stack.push((child, false));
        }
    }

    Ok(visits)
}

/// Node data in pre-order, validated like [`walk`].
pub fn preorder<H: Hierarchy + ?Sized>(tree: &H) -> DomainResult<Vec<&NodeData>> {
    Ok(walk(tree)?
        .into_iter()
        .filter_map(|visit| match visit {
            Visit::Enter(_, data) => Some(data),
            Visit::Leave(..) => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ElementId;

    #[test]
    fn given_tree_when_walking_then_enters_and_leaves_in_nesting_order() {
        let mut tree = TreeArena::new();
        let root = tree.insert_node(NodeData::new(ElementId(1), "root"), None);
        tree.insert_node(NodeData::new(ElementId(2), "leaf"), Some(root));

        let steps: Vec<String> = walk(&tree)
            .unwrap()
            .into_iter()
            .map(|v| match v {
                Visit::Enter(_, d) => format!("+{}", d.name),
                Visit::Leave(_, d) => format!("-{}", d.name),
            })
            .collect();

        assert_eq!(steps, vec!["+root", "+leaf", "-leaf", "-root"]);
    }

    #[test]
    fn given_empty_tree_when_walking_then_inconsistent() {
        let tree = TreeArena::new();
        assert!(matches!(
            walk(&tree),
            Err(DomainError::SerializationInconsistency { .. })
        ));
    }
}
