//! Tree builder: depth-first traversal of a system's connectivity graph.

use std::collections::HashSet;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::arena::{NodeData, TreeArena};
use crate::domain::entities::{ElementId, ElementLookup, System};
use crate::domain::error::DomainError;

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, DomainError>;

/// Node ceiling applied when none is configured.
pub const DEFAULT_MAX_NODES: usize = 1_000_000;

/// One suspended level of the depth-first walk.
struct Frame {
    idx: Index,
    neighbors: Vec<ElementId>,
    next: usize,
}

/// Constructs spanning trees from possibly cyclic system graphs.
///
/// The builder holds configuration only. Each [`TreeBuilder::traverse`] call
/// owns its visited set, so one system's traversal never suppresses nodes
/// of another.
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    max_nodes: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::with_max_nodes(DEFAULT_MAX_NODES)
    }

    pub fn with_max_nodes(max_nodes: usize) -> Self {
        Self { max_nodes }
    }

    pub fn max_nodes(&self) -> usize {
        self.max_nodes
    }

    /// Walk `system` depth-first from its base equipment.
    ///
    /// Neighbors are taken in connector order. A neighbor is followed only if
    /// it resolves to an element that belongs to the system (or is the root)
    /// and has not been visited in this call; its whole subtree is explored
    /// before the next neighbor is considered.
    #[instrument(level = "debug", skip(self, system, lookup), fields(system = %system.id))]
    pub fn traverse<L>(&self, system: &System, lookup: &L) -> TreeResult<TreeArena>
    where
        L: ElementLookup + ?Sized,
    {
        let empty_root = || DomainError::EmptyRoot { system: system.id };

        let root_id = system.base_equipment.ok_or_else(empty_root)?;
        let root = lookup
            .element(root_id)
            .filter(|node| !node.connectors.is_empty())
            .ok_or_else(empty_root)?;

        let members: HashSet<ElementId> = system
            .elements
            .iter()
            .copied()
            .chain(std::iter::once(root_id))
            .collect();
        let resolve = |id: ElementId| {
            if members.contains(&id) {
                lookup.element(id)
            } else {
                None
            }
        };

        if !root.neighbors().any(|id| resolve(id).is_some()) {
            return Err(DomainError::NoReachableNodes {
                system: system.id,
                root: root_id,
            });
        }

        let mut visited = HashSet::new();
        visited.insert(root_id);

        let mut tree = TreeArena::new();
        let root_idx = tree.insert_node(NodeData::from(root), None);
        let mut stack = vec![Frame {
            idx: root_idx,
            neighbors: root.neighbors().collect(),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(&neighbor_id) = frame.neighbors.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let parent_idx = frame.idx;

            let Some(neighbor) = resolve(neighbor_id) else {
                trace!(element = %neighbor_id, "skipping unresolved neighbor");
                continue;
            };
            if !visited.insert(neighbor_id) {
                continue;
            }
            if tree.len() >= self.max_nodes {
                return Err(DomainError::TraversalAborted {
                    system: system.id,
                    limit: self.max_nodes,
                });
            }

            let idx = tree.insert_node(NodeData::from(neighbor), Some(parent_idx));
            stack.push(Frame {
                idx,
                neighbors: neighbor.neighbors().collect(),
                next: 0,
            });
        }

        debug!(nodes = tree.len(), depth = tree.depth(), "traversal complete");
        Ok(tree)
    }
}
