//! Domain layer: entities, traversal and the derived tree
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod hierarchy;
pub mod registry;

pub use aggregate::{project_document, SyntheticIds, SystemAggregator};
pub use arena::{NodeData, TreeArena, TreeNode};
pub use builder::{TreeBuilder, DEFAULT_MAX_NODES};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use hierarchy::{walk, Hierarchy, Visit};
pub use registry::{CategoryListings, UniqueIdRegistry};
