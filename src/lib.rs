//! mepgraph: traverse building-services (MEP) system graphs into
//! deterministic hierarchical exports.
//!
//! Layers, innermost first:
//! - [`domain`]: model entities, the traversal builder, arena tree, id registry and aggregator
//! - [`render`]: XML document, hierarchical text and terminal tree views
//! - [`application`]: the export orchestrator
//! - [`infrastructure`]: filesystem and attribute store implementations, service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod render;
pub mod util;
