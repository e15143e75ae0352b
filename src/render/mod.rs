//! Serializers over [`Hierarchy`](crate::domain::Hierarchy) trees.
//!
//! Each renderer is a free function, so adding a format never touches the
//! traversal. All of them reject malformed trees with
//! `DomainError::SerializationInconsistency`.

pub mod display;
pub mod document;
pub mod text;

pub use display::TreeDisplay;
pub use document::{to_document, MAX_INDENTED_DEPTH, NODE_TAG};
pub use text::{to_text, to_text_leaf_first, to_text_root_first};
