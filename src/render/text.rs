//! Nested-record text exports (`{"id", "name", "children"}`).
//!
//! Root-first writes a node's own fields before its children, leaf-first after
//! them. Both carry exactly the same records, so either text parses to the same
//! JSON value. The text is streamed from the validated walk, so tree depth
//! never turns into call depth.

use crate::domain::hierarchy::walk;
use crate::domain::{DomainError, DomainResult, Hierarchy, NodeData, TraversalOrder, Visit};

/// `"id":<id>,"name":<escaped name>`
fn write_fields(out: &mut String, data: &NodeData) -> DomainResult<()> {
    let name = serde_json::to_string(&data.name)
        .map_err(|e| DomainError::inconsistent(format!("encode name of {}: {e}", data.id)))?;
    out.push_str(&format!("\"id\":{},\"name\":{name}", data.id.0));
    Ok(())
}

fn stream<H: Hierarchy + ?Sized>(tree: &H, order: TraversalOrder) -> DomainResult<String> {
    let unbalanced = || DomainError::inconsistent("unbalanced walk");

    let mut out = String::new();
    // One "has written a child" flag per open node.
    let mut open: Vec<bool> = Vec::new();
    let mut roots = 0usize;

    for visit in walk(tree)? {
        match visit {
            Visit::Enter(_, data) => {
                match open.last_mut() {
                    Some(written) if *written => out.push(','),
                    Some(written) => *written = true,
                    None => roots += 1,
                }
                open.push(false);
                out.push('{');
                match order {
                    TraversalOrder::RootFirst => {
                        write_fields(&mut out, data)?;
                        out.push_str(",\"children\":[");
                    }
                    TraversalOrder::LeafFirst => out.push_str("\"children\":["),
                }
            }
            Visit::Leave(_, data) => {
                open.pop().ok_or_else(unbalanced)?;
                out.push(']');
                if order == TraversalOrder::LeafFirst {
                    out.push(',');
                    write_fields(&mut out, data)?;
                }
                out.push('}');
            }
        }
    }

    if roots != 1 || !open.is_empty() {
        return Err(unbalanced());
    }
    Ok(out)
}

/// `{"id":..,"name":..,"children":[..]}`, parent fields first.
pub fn to_text_root_first<H: Hierarchy + ?Sized>(tree: &H) -> DomainResult<String> {
    stream(tree, TraversalOrder::RootFirst)
}

/// `{"children":[..],"id":..,"name":..}`, children first.
pub fn to_text_leaf_first<H: Hierarchy + ?Sized>(tree: &H) -> DomainResult<String> {
    stream(tree, TraversalOrder::LeafFirst)
}

/// Hierarchical text in the requested order.
pub fn to_text<H: Hierarchy + ?Sized>(tree: &H, order: TraversalOrder) -> DomainResult<String> {
    stream(tree, order)
}
