//! XML document export: one `<Node id=".." name="..">` element per tree node.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::domain::{DomainError, DomainResult, Hierarchy, Visit};
use crate::domain::hierarchy::walk;

/// Element name used for every tree node.
pub const NODE_TAG: &str = "Node";

/// Deeper trees are written without indentation, which would grow with the
/// square of their depth.
pub const MAX_INDENTED_DEPTH: usize = 256;

/// Render the tree as an indented XML document.
///
/// Nesting mirrors the child relationship; leaves are written as empty
/// elements. Identical trees always produce identical bytes.
pub fn to_document<H: Hierarchy + ?Sized>(tree: &H) -> DomainResult<String> {
    let visits = walk(tree)?;
    let mut writer = if depth(&visits) <= MAX_INDENTED_DEPTH {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };
    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut steps = visits.iter().peekable();
    while let Some(step) = steps.next() {
        match step {
            Visit::Enter(node, data) => {
                let id = data.id.to_string();
                let start = BytesStart::new(NODE_TAG)
                    .with_attributes([("id", id.as_str()), ("name", data.name.as_str())]);
                let is_leaf = matches!(steps.peek(), Some(Visit::Leave(next, _)) if next == node);
                if is_leaf {
                    steps.next();
                    write(&mut writer, Event::Empty(start))?;
                } else {
                    write(&mut writer, Event::Start(start))?;
                }
            }
            Visit::Leave(..) => write(&mut writer, Event::End(BytesEnd::new(NODE_TAG)))?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| DomainError::inconsistent(format!("document is not UTF-8: {e}")))
}

fn depth<N>(visits: &[Visit<'_, N>]) -> usize {
    let mut level = 0usize;
    let mut deepest = 0;
    for visit in visits {
        match visit {
            Visit::Enter(..) => {
                level += 1;
                deepest = deepest.max(level);
            }
            Visit::Leave(..) => level = level.saturating_sub(1),
        }
    }
    deepest
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> DomainResult<()> {
    writer
        .write_event(event)
        .map_err(|e| DomainError::inconsistent(format!("write xml event: {e}")))
}
