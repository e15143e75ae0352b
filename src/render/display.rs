use termtree::Tree;

use crate::domain::hierarchy::walk;
use crate::domain::{TreeArena, Visit};

/// Deepest level drawn; anything below is summarized on its ancestor.
pub const MAX_DISPLAY_DEPTH: usize = 64;

/// Terminal rendering of a derived tree.
pub trait TreeDisplay {
    fn to_display_tree(&self) -> Tree<String>;
}

impl TreeDisplay for TreeArena {
    fn to_display_tree(&self) -> Tree<String> {
        let visits = match walk(self) {
            Ok(visits) => visits,
            Err(_) if self.is_empty() => return Tree::new("Empty tree".to_string()),
            Err(e) => return Tree::new(format!("<{e}>")),
        };

        // Finished subtrees per open level, plus the top level.
        let mut pending: Vec<Vec<Tree<String>>> = vec![Vec::new()];
        let mut depth = 0usize;
        let mut hidden = 0usize;

        for visit in visits {
            match visit {
                Visit::Enter(..) => {
                    depth += 1;
                    if depth > MAX_DISPLAY_DEPTH {
                        hidden += 1;
                    } else {
                        pending.push(Vec::new());
                    }
                }
                Visit::Leave(_, data) => {
                    depth -= 1;
                    if depth >= MAX_DISPLAY_DEPTH {
                        continue;
                    }
                    let mut leaves = pending.pop().unwrap_or_default();
                    if hidden > 0 {
                        leaves.push(Tree::new(format!("... {hidden} more")));
                        hidden = 0;
                    }
                    let node = Tree::new(data.to_string()).with_leaves(leaves);
                    if let Some(parent) = pending.last_mut() {
                        parent.push(node);
                    }
                }
            }
        }

        pending
            .pop()
            .and_then(|mut top| top.pop())
            .unwrap_or_else(|| Tree::new("Empty tree".to_string()))
    }
}
