//! Category and project composites over per-system hierarchy records.

use serde::Serialize;
use serde_json::value::RawValue;
use sha2::{Digest, Sha256};

use crate::domain::entities::{Category, ElementId};
use crate::domain::error::{DomainError, DomainResult};

/// Synthetic ids for the project node and its three category nodes.
///
/// Derived from the project title, so they are stable for a given title and
/// distinct from each other within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticIds {
    project: i32,
}

impl SyntheticIds {
    pub fn for_title(title: &str) -> Self {
        let digest = Sha256::digest(title.as_bytes());
        Self {
            project: i32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]),
        }
    }

    pub fn project(&self) -> ElementId {
        ElementId(i64::from(self.project))
    }

    /// Project id plus 1, 2, 3 for mechanical, electrical, piping.
    pub fn category(&self, category: Category) -> ElementId {
        let offset = category.index() as i32 + 1;
        ElementId(i64::from(self.project.wrapping_add(offset)))
    }
}

#[derive(Serialize)]
struct CompositeNode<'a, C> {
    id: ElementId,
    name: &'a str,
    children: C,
}

/// Wrap three category groups under one project node.
///
/// `{"id":<project>,"name":<title>,"children":[<mechanical>,<electrical>,<piping>]}`
/// where each category node carries its group's records as children.
pub fn project_document(title: &str, groups: [Vec<&RawValue>; 3]) -> DomainResult<String> {
    let ids = SyntheticIds::for_title(title);
    let categories: Vec<CompositeNode<'_, Vec<&RawValue>>> = Category::ALL
        .into_iter()
        .zip(groups)
        .map(|(category, records)| CompositeNode {
            id: ids.category(category),
            name: category.display_name(),
            children: records,
        })
        .collect();

    let project = CompositeNode {
        id: ids.project(),
        name: title,
        children: categories,
    };
    serde_json::to_string(&project)
        .map_err(|e| DomainError::inconsistent(format!("encode project document: {e}")))
}

#[derive(Debug)]
struct SystemEntry {
    name: String,
    record: Box<RawValue>,
}

/// Per-category collection of whole-system hierarchy records.
#[derive(Debug, Default)]
pub struct SystemAggregator {
    entries: [Vec<SystemEntry>; 3],
}

impl SystemAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one system's hierarchy text under `category`, sorted later by `name`.
    ///
    /// `record` must be a complete JSON value.
    pub fn add(
        &mut self,
        category: Category,
        name: impl Into<String>,
        record: String,
    ) -> DomainResult<()> {
        let name = name.into();
        let record = RawValue::from_string(record)
            .map_err(|e| DomainError::inconsistent(format!("record of '{name}' is not JSON: {e}")))?;
        self.entries[category.index()].push(SystemEntry { name, record });
        Ok(())
    }

    pub fn len(&self, category: Category) -> usize {
        self.entries[category.index()].len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Vec::is_empty)
    }

    /// Records of one category ordered by name; ids play no part in the order
    /// and equal names keep insertion order.
    pub fn sorted(&self, category: Category) -> Vec<&RawValue> {
        let mut entries: Vec<&SystemEntry> = self.entries[category.index()].iter().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries.into_iter().map(|e| e.record.as_ref()).collect()
    }

    /// One category node: `{"id":<synthetic>,"name":<category>,"children":[...]}`.
    pub fn category_node(&self, title: &str, category: Category) -> DomainResult<String> {
        let node = CompositeNode {
            id: SyntheticIds::for_title(title).category(category),
            name: category.display_name(),
            children: self.sorted(category),
        };
        serde_json::to_string(&node)
            .map_err(|e| DomainError::inconsistent(format!("encode {category} node: {e}")))
    }

    /// Project composite with all three sorted category nodes.
    pub fn project_document(&self, title: &str) -> DomainResult<String> {
        project_document(title, Category::ALL.map(|category| self.sorted(category)))
    }
}
