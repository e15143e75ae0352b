//! Cross-system, per-category listing of visited elements.

use serde::Serialize;
use serde_json::value::{to_raw_value, RawValue};
use tracing::debug;

use crate::domain::entities::{Category, ElementId};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::hierarchy::{preorder, Hierarchy};

#[derive(Serialize)]
struct IdRecord<'a> {
    id: ElementId,
    name: &'a str,
}

/// Three append-only category buckets of `{"id", "name"}` records.
///
/// Buckets are appended in the order systems are collected. An element shared
/// by two systems of the same category is listed once per system.
#[derive(Debug, Default)]
pub struct UniqueIdRegistry {
    buckets: [Vec<Box<RawValue>>; 3],
}

/// Finalized bucket listings, each a JSON array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryListings {
    pub mechanical: String,
    pub electrical: String,
    pub piping: String,
}

impl CategoryListings {
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Mechanical => &self.mechanical,
            Category::Electrical => &self.electrical,
            Category::Piping => &self.piping,
        }
    }
}

impl UniqueIdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record per tree node, pre-order, to the category's bucket.
    ///
    /// The tree is validated before anything is appended, so a malformed tree
    /// leaves the registry untouched. Returns the number of records added.
    pub fn collect<H: Hierarchy + ?Sized>(
        &mut self,
        tree: &H,
        category: Category,
    ) -> DomainResult<usize> {
        let records = preorder(tree)?
            .into_iter()
            .map(|data| {
                to_raw_value(&IdRecord {
                    id: data.id,
                    name: &data.name,
                })
                .map_err(|e| DomainError::inconsistent(format!("encode record {}: {e}", data.id)))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        let added = records.len();
        self.buckets[category.index()].extend(records);
        debug!(%category, added, total = self.buckets[category.index()].len(), "collected ids");
        Ok(added)
    }

    /// Records of one category, in append order.
    pub fn bucket(&self, category: Category) -> &[Box<RawValue>] {
        &self.buckets[category.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Render each bucket as a flat JSON array.
    pub fn finalize(&self) -> DomainResult<CategoryListings> {
        let render = |category: Category| {
            serde_json::to_string(self.bucket(category))
                .map_err(|e| DomainError::inconsistent(format!("encode {category} listing: {e}")))
        };
        Ok(CategoryListings {
            mechanical: render(Category::Mechanical)?,
            electrical: render(Category::Electrical)?,
            piping: render(Category::Piping)?,
        })
    }

    /// Buckets as borrowed fragments, in [`Category::ALL`] order.
    pub fn groups(&self) -> [Vec<&RawValue>; 3] {
        Category::ALL.map(|category| {
            self.bucket(category)
                .iter()
                .map(|record| record.as_ref())
                .collect()
        })
    }
}
