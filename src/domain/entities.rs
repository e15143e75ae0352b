//! Domain entities: building-services model data

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// System name the host uses for the catch-all bucket of unconnected elements.
pub const UNASSIGNED_SYSTEM_NAME: &str = "unassigned";

/// Stable element identifier as assigned by the host model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ElementId {
    fn from(value: i64) -> Self {
        ElementId(value)
    }
}

/// One connector endpoint of an element and the elements attached to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Connector {
    pub connected: Vec<ElementId>,
}

impl Connector {
    pub fn new(connected: impl IntoIterator<Item = ElementId>) -> Self {
        Self {
            connected: connected.into_iter().collect(),
        }
    }
}

/// Physical element (equipment, fitting, segment) in the connectivity graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: ElementId,
    pub name: String,
    /// Connector endpoints in the order the host presents them
    #[serde(default)]
    pub connectors: Vec<Connector>,
}

impl NetworkNode {
    pub fn new(id: i64, name: impl Into<String>, connectors: Vec<Connector>) -> Self {
        Self {
            id: ElementId(id),
            name: name.into(),
            connectors,
        }
    }

    /// All element references across all connectors, in connector order.
    pub fn neighbors(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.connectors
            .iter()
            .flat_map(|c| c.connected.iter().copied())
    }
}

/// The three MEP disciplines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Mechanical,
    Electrical,
    Piping,
}

impl Category {
    /// All categories in bucket order.
    pub const ALL: [Category; 3] = [Category::Mechanical, Category::Electrical, Category::Piping];

    /// Bucket position of this category.
    pub fn index(self) -> usize {
        match self {
            Category::Mechanical => 0,
            Category::Electrical => 1,
            Category::Piping => 2,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Mechanical => "Mechanical",
            Category::Electrical => "Electrical",
            Category::Piping => "Piping",
        }
    }

    /// Classify a host category string. Anything unrecognized is `None`.
    pub fn classify(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mechanical" => Some(Category::Mechanical),
            "electrical" => Some(Category::Electrical),
            "piping" => Some(Category::Piping),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Emission order of the hierarchical text export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalOrder {
    /// Parent fields before children (pre-order)
    #[default]
    RootFirst,
    /// Children before parent fields (post-order)
    LeafFirst,
}

impl FromStr for TraversalOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root-first" | "top-down" => Ok(TraversalOrder::RootFirst),
            "leaf-first" | "bottom-up" => Ok(TraversalOrder::LeafFirst),
            other => Err(format!(
                "unknown traversal order '{other}' (expected root-first or leaf-first)"
            )),
        }
    }
}

impl fmt::Display for TraversalOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraversalOrder::RootFirst => f.write_str("root-first"),
            TraversalOrder::LeafFirst => f.write_str("leaf-first"),
        }
    }
}

/// Connected system as delivered by the host model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct System {
    pub id: ElementId,
    pub name: String,
    /// Raw host classification, see [`Category::classify`]
    #[serde(default)]
    pub category: String,
    /// Root of the traversal
    #[serde(default)]
    pub base_equipment: Option<ElementId>,
    /// Member elements
    #[serde(default)]
    pub elements: Vec<ElementId>,
}

impl System {
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Non-empty and not the host's "unassigned" catch-all.
    pub fn is_desirable(&self) -> bool {
        !self.is_empty() && self.name != UNASSIGNED_SYSTEM_NAME
    }

    pub fn category(&self) -> Option<Category> {
        Category::classify(&self.category)
    }

    /// `id(name)` label used in listings.
    pub fn label(&self) -> String {
        format!("{}({})", self.id, self.name)
    }
}

/// Element lookup used by the traversal.
pub trait ElementLookup {
    fn element(&self, id: ElementId) -> Option<&NetworkNode>;
}

impl ElementLookup for HashMap<ElementId, NetworkNode> {
    fn element(&self, id: ElementId) -> Option<&NetworkNode> {
        self.get(&id)
    }
}

/// Serialized form of [`Model`] before the element index is built.
#[derive(Debug, Deserialize)]
struct RawModel {
    title: String,
    #[serde(default)]
    elements: Vec<NetworkNode>,
    #[serde(default)]
    systems: Vec<System>,
}

/// Whole host model: project title, elements and systems.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawModel")]
pub struct Model {
    title: String,
    elements: Vec<NetworkNode>,
    systems: Vec<System>,
    #[serde(skip)]
    index: HashMap<ElementId, usize>,
}

impl TryFrom<RawModel> for Model {
    type Error = DomainError;

    fn try_from(raw: RawModel) -> Result<Self, Self::Error> {
        Model::new(raw.title, raw.elements, raw.systems)
    }
}

impl Model {
    /// Build a model, rejecting duplicate element ids.
    pub fn new(
        title: impl Into<String>,
        elements: Vec<NetworkNode>,
        systems: Vec<System>,
    ) -> Result<Self, DomainError> {
        let mut index = HashMap::with_capacity(elements.len());
        for (pos, element) in elements.iter().enumerate() {
            if index.insert(element.id, pos).is_some() {
                return Err(DomainError::InvalidModel {
                    message: format!("duplicate element id {}", element.id),
                });
            }
        }
        Ok(Self {
            title: title.into(),
            elements,
            systems,
            index,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn elements(&self) -> &[NetworkNode] {
        &self.elements
    }

    pub fn systems(&self) -> &[System] {
        &self.systems
    }

    pub fn system(&self, id: ElementId) -> Option<&System> {
        self.systems.iter().find(|s| s.id == id)
    }
}

impl ElementLookup for Model {
    fn element(&self, id: ElementId) -> Option<&NetworkNode> {
        self.index.get(&id).and_then(|&pos| self.elements.get(pos))
    }
}
