use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type NodeId = u64;
pub type ObjectId = u64;
pub type TenantId = u64;

/// Node ids currently assigned to the object being edited.
pub type SelectionSet = HashSet<NodeId>;

/// One classification entry (a term) as handed over by the node store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    //None, or an id missing from the snapshot, makes this a root
    pub parent: Option<NodeId>,
    pub slug: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assigned_count: u64,
}

impl Node {
    pub fn new(
        id: NodeId,
        parent: Option<NodeId>,
        slug: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            parent,
            slug: slug.into(),
            label: label.into(),
            description: String::new(),
            assigned_count: 0,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_count(mut self, assigned_count: u64) -> Self {
        self.assigned_count = assigned_count;
        self
    }
}

/// Assignment token: a node id or a node slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermRef {
    Id(NodeId),
    Slug(String),
}

impl TermRef {
    /// Text is always a slug, digits included: form posts carry the slug
    /// and a numeric slug must not be mistaken for another node's id.
    /// Callers holding an id use `TermRef::Id` (or `From<NodeId>`).
    pub fn parse(raw: &str) -> Self {
        TermRef::Slug(raw.trim().to_string())
    }
}

impl From<NodeId> for TermRef {
    fn from(id: NodeId) -> Self {
        TermRef::Id(id)
    }
}

impl From<&str> for TermRef {
    fn from(raw: &str) -> Self {
        TermRef::parse(raw)
    }
}

impl fmt::Display for TermRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermRef::Id(id) => write!(f, "{id}"),
            TermRef::Slug(slug) => f.write_str(slug),
        }
    }
}
