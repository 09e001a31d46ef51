//! Hierarchical taxonomy core: register classification hierarchies over
//! arbitrary object kinds and edit an object's terms through a foldable
//! checklist tree.
//!
//! Data flow for one render: the node store hands over a snapshot, a
//! [`HierarchyIndex`] is built from it, the fold policy marks every branch
//! with a selected descendant as expanded, and the renderer produces a
//! [`RenderNode`] tree that a presentation layer (see [`markup`]) turns
//! into markup.

pub mod config;
pub mod core;
pub mod error;
pub mod facade;
pub mod markup;
pub mod store;

pub use crate::config::defaults::{ConfigDefaulter, TaxonomyArgs, TaxonomyConfig};
pub use crate::core::fold::expanded_set;
pub use crate::core::graph::HierarchyIndex;
pub use crate::core::render::{RenderFlags, RenderNode, render};
pub use crate::core::types::{Node, NodeId, ObjectId, SelectionSet, TenantId, TermRef};
pub use crate::error::{PlatformError, StoreError, TaxonomyError, ValidationError};
pub use crate::facade::{AssignOptions, AssignmentResult, Registry, TaxonomyFacade, TaxonomyHandle};
pub use crate::store::{MemoryPlatform, MemoryStore, NodeStore, Platform, TermQuery, TermScope};
