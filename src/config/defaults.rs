//! Turns a partial taxonomy configuration into a complete one.
//!
//! Labels come from the template table in [`labels`](super::labels),
//! capabilities and display flags from fixed defaults. Every caller value
//! overrides its own field only. Merging never fails.

use serde::{Deserialize, Serialize};

use crate::config::labels::{Labels, PartialLabels, merge_labels};

pub const MANAGE_CAPABILITY: &str = "manage_categories";
pub const ASSIGN_CAPABILITY: &str = "edit_posts";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub manage_terms: String,
    pub edit_terms: String,
    pub delete_terms: String,
    pub assign_terms: String,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            manage_terms: MANAGE_CAPABILITY.to_string(),
            edit_terms: MANAGE_CAPABILITY.to_string(),
            delete_terms: MANAGE_CAPABILITY.to_string(),
            assign_terms: ASSIGN_CAPABILITY.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialCapabilities {
    pub manage_terms: Option<String>,
    pub edit_terms: Option<String>,
    pub delete_terms: Option<String>,
    pub assign_terms: Option<String>,
}

impl Capabilities {
    fn overlay(mut self, partial: &PartialCapabilities) -> Self {
        overlay(&mut self.manage_terms, &partial.manage_terms);
        overlay(&mut self.edit_terms, &partial.edit_terms);
        overlay(&mut self.delete_terms, &partial.delete_terms);
        overlay(&mut self.assign_terms, &partial.assign_terms);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFlags {
    pub hierarchical: bool,
    pub public: bool,
    pub show_ui: bool,
    pub show_in_nav_menus: bool,
    pub show_tagcloud: bool,
    pub show_admin_column: bool,
    pub show_in_quick_edit: bool,
    pub show_in_rest: bool,
    pub rest_base: String,
    pub query_var: String,
    pub rewrite: bool,
    /// Offer the checklist on the subject object's edit form.
    pub show_on_profile_page: bool,
}

impl DisplayFlags {
    pub fn for_slug(slug: &str) -> Self {
        Self {
            hierarchical: true,
            public: true,
            show_ui: true,
            show_in_nav_menus: true,
            show_tagcloud: true,
            show_admin_column: true,
            show_in_quick_edit: true,
            show_in_rest: true,
            rest_base: slug.to_string(),
            query_var: slug.to_string(),
            rewrite: true,
            show_on_profile_page: true,
        }
    }

    fn overlay(mut self, partial: &PartialFlags) -> Self {
        overlay(&mut self.hierarchical, &partial.hierarchical);
        overlay(&mut self.public, &partial.public);
        overlay(&mut self.show_ui, &partial.show_ui);
        overlay(&mut self.show_in_nav_menus, &partial.show_in_nav_menus);
        overlay(&mut self.show_tagcloud, &partial.show_tagcloud);
        overlay(&mut self.show_admin_column, &partial.show_admin_column);
        overlay(&mut self.show_in_quick_edit, &partial.show_in_quick_edit);
        overlay(&mut self.show_in_rest, &partial.show_in_rest);
        overlay(&mut self.rest_base, &partial.rest_base);
        overlay(&mut self.query_var, &partial.query_var);
        overlay(&mut self.rewrite, &partial.rewrite);
        overlay(&mut self.show_on_profile_page, &partial.show_on_profile_page);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialFlags {
    pub hierarchical: Option<bool>,
    pub public: Option<bool>,
    pub show_ui: Option<bool>,
    pub show_in_nav_menus: Option<bool>,
    pub show_tagcloud: Option<bool>,
    pub show_admin_column: Option<bool>,
    pub show_in_quick_edit: Option<bool>,
    pub show_in_rest: Option<bool>,
    pub rest_base: Option<String>,
    pub query_var: Option<String>,
    pub rewrite: Option<bool>,
    pub show_on_profile_page: Option<bool>,
}

fn overlay<T: Clone>(slot: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

/// What an integrator supplies; everything is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxonomyArgs {
    pub labels: PartialLabels,
    pub capabilities: PartialCapabilities,
    pub flags: PartialFlags,
}

/// Complete, immutable taxonomy configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyConfig {
    pub slug: String,
    /// Object kind the taxonomy classifies (`user`, `post`, ...).
    pub object_type: String,
    pub labels: Labels,
    pub capabilities: Capabilities,
    pub flags: DisplayFlags,
}

#[derive(Debug, Clone)]
pub struct ConfigDefaulter {
    slug: String,
    object_type: String,
}

impl ConfigDefaulter {
    pub fn new(slug: impl Into<String>, object_type: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            object_type: object_type.into(),
        }
    }

    /// Merge `partial` over defaults derived from the `singular`/`plural`
    /// noun pair. Blank nouns fall back to `Item`/`Items`.
    pub fn merge(&self, partial: &TaxonomyArgs, singular: &str, plural: &str) -> TaxonomyConfig {
        TaxonomyConfig {
            slug: self.slug.clone(),
            object_type: self.object_type.clone(),
            labels: merge_labels(&partial.labels, singular, plural),
            capabilities: Capabilities::default().overlay(&partial.capabilities),
            flags: DisplayFlags::for_slug(&self.slug).overlay(&partial.flags),
        }
    }
}
