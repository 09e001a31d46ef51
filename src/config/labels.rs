// label table: every label is one template row over the singular or plural noun
use serde::{Deserialize, Serialize};

pub const DEFAULT_SINGULAR: &str = "Item";
pub const DEFAULT_PLURAL: &str = "Items";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelKey {
    Name,
    SingularName,
    MenuName,
    AllItems,
    EditItem,
    ViewItem,
    UpdateItem,
    AddNewItem,
    NewItemName,
    ParentItem,
    ParentItemColon,
    SearchItems,
    PopularItems,
    SeparateItemsWithCommas,
    AddOrRemoveItems,
    ChooseFromMostUsed,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Noun {
    Singular,
    Plural,
}

/// `(label, template, noun)`; `%s` is replaced with the noun.
pub const LABEL_TEMPLATES: [(LabelKey, &str, Noun); 17] = [
    (LabelKey::Name, "%s", Noun::Plural),
    (LabelKey::SingularName, "%s", Noun::Singular),
    (LabelKey::MenuName, "%s", Noun::Plural),
    (LabelKey::AllItems, "All %s", Noun::Plural),
    (LabelKey::EditItem, "Edit %s", Noun::Singular),
    (LabelKey::ViewItem, "View %s", Noun::Singular),
    (LabelKey::UpdateItem, "Update %s", Noun::Singular),
    (LabelKey::AddNewItem, "Add New %s", Noun::Singular),
    (LabelKey::NewItemName, "New %s Name", Noun::Singular),
    (LabelKey::ParentItem, "Parent %s", Noun::Singular),
    (LabelKey::ParentItemColon, "Parent %s:", Noun::Singular),
    (LabelKey::SearchItems, "Search %s", Noun::Plural),
    (LabelKey::PopularItems, "Popular %s", Noun::Plural),
    (LabelKey::SeparateItemsWithCommas, "Separate %s with commas", Noun::Plural),
    (LabelKey::AddOrRemoveItems, "Add or remove %s", Noun::Plural),
    (LabelKey::ChooseFromMostUsed, "Choose from the most used %s", Noun::Plural),
    (LabelKey::NotFound, "No %s found", Noun::Plural),
];

/// Fully populated label set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub name: String,
    pub singular_name: String,
    pub menu_name: String,
    pub all_items: String,
    pub edit_item: String,
    pub view_item: String,
    pub update_item: String,
    pub add_new_item: String,
    pub new_item_name: String,
    pub parent_item: String,
    pub parent_item_colon: String,
    pub search_items: String,
    pub popular_items: String,
    pub separate_items_with_commas: String,
    pub add_or_remove_items: String,
    pub choose_from_most_used: String,
    pub not_found: String,
}

impl Labels {
    pub fn get(&self, key: LabelKey) -> &str {
        match key {
            LabelKey::Name => &self.name,
            LabelKey::SingularName => &self.singular_name,
            LabelKey::MenuName => &self.menu_name,
            LabelKey::AllItems => &self.all_items,
            LabelKey::EditItem => &self.edit_item,
            LabelKey::ViewItem => &self.view_item,
            LabelKey::UpdateItem => &self.update_item,
            LabelKey::AddNewItem => &self.add_new_item,
            LabelKey::NewItemName => &self.new_item_name,
            LabelKey::ParentItem => &self.parent_item,
            LabelKey::ParentItemColon => &self.parent_item_colon,
            LabelKey::SearchItems => &self.search_items,
            LabelKey::PopularItems => &self.popular_items,
            LabelKey::SeparateItemsWithCommas => &self.separate_items_with_commas,
            LabelKey::AddOrRemoveItems => &self.add_or_remove_items,
            LabelKey::ChooseFromMostUsed => &self.choose_from_most_used,
            LabelKey::NotFound => &self.not_found,
        }
    }

    fn slot_mut(&mut self, key: LabelKey) -> &mut String {
        match key {
            LabelKey::Name => &mut self.name,
            LabelKey::SingularName => &mut self.singular_name,
            LabelKey::MenuName => &mut self.menu_name,
            LabelKey::AllItems => &mut self.all_items,
            LabelKey::EditItem => &mut self.edit_item,
            LabelKey::ViewItem => &mut self.view_item,
            LabelKey::UpdateItem => &mut self.update_item,
            LabelKey::AddNewItem => &mut self.add_new_item,
            LabelKey::NewItemName => &mut self.new_item_name,
            LabelKey::ParentItem => &mut self.parent_item,
            LabelKey::ParentItemColon => &mut self.parent_item_colon,
            LabelKey::SearchItems => &mut self.search_items,
            LabelKey::PopularItems => &mut self.popular_items,
            LabelKey::SeparateItemsWithCommas => &mut self.separate_items_with_commas,
            LabelKey::AddOrRemoveItems => &mut self.add_or_remove_items,
            LabelKey::ChooseFromMostUsed => &mut self.choose_from_most_used,
            LabelKey::NotFound => &mut self.not_found,
        }
    }
}

/// Caller-supplied labels. `plural_name` only feeds the plural noun; it is
/// not itself a label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialLabels {
    pub name: Option<String>,
    pub singular_name: Option<String>,
    pub plural_name: Option<String>,
    pub menu_name: Option<String>,
    pub all_items: Option<String>,
    pub edit_item: Option<String>,
    pub view_item: Option<String>,
    pub update_item: Option<String>,
    pub add_new_item: Option<String>,
    pub new_item_name: Option<String>,
    pub parent_item: Option<String>,
    pub parent_item_colon: Option<String>,
    pub search_items: Option<String>,
    pub popular_items: Option<String>,
    pub separate_items_with_commas: Option<String>,
    pub add_or_remove_items: Option<String>,
    pub choose_from_most_used: Option<String>,
    pub not_found: Option<String>,
}

impl PartialLabels {
    pub fn get(&self, key: LabelKey) -> Option<&str> {
        let value = match key {
            LabelKey::Name => &self.name,
            LabelKey::SingularName => &self.singular_name,
            LabelKey::MenuName => &self.menu_name,
            LabelKey::AllItems => &self.all_items,
            LabelKey::EditItem => &self.edit_item,
            LabelKey::ViewItem => &self.view_item,
            LabelKey::UpdateItem => &self.update_item,
            LabelKey::AddNewItem => &self.add_new_item,
            LabelKey::NewItemName => &self.new_item_name,
            LabelKey::ParentItem => &self.parent_item,
            LabelKey::ParentItemColon => &self.parent_item_colon,
            LabelKey::SearchItems => &self.search_items,
            LabelKey::PopularItems => &self.popular_items,
            LabelKey::SeparateItemsWithCommas => &self.separate_items_with_commas,
            LabelKey::AddOrRemoveItems => &self.add_or_remove_items,
            LabelKey::ChooseFromMostUsed => &self.choose_from_most_used,
            LabelKey::NotFound => &self.not_found,
        };
        value.as_deref()
    }

    pub fn singular(mut self, singular: impl Into<String>) -> Self {
        self.singular_name = Some(singular.into());
        self
    }

    pub fn plural(mut self, plural: impl Into<String>) -> Self {
        self.plural_name = Some(plural.into());
        self
    }
}

//blank strings count as "not given"
fn given(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve the singular and plural nouns that feed the template table.
pub fn nouns<'a>(partial: &'a PartialLabels, singular: &'a str, plural: &'a str) -> (&'a str, &'a str) {
    let singular = given(partial.singular_name.as_deref())
        .or(given(Some(singular)))
        .unwrap_or(DEFAULT_SINGULAR);
    let plural = given(partial.plural_name.as_deref())
        .or(given(partial.name.as_deref()))
        .or(given(Some(plural)))
        .unwrap_or(DEFAULT_PLURAL);
    (singular, plural)
}

/// Fill every label from the template table, then lay caller-supplied
/// labels over it field by field.
pub fn merge_labels(partial: &PartialLabels, singular: &str, plural: &str) -> Labels {
    let (singular, plural) = nouns(partial, singular, plural);
    let mut labels = Labels::default();
    for (key, template, noun) in LABEL_TEMPLATES {
        let word = match noun {
            Noun::Singular => singular,
            Noun::Plural => plural,
        };
        *labels.slot_mut(key) = match given(partial.get(key)) {
            Some(explicit) => explicit.to_string(),
            None => template.replace("%s", word),
        };
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_partial_uses_nouns_everywhere() {
        let labels = merge_labels(&PartialLabels::default(), "Item", "Items");

        let expected = Labels {
            name: "Items".into(),
            singular_name: "Item".into(),
            menu_name: "Items".into(),
            all_items: "All Items".into(),
            edit_item: "Edit Item".into(),
            view_item: "View Item".into(),
            update_item: "Update Item".into(),
            add_new_item: "Add New Item".into(),
            new_item_name: "New Item Name".into(),
            parent_item: "Parent Item".into(),
            parent_item_colon: "Parent Item:".into(),
            search_items: "Search Items".into(),
            popular_items: "Popular Items".into(),
            separate_items_with_commas: "Separate Items with commas".into(),
            add_or_remove_items: "Add or remove Items".into(),
            choose_from_most_used: "Choose from the most used Items".into(),
            not_found: "No Items found".into(),
        };
        assert_eq!(labels, expected);
    }

    #[test]
    fn every_template_row_is_populated() {
        let labels = merge_labels(&PartialLabels::default(), "", "");
        for (key, _, _) in LABEL_TEMPLATES {
            assert!(!labels.get(key).is_empty(), "{key:?} left empty");
        }
        assert_eq!(labels.singular_name, DEFAULT_SINGULAR);
        assert_eq!(labels.name, DEFAULT_PLURAL);
    }

    #[test]
    fn singular_override_touches_only_singular_rows() {
        let partial = PartialLabels::default().singular("Tag");
        let labels = merge_labels(&partial, "Item", "Items");

        for (key, template, noun) in LABEL_TEMPLATES {
            let expected = match noun {
                Noun::Singular => template.replace("%s", "Tag"),
                Noun::Plural => template.replace("%s", "Items"),
            };
            assert_eq!(labels.get(key), expected, "{key:?}");
        }
    }

    #[test]
    fn name_feeds_plural_noun_when_plural_name_missing() {
        let partial = PartialLabels {
            name: Some("Teams".into()),
            ..PartialLabels::default()
        };
        let labels = merge_labels(&partial, "Team", "Groups");
        assert_eq!(labels.name, "Teams");
        assert_eq!(labels.all_items, "All Teams");
        assert_eq!(labels.edit_item, "Edit Team");
    }

    #[test]
    fn plural_name_beats_name_but_explicit_name_stays() {
        let partial = PartialLabels {
            name: Some("Departments (all)".into()),
            ..PartialLabels::default()
        }
        .plural("Departments");
        let labels = merge_labels(&partial, "Department", "x");
        assert_eq!(labels.name, "Departments (all)");
        assert_eq!(labels.menu_name, "Departments");
        assert_eq!(labels.not_found, "No Departments found");
    }

    #[test]
    fn explicit_label_overrides_its_template() {
        let partial = PartialLabels {
            edit_item: Some("Rename group".into()),
            ..PartialLabels::default()
        };
        let labels = merge_labels(&partial, "Group", "Groups");
        assert_eq!(labels.edit_item, "Rename group");
        assert_eq!(labels.view_item, "View Group");
    }
}
