// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::error::{Error, Result};
use crate::ids::ItemId;
use crate::model::{FilterSet, Item, PageDescriptor, SearchFields};

/// Working copy of one loaded page plus everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct BrowserState {
    items: Vec<Item>,
    visible: Vec<usize>,
    filters: FilterSet,
    page: PageDescriptor,
    selected: Option<ItemId>,
    loaded: bool,
    search_fields: SearchFields,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self::new(SearchFields::default())
    }
}

/// Snapshot handed to "view changed" subscribers after every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewChanged<'a> {
    pub items: Vec<&'a Item>,
    pub page: PageDescriptor,
    pub selected: Option<&'a Item>,
    pub filters: &'a FilterSet,
}

impl BrowserState {
    pub fn new(search_fields: SearchFields) -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            filters: FilterSet::default(),
            page: PageDescriptor::default(),
            selected: None,
            loaded: false,
            search_fields,
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &Item> {
        self.visible.iter().filter_map(|index| self.items.get(*index))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn page(&self) -> PageDescriptor {
        self.page
    }

    pub fn search_fields(&self) -> &SearchFields {
        &self.search_fields
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn selected(&self) -> Option<&Item> {
        let id = self.selected.as_ref()?;
        self.items.iter().find(|item| &item.id == id)
    }

    /// Installs a freshly fetched page, dropping filters and selection.
    pub fn replace_page(&mut self, items: Vec<Item>, page: PageDescriptor) {
        self.items = items;
        self.page = page;
        self.filters.clear();
        self.selected = None;
        self.loaded = true;
        self.recompute();
    }

    pub fn set_filter(&mut self, key: &str, value: &str) {
        if self.filters.set(key, value) {
            self.recompute();
        }
    }

    pub fn set_search_term(&mut self, term: &str) {
        if self.filters.set_search(term) {
            self.recompute();
        }
    }

    pub fn reset_filters(&mut self) {
        self.filters.clear();
        self.selected = None;
        self.recompute();
    }

    pub fn select(&mut self, id: &str) -> Result<&Item> {
        let Some(item) = self.items.iter().find(|item| item.id.as_str() == id) else {
            return Err(Error::not_found("item", id));
        };
        self.selected = Some(item.id.clone());
        Ok(item)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn view(&self) -> ViewChanged<'_> {
        ViewChanged {
            items: self.visible_items().collect(),
            page: self.page,
            selected: self.selected(),
            filters: &self.filters,
        }
    }

    fn recompute(&mut self) {
        self.visible = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.filters.matches(item, &self.search_fields))
            .map(|(index, _)| index)
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::BrowserState;
    use crate::{Error, Item, PageDescriptor, TAG_CITY, TAG_TYPE};

    fn loaded_state() -> BrowserState {
        let items = vec![
            Item::new("a", "Salar Jung Museum")
                .with_tag(TAG_CITY, "Hyderabad")
                .with_tag(TAG_TYPE, "Art"),
            Item::new("b", "Nehru Science Centre")
                .with_tag(TAG_CITY, "Mumbai")
                .with_tag(TAG_TYPE, "Science"),
            Item::new("c", "Jehangir Art Gallery")
                .with_tag(TAG_CITY, "Mumbai")
                .with_tag(TAG_TYPE, "Art"),
        ];
        let mut state = BrowserState::default();
        state.replace_page(items, PageDescriptor::new(1, 9, 3));
        state
    }

    fn visible_ids(state: &BrowserState) -> Vec<&str> {
        state.visible_items().map(|item| item.id.as_str()).collect()
    }

    #[test]
    fn new_state_is_empty_and_unloaded() {
        let state = BrowserState::default();
        assert!(!state.is_loaded());
        assert_eq!(state.visible_len(), 0);
        assert!(state.selected().is_none());
    }

    #[test]
    fn replace_page_shows_every_item() {
        let state = loaded_state();
        assert!(state.is_loaded());
        assert_eq!(visible_ids(&state), ["a", "b", "c"]);
    }

    #[test]
    fn filters_and_search_preserve_item_order() {
        let mut state = loaded_state();
        state.set_filter(TAG_CITY, "Mumbai");
        assert_eq!(visible_ids(&state), ["b", "c"]);

        state.set_search_term("ART");
        assert_eq!(visible_ids(&state), ["c"]);

        state.set_filter(TAG_CITY, "");
        assert_eq!(visible_ids(&state), ["a", "c"]);
    }

    #[test]
    fn reset_filters_restores_full_view_and_clears_selection() {
        let mut state = loaded_state();
        state.set_filter(TAG_TYPE, "Science");
        state.select("b").expect("b is loaded");
        state.reset_filters();
        assert_eq!(visible_ids(&state), ["a", "b", "c"]);
        assert!(state.selected().is_none());
        assert!(state.filters().is_empty());
    }

    #[test]
    fn selecting_unknown_item_keeps_prior_selection() {
        let mut state = loaded_state();
        state.select("a").expect("a is loaded");
        let error = state.select("zzz").expect_err("unknown id should fail");
        assert!(matches!(error, Error::NotFound { .. }));
        assert_eq!(state.selected().map(|item| item.id.as_str()), Some("a"));
    }

    #[test]
    fn selection_may_target_items_hidden_by_filters() {
        let mut state = loaded_state();
        state.set_filter(TAG_CITY, "Hyderabad");
        let selected = state.select("b").expect("b is on the page");
        assert_eq!(selected.name, "Nehru Science Centre");
    }

    #[test]
    fn replacing_the_page_clears_selection_and_filters() {
        let mut state = loaded_state();
        state.select("c").expect("c is loaded");
        state.set_search_term("jehangir");
        state.replace_page(vec![Item::new("d", "Dakshina Chitra")], PageDescriptor::new(2, 1, 4));
        assert!(state.selected().is_none());
        assert!(state.filters().is_empty());
        assert_eq!(visible_ids(&state), ["d"]);
        assert_eq!(state.page().page, 2);
    }

    #[test]
    fn view_reports_visible_items_and_selection() {
        let mut state = loaded_state();
        state.set_filter(TAG_TYPE, "Art");
        state.select("c").expect("c is loaded");
        let view = state.view();
        assert_eq!(view.items.len(), 2);
        assert_eq!(view.selected.map(|item| item.name.as_str()), Some("Jehangir Art Gallery"));
        assert_eq!(view.page.total, 3);
        assert_eq!(view.filters.get(TAG_TYPE), Some("Art"));
    }
}
