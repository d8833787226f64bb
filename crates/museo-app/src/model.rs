// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::ItemId;

pub const FIELD_NAME: &str = "name";
pub const TAG_CITY: &str = "city";
pub const TAG_STATE: &str = "state";
pub const TAG_TYPE: &str = "type";

/// One entry of a browsable collection. Snapshots are never mutated once received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub established: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tags: BTreeMap::new(),
            latitude: None,
            longitude: None,
            distance_km: None,
            established: None,
        }
    }

    pub fn with_tag(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.tags.insert(key.to_owned(), value);
        }
        self
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// Resolves a searchable field key: `name` is the display name, anything else a tag.
    pub fn field(&self, key: &str) -> Option<&str> {
        if key == FIELD_NAME {
            return Some(&self.name);
        }
        self.tag(key)
    }

    pub fn city(&self) -> &str {
        self.tag(TAG_CITY).unwrap_or("")
    }

    pub fn state(&self) -> &str {
        self.tag(TAG_STATE).unwrap_or("")
    }

    pub fn kind(&self) -> &str {
        self.tag(TAG_TYPE).unwrap_or("")
    }

    pub fn location_label(&self) -> String {
        match (self.city(), self.state()) {
            ("", "") => String::new(),
            (city, "") => city.to_owned(),
            ("", state) => state.to_owned(),
            (city, state) => format!("{city}, {state}"),
        }
    }
}

/// Metadata for one page of a server-paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageDescriptor {
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
    pub total_pages: u32,
}

impl Default for PageDescriptor {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 1,
            total: 0,
            total_pages: 1,
        }
    }
}

impl PageDescriptor {
    /// Builds a descriptor whose `total_pages` is derived from `total` and `per_page`.
    pub fn new(page: u32, per_page: u32, total: u32) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page).max(1);
        Self {
            page: page.clamp(1, total_pages),
            per_page,
            total,
            total_pages,
        }
    }

    /// Builds a descriptor from a server-reported page count, used only when no total is known.
    pub fn with_reported_pages(page: u32, per_page: u32, total: u32, total_pages: u32) -> Self {
        let total_pages = total_pages.max(1);
        Self {
            page: page.clamp(1, total_pages),
            per_page: per_page.max(1),
            total,
            total_pages,
        }
    }

    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// A page of results as returned by a collection source, before interpretation.
#[derive(Debug, Clone, PartialEq)]
pub enum PagePayload {
    /// Legacy shape: the whole collection as a bare sequence.
    Bare(Vec<Item>),
    Envelope {
        items: Vec<Item>,
        page: Option<u32>,
        per_page: Option<u32>,
        total: Option<u32>,
        total_pages: Option<u32>,
    },
}

impl PagePayload {
    pub fn items(&self) -> &[Item] {
        match self {
            Self::Bare(items) | Self::Envelope { items, .. } => items,
        }
    }

    /// Resolves the payload against the request that produced it.
    pub fn into_page(self, requested_page: u32, requested_per_page: u32) -> (Vec<Item>, PageDescriptor) {
        match self {
            Self::Bare(items) => {
                let count = len_u32(&items);
                let descriptor = PageDescriptor::new(1, count, count);
                (items, descriptor)
            }
            Self::Envelope {
                items,
                page,
                per_page,
                total,
                total_pages,
            } => {
                let page = page.filter(|page| *page > 0).unwrap_or(requested_page);
                let per_page = per_page
                    .filter(|per_page| *per_page > 0)
                    .unwrap_or(requested_per_page);
                let descriptor = match total {
                    Some(total) => PageDescriptor::new(page, per_page, total),
                    None => {
                        // Without a total, everything before this page is assumed full.
                        let total = page
                            .saturating_sub(1)
                            .saturating_mul(per_page)
                            .saturating_add(len_u32(&items));
                        let derived = total.div_ceil(per_page).max(page);
                        PageDescriptor::with_reported_pages(
                            page,
                            per_page,
                            total,
                            total_pages.unwrap_or(derived),
                        )
                    }
                };
                (items, descriptor)
            }
        }
    }
}

fn len_u32(items: &[Item]) -> u32 {
    u32::try_from(items.len()).unwrap_or(u32::MAX)
}

/// Field keys consulted by free-text search, in match order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFields(Vec<String>);

impl Default for SearchFields {
    fn default() -> Self {
        Self::new([FIELD_NAME, TAG_CITY, TAG_STATE, TAG_TYPE])
    }
}

impl SearchFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(fields.into_iter().map(Into::into).collect())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Conjunctive filter constraints plus an optional free-text search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    filters: BTreeMap<String, String>,
    search: String,
}

impl FilterSet {
    /// Sets a constraint; an empty value removes it. Returns whether anything changed.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return self.filters.remove(key).is_some();
        }
        if self.get(key) == Some(value) {
            return false;
        }
        self.filters.insert(key.to_owned(), value.to_owned());
        true
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.filters.get(key).map(String::as_str)
    }

    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.filters
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn set_search(&mut self, term: &str) -> bool {
        let normalized = term.trim().to_lowercase();
        if normalized == self.search {
            return false;
        }
        self.search = normalized;
        true
    }

    /// The normalized search term, or `None` when search is inactive.
    pub fn search_term(&self) -> Option<&str> {
        (!self.search.is_empty()).then_some(self.search.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.search.is_empty()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
        self.search.clear();
    }

    pub fn matches(&self, item: &Item, fields: &SearchFields) -> bool {
        let filters_match = self
            .filters
            .iter()
            .all(|(key, value)| item.field(key) == Some(value.as_str()));
        if !filters_match {
            return false;
        }

        let Some(term) = self.search_term() else {
            return true;
        };
        fields.iter().any(|key| {
            item.field(key)
                .is_some_and(|value| value.to_lowercase().contains(term))
        })
    }
}

/// Distinct values offered for the structured filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub cities: Vec<String>,
    #[serde(default)]
    pub types: Vec<String>,
}
