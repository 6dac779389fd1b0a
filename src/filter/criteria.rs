//! Filter criteria

use indexmap::IndexSet;
use percent_encoding::percent_decode_str;

use crate::render::{encode_uri_component, ChipKind};

/// Active filters: free text, tags and categories
///
/// Groups combine with AND; values within the tag and category groups combine
/// with OR. An empty group imposes no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    search: String,
    tags: IndexSet<String>,
    categories: IndexSet<String>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current search text, lowercased
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, search: &str) {
        self.search = search.to_lowercase();
    }

    pub fn clear_search(&mut self) {
        self.search.clear();
    }

    pub fn tags(&self) -> &IndexSet<String> {
        &self.tags
    }

    pub fn categories(&self) -> &IndexSet<String> {
        &self.categories
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains(category)
    }

    pub fn is_active(&self, kind: ChipKind, value: &str) -> bool {
        match kind {
            ChipKind::Tag => self.has_tag(value),
            ChipKind::Category => self.has_category(value),
        }
    }

    /// Add the tag if absent, remove it if present; returns whether it is now active
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        toggle(&mut self.tags, tag)
    }

    /// Add the category if absent, remove it if present; returns whether it is now active
    pub fn toggle_category(&mut self, category: &str) -> bool {
        toggle(&mut self.categories, category)
    }

    pub fn toggle(&mut self, kind: ChipKind, value: &str) -> bool {
        match kind {
            ChipKind::Tag => self.toggle_tag(value),
            ChipKind::Category => self.toggle_category(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.tags.is_empty() && self.categories.is_empty()
    }

    /// Read `q`, `tag` and `category` parameters from a URL query string
    pub fn from_query(query: &str) -> Self {
        let mut criteria = Self::default();

        for pair in query.trim_start_matches('?').split('&') {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_query_value(value);
            if value.is_empty() {
                continue;
            }
            match key {
                "q" | "search" => criteria.set_search(&value),
                "tag" => {
                    criteria.tags.insert(value);
                }
                "category" => {
                    criteria.categories.insert(value);
                }
                _ => {}
            }
        }

        criteria
    }

    /// Encode as a URL query string (without the leading `?`)
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if !self.search.is_empty() {
            parts.push(format!("q={}", encode_uri_component(&self.search)));
        }
        for tag in &self.tags {
            parts.push(format!("tag={}", encode_uri_component(tag)));
        }
        for category in &self.categories {
            parts.push(format!("category={}", encode_uri_component(category)));
        }
        parts.join("&")
    }
}

fn toggle(set: &mut IndexSet<String>, value: &str) -> bool {
    if set.shift_remove(value) {
        false
    } else {
        set.insert(value.to_string());
        true
    }
}

fn decode_query_value(value: &str) -> String {
    let value = value.replace('+', " ");
    percent_decode_str(&value).decode_utf8_lossy().into_owned()
}
