//! Recently committed search terms

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::storage::{read_best_effort, write_best_effort, Storage};

/// Most-recent-first list of search terms kept in storage as a JSON array
pub struct SearchHistory {
    storage: Arc<dyn Storage>,
    key: String,
    limit: usize,
    min_chars: usize,
}

impl SearchHistory {
    pub fn new(storage: Arc<dyn Storage>, config: &SearchConfig) -> Self {
        Self {
            storage,
            key: config.history_key.clone(),
            limit: config.history_limit,
            min_chars: config.history_min_chars,
        }
    }

    pub fn recent(&self) -> Vec<String> {
        let Some(raw) = read_best_effort(self.storage.as_ref(), &self.key) else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(terms) => terms,
            Err(e) => {
                tracing::warn!("Ignoring malformed search history: {}", e);
                Vec::new()
            }
        }
    }

    /// Move `term` to the front, dropping the oldest beyond the limit
    ///
    /// Returns false when the term is too short to remember.
    pub fn record(&self, term: &str) -> bool {
        let term = term.trim();
        if term.chars().count() < self.min_chars {
            return false;
        }

        let mut terms = self.recent();
        terms.retain(|t| t != term);
        terms.insert(0, term.to_string());
        terms.truncate(self.limit);

        match serde_json::to_string(&terms) {
            Ok(json) => write_best_effort(self.storage.as_ref(), &self.key, &json),
            Err(e) => tracing::warn!("Failed to encode search history: {}", e),
        }
        true
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(&self.key) {
            tracing::warn!("Failed to clear search history: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{DisabledStorage, MemoryStorage};

    fn history() -> SearchHistory {
        SearchHistory::new(Arc::new(MemoryStorage::new()), &SearchConfig::default())
    }

    #[test]
    fn test_most_recent_first_without_duplicates() {
        let history = history();
        history.record("rust");
        history.record("tokio");
        history.record("rust");
        assert_eq!(history.recent(), vec!["rust", "tokio"]);
    }

    #[test]
    fn test_short_terms_skipped() {
        let history = history();
        assert!(!history.record("go"));
        assert!(!history.record("  ab "));
        assert!(history.record("axum"));
        assert_eq!(history.recent(), vec!["axum"]);
    }

    #[test]
    fn test_capped_at_limit() {
        let history = history();
        for i in 0..15 {
            history.record(&format!("term{}", i));
        }
        let recent = history.recent();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0], "term14");
        assert_eq!(recent[9], "term5");

        history.clear();
        assert!(history.recent().is_empty());
    }

    #[test]
    fn test_storage_failures_are_swallowed() {
        let history = SearchHistory::new(Arc::new(DisabledStorage), &SearchConfig::default());
        assert!(history.record("rust"));
        assert!(history.recent().is_empty());
        history.clear();
    }

    #[test]
    fn test_malformed_history_reads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item("blogSearches", "{oops").unwrap();
        let history = SearchHistory::new(storage, &SearchConfig::default());
        assert!(history.recent().is_empty());
        history.record("serde");
        assert_eq!(history.recent(), vec!["serde"]);
    }
}
