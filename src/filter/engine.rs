//! Filtering the post list

use super::FilterCriteria;
use crate::content::{PostIndex, PostSummary};
use crate::render::ChipKind;

/// Whether a post satisfies every active criteria group
pub fn matches(post: &PostSummary, criteria: &FilterCriteria) -> bool {
    let search = criteria.search();
    if !search.is_empty() {
        let search = search.to_lowercase();
        let in_title = post.title.to_lowercase().contains(&search);
        let in_excerpt = post.excerpt.to_lowercase().contains(&search);
        let in_tags = post
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&search));
        if !in_title && !in_excerpt && !in_tags {
            return false;
        }
    }

    if !criteria.tags().is_empty() && !post.tags.iter().any(|tag| criteria.has_tag(tag)) {
        return false;
    }

    if !criteria.categories().is_empty() {
        match &post.category {
            Some(category) if criteria.has_category(category) => {}
            _ => return false,
        }
    }

    true
}

/// Posts matching the criteria, in their original order
pub fn apply_filters<'a>(posts: &'a [PostSummary], criteria: &FilterCriteria) -> Vec<&'a PostSummary> {
    posts.iter().filter(|post| matches(post, criteria)).collect()
}

/// Holds the full post list and the current criteria, and keeps the
/// filtered subset up to date as criteria change
#[derive(Debug, Clone, Default)]
pub struct FilterEngine {
    index: PostIndex,
    criteria: FilterCriteria,
    /// Positions into `index.posts()` of the visible posts
    visible: Vec<usize>,
}

impl FilterEngine {
    pub fn new(index: PostIndex) -> Self {
        Self::with_criteria(index, FilterCriteria::default())
    }

    pub fn with_criteria(index: PostIndex, criteria: FilterCriteria) -> Self {
        let mut engine = Self {
            index,
            criteria,
            visible: Vec::new(),
        };
        engine.recompute();
        engine
    }

    pub fn index(&self) -> &PostIndex {
        &self.index
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_search(&mut self, search: &str) {
        self.criteria.set_search(search);
        self.recompute();
    }

    pub fn clear_search(&mut self) {
        self.criteria.clear_search();
        self.recompute();
    }

    /// Toggle a tag or category; returns whether it is now active
    pub fn toggle(&mut self, kind: ChipKind, value: &str) -> bool {
        let active = self.criteria.toggle(kind, value);
        self.recompute();
        active
    }

    /// Currently visible posts
    pub fn filtered(&self) -> Vec<&PostSummary> {
        let posts = self.index.posts();
        self.visible.iter().map(|&i| &posts[i]).collect()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn total_count(&self) -> usize {
        self.index.len()
    }

    fn recompute(&mut self) {
        self.visible = self
            .index
            .posts()
            .iter()
            .enumerate()
            .filter(|(_, post)| matches(post, &self.criteria))
            .map(|(i, _)| i)
            .collect();
        tracing::debug!(
            "Filter matched {} of {} posts",
            self.visible.len(),
            self.index.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posts() -> Vec<PostSummary> {
        vec![
            PostSummary::new("a.md", "Hello World", "2024-01-15")
                .with_excerpt("x")
                .with_tags(&["go"]),
            PostSummary::new("b.md", "Other", "2024-01-16")
                .with_excerpt("y")
                .with_tags(&["rust"]),
        ]
    }

    fn files(result: &[&PostSummary]) -> Vec<String> {
        result.iter().map(|p| p.file.clone()).collect()
    }

    #[test]
    fn test_search_matches_title() {
        let posts = posts();
        let mut criteria = FilterCriteria::new();
        criteria.set_search("hello");
        assert_eq!(files(&apply_filters(&posts, &criteria)), vec!["a.md"]);
    }

    #[test]
    fn test_tag_filter() {
        let posts = posts();
        let mut criteria = FilterCriteria::new();
        criteria.toggle_tag("rust");
        assert_eq!(files(&apply_filters(&posts, &criteria)), vec!["b.md"]);
    }

    #[test]
    fn test_search_without_match() {
        let posts = posts();
        let mut criteria = FilterCriteria::new();
        criteria.set_search("zzz");
        assert!(apply_filters(&posts, &criteria).is_empty());
    }

    #[test]
    fn test_empty_criteria_keeps_everything_in_order() {
        let posts = posts();
        let result = apply_filters(&posts, &FilterCriteria::new());
        assert_eq!(files(&result), vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_search_matches_excerpt_and_tags_case_insensitively() {
        let posts = vec![
            PostSummary::new("a.md", "A", "2024-01-01").with_excerpt("Learning RUST today"),
            PostSummary::new("b.md", "B", "2024-01-01").with_tags(&["Rustacean"]),
            PostSummary::new("c.md", "C", "2024-01-01").with_excerpt("go"),
        ];
        let mut criteria = FilterCriteria::new();
        criteria.set_search("Rust");
        assert_eq!(files(&apply_filters(&posts, &criteria)), vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_groups_combine_with_and() {
        let posts = vec![
            PostSummary::new("a.md", "Async Rust", "2024-01-01")
                .with_category("dev")
                .with_tags(&["rust"]),
            PostSummary::new("b.md", "Rust trip", "2024-01-01")
                .with_category("life")
                .with_tags(&["rust", "travel"]),
            PostSummary::new("c.md", "Go notes", "2024-01-01")
                .with_category("dev")
                .with_tags(&["go"]),
            PostSummary::new("d.md", "Uncategorized rust", "2024-01-01").with_tags(&["rust"]),
        ];

        let mut criteria = FilterCriteria::new();
        criteria.toggle_tag("rust");
        criteria.toggle_tag("go");
        assert_eq!(
            files(&apply_filters(&posts, &criteria)),
            vec!["a.md", "b.md", "c.md", "d.md"]
        );

        criteria.toggle_category("dev");
        assert_eq!(files(&apply_filters(&posts, &criteria)), vec!["a.md", "c.md"]);

        criteria.set_search("async");
        assert_eq!(files(&apply_filters(&posts, &criteria)), vec!["a.md"]);
    }

    #[test]
    fn test_apply_filters_is_deterministic() {
        let posts = posts();
        let mut criteria = FilterCriteria::new();
        criteria.set_search("o");
        let first = files(&apply_filters(&posts, &criteria));
        let second = files(&apply_filters(&posts, &criteria));
        assert_eq!(first, second);
        assert_eq!(first, vec!["a.md", "b.md"]);
    }

    #[test]
    fn test_engine_recomputes_on_change() {
        let mut engine = FilterEngine::new(PostIndex::new(posts()));
        assert_eq!(engine.visible_count(), 2);

        assert!(engine.toggle(ChipKind::Tag, "rust"));
        assert_eq!(files(&engine.filtered()), vec!["b.md"]);

        assert!(!engine.toggle(ChipKind::Tag, "rust"));
        engine.set_search("HELLO");
        assert_eq!(files(&engine.filtered()), vec!["a.md"]);

        engine.clear_search();
        assert_eq!(engine.visible_count(), engine.total_count());
    }
}
