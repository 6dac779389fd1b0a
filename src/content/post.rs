//! Post summary and detail models

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::FrontMatter;

/// One entry of the post index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSummary {
    /// File name under the pages directory, unique within the index
    pub file: String,

    pub title: String,

    /// Calendar date as written in the index
    pub date: String,

    #[serde(default)]
    pub excerpt: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl PostSummary {
    pub fn new(file: &str, title: &str, date: &str) -> Self {
        Self {
            file: file.to_string(),
            title: title.to_string(),
            date: date.to_string(),
            excerpt: String::new(),
            category: None,
            tags: Vec::new(),
        }
    }

    pub fn with_excerpt(mut self, excerpt: &str) -> Self {
        self.excerpt = excerpt.to_string();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// Metadata shown on a post page: the index summary extended by front-matter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostMeta {
    pub title: String,
    pub date: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub excerpt: Option<String>,
    /// Front-matter keys with no dedicated field
    pub extra: IndexMap<String, String>,
}

impl PostMeta {
    /// Merge index metadata with front-matter; front-matter wins
    pub fn merge(file: &str, summary: Option<&PostSummary>, fm: FrontMatter) -> Self {
        let title = fm
            .title
            .or_else(|| summary.map(|s| s.title.clone()))
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| title_from_filename(file));

        let tags = if fm.tags.is_empty() {
            summary.map(|s| s.tags.clone()).unwrap_or_default()
        } else {
            fm.tags
        };

        Self {
            title,
            date: fm.date.or_else(|| summary.map(|s| s.date.clone())),
            category: fm.category.or_else(|| summary.and_then(|s| s.category.clone())),
            tags,
            excerpt: fm
                .excerpt
                .or_else(|| summary.map(|s| s.excerpt.clone()))
                .filter(|e| !e.is_empty()),
            extra: fm.extra,
        }
    }
}

/// A loaded post ready for display
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub file: String,
    pub meta: PostMeta,
    /// Rendered body, trusted site content
    pub html: String,
}

/// Derive a readable title from a post file name
///
/// `my-first_post.md` becomes `my first post`.
pub fn title_from_filename(file: &str) -> String {
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Untitled");
    let title = stem.replace(['-', '_'], " ");
    let title = title.trim();
    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_summary_defaults() {
        let json = r#"{"file":"a.md","title":"Hello","date":"2024-01-15"}"#;
        let post: PostSummary = serde_json::from_str(json).unwrap();
        assert_eq!(post.excerpt, "");
        assert_eq!(post.category, None);
        assert!(post.tags.is_empty());
    }

    #[test]
    fn test_title_from_filename() {
        assert_eq!(title_from_filename("my-first_post.md"), "my first post");
        assert_eq!(title_from_filename("notes"), "notes");
        assert_eq!(title_from_filename("---.md"), "Untitled");
    }

    #[test]
    fn test_merge_prefers_front_matter() {
        let summary = PostSummary::new("a.md", "Index Title", "2024-01-15")
            .with_category("dev")
            .with_tags(&["go"]);
        let fm = FrontMatter {
            title: Some("Front Title".to_string()),
            tags: vec!["rust".to_string()],
            ..Default::default()
        };

        let meta = PostMeta::merge("a.md", Some(&summary), fm);
        assert_eq!(meta.title, "Front Title");
        assert_eq!(meta.tags, vec!["rust"]);
        assert_eq!(meta.category.as_deref(), Some("dev"));
        assert_eq!(meta.date.as_deref(), Some("2024-01-15"));
    }

    #[test]
    fn test_merge_falls_back_to_filename() {
        let meta = PostMeta::merge("hello-world.md", None, FrontMatter::default());
        assert_eq!(meta.title, "hello world");
        assert_eq!(meta.date, None);
        assert_eq!(meta.excerpt, None);
    }
}
