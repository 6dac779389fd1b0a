//! Site configuration (_config.yml)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub language: String,
    pub date_format: String,

    // Files, relative to the site directory
    pub index_file: String,
    pub pages_dir: String,
    pub storage_file: String,

    // Messages shown in place of content
    pub load_error_message: String,
    pub post_error_message: String,
    pub no_results_message: String,

    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub highlight: HighlightConfig,
    #[serde(default)]
    pub comments: CommentsConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Blog".to_string(),
            language: "en".to_string(),
            date_format: "MMMM D, YYYY".to_string(),

            index_file: "posts.json".to_string(),
            pages_dir: "pages".to_string(),
            storage_file: ".blogdeck/storage.json".to_string(),

            load_error_message: "Could not load posts. Please try again later.".to_string(),
            post_error_message: "Could not load this post.".to_string(),
            no_results_message: "No posts match your search.".to_string(),

            search: SearchConfig::default(),
            theme: ThemeConfig::default(),
            highlight: HighlightConfig::default(),
            comments: CommentsConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Search box behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub debounce_ms: u64,
    pub history_key: String,
    pub history_limit: usize,
    /// Terms shorter than this are not remembered
    pub history_min_chars: usize,
    pub highlight: bool,
    pub highlight_min_chars: usize,
    /// `{visible}` and `{total}` are substituted
    pub result_count_format: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            history_key: "blogSearches".to_string(),
            history_limit: 10,
            history_min_chars: 3,
            highlight: true,
            highlight_min_chars: 2,
            result_count_format: "{visible} / {total} posts".to_string(),
        }
    }
}

/// Theme persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub storage_key: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: "blog-theme".to_string(),
        }
    }
}

/// Code block highlighting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// Highlight with syntect while rendering; otherwise leave it to the client
    pub server_side: bool,
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            server_side: true,
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Giscus comment widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentsConfig {
    pub enable: bool,
    pub client_src: String,
    pub origin: String,
    pub repo: String,
    pub repo_id: String,
    pub category: String,
    pub category_id: String,
    pub mapping: String,
    /// Discussion term used by the widget on the index page
    pub main_term: Option<String>,
    pub strict: bool,
    pub reactions_enabled: bool,
    pub emit_metadata: bool,
    pub input_position: String,
    pub theme: String,
    pub lang: String,
}

impl Default for CommentsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            client_src: "https://giscus.app/client.js".to_string(),
            origin: "https://giscus.app".to_string(),
            repo: String::new(),
            repo_id: String::new(),
            category: "General".to_string(),
            category_id: String::new(),
            mapping: "pathname".to_string(),
            main_term: None,
            strict: false,
            reactions_enabled: true,
            emit_metadata: true,
            input_position: "bottom".to_string(),
            theme: "preferred_color_scheme".to_string(),
            lang: "en".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.index_file, "posts.json");
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.search.history_limit, 10);
        assert_eq!(config.theme.storage_key, "blog-theme");
        assert!(config.highlight.server_side);
    }

    #[test]
    fn test_parse_partial_config() {
        let yaml = r#"
title: 개발 블로그
language: ko
date_format: "YYYY년 M월 D일"
search:
  debounce_ms: 150
comments:
  repo: someone/blog
  repo_id: R_abc
  category_id: DIC_xyz
  lang: ko
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "개발 블로그");
        assert_eq!(config.search.debounce_ms, 150);
        assert_eq!(config.search.history_limit, 10);
        assert_eq!(config.comments.repo, "someone/blog");
        assert_eq!(config.comments.mapping, "pathname");
        assert_eq!(config.pages_dir, "pages");
    }
}
