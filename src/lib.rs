//! blogdeck: post index, filtering, post rendering and theme handling for a
//! small static blog
//!
//! The site directory holds a JSON post index, a folder of Markdown posts and
//! an optional `_config.yml`. Pages are driven by controllers that update a
//! [`ui::Document`] and emit [`ui::Effect`] patches, which the preview server
//! relays to the browser over a websocket.

pub mod commands;
pub mod comments;
pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod filter;
pub mod render;
pub mod server;
pub mod storage;
pub mod theme;
pub mod ui;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use context::AppContext;
pub use error::{BlogError, BlogResult, FailureKind};

/// A blog site on disk
#[derive(Clone)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Site root; the index and pages are resolved against it
    pub base_dir: PathBuf,
    /// Markdown posts
    pub pages_dir: PathBuf,
    /// JSON post index
    pub index_path: PathBuf,
    /// Persisted preferences (theme, search history)
    pub storage_path: PathBuf,
}

impl Blog {
    /// Open a site directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let pages_dir = base_dir.join(&config.pages_dir);
        let index_path = base_dir.join(&config.index_file);
        let storage_path = base_dir.join(&config.storage_file);

        Ok(Self {
            config,
            base_dir,
            pages_dir,
            index_path,
            storage_path,
        })
    }

    /// Persisted state shared by every page of this site
    pub fn storage(&self) -> Arc<dyn storage::Storage> {
        Arc::new(storage::FileStorage::new(&self.storage_path))
    }

    /// Context for page controllers, backed by the site's storage file
    pub fn context(&self) -> AppContext {
        self.context_with_storage(self.storage())
    }

    pub fn context_with_storage(&self, storage: Arc<dyn storage::Storage>) -> AppContext {
        AppContext::new(
            self.config.clone(),
            content::DirSource::new(&self.base_dir),
            storage,
        )
    }

    pub fn markdown(&self) -> content::MarkdownRenderer {
        content::MarkdownRenderer::with_config(&self.config.highlight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_config() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Blog");
        assert_eq!(blog.index_path, dir.path().join("posts.json"));
        assert_eq!(blog.pages_dir, dir.path().join("pages"));
    }

    #[test]
    fn test_reads_config_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("_config.yml"),
            "title: Notes\npages_dir: posts\nsearch:\n  debounce_ms: 150\ncomments:\n  repo: a/b\n  repo_id: R_1\n",
        )
        .unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.title, "Notes");
        assert_eq!(blog.pages_dir, dir.path().join("posts"));
        assert_eq!(blog.config.search.debounce_ms, 150);
        assert_eq!(blog.config.search.history_limit, 10);
        assert!(blog.context().comments.is_some());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("_config.yml"), "title: [unclosed").unwrap();
        assert!(Blog::new(dir.path()).is_err());
    }
}
