//! Fetching site files
//!
//! Everything the pages read (the post index, Markdown bodies) goes through a
//! [`ContentSource`], addressed by a path relative to the site root.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use crate::error::{BlogError, BlogResult};

/// Fetches text files relative to the site root
pub trait ContentSource: Send + Sync {
    fn fetch_text(&self, path: &str) -> impl Future<Output = BlogResult<String>> + Send;
}

/// Reads files from a site directory on disk
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path, refusing anything that leaves the root
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path.trim_start_matches('/'));
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !safe || relative.as_os_str().is_empty() {
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl ContentSource for DirSource {
    async fn fetch_text(&self, path: &str) -> BlogResult<String> {
        let Some(full_path) = self.resolve(path) else {
            return Err(BlogError::Status {
                path: path.to_string(),
                status: 403,
            });
        };

        tracing::debug!("Fetching {:?}", full_path);
        match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlogError::Status {
                path: path.to_string(),
                status: 404,
            }),
            Err(e) => Err(BlogError::Load {
                path: path.to_string(),
                source: e,
            }),
        }
    }
}
