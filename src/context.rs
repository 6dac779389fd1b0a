//! Shared application context
//!
//! Everything a page session needs is passed in explicitly through
//! [`AppContext`] rather than looked up globally.

use std::sync::Arc;

use crate::comments::CommentWidget;
use crate::config::SiteConfig;
use crate::content::{DirSource, MarkdownRenderer};
use crate::storage::Storage;

#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<SiteConfig>,
    pub source: Arc<DirSource>,
    pub storage: Arc<dyn Storage>,
    pub markdown: Arc<MarkdownRenderer>,
    pub comments: Option<CommentWidget>,
}

impl AppContext {
    pub fn new(config: SiteConfig, source: DirSource, storage: Arc<dyn Storage>) -> Self {
        let markdown = MarkdownRenderer::with_config(&config.highlight);
        let comments = CommentWidget::from_config(&config.comments);
        Self {
            config: Arc::new(config),
            source: Arc::new(source),
            storage,
            markdown: Arc::new(markdown),
            comments,
        }
    }
}
