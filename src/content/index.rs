//! The post index: a JSON array of post summaries in display order

use std::collections::BTreeSet;

use super::source::ContentSource;
use super::{FrontMatter, MarkdownRenderer, PostDetail, PostMeta, PostSummary};
use crate::error::{BlogError, BlogResult};

/// All posts listed in the index file, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostIndex {
    posts: Vec<PostSummary>,
}

impl PostIndex {
    pub fn new(posts: Vec<PostSummary>) -> Self {
        Self { posts }
    }

    /// Fetch and decode the index
    pub async fn load<S: ContentSource>(source: &S, path: &str) -> BlogResult<Self> {
        let text = source.fetch_text(path).await?;
        Self::parse(path, &text)
    }

    /// Decode index JSON; `path` is only used for error messages
    pub fn parse(path: &str, json: &str) -> BlogResult<Self> {
        let posts: Vec<PostSummary> =
            serde_json::from_str(json).map_err(|source| BlogError::Parse {
                path: path.to_string(),
                source,
            })?;
        tracing::debug!("Loaded {} posts from {}", posts.len(), path);
        Ok(Self { posts })
    }

    pub fn posts(&self) -> &[PostSummary] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn find(&self, file: &str) -> Option<&PostSummary> {
        self.posts.iter().find(|p| p.file == file)
    }

    /// Every tag used by any post, sorted and de-duplicated
    pub fn tags(&self) -> Vec<String> {
        self.posts
            .iter()
            .flat_map(|p| p.tags.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Every category used by any post, sorted and de-duplicated
    pub fn categories(&self) -> Vec<String> {
        self.posts
            .iter()
            .filter_map(|p| p.category.clone())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.posts)
    }
}

/// Load a single post: look it up in the index, fetch its Markdown and render it
pub async fn load_post<S: ContentSource>(
    source: &S,
    index: &PostIndex,
    pages_dir: &str,
    file: &str,
    renderer: &MarkdownRenderer,
) -> BlogResult<PostDetail> {
    if file.is_empty() {
        return Err(BlogError::Lookup(file.to_string()));
    }

    let summary = index
        .find(file)
        .ok_or_else(|| BlogError::Lookup(file.to_string()))?;

    let path = format!("{}/{}", pages_dir.trim_end_matches('/'), file);
    let markdown = match source.fetch_text(&path).await {
        Ok(text) => text,
        // Missing, or a path the source refuses to resolve
        Err(e) if e.is_not_found() || matches!(e, BlogError::Status { status: 403, .. }) => {
            return Err(BlogError::Lookup(file.to_string()))
        }
        Err(e) => return Err(e),
    };

    let (fm, body) = FrontMatter::parse(&markdown);
    let meta = PostMeta::merge(file, Some(summary), fm);
    let html = renderer.render(body);

    Ok(PostDetail {
        file: file.to_string(),
        meta,
        html,
    })
}
