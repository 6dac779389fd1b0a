//! Content loader - builds index entries from the pages directory

use anyhow::Result;
use chrono::Local;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{title_from_filename, FrontMatter, MarkdownRenderer, PostSummary};
use crate::render::{parse_date, truncate};

/// Excerpt length used when front-matter has none
const EXCERPT_CHARS: usize = 160;

/// Scans Markdown files to produce post summaries
pub struct ContentLoader<'a> {
    pages_dir: &'a Path,
    renderer: MarkdownRenderer,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(pages_dir: &'a Path, renderer: MarkdownRenderer) -> Self {
        Self {
            pages_dir,
            renderer,
        }
    }

    /// Load summaries for every Markdown file, newest first
    pub fn load_summaries(&self) -> Result<Vec<PostSummary>> {
        if !self.pages_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(self.pages_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                match self.load_summary(path) {
                    Ok(post) => posts.push(post),
                    Err(e) => {
                        tracing::warn!("Failed to load post {:?}: {}", path, e);
                    }
                }
            }
        }

        // Sort by date descending, undated posts last
        posts.sort_by(|a, b| {
            let a_date = parse_date(&a.date);
            let b_date = parse_date(&b.date);
            b_date.cmp(&a_date).then_with(|| a.file.cmp(&b.file))
        });

        Ok(posts)
    }

    /// Build a summary from a single file
    fn load_summary(&self, path: &Path) -> Result<PostSummary> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content);

        let file = path
            .strip_prefix(self.pages_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        let date = match fm.date {
            Some(date) => date,
            None => {
                let modified = fs::metadata(path)?
                    .modified()
                    .map(chrono::DateTime::<Local>::from)
                    .unwrap_or_else(|_| Local::now());
                modified.format("%Y-%m-%d").to_string()
            }
        };

        let excerpt = fm.excerpt.unwrap_or_else(|| {
            truncate(&self.renderer.plain_text(body), EXCERPT_CHARS, None)
        });

        Ok(PostSummary {
            title: fm.title.unwrap_or_else(|| title_from_filename(&file)),
            file,
            date,
            excerpt,
            category: fm.category,
            tags: fm.tags,
        })
    }
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HighlightConfig;
    use tempfile::TempDir;

    fn plain_renderer() -> MarkdownRenderer {
        MarkdownRenderer::with_config(&HighlightConfig {
            server_side: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_load_summaries_sorted_newest_first() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("old.md"),
            "---\ntitle: Old\ndate: 2023-05-01\ncategory: life\n---\nOld body",
        )
        .unwrap();
        fs::write(
            dir.path().join("new.md"),
            "---\ntitle: New\ndate: 2024-05-01\ntags: [rust]\nexcerpt: Custom\n---\nNew body",
        )
        .unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let loader = ContentLoader::new(dir.path(), plain_renderer());
        let posts = loader.load_summaries().unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].file, "new.md");
        assert_eq!(posts[0].excerpt, "Custom");
        assert_eq!(posts[0].tags, vec!["rust"]);
        assert_eq!(posts[1].title, "Old");
        assert_eq!(posts[1].excerpt, "Old body");
        assert_eq!(posts[1].category.as_deref(), Some("life"));
    }

    #[test]
    fn test_summary_without_front_matter() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("2024")).unwrap();
        fs::write(
            dir.path().join("2024/first-post.md"),
            "Some **bold** text.",
        )
        .unwrap();

        let loader = ContentLoader::new(dir.path(), plain_renderer());
        let posts = loader.load_summaries().unwrap();

        assert_eq!(posts[0].file, "2024/first-post.md");
        assert_eq!(posts[0].title, "first post");
        assert_eq!(posts[0].excerpt, "Some bold text.");
        assert_eq!(posts[0].date.len(), 10);
    }

    #[test]
    fn test_excerpt_is_unescaped_text() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("cartoon.md"),
            "---\ntitle: Cartoon\n---\nTom & Jerry say \"hi\" to <Spike>.\n\n`a < b`",
        )
        .unwrap();

        let loader = ContentLoader::new(dir.path(), plain_renderer());
        let posts = loader.load_summaries().unwrap();
        assert_eq!(posts[0].excerpt, "Tom & Jerry say \u{201c}hi\u{201d} to . a < b");

        let cards = crate::render::render_post_cards(&[&posts[0]], "YYYY-MM-DD");
        assert!(cards.contains("Tom &amp; Jerry"));
        assert!(!cards.contains("&amp;amp;"));
    }

    #[test]
    fn test_missing_pages_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("pages");
        let loader = ContentLoader::new(&missing, plain_renderer());
        assert!(loader.load_summaries().unwrap().is_empty());
    }
}
