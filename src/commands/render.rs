//! Render a page to static HTML

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::filter::FilterCriteria;
use crate::render::layout::render_page;
use crate::ui::{fetch_post, Page};
use crate::Blog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderTarget {
    /// The post list, filtered by a query string such as `tag=rust&q=async`
    Index { query: String },
    Post { file: String },
}

/// Render `target` and write it to `output`, or print it
pub async fn run(blog: &Blog, target: &RenderTarget, output: Option<&Path>) -> Result<()> {
    let html = render(blog, target).await?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, html)?;
            println!("Rendered to {}", path.display());
        }
        None => print!("{}", html),
    }

    Ok(())
}

pub async fn render(blog: &Blog, target: &RenderTarget) -> Result<String> {
    let ctx = blog.context();

    let page = match target {
        RenderTarget::Index { query } => {
            let (page, _searches) = Page::index(ctx, FilterCriteria::from_query(query), None).await;
            if page.app().map(|app| app.load_failed()).unwrap_or(false) {
                anyhow::bail!("Failed to load post index {:?}", blog.index_path);
            }
            page
        }
        RenderTarget::Post { file } => {
            // Surface the failure instead of writing an error page
            fetch_post(&ctx, Some(file.as_str())).await?;
            Page::post(ctx, Some(file.as_str()), None).await
        }
    };

    Ok(render_page(page.document(), &blog.config, false))
}
