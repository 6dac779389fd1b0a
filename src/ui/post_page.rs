//! Single post page

use super::{Document, Effect, ElementId};
use crate::comments::Placement;
use crate::content::{load_post, PostDetail, PostIndex};
use crate::context::AppContext;
use crate::error::{BlogError, BlogResult};
use crate::render::{render_error, render_post_article};
use crate::theme::Theme;

/// Look up `file` in the index and render it
pub async fn fetch_post(ctx: &AppContext, file: Option<&str>) -> BlogResult<PostDetail> {
    let file = file
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| BlogError::Lookup("no post file given".to_string()))?;

    let index = PostIndex::load(&*ctx.source, &ctx.config.index_file).await?;
    load_post(
        &*ctx.source,
        &index,
        &ctx.config.pages_dir,
        file,
        &ctx.markdown,
    )
    .await
}

/// Fill the post page, or show the error panel when the post can't be loaded
pub async fn mount_post(
    ctx: &AppContext,
    file: Option<&str>,
    theme: Theme,
    doc: &mut Document,
) -> Vec<Effect> {
    match fetch_post(ctx, file).await {
        Ok(post) => show_post(ctx, &post, theme, doc),
        Err(e) => {
            tracing::error!("Failed to load post {:?}: {}", file.unwrap_or_default(), e);
            let mut out = Vec::new();
            doc.emit(
                Effect::SetHtml {
                    id: ElementId::PostContent,
                    html: render_error(&ctx.config.post_error_message),
                },
                &mut out,
            );
            out
        }
    }
}

pub fn show_post(ctx: &AppContext, post: &PostDetail, theme: Theme, doc: &mut Document) -> Vec<Effect> {
    let mut out = Vec::new();

    doc.emit(
        Effect::SetTitle {
            title: format!("{} - {}", post.meta.title, ctx.config.title),
        },
        &mut out,
    );
    doc.emit(
        Effect::SetHtml {
            id: ElementId::PostContent,
            html: render_post_article(post, &ctx.config.date_format),
        },
        &mut out,
    );
    if ctx.markdown.needs_client_highlighting() {
        doc.emit(
            Effect::Rescan {
                id: ElementId::PostContent,
            },
            &mut out,
        );
    }

    if let Some(widget) = &ctx.comments {
        if doc.has(ElementId::PostComments) {
            doc.emit(
                Effect::SetHtml {
                    id: ElementId::PostComments,
                    html: widget.embed_html(Placement::Post, Some(theme)),
                },
                &mut out,
            );
            doc.mark_comment_widget();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommentsConfig, SiteConfig};
    use crate::content::DirSource;
    use crate::error::FailureKind;
    use crate::storage::MemoryStorage;
    use std::sync::Arc;
    use tempfile::TempDir;

    const INDEX: &str = r#"[
        {"file":"a.md","title":"Hello World","date":"2024-01-15","excerpt":"x","tags":["go"]},
        {"file":"gone.md","title":"Gone","date":"2024-01-16"}
    ]"#;

    fn site(config: SiteConfig) -> (TempDir, AppContext) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("posts.json"), INDEX).unwrap();
        std::fs::create_dir_all(dir.path().join("pages")).unwrap();
        std::fs::write(
            dir.path().join("pages/a.md"),
            "---\ntitle: Hello Again\n---\n# Heading\n\n```rust\nfn main() {}\n```\n",
        )
        .unwrap();
        let ctx = AppContext::new(
            config,
            DirSource::new(dir.path()),
            Arc::new(MemoryStorage::new()),
        );
        (dir, ctx)
    }

    #[tokio::test]
    async fn test_post_renders_with_title() {
        let (_dir, ctx) = site(SiteConfig::default());
        let mut doc = Document::post_page("Blog");

        let effects = mount_post(&ctx, Some("a.md"), Theme::Light, &mut doc).await;
        assert_eq!(doc.title(), "Hello Again - Blog");
        let html = doc.html(ElementId::PostContent).unwrap();
        assert!(html.contains("<h1>Heading</h1>"));
        assert!(html.contains("highlight"));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Rescan { .. })));
        assert_eq!(doc.html(ElementId::PostComments), Some(""));
    }

    #[tokio::test]
    async fn test_client_highlighting_requests_rescan() {
        let mut config = SiteConfig::default();
        config.highlight.server_side = false;
        let (_dir, ctx) = site(config);
        let mut doc = Document::post_page("Blog");

        let effects = mount_post(&ctx, Some("a.md"), Theme::Light, &mut doc).await;
        assert!(effects.contains(&Effect::Rescan {
            id: ElementId::PostContent
        }));
        assert!(doc
            .html(ElementId::PostContent)
            .unwrap()
            .contains(r#"<code class="language-rust">"#));
    }

    #[tokio::test]
    async fn test_lookup_failures() {
        let (_dir, ctx) = site(SiteConfig::default());

        for file in [None, Some(""), Some("missing.md"), Some("gone.md"), Some("../posts.json")] {
            let err = fetch_post(&ctx, file).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::Lookup, "{:?}", file);
        }

        let mut doc = Document::post_page("Blog");
        mount_post(&ctx, Some("missing.md"), Theme::Light, &mut doc).await;
        assert!(doc
            .html(ElementId::PostContent)
            .unwrap()
            .contains("Could not load this post."));
        assert_eq!(doc.title(), "Blog");
    }

    #[tokio::test]
    async fn test_comment_widget_embedded() {
        let mut config = SiteConfig::default();
        config.comments = CommentsConfig {
            repo: "owner/blog".to_string(),
            repo_id: "R_1".to_string(),
            ..CommentsConfig::default()
        };
        let (_dir, ctx) = site(config);
        let mut doc = Document::post_page("Blog");

        mount_post(&ctx, Some("a.md"), Theme::Dark, &mut doc).await;
        let comments = doc.html(ElementId::PostComments).unwrap();
        assert!(comments.contains(r#"id="giscus""#));
        assert!(comments.contains(r#"data-theme="dark""#));
        assert!(doc.has_comment_widget());
    }
}
