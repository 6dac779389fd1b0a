//! Markup for a single post

use super::{date_attr, escape_html, format_date};
use crate::content::PostDetail;

/// Render the post header and body
///
/// Metadata is escaped; the body is the site's own rendered Markdown and is
/// inserted as-is.
pub fn render_post_article(post: &PostDetail, date_format: &str) -> String {
    let meta = &post.meta;
    let mut html = format!(
        r#"<article class="post"><header class="post-header"><h1 class="post-title">{}</h1><div class="post-meta">"#,
        escape_html(&meta.title)
    );

    if let Some(date) = &meta.date {
        let attr = date_attr(date)
            .map(|d| format!(r#" datetime="{}""#, d))
            .unwrap_or_default();
        html.push_str(&format!(
            "<time{}>{}</time>",
            attr,
            escape_html(&format_date(date, date_format))
        ));
    }

    if let Some(category) = &meta.category {
        html.push_str(&format!(
            r#"<span class="category">{}</span>"#,
            escape_html(category)
        ));
    }
    html.push_str("</div>");

    if !meta.tags.is_empty() {
        html.push_str(r#"<div class="post-tags">"#);
        for tag in &meta.tags {
            html.push_str(&format!(r#"<span class="tag">{}</span>"#, escape_html(tag)));
        }
        html.push_str("</div>");
    }

    html.push_str(r#"</header><div class="post-body">"#);
    html.push_str(&post.html);
    html.push_str("</div></article>");
    html
}
