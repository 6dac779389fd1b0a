//! Markup for the post list and filter chips

use super::{date_attr, encode_uri_component, escape_html, format_date};
use crate::content::PostSummary;

/// Which facet a filter chip belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChipKind {
    Tag,
    Category,
}

impl ChipKind {
    /// Class that marks a chip as clickable
    pub fn filter_class(self) -> &'static str {
        match self {
            ChipKind::Tag => "filter-tag",
            ChipKind::Category => "filter-category",
        }
    }

    /// `data-*` attribute holding the chip value
    pub fn data_attr(self) -> &'static str {
        match self {
            ChipKind::Tag => "data-tag",
            ChipKind::Category => "data-category",
        }
    }

    fn base_class(self) -> &'static str {
        match self {
            ChipKind::Tag => "tag",
            ChipKind::Category => "category",
        }
    }
}

/// Link target of a post card
pub fn post_href(file: &str) -> String {
    format!("post.html?file={}", encode_uri_component(file))
}

/// Render one card per post
pub fn render_post_cards(posts: &[&PostSummary], date_format: &str) -> String {
    posts
        .iter()
        .map(|post| render_post_card(post, date_format))
        .collect()
}

fn render_post_card(post: &PostSummary, date_format: &str) -> String {
    let mut html = format!(
        r#"<a href="{}" class="post-card"><h2>{}</h2><div class="post-meta">"#,
        escape_html(&post_href(&post.file)),
        escape_html(&post.title)
    );

    match date_attr(&post.date) {
        Some(attr) => html.push_str(&format!(
            r#"<time datetime="{}">{}</time>"#,
            attr,
            escape_html(&format_date(&post.date, date_format))
        )),
        None => html.push_str(&format!("<time>{}</time>", escape_html(&post.date))),
    }

    if let Some(category) = post.category.as_deref().filter(|c| !c.is_empty()) {
        html.push_str(&format!(
            r#"<span class="category">{}</span>"#,
            escape_html(category)
        ));
    }
    html.push_str("</div>");

    html.push_str(&format!(
        r#"<p class="post-excerpt">{}</p>"#,
        escape_html(&post.excerpt)
    ));

    if !post.tags.is_empty() {
        html.push_str(r#"<div class="post-tags">"#);
        for tag in &post.tags {
            html.push_str(&format!(r#"<span class="tag">{}</span>"#, escape_html(tag)));
        }
        html.push_str("</div>");
    }

    html.push_str("</a>");
    html
}

/// Message panel shown when loading fails
pub fn render_error(message: &str) -> String {
    format!(
        r#"<div class="load-error" role="alert"><p>{}</p></div>"#,
        escape_html(message)
    )
}

/// One chip per value, marked active when selected
pub fn render_chips<F>(kind: ChipKind, values: &[String], is_active: F) -> String
where
    F: Fn(&str) -> bool,
{
    values
        .iter()
        .map(|value| {
            let active = if is_active(value) { " active" } else { "" };
            format!(
                r#"<span class="{} {}{}" {}="{}">{}</span>"#,
                kind.base_class(),
                kind.filter_class(),
                active,
                kind.data_attr(),
                escape_html(value),
                escape_html(value)
            )
        })
        .collect()
}

/// Fill in the result-count template
pub fn render_result_count(format: &str, visible: usize, total: usize) -> String {
    format
        .replace("{visible}", &visible.to_string())
        .replace("{total}", &total.to_string())
}

/// Recent searches offered while the search box is focused
pub fn render_suggestions(terms: &[String]) -> String {
    terms
        .iter()
        .map(|term| {
            format!(
                r#"<li class="search-suggestion" data-term="{}">{}</li>"#,
                escape_html(term),
                escape_html(term)
            )
        })
        .collect()
}
