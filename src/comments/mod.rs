//! Giscus comment widget
//!
//! The widget is configured through declarative `data-*` attributes on its
//! client script and, once loaded, accepts theme updates as a cross-origin
//! message to its iframe.

use serde_json::json;

use crate::config::CommentsConfig;
use crate::render::escape_html;
use crate::theme::Theme;
use crate::ui::Effect;

/// Selector of the iframe the widget script creates
pub const FRAME_SELECTOR: &str = "iframe.giscus-frame";

/// Where the widget is mounted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Below a post, one discussion per pathname
    Post,
    /// On the index page, one shared discussion
    Main,
}

impl Placement {
    pub fn container_id(self) -> &'static str {
        match self {
            Placement::Post => "giscus",
            Placement::Main => "main-giscus",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CommentWidget {
    config: CommentsConfig,
}

impl CommentWidget {
    /// Build the widget, or `None` when comments are off or unconfigured
    pub fn from_config(config: &CommentsConfig) -> Option<Self> {
        if !config.enable {
            return None;
        }
        if config.repo.trim().is_empty() || config.repo_id.trim().is_empty() {
            tracing::debug!("Comments enabled but repo or repo_id is empty, skipping widget");
            return None;
        }
        Some(Self {
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &CommentsConfig {
        &self.config
    }

    /// Container markup with the widget's client script
    ///
    /// `theme` overrides the configured initial theme so the widget starts in
    /// the page's current theme.
    pub fn embed_html(&self, placement: Placement, theme: Option<Theme>) -> String {
        let attrs: String = self
            .attributes(placement, theme)
            .into_iter()
            .map(|(name, value)| format!(r#" {}="{}""#, name, escape_html(&value)))
            .collect();

        format!(
            r#"<div class="giscus-container" id="{}"><script{} crossorigin="anonymous" async></script></div>"#,
            placement.container_id(),
            attrs
        )
    }

    /// Theme update understood by the widget iframe
    pub fn theme_message(&self, theme: Theme) -> serde_json::Value {
        json!({ "giscus": { "setConfig": { "theme": theme.to_string() } } })
    }

    /// Fire-and-forget theme notification
    pub fn theme_effect(&self, theme: Theme) -> Effect {
        Effect::PostMessage {
            selector: FRAME_SELECTOR.to_string(),
            origin: self.config.origin.clone(),
            message: self.theme_message(theme),
        }
    }

    fn attributes(&self, placement: Placement, theme: Option<Theme>) -> Vec<(&'static str, String)> {
        let c = &self.config;
        let flag = |b: bool| if b { "1" } else { "0" }.to_string();

        let mut attrs = vec![
            ("src", c.client_src.clone()),
            ("data-repo", c.repo.clone()),
            ("data-repo-id", c.repo_id.clone()),
            ("data-category", c.category.clone()),
            ("data-category-id", c.category_id.clone()),
            ("data-mapping", c.mapping.clone()),
        ];

        if placement == Placement::Main {
            if let Some(term) = c.main_term.as_deref().filter(|t| !t.is_empty()) {
                attrs.push(("data-term", term.to_string()));
            }
        }

        attrs.extend([
            ("data-strict", flag(c.strict)),
            ("data-reactions-enabled", flag(c.reactions_enabled)),
            ("data-emit-metadata", flag(c.emit_metadata)),
            ("data-input-position", c.input_position.clone()),
            (
                "data-theme",
                theme.map(|t| t.to_string()).unwrap_or_else(|| c.theme.clone()),
            ),
            ("data-lang", c.lang.clone()),
        ]);

        attrs
    }
}
