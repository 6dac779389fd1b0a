//! One open page and the controllers attached to it

use tokio::sync::mpsc;

use super::{mount_post, BlogApp, Document, Effect, ElementId, UiEvent};
use crate::comments::Placement;
use crate::context::AppContext;
use crate::filter::FilterCriteria;
use crate::theme::ThemeManager;

/// A page's view state plus its theme manager and, on the index, the filter
/// controller
///
/// Events are handled one at a time by the owner, so no locking is needed.
pub struct Page {
    ctx: AppContext,
    doc: Document,
    theme: ThemeManager,
    app: Option<BlogApp>,
}

impl Page {
    /// Build and mount the index page
    pub async fn index(
        ctx: AppContext,
        criteria: FilterCriteria,
        os_prefers_dark: Option<bool>,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let mut doc = Document::index_page(&ctx.config.title);
        let theme = new_theme_manager(&ctx, os_prefers_dark);
        theme.mount(&mut doc);

        let (app, searches) = BlogApp::init(ctx.clone(), criteria).await;
        app.mount(&mut doc);

        if let Some(widget) = &ctx.comments {
            let mut out = Vec::new();
            doc.emit(
                Effect::SetHtml {
                    id: ElementId::MainComments,
                    html: widget.embed_html(Placement::Main, Some(theme.current())),
                },
                &mut out,
            );
            if !out.is_empty() {
                doc.mark_comment_widget();
            }
        }

        let page = Self {
            ctx,
            doc,
            theme,
            app: Some(app),
        };
        (page, searches)
    }

    /// Build and mount the page for one post
    pub async fn post(ctx: AppContext, file: Option<&str>, os_prefers_dark: Option<bool>) -> Self {
        let mut doc = Document::post_page(&ctx.config.title);
        let theme = new_theme_manager(&ctx, os_prefers_dark);
        theme.mount(&mut doc);
        mount_post(&ctx, file, theme.current(), &mut doc).await;

        Self {
            ctx,
            doc,
            theme,
            app: None,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn theme(&self) -> &ThemeManager {
        &self.theme
    }

    pub fn app(&self) -> Option<&BlogApp> {
        self.app.as_ref()
    }

    /// Effects that bring a freshly connected client to the current theme
    pub fn theme_effects(&mut self) -> Vec<Effect> {
        self.theme.mount(&mut self.doc)
    }

    pub fn handle(&mut self, event: UiEvent) -> Vec<Effect> {
        tracing::trace!("Handling {:?}", event);
        let doc = &mut self.doc;

        match event {
            UiEvent::Input { value } => match self.app.as_mut() {
                Some(app) => app.on_search_input(&value, doc),
                None => Vec::new(),
            },
            UiEvent::Click(target) => {
                if target.is(ElementId::ThemeToggle) || target.has_class("theme-toggle") {
                    self.theme.toggle(doc)
                } else if let Some(app) = self.app.as_mut() {
                    app.on_click(&target, doc)
                } else {
                    Vec::new()
                }
            }
            UiEvent::KeyDown(key) => {
                if key.alt && key.key.eq_ignore_ascii_case("t") {
                    self.theme.toggle(doc)
                } else if let Some(app) = self.app.as_mut() {
                    app.on_key(&key, doc)
                } else {
                    Vec::new()
                }
            }
            UiEvent::Focus { id } => {
                let Some(id) = ElementId::from_dom_id(&id) else {
                    return Vec::new();
                };
                match self.app.as_mut() {
                    Some(app) => app.on_focus(id, doc),
                    None => {
                        doc.set_focus(id, true);
                        Vec::new()
                    }
                }
            }
            UiEvent::Blur { id } => {
                let Some(id) = ElementId::from_dom_id(&id) else {
                    return Vec::new();
                };
                match self.app.as_mut() {
                    Some(app) => app.on_blur(id, doc),
                    None => {
                        doc.set_focus(id, false);
                        Vec::new()
                    }
                }
            }
            UiEvent::OsTheme { dark } => self.theme.on_os_change(dark, doc),
        }
    }

    /// A debounced search term is due
    pub fn commit_search(&mut self, term: &str) -> Vec<Effect> {
        match self.app.as_mut() {
            Some(app) => app.commit_search(term, &mut self.doc),
            None => Vec::new(),
        }
    }
}

fn new_theme_manager(ctx: &AppContext, os_prefers_dark: Option<bool>) -> ThemeManager {
    ThemeManager::new(
        ctx.storage.clone(),
        &ctx.config.theme,
        os_prefers_dark,
        ctx.comments.clone(),
    )
}
