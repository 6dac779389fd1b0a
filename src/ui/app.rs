//! Index page controller: search box, filter chips and the post list

use std::time::Duration;

use tokio::sync::mpsc;

use super::{ClickTarget, Debouncer, Document, Effect, ElementId, KeyInput, SearchHistory};
use crate::context::AppContext;
use crate::content::PostIndex;
use crate::filter::{clear_highlights, highlight_terms, FilterCriteria, FilterEngine};
use crate::render::{
    render_chips, render_error, render_post_cards, render_result_count, render_suggestions,
    ChipKind,
};

pub struct BlogApp {
    ctx: AppContext,
    engine: FilterEngine,
    history: SearchHistory,
    search_debounce: Debouncer<String>,
    load_failed: bool,
}

impl BlogApp {
    /// Load the post index and set up filtering
    ///
    /// A failed load leaves the list empty and is reported on mount. Debounced
    /// search terms arrive on the returned receiver and must be passed back
    /// to [`BlogApp::commit_search`].
    pub async fn init(
        ctx: AppContext,
        criteria: FilterCriteria,
    ) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (index, load_failed) =
            match PostIndex::load(&*ctx.source, &ctx.config.index_file).await {
                Ok(index) => {
                    tracing::debug!("Loaded {} posts from {}", index.len(), ctx.config.index_file);
                    (index, false)
                }
                Err(e) => {
                    tracing::error!("Failed to load post index: {}", e);
                    (PostIndex::new(Vec::new()), true)
                }
            };

        let (search_debounce, searches) =
            Debouncer::new(Duration::from_millis(ctx.config.search.debounce_ms));
        let history = SearchHistory::new(ctx.storage.clone(), &ctx.config.search);

        let app = Self {
            engine: FilterEngine::with_criteria(index, criteria),
            history,
            search_debounce,
            load_failed,
            ctx,
        };
        (app, searches)
    }

    pub fn engine(&self) -> &FilterEngine {
        &self.engine
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn load_failed(&self) -> bool {
        self.load_failed
    }

    pub fn is_search_pending(&self) -> bool {
        self.search_debounce.is_pending()
    }

    /// First render of the index page
    pub fn mount(&self, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        doc.emit(
            Effect::SetValue {
                id: ElementId::SearchInput,
                value: self.engine.criteria().search().to_string(),
            },
            &mut out,
        );
        self.setup_filters(doc, &mut out);
        self.render_posts(doc, &mut out);
        out
    }

    /// Draw the post list for the current criteria
    pub fn render_posts(&self, doc: &mut Document, out: &mut Vec<Effect>) {
        let config = &self.ctx.config;

        if self.load_failed {
            doc.emit(
                Effect::SetHtml {
                    id: ElementId::PostsContainer,
                    html: render_error(&config.load_error_message),
                },
                out,
            );
            doc.emit(
                Effect::SetVisible {
                    id: ElementId::NoResults,
                    visible: false,
                },
                out,
            );
            self.update_result_count(doc, out);
            return;
        }

        let posts = self.engine.filtered();
        let html = if posts.is_empty() {
            String::new()
        } else {
            let cards = render_post_cards(&posts, &config.date_format);
            if config.search.highlight {
                highlight_terms(
                    &cards,
                    self.engine.criteria().search(),
                    config.search.highlight_min_chars,
                )
            } else {
                cards
            }
        };

        doc.emit(
            Effect::SetHtml {
                id: ElementId::PostsContainer,
                html,
            },
            out,
        );
        doc.emit(
            Effect::SetVisible {
                id: ElementId::NoResults,
                visible: posts.is_empty(),
            },
            out,
        );
        self.update_result_count(doc, out);
    }

    fn update_result_count(&self, doc: &mut Document, out: &mut Vec<Effect>) {
        doc.emit(
            Effect::SetText {
                id: ElementId::ResultCount,
                text: render_result_count(
                    &self.ctx.config.search.result_count_format,
                    self.engine.visible_count(),
                    self.engine.total_count(),
                ),
            },
            out,
        );
    }

    /// Render the tag and category chip lists
    pub fn setup_filters(&self, doc: &mut Document, out: &mut Vec<Effect>) {
        let index = self.engine.index();
        let criteria = self.engine.criteria();

        for (kind, id, values) in [
            (ChipKind::Tag, ElementId::TagsList, index.tags()),
            (ChipKind::Category, ElementId::CategoriesList, index.categories()),
        ] {
            if !doc.has(id) {
                continue;
            }
            let is_active = |value: &str| criteria.is_active(kind, value);
            doc.set_chips(kind, &values, is_active);
            doc.emit(
                Effect::SetHtml {
                    id,
                    html: render_chips(kind, &values, is_active),
                },
                out,
            );
        }
    }

    /// Sync the active marker of every rendered chip with the criteria
    pub fn update_filter_ui(&self, doc: &mut Document, out: &mut Vec<Effect>) {
        let chips: Vec<(ChipKind, String)> = [ChipKind::Tag, ChipKind::Category]
            .into_iter()
            .flat_map(|kind| doc.chips(kind).map(|chip| (chip.kind, chip.value.clone())))
            .collect();

        for (kind, value) in chips {
            let active = self.engine.criteria().is_active(kind, &value);
            doc.emit(Effect::SetChipActive { kind, value, active }, out);
        }
    }

    /// The search box changed: highlight right away, filter after the debounce
    pub fn on_search_input(&mut self, value: &str, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        doc.apply(&Effect::SetValue {
            id: ElementId::SearchInput,
            value: value.to_string(),
        });

        let search = &self.ctx.config.search;
        if search.highlight {
            if let Some(current) = doc.html(ElementId::PostsContainer) {
                let html = highlight_terms(current, value, search.highlight_min_chars);
                if html != current {
                    doc.emit(
                        Effect::SetHtml {
                            id: ElementId::PostsContainer,
                            html,
                        },
                        &mut out,
                    );
                }
            }
        }

        self.search_debounce.call(value.to_string());
        out
    }

    /// Apply a search term: filter, redraw and remember it
    pub fn commit_search(&mut self, term: &str, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        self.engine.set_search(term);
        self.render_posts(doc, &mut out);
        if self.history.record(term) {
            self.render_suggestions(doc, &mut out);
        }
        out
    }

    /// Delegated click handling for chips and suggestions
    pub fn on_click(&mut self, target: &ClickTarget, doc: &mut Document) -> Vec<Effect> {
        if target.has_class(ChipKind::Tag.filter_class()) {
            if let Some(tag) = target.data("tag") {
                return self.toggle_filter(ChipKind::Tag, tag, doc);
            }
        }
        if target.has_class(ChipKind::Category.filter_class()) {
            if let Some(category) = target.data("category") {
                return self.toggle_filter(ChipKind::Category, category, doc);
            }
        }
        if target.has_class("search-suggestion") {
            if let Some(term) = target.data("term") {
                let term = term.to_string();
                return self.use_suggestion(&term, doc);
            }
        }
        Vec::new()
    }

    pub fn toggle_filter(&mut self, kind: ChipKind, value: &str, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        let active = self.engine.toggle(kind, value);
        tracing::debug!("{:?} filter '{}' active: {}", kind, value, active);
        self.update_filter_ui(doc, &mut out);
        self.render_posts(doc, &mut out);
        out
    }

    fn use_suggestion(&mut self, term: &str, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        self.search_debounce.cancel();
        doc.emit(
            Effect::SetValue {
                id: ElementId::SearchInput,
                value: term.to_string(),
            },
            &mut out,
        );
        out.extend(self.commit_search(term, doc));
        doc.emit(
            Effect::SetVisible {
                id: ElementId::SearchSuggestions,
                visible: false,
            },
            &mut out,
        );
        out
    }

    /// Ctrl/Cmd+K focuses the search box; Escape in it clears the search
    pub fn on_key(&mut self, key: &KeyInput, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();

        if (key.ctrl || key.meta) && key.key.eq_ignore_ascii_case("k") {
            doc.emit(
                Effect::Focus {
                    id: ElementId::SearchInput,
                    select: true,
                },
                &mut out,
            );
            return out;
        }

        let in_search = key.target.as_deref() == Some(ElementId::SearchInput.dom_id())
            || doc.is_focused(ElementId::SearchInput);
        if key.key == "Escape" && in_search && doc.has(ElementId::SearchInput) {
            self.search_debounce.cancel();
            doc.emit(
                Effect::SetValue {
                    id: ElementId::SearchInput,
                    value: String::new(),
                },
                &mut out,
            );
            doc.emit(
                Effect::Blur {
                    id: ElementId::SearchInput,
                },
                &mut out,
            );
            self.hide_suggestions(doc, &mut out);
            self.engine.clear_search();
            self.render_posts(doc, &mut out);
        }

        out
    }

    pub fn on_focus(&mut self, id: ElementId, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        doc.set_focus(id, true);
        if id == ElementId::SearchInput {
            self.render_suggestions(doc, &mut out);
        }
        out
    }

    pub fn on_blur(&mut self, id: ElementId, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        doc.set_focus(id, false);
        if id == ElementId::SearchInput {
            self.hide_suggestions(doc, &mut out);
        }
        out
    }

    /// Show recent searches under a focused search box
    fn render_suggestions(&self, doc: &mut Document, out: &mut Vec<Effect>) {
        if !doc.is_focused(ElementId::SearchInput) {
            return;
        }
        let terms = self.history.recent();
        doc.emit(
            Effect::SetHtml {
                id: ElementId::SearchSuggestions,
                html: render_suggestions(&terms),
            },
            out,
        );
        doc.emit(
            Effect::SetVisible {
                id: ElementId::SearchSuggestions,
                visible: !terms.is_empty(),
            },
            out,
        );
    }

    fn hide_suggestions(&self, doc: &mut Document, out: &mut Vec<Effect>) {
        doc.emit(
            Effect::SetVisible {
                id: ElementId::SearchSuggestions,
                visible: false,
            },
            out,
        );
    }

    /// Drop highlights from the rendered list without re-filtering
    pub fn clear_highlights(&self, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        if let Some(current) = doc.html(ElementId::PostsContainer) {
            let html = clear_highlights(current);
            if html != current {
                doc.emit(
                    Effect::SetHtml {
                        id: ElementId::PostsContainer,
                        html,
                    },
                    &mut out,
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::DirSource;
    use crate::filter::HIGHLIGHT_OPEN;
    use crate::storage::{MemoryStorage, Storage};
    use std::sync::Arc;
    use tempfile::TempDir;

    const INDEX: &str = r#"[
        {"file":"a.md","title":"Hello World","date":"2024-01-15","excerpt":"x","tags":["go"]},
        {"file":"b.md","title":"Other","date":"2024-01-16","excerpt":"y","category":"dev","tags":["rust"]}
    ]"#;

    fn site(index: Option<&str>) -> (TempDir, AppContext) {
        let dir = TempDir::new().unwrap();
        if let Some(index) = index {
            std::fs::write(dir.path().join("posts.json"), index).unwrap();
        }
        let storage: Arc<dyn Storage> = Arc::new(MemoryStorage::new());
        let ctx = AppContext::new(SiteConfig::default(), DirSource::new(dir.path()), storage);
        (dir, ctx)
    }

    async fn mounted(
        index: Option<&str>,
    ) -> (TempDir, BlogApp, mpsc::UnboundedReceiver<String>, Document) {
        let (dir, ctx) = site(index);
        let (app, rx) = BlogApp::init(ctx, FilterCriteria::new()).await;
        let mut doc = Document::index_page("Blog");
        app.mount(&mut doc);
        (dir, app, rx, doc)
    }

    fn posts_html(doc: &Document) -> &str {
        doc.html(ElementId::PostsContainer).unwrap()
    }

    #[tokio::test]
    async fn test_mount_renders_posts_and_chips() {
        let (_dir, app, _rx, doc) = mounted(Some(INDEX)).await;

        assert!(!app.load_failed());
        assert!(posts_html(&doc).contains("Hello World"));
        assert!(posts_html(&doc).contains("Other"));
        assert!(!doc.element(ElementId::NoResults).unwrap().visible);
        assert_eq!(doc.chips(ChipKind::Tag).count(), 2);
        assert_eq!(doc.chips(ChipKind::Category).count(), 1);
        assert_eq!(doc.html(ElementId::ResultCount), Some("2 / 2 posts"));
    }

    #[tokio::test]
    async fn test_missing_index_shows_error() {
        let (_dir, app, _rx, doc) = mounted(None).await;

        assert!(app.load_failed());
        assert!(posts_html(&doc).contains("load-error"));
        assert!(posts_html(&doc).contains("Could not load posts"));
        assert_eq!(doc.chips(ChipKind::Tag).count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_index_shows_error() {
        let (_dir, app, _rx, doc) = mounted(Some("{not json")).await;
        assert!(app.load_failed());
        assert!(posts_html(&doc).contains("load-error"));
    }

    #[tokio::test]
    async fn test_chip_click_filters_and_marks_active() {
        let (_dir, mut app, _rx, mut doc) = mounted(Some(INDEX)).await;

        let effects = app.on_click(&ClickTarget::chip(ChipKind::Tag, "rust"), &mut doc);
        assert!(effects.contains(&Effect::SetChipActive {
            kind: ChipKind::Tag,
            value: "rust".to_string(),
            active: true,
        }));
        assert!(!posts_html(&doc).contains("Hello World"));
        assert!(posts_html(&doc).contains("Other"));

        app.on_click(&ClickTarget::chip(ChipKind::Tag, "rust"), &mut doc);
        assert!(doc.chips(ChipKind::Tag).all(|c| !c.active));
        assert!(posts_html(&doc).contains("Hello World"));
    }

    #[tokio::test]
    async fn test_no_results_panel() {
        let (_dir, mut app, _rx, mut doc) = mounted(Some(INDEX)).await;

        app.commit_search("zzz", &mut doc);
        assert_eq!(posts_html(&doc), "");
        assert!(doc.element(ElementId::NoResults).unwrap().visible);
        assert_eq!(doc.html(ElementId::ResultCount), Some("0 / 2 posts"));

        app.commit_search("", &mut doc);
        assert!(!doc.element(ElementId::NoResults).unwrap().visible);
    }

    #[tokio::test]
    async fn test_missing_no_results_element_is_tolerated() {
        let (_dir, ctx) = site(Some(INDEX));
        let (mut app, _rx) = BlogApp::init(ctx, FilterCriteria::new()).await;
        let mut doc = Document::index_page("Blog")
            .without(ElementId::NoResults)
            .without(ElementId::TagsList);
        app.mount(&mut doc);

        let effects = app.commit_search("zzz", &mut doc);
        assert!(effects
            .iter()
            .all(|e| !matches!(e, Effect::SetVisible { id: ElementId::NoResults, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_input_is_debounced() {
        let (_dir, mut app, mut rx, mut doc) = mounted(Some(INDEX)).await;

        app.on_search_input("hel", &mut doc);
        app.on_search_input("hello", &mut doc);
        assert_eq!(app.engine().visible_count(), 2);

        let term = rx.recv().await.unwrap();
        assert_eq!(term, "hello");
        app.commit_search(&term, &mut doc);

        assert_eq!(app.engine().visible_count(), 1);
        assert!(posts_html(&doc).contains(HIGHLIGHT_OPEN));
        assert_eq!(app.history().recent(), vec!["hello"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_input_highlights_immediately() {
        let (_dir, mut app, _rx, mut doc) = mounted(Some(INDEX)).await;

        app.on_search_input("wor", &mut doc);
        assert!(posts_html(&doc).contains(&format!("{}Wor</mark>", HIGHLIGHT_OPEN)));

        app.on_search_input("w", &mut doc);
        assert!(!posts_html(&doc).contains(HIGHLIGHT_OPEN));
    }

    #[tokio::test(start_paused = true)]
    async fn test_escape_clears_and_cancels_pending_search() {
        let (_dir, mut app, mut rx, mut doc) = mounted(Some(INDEX)).await;
        app.commit_search("hello", &mut doc);
        assert_eq!(app.engine().visible_count(), 1);

        app.on_focus(ElementId::SearchInput, &mut doc);
        app.on_search_input("other", &mut doc);
        assert!(app.is_search_pending());

        let key = KeyInput::new("Escape").targeting(ElementId::SearchInput);
        let effects = app.on_key(&key, &mut doc);

        assert!(effects.contains(&Effect::Blur {
            id: ElementId::SearchInput
        }));
        assert!(!app.is_search_pending());
        assert_eq!(app.engine().criteria().search(), "");
        assert_eq!(app.engine().visible_count(), 2);
        assert_eq!(doc.element(ElementId::SearchInput).unwrap().value, "");

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_escape_outside_search_is_ignored() {
        let (_dir, mut app, _rx, mut doc) = mounted(Some(INDEX)).await;
        app.commit_search("hello", &mut doc);

        let effects = app.on_key(&KeyInput::new("Escape"), &mut doc);
        assert!(effects.is_empty());
        assert_eq!(app.engine().criteria().search(), "hello");
    }

    #[tokio::test]
    async fn test_ctrl_k_focuses_search() {
        let (_dir, mut app, _rx, mut doc) = mounted(Some(INDEX)).await;
        let key = KeyInput {
            ctrl: true,
            ..KeyInput::new("k")
        };
        let effects = app.on_key(&key, &mut doc);
        assert_eq!(
            effects,
            vec![Effect::Focus {
                id: ElementId::SearchInput,
                select: true
            }]
        );
        assert!(doc.is_focused(ElementId::SearchInput));
    }

    #[tokio::test]
    async fn test_suggestions_follow_focus() {
        let (_dir, mut app, _rx, mut doc) = mounted(Some(INDEX)).await;
        app.commit_search("hello", &mut doc);

        app.on_focus(ElementId::SearchInput, &mut doc);
        let suggestions = doc.element(ElementId::SearchSuggestions).unwrap();
        assert!(suggestions.visible);
        assert!(suggestions.html.contains(r#"data-term="hello""#));

        app.on_blur(ElementId::SearchInput, &mut doc);
        assert!(!doc.element(ElementId::SearchSuggestions).unwrap().visible);
    }

    #[tokio::test]
    async fn test_suggestion_click_commits_search() {
        let (_dir, mut app, _rx, mut doc) = mounted(Some(INDEX)).await;
        let target = ClickTarget {
            classes: vec!["search-suggestion".to_string()],
            data: [("term".to_string(), "other".to_string())].into(),
            ..ClickTarget::default()
        };

        app.on_click(&target, &mut doc);
        assert_eq!(app.engine().visible_count(), 1);
        assert_eq!(doc.element(ElementId::SearchInput).unwrap().value, "other");
    }

    #[tokio::test]
    async fn test_initial_criteria_from_query() {
        let (_dir, ctx) = site(Some(INDEX));
        let (app, _rx) = BlogApp::init(ctx, FilterCriteria::from_query("category=dev")).await;
        let mut doc = Document::index_page("Blog");
        app.mount(&mut doc);

        assert_eq!(app.engine().visible_count(), 1);
        assert!(doc
            .chips(ChipKind::Category)
            .any(|c| c.value == "dev" && c.active));
    }

    #[tokio::test]
    async fn test_clear_highlights_restores_cards() {
        let (_dir, mut app, _rx, mut doc) = mounted(Some(INDEX)).await;
        let plain = posts_html(&doc).to_string();

        app.on_search_input("other", &mut doc);
        assert_ne!(posts_html(&doc), plain);
        app.clear_highlights(&mut doc);
        assert_eq!(posts_html(&doc), plain);
    }
}
