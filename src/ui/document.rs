//! Server-side view of a page
//!
//! A `Document` mirrors the parts of a rendered page the controllers touch.
//! Elements are optional: a page without a search box simply has no
//! `SearchInput`, and effects aimed at it are dropped.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use super::Effect;
use crate::render::ChipKind;
use crate::theme::Theme;

/// Elements addressed by id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    SearchInput,
    SearchSuggestions,
    ResultCount,
    TagsList,
    CategoriesList,
    PostsContainer,
    NoResults,
    ThemeToggle,
    ThemeIcon,
    PostContent,
    PostComments,
    MainComments,
}

impl ElementId {
    pub const ALL: [ElementId; 12] = [
        ElementId::SearchInput,
        ElementId::SearchSuggestions,
        ElementId::ResultCount,
        ElementId::TagsList,
        ElementId::CategoriesList,
        ElementId::PostsContainer,
        ElementId::NoResults,
        ElementId::ThemeToggle,
        ElementId::ThemeIcon,
        ElementId::PostContent,
        ElementId::PostComments,
        ElementId::MainComments,
    ];

    pub fn dom_id(self) -> &'static str {
        match self {
            ElementId::SearchInput => "search-input",
            ElementId::SearchSuggestions => "search-suggestions",
            ElementId::ResultCount => "result-count",
            ElementId::TagsList => "tags-list",
            ElementId::CategoriesList => "categories-list",
            ElementId::PostsContainer => "posts-container",
            ElementId::NoResults => "no-results",
            ElementId::ThemeToggle => "theme-toggle",
            ElementId::ThemeIcon => "theme-icon",
            ElementId::PostContent => "post-content",
            ElementId::PostComments => "post-comments",
            ElementId::MainComments => "main-giscus-container",
        }
    }

    pub fn from_dom_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.dom_id() == id)
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.dom_id())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Inner markup
    pub html: String,
    /// Form value, for inputs
    pub value: String,
    pub visible: bool,
    pub focused: bool,
}

impl Element {
    fn new(visible: bool) -> Self {
        Self {
            html: String::new(),
            value: String::new(),
            visible,
            focused: false,
        }
    }
}

/// A rendered filter chip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chip {
    pub kind: ChipKind,
    pub value: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    Index,
    Post,
    /// No markup at all, used by the CLI
    Headless,
}

#[derive(Debug, Clone)]
pub struct Document {
    kind: PageKind,
    title: String,
    theme: Theme,
    elements: IndexMap<ElementId, Element>,
    chips: Vec<Chip>,
    comment_widget: bool,
}

impl Document {
    fn with_elements(kind: PageKind, title: &str, elements: &[(ElementId, bool)]) -> Self {
        Self {
            kind,
            title: title.to_string(),
            theme: Theme::default(),
            elements: elements
                .iter()
                .map(|&(id, visible)| (id, Element::new(visible)))
                .collect(),
            chips: Vec::new(),
            comment_widget: false,
        }
    }

    /// The post list page
    pub fn index_page(title: &str) -> Self {
        Self::with_elements(
            PageKind::Index,
            title,
            &[
                (ElementId::ThemeToggle, true),
                (ElementId::ThemeIcon, true),
                (ElementId::SearchInput, true),
                (ElementId::SearchSuggestions, false),
                (ElementId::ResultCount, true),
                (ElementId::TagsList, true),
                (ElementId::CategoriesList, true),
                (ElementId::PostsContainer, true),
                (ElementId::NoResults, false),
                (ElementId::MainComments, true),
            ],
        )
    }

    /// The single post page
    pub fn post_page(title: &str) -> Self {
        Self::with_elements(
            PageKind::Post,
            title,
            &[
                (ElementId::ThemeToggle, true),
                (ElementId::ThemeIcon, true),
                (ElementId::PostContent, true),
                (ElementId::PostComments, true),
            ],
        )
    }

    pub fn headless() -> Self {
        Self::with_elements(PageKind::Headless, "", &[])
    }

    /// Drop an element, as if the page markup lacked it
    pub fn without(mut self, id: ElementId) -> Self {
        self.elements.shift_remove(&id);
        self
    }

    pub fn kind(&self) -> &PageKind {
        &self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn has(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn html(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(|e| e.html.as_str())
    }

    pub fn is_focused(&self, id: ElementId) -> bool {
        self.element(id).map(|e| e.focused).unwrap_or(false)
    }

    pub fn chips(&self, kind: ChipKind) -> impl Iterator<Item = &Chip> {
        self.chips.iter().filter(move |c| c.kind == kind)
    }

    /// Replace the recorded chips of one kind after re-rendering its list
    pub fn set_chips(&mut self, kind: ChipKind, values: &[String], is_active: impl Fn(&str) -> bool) {
        self.chips.retain(|c| c.kind != kind);
        self.chips.extend(values.iter().map(|value| Chip {
            kind,
            value: value.clone(),
            active: is_active(value),
        }));
    }

    /// Whether a comment widget has been mounted on the page
    pub fn has_comment_widget(&self) -> bool {
        self.comment_widget
    }

    pub fn mark_comment_widget(&mut self) {
        self.comment_widget = true;
    }

    /// Record focus changes reported by the client
    pub fn set_focus(&mut self, id: ElementId, focused: bool) {
        if focused {
            for element in self.elements.values_mut() {
                element.focused = false;
            }
        }
        if let Some(element) = self.elements.get_mut(&id) {
            element.focused = focused;
        }
    }

    /// Apply an effect to the view; false when its target is missing
    pub fn apply(&mut self, effect: &Effect) -> bool {
        match effect {
            Effect::SetHtml { id, html } => self.update(*id, |e| e.html = html.clone()),
            Effect::SetText { id, text } => {
                let html = crate::render::escape_html(text);
                self.update(*id, |e| e.html = html)
            }
            Effect::SetValue { id, value } => self.update(*id, |e| e.value = value.clone()),
            Effect::SetVisible { id, visible } => self.update(*id, |e| e.visible = *visible),
            Effect::Focus { id, .. } => {
                let present = self.has(*id);
                if present {
                    self.set_focus(*id, true);
                }
                present
            }
            Effect::Blur { id } => self.update(*id, |e| e.focused = false),
            Effect::SetChipActive { kind, value, active } => {
                match self
                    .chips
                    .iter_mut()
                    .find(|c| c.kind == *kind && c.value == *value)
                {
                    Some(chip) => {
                        chip.active = *active;
                        true
                    }
                    None => false,
                }
            }
            Effect::SetTheme { theme } => {
                self.theme = *theme;
                true
            }
            Effect::SetTitle { title } => {
                self.title = title.clone();
                true
            }
            Effect::PostMessage { .. } => self.comment_widget,
            Effect::Rescan { id } => self.has(*id),
            Effect::Reload => true,
        }
    }

    /// Apply an effect and queue it for the client when its target exists
    pub fn emit(&mut self, effect: Effect, out: &mut Vec<Effect>) {
        if self.apply(&effect) {
            out.push(effect);
        } else {
            tracing::trace!("Dropping effect without target: {:?}", effect);
        }
    }

    fn update<F: FnOnce(&mut Element)>(&mut self, id: ElementId, f: F) -> bool {
        match self.elements.get_mut(&id) {
            Some(element) => {
                f(element);
                true
            }
            None => false,
        }
    }
}
