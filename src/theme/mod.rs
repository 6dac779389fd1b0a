//! Light/dark theme preference

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::comments::CommentWidget;
use crate::config::ThemeConfig;
use crate::storage::{read_best_effort, write_best_effort, Storage};
use crate::ui::{Document, Effect, ElementId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Icon for the toggle button: shows the theme a click switches to
    pub fn icon(self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{}'", other)),
        }
    }
}

/// Tracks the current theme, persists explicit choices and relays changes
/// to the comment widget
pub struct ThemeManager {
    current: Theme,
    storage: Arc<dyn Storage>,
    storage_key: String,
    widget: Option<CommentWidget>,
}

impl ThemeManager {
    /// Resolve the starting theme: persisted choice, then OS preference, then light
    pub fn new(
        storage: Arc<dyn Storage>,
        config: &ThemeConfig,
        os_prefers_dark: Option<bool>,
        widget: Option<CommentWidget>,
    ) -> Self {
        let mut manager = Self {
            current: Theme::default(),
            storage,
            storage_key: config.storage_key.clone(),
            widget,
        };
        manager.current = manager
            .saved_theme()
            .or(os_prefers_dark.map(Theme::from_dark))
            .unwrap_or_default();
        tracing::debug!("Starting with {} theme", manager.current);
        manager
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn is_dark(&self) -> bool {
        self.current == Theme::Dark
    }

    /// Persisted explicit choice, if any
    pub fn saved_theme(&self) -> Option<Theme> {
        let value = read_best_effort(self.storage.as_ref(), &self.storage_key)?;
        match value.parse() {
            Ok(theme) => Some(theme),
            Err(e) => {
                tracing::warn!("Ignoring stored theme: {}", e);
                None
            }
        }
    }

    /// Show the current theme on a freshly built page without persisting it
    pub fn mount(&self, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        doc.emit(Effect::SetTheme { theme: self.current }, &mut out);
        self.update_icon(doc, &mut out);
        out
    }

    /// Switch to `theme`, persist it and notify the comment widget
    pub fn apply_theme(&mut self, theme: Theme, doc: &mut Document) -> Vec<Effect> {
        let mut out = Vec::new();
        self.current = theme;
        doc.emit(Effect::SetTheme { theme }, &mut out);
        write_best_effort(self.storage.as_ref(), &self.storage_key, theme.as_str());
        if let Some(widget) = &self.widget {
            doc.emit(widget.theme_effect(theme), &mut out);
        }
        self.update_icon(doc, &mut out);
        out
    }

    pub fn toggle(&mut self, doc: &mut Document) -> Vec<Effect> {
        self.apply_theme(self.current.toggled(), doc)
    }

    /// Follow the OS preference unless the user picked a theme explicitly
    pub fn on_os_change(&mut self, dark: bool, doc: &mut Document) -> Vec<Effect> {
        if let Some(saved) = self.saved_theme() {
            tracing::debug!("Ignoring OS theme change, {} theme is saved", saved);
            return Vec::new();
        }
        self.apply_theme(Theme::from_dark(dark), doc)
    }

    /// Forget the explicit choice
    pub fn reset(&self) {
        if let Err(e) = self.storage.remove_item(&self.storage_key) {
            tracing::warn!("Failed to remove {} from storage: {}", self.storage_key, e);
        }
    }

    fn update_icon(&self, doc: &mut Document, out: &mut Vec<Effect>) {
        doc.emit(
            Effect::SetText {
                id: ElementId::ThemeIcon,
                text: self.current.icon().to_string(),
            },
            out,
        );
    }
}
