//! Messages between a page and its session
//!
//! The client script reports DOM events as [`UiEvent`] JSON and applies the
//! [`Effect`] patches it receives back.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::ElementId;
use crate::render::ChipKind;
use crate::theme::Theme;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiEvent {
    /// The search box text changed
    Input { value: String },
    Click(ClickTarget),
    KeyDown(KeyInput),
    Focus { id: String },
    Blur { id: String },
    /// The OS color scheme changed
    OsTheme { dark: bool },
}

/// The element a click landed on, as seen by a delegated listener
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClickTarget {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    /// `dataset` of the element (`data-tag` arrives as `tag`)
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl ClickTarget {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }

    pub fn is(&self, id: ElementId) -> bool {
        self.id.as_deref() == Some(id.dom_id())
    }

    /// A click on a filter chip
    pub fn chip(kind: ChipKind, value: &str) -> Self {
        let key = match kind {
            ChipKind::Tag => "tag",
            ChipKind::Category => "category",
        };
        Self {
            id: None,
            classes: vec![key.to_string(), kind.filter_class().to_string()],
            data: HashMap::from([(key.to_string(), value.to_string())]),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct KeyInput {
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub meta: bool,
    #[serde(default)]
    pub alt: bool,
    /// Id of the focused element when the key was pressed
    #[serde(default)]
    pub target: Option<String>,
}

impl KeyInput {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn targeting(mut self, id: ElementId) -> Self {
        self.target = Some(id.dom_id().to_string());
        self
    }
}

/// A patch for the client to apply to its DOM
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Effect {
    SetHtml { id: ElementId, html: String },
    SetText { id: ElementId, text: String },
    SetValue { id: ElementId, value: String },
    SetVisible { id: ElementId, visible: bool },
    Focus { id: ElementId, select: bool },
    Blur { id: ElementId },
    SetChipActive { kind: ChipKind, value: String, active: bool },
    /// Set `data-theme` on the root element
    SetTheme { theme: Theme },
    SetTitle { title: String },
    /// `postMessage` to the first frame matching `selector`
    PostMessage {
        selector: String,
        origin: String,
        message: serde_json::Value,
    },
    /// Ask a client-side highlighter to re-scan an element
    Rescan { id: ElementId },
    Reload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_events() {
        let event: UiEvent = serde_json::from_str(r#"{"type":"input","value":"rust"}"#).unwrap();
        assert_eq!(event, UiEvent::Input { value: "rust".to_string() });

        let event: UiEvent = serde_json::from_str(
            r#"{"type":"click","classes":["tag","filter-tag"],"data":{"tag":"go"}}"#,
        )
        .unwrap();
        assert_eq!(event, UiEvent::Click(ClickTarget::chip(ChipKind::Tag, "go")));

        let event: UiEvent = serde_json::from_str(
            r#"{"type":"key-down","key":"Escape","target":"search-input"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            UiEvent::KeyDown(KeyInput::new("Escape").targeting(ElementId::SearchInput))
        );

        let event: UiEvent = serde_json::from_str(r#"{"type":"os-theme","dark":true}"#).unwrap();
        assert_eq!(event, UiEvent::OsTheme { dark: true });
    }

    #[test]
    fn test_serialize_effects() {
        let json = serde_json::to_string(&Effect::SetVisible {
            id: ElementId::NoResults,
            visible: true,
        })
        .unwrap();
        assert_eq!(json, r#"{"op":"set-visible","id":"no-results","visible":true}"#);

        let json = serde_json::to_string(&Effect::SetChipActive {
            kind: ChipKind::Category,
            value: "dev".to_string(),
            active: false,
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"op":"set-chip-active","kind":"category","value":"dev","active":false}"#
        );

        let json = serde_json::to_string(&Effect::SetTheme { theme: Theme::Dark }).unwrap();
        assert_eq!(json, r#"{"op":"set-theme","theme":"dark"}"#);
        assert_eq!(serde_json::to_string(&Effect::Reload).unwrap(), r#"{"op":"reload"}"#);
    }
}
