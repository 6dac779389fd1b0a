//! Page controllers
//!
//! Controllers never touch a real DOM. They update a [`Document`] and return
//! [`Effect`] patches for whichever client is showing the page.

mod app;
mod debounce;
mod document;
mod event;
mod history;
mod page;
mod post_page;

pub use app::BlogApp;
pub use debounce::Debouncer;
pub use document::{Chip, Document, Element, ElementId, PageKind};
pub use event::{ClickTarget, Effect, KeyInput, UiEvent};
pub use history::SearchHistory;
pub use page::Page;
pub use post_page::{fetch_post, mount_post, show_post};
