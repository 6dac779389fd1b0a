//! Render layer - turns posts and page state into HTML
//!
//! Post-supplied text is always escaped here. The only unescaped content is
//! the Markdown body rendered from the site's own post files.

mod date;
mod html;
pub mod layout;
mod list;
mod post;

pub use date::*;
pub use html::*;
pub use list::*;
pub use post::*;
