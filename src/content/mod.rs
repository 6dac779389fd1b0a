//! Content module - post index, post files and Markdown processing

mod frontmatter;
mod index;
pub mod loader;
mod markdown;
mod post;
mod source;

pub use frontmatter::FrontMatter;
pub use index::{load_post, PostIndex};
pub use markdown::MarkdownRenderer;
pub use post::{title_from_filename, PostDetail, PostMeta, PostSummary};
pub use source::{ContentSource, DirSource};
