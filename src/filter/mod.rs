//! Post filtering: criteria, matching and search highlighting

mod criteria;
mod engine;
mod highlight;

pub use criteria::FilterCriteria;
pub use engine::{apply_filters, matches, FilterEngine};
pub use highlight::{clear_highlights, highlight_terms, HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN};
