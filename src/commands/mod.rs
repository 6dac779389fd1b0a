//! CLI subcommands

pub mod history;
pub mod index;
pub mod list;
pub mod render;
pub mod theme;
