//! Inspect or change the saved theme preference

use anyhow::Result;

use crate::theme::{Theme, ThemeManager};
use crate::ui::Document;
use crate::Blog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Show,
    Toggle,
    Set(Theme),
    Reset,
}

pub fn run(blog: &Blog, action: ThemeAction) -> Result<()> {
    let ctx = blog.context();
    let mut themes = ThemeManager::new(ctx.storage.clone(), &blog.config.theme, None, None);
    let mut doc = Document::headless();

    match action {
        ThemeAction::Show => {
            let source = if themes.saved_theme().is_some() {
                "saved"
            } else {
                "default"
            };
            println!("{} {} ({})", themes.current().icon(), themes.current(), source);
        }
        ThemeAction::Toggle => {
            themes.toggle(&mut doc);
            println!("Theme set to {}", themes.current());
        }
        ThemeAction::Set(theme) => {
            themes.apply_theme(theme, &mut doc);
            println!("Theme set to {}", themes.current());
        }
        ThemeAction::Reset => {
            themes.reset();
            println!("Saved theme cleared");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_toggle_persists_to_site_storage() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();

        run(&blog, ThemeAction::Toggle).unwrap();
        let themes = ThemeManager::new(blog.storage(), &blog.config.theme, None, None);
        assert_eq!(themes.saved_theme(), Some(Theme::Dark));

        run(&blog, ThemeAction::Set(Theme::Light)).unwrap();
        run(&blog, ThemeAction::Toggle).unwrap();
        assert_eq!(themes.saved_theme(), Some(Theme::Dark));

        run(&blog, ThemeAction::Reset).unwrap();
        assert_eq!(themes.saved_theme(), None);
    }
}
