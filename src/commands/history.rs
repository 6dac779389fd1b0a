//! Show or clear the remembered search terms

use anyhow::Result;

use crate::ui::SearchHistory;
use crate::Blog;

pub fn run(blog: &Blog, clear: bool) -> Result<()> {
    let history = SearchHistory::new(blog.storage(), &blog.config.search);

    if clear {
        history.clear();
        println!("Search history cleared");
        return Ok(());
    }

    let terms = history.recent();
    if terms.is_empty() {
        println!("No recent searches");
    } else {
        println!("Recent searches ({}):", terms.len());
        for term in terms {
            println!("  {}", term);
        }
    }

    Ok(())
}
