//! Build the JSON post index from the pages directory

use anyhow::Result;
use std::fs;

use crate::content::loader::ContentLoader;
use crate::content::PostIndex;
use crate::Blog;

/// Scan the pages directory and print the index, or write it when `write` is set
pub fn run(blog: &Blog, write: bool) -> Result<()> {
    let index = build(blog)?;
    let json = index.to_json()?;

    if write {
        if let Some(parent) = blog.index_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&blog.index_path, format!("{}\n", json))?;
        println!(
            "Wrote {} posts to {}",
            index.len(),
            blog.index_path.display()
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

/// Summaries for every Markdown file, newest first
pub fn build(blog: &Blog) -> Result<PostIndex> {
    let loader = ContentLoader::new(&blog.pages_dir, blog.markdown());
    let posts = loader.load_summaries()?;
    tracing::info!("Indexed {} posts from {:?}", posts.len(), blog.pages_dir);
    Ok(PostIndex::new(posts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_index() {
        let dir = TempDir::new().unwrap();
        let pages = dir.path().join("pages");
        fs::create_dir_all(&pages).unwrap();
        fs::write(
            pages.join("older.md"),
            "---\ntitle: Older\ndate: 2023-05-01\ntags: [go]\n---\nOld body",
        )
        .unwrap();
        fs::write(
            pages.join("newer.md"),
            "---\ntitle: Newer\ndate: 2024-05-01\ncategory: dev\n---\nNew body",
        )
        .unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        run(&blog, true).unwrap();

        let json = fs::read_to_string(dir.path().join("posts.json")).unwrap();
        let index = PostIndex::parse("posts.json", &json).unwrap();
        let files: Vec<_> = index.posts().iter().map(|p| p.file.as_str()).collect();
        assert_eq!(files, vec!["newer.md", "older.md"]);
        assert_eq!(index.posts()[0].category.as_deref(), Some("dev"));
        assert_eq!(index.posts()[1].tags, vec!["go"]);
    }

    #[test]
    fn test_missing_pages_dir_gives_empty_index() {
        let dir = TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert!(build(&blog).unwrap().is_empty());
    }
}
