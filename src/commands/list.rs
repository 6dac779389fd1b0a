//! List posts, tags or categories from the post index

use anyhow::Result;
use std::collections::HashMap;

use crate::content::PostIndex;
use crate::filter::{apply_filters, FilterCriteria};
use crate::Blog;

/// List index content by type, narrowed by `criteria`
pub async fn run(blog: &Blog, content_type: &str, criteria: &FilterCriteria, json: bool) -> Result<()> {
    let ctx = blog.context();
    let index = PostIndex::load(&*ctx.source, &blog.config.index_file).await?;
    let posts = apply_filters(index.posts(), criteria);

    match content_type {
        "post" | "posts" => {
            if json {
                println!("{}", serde_json::to_string_pretty(&posts)?);
                return Ok(());
            }
            println!("Posts ({} of {}):", posts.len(), index.len());
            for post in posts {
                let category = post
                    .category
                    .as_deref()
                    .map(|c| format!(" ({})", c))
                    .unwrap_or_default();
                println!("  {} - {}{} [{}]", post.date, post.title, category, post.file);
            }
        }
        "tag" | "tags" => {
            let counts = count(posts.iter().flat_map(|p| p.tags.iter()));
            print_counts("Tags", counts, json)?;
        }
        "category" | "categories" => {
            let counts = count(posts.iter().filter_map(|p| p.category.as_ref()));
            print_counts("Categories", counts, json)?;
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, tag, category",
                content_type
            );
        }
    }

    Ok(())
}

/// Occurrences per value, most used first then alphabetical
fn count<'a>(values: impl Iterator<Item = &'a String>) -> Vec<(&'a str, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value.as_str()).or_insert(0) += 1;
    }
    let mut counts: Vec<_> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    counts
}

fn print_counts(label: &str, counts: Vec<(&str, usize)>, json: bool) -> Result<()> {
    if json {
        let map: indexmap::IndexMap<&str, usize> = counts.into_iter().collect();
        println!("{}", serde_json::to_string_pretty(&map)?);
        return Ok(());
    }
    println!("{} ({}):", label, counts.len());
    for (value, n) in counts {
        println!("  {} ({})", value, n);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_orders_by_use() {
        let tags = vec![
            "rust".to_string(),
            "go".to_string(),
            "rust".to_string(),
            "axum".to_string(),
        ];
        assert_eq!(count(tags.iter()), vec![("rust", 2), ("axum", 1), ("go", 1)]);
    }

    #[tokio::test]
    async fn test_missing_index_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert!(run(&blog, "post", &FilterCriteria::new(), false).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_type() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("posts.json"), "[]").unwrap();
        let blog = Blog::new(dir.path()).unwrap();
        assert!(run(&blog, "route", &FilterCriteria::new(), false).await.is_err());
        assert!(run(&blog, "tags", &FilterCriteria::new(), true).await.is_ok());
    }
}
