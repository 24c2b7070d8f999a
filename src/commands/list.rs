//! List site content

use anyhow::Result;

use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let store = folio.store();

    match content_type {
        "post" | "posts" => {
            let posts = store.list_all()?;
            println!("Posts ({}):", posts.len());
            for post in posts {
                let category = post.category.as_deref().unwrap_or("-");
                println!(
                    "  {} - {} [{}] ({})",
                    post.published_at.format("%Y-%m-%d"),
                    post.title,
                    post.slug,
                    category
                );
            }
        }
        "category" | "categories" => {
            let categories = store.categories()?;
            println!("Categories ({}):", categories.len());
            for category in &categories {
                let count = store.list_by_category(category)?.len();
                println!("  {} ({})", category, count);
            }
        }
        "tag" | "tags" => {
            let tags = store.tags()?;
            println!("Tags ({}):", tags.len());
            for (tag, count) in tags {
                println!("  {} ({})", tag, count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category, tag",
                content_type
            );
        }
    }

    Ok(())
}
