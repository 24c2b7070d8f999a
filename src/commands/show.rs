//! Show one post with its rendered outline

use anyhow::Result;

use crate::render::RenderPipeline;
use crate::Folio;

/// Print the metadata and heading outline of a post
pub fn run(folio: &Folio, slug: &str) -> Result<()> {
    let store = folio.store();

    let Some(post) = store.get(slug)? else {
        anyhow::bail!("no post with slug '{}'", slug);
    };

    println!("{}", post.title);
    println!("  slug:      {}", post.slug);
    println!("  published: {}", post.published_at.format("%Y-%m-%d"));
    if let Some(category) = &post.category {
        println!("  category:  {}", category);
    }
    if !post.tags.is_empty() {
        println!("  tags:      {}", post.tags.join(", "));
    }
    if let Some(image) = &post.cover_image {
        println!("  cover:     {}", image);
    }
    println!("  source:    {}", post.source);

    let blocks = folio.pipeline().render(&post.body);
    let toc = RenderPipeline::toc(&blocks);
    if !toc.is_empty() {
        println!("\nOutline:");
        for entry in toc {
            let indent = "  ".repeat(entry.level as usize);
            println!("{}#{} {}", indent, entry.id, entry.text);
        }
    }

    Ok(())
}
