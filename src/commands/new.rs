//! Create a new content file

use anyhow::Result;
use chrono::Local;
use std::fs;

use crate::content::Post;
use crate::Folio;

/// Scaffold a new post in the content directory
pub fn run(folio: &Folio, title: &str, category: Option<&str>) -> Result<()> {
    let slug = slug::slugify(title);
    let today = Local::now().date_naive();

    let mut post = Post::new(slug.clone(), title.to_string(), today);
    post.category = category.map(String::from);

    let file_path = folio.content_dir.join(format!("{}.mdx", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::create_dir_all(&folio.content_dir)?;
    fs::write(&file_path, post.to_front_matter())?;

    println!("Created: {:?}", file_path);

    Ok(())
}
