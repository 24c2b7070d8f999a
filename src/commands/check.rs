//! Validate content files

use anyhow::Result;

use crate::content::{ContentLoader, ContentSource, FsSource};
use crate::Folio;

/// Parse every content file and report the ones the reader would skip.
/// Exits with an error when any file is invalid.
pub fn run(folio: &Folio) -> Result<()> {
    let files = FsSource.list_files(&folio.content_dir)?;
    if files.is_empty() {
        println!("No content files under {:?}", folio.content_dir);
        return Ok(());
    }

    let loader = ContentLoader::new(FsSource);
    let mut ok = 0usize;
    let mut failed = 0usize;
    let mut slugs: Vec<(String, String)> = Vec::new();

    for path in &files {
        match loader.load_post(&folio.content_dir, path) {
            Ok(post) => {
                if let Some((_, first)) = slugs.iter().find(|(s, _)| *s == post.slug) {
                    println!(
                        "warn  {}: duplicate slug '{}' (also {})",
                        post.source, post.slug, first
                    );
                }
                slugs.push((post.slug.clone(), post.source.clone()));
                ok += 1;
            }
            Err(e) => {
                println!("error {}", e);
                failed += 1;
            }
        }
    }

    println!("{} ok, {} invalid", ok, failed);
    if failed > 0 {
        anyhow::bail!("{} content file(s) would be skipped", failed);
    }

    Ok(())
}
