//! Content loader - reads posts from a content directory

use anyhow::Result;
use std::path::Path;

use super::{ContentSource, FrontMatter, Post};
use crate::error::ContentError;

/// Reads content files through a [`ContentSource`] and parses them into posts
pub struct ContentLoader<S: ContentSource> {
    source: S,
}

impl<S: ContentSource> ContentLoader<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Load all posts under `dir`.
    ///
    /// Per-file failures (undecodable text, malformed front-matter, bad
    /// dates) are logged and skipped; only a directory-level enumeration
    /// failure propagates. A missing directory yields an empty list.
    ///
    /// Output order is the source enumeration order; callers sort.
    pub fn load_posts(&self, dir: &Path) -> Result<Vec<Post>> {
        let mut posts: Vec<Post> = Vec::new();

        for path in self.source.list_files(dir)? {
            match self.load_post(dir, &path) {
                Ok(post) => {
                    if let Some(existing) =
                        posts.iter_mut().find(|p| p.slug == post.slug)
                    {
                        tracing::warn!(
                            "duplicate slug '{}': {} replaces {}",
                            post.slug,
                            post.source,
                            existing.source
                        );
                        *existing = post;
                    } else {
                        posts.push(post);
                    }
                }
                Err(e) => {
                    tracing::warn!("skipping content file: {}", e);
                }
            }
        }

        Ok(posts)
    }

    /// Load a single post from a file
    pub fn load_post(&self, dir: &Path, path: &Path) -> Result<Post, ContentError> {
        let content = self.source.read_file(path).map_err(|source| ContentError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (fm, body) =
            FrontMatter::parse(&content).map_err(|e| ContentError::MalformedFrontMatter {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        // Posts without a parseable date are excluded, uniformly.
        let published_at = fm
            .parse_published_at()
            .ok_or_else(|| ContentError::InvalidDate {
                path: path.to_path_buf(),
            })?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        let slug = slug::slugify(stem);

        let title = fm.title.unwrap_or_else(|| stem.to_string());

        let source = path
            .strip_prefix(dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        let mut post = Post::new(slug, title, published_at);
        post.description = fm.description.unwrap_or_default();
        post.category = fm.category.filter(|c| !c.is_empty());
        post.tags = fm.tags;
        post.cover_image = fm.cover_image;
        post.body = body.to_string();
        post.source = source;
        post.extra = fm.extra;

        Ok(post)
    }
}
