//! Post store - the query surface over loaded content
//!
//! Caching policy: the parsed collection is cached after the first load and
//! reused until [`PostStore::invalidate`] is called. The serve command wires
//! a file watcher to the invalidation hook; one-shot CLI commands construct a
//! fresh store per invocation and so always see current disk state.

use anyhow::Result;
use indexmap::{IndexMap, IndexSet};
use std::path::PathBuf;
use std::sync::RwLock;

use super::{ContentLoader, ContentSource, Post};

/// Read-only query service over the content collection
pub struct PostStore<S: ContentSource> {
    loader: ContentLoader<S>,
    content_dir: PathBuf,
    cache: RwLock<Option<Vec<Post>>>,
}

impl<S: ContentSource> PostStore<S> {
    pub fn new(source: S, content_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader: ContentLoader::new(source),
            content_dir: content_dir.into(),
            cache: RwLock::new(None),
        }
    }

    /// All posts, newest first. Ties on the date keep their enumeration
    /// order (stable sort).
    pub fn list_all(&self) -> Result<Vec<Post>> {
        self.loaded()
    }

    /// Posts in the given category, same ordering as [`list_all`].
    /// An unknown category yields an empty list.
    ///
    /// [`list_all`]: PostStore::list_all
    pub fn list_by_category(&self, category: &str) -> Result<Vec<Post>> {
        let posts = self.loaded()?;
        Ok(posts
            .into_iter()
            .filter(|p| p.category.as_deref() == Some(category))
            .collect())
    }

    /// Look up one post by slug. A missing slug is `None`, not an error.
    pub fn get(&self, slug: &str) -> Result<Option<Post>> {
        let posts = self.loaded()?;
        Ok(posts.into_iter().find(|p| p.slug == slug))
    }

    /// Distinct non-empty categories, in first-seen order over the sorted
    /// collection (deterministic for a given set of files).
    pub fn categories(&self) -> Result<Vec<String>> {
        let posts = self.loaded()?;
        let mut set = IndexSet::new();
        for post in &posts {
            if let Some(category) = &post.category {
                set.insert(category.clone());
            }
        }
        Ok(set.into_iter().collect())
    }

    /// Distinct tags with post counts, in first-seen order
    pub fn tags(&self) -> Result<Vec<(String, usize)>> {
        let posts = self.loaded()?;
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for post in &posts {
            for tag in &post.tags {
                *counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }

    /// Drop the cached collection; the next query re-reads the source
    pub fn invalidate(&self) {
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        *cache = None;
        tracing::debug!("post cache invalidated");
    }

    /// Invalidate and immediately re-read
    pub fn reload(&self) -> Result<Vec<Post>> {
        self.invalidate();
        self.loaded()
    }

    fn loaded(&self) -> Result<Vec<Post>> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(posts) = cache.as_ref() {
                return Ok(posts.clone());
            }
        }

        let mut posts = self.loader.load_posts(&self.content_dir)?;
        // Stable: equal dates keep source enumeration order
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        *cache = Some(posts.clone());
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::MemorySource;
    use std::path::Path;

    fn post_file(title: &str, date: &str, category: Option<&str>) -> String {
        let category_line = category
            .map(|c| format!("category: {}\n", c))
            .unwrap_or_default();
        format!(
            "---\ntitle: {}\ndescription: d\npublishedAt: {}\n{}---\nBody.",
            title, date, category_line
        )
    }

    fn sample_store() -> PostStore<MemorySource> {
        let mut source = MemorySource::new();
        source.insert("content/june.mdx", post_file("June", "2025-06-01", Some("notes")));
        source.insert("content/july.mdx", post_file("July", "2025-07-13", Some("projects")));
        source.insert("content/august.mdx", post_file("August", "2025-08-29", Some("notes")));
        source.insert("content/undated.mdx", post_file("Undated", "not-a-date", None));
        PostStore::new(source, "content")
    }

    #[test]
    fn test_list_all_newest_first() {
        let store = sample_store();
        let posts = store.list_all().unwrap();
        let dates: Vec<String> = posts
            .iter()
            .map(|p| p.published_at.format("%Y-%m-%d").to_string())
            .collect();
        assert_eq!(dates, vec!["2025-08-29", "2025-07-13", "2025-06-01"]);
    }

    #[test]
    fn test_get_returns_listed_post() {
        let store = sample_store();
        for post in store.list_all().unwrap() {
            let found = store.get(&post.slug).unwrap().unwrap();
            assert_eq!(found.title, post.title);
        }
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_by_category() {
        let store = sample_store();
        let notes = store.list_by_category("notes").unwrap();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().all(|p| p.category.as_deref() == Some("notes")));
        // subset of list_all, same relative order
        assert_eq!(notes[0].title, "August");
        assert_eq!(notes[1].title, "June");

        assert!(store.list_by_category("nonexistent").unwrap().is_empty());
    }

    #[test]
    fn test_categories_distinct_deterministic() {
        let store = sample_store();
        let first = store.categories().unwrap();
        assert_eq!(first, vec!["notes".to_string(), "projects".to_string()]);
        assert_eq!(store.categories().unwrap(), first);
    }

    #[test]
    fn test_empty_directory_yields_empty_list() {
        let store = PostStore::new(MemorySource::new(), "content");
        assert!(store.list_all().unwrap().is_empty());
        assert!(store.categories().unwrap().is_empty());
    }

    #[test]
    fn test_stable_order_for_equal_dates() {
        let mut source = MemorySource::new();
        source.insert("content/a-first.mdx", post_file("A", "2025-05-05", None));
        source.insert("content/b-second.mdx", post_file("B", "2025-05-05", None));

        let store = PostStore::new(source, "content");
        let posts = store.list_all().unwrap();
        assert_eq!(posts[0].title, "A");
        assert_eq!(posts[1].title, "B");
    }

    #[test]
    fn test_tags_counts() {
        let mut source = MemorySource::new();
        source.insert(
            "content/a.mdx",
            "---\ntitle: A\npublishedAt: 2025-01-01\ntags: [rust, blog]\n---\n",
        );
        source.insert(
            "content/b.mdx",
            "---\ntitle: B\npublishedAt: 2025-01-02\ntags: [rust]\n---\n",
        );

        let store = PostStore::new(source, "content");
        let tags = store.tags().unwrap();
        assert_eq!(tags, vec![("rust".to_string(), 2), ("blog".to_string(), 1)]);
    }

    #[test]
    fn test_invalidate_rereads() {
        let store = sample_store();
        assert_eq!(store.list_all().unwrap().len(), 3);
        // Cached result is reused until invalidated
        store.invalidate();
        assert_eq!(store.reload().unwrap().len(), 3);
    }
}
