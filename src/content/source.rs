//! Narrow filesystem interface for the content reader
//!
//! The loader only needs to enumerate content files and read them as text.
//! Keeping that behind a trait lets tests run against an in-memory source
//! instead of real disk.

use anyhow::Result;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read-only access to content files
pub trait ContentSource {
    /// Enumerate content files under `dir`, in a deterministic order.
    /// A missing directory yields an empty list, not an error.
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Read one file as UTF-8 text
    fn read_file(&self, path: &Path) -> io::Result<String>;
}

/// Content source backed by the real filesystem
pub struct FsSource;

impl ContentSource for FsSource {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_content_file(path) {
                files.push(path.to_path_buf());
            }
        }

        // Directory iteration order is OS-dependent; sort so that the
        // duplicate-slug last-wins policy is reproducible.
        files.sort();
        Ok(files)
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path)
    }
}

/// In-memory content source, used in tests
#[derive(Default)]
pub struct MemorySource {
    files: BTreeMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }
}

impl ContentSource for MemorySource {
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        Ok(self
            .files
            .keys()
            .filter(|p| p.starts_with(dir) && is_content_file(p))
            .cloned()
            .collect())
    }

    fn read_file(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

/// Check whether a file has a recognized content extension
pub fn is_content_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "mdx" || e == "md")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_content_file() {
        assert!(is_content_file(Path::new("posts/hello.mdx")));
        assert!(is_content_file(Path::new("posts/hello.md")));
        assert!(!is_content_file(Path::new("posts/hello.txt")));
        assert!(!is_content_file(Path::new("posts/hello")));
    }

    #[test]
    fn test_fs_source_missing_dir() {
        let files = FsSource.list_files(Path::new("/nonexistent/content")).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_memory_source_lists_only_content_files() {
        let mut source = MemorySource::new();
        source.insert("content/a.mdx", "---\n---\n");
        source.insert("content/b.txt", "not content");

        let files = source.list_files(Path::new("content")).unwrap();
        assert_eq!(files, vec![PathBuf::from("content/a.mdx")]);
    }
}
