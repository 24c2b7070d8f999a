//! folio: content engine for a file-based portfolio and blog site
//!
//! Discovers Markdown/MDX content files with YAML front-matter, exposes a
//! typed query API over them, renders bodies into a typed block tree with
//! syntax-highlighted code and custom embeds, and serves the result over a
//! small JSON read API.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod render;
pub mod server;

use anyhow::Result;
use std::path::Path;

use content::{FsSource, PostStore};
use render::RenderPipeline;

/// The main application: configuration plus resolved directories.
/// Constructed once at startup and passed to consumers.
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Content directory
    pub content_dir: std::path::PathBuf,
    /// Static assets directory
    pub assets_dir: std::path::PathBuf,
}

impl Folio {
    /// Create an instance from a site directory, reading `folio.yml` if
    /// present and falling back to defaults otherwise.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("folio.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let content_dir = base_dir.join(&config.content_dir);
        let assets_dir = base_dir.join(&config.assets_dir);

        Ok(Self {
            config,
            base_dir,
            content_dir,
            assets_dir,
        })
    }

    /// Build a post store over the site's content directory
    pub fn store(&self) -> PostStore<FsSource> {
        PostStore::new(FsSource, self.content_dir.clone())
    }

    /// Build a render pipeline with the configured highlight theme
    pub fn pipeline(&self) -> RenderPipeline {
        RenderPipeline::with_theme(&self.config.highlight_theme)
    }
}
