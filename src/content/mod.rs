//! Content pipeline: reading, parsing and querying posts

mod frontmatter;
pub mod loader;
mod post;
mod source;
mod store;

pub use frontmatter::FrontMatter;
pub use loader::ContentLoader;
pub use post::Post;
pub use source::{is_content_file, ContentSource, FsSource, MemorySource};
pub use store::PostStore;
