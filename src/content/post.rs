//! Post model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single piece of published content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// URL-safe identifier derived from the source file name
    pub slug: String,

    /// Post title
    pub title: String,

    /// Short summary shown in listings
    pub description: String,

    /// Publication date, used for ordering
    pub published_at: NaiveDate,

    /// Optional category; `None` means uncategorized
    pub category: Option<String>,

    /// Ordered tag labels
    pub tags: Vec<String>,

    /// Optional path to a cover image
    pub cover_image: Option<String>,

    /// Raw markdown body
    pub body: String,

    /// Source file path relative to the content directory
    pub source: String,

    /// Custom front-matter fields, retained but not interpreted
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a post with minimal required fields
    pub fn new(slug: String, title: String, published_at: NaiveDate) -> Self {
        Self {
            slug,
            title,
            description: String::new(),
            published_at,
            category: None,
            tags: Vec::new(),
            cover_image: None,
            body: String::new(),
            source: String::new(),
            extra: HashMap::new(),
        }
    }

    /// Serialize the post back to the content file format: a YAML
    /// front-matter block followed by the raw body.
    pub fn to_front_matter(&self) -> String {
        let mut map = serde_yaml::Mapping::new();
        map.insert("title".into(), self.title.clone().into());
        map.insert("description".into(), self.description.clone().into());
        map.insert(
            "publishedAt".into(),
            self.published_at.format("%Y-%m-%d").to_string().into(),
        );
        if let Some(category) = &self.category {
            map.insert("category".into(), category.clone().into());
        }
        if !self.tags.is_empty() {
            let tags: Vec<serde_yaml::Value> =
                self.tags.iter().map(|t| t.clone().into()).collect();
            map.insert("tags".into(), serde_yaml::Value::Sequence(tags));
        }
        if let Some(image) = &self.cover_image {
            map.insert("coverImage".into(), image.clone().into());
        }

        // Mapping serialization cannot fail for string/sequence values
        let yaml = serde_yaml::to_string(&map).unwrap_or_default();
        format!("---\n{}---\n\n{}", yaml, self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_front_matter_format() {
        let mut post = Post::new(
            "hello-world".to_string(),
            "Hello World".to_string(),
            NaiveDate::from_ymd_opt(2025, 8, 29).unwrap(),
        );
        post.description = "A greeting".to_string();
        post.tags = vec!["intro".to_string()];
        post.body = "Some *markdown*.".to_string();

        let text = post.to_front_matter();
        assert!(text.starts_with("---\n"));
        assert!(text.contains("title: Hello World"));
        assert!(
            text.contains("publishedAt: '2025-08-29'")
                || text.contains("publishedAt: 2025-08-29")
        );
        assert!(text.ends_with("Some *markdown*."));
    }
}
