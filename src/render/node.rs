//! Typed render tree
//!
//! The pipeline renders a markdown body into a tree of [`Block`] nodes. The
//! presentation layer maps each node kind to a visual component; the tree is
//! serializable so the HTTP layer can return it as JSON.

use serde::{Deserialize, Serialize};

/// One block-level node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Paragraph {
        children: Vec<Inline>,
    },
    /// Heading levels 1-3; deeper source headings are clamped to 3.
    /// `id` is the anchor identifier a table of contents links to.
    Heading {
        level: u8,
        id: String,
        children: Vec<Inline>,
    },
    List {
        ordered: bool,
        items: Vec<Vec<Block>>,
    },
    BlockQuote {
        children: Vec<Block>,
    },
    /// Fenced code block. `html` carries syntect output when the language is
    /// known; `None` means the presentation layer shows the raw code escaped.
    CodeBlock {
        language: Option<String>,
        code: String,
        html: Option<String>,
    },
    Table {
        header: Vec<Vec<Inline>>,
        rows: Vec<Vec<Vec<Inline>>>,
    },
    Rule,
    /// Terminal transcript embed: an ordered list of command strings
    Terminal {
        commands: Vec<String>,
    },
    /// File tree embed
    FileTree {
        root: TreeNode,
    },
    /// Fallback for input the pipeline cannot represent; `text` is already
    /// HTML-escaped.
    Literal {
        text: String,
    },
}

/// One inline span inside a paragraph, heading or table cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text {
        text: String,
    },
    Emphasis {
        children: Vec<Inline>,
    },
    Strong {
        children: Vec<Inline>,
    },
    Strikethrough {
        children: Vec<Inline>,
    },
    Code {
        code: String,
    },
    /// `external` is set for absolute http(s) targets so the presentation
    /// layer can add rel/target safety attributes.
    Link {
        href: String,
        external: bool,
        children: Vec<Inline>,
    },
    Image {
        src: String,
        alt: String,
    },
}

/// A node in a file-tree embed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: TreeNodeKind,
    #[serde(default)]
    pub children: Vec<TreeNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeNodeKind {
    #[default]
    File,
    Directory,
}

/// One table-of-contents entry extracted from a rendered tree
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TocEntry {
    pub level: u8,
    pub id: String,
    pub text: String,
}

/// Concatenate the plain text of a run of inline nodes
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text { text } => out.push_str(text),
            Inline::Code { code } => out.push_str(code),
            Inline::Emphasis { children }
            | Inline::Strong { children }
            | Inline::Strikethrough { children }
            | Inline::Link { children, .. } => out.push_str(&plain_text(children)),
            Inline::Image { alt, .. } => out.push_str(alt),
        }
    }
    out
}

/// Simple HTML escaping for literal fallback blocks
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_flattens_nesting() {
        let inlines = vec![
            Inline::Text { text: "a ".into() },
            Inline::Strong {
                children: vec![Inline::Text { text: "b".into() }],
            },
            Inline::Code { code: " c".into() },
        ];
        assert_eq!(plain_text(&inlines), "a b c");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("<b>&\"'"), "&lt;b&gt;&amp;&quot;&#39;");
    }

    #[test]
    fn test_tree_node_from_yaml() {
        let yaml = r#"
name: src
type: directory
children:
  - name: main.rs
  - name: render
    type: directory
    children:
      - name: node.rs
"#;
        let node: TreeNode = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(node.name, "src");
        assert_eq!(node.kind, TreeNodeKind::Directory);
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].kind, TreeNodeKind::File);
    }
}
