//! Custom embed handlers
//!
//! Embeds are written as fenced code blocks whose info string names the
//! embed, so the body stays valid CommonMark:
//!
//! ````text
//! ```terminal
//! cargo build
//! cargo test
//! ```
//! ````
//!
//! The pipeline parses the fence body into structured arguments and
//! dispatches through a handler table registered at construction. Handlers
//! are overridable per name without touching the traversal.

use anyhow::{anyhow, Result};
use std::collections::HashMap;

use super::node::{Block, TreeNode};

/// Renders one embed kind from the parsed fence body
pub trait EmbedHandler: Send + Sync {
    fn render(&self, body: &str) -> Result<Block>;
}

/// Terminal transcript: one command per non-empty line
pub struct TerminalEmbed;

impl EmbedHandler for TerminalEmbed {
    fn render(&self, body: &str) -> Result<Block> {
        let commands: Vec<String> = body
            .lines()
            .map(str::trim_end)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        if commands.is_empty() {
            return Err(anyhow!("terminal embed has no commands"));
        }
        Ok(Block::Terminal { commands })
    }
}

/// File tree: a YAML name/type/children structure
pub struct FileTreeEmbed;

impl EmbedHandler for FileTreeEmbed {
    fn render(&self, body: &str) -> Result<Block> {
        let root: TreeNode = serde_yaml::from_str(body)
            .map_err(|e| anyhow!("invalid filetree embed: {}", e))?;
        Ok(Block::FileTree { root })
    }
}

/// Capability table mapping embed names to handlers
pub struct EmbedRegistry {
    handlers: HashMap<String, Box<dyn EmbedHandler>>,
}

impl EmbedRegistry {
    /// Empty registry with no handlers
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with the built-in `terminal` and `filetree` handlers
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register("terminal", TerminalEmbed);
        registry.register("filetree", FileTreeEmbed);
        registry
    }

    /// Register or override a handler by name
    pub fn register(&mut self, name: &str, handler: impl EmbedHandler + 'static) {
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    pub fn get(&self, name: &str) -> Option<&dyn EmbedHandler> {
        self.handlers.get(name).map(|h| h.as_ref())
    }
}

impl Default for EmbedRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
