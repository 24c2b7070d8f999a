//! Render pipeline: markdown body to typed block tree
//!
//! Built on pulldown-cmark events. Fenced code blocks whose info string
//! names a registered embed are dispatched through the embed handler table;
//! every other fence goes through syntect highlighting.

mod embed;
mod highlight;
mod node;

pub use embed::{EmbedHandler, EmbedRegistry, FileTreeEmbed, TerminalEmbed};
pub use highlight::Highlighter;
pub use node::{html_escape, plain_text, Block, Inline, TocEntry, TreeNode, TreeNodeKind};

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

/// Markdown to [`Block`] tree renderer
pub struct RenderPipeline {
    highlighter: Highlighter,
    embeds: EmbedRegistry,
}

impl RenderPipeline {
    pub fn new() -> Self {
        Self::with_theme("base16-ocean.dark")
    }

    pub fn with_theme(theme: &str) -> Self {
        Self {
            highlighter: Highlighter::new(theme),
            embeds: EmbedRegistry::with_defaults(),
        }
    }

    /// Register or override an embed handler by name
    pub fn register_embed(&mut self, name: &str, handler: impl EmbedHandler + 'static) {
        self.embeds.register(name, handler);
    }

    /// Render a markdown body into a block tree
    pub fn render(&self, markdown: &str) -> Vec<Block> {
        let options = Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_HEADING_ATTRIBUTES;
        let parser = Parser::new_ext(markdown, options);
        TreeBuilder::new(self).run(parser)
    }

    /// Extract a table of contents from a rendered tree
    pub fn toc(blocks: &[Block]) -> Vec<TocEntry> {
        let mut out = Vec::new();
        collect_toc(blocks, &mut out);
        out
    }

    /// Derive a heading anchor identifier from its text: lowercase,
    /// whitespace to hyphens, non-word characters stripped, consecutive
    /// hyphens collapsed. Deterministic for the same text.
    pub fn heading_id(text: &str) -> String {
        slug::slugify(text)
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new()
    }
}

fn collect_toc(blocks: &[Block], out: &mut Vec<TocEntry>) {
    for block in blocks {
        match block {
            Block::Heading {
                level,
                id,
                children,
            } => out.push(TocEntry {
                level: *level,
                id: id.clone(),
                text: plain_text(children),
            }),
            Block::BlockQuote { children } => collect_toc(children, out),
            Block::List { items, .. } => {
                for item in items {
                    collect_toc(item, out);
                }
            }
            _ => {}
        }
    }
}

/// What an open block container closes into
enum ContainerKind {
    Document,
    Quote,
    Item,
}

/// What an open inline frame closes into
enum InlineKind {
    /// Paragraph, heading or table-cell run
    Run,
    /// Bare text directly inside a list item (tight list)
    ItemRun,
    Emphasis,
    Strong,
    Strikethrough,
    Link { href: String },
}

struct ListCtx {
    ordered: bool,
    items: Vec<Vec<Block>>,
}

struct CodeCtx {
    lang: Option<String>,
    text: String,
}

struct ImageCtx {
    src: String,
    alt: String,
}

#[derive(Default)]
struct TableCtx {
    in_head: bool,
    header: Vec<Vec<Inline>>,
    rows: Vec<Vec<Vec<Inline>>>,
    current_row: Vec<Vec<Inline>>,
}

struct HeadingCtx {
    level: u8,
    explicit_id: Option<String>,
}

/// Builds the block tree from the event stream
struct TreeBuilder<'a> {
    pipeline: &'a RenderPipeline,
    containers: Vec<(ContainerKind, Vec<Block>)>,
    inlines: Vec<(InlineKind, Vec<Inline>)>,
    lists: Vec<ListCtx>,
    images: Vec<ImageCtx>,
    heading: Option<HeadingCtx>,
    code: Option<CodeCtx>,
    table: Option<TableCtx>,
}

impl<'a> TreeBuilder<'a> {
    fn new(pipeline: &'a RenderPipeline) -> Self {
        Self {
            pipeline,
            containers: vec![(ContainerKind::Document, Vec::new())],
            inlines: Vec::new(),
            lists: Vec::new(),
            images: Vec::new(),
            heading: None,
            code: None,
            table: None,
        }
    }

    fn run(mut self, parser: Parser) -> Vec<Block> {
        for event in parser {
            self.handle(event);
        }
        // Top container is always the document
        self.containers
            .pop()
            .map(|(_, blocks)| blocks)
            .unwrap_or_default()
    }

    fn handle(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),

            Event::Text(text) => {
                if let Some(code) = &mut self.code {
                    code.text.push_str(&text);
                } else if let Some(image) = self.images.last_mut() {
                    image.alt.push_str(&text);
                } else {
                    self.push_inline(Inline::Text {
                        text: text.to_string(),
                    });
                }
            }
            Event::Code(code) => {
                if let Some(image) = self.images.last_mut() {
                    image.alt.push_str(&code);
                } else {
                    self.push_inline(Inline::Code {
                        code: code.to_string(),
                    });
                }
            }
            Event::SoftBreak => self.push_inline(Inline::Text { text: " ".into() }),
            Event::HardBreak => self.push_inline(Inline::Text { text: "\n".into() }),
            Event::Rule => self.push_block(Block::Rule),

            // Raw HTML has no typed representation; degrade to escaped text
            Event::Html(html) => self.push_block(Block::Literal {
                text: html_escape(&html),
            }),
            Event::InlineHtml(html) => self.push_inline(Inline::Text {
                text: html.to_string(),
            }),

            _ => {}
        }
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                self.flush_item_run();
                self.inlines.push((InlineKind::Run, Vec::new()));
            }
            Tag::Heading { level, id, .. } => {
                self.flush_item_run();
                self.heading = Some(HeadingCtx {
                    level: (level as u8).min(3),
                    explicit_id: id.map(|s| s.to_string()),
                });
                self.inlines.push((InlineKind::Run, Vec::new()));
            }
            Tag::BlockQuote(_) => {
                self.flush_item_run();
                self.containers.push((ContainerKind::Quote, Vec::new()));
            }
            Tag::CodeBlock(kind) => {
                self.flush_item_run();
                let lang = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let token = info
                            .split([' ', ',', '\t'])
                            .next()
                            .unwrap_or("")
                            .to_string();
                        if token.is_empty() {
                            None
                        } else {
                            Some(token)
                        }
                    }
                    CodeBlockKind::Indented => None,
                };
                self.code = Some(CodeCtx {
                    lang,
                    text: String::new(),
                });
            }
            Tag::List(start) => {
                self.flush_item_run();
                self.lists.push(ListCtx {
                    ordered: start.is_some(),
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                self.containers.push((ContainerKind::Item, Vec::new()));
                self.inlines.push((InlineKind::ItemRun, Vec::new()));
            }
            Tag::Table(_) => {
                self.table = Some(TableCtx::default());
            }
            Tag::TableHead => {
                if let Some(table) = &mut self.table {
                    table.in_head = true;
                }
            }
            Tag::TableRow => {}
            Tag::TableCell => {
                self.inlines.push((InlineKind::Run, Vec::new()));
            }
            Tag::Emphasis => self.inlines.push((InlineKind::Emphasis, Vec::new())),
            Tag::Strong => self.inlines.push((InlineKind::Strong, Vec::new())),
            Tag::Strikethrough => self.inlines.push((InlineKind::Strikethrough, Vec::new())),
            Tag::Link { dest_url, .. } => {
                self.inlines.push((
                    InlineKind::Link {
                        href: dest_url.to_string(),
                    },
                    Vec::new(),
                ));
            }
            Tag::Image { dest_url, .. } => {
                self.images.push(ImageCtx {
                    src: dest_url.to_string(),
                    alt: String::new(),
                });
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if let Some((InlineKind::Run, children)) = self.inlines.pop() {
                    self.push_block(Block::Paragraph { children });
                }
            }
            TagEnd::Heading(_) => {
                let children = self.inlines.pop().map(|f| f.1).unwrap_or_default();
                if let Some(ctx) = self.heading.take() {
                    let id = ctx
                        .explicit_id
                        .unwrap_or_else(|| RenderPipeline::heading_id(&plain_text(&children)));
                    self.push_block(Block::Heading {
                        level: ctx.level,
                        id,
                        children,
                    });
                }
            }
            TagEnd::BlockQuote(_) => {
                if let Some((ContainerKind::Quote, children)) = self.containers.pop() {
                    self.push_block(Block::BlockQuote { children });
                }
            }
            TagEnd::CodeBlock => {
                if let Some(ctx) = self.code.take() {
                    let block = self.finish_code_block(ctx);
                    self.push_block(block);
                }
            }
            TagEnd::List(_) => {
                if let Some(list) = self.lists.pop() {
                    self.push_block(Block::List {
                        ordered: list.ordered,
                        items: list.items,
                    });
                }
            }
            TagEnd::Item => {
                self.flush_item_run();
                // Drop the now-empty item run frame
                if matches!(self.inlines.last(), Some((InlineKind::ItemRun, _))) {
                    self.inlines.pop();
                }
                if let Some((ContainerKind::Item, blocks)) = self.containers.pop() {
                    if let Some(list) = self.lists.last_mut() {
                        list.items.push(blocks);
                    }
                }
            }
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.push_block(Block::Table {
                        header: table.header,
                        rows: table.rows,
                    });
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = &mut self.table {
                    table.in_head = false;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = &mut self.table {
                    let row = std::mem::take(&mut table.current_row);
                    table.rows.push(row);
                }
            }
            TagEnd::TableCell => {
                let cell = self.inlines.pop().map(|f| f.1).unwrap_or_default();
                if let Some(table) = &mut self.table {
                    if table.in_head {
                        table.header.push(cell);
                    } else {
                        table.current_row.push(cell);
                    }
                }
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                if let Some((kind, children)) = self.inlines.pop() {
                    let inline = match kind {
                        InlineKind::Emphasis => Inline::Emphasis { children },
                        InlineKind::Strong => Inline::Strong { children },
                        InlineKind::Strikethrough => Inline::Strikethrough { children },
                        InlineKind::Link { href } => {
                            let external = is_external(&href);
                            Inline::Link {
                                href,
                                external,
                                children,
                            }
                        }
                        // Unbalanced frame; restore as plain run content
                        _ => {
                            for child in children {
                                self.push_inline(child);
                            }
                            return;
                        }
                    };
                    self.push_inline(inline);
                }
            }
            TagEnd::Image => {
                if let Some(image) = self.images.pop() {
                    self.push_inline(Inline::Image {
                        src: image.src,
                        alt: image.alt,
                    });
                }
            }
            _ => {}
        }
    }

    /// Close a fenced code block: dispatch to a registered embed handler if
    /// the info string names one, otherwise highlight.
    fn finish_code_block(&self, ctx: CodeCtx) -> Block {
        if let Some(lang) = &ctx.lang {
            if let Some(handler) = self.pipeline.embeds.get(lang) {
                return match handler.render(&ctx.text) {
                    Ok(block) => block,
                    Err(e) => {
                        tracing::warn!("embed '{}' failed: {}", lang, e);
                        Block::Literal {
                            text: html_escape(&ctx.text),
                        }
                    }
                };
            }
        }

        let html = self
            .pipeline
            .highlighter
            .highlight(&ctx.text, ctx.lang.as_deref());
        Block::CodeBlock {
            language: ctx.lang,
            code: ctx.text,
            html,
        }
    }

    /// Bare text in a tight list item has no paragraph tags; flush it as a
    /// paragraph before any nested block opens and when the item closes.
    fn flush_item_run(&mut self) {
        let taken = match self.inlines.last_mut() {
            Some((InlineKind::ItemRun, children)) if !children.is_empty() => {
                Some(std::mem::take(children))
            }
            _ => None,
        };
        if let Some(children) = taken {
            self.push_block(Block::Paragraph { children });
        }
    }

    fn push_block(&mut self, block: Block) {
        if let Some((_, blocks)) = self.containers.last_mut() {
            blocks.push(block);
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        if let Some((_, frame)) = self.inlines.last_mut() {
            frame.push(inline);
        } else {
            // Stray inline outside any run
            self.push_block(Block::Paragraph {
                children: vec![inline],
            });
        }
    }
}

/// Absolute http(s) targets are external; the presentation layer adds
/// rel/target safety attributes for them.
fn is_external(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://") || href.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(markdown: &str) -> Vec<Block> {
        RenderPipeline::new().render(markdown)
    }

    #[test]
    fn test_paragraph_and_heading() {
        let blocks = render("# Title\n\nSome text.");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Heading { level, id, children } => {
                assert_eq!(*level, 1);
                assert_eq!(id, "title");
                assert_eq!(plain_text(children), "Title");
            }
            other => panic!("unexpected block: {:?}", other),
        }
        assert!(matches!(&blocks[1], Block::Paragraph { .. }));
    }

    #[test]
    fn test_heading_id_derivation() {
        assert_eq!(RenderPipeline::heading_id("Hello, World!"), "hello-world");
        // idempotent
        assert_eq!(RenderPipeline::heading_id("hello-world"), "hello-world");
        assert_eq!(
            RenderPipeline::heading_id("  Spaces   and -- dashes "),
            "spaces-and-dashes"
        );
    }

    #[test]
    fn test_heading_explicit_id_wins() {
        let blocks = render("## Custom {#anchor}");
        match &blocks[0] {
            Block::Heading { id, .. } => assert_eq!(id, "anchor"),
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_deep_heading_clamps_to_three() {
        let blocks = render("##### Deep");
        match &blocks[0] {
            Block::Heading { level, .. } => assert_eq!(*level, 3),
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_code_block_known_language() {
        let blocks = render("```rust\nfn main() {}\n```");
        match &blocks[0] {
            Block::CodeBlock { language, html, .. } => {
                assert_eq!(language.as_deref(), Some("rust"));
                assert!(html.as_ref().unwrap().contains("<span"));
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_code_block_unknown_language_no_markup() {
        let blocks = render("```vexlang\nbeep boop\n```");
        match &blocks[0] {
            Block::CodeBlock { language, code, html } => {
                assert_eq!(language.as_deref(), Some("vexlang"));
                assert_eq!(code, "beep boop\n");
                assert!(html.is_none());
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_terminal_embed() {
        let blocks = render("```terminal\ncargo build\ncargo test\n```");
        assert_eq!(
            blocks[0],
            Block::Terminal {
                commands: vec!["cargo build".to_string(), "cargo test".to_string()]
            }
        );
    }

    #[test]
    fn test_filetree_embed() {
        let blocks = render("```filetree\nname: src\ntype: directory\nchildren:\n  - name: lib.rs\n```");
        match &blocks[0] {
            Block::FileTree { root } => {
                assert_eq!(root.name, "src");
                assert_eq!(root.children[0].name, "lib.rs");
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_failed_embed_degrades_to_literal() {
        let blocks = render("```filetree\n: definitely not yaml [\n```");
        assert!(matches!(&blocks[0], Block::Literal { .. }));
    }

    #[test]
    fn test_custom_embed_override() {
        struct Count;
        impl EmbedHandler for Count {
            fn render(&self, body: &str) -> anyhow::Result<Block> {
                Ok(Block::Paragraph {
                    children: vec![Inline::Text {
                        text: body.lines().count().to_string(),
                    }],
                })
            }
        }

        let mut pipeline = RenderPipeline::new();
        pipeline.register_embed("terminal", Count);
        let blocks = pipeline.render("```terminal\na\nb\n```");
        match &blocks[0] {
            Block::Paragraph { children } => assert_eq!(plain_text(children), "2"),
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_external_link_marked() {
        let blocks = render("[ext](https://example.com) and [int](/about)");
        match &blocks[0] {
            Block::Paragraph { children } => {
                let links: Vec<_> = children
                    .iter()
                    .filter_map(|i| match i {
                        Inline::Link { href, external, .. } => Some((href.clone(), *external)),
                        _ => None,
                    })
                    .collect();
                assert_eq!(
                    links,
                    vec![
                        ("https://example.com".to_string(), true),
                        ("/about".to_string(), false)
                    ]
                );
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_lists_and_nesting() {
        let blocks = render("- one\n- two\n  - nested\n");
        match &blocks[0] {
            Block::List { ordered, items } => {
                assert!(!ordered);
                assert_eq!(items.len(), 2);
                // second item holds its text plus the nested list
                assert!(items[1]
                    .iter()
                    .any(|b| matches!(b, Block::List { .. })));
                match &items[1][0] {
                    Block::Paragraph { children } => assert_eq!(plain_text(children), "two"),
                    other => panic!("unexpected block: {:?}", other),
                }
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_ordered_list() {
        let blocks = render("1. first\n2. second\n");
        assert!(matches!(&blocks[0], Block::List { ordered: true, .. }));
    }

    #[test]
    fn test_blockquote_and_rule() {
        let blocks = render("> quoted text\n\n---\n");
        match &blocks[0] {
            Block::BlockQuote { children } => match &children[0] {
                Block::Paragraph { children } => {
                    assert_eq!(plain_text(children), "quoted text")
                }
                other => panic!("unexpected block: {:?}", other),
            },
            other => panic!("unexpected block: {:?}", other),
        }
        assert_eq!(blocks[1], Block::Rule);
    }

    #[test]
    fn test_table() {
        let markdown = "| Name | Role |\n|------|------|\n| Ada | Engineer |\n| Grace | Admiral |\n";
        let blocks = render(markdown);
        match &blocks[0] {
            Block::Table { header, rows } => {
                assert_eq!(header.len(), 2);
                assert_eq!(plain_text(&header[0]), "Name");
                assert_eq!(rows.len(), 2);
                assert_eq!(plain_text(&rows[1][0]), "Grace");
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_emphasis_strong_inline_code() {
        let blocks = render("*em* **strong** `code`");
        match &blocks[0] {
            Block::Paragraph { children } => {
                assert!(children.iter().any(|i| matches!(i, Inline::Emphasis { .. })));
                assert!(children.iter().any(|i| matches!(i, Inline::Strong { .. })));
                assert!(children.iter().any(|i| matches!(i, Inline::Code { .. })));
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_image() {
        let blocks = render("![alt text](/images/pic.png)");
        match &blocks[0] {
            Block::Paragraph { children } => {
                assert_eq!(
                    children[0],
                    Inline::Image {
                        src: "/images/pic.png".to_string(),
                        alt: "alt text".to_string()
                    }
                );
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_raw_html_is_escaped_literal() {
        let blocks = render("<div class=\"x\">raw</div>\n");
        match &blocks[0] {
            Block::Literal { text } => assert!(text.contains("&lt;div")),
            other => panic!("unexpected block: {:?}", other),
        }
    }

    #[test]
    fn test_toc_extraction() {
        let blocks = render("# One\n\ntext\n\n## Two\n\n### Three\n");
        let toc = RenderPipeline::toc(&blocks);
        let entries: Vec<(u8, &str)> = toc.iter().map(|e| (e.level, e.id.as_str())).collect();
        assert_eq!(entries, vec![(1, "one"), (2, "two"), (3, "three")]);
    }

    #[test]
    fn test_empty_body() {
        assert!(render("").is_empty());
    }

    #[test]
    fn test_tree_is_serializable() {
        let blocks = render("# Hi\n\n```terminal\nls\n```");
        let json = serde_json::to_string(&blocks).unwrap();
        assert!(json.contains("\"type\":\"heading\""));
        assert!(json.contains("\"type\":\"terminal\""));
    }
}
