//! Markdown-to-tree conversion, driven by pulldown-cmark's event stream.

use std::sync::OnceLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde_json::Value;

use crate::model::{Mark, Node, NodeKind};

use super::NormalizeOptions;

/// Whether a single string is worth handing to the markdown converter:
/// multiple lines, sentinel characters, or link syntax. Plain prose that
/// trips this check still comes back as an ordinary paragraph, so the
/// detection errs on the eager side.
pub fn looks_like_markdown(text: &str) -> bool {
    if text.contains('\n') {
        return true;
    }
    if text.contains(['#', '*', '-', '`']) || text.contains("~~") {
        return true;
    }
    static LINK: OnceLock<Regex> = OnceLock::new();
    let link = LINK.get_or_init(|| Regex::new(r"\[[^\]]*\]\([^)]*\)").expect("invalid link regex"));
    link.is_match(text)
}

/// Converts markdown text into a document tree rooted at `doc`.
pub fn markdown_to_tree(text: &str, options: &NormalizeOptions) -> Node {
    let mut md_options = Options::empty();
    md_options.insert(Options::ENABLE_TABLES);
    md_options.insert(Options::ENABLE_STRIKETHROUGH);
    md_options.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(text, md_options);
    TreeBuilder::new(options).run(parser)
}

/// Folds the pulldown-cmark event stream into a node tree.
///
/// Container tags push a node onto the stack and pop-attach on their end
/// tag; emphasis tags maintain a mark stack applied to text leaves.
struct TreeBuilder<'a> {
    options: &'a NormalizeOptions,
    stack: Vec<Node>,
    marks: Vec<Mark>,
    in_table_head: bool,
}

impl<'a> TreeBuilder<'a> {
    fn new(options: &'a NormalizeOptions) -> Self {
        TreeBuilder {
            options,
            stack: vec![Node::new(NodeKind::Doc)],
            marks: Vec::new(),
            in_table_head: false,
        }
    }

    fn run(mut self, parser: Parser) -> Node {
        for event in parser {
            match event {
                Event::Start(tag) => self.start(tag),
                Event::End(tag) => self.end(tag),
                Event::Text(text) => self.text(&text),
                Event::Code(code) => {
                    let mut marks = self.marks.clone();
                    marks.push(Mark::code());
                    self.append(Node::styled_text(code.to_string(), marks));
                }
                Event::SoftBreak => self.text(" "),
                Event::HardBreak => self.text("\n"),
                Event::Rule => self.append(Node::new(NodeKind::HorizontalRule)),
                Event::TaskListMarker(checked) => self.mark_task_item(checked),
                Event::Html(html) | Event::InlineHtml(html) => self.text(&html),
                _ => {}
            }
        }
        while self.stack.len() > 1 {
            self.pop_attach();
        }
        self.stack.pop().unwrap_or_else(|| Node::new(NodeKind::Doc))
    }

    fn start(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => self.push(Node::new(NodeKind::Paragraph)),
            Tag::Heading { level, .. } => {
                self.push(Node::new(NodeKind::Heading).attr("level", heading_level(level)));
            }
            Tag::BlockQuote(_) => self.push(Node::new(NodeKind::Blockquote)),
            Tag::CodeBlock(kind) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string)
                        .filter(|lang| !lang.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                let language =
                    language.unwrap_or_else(|| self.options.default_code_language.clone());
                self.push(Node::new(NodeKind::CodeBlock).attr("language", language));
            }
            Tag::List(Some(_)) => self.push(Node::new(NodeKind::OrderedList)),
            Tag::List(None) => self.push(Node::new(NodeKind::BulletList)),
            Tag::Item => self.push(Node::new(NodeKind::ListItem)),
            Tag::Table(_) => self.push(Node::new(NodeKind::Table)),
            Tag::TableHead => {
                self.in_table_head = true;
                self.push(Node::new(NodeKind::TableRow));
            }
            Tag::TableRow => self.push(Node::new(NodeKind::TableRow)),
            Tag::TableCell => {
                let kind = if self.in_table_head {
                    NodeKind::TableHeader
                } else {
                    NodeKind::TableCell
                };
                self.push(Node::new(kind));
            }
            // Raw HTML blocks degrade to a paragraph of literal text.
            Tag::HtmlBlock => self.push(Node::new(NodeKind::Paragraph)),
            Tag::Emphasis => self.marks.push(Mark::italic()),
            Tag::Strong => self.marks.push(Mark::bold()),
            Tag::Strikethrough => self.marks.push(Mark::strike()),
            Tag::Link { dest_url, .. } => self.marks.push(Mark::link(dest_url.to_string())),
            Tag::Image { dest_url, .. } => {
                self.push(Node::new(NodeKind::Image).attr("url", dest_url.to_string()));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph
            | TagEnd::Heading(_)
            | TagEnd::BlockQuote(_)
            | TagEnd::List(_)
            | TagEnd::Table
            | TagEnd::TableRow
            | TagEnd::HtmlBlock
            | TagEnd::Image => self.pop_attach(),
            TagEnd::CodeBlock => {
                if let Some(top) = self.stack.last_mut() {
                    merge_text_children(top);
                }
                self.pop_attach();
            }
            TagEnd::Item | TagEnd::TableCell => {
                if let Some(top) = self.stack.last_mut() {
                    wrap_inline_children(top);
                }
                self.pop_attach();
            }
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.pop_attach();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.marks.pop();
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let marks = self.marks.clone();
        let Some(top) = self.stack.last_mut() else {
            return;
        };
        match top.kind {
            // An image's inner text is its alt text, not a child node.
            NodeKind::Image => {
                let alt = top
                    .attrs
                    .entry("alt".to_string())
                    .or_insert_with(|| Value::String(String::new()));
                if let Value::String(s) = alt {
                    s.push_str(text);
                }
            }
            NodeKind::CodeBlock => top.content.push(Node::text(text)),
            _ => top.content.push(Node::styled_text(text, marks)),
        }
    }

    fn mark_task_item(&mut self, checked: bool) {
        if let Some(item) = self
            .stack
            .iter_mut()
            .rev()
            .find(|node| node.kind == NodeKind::ListItem)
        {
            item.attrs
                .insert("checked".to_string(), Value::Bool(checked));
        }
    }

    fn push(&mut self, node: Node) {
        self.stack.push(node);
    }

    fn pop_attach(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(node) = self.stack.pop() {
            self.append(node);
        }
    }

    fn append(&mut self, node: Node) {
        if let Some(top) = self.stack.last_mut() {
            top.content.push(node);
        }
    }
}

fn heading_level(level: HeadingLevel) -> u64 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Collapses a code block's text events into a single raw leaf.
fn merge_text_children(node: &mut Node) {
    if node.content.len() > 1 {
        let joined: String = node
            .content
            .iter()
            .filter_map(|child| child.text.as_deref())
            .collect();
        node.content = vec![Node::text(joined)];
    }
}

/// Wraps stray text leaves in paragraphs. Tight list items and table
/// cells carry inline content directly in the event stream, but the
/// editor schema wants block children everywhere below the leaf level.
fn wrap_inline_children(node: &mut Node) {
    if !node.content.iter().any(|child| child.kind == NodeKind::Text) {
        return;
    }
    let mut wrapped = Vec::with_capacity(node.content.len());
    let mut run: Vec<Node> = Vec::new();
    for child in node.content.drain(..) {
        if child.kind == NodeKind::Text {
            run.push(child);
        } else {
            if !run.is_empty() {
                wrapped.push(Node::with_children(
                    NodeKind::Paragraph,
                    std::mem::take(&mut run),
                ));
            }
            wrapped.push(child);
        }
    }
    if !run.is_empty() {
        wrapped.push(Node::with_children(NodeKind::Paragraph, run));
    }
    node.content = wrapped;
}
