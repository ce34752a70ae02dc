//! A block editing surface backed by a markdown buffer.
//!
//! Blocks are tagged JSON nodes:
//!
//! ```json
//! { "id": "…", "type": "heading", "props": { "level": 2 },
//!   "content": [{ "type": "text", "text": "Plans", "styles": {} }],
//!   "children": [] }
//! ```
//!
//! Known types are `paragraph`, `heading`, `bulletListItem`,
//! `numberedListItem` and `codeBlock`. Anything else is shown as a paragraph
//! of its text. Inline styles and nested children do not survive a trip
//! through the buffer; unchanged buffers are not applied at all, so opening
//! and closing the editor never rewrites a page.

use super::notify::{ChangeNotifier, Subscription};
use super::{EditingSurface, SurfaceHandle};
use crate::error::Result;
use crate::model::Block;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde_json::{json, Map, Value};
use std::cell::RefCell;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MarkdownSurface;

impl MarkdownSurface {
    pub fn new() -> Self {
        Self
    }
}

impl EditingSurface for MarkdownSurface {
    type Handle = MarkdownHandle;

    fn initialize(&mut self, blocks: &[Block]) -> Result<MarkdownHandle> {
        Ok(MarkdownHandle {
            blocks: RefCell::new(blocks.to_vec()),
            notifier: ChangeNotifier::new(),
        })
    }
}

pub struct MarkdownHandle {
    blocks: RefCell<Vec<Block>>,
    notifier: ChangeNotifier,
}

impl MarkdownHandle {
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// The document rendered as a markdown buffer.
    pub fn to_markdown(&self) -> String {
        blocks_to_markdown(&self.blocks.borrow())
    }

    /// Replaces the document with a parsed buffer.
    ///
    /// Returns false, without notifying, when the buffer matches the current
    /// rendering.
    pub fn replace_markdown(&self, text: &str) -> bool {
        if text.trim_end() == self.to_markdown().trim_end() {
            return false;
        }

        let mut parsed = markdown_to_blocks(text);
        reuse_ids(&self.blocks.borrow(), &mut parsed);
        *self.blocks.borrow_mut() = parsed;
        self.notifier.notify();
        true
    }

    /// Appends parsed blocks at the end of the document.
    pub fn append_markdown(&self, text: &str) -> usize {
        let parsed = markdown_to_blocks(text);
        let added = parsed.len();
        if added > 0 {
            self.blocks.borrow_mut().extend(parsed);
            self.notifier.notify();
        }
        added
    }
}

impl SurfaceHandle for MarkdownHandle {
    fn subscribe(&self, listener: Box<dyn FnMut()>) -> Subscription {
        self.notifier.subscribe(listener)
    }

    fn top_level_blocks(&self) -> Vec<Block> {
        self.blocks.borrow().clone()
    }
}

/// Keeps block ids stable for blocks that kept their position and type.
fn reuse_ids(old: &[Block], new: &mut [Block]) {
    for (old, new) in old.iter().zip(new.iter_mut()) {
        let old = old.as_value();
        if old.get("type") != new.as_value().get("type") {
            continue;
        }
        let Some(id) = old.get("id") else {
            continue;
        };
        let mut value = new.clone().into_value();
        if let Some(obj) = value.as_object_mut() {
            obj.insert("id".to_string(), id.clone());
        }
        *new = Block::new(value);
    }
}

// --- blocks -> markdown ---

fn block_type(block: &Block) -> &str {
    block
        .as_value()
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("paragraph")
}

/// Plain text of a block's inline content.
pub fn block_text(block: &Block) -> String {
    block
        .as_value()
        .get("content")
        .map(inline_text)
        .unwrap_or_default()
}

fn inline_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(inline_text).collect(),
        Value::Object(obj) => match (obj.get("text"), obj.get("content")) {
            (Some(Value::String(s)), _) => s.clone(),
            (_, Some(inner)) => inline_text(inner),
            _ => String::new(),
        },
        _ => String::new(),
    }
}

fn heading_level(block: &Block) -> usize {
    let level = block
        .as_value()
        .pointer("/props/level")
        .and_then(Value::as_u64)
        .unwrap_or(1);
    level.clamp(1, 6) as usize
}

/// Characters escaped wherever they appear in a line of text.
const INLINE_SPECIAL: &[char] = &['\\', '`', '*', '_', '[', ']', '<', '&'];

/// Characters escaped only when they start a line.
const LEADING_SPECIAL: &[char] = &['#', '>', '-', '+', '=', '~', '|'];

/// Backslash-escapes one line of text so it reparses as the same text.
///
/// Surrounding whitespace is dropped; the parser drops it anyway.
fn escape_line(line: &str, extra: &[char]) -> String {
    let line = line.trim();
    let mut out = String::with_capacity(line.len() + 4);

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    let list_marker = digits > 0 && matches!(line[digits..].chars().next(), Some('.' | ')'));

    for (i, c) in line.chars().enumerate() {
        let leading = i == 0 && LEADING_SPECIAL.contains(&c);
        let ordinal = list_marker && i == digits;
        if leading || ordinal || INLINE_SPECIAL.contains(&c) || extra.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Writes `text` after `marker`, indenting continuation lines to match.
fn push_marked(out: &mut String, marker: &str, text: &str) {
    let indent = " ".repeat(marker.len());
    out.push_str(marker);
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.trim().is_empty() {
                out.push_str(&indent);
            }
        }
        out.push_str(&escape_line(line, &[]));
    }
}

/// A fence longer than any backtick run inside `code`.
fn code_fence(code: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for c in code.chars() {
        if c == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

/// Renders blocks as a markdown buffer.
///
/// Text is escaped, so parsing the buffer gives back the same block types
/// and text. Consecutive list items of one kind form a single tight list.
pub fn blocks_to_markdown(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut previous: Option<&str> = None;
    let mut number = 0;

    for block in blocks {
        let kind = block_type(block);
        let text = block_text(block);
        let is_list = matches!(kind, "bulletListItem" | "numberedListItem");
        if !is_list && !matches!(kind, "heading" | "codeBlock") && text.trim().is_empty() {
            continue;
        }

        let same_list = is_list && previous == Some(kind);
        if !out.is_empty() {
            out.push_str(if same_list { "\n" } else { "\n\n" });
        }
        number = if same_list { number + 1 } else { 1 };

        match kind {
            "heading" => {
                let line = text.lines().collect::<Vec<_>>().join(" ");
                out.push_str(&"#".repeat(heading_level(block)));
                out.push(' ');
                out.push_str(&escape_line(&line, &['#']));
            }
            "bulletListItem" => push_marked(&mut out, "- ", &text),
            "numberedListItem" => push_marked(&mut out, &format!("{}. ", number), &text),
            "codeBlock" => {
                let language = block
                    .as_value()
                    .pointer("/props/language")
                    .and_then(Value::as_str)
                    .unwrap_or("");
                let code = text.trim_end_matches('\n');
                let fence = code_fence(code);
                out.push_str(&fence);
                out.push_str(language.trim());
                out.push('\n');
                if !code.is_empty() {
                    out.push_str(code);
                    out.push('\n');
                }
                out.push_str(&fence);
            }
            _ => {
                let lines: Vec<String> = text
                    .lines()
                    .filter(|line| !line.trim().is_empty())
                    .map(|line| escape_line(line, &[]))
                    .collect();
                out.push_str(&lines.join("\n"));
            }
        }
        previous = Some(kind);
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

// --- markdown -> blocks ---

struct OpenBlock {
    kind: &'static str,
    props: Map<String, Value>,
    text: String,
}

impl OpenBlock {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            props: Map::new(),
            text: String::new(),
        }
    }

    fn finish(self) -> Block {
        let text = if self.kind == "codeBlock" {
            self.text.trim_end_matches('\n').to_string()
        } else {
            self.text
        };
        let content = if text.is_empty() {
            json!([])
        } else {
            json!([{ "type": "text", "text": text, "styles": {} }])
        };
        Block::new(json!({
            "id": Uuid::new_v4().to_string(),
            "type": self.kind,
            "props": Value::Object(self.props),
            "content": content,
            "children": [],
        }))
    }
}

/// Parses a markdown buffer into top-level blocks.
///
/// Nested list items are flattened into the top level. Raw HTML is kept as
/// literal text.
pub fn markdown_to_blocks(text: &str) -> Vec<Block> {
    let parser = Parser::new_ext(text, Options::empty());
    let mut blocks = Vec::new();
    let mut current: Option<OpenBlock> = None;
    let mut lists: Vec<bool> = Vec::new();

    let close = |current: &mut Option<OpenBlock>, blocks: &mut Vec<Block>| {
        if let Some(open) = current.take() {
            blocks.push(open.finish());
        }
    };

    for event in parser {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                close(&mut current, &mut blocks);
                let mut open = OpenBlock::new("heading");
                open.props.insert("level".to_string(), json!(level as u8));
                current = Some(open);
            }
            Event::Start(Tag::Paragraph) => match current.as_mut() {
                Some(open) if !lists.is_empty() => {
                    if !open.text.is_empty() {
                        open.text.push('\n');
                    }
                }
                _ => {
                    close(&mut current, &mut blocks);
                    current = Some(OpenBlock::new("paragraph"));
                }
            },
            Event::Start(Tag::List(start)) => {
                close(&mut current, &mut blocks);
                lists.push(start.is_some());
            }
            Event::Start(Tag::Item) => {
                close(&mut current, &mut blocks);
                let ordered = lists.last().copied().unwrap_or(false);
                current = Some(OpenBlock::new(if ordered {
                    "numberedListItem"
                } else {
                    "bulletListItem"
                }));
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                close(&mut current, &mut blocks);
                let mut open = OpenBlock::new("codeBlock");
                if let CodeBlockKind::Fenced(language) = kind {
                    if !language.is_empty() {
                        open.props
                            .insert("language".to_string(), json!(language.to_string()));
                    }
                }
                current = Some(open);
            }
            Event::Start(Tag::HtmlBlock) => {
                close(&mut current, &mut blocks);
                current = Some(OpenBlock::new("paragraph"));
            }
            Event::End(TagEnd::HtmlBlock) => {
                if let Some(open) = current.as_mut() {
                    let len = open.text.trim_end_matches('\n').len();
                    open.text.truncate(len);
                }
                close(&mut current, &mut blocks);
            }
            Event::Text(t) | Event::Code(t) | Event::Html(t) | Event::InlineHtml(t) => {
                current
                    .get_or_insert_with(|| OpenBlock::new("paragraph"))
                    .text
                    .push_str(&t);
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(open) = current.as_mut() {
                    open.text.push('\n');
                }
            }
            Event::End(TagEnd::Paragraph) if !lists.is_empty() => {}
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::Heading(_))
            | Event::End(TagEnd::Item)
            | Event::End(TagEnd::CodeBlock) => close(&mut current, &mut blocks),
            Event::End(TagEnd::List(_)) => {
                close(&mut current, &mut blocks);
                lists.pop();
            }
            _ => {}
        }
    }
    close(&mut current, &mut blocks);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(blocks: &[Block]) -> Vec<&str> {
        blocks.iter().map(block_type).collect()
    }

    fn texts(blocks: &[Block]) -> Vec<String> {
        blocks.iter().map(block_text).collect()
    }

    #[test]
    fn parses_common_structures() {
        let md = "# Plans\n\nFirst paragraph\nsecond line\n\n- one\n- two\n\n1. first\n\n```rust\nfn main() {}\n```\n";
        let blocks = markdown_to_blocks(md);

        assert_eq!(
            kinds(&blocks),
            vec![
                "heading",
                "paragraph",
                "bulletListItem",
                "bulletListItem",
                "numberedListItem",
                "codeBlock"
            ]
        );
        assert_eq!(blocks[0].as_value()["props"]["level"], 1);
        assert_eq!(block_text(&blocks[1]), "First paragraph\nsecond line");
        assert_eq!(block_text(&blocks[3]), "two");
        assert_eq!(blocks[5].as_value()["props"]["language"], "rust");
        assert_eq!(block_text(&blocks[5]), "fn main() {}");
    }

    #[test]
    fn inline_markup_keeps_text() {
        let blocks = markdown_to_blocks("Some **bold** and `code`");
        assert_eq!(texts(&blocks), vec!["Some bold and code".to_string()]);
    }

    #[test]
    fn empty_buffer_is_empty_document() {
        assert!(markdown_to_blocks("").is_empty());
        assert!(markdown_to_blocks("\n\n  \n").is_empty());
    }

    #[test]
    fn renders_known_blocks() {
        let blocks = markdown_to_blocks("## Sub\n\nText\n\n- a\n- b\n\n1. x\n");
        let md = blocks_to_markdown(&blocks);

        assert_eq!(md, "## Sub\n\nText\n\n- a\n- b\n\n1. x\n");
    }

    #[test]
    fn unknown_blocks_render_as_paragraphs() {
        let block = Block::new(json!({
            "type": "callout",
            "content": [{"type": "link", "content": [{"type": "text", "text": "see docs"}]}]
        }));
        let md = blocks_to_markdown(&[block]);
        assert_eq!(md.trim(), "see docs");
    }

    #[test]
    fn reparsing_rendered_markdown_keeps_structure() {
        let original = markdown_to_blocks("# T\n\nBody\n\n- a\n- b\n");
        let again = markdown_to_blocks(&blocks_to_markdown(&original));
        assert_eq!(kinds(&original), kinds(&again));
        assert_eq!(texts(&original), texts(&again));
    }

    fn paragraph(text: &str) -> Block {
        Block::new(json!({
            "id": "p",
            "type": "paragraph",
            "props": {},
            "content": [{"type": "text", "text": text, "styles": {}}],
            "children": []
        }))
    }

    #[test]
    fn literal_markup_characters_survive_reparsing() {
        let samples = [
            "1. not a list",
            "- dash",
            "+ plus",
            "a *star* b",
            "<div>x</div>",
            "snake_case and `ticks`",
            "[link](there) &amp; \\ back",
            "# not a heading",
            "> not a quote",
            "first\n===",
            "2) also not a list",
        ];
        for sample in samples {
            let blocks = markdown_to_blocks(&blocks_to_markdown(&[paragraph(sample)]));
            assert_eq!(kinds(&blocks), vec!["paragraph"], "{:?}", sample);
            assert_eq!(texts(&blocks), vec![sample.to_string()], "{:?}", sample);
        }
    }

    #[test]
    fn list_and_heading_text_is_escaped() {
        let heading = Block::new(json!({
            "type": "heading",
            "props": {"level": 2},
            "content": [{"type": "text", "text": "C# *tips* #"}]
        }));
        let item = Block::new(json!({
            "type": "numberedListItem",
            "content": [{"type": "text", "text": "3. nested?\n- no"}]
        }));
        let code = Block::new(json!({
            "type": "codeBlock",
            "content": [{"type": "text", "text": "let s = \"```\";"}]
        }));
        let original = vec![heading, item, code];

        let again = markdown_to_blocks(&blocks_to_markdown(&original));
        assert_eq!(kinds(&again), kinds(&original));
        assert_eq!(texts(&again), texts(&original));
    }

    #[test]
    fn raw_html_in_a_buffer_is_kept_as_text() {
        let blocks = markdown_to_blocks("<div>x</div>\n\nsee <b>this</b>");
        assert_eq!(kinds(&blocks), vec!["paragraph", "paragraph"]);
        assert_eq!(
            texts(&blocks),
            vec!["<div>x</div>".to_string(), "see <b>this</b>".to_string()]
        );
    }

    #[test]
    fn unchanged_buffer_does_not_notify() {
        let mut surface = MarkdownSurface::new();
        let handle = surface.initialize(&markdown_to_blocks("Hello")).unwrap();
        let buffer = handle.to_markdown();

        assert!(!handle.replace_markdown(&buffer));
        assert!(handle.replace_markdown("Hello world"));
    }

    #[test]
    fn replace_keeps_ids_of_matching_blocks() {
        let mut surface = MarkdownSurface::new();
        let handle = surface
            .initialize(&markdown_to_blocks("# Title\n\nBody"))
            .unwrap();
        let before = handle.top_level_blocks();

        assert!(handle.replace_markdown("# Title\n\nNew body\n\nMore"));
        let after = handle.top_level_blocks();

        assert_eq!(after.len(), 3);
        assert_eq!(after[0].as_value()["id"], before[0].as_value()["id"]);
        assert_eq!(after[1].as_value()["id"], before[1].as_value()["id"]);
    }

    #[test]
    fn append_adds_blocks_and_notifies() {
        use std::cell::Cell;
        use std::rc::Rc;

        let mut surface = MarkdownSurface::new();
        let handle = surface.initialize(&[]).unwrap();
        let hits = Rc::new(Cell::new(0));
        let inner = Rc::clone(&hits);
        let _sub = handle.subscribe(Box::new(move || inner.set(inner.get() + 1)));

        assert_eq!(handle.append_markdown("one\n\ntwo"), 2);
        assert_eq!(handle.append_markdown(""), 0);
        assert_eq!(hits.get(), 1);
        assert_eq!(handle.top_level_blocks().len(), 2);
    }
}
