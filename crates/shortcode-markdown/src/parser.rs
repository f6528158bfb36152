//! Markdown to document tree.
//!
//! Shortcodes are masked in the source first (see the `masking` module), so
//! their attribute values reach the tree verbatim whatever markup characters
//! they hold. pulldown-cmark then does the markdown work on the masked text,
//! and literal text runs are split back into text and shortcodes.
//!
//! - Code spans, code blocks and HTML never contain shortcodes.
//! - A link, image or autolink always wins over colliding delimiters.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use shortcode_core::{Segment, TextMatcher};

use crate::ast::{Block, Inline, ListItem, Root, push_inline};
use crate::masking::{Masked, mask};
use crate::placement::place_paragraph;
use crate::util::{heading_level_to_num, split_info};

/// Parser options used by the host.
///
/// Plain `CommonMark`; the tree has no nodes for GFM tables, strikethrough,
/// task lists or footnotes.
#[must_use]
pub fn parser_options() -> Options {
    Options::empty()
}

/// Parse markdown into a document tree, recognizing shortcodes with `matcher`.
///
/// # Example
///
/// ```
/// use shortcode_core::Shortcodes;
/// use shortcode_markdown::{Block, parse};
///
/// let root = parse("Drum and Bass\n\n[[ Youtube ]]", &Shortcodes::default());
/// assert!(matches!(root.children[1], Block::Shortcode(_)));
/// ```
pub fn parse<M: TextMatcher + ?Sized>(markdown: &str, matcher: &M) -> Root {
    let masked = mask(markdown, matcher);
    let mut builder = TreeBuilder::new(matcher, &masked);
    for event in Parser::new_ext(masked.text(), parser_options()) {
        builder.push(event);
    }
    let root = builder.finish();
    tracing::debug!(blocks = root.children.len(), "parsed markdown");
    root
}

/// Open container while walking the event stream.
enum Frame {
    Paragraph(Vec<Inline>),
    Heading {
        depth: u8,
        children: Vec<Inline>,
    },
    Blockquote(Vec<Block>),
    List {
        start: Option<u64>,
        spread: bool,
        items: Vec<ListItem>,
    },
    /// Tight list items carry inline content without a paragraph.
    Item {
        blocks: Vec<Block>,
        inlines: Vec<Inline>,
    },
    CodeBlock {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    HtmlBlock(String),
    Emphasis(Vec<Inline>),
    Strong(Vec<Inline>),
    Link {
        url: String,
        title: Option<String>,
        children: Vec<Inline>,
    },
    Image {
        url: String,
        title: Option<String>,
        alt: String,
    },
}

struct TreeBuilder<'m, M: ?Sized> {
    matcher: &'m M,
    masked: &'m Masked<'m>,
    root: Vec<Block>,
    stack: Vec<Frame>,
}

impl<'m, M: TextMatcher + ?Sized> TreeBuilder<'m, M> {
    fn new(matcher: &'m M, masked: &'m Masked<'m>) -> Self {
        Self {
            matcher,
            masked,
            root: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn push(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.add_inline(Inline::InlineCode {
                value: self.masked.restore(code.into_string()),
            }),
            Event::Html(html) => {
                if let Some(Frame::HtmlBlock(value)) = self.stack.last_mut() {
                    value.push_str(&html);
                } else {
                    self.add_block(Block::Html {
                        value: self.masked.restore(html.trim_end_matches('\n').to_owned()),
                    });
                }
            }
            Event::InlineHtml(html) => self.add_inline(Inline::Html {
                value: self.masked.restore(html.into_string()),
            }),
            Event::SoftBreak => self.add_inline(Inline::text("\n")),
            Event::HardBreak => self.add_inline(Inline::Break),
            Event::Rule => self.add_block(Block::ThematicBreak),
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Paragraph => {
                self.mark_spread();
                Frame::Paragraph(Vec::new())
            }
            Tag::Heading { level, .. } => Frame::Heading {
                depth: heading_level_to_num(level),
                children: Vec::new(),
            },
            Tag::BlockQuote(_) => Frame::Blockquote(Vec::new()),
            Tag::List(start) => Frame::List {
                start,
                spread: false,
                items: Vec::new(),
            },
            Tag::Item => Frame::Item {
                blocks: Vec::new(),
                inlines: Vec::new(),
            },
            Tag::CodeBlock(kind) => {
                let (lang, meta) = match kind {
                    CodeBlockKind::Fenced(info) => split_info(&info),
                    CodeBlockKind::Indented => (None, None),
                };
                Frame::CodeBlock {
                    lang,
                    meta,
                    value: String::new(),
                }
            }
            Tag::HtmlBlock => Frame::HtmlBlock(String::new()),
            Tag::Emphasis => Frame::Emphasis(Vec::new()),
            Tag::Strong => Frame::Strong(Vec::new()),
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                url: self.masked.restore(dest_url.into_string()),
                title: non_empty(&title).map(|title| self.masked.restore(title)),
                children: Vec::new(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                url: self.masked.restore(dest_url.into_string()),
                title: non_empty(&title).map(|title| self.masked.restore(title)),
                alt: String::new(),
            },
            // Not produced with the host's parser options.
            _ => return,
        };

        if is_block_frame(&frame) {
            self.flush_item_inlines();
        }
        self.stack.push(frame);
    }

    fn end(&mut self, tag: TagEnd) {
        let expected = matches!(
            tag,
            TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::BlockQuote(_)
                | TagEnd::List(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::HtmlBlock
                | TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Link
                | TagEnd::Image
        );
        if !expected {
            return;
        }
        if let Some(frame) = self.stack.pop() {
            self.close(frame);
        }
    }

    fn close(&mut self, frame: Frame) {
        match frame {
            Frame::Paragraph(children) => {
                let children = self.expand(children);
                for block in place_paragraph(children) {
                    self.add_block(block);
                }
            }
            Frame::Heading { depth, children } => {
                let children = self.expand(children);
                self.add_block(Block::Heading { depth, children });
            }
            Frame::Blockquote(children) => self.add_block(Block::Blockquote { children }),
            Frame::List {
                start,
                spread,
                items,
            } => self.add_block(Block::List {
                ordered: start.is_some(),
                start,
                spread,
                children: items,
            }),
            Frame::Item {
                mut blocks,
                inlines,
            } => {
                blocks.extend(self.place_inlines(inlines));
                if let Some(Frame::List { items, .. }) = self.stack.last_mut() {
                    items.push(ListItem { children: blocks });
                }
            }
            Frame::CodeBlock {
                lang,
                meta,
                mut value,
            } => {
                if value.ends_with('\n') {
                    value.pop();
                }
                let lang = lang.map(|lang| self.masked.restore(lang));
                let meta = meta.map(|meta| self.masked.restore(meta));
                let value = self.masked.restore(value);
                self.add_block(Block::Code { lang, meta, value });
            }
            Frame::HtmlBlock(value) => self.add_block(Block::Html {
                value: self.masked.restore(value.trim_end_matches('\n').to_owned()),
            }),
            Frame::Emphasis(children) => {
                let children = self.expand(children);
                self.add_inline(Inline::Emphasis { children });
            }
            Frame::Strong(children) => {
                let children = self.expand(children);
                self.add_inline(Inline::Strong { children });
            }
            Frame::Link {
                url,
                title,
                children,
            } => {
                let children = self.expand(children);
                self.add_inline(Inline::Link {
                    url,
                    title,
                    children,
                });
            }
            Frame::Image { url, title, alt } => self.add_inline(Inline::Image {
                url,
                title,
                alt: self.masked.restore(alt),
            }),
        }
    }

    fn text(&mut self, text: &str) {
        match self.stack.last_mut() {
            Some(Frame::CodeBlock { value, .. } | Frame::HtmlBlock(value)) => value.push_str(text),
            _ => self.add_inline(Inline::text(text)),
        }
    }

    fn add_inline(&mut self, inline: Inline) {
        match self.stack.last_mut() {
            Some(
                Frame::Paragraph(children)
                | Frame::Heading { children, .. }
                | Frame::Emphasis(children)
                | Frame::Strong(children)
                | Frame::Link { children, .. }
                | Frame::Item {
                    inlines: children, ..
                },
            ) => push_inline(children, inline),
            Some(Frame::Image { alt, .. }) => alt.push_str(&inline.plain_text().replace('\n', " ")),
            _ => tracing::trace!("inline content outside of a block, dropped"),
        }
    }

    fn add_block(&mut self, block: Block) {
        self.flush_item_inlines();
        match self.stack.last_mut() {
            None => self.root.push(block),
            Some(Frame::Blockquote(children) | Frame::Item { blocks: children, .. }) => {
                children.push(block);
            }
            Some(_) => tracing::trace!("block inside inline container, dropped"),
        }
    }

    /// Mark the enclosing list loose when a paragraph opens directly in an item.
    fn mark_spread(&mut self) {
        let depth = self.stack.len();
        if depth < 2 || !matches!(self.stack[depth - 1], Frame::Item { .. }) {
            return;
        }
        if let Frame::List { spread, .. } = &mut self.stack[depth - 2] {
            *spread = true;
        }
    }

    /// Move the bare inline content of a tight list item into paragraph blocks.
    fn flush_item_inlines(&mut self) {
        let inlines = match self.stack.last_mut() {
            Some(Frame::Item { inlines, .. }) if !inlines.is_empty() => std::mem::take(inlines),
            _ => return,
        };
        let placed = self.place_inlines(inlines);
        if let Some(Frame::Item { blocks, .. }) = self.stack.last_mut() {
            blocks.extend(placed);
        }
    }

    fn place_inlines(&self, inlines: Vec<Inline>) -> Vec<Block> {
        place_paragraph(self.expand(inlines))
    }

    /// Split text runs into text and shortcode inlines.
    fn expand(&self, children: Vec<Inline>) -> Vec<Inline> {
        let mut expanded = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Inline::Text { value } => {
                    for segment in self.masked.split(&value, self.matcher) {
                        match segment {
                            Segment::Text(text) => expanded.push(Inline::text(text)),
                            Segment::Shortcode(node) => expanded.push(Inline::Shortcode(node)),
                        }
                    }
                }
                other => expanded.push(other),
            }
        }
        expanded
    }

    fn finish(mut self) -> Root {
        while let Some(frame) = self.stack.pop() {
            tracing::trace!("closing unbalanced container");
            self.close(frame);
        }
        Root {
            children: self.root,
        }
    }
}

fn is_block_frame(frame: &Frame) -> bool {
    matches!(
        frame,
        Frame::Paragraph(_)
            | Frame::Heading { .. }
            | Frame::Blockquote(_)
            | Frame::List { .. }
            | Frame::CodeBlock { .. }
            | Frame::HtmlBlock(_)
    )
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}
