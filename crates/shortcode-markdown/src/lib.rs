//! Markdown host for shortcodes.
//!
//! Parses markdown with pulldown-cmark into an mdast-shaped [`Root`] tree in
//! which shortcodes appear as [`Block::Shortcode`] or [`Inline::Shortcode`],
//! and stringifies trees back to normalized markdown.
//!
//! # Precedence
//!
//! Shortcodes are only recognized in literal text, never inside code spans,
//! code blocks or raw HTML, and a link or image always wins over colliding
//! delimiters. A start delimiter escaped with a backslash is literal.
//!
//! Inside a recognized shortcode nothing is markdown: attribute values keep
//! `*`, `_`, `<b>`, `&amp;` and backslashes exactly as written.
//!
//! # Placement
//!
//! A shortcode alone on its line becomes a block sibling of the surrounding
//! paragraphs. Anywhere else it stays inline.
//!
//! # Example
//!
//! ```
//! use shortcode_markdown::MarkdownProcessor;
//!
//! let processor = MarkdownProcessor::default();
//! let root = processor.parse("Drum and Bass\n\n[[ Youtube id=3 ]]");
//!
//! assert_eq!(
//!     processor.stringify(&root),
//!     "Drum and Bass\n\n[[ Youtube id=\"3\" ]]\n"
//! );
//! ```

mod ast;
mod masking;
mod parser;
mod placement;
mod processor;
mod stringify;
mod util;

pub use ast::{Block, Inline, ListItem, Root};
pub use parser::{parse, parser_options};
pub use processor::MarkdownProcessor;
pub use stringify::stringify;
