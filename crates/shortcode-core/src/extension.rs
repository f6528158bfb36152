//! Host extension points.
//!
//! A markup host calls a [`TextMatcher`] from its tokenizer passes and a
//! [`NodeRenderer`] from its serializer. [`Shortcodes`] implements both on top
//! of a single [`DelimiterGrammar`], so parsing and rendering always agree on
//! the delimiters.
//!
//! # Example
//!
//! ```
//! use shortcode_core::{DelimiterGrammar, NodeRenderer, Segment, Shortcodes, TextMatcher};
//!
//! let shortcodes = Shortcodes::new(DelimiterGrammar::default());
//!
//! let segments = shortcodes.split("Drum and Bass [[ Youtube id=3 ]]");
//! assert_eq!(segments[0], Segment::Text("Drum and Bass "));
//!
//! let Segment::Shortcode(node) = &segments[1] else { panic!("expected shortcode") };
//! assert_eq!(shortcodes.render(node), r#"[[ Youtube id="3" ]]"#);
//! ```

use crate::{DelimiterGrammar, ShortcodeMatch, ShortcodeNode, serialize, tokenizer};

/// Recognizes shortcodes in raw text.
///
/// Hosts must not call the matcher on verbatim content (code spans, code
/// blocks, raw HTML), and should give their own competing constructs (links,
/// images) precedence over it.
pub trait TextMatcher {
    /// Match a shortcode starting exactly at byte offset `cursor`.
    fn match_at(&self, text: &str, cursor: usize) -> Option<ShortcodeMatch>;

    /// Find the first match at or after byte offset `from`.
    ///
    /// Hosts call this once per match over whole documents, so it should
    /// stay close to linear in the length of `text`.
    fn find_next(&self, text: &str, from: usize) -> Option<(usize, ShortcodeMatch)>;

    /// Split text into literal runs and shortcodes.
    ///
    /// Literal runs are never empty. Text without shortcodes yields a single
    /// [`Segment::Text`] (or nothing, for empty input).
    fn split<'a>(&self, text: &'a str) -> Vec<Segment<'a>> {
        let mut segments = Vec::new();
        let mut pos = 0;

        while let Some((start, found)) = self.find_next(text, pos) {
            if start > pos {
                segments.push(Segment::Text(&text[pos..start]));
            }
            segments.push(Segment::Shortcode(found.node));
            pos = start + found.consumed;
        }

        if pos < text.len() {
            segments.push(Segment::Text(&text[pos..]));
        }

        segments
    }
}

/// Renders shortcode nodes back to text.
pub trait NodeRenderer {
    /// Render a node in its canonical textual form.
    fn render(&self, node: &ShortcodeNode) -> String;
}

/// Piece of text produced by [`TextMatcher::split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Literal text, left to the host.
    Text(&'a str),
    /// A recognized shortcode.
    Shortcode(ShortcodeNode),
}

/// The shortcode extension: a grammar wired to both extension points.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shortcodes {
    grammar: DelimiterGrammar,
}

impl Shortcodes {
    /// Create the extension for a grammar.
    #[must_use]
    pub fn new(grammar: DelimiterGrammar) -> Self {
        Self { grammar }
    }

    /// The grammar shared by matching and rendering.
    pub fn grammar(&self) -> &DelimiterGrammar {
        &self.grammar
    }
}

impl From<DelimiterGrammar> for Shortcodes {
    fn from(grammar: DelimiterGrammar) -> Self {
        Self::new(grammar)
    }
}

impl TextMatcher for Shortcodes {
    fn match_at(&self, text: &str, cursor: usize) -> Option<ShortcodeMatch> {
        tokenizer::match_at(text, cursor, &self.grammar)
    }

    fn find_next(&self, text: &str, from: usize) -> Option<(usize, ShortcodeMatch)> {
        tokenizer::find_next(text, from, &self.grammar)
    }
}

impl NodeRenderer for Shortcodes {
    fn render(&self, node: &ShortcodeNode) -> String {
        serialize(node, &self.grammar)
    }
}
