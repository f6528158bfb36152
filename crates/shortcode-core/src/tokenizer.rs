//! Shortcode recognition at a cursor position.
//!
//! The tokenizer only answers "is there a shortcode starting here". It does
//! not know about verbatim spans, links or block structure; the host decides
//! where it is called and where the resulting node goes.

use crate::attrs::{DeadEnds, parse_attributes, token_end};
use crate::{DelimiterGrammar, ShortcodeNode};

/// A recognized shortcode and the length of its source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcodeMatch {
    /// The parsed node.
    pub node: ShortcodeNode,
    /// Bytes consumed from the cursor, both delimiters included.
    pub consumed: usize,
}

/// Try to match a shortcode starting exactly at byte offset `cursor`.
///
/// Returns `None` when the text at `cursor` is not a complete, well-formed
/// shortcode accepted by the grammar's allow-list, or when `cursor` is out of
/// range or not on a char boundary. A `None` means the characters are literal
/// text; it is never an error.
///
/// # Example
///
/// ```
/// use shortcode_core::{DelimiterGrammar, match_at};
///
/// let grammar = DelimiterGrammar::default();
/// let text = r#"Watch [[ Youtube id=3 ]] now"#;
///
/// let found = match_at(text, 6, &grammar).unwrap();
/// assert_eq!(found.node.identifier, "Youtube");
/// assert_eq!(found.node.attributes.get("id"), Some("3"));
/// assert_eq!(&text[6..6 + found.consumed], "[[ Youtube id=3 ]]");
///
/// assert!(match_at(text, 0, &grammar).is_none());
/// ```
pub fn match_at(text: &str, cursor: usize, grammar: &DelimiterGrammar) -> Option<ShortcodeMatch> {
    Scanner::new(text, grammar).match_at(cursor)
}

/// Find the first shortcode at or after byte offset `from`.
///
/// Candidates are the occurrences of the start delimiter. A failed candidate
/// (say `[[[`) does not hide a match starting one character later.
///
/// Returns the start offset and the match.
pub fn find_next(
    text: &str,
    from: usize,
    grammar: &DelimiterGrammar,
) -> Option<(usize, ShortcodeMatch)> {
    Scanner::new(text, grammar).find_next(from)
}

/// Matching state for one text.
///
/// Remembers work from failed candidates so that a scan over the whole text
/// stays close to linear, even when it holds many start delimiters that never
/// close.
struct Scanner<'t, 'g> {
    text: &'t str,
    grammar: &'g DelimiterGrammar,
    /// Last identifier scanned, as `(from, end)` offsets into `text`.
    identifier: Option<(usize, usize)>,
    dead_ends: DeadEnds,
}

impl<'t, 'g> Scanner<'t, 'g> {
    fn new(text: &'t str, grammar: &'g DelimiterGrammar) -> Self {
        Self {
            text,
            grammar,
            identifier: None,
            dead_ends: DeadEnds::default(),
        }
    }

    fn find_next(&mut self, from: usize) -> Option<(usize, ShortcodeMatch)> {
        let (text, grammar) = (self.text, self.grammar);
        let start_block = grammar.start_block();
        // No candidate can close after the last end delimiter.
        let last_end = text.rfind(grammar.end_block())?;
        let step = start_block.chars().next().map_or(1, char::len_utf8);

        let mut pos = from;
        loop {
            let start = pos + text.get(pos..)?.find(start_block)?;
            if start + start_block.len() > last_end {
                return None;
            }
            if let Some(found) = self.match_at(start) {
                return Some((start, found));
            }
            pos = start + step;
        }
    }

    fn match_at(&mut self, cursor: usize) -> Option<ShortcodeMatch> {
        let (text, grammar) = (self.text, self.grammar);
        let input = text.get(cursor..)?;
        let after_start = input.strip_prefix(grammar.start_block())?;
        let body = after_start.trim_start();
        let body_start = text.len() - body.len();

        let identifier_len = self.identifier_end(body_start) - body_start;
        if identifier_len == 0 {
            tracing::trace!(cursor, "shortcode without identifier");
            return None;
        }
        let identifier = &body[..identifier_len];

        if !grammar.captures(identifier) {
            tracing::trace!(cursor, identifier, "identifier not in captureOnly");
            return None;
        }

        let (attributes, rest) = parse_attributes(
            &body[identifier_len..],
            grammar.end_block(),
            &mut self.dead_ends,
        )?;

        let consumed = input.len() - rest.len() + grammar.end_block().len();
        tracing::trace!(cursor, identifier, consumed, "matched shortcode");

        Some(ShortcodeMatch {
            node: ShortcodeNode {
                identifier: identifier.to_owned(),
                attributes,
            },
            consumed,
        })
    }

    /// End offset of the identifier token starting at `from`.
    ///
    /// A token ends at the first whitespace or end delimiter, so every start
    /// inside the last scanned token shares its end.
    fn identifier_end(&mut self, from: usize) -> usize {
        if let Some((scanned_from, end)) = self.identifier
            && scanned_from <= from
            && from <= end
        {
            return end;
        }
        let end = from + token_end(&self.text[from..], self.grammar.end_block());
        self.identifier = Some((from, end));
        end
    }
}
