//! Shortcode masking ahead of markdown parsing.
//!
//! Attribute values are opaque strings, but pulldown-cmark would happily read
//! `*`, `_`, `<b>` or `&amp;` inside them as markup and split the shortcode
//! across several events. So shortcodes are recognized in the raw source
//! first and swapped for placeholders made of one private-use character
//! around a decimal index. Placeholders are plain text to pulldown-cmark; the
//! tree builder turns them back into shortcodes, or into their source text
//! where they land in a verbatim value.
//!
//! Markdown precedence is kept by parsing the source once beforehand:
//!
//! - code spans, code blocks, raw HTML, images and autolinks are skipped;
//! - link delimiters and destinations are skipped, while link text is not;
//! - link reference definitions are skipped;
//! - a start delimiter escaped with a backslash is literal.

use std::borrow::Cow;
use std::ops::Range;

use pulldown_cmark::{Event, LinkType, Parser, Tag, TagEnd};
use shortcode_core::{Segment, ShortcodeNode, TextMatcher};

use crate::parser::parser_options;

/// Source text with recognized shortcodes replaced by placeholders.
#[derive(Debug)]
pub(crate) struct Masked<'a> {
    source: &'a str,
    text: Cow<'a, str>,
    /// Placeholder character, absent from the source. `None` when nothing
    /// was masked.
    marker: Option<char>,
    shortcodes: Vec<(Range<usize>, ShortcodeNode)>,
}

/// Recognize shortcodes in `markdown` and mask them.
pub(crate) fn mask<'a, M: TextMatcher + ?Sized>(markdown: &'a str, matcher: &M) -> Masked<'a> {
    let shortcodes = find_shortcodes(markdown, matcher);
    if shortcodes.is_empty() {
        return Masked::unmasked(markdown);
    }

    let Some(marker) = ('\u{E000}'..='\u{F8FF}').find(|&c| !markdown.contains(c)) else {
        tracing::warn!("no free placeholder character, shortcodes matched in text runs only");
        return Masked::unmasked(markdown);
    };

    let mut text = String::with_capacity(markdown.len());
    let mut last = 0;
    for (index, (range, _)) in shortcodes.iter().enumerate() {
        text.push_str(&markdown[last..range.start]);
        text.push(marker);
        text.push_str(&index.to_string());
        text.push(marker);
        last = range.end;
    }
    text.push_str(&markdown[last..]);

    tracing::debug!(count = shortcodes.len(), "masked shortcodes");

    Masked {
        source: markdown,
        text: Cow::Owned(text),
        marker: Some(marker),
        shortcodes,
    }
}

impl<'a> Masked<'a> {
    fn unmasked(markdown: &'a str) -> Self {
        Self {
            source: markdown,
            text: Cow::Borrowed(markdown),
            marker: None,
            shortcodes: Vec::new(),
        }
    }

    /// Text to hand to the markdown parser.
    pub(crate) fn text(&self) -> &str {
        &self.text
    }

    /// Split a literal text run into text and shortcodes.
    ///
    /// Without a placeholder character the run is scanned with `matcher`
    /// instead.
    pub(crate) fn split<'t, M: TextMatcher + ?Sized>(
        &self,
        text: &'t str,
        matcher: &M,
    ) -> Vec<Segment<'t>> {
        if self.marker.is_none() {
            return matcher.split(text);
        }

        let mut segments = Vec::new();
        let mut pos = 0;
        while let Some((range, index)) = self.next_placeholder(text, pos) {
            if range.start > pos {
                segments.push(Segment::Text(&text[pos..range.start]));
            }
            segments.push(Segment::Shortcode(self.shortcodes[index].1.clone()));
            pos = range.end;
        }
        if pos < text.len() {
            segments.push(Segment::Text(&text[pos..]));
        }
        segments
    }

    /// Put the source text back in place of any placeholder in `value`.
    ///
    /// Used for verbatim values (code, HTML, destinations) where a shortcode
    /// is plain text.
    pub(crate) fn restore(&self, value: String) -> String {
        let Some((first, _)) = self.next_placeholder(&value, 0) else {
            return value;
        };

        let mut restored = String::with_capacity(value.len());
        restored.push_str(&value[..first.start]);
        let mut pos = first.start;
        while let Some((range, index)) = self.next_placeholder(&value, pos) {
            restored.push_str(&value[pos..range.start]);
            restored.push_str(&self.source[self.shortcodes[index].0.clone()]);
            pos = range.end;
        }
        restored.push_str(&value[pos..]);
        restored
    }

    /// Next placeholder at or after `from`: its byte range and index.
    fn next_placeholder(&self, text: &str, from: usize) -> Option<(Range<usize>, usize)> {
        let marker = self.marker?;
        let mut pos = from;
        loop {
            let start = pos + text.get(pos..)?.find(marker)?;
            let digits_start = start + marker.len_utf8();
            let rest = &text[digits_start..];
            let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());

            if digits > 0
                && rest[digits..].starts_with(marker)
                && let Ok(index) = rest[..digits].parse::<usize>()
                && index < self.shortcodes.len()
            {
                return Some((start..digits_start + digits + marker.len_utf8(), index));
            }
            pos = digits_start;
        }
    }
}

/// Shortcodes in `markdown` that markdown leaves to plain text.
fn find_shortcodes<M: TextMatcher + ?Sized>(
    markdown: &str,
    matcher: &M,
) -> Vec<(Range<usize>, ShortcodeNode)> {
    let protected = protected_ranges(markdown);
    let mut shortcodes = Vec::new();
    let mut pos = 0;

    while let Some((start, found)) = matcher.find_next(markdown, pos) {
        if let Some(range) = containing(&protected, start) {
            tracing::trace!(start, "shortcode inside markdown construct");
            pos = range.end;
            continue;
        }
        if is_escaped(markdown, start) {
            tracing::trace!(start, "escaped start delimiter");
            pos = start + markdown[start..].chars().next().map_or(1, char::len_utf8);
            continue;
        }
        let end = start + found.consumed;
        shortcodes.push((start..end, found.node));
        pos = end;
    }

    shortcodes
}

/// Sorted, disjoint byte ranges where markdown wins over shortcodes.
fn protected_ranges(markdown: &str) -> Vec<Range<usize>> {
    let parser = Parser::new_ext(markdown, parser_options()).into_offset_iter();
    let mut ranges: Vec<Range<usize>> = parser
        .reference_definitions()
        .iter()
        .map(|(_, def)| def.span.clone())
        .collect();

    // Open links as `(start, end of link text)`; `None` for autolinks.
    let mut links: Vec<Option<(usize, usize)>> = Vec::new();

    for (event, range) in parser {
        match &event {
            Event::Start(Tag::Link { link_type, .. }) => {
                if matches!(link_type, LinkType::Autolink | LinkType::Email) {
                    ranges.push(range);
                    links.push(None);
                } else {
                    links.push(Some((range.start, range.start + 1)));
                }
                continue;
            }
            Event::End(TagEnd::Link) => {
                if let Some(Some((start, text_end))) = links.pop() {
                    ranges.push(start..start + 1);
                    ranges.push(text_end..range.end);
                }
                continue;
            }
            Event::Start(Tag::Image { .. } | Tag::CodeBlock(_) | Tag::HtmlBlock)
            | Event::Code(_)
            | Event::Html(_)
            | Event::InlineHtml(_) => ranges.push(range.clone()),
            _ => {}
        }

        if let Some(Some((_, text_end))) = links.last_mut() {
            *text_end = (*text_end).max(range.end);
        }
    }

    merge(ranges)
}

fn merge(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.retain(|range| !range.is_empty());
    ranges.sort_unstable_by_key(|range| range.start);

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

fn containing(ranges: &[Range<usize>], offset: usize) -> Option<&Range<usize>> {
    let index = ranges.partition_point(|range| range.end <= offset);
    ranges.get(index).filter(|range| range.start <= offset)
}

/// Whether the character at `offset` is backslash-escaped.
///
/// Markdown only escapes ASCII punctuation; before anything else a backslash
/// is literal.
fn is_escaped(markdown: &str, offset: usize) -> bool {
    let escapable = markdown[offset..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_punctuation());
    let backslashes = markdown[..offset]
        .bytes()
        .rev()
        .take_while(|&b| b == b'\\')
        .count();
    escapable && backslashes % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use shortcode_core::{DelimiterGrammar, Shortcodes};

    fn sources(markdown: &str) -> Vec<&str> {
        find_shortcodes(markdown, &Shortcodes::default())
            .into_iter()
            .map(|(range, _)| &markdown[range])
            .collect()
    }

    #[test]
    fn test_markup_inside_values_is_one_shortcode() {
        let markdown = r#"a [[ X title="a *b* c" href="https://x.com/_foo_" html="<b>" ]] z"#;
        let masked = mask(markdown, &Shortcodes::default());
        assert_eq!(masked.text(), "a \u{E000}0\u{E000} z");
        assert_eq!(
            masked.shortcodes[0].1.attributes.get("title"),
            Some("a *b* c")
        );
    }

    #[test]
    fn test_code_and_html_are_skipped() {
        assert_eq!(sources("`[[ a ]]` [[ b ]]"), vec!["[[ b ]]"]);
        assert_eq!(sources("```\n[[ a ]]\n```\n\n[[ b ]]"), vec!["[[ b ]]"]);
        assert_eq!(sources("<div>\n[[ a ]]\n</div>\n\n[[ b ]]"), vec!["[[ b ]]"]);
        assert_eq!(sources("<span>[[ a ]]</span>"), vec!["[[ a ]]"]);
    }

    #[test]
    fn test_link_destination_skipped_but_text_scanned() {
        assert_eq!(sources("[see [[ a ]]](http://x.com/[[ b ]])"), vec!["[[ a ]]"]);
        assert!(sources("![[[ a ]]](img.png)").is_empty());
        assert!(sources("<http://x.com/[[a]]>").is_empty());
    }

    #[test]
    fn test_links_win_over_bracket_delimiters() {
        let shortcodes = Shortcodes::new(DelimiterGrammar::new("[", "]").unwrap());
        let markdown = "[Bass](http://google.com) [youtube id=1]\n\n[ref]: /url\n\n[ref]";
        let found: Vec<_> = find_shortcodes(markdown, &shortcodes)
            .into_iter()
            .map(|(range, _)| &markdown[range])
            .collect();
        assert_eq!(found, vec!["[youtube id=1]"]);
    }

    #[test]
    fn test_escaped_start_delimiter() {
        assert!(sources(r"\[[ a ]]").is_empty());
        assert_eq!(sources(r"\\[[ a ]]"), vec!["[[ a ]]"]);
        assert_eq!(sources(r"\[[[ a ]]"), vec!["[[ a ]]"]);
    }

    #[test]
    fn test_escape_needs_punctuation() {
        let shortcodes = Shortcodes::new(DelimiterGrammar::new("sc(", ")").unwrap());
        let found = find_shortcodes(r"\sc( a )", &shortcodes);
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_marker_avoids_source_characters() {
        let markdown = "\u{E000} [[ a ]]";
        let masked = mask(markdown, &Shortcodes::default());
        assert_eq!(masked.marker, Some('\u{E001}'));
        assert_eq!(masked.text(), "\u{E000} \u{E001}0\u{E001}");
    }

    #[test]
    fn test_nothing_to_mask_borrows() {
        let masked = mask("plain *text*", &Shortcodes::default());
        assert!(matches!(masked.text, Cow::Borrowed(_)));
        assert_eq!(masked.marker, None);
    }

    #[test]
    fn test_split_and_restore() {
        let masked = mask("[[ a ]] and [[ b k=v ]]", &Shortcodes::default());
        let text = masked.text().to_owned();
        assert_eq!(
            masked.split(&text, &Shortcodes::default()),
            vec![
                Segment::Shortcode(ShortcodeNode::new("a")),
                Segment::Text(" and "),
                Segment::Shortcode(ShortcodeNode::new("b").with_attribute("k", "v")),
            ]
        );
        assert_eq!(masked.restore(text), "[[ a ]] and [[ b k=v ]]");
    }

    #[test]
    fn test_merge_nested_ranges() {
        assert_eq!(merge(vec![5..9, 0..3, 6..7, 2..4, 9..9]), vec![0..4, 5..9]);
    }

    #[test]
    fn test_containing() {
        let ranges = vec![0..4, 5..9];
        assert_eq!(containing(&ranges, 3), Some(&(0..4)));
        assert_eq!(containing(&ranges, 4), None);
        assert_eq!(containing(&ranges, 8), Some(&(5..9)));
        assert_eq!(containing(&ranges, 9), None);
    }
}
