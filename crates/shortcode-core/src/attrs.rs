//! Attribute list parsing.
//!
//! Parses the `key=value key="quoted value"` run between a shortcode
//! identifier and the closing delimiter.

use std::collections::HashSet;

use crate::Attributes;

/// Characters allowed in attribute keys.
pub(crate) fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Attribute offsets already known to end in a failed match.
///
/// Offsets are recorded as the length of the remaining input, which
/// identifies a position in the scanned text without tracking a base offset.
/// Parsing from a given offset depends only on the text after it, so a
/// candidate reaching a dead offset fails without reparsing.
#[derive(Debug, Default)]
pub(crate) struct DeadEnds(HashSet<usize>);

/// Parse attributes up to the closing delimiter.
///
/// Returns the attributes and the remaining input, which starts with
/// `end_block`. Returns `None` if an attribute is malformed or the input ends
/// before `end_block`.
pub(crate) fn parse_attributes<'a>(
    s: &'a str,
    end_block: &str,
    dead_ends: &mut DeadEnds,
) -> Option<(Attributes, &'a str)> {
    let mut attrs = Attributes::new();
    let mut remaining = s;
    let mut visited = Vec::new();

    loop {
        remaining = remaining.trim_start();

        if remaining.starts_with(end_block) {
            return Some((attrs, remaining));
        }
        if remaining.is_empty() {
            tracing::trace!("unterminated shortcode");
            break;
        }
        if dead_ends.0.contains(&remaining.len()) {
            break;
        }

        visited.push(remaining.len());
        let Some((key, value, rest)) = parse_attribute(remaining, end_block) else {
            break;
        };
        attrs.insert(key, value);
        remaining = rest;
    }

    dead_ends.0.extend(visited);
    None
}

/// Parse a single `key=value` or `key="value"` pair.
///
/// Returns `(key, value, rest)`.
fn parse_attribute<'a>(s: &'a str, end_block: &str) -> Option<(&'a str, &'a str, &'a str)> {
    let key_end = s.find(|c: char| !is_key_char(c)).unwrap_or(s.len());
    let key = &s[..key_end];

    let Some(after_eq) = s[key_end..].strip_prefix('=') else {
        tracing::trace!(key, "attribute without '='");
        return None;
    };
    if key.is_empty() {
        tracing::trace!("attribute without key");
        return None;
    }

    if let Some(quoted) = after_eq.strip_prefix('"') {
        let Some(end_quote) = quoted.find('"') else {
            tracing::trace!(key, "unterminated quoted value");
            return None;
        };
        return Some((key, &quoted[..end_quote], &quoted[end_quote + 1..]));
    }

    let end = token_end(after_eq, end_block);
    let value = &after_eq[..end];
    if value.contains('"') {
        tracing::trace!(key, "quote inside bare value");
        return None;
    }
    Some((key, value, &after_eq[end..]))
}

/// Byte length of a bare token: up to whitespace or the closing delimiter.
pub(crate) fn token_end(s: &str, end_block: &str) -> usize {
    s.char_indices()
        .find(|&(i, c)| c.is_whitespace() || s[i..].starts_with(end_block))
        .map_or(s.len(), |(i, _)| i)
}
