//! Canonical text output for shortcode nodes.

use std::fmt::{self, Write};

use crate::{DelimiterGrammar, ShortcodeNode};

/// Serialize a node to its canonical form.
///
/// Output is `start identifier key="value" ... end` with one space of padding
/// inside the delimiters. Values are always double-quoted and never escaped.
///
/// # Example
///
/// ```
/// use shortcode_core::{DelimiterGrammar, ShortcodeNode, serialize};
///
/// let node = ShortcodeNode::new("Youtube").with_attribute("id", "3");
/// assert_eq!(serialize(&node, &DelimiterGrammar::default()), r#"[[ Youtube id="3" ]]"#);
/// ```
pub fn serialize(node: &ShortcodeNode, grammar: &DelimiterGrammar) -> String {
    let mut out = String::with_capacity(serialized_len_hint(node, grammar));
    out.push_str(grammar.start_block());
    out.push(' ');
    out.push_str(&node.identifier);
    for (key, value) in node.attributes.iter() {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(value);
        out.push('"');
    }
    out.push(' ');
    out.push_str(grammar.end_block());
    out
}

/// Write a node's canonical form into any [`fmt::Write`] sink.
///
/// # Errors
///
/// Returns the sink's error if a write fails.
pub fn write_shortcode<W: Write>(
    out: &mut W,
    node: &ShortcodeNode,
    grammar: &DelimiterGrammar,
) -> fmt::Result {
    out.write_str(&serialize(node, grammar))
}

fn serialized_len_hint(node: &ShortcodeNode, grammar: &DelimiterGrammar) -> usize {
    let attrs: usize = node
        .attributes
        .iter()
        .map(|(key, value)| key.len() + value.len() + 4)
        .sum();
    grammar.start_block().len() + grammar.end_block().len() + node.identifier.len() + attrs + 2
}
