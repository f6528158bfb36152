//! Markdown document tree.
//!
//! Shaped after mdast: every node serializes with a `type` tag, so a parsed
//! document can be compared against JSON fixtures.

use serde::Serialize;
use shortcode_core::ShortcodeNode;

/// Document root.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "root")]
pub struct Root {
    /// Top-level blocks.
    pub children: Vec<Block>,
}

/// Block-level node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Block {
    /// Paragraph of inline content.
    Paragraph {
        /// Inline children.
        children: Vec<Inline>,
    },
    /// ATX or setext heading.
    Heading {
        /// Level 1-6.
        depth: u8,
        /// Inline children.
        children: Vec<Inline>,
    },
    /// Block quote.
    Blockquote {
        /// Quoted blocks.
        children: Vec<Block>,
    },
    /// Ordered or bullet list.
    List {
        /// Whether the list is numbered.
        ordered: bool,
        /// First number of an ordered list.
        #[serde(skip_serializing_if = "Option::is_none")]
        start: Option<u64>,
        /// Loose list (items separated by blank lines).
        spread: bool,
        /// List items.
        children: Vec<ListItem>,
    },
    /// Fenced or indented code block.
    Code {
        /// First word of the info string.
        lang: Option<String>,
        /// Rest of the info string.
        meta: Option<String>,
        /// Code without the final newline.
        value: String,
    },
    /// Raw HTML block.
    Html {
        /// HTML source.
        value: String,
    },
    /// Horizontal rule.
    ThematicBreak,
    /// Shortcode standing on its own line.
    Shortcode(ShortcodeNode),
}

impl Block {
    /// Create a paragraph.
    #[must_use]
    pub fn paragraph(children: Vec<Inline>) -> Self {
        Self::Paragraph { children }
    }
}

/// Item of a [`Block::List`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "listItem")]
pub struct ListItem {
    /// Item content.
    pub children: Vec<Block>,
}

/// Inline node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inline {
    /// Literal text. Soft line breaks are kept as `\n`.
    Text {
        /// Decoded text.
        value: String,
    },
    /// Code span.
    InlineCode {
        /// Code content.
        value: String,
    },
    /// Emphasis (`*text*`).
    Emphasis {
        /// Inline children.
        children: Vec<Inline>,
    },
    /// Strong emphasis (`**text**`).
    Strong {
        /// Inline children.
        children: Vec<Inline>,
    },
    /// Link, including autolinks and resolved reference links.
    Link {
        /// Destination.
        url: String,
        /// Optional title.
        title: Option<String>,
        /// Link text.
        children: Vec<Inline>,
    },
    /// Image.
    Image {
        /// Source.
        url: String,
        /// Optional title.
        title: Option<String>,
        /// Plain-text alternative.
        alt: String,
    },
    /// Inline raw HTML.
    Html {
        /// HTML source.
        value: String,
    },
    /// Hard line break.
    Break,
    /// Shortcode inside flowing text.
    Shortcode(ShortcodeNode),
}

impl Inline {
    /// Create a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Concatenated plain text of this node and its descendants.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { value } | Self::InlineCode { value } => out.push_str(value),
            Self::Image { alt, .. } => out.push_str(alt),
            Self::Emphasis { children } | Self::Strong { children } | Self::Link { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            Self::Break => out.push('\n'),
            Self::Html { .. } | Self::Shortcode(_) => {}
        }
    }
}

/// Append an inline, merging it into a preceding text node when both are text.
pub(crate) fn push_inline(children: &mut Vec<Inline>, inline: Inline) {
    if let Inline::Text { value } = &inline
        && let Some(Inline::Text { value: last }) = children.last_mut()
    {
        last.push_str(value);
        return;
    }
    children.push(inline);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_push_inline_merges_text() {
        let mut children = Vec::new();
        push_inline(&mut children, Inline::text("a"));
        push_inline(&mut children, Inline::text("b"));
        push_inline(&mut children, Inline::Break);
        push_inline(&mut children, Inline::text("c"));
        assert_eq!(
            children,
            vec![Inline::text("ab"), Inline::Break, Inline::text("c")]
        );
    }

    #[test]
    fn test_plain_text() {
        let link = Inline::Link {
            url: "u".to_owned(),
            title: None,
            children: vec![
                Inline::text("a "),
                Inline::Emphasis {
                    children: vec![Inline::text("b")],
                },
            ],
        };
        assert_eq!(link.plain_text(), "a b");
    }

    #[test]
    fn test_serialize_shape() {
        let root = Root {
            children: vec![
                Block::paragraph(vec![Inline::text("Drum and Bass")]),
                Block::Shortcode(ShortcodeNode::new("Youtube").with_attribute("id", "3")),
                Block::ThematicBreak,
            ],
        };

        assert_eq!(
            serde_json::to_value(&root).unwrap(),
            json!({
                "type": "root",
                "children": [
                    {
                        "type": "paragraph",
                        "children": [{ "type": "text", "value": "Drum and Bass" }]
                    },
                    {
                        "type": "shortcode",
                        "identifier": "Youtube",
                        "attributes": { "id": "3" }
                    },
                    { "type": "thematicBreak" }
                ]
            })
        );
    }

    #[test]
    fn test_serialize_keeps_attribute_order() {
        let node = Inline::Shortcode(
            ShortcodeNode::new("x")
                .with_attribute("b", "1")
                .with_attribute("a", "2"),
        );
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"type":"shortcode","identifier":"x","attributes":{"b":"1","a":"2"}}"#
        );
    }
}
