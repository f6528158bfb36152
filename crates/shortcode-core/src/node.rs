//! Shortcode node and its ordered attribute map.

use indexmap::IndexMap;

use crate::attrs::is_key_char;
use crate::{DelimiterGrammar, NodeError};

/// Insertion-ordered attribute map.
///
/// Re-inserting an existing key replaces its value but keeps the key at its
/// original position. Equality ignores order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct Attributes(IndexMap<String, String>);

impl Attributes {
    /// Create an empty attribute map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an attribute, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Get an attribute value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Self::new();
        for (key, value) in iter {
            attrs.insert(key, value);
        }
        attrs
    }
}

/// A shortcode tag: identifier plus attributes.
///
/// Always a leaf in the document tree.
///
/// # Example
///
/// ```
/// use shortcode_core::ShortcodeNode;
///
/// let node = ShortcodeNode::new("Youtube").with_attribute("id", "3");
/// assert_eq!(node.identifier, "Youtube");
/// assert_eq!(node.attributes.get("id"), Some("3"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShortcodeNode {
    /// Tag name, case preserved.
    pub identifier: String,
    /// Attributes in source order.
    pub attributes: Attributes,
}

impl ShortcodeNode {
    /// Create a node without attributes.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            attributes: Attributes::new(),
        }
    }

    /// Add or overwrite an attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Check that serializing this node with `grammar` tokenizes back to an equal node.
    ///
    /// Nodes produced by the tokenizer always pass. Hand-built nodes may not:
    /// the identifier must be free of whitespace and of the closing delimiter,
    /// keys must be made of letters, digits, `_` or `-`, and values cannot
    /// contain `"` since quoted values have no escape syntax.
    ///
    /// The allow-list is not consulted; a node outside it serializes fine but
    /// will not be recognized again.
    pub fn check(&self, grammar: &DelimiterGrammar) -> Result<(), NodeError> {
        if self.identifier.is_empty() {
            return Err(NodeError::EmptyIdentifier);
        }
        if self.identifier.contains(char::is_whitespace)
            || self.identifier.contains(grammar.end_block())
        {
            return Err(NodeError::InvalidIdentifier(self.identifier.clone()));
        }

        for (key, value) in self.attributes.iter() {
            if key.is_empty() || !key.chars().all(is_key_char) {
                return Err(NodeError::InvalidKey(key.to_owned()));
            }
            if value.contains('"') {
                return Err(NodeError::QuoteInValue {
                    key: key.to_owned(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut attrs = Attributes::new();
        attrs.insert("a", "1");
        attrs.insert("b", "2");
        let previous = attrs.insert("a", "3");

        assert_eq!(previous, Some("1".to_owned()));
        assert_eq!(attrs.iter().collect::<Vec<_>>(), vec![("a", "3"), ("b", "2")]);
    }

    #[test]
    fn test_equality_ignores_order() {
        let left: Attributes = [("a", "1"), ("b", "2")].into_iter().collect();
        let right: Attributes = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(left, right);
        assert_eq!(left.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_hyphen_and_underscore_keys_distinct() {
        let node = ShortcodeNode::new("Youtube")
            .with_attribute("share_code", "abc")
            .with_attribute("share-code", "def");
        assert_eq!(node.attributes.len(), 2);
        assert_eq!(node.attributes.get("share_code"), Some("abc"));
        assert_eq!(node.attributes.get("share-code"), Some("def"));
    }

    #[test]
    fn test_check_accepts_valid_node() {
        let node = ShortcodeNode::new("Youtube")
            .with_attribute("href", "https://youtube.com?q=test")
            .with_attribute("empty", "");
        assert_eq!(node.check(&DelimiterGrammar::default()), Ok(()));
    }

    #[test]
    fn test_check_rejects_empty_identifier() {
        let node = ShortcodeNode::new("");
        assert_eq!(
            node.check(&DelimiterGrammar::default()),
            Err(NodeError::EmptyIdentifier)
        );
    }

    #[test]
    fn test_check_rejects_identifier_with_whitespace() {
        let node = ShortcodeNode::new("You tube");
        assert!(matches!(
            node.check(&DelimiterGrammar::default()),
            Err(NodeError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_check_rejects_identifier_with_end_block() {
        let grammar = DelimiterGrammar::new("[", "]").unwrap();
        let node = ShortcodeNode::new("a]b");
        assert!(matches!(
            node.check(&grammar),
            Err(NodeError::InvalidIdentifier(_))
        ));
        // Fine under the default grammar, where `]` alone is not a delimiter.
        assert_eq!(node.check(&DelimiterGrammar::default()), Ok(()));
    }

    #[test]
    fn test_check_rejects_bad_key() {
        let node = ShortcodeNode::new("x").with_attribute("a b", "1");
        assert_eq!(
            node.check(&DelimiterGrammar::default()),
            Err(NodeError::InvalidKey("a b".to_owned()))
        );
    }

    #[test]
    fn test_check_rejects_quote_in_value() {
        let node = ShortcodeNode::new("x").with_attribute("title", r#"say "hi""#);
        assert_eq!(
            node.check(&DelimiterGrammar::default()),
            Err(NodeError::QuoteInValue {
                key: "title".to_owned()
            })
        );
    }
}
