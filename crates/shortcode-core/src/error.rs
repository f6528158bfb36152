//! Error types for grammar construction and node checks.
//!
//! Tokenizing never fails: text that is not a shortcode is simply not matched.
//! These errors only come from building a [`DelimiterGrammar`](crate::DelimiterGrammar)
//! or checking a hand-built [`ShortcodeNode`](crate::ShortcodeNode).

/// Invalid delimiter grammar configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    /// A delimiter is the empty string.
    #[error("{field} cannot be empty")]
    EmptyDelimiter {
        /// Which delimiter (`startBlock` or `endBlock`).
        field: &'static str,
    },
    /// Opening and closing delimiters are the same string.
    #[error("startBlock and endBlock must differ (both are {0:?})")]
    SameDelimiters(String),
    /// A delimiter contains whitespace.
    #[error("{field} cannot contain whitespace: {value:?}")]
    WhitespaceInDelimiter {
        /// Which delimiter (`startBlock` or `endBlock`).
        field: &'static str,
        /// The rejected delimiter.
        value: String,
    },
    /// An allow-list entry is the empty string.
    #[error("captureOnly entries cannot be empty")]
    EmptyCaptureIdentifier,
}

/// A shortcode node that would not survive a serialize/tokenize round-trip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    /// Identifier is empty.
    #[error("identifier cannot be empty")]
    EmptyIdentifier,
    /// Identifier contains whitespace or the closing delimiter.
    #[error("invalid identifier {0:?}")]
    InvalidIdentifier(String),
    /// Attribute key is empty or contains characters other than letters, digits, `_`, `-`.
    #[error("invalid attribute key {0:?}")]
    InvalidKey(String),
    /// Attribute value contains a double quote, which has no escape syntax.
    #[error("attribute {key:?} has a value containing '\"'")]
    QuoteInValue {
        /// Key of the offending attribute.
        key: String,
    },
}
