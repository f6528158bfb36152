//! Delimiter grammar shared by the tokenizer and the serializer.

use std::collections::BTreeSet;

use crate::{GrammarError, GrammarOptions};

/// Default opening delimiter.
pub const DEFAULT_START_BLOCK: &str = "[[";

/// Default closing delimiter.
pub const DEFAULT_END_BLOCK: &str = "]]";

/// Delimiters and identifier allow-list for shortcodes.
///
/// Validated once at construction and immutable afterwards. The same instance
/// should drive both tokenizing and serializing so that output re-tokenizes.
///
/// # Example
///
/// ```
/// use shortcode_core::DelimiterGrammar;
///
/// let grammar = DelimiterGrammar::new("[", "]")
///     .unwrap()
///     .with_capture_only(["youtube"])
///     .unwrap();
///
/// assert_eq!(grammar.start_block(), "[");
/// assert!(grammar.captures("youtube"));
/// assert!(!grammar.captures("Bass"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterGrammar {
    start_block: String,
    end_block: String,
    capture_only: Option<BTreeSet<String>>,
}

impl Default for DelimiterGrammar {
    fn default() -> Self {
        Self {
            start_block: DEFAULT_START_BLOCK.to_owned(),
            end_block: DEFAULT_END_BLOCK.to_owned(),
            capture_only: None,
        }
    }
}

impl DelimiterGrammar {
    /// Create a grammar with custom delimiters and no allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] if either delimiter is empty or contains
    /// whitespace, or if both delimiters are equal.
    pub fn new(
        start_block: impl Into<String>,
        end_block: impl Into<String>,
    ) -> Result<Self, GrammarError> {
        let start_block = start_block.into();
        let end_block = end_block.into();

        validate_delimiter(&start_block, "startBlock")?;
        validate_delimiter(&end_block, "endBlock")?;
        if start_block == end_block {
            return Err(GrammarError::SameDelimiters(start_block));
        }

        Ok(Self {
            start_block,
            end_block,
            capture_only: None,
        })
    }

    /// Restrict recognized shortcodes to the given identifiers.
    ///
    /// Matching is case-sensitive.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError::EmptyCaptureIdentifier`] if any identifier is empty.
    pub fn with_capture_only<I, S>(mut self, identifiers: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = BTreeSet::new();
        for identifier in identifiers {
            let identifier = identifier.into();
            if identifier.is_empty() {
                return Err(GrammarError::EmptyCaptureIdentifier);
            }
            set.insert(identifier);
        }
        self.capture_only = Some(set);
        Ok(self)
    }

    /// Build a grammar from options, filling unset fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] if the resulting grammar is invalid.
    pub fn from_options(options: GrammarOptions) -> Result<Self, GrammarError> {
        let grammar = Self::new(
            options
                .start_block
                .unwrap_or_else(|| DEFAULT_START_BLOCK.to_owned()),
            options
                .end_block
                .unwrap_or_else(|| DEFAULT_END_BLOCK.to_owned()),
        )?;

        match options.capture_only {
            Some(identifiers) => grammar.with_capture_only(identifiers),
            None => Ok(grammar),
        }
    }

    /// Opening delimiter.
    pub fn start_block(&self) -> &str {
        &self.start_block
    }

    /// Closing delimiter.
    pub fn end_block(&self) -> &str {
        &self.end_block
    }

    /// Identifier allow-list, if configured.
    pub fn capture_only(&self) -> Option<&BTreeSet<String>> {
        self.capture_only.as_ref()
    }

    /// Whether a shortcode with this identifier should be captured.
    ///
    /// Always `true` when no allow-list is configured.
    pub fn captures(&self, identifier: &str) -> bool {
        self.capture_only
            .as_ref()
            .is_none_or(|allowed| allowed.contains(identifier))
    }
}

impl TryFrom<GrammarOptions> for DelimiterGrammar {
    type Error = GrammarError;

    fn try_from(options: GrammarOptions) -> Result<Self, Self::Error> {
        Self::from_options(options)
    }
}

fn validate_delimiter(value: &str, field: &'static str) -> Result<(), GrammarError> {
    if value.is_empty() {
        return Err(GrammarError::EmptyDelimiter { field });
    }
    if value.contains(char::is_whitespace) {
        return Err(GrammarError::WhitespaceInDelimiter {
            field,
            value: value.to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_delimiters() {
        let grammar = DelimiterGrammar::default();
        assert_eq!(grammar.start_block(), "[[");
        assert_eq!(grammar.end_block(), "]]");
        assert_eq!(grammar.capture_only(), None);
    }

    #[test]
    fn test_custom_delimiters() {
        let grammar = DelimiterGrammar::new("{{%", "%}}").unwrap();
        assert_eq!(grammar.start_block(), "{{%");
        assert_eq!(grammar.end_block(), "%}}");
    }

    #[test]
    fn test_empty_start_rejected() {
        let err = DelimiterGrammar::new("", "]]").unwrap_err();
        assert_eq!(err, GrammarError::EmptyDelimiter { field: "startBlock" });
    }

    #[test]
    fn test_empty_end_rejected() {
        let err = DelimiterGrammar::new("[[", "").unwrap_err();
        assert_eq!(err, GrammarError::EmptyDelimiter { field: "endBlock" });
    }

    #[test]
    fn test_same_delimiters_rejected() {
        let err = DelimiterGrammar::new("%%", "%%").unwrap_err();
        assert_eq!(err, GrammarError::SameDelimiters("%%".to_owned()));
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_whitespace_delimiter_rejected() {
        let err = DelimiterGrammar::new("[ ", "]").unwrap_err();
        assert!(matches!(
            err,
            GrammarError::WhitespaceInDelimiter {
                field: "startBlock",
                ..
            }
        ));
    }

    #[test]
    fn test_captures_without_allow_list() {
        let grammar = DelimiterGrammar::default();
        assert!(grammar.captures("anything"));
    }

    #[test]
    fn test_captures_is_case_sensitive() {
        let grammar = DelimiterGrammar::default()
            .with_capture_only(["youtube"])
            .unwrap();
        assert!(grammar.captures("youtube"));
        assert!(!grammar.captures("Youtube"));
    }

    #[test]
    fn test_empty_capture_identifier_rejected() {
        let err = DelimiterGrammar::default()
            .with_capture_only(["youtube", ""])
            .unwrap_err();
        assert_eq!(err, GrammarError::EmptyCaptureIdentifier);
    }

    #[test]
    fn test_from_options_defaults() {
        let grammar = DelimiterGrammar::from_options(GrammarOptions::default()).unwrap();
        assert_eq!(grammar, DelimiterGrammar::default());
    }

    #[test]
    fn test_from_options_partial() {
        let options = GrammarOptions {
            end_block: Some("]]]".to_owned()),
            ..Default::default()
        };
        let grammar = DelimiterGrammar::try_from(options).unwrap();
        assert_eq!(grammar.start_block(), "[[");
        assert_eq!(grammar.end_block(), "]]]");
    }

    #[test]
    fn test_from_options_invalid() {
        let options = GrammarOptions {
            start_block: Some("]]".to_owned()),
            ..Default::default()
        };
        assert!(DelimiterGrammar::from_options(options).is_err());
    }
}
