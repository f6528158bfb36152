//! Configured parse/stringify pair.

use shortcode_core::{DelimiterGrammar, GrammarError, GrammarOptions, Shortcodes};

use crate::ast::Root;
use crate::parser::parse;
use crate::stringify::stringify;

/// Markdown processor with shortcode support.
///
/// Parsing and stringifying share one grammar, so anything the processor
/// writes it reads back as the same tree.
///
/// # Example
///
/// ```
/// use shortcode_core::GrammarOptions;
/// use shortcode_markdown::MarkdownProcessor;
///
/// let processor = MarkdownProcessor::from_options(GrammarOptions {
///     start_block: Some("{{%".to_owned()),
///     end_block: Some("%}}".to_owned()),
///     capture_only: None,
/// })
/// .unwrap();
///
/// assert_eq!(
///     processor.normalize("{{% Youtube id=3 %}}"),
///     "{{% Youtube id=\"3\" %}}\n"
/// );
/// ```
#[derive(Clone, Debug, Default)]
pub struct MarkdownProcessor {
    shortcodes: Shortcodes,
}

impl MarkdownProcessor {
    /// Create a processor for a grammar.
    #[must_use]
    pub fn new(grammar: DelimiterGrammar) -> Self {
        Self {
            shortcodes: Shortcodes::new(grammar),
        }
    }

    /// Create a processor from user options.
    ///
    /// # Errors
    ///
    /// Returns [`GrammarError`] if the options do not form a valid grammar.
    pub fn from_options(options: GrammarOptions) -> Result<Self, GrammarError> {
        DelimiterGrammar::from_options(options).map(Self::new)
    }

    /// Grammar in use.
    #[must_use]
    pub fn grammar(&self) -> &DelimiterGrammar {
        self.shortcodes.grammar()
    }

    /// Parse markdown into a document tree.
    #[must_use]
    pub fn parse(&self, markdown: &str) -> Root {
        parse(markdown, &self.shortcodes)
    }

    /// Render a document tree to markdown.
    #[must_use]
    pub fn stringify(&self, root: &Root) -> String {
        stringify(root, &self.shortcodes)
    }

    /// Parse and stringify, producing the canonical form of `markdown`.
    #[must_use]
    pub fn normalize(&self, markdown: &str) -> String {
        self.stringify(&self.parse(markdown))
    }
}
