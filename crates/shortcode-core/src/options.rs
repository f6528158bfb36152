//! User-facing grammar options.
//!
//! Mirrors the `{ startBlock?, endBlock?, captureOnly? }` option object.
//! With the `serde` feature the struct deserializes from any serde format
//! using those camelCase keys; unset keys fall back to the defaults when the
//! options are turned into a [`DelimiterGrammar`](crate::DelimiterGrammar).

/// Unvalidated grammar options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct GrammarOptions {
    /// Opening delimiter (default `[[`).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub start_block: Option<String>,
    /// Closing delimiter (default `]]`).
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub end_block: Option<String>,
    /// Identifiers to recognize; all identifiers when unset.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub capture_only: Option<Vec<String>>,
}
