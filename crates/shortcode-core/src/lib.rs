//! Shortcode grammar for markdown hosts.
//!
//! Recognizes delimited tags such as `[[ Youtube id="3" ]]` in text and turns
//! them into [`ShortcodeNode`]s, and renders nodes back to a canonical form
//! that tokenizes to the same node.
//!
//! # Architecture
//!
//! - [`DelimiterGrammar`]: delimiters (default `[[` / `]]`) plus an optional
//!   identifier allow-list, built directly or from [`GrammarOptions`]
//! - [`match_at`] / [`find_next`]: the tokenizer
//! - [`serialize`]: the canonical renderer
//! - [`TextMatcher`] / [`NodeRenderer`]: the two extension points a markup
//!   host calls, both implemented by [`Shortcodes`]
//!
//! The crate knows nothing about markdown. Keeping the matcher out of code
//! spans, and letting links win over colliding delimiters, is the host's job.
//!
//! Tokenizing never fails. Text that does not form a complete shortcode is
//! reported as no match and stays literal text.
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for nodes and options. Options use
//!   the camelCase keys `startBlock`, `endBlock` and `captureOnly`.
//!
//! # Example
//!
//! ```
//! use shortcode_core::{DelimiterGrammar, match_at, serialize};
//!
//! let grammar = DelimiterGrammar::default();
//! let found = match_at("[[ Youtube id=3 ]]", 0, &grammar).unwrap();
//!
//! assert_eq!(serialize(&found.node, &grammar), r#"[[ Youtube id="3" ]]"#);
//! ```

mod attrs;
mod error;
mod extension;
mod grammar;
mod node;
mod options;
mod serializer;
mod tokenizer;

pub use error::{GrammarError, NodeError};
pub use extension::{NodeRenderer, Segment, Shortcodes, TextMatcher};
pub use grammar::{DEFAULT_END_BLOCK, DEFAULT_START_BLOCK, DelimiterGrammar};
pub use node::{Attributes, ShortcodeNode};
pub use options::GrammarOptions;
pub use serializer::{serialize, write_shortcode};
pub use tokenizer::{ShortcodeMatch, find_next, match_at};
