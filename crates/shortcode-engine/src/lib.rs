//! Recursive shortcode template engine with pluggable handlers.
//!
//! Scans strings (and JSON-like trees of strings) for bracketed directives of
//! the form `[@name attr="value"]content[/@name]`, resolves them against a
//! registry of named handlers, and rewrites the input with handler output.
//! Nested shortcodes resolve from innermost to outermost, so a handler always
//! sees fully substituted content.
//!
//! # Architecture
//!
//! - **Matcher** ([`parse_to_matches`]): finds ordered, non-overlapping
//!   occurrences without invoking any handler.
//! - **Attribute parser** ([`parse_attributes`]): turns the raw attribute run
//!   into a typed map, coercing numeric-looking values.
//! - **Evaluator** ([`ShortcodeEngine::parse_string`] /
//!   [`ShortcodeEngine::parse_string_sync`]): splices handler output into the
//!   text, recursing into nested content first. Handlers run strictly in
//!   match order; the sync entry points refuse to run at all while any async
//!   handler is registered.
//! - **Object walker** ([`ShortcodeEngine::parse_object`] /
//!   [`ShortcodeEngine::parse_object_sync`]): routes every string leaf of a
//!   [`serde_json::Value`] tree through the evaluator, dropping (and logging)
//!   entries whose handlers fail.
//!
//! Unrecognized shortcode names pass through verbatim, malformed syntax is
//! plain text, and a leading backslash escapes an occurrence.
//!
//! # Example
//!
//! ```
//! use shortcode_engine::{Handler, ShortcodeEngine};
//!
//! let mut engine = ShortcodeEngine::new();
//! engine.add_shortcode("kbd", Handler::sync(|call| {
//!     Ok(format!("<kbd>{}</kbd>", call.content))
//! }))?;
//!
//! let result = engine.parse_string_sync(r"Press [@kbd]Ctrl+C[/@kbd], not \[@kbd].")?;
//! assert_eq!(result.text, "Press <kbd>Ctrl+C</kbd>, not [@kbd].");
//! # Ok::<(), shortcode_engine::ShortcodeError>(())
//! ```

mod attrs;
mod engine;
mod error;
mod handler;
mod matcher;
mod registry;
mod walker;

pub use attrs::{AttrValue, Attributes, parse_attributes};
pub use engine::{EngineConfig, ParseResult, ShortcodeEngine};
pub use error::{BoxError, ShortcodeError};
pub use handler::{BoxFuture, Handler, HandlerResult, ShortcodeCall};
pub use matcher::{ShortcodeMatch, contains_shortcode, parse_to_matches};
