//! Shortcode occurrence scanning.
//!
//! Finds `[@name attrs]content[/@name]` and self-closing `[@name attrs]`
//! occurrences in a string without invoking any handler.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::attrs::{Attributes, parse_attributes};

/// Matches an opening tag: optional escaping backslash, `[@`, tag name, and
/// an attribute run (no brackets), all with optional whitespace between, up
/// to the closing `]`.
static OPEN_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\\)?\[@\s*([\w@-]+)\s*([^\[\]]*?)\s*\]").unwrap());

/// A parsed shortcode occurrence, prior to handler invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcodeMatch {
    /// Tag identifier (word characters, hyphens, `@`).
    pub name: String,
    /// Raw text between opening and closing tags; empty when self-closing.
    pub content: String,
    /// Parsed attributes from the opening tag.
    pub attributes: Attributes,
    /// The exact substring consumed, including a leading `\` when escaped.
    pub full_match: String,
    /// Byte offset of the match in the scanned input.
    pub start: usize,
}

impl ShortcodeMatch {
    /// Whether this occurrence was escaped with a leading backslash.
    #[must_use]
    pub fn is_escaped(&self) -> bool {
        self.full_match.starts_with('\\')
    }

    /// Byte offset one past the end of the match in the scanned input.
    #[must_use]
    pub fn end(&self) -> usize {
        self.start + self.full_match.len()
    }
}

/// Cheap pre-check for shortcode syntax.
///
/// Used to skip full scanning on strings that cannot contain an occurrence.
#[must_use]
pub fn contains_shortcode(input: &str) -> bool {
    input.contains("[@")
}

/// Scan `input` for shortcode occurrences, left to right, non-overlapping.
///
/// A matching closer `[/@name]` pairs non-greedily: the first closer after
/// the opening tag terminates the occurrence. An opening tag with no closer
/// is self-closing with empty content. Escaped occurrences are still
/// reported (so the evaluator can strip the backslash); malformed or
/// unterminated opening tags are not matches at all.
#[must_use]
pub fn parse_to_matches(input: &str) -> Vec<ShortcodeMatch> {
    let mut matches = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let Some(caps) = OPEN_TAG_RE.captures(&input[pos..]) else {
            break;
        };
        let Some(open) = caps.get(0) else { break };
        let name = caps.get(2).map_or("", |m| m.as_str());
        let raw_attrs = caps.get(3).map(|m| m.as_str());

        let start = pos + open.start();
        let open_end = pos + open.end();

        let closer = format!("[/@{name}]");
        let (content, end) = match input[open_end..].find(&closer) {
            Some(idx) => (
                &input[open_end..open_end + idx],
                open_end + idx + closer.len(),
            ),
            None => ("", open_end),
        };

        matches.push(ShortcodeMatch {
            name: name.to_owned(),
            content: content.to_owned(),
            attributes: parse_attributes(raw_attrs),
            full_match: input[start..end].to_owned(),
            start,
        });
        pos = end;
    }

    matches
}
