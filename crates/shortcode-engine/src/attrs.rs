//! Shortcode attribute parsing.
//!
//! Parses the raw attribute run of an opening tag, e.g. the
//! `width=560 title="My Video"` part of `[@video width=560 title="My Video"]`.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Parsed attribute map of a single shortcode occurrence.
pub type Attributes = HashMap<String, AttrValue>;

/// Matches one `name = value` pair with a double-quoted, single-quoted, or
/// bare unquoted value.
static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([\w-]+)\s*=\s*(?:"([^"]*)"|'([^']*)'|(\S+))"#).unwrap()
});

/// Values coerced to numbers: optional leading `-`, digits, optional fraction.
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d+)?$").unwrap());

/// A single attribute value.
///
/// Numeric-looking values (`width=560`, `offset="-1.5"`) are coerced to
/// [`Number`](Self::Number); everything else stays [`Text`](Self::Text),
/// including the empty string from `attr=""`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    /// Numeric value.
    Number(f64),
    /// String value.
    Text(String),
}

impl AttrValue {
    /// The string form of this value, or `None` for numbers.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }

    /// The numeric form of this value, or `None` for text.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Parse a raw attribute string into an [`Attributes`] map.
///
/// Backslash-escaped quotes (`\"`, `\'`) are collapsed to their literal quote
/// before matching, so pre-escaped values round-trip. Malformed input never
/// fails; text with no recognizable pairs yields an empty map.
///
/// # Example
///
/// ```
/// use shortcode_engine::{AttrValue, parse_attributes};
///
/// let attrs = parse_attributes(Some(r#"n=5 s="hi""#));
/// assert_eq!(attrs.get("n"), Some(&AttrValue::Number(5.0)));
/// assert_eq!(attrs.get("s"), Some(&AttrValue::Text("hi".to_owned())));
/// ```
#[must_use]
pub fn parse_attributes(raw: Option<&str>) -> Attributes {
    let Some(raw) = raw else {
        return Attributes::new();
    };

    let unescaped = raw.replace(r#"\""#, "\"").replace(r"\'", "'");
    let mut attrs = Attributes::new();

    for caps in ATTR_RE.captures_iter(&unescaped) {
        let Some(name) = caps.get(1) else { continue };
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        attrs.insert(name.as_str().to_owned(), coerce(value));
    }

    attrs
}

/// Coerce a raw value: numbers become [`AttrValue::Number`], the rest stays text.
fn coerce(value: &str) -> AttrValue {
    if NUMBER_RE.is_match(value) {
        if let Ok(n) = value.parse::<f64>() {
            return AttrValue::Number(n);
        }
    }
    AttrValue::Text(value.to_owned())
}
