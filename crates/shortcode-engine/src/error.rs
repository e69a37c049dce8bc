//! Error types for shortcode parsing and handler registration.

/// Boxed error type returned by shortcode handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error from shortcode engine operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ShortcodeError {
    /// Shortcode name rejected by registration.
    ///
    /// Names may only contain word characters, hyphens, and `@`.
    #[error("invalid shortcode name: {0:?}")]
    InvalidName(String),

    /// A synchronous entry point was called while the registry holds at
    /// least one asynchronous handler.
    #[error("registry contains async handlers; use the async parse API")]
    AsyncNotAllowed,

    /// A handler returned an error during evaluation.
    #[error("shortcode handler {name:?} failed")]
    Handler {
        /// Name of the failing shortcode.
        name: String,
        /// The error returned by the handler.
        #[source]
        source: BoxError,
    },
}

impl ShortcodeError {
    /// Wrap a handler failure with the shortcode name it came from.
    pub(crate) fn handler(name: &str, source: BoxError) -> Self {
        Self::Handler {
            name: name.to_owned(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_display() {
        let err = ShortcodeError::handler("boom", "broken".into());
        assert_eq!(err.to_string(), r#"shortcode handler "boom" failed"#);
    }

    #[test]
    fn test_handler_error_source_chain() {
        use std::error::Error as _;

        let err = ShortcodeError::handler("boom", "broken".into());
        let source = err.source().expect("source attached");
        assert_eq!(source.to_string(), "broken");
    }
}
