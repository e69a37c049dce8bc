//! The shortcode engine: registry ownership, evaluation, and the public
//! parse entry points.

use std::task::{Context, Poll, Waker};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ShortcodeError;
use crate::handler::{BoxFuture, Handler, ShortcodeCall};
use crate::matcher::{self, ShortcodeMatch};
use crate::registry::{Registry, validate_name};
use crate::walker;

/// Configuration for [`ShortcodeEngine`].
///
/// # Example
///
/// ```
/// use shortcode_engine::{EngineConfig, Handler, ShortcodeEngine};
///
/// let config = EngineConfig::new()
///     .with_cwd("/srv/app")
///     .with_default("greet", Handler::sync(|_| Ok("hello".to_owned())));
/// let engine = ShortcodeEngine::with_config(config)?;
/// # Ok::<(), shortcode_engine::ShortcodeError>(())
/// ```
#[derive(Default)]
pub struct EngineConfig {
    /// Working-directory string returned by the built-in `cwd` shortcode.
    ///
    /// Default: unset (the built-in returns the empty string).
    cwd: Option<String>,
    /// Handlers re-registered alongside the built-ins by every
    /// [`ShortcodeEngine::clear`] call.
    defaults: Vec<(String, Handler)>,
}

impl EngineConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the working-directory string for the built-in `cwd` shortcode.
    #[must_use]
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add a default handler, kept across [`ShortcodeEngine::clear`] calls.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>, handler: Handler) -> Self {
        self.defaults.push((name.into(), handler));
        self
    }
}

/// Result of parsing one string: the substituted text plus the matches the
/// matcher found, for introspection by callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// The input with every resolved shortcode replaced by handler output.
    pub text: String,
    /// All occurrences found in the input, including escaped and
    /// unrecognized ones.
    pub matches: Vec<ShortcodeMatch>,
}

/// Recursive shortcode template engine.
///
/// Owns the handler registry, seeded with the `cwd`, `date`, and `time`
/// built-ins. Strings are evaluated all-or-nothing (a failing
/// handler aborts the call); object trees are best-effort per entry.
///
/// # Example
///
/// ```
/// use shortcode_engine::{Handler, ShortcodeEngine};
///
/// let mut engine = ShortcodeEngine::new();
/// engine.add_shortcode("upper", Handler::sync(|call| Ok(call.content.to_uppercase())))?;
///
/// let result = engine.parse_string_sync("say [@upper]hi[/@upper]")?;
/// assert_eq!(result.text, "say HI");
/// # Ok::<(), shortcode_engine::ShortcodeError>(())
/// ```
#[derive(Debug)]
pub struct ShortcodeEngine {
    registry: Registry,
}

impl Default for ShortcodeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcodeEngine {
    /// Create an engine with only the built-in shortcodes registered.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(String::new(), Vec::new()),
        }
    }

    /// Create an engine from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcodeError::InvalidName`] if a default handler's name
    /// fails validation.
    pub fn with_config(config: EngineConfig) -> Result<Self, ShortcodeError> {
        for (name, _) in &config.defaults {
            validate_name(name)?;
        }
        Ok(Self {
            registry: Registry::new(config.cwd.unwrap_or_default(), config.defaults),
        })
    }

    /// Register a handler under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcodeError::InvalidName`] if `name` contains characters
    /// outside `[\w@-]`. The registry is untouched on rejection.
    pub fn add_shortcode(&mut self, name: &str, handler: Handler) -> Result<(), ShortcodeError> {
        self.registry.add(name, handler)
    }

    /// Discard all handlers, then re-register the built-ins and the default
    /// set supplied at construction.
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Whether any registered handler requires asynchronous execution.
    ///
    /// While true, every `*_sync` entry point fails with
    /// [`ShortcodeError::AsyncNotAllowed`] — even for input that references
    /// no async handler. The flag only resets on [`clear`](Self::clear).
    #[must_use]
    pub fn has_async_handlers(&self) -> bool {
        self.registry.has_async()
    }

    /// Substitute every resolvable shortcode in `input`, awaiting handlers
    /// in match order.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcodeError::Handler`] if any handler fails; the whole
    /// call aborts and no partial text is returned.
    pub async fn parse_string(&self, input: &str) -> Result<ParseResult, ShortcodeError> {
        let (text, matches) = self.eval(input).await?;
        Ok(ParseResult { text, matches })
    }

    /// Blocking variant of [`parse_string`](Self::parse_string).
    ///
    /// # Errors
    ///
    /// Returns [`ShortcodeError::AsyncNotAllowed`] before processing any
    /// input if the registry holds an async handler, or
    /// [`ShortcodeError::Handler`] if a handler fails.
    pub fn parse_string_sync(&self, input: &str) -> Result<ParseResult, ShortcodeError> {
        if self.registry.has_async() {
            return Err(ShortcodeError::AsyncNotAllowed);
        }
        let (text, matches) = self.eval_blocking(input)?;
        Ok(ParseResult { text, matches })
    }

    /// Walk a JSON-like tree, substituting shortcodes in every string leaf.
    ///
    /// Entries whose evaluation fails are logged and dropped; the rest of
    /// the tree completes.
    ///
    /// # Errors
    ///
    /// Returns [`ShortcodeError::Handler`] only when `tree` itself is a
    /// failing string (there is no containing entry to drop).
    pub async fn parse_object(&self, tree: &Value) -> Result<Value, ShortcodeError> {
        walker::walk(self, tree).await
    }

    /// Blocking variant of [`parse_object`](Self::parse_object).
    ///
    /// # Errors
    ///
    /// Same as [`parse_string_sync`](Self::parse_string_sync) for the
    /// registry-wide async check; otherwise as [`parse_object`](Self::parse_object).
    pub fn parse_object_sync(&self, tree: &Value) -> Result<Value, ShortcodeError> {
        if self.registry.has_async() {
            return Err(ShortcodeError::AsyncNotAllowed);
        }
        walker::walk_blocking(self, tree)
    }

    /// The evaluation algorithm, written once in suspending form.
    ///
    /// Per match, in order: copy the literal gap, strip escapes, pass
    /// unknown names through verbatim, recursively evaluate nested content,
    /// then await the handler and splice its output. Handler invocations are
    /// strictly sequential; a failure aborts the whole evaluation.
    pub(crate) fn eval<'a>(
        &'a self,
        input: &'a str,
    ) -> BoxFuture<'a, Result<(String, Vec<ShortcodeMatch>), ShortcodeError>> {
        Box::pin(async move {
            let matches = matcher::parse_to_matches(input);
            let mut text = String::with_capacity(input.len());
            let mut cursor = 0;

            for m in &matches {
                text.push_str(&input[cursor..m.start]);
                cursor = m.end();

                if m.is_escaped() {
                    // Escaped occurrences render literally, minus the backslash.
                    text.push_str(&m.full_match[1..]);
                    continue;
                }

                let Some(handler) = self.registry.get(&m.name) else {
                    // Unrecognized shortcodes are not errors.
                    text.push_str(&m.full_match);
                    continue;
                };

                // Inner tags resolve fully before the outer handler runs.
                let (content, _) = self.eval(&m.content).await?;
                let call = ShortcodeCall {
                    content,
                    attributes: m.attributes.clone(),
                    full_match: m.full_match.clone(),
                };
                let replacement = handler
                    .invoke(call)
                    .await
                    .map_err(|e| ShortcodeError::handler(&m.name, e))?;
                text.push_str(&replacement);
            }

            text.push_str(&input[cursor..]);
            Ok((text, matches))
        })
    }

    /// Drive [`eval`](Self::eval) to completion without a runtime.
    ///
    /// With only synchronous handlers registered, `eval` has no reachable
    /// suspension point and completes on the first poll. Callers check the
    /// registry's async flag before entering; `Pending` is answered with
    /// [`ShortcodeError::AsyncNotAllowed`] rather than a panic.
    pub(crate) fn eval_blocking(
        &self,
        input: &str,
    ) -> Result<(String, Vec<ShortcodeMatch>), ShortcodeError> {
        match poll_once(self.eval(input)) {
            Some(result) => result,
            None => Err(ShortcodeError::AsyncNotAllowed),
        }
    }
}

/// Poll a future exactly once with a no-op waker.
pub(crate) fn poll_once<T>(mut fut: BoxFuture<'_, T>) -> Option<T> {
    let mut cx = Context::from_waker(Waker::noop());
    match fut.as_mut().poll(&mut cx) {
        Poll::Ready(value) => Some(value),
        Poll::Pending => None,
    }
}
