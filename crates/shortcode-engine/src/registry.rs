//! Name-to-handler registry with built-in shortcodes.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;

use crate::error::ShortcodeError;
use crate::handler::Handler;

/// Valid shortcode names: word characters, hyphens, and `@`.
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\w@-]+$").unwrap());

/// Mutable mapping from shortcode name to handler.
///
/// Seeded with the `cwd`, `date`, and `time` built-ins plus any defaults
/// supplied at construction; `clear` discards everything and re-seeds.
/// Carries no per-parse state. The engine performs no internal locking, so
/// callers must not mutate the registry while a parse is in flight.
#[derive(Debug)]
pub(crate) struct Registry {
    handlers: HashMap<String, Handler>,
    /// Monotonic within the registry's life; only `clear` resets it.
    has_async: bool,
    cwd: String,
    defaults: Vec<(String, Handler)>,
}

impl Registry {
    /// Build a seeded registry. Default names must already be validated
    /// with [`validate_name`].
    pub(crate) fn new(cwd: String, defaults: Vec<(String, Handler)>) -> Self {
        let mut registry = Self {
            handlers: HashMap::new(),
            has_async: false,
            cwd,
            defaults,
        };
        registry.seed();
        registry
    }

    /// Register the built-ins and the construction-time default set.
    fn seed(&mut self) {
        let cwd = self.cwd.clone();
        self.insert("cwd", Handler::sync(move |_| Ok(cwd.clone())));
        self.insert(
            "date",
            Handler::sync(|_| Ok(Local::now().format("%x").to_string())),
        );
        self.insert(
            "time",
            Handler::sync(|_| Ok(Local::now().format("%X").to_string())),
        );

        let defaults = self.defaults.clone();
        for (name, handler) in defaults {
            self.insert(&name, handler);
        }
    }

    fn insert(&mut self, name: &str, handler: Handler) {
        self.has_async |= handler.is_async();
        self.handlers.insert(name.to_owned(), handler);
    }

    /// Add a handler under `name`, validating the name first.
    ///
    /// Registry state is untouched when the name is rejected.
    pub(crate) fn add(&mut self, name: &str, handler: Handler) -> Result<(), ShortcodeError> {
        validate_name(name)?;
        self.insert(name, handler);
        Ok(())
    }

    /// Discard all handlers, then re-seed built-ins and defaults.
    pub(crate) fn clear(&mut self) {
        self.handlers.clear();
        self.has_async = false;
        self.seed();
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }

    /// Whether any registered handler requires asynchronous execution.
    pub(crate) fn has_async(&self) -> bool {
        self.has_async
    }
}

/// Check a shortcode name against the allowed character set.
pub(crate) fn validate_name(name: &str) -> Result<(), ShortcodeError> {
    if NAME_RE.is_match(name) {
        Ok(())
    } else {
        Err(ShortcodeError::InvalidName(name.to_owned()))
    }
}
