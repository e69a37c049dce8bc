//! Handler types for shortcode resolution.
//!
//! A handler computes the replacement text for one shortcode occurrence.
//! Handlers are trusted caller code; the engine never retries, caches, or
//! short-circuits them.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::attrs::Attributes;
use crate::error::BoxError;

/// Pin-boxed future, the erased return type of async handlers.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of a handler invocation.
pub type HandlerResult = Result<String, BoxError>;

type SyncFn = dyn Fn(ShortcodeCall) -> HandlerResult + Send + Sync;
type AsyncFn = dyn Fn(ShortcodeCall) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// Everything a handler sees about one occurrence.
///
/// `content` has already been through recursive evaluation, so nested
/// shortcodes are fully substituted by the time the handler runs. Fields are
/// owned so async handlers can move the call into a `'static` future.
#[derive(Debug, Clone)]
pub struct ShortcodeCall {
    /// Inner content with nested shortcodes substituted.
    pub content: String,
    /// Attributes from the opening tag.
    pub attributes: Attributes,
    /// The exact substring the occurrence consumed.
    pub full_match: String,
}

/// A registered shortcode handler, synchronous or asynchronous.
///
/// Registering any [`Async`](Self::Async) handler disables the `*_sync`
/// entry points for the whole registry until [`clear`] is called.
///
/// [`clear`]: crate::ShortcodeEngine::clear
///
/// # Example
///
/// ```
/// use shortcode_engine::Handler;
///
/// let upper = Handler::sync(|call| Ok(call.content.to_uppercase()));
/// assert!(!upper.is_async());
///
/// let fetch = Handler::future(|call| async move { Ok(call.content) });
/// assert!(fetch.is_async());
/// ```
#[derive(Clone)]
pub enum Handler {
    /// Blocking handler.
    Sync(Arc<SyncFn>),
    /// Suspending handler.
    Async(Arc<AsyncFn>),
}

impl Handler {
    /// Wrap a blocking closure.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(ShortcodeCall) -> HandlerResult + Send + Sync + 'static,
    {
        Self::Sync(Arc::new(f))
    }

    /// Wrap an async closure.
    pub fn future<F, Fut>(f: F) -> Self
    where
        F: Fn(ShortcodeCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self::Async(Arc::new(move |call| Box::pin(f(call))))
    }

    /// Whether this handler requires asynchronous execution.
    #[must_use]
    pub fn is_async(&self) -> bool {
        matches!(self, Self::Async(_))
    }

    /// Invoke the handler, awaiting async variants.
    pub(crate) async fn invoke(&self, call: ShortcodeCall) -> HandlerResult {
        match self {
            Self::Sync(f) => f(call),
            Self::Async(f) => f(call).await,
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Handler::Sync"),
            Self::Async(_) => f.write_str("Handler::Async"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(content: &str) -> ShortcodeCall {
        ShortcodeCall {
            content: content.to_owned(),
            attributes: Attributes::new(),
            full_match: String::new(),
        }
    }

    #[test]
    fn test_sync_handler() {
        let h = Handler::sync(|c| Ok(format!("<{}>", c.content)));
        assert!(!h.is_async());
    }

    #[tokio::test]
    async fn test_invoke_sync_variant() {
        let h = Handler::sync(|c| Ok(c.content.to_uppercase()));
        let out = h.invoke(call("abc")).await.unwrap();
        assert_eq!(out, "ABC");
    }

    #[tokio::test]
    async fn test_invoke_async_variant() {
        let h = Handler::future(|c| async move { Ok(format!("{}!", c.content)) });
        assert!(h.is_async());
        let out = h.invoke(call("hi")).await.unwrap();
        assert_eq!(out, "hi!");
    }

    #[test]
    fn test_clone_shares_handler() {
        let h = Handler::sync(|_| Ok("x".to_owned()));
        let h2 = h.clone();
        assert!(!h2.is_async());
    }
}
