//! Recursive shortcode substitution over JSON-like trees.
//!
//! String leaves run through the evaluator; everything else is rebuilt
//! structurally. Tree walking is best-effort: a failing entry is logged and
//! dropped instead of aborting the walk, unlike string-level evaluation.

use serde_json::Value;

use crate::engine::{ShortcodeEngine, poll_once};
use crate::error::ShortcodeError;
use crate::handler::BoxFuture;
use crate::matcher::contains_shortcode;

/// Walk `value`, substituting shortcodes in every string leaf.
///
/// Object keys and array elements whose subtree fails evaluation are dropped
/// from the output (arrays just get shorter). Only a failing string at the
/// root propagates an error, since it has no containing entry to drop.
pub(crate) fn walk<'a>(
    engine: &'a ShortcodeEngine,
    value: &'a Value,
) -> BoxFuture<'a, Result<Value, ShortcodeError>> {
    Box::pin(async move {
        match value {
            Value::Object(map) => {
                let mut out = serde_json::Map::with_capacity(map.len());
                for (key, child) in map {
                    match walk(engine, child).await {
                        Ok(walked) => {
                            out.insert(key.clone(), walked);
                        }
                        Err(e) => {
                            tracing::warn!(key = %key, error = %e, "dropping key after shortcode failure");
                        }
                    }
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for (index, child) in items.iter().enumerate() {
                    match walk(engine, child).await {
                        Ok(walked) => out.push(walked),
                        Err(e) => {
                            tracing::warn!(index, error = %e, "dropping element after shortcode failure");
                        }
                    }
                }
                Ok(Value::Array(out))
            }
            Value::String(s) => {
                // Strings are copied either way so the output never aliases
                // the input.
                if contains_shortcode(s) {
                    let (text, _) = engine.eval(s).await?;
                    Ok(Value::String(text))
                } else {
                    Ok(Value::String(s.clone()))
                }
            }
            other => Ok(other.clone()),
        }
    })
}

/// Blocking variant of [`walk`], driven the same way as
/// [`ShortcodeEngine::parse_string_sync`]: one poll under the registry-wide
/// no-async guarantee.
pub(crate) fn walk_blocking(
    engine: &ShortcodeEngine,
    value: &Value,
) -> Result<Value, ShortcodeError> {
    match poll_once(walk(engine, value)) {
        Some(result) => result,
        None => Err(ShortcodeError::AsyncNotAllowed),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::{Handler, ShortcodeEngine};

    fn engine() -> ShortcodeEngine {
        let mut engine = ShortcodeEngine::new();
        engine
            .add_shortcode("upper", Handler::sync(|c| Ok(c.content.to_uppercase())))
            .unwrap();
        engine
            .add_shortcode("throws", Handler::sync(|_| Err("nope".into())))
            .unwrap();
        engine
    }

    #[test]
    fn test_object_substitution() {
        let engine = engine();
        let tree = json!({
            "title": "[@upper]hello[/@upper]",
            "count": 3,
            "plain": "no tags",
        });
        let out = engine.parse_object_sync(&tree).unwrap();
        assert_eq!(
            out,
            json!({"title": "HELLO", "count": 3, "plain": "no tags"})
        );
    }

    #[test]
    fn test_failing_key_dropped() {
        let engine = engine();
        let tree = json!({"safe": "ok", "bad": "[@throws]"});
        let out = engine.parse_object_sync(&tree).unwrap();
        assert_eq!(out, json!({"safe": "ok"}));
    }

    #[test]
    fn test_failing_key_dropped_in_nested_object() {
        let engine = engine();
        let tree = json!({
            "outer": {"bad": "[@throws]", "good": "[@upper]x[/@upper]"},
            "sibling": "fine",
        });
        let out = engine.parse_object_sync(&tree).unwrap();
        assert_eq!(out, json!({"outer": {"good": "X"}, "sibling": "fine"}));
    }

    #[test]
    fn test_failing_array_element_dropped() {
        let engine = engine();
        let tree = json!(["a", "[@throws]", "[@upper]b[/@upper]"]);
        let out = engine.parse_object_sync(&tree).unwrap();
        assert_eq!(out, json!(["a", "B"]));
    }

    #[test]
    fn test_non_string_leaves_pass_through() {
        let engine = engine();
        let tree = json!({"n": 1.5, "b": true, "z": null, "list": [1, 2]});
        let out = engine.parse_object_sync(&tree).unwrap();
        assert_eq!(out, tree);
    }

    #[test]
    fn test_root_string_failure_propagates() {
        let engine = engine();
        let err = engine.parse_object_sync(&json!("[@throws]")).unwrap_err();
        assert!(matches!(
            err,
            crate::ShortcodeError::Handler { ref name, .. } if name == "throws"
        ));
    }

    #[test]
    fn test_deeply_mixed_tree() {
        let engine = engine();
        let tree = json!({
            "pages": [
                {"title": "[@upper]a[/@upper]", "tags": ["x", "[@upper]y[/@upper]"]},
                {"title": "plain"},
            ],
        });
        let out = engine.parse_object_sync(&tree).unwrap();
        assert_eq!(
            out,
            json!({
                "pages": [
                    {"title": "A", "tags": ["x", "Y"]},
                    {"title": "plain"},
                ],
            })
        );
    }

    #[tokio::test]
    async fn test_async_walker_parity() {
        let engine = engine();
        let tree = json!({"safe": "ok", "bad": "[@throws]", "up": "[@upper]z[/@upper]"});
        let out = engine.parse_object(&tree).await.unwrap();
        assert_eq!(out, json!({"safe": "ok", "up": "Z"}));
    }

    #[tokio::test]
    async fn test_async_walker_with_async_handler() {
        let mut engine = ShortcodeEngine::new();
        engine
            .add_shortcode(
                "fetch",
                Handler::future(|c| async move { Ok(format!("<{}>", c.content)) }),
            )
            .unwrap();

        let tree = json!({"body": "[@fetch]data[/@fetch]"});
        let out = engine.parse_object(&tree).await.unwrap();
        assert_eq!(out, json!({"body": "<data>"}));
    }
}
