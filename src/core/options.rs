//! Per-call options and their ordered merge
//!
//! Options are rebuilt on every handler call from three layers, later layers
//! overwriting earlier ones key by key:
//!
//! ```text
//! get_options(operation)  <  static handler options  <  request context
//! ```

use crate::core::CrudError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Opaque key-value options bag passed to every hook and implementation
pub type Options = Map<String, Value>;

/// Shallow-merge option layers in order; later layers win per key
///
/// Only the top level is merged: a nested object in a later layer replaces
/// the earlier value wholesale.
pub fn merge_options<I>(layers: I) -> Options
where
    I: IntoIterator<Item = Options>,
{
    let mut merged = Options::new();
    for layer in layers {
        for (key, value) in layer {
            merged.insert(key, value);
        }
    }
    merged
}

/// Shallow-merge `overlay` onto the JSON object `base`
///
/// Non-object operands contribute no keys, so merging a scalar payload onto
/// an entity leaves the entity's attributes as they were.
pub fn merge_objects(base: &Value, overlay: &Value) -> Value {
    let layers = [base, overlay]
        .into_iter()
        .map(|v| v.as_object().cloned().unwrap_or_default());
    Value::Object(merge_options(layers))
}

/// View a request context as an options layer
///
/// The context is serialized to JSON; an object contributes its top-level
/// keys, anything else (unit, null, scalars) contributes nothing.
pub fn context_options<C: Serialize>(context: &C) -> Result<Options, CrudError> {
    match serde_json::to_value(context).map_err(CrudError::serialization)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Options::new()),
    }
}

/// Build an options map from a JSON literal, ignoring non-objects
pub fn options_from(value: Value) -> Options {
    match value {
        Value::Object(map) => map,
        _ => Options::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_precedence_later_layer_wins() {
        let dynamic = options_from(json!({"a": 1, "b": 1, "c": 1}));
        let fixed = options_from(json!({"b": 2, "d": 2}));
        let context = options_from(json!({"c": 3, "e": 3}));

        let merged = merge_options([dynamic, fixed, context]);

        assert_eq!(
            Value::Object(merged),
            json!({"a": 1, "b": 2, "c": 3, "d": 2, "e": 3})
        );
    }

    #[test]
    fn test_merge_is_shallow() {
        let merged = merge_options([
            options_from(json!({"nested": {"x": 1, "y": 1}})),
            options_from(json!({"nested": {"y": 2}})),
        ]);

        assert_eq!(merged["nested"], json!({"y": 2}));
    }

    #[test]
    fn test_merge_objects_keeps_omitted_attributes() {
        let entity = json!({"id": 2, "name": "john", "age": 30});
        let merged = merge_objects(&entity, &json!({"name": "jane"}));

        assert_eq!(merged, json!({"id": 2, "name": "jane", "age": 30}));
    }

    #[test]
    fn test_merge_objects_ignores_scalar_overlay() {
        let entity = json!({"id": 2});
        assert_eq!(merge_objects(&entity, &json!(42)), entity);
        assert_eq!(merge_objects(&entity, &Value::Null), entity);
    }

    #[test]
    fn test_context_options() {
        #[derive(Serialize)]
        struct Ctx {
            user: String,
        }

        let opts = context_options(&Ctx {
            user: "cruella".into(),
        })
        .unwrap();
        assert_eq!(opts["user"], json!("cruella"));

        assert!(context_options(&()).unwrap().is_empty());
        assert!(context_options(&"plain").unwrap().is_empty());
    }
}
