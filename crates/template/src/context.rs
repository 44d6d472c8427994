//! Render context: names mapped to scalars or sequences of nested contexts.

use crate::error::{Result, TemplateError, ValueKind};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;

/// A context value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Substituted verbatim by `{{name}}`
    Scalar(String),
    /// Iterated by `{{#name}}...{{/name}}`
    List(Vec<Context>),
}

impl Value {
    /// Kind of this value
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Scalar(_) => ValueKind::Scalar,
            Value::List(_) => ValueKind::Sequence,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(value.to_string())
    }
}

impl From<Vec<Context>> for Value {
    fn from(value: Vec<Context>) -> Self {
        Value::List(value)
    }
}

/// Data supplied to a render call.
///
/// Keys are kept sorted so that iteration, and anything derived from it,
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    values: BTreeMap<String, Value>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one under that key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Look up a key in this context only
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the context has no keys
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build a context from any serializable value.
    ///
    /// The value must serialize to a JSON object; see [`Context::from_json`]
    /// for the conversion rules.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Self::from_json(serde_json::to_value(value)?)
    }

    /// Parse a JSON document into a context
    pub fn from_json_str(text: &str) -> Result<Self> {
        Self::from_json(serde_json::from_str(text)?)
    }

    /// Parse a TOML document into a context
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Self::from_json(toml::from_str::<JsonValue>(text)?)
    }

    /// Convert a JSON value into a context.
    ///
    /// - strings become scalars
    /// - numbers and booleans become scalars holding their JSON text
    /// - `null` becomes the empty scalar
    /// - arrays of objects become sequences
    ///
    /// Nested objects and arrays holding anything but objects are rejected.
    pub fn from_json(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Self::from_object(map, ""),
            other => Err(TemplateError::InvalidContext {
                path: "<root>".to_string(),
                reason: format!("expected an object, found {}", json_kind(&other)),
            }),
        }
    }

    fn from_object(map: Map<String, JsonValue>, prefix: &str) -> Result<Self> {
        let mut context = Context::new();
        for (key, value) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            let value = match value {
                JsonValue::String(s) => Value::Scalar(s),
                JsonValue::Bool(b) => Value::Scalar(b.to_string()),
                JsonValue::Number(n) => Value::Scalar(n.to_string()),
                JsonValue::Null => Value::Scalar(String::new()),
                JsonValue::Array(items) => Value::List(
                    items
                        .into_iter()
                        .enumerate()
                        .map(|(idx, item)| match item {
                            JsonValue::Object(map) => {
                                Self::from_object(map, &format!("{path}[{idx}]"))
                            }
                            other => Err(TemplateError::InvalidContext {
                                path: format!("{path}[{idx}]"),
                                reason: format!(
                                    "sequence elements must be objects, found {}",
                                    json_kind(&other)
                                ),
                            }),
                        })
                        .collect::<Result<Vec<_>>>()?,
                ),
                JsonValue::Object(_) => {
                    return Err(TemplateError::InvalidContext {
                        path,
                        reason: "nested objects are not supported, wrap it in a list to use it as a section"
                            .to_string(),
                    })
                }
            };
            context.values.insert(key, value);
        }
        Ok(context)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Context::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let ctx = Context::new().with("name", "World").with("debug", true);
        assert_eq!(ctx.get("name"), Some(&Value::Scalar("World".to_string())));
        assert_eq!(ctx.get("debug"), Some(&Value::Scalar("true".to_string())));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_from_json_scalars() {
        let ctx = Context::from_json(json!({
            "s": "text",
            "b": false,
            "n": 42,
            "f": 1.5,
            "z": null
        }))
        .unwrap();
        assert_eq!(ctx.get("s"), Some(&Value::from("text")));
        assert_eq!(ctx.get("b"), Some(&Value::from("false")));
        assert_eq!(ctx.get("n"), Some(&Value::from("42")));
        assert_eq!(ctx.get("f"), Some(&Value::from("1.5")));
        assert_eq!(ctx.get("z"), Some(&Value::from("")));
    }

    #[test]
    fn test_from_json_sequence() {
        let ctx = Context::from_json(json!({"items": [{"v": "a"}, {"v": "b"}]})).unwrap();
        let Some(Value::List(items)) = ctx.get("items") else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].get("v"), Some(&Value::from("b")));
    }

    #[test]
    fn test_from_json_rejects_non_object_root() {
        let err = Context::from_json(json!(["a"])).unwrap_err();
        assert!(matches!(err, TemplateError::InvalidContext { ref path, .. } if path == "<root>"));
    }

    #[test]
    fn test_from_json_rejects_scalar_elements() {
        let err = Context::from_json(json!({"outer": [{"inner": ["x"]}]})).unwrap_err();
        assert_eq!(err.name(), Some("outer[0].inner[0]"));
    }

    #[test]
    fn test_from_json_rejects_nested_object() {
        let err = Context::from_json(json!({"user": {"name": "x"}})).unwrap_err();
        assert_eq!(err.name(), Some("user"));
    }

    #[test]
    fn test_from_toml() {
        let ctx = Context::from_toml_str(
            r#"
            namespace = "com.example.app"

            [[dependencies]]
            name = "implementation"
            value = "androidx.core:core-ktx:1.13.1"
            "#,
        )
        .unwrap();
        assert_eq!(ctx.get("namespace"), Some(&Value::from("com.example.app")));
        assert_eq!(ctx.get("dependencies").map(Value::kind), Some(ValueKind::Sequence));
    }

    #[test]
    fn test_from_serialize() {
        #[derive(Serialize)]
        struct Item {
            v: &'static str,
        }
        #[derive(Serialize)]
        struct Data {
            items: Vec<Item>,
        }

        let ctx = Context::from_serialize(&Data {
            items: vec![Item { v: "a" }],
        })
        .unwrap();
        assert_eq!(ctx.get("items").map(Value::kind), Some(ValueKind::Sequence));
    }

    #[test]
    fn test_from_iterator() {
        let ctx: Context = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(ctx.len(), 2);
    }
}
