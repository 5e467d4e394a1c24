//! Event abstractions.
//!
//! A rule tree needs two capabilities from an event: selecting a named field
//! (dotted-path aware) and exposing the free-text message strings scanned by
//! keyword identifiers. Both are modeled as traits so callers can adapt
//! whatever log structure they already have; [`DynamicEvent`] adapts any
//! decoded JSON value.

use serde_json::Value as JsonValue;

/// Access to the free-text strings of an event.
pub trait Keyworder {
    /// Message strings for keyword scanning, and whether keyword rules apply
    /// to this event type at all.
    fn keywords(&self) -> (Vec<String>, bool);
}

/// Access to named event fields.
pub trait Selector {
    /// Look up a field by name or dotted path.
    ///
    /// The second element reports whether the field exists; the first is its
    /// scalar value, `None` when the field exists but holds a non-scalar.
    fn select(&self, key: &str) -> (Option<Value>, bool);
}

/// Combined event contract consumed by compiled trees.
pub trait Event: Keyworder + Selector + Send + Sync {}

impl<T: Keyworder + Selector + Send + Sync> Event for T {}

/// Scalar field value returned from selection
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// String value
    String(String),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Floating point
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Null
    #[default]
    Null,
}

impl Value {
    fn from_json(value: &JsonValue) -> Option<Value> {
        match value {
            JsonValue::String(s) => Some(Value::String(s.clone())),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Value::Int(i))
                } else if let Some(u) = n.as_u64() {
                    Some(Value::UInt(u))
                } else {
                    n.as_f64().map(Value::Float)
                }
            }
            JsonValue::Bool(b) => Some(Value::Bool(*b)),
            JsonValue::Null => Some(Value::Null),
            JsonValue::Array(_) | JsonValue::Object(_) => None,
        }
    }
}

/// Event backed by a decoded JSON document.
#[derive(Debug, Clone)]
pub struct DynamicEvent {
    data: JsonValue,
}

impl DynamicEvent {
    /// Wrap a decoded document.
    pub fn new(data: JsonValue) -> Self {
        Self { data }
    }

    /// The underlying document.
    pub fn data(&self) -> &JsonValue {
        &self.data
    }

    /// Resolve a key, trying the literal name first and falling back to
    /// dotted-path traversal through nested objects.
    fn lookup(&self, key: &str) -> Option<&JsonValue> {
        if let Some(value) = self.data.get(key) {
            return Some(value);
        }
        if !key.contains('.') {
            return None;
        }
        let mut current = &self.data;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }
}

impl Selector for DynamicEvent {
    fn select(&self, key: &str) -> (Option<Value>, bool) {
        match self.lookup(key) {
            Some(value) => (Value::from_json(value), true),
            None => (None, false),
        }
    }
}

impl Keyworder for DynamicEvent {
    /// All top-level string values are offered for keyword scanning.
    fn keywords(&self) -> (Vec<String>, bool) {
        match self.data.as_object() {
            Some(map) => {
                let strings = map
                    .values()
                    .filter_map(|v| v.as_str())
                    .map(str::to_owned)
                    .collect();
                (strings, true)
            }
            None => (Vec::new(), false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_scalars() {
        let event = DynamicEvent::new(json!({
            "EventID": 1,
            "Image": "C:\\Windows\\cmd.exe",
            "Elevated": true,
        }));

        assert_eq!(
            event.select("EventID"),
            (Some(Value::Int(1)), true)
        );
        assert_eq!(
            event.select("Image"),
            (Some(Value::String("C:\\Windows\\cmd.exe".into())), true)
        );
        assert_eq!(event.select("Elevated"), (Some(Value::Bool(true)), true));
        assert_eq!(event.select("Missing"), (None, false));
    }

    #[test]
    fn select_dotted_path() {
        let event = DynamicEvent::new(json!({
            "process": {"name": "cmd.exe", "pid": 42},
            "flat.key": "direct",
        }));

        assert_eq!(
            event.select("process.name"),
            (Some(Value::String("cmd.exe".into())), true)
        );
        assert_eq!(event.select("process.pid"), (Some(Value::Int(42)), true));
        // literal key wins over traversal
        assert_eq!(
            event.select("flat.key"),
            (Some(Value::String("direct".into())), true)
        );
        assert_eq!(event.select("process.missing"), (None, false));
    }

    #[test]
    fn non_scalar_fields_exist_without_value() {
        let event = DynamicEvent::new(json!({"list": [1, 2]}));
        assert_eq!(event.select("list"), (None, true));
    }

    #[test]
    fn keywords_are_top_level_strings() {
        let event = DynamicEvent::new(json!({
            "msg": "hello",
            "count": 3,
            "detail": "world",
        }));
        let (keywords, applicable) = event.keywords();
        assert!(applicable);
        assert_eq!(keywords.len(), 2);
        assert!(keywords.contains(&"hello".to_string()));

        let scalar = DynamicEvent::new(json!("just a string"));
        assert_eq!(scalar.keywords().1, false);
    }
}
