//! Normalization of decoded detection values.
//!
//! Identifier definitions arrive as arbitrary decoded YAML. A single
//! normalization pass turns them into a closed union so the resolver and the
//! matcher factories operate on exhaustively matchable shapes instead of
//! runtime type probing.

use serde_json::Value as JsonValue;

/// Normalized definition of a detection identifier
#[derive(Debug, Clone, PartialEq)]
pub enum RuleValue {
    /// Single text pattern
    String(String),
    /// Single numeric pattern
    Number(i64),
    /// List of text patterns
    StringList(Vec<String>),
    /// List of numeric patterns
    NumberList(Vec<i64>),
    /// Field-to-pattern map (selection)
    FieldMap(Vec<(String, FieldValue)>),
    /// List of field maps (selection alternatives, OR-joined)
    FieldMapList(Vec<Vec<(String, FieldValue)>>),
}

/// Normalized value attached to one selection field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Single text pattern
    String(String),
    /// Single numeric pattern
    Number(i64),
    /// List of text patterns
    StringList(Vec<String>),
    /// List of numeric patterns
    NumberList(Vec<i64>),
}

impl RuleValue {
    /// Normalize a decoded identifier definition.
    ///
    /// Booleans become their textual form, floats truncate to integers, and a
    /// scalar list mixing numbers into strings coerces the numbers. A list
    /// mixing maps with scalars, or any null, is rejected with a description
    /// of the observed shape.
    pub fn normalize(value: &JsonValue) -> Result<Self, String> {
        match value {
            JsonValue::String(s) => Ok(RuleValue::String(s.clone())),
            JsonValue::Number(n) => match number_to_int(n) {
                Some(i) => Ok(RuleValue::Number(i)),
                None => Err(format!("unrepresentable number {n}")),
            },
            JsonValue::Bool(b) => Ok(RuleValue::String(b.to_string())),
            JsonValue::Object(map) => Ok(RuleValue::FieldMap(normalize_field_map(map)?)),
            JsonValue::Array(items) => normalize_list(items),
            JsonValue::Null => Err("null".to_string()),
        }
    }

    /// Shape description used in error reporting.
    pub fn shape(&self) -> &'static str {
        match self {
            RuleValue::String(_) => "string",
            RuleValue::Number(_) => "number",
            RuleValue::StringList(_) => "string list",
            RuleValue::NumberList(_) => "number list",
            RuleValue::FieldMap(_) => "field map",
            RuleValue::FieldMapList(_) => "field map list",
        }
    }
}

fn normalize_list(items: &[JsonValue]) -> Result<RuleValue, String> {
    if items.iter().all(|v| v.is_object()) && !items.is_empty() {
        let mut maps = Vec::with_capacity(items.len());
        for item in items {
            match item {
                JsonValue::Object(map) => maps.push(normalize_field_map(map)?),
                _ => unreachable!(),
            }
        }
        return Ok(RuleValue::FieldMapList(maps));
    }
    if items.iter().any(|v| v.is_object()) {
        return Err("list mixing maps with scalars".to_string());
    }
    match scalar_list(items)? {
        ScalarList::Numbers(nums) => Ok(RuleValue::NumberList(nums)),
        ScalarList::Strings(strs) => Ok(RuleValue::StringList(strs)),
    }
}

fn normalize_field_map(
    map: &serde_json::Map<String, JsonValue>,
) -> Result<Vec<(String, FieldValue)>, String> {
    let mut fields = Vec::with_capacity(map.len());
    for (key, value) in map {
        let field_value = match value {
            JsonValue::String(s) => FieldValue::String(s.clone()),
            JsonValue::Number(n) => match number_to_int(n) {
                Some(i) => FieldValue::Number(i),
                None => return Err(format!("unrepresentable number for field '{key}'")),
            },
            JsonValue::Bool(b) => FieldValue::String(b.to_string()),
            JsonValue::Array(items) => match scalar_list(items)? {
                ScalarList::Numbers(nums) => FieldValue::NumberList(nums),
                ScalarList::Strings(strs) => FieldValue::StringList(strs),
            },
            other => return Err(format!("unsupported value for field '{key}': {other}")),
        };
        fields.push((key.clone(), field_value));
    }
    Ok(fields)
}

enum ScalarList {
    Numbers(Vec<i64>),
    Strings(Vec<String>),
}

/// A list of numbers stays numeric; any string in the list demotes the whole
/// list to text with base-10 rendering of the numbers.
fn scalar_list(items: &[JsonValue]) -> Result<ScalarList, String> {
    if !items.is_empty() && items.iter().all(|v| v.is_number()) {
        let mut nums = Vec::with_capacity(items.len());
        for item in items {
            match item.as_number().and_then(number_to_int) {
                Some(i) => nums.push(i),
                None => return Err(format!("unrepresentable number {item}")),
            }
        }
        return Ok(ScalarList::Numbers(nums));
    }

    let mut strs = Vec::with_capacity(items.len());
    for item in items {
        match item {
            JsonValue::String(s) => strs.push(s.clone()),
            JsonValue::Number(n) => match number_to_int(n) {
                Some(i) => strs.push(i.to_string()),
                None => return Err(format!("unrepresentable number {n}")),
            },
            JsonValue::Bool(b) => strs.push(b.to_string()),
            other => return Err(format!("unsupported list element: {other}")),
        }
    }
    Ok(ScalarList::Strings(strs))
}

fn number_to_int(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    if let Some(u) = n.as_u64() {
        return i64::try_from(u).ok();
    }
    n.as_f64().and_then(|f| {
        if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            Some(f.trunc() as i64)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars() {
        assert_eq!(
            RuleValue::normalize(&json!("cmd.exe")).unwrap(),
            RuleValue::String("cmd.exe".into())
        );
        assert_eq!(
            RuleValue::normalize(&json!(4688)).unwrap(),
            RuleValue::Number(4688)
        );
        assert_eq!(
            RuleValue::normalize(&json!(true)).unwrap(),
            RuleValue::String("true".into())
        );
        assert_eq!(
            RuleValue::normalize(&json!(123.9)).unwrap(),
            RuleValue::Number(123)
        );
    }

    #[test]
    fn string_list() {
        assert_eq!(
            RuleValue::normalize(&json!(["a", "b"])).unwrap(),
            RuleValue::StringList(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn number_list() {
        assert_eq!(
            RuleValue::normalize(&json!([1, 2, 3])).unwrap(),
            RuleValue::NumberList(vec![1, 2, 3])
        );
    }

    #[test]
    fn mixed_scalar_list_coerces_to_strings() {
        assert_eq!(
            RuleValue::normalize(&json!(["mimikatz", 4688])).unwrap(),
            RuleValue::StringList(vec!["mimikatz".into(), "4688".into()])
        );
    }

    #[test]
    fn field_map() {
        let value = RuleValue::normalize(&json!({"EventID": 1, "Image": "*\\cmd.exe"})).unwrap();
        match value {
            RuleValue::FieldMap(fields) => {
                assert_eq!(fields.len(), 2);
                assert!(fields
                    .iter()
                    .any(|(k, v)| k == "EventID" && *v == FieldValue::Number(1)));
            }
            other => panic!("expected field map, got {}", other.shape()),
        }
    }

    #[test]
    fn field_map_list() {
        let value =
            RuleValue::normalize(&json!([{"a": "x"}, {"b": ["y", "z"]}])).unwrap();
        assert!(matches!(value, RuleValue::FieldMapList(ref maps) if maps.len() == 2));
    }

    #[test]
    fn rejected_shapes() {
        assert!(RuleValue::normalize(&json!(null)).is_err());
        assert!(RuleValue::normalize(&json!([{"a": 1}, "scalar"])).is_err());
        assert!(RuleValue::normalize(&json!({"nested": {"too": "deep"}})).is_err());
    }
}
