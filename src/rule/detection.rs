//! Detection section of a rule.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// The `detection` field of a Sigma rule: the condition expression plus the
/// identifier definitions it references.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Detection(pub HashMap<String, Value>);

impl Detection {
    /// Create an empty detection.
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// The condition expression, if present as a string.
    pub fn condition(&self) -> Option<&str> {
        self.0.get("condition").and_then(|v| v.as_str())
    }

    /// All identifier definitions, excluding the reserved `condition` key.
    pub fn extract(&self) -> HashMap<String, Value> {
        self.0
            .iter()
            .filter(|(k, _)| k.as_str() != "condition")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Look up a definition by identifier name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether the identifier exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of identifier definitions, excluding `condition`.
    pub fn ident_count(&self) -> usize {
        self.0.len() - usize::from(self.0.contains_key("condition"))
    }

    /// Insert a definition.
    pub fn insert(&mut self, key: String, value: Value) {
        self.0.insert(key, value);
    }

    /// Iterate identifier definitions, excluding `condition`.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter().filter(|(k, _)| k.as_str() != "condition")
    }
}

impl From<HashMap<String, Value>> for Detection {
    fn from(map: HashMap<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn condition_and_count() {
        let mut detection = Detection::new();
        detection.insert("condition".to_string(), json!("selection1 and selection2"));
        detection.insert("selection1".to_string(), json!({"EventID": 1}));
        detection.insert("selection2".to_string(), json!({"Image": "*\\cmd.exe"}));

        assert_eq!(detection.condition(), Some("selection1 and selection2"));
        assert_eq!(detection.ident_count(), 2);
    }

    #[test]
    fn extract_skips_condition() {
        let mut detection = Detection::new();
        detection.insert("condition".to_string(), json!("all of selection*"));
        detection.insert("selection1".to_string(), json!({"EventID": 1}));
        detection.insert("selection2".to_string(), json!({"Image": "*\\cmd.exe"}));

        let extracted = detection.extract();
        assert_eq!(extracted.len(), 2);
        assert!(!extracted.contains_key("condition"));
    }

    #[test]
    fn yaml_decode() {
        let yaml = r#"
condition: selection
selection:
  EventID: 1
  Image|endswith: '\cmd.exe'
"#;
        let detection: Detection = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(detection.condition(), Some("selection"));
        assert!(detection.contains_key("selection"));
    }
}
