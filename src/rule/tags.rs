//! Rule tag handling.

use serde::{Deserialize, Serialize};

/// Tag list attached to a rule, e.g. MITRE ATT&CK technique identifiers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Tags(pub Vec<String>);

impl Tags {
    /// Whether every tag in `tags` is present.
    pub fn has_all(&self, tags: &[String]) -> bool {
        tags.iter().all(|t| self.0.contains(t))
    }
}

impl From<Vec<String>> for Tags {
    fn from(tags: Vec<String>) -> Self {
        Self(tags)
    }
}
