//! Reporting types for positive rule matches.

use serde::{Deserialize, Serialize};

/// A positive match of one rule against one event.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Result {
    /// Rule identifier
    pub id: String,
    /// Rule title
    pub title: String,
    /// Rule tags
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Result {
    /// Create a result for a rule.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tags: Vec::new(),
        }
    }

    /// Attach the rule's tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Matches collected from evaluating a set of rules against one event.
pub type Results = Vec<Result>;
