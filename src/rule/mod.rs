//! Rule definitions and YAML decoding.
//!
//! # Example
//!
//! ```
//! use sigma_tree::rule::rule_from_yaml;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rule = rule_from_yaml(br#"
//! title: Suspicious Process Creation
//! id: 12345678-1234-1234-1234-123456789abc
//! status: stable
//! detection:
//!   selection:
//!     EventID: 1
//!     CommandLine|contains: 'powershell'
//!   condition: selection
//! "#)?;
//! assert_eq!(rule.title, "Suspicious Process Creation");
//! # Ok(())
//! # }
//! ```

use crate::error::{Result, SigmaError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Detection section
pub mod detection;
/// Log source section
pub mod logsource;
/// Tag handling
pub mod tags;

pub use detection::Detection;
pub use logsource::Logsource;
pub use tags::Tags;

/// Raw rule conforming to the Sigma rule specification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rule {
    /// Rule author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Rule description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Known false positive scenarios
    #[serde(default)]
    pub falsepositives: Vec<String>,

    /// Fields relevant to this rule
    #[serde(default)]
    pub fields: Vec<String>,

    /// Rule identifier
    #[serde(default)]
    pub id: String,

    /// Severity level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Rule title
    pub title: String,

    /// Rule status (experimental, testing, stable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// External references
    #[serde(default)]
    pub references: Vec<String>,

    /// Log source configuration
    #[serde(default)]
    pub logsource: Logsource,

    /// Detection identifiers and condition
    pub detection: Detection,

    /// Categorization tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Creation date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Last modification date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

impl Rule {
    /// Whether the rule carries every tag in `tags`.
    pub fn has_tags(&self, tags: &[String]) -> bool {
        Tags::from(self.tags.clone()).has_all(tags)
    }
}

/// A rule plus load-time metadata and matching configuration.
#[derive(Debug, Clone)]
pub struct RuleHandle {
    /// The decoded rule
    pub rule: Rule,
    /// Source file path
    pub path: PathBuf,
    /// Whether the source file held multiple YAML documents
    pub multipart: bool,
    /// Disable whitespace collapsing in patterns
    pub no_collapse_ws: bool,
    /// Parse string event values as numbers for numeric patterns
    pub try_string_num: bool,
}

impl RuleHandle {
    /// Create a handle for a rule loaded from `path`.
    pub fn new(rule: Rule, path: PathBuf) -> Self {
        Self {
            rule,
            path,
            multipart: false,
            no_collapse_ws: false,
            try_string_num: true,
        }
    }

    /// Mark the source as a multipart document.
    pub fn with_multipart(mut self, multipart: bool) -> Self {
        self.multipart = multipart;
        self
    }

    /// Disable whitespace collapsing.
    pub fn with_no_collapse_ws(mut self, no_collapse_ws: bool) -> Self {
        self.no_collapse_ws = no_collapse_ws;
        self
    }

    /// Control string-to-number coercion for numeric patterns.
    pub fn with_try_string_num(mut self, try_string_num: bool) -> Self {
        self.try_string_num = try_string_num;
        self
    }
}

/// Decode and validate a rule from YAML bytes.
pub fn rule_from_yaml(data: &[u8]) -> Result<Rule> {
    let rule: Rule = serde_yaml::from_slice(data)?;
    validate_rule(&rule)?;
    Ok(rule)
}

fn validate_rule(rule: &Rule) -> Result<()> {
    if rule.title.trim().is_empty() {
        return Err(SigmaError::InvalidRule(
            "rule title cannot be empty".to_string(),
        ));
    }
    if rule.detection.0.is_empty() {
        return Err(SigmaError::MissingDetection);
    }
    if rule.detection.condition().is_none() {
        return Err(SigmaError::MissingCondition);
    }
    Ok(())
}

/// Whether the data holds multiple YAML documents with the separator not at
/// the start.
pub fn is_multipart(data: &[u8]) -> bool {
    let starts_with_separator = data.starts_with(b"---");
    let contains_separator = data.windows(3).any(|window| window == b"---");
    !starts_with_separator && contains_separator
}
