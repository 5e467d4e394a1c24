//! Log source section of a rule header.

use serde::{Deserialize, Serialize};

/// The `logsource` field: where events described by the rule originate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Logsource {
    /// Product, e.g. `windows`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Category, e.g. `process_creation`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Service, e.g. `sysmon`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
    /// Free-form description of the source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}
