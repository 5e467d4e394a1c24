//! Leaf matchers: field selections and keyword lists.

use crate::ast::MatchResult;
use crate::event::{Event, Value};
use crate::pattern::{NumMatchers, StringMatchers};

/// Pattern group attached to one selection field
#[derive(Debug, Clone)]
pub enum FieldPattern {
    /// String patterns
    Text(StringMatchers),
    /// Numeric patterns
    Num {
        /// The numeric pattern group
        matchers: NumMatchers,
        /// Parse string event values as base-10 integers
        try_string_num: bool,
    },
}

/// Matcher for a single event field
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    field: String,
    pattern: FieldPattern,
}

impl FieldMatcher {
    /// Create a matcher for `field`, which may be a dotted path.
    pub fn new(field: String, pattern: FieldPattern) -> Self {
        Self { field, pattern }
    }

    /// The field this matcher reads.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Evaluate against an event. A missing field is inapplicable; a present
    /// field of an incompatible type is applicable but unmatched.
    pub fn matches(&self, event: &dyn Event) -> MatchResult {
        let value = match event.select(&self.field) {
            (_, false) => return MatchResult::not_applicable(),
            (None, true) => return MatchResult::not_matched(),
            (Some(value), true) => value,
        };

        match &self.pattern {
            FieldPattern::Text(matchers) => {
                let text = match coerce_text(&value) {
                    Some(text) => text,
                    None => return MatchResult::not_matched(),
                };
                MatchResult::new(matchers.string_match(&text), true)
            }
            FieldPattern::Num {
                matchers,
                try_string_num,
            } => match coerce_num(&value, *try_string_num) {
                Some(num) => MatchResult::new(matchers.num_match(num), true),
                None => MatchResult::not_matched(),
            },
        }
    }
}

/// Render a scalar event value for string comparison.
fn coerce_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::UInt(u) => Some(u.to_string()),
        Value::Float(f) => Some((*f as i64).to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
    }
}

/// Normalize a scalar event value for numeric comparison. Integers, unsigned
/// integers and floats share one representation; strings parse base-10 only
/// when the flag allows.
fn coerce_num(value: &Value, try_string_num: bool) -> Option<i64> {
    match value {
        Value::Int(i) => Some(*i),
        Value::UInt(u) => i64::try_from(*u).ok(),
        Value::Float(f) => {
            if f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                Some(f.trunc() as i64)
            } else {
                None
            }
        }
        Value::String(s) if try_string_num => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Field-selection leaf: AND across its fields.
///
/// Applicable only when every referenced field exists in the event.
#[derive(Debug, Clone)]
pub struct Selection {
    fields: Vec<FieldMatcher>,
}

impl Selection {
    /// Create a selection; an empty field set is a construction error.
    pub fn new(fields: Vec<FieldMatcher>) -> Result<Self, crate::SigmaError> {
        if fields.is_empty() {
            return Err(crate::SigmaError::InvalidMatcher(
                "selection with no fields".to_string(),
            ));
        }
        Ok(Self { fields })
    }

    /// Evaluate all fields, short-circuiting on the first failure.
    pub fn matches(&self, event: &dyn Event) -> MatchResult {
        for field in &self.fields {
            let r = field.matches(event);
            if !r.applicable {
                return MatchResult::not_applicable();
            }
            if !r.matched {
                return MatchResult::not_matched();
            }
        }
        MatchResult::matched()
    }

    /// Diagnostic rendering.
    pub fn describe(&self) -> String {
        let fields: Vec<&str> = self.fields.iter().map(|f| f.field()).collect();
        format!("SELECTION({})", fields.join(", "))
    }
}

/// Keyword leaf: patterns matched against the event's message strings.
#[derive(Debug, Clone)]
pub struct Keyword {
    matchers: StringMatchers,
}

impl Keyword {
    /// Create a keyword leaf.
    pub fn new(matchers: StringMatchers) -> Self {
        Self { matchers }
    }

    /// Match any pattern against any message string.
    pub fn matches(&self, event: &dyn Event) -> MatchResult {
        let (messages, applicable) = event.keywords();
        if !applicable {
            return MatchResult::not_applicable();
        }
        let matched = messages.iter().any(|m| self.matchers.string_match(m));
        MatchResult::new(matched, true)
    }

    /// Diagnostic rendering.
    pub fn describe(&self) -> String {
        "KEYWORDS".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DynamicEvent;
    use crate::pattern::{
        new_num_matcher, new_string_matcher, MatchConfig, TextPatternModifier,
    };
    use serde_json::json;

    fn text_field(field: &str, pattern: &str) -> FieldMatcher {
        let matchers = new_string_matcher(
            TextPatternModifier::None,
            false,
            false,
            &MatchConfig::default(),
            vec![pattern.to_string()],
        )
        .unwrap();
        FieldMatcher::new(field.to_string(), FieldPattern::Text(matchers))
    }

    fn num_field(field: &str, value: i64, try_string_num: bool) -> FieldMatcher {
        FieldMatcher::new(
            field.to_string(),
            FieldPattern::Num {
                matchers: new_num_matcher(vec![value]).unwrap(),
                try_string_num,
            },
        )
    }

    #[test]
    fn missing_field_is_inapplicable() {
        let event = DynamicEvent::new(json!({"a": "x"}));
        let r = text_field("b", "x").matches(&event);
        assert_eq!(r, MatchResult::not_applicable());
    }

    #[test]
    fn numeric_coercion() {
        let event = DynamicEvent::new(json!({
            "int": 4688,
            "float": 4688.0,
            "text": "4688",
        }));

        assert!(num_field("int", 4688, false).matches(&event).matched);
        assert!(num_field("float", 4688, false).matches(&event).matched);
        assert!(num_field("text", 4688, true).matches(&event).matched);
        // same string value with the flag off fails but stays applicable
        let r = num_field("text", 4688, false).matches(&event);
        assert!(!r.matched);
        assert!(r.applicable);
    }

    #[test]
    fn numbers_match_text_patterns_via_coercion() {
        let event = DynamicEvent::new(json!({"EventID": 1}));
        assert!(text_field("EventID", "1").matches(&event).matched);
    }

    #[test]
    fn selection_requires_every_field() {
        let event = DynamicEvent::new(json!({"a": "x", "b": "y"}));
        let both = Selection::new(vec![text_field("a", "x"), text_field("b", "y")]).unwrap();
        assert_eq!(both.matches(&event), MatchResult::matched());

        let with_missing =
            Selection::new(vec![text_field("a", "x"), text_field("c", "z")]).unwrap();
        assert_eq!(with_missing.matches(&event), MatchResult::not_applicable());
    }

    #[test]
    fn keyword_scans_message_strings() {
        let matchers = new_string_matcher(
            TextPatternModifier::Keyword,
            false,
            false,
            &MatchConfig::default(),
            vec!["mimikatz".to_string()],
        )
        .unwrap();
        let keyword = Keyword::new(matchers);

        let hit = DynamicEvent::new(json!({"msg": "invoke-mimikatz detected", "other": 1}));
        assert!(keyword.matches(&hit).matched);

        let miss = DynamicEvent::new(json!({"msg": "nothing to see"}));
        let r = keyword.matches(&miss);
        assert!(!r.matched);
        assert!(r.applicable);
    }
}
