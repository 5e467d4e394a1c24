//! Numeric pattern matchers.
//!
//! Numeric patterns are exact-equality only. Event values are normalized to
//! `i64` before comparison; the coercion rules live with the leaf matchers.

/// Exact numeric pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumPattern {
    /// The value to match
    pub value: i64,
}

impl NumPattern {
    /// Match a normalized event value.
    pub fn num_match(&self, value: i64) -> bool {
        self.value == value
    }
}

/// Non-empty collection of numeric patterns, any-match
#[derive(Debug, Clone)]
pub struct NumMatchers {
    patterns: Vec<NumPattern>,
}

impl NumMatchers {
    /// Create a collection.
    pub fn new(patterns: Vec<NumPattern>) -> Result<Self, crate::SigmaError> {
        if patterns.is_empty() {
            return Err(crate::SigmaError::InvalidMatcher(
                "no patterns defined for matcher object".to_string(),
            ));
        }
        Ok(Self { patterns })
    }

    /// Match a normalized event value against the collection.
    pub fn num_match(&self, value: i64) -> bool {
        self.patterns.iter().any(|p| p.num_match(value))
    }
}
