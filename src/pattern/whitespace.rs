//! Whitespace collapsing for non-regex comparisons.
//!
//! Collapsing consecutive whitespace to a single space defeats
//! whitespace-padding evasion in command lines and similar fields. Regex
//! comparisons never collapse.

use regex::Regex;
use std::borrow::Cow;
use std::sync::Arc;

/// Collapses whitespace runs to single spaces.
///
/// The compiled regex is shared by the matchers of one tree; cloning is
/// cheap.
#[derive(Debug, Clone)]
pub struct WsCollapse(Arc<Regex>);

impl WsCollapse {
    /// Create a collapser.
    pub fn new() -> Self {
        Self(Arc::new(Regex::new(r"\s+").expect("whitespace regex")))
    }

    /// Collapse whitespace runs in `s` to single spaces.
    pub fn apply<'a>(&self, s: &'a str) -> Cow<'a, str> {
        self.0.replace_all(s, " ")
    }
}

impl Default for WsCollapse {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply an optional collapser to a candidate value.
pub(crate) fn handle_whitespace<'a>(s: &'a str, ws: Option<&WsCollapse>) -> Cow<'a, str> {
    match ws {
        Some(collapse) => collapse.apply(s),
        None => Cow::Borrowed(s),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untouched_strings_borrow() {
        let ws = WsCollapse::new();
        assert!(matches!(ws.apply("test"), Cow::Borrowed(_)));
        assert_eq!(ws.apply("test string"), "test string");
    }

    #[test]
    fn runs_collapse_to_single_space() {
        let ws = WsCollapse::new();
        assert_eq!(ws.apply("test  string"), "test string");
        assert_eq!(ws.apply("test \t \n string"), "test string");
        assert_eq!(ws.apply("  test  "), " test ");
    }

    #[test]
    fn disabled_collapse_passes_through() {
        assert_eq!(handle_whitespace("test  string", None), "test  string");
    }
}
