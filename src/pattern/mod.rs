//! Pattern matching primitives for detection identifiers.

/// Sigma-to-glob escape translation
pub mod escape;
/// Matcher construction
pub mod factory;
/// Numeric matchers
pub mod num_matcher;
/// String matchers
pub mod string_matcher;
/// Detection value normalization
pub mod value;
/// Whitespace collapsing
pub mod whitespace;

pub use escape::{escape_sigma_for_glob, escape_sigma_for_glob_cow};
pub use factory::{new_num_matcher, new_string_matcher};
pub use num_matcher::{NumMatchers, NumPattern};
pub use string_matcher::{
    ContentPattern, GlobPattern, PrefixPattern, RegexPattern, StringMatchers, SuffixPattern,
    TextPattern,
};
pub use value::{FieldValue, RuleValue};
pub use whitespace::WsCollapse;

/// Kind of a detection identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierType {
    /// Field-to-pattern map, AND across fields
    Selection,
    /// Flat pattern list matched against the event's message fields
    Keywords,
}

/// Text pattern modifiers parsed from field-key suffixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextPatternModifier {
    /// No modifier: literal, glob or `/regex/` selected per pattern
    None,
    /// `|contains`: substring match
    Contains,
    /// `|startswith`: prefix match
    Prefix,
    /// `|endswith`: suffix match
    Suffix,
    /// `|re`: regular expression
    Regex,
    /// Keyword identifier semantics: plain literals behave as contains
    Keyword,
}

/// Matching configuration shared by every matcher compiled for one tree.
///
/// Holds the whitespace collapser so the compiled `\s+` regex lives on the
/// matchers it serves rather than in process-wide state.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    ws: Option<WsCollapse>,
    /// Parse string event values as base-10 integers for numeric patterns
    pub try_string_num: bool,
}

impl MatchConfig {
    /// Create a configuration.
    ///
    /// `no_collapse_ws` disables the default collapsing of whitespace runs in
    /// patterns and candidate values before non-regex comparisons.
    pub fn new(no_collapse_ws: bool, try_string_num: bool) -> Self {
        Self {
            ws: if no_collapse_ws {
                None
            } else {
                Some(WsCollapse::new())
            },
            try_string_num,
        }
    }

    /// The whitespace collapser, if collapsing is enabled.
    pub fn ws(&self) -> Option<&WsCollapse> {
        self.ws.as_ref()
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new(false, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_collapses_whitespace() {
        let config = MatchConfig::default();
        assert!(config.ws().is_some());
        assert!(config.try_string_num);
    }

    #[test]
    fn no_collapse_config() {
        let config = MatchConfig::new(true, false);
        assert!(config.ws().is_none());
        assert!(!config.try_string_num);
    }
}
