//! String pattern matchers.
//!
//! Five atomic kinds are compiled per pattern string: content, prefix and
//! suffix literals, glob, and regex. Collections combine them with any-match
//! or all-match logic and are reordered once at construction so the cheapest
//! comparisons run first.

use crate::pattern::whitespace::{handle_whitespace, WsCollapse};
use globset::GlobMatcher;
use regex::Regex;

/// Exact content match
#[derive(Debug, Clone)]
pub struct ContentPattern {
    /// The token to compare against
    pub token: String,
    /// Case-insensitive comparison
    pub lowercase: bool,
    /// Whitespace collapser applied to candidate values
    pub ws: Option<WsCollapse>,
}

impl ContentPattern {
    fn string_match(&self, value: &str) -> bool {
        let value = handle_whitespace(value, self.ws.as_ref());
        if self.lowercase {
            value.eq_ignore_ascii_case(&self.token)
        } else {
            value.as_ref() == self.token
        }
    }
}

/// Prefix match
#[derive(Debug, Clone)]
pub struct PrefixPattern {
    /// The token to match as prefix
    pub token: String,
    /// Case-insensitive comparison
    pub lowercase: bool,
    /// Whitespace collapser applied to candidate values
    pub ws: Option<WsCollapse>,
}

impl PrefixPattern {
    fn string_match(&self, value: &str) -> bool {
        let value = handle_whitespace(value, self.ws.as_ref());
        if self.lowercase {
            match value.get(..self.token.len()) {
                Some(head) => head.eq_ignore_ascii_case(&self.token),
                None => false,
            }
        } else {
            value.starts_with(&self.token)
        }
    }
}

/// Suffix match
#[derive(Debug, Clone)]
pub struct SuffixPattern {
    /// The token to match as suffix
    pub token: String,
    /// Case-insensitive comparison
    pub lowercase: bool,
    /// Whitespace collapser applied to candidate values
    pub ws: Option<WsCollapse>,
}

impl SuffixPattern {
    fn string_match(&self, value: &str) -> bool {
        let value = handle_whitespace(value, self.ws.as_ref());
        if self.lowercase {
            match value
                .len()
                .checked_sub(self.token.len())
                .and_then(|start| value.get(start..))
            {
                Some(tail) => tail.eq_ignore_ascii_case(&self.token),
                None => false,
            }
        } else {
            value.ends_with(&self.token)
        }
    }
}

/// Glob match
#[derive(Debug, Clone)]
pub struct GlobPattern {
    /// The compiled glob
    pub glob: GlobMatcher,
    /// Whitespace collapser applied to candidate values
    pub ws: Option<WsCollapse>,
}

impl GlobPattern {
    fn string_match(&self, value: &str) -> bool {
        let value = handle_whitespace(value, self.ws.as_ref());
        self.glob.is_match(value.as_ref())
    }
}

/// Regular expression match; never collapses whitespace
#[derive(Debug, Clone)]
pub struct RegexPattern {
    /// The compiled expression
    pub regex: Regex,
}

impl RegexPattern {
    fn string_match(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

/// Atomic string pattern
#[derive(Debug, Clone)]
pub enum TextPattern {
    /// Exact content
    Content(ContentPattern),
    /// Prefix
    Prefix(PrefixPattern),
    /// Suffix
    Suffix(SuffixPattern),
    /// Glob
    Glob(GlobPattern),
    /// Regular expression
    Regex(RegexPattern),
}

impl TextPattern {
    /// Match a candidate value against this pattern.
    pub fn string_match(&self, value: &str) -> bool {
        match self {
            TextPattern::Content(p) => p.string_match(value),
            TextPattern::Prefix(p) => p.string_match(value),
            TextPattern::Suffix(p) => p.string_match(value),
            TextPattern::Glob(p) => p.string_match(value),
            TextPattern::Regex(p) => p.string_match(value),
        }
    }

    /// Relative evaluation cost, used by the construction-time reorder.
    fn cost(&self) -> u8 {
        match self {
            TextPattern::Content(_) | TextPattern::Prefix(_) | TextPattern::Suffix(_) => 0,
            TextPattern::Glob(_) => 1,
            TextPattern::Regex(_) => 2,
        }
    }
}

/// Non-empty collection of string patterns for one field
#[derive(Debug, Clone)]
pub struct StringMatchers {
    patterns: Vec<TextPattern>,
    match_all: bool,
}

impl StringMatchers {
    /// Create a collection. `match_all` selects AND logic (the `|all`
    /// modifier) instead of the default any-match.
    pub fn new(patterns: Vec<TextPattern>, match_all: bool) -> Result<Self, crate::SigmaError> {
        if patterns.is_empty() {
            return Err(crate::SigmaError::InvalidMatcher(
                "no patterns defined for matcher object".to_string(),
            ));
        }
        Ok(Self {
            patterns,
            match_all,
        })
    }

    /// Reorder patterns so literal comparisons run before globs and globs
    /// before regexes. First-match-wins makes this a pure speedup.
    pub fn optimize(mut self) -> Self {
        self.patterns.sort_by_key(TextPattern::cost);
        self
    }

    /// Match a candidate value against the collection.
    pub fn string_match(&self, value: &str) -> bool {
        if self.match_all {
            self.patterns.iter().all(|p| p.string_match(value))
        } else {
            self.patterns.iter().any(|p| p.string_match(value))
        }
    }

    /// The patterns in evaluation order.
    pub fn patterns(&self) -> &[TextPattern] {
        &self.patterns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::factory::compile_glob;

    fn content(token: &str, lowercase: bool) -> TextPattern {
        TextPattern::Content(ContentPattern {
            token: token.to_string(),
            lowercase,
            ws: Some(WsCollapse::new()),
        })
    }

    #[test]
    fn content_pattern() {
        let pattern = content("test", false);
        assert!(pattern.string_match("test"));
        assert!(!pattern.string_match("Test"));
        assert!(!pattern.string_match("testing"));
    }

    #[test]
    fn content_pattern_lowercase() {
        let pattern = content("test", true);
        assert!(pattern.string_match("test"));
        assert!(pattern.string_match("TEST"));
        assert!(!pattern.string_match("testing"));
    }

    #[test]
    fn content_pattern_collapses_whitespace() {
        let pattern = content("cmd.exe /c whoami", false);
        assert!(pattern.string_match("cmd.exe  /c \t whoami"));
    }

    #[test]
    fn prefix_and_suffix() {
        let prefix = TextPattern::Prefix(PrefixPattern {
            token: "test".to_string(),
            lowercase: false,
            ws: None,
        });
        assert!(prefix.string_match("testing"));
        assert!(!prefix.string_match("pretest"));

        let suffix = TextPattern::Suffix(SuffixPattern {
            token: ".exe".to_string(),
            lowercase: false,
            ws: None,
        });
        assert!(suffix.string_match("cmd.exe"));
        assert!(!suffix.string_match("cmd.exe.bak"));
    }

    #[test]
    fn suffix_lowercase_shorter_value() {
        let suffix = TextPattern::Suffix(SuffixPattern {
            token: "bitsadmin.exe".to_string(),
            lowercase: true,
            ws: None,
        });
        assert!(suffix.string_match("C:\\BITSADMIN.EXE"));
        assert!(!suffix.string_match(".exe"));
    }

    #[test]
    fn optimize_orders_by_cost() {
        let matchers = StringMatchers::new(
            vec![
                TextPattern::Regex(RegexPattern {
                    regex: Regex::new("x.*").unwrap(),
                }),
                TextPattern::Glob(GlobPattern {
                    glob: compile_glob("x*", false).unwrap(),
                    ws: None,
                }),
                content("x", false),
            ],
            false,
        )
        .unwrap()
        .optimize();

        let costs: Vec<&'static str> = matchers
            .patterns()
            .iter()
            .map(|p| match p {
                TextPattern::Content(_) | TextPattern::Prefix(_) | TextPattern::Suffix(_) => {
                    "literal"
                }
                TextPattern::Glob(_) => "glob",
                TextPattern::Regex(_) => "regex",
            })
            .collect();
        assert_eq!(costs, vec!["literal", "glob", "regex"]);
    }

    #[test]
    fn empty_collection_is_an_error() {
        assert!(StringMatchers::new(vec![], false).is_err());
    }

    #[test]
    fn all_mode_requires_every_pattern() {
        let matchers = StringMatchers::new(
            vec![
                TextPattern::Glob(GlobPattern {
                    glob: compile_glob("*mark1*", false).unwrap(),
                    ws: None,
                }),
                TextPattern::Glob(GlobPattern {
                    glob: compile_glob("*mark2*", false).unwrap(),
                    ws: None,
                }),
            ],
            true,
        )
        .unwrap();

        assert!(matchers.string_match("Some mark1 mark2 String"));
        assert!(!matchers.string_match("mark1 mark3"));
    }
}
