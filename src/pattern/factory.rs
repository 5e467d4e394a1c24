//! Construction of pattern matchers from rule text.

use crate::error::SigmaError;
use crate::pattern::escape::escape_sigma_for_glob_cow;
use crate::pattern::num_matcher::{NumMatchers, NumPattern};
use crate::pattern::string_matcher::{
    ContentPattern, GlobPattern, PrefixPattern, RegexPattern, StringMatchers, SuffixPattern,
    TextPattern,
};
use crate::pattern::{MatchConfig, TextPatternModifier};
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;

/// Compile a glob with the escaping convention the translator targets:
/// backslash escapes are honored and `*` crosses path separators.
pub(crate) fn compile_glob(pattern: &str, case_insensitive: bool) -> Result<GlobMatcher, SigmaError> {
    GlobBuilder::new(pattern)
        .backslash_escape(true)
        .literal_separator(false)
        .case_insensitive(case_insensitive)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| SigmaError::InvalidGlob {
            pattern: pattern.to_string(),
            source,
        })
}

fn compile_regex(pattern: &str) -> Result<Regex, SigmaError> {
    Regex::new(pattern).map_err(|source| SigmaError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })
}

/// Wrap an escaped pattern in wildcards for substring semantics.
fn contains_pattern(escaped: &str) -> String {
    let mut result = String::with_capacity(escaped.len() + 2);
    result.push('*');
    result.push_str(escaped);
    result.push('*');
    result
}

/// Build the string matcher collection for one field or keyword list.
///
/// Whitespace in patterns is collapsed before compilation (regexes excepted),
/// mirroring the collapse applied to candidate values at match time. The
/// returned collection is already cost-ordered.
pub fn new_string_matcher(
    modifier: TextPatternModifier,
    lowercase: bool,
    all: bool,
    config: &MatchConfig,
    patterns: Vec<String>,
) -> Result<StringMatchers, SigmaError> {
    let mut matchers: Vec<TextPattern> = Vec::with_capacity(patterns.len());

    for pattern in &patterns {
        let matcher = match modifier {
            TextPatternModifier::Regex => TextPattern::Regex(RegexPattern {
                regex: compile_regex(pattern)?,
            }),
            TextPatternModifier::Contains => {
                let collapsed = collapse_pattern(pattern, config);
                let escaped = escape_sigma_for_glob_cow(&collapsed);
                TextPattern::Glob(GlobPattern {
                    glob: compile_glob(&contains_pattern(&escaped), lowercase)?,
                    ws: config.ws().cloned(),
                })
            }
            TextPatternModifier::Prefix => TextPattern::Prefix(PrefixPattern {
                token: collapse_pattern(pattern, config),
                lowercase,
                ws: config.ws().cloned(),
            }),
            TextPatternModifier::Suffix => TextPattern::Suffix(SuffixPattern {
                token: collapse_pattern(pattern, config),
                lowercase,
                ws: config.ws().cloned(),
            }),
            TextPatternModifier::None | TextPatternModifier::Keyword => {
                if pattern.starts_with('/') && pattern.ends_with('/') && pattern.len() > 2 {
                    // regex written in /pattern/ form
                    TextPattern::Regex(RegexPattern {
                        regex: compile_regex(&pattern[1..pattern.len() - 1])?,
                    })
                } else if modifier == TextPatternModifier::Keyword {
                    // keyword literals always behave as contains
                    let collapsed = collapse_pattern(pattern, config);
                    let escaped = escape_sigma_for_glob_cow(&collapsed);
                    TextPattern::Glob(GlobPattern {
                        glob: compile_glob(&contains_pattern(&escaped), lowercase)?,
                        ws: config.ws().cloned(),
                    })
                } else if pattern.contains('*') {
                    let collapsed = collapse_pattern(pattern, config);
                    let escaped = escape_sigma_for_glob_cow(&collapsed);
                    TextPattern::Glob(GlobPattern {
                        glob: compile_glob(&escaped, lowercase)?,
                        ws: config.ws().cloned(),
                    })
                } else {
                    TextPattern::Content(ContentPattern {
                        token: collapse_pattern(pattern, config),
                        lowercase,
                        ws: config.ws().cloned(),
                    })
                }
            }
        };
        matchers.push(matcher);
    }

    Ok(StringMatchers::new(matchers, all)?.optimize())
}

/// Build the numeric matcher collection for one field.
pub fn new_num_matcher(values: Vec<i64>) -> Result<NumMatchers, SigmaError> {
    NumMatchers::new(values.into_iter().map(|value| NumPattern { value }).collect())
}

fn collapse_pattern(pattern: &str, config: &MatchConfig) -> String {
    match config.ws() {
        Some(ws) => ws.apply(pattern).into_owned(),
        None => pattern.to_string(),
    }
}
