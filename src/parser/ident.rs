//! Identifier resolution: classify a named definition and build its leaf.

use crate::ast::{Branch, FieldMatcher, FieldPattern, Keyword, Selection};
use crate::parser::ParseError;
use crate::pattern::{
    new_num_matcher, new_string_matcher, FieldValue, IdentifierType, MatchConfig, RuleValue,
    TextPatternModifier,
};
use crate::rule::Detection;
use serde_json::Value as JsonValue;

/// Classify an identifier.
///
/// Names beginning with `keyword` are always keyword identifiers; for any
/// other name the definition's shape decides.
pub fn check_ident_type(name: &str, value: &RuleValue) -> IdentifierType {
    if name.starts_with("keyword") {
        return IdentifierType::Keywords;
    }
    match value {
        RuleValue::FieldMap(_) | RuleValue::FieldMapList(_) => IdentifierType::Selection,
        _ => IdentifierType::Keywords,
    }
}

/// Resolve one identifier definition into a leaf branch.
pub fn new_rule_from_ident(
    name: &str,
    raw: &JsonValue,
    config: &MatchConfig,
) -> Result<Branch, ParseError> {
    let value =
        RuleValue::normalize(raw).map_err(|shape| ParseError::InvalidSelectionConstruct {
            ident: name.to_string(),
            shape,
        })?;

    match check_ident_type(name, &value) {
        IdentifierType::Keywords => new_keyword_branch(name, value, config),
        IdentifierType::Selection => new_selection_branch(name, value, config),
    }
}

fn new_keyword_branch(
    name: &str,
    value: RuleValue,
    config: &MatchConfig,
) -> Result<Branch, ParseError> {
    let patterns = match value {
        RuleValue::String(s) => vec![s],
        RuleValue::Number(n) => vec![n.to_string()],
        RuleValue::StringList(list) => list,
        RuleValue::NumberList(list) => list.into_iter().map(|n| n.to_string()).collect(),
        // single-key map holding the message pattern list
        RuleValue::FieldMap(fields) => match fields.as_slice() {
            [(key, field_value)] if key == "Message" => match field_value {
                FieldValue::String(s) => vec![s.clone()],
                FieldValue::StringList(list) => list.clone(),
                other => {
                    return Err(ParseError::InvalidKeywordConstruct {
                        ident: name.to_string(),
                        shape: format!("Message holding {other:?}"),
                    })
                }
            },
            _ => {
                return Err(ParseError::InvalidKeywordConstruct {
                    ident: name.to_string(),
                    shape: "field map".to_string(),
                })
            }
        },
        other => {
            return Err(ParseError::InvalidKeywordConstruct {
                ident: name.to_string(),
                shape: other.shape().to_string(),
            })
        }
    };

    let matchers = new_string_matcher(
        TextPatternModifier::Keyword,
        false,
        false,
        config,
        patterns,
    )
    .map_err(|e| ParseError::PatternCompilation {
        ident: name.to_string(),
        msg: e.to_string(),
    })?;

    Ok(Branch::Keyword(Keyword::new(matchers)))
}

fn new_selection_branch(
    name: &str,
    value: RuleValue,
    config: &MatchConfig,
) -> Result<Branch, ParseError> {
    match value {
        RuleValue::FieldMap(fields) => Ok(Branch::Fields(selection_from_map(
            name, fields, config,
        )?)),
        RuleValue::FieldMapList(maps) => {
            let mut selections = Vec::with_capacity(maps.len());
            for fields in maps {
                selections.push(selection_from_map(name, fields, config)?);
            }
            Ok(Branch::FieldsList(selections))
        }
        other => Err(ParseError::InvalidSelectionConstruct {
            ident: name.to_string(),
            shape: other.shape().to_string(),
        }),
    }
}

fn selection_from_map(
    ident: &str,
    fields: Vec<(String, FieldValue)>,
    config: &MatchConfig,
) -> Result<Selection, ParseError> {
    let mut matchers = Vec::with_capacity(fields.len());

    for (key, value) in fields {
        let (field, modifier, all) = parse_field_modifier(&key)?;
        let pattern = build_field_pattern(ident, value, modifier, all, config)?;
        matchers.push(FieldMatcher::new(field.to_string(), pattern));
    }

    Selection::new(matchers).map_err(|e| ParseError::PatternCompilation {
        ident: ident.to_string(),
        msg: e.to_string(),
    })
}

fn build_field_pattern(
    ident: &str,
    value: FieldValue,
    modifier: TextPatternModifier,
    all: bool,
    config: &MatchConfig,
) -> Result<FieldPattern, ParseError> {
    let pattern_error = |e: crate::SigmaError| ParseError::PatternCompilation {
        ident: ident.to_string(),
        msg: e.to_string(),
    };

    match value {
        FieldValue::String(s) => Ok(FieldPattern::Text(
            new_string_matcher(modifier, false, all, config, vec![s]).map_err(pattern_error)?,
        )),
        FieldValue::StringList(list) => Ok(FieldPattern::Text(
            new_string_matcher(modifier, false, all, config, list).map_err(pattern_error)?,
        )),
        // numbers stay numeric unless an explicit text modifier forces
        // string semantics
        FieldValue::Number(n) => match modifier {
            TextPatternModifier::None => Ok(FieldPattern::Num {
                matchers: new_num_matcher(vec![n]).map_err(pattern_error)?,
                try_string_num: config.try_string_num,
            }),
            _ => Ok(FieldPattern::Text(
                new_string_matcher(modifier, false, all, config, vec![n.to_string()])
                    .map_err(pattern_error)?,
            )),
        },
        FieldValue::NumberList(list) => match modifier {
            TextPatternModifier::None => Ok(FieldPattern::Num {
                matchers: new_num_matcher(list).map_err(pattern_error)?,
                try_string_num: config.try_string_num,
            }),
            _ => Ok(FieldPattern::Text(
                new_string_matcher(
                    modifier,
                    false,
                    all,
                    config,
                    list.into_iter().map(|n| n.to_string()).collect(),
                )
                .map_err(pattern_error)?,
            )),
        },
    }
}

/// Split a detection field key into field name, modifier and `|all` flag.
fn parse_field_modifier(
    key: &str,
) -> Result<(&str, TextPatternModifier, bool), ParseError> {
    let mut parts = key.split('|');
    let field = parts.next().unwrap_or(key);
    let mut modifier = TextPatternModifier::None;
    let mut all = false;

    for part in parts {
        match part.to_ascii_lowercase().as_str() {
            "contains" => modifier = TextPatternModifier::Contains,
            "startswith" | "prefix" => modifier = TextPatternModifier::Prefix,
            "endswith" | "suffix" => modifier = TextPatternModifier::Suffix,
            "re" | "regex" => modifier = TextPatternModifier::Regex,
            "all" => all = true,
            unknown => {
                return Err(ParseError::UnknownModifier {
                    field: field.to_string(),
                    modifier: unknown.to_string(),
                })
            }
        }
    }

    Ok((field, modifier, all))
}

/// Expand `them`: every identifier in the detection map, in name order.
pub fn extract_all_to_rules(
    detection: &Detection,
    config: &MatchConfig,
) -> Result<Vec<Branch>, ParseError> {
    let mut names: Vec<&String> = detection.iter().map(|(k, _)| k).collect();
    names.sort();

    let mut rules = Vec::with_capacity(names.len());
    for name in names {
        let value = detection
            .get(name)
            .ok_or_else(|| ParseError::MissingConditionItem { key: name.clone() })?;
        rules.push(new_rule_from_ident(name, value, config)?);
    }

    if rules.is_empty() {
        return Err(ParseError::ParserError(
            "no identifiers defined for 'them' expansion".to_string(),
        ));
    }
    Ok(rules)
}

/// Expand a wildcard identifier over the detection map, in name order.
pub fn extract_wildcard_idents(
    detection: &Detection,
    pattern: &str,
    config: &MatchConfig,
) -> Result<Vec<Branch>, ParseError> {
    let escaped = crate::pattern::escape_sigma_for_glob(pattern);
    let glob = crate::pattern::factory::compile_glob(&escaped, false).map_err(|e| {
        ParseError::PatternCompilation {
            ident: pattern.to_string(),
            msg: e.to_string(),
        }
    })?;

    let mut names: Vec<&String> = detection
        .iter()
        .filter(|(k, _)| glob.is_match(k.as_str()))
        .map(|(k, _)| k)
        .collect();
    names.sort();

    let mut rules = Vec::with_capacity(names.len());
    for name in names {
        let value = detection
            .get(name)
            .ok_or_else(|| ParseError::MissingConditionItem { key: name.clone() })?;
        rules.push(new_rule_from_ident(name, value, config)?);
    }

    if rules.is_empty() {
        return Err(ParseError::NoMatchingWildcard {
            pattern: pattern.to_string(),
        });
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keyword_prefix_always_classifies_as_keywords() {
        let map = RuleValue::normalize(&json!({"EventID": 1})).unwrap();
        assert_eq!(
            check_ident_type("keywords", &map),
            IdentifierType::Keywords
        );
        assert_eq!(
            check_ident_type("keyword_cli", &map),
            IdentifierType::Keywords
        );
        assert_eq!(check_ident_type("selection", &map), IdentifierType::Selection);
    }

    #[test]
    fn shape_decides_for_other_names() {
        let list = RuleValue::normalize(&json!(["a", "b"])).unwrap();
        assert_eq!(check_ident_type("selection", &list), IdentifierType::Keywords);

        let maps = RuleValue::normalize(&json!([{"a": 1}, {"b": 2}])).unwrap();
        assert_eq!(check_ident_type("selection", &maps), IdentifierType::Selection);
    }

    #[test]
    fn modifier_parsing() {
        assert_eq!(
            parse_field_modifier("CommandLine").unwrap(),
            ("CommandLine", TextPatternModifier::None, false)
        );
        assert_eq!(
            parse_field_modifier("CommandLine|contains").unwrap(),
            ("CommandLine", TextPatternModifier::Contains, false)
        );
        assert_eq!(
            parse_field_modifier("CommandLine|contains|all").unwrap(),
            ("CommandLine", TextPatternModifier::Contains, true)
        );
        assert_eq!(
            parse_field_modifier("Image|endswith").unwrap(),
            ("Image", TextPatternModifier::Suffix, false)
        );
        assert!(matches!(
            parse_field_modifier("Hash|base64"),
            Err(ParseError::UnknownModifier { .. })
        ));
    }

    #[test]
    fn selection_with_unusable_shape_names_the_ident() {
        let err =
            new_rule_from_ident("selection", &json!({"f": {"nested": 1}}), &MatchConfig::default())
                .unwrap_err();
        match err {
            ParseError::InvalidSelectionConstruct { ident, .. } => {
                assert_eq!(ident, "selection");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn keyword_message_map() {
        let branch = new_rule_from_ident(
            "keywords",
            &json!({"Message": ["mimikatz"]}),
            &MatchConfig::default(),
        )
        .unwrap();
        assert!(matches!(branch, Branch::Keyword(_)));
    }

    #[test]
    fn wildcard_expansion_requires_a_match() {
        let mut detection = Detection::new();
        detection.insert("condition".to_string(), json!("1 of filter*"));
        detection.insert("selection1".to_string(), json!({"a": 1}));

        let err =
            extract_wildcard_idents(&detection, "filter*", &MatchConfig::default()).unwrap_err();
        assert!(matches!(err, ParseError::NoMatchingWildcard { .. }));
    }
}
