//! Compiled rule trees.

use std::sync::Arc;

use crate::ast::Branch;
use crate::event::Event;
use crate::parser::{ParseError, Parser};
use crate::pattern::MatchConfig;
use crate::rule::{Detection, RuleHandle};

/// A compiled, immutable rule.
///
/// Construction happens once per rule; evaluation is read-only and safe to
/// run concurrently from any number of threads.
#[derive(Debug)]
pub struct Tree {
    root: Branch,
    rule: Option<Arc<RuleHandle>>,
}

impl Tree {
    /// Compile a bare detection. The resulting tree evaluates normally but
    /// reports no rule metadata from [`Tree::eval`].
    pub fn from_detection(detection: Detection, config: MatchConfig) -> Result<Tree, ParseError> {
        let mut parser = Parser::new(detection, config);
        parser.run()?;
        let root = parser
            .into_result()
            .ok_or_else(|| ParseError::ParserError("parser produced no tree".to_string()))?;
        Ok(Tree { root, rule: None })
    }

    /// Compile a rule, carrying its metadata for result reporting.
    pub fn from_rule(handle: RuleHandle) -> Result<Tree, ParseError> {
        let config = MatchConfig::new(handle.no_collapse_ws, handle.try_string_num);
        let mut tree = Tree::from_detection(handle.rule.detection.clone(), config)?;
        tree.rule = Some(Arc::new(handle));
        Ok(tree)
    }

    /// Evaluate an event, returning `(matched, applicable)`.
    pub fn match_event(&self, event: &dyn Event) -> (bool, bool) {
        let result = self.root.matches(event);
        (result.matched, result.applicable)
    }

    /// Evaluate an event, returning a populated result only when the tree is
    /// both applicable and matched. The second element reports
    /// applicability.
    pub fn eval(&self, event: &dyn Event) -> (Option<crate::result::Result>, bool) {
        let (matched, applicable) = self.match_event(event);
        if !applicable {
            return (None, false);
        }
        if !matched {
            return (None, applicable);
        }

        let result = match &self.rule {
            Some(handle) => crate::result::Result::new(
                handle.rule.id.clone(),
                handle.rule.title.clone(),
            )
            .with_tags(handle.rule.tags.clone()),
            None => crate::result::Result::default(),
        };
        (Some(result), true)
    }

    /// The rule this tree was compiled from, if metadata was attached.
    pub fn rule(&self) -> Option<&RuleHandle> {
        self.rule.as_deref()
    }

    /// The root of the compiled AST.
    pub fn root(&self) -> &Branch {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::DynamicEvent;
    use crate::rule::rule_from_yaml;
    use serde_json::json;
    use std::path::PathBuf;

    #[test]
    fn eval_reports_rule_metadata() {
        let rule = rule_from_yaml(
            br#"
title: Test Rule
id: 12345678-1234-1234-1234-123456789007
tags:
  - attack.discovery
detection:
  selection:
    EventID: 1
  condition: selection
"#,
        )
        .unwrap();

        let tree = Tree::from_rule(RuleHandle::new(rule, PathBuf::from("test.yml"))).unwrap();

        let (result, applicable) = tree.eval(&DynamicEvent::new(json!({"EventID": 1})));
        assert!(applicable);
        let result = result.expect("matching event yields a result");
        assert_eq!(result.id, "12345678-1234-1234-1234-123456789007");
        assert_eq!(result.title, "Test Rule");
        assert_eq!(result.tags, vec!["attack.discovery"]);

        // field present, value different: applicable without a result
        let (result, applicable) = tree.eval(&DynamicEvent::new(json!({"EventID": 2})));
        assert!(applicable);
        assert!(result.is_none());

        // field absent: not applicable
        let (result, applicable) = tree.eval(&DynamicEvent::new(json!({"Other": 1})));
        assert!(!applicable);
        assert!(result.is_none());
    }

    #[test]
    fn trees_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tree>();
    }
}
