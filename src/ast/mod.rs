//! AST nodes and tri-state matching.
//!
//! A compiled condition is a tree of [`Branch`] values. Every node evaluates
//! to a [`MatchResult`] carrying both whether the event matched and whether
//! the node was applicable, meaning the fields it depends on were present in
//! the event at all. Applicability keeps rules that reference
//! absent fields from being treated as hard negatives, which matters for the
//! short-circuit rules on AND, OR and NOT below.

/// Leaf matchers
pub mod leaf;

pub use leaf::{FieldMatcher, FieldPattern, Keyword, Selection};

use crate::error::SigmaError;
use crate::event::Event;

/// Result of evaluating a branch against one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchResult {
    /// Whether the pattern comparison succeeded
    pub matched: bool,
    /// Whether the referenced fields were present in the event
    pub applicable: bool,
}

impl MatchResult {
    /// Create a result.
    pub fn new(matched: bool, applicable: bool) -> Self {
        Self {
            matched,
            applicable,
        }
    }

    /// Successful match.
    pub fn matched() -> Self {
        Self::new(true, true)
    }

    /// Fields were present but did not match.
    pub fn not_matched() -> Self {
        Self::new(false, true)
    }

    /// Fields were absent from the event.
    pub fn not_applicable() -> Self {
        Self::new(false, false)
    }
}

/// Evaluation node of a compiled condition.
///
/// A closed sum with owned children: illegal trees (empty groups, dangling
/// leaves) are rejected at construction instead of checked at runtime.
#[derive(Debug, Clone)]
pub enum Branch {
    /// Binary conjunction
    And(Box<Branch>, Box<Branch>),
    /// Binary disjunction
    Or(Box<Branch>, Box<Branch>),
    /// Negation
    Not(Box<Branch>),
    /// N-ary conjunction, kept where reduction to binary buys nothing
    SimpleAnd(Vec<Branch>),
    /// N-ary disjunction
    SimpleOr(Vec<Branch>),
    /// Field-selection leaf
    Fields(Selection),
    /// OR-joined selection alternatives from a list-of-maps definition
    FieldsList(Vec<Selection>),
    /// Keyword leaf matched against the event's message strings
    Keyword(Keyword),
}

impl Branch {
    /// Evaluate this branch against an event.
    ///
    /// AND short-circuits on a non-matching left side, returning that side's
    /// applicability; OR short-circuits on a matching left side the same way;
    /// NOT passes an inapplicable result through unchanged since negating
    /// inapplicability is not meaningful. The n-ary forms fold exactly as the
    /// equivalent binary chain would.
    pub fn matches(&self, event: &dyn Event) -> MatchResult {
        match self {
            Branch::And(left, right) => {
                let l = left.matches(event);
                if !l.matched {
                    return MatchResult::new(false, l.applicable);
                }
                let r = right.matches(event);
                MatchResult::new(l.matched && r.matched, l.applicable && r.applicable)
            }
            Branch::Or(left, right) => {
                let l = left.matches(event);
                if l.matched {
                    return MatchResult::new(true, l.applicable);
                }
                let r = right.matches(event);
                MatchResult::new(l.matched || r.matched, l.applicable || r.applicable)
            }
            Branch::Not(inner) => {
                let r = inner.matches(event);
                if !r.applicable {
                    return r;
                }
                MatchResult::new(!r.matched, true)
            }
            Branch::SimpleAnd(branches) => {
                let mut matched = true;
                let mut applicable = true;
                for branch in branches {
                    if !matched {
                        break;
                    }
                    let r = branch.matches(event);
                    matched = r.matched;
                    applicable = applicable && r.applicable;
                }
                MatchResult::new(matched, applicable)
            }
            Branch::SimpleOr(branches) => {
                let mut matched = false;
                let mut applicable = false;
                for branch in branches {
                    if matched {
                        break;
                    }
                    let r = branch.matches(event);
                    matched = r.matched;
                    applicable = applicable || r.applicable;
                }
                MatchResult::new(matched, applicable)
            }
            Branch::Fields(selection) => selection.matches(event),
            Branch::FieldsList(selections) => {
                let mut applicable = false;
                for selection in selections {
                    let r = selection.matches(event);
                    if r.matched {
                        return MatchResult::new(true, r.applicable);
                    }
                    applicable = applicable || r.applicable;
                }
                MatchResult::new(false, applicable)
            }
            Branch::Keyword(keyword) => keyword.matches(event),
        }
    }

    /// Human-readable rendering of the tree, for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Branch::And(l, r) => format!("({} AND {})", l.describe(), r.describe()),
            Branch::Or(l, r) => format!("({} OR {})", l.describe(), r.describe()),
            Branch::Not(x) => format!("NOT {}", x.describe()),
            Branch::SimpleAnd(branches) => {
                let parts: Vec<String> = branches.iter().map(Branch::describe).collect();
                format!("({})", parts.join(" AND "))
            }
            Branch::SimpleOr(branches) => {
                let parts: Vec<String> = branches.iter().map(Branch::describe).collect();
                format!("({})", parts.join(" OR "))
            }
            Branch::Fields(selection) => selection.describe(),
            Branch::FieldsList(selections) => {
                let parts: Vec<String> = selections.iter().map(Selection::describe).collect();
                format!("({})", parts.join(" OR "))
            }
            Branch::Keyword(keyword) => keyword.describe(),
        }
    }

    /// Collapse an AND group: one element stands alone, two become the
    /// binary form, more stay n-ary.
    pub(crate) fn reduce_and(mut branches: Vec<Branch>) -> Result<Branch, SigmaError> {
        match branches.len() {
            0 => Err(SigmaError::InvalidMatcher(
                "cannot reduce empty AND group".to_string(),
            )),
            1 => Ok(branches.remove(0)),
            2 => {
                let right = branches.pop().expect("two elements");
                let left = branches.pop().expect("two elements");
                Ok(Branch::And(Box::new(left), Box::new(right)))
            }
            _ => Ok(Branch::SimpleAnd(branches)),
        }
    }

    /// Collapse an OR group the same way.
    pub(crate) fn reduce_or(mut branches: Vec<Branch>) -> Result<Branch, SigmaError> {
        match branches.len() {
            0 => Err(SigmaError::InvalidMatcher(
                "cannot reduce empty OR group".to_string(),
            )),
            1 => Ok(branches.remove(0)),
            2 => {
                let right = branches.pop().expect("two elements");
                let left = branches.pop().expect("two elements");
                Ok(Branch::Or(Box::new(left), Box::new(right)))
            }
            _ => Ok(Branch::SimpleOr(branches)),
        }
    }

    /// Wrap in NOT when a pending negation applies.
    pub(crate) fn negate_if(self, negated: bool) -> Branch {
        if negated {
            Branch::Not(Box::new(self))
        } else {
            self
        }
    }
}
