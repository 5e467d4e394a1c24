//! Condition parsing: token collection, validation and AST construction.
//!
//! Parsing runs in two passes. The first drains the lexer, checking every
//! adjacent token pair against the validation table and rejecting
//! unsupported constructs as they appear. The second walks the collected
//! tokens left to right, maintaining an in-progress AND group and a
//! completed OR group, recursing into parenthesized spans and expanding
//! `all of` / `1 of` aggregates.

use crate::ast::Branch;
use crate::lexer::{Item, Lexer, Token};
use crate::pattern::MatchConfig;
use crate::rule::Detection;

/// Parse error types
pub mod error;
/// Identifier resolution
pub mod ident;
/// Token adjacency validation
pub mod validate;

pub use error::{ParseError, ParseErrorKind};
pub use validate::valid_token_sequence;

/// Maximum number of tokens collected from a single condition
const MAX_TOKENS: usize = 10_000;

/// Maximum nesting depth for parenthesized groups
const MAX_RECURSION_DEPTH: usize = 50;

/// Parser driving the lexer and building the AST for one detection.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Item>,
    previous: Item,
    sigma: Detection,
    condition: String,
    result: Option<Branch>,
    config: MatchConfig,
}

impl Parser {
    /// Create a parser for a detection.
    pub fn new(sigma: Detection, config: MatchConfig) -> Self {
        let condition = sigma.condition().unwrap_or_default().to_string();
        Self {
            tokens: Vec::new(),
            previous: Item::new(Token::Begin, Token::Begin.literal()),
            sigma,
            condition,
            result: None,
            config,
        }
    }

    /// Collect, validate and parse the condition.
    pub fn run(&mut self) -> Result<(), ParseError> {
        if self.condition.is_empty() {
            return Err(ParseError::MissingCondition);
        }
        self.collect()?;
        self.parse()
    }

    /// First pass: drain the lexer with incremental sequence validation.
    fn collect(&mut self) -> Result<(), ParseError> {
        let lexer = Lexer::new(&self.condition);

        for item in lexer {
            if item.token == Token::Unsupported {
                return Err(ParseError::UnsupportedExpression { msg: item.value });
            }
            if !valid_token_sequence(self.previous.token, item.token) {
                return Err(ParseError::InvalidTokenSequence {
                    prev: self.previous.clone(),
                    next: item,
                    collected: self.tokens.len(),
                });
            }
            if item.token != Token::LitEof {
                if self.tokens.len() >= MAX_TOKENS {
                    return Err(ParseError::TokenLimitExceeded {
                        count: self.tokens.len(),
                        limit: MAX_TOKENS,
                    });
                }
                self.tokens.push(item.clone());
            }
            self.previous = item;
        }

        if self.previous.token != Token::LitEof {
            return Err(ParseError::IncompleteTokenSequence {
                expression: self.condition.clone(),
                last: self.previous.clone(),
            });
        }

        Ok(())
    }

    /// Second pass: build the AST from the collected tokens.
    fn parse(&mut self) -> Result<(), ParseError> {
        self.validate_parentheses()?;
        let branch = new_branch(&self.sigma, &self.tokens, 0, &self.config)?;
        self.result = Some(branch);
        Ok(())
    }

    fn validate_parentheses(&self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        for item in &self.tokens {
            match item.token {
                Token::SepLpar => {
                    depth += 1;
                    if depth > MAX_RECURSION_DEPTH {
                        return Err(ParseError::RecursionLimitExceeded {
                            depth,
                            limit: MAX_RECURSION_DEPTH,
                        });
                    }
                }
                Token::SepRpar => {
                    depth = depth
                        .checked_sub(1)
                        .ok_or(ParseError::UnmatchedParenthesis)?;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return Err(ParseError::UnmatchedParenthesis);
        }
        Ok(())
    }

    /// The built AST, consuming the parser.
    pub fn into_result(self) -> Option<Branch> {
        self.result
    }

    /// The collected tokens, for diagnostics.
    pub fn tokens(&self) -> &[Item] {
        &self.tokens
    }
}

/// Build a branch from a validated token span.
fn new_branch(
    detection: &Detection,
    tokens: &[Item],
    depth: usize,
    config: &MatchConfig,
) -> Result<Branch, ParseError> {
    if depth > MAX_RECURSION_DEPTH {
        return Err(ParseError::RecursionLimitExceeded {
            depth,
            limit: MAX_RECURSION_DEPTH,
        });
    }

    let mut and_branches: Vec<Branch> = Vec::new();
    let mut or_branches: Vec<Branch> = Vec::new();
    let mut negated = false;
    let mut aggregate: Option<Token> = None;

    let mut iter = tokens.iter();
    while let Some(item) = iter.next() {
        match item.token {
            Token::Identifier => {
                let value = detection.get(&item.value).ok_or_else(|| {
                    ParseError::MissingConditionItem {
                        key: item.value.clone(),
                    }
                })?;
                let branch = ident::new_rule_from_ident(&item.value, value, config)?;
                and_branches.push(branch.negate_if(negated));
                negated = false;
                aggregate = None;
            }

            // AND is implicit between accumulated terms
            Token::KeywordAnd => {}

            Token::KeywordOr => {
                let and_node = Branch::reduce_and(std::mem::take(&mut and_branches))
                    .map_err(|e| ParseError::ParserError(e.to_string()))?;
                or_branches.push(and_node);
            }

            Token::KeywordNot => {
                negated = true;
            }

            Token::SepLpar => {
                let group = extract_group(&mut iter)?;
                let branch = new_branch(detection, &group, depth + 1, config)?;
                and_branches.push(branch.negate_if(negated));
                negated = false;
            }

            Token::StmtAllOf => {
                aggregate = Some(Token::StmtAllOf);
            }

            Token::StmtOneOf => {
                aggregate = Some(Token::StmtOneOf);
            }

            Token::IdentifierAll => {
                let rules = ident::extract_all_to_rules(detection, config)?;
                let node = combine_aggregate(rules, aggregate)?;
                and_branches.push(node.negate_if(negated));
                negated = false;
                aggregate = None;
            }

            Token::IdentifierWithWildcard => {
                let rules = ident::extract_wildcard_idents(detection, &item.value, config)?;
                let node = combine_aggregate(rules, aggregate)?;
                and_branches.push(node.negate_if(negated));
                negated = false;
                aggregate = None;
            }

            token => {
                return Err(ParseError::UnsupportedToken {
                    token,
                    value: item.value.clone(),
                });
            }
        }
    }

    if !and_branches.is_empty() {
        let and_node = Branch::reduce_and(and_branches)
            .map_err(|e| ParseError::ParserError(e.to_string()))?;
        or_branches.push(and_node);
    }

    if or_branches.is_empty() {
        return Err(ParseError::ParserError(
            "no branches built from condition".to_string(),
        ));
    }
    Branch::reduce_or(or_branches).map_err(|e| ParseError::ParserError(e.to_string()))
}

/// Combine aggregate-expanded rules with AND for `all of`, OR for `1 of`.
fn combine_aggregate(rules: Vec<Branch>, aggregate: Option<Token>) -> Result<Branch, ParseError> {
    match aggregate {
        Some(Token::StmtAllOf) => {
            Branch::reduce_and(rules).map_err(|e| ParseError::ParserError(e.to_string()))
        }
        Some(Token::StmtOneOf) => {
            Branch::reduce_or(rules).map_err(|e| ParseError::ParserError(e.to_string()))
        }
        _ => Err(ParseError::InvalidWildcardIdent),
    }
}

/// Pull the balanced span enclosed by an already-consumed left parenthesis,
/// excluding the matching closer.
fn extract_group<'a, I>(iter: &mut I) -> Result<Vec<Item>, ParseError>
where
    I: Iterator<Item = &'a Item>,
{
    let mut group = Vec::new();
    let mut balance = 1usize;

    for item in iter {
        match item.token {
            Token::SepLpar => balance += 1,
            Token::SepRpar => {
                balance -= 1;
                if balance == 0 {
                    return Ok(group);
                }
            }
            _ => {}
        }
        group.push(item.clone());
    }

    Err(ParseError::UnmatchedParenthesis)
}
