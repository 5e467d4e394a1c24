//! Parse errors and their triage taxonomy.

use crate::lexer::{Item, Token};
use thiserror::Error;

/// Triage class of a parse error.
///
/// Batch loaders use this to continue past individual failures: unsupported
/// constructs are counted separately from structurally broken rules without
/// inspecting error text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// The rule is malformed: required pieces are missing or limits were hit
    Structural,
    /// The condition uses syntax this engine recognizes but does not support
    Unsupported,
    /// An identifier definition could not be compiled into matchers
    Pattern,
}

/// Errors produced while compiling a condition into a tree
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// Aggregation tail after a pipe
    #[error("unsupported expression: {msg}")]
    UnsupportedExpression {
        /// The rejected fragment
        msg: String,
    },

    /// A token the builder has no handling for
    #[error("unsupported token {token:?} ({value})")]
    UnsupportedToken {
        /// The offending token
        token: Token,
        /// Its raw form
        value: String,
    },

    /// Two tokens that may not be adjacent
    #[error("invalid token sequence: {prev:?} -> {next:?} (after {collected} tokens)")]
    InvalidTokenSequence {
        /// Token preceding the invalid pair
        prev: Item,
        /// Token completing the invalid pair
        next: Item,
        /// Number of tokens collected before the failure
        collected: usize,
    },

    /// Token stream did not terminate with end-of-input
    #[error("incomplete token sequence for '{expression}', last token {last:?}")]
    IncompleteTokenSequence {
        /// The condition being parsed
        expression: String,
        /// The final token received
        last: Item,
    },

    /// Detection has no condition expression
    #[error("missing condition in detection")]
    MissingCondition,

    /// Condition references an identifier absent from the detection map
    #[error("missing condition item: {key}")]
    MissingConditionItem {
        /// The unresolved identifier
        key: String,
    },

    /// Unbalanced parentheses
    #[error("unbalanced parenthesis in condition")]
    UnmatchedParenthesis,

    /// `them` or a wildcard identifier without `all of` / `1 of`
    #[error("wildcard identifier used without 'all of' or '1 of' prefix")]
    InvalidWildcardIdent,

    /// Wildcard expanded to zero identifiers
    #[error("no identifiers match wildcard '{pattern}'")]
    NoMatchingWildcard {
        /// The wildcard pattern
        pattern: String,
    },

    /// Keyword identifier with an unusable definition shape
    #[error("invalid keyword definition for '{ident}': got {shape}")]
    InvalidKeywordConstruct {
        /// The identifier
        ident: String,
        /// Observed definition shape
        shape: String,
    },

    /// Selection identifier with an unusable definition shape
    #[error("invalid selection definition for '{ident}': got {shape}")]
    InvalidSelectionConstruct {
        /// The identifier
        ident: String,
        /// Observed definition shape
        shape: String,
    },

    /// Field modifier this engine does not implement
    #[error("unknown field modifier '{modifier}' on '{field}'")]
    UnknownModifier {
        /// The field carrying the modifier
        field: String,
        /// The unknown modifier
        modifier: String,
    },

    /// Matcher construction failed for an identifier
    #[error("failed to build pattern for '{ident}': {msg}")]
    PatternCompilation {
        /// The identifier
        ident: String,
        /// Underlying failure
        msg: String,
    },

    /// Too many tokens in one condition
    #[error("token limit exceeded: {count} tokens, limit {limit}")]
    TokenLimitExceeded {
        /// Tokens collected
        count: usize,
        /// Configured limit
        limit: usize,
    },

    /// Parenthesis nesting too deep
    #[error("recursion depth exceeded: {depth} levels, limit {limit}")]
    RecursionLimitExceeded {
        /// Observed depth
        depth: usize,
        /// Configured limit
        limit: usize,
    },

    /// Internal builder invariant violated
    #[error("parser error: {0}")]
    ParserError(String),
}

impl ParseError {
    /// Triage class for batch compilation.
    pub fn kind(&self) -> ParseErrorKind {
        match self {
            ParseError::UnsupportedExpression { .. }
            | ParseError::UnsupportedToken { .. }
            | ParseError::InvalidTokenSequence { .. }
            | ParseError::IncompleteTokenSequence { .. }
            | ParseError::UnmatchedParenthesis
            | ParseError::InvalidWildcardIdent
            | ParseError::UnknownModifier { .. } => ParseErrorKind::Unsupported,

            ParseError::MissingCondition
            | ParseError::MissingConditionItem { .. }
            | ParseError::TokenLimitExceeded { .. }
            | ParseError::RecursionLimitExceeded { .. }
            | ParseError::ParserError(_) => ParseErrorKind::Structural,

            ParseError::NoMatchingWildcard { .. }
            | ParseError::InvalidKeywordConstruct { .. }
            | ParseError::InvalidSelectionConstruct { .. }
            | ParseError::PatternCompilation { .. } => ParseErrorKind::Pattern,
        }
    }

    /// Whether a batch loader should count this rule as unsupported rather
    /// than broken.
    pub fn is_unsupported(&self) -> bool {
        self.kind() == ParseErrorKind::Unsupported
    }
}
