//! Error types shared across the crate.

use thiserror::Error;

/// Convenience alias for operations returning [`SigmaError`].
pub type Result<T> = std::result::Result<T, SigmaError>;

/// Top-level error type for rule decoding and matcher construction.
#[derive(Debug, Error)]
pub enum SigmaError {
    /// YAML decoding failed
    #[error("yaml decode error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Filesystem access failed
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Rule header failed validation
    #[error("invalid rule: {0}")]
    InvalidRule(String),

    /// Rule has no detection section
    #[error("missing detection section")]
    MissingDetection,

    /// Detection has no condition expression
    #[error("missing condition in detection")]
    MissingCondition,

    /// Condition parsing failed
    #[error(transparent)]
    Parse(#[from] crate::parser::ParseError),

    /// Matcher collection construction failed
    #[error("invalid matcher: {0}")]
    InvalidMatcher(String),

    /// Glob pattern compilation failed
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        /// Pattern that failed to compile
        pattern: String,
        /// Underlying globset error
        source: globset::Error,
    },

    /// Regex compilation failed
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        /// Pattern that failed to compile
        pattern: String,
        /// Underlying regex error
        source: regex::Error,
    },
}
