//! Sigma detection-rule compiler and event matching engine.
//!
//! This library compiles the `detection` block of a Sigma rule (a boolean
//! `condition` expression over named identifiers plus per-identifier field
//! matching specifications) into an immutable [`tree::Tree`] and evaluates
//! structured events against it.
//!
//! # Example
//!
//! ```
//! use sigma_tree::event::DynamicEvent;
//! use sigma_tree::rule::{rule_from_yaml, RuleHandle};
//! use sigma_tree::tree::Tree;
//! use serde_json::json;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rule = rule_from_yaml(
//!     br#"
//! title: Suspicious Bitsadmin Usage
//! id: 671bb7e3-a020-4824-a00e-2ee5b55f385e
//! detection:
//!   selection:
//!     Image|endswith: '\bitsadmin.exe'
//!   condition: selection
//! "#,
//! )?;
//!
//! let tree = Tree::from_rule(RuleHandle::new(rule, PathBuf::from("bitsadmin.yml")))?;
//!
//! let event = DynamicEvent::new(json!({
//!     "Image": "C:\\Windows\\System32\\bitsadmin.exe",
//! }));
//!
//! let (matched, applicable) = tree.match_event(&event);
//! assert!(matched && applicable);
//! # Ok(())
//! # }
//! ```
//!
//! Compiled trees are immutable and safe to evaluate from many threads at
//! once; compilation itself is single-threaded per rule and shares no state
//! between rules.

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

pub use ast::{Branch, MatchResult};
pub use error::SigmaError;
pub use event::{DynamicEvent, Event, Keyworder, Selector, Value};
pub use pattern::MatchConfig;
pub use ruleset::{RuleSet, RuleSetConfig};

/// AST nodes and tri-state matching
pub mod ast;

/// Error types
pub mod error;

/// Event abstractions
pub mod event;

/// Condition-expression lexer
pub mod lexer;

/// Token validation and AST construction
pub mod parser;

/// Pattern matching primitives
pub mod pattern;

/// Match result reporting
pub mod result;

/// Rule definitions and YAML decoding
pub mod rule;

/// Bulk rule loading
pub mod ruleset;

/// Compiled rule trees
pub mod tree;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber with settings read from the environment.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
