//! Bulk rule loading with per-rule outcome triage.
//!
//! The loader walks rule directories, compiles every discovered rule, and
//! keeps going past individual failures: unsupported conditions and broken
//! rules are counted separately via [`crate::parser::ParseError::kind`] so a
//! large ruleset degrades instead of aborting.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{Result, SigmaError};
use crate::event::Event;
use crate::result::Results;
use crate::rule::{is_multipart, rule_from_yaml, RuleHandle};
use crate::tree::Tree;

/// Configuration for loading a ruleset from disk.
#[derive(Debug, Clone)]
pub struct RuleSetConfig {
    /// Directories scanned recursively for `.yml` / `.yaml` files
    pub directories: Vec<PathBuf>,
    /// Disable whitespace collapsing in patterns
    pub no_collapse_ws: bool,
    /// Parse string event values as numbers for numeric patterns
    pub try_string_num: bool,
    /// Abort loading on the first rule that fails to compile
    pub fail_on_parse: bool,
}

impl RuleSetConfig {
    /// Create a configuration with default matching behavior.
    pub fn new() -> Self {
        Self {
            directories: Vec::new(),
            no_collapse_ws: false,
            try_string_num: true,
            fail_on_parse: false,
        }
    }

    /// Add a rule directory.
    pub fn add_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Abort loading on the first failing rule.
    pub fn fail_on_parse(mut self, fail: bool) -> Self {
        self.fail_on_parse = fail;
        self
    }
}

impl Default for RuleSetConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A set of compiled rules plus loading statistics.
#[derive(Debug, Default)]
pub struct RuleSet {
    /// Compiled rules
    pub rules: Vec<Tree>,
    /// Rule files discovered
    pub total: usize,
    /// Rules compiled successfully
    pub ok: usize,
    /// Rules rejected as unsupported
    pub unsupported: usize,
    /// Rules that failed to decode or compile
    pub failed: usize,
}

impl RuleSet {
    /// Load and compile every rule under the configured directories.
    pub fn from_config(config: RuleSetConfig) -> Result<RuleSet> {
        let mut ruleset = RuleSet::default();

        for dir in &config.directories {
            if !dir.exists() {
                return Err(SigmaError::InvalidRule(format!(
                    "rule directory not found: {}",
                    dir.display()
                )));
            }
            for path in discover_rule_files(dir) {
                ruleset.load_file(&path, &config)?;
            }
        }

        info!(
            total = ruleset.total,
            ok = ruleset.ok,
            unsupported = ruleset.unsupported,
            failed = ruleset.failed,
            "ruleset loaded"
        );
        Ok(ruleset)
    }

    fn load_file(&mut self, path: &Path, config: &RuleSetConfig) -> Result<()> {
        self.total += 1;
        let data = std::fs::read(path)?;

        if is_multipart(&data) {
            warn!(path = %path.display(), "skipping multipart rule file");
            self.unsupported += 1;
            return Ok(());
        }

        let rule = match rule_from_yaml(&data) {
            Ok(rule) => rule,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "rule decode failed");
                self.failed += 1;
                if config.fail_on_parse {
                    return Err(e);
                }
                return Ok(());
            }
        };

        let handle = RuleHandle::new(rule, path.to_path_buf())
            .with_no_collapse_ws(config.no_collapse_ws)
            .with_try_string_num(config.try_string_num);

        match Tree::from_rule(handle) {
            Ok(tree) => {
                debug!(path = %path.display(), "rule compiled");
                self.ok += 1;
                self.rules.push(tree);
                Ok(())
            }
            Err(e) if e.is_unsupported() => {
                warn!(path = %path.display(), error = %e, "rule unsupported");
                self.unsupported += 1;
                Ok(())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "rule compile failed");
                self.failed += 1;
                if config.fail_on_parse {
                    return Err(e.into());
                }
                Ok(())
            }
        }
    }

    /// Evaluate every rule against an event, collecting positive matches.
    pub fn eval_all(&self, event: &dyn Event) -> Results {
        self.rules
            .iter()
            .filter_map(|tree| tree.eval(event).0)
            .collect()
    }

    /// Number of compiled rules held.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rules compiled.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn discover_rule_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            matches!(
                entry.path().extension().and_then(|s| s.to_str()),
                Some("yml") | Some("yaml")
            )
        })
        .map(|entry| entry.into_path())
        .collect();
    files.sort();
    files
}
