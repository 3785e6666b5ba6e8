//! Configuration data structures.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::syntax::Syntax;

/// Main configuration structure for snarl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directive syntax of the documents.
    #[serde(default)]
    pub syntax: Syntax,

    /// Glob patterns for documents processed when no input is given.
    #[serde(default = "default_source_patterns")]
    pub source_patterns: Vec<String>,

    /// Directory for tangled files.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Replace existing files when tangling.
    #[serde(default)]
    pub overwrite: bool,

    /// Skip unreadable includes with a warning instead of failing.
    #[serde(default)]
    pub ignore_missing: bool,
}

fn default_source_patterns() -> Vec<String> {
    vec!["**/*.snarl.md".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            syntax: Syntax::default(),
            source_patterns: default_source_patterns(),
            output_dir: None,
            overwrite: false,
            ignore_missing: false,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all source patterns.
    pub fn source_patterns(&self) -> &[String] {
        &self.source_patterns
    }

    /// Returns the output directory, if configured.
    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }
}
