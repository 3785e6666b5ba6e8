//! Source locations for diagnostics.

use std::fmt;
use std::path::{Path, PathBuf};

/// A line within an input document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextLocation {
    /// The document path, or `None` for text read from a string or stdin.
    pub filename: Option<PathBuf>,
    /// Line number (1-indexed).
    pub line: usize,
}

impl TextLocation {
    /// Creates a new TextLocation.
    pub fn new(filename: Option<PathBuf>, line: usize) -> Self {
        Self { filename, line }
    }

    /// Creates a TextLocation with only line information.
    pub fn line_only(line: usize) -> Self {
        Self {
            filename: None,
            line,
        }
    }

    /// Creates a TextLocation in an optional document.
    pub fn in_document(filename: Option<&Path>, line: usize) -> Self {
        Self {
            filename: filename.map(Path::to_path_buf),
            line,
        }
    }

    /// Returns the location `offset` lines further down the same document.
    pub fn offset(&self, offset: usize) -> Self {
        Self {
            filename: self.filename.clone(),
            line: self.line + offset,
        }
    }
}

impl Default for TextLocation {
    fn default() -> Self {
        Self {
            filename: None,
            line: 1,
        }
    }
}

impl fmt::Display for TextLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.filename {
            Some(path) => write!(f, "{}:{}", path.display(), self.line),
            None => write!(f, "<input>:{}", self.line),
        }
    }
}
