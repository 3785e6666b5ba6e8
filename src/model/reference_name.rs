//! Block names.

use std::fmt;

use serde::Serialize;

/// Prefix of the names generated for unlabeled code blocks.
const ANONYMOUS_PREFIX: &str = "__autoblock";

/// The name of a code block, as written after `=` in a block header and
/// inside `<<...>>` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReferenceName(String);

impl ReferenceName {
    /// Creates a new ReferenceName from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Generated name for the `index`-th unlabeled block of a run.
    pub fn numbered_anonymous(index: usize) -> Self {
        Self(format!("{}{}", ANONYMOUS_PREFIX, index))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ReferenceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ReferenceName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ReferenceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
