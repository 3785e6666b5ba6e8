//! Identifiers of individual block definitions.

use std::fmt;

use super::ReferenceName;

/// Identifies one definition of a block.
///
/// A block defined once and appended to twice has three pieces, with counts
/// 0, 1 and 2. Count 0 is the base definition that owns the block options.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceId {
    /// The block name.
    pub name: ReferenceName,
    /// Position among the pieces of this name (0-indexed).
    pub count: usize,
}

impl ReferenceId {
    /// Creates a new ReferenceId.
    pub fn new(name: ReferenceName, count: usize) -> Self {
        Self { name, count }
    }

    /// Creates the id of a base definition.
    pub fn first(name: ReferenceName) -> Self {
        Self { name, count: 0 }
    }

    /// Returns true if this is the base definition rather than an append.
    pub fn is_base(&self) -> bool {
        self.count == 0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.count)
    }
}
