//! Document segments.

use std::path::PathBuf;

use super::code_block::CodeBlock;
use super::options::IncludeOptions;
use super::reference_id::ReferenceId;
use crate::text_location::TextLocation;

/// A unit of a parsed document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Passthrough text, line terminators included.
    Prose(String),
    /// A fenced code block.
    CodeBlock(Box<CodeBlock>),
    /// An include directive.
    Include {
        /// Path as written in the directive.
        path: PathBuf,
        /// Include options.
        options: IncludeOptions,
        /// Location of the directive.
        location: TextLocation,
    },
    /// A comment directive; never woven.
    Comment {
        /// The comment text.
        text: String,
        /// Location of the directive.
        location: TextLocation,
    },
}

impl Segment {
    /// Returns true if this is a code block.
    pub fn is_code_block(&self) -> bool {
        matches!(self, Self::CodeBlock(_))
    }
}

/// A segment after include resolution: includes are spliced in, comments
/// dropped, and code blocks registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSegment {
    /// Passthrough text, already HTML-escaped if an include required it.
    Prose(String),
    /// A registered code block definition.
    Block(ReferenceId),
}
