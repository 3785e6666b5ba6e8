//! Error types for snarl.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ReferenceName;
use crate::text_location::TextLocation;

/// Main error type for snarl operations.
#[derive(Error, Debug)]
pub enum SnarlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("Parse error at {location}: {message}")]
    Parse {
        location: TextLocation,
        message: String,
    },

    #[error("Duplicate definition of block '{name}' at {location} (first defined at {previous})")]
    DuplicateDefinition {
        name: ReferenceName,
        location: TextLocation,
        previous: TextLocation,
    },

    #[error("Cannot append to undefined block '{name}' at {location}")]
    UndefinedAppend {
        name: ReferenceName,
        location: TextLocation,
    },

    #[error("Output file {} is produced by both '{first}' and '{second}'", .path.display())]
    DuplicateTarget {
        path: PathBuf,
        first: ReferenceName,
        second: ReferenceName,
    },

    #[error("Undefined reference <<{name}>> in block '{referrer}' at {location}")]
    UndefinedReference {
        name: ReferenceName,
        referrer: ReferenceName,
        location: TextLocation,
    },

    #[error("Cycle detected in references: {}", format_cycle(.0))]
    CyclicReference(Vec<ReferenceName>),

    #[error("Cyclic include: {}", format_paths(.0))]
    CyclicInclude(Vec<PathBuf>),

    #[error("Cannot read included file {} at {location}: {source}", .path.display())]
    IncludeNotFound {
        path: PathBuf,
        location: TextLocation,
        #[source]
        source: std::io::Error,
    },

    #[error("No such block named '{0}'")]
    BlockNotFound(ReferenceName),

    #[error("Failed to write {}: {source}", .path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source}\n  included from {}", format_chain(.chain))]
    Included {
        /// Include directive locations, innermost first.
        chain: Vec<TextLocation>,
        source: Box<SnarlError>,
    },
}

impl SnarlError {
    /// Creates a parse error at the given location.
    pub fn parse(location: TextLocation, message: impl Into<String>) -> Self {
        Self::Parse {
            location,
            message: message.into(),
        }
    }

    /// Records that this error surfaced through the include directive at `location`.
    ///
    /// Repeated calls extend a single chain rather than nesting wrappers.
    pub fn included_from(self, location: TextLocation) -> Self {
        match self {
            Self::Included { mut chain, source } => {
                chain.push(location);
                Self::Included { chain, source }
            }
            other => Self::Included {
                chain: vec![location],
                source: Box::new(other),
            },
        }
    }

    /// Returns the underlying error, looking through include wrappers.
    pub fn root(&self) -> &SnarlError {
        match self {
            Self::Included { source, .. } => source.root(),
            other => other,
        }
    }
}

fn format_cycle(names: &[ReferenceName]) -> String {
    names
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn format_chain(chain: &[TextLocation]) -> String {
    chain
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join("\n  included from ")
}

/// Result type alias for snarl operations.
pub type Result<T> = std::result::Result<T, SnarlError>;
