//! Directive syntax selection.
//!
//! Two conventions exist for marking up blocks and directives:
//! - `fenced` (canonical): ```` ```c=hello.c --file ````, `<!-- include a.md -->`
//! - `colon` (compatibility): ```` ```c:hello.c --file ````, `:include a.md`, `:# comment`
//!
//! A document uses exactly one of them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Directive syntax of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Syntax {
    /// Block labels follow `=` / `+=` in the fence header; HTML-comment directives.
    #[default]
    Fenced,
    /// Block labels follow `:` / `+:`; directives are lines starting with `:`.
    Colon,
}

impl Syntax {
    /// Returns the syntax name as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Syntax::Fenced => "fenced",
            Syntax::Colon => "colon",
        }
    }

    /// The other syntax.
    pub fn other(&self) -> Syntax {
        match self {
            Syntax::Fenced => Syntax::Colon,
            Syntax::Colon => Syntax::Fenced,
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
