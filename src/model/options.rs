//! Options attached to code blocks and include directives.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::path::PathBuf;

use regex::Regex;

/// A `--replace PATTERN SUBSTITUTION` rule.
///
/// Patterns use `regex` syntax. Substitutions are literal text except for
/// backreferences `\1` and `\g<name>`, and `\\` for a backslash; `$` has no
/// special meaning.
#[derive(Debug, Clone)]
pub struct Replacement {
    pattern: Regex,
    substitution: String,
    template: String,
}

impl Replacement {
    /// Compiles a replacement rule.
    pub fn new(pattern: &str, substitution: impl Into<String>) -> Result<Self, regex::Error> {
        let substitution = substitution.into();
        Ok(Self {
            pattern: Regex::new(pattern)?,
            template: to_template(&substitution),
            substitution,
        })
    }

    /// Returns the source of the pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the substitution text.
    pub fn substitution(&self) -> &str {
        &self.substitution
    }

    /// Replaces every match of the pattern in `text`.
    pub fn apply<'t>(&self, text: &'t str) -> Cow<'t, str> {
        self.pattern.replace_all(text, self.template.as_str())
    }
}

/// Rewrites a substitution as a `regex` replacement template.
fn to_template(substitution: &str) -> String {
    let mut template = String::with_capacity(substitution.len());
    let mut rest = substitution;

    while let Some(c) = rest.chars().next() {
        rest = &rest[c.len_utf8()..];
        match c {
            '$' => template.push_str("$$"),
            '\\' => {
                let digits = rest.len() - rest.trim_start_matches(|d: char| d.is_ascii_digit()).len();
                if digits > 0 {
                    template.push_str(&format!("${{{}}}", &rest[..digits]));
                    rest = &rest[digits..];
                } else if let Some((name, tail)) =
                    rest.strip_prefix("g<").and_then(|r| r.split_once('>'))
                {
                    template.push_str(&format!("${{{}}}", name));
                    rest = tail;
                } else if let Some(tail) = rest.strip_prefix('\\') {
                    template.push('\\');
                    rest = tail;
                } else {
                    template.push('\\');
                }
            }
            _ => template.push(c),
        }
    }
    template
}

impl PartialEq for Replacement {
    fn eq(&self, other: &Self) -> bool {
        self.pattern.as_str() == other.pattern.as_str() && self.substitution == other.substitution
    }
}

impl Eq for Replacement {}

/// Options from a block header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockOptions {
    /// Omit the block from weave output.
    pub hide: bool,
    /// The block is a tangle target.
    pub file: bool,
    /// Explicit output path (`--file=PATH`); the block name is used otherwise.
    pub destination: Option<PathBuf>,
    /// Emit `<<name>>` placeholders literally instead of expanding them.
    pub verbatim: bool,
    /// HTML-escape the block when weaving.
    pub escape_html: bool,
    /// Substitutions applied to the expanded text, in order.
    pub replace: Vec<Replacement>,
    /// Tags used to select files at tangle time.
    pub tags: BTreeSet<String>,
}

impl BlockOptions {
    /// Returns true if no option is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the replacement rules in declaration order.
    pub fn apply_replacements(&self, text: String) -> String {
        self.replace.iter().fold(text, |acc, rule| {
            tracing::debug!("replacing /{}/ with '{}'", rule.pattern(), rule.substitution());
            rule.apply(&acc).into_owned()
        })
    }

    /// Returns true if any of the block tags is in `tags`.
    pub fn has_any_tag<'a>(&self, mut tags: impl Iterator<Item = &'a String>) -> bool {
        tags.any(|t| self.tags.contains(t))
    }
}

/// Options from an include directive.
///
/// These apply to everything the included document contributes, and
/// accumulate through nested includes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IncludeOptions {
    /// HTML-escape all included content when weaving.
    pub escape_html: bool,
    /// Do not expand placeholders in included blocks.
    pub verbatim: bool,
}

impl IncludeOptions {
    /// Combines the options of an enclosing include with a nested one.
    pub fn merge(self, nested: IncludeOptions) -> Self {
        Self {
            escape_html: self.escape_html || nested.escape_html,
            verbatim: self.verbatim || nested.verbatim,
        }
    }
}
