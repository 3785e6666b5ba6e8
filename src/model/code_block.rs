//! Code block representation.

use super::options::{BlockOptions, IncludeOptions};
use super::reference_id::ReferenceId;
use super::reference_name::ReferenceName;
use crate::text_location::TextLocation;

/// One line of a code block body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// A literal line, without its line terminator.
    Text(String),
    /// A `<<name>>` placeholder occupying a whole line.
    Reference {
        /// Whitespace preceding the placeholder.
        indent: String,
        /// The referenced block.
        name: ReferenceName,
        /// Where the placeholder appears.
        location: TextLocation,
    },
}

impl Fragment {
    /// Renders the fragment as it was written in the document.
    pub fn render(&self) -> String {
        match self {
            Fragment::Text(text) => text.clone(),
            Fragment::Reference { indent, name, .. } => format!("{}<<{}>>", indent, name),
        }
    }
}

/// The fence that delimited a block in its document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fence {
    /// Indentation of the fence lines.
    pub indent: String,
    /// The opening delimiter, e.g. "```" or "~~~~".
    pub delimiter: String,
}

impl Default for Fence {
    fn default() -> Self {
        Self {
            indent: String::new(),
            delimiter: "```".to_string(),
        }
    }
}

/// A single fenced definition of a block: either its base definition or an
/// append (`+=`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Name and piece number, assigned on registration.
    pub id: ReferenceId,

    /// The language identifier (e.g., "c", "python").
    ///
    /// For unlabeled blocks this is the full original info string.
    pub language: Option<String>,

    /// Header options. Always empty for appends.
    pub options: BlockOptions,

    /// True if this definition was written with `+=`.
    pub append: bool,

    /// True if the header carried no label; the registry assigns a name.
    pub anonymous: bool,

    /// The body, line by line.
    pub fragments: Vec<Fragment>,

    /// Location of the opening fence.
    pub location: TextLocation,

    /// The fence as written, reused when weaving.
    pub fence: Fence,

    /// Options inherited from the include directives this block came through.
    pub inherited: IncludeOptions,
}

impl CodeBlock {
    /// Creates a new base definition.
    pub fn new(
        name: ReferenceName,
        language: Option<String>,
        fragments: Vec<Fragment>,
        location: TextLocation,
    ) -> Self {
        Self {
            id: ReferenceId::first(name),
            language,
            options: BlockOptions::default(),
            append: false,
            anonymous: false,
            fragments,
            location,
            fence: Fence::default(),
            inherited: IncludeOptions::default(),
        }
    }

    /// Creates a definition without a label.
    pub fn unlabeled(language: Option<String>, fragments: Vec<Fragment>, location: TextLocation) -> Self {
        Self {
            anonymous: true,
            ..Self::new(ReferenceName::new(""), language, fragments, location)
        }
    }

    /// Returns the block name.
    pub fn name(&self) -> &ReferenceName {
        &self.id.name
    }

    /// Returns the body with placeholders rendered literally.
    pub fn source(&self) -> String {
        self.fragments
            .iter()
            .map(Fragment::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Returns the names referenced from this block, in order.
    pub fn references(&self) -> impl Iterator<Item = &ReferenceName> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Reference { name, .. } => Some(name),
            Fragment::Text(_) => None,
        })
    }

    /// Sets the header options.
    pub fn with_options(mut self, options: BlockOptions) -> Self {
        self.options = options;
        self
    }

    /// Marks the block as an append.
    pub fn as_append(mut self) -> Self {
        self.append = true;
        self
    }
}
