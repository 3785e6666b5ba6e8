//! The block registry.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;

use super::code_block::CodeBlock;
use super::options::BlockOptions;
use super::reference_id::ReferenceId;
use super::reference_name::ReferenceName;
use crate::errors::{SnarlError, Result};
use crate::text_location::TextLocation;

/// A registry of named code blocks.
///
/// - Primary index: `IndexMap<ReferenceId, Arc<CodeBlock>>` (definition order)
/// - Name index: `IndexMap<ReferenceName, Vec<ReferenceId>>` (pieces per name,
///   names in order of first definition)
/// - Targets: `IndexMap<PathBuf, ReferenceName>` (tangle output files)
#[derive(Debug, Clone, Default)]
pub struct ReferenceMap {
    blocks: IndexMap<ReferenceId, Arc<CodeBlock>>,
    name_index: IndexMap<ReferenceName, Vec<ReferenceId>>,
    targets: IndexMap<PathBuf, ReferenceName>,
    anonymous: usize,
}

/// All pieces of one block name, in declaration order.
#[derive(Debug, Clone)]
pub struct Block<'a> {
    /// The block name.
    pub name: &'a ReferenceName,
    /// The base definition followed by its appends.
    pub pieces: Vec<&'a CodeBlock>,
}

impl<'a> Block<'a> {
    /// The base definition.
    pub fn base(&self) -> &'a CodeBlock {
        self.pieces[0]
    }

    /// Options of the base definition.
    pub fn options(&self) -> &'a BlockOptions {
        &self.base().options
    }

    /// Language of the base definition.
    pub fn language(&self) -> Option<&'a str> {
        self.base().language.as_deref()
    }

    /// True if the block was written without a label.
    pub fn is_anonymous(&self) -> bool {
        self.base().anonymous
    }

    /// Location of the base definition.
    pub fn location(&self) -> &'a TextLocation {
        &self.base().location
    }

    /// Output path if this block is a tangle target.
    pub fn target(&self) -> Option<PathBuf> {
        let options = self.options();
        if !options.file {
            return None;
        }
        Some(
            options
                .destination
                .clone()
                .unwrap_or_else(|| PathBuf::from(self.name.as_str())),
        )
    }
}

impl ReferenceMap {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition, assigning its id.
    ///
    /// A base definition must introduce a new name; an append must extend an
    /// existing one. Unlabeled blocks receive a generated name that is not
    /// yet in use.
    pub fn define(&mut self, mut block: CodeBlock) -> Result<ReferenceId> {
        if block.anonymous {
            let name = loop {
                let candidate = ReferenceName::numbered_anonymous(self.anonymous);
                self.anonymous += 1;
                if !self.name_index.contains_key(&candidate) {
                    break candidate;
                }
            };
            block.id = ReferenceId::first(name);
        }
        let name = block.name().clone();

        let count = match self.name_index.get(&name) {
            Some(ids) if block.append => ids.len(),
            Some(ids) => {
                let previous = self
                    .blocks
                    .get(&ids[0])
                    .map(|b| b.location.clone())
                    .unwrap_or_default();
                return Err(SnarlError::DuplicateDefinition {
                    name,
                    location: block.location.clone(),
                    previous,
                });
            }
            None if block.append => {
                return Err(SnarlError::UndefinedAppend {
                    name,
                    location: block.location.clone(),
                });
            }
            None => 0,
        };

        if count == 0 && block.options.file {
            let target = block
                .options
                .destination
                .clone()
                .unwrap_or_else(|| PathBuf::from(name.as_str()));
            if let Some(first) = self.targets.get(&target) {
                return Err(SnarlError::DuplicateTarget {
                    path: target,
                    first: first.clone(),
                    second: name,
                });
            }
            self.targets.insert(target, name.clone());
        }

        if count == 0 {
            tracing::debug!("create block {}", name);
        } else {
            tracing::debug!("appending to block {}", name);
        }

        let id = ReferenceId::new(name.clone(), count);
        block.id = id.clone();
        self.name_index.entry(name).or_default().push(id.clone());
        self.blocks.insert(id.clone(), Arc::new(block));

        Ok(id)
    }

    /// Gets a single definition by its id.
    pub fn get(&self, id: &ReferenceId) -> Option<&CodeBlock> {
        self.blocks.get(id).map(|arc| arc.as_ref())
    }

    /// Looks up a block by name, merging all of its pieces.
    pub fn lookup(&self, name: &ReferenceName) -> Option<Block<'_>> {
        let (name, ids) = self.name_index.get_key_value(name)?;
        let pieces: Vec<&CodeBlock> = ids
            .iter()
            .filter_map(|id| self.blocks.get(id))
            .map(|arc| arc.as_ref())
            .collect();
        if pieces.is_empty() {
            return None;
        }
        Some(Block { name, pieces })
    }

    /// Options that apply to a definition: those of its base definition.
    pub fn options_for(&self, id: &ReferenceId) -> Option<&BlockOptions> {
        let base = ReferenceId::first(id.name.clone());
        self.get(&base).map(|b| &b.options)
    }

    /// Checks if a name is defined.
    pub fn contains_name(&self, name: &ReferenceName) -> bool {
        self.name_index.contains_key(name)
    }

    /// Returns all names, in order of first definition.
    pub fn names(&self) -> impl Iterator<Item = &ReferenceName> {
        self.name_index.keys()
    }

    /// Returns all merged blocks, in order of first definition.
    pub fn iter_blocks(&self) -> impl Iterator<Item = Block<'_>> {
        self.name_index.keys().filter_map(|name| self.lookup(name))
    }

    /// Returns all tangle targets with the block that produces them.
    pub fn targets(&self) -> impl Iterator<Item = (&PathBuf, &ReferenceName)> {
        self.targets.iter()
    }

    /// Returns the number of definitions (bases and appends).
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns true if nothing has been defined.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
