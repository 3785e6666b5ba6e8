//! Tangling: producing source files from a document.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use serde::Serialize;

use crate::errors::{Result, SnarlError};
use crate::io::{FileData, Transaction};
use crate::model::{tangle_ref, BlockOptions, ReferenceMap, ReferenceName};

use super::context::Context;

/// Selects file blocks by tag. An empty filter selects everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    tags: BTreeSet<String>,
}

impl TagFilter {
    /// Creates a filter accepting blocks carrying any of `tags`.
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// A filter that accepts every block.
    pub fn all() -> Self {
        Self::default()
    }

    /// Returns true if the filter accepts every block.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Returns true if a block with these options is selected.
    pub fn matches(&self, options: &BlockOptions) -> bool {
        self.is_empty() || options.has_any_tag(self.tags.iter())
    }
}

/// The resolved content of one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TangledFile {
    /// The block that produces the file.
    pub name: ReferenceName,
    /// Output path, relative to the output directory.
    pub path: PathBuf,
    /// File content.
    pub content: String,
}

/// Resolves every file block accepted by `filter`.
///
/// All files are resolved before any is returned, so a reference error in
/// one of them prevents writing all of them.
pub fn tangle_targets(refs: &ReferenceMap, filter: &TagFilter) -> Result<Vec<TangledFile>> {
    let mut files = Vec::new();
    for (path, name) in refs.targets() {
        let Some(block) = refs.lookup(name) else {
            continue;
        };
        if !filter.matches(block.options()) {
            tracing::debug!("{} filtered out by tag", path.display());
            continue;
        }
        files.push(TangledFile {
            name: name.clone(),
            path: path.clone(),
            content: tangle_ref(refs, name)?,
        });
    }
    Ok(files)
}

/// Resolves the named blocks, each to a file named after its target or,
/// for blocks that are not file blocks, after the block itself.
///
/// Two different blocks may not resolve to the same path. Naming a block
/// twice tangles it once.
pub fn tangle_blocks(refs: &ReferenceMap, names: &[ReferenceName]) -> Result<Vec<TangledFile>> {
    let mut claimed: HashMap<PathBuf, &ReferenceName> = HashMap::new();
    let mut files = Vec::with_capacity(names.len());

    for name in names {
        let block = refs
            .lookup(name)
            .ok_or_else(|| SnarlError::BlockNotFound(name.clone()))?;
        let path = block
            .target()
            .unwrap_or_else(|| PathBuf::from(name.as_str()));

        match claimed.get(&path) {
            Some(first) if *first == name => continue,
            Some(first) => {
                return Err(SnarlError::DuplicateTarget {
                    path,
                    first: (*first).clone(),
                    second: name.clone(),
                });
            }
            None => {
                claimed.insert(path.clone(), name);
            }
        }

        files.push(TangledFile {
            name: name.clone(),
            path,
            content: tangle_ref(refs, name)?,
        });
    }
    Ok(files)
}

/// Resolves every labeled block accepted by `filter`.
pub fn tangle_all(refs: &ReferenceMap, filter: &TagFilter) -> Result<Vec<TangledFile>> {
    let names: Vec<ReferenceName> = refs
        .iter_blocks()
        .filter(|block| !block.is_anonymous())
        .filter(|block| filter.matches(block.options()))
        .map(|block| block.name.clone())
        .collect();
    tangle_blocks(refs, &names)
}

/// Plans the writes for `files` under the configured output directory.
///
/// Files whose content is unchanged are skipped. Existing files are only
/// replaced when `overwrite` is set; otherwise they are skipped with a
/// warning.
pub fn plan_writes(files: &[TangledFile], ctx: &Context, overwrite: bool) -> Result<Transaction> {
    let mut tx = Transaction::new();

    for file in files {
        let output = ctx.output_path(&file.path);
        let target = ctx.resolve_path(&output);

        if !ctx.file_cache.exists(&output) {
            tx.create(target, file.content.clone());
            continue;
        }

        let current = ctx.file_cache.file_data(&output)?;
        if current == FileData::from_content(&file.content) {
            tracing::debug!("{} is unchanged", output.display());
        } else if overwrite {
            tx.write(target, file.content.clone());
        } else {
            tracing::warn!(
                "{} already exists, skipping (use --overwrite to replace it)",
                output.display()
            );
        }
    }

    Ok(tx)
}
