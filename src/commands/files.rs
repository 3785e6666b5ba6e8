//! Files command: list what tangling would produce.

use std::io::Write;
use std::path::PathBuf;

use serde::Serialize;

use crate::errors::Result;
use crate::interface::{Context, TagFilter};

use super::helpers::load_inputs;

/// Options for the files command.
#[derive(Debug, Clone, Default)]
pub struct FilesOptions {
    /// Documents to inspect; the configured source patterns when empty, or
    /// standard input when `-`.
    pub inputs: Vec<PathBuf>,
    /// Only list file blocks carrying one of these tags.
    pub tags: Vec<String>,
    /// List every labeled block, not only file blocks.
    pub all: bool,
    /// Print JSON instead of one entry per line.
    pub json: bool,
}

/// One listed block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileEntry {
    /// Block name.
    pub name: String,
    /// Output path, for file blocks.
    pub path: Option<PathBuf>,
    /// Language of the base definition.
    pub language: Option<String>,
    /// Tags of the block.
    pub tags: Vec<String>,
}

/// Executes the files command.
pub fn files(ctx: &Context, options: FilesOptions, out: &mut impl Write) -> Result<()> {
    let doc = load_inputs(ctx, &options.inputs)?;
    let filter = TagFilter::new(options.tags.iter().cloned());

    let entries: Vec<FileEntry> = doc
        .refs
        .iter_blocks()
        .filter(|block| !block.is_anonymous())
        .filter(|block| options.all || block.options().file)
        .filter(|block| filter.matches(block.options()))
        .map(|block| FileEntry {
            name: block.name.to_string(),
            path: block.target().map(|t| ctx.output_path(&t)),
            language: block.language().map(str::to_string),
            tags: block.options().tags.iter().cloned().collect(),
        })
        .collect();

    if options.json {
        serde_json::to_writer_pretty(&mut *out, &entries)?;
        writeln!(out)?;
        return Ok(());
    }

    for entry in &entries {
        match &entry.path {
            Some(path) => writeln!(out, "{}", path.display())?,
            None => writeln!(out, "{}", entry.name)?,
        }
    }
    Ok(())
}
