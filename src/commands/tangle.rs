//! Tangle command implementation.

use std::io::Write;
use std::path::PathBuf;

use crate::errors::{Result, SnarlError};
use crate::interface::{plan_writes, tangle_all, tangle_blocks, tangle_targets, Context, TagFilter};
use crate::model::ReferenceName;

use super::helpers::load_inputs;

/// Options for the tangle command.
#[derive(Debug, Clone, Default)]
pub struct TangleOptions {
    /// Documents to tangle; the configured source patterns when empty, or
    /// standard input when `-`.
    pub inputs: Vec<PathBuf>,
    /// Only tangle blocks carrying one of these tags. Cannot be combined
    /// with `blocks`.
    pub tags: Vec<String>,
    /// Tangle these blocks instead of the file blocks.
    pub blocks: Vec<String>,
    /// Tangle every labeled block.
    pub all: bool,
    /// Print the resolved content instead of writing files.
    pub stdout: bool,
    /// Replace existing files whose content differs.
    pub overwrite: bool,
    /// Dry run - show what would be done without doing it.
    pub dry_run: bool,
}

/// Executes the tangle command.
pub fn tangle(ctx: &Context, options: TangleOptions, out: &mut impl Write) -> Result<()> {
    if !options.blocks.is_empty() && !options.tags.is_empty() {
        return Err(SnarlError::Config(
            "--tag cannot be combined with --block".to_string(),
        ));
    }

    let doc = load_inputs(ctx, &options.inputs)?;
    let filter = TagFilter::new(options.tags.iter().cloned());

    let files = if options.all {
        tangle_all(&doc.refs, &filter)?
    } else if !options.blocks.is_empty() {
        let names: Vec<ReferenceName> = options.blocks.iter().map(ReferenceName::new).collect();
        tangle_blocks(&doc.refs, &names)?
    } else {
        tangle_targets(&doc.refs, &filter)?
    };

    if options.stdout {
        for file in &files {
            out.write_all(file.content.as_bytes())?;
        }
        return Ok(());
    }

    let overwrite = options.overwrite || ctx.config.overwrite;
    let transaction = plan_writes(&files, ctx, overwrite)?;

    if transaction.is_empty() {
        writeln!(out, "No files to tangle.")?;
        return Ok(());
    }

    if options.dry_run {
        writeln!(out, "Would perform {} actions:", transaction.len())?;
        for desc in transaction.describe() {
            writeln!(out, "  {}", desc)?;
        }
        return Ok(());
    }

    transaction.execute()?;
    writeln!(out, "Tangled {} files.", transaction.len())?;

    Ok(())
}
