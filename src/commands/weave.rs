//! Weave command implementation.

use std::io::{Read, Write};
use std::path::PathBuf;

use crate::errors::Result;
use crate::interface::{weave as weave_document, Context, Document};
use crate::io::Transaction;

use super::helpers::is_stdin;

/// Options for the weave command.
#[derive(Debug, Clone, Default)]
pub struct WeaveOptions {
    /// Document to weave; standard input when absent or `-`.
    pub input: Option<PathBuf>,
    /// File to write; `out` when absent.
    pub output: Option<PathBuf>,
}

/// Executes the weave command.
pub fn weave(ctx: &Context, options: WeaveOptions, out: &mut impl Write) -> Result<()> {
    let doc = match &options.input {
        Some(path) if !is_stdin(path) => Document::load(path, ctx)?,
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Document::parse(&text, None, ctx)?
        }
    };

    let woven = weave_document(&doc);

    match options.output {
        Some(path) => {
            let mut tx = Transaction::new();
            tx.write(ctx.resolve_path(&path), woven);
            tx.execute()?;
        }
        None => out.write_all(woven.as_bytes())?,
    }

    Ok(())
}
