//! Shared command helpers.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::errors::{Result, SnarlError};
use crate::interface::{Context, Document};

/// The input name that stands for standard input.
pub const STDIN: &str = "-";

/// Returns true if `path` names standard input.
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == STDIN
}

/// Loads the given documents, or every document matching the configured
/// source patterns when none are given. A single `-` reads standard input.
pub fn load_inputs(ctx: &Context, inputs: &[PathBuf]) -> Result<Document> {
    load_inputs_from(ctx, inputs, std::io::stdin().lock())
}

/// Like [`load_inputs`], reading `-` from `stdin`.
pub fn load_inputs_from(ctx: &Context, inputs: &[PathBuf], mut stdin: impl Read) -> Result<Document> {
    if inputs.iter().any(|p| is_stdin(p)) {
        if inputs.len() > 1 {
            return Err(SnarlError::Config(
                "standard input ('-') cannot be combined with other documents".to_string(),
            ));
        }
        tracing::debug!("reading document from standard input");
        let mut text = String::new();
        stdin.read_to_string(&mut text)?;
        return Document::parse(&text, None, ctx);
    }

    let inputs = if inputs.is_empty() {
        let found = ctx.source_files()?;
        if found.is_empty() {
            return Err(SnarlError::Config(format!(
                "no input documents given and none match source_patterns {:?}",
                ctx.config.source_patterns
            )));
        }
        found
    } else {
        inputs.to_vec()
    };

    tracing::debug!("loading {} document(s)", inputs.len());
    Document::load_many(&inputs, ctx)
}
