//! Shared test utilities.

use std::path::PathBuf;

use crate::model::{BlockOptions, CodeBlock, ReferenceName};
use crate::readers::parse_fragments;
use crate::text_location::TextLocation;

/// Creates a base definition from source text.
pub fn make_block(name: &str, source: &str) -> CodeBlock {
    let lines: Vec<&str> = if source.is_empty() {
        Vec::new()
    } else {
        source.split('\n').collect()
    };
    CodeBlock::new(
        ReferenceName::new(name),
        Some("python".to_string()),
        parse_fragments(&lines, &TextLocation::default()),
        TextLocation::default(),
    )
}

/// Creates an append definition from source text.
pub fn make_append(name: &str, source: &str) -> CodeBlock {
    make_block(name, source).as_append()
}

/// Creates a file block, optionally with an explicit destination.
pub fn make_file_block(name: &str, source: &str, destination: Option<&str>) -> CodeBlock {
    make_block(name, source).with_options(BlockOptions {
        file: true,
        destination: destination.map(PathBuf::from),
        ..Default::default()
    })
}
