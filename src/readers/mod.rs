//! Readers for parsing literate markdown documents.

mod arguments;
mod delimiters;
mod directives;
mod markdown;

pub use arguments::{parse_block_args, parse_include_args, split_words, BlockArgs};
pub use delimiters::{extract_all_tokens, DelimitedToken, DelimitedTokenGetter, ExtractResult};
pub use directives::{parse_header, parse_line_directive, Header, LineDirective};
pub use markdown::{parse_fragments, parse_markdown, ParsedDocument};
