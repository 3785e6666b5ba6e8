//! Weaving: rendering a document for readers.

use std::borrow::Cow;

use crate::model::{CodeBlock, ResolvedSegment};

use super::document::Document;

/// Renders the document as plain Markdown.
///
/// Prose passes through. Code blocks become ordinary fences carrying only
/// their language, with placeholders left as written. Hidden blocks, and
/// the appends to them, are omitted.
pub fn weave(doc: &Document) -> String {
    let mut output = String::new();

    for segment in &doc.segments {
        match segment {
            ResolvedSegment::Prose(text) => output.push_str(text),
            ResolvedSegment::Block(id) => {
                let (Some(block), Some(options)) = (doc.refs.get(id), doc.refs.options_for(id))
                else {
                    continue;
                };
                if options.hide {
                    tracing::trace!("hiding {}", id);
                    continue;
                }
                let escape = options.escape_html || block.inherited.escape_html;
                let language = block.language.as_deref().or_else(|| {
                    doc.refs
                        .lookup(block.name())
                        .and_then(|merged| merged.language())
                });
                write_block(&mut output, block, language, escape);
            }
        }
    }

    output
}

fn write_block(output: &mut String, block: &CodeBlock, language: Option<&str>, escape: bool) {
    let indent = block.fence.indent.as_str();
    let delimiter = block.fence.delimiter.as_str();

    output.push_str(indent);
    output.push_str(delimiter);
    output.push_str(language.unwrap_or(""));
    output.push('\n');

    for fragment in &block.fragments {
        let line = fragment.render();
        let line = if escape {
            html_escape::encode_text(&line)
        } else {
            Cow::Borrowed(line.as_str())
        };
        if !line.is_empty() {
            output.push_str(indent);
            output.push_str(&line);
        }
        output.push('\n');
    }

    output.push_str(indent);
    output.push_str(delimiter);
    output.push('\n');
}
