//! Markdown parsing into document segments.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Syntax;
use crate::errors::{Result, SnarlError};
use crate::model::{CodeBlock, Fence, Fragment, ReferenceName, Segment};
use crate::text_location::TextLocation;

use super::arguments::{parse_block_args, parse_include_args};
use super::delimiters::{extract_all_tokens, strip_eol, DelimitedToken, ExtractResult};
use super::directives::{parse_header, parse_line_directive, Header, LineDirective};

/// A placeholder line: `<<name>>` preceded only by whitespace.
static REF_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)<<(?P<refname>[^<>\s](?:[^<>]*[^<>\s])?)>>\s*$").unwrap()
});

/// A parsed markdown document, before include resolution.
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// Segments in document order.
    pub segments: Vec<Segment>,
    /// Source file path.
    pub source_path: Option<PathBuf>,
}

impl ParsedDocument {
    /// Returns the code blocks of this document, in order.
    pub fn code_blocks(&self) -> impl Iterator<Item = &CodeBlock> {
        self.segments.iter().filter_map(|s| match s {
            Segment::CodeBlock(block) => Some(block.as_ref()),
            _ => None,
        })
    }
}

/// Splits code block lines into literal text and placeholders.
///
/// `first_line` is the location of the first line of the body.
pub fn parse_fragments(lines: &[&str], first_line: &TextLocation) -> Vec<Fragment> {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| match REF_PATTERN.captures(line) {
            Some(caps) => Fragment::Reference {
                indent: caps["indent"].to_string(),
                name: ReferenceName::new(&caps["refname"]),
                location: first_line.offset(i),
            },
            None => Fragment::Text(line.to_string()),
        })
        .collect()
}

/// Parses a markdown document into segments.
///
/// Prose lines are accumulated into a single segment until the next code
/// block or directive.
pub fn parse_markdown(input: &str, source_path: Option<&Path>, syntax: Syntax) -> Result<ParsedDocument> {
    let mut segments = Vec::new();
    let mut prose = String::new();

    for result in extract_all_tokens(input) {
        match result {
            ExtractResult::NotDelimited { line, location } => {
                let location = TextLocation::in_document(source_path, location.line);
                let directive = parse_line_directive(strip_eol(&line), syntax)
                    .map_err(|e| SnarlError::parse(location.clone(), e))?;

                match directive {
                    Some(LineDirective::Include(args)) => {
                        let (path, options) = parse_include_args(&args)
                            .map_err(|e| SnarlError::parse(location.clone(), e))?;
                        flush_prose(&mut prose, &mut segments);
                        segments.push(Segment::Include {
                            path,
                            options,
                            location,
                        });
                    }
                    Some(LineDirective::Comment(text)) => {
                        flush_prose(&mut prose, &mut segments);
                        segments.push(Segment::Comment { text, location });
                    }
                    None => prose.push_str(&line),
                }
            }
            ExtractResult::Token(token) => {
                flush_prose(&mut prose, &mut segments);
                let block = process_code_block(token, source_path, syntax)?;
                segments.push(Segment::CodeBlock(Box::new(block)));
            }
            ExtractResult::Unclosed { info, location } => {
                let location = TextLocation::in_document(source_path, location.line);
                return Err(SnarlError::parse(
                    location,
                    format!("unexpected end of file: code block '```{}' is never closed", info),
                ));
            }
        }
    }
    flush_prose(&mut prose, &mut segments);

    Ok(ParsedDocument {
        segments,
        source_path: source_path.map(Path::to_path_buf),
    })
}

fn flush_prose(prose: &mut String, segments: &mut Vec<Segment>) {
    if !prose.is_empty() {
        segments.push(Segment::Prose(std::mem::take(prose)));
    }
}

/// Turns a fenced block into a code block definition.
fn process_code_block(
    token: DelimitedToken,
    source_path: Option<&Path>,
    syntax: Syntax,
) -> Result<CodeBlock> {
    let location = TextLocation::in_document(source_path, token.location.line);
    let lines: Vec<&str> = token.lines.iter().map(String::as_str).collect();
    let fragments = parse_fragments(&lines, &location.offset(1));
    let error = |message: String| SnarlError::parse(location.clone(), message);

    let mut block = match parse_header(&token.info, syntax).map_err(error)? {
        Header::Plain(info) => {
            let language = Some(info).filter(|i| !i.is_empty());
            CodeBlock::unlabeled(language, fragments, location.clone())
        }
        Header::Directive { lang, append, args } => {
            let args = parse_block_args(&args).map_err(error)?;

            if append {
                let Some(label) = args.label else {
                    return Err(error("appending requires a block name".to_string()));
                };
                if !args.options.is_empty() || args.lang.is_some() {
                    return Err(error(format!(
                        "options are not allowed when appending to '{}'",
                        label
                    )));
                }
                CodeBlock::new(ReferenceName::new(label), lang, fragments, location.clone())
                    .as_append()
            } else {
                if args.options.file && args.label.is_none() && args.options.destination.is_none() {
                    return Err(error(
                        "a file block needs a label or an explicit --file=PATH".to_string(),
                    ));
                }
                let language = args.lang.or(lang);
                let block = match args.label {
                    Some(label) => {
                        CodeBlock::new(ReferenceName::new(label), language, fragments, location.clone())
                    }
                    None => CodeBlock::unlabeled(language, fragments, location.clone()),
                };
                block.with_options(args.options)
            }
        }
    };

    block.fence = Fence {
        indent: token.indent,
        delimiter: token.delimiter,
    };
    Ok(block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> ParsedDocument {
        parse_markdown(input, None, Syntax::Fenced).unwrap()
    }

    fn only_block(doc: &ParsedDocument) -> &CodeBlock {
        let blocks: Vec<_> = doc.code_blocks().collect();
        assert_eq!(blocks.len(), 1);
        blocks[0]
    }

    #[test]
    fn test_language_block() {
        let doc = parse("```python=block0\nprint('hello')\n```\n");
        let block = only_block(&doc);

        assert_eq!(block.name().as_str(), "block0");
        assert_eq!(block.language.as_deref(), Some("python"));
        assert_eq!(block.source(), "print('hello')");
        assert!(!block.append);
        assert!(block.options.is_empty());
    }

    #[test]
    fn test_block_without_language() {
        let doc = parse("```=block0\nx\n```\n");
        assert_eq!(only_block(&doc).language, None);
    }

    #[test]
    fn test_hidden_block() {
        let doc = parse("```python=block0 --hide\nx\n```\n");
        assert!(only_block(&doc).options.hide);
    }

    #[test]
    fn test_append_block() {
        let doc = parse("```python=block0\na\n```\n```python+=block0\nb\n```\n");
        let blocks: Vec<_> = doc.code_blocks().collect();

        assert_eq!(blocks.len(), 2);
        assert!(!blocks[0].append);
        assert!(blocks[1].append);
        assert_eq!(blocks[1].name().as_str(), "block0");
    }

    #[test]
    fn test_replace_option() {
        let doc = parse("```python=block0 --replace gadgets gizmos\nx\n```\n");
        let block = only_block(&doc);
        assert_eq!(block.options.replace.len(), 1);
        assert_eq!(block.options.replace[0].pattern(), "gadgets");
        assert_eq!(block.options.replace[0].substitution(), "gizmos");
    }

    #[test]
    fn test_tags() {
        let doc = parse("```c=main.c --file -t build --tag release\nx\n```\n");
        let tags: Vec<_> = only_block(&doc).options.tags.iter().cloned().collect();
        assert_eq!(tags, vec!["build", "release"]);
    }

    #[test]
    fn test_lang_override() {
        let doc = parse("```=block0 --lang rust\nx\n```\n");
        assert_eq!(only_block(&doc).language.as_deref(), Some("rust"));
    }

    #[test]
    fn test_unknown_argument() {
        let err = parse_markdown("```python=block0 --unknown\nx\n```\n", None, Syntax::Fenced)
            .unwrap_err();
        assert!(matches!(err, SnarlError::Parse { .. }));
        assert!(err.to_string().contains("--unknown"));
    }

    #[test]
    fn test_options_on_append_rejected() {
        let input = "```=a\nx\n```\n```+=a --hide\ny\n```\n";
        let err = parse_markdown(input, None, Syntax::Fenced).unwrap_err();
        assert!(err.to_string().contains("not allowed when appending"));
    }

    #[test]
    fn test_unclosed_fence_location() {
        let path = Path::new("doc.md");
        let err = parse_markdown("text\n\n```c=x\nint y;\n", Some(path), Syntax::Fenced)
            .unwrap_err();

        match err {
            SnarlError::Parse { location, message } => {
                assert_eq!(location, TextLocation::new(Some(PathBuf::from("doc.md")), 3));
                assert!(message.contains("unexpected end of file"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_prose_is_preserved() {
        let input = "# Title\n\nSome text.\n```c=x\ny\n```\nMore.\n";
        let doc = parse(input);

        assert_eq!(doc.segments.len(), 3);
        assert_eq!(doc.segments[0], Segment::Prose("# Title\n\nSome text.\n".to_string()));
        assert!(doc.segments[1].is_code_block());
        assert_eq!(doc.segments[2], Segment::Prose("More.\n".to_string()));
    }

    #[test]
    fn test_anonymous_block_keeps_info() {
        let doc = parse("```python {.numberLines}\nx\n```\n");
        let block = only_block(&doc);
        assert!(block.anonymous);
        assert_eq!(block.language.as_deref(), Some("python {.numberLines}"));
    }

    #[test]
    fn test_placeholders() {
        let doc = parse("```c=main\nint main() {\n    <<body>>\n}\n```\n");
        let block = only_block(&doc);

        assert_eq!(
            block.fragments[1],
            Fragment::Reference {
                indent: "    ".to_string(),
                name: ReferenceName::new("body"),
                location: TextLocation::line_only(3),
            }
        );
        assert_eq!(block.references().count(), 1);
    }

    #[test]
    fn test_inline_angle_brackets_are_text() {
        let lines = ["x = a << b >> c", "<<>>", "std::vector<<int>>();"];
        let fragments = parse_fragments(&lines, &TextLocation::default());
        assert!(fragments.iter().all(|f| matches!(f, Fragment::Text(_))));
    }

    #[test]
    fn test_include_and_comment_segments() {
        let input = "intro\n<!-- include -e part.md -->\n<!-- # draft -->\noutro\n";
        let doc = parse(input);

        assert_eq!(doc.segments.len(), 4);
        match &doc.segments[1] {
            Segment::Include { path, options, location } => {
                assert_eq!(path, &PathBuf::from("part.md"));
                assert!(options.escape_html);
                assert_eq!(location.line, 2);
            }
            other => panic!("expected include, got {:?}", other),
        }
        assert!(matches!(&doc.segments[2], Segment::Comment { text, .. } if text == "draft"));
    }

    #[test]
    fn test_colon_syntax() {
        let input = ":# a comment\n```c:hello.c --file\n<<greeting>>\n```\n```c+:hello.c\nmore\n```\n:include other.md\n";
        let doc = parse_markdown(input, None, Syntax::Colon).unwrap();

        let blocks: Vec<_> = doc.code_blocks().collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].options.file);
        assert!(blocks[1].append);
        assert!(matches!(doc.segments.last(), Some(Segment::Include { .. })));
    }

    #[test]
    fn test_mixed_syntax_rejected() {
        let err = parse_markdown("```c:hello.c\nx\n```\n", None, Syntax::Fenced).unwrap_err();
        assert!(err.to_string().contains("colon"));
    }

    #[test]
    fn test_fence_is_recorded() {
        let doc = parse("  ~~~~c=x\n  y\n  ~~~~\n");
        let block = only_block(&doc);
        assert_eq!(block.fence.indent, "  ");
        assert_eq!(block.fence.delimiter, "~~~~");
        assert_eq!(block.source(), "y");
    }

    #[test]
    fn test_anonymous_file_block_needs_destination() {
        assert!(parse_markdown("```c=--file\nx\n```\n", None, Syntax::Fenced).is_err());
        let doc = parse("```c=--file=out.c\nx\n```\n");
        assert_eq!(
            only_block(&doc).options.destination,
            Some(PathBuf::from("out.c"))
        );
    }
}
