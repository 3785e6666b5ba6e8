//! Fenced code block extraction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::text_location::TextLocation;

/// Pattern for matching code fence openings.
static FENCE_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<indent>[ \t]*)(?P<fence>`{3,}|~{3,})(?P<info>.*)$").unwrap());

/// A fenced block extracted from input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimitedToken {
    /// The info string following the opening delimiter, trimmed.
    pub info: String,
    /// Content lines without terminators, de-indented by the fence indent.
    pub lines: Vec<String>,
    /// Location of the opening delimiter.
    pub location: TextLocation,
    /// Indentation of the code fence.
    pub indent: String,
    /// The opening delimiter itself.
    pub delimiter: String,
}

/// Result of attempting to extract a delimited token.
#[derive(Debug, PartialEq, Eq)]
pub enum ExtractResult {
    /// A complete fenced block.
    Token(DelimitedToken),
    /// A line outside any fence, with its terminator.
    NotDelimited {
        line: String,
        location: TextLocation,
    },
    /// A fence that was still open at end of input.
    Unclosed {
        info: String,
        location: TextLocation,
    },
}

/// Strips a trailing `\n` or `\r\n`.
pub(crate) fn strip_eol(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Returns true if `line` closes a fence opened with `len` copies of `fence_char`.
fn is_closing_fence(line: &str, fence_char: char, len: usize) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() >= len && trimmed.chars().all(|c| c == fence_char)
}

/// Extracts fenced blocks from a stream of lines.
pub struct DelimitedTokenGetter {
    /// Number of the next line (1-indexed).
    line_number: usize,
}

impl DelimitedTokenGetter {
    /// Creates a new getter.
    pub fn new() -> Self {
        Self { line_number: 1 }
    }

    /// Extracts the next token from an iterator over lines that still carry
    /// their terminators.
    pub fn extract<'a, I>(&mut self, lines: &mut I) -> Option<ExtractResult>
    where
        I: Iterator<Item = &'a str>,
    {
        let raw = lines.next()?;
        let start_line = self.line_number;
        self.line_number += 1;

        let Some(caps) = FENCE_OPEN.captures(strip_eol(raw)) else {
            return Some(ExtractResult::NotDelimited {
                line: raw.to_string(),
                location: TextLocation::line_only(start_line),
            });
        };

        let indent = caps["indent"].to_string();
        let delimiter = caps["fence"].to_string();
        let info = caps["info"].trim().to_string();
        let fence_char = if delimiter.starts_with('~') { '~' } else { '`' };
        let fence_len = delimiter.len();

        let mut content = Vec::new();
        loop {
            let Some(raw_line) = lines.next() else {
                return Some(ExtractResult::Unclosed {
                    info,
                    location: TextLocation::line_only(start_line),
                });
            };
            self.line_number += 1;
            let line = strip_eol(raw_line);

            if is_closing_fence(line, fence_char, fence_len) {
                return Some(ExtractResult::Token(DelimitedToken {
                    info,
                    lines: content,
                    location: TextLocation::line_only(start_line),
                    indent,
                    delimiter,
                }));
            }

            let stripped = line.strip_prefix(indent.as_str()).unwrap_or(line);
            content.push(stripped.to_string());
        }
    }
}

impl Default for DelimitedTokenGetter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to extract all tokens from a string.
pub fn extract_all_tokens(input: &str) -> Vec<ExtractResult> {
    let mut getter = DelimitedTokenGetter::new();
    let mut lines = input.split_inclusive('\n').peekable();
    let mut results = Vec::new();

    while lines.peek().is_some() {
        if let Some(result) = getter.extract(&mut lines) {
            results.push(result);
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(result: &ExtractResult) -> &DelimitedToken {
        match result {
            ExtractResult::Token(token) => token,
            other => panic!("Expected Token, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_code_block() {
        let results = extract_all_tokens("```c=hello.c --file\nint x;\n```\n");

        assert_eq!(results.len(), 1);
        let token = token(&results[0]);
        assert_eq!(token.info, "c=hello.c --file");
        assert_eq!(token.lines, vec!["int x;"]);
        assert_eq!(token.location.line, 1);
        assert_eq!(token.delimiter, "```");
    }

    #[test]
    fn test_prose_keeps_line_endings() {
        let results = extract_all_tokens("one\r\ntwo");

        assert_eq!(
            results,
            vec![
                ExtractResult::NotDelimited {
                    line: "one\r\n".to_string(),
                    location: TextLocation::line_only(1),
                },
                ExtractResult::NotDelimited {
                    line: "two".to_string(),
                    location: TextLocation::line_only(2),
                },
            ]
        );
    }

    #[test]
    fn test_tilde_fence() {
        let results = extract_all_tokens("~~~rust\nfn main() {}\n~~~");
        let token = token(&results[0]);
        assert_eq!(token.info, "rust");
        assert_eq!(token.lines, vec!["fn main() {}"]);
    }

    #[test]
    fn test_longer_fence() {
        let results = extract_all_tokens("````md\n```\ninner\n```\n````");
        let token = token(&results[0]);
        assert_eq!(token.lines, vec!["```", "inner", "```"]);
    }

    #[test]
    fn test_tilde_does_not_close_backticks() {
        let results = extract_all_tokens("```\n~~~\n```");
        assert_eq!(token(&results[0]).lines, vec!["~~~"]);
    }

    #[test]
    fn test_unclosed_fence() {
        let results = extract_all_tokens("text\n```python\ncode\nmore code");

        assert_eq!(
            results[1],
            ExtractResult::Unclosed {
                info: "python".to_string(),
                location: TextLocation::line_only(2),
            }
        );
    }

    #[test]
    fn test_indented_fence() {
        let results = extract_all_tokens("  ```python\n  code\n    nested\n  ```");
        let token = token(&results[0]);
        assert_eq!(token.indent, "  ");
        assert_eq!(token.lines, vec!["code", "  nested"]);
    }

    #[test]
    fn test_line_numbers_after_block() {
        let results = extract_all_tokens("a\n```\nx\ny\n```\nb\n");

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[2],
            ExtractResult::NotDelimited {
                line: "b\n".to_string(),
                location: TextLocation::line_only(6),
            }
        );
    }

    #[test]
    fn test_empty_code_block() {
        let results = extract_all_tokens("```python\n```");
        assert!(token(&results[0]).lines.is_empty());
    }
}
