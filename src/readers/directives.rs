//! Recognition of block headers and line directives.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Syntax;

/// The language tag is any run without whitespace, `=` or `:`, so `c++` and
/// `f#` are valid; a `+` before the `=` may also stand apart (`c++ +=x`).
static FENCED_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<head>[^\s=:]*)(?:\s+(?P<append>\+))?=(?P<args>.*)$").unwrap()
});

static COLON_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<head>[^\s=:]*)(?:\s+(?P<append>\+))?:(?P<args>\S.*)$").unwrap()
});

static FENCED_INCLUDE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^<!--\s*i(?:nclude)?\s+(?P<args>.*?)\s*-->\s*$").unwrap()
});

static FENCED_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<!--\s*#(?P<text>.*?)\s*-->\s*$").unwrap());

static COLON_INCLUDE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:i(?:nclude)?\s+(?P<args>.*?)\s*$").unwrap());

static COLON_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:#(?P<text>.*?)\s*$").unwrap());

/// Unabbreviated directives of either syntax. Only these are reported as
/// belonging to the other syntax, so prose such as ":i think so" stays prose.
static FENCED_FOREIGN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^<!--\s*(?:include\s|#).*-->\s*$").unwrap());

static COLON_FOREIGN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:(?:include\s|#)").unwrap());

/// A parsed fence info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Header {
    /// A directive header (`lang=label options` or `lang+=label`).
    Directive {
        /// Language tag before the `=`, if any.
        lang: Option<String>,
        /// True for `+=` / `+:`.
        append: bool,
        /// Everything after the `=`.
        args: String,
    },
    /// An ordinary info string.
    Plain(String),
}

/// A directive occupying a whole line outside code blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineDirective {
    /// Include directive arguments.
    Include(String),
    /// Comment text.
    Comment(String),
}

fn header_pattern(syntax: Syntax) -> &'static Regex {
    match syntax {
        Syntax::Fenced => &*FENCED_HEADER,
        Syntax::Colon => &*COLON_HEADER,
    }
}

fn mixed_syntax(found: Syntax) -> String {
    format!(
        "{} directive in a document using {} syntax (select syntax '{}' to use it)",
        found,
        found.other(),
        found
    )
}

/// Splits an append marker off the text before `=`.
///
/// Trailing `+` signs pair up as part of the language (`c++`); an odd one out
/// is the marker, so `c+=` appends to a `c` block and `c+++=` to a `c++` one.
fn split_append_marker(head: &str) -> (&str, bool) {
    let pluses = head.len() - head.trim_end_matches('+').len();
    if pluses % 2 == 1 {
        (&head[..head.len() - 1], true)
    } else {
        (head, false)
    }
}

/// Interprets a fence info string under the given syntax.
pub fn parse_header(info: &str, syntax: Syntax) -> Result<Header, String> {
    if let Some(caps) = header_pattern(syntax).captures(info) {
        let (lang, append) = match caps.name("append") {
            Some(_) => (&caps["head"], true),
            None => split_append_marker(&caps["head"]),
        };
        return Ok(Header::Directive {
            lang: Some(lang.to_string()).filter(|l| !l.is_empty()),
            append,
            args: caps["args"].to_string(),
        });
    }
    if header_pattern(syntax.other()).is_match(info) {
        return Err(mixed_syntax(syntax.other()));
    }
    Ok(Header::Plain(info.to_string()))
}

fn line_directive_for(line: &str, syntax: Syntax) -> Option<LineDirective> {
    let (include, comment) = match syntax {
        Syntax::Fenced => (&FENCED_INCLUDE, &FENCED_COMMENT),
        Syntax::Colon => (&COLON_INCLUDE, &COLON_COMMENT),
    };
    if let Some(caps) = include.captures(line) {
        return Some(LineDirective::Include(caps["args"].to_string()));
    }
    comment
        .captures(line)
        .map(|caps| LineDirective::Comment(caps["text"].trim().to_string()))
}

/// Recognizes a line directive under the given syntax.
///
/// `line` must not carry its line terminator.
pub fn parse_line_directive(line: &str, syntax: Syntax) -> Result<Option<LineDirective>, String> {
    if let Some(directive) = line_directive_for(line, syntax) {
        return Ok(Some(directive));
    }
    let foreign = match syntax {
        Syntax::Fenced => &*COLON_FOREIGN,
        Syntax::Colon => &*FENCED_FOREIGN,
    };
    if foreign.is_match(line) {
        return Err(mixed_syntax(syntax.other()));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directive(lang: Option<&str>, append: bool, args: &str) -> Header {
        Header::Directive {
            lang: lang.map(str::to_string),
            append,
            args: args.to_string(),
        }
    }

    #[test]
    fn test_fenced_headers() {
        assert_eq!(
            parse_header("c=hello.c --file", Syntax::Fenced).unwrap(),
            directive(Some("c"), false, "hello.c --file")
        );
        assert_eq!(
            parse_header("+=block0", Syntax::Fenced).unwrap(),
            directive(None, true, "block0")
        );
        assert_eq!(
            parse_header("python", Syntax::Fenced).unwrap(),
            Header::Plain("python".to_string())
        );
        assert_eq!(parse_header("", Syntax::Fenced).unwrap(), Header::Plain(String::new()));
    }

    #[test]
    fn test_languages_with_symbols() {
        assert_eq!(
            parse_header("c++=hello.cpp --file", Syntax::Fenced).unwrap(),
            directive(Some("c++"), false, "hello.cpp --file")
        );
        assert_eq!(
            parse_header("c++ +=hello.cpp", Syntax::Fenced).unwrap(),
            directive(Some("c++"), true, "hello.cpp")
        );
        assert_eq!(
            parse_header("c+++=hello.cpp", Syntax::Fenced).unwrap(),
            directive(Some("c++"), true, "hello.cpp")
        );
        assert_eq!(
            parse_header("c+=main", Syntax::Fenced).unwrap(),
            directive(Some("c"), true, "main")
        );
        assert_eq!(
            parse_header("f#=Program.fs", Syntax::Fenced).unwrap(),
            directive(Some("f#"), false, "Program.fs")
        );
        assert_eq!(
            parse_header("c#:Program.cs", Syntax::Colon).unwrap(),
            directive(Some("c#"), false, "Program.cs")
        );
        assert_eq!(
            parse_header("python title=x", Syntax::Fenced).unwrap(),
            Header::Plain("python title=x".to_string())
        );
    }

    #[test]
    fn test_colon_headers() {
        assert_eq!(
            parse_header("python:block0", Syntax::Colon).unwrap(),
            directive(Some("python"), false, "block0")
        );
        assert_eq!(
            parse_header("+:block0", Syntax::Colon).unwrap(),
            directive(None, true, "block0")
        );
    }

    #[test]
    fn test_mixed_headers_rejected() {
        let err = parse_header("python:block0", Syntax::Fenced).unwrap_err();
        assert!(err.contains("colon directive"));
        assert!(parse_header("=block0", Syntax::Colon).is_err());
    }

    #[test]
    fn test_fenced_line_directives() {
        assert_eq!(
            parse_line_directive("<!-- include chapter.md -->", Syntax::Fenced).unwrap(),
            Some(LineDirective::Include("chapter.md".to_string()))
        );
        assert_eq!(
            parse_line_directive("<!-- i -e x.md -->", Syntax::Fenced).unwrap(),
            Some(LineDirective::Include("-e x.md".to_string()))
        );
        assert_eq!(
            parse_line_directive("<!-- # note to self -->", Syntax::Fenced).unwrap(),
            Some(LineDirective::Comment("note to self".to_string()))
        );
        assert_eq!(
            parse_line_directive("<!-- an ordinary comment -->", Syntax::Fenced).unwrap(),
            None
        );
        assert_eq!(parse_line_directive("Some prose.", Syntax::Fenced).unwrap(), None);
    }

    #[test]
    fn test_colon_line_directives() {
        assert_eq!(
            parse_line_directive(":include chapter.md", Syntax::Colon).unwrap(),
            Some(LineDirective::Include("chapter.md".to_string()))
        );
        assert_eq!(
            parse_line_directive(":# hidden remark", Syntax::Colon).unwrap(),
            Some(LineDirective::Comment("hidden remark".to_string()))
        );
    }

    #[test]
    fn test_mixed_line_directives_rejected() {
        assert!(parse_line_directive(":include a.md", Syntax::Fenced).is_err());
        assert!(parse_line_directive("<!-- include a.md -->", Syntax::Colon).is_err());
        assert!(parse_line_directive("<!-- # a remark -->", Syntax::Colon).is_err());
        assert!(parse_line_directive(":# a remark", Syntax::Fenced).is_err());
    }

    #[test]
    fn test_abbreviated_foreign_directives_are_prose() {
        assert_eq!(parse_line_directive(":i think so", Syntax::Fenced).unwrap(), None);
        assert_eq!(parse_line_directive("<!-- i guess -->", Syntax::Colon).unwrap(), None);
        assert_eq!(
            parse_line_directive(":i part.md", Syntax::Colon).unwrap(),
            Some(LineDirective::Include("part.md".to_string()))
        );
    }
}
