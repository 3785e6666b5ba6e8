//! Directive argument parsing.
//!
//! Directive arguments are shell-like words: whitespace separates words,
//! single quotes group text literally, and double quotes group text with
//! `\"` and `\\` escapes. Backslashes elsewhere are kept, so regex patterns
//! such as `\d+` need no extra quoting.

use std::path::PathBuf;

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, take_while, take_while1},
    character::complete::{char, multispace0, multispace1, one_of},
    combinator::{all_consuming, map},
    multi::{fold_many0, fold_many1, separated_list0},
    sequence::{delimited, preceded},
};

use crate::model::{BlockOptions, IncludeOptions, Replacement};

/// Parse an unquoted run of characters.
fn parse_bare(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| !c.is_whitespace() && c != '"' && c != '\''),
        str::to_string,
    )
    .parse(input)
}

/// Parse a single-quoted string; no escapes.
fn parse_single_quoted(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('\''), take_while(|c: char| c != '\''), char('\'')),
        str::to_string,
    )
    .parse(input)
}

/// Parse a double-quoted string with `\"` and `\\` escapes.
fn parse_double_quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        fold_many0(
            alt((
                map(preceded(char('\\'), one_of("\\\"")), String::from),
                map(is_not("\\\""), str::to_string),
                map(char('\\'), String::from),
            )),
            String::new,
            |mut acc, piece| {
                acc.push_str(&piece);
                acc
            },
        ),
        char('"'),
    )
    .parse(input)
}

/// Parse one word, which may mix quoted and unquoted parts (`--file="a b"`).
fn parse_word(input: &str) -> IResult<&str, String> {
    fold_many1(
        alt((parse_double_quoted, parse_single_quoted, parse_bare)),
        String::new,
        |mut acc, piece| {
            acc.push_str(&piece);
            acc
        },
    )
    .parse(input)
}

/// Splits directive arguments into words.
pub fn split_words(input: &str) -> Result<Vec<String>, String> {
    all_consuming(delimited(
        multispace0,
        separated_list0(multispace1, parse_word),
        multispace0,
    ))
    .parse(input)
    .map(|(_, words)| words)
    .map_err(|_| format!("cannot split arguments (unterminated quote?): {}", input.trim()))
}

/// Arguments of a code block header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockArgs {
    /// The block label, if given.
    pub label: Option<String>,
    /// Language given with `--lang`.
    pub lang: Option<String>,
    /// Parsed options.
    pub options: BlockOptions,
}

/// Splits `--flag=value` into its parts; other words are returned whole.
fn split_inline(word: &str) -> (&str, Option<&str>) {
    match word.split_once('=') {
        Some((flag, value)) if word.starts_with("--") => (flag, Some(value)),
        _ => (word, None),
    }
}

fn no_value(flag: &str, inline: Option<&str>) -> Result<(), String> {
    match inline {
        Some(_) => Err(format!("option '{}' does not take a value", flag)),
        None => Ok(()),
    }
}

fn take_value<I>(flag: &str, inline: Option<&str>, rest: &mut I) -> Result<String, String>
where
    I: Iterator<Item = String>,
{
    match inline {
        Some(value) => Ok(value.to_string()),
        None => rest
            .next()
            .ok_or_else(|| format!("option '{}' expects a value", flag)),
    }
}

/// Interprets the words of a code block header.
pub fn parse_block_args(input: &str) -> Result<BlockArgs, String> {
    let mut args = BlockArgs::default();
    let mut words = split_words(input)?.into_iter();

    while let Some(word) = words.next() {
        let (flag, inline) = split_inline(&word);
        match flag {
            "--hide" | "-H" => {
                no_value(flag, inline)?;
                args.options.hide = true;
            }
            "--file" | "-f" => {
                args.options.file = true;
                if let Some(path) = inline {
                    if path.is_empty() {
                        return Err("option '--file=' expects a path".to_string());
                    }
                    args.options.destination = Some(PathBuf::from(path));
                }
            }
            "--verbatim" => {
                no_value(flag, inline)?;
                args.options.verbatim = true;
            }
            "--escape-html" => {
                no_value(flag, inline)?;
                args.options.escape_html = true;
            }
            "--tag" | "-t" => {
                let tag = take_value(flag, inline, &mut words)?;
                args.options.tags.insert(tag);
            }
            "--lang" => {
                args.lang = Some(take_value(flag, inline, &mut words)?);
            }
            "--replace" | "-r" => {
                let pattern = take_value(flag, inline, &mut words)?;
                let substitution = words
                    .next()
                    .ok_or_else(|| format!("option '{}' expects a pattern and a substitution", flag))?;
                let rule = Replacement::new(&pattern, substitution)
                    .map_err(|e| format!("invalid replace pattern '{}': {}", pattern, e))?;
                args.options.replace.push(rule);
            }
            _ if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unrecognized option '{}'", flag));
            }
            _ => {
                if let Some(label) = &args.label {
                    return Err(format!(
                        "unexpected argument '{}' (block already labeled '{}')",
                        word, label
                    ));
                }
                args.label = Some(word.clone());
            }
        }
    }

    Ok(args)
}

/// Interprets the words of an include directive: options and one path.
pub fn parse_include_args(input: &str) -> Result<(PathBuf, IncludeOptions), String> {
    let mut options = IncludeOptions::default();
    let mut path = None;

    for word in split_words(input)? {
        match word.as_str() {
            "--escape-html" | "-e" => options.escape_html = true,
            "--verbatim" | "-v" => options.verbatim = true,
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("unrecognized include option '{}'", flag));
            }
            _ => {
                if path.is_some() {
                    return Err(format!("unexpected argument '{}'", word));
                }
                path = Some(PathBuf::from(&word));
            }
        }
    }

    let path = path.ok_or_else(|| "include directive requires a path".to_string())?;
    Ok((path, options))
}
