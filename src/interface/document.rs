//! Document loading and include resolution.

use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{Result, SnarlError};
use crate::model::{IncludeOptions, ReferenceMap, ResolvedSegment, Segment};
use crate::readers::parse_markdown;
use crate::text_location::TextLocation;

use super::context::{normalize_path, Context};

/// A document with all includes spliced in and all blocks registered.
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Path of the top-level document, if it was read from a file.
    pub path: Option<PathBuf>,
    /// Prose and block definitions in document order.
    pub segments: Vec<ResolvedSegment>,
    /// Every block definition of the merged tree.
    pub refs: ReferenceMap,
}

impl Document {
    /// Loads a document and everything it includes.
    pub fn load(path: &Path, ctx: &Context) -> Result<Self> {
        Self::load_many(&[path.to_path_buf()], ctx)
    }

    /// Parses document text. Includes are resolved relative to `path`'s
    /// directory, or to the context base directory if there is none.
    pub fn parse(text: &str, path: Option<&Path>, ctx: &Context) -> Result<Self> {
        let path = path.map(normalize_path);
        let mut resolver = Resolver::new(ctx);
        resolver.parse(text, path.as_deref(), IncludeOptions::default())?;
        Ok(resolver.finish(path))
    }

    /// Loads several documents into one registry, in the given order.
    pub fn load_many(paths: &[PathBuf], ctx: &Context) -> Result<Self> {
        let mut resolver = Resolver::new(ctx);
        for path in paths {
            let path = normalize_path(path);
            let text = ctx.file_cache.read(&path).map_err(|e| {
                SnarlError::Io(io::Error::new(
                    e.kind(),
                    format!("cannot read {}: {}", path.display(), e),
                ))
            })?;
            tracing::debug!("reading {}", path.display());
            resolver.parse(&text, Some(&path), IncludeOptions::default())?;
        }
        let path = match paths {
            [single] => Some(normalize_path(single)),
            _ => None,
        };
        Ok(resolver.finish(path))
    }
}

/// Walks a document tree depth first, registering blocks in source order.
struct Resolver<'a> {
    ctx: &'a Context,
    refs: ReferenceMap,
    segments: Vec<ResolvedSegment>,
    /// Documents currently being read, outermost first.
    stack: Vec<PathBuf>,
}

impl<'a> Resolver<'a> {
    fn new(ctx: &'a Context) -> Self {
        Self {
            ctx,
            refs: ReferenceMap::new(),
            segments: Vec::new(),
            stack: Vec::new(),
        }
    }

    fn finish(self, path: Option<PathBuf>) -> Document {
        Document {
            path,
            segments: self.segments,
            refs: self.refs,
        }
    }

    fn parse(&mut self, text: &str, path: Option<&Path>, inherited: IncludeOptions) -> Result<()> {
        let parsed = parse_markdown(text, path, self.ctx.config.syntax)?;

        if let Some(path) = path {
            self.stack.push(path.to_path_buf());
        }

        for segment in parsed.segments {
            match segment {
                Segment::Prose(text) => {
                    let text = if inherited.escape_html {
                        html_escape::encode_text(&text).into_owned()
                    } else {
                        text
                    };
                    self.segments.push(ResolvedSegment::Prose(text));
                }
                Segment::CodeBlock(block) => {
                    let mut block = *block;
                    block.inherited = inherited;
                    let id = self.refs.define(block)?;
                    self.segments.push(ResolvedSegment::Block(id));
                }
                Segment::Include {
                    path: target,
                    options,
                    location,
                } => {
                    self.include(path, &target, inherited.merge(options), location)?;
                }
                Segment::Comment { text, location } => {
                    tracing::trace!("comment at {}: {}", location, text);
                }
            }
        }

        if path.is_some() {
            self.stack.pop();
        }
        Ok(())
    }

    fn include(
        &mut self,
        including: Option<&Path>,
        target: &Path,
        options: IncludeOptions,
        location: TextLocation,
    ) -> Result<()> {
        let path = self.ctx.include_path(including, target);

        if let Some(start) = self.stack.iter().position(|p| *p == path) {
            let mut chain = self.stack[start..].to_vec();
            chain.push(path);
            return Err(SnarlError::CyclicInclude(chain));
        }

        let text = match self.ctx.file_cache.read(&path) {
            Ok(text) => text,
            Err(source) if self.ctx.config.ignore_missing => {
                tracing::warn!("{}: skipping include of {}: {}", location, path.display(), source);
                return Ok(());
            }
            Err(source) => {
                return Err(SnarlError::IncludeNotFound {
                    path,
                    location,
                    source,
                })
            }
        };

        tracing::debug!("including {} at {}", path.display(), location);
        self.parse(&text, Some(&path), options)
            .map_err(|e| e.included_from(location))
    }
}
