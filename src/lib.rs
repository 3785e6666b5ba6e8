//! snarl - Literate Programming Document Processor
//!
//! This library reads Markdown documents containing named, fenced code
//! blocks and produces two outputs from them: the documentation itself
//! (weaving) and the source files assembled from the blocks (tangling).
//!
//! # Features
//!
//! - **Weave**: Render the document with block labels and options stripped
//! - **Tangle**: Expand `<<name>>` placeholders and write file blocks
//! - **Includes**: Splice other documents in, with cycle detection
//! - **Files**: List the files a document tangles to
//!
//! # Example
//!
//! ```no_run
//! use snarl::interface::{tangle_targets, Context, Document, TagFilter};
//!
//! let ctx = Context::from_current_dir().unwrap();
//! let doc = Document::load("book.snarl.md".as_ref(), &ctx).unwrap();
//! for file in tangle_targets(&doc.refs, &TagFilter::all()).unwrap() {
//!     println!("{}: {} bytes", file.path.display(), file.content.len());
//! }
//! ```

pub mod commands;
pub mod config;
pub mod errors;
pub mod interface;
pub mod io;
pub mod model;
pub mod readers;
pub mod text_location;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::{Config, Syntax};
pub use errors::{Result, SnarlError};
pub use interface::{Context, Document};
pub use model::{CodeBlock, ReferenceId, ReferenceMap, ReferenceName};

// Re-export command options
pub use commands::{FilesOptions, TangleOptions, WeaveOptions};
