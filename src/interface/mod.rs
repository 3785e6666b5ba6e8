//! High-level interface: loading documents and emitting output.

mod context;
mod document;
mod tangle;
mod weave;

pub use context::{normalize_path, Context};
pub use document::Document;
pub use tangle::{plan_writes, tangle_all, tangle_blocks, tangle_targets, TagFilter, TangledFile};
pub use weave::weave;
