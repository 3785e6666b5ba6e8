//! Core model types for snarl.

mod code_block;
mod options;
mod reference_id;
mod reference_map;
mod reference_name;
mod segment;
mod tangle;

pub use code_block::{CodeBlock, Fence, Fragment};
pub use options::{BlockOptions, IncludeOptions, Replacement};
pub use reference_id::ReferenceId;
pub use reference_map::{Block, ReferenceMap};
pub use reference_name::ReferenceName;
pub use segment::{ResolvedSegment, Segment};
pub use tangle::{expand, tangle_ref, CycleDetector};
