//! Command implementations.

pub mod files;
mod helpers;
pub mod tangle;
pub mod weave;

pub use files::{files, FileEntry, FilesOptions};
pub use helpers::{load_inputs, load_inputs_from, STDIN};
pub use tangle::{tangle, TangleOptions};
pub use weave::{weave, WeaveOptions};
