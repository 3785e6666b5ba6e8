//! I/O operations for reading documents and writing tangled files.

mod file_cache;
mod stat;
mod transaction;

pub use file_cache::{FileCache, RealFileCache, VirtualFS};
pub use stat::{hexdigest_file, hexdigest_str, FileData};
pub use transaction::{Action, Create, Transaction, WriteAction};
