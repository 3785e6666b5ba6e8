//! Content digests for change detection.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

/// Size and content hash of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    /// File size in bytes.
    pub size: u64,
    /// SHA256 hash of the file content (hex encoded).
    pub hexdigest: String,
}

impl FileData {
    /// Creates FileData from file path.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let size = fs::metadata(path)?.len();
        let hexdigest = hexdigest_file(path)?;
        Ok(Self { size, hexdigest })
    }

    /// Creates FileData from content string.
    pub fn from_content(content: &str) -> Self {
        Self {
            size: content.len() as u64,
            hexdigest: hexdigest_str(content),
        }
    }
}

/// Computes SHA256 hash of a string, returning hex-encoded digest.
pub fn hexdigest_str(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Computes SHA256 hash of a file, returning hex-encoded digest.
pub fn hexdigest_file(path: &Path) -> io::Result<String> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}
