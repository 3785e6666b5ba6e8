//! Execution context for snarl operations.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::config::{read_config, Config};
use crate::errors::Result;
use crate::io::{FileCache, RealFileCache};

/// Context for snarl operations.
///
/// Contains configuration and file system access. Document paths are kept
/// relative to `base_dir` where possible; the file cache resolves them.
#[derive(Debug, Clone)]
pub struct Context {
    /// Configuration.
    pub config: Config,
    /// File cache for reading documents.
    pub file_cache: Arc<dyn FileCache>,
    /// Base directory for operations.
    pub base_dir: PathBuf,
}

impl Context {
    /// Creates a new context with the given configuration.
    pub fn new(config: Config, base_dir: PathBuf) -> Self {
        let file_cache = Arc::new(RealFileCache::new(base_dir.clone()));
        Self {
            config,
            file_cache,
            base_dir,
        }
    }

    /// Creates a context with default configuration.
    pub fn default_for_dir(base_dir: PathBuf) -> Self {
        Self::new(Config::default(), base_dir)
    }

    /// Creates a context from the current directory, reading the nearest
    /// configuration file.
    pub fn from_current_dir() -> Result<Self> {
        let base_dir = std::env::current_dir()?;
        let config = read_config(&base_dir)?;
        Ok(Self::new(config, base_dir))
    }

    /// Replaces the file cache.
    pub fn with_file_cache(mut self, file_cache: Arc<dyn FileCache>) -> Self {
        self.file_cache = file_cache;
        self
    }

    /// Returns source file paths matching the configured patterns.
    pub fn source_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for pattern in &self.config.source_patterns {
            glob::Pattern::new(pattern)?;
            files.extend(self.file_cache.glob(pattern)?);
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Resolves a path relative to the base directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Resolves the target of an include directive found in `including`.
    ///
    /// Relative targets are taken relative to the including document's
    /// directory, or to the base directory for documents without a path.
    pub fn include_path(&self, including: Option<&Path>, target: &Path) -> PathBuf {
        let joined = match including.and_then(Path::parent) {
            Some(dir) if !target.is_absolute() => dir.join(target),
            _ => target.to_path_buf(),
        };
        normalize_path(&joined)
    }

    /// Returns where a tangle target is written, relative to the base
    /// directory unless absolute.
    pub fn output_path(&self, target: &Path) -> PathBuf {
        match self.config.output_dir() {
            Some(dir) => normalize_path(&dir.join(target)),
            None => normalize_path(target),
        }
    }
}

/// Lexically removes `.` components and folds `..` into the preceding
/// component where there is one.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
