//! Staged, all-or-nothing file writes.
//!
//! Every action first writes its content to a temporary file next to its
//! target. Targets are only replaced, by rename, once all actions have been
//! staged; a failure while staging removes the temporaries and leaves every
//! target untouched.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::{Result, SnarlError};

/// An action that can be executed as part of a transaction.
pub trait Action: std::fmt::Debug + Send + Sync {
    /// Returns the target file path.
    fn target(&self) -> &Path;

    /// Checks that the target is still in the state the action was planned for.
    fn check_conflict(&self) -> Result<()>;

    /// Returns the content to be written.
    fn proposed_content(&self) -> &str;

    /// Returns a description of this action.
    fn describe(&self) -> String;
}

/// Create a new file (fails if the file exists).
#[derive(Debug)]
pub struct Create {
    /// Target file path.
    pub path: PathBuf,
    /// Content to write.
    pub content: String,
}

impl Create {
    /// Creates a new Create action.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

impl Action for Create {
    fn target(&self) -> &Path {
        &self.path
    }

    fn check_conflict(&self) -> Result<()> {
        if self.path.exists() {
            return Err(SnarlError::OutputWrite {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::AlreadyExists, "file already exists"),
            });
        }
        Ok(())
    }

    fn proposed_content(&self) -> &str {
        &self.content
    }

    fn describe(&self) -> String {
        format!("create {}", self.path.display())
    }
}

/// Replace the content of an existing file.
#[derive(Debug)]
pub struct WriteAction {
    /// Target file path.
    pub path: PathBuf,
    /// Content to write.
    pub content: String,
}

impl WriteAction {
    /// Creates a new Write action.
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

impl Action for WriteAction {
    fn target(&self) -> &Path {
        &self.path
    }

    fn check_conflict(&self) -> Result<()> {
        if self.path.is_dir() {
            return Err(SnarlError::OutputWrite {
                path: self.path.clone(),
                source: io::Error::new(io::ErrorKind::Other, "target is a directory"),
            });
        }
        Ok(())
    }

    fn proposed_content(&self) -> &str {
        &self.content
    }

    fn describe(&self) -> String {
        format!("write {}", self.path.display())
    }
}

/// A collection of actions executed together.
#[derive(Debug, Default)]
pub struct Transaction {
    actions: Vec<Box<dyn Action>>,
}

impl Transaction {
    /// Creates a new empty transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an action to the transaction.
    pub fn add(&mut self, action: impl Action + 'static) {
        self.actions.push(Box::new(action));
    }

    /// Adds a create action.
    pub fn create(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.add(Create::new(path, content));
    }

    /// Adds a write action.
    pub fn write(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.add(WriteAction::new(path, content));
    }

    /// Returns the number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if there are no actions.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns descriptions of all actions.
    pub fn describe(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.describe()).collect()
    }

    /// Returns the target paths of all actions.
    pub fn targets(&self) -> Vec<&Path> {
        self.actions.iter().map(|a| a.target()).collect()
    }

    /// Checks all actions for conflicts.
    pub fn check_conflicts(&self) -> Result<()> {
        for action in &self.actions {
            action.check_conflict()?;
        }
        Ok(())
    }

    /// Stages every action, then commits them all.
    pub fn execute(&self) -> Result<()> {
        self.check_conflicts()?;

        let mut staged = Vec::with_capacity(self.actions.len());
        for action in &self.actions {
            match stage(action.target(), action.proposed_content()) {
                Ok(temp_path) => staged.push(temp_path),
                Err(source) => {
                    discard(&staged);
                    return Err(SnarlError::OutputWrite {
                        path: action.target().to_path_buf(),
                        source,
                    });
                }
            }
        }

        for (i, (action, temp_path)) in self.actions.iter().zip(&staged).enumerate() {
            if let Err(source) = fs::rename(temp_path, action.target()) {
                discard(&staged[i..]);
                return Err(SnarlError::OutputWrite {
                    path: action.target().to_path_buf(),
                    source,
                });
            }
            tracing::info!("{}", action.describe());
        }

        Ok(())
    }
}

/// Counter for generating unique temp file names.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Writes `content` to a temporary file beside `path`, creating parent
/// directories as needed.
fn stage(path: &Path, content: &str) -> io::Result<PathBuf> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let temp_path = parent.join(format!(".snarl-tmp-{}-{}", std::process::id(), counter));

    let result = File::create(&temp_path).and_then(|mut file| {
        file.write_all(content.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(temp_path)
}

fn discard(temp_paths: &[PathBuf]) {
    for path in temp_paths {
        if let Err(e) = fs::remove_file(path) {
            tracing::warn!("could not remove temporary file {}: {}", path.display(), e);
        }
    }
}
