use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One unit of work: a directory to list and the pattern to look for.
///
/// A task is moved into the worker that runs it and is dropped when that
/// worker finishes.
#[derive(Debug)]
pub struct SearchTask {
    dir: PathBuf,
    pattern: Arc<str>,
}

impl SearchTask {
    /// Creates the task for the search root
    pub fn root(dir: impl Into<PathBuf>, pattern: impl Into<Arc<str>>) -> Self {
        Self {
            dir: dir.into(),
            pattern: pattern.into(),
        }
    }

    /// Creates the task for a subdirectory, sharing this task's pattern
    pub fn child(&self, dir: PathBuf) -> Self {
        Self {
            dir,
            pattern: Arc::clone(&self.pattern),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn pattern(&self) -> &Arc<str> {
        &self.pattern
    }
}
