//! Error types for `treefs-core`.
//!
//! All fallible operations in the core library return [`CoreResult<T>`],
//! which is an alias for `Result<T, CoreError>`. Every error is terminal for
//! the operation that produced it: there is no partial-success return.

use std::path::{Path, PathBuf};

/// Unified error type for all core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The traversal root does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The traversal root exists but is not a directory.
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),

    /// A symlink points at another symlink. Only one hop is ever resolved.
    #[error("recursive symlink: {} -> {}", path.display(), target.display())]
    RecursiveSymlink { path: PathBuf, target: PathBuf },

    /// A stat, readlink, readdir, unlink or rmdir call failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The traversal was cancelled by its consumer.
    #[error("operation cancelled")]
    Cancelled,

    /// A depth-indexed tree does not have a single root entry.
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),
}

impl CoreError {
    /// Wraps an I/O error together with the path that produced it.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Returns `true` for [`CoreError::Cancelled`].
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Convenience alias used throughout `treefs-core`.
pub type CoreResult<T> = Result<T, CoreError>;
