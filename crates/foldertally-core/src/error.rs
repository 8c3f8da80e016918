//! Error types for the scanning engine.
//!
//! Nothing in here aborts a scan. A [`FolderError`] is recorded as the
//! scan's last error and the remaining folders are still processed; a
//! [`ConfigError`] is returned before any thread is spawned.
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A single folder could not be enumerated.
///
/// The `Display` text is what the engine stores as its last error.
#[derive(Debug, Error)]
pub enum FolderError {
    /// `read_dir` on the folder itself failed (permission denied, not a
    /// directory, I/O error).
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The folder opened, but reading one of its entries failed part-way.
    #[error("error while reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FolderError {
    /// The folder this error belongs to.
    pub fn path(&self) -> &Path {
        match self {
            FolderError::Open { path, .. } | FolderError::Read { path, .. } => path,
        }
    }
}

/// Invalid engine configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("worker count must be at least 1")]
    ZeroWorkers,

    #[error("progress batch size (notify_every) must be at least 1")]
    ZeroNotifyEvery,

    #[error("poll interval must be non-zero")]
    ZeroPollInterval,
}
