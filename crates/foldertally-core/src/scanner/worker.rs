//! Worker threads.
//!
//! Each worker:
//! - Pulls folder jobs from the shared [`WorkQueue`](super::queue::WorkQueue)
//! - Counts the files in the folder
//! - Pushes subfolders back onto the queue
//! - Reports the job finished, which may end the scan
use crate::error::FolderError;
use crate::scanner::context::ScanContext;
use crate::scanner::queue::Pop;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// A worker thread bound to one scan.
pub(crate) struct Worker {
    id: usize,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(crate) fn spawn(
        id: usize,
        ctx: Arc<ScanContext>,
        poll_interval: Duration,
    ) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name(format!("foldertally-worker-{id}"))
            .spawn(move || worker_loop(id, &ctx, poll_interval))?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the thread to exit.
    pub(crate) fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!(worker = self.id, "Worker thread panicked");
            }
        }
    }
}

/// Reports the current job finished when dropped, including on unwind,
/// so a panicking scan cannot leave the pending count stuck above zero.
struct FinishGuard<'a> {
    ctx: &'a ScanContext,
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        self.ctx.folder_finished();
    }
}

fn worker_loop(id: usize, ctx: &ScanContext, poll_interval: Duration) {
    debug!(worker = id, "Worker starting");
    let mut folders = 0u64;

    loop {
        match ctx.queue.wait_pop(poll_interval) {
            Pop::Job(path) => {
                let _guard = FinishGuard { ctx };
                scan_folder(ctx, &path);
                folders += 1;
            }
            Pop::Closed => break,
            // Timed out or woken by cancellation; go round again.
            Pop::Empty => continue,
        }
    }

    debug!(worker = id, folders, "Worker exiting");
}

/// Enumerate one folder: count its files and enqueue its subfolders.
///
/// Failures are recorded on the scan state and never propagate.
pub(crate) fn scan_folder(ctx: &ScanContext, path: &Path) {
    if path.as_os_str().is_empty() || ctx.state.is_canceled() {
        return;
    }

    match enumerate(ctx, path) {
        Ok(()) => trace!(path = %path.display(), "Folder scanned"),
        Err(err) => {
            warn!(path = %err.path().display(), error = %err, "Folder enumeration failed");
            ctx.state.record_folder_error(&err);
        }
    }
}

fn enumerate(ctx: &ScanContext, path: &Path) -> Result<(), FolderError> {
    let entries = match fs::read_dir(path) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "Folder vanished before it was scanned");
            return Ok(());
        }
        Err(source) => {
            return Err(FolderError::Open {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    for entry in entries {
        let entry = entry.map_err(|source| FolderError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let file_type = match entry.file_type() {
            Ok(file_type) => file_type,
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(FolderError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        // Links are followed. A dangling link counts as a file.
        let is_dir = if file_type.is_symlink() {
            fs::metadata(entry.path()).map_or(false, |meta| meta.is_dir())
        } else {
            file_type.is_dir()
        };

        if is_dir {
            if ctx.state.is_canceled() {
                return Ok(());
            }
            ctx.enqueue(entry.path());
        } else {
            ctx.state.record_file();
            if ctx.state.is_canceled() {
                return Ok(());
            }
        }
    }

    Ok(())
}
