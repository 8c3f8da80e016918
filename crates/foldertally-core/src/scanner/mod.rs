//! Scanner module: orchestrates concurrent folder counting.
//!
//! A scan is a pool of worker threads sharing one FIFO of folder jobs.
//! Workers are consumers (they pop folders) and producers (they push the
//! subfolders they discover). There is no coordinator thread: the scan is
//! over when the pending-folder count drops to zero, and the worker that
//! drops it emits the single terminal notification.
//!
//! ```text
//!   start(root) ──► queue ◄──────────────┐
//!                     │                  │ subfolders
//!          ┌──────────┼──────────┐       │
//!          ▼          ▼          ▼       │
//!      worker 0   worker 1 … worker N ───┘
//!          │          │          │
//!          └── folder finished ──┴──► Progress / Finished ──► Dispatch
//! ```
pub mod progress;
pub mod queue;
pub mod state;

mod context;
mod worker;

use crate::config::ScanConfig;
use crate::dispatch::{Dispatch, Notifier};
use crate::error::ConfigError;
use context::ScanContext;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use worker::Worker;

/// Concurrent directory/file counter.
///
/// All methods take `&self`; the engine can be shared between threads
/// behind an `Arc`. Dropping the engine cancels any active scan and waits
/// for its workers to exit; no notification is dispatched after the drop
/// returns.
pub struct ScanEngine {
    worker_count: usize,
    poll_interval: Duration,
    notify_every: AtomicU64,
    /// Set while a scan is in flight.
    running: Arc<AtomicBool>,
    notifier: Arc<Notifier>,
    /// The most recently started scan. Kept after it finishes so its final
    /// counters stay readable.
    current: Mutex<Option<Arc<ScanContext>>>,
    /// Worker threads not yet joined, possibly from earlier scans.
    pool: Mutex<Vec<Worker>>,
}

impl ScanEngine {
    /// Engine with the default configuration.
    pub fn new(dispatcher: impl Dispatch) -> Self {
        Self::build(ScanConfig::default(), Box::new(dispatcher))
    }

    pub fn with_config(config: ScanConfig, dispatcher: impl Dispatch) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, Box::new(dispatcher)))
    }

    fn build(config: ScanConfig, dispatcher: Box<dyn Dispatch>) -> Self {
        Self {
            worker_count: config.effective_workers(),
            poll_interval: config.poll_interval,
            notify_every: AtomicU64::new(config.notify_every),
            running: Arc::new(AtomicBool::new(false)),
            notifier: Arc::new(Notifier::new(dispatcher)),
            current: Mutex::new(None),
            pool: Mutex::new(Vec::new()),
        }
    }

    /// Start scanning `root` in the background.
    ///
    /// Returns `false` without doing anything if `root` is blank or a scan
    /// is already running. Completion is observed only through the
    /// `Finished` notification.
    pub fn start(&self, root: impl AsRef<Path>) -> bool {
        let root = root.as_ref();
        if is_blank(root) {
            debug!("Ignoring start request with a blank root path");
            return false;
        }

        // Flip the running flag and install the new context under one lock;
        // `request_cancel` and the counters read `current` under it too.
        let ctx = {
            let mut current = self.current.lock();
            if self
                .running
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                debug!(root = %root.display(), "Scan already running; start ignored");
                return false;
            }

            let ctx = Arc::new(ScanContext::new(
                root.to_path_buf(),
                self.notify_every.load(Ordering::Relaxed),
                Arc::clone(&self.running),
                Arc::clone(&self.notifier),
            ));
            ctx.enqueue(root.to_path_buf());
            *current = Some(Arc::clone(&ctx));
            ctx
        };

        self.reap_exited_workers();

        info!(
            root = %root.display(),
            workers = self.worker_count,
            "Starting scan"
        );

        let mut spawned = Vec::with_capacity(self.worker_count);
        for id in 0..self.worker_count {
            match Worker::spawn(id, Arc::clone(&ctx), self.poll_interval) {
                Ok(worker) => spawned.push(worker),
                Err(err) => {
                    error!(worker = id, error = %err, "Failed to spawn worker thread");
                    ctx.state
                        .set_last_error(format!("failed to spawn worker thread: {err}"));
                }
            }
        }

        if spawned.is_empty() {
            ctx.abandon(format!(
                "no worker threads could be started for {}",
                ctx.root().display()
            ));
        }

        self.pool.lock().extend(spawned);
        true
    }

    /// Ask the active scan to stop. Idempotent and non-blocking.
    ///
    /// Folders already being enumerated finish their current entry; no new
    /// folder is queued or scanned afterwards.
    pub fn request_cancel(&self) {
        if let Some(ctx) = self.current() {
            ctx.cancel();
        }
    }

    /// `true` from a successful `start` until the terminal notification is
    /// about to be dispatched.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Effective pool size spawned for each scan.
    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Change the progress batch size. Applies from the next `start`.
    pub fn set_notify_every(&self, notify_every: u64) -> Result<(), ConfigError> {
        if notify_every == 0 {
            return Err(ConfigError::ZeroNotifyEvery);
        }
        self.notify_every.store(notify_every, Ordering::Relaxed);
        Ok(())
    }

    pub fn notify_every(&self) -> u64 {
        self.notify_every.load(Ordering::Relaxed)
    }

    pub fn pending_folders(&self) -> u64 {
        self.current().map_or(0, |ctx| ctx.state.pending_folders())
    }

    pub fn dir_count(&self) -> u64 {
        self.current().map_or(0, |ctx| ctx.state.dir_count())
    }

    pub fn file_count(&self) -> u64 {
        self.current().map_or(0, |ctx| ctx.state.file_count())
    }

    /// Most recent folder error of the current (or last) scan.
    pub fn last_error(&self) -> Option<String> {
        self.current().and_then(|ctx| ctx.state.last_error())
    }

    fn current(&self) -> Option<Arc<ScanContext>> {
        self.current.lock().clone()
    }

    /// Join workers from earlier scans that have already exited.
    fn reap_exited_workers(&self) {
        let exited: Vec<Worker> = {
            let mut pool = self.pool.lock();
            let (exited, alive): (Vec<Worker>, Vec<Worker>) =
                pool.drain(..).partition(Worker::is_finished);
            *pool = alive;
            exited
        };
        for worker in exited {
            worker.join();
        }
    }
}

impl Drop for ScanEngine {
    fn drop(&mut self) {
        self.notifier.close();
        self.request_cancel();

        let workers = std::mem::take(self.pool.get_mut());
        if !workers.is_empty() {
            debug!(count = workers.len(), "Waiting for worker threads to exit");
        }
        for worker in workers {
            worker.join();
        }
    }
}

fn is_blank(root: &Path) -> bool {
    root.as_os_str().to_string_lossy().trim().is_empty()
}
