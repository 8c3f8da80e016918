//! Everything one scan's workers share.
//!
//! A fresh [`ScanContext`] is built for every started scan, so a new scan
//! always begins with an empty queue, zeroed counters and cleared guards.
//! Workers hold an `Arc<ScanContext>`; they never see the engine itself.
use crate::dispatch::Notifier;
use crate::scanner::progress::{ScanEvent, ScanSummary};
use crate::scanner::queue::{FolderJob, WorkQueue};
use crate::scanner::state::ScanState;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, trace};

pub(crate) struct ScanContext {
    pub(crate) queue: WorkQueue,
    pub(crate) state: ScanState,
    root: PathBuf,
    notify_every: u64,
    started: Instant,
    /// Engine-wide running guard, cleared when the terminal event fires.
    running: Arc<AtomicBool>,
    notifier: Arc<Notifier>,
    /// Held around every emit so that nothing follows the terminal event.
    emit_order: Mutex<()>,
}

impl ScanContext {
    pub(crate) fn new(
        root: PathBuf,
        notify_every: u64,
        running: Arc<AtomicBool>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self {
            queue: WorkQueue::new(),
            state: ScanState::new(),
            root,
            notify_every,
            started: Instant::now(),
            running,
            notifier,
            emit_order: Mutex::new(()),
        }
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    /// Queue a folder for scanning. Counts it as discovered and pending
    /// before it becomes visible to other workers.
    pub(crate) fn enqueue(&self, job: FolderJob) {
        self.state.record_enqueued();
        self.queue.push(job);
    }

    /// Raise the cancellation flag and wake idle workers so they notice.
    pub(crate) fn cancel(&self) {
        if self.state.cancel() {
            info!(root = %self.root.display(), "Scan cancellation requested");
        }
        self.queue.wake_all();
    }

    /// Called exactly once per dequeued job, whatever its outcome.
    pub(crate) fn folder_finished(&self) {
        let remaining = self.state.finish_folder();

        if self.state.advance_tick(self.notify_every) {
            self.emit_progress();
        }

        if remaining > 0 {
            return;
        }

        self.queue.close();

        let _order = self.emit_order.lock();
        if self.state.try_mark_finished() {
            let summary = self.summary();
            info!(
                root = %self.root.display(),
                dirs = summary.dir_count,
                files = summary.file_count,
                errors = summary.error_count,
                canceled = summary.canceled,
                elapsed_ms = summary.elapsed.as_millis() as u64,
                "Scan finished"
            );
            self.running.store(false, Ordering::Release);
            self.notifier.emit(ScanEvent::Finished(summary));
        }
    }

    /// Emit a progress snapshot unless the terminal event already went out.
    /// A worker that lost the race to the last folder stays silent.
    fn emit_progress(&self) {
        let _order = self.emit_order.lock();
        if self.state.is_finished() {
            return;
        }
        let snapshot = self.state.snapshot();
        trace!(?snapshot, "Progress batch complete");
        self.notifier.emit(ScanEvent::Progress(snapshot));
    }

    /// Give up on a scan that has no workers: record why, cancel, and
    /// finish every queued job on the calling thread.
    pub(crate) fn abandon(&self, reason: String) {
        self.state.set_last_error(reason);
        self.cancel();
        while self.queue.try_pop().is_some() {
            self.folder_finished();
        }
    }

    fn summary(&self) -> ScanSummary {
        ScanSummary {
            canceled: self.state.is_canceled(),
            last_error: self.state.last_error(),
            error_count: self.state.error_count(),
            dir_count: self.state.dir_count(),
            file_count: self.state.file_count(),
            elapsed: self.started.elapsed(),
        }
    }
}
