//! Per-scan shared counters, guards and the last-error slot.
//!
//! All counters are plain atomics; no lock is held while counting.
use crate::error::FolderError;
use crate::scanner::progress::ProgressSnapshot;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ScanState {
    /// Jobs enqueued but not yet finished, including those mid-scan.
    pending_folders: AtomicU64,
    /// Every folder ever enqueued, root included.
    dir_count: AtomicU64,
    /// Files seen in successfully opened folders.
    file_count: AtomicU64,
    /// Folders whose enumeration failed.
    error_count: AtomicU64,
    /// Finished folders since the last progress notification.
    progress_tick: AtomicU64,
    canceled: AtomicBool,
    /// Set by whichever worker wins the terminal-notification race.
    finished: AtomicBool,
    /// Overwritten by every failure; which one survives a race is unspecified.
    last_error: Mutex<Option<String>>,
}

impl ScanState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for one newly enqueued folder.
    pub fn record_enqueued(&self) {
        self.pending_folders.fetch_add(1, Ordering::AcqRel);
        self.dir_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_file(&self) {
        self.file_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Account for one finished folder and return how many are still pending.
    pub fn finish_folder(&self) -> u64 {
        let previous = self.pending_folders.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "pending folder count underflow");
        previous.saturating_sub(1)
    }

    /// Advance the progress tick. Returns `true` once every `batch` calls,
    /// resetting the tick when it does.
    pub fn advance_tick(&self, batch: u64) -> bool {
        let batch = batch.max(1);
        let previous = match self.progress_tick.fetch_update(
            Ordering::AcqRel,
            Ordering::Acquire,
            |tick| Some(if tick + 1 >= batch { 0 } else { tick + 1 }),
        ) {
            Ok(tick) | Err(tick) => tick,
        };
        previous + 1 >= batch
    }

    /// Exactly-once guard for the terminal notification.
    pub fn try_mark_finished(&self) -> bool {
        self.finished
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Set the cancellation flag. Returns `true` only for the first call.
    pub fn cancel(&self) -> bool {
        !self.canceled.swap(true, Ordering::AcqRel)
    }

    pub fn is_canceled(&self) -> bool {
        self.canceled.load(Ordering::Acquire)
    }

    pub fn record_folder_error(&self, error: &FolderError) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
        self.set_last_error(error.to_string());
    }

    pub fn set_last_error(&self, message: String) {
        *self.last_error.lock() = Some(message);
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    pub fn pending_folders(&self) -> u64 {
        self.pending_folders.load(Ordering::Acquire)
    }

    pub fn dir_count(&self) -> u64 {
        self.dir_count.load(Ordering::Relaxed)
    }

    pub fn file_count(&self) -> u64 {
        self.file_count.load(Ordering::Relaxed)
    }

    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            pending_folders: self.pending_folders(),
            dir_count: self.dir_count(),
            file_count: self.file_count(),
        }
    }
}
