//! Scan notifications: lightweight messages handed from worker threads
//! to the caller's dispatcher.
//!
//! Neither message carries references into the engine; both are plain
//! snapshots that can be moved across threads or serialised.
use serde::Serialize;
use std::time::Duration;

/// Notification emitted by a running scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScanEvent {
    /// Throttled counter snapshot. Ordering between two progress events
    /// produced by different workers is best-effort.
    Progress(ProgressSnapshot),
    /// Terminal summary. Sent exactly once per started scan.
    Finished(ScanSummary),
}

impl ScanEvent {
    pub fn is_finished(&self) -> bool {
        matches!(self, ScanEvent::Finished(_))
    }
}

/// Counters at the moment a progress batch completed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    /// Folders queued or being scanned.
    pub pending_folders: u64,
    /// Folders discovered so far, root included.
    pub dir_count: u64,
    /// Non-directory entries seen so far.
    pub file_count: u64,
}

impl ProgressSnapshot {
    /// Folders plus files seen so far.
    pub fn total_items(&self) -> u64 {
        self.dir_count + self.file_count
    }
}

/// Final result of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// `true` if cancellation was requested before the queue drained.
    pub canceled: bool,
    /// One of the folder errors seen during the scan, if any.
    pub last_error: Option<String>,
    /// Number of folders whose enumeration failed.
    pub error_count: u64,
    pub dir_count: u64,
    pub file_count: u64,
    /// Wall-clock time from `start` to the terminal notification.
    pub elapsed: Duration,
}

impl ScanSummary {
    pub fn total_items(&self) -> u64 {
        self.dir_count + self.file_count
    }

    /// Folders per second over the whole scan.
    pub fn folders_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.dir_count as f64 / secs
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(elapsed: Duration) -> ScanSummary {
        ScanSummary {
            canceled: false,
            last_error: None,
            error_count: 0,
            dir_count: 500,
            file_count: 4_500,
            elapsed,
        }
    }

    #[test]
    fn test_summary_rates() {
        let s = summary(Duration::from_secs(10));
        assert_eq!(s.total_items(), 5_000);
        assert!((s.folders_per_second() - 50.0).abs() < 0.01);
        assert_eq!(summary(Duration::ZERO).folders_per_second(), 0.0);
    }

    #[test]
    fn test_event_serialises_with_tag() {
        let event = ScanEvent::Progress(ProgressSnapshot {
            pending_folders: 3,
            dir_count: 10,
            file_count: 42,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "progress");
        assert_eq!(json["dir_count"], 10);
        assert!(!event.is_finished());
    }
}
