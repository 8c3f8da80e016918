//! Scan engine configuration.
use crate::error::ConfigError;
use std::time::Duration;

/// Default number of finished folders between two progress notifications.
pub const DEFAULT_NOTIFY_EVERY: u64 = 100;

/// Upper bound on how long an idle worker sleeps before re-checking
/// cancellation and termination.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bounds applied to the automatic worker count.
pub const MIN_AUTO_WORKERS: usize = 2;
pub const MAX_AUTO_WORKERS: usize = 6;

/// Tuning knobs for a [`ScanEngine`](crate::ScanEngine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfig {
    /// Explicit pool size. `None` picks [`default_worker_count`].
    pub workers: Option<usize>,
    /// Emit a progress notification every `notify_every` finished folders.
    pub notify_every: u64,
    /// Bounded wait used by idle workers.
    pub poll_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            workers: None,
            notify_every: DEFAULT_NOTIFY_EVERY,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl ScanConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_notify_every(mut self, notify_every: u64) -> Self {
        self.notify_every = notify_every;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == Some(0) {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.notify_every == 0 {
            return Err(ConfigError::ZeroNotifyEvery);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(())
    }

    /// Pool size that will actually be spawned for each scan.
    pub fn effective_workers(&self) -> usize {
        self.workers.unwrap_or_else(default_worker_count)
    }
}

/// Half the logical CPUs, clamped to
/// [`MIN_AUTO_WORKERS`]..=[`MAX_AUTO_WORKERS`].
///
/// Folder enumeration is syscall-bound; beyond a handful of threads the
/// filesystem, not the CPU, is the limit.
pub fn default_worker_count() -> usize {
    auto_workers_for(num_cpus::get())
}

fn auto_workers_for(cpus: usize) -> usize {
    (cpus / 2).clamp(MIN_AUTO_WORKERS, MAX_AUTO_WORKERS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ScanConfig::default();
        assert_eq!(config.notify_every, 100);
        assert_eq!(config.poll_interval, Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn auto_worker_count_is_clamped() {
        assert_eq!(auto_workers_for(1), 2);
        assert_eq!(auto_workers_for(4), 2);
        assert_eq!(auto_workers_for(8), 4);
        assert_eq!(auto_workers_for(12), 6);
        assert_eq!(auto_workers_for(64), 6);
    }

    #[test]
    fn default_worker_count_within_bounds() {
        let n = default_worker_count();
        assert!((MIN_AUTO_WORKERS..=MAX_AUTO_WORKERS).contains(&n));
    }

    #[test]
    fn explicit_workers_override_auto() {
        let config = ScanConfig::default().with_workers(12);
        assert_eq!(config.effective_workers(), 12);
    }

    #[test]
    fn validate_rejects_zero_values() {
        assert_eq!(
            ScanConfig::default().with_workers(0).validate(),
            Err(ConfigError::ZeroWorkers)
        );
        assert_eq!(
            ScanConfig::default().with_notify_every(0).validate(),
            Err(ConfigError::ZeroNotifyEvery)
        );
        assert_eq!(
            ScanConfig::default()
                .with_poll_interval(Duration::ZERO)
                .validate(),
            Err(ConfigError::ZeroPollInterval)
        );
    }
}
