//! FolderTally Core: concurrent folder counting engine.
//!
//! This crate contains all scanning logic with zero UI dependencies.
//! Frontends (the bundled CLI, or any GUI/event loop) drive it through
//! [`ScanEngine`] and receive notifications through a [`Dispatch`]
//! implementation of their choosing.
//!
//! # Modules
//!
//! - [`scanner`]: Worker pool, shared work queue and scan lifecycle.
//! - [`dispatch`]: Caller-supplied delivery of progress/finished events.
//! - [`config`]: Pool size, progress batch size and poll interval.
//! - [`error`]: Per-folder and configuration error types.
//! - [`format`]: Display helpers for counts and rates.
pub mod config;
pub mod dispatch;
pub mod error;
pub mod format;
pub mod scanner;

pub use config::ScanConfig;
pub use dispatch::{event_channel, pump_events, Dispatch, DispatchFn, Pumped, ScanObserver};
pub use error::{ConfigError, FolderError};
pub use scanner::progress::{ProgressSnapshot, ScanEvent, ScanSummary};
pub use scanner::ScanEngine;
