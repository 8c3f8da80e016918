//! FolderTally: concurrent folder and file counter.
//!
//! Thin binary entry point. All scanning logic lives in `foldertally-core`;
//! this front end only supplies a root path, pumps notifications on the
//! main thread and prints them.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use foldertally_core::config::DEFAULT_NOTIFY_EVERY;
use foldertally_core::format::{format_count, format_rate};
use foldertally_core::{
    event_channel, pump_events, ProgressSnapshot, ScanConfig, ScanEngine, ScanObserver,
    ScanSummary,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// How often the main loop drains the event channel.
const PUMP_INTERVAL: Duration = Duration::from_millis(50);

/// Maximum notifications handled per pump.
const MAX_EVENTS_PER_PUMP: usize = 256;

#[derive(Parser, Debug)]
#[command(
    name = "foldertally",
    version,
    about = "Count folders and files under a directory using a pool of worker threads"
)]
struct Cli {
    /// Folder to scan
    path: PathBuf,

    /// Worker threads (default: half the CPUs, between 2 and 6)
    #[arg(short, long, env = "FOLDERTALLY_WORKERS")]
    workers: Option<usize>,

    /// Print a progress line every N finished folders
    #[arg(short = 'n', long, env = "FOLDERTALLY_NOTIFY_EVERY", default_value_t = DEFAULT_NOTIFY_EVERY)]
    notify_every: u64,

    /// Idle worker poll interval in milliseconds
    #[arg(long, env = "FOLDERTALLY_POLL_MS", default_value_t = 100)]
    poll_ms: u64,

    /// Request cancellation after this many milliseconds
    #[arg(long)]
    cancel_after_ms: Option<u64>,

    /// Print the final summary as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialise structured logging. Stdout is reserved for the summary.
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = ScanConfig {
        workers: cli.workers,
        notify_every: cli.notify_every,
        poll_interval: Duration::from_millis(cli.poll_ms),
    };

    let (tx, rx) = event_channel();
    let engine = ScanEngine::with_config(config, tx).context("invalid scan configuration")?;

    if !engine.start(&cli.path) {
        anyhow::bail!("nothing to scan: the folder path is blank");
    }

    let cancel_at = cli
        .cancel_after_ms
        .map(|ms| Instant::now() + Duration::from_millis(ms));
    let mut cancel_sent = false;
    let mut reporter = Reporter::default();

    loop {
        if let Some(at) = cancel_at {
            if !cancel_sent && Instant::now() >= at {
                tracing::info!("Cancel timer elapsed");
                engine.request_cancel();
                cancel_sent = true;
            }
        }

        if pump_events(&rx, &mut reporter, MAX_EVENTS_PER_PUMP).finished {
            break;
        }
        std::thread::sleep(PUMP_INTERVAL);
    }

    // Joins the worker threads.
    drop(engine);

    let summary = reporter
        .summary
        .context("scan ended without a summary")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("failed to encode summary")?
        );
    } else {
        print_summary(&cli.path, &summary);
    }

    Ok(if summary.canceled {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

/// Collects notifications on the main thread.
#[derive(Default)]
struct Reporter {
    summary: Option<ScanSummary>,
}

impl ScanObserver for Reporter {
    fn on_progress(&mut self, progress: &ProgressSnapshot) {
        eprintln!(
            "  {} folders, {} files, {} pending",
            format_count(progress.dir_count),
            format_count(progress.file_count),
            format_count(progress.pending_folders),
        );
    }

    fn on_finished(&mut self, summary: &ScanSummary) {
        self.summary = Some(summary.clone());
    }
}

fn print_summary(root: &std::path::Path, summary: &ScanSummary) {
    let status = if summary.canceled {
        "canceled"
    } else {
        "completed"
    };
    println!("{} ({status})", root.display());
    println!("  Folders: {}", format_count(summary.dir_count));
    println!("  Files:   {}", format_count(summary.file_count));
    println!(
        "  Elapsed: {:.2}s ({} folders)",
        summary.elapsed.as_secs_f64(),
        format_rate(summary.folders_per_second())
    );
    if summary.error_count > 0 {
        println!(
            "  Errors:  {} folder(s) could not be read",
            format_count(summary.error_count)
        );
    }
    if let Some(err) = &summary.last_error {
        println!("  Last error: {err}");
    }
}
