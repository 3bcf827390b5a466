//! Terminal reporting and log files
//!
//! A `Console` is built once in `main` from the global CLI flags and passed by reference to
//! every workflow. Terminal output is styled with `colored`. Every message is also emitted as a
//! `tracing` event, so with `--log` the subscriber from [`file_subscriber`] appends it to
//! `message_log.txt`, and errors additionally to `error_log.txt`.

use chrono::Local;
use colored::Colorize;
use std::fmt::Write as _;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Subscriber;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Layer;

/// Application directory name under the user data directory
const APP_DIR_NAME: &str = "projenv";

/// Receives every message
pub const MESSAGE_LOG: &str = "message_log.txt";

/// Receives errors only
pub const ERROR_LOG: &str = "error_log.txt";

/// Local wall-clock timestamps with millisecond precision
struct LocalTimestamp;

impl FormatTime for LocalTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

fn open_log(path: &Path) -> io::Result<Mutex<File>> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Mutex::new)
}

/// Build a subscriber writing every event to `message_log.txt` and errors to `error_log.txt`
pub fn file_subscriber(log_dir: &Path) -> io::Result<impl Subscriber + Send + Sync> {
    fs::create_dir_all(log_dir)?;

    let messages = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_timer(LocalTimestamp)
        .with_writer(open_log(&log_dir.join(MESSAGE_LOG))?)
        .with_filter(LevelFilter::INFO);

    let errors = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_timer(LocalTimestamp)
        .with_writer(open_log(&log_dir.join(ERROR_LOG))?)
        .with_filter(LevelFilter::ERROR);

    Ok(tracing_subscriber::registry().with(messages).with(errors))
}

/// Default log directory: `<user data dir>/projenv/logs`
pub fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR_NAME).join("logs"))
}

/// Reporting context for a single CLI invocation
#[derive(Debug, Clone, Default)]
pub struct Console {
    verbose: bool,
    quiet: bool,
}

impl Console {
    /// Create a console with the given terminal verbosity
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    /// Create a console that prints nothing to the terminal
    pub fn silent() -> Self {
        Self::new(false, true)
    }

    /// Whether verbose detail is shown
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Whether terminal output is suppressed
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Detail shown only in verbose mode
    pub fn info(&self, message: &str) {
        tracing::info!("{}", message);
        if self.verbose && !self.quiet {
            eprintln!("{}", message.dimmed());
        }
    }

    /// Completed step
    pub fn success(&self, message: &str) {
        tracing::info!("{}", message);
        if !self.quiet {
            println!("{}", message.green());
        }
    }

    /// Skipped or degraded step
    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", message);
        if !self.quiet {
            eprintln!("{}", message.yellow());
        }
    }

    /// Failure, printed even in quiet mode
    pub fn error(&self, message: &str) {
        tracing::error!("{}", message);
        eprintln!("{}", message.red());
    }
}
