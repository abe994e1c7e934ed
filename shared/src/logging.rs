//! Shared logging utilities: tracing setup, rotating log files and per-run log paths

use crate::errors::{SharedError, SharedResult};
use chrono::{DateTime, Local};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info};

/// Default size threshold before a log file is rotated (10 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 10 * 1024 * 1024;

/// Default number of rotated files kept next to the active one
pub const DEFAULT_BACKUPS: usize = 5;

/// Locations of the two log files written by one dispatcher run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPaths {
    /// Operational trace (debug and above)
    pub operational: PathBuf,
    /// Success-only audit trail
    pub audit: PathBuf,
}

impl LogPaths {
    /// Build `<base>/<YYYY-MM-DD>/auto_assign_<HH-MM-SS>.log` and its audit sibling
    pub fn for_run(base_dir: impl AsRef<Path>, started_at: DateTime<Local>) -> Self {
        let day_dir = base_dir
            .as_ref()
            .join(started_at.format("%Y-%m-%d").to_string());
        let stamp = started_at.format("%H-%M-%S").to_string();

        Self {
            operational: day_dir.join(format!("auto_assign_{stamp}.log")),
            audit: day_dir.join(format!("auto_assign_success_{stamp}.log")),
        }
    }
}

/// Size-based rotating file writer.
///
/// When the next write would push the active file past `max_bytes`, the file is
/// shifted to `<name>.1`, older backups move up by one and anything beyond
/// `backups` is dropped.
#[derive(Debug)]
pub struct RotatingFileWriter {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    written: u64,
}

impl RotatingFileWriter {
    /// Open (or create) the log file in append mode, creating parent directories
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> SharedResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SharedError::LogFile {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let file = Self::open_append(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            path,
            max_bytes,
            backups,
            file,
            written,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_append(path: &Path) -> SharedResult<File> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| SharedError::LogFile {
                path: path.display().to_string(),
                source,
            })
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups == 0 {
            self.file = File::create(&self.path)?;
            self.written = 0;
            return Ok(());
        }

        let oldest = self.backup_path(self.backups);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (1..self.backups).rev() {
            let from = self.backup_path(index);
            if from.exists() {
                fs::rename(&from, self.backup_path(index + 1))?;
            }
        }
        fs::rename(&self.path, self.backup_path(1))?;

        self.file = File::create(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.max_bytes > 0 && self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn crate_filter(level: &str) -> String {
    format!("dispatcher={level},shared={level},reqwest=warn,hyper=warn")
}

/// Initialize the global tracing subscriber.
///
/// Stdout receives events at `log_level`; when `log_file` is given it receives
/// everything from debug up, without ANSI colouring.
pub fn init_tracing(log_level: Option<&str>, log_file: Option<RotatingFileWriter>) -> SharedResult<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let base_level = log_level.unwrap_or("info").trim().to_lowercase();
    if !LEVELS.contains(&base_level.as_str()) {
        return Err(SharedError::InvalidConfig {
            field: "log_level".to_string(),
            value: base_level,
        });
    }

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(EnvFilter::new(crate_filter(&base_level)));

    let file_layer = log_file.map(|writer| {
        fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(Mutex::new(writer))
            .with_filter(EnvFilter::new(crate_filter("debug")))
    });

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SharedError::LoggingInit {
            message: e.to_string(),
        })
}

/// Contextual logging helper for startup messages
pub fn log_startup(details: &str) {
    info!("🚀 Starting {}", details);
}

/// Contextual logging helper for shutdown messages
pub fn log_shutdown(reason: &str) {
    info!("🛑 Shutting down: {}", reason);
}

/// Contextual logging helper for error conditions
pub fn log_error(context: &str, error: &dyn std::fmt::Display) {
    error!(error = %error, "❌ {} failed: {}", context, error);
}

/// Contextual logging helper for success conditions
pub fn log_success(message: &str) {
    info!("✅ {}", message);
}
