//! Rolling File Logger
//!
//! Installs a `tracing` subscriber that writes to `<log_dir>/<app>.log`,
//! rotating the file once it grows past a size limit. Records emitted through
//! the `log` facade are bridged into the same subscriber.
//!
//! The most recent lines are also kept in a circular buffer so a host
//! application can show them without reading the files back.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::fmt::MakeWriter;

/// Logger tuning knobs
#[derive(Debug, Clone)]
pub struct LoggerOptions {
    /// Rotate once the active file would exceed this many bytes
    pub max_bytes: u64,
    /// Number of files kept, including the active one
    pub max_files: usize,
    /// Lines kept in the in-memory circular buffer
    pub buffer_lines: usize,
    pub level: Level,
}

impl Default for LoggerOptions {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            max_files: 3,
            buffer_lines: 500,
            level: Level::INFO,
        }
    }
}

static LOGGER: OnceLock<RollingWriter> = OnceLock::new();

/// Local wall-clock timestamps with millisecond precision
struct LocalTime;

impl FormatTime for LocalTime {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
    }
}

struct RollingFile {
    dir: PathBuf,
    app_name: String,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    fn open(dir: &Path, app_name: &str, max_bytes: u64, max_files: usize) -> io::Result<Self> {
        let path = file_path(dir, app_name, 0);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            dir: dir.to_path_buf(),
            app_name: app_name.to_string(),
            max_bytes,
            max_files: max_files.max(1),
            file,
            written,
        })
    }

    /// Shift `<app>.log.N-1` -> `<app>.log.N`, dropping the oldest file
    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        let oldest = file_path(&self.dir, &self.app_name, self.max_files - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for index in (0..self.max_files - 1).rev() {
            let from = file_path(&self.dir, &self.app_name, index);
            if from.exists() {
                fs::rename(&from, file_path(&self.dir, &self.app_name, index + 1))?;
            }
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path(&self.dir, &self.app_name, 0))?;
        self.written = 0;
        Ok(())
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        self.file.write_all(buf)?;
        self.written += buf.len() as u64;
        Ok(())
    }
}

fn file_path(dir: &Path, app_name: &str, index: usize) -> PathBuf {
    if index == 0 {
        dir.join(format!("{}.log", app_name))
    } else {
        dir.join(format!("{}.log.{}", app_name, index))
    }
}

struct Shared {
    file: Mutex<RollingFile>,
    recent: Mutex<VecDeque<String>>,
    buffer_lines: usize,
}

/// Writer handed to the fmt layer; cheap to clone
#[derive(Clone)]
pub struct RollingWriter {
    shared: Arc<Shared>,
}

impl RollingWriter {
    pub fn new(log_dir: &Path, app_name: &str, options: &LoggerOptions) -> io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        let file = RollingFile::open(log_dir, app_name, options.max_bytes, options.max_files)?;
        Ok(Self {
            shared: Arc::new(Shared {
                file: Mutex::new(file),
                recent: Mutex::new(VecDeque::with_capacity(options.buffer_lines)),
                buffer_lines: options.buffer_lines,
            }),
        })
    }

    /// Most recent lines, oldest first
    pub fn recent_lines(&self, limit: usize) -> Vec<String> {
        let recent = match self.shared.recent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let skip = recent.len().saturating_sub(limit);
        recent.iter().skip(skip).cloned().collect()
    }

    fn remember(&self, buf: &[u8]) {
        if self.shared.buffer_lines == 0 {
            return;
        }
        let mut recent = match self.shared.recent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for line in String::from_utf8_lossy(buf).lines() {
            if line.is_empty() {
                continue;
            }
            if recent.len() == self.shared.buffer_lines {
                recent.pop_front();
            }
            recent.push_back(line.to_string());
        }
    }
}

impl Write for RollingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        {
            let mut file = self
                .shared
                .file
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
            file.write_all(buf)?;
        }
        self.remember(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .shared
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        file.file.flush()
    }
}

impl<'a> MakeWriter<'a> for RollingWriter {
    type Writer = RollingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Initialize the global logger with default options
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    init_logger_with(log_dir, app_name, LoggerOptions::default())
}

/// Initialize the global logger. Fails if a subscriber is already installed.
pub fn init_logger_with(log_dir: PathBuf, app_name: &str, options: LoggerOptions) -> Result<(), String> {
    let writer = RollingWriter::new(&log_dir, app_name, &options)
        .map_err(|e| format!("Failed to open log file in {}: {}", log_dir.display(), e))?;

    tracing_subscriber::fmt()
        .with_writer(writer.clone())
        .with_ansi(false)
        .with_timer(LocalTime)
        .with_target(true)
        .with_max_level(options.level)
        .try_init()
        .map_err(|e| format!("Failed to install logger: {}", e))?;

    LOGGER
        .set(writer)
        .map_err(|_| "Logger already initialized".to_string())?;

    tracing::info!(target: "rolling_logger", app = app_name, dir = %log_dir.display(), "logger initialized");
    Ok(())
}

fn ensure_initialized() -> Result<(), String> {
    LOGGER
        .get()
        .map(|_| ())
        .ok_or_else(|| "Logger not initialized".to_string())
}

pub fn info(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::info!("{}", msg);
    Ok(())
}

pub fn warn(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::warn!("{}", msg);
    Ok(())
}

pub fn error(msg: &str) -> Result<(), String> {
    ensure_initialized()?;
    tracing::error!("{}", msg);
    Ok(())
}

/// Recent lines from the global logger's buffer (empty before init)
pub fn recent_lines(limit: usize) -> Vec<String> {
    LOGGER
        .get()
        .map(|writer| writer.recent_lines(limit))
        .unwrap_or_default()
}
