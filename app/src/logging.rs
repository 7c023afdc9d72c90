//! FILENAME: app/src/logging.rs
// PURPOSE: Unified logging for the command shell.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;

// ============================================================================
// UNIFIED LOGGING SYSTEM
// ============================================================================

/// Global sequence counter; every emitted line takes the next value.
static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

/// Global log file handle. `None` means stderr only.
pub static LOG_FILE: Lazy<Mutex<Option<File>>> = Lazy::new(|| Mutex::new(None));

static LOGGER: UnifiedLogger = UnifiedLogger;

/// Get next sequence number
pub fn next_seq() -> u64 {
    LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1
}

/// Opens (and truncates) the log file that subsequent lines are appended to.
pub fn init_log_file(path: &Path) -> io::Result<()> {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;

    let mut guard = LOG_FILE
        .lock()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Lock error: {}", e)))?;
    *guard = Some(file);
    Ok(())
}

/// Installs the unified logger as the `log` backend.
pub fn init(level: LevelFilter, log_file: Option<&Path>) -> anyhow::Result<()> {
    if let Some(path) = log_file {
        init_log_file(path)?;
    }
    log::set_logger(&LOGGER).map_err(|e| anyhow::anyhow!("Logger already installed: {}", e))?;
    log::set_max_level(level);
    Ok(())
}

/// Formats one line: `seq|LEVEL|CATEGORY|message`.
pub fn format_line(seq: u64, level: &str, category: &str, message: &str) -> String {
    format!("{}|{}|{}|{}", seq, level, category, message)
}

/// Write a log line in unified format
pub fn write_log(level: &str, category: &str, message: &str) {
    let line = format_line(next_seq(), level, category, message);

    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(ref mut file) = *guard {
            if let Err(e) = writeln!(file, "{}", line) {
                eprintln!("[LOG_ERROR] Failed to write: {}", e);
            }
            let _ = file.flush();
        }
    }

    eprintln!("{}", line);
}

/// One-letter level code used in the LEVEL column.
pub fn level_code(level: Level) -> &'static str {
    match level {
        Level::Error => "E",
        Level::Warn => "W",
        Level::Info => "I",
        Level::Debug => "D",
        Level::Trace => "T",
    }
}

/// Category column: the last path segment of the log target, uppercased.
/// `engine::sheet` becomes `SHEET`.
pub fn category(target: &str) -> String {
    target
        .rsplit("::")
        .next()
        .unwrap_or(target)
        .to_ascii_uppercase()
}

struct UnifiedLogger;

impl Log for UnifiedLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        write_log(
            level_code(record.level()),
            &category(record.target()),
            &record.args().to_string(),
        );
    }

    fn flush(&self) {
        if let Ok(mut guard) = LOG_FILE.lock() {
            if let Some(ref mut file) = *guard {
                let _ = file.flush();
            }
        }
    }
}

// ============================================================================
// ENTER/EXIT MACROS
// ============================================================================

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        log::debug!(target: $cat, "ENTER {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        log::debug!(target: $cat, "ENTER {} {}", $func, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        log::debug!(target: $cat, "EXIT {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        log::debug!(target: $cat, "EXIT {} {}", $func, format!($($arg)*))
    };
}

pub use log_enter;
pub use log_exit;
