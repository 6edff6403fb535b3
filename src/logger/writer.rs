//! Log writer
//!
//! Thread-safe writing to stdout/stderr or appended log files. Initialized
//! once at startup; before that, messages fall through to the console.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Where a log stream goes.
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn from_path(path: Option<&str>, console: Self) -> io::Result<Self> {
        match path {
            Some(p) => Ok(Self::File(Mutex::new(open_append(p)?))),
            None => Ok(console),
        }
    }

    fn write_line(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

/// The process-wide pair of access and error streams.
pub struct LogWriter {
    access: LogTarget,
    error: LogTarget,
}

impl LogWriter {
    pub fn write_access(&self, message: &str) {
        self.access.write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        self.error.write_line(message);
    }
}

/// Open a log file for appending, creating parent directories as needed.
fn open_append(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Initialize the global writer. Call once at startup; a second call fails.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter {
        access: LogTarget::from_path(access_log_file, LogTarget::Stdout)?,
        error: LogTarget::from_path(error_log_file, LogTarget::Stderr)?,
    };
    LOG_WRITER
        .set(writer)
        .map_err(|_| io::Error::new(io::ErrorKind::AlreadyExists, "log writer already initialized"))
}

pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_append_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/nested/access.log");
        let mut file = open_append(path.to_str().unwrap()).unwrap();
        writeln!(file, "line").unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_file_target_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let target =
            LogTarget::from_path(Some(path.to_str().unwrap()), LogTarget::Stdout).unwrap();
        target.write_line("first");
        target.write_line("second");
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "first\nsecond\n");
    }
}
