//! Logger module
//!
//! Server lifecycle, error and access logging. Output goes to
//! stdout/stderr until [`init`] points it at the configured files.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize logging from the configuration. Call once at startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Server started");
    write_info(&format!("Listening on: http://{addr}"));
    let mode = if config.server_multithreaded {
        "multithreaded (task per connection)"
    } else {
        "serial (one connection at a time)"
    };
    write_info(&format!("Concurrency: {mode}"));
    write_info(&format!(
        "Static: {} -> {}",
        config.static_url_prefix,
        config.static_folder.display()
    ));
    if let Some(ref path) = config.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_shutdown() {
    write_info("\nShutdown signal received, stopping accept loop");
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

/// Emit a formatted access log entry.
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    match writer::get() {
        Some(w) => w.write_access(&entry.format(format)),
        None => println!("{}", entry.format(format)),
    }
}
