// src/logging.rs

//! Logging setup with server-style formatting.
//!
//! Components log through the `log` facade. This module installs an
//! `env_logger` backend whose lines look like
//! `[2026-10-19 12:00:00] [INFO] message` and go to the configured log file,
//! to stdout, or both. Write failures are swallowed: a full disk must not
//! turn a successful scan into a failed one.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use log::LevelFilter;

use crate::models::LoggingConfig;

/// Log line destination: optional append-mode file plus optional stdout.
pub struct LogSink {
    file: Option<File>,
    echo: bool,
}

impl LogSink {
    /// Build the sink described by `config`.
    ///
    /// An unopenable log file is reported on stderr and skipped.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let file = if config.enabled {
            match open_log_file(&config.file) {
                Ok(file) => Some(file),
                Err(e) => {
                    eprintln!(
                        "Warning: cannot open log file {}: {e}",
                        config.file.display()
                    );
                    None
                }
            }
        } else {
            None
        };

        Self {
            file,
            echo: config.echo,
        }
    }

    pub fn is_silent(&self) -> bool {
        self.file.is_none() && !self.echo
    }
}

impl Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = self.file.as_mut() {
            let _ = file.write_all(buf);
        }
        if self.echo {
            let _ = io::stdout().write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
        if self.echo {
            let _ = io::stdout().flush();
        }
        Ok(())
    }
}

/// Open `path` for appending, creating parent directories.
pub fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Format one log line (without trailing newline).
pub fn format_line(level: log::Level, message: &std::fmt::Arguments<'_>) -> String {
    let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!("[{timestamp}] [{level}] {message}")
}

/// Resolve the effective level: `verbose` forces debug, otherwise the
/// configured level, falling back to info.
pub fn level_filter(config: &LoggingConfig, verbose: bool) -> LevelFilter {
    if verbose {
        return LevelFilter::Debug;
    }
    config.level.parse().unwrap_or(LevelFilter::Info)
}

/// Initialize the global logger. `RUST_LOG` overrides the configured level.
///
/// Returns `false` if a logger was already installed.
pub fn init(config: &LoggingConfig, verbose: bool) -> bool {
    let level = level_filter(config, verbose);
    let sink = LogSink::from_config(config);
    let level = if sink.is_silent() {
        LevelFilter::Off
    } else {
        level
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(level.as_str().to_lowercase()),
    )
    .format(|buf, record| writeln!(buf, "{}", format_line(record.level(), record.args())))
    .target(env_logger::Target::Pipe(Box::new(sink)))
    .try_init()
    .is_ok()
}
