#![deny(missing_docs)]
//! Shared logging utilities for the viewR page client.
//!
//! This crate provides the `viewr_*` logging macros used across the workspace,
//! level parsing for configuration files and a minimal test initializer for
//! the global logger.

use log::LevelFilter;

/// Log target used by every `viewr_*` macro.
pub const TARGET: &str = "viewr";

/// Logs a trace-level message under the `viewr` target.
#[macro_export]
macro_rules! viewr_trace {
    ($($arg:tt)*) => {{
        log::trace!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a debug-level message under the `viewr` target.
#[macro_export]
macro_rules! viewr_debug {
    ($($arg:tt)*) => {{
        log::debug!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an info-level message under the `viewr` target.
#[macro_export]
macro_rules! viewr_info {
    ($($arg:tt)*) => {{
        log::info!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs a warn-level message under the `viewr` target.
#[macro_export]
macro_rules! viewr_warn {
    ($($arg:tt)*) => {{
        log::warn!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Logs an error-level message under the `viewr` target.
#[macro_export]
macro_rules! viewr_error {
    ($($arg:tt)*) => {{
        log::error!(target: $crate::TARGET, $($arg)*);
    }};
}

/// Parses a level name as written in configuration files.
///
/// Accepts `off`, `error`, `warn`, `info`, `debug` and `trace`, ignoring case
/// and surrounding whitespace.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    match name.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Initializes a simple terminal logger for use in tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
