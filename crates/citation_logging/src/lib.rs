#![deny(missing_docs)]
//! Shared logging utilities for the citation workspace.
//!
//! This crate provides the `cite_*` logging macros used by the store, the
//! enrichment engine and the binary, plus a one-shot logger initializer for
//! tests. Callers must depend on `log` themselves since the macros expand to
//! `log::*!` invocations.

use std::sync::Once;

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! cite_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! cite_debug {
    ($($arg:tt)*) => {{
        log::debug!($($arg)*);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! cite_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! cite_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! cite_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

static TEST_LOGGER: Once = Once::new();

/// Initializes a terminal logger for unit and integration tests.
///
/// Safe to call from every test: only the first call installs a logger, and
/// an already-installed logger from elsewhere is left in place.
pub fn initialize_for_tests() {
    TEST_LOGGER.call_once(|| {
        use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

        // Debug builds get debug output, release test runs stay at info.
        let level = if cfg!(debug_assertions) {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };

        let _ = CombinedLogger::init(vec![TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        )]);
    });
}
