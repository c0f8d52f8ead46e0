//
// Copyright (c) The yang-schema Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Diagnostics.

use std::sync::OnceLock;

use log::{Level, LevelFilter};

/// Log target used for every diagnostic emitted by this crate.
pub const LOG_TARGET: &str = "yang-schema";

static LOG_CALLBACK: OnceLock<Box<dyn LogCallback>> = OnceLock::new();

/// A custom sink for schema diagnostics.
pub trait LogCallback: Send + Sync + 'static {
    fn log(&self, level: Level, msg: &str, location: Option<&str>);
}

/// Set the log level to [`LevelFilter::Trace`].
pub(crate) fn set_log_level_trace() {
    log::set_max_level(LevelFilter::Trace);
}

/// Set the log level to [`LevelFilter::Debug`].
pub(crate) fn set_log_level_debug() {
    log::set_max_level(LevelFilter::Debug);
}

/// Set the log level to [`LevelFilter::Warn`].
pub(crate) fn set_log_level_warn() {
    log::set_max_level(LevelFilter::Warn);
}

/// Set the log level to [`LevelFilter::Error`].
pub(crate) fn set_log_level_error() {
    log::set_max_level(LevelFilter::Error);
}

/// An error returned when the logging callback has already been initialized.
#[derive(Debug)]
pub struct LoggingCallbackAlreadySet {
    _private: (),
}

impl std::fmt::Display for LoggingCallbackAlreadySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Logging callback already set")
    }
}

impl std::error::Error for LoggingCallbackAlreadySet {}

/// Initialize the logging callback.
///
/// The callback can only be initialized once.
pub(crate) fn init_logger<C>(
    callback: C,
) -> Result<(), LoggingCallbackAlreadySet>
where
    C: LogCallback,
{
    LOG_CALLBACK
        .set(Box::new(callback))
        .map_err(|_| LoggingCallbackAlreadySet { _private: () })
}

/// Emit one diagnostic, optionally tagged with a source location.
pub(crate) fn emit(level: Level, location: Option<&str>, msg: &str) {
    match LOG_CALLBACK.get() {
        Some(cb) => cb.log(level, msg, location),
        None => DefaultLogger::default().log(level, msg, location),
    }
}

/// A logger that forwards schema diagnostics to the `log` crate.
#[derive(Debug, Default)]
pub struct DefaultLogger {
    _private: (),
}

impl LogCallback for DefaultLogger {
    fn log(&self, level: Level, msg: &str, location: Option<&str>) {
        match location {
            Some(location) => log::log! {
                target: LOG_TARGET,
                level,
                "{location}: {msg}",
            },
            None => log::log! {
                target: LOG_TARGET,
                level,
                "{msg}",
            },
        }
    }
}
