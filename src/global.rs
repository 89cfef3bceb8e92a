//! Process-wide logger configured from `JX_LOG_*` on first use.
//!
//! Code that can thread a [`Logger`] through its call sites should do so;
//! this module exists for the many call sites that cannot.

use crate::config::{Config, ConfigError};
use crate::level::{InvalidLevel, Level};
use crate::logger::Logger;
use std::sync::{Arc, OnceLock};

static LOGGER: OnceLock<Arc<Logger>> = OnceLock::new();

fn shared() -> &'static Arc<Logger> {
    let logger = LOGGER.get_or_init(|| Arc::new(Logger::new()));
    if !logger.is_configured() {
        if let Err(e) = logger.apply(&Config::from_env()) {
            logger.warn(format!("error initializing logger: {}", e));
        }
    }
    logger
}

/// The process logger, configured from the environment on first access.
///
/// A failed configuration (an invalid `JX_LOG_LEVEL`) is reported as a
/// warning and leaves the defaults in place; the environment is read again
/// on every access until an apply succeeds.
pub fn logger() -> &'static Logger {
    shared()
}

/// Shared handle to the process logger, e.g. for [`crate::layer::LoggerLayer`].
pub fn handle() -> Arc<Logger> {
    Arc::clone(shared())
}

/// Re-read the environment and apply it to the process logger.
pub fn reconfigure() -> Result<(), ConfigError> {
    logger().apply(&Config::from_env())
}

pub fn set_level(name: &str) -> Result<(), InvalidLevel> {
    logger().set_level(name)
}

pub fn get_level() -> &'static str {
    logger().level().as_str()
}

/// All level names, most severe first.
pub fn get_levels() -> Vec<&'static str> {
    Level::names()
}

/// Capture everything the process logger writes while `f` runs.
pub fn capture_output<F: FnOnce()>(f: F) -> String {
    logger().capture_output(f)
}
