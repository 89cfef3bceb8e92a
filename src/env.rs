//! Environment variable names read when configuration is applied.
//!
//! Variables are read once per application of [`crate::config::Config`];
//! they are never watched for changes.

/// Output layout: `json`, `stackdriver`, anything else means text.
pub const JX_LOG_FORMAT: &str = "JX_LOG_FORMAT";

/// Minimum level, one of the names in [`crate::level::ALL_LEVELS`].
pub const JX_LOG_LEVEL: &str = "JX_LOG_LEVEL";

/// Path of a file that additionally receives every record as JSON.
pub const JX_LOG_FILE: &str = "JX_LOG_FILE";

/// Service name reported by the stackdriver layout.
pub const JX_LOG_SERVICE: &str = "JX_LOG_SERVICE";

/// Service version reported by the stackdriver layout.
pub const JX_LOG_SERVICE_VERSION: &str = "JX_LOG_SERVICE_VERSION";

/// Comma-separated stack frame patterns dropped by the stackdriver layout.
pub const JX_LOG_STACK_SKIP: &str = "JX_LOG_STACK_SKIP";

/// Read an environment variable, treating unset and empty alike.
pub fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
