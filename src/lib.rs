//! Logging facade configured from `JX_LOG_*` environment variables.
//!
//! Records are rendered as colored text, JSON or a stackdriver envelope on
//! the primary output, and can additionally be appended to a JSON file.
//!
//! ```no_run
//! use jx_logging::logger;
//!
//! logger().info("starting");
//! logger().with_field("repo", "jx").warn("pipeline is slow");
//! ```

pub mod config;
pub mod env;
pub mod format;
pub mod global;
pub mod hook;
pub mod init;
pub mod layer;
pub mod level;
pub mod logger;
pub mod output;
pub mod record;

pub use config::{Config, ConfigError};
pub use format::{FormatKind, Formatter};
pub use global::{capture_output, get_level, get_levels, handle, logger, reconfigure, set_level};
pub use hook::{FileHook, Hook, HookError};
pub use level::{InvalidLevel, Level};
pub use logger::{Entry, Logger};
pub use output::Output;
pub use record::LogRecord;
