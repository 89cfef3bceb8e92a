//! Layouts that turn a [`LogRecord`] into one line of output.
//!
//! A formatter never appends the trailing newline; the destination does.

use crate::record::LogRecord;

pub mod json;
#[cfg(feature = "stackdriver")]
pub mod stackdriver;
pub mod text;

pub use json::JsonFormatter;
#[cfg(feature = "stackdriver")]
pub use stackdriver::StackdriverFormatter;
pub use text::TextFormatter;

/// Renders records for a destination.
pub trait Formatter: Send + Sync {
    /// Render `record` as a single entry without a trailing newline.
    ///
    /// **Parameters**
    /// - `record`: the event to render.
    /// - `ansi`: whether the destination accepts ANSI color codes. Layouts
    ///   that have no notion of color ignore it.
    fn format(&self, record: &LogRecord, ansi: bool) -> Result<String, FormatError>;
}

/// Layout selected for the primary output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatKind {
    /// Human-readable, optionally colored lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
    /// Google Cloud structured logging envelope.
    Stackdriver,
}

impl FormatKind {
    /// Map the value of `JX_LOG_FORMAT`; anything unrecognised means text.
    pub fn from_env_value(value: &str) -> Self {
        match value {
            "json" => FormatKind::Json,
            "stackdriver" => FormatKind::Stackdriver,
            _ => FormatKind::Text,
        }
    }
}

/// Error returned when a record cannot be encoded.
#[derive(thiserror::Error, Debug)]
pub enum FormatError {
    #[error("failed to encode log record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_kind_from_env_value() {
        assert_eq!(FormatKind::from_env_value("json"), FormatKind::Json);
        assert_eq!(FormatKind::from_env_value("stackdriver"), FormatKind::Stackdriver);
        assert_eq!(FormatKind::from_env_value("text"), FormatKind::Text);
        assert_eq!(FormatKind::from_env_value("JSON"), FormatKind::Text);
        assert_eq!(FormatKind::from_env_value(""), FormatKind::Text);
    }
}
