use crate::level::Level;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A single log event as seen by formatters and hooks.
///
/// Fields are kept in a `BTreeMap` so every layout renders them in the same
/// order regardless of how they were attached.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
    pub fields: BTreeMap<String, serde_json::Value>,
    pub target: Option<String>,
    pub module_path: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl LogRecord {
    /// Build a record stamped with the current time and no source location.
    pub fn new(
        level: Level,
        message: impl Into<String>,
        fields: BTreeMap<String, serde_json::Value>,
    ) -> Self {
        LogRecord {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields,
            target: None,
            module_path: None,
            file: None,
            line: None,
        }
    }
}
