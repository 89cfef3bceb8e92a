use super::{FormatError, Formatter};
use crate::level::Level;
use crate::record::LogRecord;
use chrono::SecondsFormat;
use serde::Serialize;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::collections::BTreeMap;

/// Frames from the logging machinery itself never belong in a report.
const BUILTIN_STACK_SKIP: [&str; 5] = [
    "std::backtrace",
    "jx_logging::",
    "tracing::",
    "tracing_core::",
    "tracing_subscriber::",
];

/// Google Cloud structured logging layout.
///
/// Produces the envelope understood by Cloud Logging and Error Reporting:
/// `severity`, `message`, an always-present `context` object and, when
/// configured, a `serviceContext`. Records at `error` and above carry a
/// filtered `stackTrace` and a `reportLocation` when the source is known.
#[derive(Debug, Clone, Default)]
pub struct StackdriverFormatter {
    service: Option<String>,
    version: Option<String>,
    stack_skip: Vec<String>,
}

impl StackdriverFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Exclude stack frames containing `pattern` from attached traces.
    pub fn with_stack_skip(mut self, pattern: impl Into<String>) -> Self {
        self.stack_skip.push(pattern.into());
        self
    }

    fn service_context(&self) -> Option<ServiceContext<'_>> {
        if self.service.is_none() && self.version.is_none() {
            return None;
        }
        Some(ServiceContext {
            service: self.service.as_deref(),
            version: self.version.as_deref(),
        })
    }

    fn is_skipped(&self, frame: &str) -> bool {
        BUILTIN_STACK_SKIP.iter().any(|p| frame.contains(p))
            || self.stack_skip.iter().any(|p| frame.contains(p.as_str()))
    }

    fn stack_trace(&self) -> Option<String> {
        let backtrace = Backtrace::force_capture();
        if backtrace.status() != BacktraceStatus::Captured {
            return None;
        }
        self.filter_frames(&backtrace.to_string())
    }

    fn filter_frames(&self, rendered: &str) -> Option<String> {
        let kept: Vec<String> = split_frames(rendered)
            .into_iter()
            .filter(|frame| !self.is_skipped(frame))
            .collect();
        if kept.is_empty() {
            None
        } else {
            Some(kept.join("\n"))
        }
    }
}

impl Formatter for StackdriverFormatter {
    fn format(&self, record: &LogRecord, _ansi: bool) -> Result<String, FormatError> {
        let is_error = record.level >= Level::Error;
        let location = record.file.as_deref().map(|file| SourceLocation {
            file_path: file,
            line_number: record.line.unwrap_or_default(),
            function_name: record.module_path.as_deref(),
        });

        let entry = Entry {
            timestamp: record.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true),
            severity: severity(record.level),
            message: &record.message,
            service_context: self.service_context(),
            context: Context {
                data: &record.fields,
                report_location: if is_error { location.clone() } else { None },
            },
            source_location: location,
            stack_trace: if is_error { self.stack_trace() } else { None },
        };

        Ok(serde_json::to_string(&entry)?)
    }
}

/// Cloud Logging severity names.
fn severity(level: Level) -> &'static str {
    match level {
        Level::Trace | Level::Debug => "DEBUG",
        Level::Info => "INFO",
        Level::Warning => "WARNING",
        Level::Error => "ERROR",
        Level::Fatal => "CRITICAL",
        Level::Panic => "ALERT",
    }
}

/// Split a rendered backtrace into frames; a frame starts at a `N:` line.
fn split_frames(rendered: &str) -> Vec<String> {
    let mut frames = Vec::new();
    let mut current = String::new();

    for line in rendered.lines() {
        if starts_frame(line) && !current.is_empty() {
            frames.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        frames.push(current);
    }
    frames
}

fn starts_frame(line: &str) -> bool {
    let trimmed = line.trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    digits > 0 && trimmed[digits..].starts_with(':')
}

#[derive(Serialize)]
struct Entry<'a> {
    timestamp: String,
    severity: &'static str,
    message: &'a str,
    #[serde(rename = "serviceContext", skip_serializing_if = "Option::is_none")]
    service_context: Option<ServiceContext<'a>>,
    context: Context<'a>,
    #[serde(rename = "sourceLocation", skip_serializing_if = "Option::is_none")]
    source_location: Option<SourceLocation<'a>>,
    #[serde(rename = "stackTrace", skip_serializing_if = "Option::is_none")]
    stack_trace: Option<String>,
}

#[derive(Serialize)]
struct ServiceContext<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    service: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<&'a str>,
}

#[derive(Serialize)]
struct Context<'a> {
    #[serde(skip_serializing_if = "is_empty_map")]
    data: &'a BTreeMap<String, serde_json::Value>,
    #[serde(rename = "reportLocation", skip_serializing_if = "Option::is_none")]
    report_location: Option<SourceLocation<'a>>,
}

#[derive(Serialize, Clone)]
struct SourceLocation<'a> {
    #[serde(rename = "filePath")]
    file_path: &'a str,
    #[serde(rename = "lineNumber")]
    line_number: u32,
    #[serde(rename = "functionName", skip_serializing_if = "Option::is_none")]
    function_name: Option<&'a str>,
}

fn is_empty_map(map: &&BTreeMap<String, serde_json::Value>) -> bool {
    map.is_empty()
}
