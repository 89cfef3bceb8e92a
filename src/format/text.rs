use super::{FormatError, Formatter};
use crate::level::Level;
use crate::record::LogRecord;

/// Human-readable layout.
///
/// `info` records print the bare message. Every other level is prefixed
/// with its upper-cased name, e.g. `WARNING: disk almost full`. Fields
/// follow the message as `key=value` pairs in key order; values containing
/// whitespace are quoted. Multi-line messages are written verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextFormatter;

impl TextFormatter {
    pub fn new() -> Self {
        TextFormatter
    }
}

impl Formatter for TextFormatter {
    fn format(&self, record: &LogRecord, ansi: bool) -> Result<String, FormatError> {
        let mut line = String::with_capacity(record.message.len() + 16);

        if record.level != Level::Info {
            let label = record.level.as_str().to_ascii_uppercase();
            line.push_str(&paint(&label, record.level, ansi));
            line.push_str(": ");
        }
        line.push_str(&record.message);

        for (key, value) in &record.fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            push_value(&mut line, value);
        }

        Ok(line)
    }
}

fn push_value(line: &mut String, value: &serde_json::Value) {
    let text = match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.is_empty() || text.chars().any(char::is_whitespace) {
        line.push_str(&format!("{:?}", text));
    } else {
        line.push_str(&text);
    }
}

#[cfg(feature = "color")]
fn paint(label: &str, level: Level, ansi: bool) -> String {
    use colored::Color;

    if !ansi {
        return label.to_string();
    }
    let color = match level {
        Level::Warning => Color::Yellow,
        Level::Error | Level::Fatal | Level::Panic => Color::Red,
        Level::Trace | Level::Debug | Level::Info => Color::Cyan,
    };
    // Raw codes: `ansi` comes from the destination, not colored's stdout check.
    format!("\x1b[{}m{}\x1b[0m", color.to_fg_str(), label)
}

#[cfg(not(feature = "color"))]
fn paint(label: &str, _level: Level, _ansi: bool) -> String {
    label.to_string()
}
