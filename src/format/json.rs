use super::{FormatError, Formatter};
use crate::record::LogRecord;
use chrono::SecondsFormat;
use serde_json::{Map, Value};

/// Keys owned by the layout itself; colliding fields move to `fields.<key>`.
const RESERVED_KEYS: [&str; 3] = ["level", "msg", "time"];

/// One JSON object per record with `level`, `msg`, `time` and every field.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        JsonFormatter
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord, _ansi: bool) -> Result<String, FormatError> {
        let mut object = Map::new();

        for (key, value) in &record.fields {
            let key = if RESERVED_KEYS.contains(&key.as_str()) {
                format!("fields.{}", key)
            } else {
                key.clone()
            };
            object.insert(key, value.clone());
        }

        object.insert("level".to_string(), Value::from(record.level.as_str()));
        object.insert("msg".to_string(), Value::from(record.message.as_str()));
        object.insert(
            "time".to_string(),
            Value::from(record.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );

        Ok(serde_json::to_string(&object)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn renders_a_single_object() {
        let record = LogRecord::new(Level::Info, "hello", BTreeMap::new());
        let line = JsonFormatter.format(&record, true).unwrap();

        assert!(line.starts_with('{'));
        assert!(line.ends_with('}'));
        assert!(!line.contains('\n'));
        assert!(line.contains(r#""level":"info""#));
        assert!(line.contains(r#""msg":"hello""#));
    }

    #[test]
    fn colliding_fields_are_prefixed() {
        let mut fields = BTreeMap::new();
        fields.insert("msg".to_string(), json!("shadow"));
        fields.insert("request_id".to_string(), json!("abc"));
        let record = LogRecord::new(Level::Warning, "real", fields);

        let parsed: Value = serde_json::from_str(&JsonFormatter.format(&record, false).unwrap()).unwrap();
        assert_eq!(parsed["msg"], "real");
        assert_eq!(parsed["fields.msg"], "shadow");
        assert_eq!(parsed["request_id"], "abc");
        assert_eq!(parsed["level"], "warning");
    }

    #[test]
    fn escapes_newlines_in_message() {
        let record = LogRecord::new(Level::Error, "a\nb", BTreeMap::new());
        let line = JsonFormatter.format(&record, false).unwrap();
        assert!(line.contains(r#""msg":"a\nb""#));
    }
}
