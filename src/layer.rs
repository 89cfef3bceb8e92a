use crate::level::Level;
use crate::logger::Logger;
use crate::record::LogRecord;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that forwards events to a [`Logger`].
///
/// Each event becomes a [`LogRecord`] carrying the event's fields and
/// source location, so `tracing::warn!(repo = "jx", "slow")` is rendered by
/// whichever layout the logger currently uses and reaches its hooks. The
/// level threshold is the logger's, checked per event, so it follows
/// later calls to [`Logger::set_level`].
pub struct LoggerLayer {
    logger: Arc<Logger>,
}

impl LoggerLayer {
    pub fn new(logger: Arc<Logger>) -> Self {
        LoggerLayer { logger }
    }

    /// Layer forwarding to the process logger.
    pub fn global() -> Self {
        Self::new(crate::global::handle())
    }
}

impl<S> Layer<S> for LoggerLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let level = Level::from(meta.level());
        if !self.logger.is_enabled(level) {
            return;
        }

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;

        let mut visitor = FieldVisitor { fields: &mut fields, message: &mut message };
        event.record(&mut visitor);

        let record = LogRecord {
            timestamp: Utc::now(),
            level,
            message: message.unwrap_or_default(),
            fields,
            target: Some(meta.target().to_string()),
            module_path: meta.module_path().map(|s| s.to_string()),
            file: meta.file().map(|s| s.to_string()),
            line: meta.line(),
        };

        self.logger.dispatch(&record);
    }
}

/// Collects event fields, splitting off the `message` field.
pub struct FieldVisitor<'a> {
    pub fields: &'a mut BTreeMap<String, serde_json::Value>,
    pub message: &'a mut Option<String>,
}

impl<'a> Visit for FieldVisitor<'a> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), serde_json::Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.fields.insert(field.name().to_string(), serde_json::Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        // `format_args!` messages arrive here; their Debug output is the text.
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), serde_json::Value::String(format!("{:?}", value)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::JsonFormatter;
    use crate::output::Output;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn capture<F: FnOnce()>(logger: &Arc<Logger>, f: F) -> String {
        let subscriber = Registry::default().with(LoggerLayer::new(Arc::clone(logger)));
        logger.capture_output(|| tracing::subscriber::with_default(subscriber, f))
    }

    fn quiet_logger() -> Arc<Logger> {
        Arc::new(Logger::with_output(Output::new(std::io::sink(), false)))
    }

    #[test]
    fn events_are_rendered_by_the_logger() {
        let logger = quiet_logger();

        let out = capture(&logger, || {
            tracing::debug!("hidden");
            tracing::info!("hello");
            tracing::warn!(user_id = 42, reason = "bad password", "login failed");
        });

        assert_eq!(
            out,
            "hello\nWARNING: login failed reason=\"bad password\" user_id=42\n"
        );
    }

    #[test]
    fn threshold_changes_apply_to_later_events() {
        let logger = quiet_logger();
        logger.set_level("debug").unwrap();

        let out = capture(&logger, || tracing::debug!(attempt = 2, "retrying"));
        assert_eq!(out, "DEBUG: retrying attempt=2\n");
    }

    #[test]
    fn field_types_survive_json_layout() {
        let logger = quiet_logger();
        logger.set_formatter(Box::new(JsonFormatter));

        let out = capture(&logger, || tracing::error!(ok = true, ratio = 0.5, "boom"));
        let parsed: serde_json::Value = serde_json::from_str(out.trim_end()).unwrap();

        assert_eq!(parsed["level"], "error");
        assert_eq!(parsed["msg"], "boom");
        assert_eq!(parsed["ok"], true);
        assert_eq!(parsed["ratio"], 0.5);
    }
}
