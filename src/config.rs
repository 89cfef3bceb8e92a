use crate::env::{
    env_non_empty, JX_LOG_FILE, JX_LOG_FORMAT, JX_LOG_LEVEL, JX_LOG_SERVICE,
    JX_LOG_SERVICE_VERSION, JX_LOG_STACK_SKIP,
};
use crate::format::{FormatKind, Formatter, JsonFormatter, TextFormatter};
use crate::hook::FileHook;
use crate::level::{InvalidLevel, Level};
use std::path::PathBuf;

/// Logger configuration resolved from the environment.
///
/// Built fresh every time configuration is applied; nothing here is
/// validated until [`crate::logger::Logger::apply`] runs, so an invalid
/// level surfaces as a [`ConfigError`] at that point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Layout of the primary output.
    pub format: FormatKind,
    /// Raw minimum level; `None` leaves the current level unchanged.
    pub level: Option<String>,
    /// File that additionally receives every record as JSON.
    pub file: Option<PathBuf>,
    /// Service name for the stackdriver layout.
    pub service: Option<String>,
    /// Service version for the stackdriver layout.
    pub service_version: Option<String>,
    /// Stack frame patterns dropped by the stackdriver layout.
    pub stack_skip: Vec<String>,
}

impl Config {
    /// Resolve from the process environment (`JX_LOG_*`).
    pub fn from_env() -> Self {
        Self::from_lookup(env_non_empty)
    }

    /// Resolve using `lookup` in place of the process environment.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Config {
            format: get(JX_LOG_FORMAT)
                .map(|value| FormatKind::from_env_value(&value))
                .unwrap_or_default(),
            level: get(JX_LOG_LEVEL),
            file: get(JX_LOG_FILE).map(PathBuf::from),
            service: get(JX_LOG_SERVICE),
            service_version: get(JX_LOG_SERVICE_VERSION),
            stack_skip: get(JX_LOG_STACK_SKIP)
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|pattern| !pattern.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Parse the configured level, if any.
    pub fn level(&self) -> Result<Option<Level>, ConfigError> {
        match &self.level {
            None => Ok(None),
            Some(value) => value
                .parse()
                .map(Some)
                .map_err(|source| ConfigError::Level {
                    value: value.clone(),
                    source,
                }),
        }
    }

    /// Build the formatter for the primary output.
    pub fn formatter(&self) -> Box<dyn Formatter> {
        match self.format {
            FormatKind::Text => Box::new(TextFormatter),
            FormatKind::Json => Box::new(JsonFormatter),
            FormatKind::Stackdriver => self.stackdriver_formatter(),
        }
    }

    #[cfg(feature = "stackdriver")]
    fn stackdriver_formatter(&self) -> Box<dyn Formatter> {
        use crate::format::StackdriverFormatter;

        let mut formatter = StackdriverFormatter::new();
        if let Some(service) = &self.service {
            formatter = formatter.with_service(service.clone());
        }
        if let Some(version) = &self.service_version {
            formatter = formatter.with_version(version.clone());
        }
        for pattern in &self.stack_skip {
            formatter = formatter.with_stack_skip(pattern.clone());
        }
        Box::new(formatter)
    }

    #[cfg(not(feature = "stackdriver"))]
    fn stackdriver_formatter(&self) -> Box<dyn Formatter> {
        Box::new(JsonFormatter)
    }

    /// File hook firing on every level, when a file is configured.
    pub fn file_hook(&self) -> Option<FileHook> {
        self.file.as_ref().map(FileHook::all_levels)
    }
}

/// Error returned when configuration cannot be applied.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("unable to set level to {value}: {source}")]
    Level {
        value: String,
        #[source]
        source: InvalidLevel,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_means_text_and_nothing_else() {
        assert_eq!(config(&[]), Config::default());
        assert_eq!(config(&[]).level().unwrap(), None);
        assert!(config(&[]).file_hook().is_none());
    }

    #[test]
    fn reads_every_variable() {
        let cfg = config(&[
            (JX_LOG_FORMAT, "stackdriver"),
            (JX_LOG_LEVEL, "debug"),
            (JX_LOG_FILE, "/tmp/jx.log"),
            (JX_LOG_SERVICE, "lighthouse"),
            (JX_LOG_SERVICE_VERSION, "1.0.0"),
            (JX_LOG_STACK_SKIP, "hyper::, tokio::,,"),
        ]);

        assert_eq!(cfg.format, FormatKind::Stackdriver);
        assert_eq!(cfg.level().unwrap(), Some(Level::Debug));
        assert_eq!(cfg.file, Some(PathBuf::from("/tmp/jx.log")));
        assert_eq!(cfg.service.as_deref(), Some("lighthouse"));
        assert_eq!(cfg.service_version.as_deref(), Some("1.0.0"));
        assert_eq!(cfg.stack_skip, vec!["hyper::", "tokio::"]);
        assert_eq!(
            cfg.file_hook().unwrap().path(),
            std::path::Path::new("/tmp/jx.log")
        );
    }

    #[test]
    fn empty_values_are_unset() {
        let cfg = config(&[(JX_LOG_LEVEL, ""), (JX_LOG_FILE, "")]);
        assert_eq!(cfg.level, None);
        assert_eq!(cfg.file, None);
    }

    #[test]
    fn unknown_format_falls_back_to_text() {
        assert_eq!(config(&[(JX_LOG_FORMAT, "yaml")]).format, FormatKind::Text);
        assert_eq!(config(&[(JX_LOG_FORMAT, "json")]).format, FormatKind::Json);
    }

    #[test]
    fn invalid_level_wraps_the_value() {
        let err = config(&[(JX_LOG_LEVEL, "loud")]).level().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unable to set level to loud: Invalid log level 'loud'"
        );
        let ConfigError::Level { source, .. } = err;
        assert_eq!(source, InvalidLevel("loud".to_string()));
    }
}
