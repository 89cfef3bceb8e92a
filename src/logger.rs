use crate::config::{Config, ConfigError};
use crate::format::{Formatter, TextFormatter};
use crate::hook::{FileHook, Hook};
use crate::level::{InvalidLevel, Level};
use crate::output::{Output, SharedBuffer};
use crate::record::LogRecord;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct State {
    formatter: Box<dyn Formatter>,
    level: Level,
    /// Hook owned by the applied [`Config`]; replaced on every apply.
    file_hook: Option<Arc<FileHook>>,
    /// Hooks registered through [`Logger::add_hook`].
    hooks: Vec<Arc<dyn Hook>>,
}

impl State {
    fn hooks_for(&self, level: Level) -> impl Iterator<Item = &dyn Hook> + '_ {
        self.file_hook
            .iter()
            .map(|hook| &**hook as &dyn Hook)
            .chain(self.hooks.iter().map(|hook| &**hook as &dyn Hook))
            .filter(move |hook| hook.levels().contains(&level))
    }
}

/// Logger holding the active layout, minimum level and hooks.
///
/// Formatter, level and configuration-owned hook live behind a single lock,
/// so an emit never observes a half-applied [`Config`]. The output has its
/// own lock and can be swapped independently, e.g. by
/// [`Logger::capture_output`].
pub struct Logger {
    state: RwLock<State>,
    output: Mutex<Output>,
    configured: AtomicBool,
}

impl Logger {
    /// Text layout, level `info`, no hooks, writing to stdout.
    pub fn new() -> Self {
        Self::with_output(Output::stdout())
    }

    pub fn with_output(output: Output) -> Self {
        Logger {
            state: RwLock::new(State {
                formatter: Box::new(TextFormatter),
                level: Level::Info,
                file_hook: None,
                hooks: Vec::new(),
            }),
            output: Mutex::new(output),
            configured: AtomicBool::new(false),
        }
    }

    /// Create a logger writing to stdout and apply `config` to it.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let logger = Self::new();
        logger.apply(config)?;
        Ok(logger)
    }

    /// Apply `config`: install its formatter, its level when one is set,
    /// and its file hook.
    ///
    /// **Returns**
    /// - `Ok(())` once everything is installed.
    /// - `Err(ConfigError)` if the level does not parse; nothing has been
    ///   changed in that case.
    ///
    /// Applying the same configuration twice is observably a no-op. The
    /// file hook of a previous apply is replaced, not accumulated, and
    /// removed when `config` has no file. Hooks added with
    /// [`Logger::add_hook`] are left alone.
    pub fn apply(&self, config: &Config) -> Result<(), ConfigError> {
        let level = config.level()?;
        let formatter = config.formatter();
        let file_hook = config.file_hook().map(Arc::new);

        let mut state = self.write_state();
        state.formatter = formatter;
        if let Some(level) = level {
            state.level = level;
        }
        state.file_hook = file_hook;
        self.configured.store(true, Ordering::Release);
        Ok(())
    }

    /// Whether [`Logger::apply`] has succeeded at least once.
    pub fn is_configured(&self) -> bool {
        self.configured.load(Ordering::Acquire)
    }

    /// Set the minimum level by name.
    pub fn set_level(&self, name: &str) -> Result<(), InvalidLevel> {
        let level = name.parse()?;
        self.set_min_level(level);
        Ok(())
    }

    pub fn set_min_level(&self, level: Level) {
        self.write_state().level = level;
    }

    /// Current minimum level.
    pub fn level(&self) -> Level {
        self.read_state().level
    }

    pub fn is_enabled(&self, level: Level) -> bool {
        level >= self.level()
    }

    pub fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        self.write_state().formatter = formatter;
    }

    pub fn add_hook(&self, hook: Arc<dyn Hook>) {
        self.write_state().hooks.push(hook);
    }

    /// Replace the destination, returning the previous one.
    pub fn set_output(&self, output: Output) -> Output {
        std::mem::replace(&mut *self.lock_output(), output)
    }

    /// Run `f` with output redirected to memory and return what was written.
    ///
    /// The previous output is restored even if `f` panics.
    pub fn capture_output<F: FnOnce()>(&self, f: F) -> String {
        let buffer = SharedBuffer::new();
        let previous = self.set_output(Output::new(buffer.clone(), false));
        let restore = RestoreOutput {
            logger: self,
            previous: Some(previous),
        };
        f();
        drop(restore);
        buffer.contents()
    }

    /// Attach a single field; the returned entry emits with it.
    pub fn with_field(&self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Entry<'_> {
        Entry::new(self).with_field(key, value)
    }

    pub fn with_fields(&self, fields: BTreeMap<String, serde_json::Value>) -> Entry<'_> {
        Entry::new(self).with_fields(fields)
    }

    pub fn log(&self, level: Level, message: impl Into<String>) {
        self.emit(level, message.into(), BTreeMap::new());
    }

    pub fn trace(&self, message: impl Into<String>) {
        self.log(Level::Trace, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    /// Emit at `fatal`, then exit the process with status 1.
    pub fn fatal(&self, message: impl Into<String>) -> ! {
        Entry::new(self).fatal(message)
    }

    /// Emit at `panic`, then panic with the message.
    pub fn panic(&self, message: impl Into<String>) -> ! {
        Entry::new(self).panic(message)
    }

    fn emit(&self, level: Level, message: String, fields: BTreeMap<String, serde_json::Value>) {
        if !self.is_enabled(level) {
            return;
        }
        self.dispatch(&LogRecord::new(level, message, fields));
    }

    /// Route a record to the matching hooks and the primary output.
    ///
    /// Records below the minimum level are dropped. Hook, format and write
    /// failures are reported on stderr and never stop the other sinks.
    pub fn dispatch(&self, record: &LogRecord) {
        let state = self.read_state();
        if record.level < state.level {
            return;
        }

        for hook in state.hooks_for(record.level) {
            if let Err(e) = hook.fire(record) {
                eprintln!("failed to fire log hook: {}", e);
            }
        }

        let mut output = self.lock_output();
        match state.formatter.format(record, output.ansi()) {
            Ok(line) => {
                if let Err(e) = output.write_line(&line) {
                    eprintln!("failed to write log record: {}", e);
                }
            }
            Err(e) => eprintln!("failed to format log record: {}", e),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_output(&self) -> MutexGuard<'_, Output> {
        self.output.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

struct RestoreOutput<'a> {
    logger: &'a Logger,
    previous: Option<Output>,
}

impl Drop for RestoreOutput<'_> {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            self.logger.set_output(previous);
        }
    }
}

/// A pending emit carrying structured fields.
///
/// ```no_run
/// let logger = jx_logging::Logger::new();
/// logger
///     .with_field("repo", "jx")
///     .with_field("attempt", 3)
///     .warn("retrying pipeline");
/// ```
pub struct Entry<'a> {
    logger: &'a Logger,
    fields: BTreeMap<String, serde_json::Value>,
}

impl<'a> Entry<'a> {
    pub fn new(logger: &'a Logger) -> Self {
        Entry {
            logger,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn with_fields(mut self, fields: BTreeMap<String, serde_json::Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn log(self, level: Level, message: impl Into<String>) {
        self.logger.emit(level, message.into(), self.fields);
    }

    pub fn trace(self, message: impl Into<String>) {
        self.log(Level::Trace, message);
    }

    pub fn debug(self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warn(self, message: impl Into<String>) {
        self.log(Level::Warning, message);
    }

    pub fn error(self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn fatal(self, message: impl Into<String>) -> ! {
        self.log(Level::Fatal, message);
        std::process::exit(1)
    }

    pub fn panic(self, message: impl Into<String>) -> ! {
        let message = message.into();
        self.logger.emit(Level::Panic, message.clone(), self.fields);
        panic!("{}", message)
    }
}
