//! Main logger implementation

use super::{
    config::LoggerConfig,
    error::Result,
    field::Field,
    log_entry::Entry,
    log_level::{should_log, LevelMask, LogLevel},
    metrics::LoggerMetrics,
    output_format::OutputFormat,
    pool::Pool,
    sink::{ConsoleDecorator, Sink},
};
use crate::sinks::{ColoredConsole, FileSink};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};

/// Exit status used after a fatal record
pub const FATAL_EXIT_CODE: i32 = 1;

const LINE_POOL_IDLE: usize = 256;
const LINE_POOL_MAX_RETAINED: usize = 64 * 1024;

static LINE_POOL: Pool<Vec<u8>> = Pool::with_retained_limit(LINE_POOL_IDLE, LINE_POOL_MAX_RETAINED);

/// Lifecycle of a [`Logger`]. `Closing` is only observed while the first
/// `close` call is tearing the sink down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LoggerState {
    Open = 0,
    Closing = 1,
    Closed = 2,
}

impl LoggerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LoggerState::Open,
            1 => LoggerState::Closing,
            _ => LoggerState::Closed,
        }
    }
}

/// Structured logger.
///
/// Filters by level mask, assembles a pooled [`Entry`], formats it and hands
/// the bytes to the console decorator and/or the sink. Safe to share between
/// threads; every logging method takes `&self`.
///
/// # Example
///
/// ```
/// use fieldlog::prelude::*;
///
/// let logger = Logger::builder()
///     .level(LevelMask::DEBUG_AND_ABOVE)
///     .format(OutputFormat::Json)
///     .colors(false)
///     .build()
///     .unwrap();
///
/// logger.info_with("user logged in", [Field::string("user", "alice"), Field::int("id", 42)]);
/// logger.close().unwrap();
///
/// // logging after close is a silent no-op
/// logger.info("dropped");
/// ```
pub struct Logger {
    config: LoggerConfig,
    sink: Mutex<Option<Box<dyn Sink>>>,
    console: Option<Box<dyn ConsoleDecorator>>,
    state: AtomicU8,
    metrics: LoggerMetrics,
}

impl Logger {
    /// Validate `config` and build a logger from a private copy of it.
    ///
    /// Nothing is opened when validation fails.
    pub fn new(config: &LoggerConfig) -> Result<Self> {
        config.validate()?;
        let config = config.clone();

        let sink: Option<Box<dyn Sink>> = if config.file {
            Some(Box::new(FileSink::open(config.file_path(), config.sink.clone())?))
        } else {
            None
        };
        let console = Self::default_console(&config);

        Ok(Self::from_parts(config, sink, console))
    }

    /// Build a logger that writes to a caller-supplied sink instead of the
    /// configured file.
    pub fn with_sink(config: &LoggerConfig, sink: Box<dyn Sink>) -> Result<Self> {
        config.validate_outputs(true)?;
        let config = config.clone();
        let console = Self::default_console(&config);
        Ok(Self::from_parts(config, Some(sink), console))
    }

    fn default_console(config: &LoggerConfig) -> Option<Box<dyn ConsoleDecorator>> {
        config.console.then(|| {
            Box::new(ColoredConsole::with_colors(config.color).bold(config.bold))
                as Box<dyn ConsoleDecorator>
        })
    }

    fn from_parts(
        config: LoggerConfig,
        sink: Option<Box<dyn Sink>>,
        console: Option<Box<dyn ConsoleDecorator>>,
    ) -> Self {
        Self {
            config,
            sink: Mutex::new(sink),
            console,
            state: AtomicU8::new(LoggerState::Open as u8),
            metrics: LoggerMetrics::new(),
        }
    }

    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn state(&self) -> LoggerState {
        LoggerState::from_u8(self.state.load(Ordering::Acquire))
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.state() != LoggerState::Open
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Whether a record at `level` would currently be written
    pub fn enabled(&self, level: LogLevel) -> bool {
        !self.is_closed() && should_log(level, self.config.level)
    }

    #[track_caller]
    pub fn log(&self, level: LogLevel, message: impl AsRef<str>) {
        self.dispatch(None, level, message.as_ref(), std::iter::empty(), false);
    }

    #[track_caller]
    pub fn log_with<I>(&self, level: LogLevel, message: impl AsRef<str>, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        self.dispatch(None, level, message.as_ref(), fields, false);
    }

    /// Entry point for the logging macros, which pass the caller's
    /// `module_path!()` as the function descriptor.
    #[doc(hidden)]
    #[track_caller]
    pub fn log_from<I>(&self, function: &'static str, level: LogLevel, message: impl AsRef<str>, fields: I)
    where
        I: IntoIterator<Item = Field>,
    {
        self.dispatch(Some(function), level, message.as_ref(), fields, false);
    }

    #[inline]
    #[track_caller]
    pub fn debug(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Debug, message);
    }

    #[inline]
    #[track_caller]
    pub fn info(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Info, message);
    }

    #[inline]
    #[track_caller]
    pub fn warn(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Warn, message);
    }

    #[inline]
    #[track_caller]
    pub fn error(&self, message: impl AsRef<str>) {
        self.log(LogLevel::Error, message);
    }

    #[inline]
    #[track_caller]
    pub fn debug_with<I: IntoIterator<Item = Field>>(&self, message: impl AsRef<str>, fields: I) {
        self.log_with(LogLevel::Debug, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn info_with<I: IntoIterator<Item = Field>>(&self, message: impl AsRef<str>, fields: I) {
        self.log_with(LogLevel::Info, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn warn_with<I: IntoIterator<Item = Field>>(&self, message: impl AsRef<str>, fields: I) {
        self.log_with(LogLevel::Warn, message, fields);
    }

    #[inline]
    #[track_caller]
    pub fn error_with<I: IntoIterator<Item = Field>>(&self, message: impl AsRef<str>, fields: I) {
        self.log_with(LogLevel::Error, message, fields);
    }

    /// Record `message` at Fatal, close the logger and exit with status 1.
    ///
    /// The record bypasses the level mask.
    #[track_caller]
    pub fn fatal(&self, message: impl AsRef<str>) -> ! {
        self.fatal_from(None, message.as_ref(), std::iter::empty())
    }

    #[track_caller]
    pub fn fatal_with<I: IntoIterator<Item = Field>>(&self, message: impl AsRef<str>, fields: I) -> ! {
        self.fatal_from(None, message.as_ref(), fields)
    }

    #[doc(hidden)]
    #[track_caller]
    pub fn fatal_from<I>(&self, function: Option<&'static str>, message: &str, fields: I) -> !
    where
        I: IntoIterator<Item = Field>,
    {
        if self.is_closed() {
            // nowhere left to record it
            eprintln!("[LOGGER FATAL] {}", message);
            fields.into_iter().for_each(Field::release);
        } else {
            self.dispatch(function, LogLevel::Fatal, message, fields, true);
        }

        // returns only once any teardown already in progress has finished
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close logger after fatal record: {}", e);
        }
        std::process::exit(FATAL_EXIT_CODE)
    }

    /// Fatal path that also covers a missing logger: the message goes to
    /// stderr and the process still exits with status 1.
    #[track_caller]
    pub fn exit_fatal(logger: Option<&Logger>, message: impl AsRef<str>) -> ! {
        match logger {
            Some(logger) => logger.fatal(message),
            None => {
                eprintln!("[LOGGER FATAL] {}", message.as_ref());
                std::process::exit(FATAL_EXIT_CODE)
            }
        }
    }

    #[track_caller]
    fn dispatch<I>(
        &self,
        function: Option<&'static str>,
        level: LogLevel,
        message: &str,
        fields: I,
        bypass_filter: bool,
    ) where
        I: IntoIterator<Item = Field>,
    {
        if self.is_closed() {
            self.metrics.record_dropped_after_close();
            fields.into_iter().for_each(Field::release);
            return;
        }
        if !bypass_filter && !should_log(level, self.config.level) {
            self.metrics.record_filtered();
            fields.into_iter().for_each(Field::release);
            return;
        }

        let format = self.config.format;
        let need_caller = self.config.caller_info && format.uses_caller();
        let entry = Entry::assemble(need_caller, function, level, message, fields);

        let mut line = LINE_POOL.acquire();
        let formatted = format.format_into(&entry, self.config.caller_info, &mut line);
        entry.release();

        match formatted {
            Ok(()) => {
                line.push(b'\n');
                if self.emit(level, &line) {
                    self.metrics.record_logged();
                } else {
                    // close took the sink between the state check and the write
                    self.metrics.record_dropped_after_close();
                }
            }
            Err(e) => {
                eprintln!("[LOGGER ERROR] Failed to format log entry: {}", e);
            }
        }
        LINE_POOL.release(line);
    }

    /// Hand one formatted record to the console and the sink. Failures are
    /// reported on stderr and swallowed.
    ///
    /// Returns whether any output was attempted.
    fn emit(&self, level: LogLevel, line: &[u8]) -> bool {
        let mut attempted = false;
        if let Some(ref console) = self.console {
            attempted = true;
            if let Err(e) = console.write_line(level, line) {
                self.metrics.record_write_error();
                eprintln!("[LOGGER ERROR] Console write failed: {}", e);
            }
        }

        let mut sink = self.sink.lock();
        if let Some(sink) = sink.as_mut() {
            attempted = true;
            if let Err(e) = sink.write(line) {
                let failures = self.metrics.record_write_error() + 1;
                eprintln!(
                    "[LOGGER ERROR] Sink '{}' write failed ({} failures so far): {}",
                    sink.name(),
                    failures,
                    e
                );
            }
        }
        attempted
    }

    /// Close the logger.
    ///
    /// Only the first caller tears the sink down and sees its close result;
    /// every other call returns `Ok(())`. A call that overlaps the teardown
    /// waits for it to finish, so `Closed` is observed on return. The logger
    /// is Closed afterwards even if the sink failed to close.
    pub fn close(&self) -> Result<()> {
        // the sink lock is held until the state is Closed
        let mut sink = self.sink.lock();
        if self
            .state
            .compare_exchange(
                LoggerState::Open as u8,
                LoggerState::Closing as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Ok(());
        }

        let result = match sink.take() {
            Some(mut sink) => sink.close(),
            None => Ok(()),
        };

        if let Some(ref console) = self.console {
            if let Err(e) = console.flush() {
                eprintln!("[LOGGER ERROR] Failed to flush console during close: {}", e);
            }
        }

        self.state.store(LoggerState::Closed as u8, Ordering::Release);
        drop(sink);
        result
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            eprintln!("[LOGGER ERROR] Failed to close sink during shutdown: {}", e);
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use fieldlog::prelude::*;
///
/// let logger = Logger::builder()
///     .level(LevelMask::WARN_AND_ABOVE)
///     .format(OutputFormat::Timestamp)
///     .caller_info(true)
///     .bold(true)
///     .build()
///     .unwrap();
///
/// assert!(!logger.enabled(LogLevel::Info));
/// assert!(logger.enabled(LogLevel::Error));
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    sink: Option<Box<dyn Sink>>,
    console: Option<Box<dyn ConsoleDecorator>>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            sink: None,
            console: None,
        }
    }

    /// Replace the whole configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn level(mut self, level: LevelMask) -> Self {
        self.config.level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Enable or disable console output
    #[must_use = "builder methods return a new value"]
    pub fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Write to `directory/file_name` through a [`FileSink`]
    #[must_use = "builder methods return a new value"]
    pub fn file(mut self, directory: impl Into<String>, file_name: impl Into<String>) -> Self {
        self.config.file = true;
        self.config.directory = directory.into();
        self.config.file_name = file_name.into();
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn caller_info(mut self, enabled: bool) -> Self {
        self.config.caller_info = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn colors(mut self, enabled: bool) -> Self {
        self.config.color = enabled;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn bold(mut self, enabled: bool) -> Self {
        self.config.bold = enabled;
        self
    }

    /// Use `sink` instead of the configured file
    #[must_use = "builder methods return a new value"]
    pub fn sink<S: Sink + 'static>(mut self, sink: S) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Use `console` instead of the default colored console.
    /// Only consulted while console output is enabled.
    #[must_use = "builder methods return a new value"]
    pub fn console_decorator<C: ConsoleDecorator + 'static>(mut self, console: C) -> Self {
        self.console = Some(Box::new(console));
        self
    }

    /// Build the Logger
    pub fn build(self) -> Result<Logger> {
        let LoggerBuilder {
            config,
            sink,
            console,
        } = self;

        let mut logger = match sink {
            Some(sink) => Logger::with_sink(&config, sink)?,
            None => Logger::new(&config)?,
        };
        if let Some(console) = console.filter(|_| logger.config.console) {
            logger.console = Some(console);
        }
        Ok(logger)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
