//! # fieldlog
//!
//! A low-allocation structured logging front end.
//!
//! ## Features
//!
//! - **Typed fields**: string, integer, float, bool, time, duration and error values
//! - **Bitmask filtering**: each severity owns one bit, presets are unions
//! - **Pooled records**: fields, entries and line buffers are recycled
//! - **Four formats**: Default, JSON, Timestamp and Custom
//! - **Idempotent shutdown**: concurrent `close` calls tear down exactly once

pub mod core;
pub mod macros;
pub mod sinks;

pub mod prelude {
    pub use crate::core::{
        format_entry, should_log, CallerInfo, ConsoleDecorator, Entry, Field, FieldKind,
        FieldValue, LevelMask, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
        LoggerMetrics, LoggerState, OutputFormat, Result, Sink, SinkOptions, FATAL_EXIT_CODE,
    };
    pub use crate::sinks::{ColoredConsole, FileSink};
}

pub use crate::core::{
    format_entry, should_log, CallerCache, CallerInfo, ConsoleDecorator, Entry, Field, FieldKind,
    FieldValue, LevelMask, LogLevel, Logger, LoggerBuilder, LoggerConfig, LoggerError,
    LoggerMetrics, LoggerState, OutputFormat, Result, SharedError, Sink, SinkOptions,
    TimestampCache, FATAL_EXIT_CODE,
};
pub use sinks::{ColoredConsole, FileSink};
