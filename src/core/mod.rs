//! Core logger types and traits

pub mod cache;
pub mod config;
pub mod error;
pub mod field;
pub mod log_entry;
pub mod log_level;
pub mod logger;
pub mod metrics;
pub mod output_format;
pub mod pool;
pub mod sink;

pub use cache::{CallerCache, TimestampCache};
pub use config::{LoggerConfig, SinkOptions};
pub use error::{LoggerError, Result};
pub use field::{Field, FieldKind, FieldValue, SharedError};
pub use log_entry::{CallerInfo, Entry};
pub use log_level::{should_log, LevelMask, LogLevel};
pub use logger::{Logger, LoggerBuilder, LoggerState, FATAL_EXIT_CODE};
pub use metrics::LoggerMetrics;
pub use output_format::{format_entry, OutputFormat};
pub use pool::{Pool, Recycle};
pub use sink::{ConsoleDecorator, Sink};
