//! Logger configuration and validation

use super::error::{LoggerError, Result};
use super::log_level::LevelMask;
use super::output_format::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

/// Tuning passed through to the file sink untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SinkOptions {
    /// Write buffer capacity in bytes
    pub buffer_size: usize,
    /// Flush after this many writes
    pub max_writes: usize,
    /// Flush when this much time has passed since the last flush
    pub flush_interval_ms: u64,
}

impl SinkOptions {
    pub fn flush_interval(&self) -> Duration {
        Duration::from_millis(self.flush_interval_ms)
    }
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            buffer_size: 64 * 1024,
            max_writes: 100,
            flush_interval_ms: 1000,
        }
    }
}

/// Configuration consumed by [`Logger`](crate::Logger).
///
/// # Example
///
/// ```
/// use fieldlog::{LevelMask, LoggerConfig, OutputFormat};
///
/// let config = LoggerConfig::from_json(
///     r#"{"console": true, "level": 28, "format": 1, "caller_info": true}"#,
/// )
/// .unwrap();
/// assert_eq!(config.level, LevelMask::WARN_AND_ABOVE);
/// assert_eq!(config.format, OutputFormat::Json);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Write records to the console decorator
    pub console: bool,
    /// Write records to the file sink
    pub file: bool,
    pub level: LevelMask,
    pub format: OutputFormat,
    pub color: bool,
    pub bold: bool,
    /// Capture file, function and line for each record
    pub caller_info: bool,
    pub directory: String,
    pub file_name: String,
    pub sink: SinkOptions,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            console: true,
            file: false,
            level: LevelMask::INFO_AND_ABOVE,
            format: OutputFormat::Default,
            color: true,
            bold: false,
            caller_info: false,
            directory: "logs".to_string(),
            file_name: "app.log".to_string(),
            sink: SinkOptions::default(),
        }
    }
}

impl LoggerConfig {
    /// Parse a JSON config. Parse failures, including an out-of-range format
    /// selector, are reported as invalid configuration.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LoggerError::config("LoggerConfig", e.to_string()))
    }

    /// Path of the log file under `directory`
    pub fn file_path(&self) -> PathBuf {
        Path::new(&self.directory).join(&self.file_name)
    }

    pub fn validate(&self) -> Result<()> {
        self.validate_outputs(false)
    }

    /// `external_sink` is set when the caller supplies its own sink, which
    /// counts as an output and makes the file path irrelevant.
    pub(crate) fn validate_outputs(&self, external_sink: bool) -> Result<()> {
        if !self.console && !self.file && !external_sink {
            return Err(LoggerError::config(
                "LoggerConfig",
                "at least one of console or file output must be enabled",
            ));
        }

        if self.level.has_unknown_bits() {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!("level mask {:#07b} has bits outside the known severities", self.level.bits()),
            ));
        }

        if self.file && !external_sink {
            Self::validate_directory(&self.directory)?;
            Self::validate_file_name(&self.file_name)?;
        }

        Ok(())
    }

    fn validate_directory(directory: &str) -> Result<()> {
        if directory.trim().is_empty() {
            return Err(LoggerError::config("LoggerConfig", "directory must not be empty"));
        }
        if Path::new(directory)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!("directory '{}' must not traverse upwards", directory),
            ));
        }
        Ok(())
    }

    fn validate_file_name(file_name: &str) -> Result<()> {
        if file_name.trim().is_empty() {
            return Err(LoggerError::config("LoggerConfig", "file_name must not be empty"));
        }
        if file_name.contains("..") || file_name.contains(|c: char| c == '/' || c == '\\') {
            return Err(LoggerError::config(
                "LoggerConfig",
                format!("file_name '{}' must be a plain file name", file_name),
            ));
        }
        Ok(())
    }
}
