//! Output formats for log entries
//!
//! - Default: `TIME | LEVEL | MESSAGE`
//! - Json: one JSON object per record
//! - Timestamp: `TIME LEVEL MESSAGE`
//! - Custom: the message only, formatted by the caller

use super::config::LoggerConfig;
use super::error::{LoggerError, Result};
use super::field::{Field, FieldValue};
use super::log_entry::Entry;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Width that level names are padded to in text formats
pub const LEVEL_WIDTH: usize = 5;

/// Output format for log entries.
///
/// Serialized as its numeric selector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum OutputFormat {
    /// Example: `2025-01-08 10:30:45 | INFO  | Request processed`
    #[default]
    Default = 0,

    /// Example: `{"time":"2025-01-08 10:30:45","level":"INFO","msg":"Request processed"}`
    Json = 1,

    /// Example: `2025-01-08 10:30:45 INFO  Request processed`
    Timestamp = 2,

    /// The message verbatim
    Custom = 3,
}

impl OutputFormat {
    /// Map a raw selector, falling back to [`OutputFormat::Default`] for
    /// values outside the known range.
    pub fn from_selector(selector: u8) -> Self {
        Self::try_from(selector).unwrap_or_default()
    }

    /// Whether this format renders caller information at all
    pub fn uses_caller(self) -> bool {
        matches!(self, OutputFormat::Default | OutputFormat::Json)
    }

    /// Render `entry` into `out` (no trailing newline).
    pub fn format_into(self, entry: &Entry, with_caller: bool, out: &mut Vec<u8>) -> Result<()> {
        let with_caller = with_caller && self.uses_caller();
        match self {
            OutputFormat::Default => Self::format_default(entry, with_caller, out)?,
            OutputFormat::Json => Self::format_json(entry, with_caller, out)?,
            OutputFormat::Timestamp => Self::format_timestamp(entry, out)?,
            OutputFormat::Custom => out.extend_from_slice(entry.message().as_bytes()),
        }
        Ok(())
    }

    fn format_default(entry: &Entry, with_caller: bool, out: &mut Vec<u8>) -> std::io::Result<()> {
        write!(
            out,
            "{} | {:<width$} | ",
            entry.timestamp(),
            entry.level(),
            width = LEVEL_WIDTH
        )?;
        if let Some(caller) = entry.caller().filter(|_| with_caller) {
            write!(out, "{}:{}:{} - ", caller.file, caller.function, caller.line)?;
        }
        out.extend_from_slice(entry.message().as_bytes());
        Self::write_text_fields(entry.fields(), out)
    }

    fn format_timestamp(entry: &Entry, out: &mut Vec<u8>) -> std::io::Result<()> {
        write!(
            out,
            "{} {:<width$} {}",
            entry.timestamp(),
            entry.level(),
            entry.message(),
            width = LEVEL_WIDTH
        )?;
        Self::write_text_fields(entry.fields(), out)
    }

    fn write_text_fields(fields: &[Field], out: &mut Vec<u8>) -> std::io::Result<()> {
        for field in fields {
            write!(out, " {}={}", field.key(), field.value_ref())?;
        }
        Ok(())
    }

    /// Field order: time, level, caller, msg, then user fields in call order.
    fn format_json(entry: &Entry, with_caller: bool, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(b"{\"time\":");
        serde_json::to_writer(&mut *out, entry.timestamp())?;
        out.extend_from_slice(b",\"level\":");
        serde_json::to_writer(&mut *out, entry.level().to_str())?;

        if let Some(caller) = entry.caller().filter(|_| with_caller) {
            let rendered = format!("{}:{}:{}", caller.file, caller.function, caller.line);
            out.extend_from_slice(b",\"caller\":");
            serde_json::to_writer(&mut *out, &rendered)?;
        }

        out.extend_from_slice(b",\"msg\":");
        serde_json::to_writer(&mut *out, entry.message())?;

        for field in entry.fields() {
            out.push(b',');
            serde_json::to_writer(&mut *out, field.key())?;
            out.push(b':');
            Self::write_json_value(field.value_ref(), out)?;
        }
        out.push(b'}');
        Ok(())
    }

    /// Every value is emitted as a JSON string of its canonical rendering.
    fn write_json_value(value: &FieldValue, out: &mut Vec<u8>) -> Result<()> {
        match value {
            FieldValue::String(s) => serde_json::to_writer(&mut *out, s)?,
            FieldValue::Error(Some(err)) => serde_json::to_writer(&mut *out, &err.to_string())?,
            // remaining variants render without characters that need escaping
            other => write!(out, "\"{}\"", other)?,
        }
        Ok(())
    }
}

impl TryFrom<u8> for OutputFormat {
    type Error = LoggerError;

    fn try_from(selector: u8) -> Result<Self> {
        match selector {
            0 => Ok(OutputFormat::Default),
            1 => Ok(OutputFormat::Json),
            2 => Ok(OutputFormat::Timestamp),
            3 => Ok(OutputFormat::Custom),
            other => Err(LoggerError::config(
                "OutputFormat",
                format!("unknown format selector {}", other),
            )),
        }
    }
}

impl From<OutputFormat> for u8 {
    fn from(format: OutputFormat) -> Self {
        format as u8
    }
}

/// Render `entry` under `config`.
///
/// A missing entry or config yields an empty byte sequence.
pub fn format_entry(config: Option<&LoggerConfig>, entry: Option<&Entry>) -> Vec<u8> {
    let (Some(config), Some(entry)) = (config, entry) else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(128);
    match config.format.format_into(entry, config.caller_info, &mut out) {
        Ok(()) => out,
        Err(e) => {
            eprintln!("[LOGGER ERROR] Failed to format log entry: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Field, LogLevel};
    use std::time::Duration;

    fn config(format: OutputFormat, caller_info: bool) -> LoggerConfig {
        LoggerConfig {
            format,
            caller_info,
            ..LoggerConfig::default()
        }
    }

    fn render(format: OutputFormat, caller_info: bool, entry: &Entry) -> String {
        String::from_utf8(format_entry(Some(&config(format, caller_info)), Some(entry)))
            .expect("utf-8 output")
    }

    #[test]
    fn test_default_format() {
        let entry = Entry::new(false, LogLevel::Info, "Request processed", std::iter::empty());
        let result = render(OutputFormat::Default, false, &entry);
        assert_eq!(result, format!("{} | INFO  | Request processed", entry.timestamp()));
        entry.release();
    }

    #[test]
    fn test_default_format_with_caller() {
        let line = line!() + 1;
        let entry = Entry::new(true, LogLevel::Error, "failed", std::iter::empty());
        let result = render(OutputFormat::Default, true, &entry);
        assert_eq!(
            result,
            format!(
                "{} | ERROR | output_format.rs:???:{} - failed",
                entry.timestamp(),
                line
            )
        );
        entry.release();
    }

    #[test]
    fn test_default_format_with_fields() {
        let entry = Entry::new(
            false,
            LogLevel::Warn,
            "slow request",
            [Field::duration("elapsed", Duration::from_millis(1500)), Field::int("status", 200)],
        );
        let result = render(OutputFormat::Default, false, &entry);
        assert!(result.ends_with("| WARN  | slow request elapsed=1.5s status=200"));
        entry.release();
    }

    #[test]
    fn test_json_format() {
        let entry = Entry::new(false, LogLevel::Info, "hello", [Field::string("k", "v")]);
        let result = render(OutputFormat::Json, false, &entry);
        assert_eq!(
            result,
            format!(
                r#"{{"time":"{}","level":"INFO","msg":"hello","k":"v"}}"#,
                entry.timestamp()
            )
        );
        entry.release();
    }

    #[test]
    fn test_json_format_with_caller() {
        let entry = Entry::new(true, LogLevel::Debug, "check", std::iter::empty());
        let result = render(OutputFormat::Json, true, &entry);

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["level"], "DEBUG");
        assert_eq!(parsed["msg"], "check");
        assert!(parsed["caller"].as_str().unwrap().starts_with("output_format.rs:???:"));

        // caller comes right after level
        let caller_at = result.find("\"caller\"").unwrap();
        let level_at = result.find("\"level\"").unwrap();
        let msg_at = result.find("\"msg\"").unwrap();
        assert!(level_at < caller_at && caller_at < msg_at);
        entry.release();
    }

    #[test]
    fn test_json_escaping() {
        let entry = Entry::new(
            false,
            LogLevel::Error,
            r#"path "C:\temp" missing"#,
            [Field::string("quote\"key", "back\\slash\nnewline")],
        );
        let result = render(OutputFormat::Json, false, &entry);

        let parsed: serde_json::Value = serde_json::from_str(&result).unwrap();
        assert_eq!(parsed["msg"], r#"path "C:\temp" missing"#);
        assert_eq!(parsed["quote\"key"], "back\\slash\nnewline");
        entry.release();
    }

    #[test]
    fn test_json_values_are_strings() {
        let entry = Entry::new(
            false,
            LogLevel::Info,
            "typed",
            [Field::int("n", 42), Field::bool("ok", true), Field::float("ratio", 0.5)],
        );
        let result = render(OutputFormat::Json, false, &entry);
        assert!(result.ends_with(r#""n":"42","ok":"true","ratio":"0.5"}"#));
        entry.release();
    }

    #[test]
    fn test_timestamp_format_ignores_caller() {
        let entry = Entry::new(true, LogLevel::Warn, "careful", std::iter::empty());
        let result = render(OutputFormat::Timestamp, true, &entry);
        assert_eq!(result, format!("{} WARN  careful", entry.timestamp()));
        entry.release();
    }

    #[test]
    fn test_custom_format_is_verbatim() {
        let entry = Entry::new(true, LogLevel::Fatal, "[svc] preformatted", [Field::int("n", 1)]);
        assert_eq!(render(OutputFormat::Custom, true, &entry), "[svc] preformatted");
        entry.release();
    }

    #[test]
    fn test_missing_inputs_yield_nothing() {
        let entry = Entry::new(false, LogLevel::Info, "x", std::iter::empty());
        assert!(format_entry(None, Some(&entry)).is_empty());
        assert!(format_entry(Some(&LoggerConfig::default()), None).is_empty());
        entry.release();
    }

    #[test]
    fn test_selector_fallback() {
        assert_eq!(OutputFormat::from_selector(1), OutputFormat::Json);
        assert_eq!(OutputFormat::from_selector(3), OutputFormat::Custom);
        assert_eq!(OutputFormat::from_selector(42), OutputFormat::Default);
        assert!(OutputFormat::try_from(4).is_err());
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Default);
    }
}
