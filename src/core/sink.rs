//! Output capabilities the logger dispatches formatted records to

use super::error::Result;
use super::log_level::LogLevel;

/// A destination for formatted log bytes.
///
/// `write` receives one complete record, newline included. Implementations
/// may buffer, but must not block unboundedly.
pub trait Sink: Send {
    fn write(&mut self, buf: &[u8]) -> Result<usize>;
    /// Flush and release the underlying resource. Later writes fail.
    fn close(&mut self) -> Result<()>;
    fn name(&self) -> &str;
}

/// Console output with per-severity decoration.
pub trait ConsoleDecorator: Send + Sync {
    /// Decorate `text` for `level`.
    fn render(&self, level: LogLevel, text: &str) -> String;

    /// Print one formatted record.
    fn write_line(&self, level: LogLevel, line: &[u8]) -> Result<()>;

    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
