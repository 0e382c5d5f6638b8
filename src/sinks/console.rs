//! Colored console decorator

use crate::core::{ConsoleDecorator, LogLevel, Result};
use colored::Colorize;
use std::io::Write;

pub struct ColoredConsole {
    use_colors: bool,
    use_bold: bool,
}

impl ColoredConsole {
    pub fn new() -> Self {
        Self {
            use_colors: true,
            use_bold: false,
        }
    }

    pub fn with_colors(use_colors: bool) -> Self {
        Self {
            use_colors,
            use_bold: false,
        }
    }

    #[must_use]
    pub fn bold(mut self, use_bold: bool) -> Self {
        self.use_bold = use_bold;
        self
    }

    /// Render for a raw severity bit. Values that are not exactly one known
    /// severity are returned undecorated.
    pub fn render_bits(&self, bits: u8, text: &str) -> String {
        match LogLevel::from_bits(bits) {
            Some(level) => self.render(level, text),
            None => text.to_string(),
        }
    }
}

impl Default for ColoredConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleDecorator for ColoredConsole {
    fn render(&self, level: LogLevel, text: &str) -> String {
        if !self.use_colors && !self.use_bold {
            return text.to_string();
        }

        let mut styled = text.normal();
        if self.use_colors {
            styled = styled.color(level.color());
        }
        if self.use_bold {
            styled = styled.bold();
        }
        styled.to_string()
    }

    fn write_line(&self, level: LogLevel, line: &[u8]) -> Result<()> {
        let text = String::from_utf8_lossy(line);
        let rendered = self.render(level, text.trim_end_matches('\n'));

        // Route Error and Fatal levels to stderr, others to stdout
        match level {
            LogLevel::Error | LogLevel::Fatal => {
                let mut err = std::io::stderr().lock();
                writeln!(err, "{}", rendered)?;
            }
            _ => {
                let mut out = std::io::stdout().lock();
                writeln!(out, "{}", rendered)?;
            }
        }
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }
}
