//! Concrete output collaborators: the colored console and the file sink

pub mod console;
pub mod file;

pub use console::ColoredConsole;
pub use file::FileSink;

// Re-export traits for convenience
pub use crate::core::{ConsoleDecorator, Sink};
