//! Logging macros for ergonomic log message formatting.
//!
//! These macros provide a convenient interface for logging with automatic
//! string formatting, similar to `println!` and `format!`. They also record
//! the calling module as the caller's function descriptor.
//!
//! # Examples
//!
//! ```
//! use fieldlog::prelude::*;
//! use fieldlog::info;
//!
//! let logger = Logger::builder().colors(false).build().unwrap();
//!
//! // Basic logging
//! info!(logger, "Server started");
//!
//! // With format arguments
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//!
//! // With structured fields
//! info!(logger, fields: [Field::int("port", port)], "Listening");
//! ```

/// Log a message with automatic formatting.
///
/// # Examples
///
/// ```
/// # use fieldlog::prelude::*;
/// # let logger = Logger::builder().colors(false).build().unwrap();
/// use fieldlog::log;
/// log!(logger, LogLevel::Info, "Simple message");
/// log!(logger, LogLevel::Error, "Error code: {}", 500);
/// log!(logger, LogLevel::Warn, fields: [Field::bool("retry", true)], "Attempt {}", 2);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $level:expr, fields: [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.log_from(module_path!(), $level, format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.log_from(module_path!(), $level, format!($($arg)+), ::std::iter::empty())
    };
}

/// Log a debug-level message.
///
/// # Examples
///
/// ```
/// # use fieldlog::prelude::*;
/// # let logger = Logger::builder().level(LevelMask::DEBUG_AND_ABOVE).colors(false).build().unwrap();
/// use fieldlog::debug;
/// debug!(logger, "Debug information");
/// debug!(logger, "Counter value: {}", 10);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// # Examples
///
/// ```
/// # use fieldlog::prelude::*;
/// # let logger = Logger::builder().colors(false).build().unwrap();
/// use fieldlog::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Info, $($arg)+)
    };
}

/// Log a warning-level message.
///
/// # Examples
///
/// ```
/// # use fieldlog::prelude::*;
/// # let logger = Logger::builder().colors(false).build().unwrap();
/// use fieldlog::warn;
/// warn!(logger, "Low disk space");
/// warn!(logger, "Retry attempt {} of {}", 3, 5);
/// ```
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Warn, $($arg)+)
    };
}

/// Log an error-level message.
///
/// # Examples
///
/// ```
/// # use fieldlog::prelude::*;
/// # let logger = Logger::builder().colors(false).build().unwrap();
/// use fieldlog::error;
/// error!(logger, "Failed to connect to database");
/// error!(logger, "Error code: {}, message: {}", 500, "Internal error");
/// ```
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::LogLevel::Error, $($arg)+)
    };
}

/// Log a fatal-level message, close the logger and exit the process
/// with status 1.
///
/// # Examples
///
/// ```no_run
/// # use fieldlog::prelude::*;
/// # let logger = Logger::builder().colors(false).build().unwrap();
/// use fieldlog::fatal;
/// fatal!(logger, "Unable to recover from error: {}", "disk full");
/// ```
#[macro_export]
macro_rules! fatal {
    ($logger:expr, fields: [$($field:expr),* $(,)?], $($arg:tt)+) => {
        $logger.fatal_from(Some(module_path!()), &format!($($arg)+), [$($field),*])
    };
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal_from(Some(module_path!()), &format!($($arg)+), ::std::iter::empty())
    };
}
