//! Log severities and level bitmasks
//!
//! Every atomic severity owns exactly one bit. A [`LevelMask`] is a union of
//! those bits; the "this level and above" presets are precomputed unions, so
//! filtering is a single bitwise AND rather than a numeric comparison.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

/// An atomic (single-bit) severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[derive(Default)]
#[repr(u8)]
pub enum LogLevel {
    Debug = 1 << 0,
    #[default]
    Info = 1 << 1,
    Warn = 1 << 2,
    Error = 1 << 3,
    Fatal = 1 << 4,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warn,
        LogLevel::Error,
        LogLevel::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Map a raw bit value back to a severity. Anything that is not exactly
    /// one known bit (including preset unions) yields `None`.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            1 => Some(LogLevel::Debug),
            2 => Some(LogLevel::Info),
            4 => Some(LogLevel::Warn),
            8 => Some(LogLevel::Error),
            16 => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    pub fn color(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            LogLevel::Debug => Blue,
            LogLevel::Info => Green,
            LogLevel::Warn => Yellow,
            LogLevel::Error => Red,
            LogLevel::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so width/alignment flags like `{:<5}` apply
        f.pad(self.to_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(format!("Invalid log level: '{}'", s)),
        }
    }
}

/// A configured set of severities.
///
/// # Example
///
/// ```
/// use fieldlog::{should_log, LevelMask, LogLevel};
///
/// let mask = LevelMask::INFO_AND_ABOVE;
/// assert!(should_log(LogLevel::Warn, mask));
/// assert!(!should_log(LogLevel::Debug, mask));
/// assert!(!should_log(LogLevel::Fatal, LevelMask::NONE));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelMask(u8);

impl LevelMask {
    pub const NONE: LevelMask = LevelMask(0);
    pub const FATAL_ONLY: LevelMask = LevelMask(LogLevel::Fatal.bits());
    pub const ERROR_AND_ABOVE: LevelMask =
        LevelMask(LogLevel::Error.bits() | Self::FATAL_ONLY.0);
    pub const WARN_AND_ABOVE: LevelMask =
        LevelMask(LogLevel::Warn.bits() | Self::ERROR_AND_ABOVE.0);
    pub const INFO_AND_ABOVE: LevelMask =
        LevelMask(LogLevel::Info.bits() | Self::WARN_AND_ABOVE.0);
    pub const DEBUG_AND_ABOVE: LevelMask =
        LevelMask(LogLevel::Debug.bits() | Self::INFO_AND_ABOVE.0);

    /// Every bit that belongs to a known severity.
    pub const VALID_BITS: u8 = Self::DEBUG_AND_ABOVE.0;

    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        LevelMask(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// The preset covering `level` and every more severe level.
    pub const fn at_or_above(level: LogLevel) -> Self {
        match level {
            LogLevel::Debug => Self::DEBUG_AND_ABOVE,
            LogLevel::Info => Self::INFO_AND_ABOVE,
            LogLevel::Warn => Self::WARN_AND_ABOVE,
            LogLevel::Error => Self::ERROR_AND_ABOVE,
            LogLevel::Fatal => Self::FATAL_ONLY,
        }
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// True when the mask carries bits that no severity owns.
    pub const fn has_unknown_bits(self) -> bool {
        self.0 & !Self::VALID_BITS != 0
    }
}

impl Default for LevelMask {
    fn default() -> Self {
        LevelMask::INFO_AND_ABOVE
    }
}

impl From<LogLevel> for LevelMask {
    fn from(level: LogLevel) -> Self {
        LevelMask(level.bits())
    }
}

impl BitOr for LevelMask {
    type Output = LevelMask;

    fn bitor(self, rhs: Self) -> Self::Output {
        LevelMask(self.0 | rhs.0)
    }
}

impl BitOr<LogLevel> for LevelMask {
    type Output = LevelMask;

    fn bitor(self, rhs: LogLevel) -> Self::Output {
        LevelMask(self.0 | rhs.bits())
    }
}

impl FromStr for LevelMask {
    type Err = String;

    /// Parses `"none"` or a level name, which selects that level's
    /// at-or-above preset.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("none") {
            return Ok(LevelMask::NONE);
        }
        s.parse::<LogLevel>().map(LevelMask::at_or_above)
    }
}

/// Decide whether a record at `level` passes the configured `mask`.
#[inline]
pub fn should_log(level: LogLevel, mask: LevelMask) -> bool {
    if mask.is_none() {
        return false;
    }
    mask.bits() & level.bits() != 0
}
