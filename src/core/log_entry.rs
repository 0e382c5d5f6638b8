//! Log entry structure

use super::cache::{CallerCache, TimestampCache};
use super::field::Field;
use super::log_level::LogLevel;
use super::pool::{Pool, Recycle};
use std::panic::Location;

const ENTRY_POOL_IDLE: usize = 256;
const ENTRY_POOL_MAX_RETAINED: usize = 64 * 1024;

static ENTRY_POOL: Pool<Entry> = Pool::with_retained_limit(ENTRY_POOL_IDLE, ENTRY_POOL_MAX_RETAINED);

/// Function name used when the call site did not supply one
pub const UNKNOWN_FUNCTION: &str = "???";

/// Where a log call came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerInfo {
    /// File name without its directory
    pub file: &'static str,
    /// Module path of the calling function, or [`UNKNOWN_FUNCTION`]
    pub function: &'static str,
    pub line: u32,
}

impl CallerInfo {
    pub fn from_location(location: &'static Location<'static>, function: Option<&'static str>) -> Self {
        Self {
            file: CallerCache::global().base_name(location.file()),
            function: function.unwrap_or(UNKNOWN_FUNCTION),
            line: location.line(),
        }
    }

    /// Caller of the (tracked) function that invokes this.
    #[track_caller]
    pub fn capture(function: Option<&'static str>) -> Self {
        Self::from_location(Location::caller(), function)
    }
}

/// One log record between assembly and formatting.
///
/// Entries come from a process-wide pool. The code that built an entry owns it
/// exclusively and hands it back with [`Entry::release`] once it is formatted.
#[derive(Debug, Default)]
pub struct Entry {
    timestamp: String,
    level: LogLevel,
    message: String,
    caller: Option<CallerInfo>,
    fields: Vec<Field>,
}

impl Entry {
    /// Assemble an entry for the current call site.
    ///
    /// Fields are moved into the entry, so the caller keeps no handle to them.
    /// Caller info is only captured when `need_caller` is set.
    ///
    /// # Example
    ///
    /// ```
    /// use fieldlog::{Entry, Field, LogLevel};
    ///
    /// let entry = Entry::new(false, LogLevel::Info, "hello", [Field::string("k", "v")]);
    /// assert_eq!(entry.message(), "hello");
    /// assert_eq!(entry.fields()[0].key(), "k");
    /// assert!(entry.caller().is_none());
    /// entry.release();
    /// ```
    #[track_caller]
    pub fn new<I>(need_caller: bool, level: LogLevel, message: &str, fields: I) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        Self::assemble(need_caller, None, level, message, fields)
    }

    #[track_caller]
    pub(crate) fn assemble<I>(
        need_caller: bool,
        function: Option<&'static str>,
        level: LogLevel,
        message: &str,
        fields: I,
    ) -> Self
    where
        I: IntoIterator<Item = Field>,
    {
        let mut entry = ENTRY_POOL.acquire();
        TimestampCache::global().now_into(&mut entry.timestamp);
        entry.level = level;
        entry.message.push_str(message);
        if need_caller {
            entry.caller = Some(CallerInfo::capture(function));
        }
        entry.fields.extend(fields);
        entry
    }

    #[inline]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    #[inline]
    pub fn level(&self) -> LogLevel {
        self.level
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    pub fn caller(&self) -> Option<&CallerInfo> {
        self.caller.as_ref()
    }

    #[inline]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Zero the entry, release its fields and return it to the pool.
    pub fn release(self) {
        ENTRY_POOL.release(self);
    }
}

impl Recycle for Entry {
    fn recycle(&mut self) {
        self.timestamp.clear();
        self.level = LogLevel::default();
        self.message.clear();
        self.caller = None;
        // drain keeps the vector's capacity
        for field in self.fields.drain(..) {
            field.release();
        }
    }

    fn retained_bytes(&self) -> usize {
        self.timestamp.capacity()
            + self.message.capacity()
            + self.fields.capacity() * std::mem::size_of::<Field>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::field::FieldKind;

    #[test]
    fn test_entry_without_caller() {
        let entry = Entry::new(
            false,
            LogLevel::Warn,
            "disk almost full",
            [Field::uint("free_mb", 12u32), Field::bool("critical", false)],
        );

        assert_eq!(entry.level(), LogLevel::Warn);
        assert_eq!(entry.message(), "disk almost full");
        assert!(entry.caller().is_none());
        assert_eq!(entry.timestamp().len(), 19);

        let keys: Vec<&str> = entry.fields().iter().map(Field::key).collect();
        assert_eq!(keys, ["free_mb", "critical"]);
        entry.release();
    }

    #[test]
    fn test_entry_captures_call_site() {
        let line = line!() + 1;
        let entry = Entry::new(true, LogLevel::Info, "here", std::iter::empty());

        let caller = entry.caller().expect("caller requested");
        assert_eq!(caller.file, "log_entry.rs");
        assert_eq!(caller.line, line);
        assert_eq!(caller.function, UNKNOWN_FUNCTION);
        entry.release();
    }

    #[test]
    fn test_assemble_with_function() {
        let entry = Entry::assemble(
            true,
            Some(module_path!()),
            LogLevel::Debug,
            "tracked",
            std::iter::empty(),
        );
        assert_eq!(entry.caller().unwrap().function, module_path!());
        entry.release();
    }

    #[test]
    fn test_recycle_zeroes_entry() {
        let mut entry = Entry::new(
            true,
            LogLevel::Error,
            "boom",
            [Field::string("request", "abc"), Field::int("code", 500)],
        );
        let capacity = entry.fields.capacity();
        entry.recycle();

        assert_eq!(entry.timestamp(), "");
        assert_eq!(entry.level(), LogLevel::default());
        assert_eq!(entry.message(), "");
        assert!(entry.caller().is_none());
        assert!(entry.fields().is_empty());
        assert_eq!(entry.fields.capacity(), capacity);
    }

    #[test]
    fn test_huge_message_is_not_pooled() {
        let message = "m".repeat(1024 * 1024);
        let mut entry = Entry::new(false, LogLevel::Info, &message, std::iter::empty());
        entry.recycle();
        assert!(entry.retained_bytes() > ENTRY_POOL_MAX_RETAINED);

        let oversized = ENTRY_POOL.oversized_count();
        Entry::new(false, LogLevel::Info, &message, std::iter::empty()).release();
        assert!(ENTRY_POOL.oversized_count() > oversized);
    }

    #[test]
    fn test_reused_entry_is_clean() {
        for i in 0..32 {
            Entry::new(
                true,
                LogLevel::Fatal,
                "previous occupant",
                [Field::string("secret", format!("value-{i}"))],
            )
            .release();
        }

        let entry = Entry::new(false, LogLevel::Info, "fresh", [Field::int("n", 1)]);
        assert_eq!(entry.message(), "fresh");
        assert!(entry.caller().is_none());
        assert_eq!(entry.fields().len(), 1);
        assert_eq!(entry.fields()[0].key(), "n");
        assert_eq!(entry.fields()[0].kind(), FieldKind::Int);
        entry.release();
    }
}
