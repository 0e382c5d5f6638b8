//! Process-wide caches for timestamps and caller file names
//!
//! Both caches start empty and live for the whole process. They are
//! read-mostly: the fast path only takes a shared lock.

use chrono::{DateTime, Local};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt::Write;
use std::sync::OnceLock;

/// Layout of the record timestamp.
pub const TIMESTAMP_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

struct CachedSecond {
    second: i64,
    text: String,
}

/// Second-granularity cache of the formatted wall clock.
///
/// Readers compare the current second with the cached one under a read
/// lock. On a miss the writer re-checks under the write lock before
/// formatting, so concurrent misses for the same second format it once.
pub struct TimestampCache {
    state: RwLock<CachedSecond>,
}

static GLOBAL_TIMESTAMPS: TimestampCache = TimestampCache::new();

impl TimestampCache {
    pub const fn new() -> Self {
        Self {
            state: parking_lot::const_rwlock(CachedSecond {
                second: i64::MIN,
                text: String::new(),
            }),
        }
    }

    /// The cache shared by every logger in the process
    pub fn global() -> &'static TimestampCache {
        &GLOBAL_TIMESTAMPS
    }

    /// Append the current timestamp to `out`.
    pub fn now_into(&self, out: &mut String) {
        self.at_into(&Local::now(), out);
    }

    pub fn now(&self) -> String {
        let mut out = String::with_capacity(TIMESTAMP_LAYOUT.len() + 2);
        self.now_into(&mut out);
        out
    }

    /// Append the formatted form of `now` to `out`, refreshing the cache when
    /// `now` falls in a different second.
    pub fn at_into(&self, now: &DateTime<Local>, out: &mut String) {
        let second = now.timestamp();
        {
            let cached = self.state.read();
            if cached.second == second {
                out.push_str(&cached.text);
                return;
            }
        }

        let mut cached = self.state.write();
        if cached.second != second {
            cached.text.clear();
            // formatting into a String only fails on an invalid layout
            let _ = write!(cached.text, "{}", now.format(TIMESTAMP_LAYOUT));
            cached.second = second;
        }
        out.push_str(&cached.text);
    }

    /// The second currently held by the cache, if any
    pub fn cached_second(&self) -> Option<i64> {
        let second = self.state.read().second;
        (second != i64::MIN).then_some(second)
    }
}

impl Default for TimestampCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Memoized mapping from a full source path to its file name.
///
/// Source paths come from `std::panic::Location` and are `'static`, so the
/// map never needs invalidation.
pub struct CallerCache {
    names: RwLock<HashMap<&'static str, &'static str>>,
}

impl CallerCache {
    pub fn new() -> Self {
        Self {
            names: RwLock::new(HashMap::new()),
        }
    }

    pub fn global() -> &'static CallerCache {
        static GLOBAL: OnceLock<CallerCache> = OnceLock::new();
        GLOBAL.get_or_init(CallerCache::new)
    }

    pub fn base_name(&self, path: &'static str) -> &'static str {
        if let Some(name) = self.names.read().get(path) {
            return *name;
        }

        let name = path
            .rsplit(|c: char| c == '/' || c == '\\')
            .next()
            .unwrap_or(path);
        self.names.write().insert(path, name);
        name
    }

    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }
}

impl Default for CallerCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2025, 1, 8, h, m, s)
            .earliest()
            .expect("valid local time")
    }

    #[test]
    fn test_timestamp_layout() {
        let cache = TimestampCache::new();
        let mut out = String::new();
        cache.at_into(&at(10, 30, 45), &mut out);
        assert_eq!(out, "2025-01-08 10:30:45");
    }

    #[test]
    fn test_same_second_is_cached() {
        let cache = TimestampCache::new();
        assert_eq!(cache.cached_second(), None);

        let first = at(10, 30, 45);
        let mut out = String::new();
        cache.at_into(&first, &mut out);
        assert_eq!(cache.cached_second(), Some(first.timestamp()));

        let same_second = first + chrono::Duration::milliseconds(400);
        let mut again = String::new();
        cache.at_into(&same_second, &mut again);
        assert_eq!(out, again);
    }

    #[test]
    fn test_new_second_refreshes() {
        let cache = TimestampCache::new();
        let mut out = String::new();
        cache.at_into(&at(10, 30, 45), &mut out);
        out.clear();
        cache.at_into(&at(10, 30, 46), &mut out);
        assert_eq!(out, "2025-01-08 10:30:46");
    }

    #[test]
    fn test_concurrent_readers_see_whole_strings() {
        use std::sync::Arc;

        let cache = Arc::new(TimestampCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for j in 0..200 {
                        let mut out = String::new();
                        cache.at_into(&at(10, (i + j) % 60, j % 60), &mut out);
                        assert_eq!(out.len(), "2025-01-08 10:30:45".len());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_now_has_fixed_width() {
        let now = TimestampCache::global().now();
        assert_eq!(now.len(), 19);
        assert_eq!(&now[4..5], "-");
        assert_eq!(&now[10..11], " ");
    }

    #[test]
    fn test_base_name() {
        let cache = CallerCache::new();
        assert_eq!(cache.base_name("src/core/logger.rs"), "logger.rs");
        assert_eq!(cache.base_name("C:\\proj\\src\\main.rs"), "main.rs");
        assert_eq!(cache.base_name("lib.rs"), "lib.rs");
        assert_eq!(cache.len(), 3);

        // memoized: same path does not grow the map
        assert_eq!(cache.base_name("src/core/logger.rs"), "logger.rs");
        assert_eq!(cache.len(), 3);
    }
}
