//! Typed key/value fields for structured logging
//!
//! A [`Field`] pairs a key with one [`FieldValue`]. Constructors draw the
//! field from a process-wide pool so the key buffer is reused across calls;
//! [`Field::release`] zeroes it and hands it back.

use super::pool::{Pool, Recycle};
use chrono::{DateTime, FixedOffset, Offset, TimeZone};
use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Layout used when rendering time fields.
pub const TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

const FIELD_POOL_IDLE: usize = 1024;
const FIELD_POOL_MAX_RETAINED: usize = 4 * 1024;

static FIELD_POOL: Pool<Field> = Pool::with_retained_limit(FIELD_POOL_IDLE, FIELD_POOL_MAX_RETAINED);

/// Shared, type-erased error carried by an error field.
pub type SharedError = Arc<dyn Error + Send + Sync>;

/// Discriminant of a [`FieldValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    String,
    Int,
    Float,
    Bool,
    Time,
    Duration,
    Uint,
    Error,
}

/// Value type for structured logging fields
#[derive(Debug, Clone)]
pub enum FieldValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Time(DateTime<FixedOffset>),
    Duration(Duration),
    Uint(u64),
    Error(Option<SharedError>),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::String(String::new())
    }
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Time(_) => FieldKind::Time,
            FieldValue::Duration(_) => FieldKind::Duration,
            FieldValue::Uint(_) => FieldKind::Uint,
            FieldValue::Error(_) => FieldKind::Error,
        }
    }

    /// Reset to the zero form. A string slot keeps its buffer.
    fn clear(&mut self) {
        match self {
            FieldValue::String(s) => s.clear(),
            other => *other = FieldValue::default(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => f.write_str(s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write_float(f, *fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Time(t) => write!(f, "{}", t.format(TIME_LAYOUT)),
            FieldValue::Duration(d) => write_duration(f, *d),
            FieldValue::Uint(u) => write!(f, "{}", u),
            FieldValue::Error(Some(err)) => write!(f, "{}", err),
            FieldValue::Error(None) => Ok(()),
        }
    }
}

/// Magnitudes at or above this render in exponent form
const FLOAT_EXP_UPPER: f64 = 1e21;
/// Non-zero magnitudes below this render in exponent form
const FLOAT_EXP_LOWER: f64 = 1e-6;

/// Shortest digits that round-trip. Plain decimal in the usual range,
/// `1e300` / `1.5e-7` style outside it.
fn write_float(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    let magnitude = value.abs();
    if value.is_finite() && value != 0.0 && !(FLOAT_EXP_LOWER..FLOAT_EXP_UPPER).contains(&magnitude) {
        write!(f, "{:e}", value)
    } else {
        write!(f, "{}", value)
    }
}

/// Render a duration with unit suffixes: `0s`, `750ns`, `1.5µs`, `250ms`,
/// `5s`, `1m30s`, `1h0m0s`.
fn write_duration(f: &mut fmt::Formatter<'_>, d: Duration) -> fmt::Result {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return f.write_str("0s");
    }
    if nanos < 1_000 {
        return write!(f, "{}ns", nanos);
    }
    if nanos < 1_000_000 {
        write_fraction(f, nanos, 1_000, 3)?;
        return f.write_str("µs");
    }
    if nanos < 1_000_000_000 {
        write_fraction(f, nanos, 1_000_000, 6)?;
        return f.write_str("ms");
    }

    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    if hours > 0 {
        write!(f, "{}h", hours)?;
    }
    if hours > 0 || minutes > 0 {
        write!(f, "{}m", minutes)?;
    }
    let sub_minute = u128::from(secs % 60) * 1_000_000_000 + u128::from(d.subsec_nanos());
    write_fraction(f, sub_minute, 1_000_000_000, 9)?;
    f.write_str("s")
}

fn write_fraction(f: &mut fmt::Formatter<'_>, value: u128, unit: u128, digits: usize) -> fmt::Result {
    let whole = value / unit;
    let rest = value % unit;
    if rest == 0 {
        return write!(f, "{}", whole);
    }
    let frac = format!("{:0width$}", rest, width = digits);
    write!(f, "{}.{}", whole, frac.trim_end_matches('0'))
}

/// A keyed, typed value attached to a log record.
///
/// `Field::default()` is the never-initialized value: empty key and an empty
/// string value. Every accessor is valid on it.
#[derive(Debug, Default)]
pub struct Field {
    key: String,
    value: FieldValue,
}

impl Field {
    fn pooled(key: &str, value: FieldValue) -> Self {
        let mut field = FIELD_POOL.acquire();
        field.key.push_str(key);
        field.value = value;
        field
    }

    pub fn string(key: &str, value: impl AsRef<str>) -> Self {
        let mut field = FIELD_POOL.acquire();
        field.key.push_str(key);
        // reuse the recycled string buffer when the slot still has one
        match &mut field.value {
            FieldValue::String(s) => s.push_str(value.as_ref()),
            slot => *slot = FieldValue::String(value.as_ref().to_owned()),
        }
        field
    }

    pub fn int(key: &str, value: impl Into<i64>) -> Self {
        Self::pooled(key, FieldValue::Int(value.into()))
    }

    pub fn uint(key: &str, value: impl Into<u64>) -> Self {
        Self::pooled(key, FieldValue::Uint(value.into()))
    }

    pub fn float(key: &str, value: f64) -> Self {
        Self::pooled(key, FieldValue::Float(value))
    }

    pub fn bool(key: &str, value: bool) -> Self {
        Self::pooled(key, FieldValue::Bool(value))
    }

    /// Time field. The value keeps its original UTC offset.
    pub fn time<Tz: TimeZone>(key: &str, value: DateTime<Tz>) -> Self {
        let offset = value.offset().fix();
        Self::pooled(key, FieldValue::Time(value.with_timezone(&offset)))
    }

    pub fn duration(key: &str, value: Duration) -> Self {
        Self::pooled(key, FieldValue::Duration(value))
    }

    pub fn error<E>(key: &str, err: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::pooled(key, FieldValue::Error(Some(Arc::new(err))))
    }

    /// Error field from an optional error; `None` renders as an empty value.
    pub fn maybe_error<E>(key: &str, err: Option<E>) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let err = err.map(|e| Arc::new(e) as SharedError);
        Self::pooled(key, FieldValue::Error(err))
    }

    pub fn shared_error(key: &str, err: Option<SharedError>) -> Self {
        Self::pooled(key, FieldValue::Error(err))
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        self.value.kind()
    }

    #[inline]
    pub fn value_ref(&self) -> &FieldValue {
        &self.value
    }

    /// Canonical string rendering of the value.
    pub fn value(&self) -> String {
        self.value.to_string()
    }

    /// Zero the field and return it to the pool.
    pub fn release(self) {
        FIELD_POOL.release(self);
    }
}

impl Recycle for Field {
    fn recycle(&mut self) {
        self.key.clear();
        self.value.clear();
    }

    fn retained_bytes(&self) -> usize {
        let value = match &self.value {
            FieldValue::String(s) => s.capacity(),
            _ => 0,
        };
        self.key.capacity() + value
    }
}

impl Clone for Field {
    fn clone(&self) -> Self {
        let mut field = FIELD_POOL.acquire();
        field.clone_from(self);
        field
    }

    fn clone_from(&mut self, source: &Self) {
        self.key.clone_from(&source.key);
        match (&mut self.value, &source.value) {
            (FieldValue::String(dst), FieldValue::String(src)) => dst.clone_from(src),
            (dst, src) => *dst = src.clone(),
        }
    }
}
