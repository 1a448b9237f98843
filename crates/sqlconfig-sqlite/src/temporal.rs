//! Storing and reading temporal values under a connection's date settings.
//!
//! SQLite has no date type, so a driver binds dates as INTEGER, TEXT or REAL
//! depending on [`DateClass`]. Reading accepts any of the three, since a
//! column may hold values written under different settings.

#![allow(clippy::cast_possible_truncation)]

use crate::config::ConnectionConfig;
use crate::date_format::DateFormat;
use crate::types::DateClass;
use sqlconfig_core::{Error, Result, TypeError};

/// Julian day number of 1970-01-01T00:00:00Z.
const UNIX_EPOCH_JULIAN_DAY: f64 = 2_440_587.5;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Which formatter a value is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemporalKind {
    Date,
    Time,
    Timestamp,
}

/// A temporal value in one of SQLite's storage classes.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredDate {
    Integer(i64),
    Text(String),
    Real(f64),
}

impl StoredDate {
    /// Storage class this value belongs to.
    pub const fn date_class(&self) -> DateClass {
        match self {
            StoredDate::Integer(_) => DateClass::Integer,
            StoredDate::Text(_) => DateClass::Text,
            StoredDate::Real(_) => DateClass::Real,
        }
    }
}

fn out_of_range(expected: &'static str, actual: impl ToString) -> Error {
    Error::Type(TypeError {
        expected,
        actual: actual.to_string(),
        rust_type: Some("i64"),
    })
}

impl ConnectionConfig {
    /// Compiled formatter for `kind`.
    pub fn formatter(&self, kind: TemporalKind) -> &DateFormat {
        match kind {
            TemporalKind::Date => self.date_format(),
            TemporalKind::Time => self.time_format(),
            TemporalKind::Timestamp => self.timestamp_format(),
        }
    }

    /// Convert epoch milliseconds to the value bound for a date parameter.
    ///
    /// Integer storage divides by the date multiplier (truncating toward
    /// zero), text storage renders with the formatter for `kind` in UTC, and
    /// real storage writes a julian day number.
    pub fn encode_millis(&self, kind: TemporalKind, millis: i64) -> Result<StoredDate> {
        let stored = match self.date_class() {
            DateClass::Integer => StoredDate::Integer(millis / self.date_multiplier()),
            DateClass::Text => StoredDate::Text(self.formatter(kind).format_millis(millis)?),
            DateClass::Real => {
                StoredDate::Real(millis as f64 / MILLIS_PER_DAY + UNIX_EPOCH_JULIAN_DAY)
            }
        };
        tracing::trace!(millis, kind = ?kind, stored = ?stored, "Encoded temporal value");
        Ok(stored)
    }

    /// Convert a stored column value back to epoch milliseconds.
    pub fn decode_millis(&self, kind: TemporalKind, stored: &StoredDate) -> Result<i64> {
        match stored {
            StoredDate::Integer(units) => {
                units.checked_mul(self.date_multiplier()).ok_or_else(|| {
                    out_of_range("integer date within the i64 millisecond range", units)
                })
            }
            StoredDate::Text(text) => self.formatter(kind).parse_millis(text),
            StoredDate::Real(julian) => {
                let millis = ((julian - UNIX_EPOCH_JULIAN_DAY) * MILLIS_PER_DAY).round();
                if millis.is_finite() && millis >= i64::MIN as f64 && millis < i64::MAX as f64 {
                    Ok(millis as i64)
                } else {
                    Err(out_of_range("finite julian day number", julian))
                }
            }
        }
    }
}
