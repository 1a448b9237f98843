//! Closed option enumerations for SQLite connections.
//!
//! Each enumeration parses from the string literal used in a pragma table.
//! Matching is ASCII case-insensitive and ignores surrounding whitespace, so
//! `"INTEGER"`, `"integer"` and `" Integer "` all resolve to
//! [`DateClass::Integer`]. Anything else is a parse error naming the option.

use crate::pragma::Pragma;
use serde::{Deserialize, Serialize};
use sqlconfig_core::ConfigError;
use std::fmt;
use std::str::FromStr;

/// How date/time columns are stored and read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateClass {
    /// Integer units since the Unix epoch (see [`DatePrecision`]).
    #[default]
    Integer,
    /// Text rendered with the connection's date format patterns.
    Text,
    /// Floating-point julian day number.
    Real,
}

/// Unit of integer-stored dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePrecision {
    #[default]
    Milliseconds,
    Seconds,
}

/// Which `BEGIN` variant starts a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionMode {
    /// `BEGIN` - locks are acquired on first read/write.
    #[default]
    Deferred,
    /// `BEGIN IMMEDIATE` - a write lock is acquired up front.
    Immediate,
    /// `BEGIN EXCLUSIVE` - no other connection may read or write.
    Exclusive,
}

impl DateClass {
    pub const LITERALS: [&'static str; 3] = ["integer", "text", "real"];

    /// Canonical pragma literal.
    pub const fn as_str(self) -> &'static str {
        match self {
            DateClass::Integer => "integer",
            DateClass::Text => "text",
            DateClass::Real => "real",
        }
    }
}

impl DatePrecision {
    pub const LITERALS: [&'static str; 2] = ["milliseconds", "seconds"];

    /// Canonical pragma literal.
    pub const fn as_str(self) -> &'static str {
        match self {
            DatePrecision::Milliseconds => "milliseconds",
            DatePrecision::Seconds => "seconds",
        }
    }

    /// Milliseconds per stored integer unit.
    pub const fn multiplier(self) -> i64 {
        match self {
            DatePrecision::Milliseconds => 1,
            DatePrecision::Seconds => 1000,
        }
    }
}

impl TransactionMode {
    pub const LITERALS: [&'static str; 3] = ["deferred", "immediate", "exclusive"];

    /// Canonical pragma literal.
    pub const fn as_str(self) -> &'static str {
        match self {
            TransactionMode::Deferred => "deferred",
            TransactionMode::Immediate => "immediate",
            TransactionMode::Exclusive => "exclusive",
        }
    }

    /// Statement that opens a transaction in this mode.
    pub const fn begin_statement(self) -> &'static str {
        match self {
            TransactionMode::Deferred => "begin;",
            TransactionMode::Immediate => "begin immediate;",
            TransactionMode::Exclusive => "begin exclusive;",
        }
    }
}

/// Find the literal in `literals` matching `raw`, ignoring case and padding.
fn match_literal(raw: &str, literals: &[&str]) -> Option<usize> {
    let trimmed = raw.trim();
    literals
        .iter()
        .position(|lit| lit.eq_ignore_ascii_case(trimmed))
}

impl FromStr for DateClass {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match match_literal(s, &Self::LITERALS) {
            Some(0) => Ok(DateClass::Integer),
            Some(1) => Ok(DateClass::Text),
            Some(2) => Ok(DateClass::Real),
            _ => Err(ConfigError::parse(
                Pragma::DateClass.name(),
                s,
                &Self::LITERALS,
            )),
        }
    }
}

impl FromStr for DatePrecision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match match_literal(s, &Self::LITERALS) {
            Some(0) => Ok(DatePrecision::Milliseconds),
            Some(1) => Ok(DatePrecision::Seconds),
            _ => Err(ConfigError::parse(
                Pragma::DatePrecision.name(),
                s,
                &Self::LITERALS,
            )),
        }
    }
}

impl FromStr for TransactionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match match_literal(s, &Self::LITERALS) {
            Some(0) => Ok(TransactionMode::Deferred),
            Some(1) => Ok(TransactionMode::Immediate),
            Some(2) => Ok(TransactionMode::Exclusive),
            // Misspelling accepted by older drivers.
            _ if s.trim().eq_ignore_ascii_case("deffered") => {
                tracing::warn!(
                    value = s,
                    "transaction mode 'DEFFERED' is deprecated, use 'deferred'"
                );
                Ok(TransactionMode::Deferred)
            }
            _ => Err(ConfigError::parse(
                Pragma::TransactionMode.name(),
                s,
                &Self::LITERALS,
            )),
        }
    }
}

impl fmt::Display for DateClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for DatePrecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TransactionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
