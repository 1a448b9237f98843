//! Connection-local configuration.
//!
//! A [`ConnectionConfig`] is owned by exactly one connection. It is built
//! once, either from typed values or from a [`PragmaTable`], and then mutated
//! as the session changes settings. A derived session gets its own copy via
//! [`ConnectionConfig::copy_config`]; the two never share state afterwards.
//!
//! ```rust,ignore
//! use sqlconfig_sqlite::{ConnectionConfig, Pragma, PragmaTable, TransactionMode};
//!
//! let table = PragmaTable::new().with(Pragma::TransactionMode, "immediate");
//! let mut config = ConnectionConfig::from_pragma_table(&table)?;
//! assert_eq!(config.transaction_prefix(), "begin immediate;");
//!
//! config.set_timestamp_string_format("dd/MM/yyyy HH:mm")?;
//! let child = config.copy_config();
//! ```
//!
//! No locking happens here. A connection shared between tasks must guard its
//! config with its own mutex, including read sequences that span fields.

use crate::date_format::{
    DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT, DEFAULT_TIMESTAMP_FORMAT, DateFormat,
};
use crate::pragma::{Pragma, PragmaTable};
use crate::types::{DateClass, DatePrecision, TransactionMode};
use serde::{Deserialize, Serialize};
use sqlconfig_core::{Error, IsolationLevel, Result};

/// Mutable settings of a single SQLite connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    date_class: DateClass,
    date_precision: DatePrecision,
    date_format: DateFormat,
    time_format: DateFormat,
    timestamp_format: DateFormat,
    transaction_isolation: IsolationLevel,
    transaction_mode: TransactionMode,
    auto_commit: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(
            DateClass::default(),
            DatePrecision::default(),
            DateFormat::builtin(DEFAULT_DATE_FORMAT),
            DateFormat::builtin(DEFAULT_TIME_FORMAT),
            DateFormat::builtin(DEFAULT_TIMESTAMP_FORMAT),
            IsolationLevel::Serializable,
            TransactionMode::default(),
            true,
        )
    }
}

/// Compile a pattern option, tagging any error with the option key.
fn format_option(table: &PragmaTable, pragma: Pragma, default: &str) -> Result<DateFormat> {
    DateFormat::compile(table.pragma_or(pragma, default)).map_err(|err| match err {
        Error::Config(e) => Error::Config(e.with_key(pragma.name())),
        other => other,
    })
}

impl ConnectionConfig {
    /// Build a config from typed values.
    ///
    /// The formats are already compiled, so construction cannot fail.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        date_class: DateClass,
        date_precision: DatePrecision,
        date_format: DateFormat,
        time_format: DateFormat,
        timestamp_format: DateFormat,
        transaction_isolation: IsolationLevel,
        transaction_mode: TransactionMode,
        auto_commit: bool,
    ) -> Self {
        Self {
            date_class,
            date_precision,
            date_format,
            time_format,
            timestamp_format,
            transaction_isolation,
            transaction_mode,
            auto_commit,
        }
    }

    /// Build a config from typed values and uncompiled patterns.
    ///
    /// All three patterns are compiled before anything is built; the first
    /// invalid pattern is returned as a format-compile error.
    #[allow(clippy::too_many_arguments)]
    pub fn from_patterns(
        date_class: DateClass,
        date_precision: DatePrecision,
        date_pattern: &str,
        time_pattern: &str,
        timestamp_pattern: &str,
        transaction_isolation: IsolationLevel,
        transaction_mode: TransactionMode,
        auto_commit: bool,
    ) -> Result<Self> {
        Ok(Self::new(
            date_class,
            date_precision,
            DateFormat::compile(date_pattern)?,
            DateFormat::compile(time_pattern)?,
            DateFormat::compile(timestamp_pattern)?,
            transaction_isolation,
            transaction_mode,
            auto_commit,
        ))
    }

    /// Build a config from a pragma table.
    ///
    /// Absent options take their defaults: `integer` date class,
    /// `milliseconds` precision, the `DEFAULT_*_FORMAT` patterns and
    /// `deferred` transactions. Isolation is always serializable and
    /// auto-commit always on. An option that is present but invalid is an
    /// error naming that option; it never falls back to the default.
    #[tracing::instrument(level = "debug", skip(table), fields(entries = table.len()))]
    pub fn from_pragma_table(table: &PragmaTable) -> Result<Self> {
        let date_class = table
            .pragma(Pragma::DateClass)
            .map(str::parse::<DateClass>)
            .transpose()?
            .unwrap_or_default();
        let date_precision = table
            .pragma(Pragma::DatePrecision)
            .map(str::parse::<DatePrecision>)
            .transpose()?
            .unwrap_or_default();
        let date_format = format_option(table, Pragma::DateStringFormat, DEFAULT_DATE_FORMAT)?;
        let time_format = format_option(table, Pragma::TimeStringFormat, DEFAULT_TIME_FORMAT)?;
        let timestamp_format = format_option(
            table,
            Pragma::TimestampStringFormat,
            DEFAULT_TIMESTAMP_FORMAT,
        )?;
        let transaction_mode = table
            .pragma(Pragma::TransactionMode)
            .map(str::parse::<TransactionMode>)
            .transpose()?
            .unwrap_or_default();

        for key in table.unknown_keys() {
            tracing::trace!(key = key, "Ignoring option not handled by connection config");
        }

        tracing::debug!(
            date_class = %date_class,
            date_precision = %date_precision,
            date_format = %date_format,
            time_format = %time_format,
            timestamp_format = %timestamp_format,
            transaction_mode = %transaction_mode,
            "Loaded connection config from pragma table"
        );

        Ok(Self::new(
            date_class,
            date_precision,
            date_format,
            time_format,
            timestamp_format,
            IsolationLevel::Serializable,
            transaction_mode,
            true,
        ))
    }

    /// Render this config back into a pragma table.
    ///
    /// Only options the table can express are written; isolation and
    /// auto-commit are connection state, not pragmas.
    pub fn to_pragma_table(&self) -> PragmaTable {
        PragmaTable::new()
            .with(Pragma::DateClass, self.date_class.as_str())
            .with(Pragma::DatePrecision, self.date_precision.as_str())
            .with(Pragma::DateStringFormat, self.date_format.pattern())
            .with(Pragma::TimeStringFormat, self.time_format.pattern())
            .with(Pragma::TimestampStringFormat, self.timestamp_format.pattern())
            .with(Pragma::TransactionMode, self.transaction_mode.as_str())
    }

    /// Independent copy for a derived session.
    ///
    /// The compiled formats are deep-copied, so changing a pattern on either
    /// side never shows through on the other.
    pub fn copy_config(&self) -> Self {
        tracing::debug!(
            date_class = %self.date_class,
            transaction_mode = %self.transaction_mode,
            "Copying connection config"
        );
        self.clone()
    }

    /// Milliseconds per stored integer date unit.
    ///
    /// Depends only on the date precision, never on the date class.
    pub const fn date_multiplier(&self) -> i64 {
        self.date_precision.multiplier()
    }

    /// Statement that begins a transaction in the configured mode.
    pub const fn transaction_prefix(&self) -> &'static str {
        self.transaction_mode.begin_statement()
    }

    pub const fn date_class(&self) -> DateClass {
        self.date_class
    }

    pub fn set_date_class(&mut self, date_class: DateClass) {
        self.date_class = date_class;
    }

    #[must_use]
    pub fn with_date_class(mut self, date_class: DateClass) -> Self {
        self.date_class = date_class;
        self
    }

    pub const fn date_precision(&self) -> DatePrecision {
        self.date_precision
    }

    pub fn set_date_precision(&mut self, date_precision: DatePrecision) {
        self.date_precision = date_precision;
    }

    #[must_use]
    pub fn with_date_precision(mut self, date_precision: DatePrecision) -> Self {
        self.date_precision = date_precision;
        self
    }

    /// Pattern used for date values.
    pub fn date_string_format(&self) -> &str {
        self.date_format.pattern()
    }

    /// Compiled formatter for date values.
    pub fn date_format(&self) -> &DateFormat {
        &self.date_format
    }

    /// Replace the date pattern and its formatter.
    ///
    /// On error the previous pattern stays in effect.
    pub fn set_date_string_format(&mut self, pattern: &str) -> Result<()> {
        self.set_date_format(DateFormat::compile(pattern)?);
        Ok(())
    }

    pub fn set_date_format(&mut self, format: DateFormat) {
        tracing::debug!(from = %self.date_format, to = %format, "Date format changed");
        self.date_format = format;
    }

    pub fn with_date_string_format(mut self, pattern: &str) -> Result<Self> {
        self.set_date_string_format(pattern)?;
        Ok(self)
    }

    /// Pattern used for time values.
    pub fn time_string_format(&self) -> &str {
        self.time_format.pattern()
    }

    /// Compiled formatter for time values.
    pub fn time_format(&self) -> &DateFormat {
        &self.time_format
    }

    /// Replace the time pattern and its formatter.
    ///
    /// On error the previous pattern stays in effect.
    pub fn set_time_string_format(&mut self, pattern: &str) -> Result<()> {
        self.set_time_format(DateFormat::compile(pattern)?);
        Ok(())
    }

    pub fn set_time_format(&mut self, format: DateFormat) {
        tracing::debug!(from = %self.time_format, to = %format, "Time format changed");
        self.time_format = format;
    }

    pub fn with_time_string_format(mut self, pattern: &str) -> Result<Self> {
        self.set_time_string_format(pattern)?;
        Ok(self)
    }

    /// Pattern used for timestamp values.
    pub fn timestamp_string_format(&self) -> &str {
        self.timestamp_format.pattern()
    }

    /// Compiled formatter for timestamp values.
    pub fn timestamp_format(&self) -> &DateFormat {
        &self.timestamp_format
    }

    /// Replace the timestamp pattern and its formatter.
    ///
    /// On error the previous pattern stays in effect.
    pub fn set_timestamp_string_format(&mut self, pattern: &str) -> Result<()> {
        self.set_timestamp_format(DateFormat::compile(pattern)?);
        Ok(())
    }

    pub fn set_timestamp_format(&mut self, format: DateFormat) {
        tracing::debug!(from = %self.timestamp_format, to = %format, "Timestamp format changed");
        self.timestamp_format = format;
    }

    pub fn with_timestamp_string_format(mut self, pattern: &str) -> Result<Self> {
        self.set_timestamp_string_format(pattern)?;
        Ok(self)
    }

    /// Reported isolation level. Not enforced by this crate.
    pub const fn transaction_isolation(&self) -> IsolationLevel {
        self.transaction_isolation
    }

    pub fn set_transaction_isolation(&mut self, isolation: IsolationLevel) {
        self.transaction_isolation = isolation;
    }

    #[must_use]
    pub fn with_transaction_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.transaction_isolation = isolation;
        self
    }

    pub const fn transaction_mode(&self) -> TransactionMode {
        self.transaction_mode
    }

    pub fn set_transaction_mode(&mut self, mode: TransactionMode) {
        self.transaction_mode = mode;
    }

    #[must_use]
    pub fn with_transaction_mode(mut self, mode: TransactionMode) -> Self {
        self.transaction_mode = mode;
        self
    }

    pub const fn is_auto_commit(&self) -> bool {
        self.auto_commit
    }

    pub fn set_auto_commit(&mut self, auto_commit: bool) {
        self.auto_commit = auto_commit;
    }

    #[must_use]
    pub fn with_auto_commit(mut self, auto_commit: bool) -> Self {
        self.auto_commit = auto_commit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_matches_empty_table() {
        let from_table = ConnectionConfig::from_pragma_table(&PragmaTable::new()).unwrap();
        assert_eq!(from_table, ConnectionConfig::default());
    }

    #[test]
    fn test_empty_table_defaults() {
        let config = ConnectionConfig::from_pragma_table(&PragmaTable::new()).unwrap();

        assert_eq!(config.date_class(), DateClass::Integer);
        assert_eq!(config.date_precision(), DatePrecision::Milliseconds);
        assert_eq!(config.date_string_format(), "yyyy-MM-dd");
        assert_eq!(config.time_string_format(), "HH:mm:ss.SSS");
        assert_eq!(config.timestamp_string_format(), "yyyy-MM-dd HH:mm:ss.SSS");
        assert_eq!(config.transaction_mode(), TransactionMode::Deferred);
        assert_eq!(config.transaction_isolation(), IsolationLevel::Serializable);
        assert!(config.is_auto_commit());
    }

    #[test]
    fn test_table_overrides() {
        let table = PragmaTable::new()
            .with(Pragma::DateClass, "TEXT")
            .with(Pragma::DatePrecision, "seconds")
            .with(Pragma::DateStringFormat, "dd.MM.yyyy")
            .with(Pragma::TimeStringFormat, "HH:mm")
            .with(Pragma::TimestampStringFormat, "yyyy-MM-dd'T'HH:mm:ss")
            .with(Pragma::TransactionMode, "exclusive");
        let config = ConnectionConfig::from_pragma_table(&table).unwrap();

        assert_eq!(config.date_class(), DateClass::Text);
        assert_eq!(config.date_precision(), DatePrecision::Seconds);
        assert_eq!(config.date_string_format(), "dd.MM.yyyy");
        assert_eq!(config.time_string_format(), "HH:mm");
        assert_eq!(config.timestamp_string_format(), "yyyy-MM-dd'T'HH:mm:ss");
        assert_eq!(config.transaction_mode(), TransactionMode::Exclusive);
        assert_eq!(config.transaction_prefix(), "begin exclusive;");
    }

    #[test]
    fn test_invalid_option_is_not_defaulted() {
        let table = PragmaTable::new().with(Pragma::TransactionMode, "bogus");
        let err = ConnectionConfig::from_pragma_table(&table).unwrap_err();
        assert!(err.is_config_parse());
        assert_eq!(err.config_key(), Some("transaction_mode"));

        let table = PragmaTable::new().with(Pragma::DateClass, "blob");
        let err = ConnectionConfig::from_pragma_table(&table).unwrap_err();
        assert_eq!(err.config_key(), Some("date_class"));

        let table = PragmaTable::new().with(Pragma::DatePrecision, "");
        let err = ConnectionConfig::from_pragma_table(&table).unwrap_err();
        assert_eq!(err.config_key(), Some("date_precision"));
    }

    #[test]
    fn test_invalid_pattern_in_table_names_key() {
        let table = PragmaTable::new().with(Pragma::TimeStringFormat, "HH:mm:qq");
        let err = ConnectionConfig::from_pragma_table(&table).unwrap_err();
        assert!(err.is_format_compile());
        assert_eq!(err.config_key(), Some("time_string_format"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let table: PragmaTable = [("journal_mode", "wal"), ("foreign_keys", "on")]
            .into_iter()
            .collect();
        let config = ConnectionConfig::from_pragma_table(&table).unwrap();
        assert_eq!(config, ConnectionConfig::default());
    }

    #[test]
    fn test_isolation_not_read_from_table() {
        let table: PragmaTable = [("transaction_isolation", "1")].into_iter().collect();
        let config = ConnectionConfig::from_pragma_table(&table).unwrap();
        assert_eq!(config.transaction_isolation(), IsolationLevel::Serializable);
    }

    #[test]
    fn test_from_patterns_is_all_or_nothing() {
        let err = ConnectionConfig::from_patterns(
            DateClass::Text,
            DatePrecision::Milliseconds,
            "yyyy-MM-dd",
            "HH:mm",
            "yyyy-MM-dd 'HH:mm",
            IsolationLevel::Serializable,
            TransactionMode::Immediate,
            false,
        )
        .unwrap_err();
        assert!(err.is_format_compile());

        let config = ConnectionConfig::from_patterns(
            DateClass::Text,
            DatePrecision::Milliseconds,
            "yyyy-MM-dd",
            "HH:mm",
            "yyyy-MM-dd HH:mm",
            IsolationLevel::Serializable,
            TransactionMode::Immediate,
            false,
        )
        .unwrap();
        assert_eq!(config.time_string_format(), "HH:mm");
        assert!(!config.is_auto_commit());
    }

    #[test]
    fn test_format_setters_recompile() {
        let instant = NaiveDate::from_ymd_opt(2023, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 58, 7)
            .unwrap();
        let mut config = ConnectionConfig::default();

        config.set_date_string_format("MM/dd/yyyy").unwrap();
        config.set_time_string_format("hh:mm a").unwrap();
        config.set_timestamp_string_format("yyyyMMddHHmmssSSS").unwrap();

        assert_eq!(config.date_format().format(&instant), "12/31/2023");
        assert_eq!(config.time_format().format(&instant), "11:59 PM");
        assert_eq!(config.timestamp_format().format(&instant), "20231231235958007");
        assert_eq!(config.timestamp_string_format(), "yyyyMMddHHmmssSSS");
    }

    #[test]
    fn test_failed_setter_keeps_previous_format() {
        let mut config = ConnectionConfig::default();
        let err = config.set_date_string_format("yyyy-MM-dd'").unwrap_err();
        assert!(err.is_format_compile());
        assert_eq!(config.date_string_format(), DEFAULT_DATE_FORMAT);
        assert_eq!(config.date_format().pattern(), DEFAULT_DATE_FORMAT);
    }

    #[test]
    fn test_multiplier_ignores_date_class() {
        for class in [DateClass::Integer, DateClass::Text, DateClass::Real] {
            let config = ConnectionConfig::default().with_date_class(class);
            assert_eq!(config.date_multiplier(), 1);
            let config = config.with_date_precision(DatePrecision::Seconds);
            assert_eq!(config.date_multiplier(), 1000);
            assert_eq!(config.date_class(), class);
        }
    }

    #[test]
    fn test_transaction_prefix() {
        let mut config = ConnectionConfig::default();
        assert_eq!(config.transaction_prefix(), "begin;");
        config.set_transaction_mode(TransactionMode::Immediate);
        assert_eq!(config.transaction_prefix(), "begin immediate;");
        config.set_transaction_mode(TransactionMode::Exclusive);
        assert_eq!(config.transaction_prefix(), "begin exclusive;");
    }

    #[test]
    fn test_copy_is_independent() {
        let mut original = ConnectionConfig::default()
            .with_date_class(DateClass::Text)
            .with_auto_commit(false);
        let mut copy = original.copy_config();
        assert_eq!(copy, original);

        copy.set_timestamp_string_format("HH:mm").unwrap();
        copy.set_transaction_mode(TransactionMode::Exclusive);
        assert_eq!(original.timestamp_string_format(), DEFAULT_TIMESTAMP_FORMAT);
        assert_eq!(original.transaction_mode(), TransactionMode::Deferred);

        original.set_date_string_format("yyyy").unwrap();
        assert_eq!(copy.date_string_format(), DEFAULT_DATE_FORMAT);
        assert_eq!(copy.timestamp_format().format_millis(0).unwrap(), "00:00");
        assert_eq!(original.date_format().format_millis(0).unwrap(), "1970");
    }

    #[test]
    fn test_pragma_table_round_trip() {
        let config = ConnectionConfig::default()
            .with_date_class(DateClass::Real)
            .with_date_precision(DatePrecision::Seconds)
            .with_transaction_mode(TransactionMode::Immediate)
            .with_time_string_format("h:mm a")
            .unwrap();

        let table = config.to_pragma_table();
        assert_eq!(table.pragma(Pragma::DateClass), Some("real"));
        assert_eq!(table.pragma(Pragma::TimeStringFormat), Some("h:mm a"));

        let reloaded = ConnectionConfig::from_pragma_table(&table).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_serde_round_trip() {
        let config =
            ConnectionConfig::default().with_transaction_mode(TransactionMode::Exclusive);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["transaction_mode"], "exclusive");
        assert_eq!(json["timestamp_format"], DEFAULT_TIMESTAMP_FORMAT);
        assert_eq!(json["transaction_isolation"], "serializable");

        let back: ConnectionConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
