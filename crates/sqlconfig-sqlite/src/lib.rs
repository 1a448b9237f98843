//! Connection-local configuration for SQLite drivers.
//!
//! This crate turns the flat, string-valued option table a SQLite connection
//! is opened with into a typed [`ConnectionConfig`] that the connection reads
//! on every statement and transaction boundary.
//!
//! # Features
//!
//! - Pragma table loading with documented defaults and strict validation
//! - Compiled date/time/timestamp patterns that always match their source string
//! - Date multiplier and `BEGIN` statement lookups over closed enumerations
//! - Independent copies for derived sessions
//! - Binding and reading dates as INTEGER, TEXT or REAL
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlconfig_sqlite::{ConnectionConfig, DateClass, Pragma, PragmaTable, TemporalKind};
//!
//! let table = PragmaTable::new()
//!     .with(Pragma::DateClass, "text")
//!     .with(Pragma::TransactionMode, "immediate");
//! let config = ConnectionConfig::from_pragma_table(&table)?;
//!
//! assert_eq!(config.date_class(), DateClass::Text);
//! assert_eq!(config.transaction_prefix(), "begin immediate;");
//!
//! let bound = config.encode_millis(TemporalKind::Timestamp, 0)?;
//! ```
//!
//! # Options
//!
//! | Key | Values | Default |
//! |-----|--------|---------|
//! | `date_class` | `integer`, `text`, `real` | `integer` |
//! | `date_precision` | `milliseconds`, `seconds` | `milliseconds` |
//! | `date_string_format` | pattern | `yyyy-MM-dd` |
//! | `time_string_format` | pattern | `HH:mm:ss.SSS` |
//! | `timestamp_string_format` | pattern | `yyyy-MM-dd HH:mm:ss.SSS` |
//! | `transaction_mode` | `deferred`, `immediate`, `exclusive` | `deferred` |
//!
//! # Thread Safety
//!
//! `ConnectionConfig` is plain owned data and is `Send + Sync`, but it does
//! no locking of its own. It belongs to a single connection.

pub mod config;
pub mod date_format;
pub mod pragma;
pub mod temporal;
pub mod types;

pub use config::ConnectionConfig;
pub use date_format::{
    DEFAULT_DATE_FORMAT, DEFAULT_TIME_FORMAT, DEFAULT_TIMESTAMP_FORMAT, DateFormat,
};
pub use pragma::{Pragma, PragmaTable};
pub use sqlconfig_core::{ConfigError, ConfigErrorKind, Error, IsolationLevel, Result};
pub use temporal::{StoredDate, TemporalKind};
pub use types::{DateClass, DatePrecision, TransactionMode};
