//! Pragma table: the flat string option table a connection is opened with.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Connection-local options recognized by [`ConnectionConfig`](crate::ConnectionConfig).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pragma {
    DateClass,
    DatePrecision,
    DateStringFormat,
    TimeStringFormat,
    TimestampStringFormat,
    TransactionMode,
}

impl Pragma {
    pub const ALL: [Pragma; 6] = [
        Pragma::DateClass,
        Pragma::DatePrecision,
        Pragma::DateStringFormat,
        Pragma::TimeStringFormat,
        Pragma::TimestampStringFormat,
        Pragma::TransactionMode,
    ];

    /// Key under which this option appears in a pragma table.
    pub const fn name(self) -> &'static str {
        match self {
            Pragma::DateClass => "date_class",
            Pragma::DatePrecision => "date_precision",
            Pragma::DateStringFormat => "date_string_format",
            Pragma::TimeStringFormat => "time_string_format",
            Pragma::TimestampStringFormat => "timestamp_string_format",
            Pragma::TransactionMode => "transaction_mode",
        }
    }

    /// Look up an option by its table key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Pragma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// String-keyed, string-valued option table.
///
/// Keys that are not a [`Pragma`] are kept; the config loader ignores them.
/// Serializes as a flat JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PragmaTable {
    entries: BTreeMap<String, String>,
}

impl PragmaTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Value of a recognized option.
    pub fn pragma(&self, pragma: Pragma) -> Option<&str> {
        self.get(pragma.name())
    }

    /// Value of a recognized option, or `default` when absent.
    pub fn pragma_or<'a>(&'a self, pragma: Pragma, default: &'a str) -> &'a str {
        self.pragma(pragma).unwrap_or(default)
    }

    /// Set a raw entry, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.into(), value.into())
    }

    /// Set a recognized option.
    pub fn set_pragma(&mut self, pragma: Pragma, value: impl Into<String>) -> Option<String> {
        self.set(pragma.name(), value)
    }

    /// Builder form of [`set_pragma`](Self::set_pragma).
    #[must_use]
    pub fn with(mut self, pragma: Pragma, value: impl Into<String>) -> Self {
        self.set_pragma(pragma, value);
        self
    }

    /// Remove an entry.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys present in the table that are not recognized options.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .map(String::as_str)
            .filter(|k| Pragma::from_name(k).is_none())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PragmaTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for PragmaTable {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_and_resolvable() {
        for pragma in Pragma::ALL {
            assert_eq!(Pragma::from_name(pragma.name()), Some(pragma));
        }
        assert_eq!(Pragma::from_name("journal_mode"), None);
    }

    #[test]
    fn test_table_access() {
        let mut table = PragmaTable::new().with(Pragma::DateClass, "text");
        assert_eq!(table.pragma(Pragma::DateClass), Some("text"));
        assert_eq!(table.pragma_or(Pragma::DatePrecision, "milliseconds"), "milliseconds");

        assert_eq!(table.set_pragma(Pragma::DateClass, "real"), Some("text".to_string()));
        assert_eq!(table.get("date_class"), Some("real"));
        assert_eq!(table.len(), 1);

        assert_eq!(table.remove("date_class"), Some("real".to_string()));
        assert!(table.is_empty());
    }

    #[test]
    fn test_unknown_keys() {
        let table: PragmaTable = [("journal_mode", "wal"), ("transaction_mode", "immediate")]
            .into_iter()
            .collect();
        assert_eq!(table.unknown_keys().collect::<Vec<_>>(), vec!["journal_mode"]);
    }

    #[test]
    fn test_json_shape() {
        let table: PragmaTable =
            serde_json::from_str(r#"{"date_class":"text","busy_timeout":"3000"}"#).unwrap();
        assert_eq!(table.pragma(Pragma::DateClass), Some("text"));
        assert_eq!(table.get("busy_timeout"), Some("3000"));

        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(json, r#"{"busy_timeout":"3000","date_class":"text"}"#);
    }
}
