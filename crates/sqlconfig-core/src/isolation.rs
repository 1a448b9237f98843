//! Transaction isolation levels.
//!
//! The level recorded on a connection is reported to callers; it is not
//! enforced by this crate.

use serde::{Deserialize, Serialize};

/// Transaction isolation level.
///
/// Defines the degree to which one transaction must be isolated from
/// resource or data modifications made by other concurrent transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IsolationLevel {
    /// Read uncommitted: Transactions can see uncommitted changes from others.
    /// SQLite only honors this in shared-cache mode.
    ReadUncommitted,

    /// Read committed: Transactions only see committed changes from others.
    ReadCommitted,

    /// Repeatable read: Transactions see a consistent snapshot of the database.
    RepeatableRead,

    /// Serializable: Transactions appear to execute sequentially.
    /// This is what SQLite provides for every ordinary connection.
    Serializable,
}

impl IsolationLevel {
    /// Get the SQL syntax for this isolation level.
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }

    /// Integer code of this level, using the JDBC `Connection.TRANSACTION_*` values.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            IsolationLevel::ReadUncommitted => 1,
            IsolationLevel::ReadCommitted => 2,
            IsolationLevel::RepeatableRead => 4,
            IsolationLevel::Serializable => 8,
        }
    }

    /// Look up a level by its integer code.
    #[must_use]
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            1 => Some(IsolationLevel::ReadUncommitted),
            2 => Some(IsolationLevel::ReadCommitted),
            4 => Some(IsolationLevel::RepeatableRead),
            8 => Some(IsolationLevel::Serializable),
            _ => None,
        }
    }
}

impl std::fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for level in [
            IsolationLevel::ReadUncommitted,
            IsolationLevel::ReadCommitted,
            IsolationLevel::RepeatableRead,
            IsolationLevel::Serializable,
        ] {
            assert_eq!(IsolationLevel::from_code(level.code()), Some(level));
        }
        assert_eq!(IsolationLevel::Serializable.code(), 8);
        assert_eq!(IsolationLevel::from_code(0), None);
        assert_eq!(IsolationLevel::from_code(3), None);
    }

    #[test]
    fn sql_and_serde_names() {
        assert_eq!(IsolationLevel::Serializable.to_string(), "SERIALIZABLE");
        assert_eq!(
            serde_json::to_string(&IsolationLevel::ReadUncommitted).unwrap(),
            "\"read_uncommitted\""
        );
    }
}
