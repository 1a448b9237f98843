//! Error types for SQLConfig operations.

use std::fmt;

/// The primary error type for all SQLConfig operations.
#[derive(Debug)]
pub enum Error {
    /// Configuration errors (option parsing, pattern compilation)
    Config(ConfigError),
    /// Stored value could not be converted to the requested type
    Type(TypeError),
}

#[derive(Debug)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    /// Option key the error refers to, if it came from an option table
    pub key: Option<String>,
    /// The offending raw value
    pub value: Option<String>,
    pub message: String,
    /// Underlying error, e.g. chrono rejecting a translated pattern
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// Option value matches no recognized literal for its key
    Parse,
    /// Pattern string is not a valid date format pattern
    FormatCompile,
}

#[derive(Debug)]
pub struct TypeError {
    pub expected: &'static str,
    pub actual: String,
    pub rust_type: Option<&'static str>,
}

impl ConfigError {
    /// Build a parse error for an option value that matches none of `expected`.
    pub fn parse(key: impl Into<String>, value: impl Into<String>, expected: &[&str]) -> Self {
        let key = key.into();
        let value = value.into();
        let message = format!(
            "invalid value '{}' for option '{}' (expected one of: {})",
            value,
            key,
            expected.join(", ")
        );
        Self {
            kind: ConfigErrorKind::Parse,
            key: Some(key),
            value: Some(value),
            message,
            source: None,
        }
    }

    /// Build a compile error for a date format pattern.
    pub fn format_compile(pattern: impl Into<String>, reason: impl fmt::Display) -> Self {
        let pattern = pattern.into();
        let message = format!("invalid date format pattern '{}': {}", pattern, reason);
        Self {
            kind: ConfigErrorKind::FormatCompile,
            key: None,
            value: Some(pattern),
            message,
            source: None,
        }
    }

    /// Attach the option key this error was raised for.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        if self.key.is_none() {
            self.message = format!("option '{}': {}", key, self.message);
        }
        self.key = Some(key);
        self
    }

    /// Attach the underlying error.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Option key the error refers to, if known.
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// The offending raw value, if known.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

impl Error {
    /// Is this an option value that failed to parse?
    pub fn is_config_parse(&self) -> bool {
        matches!(self, Error::Config(c) if c.kind == ConfigErrorKind::Parse)
    }

    /// Is this a date format pattern that failed to compile?
    pub fn is_format_compile(&self) -> bool {
        matches!(self, Error::Config(c) if c.kind == ConfigErrorKind::FormatCompile)
    }

    /// Get the option key this error refers to, if available.
    pub fn config_key(&self) -> Option<&str> {
        match self {
            Error::Config(c) => c.key(),
            Error::Type(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Type(e) => write!(f, "Type error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            Error::Type(_) => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn std::error::Error + 'static))
    }
}

impl fmt::Display for TypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected {}, found {}", self.expected, self.actual)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Error::Type(err)
    }
}

/// Result type alias for SQLConfig operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_key_and_value() {
        let err = Error::from(ConfigError::parse(
            "transaction_mode",
            "bogus",
            &["deferred", "immediate", "exclusive"],
        ));

        assert!(err.is_config_parse());
        assert!(!err.is_format_compile());
        assert_eq!(err.config_key(), Some("transaction_mode"));

        let msg = err.to_string();
        assert!(msg.contains("bogus"), "{msg}");
        assert!(msg.contains("transaction_mode"), "{msg}");
        assert!(msg.contains("deferred, immediate, exclusive"), "{msg}");
    }

    #[test]
    fn format_compile_error_gains_key() {
        let err = ConfigError::format_compile("yyyy-qq", "unknown pattern letter 'q'")
            .with_key("date_string_format");

        assert_eq!(err.kind, ConfigErrorKind::FormatCompile);
        assert_eq!(err.key(), Some("date_string_format"));
        assert_eq!(err.value(), Some("yyyy-qq"));
        assert!(err.to_string().starts_with("option 'date_string_format'"));

        let err = Error::from(err);
        assert!(err.is_format_compile());
    }

    #[test]
    fn type_error_display() {
        let err = Error::Type(TypeError {
            expected: "timestamp text",
            actual: "'yesterday'".to_string(),
            rust_type: None,
        });
        assert_eq!(
            err.to_string(),
            "Type error: expected timestamp text, found 'yesterday'"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn format_compile_error_keeps_source() {
        let cause = std::fmt::Error;
        let err = Error::from(ConfigError::format_compile("yyyy", cause).with_source(cause));

        let source = std::error::Error::source(&err).expect("source is kept");
        assert_eq!(source.to_string(), cause.to_string());
        assert!(err.to_string().contains("'yyyy'"));
    }
}
