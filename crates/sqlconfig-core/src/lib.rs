//! Core types for SQLConfig.
//!
//! This crate provides the foundational types shared by the SQLConfig drivers:
//!
//! - `Error` and `Result` for configuration and conversion failures
//! - `IsolationLevel` for reporting transaction isolation

pub mod error;
pub mod isolation;

pub use error::{ConfigError, ConfigErrorKind, Error, Result, TypeError};
pub use isolation::IsolationLevel;
