//! Unified error types for package detection and parsing.
//!
//! Detection failures, parse failures and file access faults are kept in
//! separate enums so callers can branch on which stage failed. Validation
//! problems are never errors; they are reported through
//! [`ValidationResult`](crate::validation::ValidationResult).

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{AccessError, AccessResult, DetectionError, Error, ParseError, ParseResult, Result};
