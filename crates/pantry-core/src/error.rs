//! # Error Types
//!
//! Domain-specific error types for pantry-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  pantry-core errors (this file)                                        │
//! │  ├── CoreError        - Unknown names, bad view parameters             │
//! │  └── ValidationError  - Form input failures                            │
//! │                                                                         │
//! │  pantry-client errors (separate crate)                                 │
//! │  ├── GatewayError     - What the API answered (or failed to)           │
//! │  └── ClientError      - Config, session and store failures             │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ClientError → message shown       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (column, field, value)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A resource name that does not match any managed collection.
    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    /// Sort direction other than `asc` / `desc`.
    #[error("Unknown sort direction: {0}")]
    UnknownSortDirection(String),

    /// Sort requested on a column the table does not have.
    ///
    /// ## When This Occurs
    /// - A saved view refers to a column that was renamed
    /// - The console binary gets a typo on `--sort`
    #[error("Unknown column: {column}")]
    UnknownColumn { column: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised by the form checks in [`crate::validation`] before anything is
/// sent to the server.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters long")]
    TooShort { field: String, min: usize },

    /// Numeric value is negative or not a number.
    #[error("{field} must be a non-negative number")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., stray characters in an item code).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// An entity picked as its own parent.
    #[error("{field} cannot reference the entity itself")]
    SelfReference { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
