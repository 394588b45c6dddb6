//! # Store Error Types
//!
//! Error types for store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  Hosted store (HTTP status + JSON error body)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← checked right after every round trip       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller (`?`) ← no retry, no fallback value                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Deserialize;
use thiserror::Error;

/// PostgreSQL `unique_violation`.
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL `foreign_key_violation`.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// PostgreSQL `undefined_table`.
pub const UNDEFINED_TABLE: &str = "42P01";

/// Store operation errors.
///
/// Constraint violations and transient failures are the same kind; the
/// helpers below only classify, they never change propagation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store answered with an error.
    ///
    /// ## When This Occurs
    /// - Duplicate key on insert
    /// - Sale referencing a missing product
    /// - Unknown table or column
    /// - Rejected access key
    #[error("Store error ({status}): {message}")]
    Remote {
        status: u16,
        code: Option<String>,
        message: String,
        details: Option<String>,
        hint: Option<String>,
    },

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The configured endpoint cannot be turned into a request URL.
    #[error("Invalid store endpoint: {0}")]
    InvalidEndpoint(String),

    /// A row did not match the expected record shape.
    #[error("Unexpected row shape: {0}")]
    Decode(#[from] serde_json::Error),

    /// An insert or update came back without a row.
    #[error("No {table} row returned")]
    NoRows { table: String },
}

/// Error body returned by the REST endpoint.
#[derive(Debug, Default, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

impl StoreError {
    /// Creates a Remote error with a code and message.
    pub fn remote(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        StoreError::Remote {
            status,
            code: Some(code.into()),
            message: message.into(),
            details: None,
            hint: None,
        }
    }

    /// Creates a NoRows error for a table.
    pub fn no_rows(table: impl Into<String>) -> Self {
        StoreError::NoRows {
            table: table.into(),
        }
    }

    /// Builds a Remote error from a non-success response.
    ///
    /// ## Body Mapping
    /// ```text
    /// {"code","message","details","hint"}  → fields copied as-is
    /// anything else                        → raw body becomes the message
    /// ```
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<RemoteErrorBody>(body) {
            Ok(parsed) => StoreError::Remote {
                status,
                code: parsed.code,
                message: parsed
                    .message
                    .unwrap_or_else(|| String::from_utf8_lossy(body).into_owned()),
                details: parsed.details,
                hint: parsed.hint,
            },
            Err(_) => StoreError::Remote {
                status,
                code: None,
                message: String::from_utf8_lossy(body).into_owned(),
                details: None,
                hint: None,
            },
        }
    }

    /// Returns the store's error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Remote { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Checks for a duplicate key.
    pub fn is_unique_violation(&self) -> bool {
        self.code() == Some(UNIQUE_VIOLATION)
    }

    /// Checks for a dangling reference.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.code() == Some(FOREIGN_KEY_VIOLATION)
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Unit Tests
// =============================================================================
