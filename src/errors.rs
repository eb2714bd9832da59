//! Unified error types for Clubhouse.
//!
//! Every fallible operation in the crate returns [`Result`]. Snapshot decoding and
//! form validation have their own focused enums so callers can match on the exact
//! failure before it is folded into [`Error`].

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Error raised by the `SeaORM` database layer.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Standard I/O failure (config file, terminal prompts).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted collection could not be read or parsed.
    #[error("Failed to read stored collection '{key}': {message}")]
    StoreRead {
        /// Storage key of the collection
        key: String,
        /// Underlying cause
        message: String,
    },

    /// A collection could not be serialized to JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An address could not be parsed or rebuilt.
    #[error("Invalid address: {message}")]
    Address {
        /// Underlying cause
        message: String,
    },

    /// A share token could not be decoded.
    #[error("Invalid share token: {0}")]
    Decode(#[from] DecodeError),

    /// A creation request was rejected before reaching the roster.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No meeting with the given id exists.
    #[error("Meeting not found: {id}")]
    MeetingNotFound {
        /// The id that was looked up
        id: String,
    },

    /// The text-generation service failed or returned garbage.
    #[error("Text service error: {message}")]
    Collaborator {
        /// Underlying cause
        message: String,
    },
}

/// The stage at which a share token failed to decode.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The token is not valid base64.
    #[error("token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The base64 payload is not UTF-8 text.
    #[error("decoded token is not text: {0}")]
    Text(#[from] std::string::FromUtf8Error),

    /// Percent-decoding produced invalid UTF-8.
    #[error("percent-encoded payload is malformed: {0}")]
    Percent(#[from] std::str::Utf8Error),

    /// The payload is not a valid roster document.
    #[error("payload is not a roster document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A form field failed validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or blank.
    #[error("{field} is required")]
    MissingField {
        /// Name of the field
        field: &'static str,
    },

    /// A field was present but could not be parsed.
    #[error("invalid {field}: '{value}'")]
    InvalidValue {
        /// Name of the field
        field: &'static str,
        /// The rejected input
        value: String,
    },
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
