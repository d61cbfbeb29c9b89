use thiserror::Error;

/// Errors raised by the durable key/value storage layer.
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    #[error("Could not open session file '{path}': {message}")]
    Open { path: String, message: String },

    #[error("Could not write session file '{path}': {message}")]
    Write { path: String, message: String },

    #[error("Could not encode session payload: {0}")]
    Encode(String),

    #[error("Could not decode session payload: {0}")]
    Decode(String),
}

/// Errors that can occur while restoring a persisted session.
///
/// Any of these routes the caller to a full reset — a stale or corrupt
/// snapshot must never crash a resumed session.
#[derive(Error, Debug, Clone)]
pub enum RestoreError {
    #[error("Persisted value for '{key}' is not valid JSON: {message}")]
    Corrupt { key: String, message: String },

    #[error("Persisted session shape is invalid: {0}")]
    InvalidShape(String),
}

/// Errors that can occur when validating an externally supplied form payload.
#[derive(Error, Debug, Clone)]
pub enum DraftError {
    #[error("Form payload must be a JSON object, found {0}")]
    NotAnObject(String),
}
