//! Error type definitions.
//!
//! This module defines the client-facing error taxonomy and the narrower error
//! type returned by transport implementations.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Boxed low-level cause kept on connection errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the bridge HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The bridge URL could not be built from the configuration.
    #[error("Invalid bridge address: {0}")]
    BridgeAddressError(String),
}

/// Errors surfaced to callers of the request pipeline.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The caller violated a request precondition (e.g. files with non-form data).
    ///
    /// Raised before any network activity.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Any transport-level failure, normalized so callers need a single catch site.
    #[error("{message}")]
    Connection {
        message: String,
        #[source]
        source: BoxError,
    },

    /// A failure already classified by the bridge itself.
    #[error("Bridge error ({status}): {message}")]
    Bridge { status: u16, message: String },

    /// The response body is not valid JSON.
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// The response body could not be decoded with its encoding.
    #[error("Decode error: {0}")]
    Decode(String),

    /// A CSS selector passed to `find`/`find_all` did not parse.
    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),

    /// A required runtime collaborator is not installed.
    #[error("Unavailable: {0}")]
    Unavailable(String),
}

impl ClientError {
    /// Wraps a low-level failure into the uniform connection error.
    pub fn connection(source: impl Into<BoxError>) -> Self {
        ClientError::Connection {
            message: "Connection error".to_string(),
            source: source.into(),
        }
    }

    /// Maps a transport failure: typed client errors pass through, anything
    /// else becomes a connection error carrying the original as its source.
    pub fn from_transport(error: TransportError) -> Self {
        match error {
            TransportError::Client(inner) => inner,
            other => ClientError::connection(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Precondition(_) => ErrorKind::Precondition,
            ClientError::Connection { .. } => ErrorKind::Connection,
            ClientError::Bridge { .. } => ErrorKind::Client,
            ClientError::Json(_) | ClientError::Decode(_) | ClientError::InvalidSelector(_) => {
                ErrorKind::DataFormat
            }
            ClientError::Unavailable(_) => ErrorKind::Unavailable,
        }
    }
}

/// Errors returned by [`Transport`](crate::transport::Transport) implementations.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] ReqwestError),

    /// The bridge answered with something that is not the expected JSON.
    #[error("Malformed bridge response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The batch endpoint returned a different number of results than submitted.
    #[error("Batch returned {actual} results for {expected} requests")]
    LengthMismatch { expected: usize, actual: usize },

    /// An already-typed client failure; never re-wrapped.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Coarse classification of [`ClientError`] for callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    Precondition,
    Connection,
    Client,
    DataFormat,
    Unavailable,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Precondition => "Precondition failure",
            ErrorKind::Connection => "Connection error",
            ErrorKind::Client => "Client error",
            ErrorKind::DataFormat => "Data format error",
            ErrorKind::Unavailable => "Unavailable",
        }
    }
}
