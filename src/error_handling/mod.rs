//! Error handling.
//!
//! This module provides:
//! - The client-facing error taxonomy ([`ClientError`], [`ErrorKind`])
//! - The transport error type implementations return ([`TransportError`])
//! - Initialization errors for the logger and the bridge client
//!
//! Errors are categorized into:
//! - **Precondition**: invalid caller input, raised before any network activity
//! - **Connection**: any transport failure, with the original kept as source
//! - **Client**: failures already classified by the bridge, passed through as-is
//! - **Data format**: malformed JSON, undecodable text, bad selectors
//! - **Unavailable**: missing runtime collaborators (browser rendering)

mod types;

// Re-export public API
pub use types::{BoxError, ClientError, ErrorKind, InitializationError, TransportError};
