//! Boundary with the external request executor.
//!
//! The executor (the "bridge") performs the actual network I/O with browser
//! TLS fingerprint emulation. This crate reaches it only through [`Transport`]:
//! one call per request, or one call per batch.

mod bridge;
mod payload;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;

pub use bridge::BridgeTransport;
pub use payload::{RawHeaders, RawResult, RequestPayload};

use crate::error_handling::TransportError;

/// Request executor contract.
///
/// `execute_batch` must return exactly one result per payload, in payload order.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, payload: &RequestPayload) -> Result<RawResult, TransportError>;

    async fn execute_batch(
        &self,
        payloads: &[RequestPayload],
    ) -> Result<Vec<RawResult>, TransportError>;
}
