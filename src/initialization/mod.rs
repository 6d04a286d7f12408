//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (plain or JSON)
//! - Bridge transport
//!
//! All initialization functions return proper error types for error handling.

mod logger;

use std::sync::Arc;

use log::info;

use crate::config::Config;
use crate::error_handling::InitializationError;
use crate::transport::BridgeTransport;

pub use logger::init_logger_with;

/// Initializes the bridge transport for `config`.
///
/// The bridge address is validated up front so a bad host or port is reported
/// at startup rather than on the first request.
///
/// # Errors
///
/// Returns `InitializationError::BridgeAddressError` if the configured host and
/// port do not form a valid URL, or `HttpClientError` if the client cannot be built.
pub fn init_transport(config: &Config) -> Result<Arc<BridgeTransport>, InitializationError> {
    let base_url = config.bridge_base_url();
    url::Url::parse(&base_url)
        .map_err(|e| InitializationError::BridgeAddressError(format!("{base_url}: {e}")))?;

    let transport = BridgeTransport::new(config)?;
    info!("Using bridge at {}", transport.base_url());
    Ok(Arc::new(transport))
}
