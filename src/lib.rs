//! tlsbatch library: batched request dispatch through a TLS fingerprinting bridge
//!
//! Requests are described in Rust, serialized to a local bridge process that
//! performs them with a browser-like TLS and header fingerprint, and the raw
//! results are assembled back into [`Response`] values with cookies, decoded
//! bodies, parsed HTML and `Link` header relations.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tlsbatch::initialization::init_transport;
//! use tlsbatch::{BatchExecutor, Config, RequestExecutor, RequestOptions, Session};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env();
//! let session = Session::from_config(init_transport(&config)?, &config).build();
//!
//! let mut batch: BatchExecutor = ["https://example.com", "https://example.org"]
//!     .into_iter()
//!     .map(|url| RequestExecutor::new(Arc::clone(&session), "GET", url, None, RequestOptions::new()))
//!     .collect::<Result<_, _>>()?;
//!
//! for response in batch.execute_pool().await? {
//!     println!("{response} {} {:?}", response.url(), response.reason());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime and a running bridge process
//! (`HREQUESTS_BRIDGE_PORT` selects its port).

pub mod config;
pub mod cookies;
pub mod dispatch;
mod error_handling;
pub mod headers;
pub mod initialization;
pub mod links;
pub mod multipart;
pub mod render;
pub mod response;
pub mod session;
pub mod transport;

// Re-export public API
pub use config::{Config, LogFormat, LogLevel};
pub use cookies::{Cookie, CookieInput, CookieJar};
pub use dispatch::{BatchExecutor, RequestExecutor};
pub use error_handling::{BoxError, ClientError, ErrorKind, InitializationError, TransportError};
pub use headers::{CaseInsensitiveMap, HeaderValue, Headers, RequestHeaders};
pub use response::{Response, ResponseBody};
pub use session::{Browser, RequestData, RequestOptions, Session, SessionBuilder};
pub use transport::{BridgeTransport, Transport};
