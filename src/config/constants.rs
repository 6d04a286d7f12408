//! Configuration constants.
//!
//! This module defines the defaults for talking to the bridge process and for
//! decoding response bodies.

/// Host the bridge process listens on.
pub const DEFAULT_BRIDGE_HOST: &str = "127.0.0.1";

/// Port the bridge process listens on unless overridden.
pub const DEFAULT_BRIDGE_PORT: u16 = 8215;

/// Environment variable overriding the bridge port.
pub const BRIDGE_PORT_ENV: &str = "HREQUESTS_BRIDGE_PORT";

/// Bridge endpoint for a single request.
pub const SINGLE_ENDPOINT: &str = "/request";

/// Bridge endpoint accepting a JSON array of requests.
pub const BATCH_ENDPOINT: &str = "/multirequest";

/// Per-request timeout forwarded to the bridge, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Encoding assumed for text bodies and used when no encoding was detected.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Environment flag that must be set (non-empty) for `Response::render` to run.
///
/// Set by the browser installer once a rendering runtime is available.
pub const RENDER_ENV_FLAG: &str = "HREQUESTS_PW";

/// Fallback reason phrase for status codes without a canonical one.
pub const UNKNOWN_STATUS_REASON: &str = "Unknown Status Code";

/// Default Firefox User-Agent sent by sessions emulating Firefox.
pub const FIREFOX_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Default Chrome User-Agent sent by sessions emulating Chrome.
pub const CHROME_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Accept header sent with every session by default.
pub const DEFAULT_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Accept-Language header sent with every session by default.
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
