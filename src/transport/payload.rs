//! Wire structures exchanged with the bridge.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::cookies::Cookie;
use crate::session::Browser;

/// Response headers as the bridge reports them, in arrival order.
pub type RawHeaders = IndexMap<String, Vec<String>>;

/// One request as submitted to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub method: String,
    pub url: String,
    pub headers: HashMap<String, String>,
    /// Header names in the order they must be written on the wire.
    pub header_order: Vec<String>,
    pub cookies: Vec<Cookie>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// `body` is base64 text standing in for binary content.
    pub is_base64_body: bool,
    /// Timeout in whole seconds.
    pub timeout: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    pub follow_redirects: bool,
    pub insecure_skip_verify: bool,
    pub browser: Browser,
}

/// One result as returned by the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResult {
    /// Final URL after redirects.
    pub target: String,
    pub status: u16,
    /// Header name to values in arrival order; `null` when the response had none.
    #[serde(default)]
    pub headers: Option<RawHeaders>,
    #[serde(default)]
    pub body: String,
    /// `body` is base64 text standing in for binary content.
    #[serde(default)]
    pub is_base64: bool,
}
