//! Assembly of a [`Response`] from a raw bridge result.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use super::body::ResponseBody;
use super::record::Response;
use crate::cookies::CookieJar;
use crate::error_handling::ClientError;
use crate::headers::{HeaderValue, Headers};
use crate::transport::RawResult;

/// Builds a response from `raw` and the cookies already resolved for it.
///
/// Single-valued headers are flattened to scalars. Base64-flagged bodies are
/// decoded to bytes and marked as not UTF-8 without inspecting their content.
///
/// # Errors
///
/// Returns `ClientError::Decode` if a base64-flagged body is not valid base64.
pub fn build_response(raw: RawResult, cookies: CookieJar) -> Result<Response, ClientError> {
    let headers: Headers = raw
        .headers
        .unwrap_or_default()
        .into_iter()
        .map(|(name, values)| (name, HeaderValue::from_values(values)))
        .collect();

    let body = if raw.is_base64 {
        let bytes = STANDARD
            .decode(raw.body.as_bytes())
            .map_err(|e| ClientError::Decode(format!("Invalid base64 body: {e}")))?;
        ResponseBody::Bytes(bytes)
    } else {
        ResponseBody::Text(raw.body)
    };

    Ok(Response::new(
        raw.target,
        raw.status,
        headers,
        cookies,
        body,
        !raw.is_base64,
    ))
}
