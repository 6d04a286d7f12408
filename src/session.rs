//! Sessions: default headers, cookies and browser identity shared by requests.
//!
//! A [`Session`] turns request options into bridge payloads
//! ([`Session::build_request`]), executes single requests
//! ([`Session::execute_request`]) and assembles responses from raw bridge
//! results ([`Session::build_response`]). The batch path calls the first and
//! last of these directly so that only one round-trip is made.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::config::{
    Config, CHROME_USER_AGENT, DEFAULT_ACCEPT, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_TIMEOUT_SECS,
    FIREFOX_USER_AGENT,
};
use crate::cookies::{CookieInput, CookieJar};
use crate::dispatch::RequestExecutor;
use crate::error_handling::{ClientError, TransportError};
use crate::headers::RequestHeaders;
use crate::multipart::Files;
use crate::response::{build_response, RequestSummary, Response};
use crate::transport::{RawResult, RequestPayload, Transport};

/// Browser whose TLS and header fingerprint the bridge emulates.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Browser {
    #[default]
    Firefox,
    Chrome,
}

impl Browser {
    pub fn user_agent(&self) -> &'static str {
        match self {
            Browser::Firefox => FIREFOX_USER_AGENT,
            Browser::Chrome => CHROME_USER_AGENT,
        }
    }
}

/// Request body supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestData {
    /// Form fields; url-encoded unless files are attached.
    Form(Vec<(String, String)>),
    Text(String),
    Bytes(Vec<u8>),
}

/// Per-request transport options.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub headers: Option<RequestHeaders>,
    pub data: Option<RequestData>,
    /// Serialized as the body when `data` is absent.
    pub json: Option<serde_json::Value>,
    pub files: Option<Files>,
    /// Query parameters appended to the URL.
    pub params: Vec<(String, String)>,
    pub timeout: Option<Duration>,
    pub proxy: Option<String>,
    /// Defaults to `true`.
    pub allow_redirects: Option<bool>,
    /// Verify TLS certificates; defaults to `true`.
    pub verify: Option<bool>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(RequestHeaders::new)
            .insert(name, value.into());
        self
    }

    pub fn data(mut self, data: RequestData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.json = Some(value);
        self
    }

    pub fn files(mut self, files: Files) -> Self {
        self.files = Some(files);
        self
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// Shared request state: transport, browser identity, default headers, cookies.
pub struct Session {
    transport: Arc<dyn Transport>,
    browser: Browser,
    headers: RequestHeaders,
    cookies: Mutex<CookieJar>,
    proxy: Option<String>,
    timeout: Duration,
    temp: bool,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("browser", &self.browser)
            .field("headers", &self.headers)
            .field("proxy", &self.proxy)
            .field("timeout", &self.timeout)
            .field("temp", &self.temp)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Session`].
pub struct SessionBuilder {
    transport: Arc<dyn Transport>,
    browser: Browser,
    headers: RequestHeaders,
    cookies: CookieJar,
    proxy: Option<String>,
    timeout: Duration,
    temp: bool,
}

impl SessionBuilder {
    pub fn browser(mut self, browser: Browser) -> Self {
        self.browser = browser;
        self
    }

    /// Adds a default header, overriding the browser defaults.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value.into());
        self
    }

    pub fn cookies(mut self, cookies: impl Into<CookieInput>) -> Self {
        self.cookies = cookies.into().into_jar();
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Marks the session as one-shot: responses will not reference it.
    pub fn temporary(mut self, temp: bool) -> Self {
        self.temp = temp;
        self
    }

    pub fn build(self) -> Arc<Session> {
        let mut headers: RequestHeaders = [
            ("User-Agent", self.browser.user_agent().to_string()),
            ("Accept", DEFAULT_ACCEPT.to_string()),
            ("Accept-Language", DEFAULT_ACCEPT_LANGUAGE.to_string()),
        ]
        .into_iter()
        .collect();
        headers.merge(self.headers);

        Arc::new(Session {
            transport: self.transport,
            browser: self.browser,
            headers,
            cookies: Mutex::new(self.cookies),
            proxy: self.proxy,
            timeout: self.timeout,
            temp: self.temp,
        })
    }
}

impl Session {
    pub fn builder(transport: Arc<dyn Transport>) -> SessionBuilder {
        SessionBuilder {
            transport,
            browser: Browser::default(),
            headers: RequestHeaders::new(),
            cookies: CookieJar::new(),
            proxy: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            temp: false,
        }
    }

    /// Session configured from `config` (browser and timeout).
    pub fn from_config(transport: Arc<dyn Transport>, config: &Config) -> SessionBuilder {
        Self::builder(transport)
            .browser(config.browser)
            .timeout(Duration::from_secs(config.timeout_seconds))
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    pub fn browser(&self) -> Browser {
        self.browser
    }

    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    pub fn is_temporary(&self) -> bool {
        self.temp
    }

    pub fn headers(&self) -> &RequestHeaders {
        &self.headers
    }

    /// Snapshot of the session cookie jar.
    pub fn cookies(&self) -> CookieJar {
        self.lock_cookies().clone()
    }

    fn lock_cookies(&self) -> MutexGuard<'_, CookieJar> {
        // The jar holds plain data; a panic mid-update cannot leave it unusable.
        self.cookies.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sends one request through this session.
    pub async fn request(
        self: &Arc<Self>,
        method: &str,
        url: &str,
        options: RequestOptions,
    ) -> Result<Response, ClientError> {
        RequestExecutor::new(Arc::clone(self), method, url, None, options)?
            .send()
            .await
    }

    /// Materializes the bridge payload and the fully-resolved header set.
    ///
    /// Session defaults are overlaid with per-request headers, and session
    /// cookies with per-request cookies.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Precondition` if query parameters are given for an
    /// unparsable URL or the JSON body cannot be serialized.
    pub fn build_request(
        &self,
        method: &str,
        url: &str,
        cookies: Option<&CookieInput>,
        options: &RequestOptions,
    ) -> Result<(RequestPayload, RequestHeaders), ClientError> {
        let url = append_params(url, &options.params)?;

        let mut headers = self.headers.clone();
        if let Some(overrides) = &options.headers {
            headers.merge(overrides.clone());
        }

        let (body, is_base64_body) = match (&options.data, &options.json) {
            (Some(RequestData::Form(fields)), _) => {
                if !headers.contains_key("Content-Type") {
                    headers.insert(
                        "Content-Type",
                        "application/x-www-form-urlencoded".to_string(),
                    );
                }
                let encoded = url::form_urlencoded::Serializer::new(String::new())
                    .extend_pairs(fields)
                    .finish();
                (Some(encoded), false)
            }
            (Some(RequestData::Text(text)), _) => (Some(text.clone()), false),
            (Some(RequestData::Bytes(bytes)), _) => (Some(STANDARD.encode(bytes)), true),
            (None, Some(value)) => {
                if !headers.contains_key("Content-Type") {
                    headers.insert("Content-Type", "application/json".to_string());
                }
                let encoded = serde_json::to_string(value).map_err(|e| {
                    ClientError::Precondition(format!("JSON body cannot be serialized: {e}"))
                })?;
                (Some(encoded), false)
            }
            (None, None) => (None, false),
        };

        let mut jar = self.cookies();
        if let Some(input) = cookies {
            jar.merge(&input.clone().into_jar());
        }

        let payload = RequestPayload {
            method: method.to_ascii_uppercase(),
            url,
            headers: headers
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
            header_order: headers.keys().map(str::to_string).collect(),
            cookies: jar.iter().cloned().collect(),
            body,
            is_base64_body,
            timeout: timeout_secs(options.timeout.unwrap_or(self.timeout)),
            proxy: options.proxy.clone().or_else(|| self.proxy.clone()),
            follow_redirects: options.allow_redirects.unwrap_or(true),
            insecure_skip_verify: !options.verify.unwrap_or(true),
            browser: self.browser,
        };
        trace!(
            "Built {} payload for {} with {} headers and {} cookies",
            payload.method,
            payload.url,
            payload.header_order.len(),
            payload.cookies.len()
        );
        Ok((payload, headers))
    }

    /// Executes one request through the transport.
    ///
    /// Errors are returned unmapped; [`RequestExecutor`] decides how they surface.
    pub async fn execute_request(
        &self,
        method: &str,
        url: &str,
        cookies: Option<&CookieInput>,
        options: &RequestOptions,
    ) -> Result<Response, TransportError> {
        let (payload, headers) = self.build_request(method, url, cookies, options)?;
        debug!("Executing {} {}", payload.method, payload.url);
        let raw = self.transport.execute(&payload).await?;
        Ok(self.build_response(url, &headers, raw)?)
    }

    /// Assembles a [`Response`] for a raw bridge result.
    ///
    /// `Set-Cookie` headers become the response's cookies and are also stored
    /// in the session jar. `url` and `headers` describe the originating request.
    /// The jar is left untouched if the response cannot be built.
    pub fn build_response(
        &self,
        url: &str,
        headers: &RequestHeaders,
        raw: RawResult,
    ) -> Result<Response, ClientError> {
        let response = self.assemble_response(url, headers, raw)?;
        self.store_cookies(response.cookies());
        Ok(response)
    }

    /// Like [`Session::build_response`] but without touching the session jar.
    pub(crate) fn assemble_response(
        &self,
        url: &str,
        headers: &RequestHeaders,
        raw: RawResult,
    ) -> Result<Response, ClientError> {
        let cookie_url = if raw.target.is_empty() { url } else { raw.target.as_str() };
        let set_cookie: Vec<&str> = raw
            .headers
            .as_ref()
            .into_iter()
            .flat_map(|map| map.iter())
            .filter(|(name, _)| name.eq_ignore_ascii_case("set-cookie"))
            .flat_map(|(_, values)| values.iter().map(String::as_str))
            .collect();
        let cookies = CookieJar::from_set_cookie_headers(cookie_url, set_cookie);

        let mut response = build_response(raw, cookies)?;
        response.request = Some(RequestSummary {
            url: url.to_string(),
            headers: headers.clone(),
        });
        Ok(response)
    }

    /// Merges cookies received in a response into the session jar.
    pub(crate) fn store_cookies(&self, cookies: &CookieJar) {
        if !cookies.is_empty() {
            self.lock_cookies().merge(cookies);
        }
    }
}

/// Whole seconds for the bridge, rounded up so a sub-second timeout is never sent as 0.
fn timeout_secs(timeout: Duration) -> u64 {
    timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0)
}

fn append_params(url: &str, params: &[(String, String)]) -> Result<String, ClientError> {
    if params.is_empty() {
        return Ok(url.to_string());
    }
    let mut parsed = url::Url::parse(url)
        .map_err(|e| ClientError::Precondition(format!("Invalid URL '{url}': {e}")))?;
    parsed.query_pairs_mut().extend_pairs(params);
    Ok(parsed.to_string())
}
