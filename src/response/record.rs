//! The assembled result of one request.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};
use std::time::Duration;

use scraper::ElementRef;
use serde::de::DeserializeOwned;

use super::body::{detect_encoding, ResponseBody};
use super::html::HtmlPage;
use crate::config::{DEFAULT_ENCODING, UNKNOWN_STATUS_REASON};
use crate::cookies::CookieJar;
use crate::error_handling::ClientError;
use crate::headers::{HeaderValue, Headers, RequestHeaders};
use crate::links::{resolve_links, LinkRecord};
use crate::render::{browsers_available, render_response, BrowserRenderer, RenderOptions};
use crate::session::{Browser, Session};

/// The request a response answers, as it was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSummary {
    pub url: String,
    /// Session defaults merged with per-request headers.
    pub headers: RequestHeaders,
}

/// Response to one request.
///
/// Immutable once built. The parsed HTML page is computed on first access and
/// cached; `text()` and `content()` are recomputed on every call.
///
/// The session reference is weak: a response never keeps its session alive,
/// and responses from temporary sessions carry no session at all.
///
/// Responses are `Send`, so they can be returned from spawned tasks. They are
/// not `Sync`: scraper's element nodes keep unsynchronized lazy caches.
pub struct Response {
    pub(crate) url: String,
    pub(crate) status_code: u16,
    pub(crate) headers: Headers,
    pub(crate) cookies: CookieJar,
    pub(crate) raw: ResponseBody,
    pub(crate) history: Vec<Response>,
    pub(crate) session: Option<Weak<Session>>,
    pub(crate) browser: Option<Browser>,
    pub(crate) elapsed: Option<Duration>,
    pub(crate) encoding: String,
    pub(crate) is_utf8: bool,
    pub(crate) request: Option<RequestSummary>,
    html: OnceLock<HtmlPage>,
}

impl Response {
    /// Creates a response, detecting the encoding of byte bodies.
    pub fn new(
        url: impl Into<String>,
        status_code: u16,
        headers: Headers,
        cookies: CookieJar,
        raw: ResponseBody,
        is_utf8: bool,
    ) -> Self {
        let encoding = match &raw {
            ResponseBody::Bytes(bytes) => detect_encoding(bytes).to_string(),
            ResponseBody::Text(_) => DEFAULT_ENCODING.to_string(),
        };
        Self {
            url: url.into(),
            status_code,
            headers,
            cookies,
            raw,
            history: Vec::new(),
            session: None,
            browser: None,
            elapsed: None,
            encoding,
            is_utf8,
            request: None,
            html: OnceLock::new(),
        }
    }

    /// Attaches the redirect chain that preceded this response, oldest first.
    pub fn with_history(mut self, history: Vec<Response>) -> Self {
        self.history = history;
        self
    }

    /// Records which session produced this response.
    ///
    /// Temporary sessions are not referenced; the browser tag is always copied.
    pub(crate) fn attach_origin(&mut self, session: &Arc<Session>) {
        self.session = if session.is_temporary() {
            None
        } else {
            Some(Arc::downgrade(session))
        };
        self.browser = Some(session.browser());
    }

    /// Final URL after redirects.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Canonical reason phrase of the status code.
    pub fn reason(&self) -> &'static str {
        reqwest::StatusCode::from_u16(self.status_code)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or(UNKNOWN_STATUS_REASON)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn raw(&self) -> &ResponseBody {
        &self.raw
    }

    pub fn history(&self) -> &[Response] {
        &self.history
    }

    /// The originating session, if it was not temporary and is still alive.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.as_ref().and_then(Weak::upgrade)
    }

    pub fn browser(&self) -> Option<Browser> {
        self.browser
    }

    /// Wall-clock time spent waiting on the bridge.
    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Detected encoding for byte bodies, `"UTF-8"` for text bodies.
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Whether the bridge delivered the body as validated UTF-8 text.
    ///
    /// Base64-delivered bodies are always reported as `false`, whatever they contain.
    pub fn is_utf8(&self) -> bool {
        self.is_utf8
    }

    pub fn request_url(&self) -> Option<&str> {
        self.request.as_ref().map(|r| r.url.as_str())
    }

    pub fn request_headers(&self) -> Option<&RequestHeaders> {
        self.request.as_ref().map(|r| &r.headers)
    }

    /// Body as bytes, encoded on each call when the body is stored as text.
    pub fn content(&self) -> Cow<'_, [u8]> {
        self.raw.content(&self.encoding)
    }

    /// Body as text, decoded on each call when the body is stored as bytes.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` if the bytes are invalid in the detected encoding.
    pub fn text(&self) -> Result<Cow<'_, str>, ClientError> {
        self.raw.text(&self.encoding)
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Json` if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.content())?)
    }

    /// Body parsed as HTML, computed once and cached.
    pub fn html(&self) -> &HtmlPage {
        self.html
            .get_or_init(|| HtmlPage::parse(&self.url, &self.raw.text_lossy(&self.encoding)))
    }

    /// Shortcut for `html().find(selector)`.
    pub fn find(&self, selector: &str) -> Result<Option<ElementRef<'_>>, ClientError> {
        self.html().find(selector)
    }

    /// Shortcut for `html().find_all(selector)`.
    pub fn find_all(&self, selector: &str) -> Result<Vec<ElementRef<'_>>, ClientError> {
        self.html().find_all(selector)
    }

    /// `true` if the status code is below 400.
    pub fn ok(&self) -> bool {
        self.status_code < 400
    }

    /// Links from the `Link` header, keyed by `rel` (or `url` when `rel` is missing).
    ///
    /// Repeated `Link` headers are parsed as one comma-joined value.
    pub fn links(&self) -> HashMap<String, LinkRecord> {
        let header = self.headers.get("link").map(HeaderValue::joined);
        resolve_links(header.as_deref())
    }

    /// Opens this response in a browser through `renderer`.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Unavailable` without calling the renderer if no
    /// browser runtime is installed.
    pub fn render<R: BrowserRenderer>(
        &self,
        renderer: &R,
        options: &RenderOptions,
    ) -> Result<R::Page, ClientError> {
        render_response(self, renderer, options, browsers_available())
    }
}

impl From<&Response> for bool {
    fn from(response: &Response) -> bool {
        response.ok()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Response [{}]>", self.status_code)
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("url", &self.url)
            .field("status_code", &self.status_code)
            .field("headers", &self.headers)
            .field("encoding", &self.encoding)
            .field("is_utf8", &self.is_utf8)
            .field("elapsed", &self.elapsed)
            .field("browser", &self.browser)
            .field("history", &self.history.len())
            .finish_non_exhaustive()
    }
}
