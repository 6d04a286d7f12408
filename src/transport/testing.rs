// In-memory transport for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{RawHeaders, RawResult, RequestPayload, Transport};
use crate::error_handling::{ClientError, TransportError};

#[derive(Debug, Clone, Copy)]
pub(crate) enum MockMode {
    /// Answer 200 with the request URL as body.
    Echo,
    /// Fail every call with an I/O error.
    IoFailure,
    /// Fail every call with a typed bridge error.
    BridgeFailure,
    /// Echo, with a `visited=<url>` cookie set by every result.
    CookiePerRequest,
    /// Echo with a cookie for the first result; later results carry invalid base64.
    CookieThenCorruptBody,
}

#[derive(Debug)]
pub(crate) struct MockTransport {
    mode: MockMode,
    pub(crate) single_calls: AtomicUsize,
    pub(crate) batch_calls: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new(mode: MockMode) -> Self {
        Self {
            mode,
            single_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn echo() -> Self {
        Self::new(MockMode::Echo)
    }

    pub(crate) fn calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst) + self.batch_calls.load(Ordering::SeqCst)
    }

    fn answer(&self, payload: &RequestPayload, index: usize) -> Result<RawResult, TransportError> {
        match self.mode {
            MockMode::Echo => Ok(echo(payload)),
            MockMode::IoFailure => Err(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "bridge went away",
            ))),
            MockMode::BridgeFailure => Err(TransportError::Client(ClientError::Bridge {
                status: 502,
                message: "upstream unreachable".to_string(),
            })),
            MockMode::CookiePerRequest => {
                Ok(with_cookie(echo(payload), &format!("visited={}", payload.url)))
            }
            MockMode::CookieThenCorruptBody if index == 0 => {
                Ok(with_cookie(echo(payload), "fresh=1"))
            }
            MockMode::CookieThenCorruptBody => Ok(RawResult {
                body: "***".to_string(),
                is_base64: true,
                ..echo(payload)
            }),
        }
    }
}

fn echo(payload: &RequestPayload) -> RawResult {
    let mut headers = RawHeaders::new();
    headers.insert("X-Method".to_string(), vec![payload.method.clone()]);
    RawResult {
        target: payload.url.clone(),
        status: 200,
        headers: Some(headers),
        body: payload.url.clone(),
        is_base64: false,
    }
}

fn with_cookie(mut raw: RawResult, set_cookie: &str) -> RawResult {
    raw.headers
        .get_or_insert_with(RawHeaders::new)
        .insert("Set-Cookie".to_string(), vec![set_cookie.to_string()]);
    raw
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, payload: &RequestPayload) -> Result<RawResult, TransportError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.answer(payload, 0)
    }

    async fn execute_batch(
        &self,
        payloads: &[RequestPayload],
    ) -> Result<Vec<RawResult>, TransportError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| self.answer(payload, index))
            .collect()
    }
}
