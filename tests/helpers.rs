// Shared test helpers: a scripted in-memory transport and sample responses.
//
// This module is included by other test files with `mod helpers;`.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use tlsbatch::transport::{RawHeaders, RawResult, RequestPayload};
use tlsbatch::{ClientError, Transport, TransportError};

/// How [`ScriptedTransport`] answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// 200 with the request URL as body and the method in `X-Method`.
    Echo,
    /// Like `Echo`, but a batch comes back one result short.
    Truncate,
    /// Every call fails with an I/O error.
    IoFailure,
    /// Every call fails with a JSON deserialization error.
    Garbage,
    /// Every call fails with an error the bridge already classified.
    BridgeRejects,
}

/// Transport that records what it was sent and answers from a [`Script`].
#[derive(Debug)]
pub struct ScriptedTransport {
    script: Script,
    single_calls: AtomicUsize,
    batch_calls: AtomicUsize,
    sent: Mutex<Vec<RequestPayload>>,
}

impl ScriptedTransport {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            single_calls: AtomicUsize::new(0),
            batch_calls: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Every payload received so far, in order.
    pub fn sent(&self) -> Vec<RequestPayload> {
        self.sent.lock().unwrap().clone()
    }

    fn fail(&self) -> Option<TransportError> {
        match self.script {
            Script::Echo | Script::Truncate => None,
            Script::IoFailure => Some(TransportError::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))),
            Script::Garbage => Some(TransportError::Malformed(
                serde_json::from_str::<RawResult>("not json").unwrap_err(),
            )),
            Script::BridgeRejects => Some(TransportError::Client(ClientError::Bridge {
                status: 400,
                message: "unsupported browser".to_string(),
            })),
        }
    }
}

/// The result the echo scripts return for `payload`.
pub fn echo(payload: &RequestPayload) -> RawResult {
    let mut headers = RawHeaders::new();
    headers.insert("X-Method".to_string(), vec![payload.method.clone()]);
    headers.insert(
        "Content-Type".to_string(),
        vec!["text/plain; charset=utf-8".to_string()],
    );
    RawResult {
        target: payload.url.clone(),
        status: 200,
        headers: Some(headers),
        body: payload.url.clone(),
        is_base64: false,
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, payload: &RequestPayload) -> Result<RawResult, TransportError> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().push(payload.clone());
        match self.fail() {
            Some(e) => Err(e),
            None => Ok(echo(payload)),
        }
    }

    async fn execute_batch(
        &self,
        payloads: &[RequestPayload],
    ) -> Result<Vec<RawResult>, TransportError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().unwrap().extend_from_slice(payloads);
        if let Some(e) = self.fail() {
            return Err(e);
        }
        let mut results: Vec<RawResult> = payloads.iter().map(echo).collect();
        if self.script == Script::Truncate {
            results.pop();
        }
        Ok(results)
    }
}
