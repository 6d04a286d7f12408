//! Execution of many requests in one bridge round-trip.

use std::sync::Arc;
use std::time::Instant;

use log::{debug, warn};

use super::single::RequestExecutor;
use crate::error_handling::{ClientError, TransportError};
use crate::response::Response;

/// An ordered pool of requests submitted together.
#[derive(Debug, Default)]
pub struct BatchExecutor {
    pool: Vec<RequestExecutor>,
}

impl BatchExecutor {
    pub fn new(pool: Vec<RequestExecutor>) -> Self {
        Self { pool }
    }

    pub fn push(&mut self, executor: RequestExecutor) {
        self.pool.push(executor);
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn executors(&self) -> &[RequestExecutor] {
        &self.pool
    }

    pub fn into_inner(self) -> Vec<RequestExecutor> {
        self.pool
    }

    /// Sends every request in one batch and returns one response per request,
    /// in submission order.
    ///
    /// The batch goes through the transport of the first request's session.
    /// Each executor's resolved headers are stored on it before submission.
    ///
    /// # Errors
    ///
    /// Payload construction errors are returned as-is. Any failure while
    /// submitting the batch or reading its results, including a result count
    /// that does not match the request count, fails the whole batch with
    /// `ClientError::Connection`.
    pub async fn execute_pool(&mut self) -> Result<Vec<Response>, ClientError> {
        let Some(first) = self.pool.first() else {
            return Ok(Vec::new());
        };
        let transport = Arc::clone(first.session.transport());

        let mut payloads = Vec::with_capacity(self.pool.len());
        for executor in &mut self.pool {
            if !Arc::ptr_eq(executor.session.transport(), &transport) {
                warn!(
                    "Request {} {} uses a different transport; sending it with the batch anyway",
                    executor.method, executor.url
                );
            }
            let (payload, headers) = executor.session.build_request(
                &executor.method,
                &executor.url,
                executor.cookies.as_ref(),
                &executor.options,
            )?;
            executor.full_headers = Some(headers);
            payloads.push(payload);
        }

        debug!("Submitting batch of {} requests", payloads.len());
        let start = Instant::now();
        let results = transport
            .execute_batch(&payloads)
            .await
            .and_then(|results| {
                if results.len() == payloads.len() {
                    Ok(results)
                } else {
                    Err(TransportError::LengthMismatch {
                        expected: payloads.len(),
                        actual: results.len(),
                    })
                }
            })
            .map_err(|e| {
                warn!("Batch of {} requests failed: {e}", payloads.len());
                ClientError::connection(e)
            })?;
        let elapsed = start.elapsed();
        debug!("Batch of {} requests completed in {elapsed:?}", results.len());

        // Build every response before any session jar sees their cookies, so a
        // failing result leaves all sessions as they were.
        let mut responses = self
            .pool
            .iter()
            .zip(results)
            .map(|(executor, raw)| {
                let headers = executor.full_headers.clone().unwrap_or_default();
                executor
                    .session
                    .assemble_response(&executor.url, &headers, raw)
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (executor, response) in self.pool.iter().zip(&mut responses) {
            executor.session.store_cookies(response.cookies());
            response.attach_origin(&executor.session);
            response.elapsed = Some(elapsed);
        }
        Ok(responses)
    }
}

impl From<Vec<RequestExecutor>> for BatchExecutor {
    fn from(pool: Vec<RequestExecutor>) -> Self {
        Self::new(pool)
    }
}

impl FromIterator<RequestExecutor> for BatchExecutor {
    fn from_iter<I: IntoIterator<Item = RequestExecutor>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
