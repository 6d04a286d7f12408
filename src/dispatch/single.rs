//! Execution of one request.

use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::cookies::CookieInput;
use crate::error_handling::ClientError;
use crate::headers::RequestHeaders;
use crate::multipart::encode_files;
use crate::response::Response;
use crate::session::{RequestData, RequestOptions, Session};

/// One not-yet-sent request bound to a session.
///
/// File uploads are encoded into a multipart body at construction time, so a
/// malformed upload fails before any network activity.
#[derive(Debug)]
pub struct RequestExecutor {
    pub(crate) session: Arc<Session>,
    pub(crate) method: String,
    pub(crate) url: String,
    pub(crate) cookies: Option<CookieInput>,
    pub(crate) options: RequestOptions,
    /// Headers resolved against the session when submitted as part of a batch.
    pub(crate) full_headers: Option<RequestHeaders>,
}

impl RequestExecutor {
    /// Prepares a request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Precondition` if `files` are given together with
    /// `data` that is not a form mapping, or if the multipart body cannot be built.
    pub fn new(
        session: Arc<Session>,
        method: impl Into<String>,
        url: impl Into<String>,
        cookies: Option<CookieInput>,
        mut options: RequestOptions,
    ) -> Result<Self, ClientError> {
        // An empty file list is the same as no files.
        if let Some(files) = options.files.take().filter(|files| !files.is_empty()) {
            let fields = match options.data.take() {
                None => Vec::new(),
                Some(RequestData::Form(fields)) => fields,
                Some(_) => {
                    return Err(ClientError::Precondition(
                        "Data must be a form mapping when files are passed".to_string(),
                    ))
                }
            };
            let (body, content_type) = encode_files(&files, &fields)?;
            options.data = Some(RequestData::Bytes(body));
            options
                .headers
                .get_or_insert_with(RequestHeaders::new)
                .insert("Content-Type", content_type);
        }

        Ok(Self {
            session,
            method: method.into(),
            url: url.into(),
            cookies,
            options,
            full_headers: None,
        })
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Headers resolved for the last batch submission, if any.
    pub fn full_headers(&self) -> Option<&RequestHeaders> {
        self.full_headers.as_ref()
    }

    /// Sends the request and records how long the bridge took.
    ///
    /// # Errors
    ///
    /// Transport failures surface as `ClientError::Connection`; errors the
    /// bridge already classified are returned unchanged.
    pub async fn send(&self) -> Result<Response, ClientError> {
        let start = Instant::now();
        let mut response = self.execute_request().await?;
        response.elapsed = Some(start.elapsed());
        debug!(
            "{} {} -> {} in {:?}",
            self.method,
            self.url,
            response.status_code(),
            response.elapsed
        );
        Ok(response)
    }

    async fn execute_request(&self) -> Result<Response, ClientError> {
        let mut response = self
            .session
            .execute_request(&self.method, &self.url, self.cookies.as_ref(), &self.options)
            .await
            .map_err(|e| {
                debug!("Request {} {} failed: {e}", self.method, self.url);
                ClientError::from_transport(e)
            })?;
        response.attach_origin(&self.session);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::ErrorKind;
    use crate::multipart::FilePart;
    use crate::transport::testing::{MockMode, MockTransport};
    use std::error::Error as _;

    fn session_with(transport: Arc<MockTransport>, temp: bool) -> Arc<Session> {
        Session::builder(transport).temporary(temp).build()
    }

    fn upload() -> Vec<(String, FilePart)> {
        vec![("file".to_string(), FilePart::new("a.txt", b"abc".to_vec()))]
    }

    #[test]
    fn test_files_with_non_form_data_fails_before_network() {
        let transport = Arc::new(MockTransport::echo());
        let options = RequestOptions::new()
            .files(upload())
            .data(RequestData::Text("raw".to_string()));

        let err = RequestExecutor::new(
            session_with(transport.clone(), false),
            "POST",
            "http://x",
            None,
            options,
        )
        .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Precondition);
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn test_files_become_multipart_body() {
        let options = RequestOptions::new()
            .header("content-type", "text/plain")
            .header("X-Keep", "1")
            .files(upload())
            .data(RequestData::Form(vec![("k".to_string(), "v".to_string())]));

        let executor = RequestExecutor::new(
            session_with(Arc::new(MockTransport::echo()), false),
            "POST",
            "http://x",
            None,
            options,
        )
        .unwrap();

        let headers = executor.options().headers.as_ref().unwrap();
        let content_type = headers.get("Content-Type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        assert_eq!(headers.get("x-keep"), Some(&"1".to_string()));
        assert!(executor.options().files.is_none());

        match &executor.options().data {
            Some(RequestData::Bytes(body)) => {
                let body = String::from_utf8_lossy(body);
                assert!(body.contains("name=\"k\"\r\n\r\nv\r\n"));
                assert!(body.contains("filename=\"a.txt\""));
            }
            other => panic!("expected multipart bytes, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_file_list_is_ignored() {
        let executor = RequestExecutor::new(
            session_with(Arc::new(MockTransport::echo()), false),
            "POST",
            "http://x",
            None,
            RequestOptions::new()
                .files(Vec::new())
                .data(RequestData::Text("raw".to_string())),
        )
        .unwrap();

        assert_eq!(
            executor.options().data,
            Some(RequestData::Text("raw".to_string()))
        );
        assert!(executor.options().headers.is_none());
    }

    #[test]
    fn test_files_without_data_or_headers() {
        let executor = RequestExecutor::new(
            session_with(Arc::new(MockTransport::echo()), false),
            "POST",
            "http://x",
            None,
            RequestOptions::new().files(upload()),
        )
        .unwrap();
        assert!(executor
            .options()
            .headers
            .as_ref()
            .unwrap()
            .contains_key("content-type"));
    }

    #[tokio::test]
    async fn test_send_records_elapsed_and_origin() {
        let transport = Arc::new(MockTransport::echo());
        let session = session_with(transport.clone(), false);
        let executor =
            RequestExecutor::new(session.clone(), "GET", "http://a.test/", None, RequestOptions::new())
                .unwrap();

        let response = executor.send().await.unwrap();

        assert_eq!(response.url(), "http://a.test/");
        assert!(response.elapsed().is_some());
        assert!(Arc::ptr_eq(&response.session().unwrap(), &session));
        assert_eq!(response.browser(), Some(session.browser()));
        assert_eq!(response.request_url(), Some("http://a.test/"));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_temporary_session_is_not_referenced() {
        let session = session_with(Arc::new(MockTransport::echo()), true);
        let response = RequestExecutor::new(session, "GET", "http://a.test/", None, RequestOptions::new())
            .unwrap()
            .send()
            .await
            .unwrap();
        assert!(response.session().is_none());
        assert!(response.browser().is_some());
    }

    #[tokio::test]
    async fn test_io_failure_becomes_connection_error() {
        let transport = Arc::new(MockTransport::new(MockMode::IoFailure));
        let executor = RequestExecutor::new(
            session_with(transport, false),
            "GET",
            "http://a.test/",
            None,
            RequestOptions::new(),
        )
        .unwrap();

        let err = executor.send().await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err
            .source()
            .unwrap()
            .to_string()
            .contains("bridge went away"));
    }

    #[tokio::test]
    async fn test_bridge_failure_is_not_rewrapped() {
        let transport = Arc::new(MockTransport::new(MockMode::BridgeFailure));
        let executor = RequestExecutor::new(
            session_with(transport, false),
            "GET",
            "http://a.test/",
            None,
            RequestOptions::new(),
        )
        .unwrap();

        match executor.send().await.unwrap_err() {
            ClientError::Bridge { status, .. } => assert_eq!(status, 502),
            other => panic!("expected bridge error, got {other:?}"),
        }
    }
}
