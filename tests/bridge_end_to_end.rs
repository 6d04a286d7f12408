//! End-to-end tests: session -> bridge transport -> mock bridge -> responses.
//!
//! The bridge process is stood in for by an `httptest` server speaking the
//! bridge's JSON protocol.

use std::sync::Arc;

use httptest::{matchers::*, responders::*, Expectation, Server};
use tlsbatch::{
    BatchExecutor, BridgeTransport, ClientError, ErrorKind, HeaderValue, RequestExecutor,
    RequestOptions, Session,
};

fn session_for(server: &Server) -> Arc<Session> {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let transport = BridgeTransport::with_client(client, format!("http://{}", server.addr()));
    Session::builder(Arc::new(transport)).build()
}

#[tokio::test]
async fn test_batch_through_bridge() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/multirequest"),
            request::body(matches(r#"^\[\{"method":"GET","url":"https://a\.test/""#)),
        ])
        .times(1)
        .respond_with(status_code(200).body(
            r#"[
                {"target":"https://a.test/","status":200,
                 "headers":{"Content-Type":["text/html"],"Set-Cookie":["session=xyz; Path=/"],
                            "Link":["<https://a.test/?page=2>; rel=next, <https://a.test/?page=9>; rel=last"]},
                 "body":"<html><head><title>A</title></head><body><p class=x>one</p><p class=x>two</p></body></html>",
                 "isBase64":false},
                {"target":"https://b.test/final","status":404,"headers":null,"body":"missing","isBase64":false},
                {"target":"https://c.test/","status":200,"headers":{"Vary":["Accept","Cookie"]},
                 "body":"aGVsbG8=","isBase64":true}
            ]"#,
        )),
    );

    let session = session_for(&server);
    let mut batch: BatchExecutor = ["https://a.test/", "https://b.test/", "https://c.test/"]
        .into_iter()
        .map(|url| RequestExecutor::new(Arc::clone(&session), "GET", url, None, RequestOptions::new()))
        .collect::<Result<_, _>>()
        .unwrap();

    let responses = batch.execute_pool().await.unwrap();
    assert_eq!(responses.len(), 3);

    let a = &responses[0];
    assert!(a.ok());
    assert_eq!(a.html().title().as_deref(), Some("A"));
    assert_eq!(a.find_all("p.x").unwrap().len(), 2);
    assert_eq!(a.cookies().get("session"), Some("xyz"));
    assert_eq!(session.cookies().get("session"), Some("xyz"));
    let links = a.links();
    assert_eq!(links["next"]["url"], "https://a.test/?page=2");
    assert_eq!(links["last"]["url"], "https://a.test/?page=9");

    let b = &responses[1];
    assert!(!b.ok());
    assert!(!bool::from(b));
    assert_eq!(b.url(), "https://b.test/final");
    assert_eq!(b.request_url(), Some("https://b.test/"));
    assert_eq!(b.reason(), "Not Found");
    assert_eq!(b.to_string(), "<Response [404]>");
    assert!(b.headers().is_empty());
    assert!(b.links().is_empty());

    let c = &responses[2];
    assert_eq!(c.content().as_ref(), b"hello");
    assert!(!c.is_utf8());
    assert_eq!(
        c.header("vary"),
        Some(&HeaderValue::Multiple(vec![
            "Accept".to_string(),
            "Cookie".to_string()
        ]))
    );
}

#[tokio::test]
async fn test_session_cookies_are_sent_on_later_requests() {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/request"),
            request::body(matches(r#""cookies":\[\]"#)),
        ])
        .times(1)
        .respond_with(status_code(200).body(
            r#"{"target":"https://a.test/login","status":200,
                "headers":{"Set-Cookie":["token=t1; Path=/"]},"body":"","isBase64":false}"#,
        )),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("POST", "/request"),
            request::body(matches(r#""cookies":\[\{"name":"token","value":"t1""#)),
        ])
        .times(1)
        .respond_with(status_code(200).body(
            r#"{"target":"https://a.test/me","status":200,"headers":null,"body":"{\"user\":\"me\"}","isBase64":false}"#,
        )),
    );

    let session = session_for(&server);
    session
        .request("POST", "https://a.test/login", RequestOptions::new())
        .await
        .unwrap();
    let me = session
        .request("GET", "https://a.test/me", RequestOptions::new())
        .await
        .unwrap();

    let body: serde_json::Value = me.json().unwrap();
    assert_eq!(body["user"], "me");
}

#[tokio::test]
async fn test_malformed_batch_reply_fails_whole_batch() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/multirequest"))
            .respond_with(status_code(200).body("{\"oops\":true}")),
    );

    let session = session_for(&server);
    let mut batch = BatchExecutor::new(vec![RequestExecutor::new(
        Arc::clone(&session),
        "GET",
        "https://a.test/",
        None,
        RequestOptions::new(),
    )
    .unwrap()]);

    let err = batch.execute_pool().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Connection);
}

#[tokio::test]
async fn test_bridge_rejection_reaches_single_caller_unchanged() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("POST", "/request"))
            .respond_with(status_code(400).body("unsupported browser")),
    );

    let session = session_for(&server);
    let err = session
        .request("GET", "https://a.test/", RequestOptions::new())
        .await
        .unwrap_err();

    match err {
        ClientError::Bridge { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "unsupported browser");
        }
        other => panic!("expected bridge error, got {other:?}"),
    }
}
