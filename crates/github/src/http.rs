//! Transport boundary for all HTTP I/O.
//!
//! The client builds plain [`HttpRequest`] values, runs them through the
//! request pipeline and the response cache, and finally hands them to an
//! [`HttpTransport`]. Production code uses [`ReqwestTransport`]; unit tests
//! swap in an in-memory mock.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// HTTP methods used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Patch,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// HTTP headers represented as key/value pairs.
///
/// Header names are treated case-insensitively by helper functions.
pub type HttpHeaders = Vec<(String, String)>;

/// A minimal HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Creates a bodyless request with no headers.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    /// Returns how many headers named `name` the request carries.
    #[must_use]
    pub fn header_count(&self, name: &str) -> usize {
        self.headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .count()
    }

    /// Sets `name` to `value`, replacing every existing header of that name.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }
}

/// A minimal HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpResponse {
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("http transport error: {0}")]
    Transport(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("no mock response registered for {method} {url}")]
    NoMockResponse { method: String, url: String },
}

/// Transport boundary for all HTTP I/O.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

/// Get the first header value matching `name` (case-insensitive).
#[must_use]
pub fn header_get<'a>(headers: &'a HttpHeaders, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// A real HTTP transport backed by reqwest.
///
/// The underlying `reqwest::Client` owns the connection pool and is cheap to
/// clone; the timeout acts as the per-call deadline.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| HttpError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout(e.to_string())
    } else {
        HttpError::Transport(e.to_string())
    }
}

/// Copies response headers, skipping values that are not visible ASCII.
fn response_headers(map: &reqwest::header::HeaderMap) -> HttpHeaders {
    map.iter()
        .filter_map(|(name, value)| match value.to_str() {
            Ok(value) => Some((name.as_str().to_string(), value.to_string())),
            Err(_) => {
                debug!(header = %name, "skipping non-ASCII response header");
                None
            }
        })
        .collect()
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.client.request(method, &request.url);
        for (k, v) in request.headers {
            builder = builder.header(&k, &v);
        }

        if !request.body.is_empty() {
            builder = builder.body(request.body);
        }

        let resp = builder.send().await.map_err(map_reqwest_error)?;

        let status = resp.status().as_u16();
        let headers = response_headers(resp.headers());

        let body = resp.bytes().await.map_err(map_reqwest_error)?.to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

// ---------- Test-only mock transport ----------

#[cfg(test)]
use std::collections::{HashMap, VecDeque};
#[cfg(test)]
use std::sync::{Arc, Mutex};

/// In-memory mock transport.
///
/// No sockets, no loopback HTTP servers.
#[cfg(test)]
#[derive(Clone, Default)]
pub(crate) struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[cfg(test)]
#[derive(Default)]
struct MockTransportInner {
    routes: HashMap<(HttpMethod, String), VecDeque<HttpResponse>>,
    requests: Vec<HttpRequest>,
}

#[cfg(test)]
impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a response for a method + URL.
    ///
    /// If multiple responses are registered for the same key, they are returned
    /// in FIFO order.
    pub(crate) fn push_response(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        response: HttpResponse,
    ) {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");
        inner
            .routes
            .entry((method, url.into()))
            .or_default()
            .push_back(response);
    }

    /// Register a JSON response with the given status and extra headers.
    pub(crate) fn push_json(
        &self,
        method: HttpMethod,
        url: impl Into<String>,
        status: u16,
        body: &serde_json::Value,
        headers: &[(&str, &str)],
    ) {
        let mut all_headers: HttpHeaders =
            vec![("Content-Type".to_string(), "application/json".to_string())];
        all_headers.extend(
            headers
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );
        self.push_response(
            method,
            url,
            HttpResponse {
                status,
                headers: all_headers,
                body: serde_json::to_vec(body).expect("serialize mock body"),
            },
        );
    }

    #[must_use]
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        let inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");
        inner.requests.clone()
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut inner = self
            .inner
            .lock()
            .expect("mock transport lock should not be poisoned");

        let key = (request.method, request.url.clone());
        inner.requests.push(request);

        match inner.routes.get_mut(&key).and_then(|q| q.pop_front()) {
            Some(resp) => Ok(resp),
            None => Err(HttpError::NoMockResponse {
                method: key.0.as_str().to_string(),
                url: key.1,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_get_is_case_insensitive_and_returns_first_match() {
        let headers: HttpHeaders = vec![
            ("ETag".to_string(), "W/\"abc\"".to_string()),
            ("etag".to_string(), "W/\"def\"".to_string()),
        ];
        assert_eq!(header_get(&headers, "etag"), Some("W/\"abc\""));
        assert_eq!(header_get(&headers, "ETAG"), Some("W/\"abc\""));
        assert_eq!(header_get(&headers, "missing"), None);
    }

    #[test]
    fn non_ascii_response_headers_are_skipped() {
        use reqwest::header::{HeaderMap, HeaderValue};

        let mut map = HeaderMap::new();
        map.insert("etag", HeaderValue::from_bytes(b"\"caf\xe9\"").unwrap());
        map.insert("x-ratelimit-remaining", HeaderValue::from_static("59"));

        let headers = response_headers(&map);
        assert_eq!(header_get(&headers, "etag"), None);
        assert_eq!(header_get(&headers, "x-ratelimit-remaining"), Some("59"));
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn set_header_replaces_existing_values() {
        let mut req = HttpRequest::new(HttpMethod::Get, "https://example.com");
        req.headers
            .push(("authorization".to_string(), "token a".to_string()));
        req.headers
            .push(("Authorization".to_string(), "token b".to_string()));

        req.set_header("Authorization", "token c");

        assert_eq!(req.header_count("authorization"), 1);
        assert_eq!(req.header("AUTHORIZATION"), Some("token c"));
    }

    #[test]
    fn http_method_as_str_matches_expected_values() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Patch.as_str(), "PATCH");
    }

    #[test]
    fn http_response_success_range() {
        let mut resp = HttpResponse {
            status: 200,
            headers: Vec::new(),
            body: Vec::new(),
        };
        assert!(resp.is_success());
        resp.status = 304;
        assert!(!resp.is_success());
        resp.status = 404;
        assert!(!resp.is_success());
    }

    #[tokio::test]
    async fn mock_transport_returns_registered_response_and_records_request() {
        let transport = MockTransport::new();
        let url = "https://example.com/api";

        transport.push_response(
            HttpMethod::Get,
            url,
            HttpResponse {
                status: 200,
                headers: vec![("X-Test".to_string(), "ok".to_string())],
                body: b"hello".to_vec(),
            },
        );

        let mut req = HttpRequest::new(HttpMethod::Get, url);
        req.set_header("Accept", "application/json");
        let resp = transport.send(req.clone()).await.expect("mock response");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("x-test"), Some("ok"));
        assert_eq!(resp.body, b"hello".to_vec());

        assert_eq!(transport.requests(), vec![req]);
    }

    #[tokio::test]
    async fn mock_transport_errors_when_no_response_is_registered() {
        let transport = MockTransport::new();
        let req = HttpRequest::new(HttpMethod::Get, "https://example.com/missing");

        let err = transport
            .send(req)
            .await
            .expect_err("missing mock should error");
        match err {
            HttpError::NoMockResponse { method, url } => {
                assert_eq!(method, "GET");
                assert_eq!(url, "https://example.com/missing");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn reqwest_transport_with_timeout_builds_client() {
        let transport = ReqwestTransport::with_timeout(Duration::from_millis(1))
            .expect("reqwest transport should build");
        let _ = transport;
    }

    #[tokio::test]
    async fn reqwest_transport_send_makes_request_and_reads_response() {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            stream
                .set_read_timeout(Some(Duration::from_secs(2)))
                .expect("set_read_timeout");

            let mut buf = Vec::new();
            let mut tmp = [0u8; 4096];
            loop {
                match stream.read(&mut tmp) {
                    Ok(0) => break,
                    Ok(n) => {
                        buf.extend_from_slice(&tmp[..n]);
                        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }
                    Err(e)
                        if e.kind() == std::io::ErrorKind::WouldBlock
                            || e.kind() == std::io::ErrorKind::TimedOut =>
                    {
                        break;
                    }
                    Err(e) => panic!("read request: {e}"),
                }
            }

            let req_text = String::from_utf8_lossy(&buf);
            assert!(
                req_text.starts_with("GET /rate_limit "),
                "unexpected request line: {req_text:?}"
            );
            assert!(
                req_text.to_lowercase().contains("x-test: 1"),
                "expected x-test header"
            );

            let body = b"{}";
            let response = format!(
                "HTTP/1.1 200 OK\r\nETag: \"v1\"\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            stream
                .write_all(response.as_bytes())
                .expect("write headers");
            stream.write_all(body).expect("write body");
        });

        let transport =
            ReqwestTransport::with_timeout(Duration::from_secs(5)).expect("build transport");
        let mut req = HttpRequest::new(HttpMethod::Get, format!("http://{addr}/rate_limit"));
        req.set_header("X-Test", "1");

        let resp = transport.send(req).await.expect("send");
        assert_eq!(resp.status, 200);
        assert_eq!(resp.header("etag"), Some("\"v1\""));
        assert_eq!(resp.body, b"{}".to_vec());

        handle.join().expect("server thread");
    }
}
