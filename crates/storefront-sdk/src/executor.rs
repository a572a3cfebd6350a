//! Single HTTP call with timeout and linear-backoff retry
//!
//! Only transport failures are retried: timeouts, connection resets and
//! connection timeouts. Any HTTP response, whatever its status, is returned
//! to the caller untouched; status handling belongs to the pipeline.

use std::error::Error as StdError;
use std::io::ErrorKind;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, Response};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::metrics;

/// A fully resolved request. Replays reuse it with a new bearer token.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub url: String,
    pub method: Method,
    pub headers: HeaderMap,
    /// JSON text, attached for non-GET methods only
    pub body: Option<String>,
    pub timeout: Duration,
    /// Whether a 401 on this request may trigger a token refresh
    pub authentication: bool,
    bearer: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderMap::new(),
            body: None,
            timeout,
            authentication: false,
            bearer: None,
        }
    }

    /// Access token this request was sent with, if any.
    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    /// Attach (or replace) `Authorization: Bearer <token>`.
    pub fn set_bearer(&mut self, token: &str) -> Result<()> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| Error::Config(format!("invalid access token header value: {e}")))?;
        value.set_sensitive(true);
        self.headers.insert(AUTHORIZATION, value);
        self.bearer = Some(token.to_owned());
        Ok(())
    }
}

/// Stateless executor; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    http: reqwest::Client,
    retries: u32,
    retry_delay: Duration,
}

impl RequestExecutor {
    pub fn new(http: reqwest::Client, retries: u32, retry_delay: Duration) -> Self {
        Self {
            http,
            retries,
            retry_delay,
        }
    }

    /// Send `request`, retrying retryable transport failures.
    ///
    /// The n-th retry waits `n * retry_delay`. A request that fails
    /// retryably every time is attempted `retries + 1` times.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<Response> {
        let mut attempt = 0u32;
        loop {
            debug!(method = %request.method, url = %request.url, attempt, "sending request");
            match self.send(request).await {
                Ok(response) => {
                    metrics::record_request(request.method.as_str(), response.status().as_u16());
                    return Ok(response);
                }
                Err(e) if attempt < self.retries && is_retryable(&e) => {
                    attempt += 1;
                    let delay = self.retry_delay * attempt;
                    warn!(
                        url = %request.url,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient transport failure, retrying"
                    );
                    metrics::record_retry();
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(transport_error(&request.url, e, attempt + 1)),
            }
        }
    }

    async fn send(&self, request: &RequestDescriptor) -> reqwest::Result<Response> {
        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone())
            .timeout(request.timeout);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        builder.send().await
    }
}

/// Whether a transport failure is worth another attempt.
///
/// Timeouts, connection resets and OS-level connection timeouts qualify.
/// Refused connections, DNS failures, TLS errors and the like do not.
pub fn is_retryable(err: &reqwest::Error) -> bool {
    if err.is_timeout() {
        return true;
    }
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            if matches!(io.kind(), ErrorKind::ConnectionReset | ErrorKind::TimedOut) {
                return true;
            }
        }
        source = cause.source();
    }
    false
}

fn transport_error(url: &str, err: reqwest::Error, attempts: u32) -> Error {
    if err.is_timeout() {
        metrics::record_transport_error("timeout");
        Error::Timeout(format!("{url} after {attempts} attempt(s): {err}"))
    } else {
        metrics::record_transport_error("connection");
        Error::Transport(format!("{url} after {attempts} attempt(s): {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Upstream that counts connections and holds the first `hang` of them
    /// open without answering; later connections get a 200.
    async fn flaky_upstream(hang: u64) -> (String, Arc<AtomicU64>) {
        let connections = Arc::new(AtomicU64::new(0));
        let counter = connections.clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/ping", listener.local_addr().unwrap());

        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::spawn(async move {
                    if n <= hang {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                        return;
                    }
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket
                        .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok")
                        .await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        (url, connections)
    }

    fn get(url: &str, timeout: Duration) -> RequestDescriptor {
        RequestDescriptor::new(Method::GET, url, timeout)
    }

    #[tokio::test]
    async fn timeout_is_attempted_retries_plus_one_times() {
        let (url, connections) = flaky_upstream(u64::MAX).await;
        let executor =
            RequestExecutor::new(reqwest::Client::new(), 2, Duration::from_millis(10));

        let result = executor.execute(&get(&url, Duration::from_millis(50))).await;

        assert!(matches!(result, Err(Error::Timeout(_))), "got {result:?}");
        tokio::time::sleep(Duration::from_millis(50)).await;
        let attempts = connections.load(Ordering::SeqCst);
        assert_eq!(attempts, 3, "retries = 2 must give exactly 3 attempts, got {attempts}");
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let (url, connections) = flaky_upstream(u64::MAX).await;
        let executor =
            RequestExecutor::new(reqwest::Client::new(), 0, Duration::from_millis(10));

        let result = executor.execute(&get(&url, Duration::from_millis(50))).await;

        assert!(matches!(result, Err(Error::Timeout(_))));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(connections.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retry_recovers_after_transient_timeout() {
        let (url, connections) = flaky_upstream(1).await;
        let executor =
            RequestExecutor::new(reqwest::Client::new(), 3, Duration::from_millis(10));

        let response = executor
            .execute(&get(&url, Duration::from_millis(100)))
            .await
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "ok");
        assert_eq!(connections.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn refused_connection_is_not_retried() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        drop(listener);

        // A retry would sleep at least 5s.
        let executor = RequestExecutor::new(reqwest::Client::new(), 3, Duration::from_secs(5));
        let started = std::time::Instant::now();
        let result = executor.execute(&get(&url, Duration::from_secs(1))).await;

        assert!(matches!(result, Err(Error::Transport(_))), "got {result:?}");
        assert!(
            started.elapsed() < Duration::from_secs(4),
            "connection refused must fail without backoff"
        );
    }

    #[tokio::test]
    async fn http_error_status_is_returned_not_retried() {
        let hits = Arc::new(AtomicU64::new(0));
        let counter = hits.clone();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        tokio::spawn(async move {
            loop {
                let (mut socket, _) = listener.accept().await.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let mut buf = [0u8; 4096];
                    let _ = socket.read(&mut buf).await;
                    let _ = socket
                        .write_all(b"HTTP/1.1 503 Service Unavailable\r\ncontent-length: 4\r\nconnection: close\r\n\r\nbusy")
                        .await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        let executor = RequestExecutor::new(reqwest::Client::new(), 3, Duration::from_millis(10));
        let response = executor
            .execute(&get(&url, Duration::from_secs(1)))
            .await
            .unwrap();

        assert_eq!(response.status(), 503);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn set_bearer_replaces_authorization_header() {
        let mut request = get("http://localhost/", Duration::from_secs(1));
        assert!(request.bearer_token().is_none());

        request.set_bearer("A1").unwrap();
        request.set_bearer("A2").unwrap();

        assert_eq!(request.bearer_token(), Some("A2"));
        assert_eq!(request.headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(request.headers[AUTHORIZATION], "Bearer A2");
    }

    #[test]
    fn set_bearer_rejects_header_breaking_tokens() {
        let mut request = get("http://localhost/", Duration::from_secs(1));
        assert!(matches!(
            request.set_bearer("bad\ntoken"),
            Err(Error::Config(_))
        ));
    }
}
