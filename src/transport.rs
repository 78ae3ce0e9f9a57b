//! # HTTP transports
//!
//! The runner only needs one capability from an HTTP client: POST a JSON body to a
//! URL and report the status code and elapsed time. [`Transport`] is that seam.
//!
//! Two implementations ship with the crate:
//!
//! - [`GooseTransport`] borrows the Goose virtual user driving the iteration, so the
//!   request lands in Goose's request metrics and report.
//! - [`HttpTransport`] wraps a plain `reqwest::Client` for one-shot runs
//!   (`favload once`, `favload probe`) and tests.
//!
//! Neither retries. A request that never produced a response (connection refused,
//! timeout, malformed response) comes back as an [`Exchange`] with status `0` and
//! `transport_error` set, and every check treats it as failed.

use anyhow::Context;
use goose::prelude::{GooseMethod, GooseRequest, GooseUser};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::warn;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Outcome of one POST, as seen by the checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// HTTP status code, `0` when no response arrived
    pub status: u16,
    /// Time from sending the request to receiving the full response
    pub elapsed: Duration,
    /// Client-side failure description, if the request never completed
    pub transport_error: Option<String>,
}

impl Exchange {
    pub fn completed(status: u16, elapsed: Duration) -> Self {
        Self {
            status,
            elapsed,
            transport_error: None,
        }
    }

    pub fn failed(elapsed: Duration, error: impl Into<String>) -> Self {
        Self {
            status: 0,
            elapsed,
            transport_error: Some(error.into()),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.transport_error.is_some()
    }
}

/// POST capability consumed by the iteration runner.
pub trait Transport: Send {
    /// Send `body` to `url` with `Content-Type: application/json`.
    ///
    /// Never fails: client errors are folded into the returned [`Exchange`].
    fn post_json(&mut self, url: &str, body: String) -> impl Future<Output = Exchange> + Send;
}

/// Transport backed by the Goose user running the current transaction.
pub struct GooseTransport<'a> {
    user: &'a mut GooseUser,
}

impl<'a> GooseTransport<'a> {
    pub fn new(user: &'a mut GooseUser) -> Self {
        Self { user }
    }
}

impl Transport for GooseTransport<'_> {
    async fn post_json(&mut self, url: &str, body: String) -> Exchange {
        let request_builder = match self.user.get_request_builder(&GooseMethod::Post, url) {
            Ok(builder) => builder
                .header("Content-Type", CONTENT_TYPE_JSON)
                .body(body),
            Err(e) => return Exchange::failed(Duration::ZERO, e.to_string()),
        };
        let goose_request = GooseRequest::builder()
            .set_request_builder(request_builder)
            .build();

        match self.user.request(goose_request).await {
            Ok(goose) => {
                let elapsed = Duration::from_millis(goose.request.response_time);
                match goose.response {
                    Ok(response) => Exchange::completed(response.status().as_u16(), elapsed),
                    Err(e) => {
                        warn!(url, error = %e, "favorite request failed before a response");
                        Exchange::failed(elapsed, e.to_string())
                    }
                }
            }
            Err(e) => {
                warn!(url, error = %e, "goose rejected favorite request");
                Exchange::failed(Duration::ZERO, e.to_string())
            }
        }
    }
}

/// Standalone transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn post_json(&mut self, url: &str, body: String) -> Exchange {
        let started = Instant::now();
        let sent = self
            .client
            .post(url)
            .header("Content-Type", CONTENT_TYPE_JSON)
            .body(body)
            .send()
            .await;

        let response = match sent {
            Ok(response) => response,
            Err(e) => {
                warn!(url, error = %e, "favorite request failed before a response");
                return Exchange::failed(started.elapsed(), e.to_string());
            }
        };

        let status = response.status().as_u16();
        // Timing covers the body, not just the headers.
        if let Err(e) = response.bytes().await {
            warn!(url, status, error = %e, "failed reading favorite response body");
            return Exchange::failed(started.elapsed(), e.to_string());
        }
        Exchange::completed(status, started.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_exchange() {
        let ex = Exchange::completed(200, Duration::from_millis(12));
        assert_eq!(ex.status, 200);
        assert!(!ex.is_transport_failure());
    }

    #[test]
    fn test_failed_exchange_has_zero_status() {
        let ex = Exchange::failed(Duration::from_millis(5), "connection refused");
        assert_eq!(ex.status, 0);
        assert!(ex.is_transport_failure());
        assert_eq!(ex.transport_error.as_deref(), Some("connection refused"));
    }

    #[tokio::test]
    async fn test_http_transport_connection_refused_is_failed_exchange() {
        let addr = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        let mut transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        let ex = transport
            .post_json(&format!("http://{addr}/api/v1/favorite"), "{}".to_string())
            .await;
        assert!(ex.is_transport_failure());
        assert_eq!(ex.status, 0);
    }
}
