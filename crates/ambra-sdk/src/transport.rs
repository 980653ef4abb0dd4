//! HTTP transport.

use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::request::{Method, PreparedRequest};

/// Sends prepared requests and returns the raw response.
///
/// Non-success statuses are returned as responses, not errors; the client
/// classifies them against the request's error mapping.
pub trait Transport: Send + Sync + fmt::Debug {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse>;
}

/// Undecoded response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Blocking HTTP transport backed by reqwest.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Build a transport with the given request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        tracing::debug!(timeout_secs = timeout.as_secs(), "created HTTP transport");

        Ok(Self { client })
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport").finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &PreparedRequest) -> Result<RawResponse> {
        let url = request.url.clone();
        let builder = match request.method {
            Method::Post => self.client.post(url).form(&request.params),
            Method::Get => self.client.get(url).query(&request.params),
            Method::Delete => self.client.delete(url).query(&request.params),
        };

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();

        Ok(RawResponse { status, body })
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_response_helpers() {
        let response = RawResponse::new(200, r#"{"status":"OK","count":3}"#);
        assert!(response.is_success());
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["count"], 3);

        let response = RawResponse::new(404, "missing");
        assert!(!response.is_success());
        assert_eq!(response.text(), "missing");
    }

    #[test]
    fn test_http_transport_builds() {
        let transport = HttpTransport::new(Duration::from_secs(5), "ambra-sdk-test");
        assert!(transport.is_ok());
    }
}
