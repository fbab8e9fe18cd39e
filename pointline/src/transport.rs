//! Transport seam and write endpoint construction.
//!
//! The network link and HTTP client live behind the [`Transport`] trait. A
//! transport only moves bytes and reports the raw HTTP status; deciding what a
//! status means (success, retry, fail fast) happens once, in
//! [`check_status`].
//!
//! With the `http` feature enabled, [`http::HttpTransport`] provides a
//! blocking `reqwest` implementation.

use std::time::Duration;

use crate::error::TransportError;

#[cfg(feature = "http")]
pub mod http;

/// Path of the v2 write API.
pub const WRITE_PATH: &str = "/api/v2/write";

/// Default base URL of the hosted store.
pub const DEFAULT_BASE_URL: &str = "https://cloud2.influxdata.com";

/// Destination credentials and routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// API token sent as `Authorization: Token <token>`.
    pub token: String,
    /// Organization name.
    pub org: String,
    /// Bucket name.
    pub bucket: String,
}

impl Credentials {
    /// Creates credentials.
    pub fn new(
        token: impl Into<String>,
        org: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            org: org.into(),
            bucket: bucket.into(),
        }
    }

    /// Write URL for `base_url`: `<base>/api/v2/write?org=<org>&bucket=<bucket>`.
    ///
    /// Org and bucket are form-encoded, so `R&D` stays one value.
    pub fn write_url(&self, base_url: &str) -> String {
        format!(
            "{}{WRITE_PATH}?org={}&bucket={}",
            base_url.trim_end_matches('/'),
            query_value(&self.org),
            query_value(&self.bucket)
        )
    }
}

fn query_value(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Health URL derived from a write URL: the query is dropped and the trailing
/// `/write` segment becomes `/health`.
pub fn health_url(write_url: &str) -> String {
    let path = write_url
        .split_once('?')
        .map_or(write_url, |(path, _)| path)
        .trim_end_matches('/');
    let base = path.strip_suffix("/write").unwrap_or(path);
    format!("{base}/health")
}

/// One outgoing write.
#[derive(Debug, Clone, Copy)]
pub struct WriteRequest<'a> {
    /// Full write URL.
    pub url: &'a str,
    /// API token.
    pub token: &'a str,
    /// Newline-separated line-protocol text.
    pub payload: &'a str,
    /// Per-request timeout.
    pub timeout: Duration,
}

/// Raw HTTP outcome of a request that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response body text.
    pub body: String,
}

impl Response {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Network collaborator used by the client.
pub trait Transport {
    /// Returns `true` if the link is up.
    fn is_connected(&mut self) -> bool;

    /// Tries to bring the link back up. Returns the resulting link state.
    fn reconnect(&mut self) -> bool {
        self.is_connected()
    }

    /// POSTs a payload.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no HTTP response was received
    /// (connection failure, timeout). Non-2xx responses are returned as `Ok`.
    fn send(&mut self, request: &WriteRequest<'_>) -> Result<Response, TransportError>;

    /// GETs the health endpoint with the given token.
    ///
    /// # Errors
    ///
    /// As for [`send`](Self::send).
    fn health_check(
        &mut self,
        url: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn is_connected(&mut self) -> bool {
        (**self).is_connected()
    }

    fn reconnect(&mut self) -> bool {
        (**self).reconnect()
    }

    fn send(&mut self, request: &WriteRequest<'_>) -> Result<Response, TransportError> {
        (**self).send(request)
    }

    fn health_check(
        &mut self,
        url: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Response, TransportError> {
        (**self).health_check(url, token, timeout)
    }
}

/// Maps a response status onto success or a classified failure.
///
/// | Status | Result |
/// |---|---|
/// | 2xx | `Ok` |
/// | 401, 403 | [`TransportError::Auth`] (not retryable) |
/// | 408, 429 | [`TransportError::HttpStatus`] (retryable) |
/// | other 4xx | [`TransportError::Rejected`] (not retryable) |
/// | anything else | [`TransportError::HttpStatus`] (retryable) |
///
/// # Errors
///
/// Returns the classified [`TransportError`] for any non-2xx status.
pub fn check_status(response: Response) -> Result<Response, TransportError> {
    let Response { status, body } = response;
    match status {
        200..=299 => Ok(Response { status, body }),
        401 | 403 => Err(TransportError::Auth { status }),
        408 | 429 => Err(TransportError::HttpStatus { status, body }),
        400..=499 => Err(TransportError::Rejected { status, body }),
        _ => Err(TransportError::HttpStatus { status, body }),
    }
}
