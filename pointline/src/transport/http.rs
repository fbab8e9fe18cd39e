//! Blocking HTTP transport built on `reqwest`.
//!
//! Only available with the `http` feature. The host is assumed to manage its
//! own network link, so [`HttpTransport`] always reports itself connected and
//! leaves link failures to surface as connection errors on send.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use super::{Response, Transport, WriteRequest};
use crate::error::TransportError;

/// Write transport over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Builds the underlying HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientCreate`] if the TLS backend cannot be
    /// initialized.
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| TransportError::ClientCreate { source: e })?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn is_connected(&mut self) -> bool {
        true
    }

    fn send(&mut self, request: &WriteRequest<'_>) -> Result<Response, TransportError> {
        let resp = self
            .client
            .post(request.url)
            .timeout(request.timeout)
            .header(AUTHORIZATION, format!("Token {}", request.token))
            .header(CONTENT_TYPE, "text/plain")
            .body(request.payload.to_string())
            .send()
            .map_err(map_error)?;

        let status = resp.status().as_u16();
        let body = resp.text().unwrap_or_default();
        Ok(Response { status, body })
    }

    fn health_check(
        &mut self,
        url: &str,
        token: &str,
        timeout: Duration,
    ) -> Result<Response, TransportError> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .header(AUTHORIZATION, format!("Token {token}"))
            .send()
            .map_err(map_error)?;

        let status = resp.status().as_u16();
        let body = resp.text().unwrap_or_default();
        Ok(Response { status, body })
    }
}

fn map_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Connect {
            reason: e.to_string(),
        }
    }
}
