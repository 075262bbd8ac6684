//! Blocking transport seam between the client and the network.
//!
//! The client never performs I/O itself. It hands a fully built
//! [`HttpRequest`] to a [`Transport`] and classifies whatever
//! [`HttpResponse`] comes back. [`UreqTransport`] is the production
//! implementation; tests substitute a scripted one.

use std::io::Read as _;
use std::time::Duration;

use ureq::http;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Implementations must return non-2xx responses as data. Status
/// interpretation belongs to the client.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// A [`Transport`] backed by a blocking [`ureq`] agent.
#[derive(Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Agent with no timeout beyond ureq's defaults.
    pub fn new() -> Self {
        Self::with_config(None)
    }

    /// Agent that gives up on any request after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_config(Some(timeout))
    }

    fn with_config(timeout: Option<Duration>) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(timeout)
            // 4xx/5xx come back as responses so the client can classify them.
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let result = match request.body {
            Some(body) => {
                let req = builder
                    .body(body)
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                self.agent.run(req)
            }
            None => {
                let req = builder
                    .body(())
                    .map_err(|e| ApiError::Transport(e.to_string()))?;
                self.agent.run(req)
            }
        };

        match result {
            Ok(resp) => convert_response(resp),
            Err(ureq::Error::Timeout(_)) => Err(ApiError::Transport("request timed out".to_owned())),
            Err(e) => Err(ApiError::Transport(e.to_string())),
        }
    }
}

/// Convert a ureq `http::Response<Body>` into our [`HttpResponse`].
fn convert_response(response: http::Response<ureq::Body>) -> Result<HttpResponse, ApiError> {
    let (parts, body) = response.into_parts();

    let mut body_bytes = Vec::new();
    body.into_reader()
        .read_to_end(&mut body_bytes)
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    let headers = parts
        .headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_owned(), v.to_owned()))
        })
        .collect();

    Ok(HttpResponse {
        status: parts.status.as_u16(),
        headers,
        body: body_bytes,
    })
}
