//! Executes `HttpRequest`s against the network.
//!
//! # Design
//! `Transport` is the single seam between the I/O-free core and a real HTTP
//! stack. `UreqTransport` is the default blocking implementation; tests
//! substitute scripted transports to exercise retry behavior without
//! sockets.

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Performs one HTTP round-trip. Non-2xx responses are returned as data,
/// only connection-level failures are errors.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[cfg(feature = "blocking")]
pub use self::ureq_transport::UreqTransport;

#[cfg(feature = "blocking")]
mod ureq_transport {
    use std::time::Duration;

    use super::Transport;
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Blocking transport backed by a shared `ureq::Agent`.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
    }

    impl UreqTransport {
        /// `timeout` bounds the whole request, connect through body read.
        pub fn new(timeout: Duration) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build()
                .new_agent();
            Self { agent }
        }
    }

    impl Transport for UreqTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            let url = request.url();
            let headers = &request.headers;
            let body = request.body.as_deref();

            let result = match request.method {
                HttpMethod::Get => with_headers(self.agent.get(&url), headers).call(),
                HttpMethod::Delete => with_headers(self.agent.delete(&url), headers).call(),
                HttpMethod::Post => send(with_headers(self.agent.post(&url), headers), body),
                HttpMethod::Put => send(with_headers(self.agent.put(&url), headers), body),
                HttpMethod::Patch => send(with_headers(self.agent.patch(&url), headers), body),
            };
            let mut response = result.map_err(map_error)?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let body = response.body_mut().read_to_string().map_err(map_error)?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }

    fn with_headers<B>(
        mut builder: ureq::RequestBuilder<B>,
        headers: &[(String, String)],
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
    }

    fn send(
        builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
        body: Option<&str>,
    ) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
        match body {
            Some(body) => builder.send(body.as_bytes()),
            None => builder.send_empty(),
        }
    }

    fn map_error(err: ureq::Error) -> ApiError {
        match err {
            ureq::Error::Timeout(_) => ApiError::Timeout,
            other => ApiError::Transport(other.to_string()),
        }
    }
}
