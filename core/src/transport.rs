//! Blocking execution of `HttpRequest` values.
//!
//! # Design
//! `Transport` is the single I/O seam of the crate. `UreqTransport` is the
//! production implementation: it owns one `ureq::Agent`, so connections are
//! pooled across calls, and it returns 4xx/5xx responses as data instead of
//! errors. URLs are checked before the agent sees them, so a malformed base
//! URL is reported as a `Request` error rather than a network failure.

use ureq::http::Uri;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one synchronous HTTP exchange.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// `Transport` backed by a shared `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
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
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        validate_url(request)?;

        let url = request.url.as_str();
        let body = request.body.as_deref();
        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), &request.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), &request.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(url), &request.headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Put => {
                let builder = with_headers(self.agent.put(url), &request.headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|err| classify(request, err))?;

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
        // CouchDB documents can exceed ureq's default 10 MiB read cap.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|source| ApiError::Body { status, source })?;

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

/// Reject URLs that cannot address a server before touching the network.
fn validate_url(request: &HttpRequest) -> Result<()> {
    let invalid = |reason: String| ApiError::Request {
        method: request.method,
        url: request.url.clone(),
        reason,
    };

    let uri: Uri = request
        .url
        .parse()
        .map_err(|err: ureq::http::uri::InvalidUri| invalid(err.to_string()))?;

    match uri.scheme_str() {
        Some("http") | Some("https") => {}
        Some(other) => return Err(invalid(format!("unsupported scheme `{other}`"))),
        None => return Err(invalid("missing scheme".to_string())),
    }
    if uri.host().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(())
}

/// Split ureq failures into construction problems and network problems.
fn classify(request: &HttpRequest, err: ureq::Error) -> ApiError {
    match err {
        ureq::Error::BadUri(reason) => ApiError::Request {
            method: request.method,
            url: request.url.clone(),
            reason,
        },
        ureq::Error::Http(err) => ApiError::Request {
            method: request.method,
            url: request.url.clone(),
            reason: err.to_string(),
        },
        other => ApiError::Transport(other),
    }
}
