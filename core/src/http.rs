//! HTTP request/response types and the pure halves of a round-trip.
//!
//! # Design
//! Requests and responses are plain data. `build_request` turns a method, an
//! absolute URL and an optional payload into an `HttpRequest` without any
//! I/O, and `decode` turns an `HttpResponse` body into a typed value. The
//! network exchange in between belongs to a `Transport`
//! (see `crate::transport`), so both halves can be tested on their own.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ApiError, Result};

/// Content type sent with every request, body or not.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Convenience `None` payload for `put`/`post` calls that carry no body.
pub const NO_BODY: Option<&()> = None;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `url` is always absolute. `body` is `None` when no payload was supplied.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// An HTTP response described as plain data.
///
/// The body has already been read to completion by the transport.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Build a JSON request for `method` against the absolute `url`.
///
/// Serialization happens here, so an unencodable payload fails before any
/// network activity.
pub fn build_request<P>(method: HttpMethod, url: &str, payload: Option<&P>) -> Result<HttpRequest>
where
    P: Serialize + ?Sized,
{
    let body = payload
        .map(serde_json::to_string)
        .transpose()
        .map_err(ApiError::Encoding)?;

    Ok(HttpRequest {
        method,
        url: url.to_string(),
        headers: vec![("content-type".to_string(), JSON_CONTENT_TYPE.to_string())],
        body,
    })
}

/// Decode the response body as JSON into `T`.
///
/// On failure the HTTP status travels with the error, so callers can tell a
/// garbled 200 from a garbled 500.
pub fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|source| ApiError::Decoding {
        status: response.status,
        source,
    })
}
