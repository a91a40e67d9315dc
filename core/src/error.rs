//! Error types for the CouchDB client.
//!
//! # Design
//! A non-2xx status is not an error here: CouchDB answers "absent" with a 404
//! and a JSON body, and callers such as `Database::exists` treat that as
//! data. Errors are reserved for the ways a round-trip can actually fail.
//! `Body` and `Decoding` keep the status code because the status line
//! had already arrived.

use thiserror::Error;

use crate::http::HttpMethod;

/// Errors returned by the client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request payload: {0}")]
    Encoding(#[source] serde_json::Error),

    /// The request could not be constructed (bad URL or method).
    #[error("invalid request {method} {url}: {reason}")]
    Request {
        method: HttpMethod,
        url: String,
        reason: String,
    },

    /// The exchange failed below HTTP: DNS, refused connection, I/O.
    #[error("transport failure: {0}")]
    Transport(#[source] ureq::Error),

    /// The status line arrived but reading the body failed.
    #[error("failed to read response body (HTTP {status}): {source}")]
    Body {
        status: u16,
        #[source]
        source: ureq::Error,
    },

    /// The response body was not JSON or did not fit the target type.
    #[error("failed to decode response body (HTTP {status}): {source}")]
    Decoding {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// The HTTP status of the exchange, if one completed.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Body { status, .. } | ApiError::Decoding { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;
