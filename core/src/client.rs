//! Convenience functions over a configured CouchDB server.
//!
//! # Design
//! `CouchClient` holds an immutable `base_url` and a `Transport`. Every verb
//! resolves a relative path as `{base_url}/{path}` with no normalization,
//! builds a request, hands it to the transport and decodes the reply.
//! The `Response`-returning verbs share `respond`, so the status code is
//! attached the same way on every path.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::database::Database;
use crate::error::Result;
use crate::http::{build_request, decode, HttpMethod, HttpResponse, NO_BODY};
use crate::transport::{Transport, UreqTransport};
use crate::types::Response;

/// Blocking client for one CouchDB server.
///
/// Cheap to share by reference; it carries no per-call state.
#[derive(Debug, Clone)]
pub struct CouchClient<T = UreqTransport> {
    base_url: String,
    transport: T,
}

impl CouchClient<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl Default for CouchClient<UreqTransport> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<T: Transport> CouchClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            base_url: config.base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve `path` against the base URL. Slashes are not collapsed.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Handle for the database `name` on this server.
    pub fn db(&self, name: impl Into<String>) -> Database<'_, T> {
        Database::new(self, name)
    }

    /// One raw exchange against an absolute `url`.
    pub fn send<P>(&self, method: HttpMethod, url: &str, payload: Option<&P>) -> Result<HttpResponse>
    where
        P: Serialize + ?Sized,
    {
        let request = build_request(method, url, payload)?;
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(&request)?;
        debug!(method = %request.method, url = %request.url, status = response.status, "received response");
        Ok(response)
    }

    /// POST `body` to `path` and decode the server's acknowledgement.
    pub fn post<P>(&self, path: &str, body: Option<&P>) -> Result<Response>
    where
        P: Serialize + ?Sized,
    {
        self.respond(HttpMethod::Post, path, body)
    }

    /// PUT `body` (or nothing) at `path`.
    pub fn put<P>(&self, path: &str, body: Option<&P>) -> Result<Response>
    where
        P: Serialize + ?Sized,
    {
        self.respond(HttpMethod::Put, path, body)
    }

    /// DELETE `path`. A 404 is returned as data, not as an error.
    pub fn delete(&self, path: &str) -> Result<Response> {
        self.respond(HttpMethod::Delete, path, NO_BODY)
    }

    /// GET `path` and decode the body into `D`.
    ///
    /// The returned `Response` only carries the status; the body went to `D`.
    pub fn get<D: DeserializeOwned>(&self, path: &str) -> Result<(Response, D)> {
        let (status, value) = self.get_json(path)?;
        Ok((Response::with_status(status), value))
    }

    /// GET `path`, returning the raw status and the decoded body.
    pub fn get_json<D: DeserializeOwned>(&self, path: &str) -> Result<(u16, D)> {
        let response = self.send(HttpMethod::Get, &self.url_for(path), NO_BODY)?;
        let value = decode(&response)?;
        Ok((response.status, value))
    }

    fn respond<P>(&self, method: HttpMethod, path: &str, body: Option<&P>) -> Result<Response>
    where
        P: Serialize + ?Sized,
    {
        let response = self.send(method, &self.url_for(path), body)?;
        let mut decoded: Response = decode(&response)?;
        decoded.status = response.status;
        Ok(decoded)
    }
}
