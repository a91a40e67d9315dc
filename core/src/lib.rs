//! Blocking client for the CouchDB HTTP API.
//!
//! # Overview
//! Builds URLs, serializes JSON payloads and issues GET/PUT/POST/DELETE
//! requests against one configured server. `CouchClient` exposes the verbs as
//! convenience methods over relative paths; `Database` is a named handle
//! offering `create`, `info` and `exists`.
//!
//! # Design
//! - The base URL is fixed when the client is built (`ClientConfig`,
//!   default `http://localhost:5984`) and never mutated afterwards.
//! - A request is split into `build_request` (pure), `Transport::execute`
//!   (the only I/O) and `decode` (pure), so everything but the exchange is
//!   testable without a server.
//! - Non-2xx statuses are data. Errors cover encoding, request construction,
//!   transport failure and decoding; decoding errors keep the status code.
//! - No retries, timeouts or batching. Wrap calls if you need them.
//!
//! ```no_run
//! use couch_core::{ClientConfig, CouchClient, NO_BODY};
//!
//! # fn main() -> couch_core::Result<()> {
//! let client = CouchClient::new(ClientConfig::from_env());
//! client.put("database_test", NO_BODY)?;
//! let created = client.db("database_test").create(&serde_json::json!({"Message": "Hello"}))?;
//! assert!(!created.id.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::CouchClient;
pub use config::{ClientConfig, DEFAULT_URL};
pub use database::Database;
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, NO_BODY};
pub use transport::{Transport, UreqTransport};
pub use types::{DatabaseInfo, Response, Sequence};
