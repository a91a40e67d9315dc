//! Wire DTOs for CouchDB replies.
//!
//! # Design
//! Every field is defaulted: CouchDB answers errors with a body that only has
//! `error` and `reason`, and a 404 on a database must still decode into a
//! `DatabaseInfo`. The `status` fields are not on the wire; the client fills
//! them in from the HTTP exchange after decoding.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Result of a write or delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Response {
    pub ok: bool,
    pub id: String,
    pub rev: String,
    /// Error category such as `not_found` or `conflict`; empty on success.
    pub error: String,
    pub reason: String,
    #[serde(skip)]
    pub status: u16,
}

impl Response {
    pub(crate) fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// The server acknowledged the operation and reported no error.
    pub fn is_ok(&self) -> bool {
        self.ok && self.error.is_empty()
    }
}

/// An update or purge sequence.
///
/// CouchDB 1.x reports integers; 2.x and later report opaque strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sequence {
    Number(u64),
    Opaque(String),
}

impl Default for Sequence {
    fn default() -> Self {
        Sequence::Number(0)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Number(n) => write!(f, "{n}"),
            Sequence::Opaque(s) => f.write_str(s),
        }
    }
}

/// Metadata snapshot of one database, as returned by `GET /{db}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseInfo {
    /// Derived from the HTTP status (200), never read from the body.
    #[serde(skip)]
    pub exists: bool,
    /// HTTP status of the info request.
    #[serde(skip)]
    pub status: u16,
    #[serde(rename = "db_name")]
    pub name: String,
    pub doc_count: u64,
    pub doc_del_count: u64,
    pub update_seq: Sequence,
    pub purge_seq: Sequence,
    pub compact_running: bool,
    pub disk_size: u64,
    pub data_size: u64,
    pub instance_start_time: String,
    pub disk_format_version: u32,
    pub committed_update_seq: Sequence,
}
