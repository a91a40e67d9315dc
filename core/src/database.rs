//! Handle for one named database.
//!
//! # Design
//! `Database` borrows its `CouchClient` and owns only the name, so it is
//! built per use rather than stored. Its operations are expressed through
//! the client's convenience verbs: `create` posts to the collection path,
//! `info` is a `get_json` on the database root, and `exists` projects `info`.

use serde::Serialize;
use tracing::warn;

use crate::client::CouchClient;
use crate::error::Result;
use crate::transport::Transport;
use crate::types::{DatabaseInfo, Response};

/// Named reference to one database on a `CouchClient`'s server.
///
/// Holds nothing but the client borrow and the name; build one per use.
#[derive(Debug)]
pub struct Database<'c, T = crate::transport::UreqTransport> {
    client: &'c CouchClient<T>,
    name: String,
}

impl<'c, T: Transport> Database<'c, T> {
    pub(crate) fn new(client: &'c CouchClient<T>, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `{base_url}/{name}`, unescaped and without a trailing slash.
    pub fn url(&self) -> String {
        self.client.url_for(&self.name)
    }

    /// Store `doc` under a server-assigned id.
    ///
    /// Posts to `{name}/`; the trailing slash addresses the collection.
    pub fn create<P>(&self, doc: &P) -> Result<Response>
    where
        P: Serialize + ?Sized,
    {
        self.client.post(&format!("{}/", self.name), Some(doc))
    }

    /// Fetch database metadata.
    ///
    /// Any status other than 200 yields `exists == false` rather than an
    /// error; `status` keeps the code for callers that need to tell a 404
    /// from a server failure.
    pub fn info(&self) -> Result<DatabaseInfo> {
        let (status, mut info): (u16, DatabaseInfo) = self.client.get_json(&self.name)?;
        info.exists = status == 200;
        info.status = status;
        if status != 200 && status != 404 {
            warn!(database = %self.name, status, "database info returned unexpected status");
        }
        Ok(info)
    }

    pub fn exists(&self) -> Result<bool> {
        Ok(self.info()?.exists)
    }
}
