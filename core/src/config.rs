//! Client configuration.
//!
//! # Design
//! The server address is read once when a `CouchClient` is built and is
//! immutable afterwards; there is no process-wide default to mutate. Values
//! come from `Default`, `ClientConfig::from_env`, or any serde source.

use serde::Deserialize;

/// Server address used when nothing else is configured.
pub const DEFAULT_URL: &str = "http://localhost:5984";

/// Environment variable consulted by `ClientConfig::from_env`.
pub const URL_ENV_VAR: &str = "COUCH_URL";

/// Client configuration, fixed at construction time.
///
/// `base_url` is not validated here; a bad value surfaces as
/// `ApiError::Request` on the first call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_URL.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Read `COUCH_URL`, falling back to `DEFAULT_URL` when unset or empty.
    pub fn from_env() -> Self {
        match std::env::var(URL_ENV_VAR) {
            Ok(url) if !url.trim().is_empty() => Self::new(url),
            _ => Self::default(),
        }
    }
}
