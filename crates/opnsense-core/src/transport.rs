//! Contract for the authenticated HTTP transport.
//!
//! The core never speaks HTTP itself. A transport sends one request to the
//! appliance's `/api` tree and hands back the raw JSON response; decoding into
//! typed shapes happens in [`crud`](crate::crud) so that response idioms such
//! as the empty-array "not found" answer can be recognized structurally.

use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;

use crate::error::{Error, Result, TransportError};

/// Status the appliance reports after a successful reconfigure.
pub const RECONFIGURE_OK: &str = "ok";

/// HTTP verbs used by the configuration API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Reads
    Get,
    /// Every write, including deletes and reconfigures
    Post,
}

impl HttpMethod {
    /// Verb as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct ReconfigureResponse {
    #[serde(default)]
    status: String,
}

/// Authenticated access to the appliance API.
///
/// One transport is shared by every controller of a client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the decoded JSON body.
    ///
    /// `path` is relative to the API root, e.g. `/routes/routes/addroute`.
    ///
    /// # Errors
    ///
    /// Network failures, non-success statuses and non-JSON bodies are reported
    /// as distinct [`TransportError`] variants.
    async fn do_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> std::result::Result<serde_json::Value, TransportError>;

    /// Ask the service behind `path` to re-read its configuration.
    ///
    /// # Errors
    ///
    /// Returns the transport error, a decode error, or
    /// [`Error::ReconfigureStatus`] when the status is not `ok`.
    async fn reconfigure_service(&self, path: &str) -> Result<()> {
        let value = self.do_request(HttpMethod::Post, path, None).await?;
        let response: ReconfigureResponse =
            serde_json::from_value(value).map_err(|err| Error::Decode {
                path: path.to_string(),
                message: err.to_string(),
            })?;

        if response.status.trim().eq_ignore_ascii_case(RECONFIGURE_OK) {
            Ok(())
        } else {
            Err(Error::ReconfigureStatus {
                endpoint: path.to_string(),
                status: response.status,
            })
        }
    }
}
