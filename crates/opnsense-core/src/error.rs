//! Error types for OPNsense configuration operations.
//!
//! The taxonomy separates failures that happened before anything changed on
//! the appliance (transport, decode, rejection) from the partial failure where
//! a write was persisted but the follow-up reconfigure did not succeed.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::id::ResourceId;

/// Field name to validation detail, as reported by the appliance.
pub type ValidationDetails = BTreeMap<String, serde_json::Value>;

/// Failures raised by a [`Transport`](crate::transport::Transport) implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response (connection, TLS, IO).
    #[error("network error: {0}")]
    Network(String),

    /// The appliance answered with a non-success HTTP status.
    #[error("status code non-200; status code {code}: {body}")]
    Status {
        /// HTTP status code
        code: u16,
        /// Response body text
        body: String,
    },

    /// The response body was not JSON.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Kind of write that produced a [`Error::Rejected`] or [`Error::PartialFailure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteOperation {
    /// Create or update
    Set,
    /// Delete
    Delete,
}

impl WriteOperation {
    /// Lowercase name used in messages and log fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Set => "set",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Main error type for OPNsense operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Transport failure, propagated verbatim
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Response did not decode into the expected shape
    #[error("failed to decode response from `{path}`: {message}")]
    Decode {
        /// Endpoint the response came from
        path: String,
        /// Decoder message
        message: String,
    },

    /// Request payload could not be serialized
    #[error("failed to encode request payload: {0}")]
    Encode(String),

    /// The appliance answered a read with its empty-array idiom
    #[error("unable to find resource `{0}`. it may have been deleted upstream")]
    NotFound(String),

    /// A write was answered with a status other than its success sentinel
    #[error("resource not changed ({operation}). result: {result}{}", format_validations(.validations))]
    Rejected {
        /// Which write was rejected
        operation: WriteOperation,
        /// Raw status string returned by the appliance
        result: String,
        /// Field-level validation messages, if any
        validations: ValidationDetails,
    },

    /// The write was persisted but the subsequent reconfigure failed
    #[error("{operation} persisted{} but reconfigure at `{reconfigure_endpoint}` failed: {source}", format_id(.id.as_ref()))]
    PartialFailure {
        /// Which write was persisted
        operation: WriteOperation,
        /// Identifier of the persisted object, when the appliance returned one
        id: Option<ResourceId>,
        /// Endpoint to retry
        reconfigure_endpoint: String,
        /// Why the reconfigure failed
        source: Box<Error>,
    },

    /// Reconfigure answered with a status other than `ok`
    #[error("reconfigure failed at `{endpoint}`. status: {status}")]
    ReconfigureStatus {
        /// Reconfigure endpoint
        endpoint: String,
        /// Raw status string
        status: String,
    },

    /// A per-call deadline elapsed
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Specialized result type for OPNsense operations.
pub type Result<T> = std::result::Result<T, Error>;

fn format_validations(validations: &ValidationDetails) -> String {
    if validations.is_empty() {
        return String::new();
    }

    let fields = validations
        .iter()
        .map(|(field, detail)| match detail {
            serde_json::Value::String(message) => format!("{field}: {message}"),
            other => format!("{field}: {other}"),
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!(". errors: {{{fields}}}")
}

fn format_id(id: Option<&ResourceId>) -> String {
    match id {
        Some(id) => format!(" (id {id})"),
        None => String::new(),
    }
}

impl Error {
    /// Returns the error code for this error type.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(TransportError::Network(_)) => "NETWORK_ERROR",
            Self::Transport(TransportError::Status { .. }) => "HTTP_STATUS_ERROR",
            Self::Transport(TransportError::InvalidBody(_)) => "INVALID_BODY",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Encode(_) => "ENCODE_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Rejected { .. } => "VALIDATION_ERROR",
            Self::PartialFailure { .. } => "PARTIAL_FAILURE",
            Self::ReconfigureStatus { .. } => "RECONFIGURE_FAILED",
            Self::Timeout(_) => "TIMEOUT",
            Self::ConfigError(_) => "CONFIG_ERROR",
        }
    }

    /// True when a read found no object behind the identifier.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True when a write was persisted but not applied.
    #[must_use]
    pub const fn is_partial_failure(&self) -> bool {
        matches!(self, Self::PartialFailure { .. })
    }

    /// Identifier of an object that exists upstream despite this error.
    ///
    /// Callers that retry after a partial failure must keep this identifier
    /// and only re-run the reconfigure, never the create.
    #[must_use]
    pub fn persisted_id(&self) -> Option<&ResourceId> {
        match self {
            Self::PartialFailure { id, .. } => id.as_ref(),
            _ => None,
        }
    }

    /// Reconfigure endpoint that still needs to be applied.
    #[must_use]
    pub fn reconfigure_endpoint(&self) -> Option<&str> {
        match self {
            Self::PartialFailure {
                reconfigure_endpoint,
                ..
            } => Some(reconfigure_endpoint),
            _ => None,
        }
    }

    /// Returns true if this error should be logged as a serious error.
    #[must_use]
    pub const fn should_log(&self) -> bool {
        matches!(
            self,
            Self::PartialFailure { .. }
                | Self::ReconfigureStatus { .. }
                | Self::ConfigError(_)
                | Self::Decode { .. }
        )
    }

    /// True for failures a retry of the same request may clear.
    pub(crate) const fn is_transient(&self) -> bool {
        match self {
            Self::Transport(TransportError::Network(_)) | Self::Timeout(_) => true,
            Self::Transport(TransportError::Status { code, .. }) => *code == 429 || *code >= 500,
            _ => false,
        }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rejected() -> Error {
        let mut validations = ValidationDetails::new();
        validations.insert("vlan.tag".to_string(), json!("required"));
        validations.insert("vlan.if".to_string(), json!("invalid parent"));
        Error::Rejected {
            operation: WriteOperation::Set,
            result: "failed".to_string(),
            validations,
        }
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::from(TransportError::Network("reset".into())).error_code(),
            "NETWORK_ERROR"
        );
        assert_eq!(
            Error::from(TransportError::Status {
                code: 500,
                body: String::new()
            })
            .error_code(),
            "HTTP_STATUS_ERROR"
        );
        assert_eq!(Error::NotFound("x".into()).error_code(), "NOT_FOUND");
        assert_eq!(rejected().error_code(), "VALIDATION_ERROR");
        assert_eq!(Error::Timeout("x".into()).error_code(), "TIMEOUT");
        assert_eq!(Error::ConfigError("x".into()).error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_rejected_display_names_status_and_fields() {
        let message = rejected().to_string();
        assert_eq!(
            message,
            "resource not changed (set). result: failed. errors: {vlan.if: invalid parent, vlan.tag: required}"
        );
    }

    #[test]
    fn test_rejected_display_without_validations() {
        let err = Error::Rejected {
            operation: WriteOperation::Delete,
            result: "not found".to_string(),
            validations: ValidationDetails::new(),
        };
        assert_eq!(
            err.to_string(),
            "resource not changed (delete). result: not found"
        );
    }

    #[test]
    fn test_partial_failure_keeps_identifier() {
        let err = Error::PartialFailure {
            operation: WriteOperation::Set,
            id: Some(ResourceId::from("abc-1")),
            reconfigure_endpoint: "/routes/routes/reconfigure".to_string(),
            source: Box::new(TransportError::Network("connection reset".into()).into()),
        };

        assert!(err.is_partial_failure());
        assert!(err.should_log());
        assert_eq!(err.persisted_id().map(ResourceId::as_str), Some("abc-1"));
        assert_eq!(err.reconfigure_endpoint(), Some("/routes/routes/reconfigure"));
        assert_eq!(
            err.to_string(),
            "set persisted (id abc-1) but reconfigure at `/routes/routes/reconfigure` failed: network error: connection reset"
        );
    }

    #[test]
    fn test_persisted_id_absent_for_other_errors() {
        assert!(rejected().persisted_id().is_none());
        assert!(Error::NotFound("abc".into()).persisted_id().is_none());
        assert!(rejected().reconfigure_endpoint().is_none());
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound("abc".into()).is_not_found());
        assert!(!rejected().is_not_found());
    }

    #[test]
    fn test_transient_classification() {
        assert!(Error::from(TransportError::Network("x".into())).is_transient());
        assert!(Error::Timeout("x".into()).is_transient());
        assert!(!Error::from(TransportError::InvalidBody("x".into())).is_transient());
        assert!(!rejected().is_transient());

        let status = |code| Error::from(TransportError::Status { code, body: String::new() });
        assert!(status(502).is_transient());
        assert!(status(429).is_transient());
        assert!(!status(401).is_transient());
    }

    #[test]
    fn test_error_clone_and_eq() {
        let err = rejected();
        assert_eq!(err.clone(), err);
        assert_ne!(err, Error::NotFound("x".into()));
    }
}
