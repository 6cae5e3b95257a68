//! Serializable client configuration.
//!
//! [`OpnsenseClientConfig`] is the shape a caller loads from its own settings
//! (JSON, environment, provider block). Zero values mean "use the default",
//! matching how the appliance client has always treated unset options.

use crate::client::{
    ClientConfig, RetryPolicy, DEFAULT_MAX_RETRIES, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_RETRY_MAX_DELAY_MS,
};
use crate::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Configuration for controller behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_backoff_order"))]
pub struct OpnsenseClientConfig {
    /// Per-call timeout in seconds
    #[validate(range(min = 1, max = 600))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum reconfigure retries; 0 disables retrying
    #[validate(range(min = 0, max = 10))]
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial backoff in seconds; 0 selects the default
    #[validate(range(min = 0, max = 300))]
    #[serde(default)]
    pub min_backoff_secs: u64,

    /// Backoff cap in seconds; 0 selects the default
    #[validate(range(min = 0, max = 300))]
    #[serde(default)]
    pub max_backoff_secs: u64,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn validate_backoff_order(config: &OpnsenseClientConfig) -> Result<(), ValidationError> {
    // An unset bound takes its default, stretched to fit the other one.
    if config.min_backoff_secs == 0 || config.max_backoff_secs == 0 {
        return Ok(());
    }
    if config.min_backoff_secs > config.max_backoff_secs {
        let mut error = ValidationError::new("backoff_order");
        error.message = Some("min_backoff_secs must not exceed max_backoff_secs".into());
        return Err(error);
    }
    Ok(())
}

impl OpnsenseClientConfig {
    /// Create a validated configuration with default values.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails.
    pub fn new() -> Result<Self, Error> {
        let config = Self::default();
        config.check()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] on malformed JSON or out-of-range values.
    pub fn from_json(input: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;
        config.check()?;
        Ok(config)
    }

    /// Run validation, mapping failures into [`Error::ConfigError`].
    ///
    /// # Errors
    ///
    /// Returns an error when any field is out of range.
    pub fn check(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }

    /// Set the per-call timeout in seconds.
    #[must_use]
    pub const fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set maximum reconfigure retries.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the backoff bounds in seconds.
    #[must_use]
    pub const fn with_backoff(mut self, min_secs: u64, max_secs: u64) -> Self {
        self.min_backoff_secs = min_secs;
        self.max_backoff_secs = max_secs;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Initial backoff, falling back to the default when unset.
    #[must_use]
    pub const fn min_backoff(&self) -> Duration {
        if self.min_backoff_secs == 0 {
            Duration::from_millis(DEFAULT_RETRY_DELAY_MS)
        } else {
            Duration::from_secs(self.min_backoff_secs)
        }
    }

    /// Backoff cap, falling back to the default when unset. An unset cap
    /// never drops below the initial backoff.
    #[must_use]
    pub const fn max_backoff(&self) -> Duration {
        if self.max_backoff_secs == 0 {
            if self.min_backoff_secs.saturating_mul(1_000) > DEFAULT_RETRY_MAX_DELAY_MS {
                Duration::from_secs(self.min_backoff_secs)
            } else {
                Duration::from_millis(DEFAULT_RETRY_MAX_DELAY_MS)
            }
        } else {
            Duration::from_secs(self.max_backoff_secs)
        }
    }

    /// Build the runtime settings handed to controllers.
    #[must_use]
    pub fn to_client_config(&self) -> ClientConfig {
        let retry_policy = RetryPolicy::new()
            .with_max_retries(self.max_retries)
            .with_initial_delay(self.min_backoff())
            .with_max_delay(self.max_backoff());

        ClientConfig::new()
            .with_request_timeout(self.timeout())
            .with_retry_policy(retry_policy)
    }
}

impl Default for OpnsenseClientConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            min_backoff_secs: 0,
            max_backoff_secs: 0,
        }
    }
}
