//! Top-level OPNsense client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use opnsense_core::client::{ClientConfig, RetryPolicy};
use opnsense_core::config::OpnsenseClientConfig;
use opnsense_core::{Result, Subsystem, SubsystemController, Transport};
use tracing::info;

use crate::interfaces::Interfaces;
use crate::routes::Routes;
use crate::unbound::Unbound;

/// Builder for [`OpnsenseClient`].
#[derive(Clone)]
pub struct OpnsenseClientBuilder {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
}

impl OpnsenseClientBuilder {
    /// Create a builder over an authenticated transport.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            config: ClientConfig::default(),
        }
    }

    /// Apply a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when any value is out of range.
    pub fn with_settings(mut self, settings: &OpnsenseClientConfig) -> Result<Self> {
        settings.check()?;
        self.config = settings.to_client_config();
        Ok(self)
    }

    /// Override the per-call timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_request_timeout(timeout);
        self
    }

    /// Override the retry policy used by reconfigures.
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config = self.config.with_retry_policy(retry);
        self
    }

    /// Override the complete client configuration.
    #[must_use]
    pub fn with_client_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the client with one controller per subsystem.
    #[must_use]
    pub fn build(self) -> OpnsenseClient {
        let controller = |subsystem| {
            Arc::new(SubsystemController::with_config(
                subsystem,
                self.transport.clone(),
                self.config.clone(),
            ))
        };

        let client = OpnsenseClient {
            routes: controller(Subsystem::Routes),
            interfaces: controller(Subsystem::Interfaces),
            unbound: controller(Subsystem::Unbound),
            transport: self.transport.clone(),
        };

        info!(
            request_timeout = ?self.config.request_timeout,
            max_retries = self.config.retry_policy.max_retries,
            "opnsense client ready"
        );
        client
    }
}

/// Asynchronous OPNsense client.
///
/// Cloning is cheap and clones share controllers, so writes issued through
/// any clone are serialized per subsystem.
#[derive(Clone)]
pub struct OpnsenseClient {
    transport: Arc<dyn Transport>,
    routes: Arc<SubsystemController>,
    interfaces: Arc<SubsystemController>,
    unbound: Arc<SubsystemController>,
}

impl OpnsenseClient {
    /// Construct a client with default settings.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        OpnsenseClientBuilder::new(transport).build()
    }

    /// Start building a client.
    #[must_use]
    pub fn builder(transport: Arc<dyn Transport>) -> OpnsenseClientBuilder {
        OpnsenseClientBuilder::new(transport)
    }

    /// The shared transport.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Controller of `subsystem`.
    #[must_use]
    pub fn controller(&self, subsystem: Subsystem) -> &Arc<SubsystemController> {
        match subsystem {
            Subsystem::Routes => &self.routes,
            Subsystem::Interfaces => &self.interfaces,
            Subsystem::Unbound => &self.unbound,
        }
    }

    /// Static route operations.
    #[must_use]
    pub fn routes(&self) -> Routes<'_> {
        Routes::new(&self.routes)
    }

    /// Interface operations.
    #[must_use]
    pub fn interfaces(&self) -> Interfaces<'_> {
        Interfaces::new(&self.interfaces)
    }

    /// Unbound DNS operations.
    #[must_use]
    pub fn unbound(&self) -> Unbound<'_> {
        Unbound::new(&self.unbound)
    }
}

impl fmt::Debug for OpnsenseClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpnsenseClientBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for OpnsenseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpnsenseClient")
            .field("routes", &self.routes)
            .field("interfaces", &self.interfaces)
            .field("unbound", &self.unbound)
            .finish_non_exhaustive()
    }
}
