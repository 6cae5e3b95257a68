//! Per-subsystem controllers.
//!
//! A reconfigure makes the appliance re-read every pending write of its
//! subsystem, so writes to one subsystem must not overlap. Each controller
//! owns exactly one lock for that purpose; the transport behind it is shared
//! with every other controller of the same client.

use std::fmt;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::{ClientConfig, DEFAULT_CLIENT_CONFIG};
use crate::transport::Transport;
use crate::types::Subsystem;

/// Anything that can hand the CRUD factory a transport and a write lock.
///
/// The lock returned by [`Controller::lock`] must be owned by the controller:
/// sharing one between subsystems over-serializes them, and handing out a
/// fresh one per call would let writes race a reconfigure.
pub trait Controller: Send + Sync {
    /// Transport used for every request of this controller.
    fn transport(&self) -> &Arc<dyn Transport>;

    /// The controller's write lock.
    fn lock(&self) -> &Mutex<()>;

    /// Settings for calls made on behalf of this controller.
    fn config(&self) -> &ClientConfig {
        &DEFAULT_CLIENT_CONFIG
    }

    /// Name used in log fields.
    fn name(&self) -> &str {
        "controller"
    }
}

/// Controller for one [`Subsystem`].
pub struct SubsystemController {
    subsystem: Subsystem,
    transport: Arc<dyn Transport>,
    lock: Mutex<()>,
    config: ClientConfig,
}

impl SubsystemController {
    /// Create a controller with default settings.
    #[must_use]
    pub fn new(subsystem: Subsystem, transport: Arc<dyn Transport>) -> Self {
        Self::with_config(subsystem, transport, ClientConfig::default())
    }

    /// Create a controller with explicit settings.
    #[must_use]
    pub fn with_config(
        subsystem: Subsystem,
        transport: Arc<dyn Transport>,
        config: ClientConfig,
    ) -> Self {
        Self {
            subsystem,
            transport,
            lock: Mutex::new(()),
            config,
        }
    }

    /// The subsystem this controller serializes.
    #[must_use]
    pub const fn subsystem(&self) -> Subsystem {
        self.subsystem
    }
}

impl Controller for SubsystemController {
    fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    fn lock(&self) -> &Mutex<()> {
        &self.lock
    }

    fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn name(&self) -> &str {
        self.subsystem.name()
    }
}

impl fmt::Debug for SubsystemController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubsystemController")
            .field("subsystem", &self.subsystem)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
