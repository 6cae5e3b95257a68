//! Unbound DNS resolver objects.
//!
//! Every Unbound object shares one reconfigure, which restarts the resolver.

use std::sync::Arc;

use opnsense_core::{ResourceId, Result, SubsystemController};

use crate::models::{
    UnboundDomainOverride, UnboundForward, UnboundHostAlias, UnboundHostOverride,
    UNBOUND_RECONFIGURE,
};
use crate::resource;

/// Unbound operations, serialized on the Unbound controller.
#[derive(Debug, Clone, Copy)]
pub struct Unbound<'a> {
    controller: &'a Arc<SubsystemController>,
}

impl<'a> Unbound<'a> {
    pub(crate) const fn new(controller: &'a Arc<SubsystemController>) -> Self {
        Self { controller }
    }

    /// Create a domain override.
    pub async fn add_domain_override(&self, domain: &UnboundDomainOverride) -> Result<ResourceId> {
        resource::create(self.controller, domain).await
    }

    /// Fetch a domain override.
    pub async fn get_domain_override(&self, id: &ResourceId) -> Result<UnboundDomainOverride> {
        resource::read(self.controller, id).await
    }

    /// Replace a domain override.
    pub async fn update_domain_override(
        &self,
        id: &ResourceId,
        domain: &UnboundDomainOverride,
    ) -> Result<()> {
        resource::update(self.controller, id, domain).await
    }

    /// Delete a domain override.
    pub async fn delete_domain_override(&self, id: &ResourceId) -> Result<()> {
        resource::delete::<UnboundDomainOverride>(self.controller, id).await
    }

    /// Create a host override.
    pub async fn add_host_override(&self, host: &UnboundHostOverride) -> Result<ResourceId> {
        resource::create(self.controller, host).await
    }

    /// Fetch a host override.
    pub async fn get_host_override(&self, id: &ResourceId) -> Result<UnboundHostOverride> {
        resource::read(self.controller, id).await
    }

    /// Replace a host override.
    pub async fn update_host_override(
        &self,
        id: &ResourceId,
        host: &UnboundHostOverride,
    ) -> Result<()> {
        resource::update(self.controller, id, host).await
    }

    /// Delete a host override.
    pub async fn delete_host_override(&self, id: &ResourceId) -> Result<()> {
        resource::delete::<UnboundHostOverride>(self.controller, id).await
    }

    /// Create a query forward.
    pub async fn add_forward(&self, forward: &UnboundForward) -> Result<ResourceId> {
        resource::create(self.controller, forward).await
    }

    /// Fetch a query forward.
    pub async fn get_forward(&self, id: &ResourceId) -> Result<UnboundForward> {
        resource::read(self.controller, id).await
    }

    /// Replace a query forward.
    pub async fn update_forward(&self, id: &ResourceId, forward: &UnboundForward) -> Result<()> {
        resource::update(self.controller, id, forward).await
    }

    /// Delete a query forward.
    pub async fn delete_forward(&self, id: &ResourceId) -> Result<()> {
        resource::delete::<UnboundForward>(self.controller, id).await
    }

    /// Create a host alias.
    pub async fn add_host_alias(&self, alias: &UnboundHostAlias) -> Result<ResourceId> {
        resource::create(self.controller, alias).await
    }

    /// Fetch a host alias.
    pub async fn get_host_alias(&self, id: &ResourceId) -> Result<UnboundHostAlias> {
        resource::read(self.controller, id).await
    }

    /// Replace a host alias.
    pub async fn update_host_alias(&self, id: &ResourceId, alias: &UnboundHostAlias) -> Result<()> {
        resource::update(self.controller, id, alias).await
    }

    /// Delete a host alias.
    pub async fn delete_host_alias(&self, id: &ResourceId) -> Result<()> {
        resource::delete::<UnboundHostAlias>(self.controller, id).await
    }

    /// Restart the resolver with the stored configuration.
    pub async fn reconfigure(&self) -> Result<()> {
        resource::reconfigure(self.controller, UNBOUND_RECONFIGURE).await
    }
}
