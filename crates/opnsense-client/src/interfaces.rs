//! Interface-level objects.

use std::sync::Arc;

use opnsense_core::{ResourceId, Result, SubsystemController};

use crate::models::InterfacesVlan;
use crate::resource::{self, ApiResource};

/// Interface operations, serialized on the interfaces controller.
#[derive(Debug, Clone, Copy)]
pub struct Interfaces<'a> {
    controller: &'a Arc<SubsystemController>,
}

impl<'a> Interfaces<'a> {
    pub(crate) const fn new(controller: &'a Arc<SubsystemController>) -> Self {
        Self { controller }
    }

    /// Create a VLAN and apply it; returns the new identifier.
    pub async fn add_vlan(&self, vlan: &InterfacesVlan) -> Result<ResourceId> {
        resource::create(self.controller, vlan).await
    }

    /// Fetch a VLAN.
    pub async fn get_vlan(&self, id: &ResourceId) -> Result<InterfacesVlan> {
        resource::read(self.controller, id).await
    }

    /// Replace a VLAN and apply it.
    pub async fn update_vlan(&self, id: &ResourceId, vlan: &InterfacesVlan) -> Result<()> {
        resource::update(self.controller, id, vlan).await
    }

    /// Delete a VLAN and apply the change.
    pub async fn delete_vlan(&self, id: &ResourceId) -> Result<()> {
        resource::delete::<InterfacesVlan>(self.controller, id).await
    }

    /// Re-apply VLAN settings.
    pub async fn reconfigure_vlans(&self) -> Result<()> {
        resource::reconfigure(self.controller, InterfacesVlan::ENDPOINTS.reconfigure).await
    }
}
