//! Static routes.

use std::sync::Arc;

use opnsense_core::{ResourceId, Result, SubsystemController};

use crate::models::Route;
use crate::resource::{self, ApiResource};

/// Route operations, serialized on the routes controller.
#[derive(Debug, Clone, Copy)]
pub struct Routes<'a> {
    controller: &'a Arc<SubsystemController>,
}

impl<'a> Routes<'a> {
    pub(crate) const fn new(controller: &'a Arc<SubsystemController>) -> Self {
        Self { controller }
    }

    /// Create a route and apply it; returns the new identifier.
    pub async fn add_route(&self, route: &Route) -> Result<ResourceId> {
        resource::create(self.controller, route).await
    }

    /// Fetch a route.
    pub async fn get_route(&self, id: &ResourceId) -> Result<Route> {
        resource::read(self.controller, id).await
    }

    /// Replace a route and apply it.
    pub async fn update_route(&self, id: &ResourceId, route: &Route) -> Result<()> {
        resource::update(self.controller, id, route).await
    }

    /// Delete a route and apply the change.
    pub async fn delete_route(&self, id: &ResourceId) -> Result<()> {
        resource::delete::<Route>(self.controller, id).await
    }

    /// Re-apply the routing table, e.g. after a partially failed write.
    pub async fn reconfigure(&self) -> Result<()> {
        resource::reconfigure(self.controller, Route::ENDPOINTS.reconfigure).await
    }
}
