//! Glue between the models and the core operation factory.

use std::collections::BTreeMap;
use std::sync::Arc;

use opnsense_core::crud::{
    make_delete_fn, make_get_fn, make_reconfigure_fn, make_set_fn, Envelope, Resource,
};
use opnsense_core::{Controller, Error, ResourceId, Result, Subsystem, SubsystemController};
use serde::de::DeserializeOwned;
use tracing::debug;

/// API paths of one object type.
///
/// `get`, `set` and `delete` take the identifier as the last path segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoints {
    /// Create path
    pub add: &'static str,
    /// Read path, without identifier
    pub get: &'static str,
    /// Update path, without identifier
    pub set: &'static str,
    /// Delete path, without identifier
    pub delete: &'static str,
    /// Reconfigure path of the owning subsystem
    pub reconfigure: &'static str,
}

impl Endpoints {
    /// Update path for `id`.
    #[must_use]
    pub fn set_path(&self, id: &ResourceId) -> String {
        format!("{}/{}", self.set, id)
    }
}

/// An object type with a fixed place in the appliance API.
pub trait ApiResource: Resource + DeserializeOwned + Send + Sync {
    /// Subsystem whose lock guards writes to this type.
    const SUBSYSTEM: Subsystem;

    /// API paths.
    const ENDPOINTS: Endpoints;
}

pub(crate) async fn create<R: ApiResource>(
    controller: &Arc<SubsystemController>,
    resource: &R,
) -> Result<ResourceId> {
    debug_assert_eq!(controller.subsystem(), R::SUBSYSTEM);
    let endpoints = R::ENDPOINTS;
    make_set_fn(controller.clone(), endpoints.add, endpoints.reconfigure)
        .call(&Envelope::new(resource))
        .await
}

pub(crate) async fn read<R: ApiResource>(
    controller: &Arc<SubsystemController>,
    id: &ResourceId,
) -> Result<R> {
    let endpoints = R::ENDPOINTS;
    let mut wrapped =
        make_get_fn::<BTreeMap<String, R>>(controller.transport().clone(), endpoints.get)
            .with_request_timeout(controller.config().request_timeout)
            .call(id)
            .await?;

    wrapped.remove(R::ENVELOPE_KEY).ok_or_else(|| Error::Decode {
        path: format!("{}/{}", endpoints.get, id),
        message: format!("response has no `{}` object", R::ENVELOPE_KEY),
    })
}

pub(crate) async fn update<R: ApiResource>(
    controller: &Arc<SubsystemController>,
    id: &ResourceId,
    resource: &R,
) -> Result<()> {
    debug_assert_eq!(controller.subsystem(), R::SUBSYSTEM);
    let endpoints = R::ENDPOINTS;
    debug!(id = %id, key = R::ENVELOPE_KEY, "updating resource");
    make_set_fn(controller.clone(), endpoints.set_path(id), endpoints.reconfigure)
        .call(&Envelope::new(resource))
        .await
        .map(|_| ())
        .map_err(|error| match error {
            // setItem answers without a uuid; the object is the one addressed.
            Error::PartialFailure {
                operation,
                id: None,
                reconfigure_endpoint,
                source,
            } => Error::PartialFailure {
                operation,
                id: id.clone().non_empty(),
                reconfigure_endpoint,
                source,
            },
            other => other,
        })
}

pub(crate) async fn delete<R: ApiResource>(
    controller: &Arc<SubsystemController>,
    id: &ResourceId,
) -> Result<()> {
    debug_assert_eq!(controller.subsystem(), R::SUBSYSTEM);
    let endpoints = R::ENDPOINTS;
    make_delete_fn(controller.clone(), endpoints.delete, endpoints.reconfigure)
        .call(id)
        .await
}

pub(crate) async fn reconfigure(
    controller: &Arc<SubsystemController>,
    endpoint: &'static str,
) -> Result<()> {
    make_reconfigure_fn(controller.clone(), endpoint).call().await
}
