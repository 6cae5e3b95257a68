//! Create/update, read, delete and reconfigure operations.
//!
//! Every write follows the same protocol: take the controller's lock, POST the
//! change, check the appliance's status sentinel, trigger the subsystem's
//! reconfigure, release the lock. Reads skip the lock and may observe state
//! from either side of a concurrent reconfigure.
//!
//! The `make_*` functions take the endpoints of one object type and return a
//! callable operation. Update and delete paths carry the object identifier;
//! for updates the caller appends it before calling [`make_set_fn`].

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::client::DEFAULT_CLIENT_CONFIG;
use crate::controller::Controller;
use crate::error::{Error, Result, ValidationDetails, WriteOperation};
use crate::id::ResourceId;
use crate::transport::{HttpMethod, Transport};

/// Status returned by a successful add/set.
pub const SAVED: &str = "saved";

/// Status returned by a successful delete.
pub const DELETED: &str = "deleted";

/// An object type the appliance accepts inside a [`Envelope`].
pub trait Resource: Serialize {
    /// Name of the single key wrapping the object, e.g. `"route"`.
    const ENVELOPE_KEY: &'static str;
}

/// Wire wrapper around a create/update payload: `{ "<key>": { ...fields } }`.
pub struct Envelope<'a, R> {
    resource: &'a R,
}

impl<'a, R: Resource> Envelope<'a, R> {
    /// Wrap a resource under its envelope key.
    #[must_use]
    pub const fn new(resource: &'a R) -> Self {
        Self { resource }
    }

    /// The envelope key.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        R::ENVELOPE_KEY
    }

    /// The wrapped resource.
    #[must_use]
    pub const fn resource(&self) -> &'a R {
        self.resource
    }
}

impl<R: Resource> Serialize for Envelope<'_, R> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(R::ENVELOPE_KEY, self.resource)?;
        map.end()
    }
}

impl<R> fmt::Debug for Envelope<'_, R>
where
    R: Resource + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entry(&R::ENVELOPE_KEY, self.resource)
            .finish()
    }
}

/// Answer to an add/set request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AddResponse {
    /// Status tag; [`SAVED`] on success
    #[serde(default)]
    pub result: String,
    /// Identifier of the created object, only meaningful on success
    #[serde(default)]
    pub uuid: ResourceId,
    /// Field-level validation messages
    #[serde(default)]
    pub validations: ValidationDetails,
}

/// Answer to a delete request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteResponse {
    /// Status tag; [`DELETED`] on success
    #[serde(default)]
    pub result: String,
}

/// Create-or-update operation for one endpoint.
pub struct SetFn<C: ?Sized> {
    controller: Arc<C>,
    endpoint: String,
    reconfigure_endpoint: String,
}

/// Read operation for one endpoint, decoding into `T`.
pub struct GetFn<T> {
    transport: Arc<dyn Transport>,
    endpoint: String,
    request_timeout: Option<Duration>,
    shape: PhantomData<fn() -> T>,
}

/// Delete operation for one endpoint.
pub struct DeleteFn<C: ?Sized> {
    controller: Arc<C>,
    endpoint: String,
    reconfigure_endpoint: String,
}

/// Standalone reconfigure, used to finish a partially failed write.
pub struct ReconfigureFn<C: ?Sized> {
    controller: Arc<C>,
    endpoint: String,
}

/// Build the create-or-update operation.
///
/// `endpoint` is the add path, or the set path with the identifier appended.
pub fn make_set_fn<C>(
    controller: Arc<C>,
    endpoint: impl Into<String>,
    reconfigure_endpoint: impl Into<String>,
) -> SetFn<C>
where
    C: Controller + ?Sized,
{
    SetFn {
        controller,
        endpoint: endpoint.into(),
        reconfigure_endpoint: reconfigure_endpoint.into(),
    }
}

/// Build the read operation; `endpoint` is the get path without identifier.
pub fn make_get_fn<T>(transport: Arc<dyn Transport>, endpoint: impl Into<String>) -> GetFn<T>
where
    T: DeserializeOwned,
{
    GetFn {
        transport,
        endpoint: endpoint.into(),
        request_timeout: DEFAULT_CLIENT_CONFIG.request_timeout,
        shape: PhantomData,
    }
}

/// Build the delete operation; `endpoint` is the delete path without identifier.
pub fn make_delete_fn<C>(
    controller: Arc<C>,
    endpoint: impl Into<String>,
    reconfigure_endpoint: impl Into<String>,
) -> DeleteFn<C>
where
    C: Controller + ?Sized,
{
    DeleteFn {
        controller,
        endpoint: endpoint.into(),
        reconfigure_endpoint: reconfigure_endpoint.into(),
    }
}

/// Build a standalone reconfigure for `endpoint`.
pub fn make_reconfigure_fn<C>(controller: Arc<C>, endpoint: impl Into<String>) -> ReconfigureFn<C>
where
    C: Controller + ?Sized,
{
    ReconfigureFn {
        controller,
        endpoint: endpoint.into(),
    }
}

impl<C> SetFn<C>
where
    C: Controller + ?Sized,
{
    /// Endpoint the payload is posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Post `payload` and apply it.
    ///
    /// Returns the identifier from the add response; set endpoints usually
    /// answer without one, in which case it is empty.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] when the status is not `saved`, and
    /// [`Error::PartialFailure`] (carrying the identifier) when the write
    /// landed but the reconfigure did not.
    pub async fn call<R: Resource>(&self, payload: &Envelope<'_, R>) -> Result<ResourceId> {
        let body = serde_json::to_value(payload).map_err(|err| Error::Encode(err.to_string()))?;
        let controller = &*self.controller;

        let _guard = controller.lock().lock().await;
        debug!(controller = controller.name(), "acquired write lock");

        info!(
            controller = controller.name(),
            endpoint = %self.endpoint,
            key = R::ENVELOPE_KEY,
            "setting resource"
        );
        let value = send(controller, HttpMethod::Post, &self.endpoint, Some(body)).await?;
        let response: AddResponse = decode(&self.endpoint, value)?;

        if response.result != SAVED {
            warn!(
                controller = controller.name(),
                endpoint = %self.endpoint,
                result = %response.result,
                "appliance rejected resource"
            );
            return Err(Error::Rejected {
                operation: WriteOperation::Set,
                result: response.result,
                validations: response.validations,
            });
        }

        let id = response.uuid;
        apply(controller, &self.reconfigure_endpoint)
            .await
            .map_err(|source| {
                partial_failure(
                    controller,
                    WriteOperation::Set,
                    id.clone().non_empty(),
                    &self.reconfigure_endpoint,
                    source,
                )
            })?;

        Ok(id)
    }
}

impl<T> GetFn<T>
where
    T: DeserializeOwned,
{
    /// Override the per-call timeout.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Fetch and decode the object behind `id`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] when the appliance answers with its empty-array
    /// idiom (or the identifier is empty); other failures propagate unchanged.
    pub async fn call(&self, id: &ResourceId) -> Result<T> {
        if id.is_empty() {
            return Err(Error::NotFound(format!("{}/", self.endpoint)));
        }

        let path = format!("{}/{}", self.endpoint, id);
        debug!(endpoint = %path, "reading resource");

        let value = bounded(
            self.request_timeout,
            &path,
            self.transport.do_request(HttpMethod::Get, &path, None),
        )
        .await?;

        if is_not_found_idiom(&value) {
            warn!(endpoint = %path, "resource not found, it may have been deleted upstream");
            return Err(Error::NotFound(id.to_string()));
        }

        decode(&path, value)
    }
}

impl<C> DeleteFn<C>
where
    C: Controller + ?Sized,
{
    /// Delete the object behind `id` and apply the change.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] for an empty identifier, without touching the lock
    /// or the appliance. [`Error::Rejected`] when the status is not
    /// `deleted`, and [`Error::PartialFailure`] when the delete landed but
    /// the reconfigure did not.
    pub async fn call(&self, id: &ResourceId) -> Result<()> {
        if id.is_empty() {
            return Err(Error::NotFound(format!("{}/", self.endpoint)));
        }

        let controller = &*self.controller;
        let path = format!("{}/{}", self.endpoint, id);

        let _guard = controller.lock().lock().await;
        debug!(controller = controller.name(), "acquired write lock");

        info!(controller = controller.name(), endpoint = %path, "deleting resource");
        let value = send(controller, HttpMethod::Post, &path, None).await?;
        let response: DeleteResponse = decode(&path, value)?;

        if response.result != DELETED {
            warn!(
                controller = controller.name(),
                endpoint = %path,
                result = %response.result,
                "appliance did not delete resource"
            );
            return Err(Error::Rejected {
                operation: WriteOperation::Delete,
                result: response.result,
                validations: ValidationDetails::new(),
            });
        }

        apply(controller, &self.reconfigure_endpoint)
            .await
            .map_err(|source| {
                partial_failure(
                    controller,
                    WriteOperation::Delete,
                    id.clone().non_empty(),
                    &self.reconfigure_endpoint,
                    source,
                )
            })
    }
}

impl<C> ReconfigureFn<C>
where
    C: Controller + ?Sized,
{
    /// Reconfigure endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Reconfigure under the controller lock, retrying transient failures
    /// according to the controller's retry policy.
    ///
    /// # Errors
    ///
    /// The last failure once retries are exhausted; non-transient failures
    /// (such as a non-`ok` status) are returned immediately.
    pub async fn call(&self) -> Result<()> {
        let controller = &*self.controller;
        let policy = controller.config().retry_policy;

        let _guard = controller.lock().lock().await;
        debug!(controller = controller.name(), "acquired write lock");

        let mut failures = 0;
        loop {
            info!(
                controller = controller.name(),
                endpoint = %self.endpoint,
                attempt = failures,
                "reconfiguring service"
            );
            let error = match apply(controller, &self.endpoint).await {
                Ok(()) => return Ok(()),
                Err(error) => error,
            };

            failures += 1;
            if !error.is_transient() || !policy.allows_retry(failures) {
                if error.should_log() {
                    warn!(
                        controller = controller.name(),
                        endpoint = %self.endpoint,
                        error = %error,
                        "reconfigure failed"
                    );
                }
                return Err(error);
            }

            let delay = policy.backoff(failures);
            debug!(
                controller = controller.name(),
                error = %error,
                "retrying reconfigure after {:?}",
                delay
            );
            if !delay.is_zero() {
                sleep(delay).await;
            }
        }
    }
}

impl<C: ?Sized> Clone for SetFn<C> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            endpoint: self.endpoint.clone(),
            reconfigure_endpoint: self.reconfigure_endpoint.clone(),
        }
    }
}

impl<C: ?Sized> Clone for DeleteFn<C> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            endpoint: self.endpoint.clone(),
            reconfigure_endpoint: self.reconfigure_endpoint.clone(),
        }
    }
}

impl<C: ?Sized> Clone for ReconfigureFn<C> {
    fn clone(&self) -> Self {
        Self {
            controller: Arc::clone(&self.controller),
            endpoint: self.endpoint.clone(),
        }
    }
}

impl<T> Clone for GetFn<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            endpoint: self.endpoint.clone(),
            request_timeout: self.request_timeout,
            shape: PhantomData,
        }
    }
}

/// The appliance answers a get for a missing identifier with `[]`.
fn is_not_found_idiom(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Array(items) if items.is_empty())
}

fn decode<T: DeserializeOwned>(path: &str, value: serde_json::Value) -> Result<T> {
    serde_json::from_value(value).map_err(|err| Error::Decode {
        path: path.to_string(),
        message: err.to_string(),
    })
}

async fn bounded<T, E, F>(limit: Option<Duration>, path: &str, call: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, E>>,
    Error: From<E>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| Error::Timeout(format!("`{path}` did not answer within {limit:?}")))?
            .map_err(Error::from),
        None => call.await.map_err(Error::from),
    }
}

async fn send<C>(
    controller: &C,
    method: HttpMethod,
    path: &str,
    body: Option<serde_json::Value>,
) -> Result<serde_json::Value>
where
    C: Controller + ?Sized,
{
    bounded(
        controller.config().request_timeout,
        path,
        controller.transport().do_request(method, path, body),
    )
    .await
}

async fn apply<C>(controller: &C, endpoint: &str) -> Result<()>
where
    C: Controller + ?Sized,
{
    bounded(
        controller.config().request_timeout,
        endpoint,
        controller.transport().reconfigure_service(endpoint),
    )
    .await
}

fn partial_failure<C>(
    controller: &C,
    operation: WriteOperation,
    id: Option<ResourceId>,
    reconfigure_endpoint: &str,
    source: Error,
) -> Error
where
    C: Controller + ?Sized,
{
    warn!(
        controller = controller.name(),
        operation = %operation,
        id = ?id,
        endpoint = reconfigure_endpoint,
        error = %source,
        "write persisted but reconfigure failed"
    );
    Error::PartialFailure {
        operation,
        id,
        reconfigure_endpoint: reconfigure_endpoint.to_string(),
        source: Box::new(source),
    }
}
