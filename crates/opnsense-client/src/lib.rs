//! OPNsense client and resource adapters.
//!
//! Builds one controller per appliance subsystem over a shared transport and
//! exposes typed create, read, update and delete operations for routes, VLANs
//! and Unbound DNS objects.

#![deny(missing_docs)]

pub mod client;
pub mod interfaces;
pub mod models;
pub mod resource;
pub mod routes;
pub mod unbound;

pub use client::{OpnsenseClient, OpnsenseClientBuilder};
pub use models::{
    InterfacesVlan, Route, UnboundDomainOverride, UnboundForward, UnboundHostAlias,
    UnboundHostOverride,
};
pub use resource::{ApiResource, Endpoints};

/// Convenient result alias that reuses the shared OPNsense error type.
pub type Result<T> = opnsense_core::Result<T>;
