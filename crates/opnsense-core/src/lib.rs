//! # opnsense-core
//!
//! Core building blocks for managing OPNsense configuration objects through
//! the appliance's JSON API.
//!
//! Writes to one appliance subsystem are serialized behind that subsystem's
//! lock and always followed by a reconfigure of the service; reads are not
//! serialized.
//!
//! ## Modules
//!
//! - [`selected`] - Decoding of the appliance's selected-option enumerations
//! - [`transport`] - Contract for the authenticated HTTP transport
//! - [`controller`] - Per-subsystem controllers pairing a transport with a write lock
//! - [`crud`] - Create/update, read, delete and reconfigure operations
//! - [`error`] - Error types and classification
//! - [`id`] - Opaque resource identifiers
//! - [`types`] - Appliance subsystems
//! - [`config`] - Serializable, validated client configuration
//! - [`client`] - Per-call timeout and retry settings

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod controller;
pub mod crud;
pub mod error;
pub mod id;
pub mod selected;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use controller::{Controller, SubsystemController};
pub use crud::{Envelope, Resource};
pub use error::{Error, Result, TransportError};
pub use id::ResourceId;
pub use selected::SelectedMap;
pub use transport::{HttpMethod, Transport};
pub use types::Subsystem;
