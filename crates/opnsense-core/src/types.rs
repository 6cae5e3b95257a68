//! Appliance subsystems that own a configuration lock.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Appliance subsystems with their own reconfigure cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    /// Static routes
    Routes,
    /// Interface-level objects such as VLANs
    Interfaces,
    /// Unbound DNS resolver
    Unbound,
}

impl Subsystem {
    /// Returns the subsystem name as used in API paths.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Routes => "routes",
            Self::Interfaces => "interfaces",
            Self::Unbound => "unbound",
        }
    }

    /// Returns all subsystems.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Routes, Self::Interfaces, Self::Unbound]
    }
}

impl FromStr for Subsystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "routes" => Ok(Self::Routes),
            "interfaces" => Ok(Self::Interfaces),
            "unbound" => Ok(Self::Unbound),
            _ => Err(Error::ConfigError(format!("Unknown subsystem: {s}"))),
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
