//! Configuration objects managed through the client.
//!
//! Each model is used both as the write payload and as the decoded read
//! response: enumeration fields are [`SelectedMap`]s, which read the
//! appliance's option map and write back the bare selected key.

use opnsense_core::crud::Resource;
use opnsense_core::{SelectedMap, Subsystem};
use serde::{Deserialize, Serialize};

use crate::resource::{ApiResource, Endpoints};

/// Static route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Whether the route is disabled.
    #[serde(with = "flag", default)]
    pub disabled: bool,
    /// Free-form description.
    #[serde(rename = "descr", default)]
    pub description: String,
    /// Gateway name.
    #[serde(default)]
    pub gateway: SelectedMap,
    /// Destination network in CIDR notation.
    #[serde(default)]
    pub network: String,
}

/// VLAN interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfacesVlan {
    /// Free-form description.
    #[serde(rename = "descr", default)]
    pub description: String,
    /// VLAN tag, 1 to 4094.
    #[serde(default)]
    pub tag: String,
    /// 802.1p priority code point.
    #[serde(rename = "pcp", default)]
    pub priority: SelectedMap,
    /// Parent interface.
    #[serde(rename = "if", default)]
    pub parent: SelectedMap,
    /// Device name, e.g. `vlan01`; assigned by the appliance when empty.
    #[serde(rename = "vlanif", default)]
    pub device: String,
}

/// Unbound domain override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnboundDomainOverride {
    /// Whether the override is active.
    #[serde(with = "flag", default)]
    pub enabled: bool,
    /// Domain to override.
    #[serde(default)]
    pub domain: String,
    /// Authoritative server address.
    #[serde(default)]
    pub server: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Unbound host override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnboundHostOverride {
    /// Whether the override is active.
    #[serde(with = "flag", default)]
    pub enabled: bool,
    /// Host name, without domain.
    #[serde(default)]
    pub hostname: String,
    /// Domain of the host.
    #[serde(default)]
    pub domain: String,
    /// Record type (`A`, `AAAA` or `MX`).
    #[serde(rename = "rr", default)]
    pub record_type: SelectedMap,
    /// Address the name resolves to.
    #[serde(default)]
    pub server: String,
    /// MX priority.
    #[serde(rename = "mxprio", default)]
    pub mx_priority: String,
    /// MX host.
    #[serde(rename = "mx", default)]
    pub mx_domain: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

/// Unbound query forward, plain or DNS over TLS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnboundForward {
    /// Whether the forward is active.
    #[serde(with = "flag", default)]
    pub enabled: bool,
    /// Domain to forward; empty forwards everything.
    #[serde(default)]
    pub domain: String,
    /// Forward type (`forward` or `dot`).
    #[serde(rename = "type", default)]
    pub forward_type: SelectedMap,
    /// Upstream server address.
    #[serde(default)]
    pub server: String,
    /// Upstream port.
    #[serde(default)]
    pub port: String,
    /// Common name to verify on the upstream certificate.
    #[serde(rename = "verify", default)]
    pub verify_cn: String,
}

/// Additional name for an existing host override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnboundHostAlias {
    /// Whether the alias is active.
    #[serde(with = "flag", default)]
    pub enabled: bool,
    /// Identifier of the host override the alias points at.
    #[serde(default)]
    pub host: SelectedMap,
    /// Alias host name.
    #[serde(default)]
    pub hostname: String,
    /// Alias domain.
    #[serde(default)]
    pub domain: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
}

impl Resource for Route {
    const ENVELOPE_KEY: &'static str = "route";
}

impl ApiResource for Route {
    const SUBSYSTEM: Subsystem = Subsystem::Routes;
    const ENDPOINTS: Endpoints = Endpoints {
        add: "/routes/routes/addroute",
        get: "/routes/routes/getroute",
        set: "/routes/routes/setroute",
        delete: "/routes/routes/delroute",
        reconfigure: "/routes/routes/reconfigure",
    };
}

impl Resource for InterfacesVlan {
    const ENVELOPE_KEY: &'static str = "vlan";
}

impl ApiResource for InterfacesVlan {
    const SUBSYSTEM: Subsystem = Subsystem::Interfaces;
    const ENDPOINTS: Endpoints = Endpoints {
        add: "/interfaces/vlan_settings/addItem",
        get: "/interfaces/vlan_settings/getItem",
        set: "/interfaces/vlan_settings/setItem",
        delete: "/interfaces/vlan_settings/delItem",
        reconfigure: "/interfaces/vlan_settings/reconfigure",
    };
}

/// Reconfigure endpoint shared by every Unbound object.
pub const UNBOUND_RECONFIGURE: &str = "/unbound/service/reconfigure";

impl Resource for UnboundDomainOverride {
    const ENVELOPE_KEY: &'static str = "domain";
}

impl ApiResource for UnboundDomainOverride {
    const SUBSYSTEM: Subsystem = Subsystem::Unbound;
    const ENDPOINTS: Endpoints = Endpoints {
        add: "/unbound/settings/addDomainOverride",
        get: "/unbound/settings/getDomainOverride",
        set: "/unbound/settings/setDomainOverride",
        delete: "/unbound/settings/delDomainOverride",
        reconfigure: UNBOUND_RECONFIGURE,
    };
}

impl Resource for UnboundHostOverride {
    const ENVELOPE_KEY: &'static str = "host";
}

impl ApiResource for UnboundHostOverride {
    const SUBSYSTEM: Subsystem = Subsystem::Unbound;
    const ENDPOINTS: Endpoints = Endpoints {
        add: "/unbound/settings/addHostOverride",
        get: "/unbound/settings/getHostOverride",
        set: "/unbound/settings/setHostOverride",
        delete: "/unbound/settings/delHostOverride",
        reconfigure: UNBOUND_RECONFIGURE,
    };
}

impl Resource for UnboundForward {
    const ENVELOPE_KEY: &'static str = "dot";
}

impl ApiResource for UnboundForward {
    const SUBSYSTEM: Subsystem = Subsystem::Unbound;
    const ENDPOINTS: Endpoints = Endpoints {
        add: "/unbound/settings/addDot",
        get: "/unbound/settings/getDot",
        set: "/unbound/settings/setDot",
        delete: "/unbound/settings/delDot",
        reconfigure: UNBOUND_RECONFIGURE,
    };
}

impl Resource for UnboundHostAlias {
    const ENVELOPE_KEY: &'static str = "alias";
}

impl ApiResource for UnboundHostAlias {
    const SUBSYSTEM: Subsystem = Subsystem::Unbound;
    const ENDPOINTS: Endpoints = Endpoints {
        add: "/unbound/settings/addHostAlias",
        get: "/unbound/settings/getHostAlias",
        set: "/unbound/settings/setHostAlias",
        delete: "/unbound/settings/delHostAlias",
        reconfigure: UNBOUND_RECONFIGURE,
    };
}

/// The appliance encodes booleans as `"1"` and `"0"`.
mod flag {
    use serde::de::{self, Deserializer, Unexpected, Visitor};
    use serde::Serializer;
    use std::fmt;

    pub fn serialize<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(if *value { "1" } else { "0" })
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(FlagVisitor)
    }

    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("\"0\", \"1\" or a boolean")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            match value {
                0 => Ok(false),
                1 => Ok(true),
                other => Err(E::invalid_value(Unexpected::Unsigned(other), &self)),
            }
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<bool, E> {
            match value.trim() {
                "" | "0" => Ok(false),
                "1" => Ok(true),
                other => Err(E::invalid_value(Unexpected::Str(other), &self)),
            }
        }
    }
}
