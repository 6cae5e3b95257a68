//! Integration tests for decoding appliance responses.
//!
//! The fixtures are read responses captured from an appliance; enumeration
//! fields arrive as option maps and must decode to the selected key.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use opnsense_client::{
    InterfacesVlan, OpnsenseClient, Route, UnboundDomainOverride, UnboundForward,
    UnboundHostOverride,
};
use opnsense_core::{HttpMethod, ResourceId, Transport, TransportError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Get the path to the test fixtures directory.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> Value {
    let fixture_path = fixtures_dir().join(name);
    let data = fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {}: {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&data).unwrap()
}

fn unwrap<T: DeserializeOwned>(fixture: &str, key: &str) -> T {
    let mut value = load_fixture(fixture);
    serde_json::from_value(value[key].take())
        .unwrap_or_else(|e| panic!("Failed to decode `{key}` from {fixture}: {e}"))
}

/// Answers every read with the same fixture.
struct Replay(Value);

#[async_trait]
impl Transport for Replay {
    async fn do_request(
        &self,
        method: HttpMethod,
        _path: &str,
        _body: Option<Value>,
    ) -> Result<Value, TransportError> {
        assert_eq!(method, HttpMethod::Get, "fixture replay only serves reads");
        Ok(self.0.clone())
    }
}

#[test]
fn test_route_fixture() {
    let route: Route = unwrap("route_get.json", "route");
    assert!(!route.disabled);
    assert_eq!(route.description, "lab network");
    assert_eq!(route.gateway, "LAB_GW");
    assert_eq!(route.network, "10.20.0.0/16");
}

#[test]
fn test_vlan_fixture() {
    let vlan: InterfacesVlan = unwrap("vlan_get.json", "vlan");
    assert_eq!(vlan.tag, "42");
    assert_eq!(vlan.parent, "igb1");
    assert_eq!(vlan.priority, "0");
    assert_eq!(vlan.device, "vlan0.42");
}

#[test]
fn test_host_override_fixture() {
    let host: UnboundHostOverride = unwrap("host_override_get.json", "host");
    assert!(host.enabled);
    assert_eq!(host.record_type, "MX");
    assert_eq!(host.mx_priority, "10");
    assert_eq!(host.mx_domain, "mx1.example.lan");
    assert!(host.server.is_empty());
}

#[test]
fn test_forward_fixture() {
    let forward: UnboundForward = unwrap("forward_get.json", "dot");
    assert_eq!(forward.forward_type, "dot");
    assert_eq!(forward.port, "853");
    assert_eq!(forward.verify_cn, "dns.quad9.net");
}

#[test]
fn test_domain_override_fixture() {
    let domain: UnboundDomainOverride = unwrap("domain_override_get.json", "domain");
    assert!(!domain.enabled);
    assert_eq!(domain.server, "10.0.0.53");
}

#[test]
fn test_decoded_route_writes_back_bare_keys() {
    let route: Route = unwrap("route_get.json", "route");
    let written = serde_json::to_value(&route).unwrap();
    assert_eq!(written["gateway"], "LAB_GW");
    assert_eq!(written["disabled"], "0");
}

#[tokio::test]
async fn test_client_reads_vlan_fixture() {
    let client = OpnsenseClient::new(Arc::new(Replay(load_fixture("vlan_get.json"))));
    let vlan = client
        .interfaces()
        .get_vlan(&ResourceId::from("b0a7e1c2"))
        .await
        .unwrap();
    assert_eq!(vlan.parent, "igb1");
}

#[tokio::test]
async fn test_client_maps_not_found_fixture() {
    let client = OpnsenseClient::new(Arc::new(Replay(load_fixture("not_found.json"))));
    let err = client
        .routes()
        .get_route(&ResourceId::from("deleted-upstream"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.error_code(), "NOT_FOUND");
}
