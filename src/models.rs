//! Data models for the kvas status report and domain-list responses
//!
//! Parsed fields are `Option`s so that "label absent" stays distinguishable
//! from "label present but empty" while the report is inspected in Rust.
//! On the wire the dashboard expects plain strings and numbers, so absent
//! values serialize as `""` / `0`.

use serde::{Deserialize, Serialize, Serializer};

/// Structured form of the `kvas tunnel` console report
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusReport {
    #[serde(rename = "internet_gateway")]
    pub gateway: Gateway,

    pub tunnel: Tunnel,

    #[serde(rename = "available_networks")]
    pub available: Vec<NetworkEntry>,

    #[serde(rename = "scanned_networks")]
    pub scanned: Vec<NetworkEntry>,
}

/// Upstream internet connection of the router
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Gateway {
    #[serde(serialize_with = "string_or_empty")]
    pub provider: Option<String>,

    /// Interface label as shown in the Keenetic UI, e.g. `GigabitEthernet0/Vlan4`
    #[serde(serialize_with = "string_or_empty")]
    pub keenetic: Option<String>,

    /// Linux interface name, e.g. `eth2.4`
    #[serde(serialize_with = "string_or_empty")]
    pub interface: Option<String>,

    /// Not validated; upstream may print anything here
    #[serde(serialize_with = "string_or_empty")]
    pub ip: Option<String>,

    pub connection: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Tunnel {
    #[serde(serialize_with = "string_or_empty")]
    pub name: Option<String>,

    pub connection: bool,

    #[serde(serialize_with = "string_or_empty")]
    pub ip: Option<String>,

    /// `None` when the configuration section is missing or failed to decode
    #[serde(serialize_with = "config_or_default")]
    pub config: Option<TunnelConfig>,
}

/// Shadowsocks-style client settings embedded in the report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TunnelConfig {
    #[serde(serialize_with = "string_or_empty")]
    pub server: Option<String>,

    #[serde(serialize_with = "number_or_zero")]
    pub server_port: Option<u16>,

    #[serde(serialize_with = "number_or_zero")]
    pub local_port: Option<u16>,

    #[serde(serialize_with = "string_or_empty")]
    pub method: Option<String>,
}

/// One row of the "available" or "scanned" network tables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkEntry {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,

    pub interface: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Connection kind taken from a bracketed suffix such as `eth2.4[wifi]`
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<String>,
}

/// Body of `/add` and `/del` responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainResponse {
    pub domain: String,
}

/// Body of `/clear` responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClearResponse {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<String>,
}

/// Body of `/update` responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResponse {
    pub output: String,
}

fn string_or_empty<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

fn number_or_zero<S: Serializer>(value: &Option<u16>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u16(value.unwrap_or(0))
}

fn config_or_default<S: Serializer>(
    value: &Option<TunnelConfig>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(config) => config.serialize(serializer),
        None => TunnelConfig::default().serialize(serializer),
    }
}
