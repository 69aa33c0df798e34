use std::hash::{Hash, Hasher};
use std::net::IpAddr;
use std::str::FromStr;

use indexmap::IndexMap;
use mac_address::MacAddress;
use serde::{Deserialize, Serialize};

use crate::error::SharedTypeError;

/// MAC address rendered in the lowercase colon form the controller stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacAddr(pub MacAddress);

impl MacAddr {
    pub fn bytes(&self) -> [u8; 6] {
        self.0.bytes()
    }
}

impl Hash for MacAddr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes().hash(state);
    }
}

struct MacAddrVisitor;

impl<'de> serde::de::Visitor<'de> for MacAddrVisitor {
    type Value = MacAddr;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        formatter.write_str("a MAC address string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        v.parse::<MacAddr>()
            .map_err(|_| E::custom(format!("invalid MAC address: {}", v)))
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(MacAddrVisitor)
    }
}

impl Serialize for MacAddr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl FromStr for MacAddr {
    type Err = SharedTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<MacAddress>()
            .map(MacAddr)
            .map_err(|_| SharedTypeError::InvalidValue {
                field: "mac_address",
                value: s.to_string(),
            })
    }
}

impl std::fmt::Display for MacAddr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = self.bytes();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Identity of the local host as reported to the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub hostname: String,
    pub data_plane_address: IpAddr,
}

impl DeviceIdentity {
    pub fn new(hostname: impl Into<String>, data_plane_address: IpAddr) -> Self {
        Self {
            hostname: hostname.into(),
            data_plane_address,
        }
    }
}

/// Attachment of a local interface to a logical network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAttachment {
    #[serde(rename = "net")]
    pub network: String,
    pub interface: String,
}

/// One (MAC, network, interface) tuple to register with the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacBinding {
    pub mac: MacAddr,
    pub network: String,
    pub interface: String,
}

impl std::fmt::Display for MacBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} via {} on {}", self.network, self.interface, self.mac)
    }
}

/// Requested mapping of local MAC addresses to network attachments.
///
/// Iteration follows insertion order, which is the order the MACs were
/// listed in configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalInterfaceConfig {
    entries: IndexMap<MacAddr, Vec<NetworkAttachment>>,
}

impl LocalInterfaceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attachment for `mac`, keeping the first position of the MAC.
    pub fn insert(&mut self, mac: MacAddr, network: impl Into<String>, interface: impl Into<String>) {
        self.entries.entry(mac).or_default().push(NetworkAttachment {
            network: network.into(),
            interface: interface.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, mac: &MacAddr) -> Option<&[NetworkAttachment]> {
        self.entries.get(mac).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MacAddr, &Vec<NetworkAttachment>)> {
        self.entries.iter()
    }

    /// Flatten into bindings, MAC by MAC, attachments in listed order.
    pub fn bindings(&self) -> Vec<MacBinding> {
        self.entries
            .iter()
            .flat_map(|(mac, attachments)| {
                attachments.iter().map(move |a| MacBinding {
                    mac: *mac,
                    network: a.network.clone(),
                    interface: a.interface.clone(),
                })
            })
            .collect()
    }
}

/// One `mac;network` pair from the `mac-network-map` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacNetworkEntry {
    pub mac: MacAddr,
    pub network: String,
}

/// Parse a whitespace separated list of `<mac>;<network>` pairs.
pub fn parse_mac_network_map(value: &str) -> Result<Vec<MacNetworkEntry>, SharedTypeError> {
    value
        .split_whitespace()
        .map(|token| {
            let (mac, network) = token.split_once(';').ok_or_else(|| {
                SharedTypeError::ParseError(format!(
                    "expected '<mac>;<network>' in mac-network-map, got '{}'",
                    token
                ))
            })?;
            if network.is_empty() {
                return Err(SharedTypeError::InvalidValue {
                    field: "network",
                    value: token.to_string(),
                });
            }
            Ok(MacNetworkEntry {
                mac: mac.parse()?,
                network: network.to_string(),
            })
        })
        .collect()
}
