use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SharedTypeError;

/// Default RESTCONF port of the OpenDaylight controller.
pub const DEFAULT_ODL_PORT: u16 = 8181;

/// Kind of device a net-device registration refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    Ovs,
    #[default]
    Vhostuser,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Ovs => "ovs",
            DeviceType::Vhostuser => "vhostuser",
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = SharedTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ovs" => Ok(DeviceType::Ovs),
            "vhostuser" => Ok(DeviceType::Vhostuser),
            _ => Err(SharedTypeError::InvalidValue {
                field: "device_type",
                value: s.to_string(),
            }),
        }
    }
}

/// Connection attributes published on the `controller-api` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ControllerConnection {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
}

fn default_port() -> u16 {
    DEFAULT_ODL_PORT
}

impl ControllerConnection {
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_ODL_PORT,
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Data published on the `ovsdb-manager` relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OvsdbManager {
    /// e.g. `tcp:odl-controller:6640`
    pub connection_string: String,
    pub private_address: String,
}

impl OvsdbManager {
    pub fn new(connection_string: impl Into<String>, private_address: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            private_address: private_address.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_round_trip() {
        assert_eq!("OVS".parse::<DeviceType>().unwrap(), DeviceType::Ovs);
        assert_eq!(DeviceType::default(), DeviceType::Vhostuser);
        assert_eq!(serde_json::to_string(&DeviceType::Ovs).unwrap(), "\"ovs\"");
        assert!("bridge".parse::<DeviceType>().is_err());
    }

    #[test]
    fn connection_defaults_port() {
        let conn: ControllerConnection = serde_json::from_str(
            r#"{"host": "odl-controller", "username": "admin", "password": "secret"}"#,
        )
        .unwrap();
        assert_eq!(conn.port, DEFAULT_ODL_PORT);
        assert_eq!(conn.base_url(), "http://odl-controller:8181");
        assert_eq!(conn.with_port(8080).base_url(), "http://odl-controller:8080");
    }

    #[test]
    fn ovsdb_manager_uses_kebab_case_keys() {
        let manager: OvsdbManager = serde_json::from_str(
            r#"{"connection-string": "tcp:odl-controller:6640", "private-address": "10.0.0.10"}"#,
        )
        .unwrap();
        assert_eq!(manager, OvsdbManager::new("tcp:odl-controller:6640", "10.0.0.10"));

        let value = serde_json::to_value(&manager).unwrap();
        assert_eq!(value["connection-string"], "tcp:odl-controller:6640");
        assert!(value.get("connection_string").is_none());
    }
}
