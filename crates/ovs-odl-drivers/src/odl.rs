//! OpenDaylight RESTCONF registration client

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};

use ovs_odl_core::{ControllerClient, ControllerError, OvsOdlError, Result};
use ovs_odl_types::{ControllerConnection, DeviceType, MacAddr};

const NETCONF_TOPOLOGY: &str = "network-topology:network-topology/topology/topology-netconf";
const NET_MAP: &str = "neutron-device-tenant:neutron_net_map/physical_devices";

/// Netconf port the controller uses to reach registered nodes
pub const NETCONF_PORT: u16 = 2830;

#[derive(Debug, Default, Deserialize)]
struct NetworkTopology {
    #[serde(default)]
    topology: Vec<Topology>,
}

#[derive(Debug, Default, Deserialize)]
struct Topology {
    #[serde(default)]
    node: Vec<TopologyNode>,
}

#[derive(Debug, Deserialize)]
struct TopologyNode {
    #[serde(rename = "node-id")]
    node_id: String,
}

#[derive(Debug, Serialize)]
struct NetconfNodeRequest {
    node: Vec<NetconfNode>,
}

#[derive(Debug, Serialize)]
struct NetconfNode {
    #[serde(rename = "node-id")]
    node_id: String,
    #[serde(rename = "netconf-node-topology:host")]
    host: String,
    #[serde(rename = "netconf-node-topology:port")]
    port: u16,
    #[serde(rename = "netconf-node-topology:username")]
    username: String,
    #[serde(rename = "netconf-node-topology:password")]
    password: String,
    #[serde(rename = "netconf-node-topology:tcp-only")]
    tcp_only: bool,
}

/// One registered (network, device, interface, mac) entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct NetDeviceRegistration {
    network: String,
    #[serde(rename = "device-name")]
    device_name: String,
    interface: String,
    mac: String,
    #[serde(rename = "device-type", default)]
    device_type: DeviceType,
}

#[derive(Debug, Default, Deserialize)]
struct PhysicalDevices {
    #[serde(default)]
    physical_devices: Vec<NetDeviceRegistration>,
}

#[derive(Debug, Serialize)]
struct RegisterNetDeviceRequest<'a> {
    registration: &'a NetDeviceRegistration,
}

/// RESTCONF client for the controller's device registration API
pub struct OdlRestClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl OdlRestClient {
    /// Create a client for the connection published on the controller-api relation
    pub fn new(connection: &ControllerConnection, timeout: Duration) -> Result<Self> {
        Self::with_base_url(
            &connection.base_url(),
            &connection.username,
            &connection.password,
            timeout,
        )
    }

    pub fn with_base_url(
        base_url: &str,
        username: &str,
        password: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ControllerError::Transport {
                url: base_url.clone(),
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn url(&self, datastore: &str, path: &str) -> String {
        format!("{}/restconf/{}/{}", self.base_url, datastore, path)
    }

    /// Send an authenticated request. `None` means the resource does not exist.
    async fn request<T>(
        &self,
        method: Method,
        url: &str,
        body: Option<&impl Serialize>,
    ) -> Result<Option<T>>
    where
        T: for<'de> Deserialize<'de>,
    {
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Accept", "application/json");

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| ControllerError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND && method == Method::GET {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ControllerError::Status {
                method: method.to_string(),
                url: url.to_string(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let text = response.text().await.map_err(|e| ControllerError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        // Writes answer with an empty body
        if text.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str::<T>(&text).map(Some).map_err(|e| {
            OvsOdlError::from(ControllerError::Decode {
                url: url.to_string(),
                message: e.to_string(),
            })
        })
    }

    /// Node ids currently present in the netconf topology
    pub async fn registered_nodes(&self) -> Result<Vec<String>> {
        let url = self.url("operational", NETCONF_TOPOLOGY);
        let topology: Option<NetworkTopology> =
            self.request(Method::GET, &url, None::<&()>).await?;

        Ok(topology
            .unwrap_or_default()
            .topology
            .into_iter()
            .flat_map(|t| t.node)
            .map(|n| n.node_id)
            .collect())
    }

    async fn net_device_registrations(&self, mac: &MacAddr) -> Result<Vec<NetDeviceRegistration>> {
        let url = self.net_device_url(mac);
        let devices: Option<PhysicalDevices> =
            self.request(Method::GET, &url, None::<&()>).await?;

        Ok(devices.unwrap_or_default().physical_devices)
    }

    fn net_device_url(&self, mac: &MacAddr) -> String {
        self.url(
            "config",
            &format!("{}/{}", NET_MAP, urlencoding::encode(&mac.to_string())),
        )
    }
}

#[async_trait]
impl ControllerClient for OdlRestClient {
    async fn is_device_registered(&self, hostname: &str) -> Result<bool> {
        Ok(self
            .registered_nodes()
            .await?
            .iter()
            .any(|node| node == hostname))
    }

    async fn register_device(&self, hostname: &str, address: IpAddr) -> Result<()> {
        let url = self.url(
            "config",
            &format!("{}/node/{}", NETCONF_TOPOLOGY, urlencoding::encode(hostname)),
        );
        let body = NetconfNodeRequest {
            node: vec![NetconfNode {
                node_id: hostname.to_string(),
                host: address.to_string(),
                port: NETCONF_PORT,
                username: self.username.clone(),
                password: self.password.clone(),
                tcp_only: false,
            }],
        };

        let _: Option<serde_json::Value> = self.request(Method::PUT, &url, Some(&body)).await?;
        Ok(())
    }

    async fn is_net_device_registered(
        &self,
        network: &str,
        hostname: &str,
        interface: &str,
        mac: &MacAddr,
        device_type: DeviceType,
    ) -> Result<bool> {
        let wanted = NetDeviceRegistration {
            network: network.to_string(),
            device_name: hostname.to_string(),
            interface: interface.to_string(),
            mac: mac.to_string(),
            device_type,
        };

        Ok(self
            .net_device_registrations(mac)
            .await?
            .iter()
            .any(|r| {
                r.network == wanted.network
                    && r.device_name == wanted.device_name
                    && r.interface == wanted.interface
                    && r.mac.eq_ignore_ascii_case(&wanted.mac)
                    && r.device_type == wanted.device_type
            }))
    }

    async fn register_net_device(
        &self,
        hostname: &str,
        network: &str,
        interface: &str,
        mac: &MacAddr,
        device_type: DeviceType,
    ) -> Result<()> {
        let url = self.net_device_url(mac);
        let registration = NetDeviceRegistration {
            network: network.to_string(),
            device_name: hostname.to_string(),
            interface: interface.to_string(),
            mac: mac.to_string(),
            device_type,
        };

        let _: Option<serde_json::Value> = self
            .request(
                Method::POST,
                &url,
                Some(&RegisterNetDeviceRequest {
                    registration: &registration,
                }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    const AUTH: &str = "Basic YWRtaW46c2VjcmV0";
    const TOPOLOGY_PATH: &str =
        "/restconf/operational/network-topology:network-topology/topology/topology-netconf";

    fn client(server: &mockito::ServerGuard) -> OdlRestClient {
        OdlRestClient::with_base_url(&server.url(), "admin", "secret", Duration::from_secs(5))
            .unwrap()
    }

    fn net_map_path() -> Matcher {
        Matcher::Regex(
            r"^/restconf/config/neutron-device-tenant:neutron_net_map/physical_devices/.+$"
                .to_string(),
        )
    }

    #[tokio::test]
    async fn test_device_registered_lookup() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", TOPOLOGY_PATH)
            .match_header("authorization", AUTH)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"topology": [{"topology-id": "topology-netconf",
                    "node": [{"node-id": "controller-config"}, {"node-id": "ovs-host"}]}]})
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let odl = client(&server);
        assert!(odl.is_device_registered("ovs-host").await.unwrap());
        assert!(!odl.is_device_registered("other-host").await.unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_missing_topology_means_unregistered() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", TOPOLOGY_PATH)
            .with_status(404)
            .create_async()
            .await;

        let odl = client(&server);
        assert!(!odl.is_device_registered("ovs-host").await.unwrap());
    }

    #[tokio::test]
    async fn test_register_device_puts_netconf_node() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "PUT",
                "/restconf/config/network-topology:network-topology/topology/topology-netconf/node/ovs-host",
            )
            .match_header("authorization", AUTH)
            .match_body(Matcher::PartialJson(json!({"node": [{
                "node-id": "ovs-host",
                "netconf-node-topology:host": "10.1.1.1",
                "netconf-node-topology:port": 2830,
                "netconf-node-topology:tcp-only": false
            }]})))
            .with_status(200)
            .create_async()
            .await;

        let odl = client(&server);
        odl.register_device("ovs-host", "10.1.1.1".parse().unwrap())
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_register_device_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("PUT", Matcher::Any)
            .with_status(401)
            .with_body("unauthorized")
            .create_async()
            .await;

        let odl = client(&server);
        let err = odl
            .register_device("ovs-host", "10.1.1.1".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ovs_odl_core::OvsOdlError::Controller(ControllerError::Status { status: 401, .. })
        ));
    }

    #[tokio::test]
    async fn test_net_device_registered_matches_all_fields() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", net_map_path())
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"physical_devices": [{
                    "network": "net1",
                    "device-name": "ovs-host",
                    "interface": "eth1",
                    "mac": "00:11:22:33:44:55",
                    "device-type": "ovs"
                }]})
                .to_string(),
            )
            .create_async()
            .await;

        let odl = client(&server);
        let mac: MacAddr = "00:11:22:33:44:55".parse().unwrap();

        assert!(odl
            .is_net_device_registered("net1", "ovs-host", "eth1", &mac, DeviceType::Ovs)
            .await
            .unwrap());
        assert!(!odl
            .is_net_device_registered("net2", "ovs-host", "eth1", &mac, DeviceType::Ovs)
            .await
            .unwrap());
        assert!(!odl
            .is_net_device_registered("net1", "ovs-host", "eth1", &mac, DeviceType::Vhostuser)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_register_net_device_posts_registration() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", net_map_path())
            .match_body(Matcher::Json(json!({"registration": {
                "network": "net1",
                "device-name": "ovs-host",
                "interface": "eth1",
                "mac": "00:11:22:33:44:55",
                "device-type": "ovs"
            }})))
            .with_status(201)
            .create_async()
            .await;

        let odl = client(&server);
        let mac: MacAddr = "00:11:22:33:44:55".parse().unwrap();
        odl.register_net_device("ovs-host", "net1", "eth1", &mac, DeviceType::Ovs)
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_response_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", TOPOLOGY_PATH)
            .with_status(200)
            .with_body("{not json")
            .create_async()
            .await;

        let odl = client(&server);
        let err = odl.is_device_registered("ovs-host").await.unwrap_err();
        assert!(matches!(
            err,
            ovs_odl_core::OvsOdlError::Controller(ControllerError::Decode { .. })
        ));
    }
}
