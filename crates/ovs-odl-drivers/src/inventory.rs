//! Local host inventory: hostname, addresses and interface MACs

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use ipnet::IpNet;
use log::{debug, warn};
use serde::Deserialize;
use tokio::process::Command;

use ovs_odl_core::{InventoryError, LocalInventory, OvsOdlError, Result};
use ovs_odl_types::{LocalInterfaceConfig, MacAddr, MacNetworkEntry};

pub const DEFAULT_HOSTNAME_PATH: &str = "/proc/sys/kernel/hostname";
pub const DEFAULT_SYSFS_ROOT: &str = "/sys";

/// Interface entry of `ip -j addr show`
#[derive(Debug, Clone, Deserialize)]
pub struct IpLink {
    pub ifname: String,
    #[serde(default)]
    pub addr_info: Vec<IpAddrInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IpAddrInfo {
    #[serde(default)]
    pub local: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl IpLink {
    /// Parsed addresses of this link, skipping entries without a usable `local`
    pub fn addresses(&self) -> impl Iterator<Item = (IpAddr, Option<&str>)> + '_ {
        self.addr_info.iter().filter_map(|info| {
            let addr = info.local.as_deref()?.parse::<IpAddr>().ok()?;
            Some((addr, info.scope.as_deref()))
        })
    }
}

/// Parse the JSON printed by `ip -j addr show`
pub fn parse_ip_addr_json(output: &str) -> Result<Vec<IpLink>> {
    serde_json::from_str(output).map_err(|e| {
        OvsOdlError::from(InventoryError::Query {
            what: "ip addr".to_string(),
            message: e.to_string(),
        })
    })
}

/// First address of `links` that falls inside `network`
pub fn address_in_network(links: &[IpLink], network: &IpNet) -> Option<IpAddr> {
    links
        .iter()
        .flat_map(|link| link.addresses())
        .map(|(addr, _)| addr)
        .find(|addr| network.contains(addr))
}

/// First globally scoped, non-loopback address of `links`
pub fn first_global_address(links: &[IpLink]) -> Option<IpAddr> {
    links
        .iter()
        .flat_map(|link| link.addresses())
        .find(|(addr, scope)| !addr.is_loopback() && scope.map_or(true, |s| s == "global"))
        .map(|(addr, _)| addr)
}

/// Host facts gathered from procfs, sysfs and iproute2
#[derive(Debug, Clone)]
pub struct HostInventory {
    hostname_path: PathBuf,
    sysfs_root: PathBuf,
    ip_program: PathBuf,
    ip_global_args: Vec<String>,
    private_address: Option<IpAddr>,
    mac_network_map: Vec<MacNetworkEntry>,
}

impl HostInventory {
    pub fn new(mac_network_map: Vec<MacNetworkEntry>) -> Self {
        Self {
            hostname_path: PathBuf::from(DEFAULT_HOSTNAME_PATH),
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            ip_program: PathBuf::from("ip"),
            ip_global_args: Vec::new(),
            private_address: None,
            mac_network_map,
        }
    }

    pub fn with_hostname_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.hostname_path = path.into();
        self
    }

    pub fn with_sysfs_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.sysfs_root = root.into();
        self
    }

    pub fn with_ip_command<I, S>(mut self, program: impl Into<PathBuf>, global_args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ip_program = program.into();
        self.ip_global_args = global_args.into_iter().map(Into::into).collect();
        self
    }

    /// Address used when no data network is configured
    pub fn with_private_address(mut self, address: Option<IpAddr>) -> Self {
        self.private_address = address;
        self
    }

    async fn ip_links(&self) -> Result<Vec<IpLink>> {
        let output = Command::new(&self.ip_program)
            .args(&self.ip_global_args)
            .args(["-j", "addr", "show"])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| InventoryError::Query {
                what: "ip addr".to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(InventoryError::Query {
                what: "ip addr".to_string(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            }
            .into());
        }

        parse_ip_addr_json(&String::from_utf8_lossy(&output.stdout))
    }

    /// MAC address to interface name, read from `<sysfs>/class/net/*/address`
    async fn interface_macs(&self) -> Result<HashMap<MacAddr, String>> {
        let net_dir = self.sysfs_root.join("class").join("net");
        let mut entries = tokio::fs::read_dir(&net_dir).await.map_err(|e| {
            InventoryError::Query {
                what: net_dir.display().to_string(),
                message: e.to_string(),
            }
        })?;

        let mut candidates = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let ifname = entry.file_name().to_string_lossy().to_string();
            match read_mac(&entry.path().join("address")).await {
                Some(mac) => {
                    let physical = tokio::fs::metadata(entry.path().join("device"))
                        .await
                        .is_ok();
                    candidates.push((mac, !physical, ifname));
                }
                None => debug!("Skipping {} without a readable MAC", ifname),
            }
        }

        // Bonds and bridges carry the MAC of a member NIC. Interfaces backed
        // by a device win, then the lowest name.
        candidates.sort_by(|a, b| (a.1, &a.2).cmp(&(b.1, &b.2)));

        let mut macs = HashMap::new();
        for (mac, _, ifname) in candidates {
            macs.entry(mac).or_insert(ifname);
        }

        Ok(macs)
    }
}

async fn read_mac(path: &Path) -> Option<MacAddr> {
    let raw = tokio::fs::read_to_string(path).await.ok()?;
    raw.trim().parse().ok()
}

#[async_trait]
impl LocalInventory for HostInventory {
    async fn hostname(&self) -> Result<String> {
        let raw = tokio::fs::read_to_string(&self.hostname_path)
            .await
            .map_err(|e| InventoryError::Hostname {
                message: format!("{}: {}", self.hostname_path.display(), e),
            })?;

        let hostname = raw.trim();
        if hostname.is_empty() {
            return Err(InventoryError::Hostname {
                message: format!("{} is empty", self.hostname_path.display()),
            }
            .into());
        }

        Ok(hostname.to_string())
    }

    async fn data_plane_address(&self, network: Option<IpNet>) -> Result<IpAddr> {
        match network {
            Some(network) => {
                let links = self.ip_links().await?;
                address_in_network(&links, &network).ok_or_else(|| {
                    OvsOdlError::from(InventoryError::NoAddressOnNetwork {
                        network: network.to_string(),
                    })
                })
            }
            None => {
                if let Some(address) = self.private_address {
                    return Ok(address);
                }
                let links = self.ip_links().await?;
                first_global_address(&links).ok_or_else(|| {
                    OvsOdlError::from(InventoryError::Query {
                        what: "private address".to_string(),
                        message: "no globally scoped address found".to_string(),
                    })
                })
            }
        }
    }

    async fn local_interface_config(&self) -> Result<LocalInterfaceConfig> {
        let mut config = LocalInterfaceConfig::new();
        if self.mac_network_map.is_empty() {
            return Ok(config);
        }

        let macs = self.interface_macs().await?;
        for entry in &self.mac_network_map {
            let interface = macs.get(&entry.mac).ok_or_else(|| {
                warn!("MAC {} from mac-network-map not found locally", entry.mac);
                InventoryError::UnknownMac {
                    mac: entry.mac.to_string(),
                }
            })?;
            config.insert(entry.mac, entry.network.clone(), interface.clone());
        }

        Ok(config)
    }
}
