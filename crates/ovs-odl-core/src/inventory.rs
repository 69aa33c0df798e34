//! Local host facts

use std::net::IpAddr;

use async_trait::async_trait;
use ipnet::IpNet;

use ovs_odl_types::LocalInterfaceConfig;

use crate::Result;

#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait LocalInventory: Send + Sync {
    async fn hostname(&self) -> Result<String>;

    /// Local address inside `network`, or the unit's private address when
    /// no network is selected.
    async fn data_plane_address(&self, network: Option<IpNet>) -> Result<IpAddr>;

    /// Requested MAC to network/interface attachments.
    async fn local_interface_config(&self) -> Result<LocalInterfaceConfig>;
}
