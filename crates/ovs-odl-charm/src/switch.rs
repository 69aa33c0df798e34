//! Enable or disable the OVSDB manager on the local switch

use std::net::IpAddr;
use std::sync::Arc;

use ipnet::IpNet;
use log::info;

use ovs_odl_core::{LocalInventory, Result, SwitchConfigurator};
use ovs_odl_types::{OvsdbManager, WorkloadStatus};

pub const LOCAL_IP_KEY: &str = "local_ip";
pub const CONTROLLER_IPS_KEY: &str = "controller-ips";
pub const HOST_ID_KEY: &str = "host-id";

/// Points the switch at an OVSDB manager, or detaches it again
pub struct SwitchToggle {
    switch: Arc<dyn SwitchConfigurator>,
}

impl SwitchToggle {
    pub fn new(switch: Arc<dyn SwitchConfigurator>) -> Self {
        Self { switch }
    }

    /// Write tunnel endpoint, controller and host identity, then set the
    /// manager. Each write is last-write-wins so re-applying is harmless.
    pub async fn apply_manager(
        &self,
        manager: &OvsdbManager,
        local_ip: IpAddr,
        host_id: &str,
    ) -> Result<WorkloadStatus> {
        info!(
            "Configuring Open vSwitch for manager {} (local_ip {}, host-id {})",
            manager.connection_string, local_ip, host_id
        );

        self.switch
            .set_other_config(LOCAL_IP_KEY, &local_ip.to_string())
            .await?;
        self.switch
            .set_external_id(CONTROLLER_IPS_KEY, &manager.private_address)
            .await?;
        self.switch.set_external_id(HOST_ID_KEY, host_id).await?;
        self.switch.set_manager(&manager.connection_string).await?;

        Ok(WorkloadStatus::ready())
    }

    /// Remove the manager and the controller of every bridge
    pub async fn clear_manager(&self) -> Result<WorkloadStatus> {
        info!("Removing ODL configuration from Open vSwitch");

        self.switch.del_manager().await?;
        for bridge in self.switch.list_bridges().await? {
            self.switch.del_controller(&bridge).await?;
        }

        Ok(WorkloadStatus::not_configured())
    }

    /// [`Self::apply_manager`] with the tunnel address and host id taken
    /// from the local inventory
    pub async fn configure(
        &self,
        manager: &OvsdbManager,
        inventory: &dyn LocalInventory,
        data_network: Option<IpNet>,
    ) -> Result<WorkloadStatus> {
        let local_ip = inventory.data_plane_address(data_network).await?;
        let host_id = inventory.hostname().await?;
        self.apply_manager(manager, local_ip, &host_id).await
    }
}
