//! Configure and unconfigure commands

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Context, Result};

use ovs_odl_charm::SwitchToggle;
use ovs_odl_core::LocalInventory;
use ovs_odl_types::{OvsdbManager, WorkloadStatus};

use crate::context::AppContext;

pub struct SwitchCommand {
    context: Arc<AppContext>,
    toggle: SwitchToggle,
}

impl SwitchCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        let toggle = SwitchToggle::new(context.switch.clone());
        Self { context, toggle }
    }

    /// Point the switch at `manager`. Missing `local_ip` and `host_id` are
    /// resolved from the host.
    pub async fn configure(
        &self,
        manager: &OvsdbManager,
        local_ip: Option<IpAddr>,
        host_id: Option<String>,
    ) -> Result<()> {
        let inventory = &self.context.inventory;

        let local_ip = match local_ip {
            Some(ip) => ip,
            None => inventory
                .data_plane_address(self.context.config.os_data_network)
                .await
                .context("Failed to resolve local_ip")?,
        };
        let host_id = match host_id {
            Some(host) => host,
            None => inventory.hostname().await.context("Failed to resolve host-id")?,
        };

        let status = self
            .toggle
            .apply_manager(manager, local_ip, &host_id)
            .await
            .context("Failed to configure Open vSwitch")?;
        self.record(true, &status).await
    }

    pub async fn unconfigure(&self) -> Result<()> {
        let status = self
            .toggle
            .clear_manager()
            .await
            .context("Failed to unconfigure Open vSwitch")?;
        self.record(false, &status).await
    }

    async fn record(&self, configured: bool, status: &WorkloadStatus) -> Result<()> {
        let store = &self.context.state_store;
        let mut state = store.load().await?;
        state.ovs_configured = configured;
        store.save(&state).await?;

        println!("{}", status);
        Ok(())
    }
}
