use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use ovs_odl_charm::{CharmConfig, ControllerFactory, Dispatcher, StateStore};
use ovs_odl_core::ControllerClient;
use ovs_odl_drivers::{HostInventory, OdlRestClient, OvsVsctl};
use ovs_odl_types::ControllerConnection;

/// Collaborators shared by all commands
pub struct AppContext {
    pub config: CharmConfig,
    pub switch: Arc<OvsVsctl>,
    pub inventory: Arc<HostInventory>,
    pub state_store: StateStore,
}

impl AppContext {
    pub fn bootstrap(config_path: &Path) -> Result<Arc<Self>> {
        let config = CharmConfig::load(config_path).with_context(|| {
            format!("Failed to load configuration from {}", config_path.display())
        })?;
        Ok(Arc::new(Self::from_config(config)?))
    }

    pub fn from_config(config: CharmConfig) -> Result<Self> {
        let inventory = HostInventory::new(config.mac_network_entries()?)
            .with_hostname_path(&config.hostname_path)
            .with_sysfs_root(&config.sysfs_root)
            .with_private_address(config.private_address);

        Ok(Self {
            switch: Arc::new(OvsVsctl::with_program(&config.ovs_vsctl)),
            inventory: Arc::new(inventory),
            state_store: StateStore::new(&config.state_file),
            config,
        })
    }

    /// RESTCONF clients built with the configured timeout
    pub fn controller_factory(&self) -> ControllerFactory {
        let timeout = self.config.controller_timeout();
        Box::new(
            move |connection: &ControllerConnection| -> ovs_odl_core::Result<Arc<dyn ControllerClient>> {
                Ok(Arc::new(OdlRestClient::new(connection, timeout)?))
            },
        )
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.switch.clone(),
            self.inventory.clone(),
            self.controller_factory(),
            &self.config,
        )
    }
}
