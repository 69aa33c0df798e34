//! Event dispatcher
//!
//! Each invocation receives a snapshot of relation availability ([`Facts`])
//! together with the persisted [`CharmState`], and runs the handlers whose
//! conditions hold, in a fixed order:
//!
//! 1. installed with an OVSDB manager: configure the switch
//! 2. configured without an OVSDB manager: unconfigure the switch
//! 3. neutron-plugin connected: publish the plugin payload
//! 4. controller-api available: register the node
//! 5. controller-api available: register the MAC bindings
//!
//! The first failing handler aborts the dispatch. `state` then reflects the
//! handlers that completed.

use std::sync::Arc;

use ipnet::IpNet;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use ovs_odl_core::{ControllerClient, LocalInventory, OvsOdlError, Result, SwitchConfigurator};
use ovs_odl_types::{ControllerConnection, OvsdbManager, WorkloadStatus};

use crate::config::CharmConfig;
use crate::neutron::{neutron_plugin_config, NeutronPluginConfig};
use crate::reconciler::{MacRegistrationSummary, NodeRegistration, RegistrationReconciler};
use crate::state::CharmState;
use crate::switch::SwitchToggle;

/// Builds a controller client for the connection published on the
/// controller-api relation
pub type ControllerFactory =
    Box<dyn Fn(&ControllerConnection) -> Result<Arc<dyn ControllerClient>> + Send + Sync>;

/// Relation availability for one invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Facts {
    pub charm_installed: bool,
    pub ovsdb_manager: Option<OvsdbManager>,
    pub controller_api: Option<ControllerConnection>,
    pub neutron_plugin_connected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    ConfigureOvs,
    UnconfigureOvs,
    PublishNeutronPlugin,
    RegisterNode,
    RegisterMacs,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::ConfigureOvs => write!(f, "configure-ovs"),
            Action::UnconfigureOvs => write!(f, "unconfigure-ovs"),
            Action::PublishNeutronPlugin => write!(f, "publish-neutron-plugin"),
            Action::RegisterNode => write!(f, "register-node"),
            Action::RegisterMacs => write!(f, "register-macs"),
        }
    }
}

/// What a dispatch did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub actions: Vec<Action>,
    pub state: CharmState,
    /// Last workload status set by a handler
    pub status: Option<WorkloadStatus>,
    pub neutron_plugin: Option<NeutronPluginConfig>,
    pub node_registration: Option<NodeRegistration>,
    pub mac_registration: Option<MacRegistrationSummary>,
}

/// Handlers whose conditions hold for `facts` and `state`, in run order
pub fn planned_actions(facts: &Facts, state: &CharmState) -> Vec<Action> {
    let mut actions = Vec::new();

    if facts.charm_installed && facts.ovsdb_manager.is_some() {
        actions.push(Action::ConfigureOvs);
    }
    if state.ovs_configured && facts.ovsdb_manager.is_none() {
        actions.push(Action::UnconfigureOvs);
    }
    if facts.neutron_plugin_connected {
        actions.push(Action::PublishNeutronPlugin);
    }
    if facts.controller_api.is_some() {
        actions.push(Action::RegisterNode);
        actions.push(Action::RegisterMacs);
    }

    actions
}

pub struct Dispatcher {
    toggle: SwitchToggle,
    inventory: Arc<dyn LocalInventory>,
    controllers: ControllerFactory,
    reconciler: RegistrationReconciler,
    data_network: Option<IpNet>,
}

impl Dispatcher {
    pub fn new(
        switch: Arc<dyn SwitchConfigurator>,
        inventory: Arc<dyn LocalInventory>,
        controllers: ControllerFactory,
        config: &CharmConfig,
    ) -> Self {
        Self {
            toggle: SwitchToggle::new(switch),
            inventory,
            controllers,
            reconciler: RegistrationReconciler::new(),
            data_network: config.os_data_network,
        }
    }

    pub async fn dispatch(&self, facts: &Facts, state: &mut CharmState) -> Result<DispatchReport> {
        let actions = planned_actions(facts, state);
        debug!("Dispatching {:?} with {:?}", actions, state);

        let mut report = DispatchReport::default();
        let mut controller: Option<Arc<dyn ControllerClient>> = None;

        for action in actions {
            info!("Running {}", action);
            match action {
                Action::ConfigureOvs => {
                    if let Some(manager) = &facts.ovsdb_manager {
                        let status = self
                            .toggle
                            .configure(manager, self.inventory.as_ref(), self.data_network)
                            .await?;
                        state.ovs_configured = true;
                        report.status = Some(status);
                    }
                }
                Action::UnconfigureOvs => {
                    let status = self.toggle.clear_manager().await?;
                    state.ovs_configured = false;
                    report.status = Some(status);
                }
                Action::PublishNeutronPlugin => {
                    report.neutron_plugin = Some(neutron_plugin_config());
                }
                Action::RegisterNode => {
                    let client = self.controller(facts, &mut controller)?;
                    let outcome = self
                        .reconciler
                        .register_node_from_inventory(
                            client.as_ref(),
                            self.inventory.as_ref(),
                            self.data_network,
                        )
                        .await?;
                    report.node_registration = Some(outcome);
                }
                Action::RegisterMacs => {
                    let client = self.controller(facts, &mut controller)?;
                    let summary = self
                        .reconciler
                        .register_macs_from_inventory(client.as_ref(), self.inventory.as_ref())
                        .await?;
                    report.mac_registration = Some(summary);
                }
            }
            report.actions.push(action);
        }

        report.state = *state;
        Ok(report)
    }

    /// Client for the current controller-api connection, built on first use
    fn controller(
        &self,
        facts: &Facts,
        cached: &mut Option<Arc<dyn ControllerClient>>,
    ) -> Result<Arc<dyn ControllerClient>> {
        if let Some(client) = cached {
            return Ok(Arc::clone(client));
        }

        let connection = facts.controller_api.as_ref().ok_or_else(|| {
            OvsOdlError::Config("controller-api relation is not available".to_string())
        })?;
        let client = (self.controllers)(connection)?;
        *cached = Some(Arc::clone(&client));
        Ok(client)
    }
}
