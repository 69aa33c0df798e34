//! Open vSwitch ODL agent
//!
//! Points the local Open vSwitch at an OpenDaylight OVSDB manager and keeps
//! the node and its MAC bindings registered with the controller.

pub mod config;
pub mod dispatcher;
pub mod neutron;
pub mod reconciler;
pub mod state;
pub mod switch;

#[cfg(test)]
mod tests;

pub use config::{CharmConfig, ConfigError, DEFAULT_CONFIG_PATH};
pub use dispatcher::{
    planned_actions, Action, ControllerFactory, DispatchReport, Dispatcher, Facts,
};
pub use neutron::{neutron_plugin_config, NeutronPluginConfig, PrincipalConfigFile};
pub use reconciler::{MacRegistrationSummary, NodeRegistration, RegistrationReconciler};
pub use state::{CharmState, StateStore};
pub use switch::SwitchToggle;
