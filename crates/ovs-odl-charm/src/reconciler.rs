//! Device and MAC registration against the SDN controller
//!
//! The controller owns the registration state. Every call queries it and
//! issues only the registrations that are missing, so re-running a pass is
//! harmless as long as the controller's queries reflect earlier writes.

use ipnet::IpNet;
use log::info;
use serde::Serialize;
use tokio::sync::Mutex;

use ovs_odl_core::{ControllerClient, LocalInventory, Result};
use ovs_odl_types::{DeviceIdentity, DeviceType, MacBinding};

/// Outcome of a node registration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRegistration {
    Registered,
    AlreadyRegistered,
}

/// Outcome of a MAC registration pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MacRegistrationSummary {
    pub registered: Vec<MacBinding>,
    pub already_registered: Vec<MacBinding>,
}

/// Registers the local device and its MAC bindings with the controller.
///
/// The check-then-register sequence of each pass runs under a per-instance
/// lock. Invocations from separate processes are not serialised; the
/// orchestration runtime is expected to run one hook per unit at a time.
pub struct RegistrationReconciler {
    device_type: DeviceType,
    lock: Mutex<()>,
}

impl RegistrationReconciler {
    pub fn new() -> Self {
        Self::with_device_type(DeviceType::Ovs)
    }

    pub fn with_device_type(device_type: DeviceType) -> Self {
        Self {
            device_type,
            lock: Mutex::new(()),
        }
    }

    /// Register `identity` unless the controller already knows it
    pub async fn register_node(
        &self,
        controller: &dyn ControllerClient,
        identity: &DeviceIdentity,
    ) -> Result<NodeRegistration> {
        let _guard = self.lock.lock().await;

        if controller.is_device_registered(&identity.hostname).await? {
            info!("{} is already registered in odl", identity.hostname);
            return Ok(NodeRegistration::AlreadyRegistered);
        }

        info!(
            "Registering {} ({}) in odl",
            identity.hostname, identity.data_plane_address
        );
        controller
            .register_device(&identity.hostname, identity.data_plane_address)
            .await?;
        Ok(NodeRegistration::Registered)
    }

    /// Register every binding the controller does not report yet.
    ///
    /// Fail-fast: the first query or registration error aborts the pass and
    /// leaves the remaining bindings for the next invocation.
    pub async fn register_macs(
        &self,
        controller: &dyn ControllerClient,
        identity: &DeviceIdentity,
        bindings: &[MacBinding],
    ) -> Result<MacRegistrationSummary> {
        let _guard = self.lock.lock().await;
        self.register_bindings(controller, &identity.hostname, bindings)
            .await
    }

    /// Node registration with the identity taken from the local inventory.
    ///
    /// The data-plane address is only resolved when a registration is due.
    pub async fn register_node_from_inventory(
        &self,
        controller: &dyn ControllerClient,
        inventory: &dyn LocalInventory,
        data_network: Option<IpNet>,
    ) -> Result<NodeRegistration> {
        let _guard = self.lock.lock().await;

        let hostname = inventory.hostname().await?;
        if controller.is_device_registered(&hostname).await? {
            info!("{} is already registered in odl", hostname);
            return Ok(NodeRegistration::AlreadyRegistered);
        }

        let address = inventory.data_plane_address(data_network).await?;
        info!("Registering {} ({}) in odl", hostname, address);
        controller.register_device(&hostname, address).await?;
        Ok(NodeRegistration::Registered)
    }

    /// MAC registration with host name and bindings from the local inventory
    pub async fn register_macs_from_inventory(
        &self,
        controller: &dyn ControllerClient,
        inventory: &dyn LocalInventory,
    ) -> Result<MacRegistrationSummary> {
        let _guard = self.lock.lock().await;

        info!("Looking for macs to register with networks in odl");
        let hostname = inventory.hostname().await?;
        let bindings = inventory.local_interface_config().await?.bindings();
        self.register_bindings(controller, &hostname, &bindings)
            .await
    }

    async fn register_bindings(
        &self,
        controller: &dyn ControllerClient,
        hostname: &str,
        bindings: &[MacBinding],
    ) -> Result<MacRegistrationSummary> {
        let mut summary = MacRegistrationSummary::default();

        for binding in bindings {
            let registered = controller
                .is_net_device_registered(
                    &binding.network,
                    hostname,
                    &binding.interface,
                    &binding.mac,
                    self.device_type,
                )
                .await?;

            if registered {
                info!(
                    "{} already registered for {} on {}",
                    binding.network, binding.interface, hostname
                );
                summary.already_registered.push(binding.clone());
                continue;
            }

            info!(
                "Registering {} and {} on {}",
                binding.network, binding.interface, binding.mac
            );
            controller
                .register_net_device(
                    hostname,
                    &binding.network,
                    &binding.interface,
                    &binding.mac,
                    self.device_type,
                )
                .await?;
            summary.registered.push(binding.clone());
        }

        Ok(summary)
    }
}

impl Default for RegistrationReconciler {
    fn default() -> Self {
        Self::new()
    }
}
