//! SDN controller registration interface

use std::net::IpAddr;

use async_trait::async_trait;

use ovs_odl_types::{DeviceType, MacAddr};

use crate::Result;

/// Registration API of the SDN controller.
///
/// Queries must reflect prior writes for the reconciler to stay idempotent.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ControllerClient: Send + Sync {
    /// Whether a device named `hostname` is known to the controller.
    async fn is_device_registered(&self, hostname: &str) -> Result<bool>;

    /// Register the device with its data-plane address.
    async fn register_device(&self, hostname: &str, address: IpAddr) -> Result<()>;

    /// Whether the (network, host, interface, mac, type) binding exists.
    async fn is_net_device_registered(
        &self,
        network: &str,
        hostname: &str,
        interface: &str,
        mac: &MacAddr,
        device_type: DeviceType,
    ) -> Result<bool>;

    async fn register_net_device(
        &self,
        hostname: &str,
        network: &str,
        interface: &str,
        mac: &MacAddr,
        device_type: DeviceType,
    ) -> Result<()>;
}
