//! Open vSwitch ODL agent drivers
//!
//! Concrete collaborators: the controller's RESTCONF API, ovs-vsctl and the
//! local host inventory

pub mod inventory;
pub mod odl;
pub mod ovs;

pub use inventory::HostInventory;
pub use odl::OdlRestClient;
pub use ovs::OvsVsctl;
