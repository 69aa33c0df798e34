pub mod error;
pub mod network;
pub mod odl;
pub mod status;

pub use error::SharedTypeError;
pub use network::{
    parse_mac_network_map, DeviceIdentity, LocalInterfaceConfig, MacAddr, MacBinding,
    MacNetworkEntry, NetworkAttachment,
};
pub use odl::{ControllerConnection, DeviceType, OvsdbManager, DEFAULT_ODL_PORT};
pub use status::{WorkloadState, WorkloadStatus, NOT_CONFIGURED_MESSAGE, READY_MESSAGE};
