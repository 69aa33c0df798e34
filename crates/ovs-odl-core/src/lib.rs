//! Open vSwitch ODL agent core
//!
//! Error taxonomy and the collaborator interfaces the reconciler is built on

pub mod controller;
pub mod error;
pub mod inventory;
pub mod switch;

pub use controller::ControllerClient;
pub use error::{ControllerError, InventoryError, OvsOdlError, SwitchConfigurationError};
pub use inventory::LocalInventory;
pub use switch::{SwitchConfigurator, EXTERNAL_IDS_TABLE, OTHER_CONFIG_TABLE};

#[cfg(any(test, feature = "mock"))]
pub use controller::MockControllerClient;
#[cfg(any(test, feature = "mock"))]
pub use inventory::MockLocalInventory;
#[cfg(any(test, feature = "mock"))]
pub use switch::MockSwitchConfigurator;

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, OvsOdlError>;
