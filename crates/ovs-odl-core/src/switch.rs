//! Local switch configuration interface

use async_trait::async_trait;

use crate::Result;

pub const EXTERNAL_IDS_TABLE: &str = "external_ids";
pub const OTHER_CONFIG_TABLE: &str = "other_config";

/// Operations against the local Open vSwitch database.
///
/// Every call is last-write-wins on the switch side.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait SwitchConfigurator: Send + Sync {
    async fn set_manager(&self, connection_string: &str) -> Result<()>;

    async fn del_manager(&self) -> Result<()>;

    /// Set `external_ids:<key>` on the Open_vSwitch record.
    async fn set_external_id(&self, key: &str, value: &str) -> Result<()>;

    /// Set `other_config:<key>` on the Open_vSwitch record.
    async fn set_other_config(&self, key: &str, value: &str) -> Result<()>;

    async fn list_bridges(&self) -> Result<Vec<String>>;

    async fn del_controller(&self, bridge: &str) -> Result<()>;
}
