use anyhow::Result;

use ovs_odl_charm::neutron_plugin_config;

/// Prints the neutron-plugin relation payload
pub struct NeutronPluginCommand;

impl NeutronPluginCommand {
    pub fn execute(&self) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(&neutron_plugin_config())?);
        Ok(())
    }
}
