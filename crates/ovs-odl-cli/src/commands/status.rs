//! Status command

use std::sync::Arc;

use anyhow::{bail, Result};
use serde::Serialize;

use ovs_odl_charm::CharmState;
use ovs_odl_types::WorkloadStatus;

use crate::context::AppContext;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub state: CharmState,
    pub status: WorkloadStatus,
    pub os_data_network: Option<String>,
    pub mac_network_map: Vec<String>,
}

pub struct StatusCommand {
    context: Arc<AppContext>,
}

impl StatusCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    pub async fn report(&self) -> Result<StatusReport> {
        let state = self.context.state_store.load().await?;
        let status = if state.ovs_configured {
            WorkloadStatus::ready()
        } else {
            WorkloadStatus::not_configured()
        };

        let mac_network_map = self
            .context
            .config
            .mac_network_entries()?
            .iter()
            .map(|entry| format!("{} -> {}", entry.mac, entry.network))
            .collect();

        Ok(StatusReport {
            state,
            status,
            os_data_network: self.context.config.os_data_network.map(|n| n.to_string()),
            mac_network_map,
        })
    }

    pub async fn execute(&self, format: &str) -> Result<()> {
        let report = self.report().await?;

        match format {
            "json" => println!("{}", serde_json::to_string_pretty(&report)?),
            "text" => {
                println!("{:<18} {}", "Status:", report.status);
                println!(
                    "{:<18} {}",
                    "OVS configured:",
                    if report.state.ovs_configured { "yes" } else { "no" }
                );
                println!(
                    "{:<18} {}",
                    "Data network:",
                    report.os_data_network.as_deref().unwrap_or("-")
                );
                if report.mac_network_map.is_empty() {
                    println!("{:<18} -", "MAC mappings:");
                } else {
                    println!("MAC mappings:");
                    for mapping in &report.mac_network_map {
                        println!("  {}", mapping);
                    }
                }
            }
            other => bail!("Unsupported output format '{}'", other),
        }
        Ok(())
    }
}
