//! Controller registration commands

use std::sync::Arc;

use anyhow::{Context, Result};

use ovs_odl_charm::{NodeRegistration, RegistrationReconciler};
use ovs_odl_drivers::OdlRestClient;
use ovs_odl_types::ControllerConnection;

use crate::context::AppContext;

pub struct RegisterCommand {
    context: Arc<AppContext>,
    reconciler: RegistrationReconciler,
}

impl RegisterCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self {
            context,
            reconciler: RegistrationReconciler::new(),
        }
    }

    fn client(&self, connection: &ControllerConnection) -> Result<OdlRestClient> {
        OdlRestClient::new(connection, self.context.config.controller_timeout())
            .with_context(|| format!("Failed to create client for {}", connection.base_url()))
    }

    pub async fn node(&self, connection: &ControllerConnection) -> Result<()> {
        let client = self.client(connection)?;
        let outcome = self
            .reconciler
            .register_node_from_inventory(
                &client,
                self.context.inventory.as_ref(),
                self.context.config.os_data_network,
            )
            .await
            .context("Node registration failed")?;

        match outcome {
            NodeRegistration::Registered => println!("Node registered"),
            NodeRegistration::AlreadyRegistered => println!("Node already registered"),
        }
        Ok(())
    }

    pub async fn macs(&self, connection: &ControllerConnection) -> Result<()> {
        let client = self.client(connection)?;
        let summary = self
            .reconciler
            .register_macs_from_inventory(&client, self.context.inventory.as_ref())
            .await
            .context("MAC registration failed")?;

        for binding in &summary.registered {
            println!("registered  {}", binding);
        }
        for binding in &summary.already_registered {
            println!("present     {}", binding);
        }
        Ok(())
    }
}
