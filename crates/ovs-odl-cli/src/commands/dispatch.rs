//! Dispatch command

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;

use ovs_odl_charm::Facts;

use crate::context::AppContext;

/// Runs every handler whose conditions hold for the given facts
pub struct DispatchCommand {
    context: Arc<AppContext>,
}

impl DispatchCommand {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    /// `facts_path` of `-` reads the facts from stdin
    pub async fn execute(&self, facts_path: &Path) -> Result<()> {
        let facts = read_facts(facts_path).await?;
        let store = &self.context.state_store;
        let mut state = store
            .load()
            .await
            .with_context(|| format!("Failed to load state from {}", store.path().display()))?;

        let result = self.context.dispatcher().dispatch(&facts, &mut state).await;

        // Persist whatever completed, including on failure
        store
            .save(&state)
            .await
            .with_context(|| format!("Failed to save state to {}", store.path().display()))?;

        let report = result.context("Dispatch failed")?;
        if let Some(status) = &report.status {
            log::info!("Workload status: {}", status);
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

pub async fn read_facts(path: &Path) -> Result<Facts> {
    let content = if path == Path::new("-") {
        let mut content = String::new();
        tokio::io::stdin()
            .read_to_string(&mut content)
            .await
            .context("Failed to read facts from stdin")?;
        content
    } else {
        tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read facts from {}", path.display()))?
    };

    serde_json::from_str(&content).context("Invalid facts document")
}
