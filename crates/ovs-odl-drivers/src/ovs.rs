//! ovs-vsctl integration

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use log::{debug, info, warn};
use tokio::process::Command;

use ovs_odl_core::{
    Result, SwitchConfigurationError, SwitchConfigurator, EXTERNAL_IDS_TABLE, OTHER_CONFIG_TABLE,
};

pub const DEFAULT_OVS_VSCTL: &str = "/usr/bin/ovs-vsctl";

/// Drives the local switch through the ovs-vsctl command line tool
#[derive(Debug, Clone)]
pub struct OvsVsctl {
    /// Path to the ovs-vsctl binary
    program: PathBuf,
    /// Arguments placed before every subcommand, e.g. `--db=...`
    global_args: Vec<String>,
}

impl OvsVsctl {
    pub fn new() -> Self {
        Self::with_program(DEFAULT_OVS_VSCTL)
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            global_args: Vec::new(),
        }
    }

    pub fn with_global_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_args = args.into_iter().map(Into::into).collect();
        self
    }

    fn command_line(&self, args: &[&str]) -> String {
        let mut line = vec![self.program.display().to_string()];
        line.extend(self.global_args.iter().cloned());
        line.extend(args.iter().map(|a| a.to_string()));
        line.join(" ")
    }

    /// Run one ovs-vsctl invocation, returning stdout on success
    async fn run(&self, args: &[&str]) -> Result<String> {
        let command = self.command_line(args);
        debug!("Executing {}", command);

        let output = Command::new(&self.program)
            .args(&self.global_args)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| SwitchConfigurationError::Spawn {
                command: command.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                "{} failed with exit code {:?}: {}",
                command,
                output.status.code(),
                stderr
            );
            return Err(SwitchConfigurationError::CommandFailed {
                command,
                exit_code: output.status.code(),
                stderr,
            }
            .into());
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn set_config(&self, table: &str, key: &str, value: &str) -> Result<()> {
        let column = format!("{}:{}={}", table, key, value);
        self.run(&["set", "Open_vSwitch", ".", &column]).await?;
        Ok(())
    }
}

impl Default for OvsVsctl {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SwitchConfigurator for OvsVsctl {
    async fn set_manager(&self, connection_string: &str) -> Result<()> {
        info!("Setting OVSDB manager to {}", connection_string);
        self.run(&["set-manager", connection_string]).await?;
        Ok(())
    }

    async fn del_manager(&self) -> Result<()> {
        info!("Removing OVSDB manager");
        self.run(&["del-manager"]).await?;
        Ok(())
    }

    async fn set_external_id(&self, key: &str, value: &str) -> Result<()> {
        self.set_config(EXTERNAL_IDS_TABLE, key, value).await
    }

    async fn set_other_config(&self, key: &str, value: &str) -> Result<()> {
        self.set_config(OTHER_CONFIG_TABLE, key, value).await
    }

    async fn list_bridges(&self) -> Result<Vec<String>> {
        let stdout = self.run(&["list-br"]).await?;
        Ok(stdout
            .split_whitespace()
            .map(|bridge| bridge.to_string())
            .collect())
    }

    async fn del_controller(&self, bridge: &str) -> Result<()> {
        info!("Removing controller from bridge {}", bridge);
        self.run(&["del-controller", bridge]).await?;
        Ok(())
    }
}
