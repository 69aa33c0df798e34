//! Flags persisted between dispatcher invocations

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};
use tokio::fs;

use ovs_odl_core::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharmState {
    /// The switch currently points at an OVSDB manager
    pub ovs_configured: bool,
}

/// JSON file holding the [`CharmState`]
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored state; a missing file is the initial state
    pub async fn load(&self) -> Result<CharmState> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No state file at {:?}, starting fresh", self.path);
                Ok(CharmState::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the stored state. The new content is written next to the
    /// target and renamed over it.
    pub async fn save(&self, state: &CharmState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(state)?).await?;
        fs::rename(&temp_path, &self.path).await?;

        debug!("Saved state {:?} to {:?}", state, self.path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_state_file_is_default() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.json"));
        assert_eq!(store.load().await.unwrap(), CharmState::default());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("nested").join("state.json"));

        store
            .save(&CharmState {
                ovs_configured: true,
            })
            .await
            .unwrap();

        let loaded = store.load().await.unwrap();
        assert!(loaded.ovs_configured);
        assert!(!dir.path().join("nested").join("state.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_state_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let store = StateStore::new(path);
        assert!(store.load().await.is_err());
    }
}
