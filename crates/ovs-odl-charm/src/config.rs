//! Charm configuration
//!
//! Loaded once per invocation and passed explicitly to the operations that
//! need it.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::Source;
use ipnet::IpNet;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use ovs_odl_types::{parse_mac_network_map, MacNetworkEntry};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/ovs-odl/config.toml";
pub const ENV_PREFIX: &str = "OVS_ODL";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid mac-network-map: {0}")]
    MacNetworkMap(#[from] ovs_odl_types::SharedTypeError),

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharmConfig {
    /// CIDR of the data network; the local address inside it becomes the
    /// tunnel endpoint and the address registered with the controller
    pub os_data_network: Option<IpNet>,

    /// Whitespace separated `<mac>;<network>` pairs
    pub mac_network_map: String,

    /// Address used when no data network is configured
    pub private_address: Option<IpAddr>,

    pub ovs_vsctl: PathBuf,

    pub sysfs_root: PathBuf,

    pub hostname_path: PathBuf,

    /// Where the dispatcher keeps its flags between invocations
    pub state_file: PathBuf,

    /// HTTP timeout for controller requests, in seconds
    pub controller_timeout: u64,
}

impl Default for CharmConfig {
    fn default() -> Self {
        Self {
            os_data_network: None,
            mac_network_map: String::new(),
            private_address: None,
            ovs_vsctl: PathBuf::from("/usr/bin/ovs-vsctl"),
            sysfs_root: PathBuf::from("/sys"),
            hostname_path: PathBuf::from("/proc/sys/kernel/hostname"),
            state_file: PathBuf::from("/var/lib/ovs-odl/state.json"),
            controller_timeout: 30,
        }
    }
}

impl CharmConfig {
    /// Load from `path` (optional) with `OVS_ODL_*` environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_string_lossy().to_string();
        let file = config::Config::builder()
            .add_source(config::File::new(&path, config::FileFormat::Toml).required(false))
            .build()?;

        // Option names are kebab-case in the file and snake_case in the
        // environment; fold both onto the field names
        let mut builder = config::Config::builder();
        for (key, value) in file.collect()? {
            builder = builder.set_default(key.replace('-', "_"), value)?;
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: CharmConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.controller_timeout == 0 {
            return Err(ConfigError::Invalid {
                field: "controller-timeout".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        self.mac_network_entries()?;
        Ok(())
    }

    pub fn mac_network_entries(&self) -> Result<Vec<MacNetworkEntry>, ConfigError> {
        Ok(parse_mac_network_map(&self.mac_network_map)?)
    }

    pub fn controller_timeout(&self) -> Duration {
        Duration::from_secs(self.controller_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::TempDir;

    // Loading reads the process environment, which the override test changes
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Sets variables for the lifetime of the guard, restoring previous values on drop
    struct EnvOverride {
        saved: Vec<(&'static str, Option<String>)>,
    }

    impl EnvOverride {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            let saved = vars
                .iter()
                .map(|(key, value)| {
                    let previous = std::env::var(key).ok();
                    std::env::set_var(key, value);
                    (*key, previous)
                })
                .collect();
            Self { saved }
        }
    }

    impl Drop for EnvOverride {
        fn drop(&mut self) {
            for (key, previous) in &self.saved {
                match previous {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }

    #[test]
    fn test_default_config() {
        let config = CharmConfig::default();
        assert!(config.os_data_network.is_none());
        assert!(config.mac_network_entries().unwrap().is_empty());
        assert_eq!(config.controller_timeout(), Duration::from_secs(30));
        config.validate().unwrap();
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let _lock = env_lock();
        let dir = TempDir::new().unwrap();
        let config = CharmConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.ovs_vsctl, PathBuf::from("/usr/bin/ovs-vsctl"));
    }

    #[test]
    fn test_load_from_file() {
        let _lock = env_lock();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
os-data-network = "10.1.1.0/24"
mac-network-map = "00:11:22:33:44:55;physnet1"
state-file = "/tmp/ovs-odl-state.json"
controller-timeout = 10
"#,
        )
        .unwrap();

        let config = CharmConfig::load(&path).unwrap();
        assert_eq!(
            config.os_data_network,
            Some("10.1.1.0/24".parse().unwrap())
        );
        assert_eq!(config.mac_network_entries().unwrap().len(), 1);
        assert_eq!(config.state_file, PathBuf::from("/tmp/ovs-odl-state.json"));
        assert_eq!(config.controller_timeout, 10);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = CharmConfig {
            controller_timeout: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CharmConfig {
            mac_network_map: "00:11:22:33:44:55".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MacNetworkMap(_))
        ));
    }

    #[test]
    fn test_environment_overrides_file() {
        let _lock = env_lock();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
os-data-network = "10.1.1.0/24"
controller-timeout = 10
"#,
        )
        .unwrap();

        let _env = EnvOverride::set(&[
            ("OVS_ODL_OS_DATA_NETWORK", "192.168.10.0/24"),
            ("OVS_ODL_CONTROLLER_TIMEOUT", "15"),
            ("OVS_ODL_PRIVATE_ADDRESS", "10.5.0.2"),
        ]);

        let config = CharmConfig::load(&path).unwrap();
        assert_eq!(
            config.os_data_network,
            Some("192.168.10.0/24".parse().unwrap())
        );
        assert_eq!(config.controller_timeout, 15);
        assert_eq!(config.controller_timeout(), Duration::from_secs(15));
        assert_eq!(config.private_address, Some("10.5.0.2".parse().unwrap()));
    }
}
