//! Payload published to the principal charm on the neutron-plugin relation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub const PLUGIN_NAME: &str = "ovs-odl";
pub const PRINCIPAL_SERVICE: &str = "nova-compute";
pub const NOVA_CONF: &str = "/etc/nova/nova.conf";

/// Settings for one configuration file of the principal service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalConfigFile {
    /// Section name to ordered `(key, value)` entries
    pub sections: IndexMap<String, Vec<(String, String)>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeutronPluginConfig {
    pub plugin: String,
    /// Service name to file path to file settings
    pub config: IndexMap<String, IndexMap<String, PrincipalConfigFile>>,
}

pub fn neutron_plugin_config() -> NeutronPluginConfig {
    let mut nova_conf = PrincipalConfigFile::default();
    nova_conf.sections.insert(
        "DEFAULT".to_string(),
        vec![
            (
                "firewall_driver".to_string(),
                "nova.virt.firewall.NoopFirewallDriver".to_string(),
            ),
            (
                "libvirt_vif_driver".to_string(),
                "nova.virt.libvirt.vif.LibvirtGenericVIFDriver".to_string(),
            ),
            ("security_group_api".to_string(), "neutron".to_string()),
        ],
    );

    let mut files = IndexMap::new();
    files.insert(NOVA_CONF.to_string(), nova_conf);

    let mut config = IndexMap::new();
    config.insert(PRINCIPAL_SERVICE.to_string(), files);

    NeutronPluginConfig {
        plugin: PLUGIN_NAME.to_string(),
        config,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_neutron_plugin_payload() {
        let payload = serde_json::to_value(neutron_plugin_config()).unwrap();
        assert_eq!(
            payload,
            json!({
                "plugin": "ovs-odl",
                "config": {
                    "nova-compute": {
                        "/etc/nova/nova.conf": {
                            "sections": {
                                "DEFAULT": [
                                    ["firewall_driver", "nova.virt.firewall.NoopFirewallDriver"],
                                    ["libvirt_vif_driver", "nova.virt.libvirt.vif.LibvirtGenericVIFDriver"],
                                    ["security_group_api", "neutron"]
                                ]
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_default_section_order() {
        let config = neutron_plugin_config();
        let keys: Vec<&str> = config.config[PRINCIPAL_SERVICE][NOVA_CONF].sections["DEFAULT"]
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(
            keys,
            vec!["firewall_driver", "libvirt_vif_driver", "security_group_api"]
        );
    }
}
