//! Pipeline configuration
//!
//! Loaded once at startup and shared read-only by every request. All maps
//! are ordered so the generated scripts do not depend on hash order.

use crate::context::normalize_mac;
use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default rootfs root
pub const DEFAULT_ROOTFS_PATH: &str = "/rootfs";

/// Default main menu timeout in milliseconds
pub const DEFAULT_MENU_TIMEOUT_MS: u64 = 10_000;

fn default_cmdline_templates() -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            "nfsrw".to_string(),
            "root=/dev/nfs nfsroot=${nfs-server}:${rootfs-path} ip=dhcp rw".to_string(),
        ),
        (
            "ovl".to_string(),
            "root=/dev/nfs nfsroot=${nfs-server}:${rootfs-path} ip=dhcp rootovl".to_string(),
        ),
    ])
}

/// Locations of the iPXE binaries served by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootloaderPaths {
    /// Served as `ipxe.efi`
    pub efi: Option<PathBuf>,
    /// Served as `undionly.kpxe`
    pub bios: Option<PathBuf>,
}

/// Menu and file serving configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Root of the `<distro>/<release>/boot` tree
    pub rootfs_path: PathBuf,

    /// Menu entry preselected for every client, e.g. `debian/bookworm/latest/nfsrw`
    pub default_image: Option<String>,

    /// Emitted as `set <name> <value>` at the top of every script
    pub env: BTreeMap<String, String>,

    /// Kernel command lines by name; one menu leaf per template and image
    pub cmdline_templates: BTreeMap<String, String>,

    /// Per-MAC replacement for `default_image`
    pub host_defaults: BTreeMap<String, String>,

    /// Main menu timeout
    pub menu_timeout_ms: u64,

    /// iPXE binaries
    pub bootloaders: BootloaderPaths,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rootfs_path: PathBuf::from(DEFAULT_ROOTFS_PATH),
            default_image: None,
            env: BTreeMap::new(),
            cmdline_templates: default_cmdline_templates(),
            host_defaults: BTreeMap::new(),
            menu_timeout_ms: DEFAULT_MENU_TIMEOUT_MS,
            bootloaders: BootloaderPaths::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a config serving the given rootfs root
    pub fn new(rootfs_path: impl Into<PathBuf>) -> Self {
        Self {
            rootfs_path: rootfs_path.into(),
            ..Default::default()
        }
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a YAML config file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| PipelineError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml_str(&yaml)
    }

    /// Set the rootfs root
    pub fn with_rootfs_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.rootfs_path = path.into();
        self
    }

    /// Set the default image
    pub fn with_default_image(mut self, id: impl Into<String>) -> Self {
        self.default_image = Some(id.into());
        self
    }

    /// Add a script variable
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }

    /// Replace all command line templates
    pub fn with_cmdline_templates(mut self, templates: BTreeMap<String, String>) -> Self {
        self.cmdline_templates = templates;
        self
    }

    /// Add or replace one command line template
    pub fn with_cmdline_template(
        mut self,
        name: impl Into<String>,
        cmdline: impl Into<String>,
    ) -> Self {
        self.cmdline_templates.insert(name.into(), cmdline.into());
        self
    }

    /// Override the default image for one MAC
    pub fn with_host_default(mut self, mac: impl Into<String>, id: impl Into<String>) -> Self {
        self.host_defaults.insert(mac.into(), id.into());
        self
    }

    /// Set the main menu timeout
    pub fn with_menu_timeout_ms(mut self, timeout: u64) -> Self {
        self.menu_timeout_ms = timeout;
        self
    }

    /// Set the iPXE binary locations
    pub fn with_bootloaders(mut self, bootloaders: BootloaderPaths) -> Self {
        self.bootloaders = bootloaders;
        self
    }

    /// Default image for a client: its host override, else the global default
    pub fn default_image_for(&self, mac: Option<&str>) -> Option<&str> {
        if let Some(mac) = mac.map(normalize_mac) {
            let host = self
                .host_defaults
                .iter()
                .find(|(k, _)| normalize_mac(k) == mac)
                .map(|(_, v)| v.as_str());
            if host.is_some() {
                return host;
            }
        }
        self.default_image.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = PipelineConfig::default();

        assert_eq!(config.rootfs_path, PathBuf::from("/rootfs"));
        assert_eq!(config.menu_timeout_ms, 10_000);
        assert!(config.default_image.is_none());
        assert!(config.env.is_empty());
        assert_eq!(
            config.cmdline_templates.keys().collect::<Vec<_>>(),
            vec!["nfsrw", "ovl"]
        );
    }

    #[test]
    fn test_config_builder() {
        let config = PipelineConfig::new("/srv/rootfs")
            .with_default_image("debian/bookworm/latest/nfsrw")
            .with_env("nfs-server", "172.25.2.10")
            .with_cmdline_template("ram", "ip=dhcp")
            .with_host_default("AA-BB-CC-DD-EE-FF", "ubuntu/noble/latest/ovl")
            .with_menu_timeout_ms(5000);

        assert_eq!(config.rootfs_path, PathBuf::from("/srv/rootfs"));
        assert_eq!(
            config.default_image.as_deref(),
            Some("debian/bookworm/latest/nfsrw")
        );
        assert_eq!(config.env.get("nfs-server").unwrap(), "172.25.2.10");
        assert_eq!(config.cmdline_templates.len(), 3);
        assert_eq!(config.menu_timeout_ms, 5000);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
rootfs_path: /data/rootfs
default_image: debian/bookworm/latest/nfsrw
env:
  nfs-server: 172.25.2.10
cmdline_templates:
  nfs: root=/dev/nfs nfsroot=${nfs-server}:${rootfs-path} ip=dhcp rw
host_defaults:
  aa:bb:cc:dd:ee:ff: ubuntu/noble/latest/nfs
bootloaders:
  efi: /srv/ipxe/ipxe.efi
"#;
        let config = PipelineConfig::from_yaml_str(yaml).unwrap();

        assert_eq!(config.rootfs_path, PathBuf::from("/data/rootfs"));
        assert_eq!(config.cmdline_templates.len(), 1);
        assert_eq!(config.menu_timeout_ms, DEFAULT_MENU_TIMEOUT_MS);
        assert_eq!(
            config.bootloaders.efi,
            Some(PathBuf::from("/srv/ipxe/ipxe.efi"))
        );
        assert!(config.bootloaders.bios.is_none());
    }

    #[test]
    fn test_parse_empty_yaml_uses_defaults() {
        let config = PipelineConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let err = PipelineConfig::from_yaml_str("menu_timeout_ms: soon").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = PipelineConfig::load("/nonexistent/autopxe.yaml")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::ConfigRead { .. }));
    }

    #[test]
    fn test_default_image_for_host_override() {
        let config = PipelineConfig::default()
            .with_default_image("debian/bookworm/latest/nfsrw")
            .with_host_default("AA-BB-CC-DD-EE-FF", "ubuntu/noble/latest/ovl");

        assert_eq!(
            config.default_image_for(Some("aa:bb:cc:dd:ee:ff")),
            Some("ubuntu/noble/latest/ovl")
        );
        assert_eq!(
            config.default_image_for(Some("00:11:22:33:44:55")),
            Some("debian/bookworm/latest/nfsrw")
        );
        assert_eq!(
            config.default_image_for(None),
            Some("debian/bookworm/latest/nfsrw")
        );
        assert_eq!(PipelineConfig::default().default_image_for(None), None);
    }
}
