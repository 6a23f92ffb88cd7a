//! Configuration for the mailbox access layer and the control daemon
//!
//! Deployments differ only in how the backing device is bound and which
//! network interface feeds the identity record, so everything here is plain
//! data: a TOML file (`--config`) merged with environment overrides.

use std::{path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::{MailboxError, Result};

/// Device-tree compatibility identifier of the mailbox EEPROM
pub const DEFAULT_COMPAT_ID: &str = "desy,mmcmailbox";

/// Platform view of bus-attached I2C devices
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/bus/i2c/devices";

/// Fixed peripheral address of the mailbox EEPROM on its adapter
pub const DEFAULT_EEPROM_ADDR: u16 = 0x0040;

/// Backplane interface published into the mailbox when none is configured
pub const DEFAULT_INTERFACE: &str = "eth0";

/// Control register poll period (4 polls per second)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

/// How the backing device is located; exactly one strategy is active
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStrategy {
    /// Scan bus-attached devices for an exactly matching identity string
    CompatibleId(String),
    /// Scan bus adapters for a name containing this substring, then derive
    /// the peripheral path from the fixed address convention
    AdapterName(String),
    /// Use a configured absolute path directly, skipping discovery
    FixedPath(PathBuf),
}

impl Default for DiscoveryStrategy {
    fn default() -> Self {
        Self::CompatibleId(DEFAULT_COMPAT_ID.to_string())
    }
}

/// Settings of the mailbox access layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailboxConfig {
    pub strategy: DiscoveryStrategy,
    /// Root of the platform device tree view; tests point this at a fixture
    pub sysfs_root: PathBuf,
    /// Peripheral bus address used by the adapter-name strategy
    pub eeprom_addr: u16,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            strategy: DiscoveryStrategy::default(),
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            eeprom_addr: DEFAULT_EEPROM_ADDR,
        }
    }
}

impl MailboxConfig {
    pub fn with_fixed_path(path: impl Into<PathBuf>) -> Self {
        Self {
            strategy: DiscoveryStrategy::FixedPath(path.into()),
            ..Self::default()
        }
    }
}

/// Settings of the control daemon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub mailbox: MailboxConfig,
    /// Interface whose addresses are republished every poll cycle
    pub interface: String,
    pub poll_interval_ms: u64,
    /// Detach via double fork; disable under a supervisor that manages this
    pub detach: bool,
    /// Platform shutdown action, argv style
    pub shutdown_command: Vec<String>,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            mailbox: MailboxConfig::default(),
            interface: DEFAULT_INTERFACE.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            detach: true,
            shutdown_command: vec![
                "/sbin/shutdown".to_string(),
                "-h".to_string(),
                "now".to_string(),
            ],
        }
    }
}

impl DaemonConfig {
    /// Parse a TOML configuration file
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MailboxError::config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&raw)
            .map_err(|e| MailboxError::config(format!("{}: {}", path.display(), e)))
    }

    /// Apply environment overrides on top of file/default settings.
    ///
    /// `MB_EEPROM_PATH` wins over `MB_ADAPTER_NAME` wins over `MB_COMPAT_ID`,
    /// so at most one strategy stays active.
    pub fn apply_env(&mut self) {
        if let Ok(ifname) = std::env::var("BP_ETH_IFNAME") {
            if !ifname.is_empty() {
                self.interface = ifname;
            }
        }
        if let Ok(id) = std::env::var("MB_COMPAT_ID") {
            self.mailbox.strategy = DiscoveryStrategy::CompatibleId(id);
        }
        if let Ok(name) = std::env::var("MB_ADAPTER_NAME") {
            self.mailbox.strategy = DiscoveryStrategy::AdapterName(name);
        }
        if let Ok(path) = std::env::var("MB_EEPROM_PATH") {
            self.mailbox.strategy = DiscoveryStrategy::FixedPath(PathBuf::from(path));
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DaemonConfig::default();
        assert_eq!(config.interface, "eth0");
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert!(config.detach);
        assert_eq!(config.shutdown_command[0], "/sbin/shutdown");
        assert_eq!(
            config.mailbox.strategy,
            DiscoveryStrategy::CompatibleId(DEFAULT_COMPAT_ID.to_string())
        );
    }

    #[test]
    fn test_toml_roundtrip() {
        let parsed: DaemonConfig = toml::from_str(
            r#"
            interface = "bp0"
            poll_interval_ms = 500
            detach = false

            [mailbox]
            strategy = { fixed_path = "/dev/mmc-mailbox" }
            "#,
        )
        .unwrap();
        assert_eq!(parsed.interface, "bp0");
        assert_eq!(parsed.poll_interval_ms, 500);
        assert!(!parsed.detach);
        assert_eq!(
            parsed.mailbox.strategy,
            DiscoveryStrategy::FixedPath(PathBuf::from("/dev/mmc-mailbox"))
        );
        // untouched fields keep their defaults
        assert_eq!(parsed.mailbox.eeprom_addr, DEFAULT_EEPROM_ADDR);
        assert_eq!(parsed.shutdown_command.len(), 3);
    }

    #[test]
    fn test_env_precedence() {
        std::env::set_var("MB_COMPAT_ID", "acme,mailbox");
        std::env::set_var("MB_EEPROM_PATH", "/tmp/mb");
        let mut config = DaemonConfig::default();
        config.apply_env();
        assert_eq!(
            config.mailbox.strategy,
            DiscoveryStrategy::FixedPath(PathBuf::from("/tmp/mb"))
        );
        std::env::remove_var("MB_COMPAT_ID");
        std::env::remove_var("MB_EEPROM_PATH");
    }
}
