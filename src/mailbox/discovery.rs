//! Backing-device discovery over the platform bus view
//!
//! The mailbox EEPROM shows up as a byte-addressable attribute of an I2C
//! peripheral. How that peripheral is bound varies by platform, so three
//! strategies exist; the access layer caches whatever path comes back.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    config::{DiscoveryStrategy, MailboxConfig},
    error::{MailboxError, Result},
};

/// Sysfs attribute holding a peripheral's device-tree identity string
const NODE_COMPATIBLE: &str = "of_node/compatible";

/// Sysfs attribute holding an adapter's name
const NODE_ADAPTER_NAME: &str = "name";

/// Byte-addressable attribute of the selected peripheral
const NODE_EEPROM: &str = "eeprom";

/// Directory prefix distinguishing adapters from peripherals
const ADAPTER_PREFIX: &str = "i2c-";

/// Resolve the backing device path for the configured strategy
pub(crate) fn discover(config: &MailboxConfig) -> Result<PathBuf> {
    match &config.strategy {
        DiscoveryStrategy::FixedPath(path) => Ok(path.clone()),
        DiscoveryStrategy::CompatibleId(id) => scan_compatible(&config.sysfs_root, id),
        DiscoveryStrategy::AdapterName(substr) => {
            scan_adapters(&config.sysfs_root, substr, config.eeprom_addr)
        }
    }
}

/// Device entries in name order; sysfs iteration order is not stable, and
/// "first match" needs a defined order to be meaningful
fn sorted_entries(root: &Path) -> Result<Vec<String>> {
    let dir = fs::read_dir(root).map_err(|e| {
        MailboxError::device_not_found(format!("could not list {}: {}", root.display(), e))
    })?;
    let mut names: Vec<String> = dir
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .collect();
    names.sort();
    Ok(names)
}

/// Identity-scan: first peripheral whose identity string exactly equals `id`
fn scan_compatible(root: &Path, id: &str) -> Result<PathBuf> {
    for name in sorted_entries(root)? {
        // Skip hidden entries and the adapter directories
        if name.starts_with('.') || name.starts_with(ADAPTER_PREFIX) {
            continue;
        }
        let compat_path = root.join(&name).join(NODE_COMPATIBLE);
        let raw = match fs::read(&compat_path) {
            Ok(raw) => raw,
            Err(_) => continue,
        };
        // Identity strings are NUL-terminated in sysfs
        let compat = raw.split(|&b| b == 0).next().unwrap_or(&[]);
        if compat == id.as_bytes() {
            return Ok(root.join(&name).join(NODE_EEPROM));
        }
    }
    Err(MailboxError::device_not_found(format!(
        "no device compatible with '{}' under {}",
        id,
        root.display()
    )))
}

/// Adapter-name-scan: first adapter whose name contains `substr`, peripheral
/// path derived from the fixed address convention `<bus>-<addr:04x>`
fn scan_adapters(root: &Path, substr: &str, eeprom_addr: u16) -> Result<PathBuf> {
    for name in sorted_entries(root)? {
        let bus_nr = match name.strip_prefix(ADAPTER_PREFIX) {
            Some(nr) => nr,
            None => continue,
        };
        let adapter_name = match fs::read_to_string(root.join(&name).join(NODE_ADAPTER_NAME)) {
            Ok(s) => s,
            Err(_) => continue,
        };
        if adapter_name.contains(substr) {
            let peripheral = format!("{}-{:04x}", bus_nr, eeprom_addr);
            return Ok(root.join(peripheral).join(NODE_EEPROM));
        }
    }
    Err(MailboxError::device_not_found(format!(
        "no adapter named like '{}' under {}",
        substr,
        root.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    fn fixture_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();

        // adapter
        fs::create_dir_all(root.join("i2c-0")).unwrap();
        fs::write(root.join("i2c-0/name"), "xiic-i2c 40800000.i2c\n").unwrap();

        // unrelated peripheral
        fs::create_dir_all(root.join("0-0050/of_node")).unwrap();
        fs::write(root.join("0-0050/of_node/compatible"), b"atmel,24c02\0").unwrap();

        // the mailbox peripheral at the fixed address
        fs::create_dir_all(root.join("0-0040/of_node")).unwrap();
        fs::write(root.join("0-0040/of_node/compatible"), b"desy,mmcmailbox\0").unwrap();
        File::create(root.join("0-0040/eeprom"))
            .unwrap()
            .write_all(&[0u8; 16])
            .unwrap();

        dir
    }

    #[test]
    fn test_scan_compatible_finds_device() {
        let dir = fixture_tree();
        let path = scan_compatible(dir.path(), "desy,mmcmailbox").unwrap();
        assert_eq!(path, dir.path().join("0-0040/eeprom"));
    }

    #[test]
    fn test_scan_compatible_exact_match_only() {
        let dir = fixture_tree();
        let err = scan_compatible(dir.path(), "desy,mmc").unwrap_err();
        assert!(matches!(err, MailboxError::DeviceNotFound { .. }));
    }

    #[test]
    fn test_scan_adapters_derives_path() {
        let dir = fixture_tree();
        let path = scan_adapters(dir.path(), "xiic", 0x0040).unwrap();
        assert_eq!(path, dir.path().join("0-0040/eeprom"));
    }

    #[test]
    fn test_scan_adapters_no_match() {
        let dir = fixture_tree();
        let err = scan_adapters(dir.path(), "cadence", 0x0040).unwrap_err();
        assert!(matches!(err, MailboxError::DeviceNotFound { .. }));
    }

    #[test]
    fn test_fixed_path_skips_discovery() {
        let config = MailboxConfig::with_fixed_path("/dev/null");
        assert_eq!(discover(&config).unwrap(), PathBuf::from("/dev/null"));
    }
}
