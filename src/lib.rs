//! # mmcbox - MMC Mailbox Access Library & Control Daemon
//!
//! mmcbox exchanges structured telemetry and control data between host-side
//! software and an FPGA/MMC subsystem through a small shared memory region
//! exposed as a byte-addressable EEPROM on an I2C bus.
//!
//! ## Features
//!
//! - **Fixed, versioned memory map**: packed little-endian layout shared
//!   byte-for-byte with the MMC firmware, verified before any access
//! - **Typed accessors**: bounds-checked reads/writes for FRU, sensor,
//!   MMC-information, network-identity and FPGA control/status records
//! - **Device discovery**: identity-scan, adapter-name-scan or fixed path,
//!   resolved once and cached for the process lifetime
//! - **Control daemon**: privilege enforcement, detachment, signal-driven
//!   termination, 250 ms control-register polling, shutdown handling and
//!   network-identity republishing
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │               Mailbox region (2047 B)            │
//! │  magic/version │ FRU x4 │ app data │ MMC info    │
//! │  sensors x40   │ net identity │ ctrl │ status    │
//! └──────────────────────────────────────────────────┘
//!          ▲ read                    ▲ read/write
//! ┌─────────────────┐     ┌──────────────────────────┐
//! │   Report CLI    │     │      Control daemon      │
//! │   (read-only)   │     │  (single mailbox writer) │
//! └─────────────────┘     └──────────────────────────┘
//! ```
//!
//! Cross-process, the mailbox is single-writer/multi-reader by convention:
//! exactly one daemon instance writes, any number of inspection processes
//! read. The protocol defines no locking; concurrent readers may observe a
//! torn multi-byte record while the writer is mid-transfer.

pub mod config;
pub mod daemon;
pub mod error;
pub mod layout;
pub mod mailbox;
pub mod netinfo;

// Main API re-exports
pub use config::{DaemonConfig, DiscoveryStrategy, MailboxConfig};
pub use daemon::{ControlDaemon, DaemonState, PollOutcome};
pub use error::{MailboxError, Result};
pub use layout::{
    FpgaControl, FpgaStatus, FruDescription, FruStatus, MagicHeader, MmcInformation, MmcSensor,
    NetworkIdentity, VersionNumber,
};
pub use mailbox::Mailbox;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
