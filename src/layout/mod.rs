//! Authoritative definition of the mailbox memory map
//!
//! Pure data contract: offsets, sizes and typed record codecs, no I/O. The
//! map is shared byte-for-byte with the MMC firmware; [`verify`] must pass
//! before any access layer touches the device.

pub mod constants;
pub mod records;

pub use constants::{Field, FIELD_MAP, FORMAT_VERSION, MAGIC, MAILBOX_SIZE};
pub use records::{
    FpgaControl, FpgaStatus, FruDescription, FruStatus, MagicHeader, MmcInformation, MmcSensor,
    NetworkIdentity, VersionNumber,
};

use crate::error::{MailboxError, Result};

/// Verify the layout once at process start.
///
/// Recomputes the packing cumulatively over [`FIELD_MAP`] and checks that
/// every documented offset matches, that the map is gapless, and that the
/// total equals [`MAILBOX_SIZE`]. A failure indicates a structural mismatch
/// between this build and the firmware-side contract and must abort the
/// process before any I/O is attempted.
pub fn verify() -> Result<()> {
    let mut computed = 0usize;
    for field in FIELD_MAP {
        if field.offset != computed {
            return Err(MailboxError::layout_mismatch(format!(
                "field '{}' documented at offset {}, packing computes {}",
                field.name, field.offset, computed
            )));
        }
        computed += field.size;
    }
    if computed != MAILBOX_SIZE {
        return Err(MailboxError::layout_mismatch(format!(
            "total region size {} does not match the fixed constant {}",
            computed, MAILBOX_SIZE
        )));
    }
    Ok(())
}

/// Byte span `[offset, offset+size)` of a named field, for diagnostics
pub fn field(name: &str) -> Option<Field> {
    FIELD_MAP.iter().copied().find(|f| f.name == name)
}
