//! Typed access to the mailbox region over a located backing device
//!
//! Every typed operation issues exactly one positioned transfer covering
//! exactly the bytes of its target field. Bounds are checked against the
//! layout constants before any I/O. Cross-process, the mailbox assumes a
//! single writer (the control daemon) and any number of readers; a reader
//! may observe a torn multi-byte record while the writer is mid-transfer,
//! which the protocol deliberately leaves unprotected.

mod device;
mod discovery;

use std::path::PathBuf;

use once_cell::sync::OnceCell;

use crate::{
    config::MailboxConfig,
    error::{MailboxError, Result},
    layout::{
        constants::{
            fru_description_offset, fru_status_offset, sensor_offset, APPLICATION_DATA_SIZE,
            NUM_FRU_SLOTS, NUM_SENSORS, OFFSET_APPLICATION_DATA, OFFSET_FPGA_CTRL,
            OFFSET_FPGA_STATUS, OFFSET_MAGIC, OFFSET_MMC_INFORMATION, OFFSET_NETWORK_IDENTITY,
            SENSOR_SIZE,
        },
        records::{
            FpgaControl, FpgaStatus, FruDescription, FruStatus, MagicHeader, MmcInformation,
            MmcSensor, NetworkIdentity,
        },
        MAILBOX_SIZE,
    },
};

use device::MailboxDevice;

/// Handle to the mailbox region.
///
/// Discovery and the underlying file handles are lazy: nothing touches the
/// platform until the first operation needs it, and the resolved device is
/// cached for the process lifetime.
pub struct Mailbox {
    config: MailboxConfig,
    device: OnceCell<MailboxDevice>,
}

impl Mailbox {
    pub fn new(config: MailboxConfig) -> Self {
        Self {
            config,
            device: OnceCell::new(),
        }
    }

    /// Resolve (once) and return the backing device
    fn device(&self) -> Result<&MailboxDevice> {
        self.device
            .get_or_try_init(|| discovery::discover(&self.config).map(MailboxDevice::new))
    }

    /// Resolved device path for diagnostics, forcing discovery if needed
    pub fn backing_path(&self) -> Result<PathBuf> {
        Ok(self.device()?.path().to_path_buf())
    }

    /// Check that the backing region is structurally usable.
    ///
    /// The size check goes through file metadata so a wrongly-sized region is
    /// rejected before any device handle exists; only then is the magic tag
    /// read and compared.
    pub fn verify_region(&self) -> Result<()> {
        let device = self.device()?;
        let meta = std::fs::metadata(device.path())
            .map_err(|e| MailboxError::open_failed(device.path(), e))?;
        if meta.len() != MAILBOX_SIZE as u64 {
            return Err(MailboxError::layout_mismatch(format!(
                "backing region is {} bytes, expected {}",
                meta.len(),
                MAILBOX_SIZE
            )));
        }
        let header = self.magic_header()?;
        if !header.is_valid() {
            return Err(MailboxError::MagicMismatch {
                found: header.magic,
            });
        }
        Ok(())
    }

    /// Single positioned read primitive
    pub fn read_at(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.device()?.read_at(offset, len)
    }

    /// Single positioned write primitive
    pub fn write_at(&self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.device()?.write_at(offset, bytes)
    }

    /// Magic tag and format version at the start of the region
    pub fn magic_header(&self) -> Result<MagicHeader> {
        let raw = self.read_at(OFFSET_MAGIC, MagicHeader::SIZE)?;
        Ok(MagicHeader::decode(&raw))
    }

    /// Byte-for-byte comparison of the region tag against the protocol tag
    pub fn check_magic(&self) -> Result<bool> {
        Ok(self.magic_header()?.is_valid())
    }

    pub fn mmc_information(&self) -> Result<MmcInformation> {
        let raw = self.read_at(OFFSET_MMC_INFORMATION, MmcInformation::SIZE)?;
        Ok(MmcInformation::decode(&raw))
    }

    /// Read `count` contiguous sensor entries starting at `first`.
    ///
    /// The whole request must fit the fixed table capacity; there is no
    /// partial-table truncation.
    pub fn sensors(&self, first: usize, count: usize) -> Result<Vec<MmcSensor>> {
        if first + count > NUM_SENSORS {
            return Err(MailboxError::out_of_range(
                "sensor index",
                first + count,
                NUM_SENSORS,
            ));
        }
        let raw = self.read_at(sensor_offset(first), count * SENSOR_SIZE)?;
        Ok(raw.chunks_exact(SENSOR_SIZE).map(MmcSensor::decode).collect())
    }

    pub fn fru_status(&self, slot_id: usize) -> Result<FruStatus> {
        Self::check_slot(slot_id)?;
        let raw = self.read_at(fru_status_offset(slot_id), FruStatus::SIZE)?;
        Ok(FruStatus::decode(&raw))
    }

    pub fn fru_description(&self, slot_id: usize) -> Result<FruDescription> {
        Self::check_slot(slot_id)?;
        let raw = self.read_at(fru_description_offset(slot_id), FruDescription::SIZE)?;
        Ok(FruDescription::decode(&raw))
    }

    /// Best-effort read from the opaque application block.
    ///
    /// Out-of-bounds requests are clamped to the block, never rejected; the
    /// result may be shorter than requested.
    pub fn application_data(&self, offset: usize, len: usize) -> Result<Vec<u8>> {
        let offset = offset.min(APPLICATION_DATA_SIZE);
        let len = len.min(APPLICATION_DATA_SIZE - offset);
        self.read_at(OFFSET_APPLICATION_DATA + offset, len)
    }

    pub fn fpga_ctrl(&self) -> Result<FpgaControl> {
        let raw = self.read_at(OFFSET_FPGA_CTRL, FpgaControl::SIZE)?;
        Ok(FpgaControl::decode(&raw))
    }

    pub fn set_fpga_status(&self, status: &FpgaStatus) -> Result<()> {
        self.write_at(OFFSET_FPGA_STATUS, &status.encode())
    }

    pub fn set_network_identity(&self, identity: &NetworkIdentity) -> Result<()> {
        self.write_at(OFFSET_NETWORK_IDENTITY, &identity.encode())
    }

    fn check_slot(slot_id: usize) -> Result<()> {
        if slot_id >= NUM_FRU_SLOTS {
            return Err(MailboxError::out_of_range(
                "FRU slot",
                slot_id,
                NUM_FRU_SLOTS,
            ));
        }
        Ok(())
    }
}
