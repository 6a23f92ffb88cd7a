//! Constants of the fixed mailbox memory map
//!
//! The mailbox is one packed, little-endian region shared byte-for-byte with
//! the MMC firmware. Every offset below is a protocol constant: shifting any
//! of them is a breaking protocol change. [`super::verify`] recomputes the
//! packing from [`FIELD_MAP`] at startup and refuses to run on a mismatch.

/// Total size of the mailbox region in bytes
pub const MAILBOX_SIZE: usize = 2047;

/// Protocol tag at offset 0, 7 ASCII bytes, no terminator
pub const MAGIC: &[u8; 7] = b"mmcmbox";

/// Length of the magic tag
pub const MAGIC_LEN: usize = 7;

/// Mailbox format version this build understands
pub const FORMAT_VERSION: u8 = 1;

/// Number of FRU slots (0=AMC, 1=RTM, 2=FMC1, 3=FMC2)
pub const NUM_FRU_SLOTS: usize = 4;

/// Temperature readings per FRU status record
pub const FRU_TEMP_SLOTS: usize = 8;

/// Sentinel marking a temperature reading as invalid (raw i16, 0.01 degC units)
pub const FRU_TEMP_INVALID: i16 = i16::MIN;

/// Bytes of the slot-type-specific extension inside a FRU status record
pub const FRU_TYPE_SPECIFIC_LEN: usize = 10;

/// Text field lengths of a FRU description record
pub const FRU_UID_LEN: usize = 6;
pub const FRU_MANUFACTURER_LEN: usize = 60;
pub const FRU_PRODUCT_LEN: usize = 60;
pub const FRU_PART_NR_LEN: usize = 60;
pub const FRU_SERIAL_NR_LEN: usize = 30;
pub const FRU_VERSION_LEN: usize = 20;

/// Size of the opaque application-specific block
pub const APPLICATION_DATA_SIZE: usize = 256;

/// MMC board name length
pub const BOARD_NAME_LEN: usize = 23;

/// Sensor table capacity
pub const NUM_SENSORS: usize = 40;

/// Sensor name length
pub const SENSOR_NAME_LEN: usize = 12;

/// Record sizes
pub const FRU_STATUS_SIZE: usize = 2 + 2 * FRU_TEMP_SLOTS + FRU_TYPE_SPECIFIC_LEN;
pub const FRU_DESCRIPTION_SIZE: usize = FRU_UID_LEN
    + FRU_MANUFACTURER_LEN
    + FRU_PRODUCT_LEN
    + FRU_PART_NR_LEN
    + FRU_SERIAL_NR_LEN
    + FRU_VERSION_LEN;
pub const FRU_INFORMATION_SIZE: usize = FRU_STATUS_SIZE + FRU_DESCRIPTION_SIZE;
pub const MMC_INFORMATION_SIZE: usize = 48;
pub const SENSOR_SIZE: usize = SENSOR_NAME_LEN + 4;
pub const NETWORK_IDENTITY_SIZE: usize = 6 + 4 + 16;
pub const RESERVED_SIZE: usize = 11;

/// Field offsets, documented protocol constants
pub const OFFSET_MAGIC: usize = 0;
pub const OFFSET_VERSION: usize = 7;
pub const OFFSET_FRU_INFORMATION: usize = 8;
pub const OFFSET_APPLICATION_DATA: usize = 1064;
pub const OFFSET_MMC_INFORMATION: usize = 1320;
pub const OFFSET_SENSORS: usize = 1368;
pub const OFFSET_RESERVED: usize = 2008;
pub const OFFSET_NETWORK_IDENTITY: usize = 2019;
pub const OFFSET_FPGA_CTRL: usize = 2045;
pub const OFFSET_FPGA_STATUS: usize = 2046;

/// Offset of one FRU slot's status record
pub const fn fru_status_offset(slot_id: usize) -> usize {
    OFFSET_FRU_INFORMATION + slot_id * FRU_INFORMATION_SIZE
}

/// Offset of one FRU slot's description record
pub const fn fru_description_offset(slot_id: usize) -> usize {
    fru_status_offset(slot_id) + FRU_STATUS_SIZE
}

/// Offset of one sensor table entry
pub const fn sensor_offset(index: usize) -> usize {
    OFFSET_SENSORS + index * SENSOR_SIZE
}

/// One entry of the ordered field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
    pub size: usize,
}

/// The complete memory map in layout order, gapless by construction.
///
/// The documented `OFFSET_*` constants above must agree with the cumulative
/// packing of this table; `layout::verify()` checks exactly that.
pub const FIELD_MAP: &[Field] = &[
    Field {
        name: "magic",
        offset: OFFSET_MAGIC,
        size: MAGIC_LEN,
    },
    Field {
        name: "version",
        offset: OFFSET_VERSION,
        size: 1,
    },
    Field {
        name: "fru_information",
        offset: OFFSET_FRU_INFORMATION,
        size: NUM_FRU_SLOTS * FRU_INFORMATION_SIZE,
    },
    Field {
        name: "application_data",
        offset: OFFSET_APPLICATION_DATA,
        size: APPLICATION_DATA_SIZE,
    },
    Field {
        name: "mmc_information",
        offset: OFFSET_MMC_INFORMATION,
        size: MMC_INFORMATION_SIZE,
    },
    Field {
        name: "mmc_sensor",
        offset: OFFSET_SENSORS,
        size: NUM_SENSORS * SENSOR_SIZE,
    },
    Field {
        name: "reserved",
        offset: OFFSET_RESERVED,
        size: RESERVED_SIZE,
    },
    Field {
        name: "bp_eth_info",
        offset: OFFSET_NETWORK_IDENTITY,
        size: NETWORK_IDENTITY_SIZE,
    },
    Field {
        name: "fpga_ctrl",
        offset: OFFSET_FPGA_CTRL,
        size: 1,
    },
    Field {
        name: "fpga_status",
        offset: OFFSET_FPGA_STATUS,
        size: 1,
    },
];
