//! IT8951 vendor command protocol
//!
//! Every operation is a 16-byte SCSI command descriptor block (CDB) whose
//! first byte is the vendor marker and whose seventh byte selects the
//! operation. Operation arguments live either in the remaining CDB bytes
//! (memory read/write, PMIC) or in a big-endian argument block sent as the
//! data phase (flash, load area, display area).

pub mod args;
pub mod command;
pub mod identity;

pub use command::Command;
pub use identity::DeviceIdentity;

/// Length of a command descriptor block
pub const CDB_LEN: usize = 16;

/// Byte 0 of every descriptor
pub const VENDOR_MARKER: u8 = 0xFE;

/// Offset of the operation selector inside the descriptor
pub const OPCODE_OFFSET: usize = 6;

/// Largest payload a memory read/write command can describe (16-bit field)
pub const MAX_TRANSFER_LEN: usize = u16::MAX as usize;

/// Signatures of the controllers we know how to drive
pub const SUPPORTED_SIGNATURES: &[u32] = &[
    0x3839_3531, // IT8951
];

/// Operation selectors (descriptor byte 6)
pub mod opcodes {
    /// Read the identity record
    pub const GET_SYS: u8 = 0x80;
    /// Read image memory
    pub const READ_MEM: u8 = 0x81;
    /// Write image memory
    pub const WRITE_MEM: u8 = 0x82;
    /// Refresh a panel area
    pub const DISPLAY_AREA: u8 = 0x94;
    /// Erase one SPI flash block
    pub const SPI_ERASE: u8 = 0x96;
    /// Copy SPI flash into image memory
    pub const SPI_READ: u8 = 0x97;
    /// Copy image memory into SPI flash
    pub const SPI_WRITE: u8 = 0x98;
    /// Load pixels into an image memory area
    pub const LOAD_IMG_AREA: u8 = 0xA2;
    /// PMIC control (VCOM and power rail)
    pub const PMIC_CTRL: u8 = 0xA3;
    /// Write image memory, fast path
    pub const FAST_WRITE_MEM: u8 = 0xA5;
}

/// Waveform modes for [`Command::DisplayArea`]
///
/// Mode numbers are defined by the waveform file loaded on the controller;
/// these are the ones every IT8951 panel ships with.
pub mod waveform {
    /// Full clear to white
    pub const INIT: u32 = 0;
    /// Fast monochrome update
    pub const DU: u32 = 1;
    /// 16-level grayscale with flashing
    pub const GC16: u32 = 2;
    /// 16-level grayscale, reduced flashing
    pub const GL16: u32 = 3;
}

/// Top bit set in a memory argument when it carries a buffer index
const BUFFER_INDEX_FLAG: u32 = 1 << 31;

/// Number of raw values interpreted as buffer indexes
const BUFFER_INDEX_COUNT: u32 = 3;

/// Image memory location as accepted by load/display area commands
///
/// Raw values 0, 1 and 2 name one of the controller's image buffers and are
/// sent as `0x8000_0000 | index`. Anything else is an absolute address and
/// is sent unchanged.
///
/// Buffer indexes are not checked against [`DeviceIdentity::buf_num`]: the
/// IT8951 found on the Pathfinder board reports a bogus buffer count, so an
/// out-of-range index reaches the controller as is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAddress {
    /// One of the controller's image buffers
    Buffer(u8),
    /// Absolute image memory address
    Absolute(u32),
}

impl MemoryAddress {
    /// Classify a raw user-supplied value
    pub fn from_raw(raw: u32) -> Self {
        if raw < BUFFER_INDEX_COUNT {
            MemoryAddress::Buffer(raw as u8)
        } else {
            MemoryAddress::Absolute(raw)
        }
    }

    /// Encode as the 32-bit argument sent to the controller
    pub fn to_arg(self) -> u32 {
        match self {
            MemoryAddress::Buffer(index) => BUFFER_INDEX_FLAG | index as u32,
            MemoryAddress::Absolute(addr) => addr,
        }
    }
}

impl From<u32> for MemoryAddress {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

/// Format a descriptor for debug logs
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_address_buffer_index() {
        assert_eq!(MemoryAddress::from_raw(0).to_arg(), 0x8000_0000);
        assert_eq!(MemoryAddress::from_raw(1).to_arg(), 0x8000_0001);
        assert_eq!(MemoryAddress::from_raw(2).to_arg(), 0x8000_0002);
    }

    #[test]
    fn test_memory_address_absolute() {
        assert_eq!(MemoryAddress::from_raw(3).to_arg(), 3);
        assert_eq!(MemoryAddress::from_raw(0x0012_36E0).to_arg(), 0x0012_36E0);
        assert_eq!(
            MemoryAddress::from_raw(0x0012_36E0),
            MemoryAddress::Absolute(0x0012_36E0)
        );
    }

    #[test]
    fn test_hex_dump() {
        assert_eq!(hex_dump(&[0xfe, 0x00, 0x81]), "fe 00 81");
    }
}
