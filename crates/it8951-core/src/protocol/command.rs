//! Command descriptor builder
//!
//! One variant per operation. Constructors validate what the wire format can
//! express; [`Command::encode`] produces the 16-byte descriptor.

use super::{opcodes, CDB_LEN, MAX_TRANSFER_LEN, OPCODE_OFFSET, VENDOR_MARKER};
use crate::error::{Error, Result};
use crate::transport::Direction;

/// Signature bytes sent with the identity request ("8951")
const GET_SYS_SIGNATURE: [u8; 4] = *b"8951";

/// Command table version sent with the identity request
const GET_SYS_VERSION: [u8; 4] = [0x00, 0x01, 0x00, 0x02];

/// A single IT8951 vendor command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Read the identity record
    GetSys,
    /// Read `len` bytes of image memory at `addr`
    ReadMemory {
        /// Image memory address
        addr: u32,
        /// Transfer length
        len: u16,
    },
    /// Write `len` bytes of image memory at `addr`
    WriteMemory {
        /// Image memory address
        addr: u32,
        /// Transfer length
        len: u16,
        /// Use the fast write opcode
        fast: bool,
    },
    /// Load pixels into an image memory area (arguments in the data phase)
    LoadImageArea,
    /// Refresh a panel area (arguments in the data phase)
    DisplayArea,
    /// Erase one flash block (arguments in the data phase)
    FlashErase,
    /// Copy flash into image memory (arguments in the data phase)
    FlashRead,
    /// Copy image memory into flash (arguments in the data phase)
    FlashWrite,
    /// Get and optionally set VCOM and the power rail
    Pmic {
        /// New VCOM value in millivolts
        vcom: Option<u16>,
        /// New power rail state
        power: Option<bool>,
    },
}

impl Command {
    /// Memory read of one chunk
    pub fn read_memory(addr: u32, len: usize) -> Result<Self> {
        let len = check_transfer(addr, len)?;
        Ok(Command::ReadMemory { addr, len })
    }

    /// Memory write of one chunk
    pub fn write_memory(addr: u32, len: usize, fast: bool) -> Result<Self> {
        let len = check_transfer(addr, len)?;
        Ok(Command::WriteMemory { addr, len, fast })
    }

    /// PMIC control; `None` leaves the corresponding setting untouched
    pub fn pmic(vcom: Option<u16>, power: Option<bool>) -> Self {
        Command::Pmic { vcom, power }
    }

    /// Operation selector
    pub fn opcode(&self) -> u8 {
        match self {
            Command::GetSys => opcodes::GET_SYS,
            Command::ReadMemory { .. } => opcodes::READ_MEM,
            Command::WriteMemory { fast: false, .. } => opcodes::WRITE_MEM,
            Command::WriteMemory { fast: true, .. } => opcodes::FAST_WRITE_MEM,
            Command::LoadImageArea => opcodes::LOAD_IMG_AREA,
            Command::DisplayArea => opcodes::DISPLAY_AREA,
            Command::FlashErase => opcodes::SPI_ERASE,
            Command::FlashRead => opcodes::SPI_READ,
            Command::FlashWrite => opcodes::SPI_WRITE,
            Command::Pmic { .. } => opcodes::PMIC_CTRL,
        }
    }

    /// Direction of the data phase this command expects
    pub fn direction(&self) -> Direction {
        match self {
            Command::GetSys | Command::ReadMemory { .. } | Command::Pmic { .. } => {
                Direction::FromDevice
            }
            _ => Direction::ToDevice,
        }
    }

    /// Name used in log messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetSys => "get system info",
            Command::ReadMemory { .. } => "read memory",
            Command::WriteMemory { fast: false, .. } => "write memory",
            Command::WriteMemory { fast: true, .. } => "fast write memory",
            Command::LoadImageArea => "load area",
            Command::DisplayArea => "display area",
            Command::FlashErase => "SPI flash erase",
            Command::FlashRead => "SPI flash read",
            Command::FlashWrite => "SPI flash write",
            Command::Pmic { .. } => "PMIC control",
        }
    }

    /// Serialize to the 16-byte descriptor
    pub fn encode(&self) -> [u8; CDB_LEN] {
        let mut cdb = [0u8; CDB_LEN];
        cdb[0] = VENDOR_MARKER;
        cdb[OPCODE_OFFSET] = self.opcode();

        match *self {
            Command::GetSys => {
                cdb[2..6].copy_from_slice(&GET_SYS_SIGNATURE);
                cdb[7..11].copy_from_slice(&GET_SYS_VERSION);
            }
            Command::ReadMemory { addr, len } | Command::WriteMemory { addr, len, .. } => {
                cdb[2..6].copy_from_slice(&addr.to_be_bytes());
                cdb[7..9].copy_from_slice(&len.to_be_bytes());
            }
            Command::Pmic { vcom, power } => {
                if let Some(vcom) = vcom {
                    cdb[7..9].copy_from_slice(&vcom.to_be_bytes());
                    cdb[9] = 1;
                }
                if let Some(power) = power {
                    cdb[10] = 1;
                    cdb[11] = power as u8;
                }
            }
            Command::LoadImageArea
            | Command::DisplayArea
            | Command::FlashErase
            | Command::FlashRead
            | Command::FlashWrite => {}
        }

        cdb
    }
}

/// Check a memory transfer fits the 16-bit length field and the address space
fn check_transfer(addr: u32, len: usize) -> Result<u16> {
    if len > MAX_TRANSFER_LEN {
        return Err(Error::InvalidArgument(format!(
            "memory transfer of {} bytes exceeds the {} byte limit",
            len, MAX_TRANSFER_LEN
        )));
    }
    if addr as u64 + len as u64 > u32::MAX as u64 + 1 {
        return Err(Error::OutOfRange {
            addr,
            len,
            limit: u32::MAX as u64 + 1,
        });
    }
    Ok(len as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_sys_encoding() {
        assert_eq!(
            Command::GetSys.encode(),
            [0xFE, 0, 0x38, 0x39, 0x35, 0x31, 0x80, 0, 0x01, 0, 0x02, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_read_memory_encoding() {
        let cmd = Command::read_memory(0x0012_36E0, 0xFFFF).unwrap();
        assert_eq!(
            cmd.encode(),
            [0xFE, 0, 0x00, 0x12, 0x36, 0xE0, 0x81, 0xFF, 0xFF, 0, 0, 0, 0, 0, 0, 0]
        );
        assert_eq!(cmd.direction(), Direction::FromDevice);
    }

    #[test]
    fn test_write_memory_opcodes() {
        let normal = Command::write_memory(0x1000, 16, false).unwrap();
        let fast = Command::write_memory(0x1000, 16, true).unwrap();
        assert_eq!(normal.encode()[6], 0x82);
        assert_eq!(fast.encode()[6], 0xA5);
        assert_eq!(&fast.encode()[2..9], &[0, 0, 0x10, 0, 0xA5, 0, 16]);
        assert_eq!(fast.direction(), Direction::ToDevice);
    }

    #[test]
    fn test_memory_transfer_too_long() {
        assert!(matches!(
            Command::read_memory(0, 0x1_0000),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Command::write_memory(0xFFFF_FFF0, 0x20, false),
            Err(Error::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_pmic_encoding() {
        let read_only = Command::pmic(None, None).encode();
        assert_eq!(&read_only[6..12], &[0xA3, 0, 0, 0, 0, 0]);

        let set_vcom = Command::pmic(Some(1500), None).encode();
        assert_eq!(&set_vcom[7..12], &[0x05, 0xDC, 1, 0, 0]);

        let power_on = Command::pmic(None, Some(true)).encode();
        assert_eq!(&power_on[7..12], &[0, 0, 0, 1, 1]);

        let power_off = Command::pmic(Some(2000), Some(false)).encode();
        assert_eq!(&power_off[7..12], &[0x07, 0xD0, 1, 1, 0]);
    }

    #[test]
    fn test_argument_block_commands() {
        for (cmd, opcode) in [
            (Command::LoadImageArea, 0xA2),
            (Command::DisplayArea, 0x94),
            (Command::FlashErase, 0x96),
            (Command::FlashRead, 0x97),
            (Command::FlashWrite, 0x98),
        ] {
            let cdb = cmd.encode();
            assert_eq!(cdb[0], 0xFE);
            assert_eq!(cdb[6], opcode);
            assert_eq!(cdb.iter().filter(|&&b| b != 0).count(), 2);
            assert_eq!(cmd.direction(), Direction::ToDevice);
        }
    }
}
