//! Identity record returned by the GET_SYS handshake

use std::fmt;

use zerocopy::byteorder::big_endian::U32;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::SUPPORTED_SIGNATURES;
use crate::error::{Error, Result};

/// Number of waveform modes with a frame counter
pub const FRAME_COUNT_MODES: usize = 8;

/// Wire layout of the identity record
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct RawIdentity {
    std_cmd_num: U32,
    ext_cmd_num: U32,
    signature: U32,
    version: U32,
    width: U32,
    height: U32,
    update_memaddr: U32,
    memaddr: U32,
    temp_seg_num: U32,
    mode: U32,
    frame_count: [U32; FRAME_COUNT_MODES],
    buf_num: U32,
    unused: [U32; 9],
}

/// Size of the identity record on the wire
pub const IDENTITY_LEN: usize = core::mem::size_of::<RawIdentity>();

/// Device description reported by the controller at open time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Number of standard commands
    pub std_cmd_num: u32,
    /// Number of extended commands
    pub ext_cmd_num: u32,
    /// Hardware signature (`0x38393531` for IT8951)
    pub signature: u32,
    /// Command table version
    pub version: u32,
    /// Panel width in pixels
    pub width: u32,
    /// Panel height in pixels
    pub height: u32,
    /// Update buffer address
    pub update_memaddr: u32,
    /// Image buffer address (buffer index 0)
    pub memaddr: u32,
    /// Number of temperature segments
    pub temp_seg_num: u32,
    /// Number of display modes
    pub mode: u32,
    /// Frame count for each mode
    pub frame_count: [u32; FRAME_COUNT_MODES],
    /// Number of image buffers (unreliable on some boards)
    pub buf_num: u32,
}

impl DeviceIdentity {
    /// Decode a raw identity record
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let raw = RawIdentity::read_from_bytes(bytes).map_err(|_| {
            Error::InvalidArgument(format!(
                "identity record is {} bytes, expected {}",
                bytes.len(),
                IDENTITY_LEN
            ))
        })?;

        Ok(Self {
            std_cmd_num: raw.std_cmd_num.get(),
            ext_cmd_num: raw.ext_cmd_num.get(),
            signature: raw.signature.get(),
            version: raw.version.get(),
            width: raw.width.get(),
            height: raw.height.get(),
            update_memaddr: raw.update_memaddr.get(),
            memaddr: raw.memaddr.get(),
            temp_seg_num: raw.temp_seg_num.get(),
            mode: raw.mode.get(),
            frame_count: raw.frame_count.map(|c| c.get()),
            buf_num: raw.buf_num.get(),
        })
    }

    /// Fail with `UnsupportedDevice` unless the signature is whitelisted
    pub fn check_signature(&self) -> Result<()> {
        if SUPPORTED_SIGNATURES.contains(&self.signature) {
            Ok(())
        } else {
            Err(Error::UnsupportedDevice {
                signature: self.signature,
            })
        }
    }

    /// Encode back to the wire layout
    pub fn to_bytes(&self) -> [u8; IDENTITY_LEN] {
        let raw = RawIdentity {
            std_cmd_num: U32::new(self.std_cmd_num),
            ext_cmd_num: U32::new(self.ext_cmd_num),
            signature: U32::new(self.signature),
            version: U32::new(self.version),
            width: U32::new(self.width),
            height: U32::new(self.height),
            update_memaddr: U32::new(self.update_memaddr),
            memaddr: U32::new(self.memaddr),
            temp_seg_num: U32::new(self.temp_seg_num),
            mode: U32::new(self.mode),
            frame_count: self.frame_count.map(U32::new),
            buf_num: U32::new(self.buf_num),
            unused: [U32::ZERO; 9],
        };
        let mut out = [0u8; IDENTITY_LEN];
        out.copy_from_slice(raw.as_bytes());
        out
    }

    /// Size of one full-panel 8bpp image, which is also the flash bridge size
    pub fn panel_size(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Signature        : {:08x}", self.signature)?;
        writeln!(f, "Version          : {:08x}", self.version)?;
        writeln!(f, "Width            : {}", self.width)?;
        writeln!(f, "Height           : {}", self.height)?;
        writeln!(f, "Update address   : {:08x}", self.update_memaddr)?;
        writeln!(f, "Memory address   : {:08x}", self.memaddr)?;
        writeln!(f, "Mode             : {}", self.mode)?;
        write!(f, "Number of buffer : {}", self.buf_num)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DeviceIdentity {
        DeviceIdentity {
            std_cmd_num: 0x13,
            ext_cmd_num: 0x0C,
            signature: 0x3839_3531,
            version: 0x0001_0002,
            width: 1200,
            height: 825,
            update_memaddr: 0x0012_36E0,
            memaddr: 0x0012_36E0,
            temp_seg_num: 10,
            mode: 6,
            frame_count: [1, 2, 3, 4, 5, 6, 7, 8],
            buf_num: 1,
        }
    }

    #[test]
    fn test_identity_len() {
        assert_eq!(IDENTITY_LEN, 112);
    }

    #[test]
    fn test_parse_big_endian_fields() {
        let mut raw = [0u8; IDENTITY_LEN];
        raw[8..12].copy_from_slice(&[0x38, 0x39, 0x35, 0x31]);
        raw[16..20].copy_from_slice(&[0x00, 0x00, 0x04, 0xB0]);
        raw[20..24].copy_from_slice(&[0x00, 0x00, 0x06, 0x40]);
        raw[28..32].copy_from_slice(&[0x00, 0x12, 0x36, 0xE0]);
        raw[72..76].copy_from_slice(&[0x00, 0x00, 0x00, 0x03]);

        let id = DeviceIdentity::parse(&raw).unwrap();
        assert_eq!(id.signature, 0x3839_3531);
        assert_eq!(id.width, 1200);
        assert_eq!(id.height, 1600);
        assert_eq!(id.memaddr, 0x0012_36E0);
        assert_eq!(id.buf_num, 3);
        assert!(id.check_signature().is_ok());
    }

    #[test]
    fn test_parse_wrong_length() {
        assert!(matches!(
            DeviceIdentity::parse(&[0u8; 64]),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_to_bytes_parse() {
        let id = sample();
        assert_eq!(DeviceIdentity::parse(&id.to_bytes()).unwrap(), id);
    }

    #[test]
    fn test_unsupported_signature() {
        let mut id = sample();
        id.signature = 0xDEAD_BEEF;
        assert!(matches!(
            id.check_signature(),
            Err(Error::UnsupportedDevice {
                signature: 0xDEAD_BEEF
            })
        ));
    }

    #[test]
    fn test_display() {
        let text = sample().to_string();
        assert!(text.contains("Signature        : 38393531"));
        assert!(text.contains("Width            : 1200"));
        assert!(text.ends_with("Number of buffer : 1"));
    }
}
