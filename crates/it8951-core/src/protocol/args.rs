//! Argument blocks sent or received as the data phase of a command
//!
//! All multi-byte fields are big-endian on the wire. The layouts are plain
//! `repr(C)` structs of unaligned big-endian integers, so they serialize
//! without padding.

use zerocopy::byteorder::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::display::Zone;

/// Data phase of [`super::Command::FlashErase`]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct EraseArgs {
    /// Flash address of the block
    pub sfaddr: U32,
    /// Block size minus one
    pub size: U32,
}

impl EraseArgs {
    /// Arguments erasing the block of `block_size` bytes at `sfaddr`
    pub fn new(sfaddr: u32, block_size: u32) -> Self {
        Self {
            sfaddr: U32::new(sfaddr),
            size: U32::new(block_size - 1),
        }
    }
}

/// Data phase of [`super::Command::FlashRead`] and [`super::Command::FlashWrite`]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct FlashDataArgs {
    /// Flash address
    pub sfaddr: U32,
    /// Image memory address used as bridge
    pub memaddr: U32,
    /// Number of bytes to copy
    pub size: U32,
}

impl FlashDataArgs {
    /// Build the argument block
    pub fn new(sfaddr: u32, memaddr: u32, size: u32) -> Self {
        Self {
            sfaddr: U32::new(sfaddr),
            memaddr: U32::new(memaddr),
            size: U32::new(size),
        }
    }
}

/// Header of the [`super::Command::LoadImageArea`] payload, followed by pixels
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct LoadAreaArgs {
    /// Encoded memory argument
    pub memaddr: U32,
    /// Zone origin X
    pub x: U32,
    /// Zone origin Y
    pub y: U32,
    /// Zone width
    pub width: U32,
    /// Zone height
    pub height: U32,
}

impl LoadAreaArgs {
    /// Build the argument block from an encoded memory argument and a zone
    pub fn new(memaddr: u32, zone: &Zone) -> Self {
        Self {
            memaddr: U32::new(memaddr),
            x: U32::new(zone.x),
            y: U32::new(zone.y),
            width: U32::new(zone.width),
            height: U32::new(zone.height),
        }
    }
}

/// Data phase of [`super::Command::DisplayArea`]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct DisplayAreaArgs {
    /// Encoded memory argument
    pub memaddr: U32,
    /// Waveform mode
    pub mode: U32,
    /// Zone origin X
    pub x: U32,
    /// Zone origin Y
    pub y: U32,
    /// Zone width
    pub width: U32,
    /// Zone height
    pub height: U32,
    /// Wait for the controller to be ready (always 1)
    pub en_ready: U32,
}

impl DisplayAreaArgs {
    /// Build the argument block from an encoded memory argument, a mode and a zone
    pub fn new(memaddr: u32, mode: u32, zone: &Zone) -> Self {
        Self {
            memaddr: U32::new(memaddr),
            mode: U32::new(mode),
            x: U32::new(zone.x),
            y: U32::new(zone.y),
            width: U32::new(zone.width),
            height: U32::new(zone.height),
            en_ready: U32::new(1),
        }
    }
}

/// Response to [`super::Command::Pmic`]
///
/// The programming guide says this command returns nothing, but the
/// controller does send these registers back.
#[derive(Debug, Clone, Copy, Default, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct PmicResponse {
    /// VCOM in millivolts
    pub vcom: U16,
    /// Non-zero when VCOM was set
    pub set_vcom: u8,
    /// Non-zero when the power rail was set
    pub set_pwr: u8,
    /// Power rail state
    pub pwr: u8,
    /// Padding
    pub unused: [u8; 11],
}
