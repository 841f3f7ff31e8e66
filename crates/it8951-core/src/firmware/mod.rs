//! Controller firmware and boot screen images
//!
//! The firmware lives at the start of the SPI flash and carries a version
//! string at [`VERSION_OFFSET`]. Version 0.2 stores a single boot screen
//! image located through an `IT8951_ImageLib` header. Version 0.3 and later
//! store up to [`MAX_BOOT_SCREENS`] images from [`BOOT_SCREEN_START`] on,
//! one per panel-sized slot, and select the active one through a switch
//! block at [`SWITCH_BLOCK_ADDR`].

use std::fmt;

use log::{debug, info, warn};
use zerocopy::byteorder::big_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::error::{Error, Result};
use crate::flash::{FlashGeometry, FlashProgrammer};
use crate::image::Image;
use crate::transport::Transport;

/// Flash offset of the version string
pub const VERSION_OFFSET: u32 = 0x120;

/// Bytes read when looking for the version string
pub const VERSION_LEN: usize = 64;

/// Most boot screen images a firmware can hold
pub const MAX_BOOT_SCREENS: usize = 12;

/// First boot screen slot (v0.3+)
pub const BOOT_SCREEN_START: u32 = 0x18_0000;

/// Switch block selecting the active boot screen (v0.3+)
pub const SWITCH_BLOCK_ADDR: u32 = 0x17_0000;

const SWITCH_TAG: &[u8] = b"LOGO_";
const SWITCH_BLOCK_LEN: usize = 8;
const VERSION_TAG: &[u8] = b"_v.";
const IMAGE_LIB_MAGIC: &[u8] = b"IT8951_ImageLib";
const IMAGE_LIB_SEARCH_LEN: u64 = 512 * 1024;

/// Image library header found in v0.2 firmware
#[derive(FromBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct ImageLibHeader {
    _magic: [u8; 32],
    num_img: U16,
    _unknown: [u8; 14],
    index: U16,
    bpp: U16,
    offset: U32,
    width: U16,
    height: U16,
}

/// Firmware version and boot screen layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareInfo {
    /// Version string as stored in flash
    pub version: String,
    /// Major version number
    pub major: u32,
    /// Minor version number
    pub minor: u32,
    /// Firmware knows about boot screen images
    pub boot_screen_support: bool,
    /// Flash address of each boot screen image
    pub boot_screens: Vec<u32>,
    /// Index of the active boot screen, if known
    pub active: Option<usize>,
}

impl FirmwareInfo {
    /// Build from a version string, without any boot screen information
    pub fn from_version_string(buf: &[u8]) -> Result<Self> {
        let (major, minor) = parse_version(buf)?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        let version = String::from_utf8_lossy(&buf[..end]).trim().to_string();

        Ok(Self {
            version,
            major,
            minor,
            boot_screen_support: false,
            boot_screens: Vec::new(),
            active: None,
        })
    }

    /// True for firmware with multiple boot screen slots
    pub fn has_switch_block(&self) -> bool {
        self.major == 0 && self.minor >= 3
    }

    fn check_index(&self, index: usize) -> Result<u32> {
        if !self.boot_screen_support {
            return Err(Error::Firmware(format!(
                "firmware version {} doesn't support boot screen images",
                self.version
            )));
        }
        self.boot_screens.get(index).copied().ok_or_else(|| {
            Error::Firmware(format!(
                "invalid boot screen index {} (max={})",
                index,
                self.boot_screens.len().saturating_sub(1)
            ))
        })
    }
}

impl fmt::Display for FirmwareInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Firmware version    : {}", self.version)?;
        write!(
            f,
            "Boot screen support : {}",
            if self.boot_screen_support { "yes" } else { "no" }
        )?;
        if !self.boot_screen_support {
            return Ok(());
        }
        write!(f, "\nNumber of BS images : {}", self.boot_screens.len())?;
        for (i, addr) in self.boot_screens.iter().enumerate() {
            write!(f, "\nBS image {} address  : 0x{:08x}", i, addr)?;
        }
        match self.active {
            Some(index) => write!(f, "\nActive BS image     : {}", index),
            None => write!(f, "\nActive BS image     : not set"),
        }
    }
}

/// Extract `major.minor` from a buffer containing `_v.<major>.<minor>`
pub fn parse_version(buf: &[u8]) -> Result<(u32, u32)> {
    let pos = find(buf, VERSION_TAG)
        .ok_or_else(|| Error::Firmware("failed to find firmware version string".into()))?;
    let rest = &buf[pos + VERSION_TAG.len()..];

    let (major, rest) = leading_number(rest)
        .ok_or_else(|| Error::Firmware("failed to get firmware version number".into()))?;
    let minor = rest
        .strip_prefix(b".")
        .and_then(leading_number)
        .map(|(minor, _)| minor)
        .ok_or_else(|| Error::Firmware("failed to get firmware version number".into()))?;

    Ok((major, minor))
}

fn leading_number(buf: &[u8]) -> Option<(u32, &[u8])> {
    let len = buf.iter().take_while(|b| b.is_ascii_digit()).count();
    let value = std::str::from_utf8(&buf[..len]).ok()?.parse().ok()?;
    Some((value, &buf[len..]))
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Boot screen slot addresses for v0.3+ firmware
///
/// Slots start at [`BOOT_SCREEN_START`], each on the first block boundary
/// after the previous image, as long as an image fits before the end of
/// the flash.
pub fn boot_screen_layout(geometry: &FlashGeometry, image_size: usize) -> Vec<u32> {
    let mut slots = Vec::new();
    if image_size == 0 {
        return slots;
    }

    let mut addr = BOOT_SCREEN_START as u64;
    while addr + (image_size as u64) < geometry.total_size() && slots.len() < MAX_BOOT_SCREENS {
        slots.push(addr as u32);
        addr = geometry.align_up(addr + image_size as u64);
    }
    slots
}

/// Address of the active image stored in a switch block, if tagged
pub fn parse_switch_block(buf: &[u8]) -> Option<u32> {
    let addr = buf.strip_prefix(SWITCH_TAG)?.get(..3)?;
    Some(u32::from_be_bytes([0, addr[0], addr[1], addr[2]]))
}

/// Switch block selecting the image at `addr`
pub fn switch_block(addr: u32) -> [u8; SWITCH_BLOCK_LEN] {
    let mut block = [0u8; SWITCH_BLOCK_LEN];
    block[..SWITCH_TAG.len()].copy_from_slice(SWITCH_TAG);
    block[SWITCH_TAG.len()..].copy_from_slice(&addr.to_be_bytes()[1..]);
    block
}

/// Read the firmware version and boot screen layout from flash
pub fn detect<T: Transport>(flash: &mut FlashProgrammer<'_, T>) -> Result<FirmwareInfo> {
    let buf = flash.read_vec(VERSION_OFFSET, VERSION_LEN)?;
    let mut info = FirmwareInfo::from_version_string(&buf)?;
    info!("Firmware version {}.{}", info.major, info.minor);

    if info.major == 0 && info.minor == 2 {
        detect_image_lib(flash, &mut info)?;
    } else if info.has_switch_block() {
        detect_switch_block(flash, &mut info)?;
    }
    Ok(info)
}

fn detect_image_lib<T: Transport>(
    flash: &mut FlashProgrammer<'_, T>,
    info: &mut FirmwareInfo,
) -> Result<()> {
    let len = IMAGE_LIB_SEARCH_LEN.min(flash.geometry().total_size()) as usize;
    let fw = flash.read_vec(0, len)?;

    let pos = find(&fw, IMAGE_LIB_MAGIC)
        .ok_or_else(|| Error::Firmware("imglib header not found".into()))?;
    let (hdr, _) = ImageLibHeader::ref_from_prefix(&fw[pos..])
        .map_err(|_| Error::Firmware("truncated imglib header".into()))?;

    info!("Found imglib header @0x{:08x}", pos);
    debug!("num_img: {}", hdr.num_img.get());
    debug!("index  : {}", hdr.index.get());
    debug!("bpp    : {}", hdr.bpp.get());
    debug!("offset : {}", hdr.offset.get());
    debug!("width  : {}", hdr.width.get());
    debug!("height : {}", hdr.height.get());

    if hdr.num_img.get() != 1 {
        return Err(Error::Firmware(format!(
            "invalid header: num_img={} (should be 1)",
            hdr.num_img.get()
        )));
    }
    if hdr.index.get() != 0 {
        return Err(Error::Firmware(format!(
            "invalid header: index={} (should be 0)",
            hdr.index.get()
        )));
    }
    if hdr.bpp.get() != 8 {
        return Err(Error::Firmware(format!(
            "invalid header: bpp={} (should be 8)",
            hdr.bpp.get()
        )));
    }
    let (width, height) = flash.panel();
    if hdr.width.get() as u32 != width || hdr.height.get() as u32 != height {
        return Err(Error::Firmware(format!(
            "display {}x{} doesn't match header {}x{}",
            width,
            height,
            hdr.width.get(),
            hdr.height.get()
        )));
    }

    let addr = (pos as u64 + hdr.offset.get() as u64) as u32;
    info.boot_screen_support = true;
    info.boot_screens = vec![addr];
    info.active = Some(0);
    Ok(())
}

fn detect_switch_block<T: Transport>(
    flash: &mut FlashProgrammer<'_, T>,
    info: &mut FirmwareInfo,
) -> Result<()> {
    let (width, height) = flash.panel();
    info.boot_screen_support = true;
    info.boot_screens = boot_screen_layout(flash.geometry(), width as usize * height as usize);

    let block = flash.read_vec(SWITCH_BLOCK_ADDR, VERSION_LEN)?;
    let Some(addr) = parse_switch_block(&block) else {
        info!("No switch block tag found");
        return Ok(());
    };
    info!("Switch block: boot screen address is 0x{:08x}", addr);

    info.active = info.boot_screens.iter().position(|&slot| slot == addr);
    if info.active.is_none() {
        warn!(
            "Switch block: boot screen address (0x{:08x}) doesn't match layout",
            addr
        );
    }
    Ok(())
}

/// Write a complete firmware image at the start of the flash, verified
pub fn write_firmware<T: Transport>(flash: &mut FlashProgrammer<'_, T>, fw: &[u8]) -> Result<()> {
    info!("Writing firmware ({} bytes)", fw.len());
    flash.write(0, fw, true)
}

/// Store a boot screen image in slot `index`, verified
pub fn write_boot_screen<T: Transport>(
    flash: &mut FlashProgrammer<'_, T>,
    info: &FirmwareInfo,
    image: &Image,
    index: usize,
) -> Result<()> {
    let addr = info.check_index(index)?;
    let (width, height) = flash.panel();
    if image.size() != width as usize * height as usize {
        return Err(Error::Firmware(format!(
            "boot screen image size ({} bytes) doesn't match screen resolution ({}x{})",
            image.size(),
            width,
            height
        )));
    }

    info!("Writing boot screen {} @0x{:08x}", index, addr);
    flash.write(addr, image.pixels(), true)
}

/// Make slot `index` the active boot screen (v0.3+), verified
pub fn enable_boot_screen<T: Transport>(
    flash: &mut FlashProgrammer<'_, T>,
    info: &mut FirmwareInfo,
    index: usize,
) -> Result<()> {
    let addr = info.check_index(index)?;
    if !info.has_switch_block() {
        return Err(Error::Firmware(format!(
            "firmware version {} doesn't support multiple boot screen images",
            info.version
        )));
    }

    info!("Enabling boot screen {} @0x{:08x}", index, addr);
    flash.write(SWITCH_BLOCK_ADDR, &switch_block(addr), true)?;
    info.active = Some(index);
    Ok(())
}
