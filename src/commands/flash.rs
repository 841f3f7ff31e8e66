//! SPI flash commands

use super::{CommandResult, IndicatifProgress};
use crate::devices::DeviceChannel;
use it8951_core::flash::{FlashGeometry, FlashProgrammer};
use log::warn;
use std::fs;
use std::path::Path;

/// Bytes left between `addr` and the end of the flash
fn remaining(geometry: &FlashGeometry, addr: u32) -> usize {
    geometry.total_size().saturating_sub(addr as u64) as usize
}

/// Number of bytes a write actually covers
///
/// A missing or zero size means the whole file. The result never exceeds the
/// file nor the end of the flash.
fn write_len(requested: Option<u32>, file_len: usize, flash_left: usize) -> usize {
    let mut len = match requested {
        None | Some(0) => file_len,
        Some(size) => size as usize,
    };
    if len > file_len {
        warn!(
            "Requested {} bytes but the file only holds {}, truncating",
            len, file_len
        );
        len = file_len;
    }
    if len > flash_left {
        warn!(
            "Write would run past the end of the flash, truncating to {} bytes",
            flash_left
        );
        len = flash_left;
    }
    len
}

/// Erase whole blocks starting at `addr`
pub fn run_erase(
    chan: &mut DeviceChannel,
    memaddr: u32,
    geometry: FlashGeometry,
    addr: u32,
    size: u32,
) -> CommandResult {
    let mut flash = FlashProgrammer::new(chan, geometry, memaddr);
    let mut progress = IndicatifProgress::new();
    flash.erase_with_progress(addr, size as usize, &mut progress)?;
    println!("Erase complete");
    Ok(())
}

/// Copy flash contents into a file
pub fn run_read(
    chan: &mut DeviceChannel,
    memaddr: u32,
    geometry: FlashGeometry,
    addr: u32,
    output: &Path,
    size: Option<u32>,
) -> CommandResult {
    let len = match size {
        None | Some(0) => remaining(&geometry, addr),
        Some(size) => size as usize,
    };

    let mut flash = FlashProgrammer::new(chan, geometry, memaddr);
    let mut data = vec![0u8; len];
    let mut progress = IndicatifProgress::new();
    flash.read_with_progress(addr, &mut data, &mut progress)?;

    fs::write(output, &data)?;
    println!("Wrote {} bytes to {:?}", data.len(), output);
    Ok(())
}

/// Copy a file into flash, verifying the result
pub fn run_write(
    chan: &mut DeviceChannel,
    memaddr: u32,
    geometry: FlashGeometry,
    input: &Path,
    addr: u32,
    size: Option<u32>,
) -> CommandResult {
    let data = fs::read(input)?;
    let len = write_len(size, data.len(), remaining(&geometry, addr));

    let mut flash = FlashProgrammer::new(chan, geometry, memaddr);
    let mut progress = IndicatifProgress::new();
    flash.write_with_progress(addr, &data[..len], true, &mut progress)?;

    println!("Wrote {} bytes @0x{:08x} (verified)", len, addr);
    Ok(())
}
