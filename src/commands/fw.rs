//! Firmware and boot screen commands

use super::CommandResult;
use crate::devices::DeviceChannel;
use it8951_core::firmware;
use it8951_core::flash::{FlashGeometry, FlashProgrammer};
use it8951_core::image::Image;
use std::fs;
use std::path::Path;

/// Print the firmware version and boot screen layout
pub fn run_info(chan: &mut DeviceChannel, memaddr: u32, geometry: FlashGeometry) -> CommandResult {
    let mut flash = FlashProgrammer::new(chan, geometry, memaddr);
    let info = firmware::detect(&mut flash)?;
    println!("{}", info);
    Ok(())
}

/// Replace the firmware image at the start of the flash
pub fn run_write_fw(
    chan: &mut DeviceChannel,
    memaddr: u32,
    geometry: FlashGeometry,
    input: &Path,
) -> CommandResult {
    let fw = fs::read(input)?;
    let mut flash = FlashProgrammer::new(chan, geometry, memaddr);
    firmware::write_firmware(&mut flash, &fw)?;
    println!("Firmware written ({} bytes)", fw.len());
    Ok(())
}

/// Store a boot screen image in a flash slot
pub fn run_write_bs(
    chan: &mut DeviceChannel,
    memaddr: u32,
    geometry: FlashGeometry,
    image: &str,
    index: usize,
) -> CommandResult {
    let image = Image::load(image)?;
    let mut flash = FlashProgrammer::new(chan, geometry, memaddr);
    let info = firmware::detect(&mut flash)?;
    firmware::write_boot_screen(&mut flash, &info, &image, index)?;
    println!("Boot screen {} written", index);
    Ok(())
}

/// Select the boot screen shown at power on
pub fn run_enable_bs(
    chan: &mut DeviceChannel,
    memaddr: u32,
    geometry: FlashGeometry,
    index: usize,
) -> CommandResult {
    let mut flash = FlashProgrammer::new(chan, geometry, memaddr);
    let mut info = firmware::detect(&mut flash)?;
    firmware::enable_boot_screen(&mut flash, &mut info, index)?;
    println!("Boot screen {} enabled", index);
    Ok(())
}
