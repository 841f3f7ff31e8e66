//! Device information and panel update commands

use super::CommandResult;
use crate::devices::DeviceChannel;
use it8951_core::display::{self, Zone};
use it8951_core::image::Image;
use it8951_core::protocol::{waveform, MemoryAddress};

/// Print the identity record reported by the device
pub fn run_info(chan: &DeviceChannel) -> CommandResult {
    println!("{}", chan.identity());
    Ok(())
}

/// Reset a panel area with the INIT waveform
pub fn run_clear(chan: &mut DeviceChannel, memaddr: u32, zone: Option<Zone>) -> CommandResult {
    display::display_area(chan, MemoryAddress::from_raw(memaddr), waveform::INIT, zone)?;
    Ok(())
}

/// Refresh a panel area from image memory
pub fn run_display(
    chan: &mut DeviceChannel,
    memaddr: u32,
    mode: u32,
    zone: Option<Zone>,
) -> CommandResult {
    display::display_area(chan, MemoryAddress::from_raw(memaddr), mode, zone)?;
    Ok(())
}

/// Load a PGM file or monochrome image spec into image memory
pub fn run_load(
    chan: &mut DeviceChannel,
    memaddr: u32,
    image: &str,
    zone: Option<Zone>,
) -> CommandResult {
    let image = Image::load(image)?;
    display::load_image_area(chan, MemoryAddress::from_raw(memaddr), &image, zone)?;
    Ok(())
}
